mod test_support;

use serde_json::json;
use test_support::{request_err, request_ok, spawn_sidecar, FIXED_CLOCK};

fn week_with_section(
    stdin: &mut std::process::ChildStdin,
    reader: &mut std::io::BufReader<std::process::ChildStdout>,
) {
    let _ = request_ok(stdin, reader, "w", "curriculum.weeks.add", json!({}));
    let _ = request_ok(
        stdin,
        reader,
        "s",
        "curriculum.sections.add",
        json!({ "weekIndex": 0 }),
    );
}

#[test]
fn quizzes_assignments_resources_get_defaults() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    week_with_section(&mut stdin, &mut reader);
    let at = json!({ "weekIndex": 0, "sectionIndex": 0 });

    let _ = request_ok(&mut stdin, &mut reader, "1", "curriculum.quizzes.add", at.clone());
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "curriculum.assignments.add",
        at.clone(),
    );
    let r = request_ok(&mut stdin, &mut reader, "3", "curriculum.resources.add", at);
    let section = &r["curriculum"][0]["sections"][0];

    let quiz = &section["quizzes"][0];
    assert_eq!(quiz["id"], json!("quiz_3"));
    assert_eq!(quiz["title"], json!("Quiz 1"));
    assert_eq!(quiz["duration"], json!(30));
    assert_eq!(quiz["questions"], json!([]));

    let assignment = &section["assignments"][0];
    assert_eq!(assignment["id"], json!("assignment_4"));
    assert_eq!(assignment["maxScore"], json!(100));
    assert_eq!(assignment["dueDate"], json!(null));
    assert_eq!(assignment["resources"], json!([]));

    let resource = &section["resources"][0];
    assert_eq!(resource["id"], json!("resource_5"));
    assert_eq!(resource["type"], json!("pdf"));
    assert_eq!(resource["size_mb"], json!(null));
    assert_eq!(resource["pages"], json!(null));
    assert_eq!(resource["upload_date"], json!(FIXED_CLOCK));

    assert_eq!(section["lessons"], json!([]));
}

#[test]
fn leaf_updates_and_deletes_are_scoped_to_their_sequence() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    week_with_section(&mut stdin, &mut reader);
    let at = json!({ "weekIndex": 0, "sectionIndex": 0 });
    for (id, method) in [
        ("1", "curriculum.quizzes.add"),
        ("2", "curriculum.quizzes.add"),
        ("3", "curriculum.assignments.add"),
        ("4", "curriculum.lessons.add"),
    ] {
        let _ = request_ok(&mut stdin, &mut reader, id, method, at.clone());
    }

    let r = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "curriculum.assignments.update",
        json!({
            "weekIndex": 0, "sectionIndex": 0, "itemIndex": 0,
            "field": "dueDate", "value": "2026-10-30"
        }),
    );
    assert_eq!(
        r["curriculum"][0]["sections"][0]["assignments"][0]["dueDate"],
        json!("2026-10-30T00:00:00Z")
    );

    let r = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "curriculum.quizzes.update",
        json!({
            "weekIndex": 0, "sectionIndex": 0, "itemIndex": 1,
            "field": "questions", "value": [{ "prompt": "2 + 2?", "answer": "4" }]
        }),
    );
    let quizzes = r["curriculum"][0]["sections"][0]["quizzes"].clone();
    assert_eq!(quizzes[1]["questions"][0]["answer"], json!("4"));
    assert_eq!(quizzes[0]["questions"], json!([]));

    let r = request_ok(
        &mut stdin,
        &mut reader,
        "7",
        "curriculum.quizzes.delete",
        json!({ "weekIndex": 0, "sectionIndex": 0, "itemIndex": 0 }),
    );
    let section = &r["curriculum"][0]["sections"][0];
    assert_eq!(section["quizzes"].as_array().map(|a| a.len()), Some(1));
    assert_eq!(section["quizzes"][0]["title"], json!("Quiz 2"));
    assert_eq!(section["assignments"].as_array().map(|a| a.len()), Some(1));
    assert_eq!(section["lessons"].as_array().map(|a| a.len()), Some(1));

    let r = request_ok(
        &mut stdin,
        &mut reader,
        "8",
        "curriculum.assignments.delete",
        json!({ "weekIndex": 0, "sectionIndex": 0, "itemIndex": 0 }),
    );
    assert_eq!(r["curriculum"][0]["sections"][0]["assignments"], json!([]));
}

#[test]
fn resource_metadata_updates() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    week_with_section(&mut stdin, &mut reader);
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "curriculum.resources.add",
        json!({ "weekIndex": 0, "sectionIndex": 0 }),
    );
    let item = |field: &str, value: serde_json::Value| {
        json!({
            "weekIndex": 0, "sectionIndex": 0, "itemIndex": 0,
            "field": field, "value": value
        })
    };
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "curriculum.resources.update",
        item("type", json!("video")),
    );
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "curriculum.resources.update",
        item("url", json!(" https://video.example/intro ")),
    );
    let r = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "curriculum.resources.update",
        item("size_mb", json!(120.5)),
    );
    let resource = &r["curriculum"][0]["sections"][0]["resources"][0];
    assert_eq!(resource["type"], json!("video"));
    assert_eq!(resource["url"], json!("https://video.example/intro"));
    assert_eq!(resource["size_mb"], json!(120.5));
    assert_eq!(resource["upload_date"], json!(FIXED_CLOCK));

    let e = request_err(
        &mut stdin,
        &mut reader,
        "5",
        "curriculum.resources.update",
        item("upload_date", json!("2020-01-01")),
        "validation_failed",
    );
    assert_eq!(e["message"], json!("upload_date cannot be updated"));

    let r = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "curriculum.resources.delete",
        json!({ "weekIndex": 0, "sectionIndex": 0, "itemIndex": 0 }),
    );
    assert_eq!(r["curriculum"][0]["sections"][0]["resources"], json!([]));
}

#[test]
fn attach_upload_appends_only_on_confirmed_success() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    week_with_section(&mut stdin, &mut reader);

    let before = request_ok(&mut stdin, &mut reader, "1", "curriculum.get", json!({}));

    let e = request_err(
        &mut stdin,
        &mut reader,
        "2",
        "curriculum.resources.attachUpload",
        json!({
            "weekIndex": 0, "sectionIndex": 0,
            "upload": { "ok": false, "error": "network unreachable" }
        }),
        "upload_failed",
    );
    assert_eq!(e["message"], json!("upload failed: network unreachable"));

    let unchanged = request_ok(&mut stdin, &mut reader, "3", "curriculum.get", json!({}));
    assert_eq!(unchanged["revision"], before["revision"]);

    let r = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "curriculum.resources.attachUpload",
        json!({
            "weekIndex": 0, "sectionIndex": 0,
            "upload": {
                "ok": true,
                "file": {
                    "title": "Course outline",
                    "type": "pdf",
                    "url": "https://cdn.example/outline.pdf",
                    "size_mb": 0.8,
                    "pages": 6
                }
            }
        }),
    );
    let resource = &r["curriculum"][0]["sections"][0]["resources"][0];
    assert_eq!(resource["title"], json!("Course outline"));
    assert_eq!(resource["pages"], json!(6));
    assert_eq!(resource["upload_date"], json!(FIXED_CLOCK));
}

#[test]
fn lesson_attachments_replace_as_a_whole() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    week_with_section(&mut stdin, &mut reader);
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "curriculum.lessons.add",
        json!({ "weekIndex": 0, "sectionIndex": 0 }),
    );
    let r = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "curriculum.lessons.update",
        json!({
            "weekIndex": 0, "sectionIndex": 0, "itemIndex": 0,
            "field": "resources",
            "value": [{
                "id": "resource_slides",
                "title": "Slides",
                "type": "pdf",
                "url": "https://cdn.example/slides.pdf",
                "upload_date": "2026-08-30T12:00:00Z"
            }]
        }),
    );
    let lesson = &r["curriculum"][0]["sections"][0]["lessons"][0];
    assert_eq!(lesson["resources"][0]["id"], json!("resource_slides"));

    let _ = request_err(
        &mut stdin,
        &mut reader,
        "3",
        "curriculum.lessons.update",
        json!({
            "weekIndex": 0, "sectionIndex": 0, "itemIndex": 0,
            "field": "resources", "value": [{ "title": "no id" }]
        }),
        "validation_failed",
    );
}

#[test]
fn attachment_ids_must_stay_unique_across_the_tree() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    week_with_section(&mut stdin, &mut reader);
    let at = json!({ "weekIndex": 0, "sectionIndex": 0 });
    let _ = request_ok(&mut stdin, &mut reader, "1", "curriculum.lessons.add", at.clone());
    let _ = request_ok(&mut stdin, &mut reader, "2", "curriculum.assignments.add", at);
    let before = request_ok(&mut stdin, &mut reader, "3", "curriculum.get", json!({}));

    let attach = |field: &str, ids: &[&str]| {
        let resources: Vec<serde_json::Value> = ids
            .iter()
            .map(|id| {
                json!({
                    "id": id,
                    "title": "Handout",
                    "type": "pdf",
                    "url": "https://cdn.example/handout.pdf",
                    "upload_date": "2026-08-30T12:00:00Z"
                })
            })
            .collect();
        json!({
            "weekIndex": 0, "sectionIndex": 0, "itemIndex": 0,
            "field": field, "value": resources
        })
    };

    let e = request_err(
        &mut stdin,
        &mut reader,
        "4",
        "curriculum.lessons.update",
        attach("resources", &["week_1"]),
        "validation_failed",
    );
    assert_eq!(e["message"], json!("resources holds duplicate id week_1"));
    let _ = request_err(
        &mut stdin,
        &mut reader,
        "5",
        "curriculum.assignments.update",
        attach("resources", &["handout", "handout"]),
        "validation_failed",
    );
    let unchanged = request_ok(&mut stdin, &mut reader, "6", "curriculum.get", json!({}));
    assert_eq!(unchanged["revision"], before["revision"]);

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "7",
        "curriculum.lessons.update",
        attach("resources", &["handout"]),
    );
    let _ = request_err(
        &mut stdin,
        &mut reader,
        "8",
        "curriculum.assignments.update",
        attach("resources", &["handout"]),
        "validation_failed",
    );

    // The session's own snapshot always loads back.
    let snapshot = request_ok(&mut stdin, &mut reader, "9", "curriculum.get", json!({}));
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "10",
        "curriculum.load",
        json!({ "curriculum": snapshot["curriculum"] }),
    );
}
