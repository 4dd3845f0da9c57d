use super::model::Curriculum;
use serde::Serialize;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub path: String,
    pub severity: Severity,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Breaks a structural invariant; the tree must not be accepted.
    Error,
    /// Something the host should show the instructor before saving.
    Warning,
}

fn issue(path: String, severity: Severity, message: impl Into<String>) -> Issue {
    Issue {
        path,
        severity,
        message: message.into(),
    }
}

struct Checker {
    seen: HashSet<String>,
    issues: Vec<Issue>,
}

impl Checker {
    fn id(&mut self, path: &str, id: &str) {
        if id.trim().is_empty() {
            self.issues
                .push(issue(path.to_string(), Severity::Error, "id must not be empty"));
        } else if !self.seen.insert(id.to_string()) {
            self.issues.push(issue(
                path.to_string(),
                Severity::Error,
                format!("duplicate id {}", id),
            ));
        }
    }

    fn title(&mut self, path: &str, title: &str) {
        if title.trim().is_empty() {
            self.issues
                .push(issue(path.to_string(), Severity::Warning, "title is empty"));
        }
    }
}

/// Walks the whole tree. Paths are slash-joined indices with a kind tag on
/// the leaf segment, e.g. `0/1/lesson:2`.
pub fn check(c: &Curriculum) -> Vec<Issue> {
    let mut ck = Checker {
        seen: HashSet::new(),
        issues: Vec::new(),
    };
    for (wi, week) in c.weeks().iter().enumerate() {
        let wp = wi.to_string();
        ck.id(&wp, &week.id);
        ck.title(&wp, &week.week_title);
        for (si, section) in week.sections.iter().enumerate() {
            let sp = format!("{}/{}", wp, si);
            ck.id(&sp, &section.id);
            ck.title(&sp, &section.title);
            for (i, lesson) in section.lessons.iter().enumerate() {
                let p = format!("{}/lesson:{}", sp, i);
                ck.id(&p, &lesson.id);
                ck.title(&p, &lesson.title);
                for (ai, r) in lesson.resources.iter().enumerate() {
                    let rp = format!("{}/resource:{}", p, ai);
                    ck.id(&rp, &r.id);
                    ck.title(&rp, &r.title);
                }
            }
            for (i, assignment) in section.assignments.iter().enumerate() {
                let p = format!("{}/assignment:{}", sp, i);
                ck.id(&p, &assignment.id);
                ck.title(&p, &assignment.title);
                for (ai, r) in assignment.resources.iter().enumerate() {
                    let rp = format!("{}/resource:{}", p, ai);
                    ck.id(&rp, &r.id);
                    ck.title(&rp, &r.title);
                }
            }
            for (i, quiz) in section.quizzes.iter().enumerate() {
                let p = format!("{}/quiz:{}", sp, i);
                ck.id(&p, &quiz.id);
                ck.title(&p, &quiz.title);
            }
            for (i, resource) in section.resources.iter().enumerate() {
                let p = format!("{}/resource:{}", sp, i);
                ck.id(&p, &resource.id);
                ck.title(&p, &resource.title);
            }
        }
    }
    ck.issues
}

pub fn has_errors(issues: &[Issue]) -> bool {
    issues.iter().any(|i| i.severity == Severity::Error)
}
