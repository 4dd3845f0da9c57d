use crate::curriculum::engine::{self, EditContext, ItemPath, UploadedFile};
use crate::curriculum::error::EditResult;
use crate::curriculum::fields::{
    AssignmentField, LessonField, QuizField, ResourceField, SectionField, WeekField,
};
use crate::curriculum::Curriculum;
use crate::ipc::error::{edit_err, err};
use crate::ipc::helpers::{field_update, item_path, required_index, section_path, snapshot};
use crate::ipc::types::{AppState, Request};
use serde_json::Value as JsonValue;
use tracing::warn;

/// Runs one edit against the session tree. On success the result replaces
/// the tree and is returned as the new snapshot; on failure nothing changes.
fn commit<F>(state: &mut AppState, req: &Request, edit: F) -> JsonValue
where
    F: FnOnce(&Curriculum, &mut EditContext<'_>) -> EditResult<Curriculum>,
{
    let mut ctx = EditContext {
        ids: state.ids.as_mut(),
        clock: state.clock.as_ref(),
        defaults: &state.defaults,
    };
    match edit(&state.curriculum, &mut ctx) {
        Ok(next) => {
            state.curriculum = next;
            state.expanded = state.expanded.prune(&state.curriculum);
            snapshot(state, req)
        }
        Err(e) => {
            warn!(method = %req.method, error = %e, "edit rejected");
            edit_err(&req.id, &e)
        }
    }
}

fn handle_weeks_add(state: &mut AppState, req: &Request) -> JsonValue {
    commit(state, req, |c, ctx| Ok(engine::add_week(c, ctx)))
}

fn handle_weeks_update(state: &mut AppState, req: &Request) -> JsonValue {
    let week = match required_index(req, "weekIndex") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let (name, value) = match field_update(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let field = match WeekField::parse(&name, &value) {
        Ok(f) => f,
        Err(e) => return edit_err(&req.id, &e),
    };
    commit(state, req, |c, _| engine::update_week(c, week, field))
}

fn handle_weeks_delete(state: &mut AppState, req: &Request) -> JsonValue {
    let week = match required_index(req, "weekIndex") {
        Ok(v) => v,
        Err(e) => return e,
    };
    commit(state, req, |c, _| engine::delete_week(c, week))
}

fn handle_sections_add(state: &mut AppState, req: &Request) -> JsonValue {
    let week = match required_index(req, "weekIndex") {
        Ok(v) => v,
        Err(e) => return e,
    };
    commit(state, req, |c, ctx| engine::add_section(c, week, ctx))
}

fn handle_sections_update(state: &mut AppState, req: &Request) -> JsonValue {
    let path = match section_path(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let (name, value) = match field_update(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let field = match SectionField::parse(&name, &value) {
        Ok(f) => f,
        Err(e) => return edit_err(&req.id, &e),
    };
    commit(state, req, |c, _| engine::update_section(c, path, field))
}

fn handle_sections_delete(state: &mut AppState, req: &Request) -> JsonValue {
    let path = match section_path(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    commit(state, req, |c, _| engine::delete_section(c, path))
}

type AddFn = fn(&Curriculum, engine::SectionPath, &mut EditContext<'_>) -> EditResult<Curriculum>;
type DeleteFn = fn(&Curriculum, ItemPath) -> EditResult<Curriculum>;

fn handle_item_add(state: &mut AppState, req: &Request, add: AddFn) -> JsonValue {
    let path = match section_path(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    commit(state, req, |c, ctx| add(c, path, ctx))
}

fn handle_item_update<F>(
    state: &mut AppState,
    req: &Request,
    parse: fn(&str, &JsonValue) -> EditResult<F>,
    update: fn(&Curriculum, ItemPath, F) -> EditResult<Curriculum>,
) -> JsonValue {
    let path = match item_path(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let (name, value) = match field_update(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let field = match parse(&name, &value) {
        Ok(f) => f,
        Err(e) => return edit_err(&req.id, &e),
    };
    commit(state, req, |c, _| update(c, path, field))
}

fn handle_item_delete(state: &mut AppState, req: &Request, delete: DeleteFn) -> JsonValue {
    let path = match item_path(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    commit(state, req, |c, _| delete(c, path))
}

fn parse_upload(req: &Request) -> Result<Result<UploadedFile, String>, JsonValue> {
    let Some(upload) = req.params.get("upload").and_then(|v| v.as_object()) else {
        return Err(err(&req.id, "bad_params", "missing upload", None));
    };
    match upload.get("ok").and_then(|v| v.as_bool()) {
        Some(true) => {
            let Some(file) = upload.get("file") else {
                return Err(err(&req.id, "bad_params", "upload.file is required", None));
            };
            serde_json::from_value::<UploadedFile>(file.clone())
                .map(Ok)
                .map_err(|e| err(&req.id, "bad_params", format!("upload.file {}", e), None))
        }
        Some(false) => Ok(Err(upload
            .get("error")
            .and_then(|v| v.as_str())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "upload failed".to_string()))),
        None => Err(err(&req.id, "bad_params", "upload.ok must be boolean", None)),
    }
}

fn handle_resources_attach_upload(state: &mut AppState, req: &Request) -> JsonValue {
    let path = match section_path(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let outcome = match parse_upload(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    commit(state, req, |c, ctx| {
        engine::attach_uploaded_resource(c, path, outcome, ctx)
    })
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<JsonValue> {
    match req.method.as_str() {
        "curriculum.weeks.add" => Some(handle_weeks_add(state, req)),
        "curriculum.weeks.update" => Some(handle_weeks_update(state, req)),
        "curriculum.weeks.delete" => Some(handle_weeks_delete(state, req)),
        "curriculum.sections.add" => Some(handle_sections_add(state, req)),
        "curriculum.sections.update" => Some(handle_sections_update(state, req)),
        "curriculum.sections.delete" => Some(handle_sections_delete(state, req)),
        "curriculum.lessons.add" => Some(handle_item_add(state, req, engine::add_lesson)),
        "curriculum.lessons.update" => Some(handle_item_update(
            state,
            req,
            LessonField::parse,
            engine::update_lesson,
        )),
        "curriculum.lessons.delete" => Some(handle_item_delete(state, req, engine::delete_lesson)),
        "curriculum.quizzes.add" => Some(handle_item_add(state, req, engine::add_quiz)),
        "curriculum.quizzes.update" => Some(handle_item_update(
            state,
            req,
            QuizField::parse,
            engine::update_quiz,
        )),
        "curriculum.quizzes.delete" => Some(handle_item_delete(state, req, engine::delete_quiz)),
        "curriculum.assignments.add" => Some(handle_item_add(state, req, engine::add_assignment)),
        "curriculum.assignments.update" => Some(handle_item_update(
            state,
            req,
            AssignmentField::parse,
            engine::update_assignment,
        )),
        "curriculum.assignments.delete" => {
            Some(handle_item_delete(state, req, engine::delete_assignment))
        }
        "curriculum.resources.add" => Some(handle_item_add(state, req, engine::add_resource)),
        "curriculum.resources.update" => Some(handle_item_update(
            state,
            req,
            ResourceField::parse,
            engine::update_resource,
        )),
        "curriculum.resources.delete" => {
            Some(handle_item_delete(state, req, engine::delete_resource))
        }
        "curriculum.resources.attachUpload" => Some(handle_resources_attach_upload(state, req)),
        _ => None,
    }
}
