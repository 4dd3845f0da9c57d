use crate::curriculum::validate::{self, has_errors};
use crate::curriculum::Curriculum;
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::snapshot;
use crate::ipc::types::{AppState, Request};
use serde_json::json;
use tracing::{info, warn};

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "empty": state.curriculum.is_empty(),
            "weekCount": state.curriculum.len(),
        }),
    )
}

/// Replaces the session tree with a snapshot supplied by the host. Trees that
/// break id invariants are refused whole.
fn handle_curriculum_load(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(raw) = req.params.get("curriculum") else {
        return err(&req.id, "bad_params", "missing curriculum", None);
    };
    let loaded: Curriculum = if raw.is_null() {
        Curriculum::new()
    } else {
        match serde_json::from_value(raw.clone()) {
            Ok(v) => v,
            Err(e) => return err(&req.id, "bad_params", format!("curriculum {}", e), None),
        }
    };
    let issues = validate::check(&loaded);
    if has_errors(&issues) {
        warn!(issues = issues.len(), "curriculum load refused");
        return err(
            &req.id,
            "validation_failed",
            "curriculum breaks id invariants",
            Some(json!({ "issues": issues })),
        );
    }
    info!(
        weeks = loaded.len(),
        nodes = loaded.ids().len(),
        "curriculum loaded"
    );
    state.curriculum = loaded;
    state.expanded = state.expanded.prune(&state.curriculum);
    snapshot(state, req)
}

fn handle_curriculum_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    snapshot(state, req)
}

fn handle_curriculum_validate(state: &mut AppState, req: &Request) -> serde_json::Value {
    let issues = validate::check(&state.curriculum);
    ok(
        &req.id,
        json!({
            "valid": issues.is_empty(),
            "issues": issues,
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "curriculum.load" => Some(handle_curriculum_load(state, req)),
        "curriculum.get" => Some(handle_curriculum_get(state, req)),
        "curriculum.validate" => Some(handle_curriculum_validate(state, req)),
        _ => None,
    }
}
