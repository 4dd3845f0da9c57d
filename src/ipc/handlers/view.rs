use crate::ipc::error::{edit_err, ok};
use crate::ipc::helpers::required_index;
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn view_result(state: &AppState, req: &Request) -> serde_json::Value {
    let weeks: Vec<serde_json::Value> = state
        .curriculum
        .weeks()
        .iter()
        .enumerate()
        .map(|(i, w)| {
            json!({
                "index": i,
                "id": w.id,
                "expanded": state.expanded.is_expanded(&w.id),
            })
        })
        .collect();
    ok(
        &req.id,
        json!({
            "expandedWeekIds": state.expanded.ids().collect::<Vec<_>>(),
            "expandedWeekIndices": state.expanded.expanded_indices(&state.curriculum),
            "weeks": weeks,
        }),
    )
}

fn handle_weeks_toggle(state: &mut AppState, req: &Request) -> serde_json::Value {
    let index = match required_index(req, "weekIndex") {
        Ok(v) => v,
        Err(e) => return e,
    };
    match state.expanded.toggle_index(&state.curriculum, index) {
        Ok(next) => {
            state.expanded = next;
            view_result(state, req)
        }
        Err(e) => edit_err(&req.id, &e),
    }
}

fn handle_weeks_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    view_result(state, req)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "view.weeks.toggle" => Some(handle_weeks_toggle(state, req)),
        "view.weeks.list" => Some(handle_weeks_list(state, req)),
        _ => None,
    }
}
