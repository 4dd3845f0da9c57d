use crate::curriculum::engine::{ItemPath, SectionPath};
use crate::curriculum::revision::revision;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use serde_json::{json, Value as JsonValue};

pub fn required_index(req: &Request, key: &str) -> Result<usize, JsonValue> {
    let Some(v) = req.params.get(key) else {
        return Err(err(&req.id, "bad_params", format!("missing {}", key), None));
    };
    v.as_u64()
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| {
            err(
                &req.id,
                "bad_params",
                format!("{} must be a non-negative integer", key),
                None,
            )
        })
}

pub fn section_path(req: &Request) -> Result<SectionPath, JsonValue> {
    Ok(SectionPath {
        week: required_index(req, "weekIndex")?,
        section: required_index(req, "sectionIndex")?,
    })
}

pub fn item_path(req: &Request) -> Result<ItemPath, JsonValue> {
    let section = section_path(req)?;
    Ok(ItemPath {
        week: section.week,
        section: section.section,
        item: required_index(req, "itemIndex")?,
    })
}

/// `field` is required; a missing `value` reads as null.
pub fn field_update(req: &Request) -> Result<(String, JsonValue), JsonValue> {
    let field = req
        .params
        .get("field")
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| err(&req.id, "bad_params", "missing field", None))?;
    let value = req.params.get("value").cloned().unwrap_or(JsonValue::Null);
    Ok((field, value))
}

/// The "curriculum changed" payload: the full tree, its revision and the
/// expansion state resolved against it.
pub fn snapshot(state: &AppState, req: &Request) -> JsonValue {
    let curriculum = match serde_json::to_value(&state.curriculum) {
        Ok(v) => v,
        Err(e) => return err(&req.id, "serialize_failed", e.to_string(), None),
    };
    let revision = match revision(&state.curriculum) {
        Ok(v) => v,
        Err(e) => return err(&req.id, "serialize_failed", e.to_string(), None),
    };
    ok(
        &req.id,
        json!({
            "curriculum": curriculum,
            "revision": revision,
            "expandedWeekIndices": state.expanded.expanded_indices(&state.curriculum),
        }),
    )
}
