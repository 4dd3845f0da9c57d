use crate::curriculum::ids::{Clock, IdGenerator};
use crate::curriculum::{Curriculum, ExpandedWeeks};
use crate::setup::EditorDefaults;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// The one editing session this process serves. It is the only owner of the
/// tree; handlers replace `curriculum` wholesale after each edit.
pub struct AppState {
    pub curriculum: Curriculum,
    pub expanded: ExpandedWeeks,
    pub defaults: EditorDefaults,
    pub ids: Box<dyn IdGenerator>,
    pub clock: Box<dyn Clock>,
}
