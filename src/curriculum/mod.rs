pub mod engine;
pub mod error;
pub mod fields;
pub mod ids;
pub mod model;
pub mod revision;
pub mod validate;
pub mod view_state;

pub use error::EditError;
pub use model::Curriculum;
pub use view_state::ExpandedWeeks;
