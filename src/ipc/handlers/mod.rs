pub mod core;
pub mod curriculum;
pub mod setup;
pub mod view;
