//! Application use cases. Orchestrate domain logic via ports.

pub mod autosave;
pub mod editor;

pub use autosave::{Autosaver, SaveStatus};
pub use editor::EditorService;
