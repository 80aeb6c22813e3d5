//! Exports of document data to external formats.

pub mod rules_csv;

pub use rules_csv::{rules_to_csv, write_rules_csv};
