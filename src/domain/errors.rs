//! Domain errors. Used by ports, use cases and adapters.
//!
//! Adapters map infrastructure errors into these.

use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Storage error: {0}")]
    Store(String),

    /// An entity, rule, sample or competitor addressed by id or index does not exist.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// Empty description, or a specific rule with no tags.
    #[error("Invalid writing rule: {0}")]
    InvalidRule(String),

    #[error("Import failed: {0}")]
    Import(String),

    #[error("Export failed: {0}")]
    Export(String),

    #[error("UI error: {0}")]
    Ui(String),
}

impl DomainError {
    pub fn not_found(kind: &'static str, id: impl fmt::Display) -> Self {
        DomainError::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}
