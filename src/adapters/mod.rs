//! Infrastructure adapters. Implement outbound ports and drive inbound ones.
//!
//! Filesystem storage, HTTP lookups, file import/export, terminal UI. Map errors to DomainError.

pub mod export;
pub mod import;
pub mod persistence;
pub mod ui;
pub mod web;
