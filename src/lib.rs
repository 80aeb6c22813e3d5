//! brand-kit: local brand kit editor with Hexagonal Architecture.
//!
//! One JSON document holds brand foundations, product lines, audiences, content
//! types and regions, with writing rules linked to entities by tag name.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod shared;
pub mod usecases;
