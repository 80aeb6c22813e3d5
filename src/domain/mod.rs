//! Core domain layer. No I/O.
//!
//! The document model, the tag engine that keeps rule tags in sync with entity
//! names, the document reducer and the aggregated rule view.

pub mod actions;
pub mod entities;
pub mod errors;
pub mod rule_draft;
pub mod rules_view;
pub mod seeds;
pub mod tags;

pub use actions::{Action, BrandField, Feature, NewEntity, ReduceOptions, reduce};
pub use entities::{
    Audience, BrandFoundations, Competitor, ContentType, Document, Entity, EntityId, EntityKind,
    ProductLine, Region, RuleOwner, Sample, WritingRule,
};
pub use errors::DomainError;
pub use rule_draft::{RuleDraft, ScopeMode};
pub use rules_view::{AggregatedRule, LocationKind, RuleLocation, TagGroup, collect_all_rules, group_by_tag};
pub use seeds::{DatasetVersion, seed_document};
pub use tags::{GLOBAL_TAG, RenameScope, RuleScope, TagIndex};
