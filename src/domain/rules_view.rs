//! "All writing rules" view. Pure function of the document, recomputed on demand.
//!
//! Rules are collected from every scope in a fixed order (global, audiences,
//! content types, regions) and deduplicated by key. A rule that sits in two lists
//! with the same id shows up once with two locations.

use crate::domain::entities::{Document, RuleOwner, WritingRule};
use crate::domain::tags::{GLOBAL_TAG, RuleScope};
use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Bucket for rules without tags in the grouped view.
pub const UNTAGGED: &str = "Untagged";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationKind {
    Global,
    Audience,
    ContentType,
    Region,
}

impl fmt::Display for LocationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LocationKind::Global => "Global",
            LocationKind::Audience => "Audience",
            LocationKind::ContentType => "Content type",
            LocationKind::Region => "Region",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleLocation {
    pub kind: LocationKind,
    pub name: String,
    /// Array index of the owning entity (0 for the global list).
    pub source_index: usize,
    pub owner: RuleOwner,
}

impl fmt::Display for RuleLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            LocationKind::Global => f.write_str(GLOBAL_TAG),
            kind => write!(f, "{}: {}", kind, self.name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatedRule {
    pub rule: WritingRule,
    pub locations: Vec<RuleLocation>,
}

impl AggregatedRule {
    pub fn key(&self) -> Cow<'_, str> {
        self.rule.key()
    }

    pub fn scope(&self) -> RuleScope {
        RuleScope::of(&self.rule)
    }

    /// Owner that edit and delete act on: the first location in scan order.
    pub fn primary_owner(&self) -> Option<RuleOwner> {
        self.locations.first().map(|l| l.owner)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagGroup {
    pub tag: String,
    pub rules: Vec<AggregatedRule>,
}

/// Every rule in the document, deduplicated by key, in first-seen order.
pub fn collect_all_rules(doc: &Document) -> Vec<AggregatedRule> {
    let mut out: Vec<AggregatedRule> = Vec::new();
    let mut slots: HashMap<String, usize> = HashMap::new();

    let mut visit = |rules: &[WritingRule], location: RuleLocation| {
        for rule in rules {
            let slot = *slots.entry(rule.key().into_owned()).or_insert_with(|| {
                out.push(AggregatedRule {
                    rule: rule.clone(),
                    locations: Vec::new(),
                });
                out.len() - 1
            });
            out[slot].locations.push(location.clone());
        }
    };

    visit(
        &doc.brand_foundations.writing_rules,
        RuleLocation {
            kind: LocationKind::Global,
            name: GLOBAL_TAG.to_string(),
            source_index: 0,
            owner: RuleOwner::Global,
        },
    );
    for (i, a) in doc.audiences.iter().enumerate() {
        visit(
            &a.writing_rules,
            RuleLocation {
                kind: LocationKind::Audience,
                name: a.name.clone(),
                source_index: i,
                owner: RuleOwner::Audience(a.id),
            },
        );
    }
    for (i, c) in doc.content_types.iter().enumerate() {
        visit(
            &c.content_type_rules,
            RuleLocation {
                kind: LocationKind::ContentType,
                name: c.name.clone(),
                source_index: i,
                owner: RuleOwner::ContentType(c.id),
            },
        );
    }
    for (i, r) in doc.regions.iter().enumerate() {
        visit(
            &r.writing_rules,
            RuleLocation {
                kind: LocationKind::Region,
                name: r.name.clone(),
                source_index: i,
                owner: RuleOwner::Region(r.id),
            },
        );
    }

    out
}

/// Re-partitions rules by tag. A rule lands once in each of its tags' buckets;
/// untagged rules go to [`UNTAGGED`].
pub fn group_by_tag(rules: &[AggregatedRule]) -> Vec<TagGroup> {
    let mut groups: Vec<TagGroup> = Vec::new();
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut placed: HashSet<(usize, String)> = HashSet::new();

    for rule in rules {
        let tags: Vec<&str> = if rule.rule.tags.is_empty() {
            vec![UNTAGGED]
        } else {
            rule.rule.tags.iter().map(String::as_str).collect()
        };
        for tag in tags {
            let slot = *slots.entry(tag.to_string()).or_insert_with(|| {
                groups.push(TagGroup {
                    tag: tag.to_string(),
                    rules: Vec::new(),
                });
                groups.len() - 1
            });
            if placed.insert((slot, rule.key().into_owned())) {
                groups[slot].rules.push(rule.clone());
            }
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Audience, ContentType, Region};

    fn sample_doc() -> Document {
        let mut doc = Document::empty();
        doc.brand_foundations
            .writing_rules
            .push(WritingRule::new("Commas", "Oxford comma", ["Global"]));

        let shared = WritingRule::new("Short", "Keep it short", ["Gen Z", "Email"]);
        let mut a = Audience::named("Gen Z");
        a.writing_rules.push(shared.clone());
        doc.audiences.push(a);

        let mut c = ContentType::named("Email");
        c.content_type_rules.push(shared);
        c.content_type_rules
            .push(WritingRule::new("Subject", "Under 50 chars", ["Email"]));
        doc.content_types.push(c);

        let mut r = Region::named("EMEA");
        r.writing_rules.push(WritingRule {
            id: String::new(),
            name: "Spelling".to_string(),
            description: "British spelling".to_string(),
            tags: Vec::new(),
        });
        doc.regions.push(r);
        doc
    }

    #[test]
    fn test_same_id_collapses_to_one_row_with_two_locations() {
        let rules = collect_all_rules(&sample_doc());
        assert_eq!(rules.len(), 4);

        let shared = rules.iter().find(|r| r.rule.name == "Short").unwrap();
        assert_eq!(shared.locations.len(), 2);
        assert_eq!(shared.locations[0].kind, LocationKind::Audience);
        assert_eq!(shared.locations[1].kind, LocationKind::ContentType);
        assert_eq!(shared.locations[1].to_string(), "Content type: Email");
        assert_eq!(shared.primary_owner(), Some(shared.locations[0].owner));
    }

    #[test]
    fn test_scan_order_is_global_first() {
        let rules = collect_all_rules(&sample_doc());
        let names: Vec<&str> = rules.iter().map(|r| r.rule.name.as_str()).collect();
        assert_eq!(names, vec!["Commas", "Short", "Subject", "Spelling"]);
        assert_eq!(rules[0].scope(), RuleScope::Global);
    }

    #[test]
    fn test_collection_is_pure() {
        let doc = sample_doc();
        assert_eq!(collect_all_rules(&doc), collect_all_rules(&doc));
    }

    #[test]
    fn test_distinct_ids_stay_separate_rows() {
        let mut doc = Document::empty();
        let mut a = Audience::named("A");
        a.writing_rules.push(WritingRule::new("r", "same text", ["A"]));
        doc.audiences.push(a);
        let mut b = Audience::named("B");
        b.writing_rules.push(WritingRule::new("r", "same text", ["B"]));
        doc.audiences.push(b);

        assert_eq!(collect_all_rules(&doc).len(), 2);
    }

    #[test]
    fn test_group_by_tag_partitions_every_rule() {
        let rules = collect_all_rules(&sample_doc());
        let groups = group_by_tag(&rules);

        let tags: Vec<&str> = groups.iter().map(|g| g.tag.as_str()).collect();
        assert_eq!(tags, vec!["Global", "Gen Z", "Email", UNTAGGED]);

        for rule in &rules {
            let appearances = groups
                .iter()
                .filter(|g| g.rules.iter().any(|r| r.key() == rule.key()))
                .count();
            let expected = rule.rule.tags.len().max(1);
            assert_eq!(appearances, expected, "rule {}", rule.rule.name);
        }

        let union: HashSet<String> = groups
            .iter()
            .flat_map(|g| g.rules.iter().map(|r| r.key().into_owned()))
            .collect();
        assert_eq!(union.len(), rules.len());
    }

    #[test]
    fn test_group_dedups_repeated_tags() {
        let rules = vec![AggregatedRule {
            rule: WritingRule::new("r", "d", ["A", "A"]),
            locations: Vec::new(),
        }];
        let groups = group_by_tag(&rules);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].rules.len(), 1);
    }
}
