//! Tag engine. Rules are scoped to audiences, content types and regions by name.
//!
//! A tag is either the literal `"Global"` or the name of some entity. Renames and
//! duplications have to be pushed through the tag lists so associations survive.

use crate::domain::entities::{Document, RuleOwner, Sample, WritingRule};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Tag carried by global rules.
pub const GLOBAL_TAG: &str = "Global";

/// Lowercase spelling found in older documents.
const LEGACY_GLOBAL_TAG: &str = "global";

const COPY_SUFFIX: &str = " (Copy)";

pub fn is_global_tag(tag: &str) -> bool {
    tag == GLOBAL_TAG || tag == LEGACY_GLOBAL_TAG
}

/// Scope derived from a rule's tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleScope {
    Global,
    Specific,
    Untagged,
}

impl RuleScope {
    pub fn of(rule: &WritingRule) -> Self {
        if rule.tags.iter().any(|t| is_global_tag(t)) {
            RuleScope::Global
        } else if rule.tags.is_empty() {
            RuleScope::Untagged
        } else {
            RuleScope::Specific
        }
    }
}

/// How far an entity rename reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenameScope {
    /// Only the renamed entity's own rules and samples.
    #[default]
    OwnRules,
    /// Every rule list in the document, plus competitor region lists for regions.
    Document,
}

impl FromStr for RenameScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "own" | "own_rules" | "own-rules" => Ok(RenameScope::OwnRules),
            "document" | "all" => Ok(RenameScope::Document),
            other => Err(format!("unknown rename scope '{}'", other)),
        }
    }
}

impl fmt::Display for RenameScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenameScope::OwnRules => f.write_str("own"),
            RenameScope::Document => f.write_str("document"),
        }
    }
}

/// Name given to a duplicated entity.
pub fn copy_name(name: &str) -> String {
    format!("{}{}", name, COPY_SUFFIX)
}

fn rename_in(tags: &mut [String], old: &str, new: &str) -> usize {
    let mut rewritten = 0;
    for tag in tags.iter_mut().filter(|t| t.as_str() == old) {
        *tag = new.to_string();
        rewritten += 1;
    }
    rewritten
}

/// Rewrites every `old` tag to `new` in place. Ids and order are untouched.
pub fn rename_tag(rules: &mut [WritingRule], old: &str, new: &str) -> usize {
    if old == new {
        return 0;
    }
    rules
        .iter_mut()
        .map(|rule| rename_in(&mut rule.tags, old, new))
        .sum()
}

pub fn rename_sample_tags(samples: &mut [Sample], old: &str, new: &str) -> usize {
    if old == new {
        return 0;
    }
    samples
        .iter_mut()
        .map(|sample| rename_in(&mut sample.tags, old, new))
        .sum()
}

/// Global rules, then each audience, content type and region list.
pub(crate) fn rule_lists_mut(doc: &mut Document) -> impl Iterator<Item = &mut Vec<WritingRule>> + '_ {
    std::iter::once(&mut doc.brand_foundations.writing_rules)
        .chain(doc.audiences.iter_mut().map(|a| &mut a.writing_rules))
        .chain(doc.content_types.iter_mut().map(|c| &mut c.content_type_rules))
        .chain(doc.regions.iter_mut().map(|r| &mut r.writing_rules))
}

/// Rename across every rule list in the document.
pub fn rename_tag_everywhere(doc: &mut Document, old: &str, new: &str) -> usize {
    rule_lists_mut(doc)
        .map(|rules| rename_tag(rules, old, new))
        .sum()
}

pub fn rename_competitor_regions(doc: &mut Document, old: &str, new: &str) -> usize {
    if old == new {
        return 0;
    }
    doc.product_lines
        .iter_mut()
        .flat_map(|p| p.competitors.iter_mut())
        .map(|c| rename_in(&mut c.regions, old, new))
        .sum()
}

/// Duplication cascade: every rule tagged `original` also gets `copy`.
///
/// Tags are appended, never moved, so the rule applies to both entities.
pub fn append_tag_everywhere(doc: &mut Document, original: &str, copy: &str) -> usize {
    let mut touched = 0;
    for rules in rule_lists_mut(doc) {
        for rule in rules.iter_mut().filter(|r| r.has_tag(original)) {
            rule.tags.push(copy.to_string());
            touched += 1;
        }
    }
    touched
}

/// Where a rule sits: owning collection plus its key within it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleRef {
    pub owner: RuleOwner,
    pub rule_key: String,
}

/// Read model mapping each tag to the rules carrying it.
#[derive(Debug, Default)]
pub struct TagIndex {
    by_tag: BTreeMap<String, Vec<RuleRef>>,
}

impl TagIndex {
    pub fn build(doc: &Document) -> Self {
        let mut index = TagIndex::default();
        index.add_all(RuleOwner::Global, &doc.brand_foundations.writing_rules);
        for a in &doc.audiences {
            index.add_all(RuleOwner::Audience(a.id), &a.writing_rules);
        }
        for c in &doc.content_types {
            index.add_all(RuleOwner::ContentType(c.id), &c.content_type_rules);
        }
        for r in &doc.regions {
            index.add_all(RuleOwner::Region(r.id), &r.writing_rules);
        }
        index
    }

    fn add_all(&mut self, owner: RuleOwner, rules: &[WritingRule]) {
        for rule in rules {
            for tag in &rule.tags {
                let refs = self.by_tag.entry(tag.clone()).or_default();
                let rule_ref = RuleRef {
                    owner,
                    rule_key: rule.key().into_owned(),
                };
                if !refs.contains(&rule_ref) {
                    refs.push(rule_ref);
                }
            }
        }
    }

    pub fn rules_tagged(&self, tag: &str) -> &[RuleRef] {
        self.by_tag.get(tag).map(Vec::as_slice).unwrap_or(&[])
    }

    /// References to `tag` held outside `owner`'s own list. These are what an own-rules rename leaves behind.
    pub fn foreign_references(&self, tag: &str, owner: RuleOwner) -> Vec<&RuleRef> {
        self.rules_tagged(tag)
            .iter()
            .filter(|r| r.owner != owner)
            .collect()
    }
}
