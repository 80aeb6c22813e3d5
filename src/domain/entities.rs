//! Domain entities. The brand kit document and everything nested in it.
//!
//! Wire format is camelCase JSON; missing lists and strings default to empty so
//! older blobs still deserialize.

use crate::domain::errors::DomainError;
use crate::domain::tags;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashSet;
use std::fmt;
use uuid::Uuid;

/// Stable identity for top-level entities (product lines, audiences, content types, regions).
///
/// Blobs written before ids existed get a fresh id on load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(Uuid);

impl EntityId {
    pub fn fresh() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::fresh()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The root aggregate. Exactly one per session.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default)]
    pub brand_foundations: BrandFoundations,
    #[serde(default)]
    pub product_lines: Vec<ProductLine>,
    #[serde(default)]
    pub content_types: Vec<ContentType>,
    #[serde(default)]
    pub audiences: Vec<Audience>,
    #[serde(default)]
    pub regions: Vec<Region>,
    /// Opaque example payloads; carried through load/save untouched.
    #[serde(default)]
    pub examples: Vec<serde_json::Value>,
    /// Legacy top-level rule list. Never edited.
    #[serde(default)]
    pub writing_rules: Vec<WritingRule>,
}

impl Document {
    /// The empty schema: no entities, both feature flags on.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn find<E: Entity>(&self, id: EntityId) -> Option<&E> {
        E::list(self).iter().find(|e| e.id() == id)
    }

    /// `(id, name)` pairs for every entity of `kind`, in array order.
    pub fn entity_summaries(&self, kind: EntityKind) -> Vec<(EntityId, String)> {
        fn summarize<E: Entity>(doc: &Document) -> Vec<(EntityId, String)> {
            E::list(doc)
                .iter()
                .map(|e| (e.id(), e.name().to_string()))
                .collect()
        }
        match kind {
            EntityKind::ProductLine => summarize::<ProductLine>(self),
            EntityKind::Audience => summarize::<Audience>(self),
            EntityKind::ContentType => summarize::<ContentType>(self),
            EntityKind::Region => summarize::<Region>(self),
        }
    }

    /// Names a specific rule may be tagged with. Disabled features contribute nothing.
    pub fn tag_choices(&self) -> Vec<String> {
        let mut choices = Vec::new();
        if self.brand_foundations.enable_audiences {
            choices.extend(self.audiences.iter().map(|a| a.name.clone()));
        }
        choices.extend(self.content_types.iter().map(|c| c.name.clone()));
        if self.brand_foundations.enable_regions {
            choices.extend(self.regions.iter().map(|r| r.name.clone()));
        }
        let mut seen = HashSet::new();
        choices.retain(|name| !name.is_empty() && seen.insert(name.clone()));
        choices
    }

    pub fn region_names(&self) -> Vec<String> {
        self.regions.iter().map(|r| r.name.clone()).collect()
    }
}

/// Brand identity, narrative fields, global writing rules and feature flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandFoundations {
    #[serde(default)]
    pub brand_name: String,
    #[serde(default)]
    pub brand_domain: String,
    /// Emoji, URL or base64 data URL.
    #[serde(default)]
    pub brand_icon: String,
    #[serde(default)]
    pub brand_header_image: String,
    #[serde(default)]
    pub brand_colors: Vec<String>,
    #[serde(default)]
    pub about_your_brand: String,
    #[serde(default)]
    pub brand_story_and_purpose: String,
    #[serde(default)]
    pub brand_tone_and_voice: String,
    /// Global rules. By convention each one is tagged exactly `["Global"]`.
    #[serde(default)]
    pub writing_rules: Vec<WritingRule>,
    #[serde(default = "default_true")]
    pub enable_audiences: bool,
    #[serde(default = "default_true")]
    pub enable_regions: bool,
}

fn default_true() -> bool {
    true
}

impl Default for BrandFoundations {
    fn default() -> Self {
        Self {
            brand_name: String::new(),
            brand_domain: String::new(),
            brand_icon: String::new(),
            brand_header_image: String::new(),
            brand_colors: Vec::new(),
            about_your_brand: String::new(),
            brand_story_and_purpose: String::new(),
            brand_tone_and_voice: String::new(),
            writing_rules: Vec::new(),
            enable_audiences: true,
            enable_regions: true,
        }
    }
}

/// A writing rule. Its scope is decided entirely by `tags`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WritingRule {
    /// Empty for legacy rules that were stored without an id.
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl WritingRule {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        tags: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            description: description.into(),
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }

    /// Identity used for dedup and lookups: the id, or `"{name}-{description}"` when there is none.
    pub fn key(&self) -> Cow<'_, str> {
        if self.id.is_empty() {
            Cow::Owned(format!("{}-{}", self.name, self.description))
        } else {
            Cow::Borrowed(&self.id)
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Competitor {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub domain: String,
    /// Region names. "All regions" is every current region name, not a sentinel.
    #[serde(default)]
    pub regions: Vec<String>,
}

impl Competitor {
    /// Competitor that applies to every region currently in `doc`.
    pub fn for_all_regions(
        name: impl Into<String>,
        domain: impl Into<String>,
        doc: &Document,
    ) -> Self {
        Self {
            name: name.into(),
            domain: domain.into(),
            regions: doc.region_names(),
        }
    }

    pub fn applies_to_all_regions(&self, doc: &Document) -> bool {
        !doc.regions.is_empty()
            && doc
                .regions
                .iter()
                .all(|r| self.regions.iter().any(|name| *name == r.name))
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductLine {
    #[serde(default)]
    pub id: EntityId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub product_line_details: String,
    #[serde(default)]
    pub key_differentiators_and_positioning: String,
    #[serde(default)]
    pub ideal_customers: String,
    #[serde(default)]
    pub competitors: Vec<Competitor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl ProductLine {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sample {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// File name of an uploaded document. The file itself is never read.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<String>,
    /// Name of the owning content type.
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentType {
    #[serde(default)]
    pub id: EntityId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub samples: Vec<Sample>,
    /// Markdown template text.
    #[serde(default)]
    pub brand_tone_and_voice: String,
    #[serde(default)]
    pub content_type_rules: Vec<WritingRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl ContentType {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Audience {
    #[serde(default)]
    pub id: EntityId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub writing_rules: Vec<WritingRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Audience {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    #[serde(default)]
    pub id: EntityId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub writing_rules: Vec<WritingRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Region {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    ProductLine,
    Audience,
    ContentType,
    Region,
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [
        EntityKind::ProductLine,
        EntityKind::Audience,
        EntityKind::ContentType,
        EntityKind::Region,
    ];

    pub fn label(self) -> &'static str {
        match self {
            EntityKind::ProductLine => "Product line",
            EntityKind::Audience => "Audience",
            EntityKind::ContentType => "Content type",
            EntityKind::Region => "Region",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Common surface of the four top-level entity lists.
pub trait Entity: Clone {
    const KIND: EntityKind;

    fn id(&self) -> EntityId;
    fn set_id(&mut self, id: EntityId);
    fn name(&self) -> &str;
    fn set_name(&mut self, name: String);

    fn list(doc: &Document) -> &Vec<Self>;
    fn list_mut(doc: &mut Document) -> &mut Vec<Self>;

    /// Rewrites `old` to `new` in the entity's own rules (and samples). Returns tags rewritten.
    fn rename_own_tags(&mut self, _old: &str, _new: &str) -> usize {
        0
    }

    /// Fix-ups applied to a fresh copy after its name was set.
    fn after_duplicate(&mut self, _original_name: &str) {}
}

impl Entity for ProductLine {
    const KIND: EntityKind = EntityKind::ProductLine;

    fn id(&self) -> EntityId {
        self.id
    }
    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn set_name(&mut self, name: String) {
        self.name = name;
    }
    fn list(doc: &Document) -> &Vec<Self> {
        &doc.product_lines
    }
    fn list_mut(doc: &mut Document) -> &mut Vec<Self> {
        &mut doc.product_lines
    }
}

impl Entity for Audience {
    const KIND: EntityKind = EntityKind::Audience;

    fn id(&self) -> EntityId {
        self.id
    }
    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn set_name(&mut self, name: String) {
        self.name = name;
    }
    fn list(doc: &Document) -> &Vec<Self> {
        &doc.audiences
    }
    fn list_mut(doc: &mut Document) -> &mut Vec<Self> {
        &mut doc.audiences
    }
    fn rename_own_tags(&mut self, old: &str, new: &str) -> usize {
        tags::rename_tag(&mut self.writing_rules, old, new)
    }
}

impl Entity for ContentType {
    const KIND: EntityKind = EntityKind::ContentType;

    fn id(&self) -> EntityId {
        self.id
    }
    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn set_name(&mut self, name: String) {
        self.name = name;
    }
    fn list(doc: &Document) -> &Vec<Self> {
        &doc.content_types
    }
    fn list_mut(doc: &mut Document) -> &mut Vec<Self> {
        &mut doc.content_types
    }
    fn rename_own_tags(&mut self, old: &str, new: &str) -> usize {
        tags::rename_tag(&mut self.content_type_rules, old, new)
            + tags::rename_sample_tags(&mut self.samples, old, new)
    }
    fn after_duplicate(&mut self, original_name: &str) {
        let name = self.name.clone();
        tags::rename_sample_tags(&mut self.samples, original_name, &name);
    }
}

impl Entity for Region {
    const KIND: EntityKind = EntityKind::Region;

    fn id(&self) -> EntityId {
        self.id
    }
    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn set_name(&mut self, name: String) {
        self.name = name;
    }
    fn list(doc: &Document) -> &Vec<Self> {
        &doc.regions
    }
    fn list_mut(doc: &mut Document) -> &mut Vec<Self> {
        &mut doc.regions
    }
    fn rename_own_tags(&mut self, old: &str, new: &str) -> usize {
        tags::rename_tag(&mut self.writing_rules, old, new)
    }
}

/// Which collection a writing rule lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleOwner {
    Global,
    Audience(EntityId),
    ContentType(EntityId),
    Region(EntityId),
}

impl RuleOwner {
    pub fn rules<'a>(&self, doc: &'a Document) -> Result<&'a Vec<WritingRule>, DomainError> {
        match *self {
            RuleOwner::Global => Ok(&doc.brand_foundations.writing_rules),
            RuleOwner::Audience(id) => doc
                .find::<Audience>(id)
                .map(|a| &a.writing_rules)
                .ok_or_else(|| DomainError::not_found(EntityKind::Audience.label(), id)),
            RuleOwner::ContentType(id) => doc
                .find::<ContentType>(id)
                .map(|c| &c.content_type_rules)
                .ok_or_else(|| DomainError::not_found(EntityKind::ContentType.label(), id)),
            RuleOwner::Region(id) => doc
                .find::<Region>(id)
                .map(|r| &r.writing_rules)
                .ok_or_else(|| DomainError::not_found(EntityKind::Region.label(), id)),
        }
    }

    pub fn rules_mut<'a>(
        &self,
        doc: &'a mut Document,
    ) -> Result<&'a mut Vec<WritingRule>, DomainError> {
        match *self {
            RuleOwner::Global => Ok(&mut doc.brand_foundations.writing_rules),
            RuleOwner::Audience(id) => doc
                .audiences
                .iter_mut()
                .find(|a| a.id == id)
                .map(|a| &mut a.writing_rules)
                .ok_or_else(|| DomainError::not_found(EntityKind::Audience.label(), id)),
            RuleOwner::ContentType(id) => doc
                .content_types
                .iter_mut()
                .find(|c| c.id == id)
                .map(|c| &mut c.content_type_rules)
                .ok_or_else(|| DomainError::not_found(EntityKind::ContentType.label(), id)),
            RuleOwner::Region(id) => doc
                .regions
                .iter_mut()
                .find(|r| r.id == id)
                .map(|r| &mut r.writing_rules)
                .ok_or_else(|| DomainError::not_found(EntityKind::Region.label(), id)),
        }
    }

    /// Display name of the owning entity; `"Global"` for the global list.
    pub fn display_name(&self, doc: &Document) -> Option<String> {
        match *self {
            RuleOwner::Global => Some(tags::GLOBAL_TAG.to_string()),
            RuleOwner::Audience(id) => doc.find::<Audience>(id).map(|a| a.name.clone()),
            RuleOwner::ContentType(id) => doc.find::<ContentType>(id).map(|c| c.name.clone()),
            RuleOwner::Region(id) => doc.find::<Region>(id).map(|r| r.name.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_enables_features() {
        let doc = Document::empty();
        assert!(doc.brand_foundations.enable_audiences);
        assert!(doc.brand_foundations.enable_regions);
        assert!(doc.product_lines.is_empty());
    }

    #[test]
    fn test_rule_key_falls_back_to_name_and_description() {
        let mut rule = WritingRule::new("Tone", "Be warm", ["Global"]);
        assert_eq!(rule.key(), rule.id.as_str());
        rule.id.clear();
        assert_eq!(rule.key(), "Tone-Be warm");
    }

    #[test]
    fn test_document_serializes_camel_case() {
        let mut doc = Document::empty();
        doc.content_types.push(ContentType::named("Email"));
        let json = serde_json::to_value(&doc).unwrap();
        assert!(json["brandFoundations"]["enableAudiences"].as_bool().unwrap());
        assert!(json["contentTypes"][0]["contentTypeRules"].is_array());
        assert!(json["contentTypes"][0].get("icon").is_none());
    }

    #[test]
    fn test_missing_entity_id_gets_fresh_one() {
        let json = r#"{"name": "Gen Z", "description": "", "writingRules": []}"#;
        let a: Audience = serde_json::from_str(json).unwrap();
        let b: Audience = serde_json::from_str(json).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_competitor_all_regions() {
        let mut doc = Document::empty();
        doc.regions.push(Region::named("EMEA"));
        doc.regions.push(Region::named("APAC"));
        let c = Competitor::for_all_regions("Mailchimp", "mailchimp.com", &doc);
        assert_eq!(c.regions, vec!["EMEA", "APAC"]);
        assert!(c.applies_to_all_regions(&doc));

        doc.regions.push(Region::named("LATAM"));
        assert!(!c.applies_to_all_regions(&doc));
    }

    #[test]
    fn test_tag_choices_respect_feature_flags() {
        let mut doc = Document::empty();
        doc.audiences.push(Audience::named("Gen Z"));
        doc.content_types.push(ContentType::named("Email"));
        doc.regions.push(Region::named("EMEA"));
        assert_eq!(doc.tag_choices(), vec!["Gen Z", "Email", "EMEA"]);

        doc.brand_foundations.enable_regions = false;
        doc.brand_foundations.enable_audiences = false;
        assert_eq!(doc.tag_choices(), vec!["Email"]);
    }

    #[test]
    fn test_rule_owner_lookup() {
        let mut doc = Document::empty();
        let audience = Audience::named("Gen Z");
        let id = audience.id;
        doc.audiences.push(audience);

        assert!(RuleOwner::Audience(id).rules(&doc).unwrap().is_empty());
        assert_eq!(
            RuleOwner::Audience(id).display_name(&doc).as_deref(),
            Some("Gen Z")
        );
        assert!(matches!(
            RuleOwner::Region(id).rules(&doc),
            Err(DomainError::NotFound { .. })
        ));
    }
}
