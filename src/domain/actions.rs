//! Document reducer. Every mutation is `(document, action) -> document`.
//!
//! Entities are addressed by id; samples and competitors by position inside
//! their owner. Rename and duplicate run the tag cascades from `tags`.

use crate::domain::entities::{
    Audience, Competitor, ContentType, Document, Entity, EntityId, EntityKind, ProductLine, Region,
    RuleOwner, Sample,
};
use crate::domain::errors::DomainError;
use crate::domain::rule_draft::RuleDraft;
use crate::domain::tags::{self, RenameScope};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrandField {
    Name,
    Domain,
    Icon,
    HeaderImage,
    About,
    StoryAndPurpose,
    ToneAndVoice,
}

impl BrandField {
    pub const ALL: [BrandField; 7] = [
        BrandField::Name,
        BrandField::Domain,
        BrandField::Icon,
        BrandField::HeaderImage,
        BrandField::About,
        BrandField::StoryAndPurpose,
        BrandField::ToneAndVoice,
    ];

    pub fn label(self) -> &'static str {
        match self {
            BrandField::Name => "Brand name",
            BrandField::Domain => "Brand domain",
            BrandField::Icon => "Brand icon",
            BrandField::HeaderImage => "Header image",
            BrandField::About => "About your brand",
            BrandField::StoryAndPurpose => "Brand story and purpose",
            BrandField::ToneAndVoice => "Brand tone and voice",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    Audiences,
    Regions,
}

/// A whole entity, for add and replace.
#[derive(Debug, Clone, PartialEq)]
pub enum NewEntity {
    ProductLine(ProductLine),
    Audience(Audience),
    ContentType(ContentType),
    Region(Region),
}

impl NewEntity {
    pub fn kind(&self) -> EntityKind {
        match self {
            NewEntity::ProductLine(_) => EntityKind::ProductLine,
            NewEntity::Audience(_) => EntityKind::Audience,
            NewEntity::ContentType(_) => EntityKind::ContentType,
            NewEntity::Region(_) => EntityKind::Region,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SetBrandField(BrandField, String),
    SetBrandColors(Vec<String>),
    SetFeature(Feature, bool),

    AddEntity(NewEntity),
    /// Whole-object replace by the entity's id. Cascades when the name changed.
    UpdateEntity(NewEntity),
    RenameEntity {
        kind: EntityKind,
        id: EntityId,
        name: String,
    },
    DeleteEntity {
        kind: EntityKind,
        id: EntityId,
    },
    DuplicateEntity {
        kind: EntityKind,
        id: EntityId,
    },

    AddRule {
        owner: RuleOwner,
        draft: RuleDraft,
    },
    /// Saving a Global draft against a non-global owner moves the rule to the global list.
    SaveRule {
        owner: RuleOwner,
        rule_key: String,
        draft: RuleDraft,
    },
    DeleteRule {
        owner: RuleOwner,
        rule_key: String,
    },

    AddSample {
        content_type: EntityId,
        sample: Sample,
    },
    UpdateSample {
        content_type: EntityId,
        index: usize,
        sample: Sample,
    },
    DeleteSample {
        content_type: EntityId,
        index: usize,
    },

    AddCompetitor {
        product_line: EntityId,
        competitor: Competitor,
    },
    UpdateCompetitor {
        product_line: EntityId,
        index: usize,
        competitor: Competitor,
    },
    DeleteCompetitor {
        product_line: EntityId,
        index: usize,
    },
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ReduceOptions {
    pub rename_scope: RenameScope,
}

/// Applies `action` to a copy of `doc`. The input document is never touched.
pub fn reduce(
    doc: &Document,
    action: Action,
    options: &ReduceOptions,
) -> Result<Document, DomainError> {
    let mut next = doc.clone();
    apply(&mut next, action, options)?;
    Ok(next)
}

fn apply(doc: &mut Document, action: Action, options: &ReduceOptions) -> Result<(), DomainError> {
    match action {
        Action::SetBrandField(field, value) => {
            let foundations = &mut doc.brand_foundations;
            let slot = match field {
                BrandField::Name => &mut foundations.brand_name,
                BrandField::Domain => &mut foundations.brand_domain,
                BrandField::Icon => &mut foundations.brand_icon,
                BrandField::HeaderImage => &mut foundations.brand_header_image,
                BrandField::About => &mut foundations.about_your_brand,
                BrandField::StoryAndPurpose => &mut foundations.brand_story_and_purpose,
                BrandField::ToneAndVoice => &mut foundations.brand_tone_and_voice,
            };
            *slot = value;
        }
        Action::SetBrandColors(colors) => doc.brand_foundations.brand_colors = colors,
        Action::SetFeature(Feature::Audiences, on) => doc.brand_foundations.enable_audiences = on,
        Action::SetFeature(Feature::Regions, on) => doc.brand_foundations.enable_regions = on,

        Action::AddEntity(entity) => match entity {
            NewEntity::ProductLine(e) => add(doc, e),
            NewEntity::Audience(e) => add(doc, e),
            NewEntity::ContentType(e) => add(doc, e),
            NewEntity::Region(e) => add(doc, e),
        },
        Action::UpdateEntity(entity) => {
            let scope = options.rename_scope;
            match entity {
                NewEntity::ProductLine(e) => update(doc, e, scope)?,
                NewEntity::Audience(e) => update(doc, e, scope)?,
                NewEntity::ContentType(e) => update(doc, e, scope)?,
                NewEntity::Region(e) => update(doc, e, scope)?,
            }
        }
        Action::RenameEntity { kind, id, name } => {
            let scope = options.rename_scope;
            match kind {
                EntityKind::ProductLine => rename::<ProductLine>(doc, id, name, scope)?,
                EntityKind::Audience => rename::<Audience>(doc, id, name, scope)?,
                EntityKind::ContentType => rename::<ContentType>(doc, id, name, scope)?,
                EntityKind::Region => rename::<Region>(doc, id, name, scope)?,
            }
        }
        Action::DeleteEntity { kind, id } => match kind {
            EntityKind::ProductLine => delete::<ProductLine>(doc, id)?,
            EntityKind::Audience => delete::<Audience>(doc, id)?,
            EntityKind::ContentType => delete::<ContentType>(doc, id)?,
            EntityKind::Region => delete::<Region>(doc, id)?,
        },
        Action::DuplicateEntity { kind, id } => {
            match kind {
                EntityKind::ProductLine => duplicate::<ProductLine>(doc, id)?,
                EntityKind::Audience => duplicate::<Audience>(doc, id)?,
                EntityKind::ContentType => duplicate::<ContentType>(doc, id)?,
                EntityKind::Region => duplicate::<Region>(doc, id)?,
            };
        }

        Action::AddRule { owner, draft } => add_rule(doc, owner, draft)?,
        Action::SaveRule {
            owner,
            rule_key,
            draft,
        } => save_rule(doc, owner, &rule_key, &draft)?,
        Action::DeleteRule { owner, rule_key } => {
            let rules = owner.rules_mut(doc)?;
            let pos = rules
                .iter()
                .position(|r| r.key() == rule_key.as_str())
                .ok_or_else(|| DomainError::not_found("Writing rule", &rule_key))?;
            rules.remove(pos);
        }

        Action::AddSample {
            content_type,
            mut sample,
        } => {
            let ct = find_mut::<ContentType>(doc, content_type)?;
            sample.tags = vec![ct.name.clone()];
            ct.samples.push(sample);
        }
        Action::UpdateSample {
            content_type,
            index,
            sample,
        } => {
            let ct = find_mut::<ContentType>(doc, content_type)?;
            let slot = ct
                .samples
                .get_mut(index)
                .ok_or_else(|| DomainError::not_found("Sample", index))?;
            *slot = sample;
        }
        Action::DeleteSample {
            content_type,
            index,
        } => {
            let ct = find_mut::<ContentType>(doc, content_type)?;
            if index >= ct.samples.len() {
                return Err(DomainError::not_found("Sample", index));
            }
            ct.samples.remove(index);
        }

        Action::AddCompetitor {
            product_line,
            competitor,
        } => find_mut::<ProductLine>(doc, product_line)?
            .competitors
            .push(competitor),
        Action::UpdateCompetitor {
            product_line,
            index,
            competitor,
        } => {
            let pl = find_mut::<ProductLine>(doc, product_line)?;
            let slot = pl
                .competitors
                .get_mut(index)
                .ok_or_else(|| DomainError::not_found("Competitor", index))?;
            *slot = competitor;
        }
        Action::DeleteCompetitor {
            product_line,
            index,
        } => {
            let pl = find_mut::<ProductLine>(doc, product_line)?;
            if index >= pl.competitors.len() {
                return Err(DomainError::not_found("Competitor", index));
            }
            pl.competitors.remove(index);
        }
    }
    Ok(())
}

fn position<E: Entity>(doc: &Document, id: EntityId) -> Result<usize, DomainError> {
    E::list(doc)
        .iter()
        .position(|e| e.id() == id)
        .ok_or_else(|| DomainError::not_found(E::KIND.label(), id))
}

fn find_mut<E: Entity>(doc: &mut Document, id: EntityId) -> Result<&mut E, DomainError> {
    let idx = position::<E>(doc, id)?;
    Ok(&mut E::list_mut(doc)[idx])
}

fn add<E: Entity>(doc: &mut Document, entity: E) {
    E::list_mut(doc).push(entity);
}

fn delete<E: Entity>(doc: &mut Document, id: EntityId) -> Result<(), DomainError> {
    let idx = position::<E>(doc, id)?;
    E::list_mut(doc).remove(idx);
    Ok(())
}

fn update<E: Entity>(doc: &mut Document, entity: E, scope: RenameScope) -> Result<(), DomainError> {
    let idx = position::<E>(doc, entity.id())?;
    let old_name = E::list(doc)[idx].name().to_string();
    let new_name = entity.name().to_string();
    E::list_mut(doc)[idx] = entity;
    if old_name != new_name {
        cascade_rename::<E>(doc, idx, &old_name, &new_name, scope);
    }
    Ok(())
}

fn rename<E: Entity>(
    doc: &mut Document,
    id: EntityId,
    name: String,
    scope: RenameScope,
) -> Result<(), DomainError> {
    let idx = position::<E>(doc, id)?;
    let old_name = E::list(doc)[idx].name().to_string();
    if old_name == name {
        return Ok(());
    }
    E::list_mut(doc)[idx].set_name(name.clone());
    cascade_rename::<E>(doc, idx, &old_name, &name, scope);
    Ok(())
}

fn cascade_rename<E: Entity>(
    doc: &mut Document,
    idx: usize,
    old: &str,
    new: &str,
    scope: RenameScope,
) {
    let rewritten = match scope {
        RenameScope::OwnRules => E::list_mut(doc)[idx].rename_own_tags(old, new),
        RenameScope::Document => {
            let mut n = tags::rename_tag_everywhere(doc, old, new);
            n += E::list_mut(doc)[idx].rename_own_tags(old, new);
            if E::KIND == EntityKind::Region {
                n += tags::rename_competitor_regions(doc, old, new);
            }
            n
        }
    };
    debug!(
        kind = %E::KIND,
        old,
        new,
        scope = %scope,
        rewritten,
        "rename cascade"
    );
}

fn duplicate<E: Entity>(doc: &mut Document, id: EntityId) -> Result<EntityId, DomainError> {
    let idx = position::<E>(doc, id)?;
    let original = E::list(doc)[idx].name().to_string();
    let copy_name = tags::copy_name(&original);

    // Cascade first so the copy's cloned rules carry both tags too.
    let touched = tags::append_tag_everywhere(doc, &original, &copy_name);

    let mut copy = E::list(doc)[idx].clone();
    let copy_id = EntityId::fresh();
    copy.set_id(copy_id);
    copy.set_name(copy_name.clone());
    copy.after_duplicate(&original);
    E::list_mut(doc).push(copy);

    debug!(kind = %E::KIND, original = %original, copy = %copy_name, touched, "duplicate cascade");
    Ok(copy_id)
}

fn add_rule(doc: &mut Document, owner: RuleOwner, draft: RuleDraft) -> Result<(), DomainError> {
    if let Some(reason) = draft.validation_error() {
        return Err(DomainError::InvalidRule(reason.to_string()));
    }
    let target = if draft.is_global() {
        RuleOwner::Global
    } else {
        owner
    };
    target.rules_mut(doc)?.push(draft.into_rule());
    Ok(())
}

fn save_rule(
    doc: &mut Document,
    owner: RuleOwner,
    rule_key: &str,
    draft: &RuleDraft,
) -> Result<(), DomainError> {
    if let Some(reason) = draft.validation_error() {
        return Err(DomainError::InvalidRule(reason.to_string()));
    }
    let rules = owner.rules_mut(doc)?;
    let pos = rules
        .iter()
        .position(|r| r.key() == rule_key)
        .ok_or_else(|| DomainError::not_found("Writing rule", rule_key))?;

    if draft.is_global() && owner != RuleOwner::Global {
        let mut rule = rules.remove(pos);
        draft.apply_to(&mut rule);
        debug!(rule_id = %rule.id, "moved rule to global list");
        doc.brand_foundations.writing_rules.push(rule);
    } else {
        draft.apply_to(&mut rules[pos]);
    }
    Ok(())
}
