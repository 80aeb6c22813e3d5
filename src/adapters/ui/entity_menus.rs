//! Entity submenus: list, add, edit, rename, duplicate, delete, plus samples and competitors.

use super::prompts::{Choice, confirm, optional_text, pick_many, preview, report, select, text};
use super::tui::TuiInputPort;
use crate::adapters::import::attachment_from_input;
use crate::domain::{
    Action, Audience, Competitor, ContentType, Document, DomainError, EntityId, EntityKind,
    NewEntity, ProductLine, Region, RuleOwner, Sample, TagIndex,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntityAction {
    EditDetails,
    Rename,
    Duplicate,
    Delete,
    Rules,
    Samples,
    Competitors,
}

#[derive(Debug, Clone, Copy)]
enum ItemAction {
    Edit,
    Delete,
}

pub(super) fn plural(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::ProductLine => "Product lines",
        EntityKind::Audience => "Audiences",
        EntityKind::ContentType => "Content types",
        EntityKind::Region => "Regions",
    }
}

/// Owner of an entity's rule list. Product lines carry no rules.
pub(super) fn rule_owner(kind: EntityKind, id: EntityId) -> Option<RuleOwner> {
    match kind {
        EntityKind::ProductLine => None,
        EntityKind::Audience => Some(RuleOwner::Audience(id)),
        EntityKind::ContentType => Some(RuleOwner::ContentType(id)),
        EntityKind::Region => Some(RuleOwner::Region(id)),
    }
}

fn entity_actions_for(kind: EntityKind) -> Vec<Choice<EntityAction>> {
    let mut items = vec![
        Choice::new("Edit details", EntityAction::EditDetails),
        Choice::new("Rename", EntityAction::Rename),
    ];
    match kind {
        EntityKind::ProductLine => items.push(Choice::new("Competitors", EntityAction::Competitors)),
        EntityKind::ContentType => {
            items.push(Choice::new("Writing rules", EntityAction::Rules));
            items.push(Choice::new("Samples", EntityAction::Samples));
        }
        EntityKind::Audience | EntityKind::Region => {
            items.push(Choice::new("Writing rules", EntityAction::Rules))
        }
    }
    items.push(Choice::new("Duplicate", EntityAction::Duplicate));
    items.push(Choice::new("Delete", EntityAction::Delete));
    items
}

fn display_name(name: &str) -> &str {
    if name.trim().is_empty() {
        "(untitled)"
    } else {
        name
    }
}

/// Trimmed entity name, or `None` when blank. Blank names would rewrite tags to "".
fn entity_name(input: &str) -> Option<String> {
    let name = input.trim();
    (!name.is_empty()).then(|| name.to_string())
}

/// Edits `value` in place. Returns false when the user backed out.
fn edit_field(label: &str, value: &mut String) -> Result<bool, DomainError> {
    match text(label, value)? {
        Some(v) => {
            *value = v;
            Ok(true)
        }
        None => Ok(false),
    }
}

fn edit_optional(label: &str, value: &mut Option<String>) -> Result<bool, DomainError> {
    match optional_text(label, value.as_deref())? {
        Some(v) => {
            *value = v;
            Ok(true)
        }
        None => Ok(false),
    }
}

fn sample_label(i: usize, s: &Sample) -> String {
    match s.title.as_deref().filter(|t| !t.trim().is_empty()) {
        Some(title) => format!("{}. {}", i + 1, title),
        None => format!("{}. {}", i + 1, preview(&s.body, 40)),
    }
}

fn competitor_label(c: &Competitor, doc: &Document) -> String {
    let regions = if c.applies_to_all_regions(doc) {
        "all regions".to_string()
    } else {
        c.regions.join(", ")
    };
    format!("{} ({}) [{}]", display_name(&c.name), c.domain, regions)
}

impl TuiInputPort {
    pub(super) fn entity_menu(&self, kind: EntityKind) -> Result<(), DomainError> {
        loop {
            let doc = self.editor.snapshot();
            let mut items: Vec<Choice<Option<EntityId>>> = doc
                .entity_summaries(kind)
                .into_iter()
                .map(|(id, name)| Choice::new(display_name(&name), Some(id)))
                .collect();
            items.push(Choice::new(
                format!("+ Add {}", kind.label().to_lowercase()),
                None,
            ));

            match select(plural(kind), items)? {
                None => return Ok(()),
                Some(Some(id)) => self.entity_actions(kind, id)?,
                Some(None) => self.add_entity(kind)?,
            }
        }
    }

    fn add_entity(&self, kind: EntityKind) -> Result<(), DomainError> {
        let Some(name) = text(&format!("{} name", kind.label()), "")? else {
            return Ok(());
        };
        let Some(name) = entity_name(&name) else {
            println!("  A name is required.");
            return Ok(());
        };
        let entity = match kind {
            EntityKind::ProductLine => NewEntity::ProductLine(ProductLine::named(name)),
            EntityKind::Audience => NewEntity::Audience(Audience::named(name)),
            EntityKind::ContentType => NewEntity::ContentType(ContentType::named(name)),
            EntityKind::Region => NewEntity::Region(Region::named(name)),
        };
        report(self.editor.dispatch(Action::AddEntity(entity)))
    }

    fn entity_actions(&self, kind: EntityKind, id: EntityId) -> Result<(), DomainError> {
        loop {
            let doc = self.editor.snapshot();
            let Some((_, name)) = doc
                .entity_summaries(kind)
                .into_iter()
                .find(|(eid, _)| *eid == id)
            else {
                return Ok(());
            };

            let title = format!("{}: {}", kind.label(), display_name(&name));
            let Some(action) = select(&title, entity_actions_for(kind))? else {
                return Ok(());
            };
            match action {
                EntityAction::EditDetails => self.edit_details(kind, id, &doc)?,
                EntityAction::Rename => {
                    let Some(input) = text("New name", &name)? else {
                        continue;
                    };
                    let Some(new_name) = entity_name(&input) else {
                        println!("  A name is required.");
                        continue;
                    };
                    report(self.editor.dispatch(Action::RenameEntity {
                        kind,
                        id,
                        name: new_name,
                    }))?;
                    self.note_stale_tags(kind, id, &name);
                }
                EntityAction::Duplicate => {
                    report(self.editor.dispatch(Action::DuplicateEntity { kind, id }))?;
                    println!("  Duplicated '{}'.", display_name(&name));
                }
                EntityAction::Delete => {
                    let message = format!("Delete '{}'?", display_name(&name));
                    if confirm(&message, false)? == Some(true) {
                        report(self.editor.dispatch(Action::DeleteEntity { kind, id }))?;
                        return Ok(());
                    }
                }
                EntityAction::Rules => {
                    if let Some(owner) = rule_owner(kind, id) {
                        self.rules_menu(owner)?;
                    }
                }
                EntityAction::Samples => self.samples_menu(id)?,
                EntityAction::Competitors => self.competitors_menu(id)?,
            }
        }
    }

    /// Tells the user about rules outside the entity that still carry its old name.
    fn note_stale_tags(&self, kind: EntityKind, id: EntityId, old_name: &str) {
        let Some(owner) = rule_owner(kind, id) else {
            return;
        };
        let doc = self.editor.snapshot();
        let unchanged = doc
            .entity_summaries(kind)
            .into_iter()
            .any(|(eid, name)| eid == id && name == old_name);
        if unchanged {
            return;
        }
        let index = TagIndex::build(&doc);
        let stale = index.foreign_references(old_name, owner).len();
        if stale > 0 {
            println!(
                "  {} rule(s) elsewhere are still tagged '{}'.",
                stale, old_name
            );
        }
    }

    /// Prompts every non-name field, then replaces the entity in one update.
    fn edit_details(&self, kind: EntityKind, id: EntityId, doc: &Document) -> Result<(), DomainError> {
        let updated = match kind {
            EntityKind::ProductLine => {
                let Some(mut pl) = doc.find::<ProductLine>(id).cloned() else {
                    return Ok(());
                };
                let done = edit_field("Product line details", &mut pl.product_line_details)?
                    && edit_field(
                        "Key differentiators and positioning",
                        &mut pl.key_differentiators_and_positioning,
                    )?
                    && edit_field("Ideal customers", &mut pl.ideal_customers)?
                    && edit_optional("Icon", &mut pl.icon)?;
                done.then_some(NewEntity::ProductLine(pl))
            }
            EntityKind::Audience => {
                let Some(mut a) = doc.find::<Audience>(id).cloned() else {
                    return Ok(());
                };
                let done = edit_field("Description", &mut a.description)?
                    && edit_optional("Icon", &mut a.icon)?;
                done.then_some(NewEntity::Audience(a))
            }
            EntityKind::ContentType => {
                let Some(mut c) = doc.find::<ContentType>(id).cloned() else {
                    return Ok(());
                };
                let done = edit_field("Template (markdown)", &mut c.brand_tone_and_voice)?
                    && edit_optional("Icon", &mut c.icon)?;
                done.then_some(NewEntity::ContentType(c))
            }
            EntityKind::Region => {
                let Some(mut r) = doc.find::<Region>(id).cloned() else {
                    return Ok(());
                };
                let done = edit_field("Description", &mut r.description)?
                    && edit_optional("Flag", &mut r.flag)?;
                done.then_some(NewEntity::Region(r))
            }
        };
        match updated {
            Some(entity) => report(self.editor.dispatch(Action::UpdateEntity(entity))),
            None => Ok(()),
        }
    }

    fn samples_menu(&self, content_type: EntityId) -> Result<(), DomainError> {
        loop {
            let doc = self.editor.snapshot();
            let Some(ct) = doc.find::<ContentType>(content_type) else {
                return Ok(());
            };
            let mut items: Vec<Choice<Option<usize>>> = ct
                .samples
                .iter()
                .enumerate()
                .map(|(i, s)| Choice::new(sample_label(i, s), Some(i)))
                .collect();
            items.push(Choice::new("+ Add sample", None));

            let title = format!("Samples: {}", display_name(&ct.name));
            match select(&title, items)? {
                None => return Ok(()),
                Some(None) => {
                    if let Some(sample) = prompt_sample(Sample::default())? {
                        report(self.editor.dispatch(Action::AddSample {
                            content_type,
                            sample,
                        }))?;
                    }
                }
                Some(Some(index)) => {
                    let actions = vec![
                        Choice::new("Edit", ItemAction::Edit),
                        Choice::new("Delete", ItemAction::Delete),
                    ];
                    match select("Sample", actions)? {
                        Some(ItemAction::Edit) => {
                            if let Some(sample) = prompt_sample(ct.samples[index].clone())? {
                                report(self.editor.dispatch(Action::UpdateSample {
                                    content_type,
                                    index,
                                    sample,
                                }))?;
                            }
                        }
                        Some(ItemAction::Delete) => {
                            if confirm("Delete this sample?", false)? == Some(true) {
                                report(self.editor.dispatch(Action::DeleteSample {
                                    content_type,
                                    index,
                                }))?;
                            }
                        }
                        None => {}
                    }
                }
            }
        }
    }

    fn competitors_menu(&self, product_line: EntityId) -> Result<(), DomainError> {
        loop {
            let doc = self.editor.snapshot();
            let Some(pl) = doc.find::<ProductLine>(product_line) else {
                return Ok(());
            };
            let mut items: Vec<Choice<Option<usize>>> = pl
                .competitors
                .iter()
                .enumerate()
                .map(|(i, c)| Choice::new(competitor_label(c, &doc), Some(i)))
                .collect();
            items.push(Choice::new("+ Add competitor", None));

            let title = format!("Competitors: {}", display_name(&pl.name));
            match select(&title, items)? {
                None => return Ok(()),
                Some(None) => {
                    let blank = Competitor::for_all_regions("", "", &doc);
                    if let Some(competitor) = prompt_competitor(blank, &doc)? {
                        report(self.editor.dispatch(Action::AddCompetitor {
                            product_line,
                            competitor,
                        }))?;
                    }
                }
                Some(Some(index)) => {
                    let actions = vec![
                        Choice::new("Edit", ItemAction::Edit),
                        Choice::new("Delete", ItemAction::Delete),
                    ];
                    match select("Competitor", actions)? {
                        Some(ItemAction::Edit) => {
                            let current = pl.competitors[index].clone();
                            if let Some(competitor) = prompt_competitor(current, &doc)? {
                                report(self.editor.dispatch(Action::UpdateCompetitor {
                                    product_line,
                                    index,
                                    competitor,
                                }))?;
                            }
                        }
                        Some(ItemAction::Delete) => {
                            if confirm("Delete this competitor?", false)? == Some(true) {
                                report(self.editor.dispatch(Action::DeleteCompetitor {
                                    product_line,
                                    index,
                                }))?;
                            }
                        }
                        None => {}
                    }
                }
            }
        }
    }
}

fn prompt_sample(mut sample: Sample) -> Result<Option<Sample>, DomainError> {
    let done = edit_optional("Title", &mut sample.title)?
        && edit_field("Body", &mut sample.body)?
        && edit_optional("Notes", &mut sample.notes)?;
    if !done {
        return Ok(None);
    }
    let current = sample.attachment.clone().unwrap_or_default();
    let Some(input) = text("Attachment file (blank for none)", &current)? else {
        return Ok(None);
    };
    match attachment_from_input(&input) {
        Ok(attachment) => sample.attachment = attachment,
        Err(e) => println!("  ✗ {}", e),
    }
    Ok(Some(sample))
}

fn prompt_competitor(mut c: Competitor, doc: &Document) -> Result<Option<Competitor>, DomainError> {
    if !(edit_field("Name", &mut c.name)? && edit_field("Domain", &mut c.domain)?) {
        return Ok(None);
    }
    let regions = doc.region_names();
    if !regions.is_empty() {
        match pick_many("Regions", &regions, &c.regions)? {
            Some(picked) => c.regions = picked,
            None => return Ok(None),
        }
    }
    Ok(Some(c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actions_per_kind() {
        let values = |kind| -> Vec<EntityAction> {
            entity_actions_for(kind).into_iter().map(|c| c.value).collect()
        };
        assert!(values(EntityKind::ProductLine).contains(&EntityAction::Competitors));
        assert!(!values(EntityKind::ProductLine).contains(&EntityAction::Rules));
        assert!(values(EntityKind::ContentType).contains(&EntityAction::Samples));
        assert!(values(EntityKind::Region).contains(&EntityAction::Rules));
        for kind in EntityKind::ALL {
            assert!(values(kind).contains(&EntityAction::Duplicate));
        }
    }

    #[test]
    fn test_competitor_label_all_regions() {
        let mut doc = Document::empty();
        doc.regions.push(Region::named("EMEA"));
        doc.regions.push(Region::named("APAC"));
        let all = Competitor::for_all_regions("Rival", "rival.com", &doc);
        assert_eq!(competitor_label(&all, &doc), "Rival (rival.com) [all regions]");

        let some = Competitor {
            regions: vec!["EMEA".to_string()],
            ..all
        };
        assert_eq!(competitor_label(&some, &doc), "Rival (rival.com) [EMEA]");
    }

    #[test]
    fn test_sample_label_falls_back_to_body() {
        let s = Sample {
            body: "Hello there".to_string(),
            ..Sample::default()
        };
        assert_eq!(sample_label(0, &s), "1. Hello there");
    }

    #[test]
    fn test_entity_name_rejects_blank() {
        assert_eq!(entity_name("  Gen Z "), Some("Gen Z".to_string()));
        assert_eq!(entity_name(""), None);
        assert_eq!(entity_name(" \t "), None);
    }

    #[test]
    fn test_rule_owner_for_kind() {
        let id = EntityId::default();
        assert_eq!(rule_owner(EntityKind::ProductLine, id), None);
        assert_eq!(rule_owner(EntityKind::Region, id), Some(RuleOwner::Region(id)));
    }
}
