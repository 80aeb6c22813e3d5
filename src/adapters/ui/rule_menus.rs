//! Writing rule menus: per-owner lists, the rule editor and the aggregated views.

use super::prompts::{Choice, confirm, pick_many, preview, report, select, select_from, text};
use super::tui::TuiInputPort;
use crate::domain::{
    Action, AggregatedRule, Document, DomainError, RuleDraft, RuleOwner, ScopeMode, WritingRule,
};

#[derive(Debug, Clone, Copy)]
enum RuleAction {
    Edit,
    Delete,
}

#[derive(Debug, Clone, Copy)]
enum View {
    Flat,
    ByTag,
}

pub(super) fn rule_label(rule: &WritingRule) -> String {
    let name = if rule.name.trim().is_empty() {
        "(unnamed)"
    } else {
        rule.name.as_str()
    };
    format!(
        "{}: {} [{}]",
        name,
        preview(&rule.description, 50),
        rule.tags.join(", ")
    )
}

fn aggregated_label(rule: &AggregatedRule) -> String {
    let locations = rule
        .locations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    format!("{} @ {}", rule_label(&rule.rule), locations)
}

/// Starting draft for a new rule under `owner`: global for the global list, else
/// specific and pre-tagged with the owner's name.
pub(super) fn new_draft(owner: RuleOwner, doc: &Document) -> RuleDraft {
    match owner {
        RuleOwner::Global => RuleDraft::global("", ""),
        other => RuleDraft::specific("", "", other.display_name(doc)),
    }
}

/// Tag selection after a multi-select over `choices`. Tags that were not offered
/// (e.g. names from a disabled section) are kept.
pub(super) fn merge_selection(previous: &[String], choices: &[String], picked: Vec<String>) -> Vec<String> {
    let mut tags = picked;
    tags.extend(
        previous
            .iter()
            .filter(|t| !choices.contains(t))
            .cloned(),
    );
    tags
}

/// Walks the user through name, description and scope. `Ok(None)` on back-out.
fn edit_draft(mut draft: RuleDraft, doc: &Document) -> Result<Option<RuleDraft>, DomainError> {
    loop {
        let Some(name) = text("Rule name", &draft.name)? else {
            return Ok(None);
        };
        draft.name = name;
        let Some(description) = text("Description", &draft.description)? else {
            return Ok(None);
        };
        draft.description = description;

        let scopes = vec![
            Choice::new("Global (applies everywhere)", ScopeMode::Global),
            Choice::new("Specific (pick tags)", ScopeMode::Specific),
        ];
        let cursor = usize::from(!draft.is_global());
        let Some(mode) = select_from("Scope", scopes, cursor)? else {
            return Ok(None);
        };
        draft.set_mode(mode);

        if mode == ScopeMode::Specific {
            let choices = doc.tag_choices();
            if choices.is_empty() {
                println!("  Nothing to tag yet: add an audience, content type or region first.");
            } else {
                let Some(picked) = pick_many("Tags", &choices, draft.selected())? else {
                    return Ok(None);
                };
                let tags = merge_selection(draft.selected(), &choices, picked);
                draft.set_selection(tags);
            }
        }

        match draft.validation_error() {
            None => return Ok(Some(draft)),
            Some(reason) => {
                println!("  Cannot save: {}.", reason);
                if confirm("Edit again?", true)? != Some(true) {
                    return Ok(None);
                }
            }
        }
    }
}

impl TuiInputPort {
    pub(super) fn rules_menu(&self, owner: RuleOwner) -> Result<(), DomainError> {
        loop {
            let doc = self.editor.snapshot();
            let rules = match owner.rules(&doc) {
                Ok(rules) => rules,
                Err(e) => return report(Err(e)),
            };
            let mut items: Vec<Choice<Option<String>>> = rules
                .iter()
                .map(|r| Choice::new(rule_label(r), Some(r.key().into_owned())))
                .collect();
            items.push(Choice::new("+ Add rule", None));

            let title = format!(
                "Writing rules: {}",
                owner.display_name(&doc).unwrap_or_default()
            );
            match select(&title, items)? {
                None => return Ok(()),
                Some(Some(key)) => self.rule_actions(owner, &key)?,
                Some(None) => {
                    if let Some(draft) = edit_draft(new_draft(owner, &doc), &doc)? {
                        report(self.editor.dispatch(Action::AddRule { owner, draft }))?;
                    }
                }
            }
        }
    }

    /// Edit or delete the rule `rule_key` in `owner`'s list.
    fn rule_actions(&self, owner: RuleOwner, rule_key: &str) -> Result<(), DomainError> {
        let doc = self.editor.snapshot();
        let Some(rule) = owner
            .rules(&doc)
            .ok()
            .and_then(|rules| rules.iter().find(|r| r.key() == rule_key))
        else {
            return Ok(());
        };

        let actions = vec![
            Choice::new("Edit", RuleAction::Edit),
            Choice::new("Delete", RuleAction::Delete),
        ];
        match select(&rule_label(rule), actions)? {
            Some(RuleAction::Edit) => {
                let Some(draft) = edit_draft(RuleDraft::from_rule(rule), &doc)? else {
                    return Ok(());
                };
                let moved = draft.is_global() && owner != RuleOwner::Global;
                report(self.editor.dispatch(Action::SaveRule {
                    owner,
                    rule_key: rule_key.to_string(),
                    draft,
                }))?;
                if moved {
                    println!("  Moved to global writing rules.");
                }
                Ok(())
            }
            Some(RuleAction::Delete) => {
                if confirm("Delete this rule?", false)? == Some(true) {
                    report(self.editor.dispatch(Action::DeleteRule {
                        owner,
                        rule_key: rule_key.to_string(),
                    }))?;
                }
                Ok(())
            }
            None => Ok(()),
        }
    }

    pub(super) fn all_rules_menu(&self) -> Result<(), DomainError> {
        let views = vec![
            Choice::new("Flat list", View::Flat),
            Choice::new("Grouped by tag", View::ByTag),
        ];
        match select("All writing rules", views)? {
            Some(View::Flat) => self.flat_rules_view(),
            Some(View::ByTag) => self.grouped_rules_view(),
            None => Ok(()),
        }
    }

    fn flat_rules_view(&self) -> Result<(), DomainError> {
        loop {
            let rules = self.editor.all_rules();
            if rules.is_empty() {
                println!("  No writing rules yet.");
                return Ok(());
            }
            let title = format!("All writing rules ({})", rules.len());
            if !self.pick_aggregated(&title, &rules)? {
                return Ok(());
            }
        }
    }

    fn grouped_rules_view(&self) -> Result<(), DomainError> {
        loop {
            let groups = self.editor.rules_by_tag();
            if groups.is_empty() {
                println!("  No writing rules yet.");
                return Ok(());
            }
            let items = groups
                .iter()
                .enumerate()
                .map(|(i, g)| Choice::new(format!("{} ({})", g.tag, g.rules.len()), i))
                .collect();
            let Some(slot) = select("Tags", items)? else {
                return Ok(());
            };
            let group = &groups[slot];
            self.pick_aggregated(&format!("Tag: {}", group.tag), &group.rules)?;
        }
    }

    /// Lets the user act on one aggregated rule via its primary owner. False on back-out.
    fn pick_aggregated(&self, title: &str, rules: &[AggregatedRule]) -> Result<bool, DomainError> {
        let items = rules
            .iter()
            .enumerate()
            .map(|(i, r)| Choice::new(aggregated_label(r), i))
            .collect();
        let Some(i) = select(title, items)? else {
            return Ok(false);
        };
        let rule = &rules[i];
        if let Some(owner) = rule.primary_owner() {
            self.rule_actions(owner, &rule.key())?;
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Audience, GLOBAL_TAG};

    #[test]
    fn test_new_draft_per_owner() {
        let mut doc = Document::empty();
        let a = Audience::named("Gen Z");
        let id = a.id;
        doc.audiences.push(a);

        let global = new_draft(RuleOwner::Global, &doc);
        assert!(global.is_global());
        assert_eq!(global.tags(), vec![GLOBAL_TAG]);

        let scoped = new_draft(RuleOwner::Audience(id), &doc);
        assert!(!scoped.is_global());
        assert_eq!(scoped.selected(), ["Gen Z".to_string()]);
    }

    #[test]
    fn test_merge_selection_keeps_unoffered_tags() {
        let previous = vec!["EMEA".to_string(), "Gen Z".to_string()];
        let choices = vec!["Gen Z".to_string(), "Email".to_string()];
        let merged = merge_selection(&previous, &choices, vec!["Email".to_string()]);
        assert_eq!(merged, vec!["Email", "EMEA"]);
    }

    #[test]
    fn test_rule_label() {
        let rule = WritingRule::new("Short", "Keep it short", ["Gen Z", "Email"]);
        assert_eq!(rule_label(&rule), "Short: Keep it short [Gen Z, Email]");
    }
}
