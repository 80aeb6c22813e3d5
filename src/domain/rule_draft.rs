//! Edit state for a single writing rule.
//!
//! Global and Specific are exclusive. Switching to Global sets the tags to exactly
//! `["Global"]` but keeps the specific selection aside, so switching back restores it.

use crate::domain::entities::WritingRule;
use crate::domain::tags::{GLOBAL_TAG, RuleScope, is_global_tag};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeMode {
    Global,
    Specific,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleDraft {
    pub name: String,
    pub description: String,
    mode: ScopeMode,
    /// Specific selection. Never holds a Global tag.
    selected: Vec<String>,
}

impl RuleDraft {
    pub fn global(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            mode: ScopeMode::Global,
            selected: Vec::new(),
        }
    }

    pub fn specific(
        name: impl Into<String>,
        description: impl Into<String>,
        tags: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        let mut draft = Self {
            name: name.into(),
            description: description.into(),
            mode: ScopeMode::Specific,
            selected: Vec::new(),
        };
        draft.set_selection(tags);
        draft
    }

    pub fn from_rule(rule: &WritingRule) -> Self {
        let mode = match RuleScope::of(rule) {
            RuleScope::Global => ScopeMode::Global,
            RuleScope::Specific | RuleScope::Untagged => ScopeMode::Specific,
        };
        let mut draft = Self {
            name: rule.name.clone(),
            description: rule.description.clone(),
            mode,
            selected: Vec::new(),
        };
        draft.set_selection(rule.tags.iter().cloned());
        draft
    }

    pub fn mode(&self) -> ScopeMode {
        self.mode
    }

    pub fn is_global(&self) -> bool {
        self.mode == ScopeMode::Global
    }

    pub fn set_mode(&mut self, mode: ScopeMode) {
        self.mode = mode;
    }

    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    /// Replaces the specific selection. Global tags and repeats are dropped.
    pub fn set_selection(&mut self, tags: impl IntoIterator<Item = impl Into<String>>) {
        self.selected.clear();
        for tag in tags {
            self.select(tag);
        }
    }

    pub fn select(&mut self, tag: impl Into<String>) {
        let tag = tag.into();
        if !is_global_tag(&tag) && !self.selected.contains(&tag) {
            self.selected.push(tag);
        }
    }

    pub fn deselect(&mut self, tag: &str) {
        self.selected.retain(|t| t != tag);
    }

    /// Tags the saved rule will carry.
    pub fn tags(&self) -> Vec<String> {
        match self.mode {
            ScopeMode::Global => vec![GLOBAL_TAG.to_string()],
            ScopeMode::Specific => self.selected.clone(),
        }
    }

    /// Save is allowed once the description is non-blank and, outside Global mode, a tag is picked.
    pub fn can_save(&self) -> bool {
        !self.description.trim().is_empty()
            && (self.mode == ScopeMode::Global || !self.selected.is_empty())
    }

    /// Reason `can_save` is false, for user-facing messages.
    pub fn validation_error(&self) -> Option<&'static str> {
        if self.description.trim().is_empty() {
            Some("description is empty")
        } else if self.mode == ScopeMode::Specific && self.selected.is_empty() {
            Some("select at least one audience, content type or region")
        } else {
            None
        }
    }

    /// Writes name, description and tags onto an existing rule, keeping its id.
    pub fn apply_to(&self, rule: &mut WritingRule) {
        rule.name = self.name.clone();
        rule.description = self.description.clone();
        rule.tags = self.tags();
    }

    pub fn into_rule(self) -> WritingRule {
        let tags = self.tags();
        WritingRule::new(self.name, self.description, tags)
    }
}
