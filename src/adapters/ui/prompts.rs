//! Thin wrappers over inquire. Esc/Ctrl-C on any prompt means "back", never an error.

use crate::domain::DomainError;
use inquire::error::InquireResult;
use inquire::ui::{Attributes, Color, RenderConfig, StyleSheet, Styled};
use inquire::{Confirm, InquireError, MultiSelect, Select, Text};
use std::fmt;
use tracing::warn;

const NEON_PURPLE: Color = Color::Rgb {
    r: 0xbc,
    g: 0x13,
    b: 0xfe,
};
const CYBER_GREEN: Color = Color::Rgb {
    r: 0x0f,
    g: 0xf0,
    b: 0xfc,
};

/// `Ok(None)` when the user backed out of the prompt.
pub type Answer<T> = Result<Option<T>, DomainError>;

/// A labelled menu entry carrying the value it selects.
pub struct Choice<T> {
    label: String,
    pub value: T,
}

impl<T> Choice<T> {
    pub fn new(label: impl Into<String>, value: T) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

impl<T> fmt::Display for Choice<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

/// Applies the neon theme to every subsequent inquire prompt.
pub fn apply_theme() {
    let config = RenderConfig::default()
        .with_prompt_prefix(Styled::new("›").with_fg(NEON_PURPLE))
        .with_highlighted_option_prefix(Styled::new("▸").with_fg(CYBER_GREEN))
        .with_selected_checkbox(Styled::new("[x]").with_fg(CYBER_GREEN))
        .with_answer(
            StyleSheet::new()
                .with_fg(CYBER_GREEN)
                .with_attr(Attributes::BOLD),
        )
        .with_help_message(StyleSheet::new().with_fg(Color::DarkGrey));
    inquire::set_global_render_config(config);
}

pub fn answer<T>(res: InquireResult<T>) -> Answer<T> {
    match res {
        Ok(v) => Ok(Some(v)),
        Err(InquireError::OperationCanceled) | Err(InquireError::OperationInterrupted) => Ok(None),
        Err(e) => Err(DomainError::Ui(e.to_string())),
    }
}

pub fn select<T>(message: &str, choices: Vec<Choice<T>>) -> Answer<T> {
    select_from(message, choices, 0)
}

pub fn select_from<T>(message: &str, choices: Vec<Choice<T>>, cursor: usize) -> Answer<T> {
    if choices.is_empty() {
        return Ok(None);
    }
    let cursor = cursor.min(choices.len() - 1);
    Ok(answer(
        Select::new(message, choices)
            .with_starting_cursor(cursor)
            .with_page_size(12)
            .prompt(),
    )?
    .map(|c| c.value))
}

/// Multi-choice over plain strings, with `preselected` ticked.
pub fn pick_many(message: &str, options: &[String], preselected: &[String]) -> Answer<Vec<String>> {
    let defaults: Vec<usize> = options
        .iter()
        .enumerate()
        .filter(|(_, o)| preselected.contains(o))
        .map(|(i, _)| i)
        .collect();
    answer(
        MultiSelect::new(message, options.to_vec())
            .with_default(&defaults)
            .prompt(),
    )
}

pub fn text(message: &str, initial: &str) -> Answer<String> {
    answer(Text::new(message).with_initial_value(initial).prompt())
}

/// Text prompt for a field where blank means "unset".
pub fn optional_text(message: &str, initial: Option<&str>) -> Answer<Option<String>> {
    Ok(text(message, initial.unwrap_or_default())?.map(|s| {
        let s = s.trim().to_string();
        if s.is_empty() { None } else { Some(s) }
    }))
}

pub fn confirm(message: &str, default: bool) -> Answer<bool> {
    answer(Confirm::new(message).with_default(default).prompt())
}

/// Prints a rejected edit and carries on. Prompt failures still propagate.
pub fn report(result: Result<(), DomainError>) -> Result<(), DomainError> {
    match result {
        Ok(()) => Ok(()),
        Err(DomainError::Ui(msg)) => Err(DomainError::Ui(msg)),
        Err(e) => {
            warn!(error = %e, "edit rejected");
            println!("  ✗ {}", e);
            Ok(())
        }
    }
}

/// First `max` characters of `s` on one line, with an ellipsis when cut.
pub fn preview(s: &str, max: usize) -> String {
    let flat = s.replace(['\n', '\r'], " ");
    if flat.chars().count() <= max {
        flat
    } else {
        let cut: String = flat.chars().take(max).collect();
        format!("{}…", cut.trim_end())
    }
}
