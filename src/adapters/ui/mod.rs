mod entity_menus;
mod prompts;
mod rule_menus;

pub mod banner;
pub mod tui;

pub use tui::TuiInputPort;

/// Prints the welcome banner and applies the neon theme for all subsequent inquire prompts.
/// Call once at startup (e.g. in main after tracing init).
pub fn init_ui() {
    banner::print_welcome();
    prompts::apply_theme();
}
