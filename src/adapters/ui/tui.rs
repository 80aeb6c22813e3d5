//! Implements InputPort. Inquire-based interactive editor.
//!
//! Every edit goes through `EditorService::dispatch`; the autosaver picks the
//! change up on its own. Entity and rule submenus live in `entity_menus` and
//! `rule_menus`.

use super::prompts::{self, Choice, confirm, pick_many, report, select, text};
use crate::adapters::export::write_rules_csv;
use crate::adapters::import::image_data_url;
use crate::domain::{
    Action, BrandField, BrandFoundations, DatasetVersion, Document, DomainError, EntityKind,
    Feature, RuleOwner,
};
use crate::ports::{BrandAssetPort, InputPort};
use crate::usecases::{EditorService, SaveStatus};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum MainAction {
    Brand,
    Entities(EntityKind),
    GlobalRules,
    AllRules,
    SwitchVersion,
    Export,
    Clear,
    Quit,
}

/// Main menu entries. Audiences and regions are hidden while their feature is off.
pub(super) fn main_menu(doc: &Document) -> Vec<Choice<MainAction>> {
    let flags = &doc.brand_foundations;
    let mut items = vec![
        Choice::new("Brand foundations", MainAction::Brand),
        Choice::new("Product lines", MainAction::Entities(EntityKind::ProductLine)),
    ];
    if flags.enable_audiences {
        items.push(Choice::new(
            "Audiences",
            MainAction::Entities(EntityKind::Audience),
        ));
    }
    items.push(Choice::new(
        "Content types",
        MainAction::Entities(EntityKind::ContentType),
    ));
    if flags.enable_regions {
        items.push(Choice::new("Regions", MainAction::Entities(EntityKind::Region)));
    }
    items.extend([
        Choice::new("Global writing rules", MainAction::GlobalRules),
        Choice::new("All writing rules", MainAction::AllRules),
        Choice::new("Switch dataset version", MainAction::SwitchVersion),
        Choice::new("Export writing rules to CSV", MainAction::Export),
        Choice::new("Clear saved data", MainAction::Clear),
        Choice::new("Quit", MainAction::Quit),
    ]);
    items
}

#[derive(Debug, Clone, Copy)]
enum BrandAction {
    Field(BrandField),
    Colors,
    Features,
    FaviconIcon,
    FetchHeader,
    ImportHeader,
    ImportIcon,
}

/// Brand field that receives an image imported from a file, if the action imports one.
fn import_target(action: BrandAction) -> Option<BrandField> {
    match action {
        BrandAction::ImportHeader => Some(BrandField::HeaderImage),
        BrandAction::ImportIcon => Some(BrandField::Icon),
        _ => None,
    }
}

fn brand_field_value(f: &BrandFoundations, field: BrandField) -> &str {
    match field {
        BrandField::Name => &f.brand_name,
        BrandField::Domain => &f.brand_domain,
        BrandField::Icon => &f.brand_icon,
        BrandField::HeaderImage => &f.brand_header_image,
        BrandField::About => &f.about_your_brand,
        BrandField::StoryAndPurpose => &f.brand_story_and_purpose,
        BrandField::ToneAndVoice => &f.brand_tone_and_voice,
    }
}

/// Comma-separated input to a color list. Blank entries are dropped.
pub(super) fn parse_colors(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}

/// TUI adapter. Inquire prompts.
pub struct TuiInputPort {
    pub(super) editor: Arc<EditorService>,
    assets: Arc<dyn BrandAssetPort>,
    status: watch::Receiver<SaveStatus>,
    export_path: PathBuf,
}

impl TuiInputPort {
    pub fn new(
        editor: Arc<EditorService>,
        assets: Arc<dyn BrandAssetPort>,
        status: watch::Receiver<SaveStatus>,
        export_path: PathBuf,
    ) -> Self {
        Self {
            editor,
            assets,
            status,
            export_path,
        }
    }

    async fn main_prompt(&self, doc: &Document) -> String {
        let name = match doc.brand_foundations.brand_name.trim() {
            "" => "Untitled brand",
            n => n,
        };
        let version = self.editor.version().await;
        let status = self.status.borrow().label();
        if status.is_empty() {
            format!("{} [{}]", name, version)
        } else {
            format!("{} [{}] · {}", name, version, status)
        }
    }

    async fn brand_menu(&self) -> Result<(), DomainError> {
        loop {
            let doc = self.editor.snapshot();
            let f = &doc.brand_foundations;
            let mut items: Vec<Choice<BrandAction>> = BrandField::ALL
                .iter()
                .map(|&field| {
                    Choice::new(
                        format!(
                            "{}: {}",
                            field.label(),
                            prompts::preview(brand_field_value(f, field), 40)
                        ),
                        BrandAction::Field(field),
                    )
                })
                .collect();
            items.extend([
                Choice::new(
                    format!("Brand colors: {}", f.brand_colors.join(", ")),
                    BrandAction::Colors,
                ),
                Choice::new(
                    format!(
                        "Features: audiences {}, regions {}",
                        on_off(f.enable_audiences),
                        on_off(f.enable_regions)
                    ),
                    BrandAction::Features,
                ),
                Choice::new("Use domain favicon as icon", BrandAction::FaviconIcon),
                Choice::new("Fetch header image from domain", BrandAction::FetchHeader),
                Choice::new("Import header image from file", BrandAction::ImportHeader),
                Choice::new("Import icon from file", BrandAction::ImportIcon),
            ]);

            let Some(action) = select("Brand foundations", items)? else {
                return Ok(());
            };
            match action {
                BrandAction::Field(field) => {
                    let current = brand_field_value(f, field).to_string();
                    if let Some(value) = text(field.label(), &current)? {
                        report(self.editor.dispatch(Action::SetBrandField(field, value)))?;
                    }
                }
                BrandAction::Colors => {
                    let current = f.brand_colors.join(", ");
                    if let Some(input) = text("Brand colors (comma-separated hex)", &current)? {
                        report(
                            self.editor
                                .dispatch(Action::SetBrandColors(parse_colors(&input))),
                        )?;
                    }
                }
                BrandAction::Features => self.toggle_features(f)?,
                BrandAction::FaviconIcon => {
                    if let Some(domain) = require_domain(f) {
                        let url = self.assets.favicon(domain);
                        report(
                            self.editor
                                .dispatch(Action::SetBrandField(BrandField::Icon, url)),
                        )?;
                    }
                }
                BrandAction::FetchHeader => {
                    if let Some(domain) = require_domain(f) {
                        println!("  Looking up header image for {}…", domain);
                        let url = self.assets.header_image(domain).await;
                        println!("  → {}", url);
                        report(
                            self.editor
                                .dispatch(Action::SetBrandField(BrandField::HeaderImage, url)),
                        )?;
                    }
                }
                BrandAction::ImportHeader | BrandAction::ImportIcon => {
                    if let Some(field) = import_target(action) {
                        self.import_image(field).await?;
                    }
                }
            }
        }
    }

    /// Embeds an image file as a data URL into `field`.
    async fn import_image(&self, field: BrandField) -> Result<(), DomainError> {
        let Some(path) = text("Image file path", "")? else {
            return Ok(());
        };
        let result = match image_data_url(Path::new(path.trim())).await {
            Ok(url) => self.editor.dispatch(Action::SetBrandField(field, url)),
            Err(e) => Err(e),
        };
        report(result)
    }

    fn toggle_features(&self, f: &BrandFoundations) -> Result<(), DomainError> {
        let options = vec!["Audiences".to_string(), "Regions".to_string()];
        let mut enabled = Vec::new();
        if f.enable_audiences {
            enabled.push(options[0].clone());
        }
        if f.enable_regions {
            enabled.push(options[1].clone());
        }
        let Some(picked) = pick_many("Enabled sections", &options, &enabled)? else {
            return Ok(());
        };
        report(self.editor.dispatch(Action::SetFeature(
            Feature::Audiences,
            picked.contains(&options[0]),
        )))?;
        report(self.editor.dispatch(Action::SetFeature(
            Feature::Regions,
            picked.contains(&options[1]),
        )))
    }

    async fn switch_version(&self) -> Result<(), DomainError> {
        let current = self.editor.version().await;
        let cursor = DatasetVersion::ALL
            .iter()
            .position(|v| *v == current)
            .unwrap_or(0);
        let items = DatasetVersion::ALL
            .iter()
            .map(|&v| Choice::new(v.to_string(), v))
            .collect();
        let Some(version) = prompts::select_from("Dataset version", items, cursor)? else {
            return Ok(());
        };
        let message = format!("Replace the current brand kit with the {} dataset?", version);
        if confirm(&message, false)? != Some(true) {
            return Ok(());
        }
        report(self.editor.switch_version(version).await)
    }

    async fn export(&self) -> Result<(), DomainError> {
        let default = self.export_path.display().to_string();
        let Some(path) = text("Export to", &default)? else {
            return Ok(());
        };
        let rules = self.editor.all_rules();
        let path = PathBuf::from(path.trim());
        let result = write_rules_csv(&path, &rules).await;
        if result.is_ok() {
            println!("  Exported {} rules to {}", rules.len(), path.display());
        }
        report(result)
    }

    async fn clear(&self) -> Result<(), DomainError> {
        if confirm("Delete the saved brand kit? This cannot be undone.", false)? != Some(true) {
            return Ok(());
        }
        report(self.editor.clear().await)
    }
}

fn on_off(flag: bool) -> &'static str {
    if flag { "on" } else { "off" }
}

fn require_domain(f: &BrandFoundations) -> Option<&str> {
    let domain = f.brand_domain.trim();
    if domain.is_empty() {
        println!("  Set a brand domain first.");
        None
    } else {
        Some(domain)
    }
}

#[async_trait]
impl InputPort for TuiInputPort {
    async fn run(&self) -> Result<(), DomainError> {
        loop {
            let doc = self.editor.snapshot();
            let prompt = self.main_prompt(&doc).await;
            let Some(action) = select(&prompt, main_menu(&doc))? else {
                break;
            };
            match action {
                MainAction::Brand => self.brand_menu().await?,
                MainAction::Entities(kind) => self.entity_menu(kind)?,
                MainAction::GlobalRules => self.rules_menu(RuleOwner::Global)?,
                MainAction::AllRules => self.all_rules_menu()?,
                MainAction::SwitchVersion => self.switch_version().await?,
                MainAction::Export => self.export().await?,
                MainAction::Clear => self.clear().await?,
                MainAction::Quit => break,
            }
        }
        info!("editor closed");
        Ok(())
    }
}
