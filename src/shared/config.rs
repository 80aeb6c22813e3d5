//! Application configuration. Paths, autosave timing, tag rename behaviour.

use crate::domain::RenameScope;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

/// Quiet period after the last edit before the document is written.
pub const DEFAULT_SAVE_DEBOUNCE_MS: u64 = 500;

/// How long the "Saved" indicator stays up before returning to idle.
pub const DEFAULT_SAVED_STATUS_MS: u64 = 2000;

/// Timeout for fetching a brand's homepage when looking up a header image.
pub const DEFAULT_ASSET_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// Directory holding `brand_kit.json` and `version`. Read from BRAND_KIT_DATA_DIR.
    #[serde(default)]
    pub data_dir: Option<String>,

    /// Autosave debounce in ms. Read from BRAND_KIT_SAVE_DEBOUNCE_MS.
    #[serde(default)]
    pub save_debounce_ms: Option<u64>,

    /// Read from BRAND_KIT_SAVED_STATUS_MS.
    #[serde(default)]
    pub saved_status_ms: Option<u64>,

    /// Read from BRAND_KIT_ASSET_TIMEOUT_SECS.
    #[serde(default)]
    pub asset_timeout_secs: Option<u64>,

    /// `own` (default) or `document`. Read from BRAND_KIT_RENAME_SCOPE.
    #[serde(default)]
    pub rename_scope: Option<String>,

    /// Keep the document in memory only. Read from BRAND_KIT_EPHEMERAL.
    #[serde(default)]
    pub ephemeral: Option<bool>,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        c = c.add_source(config::Environment::with_prefix("BRAND_KIT").try_parsing(true));
        if let Ok(path) = std::env::var("BRAND_KIT_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        c.build()?.try_deserialize()
    }

    pub fn data_dir_or_default(&self) -> PathBuf {
        PathBuf::from(self.data_dir.as_deref().unwrap_or("./data"))
    }

    pub fn save_debounce_or_default(&self) -> Duration {
        Duration::from_millis(self.save_debounce_ms.unwrap_or(DEFAULT_SAVE_DEBOUNCE_MS))
    }

    pub fn saved_status_or_default(&self) -> Duration {
        Duration::from_millis(self.saved_status_ms.unwrap_or(DEFAULT_SAVED_STATUS_MS))
    }

    pub fn asset_timeout_or_default(&self) -> Duration {
        Duration::from_secs(self.asset_timeout_secs.unwrap_or(DEFAULT_ASSET_TIMEOUT_SECS))
    }

    /// Falls back to own-rules scope on unset or unrecognised values.
    pub fn rename_scope_or_default(&self) -> RenameScope {
        match self.rename_scope.as_deref() {
            None => RenameScope::default(),
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                warn!(value = raw, error = %e, "invalid rename scope, using default");
                RenameScope::default()
            }),
        }
    }

    pub fn is_ephemeral(&self) -> bool {
        self.ephemeral.unwrap_or(false)
    }
}
