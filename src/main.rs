//! Wiring & DI. Entry point: bootstrap adapters, inject into services, run UI.
//! No business logic here; edits are delegated to EditorService.

use brand_kit::adapters::persistence::{JsonFileStore, MemoryStore};
use brand_kit::adapters::ui::TuiInputPort;
use brand_kit::adapters::web::HttpBrandAssets;
use brand_kit::domain::ReduceOptions;
use brand_kit::ports::{BrandAssetPort, DocumentStore, InputPort};
use brand_kit::shared::config::AppConfig;
use brand_kit::usecases::{Autosaver, EditorService};
use dotenv::dotenv;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let env_loaded = dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match &env_loaded {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!(cwd = %cwd.display(), "no .env found (check CWD)"),
    }

    brand_kit::adapters::ui::init_ui();

    let cfg = AppConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "invalid configuration, using defaults");
        AppConfig::default()
    });
    let ephemeral = cfg.is_ephemeral() || std::env::args().any(|a| a == "--ephemeral");

    let data_path = cfg.data_dir_or_default();
    let store: Arc<dyn DocumentStore> = if ephemeral {
        info!("ephemeral session: nothing will be written to disk");
        Arc::new(MemoryStore::new())
    } else {
        let data_dir_abs = data_path
            .canonicalize()
            .unwrap_or_else(|_| data_path.clone());
        info!(path = %data_dir_abs.display(), "data directory");
        Arc::new(JsonFileStore::new(&data_path))
    };

    // --- Editor ---
    let options = ReduceOptions {
        rename_scope: cfg.rename_scope_or_default(),
    };
    info!(rename_scope = %options.rename_scope, "tag rename scope");
    let editor = Arc::new(EditorService::load(Arc::clone(&store), options).await);

    // --- Autosave: debounced writer fed by the editor's document channel ---
    let debounce = cfg.save_debounce_or_default();
    info!(
        debounce_ms = debounce.as_millis() as u64,
        "autosave debounce"
    );
    let autosaver = Autosaver::new(
        Arc::clone(&store),
        editor.subscribe(),
        debounce,
        cfg.saved_status_or_default(),
    );
    let save_status = autosaver.status();
    let autosave = tokio::spawn(autosaver.run());

    // --- UI ---
    let assets: Arc<dyn BrandAssetPort> =
        Arc::new(HttpBrandAssets::new(cfg.asset_timeout_or_default()));
    let input_port: Arc<dyn InputPort> = Arc::new(TuiInputPort::new(
        Arc::clone(&editor),
        assets,
        save_status,
        data_path.join("writing_rules.csv"),
    ));

    let result = input_port.run().await;

    // Last document sender goes away here; the autosaver flushes any pending edit and exits.
    drop(input_port);
    drop(editor);
    if let Err(e) = autosave.await {
        warn!(error = %e, "autosave task ended abnormally");
    }

    result.map_err(|e| anyhow::anyhow!("{}", e))?;
    Ok(())
}
