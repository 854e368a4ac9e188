//! CLI commands.

pub mod batch;
pub mod config;
pub mod list;
pub mod process;

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use invmail_core::invoice::{ConfiguredExtractor, FieldDefaults, InvoicePipeline};
use invmail_core::models::config::InvmailConfig;
use invmail_core::{DocumentKind, RawDocument, SupabaseStore};

pub(crate) fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("invmail")
        .join("config.json")
}

/// Resolve the config file: the explicit path, else the default location.
pub(crate) fn config_file(config_path: Option<&str>) -> PathBuf {
    config_path
        .map(PathBuf::from)
        .unwrap_or_else(default_config_path)
}

/// Load configuration from file (if present) and overlay the environment.
pub(crate) fn load_config(config_path: Option<&str>) -> anyhow::Result<InvmailConfig> {
    let path = config_file(config_path);

    let config = if path.exists() {
        debug!("Loading config from {}", path.display());
        InvmailConfig::from_file(&path)?
    } else if config_path.is_some() {
        anyhow::bail!("Config file not found: {}", path.display());
    } else {
        InvmailConfig::default()
    };

    Ok(config.with_env())
}

/// Build the extraction pipeline for this run.
///
/// A remote provider that cannot be set up is reported and replaced by
/// text rules only.
pub(crate) fn build_pipeline(
    config: &InvmailConfig,
    offline: bool,
) -> InvoicePipeline<ConfiguredExtractor> {
    let extractor = if offline {
        ConfiguredExtractor::offline()
    } else {
        match ConfiguredExtractor::from_config(&config.remote) {
            Ok(extractor) => extractor,
            Err(e) => {
                warn!("Remote extraction unavailable, using text rules only: {}", e);
                ConfiguredExtractor::offline()
            }
        }
    };
    debug!("Using {} extractor", extractor.name());

    InvoicePipeline::new(extractor).with_defaults(FieldDefaults::from(&config.extraction))
}

pub(crate) fn open_store(config: &InvmailConfig) -> anyhow::Result<SupabaseStore> {
    Ok(SupabaseStore::from_config(&config.store)?)
}

/// Read an email file, rejecting extensions other than txt, eml and msg.
pub(crate) fn read_document(path: &Path, known_sender: Option<&str>) -> anyhow::Result<RawDocument> {
    let Some(kind) = DocumentKind::from_path(path) else {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");
        anyhow::bail!("Unsupported file format: {}", extension);
    };

    let mut document = RawDocument::new(kind, fs::read(path)?);
    if let Some(sender) = known_sender {
        document = document.with_known_sender(sender);
    }
    Ok(document)
}
