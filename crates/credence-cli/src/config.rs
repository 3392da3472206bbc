//! # CLI Configuration
//!
//! Optional YAML file passed with `--config`:
//!
//! ```yaml
//! documents:
//!   - url: did:example:issuer
//!     path: issuer.json
//! challenge: nonce-123
//! domain: verifier.example
//! ```
//!
//! Each listed document is preloaded into the static document loader so
//! that controller documents and verification methods resolve offline.
//! Relative paths are resolved against the config file's directory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use credence_vc::StaticDocumentLoader;

/// One document to preload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DocumentEntry {
    /// URL the document answers to.
    pub url: String,
    /// JSON file holding the document.
    pub path: PathBuf,
}

/// Parsed configuration file. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    /// Documents to preload into the loader.
    pub documents: Vec<DocumentEntry>,
    /// Default challenge for `sign-presentation` and `verify`.
    pub challenge: Option<String>,
    /// Default domain for `sign-presentation` and `verify`.
    pub domain: Option<String>,
    #[serde(skip)]
    base_dir: PathBuf,
}

impl CliConfig {
    /// Read `path`, or return the empty configuration when `None`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        let mut config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse config: {}", path.display()))?;
        config.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        tracing::debug!(
            config = %path.display(),
            documents = config.documents.len(),
            "loaded configuration"
        );
        Ok(config)
    }

    /// The default loader plus every configured document.
    pub fn loader(&self) -> Result<StaticDocumentLoader> {
        let mut loader = StaticDocumentLoader::with_defaults();
        for entry in &self.documents {
            let path = if entry.path.is_absolute() {
                entry.path.clone()
            } else {
                self.base_dir.join(&entry.path)
            };
            let document = crate::read_json(&path)
                .with_context(|| format!("failed to load document for {}", entry.url))?;
            loader.insert(entry.url.clone(), document);
        }
        Ok(loader)
    }
}
