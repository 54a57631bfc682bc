//! Client settings, in code or loaded from YAML.

use crate::pipeline::Decoder;
use crate::read_strategy::DirectoryBundle;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Settings for a [`MockHttpClient`](crate::MockHttpClient).
///
/// ```yaml
/// log_matches: true
/// log_unmatched: false
/// decoder: yaml
/// fixtures_dir: fixtures
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientSettings {
    /// Log all matched mocks
    #[serde(default = "default_true")]
    pub log_matches: bool,

    /// Log requests passed through to the network
    #[serde(default = "default_true")]
    pub log_unmatched: bool,

    /// Decoder for typed responses
    #[serde(default)]
    pub decoder: Decoder,

    /// Directory of fixture files, see [`ClientSettings::fixtures`]
    #[serde(default = "default_fixtures_dir")]
    pub fixtures_dir: PathBuf,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            log_matches: true,
            log_unmatched: true,
            decoder: Decoder::default(),
            fixtures_dir: default_fixtures_dir(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_fixtures_dir() -> PathBuf {
    PathBuf::from("fixtures")
}

impl ClientSettings {
    /// Load settings from a YAML file.
    ///
    /// A relative `fixtures_dir` is resolved against the file's directory.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let mut settings = Self::from_yaml(&content)
            .with_context(|| format!("Invalid settings in {}", path.display()))?;
        if settings.fixtures_dir.is_relative() {
            if let Some(parent) = path.parent() {
                settings.fixtures_dir = parent.join(&settings.fixtures_dir);
            }
        }
        Ok(settings)
    }

    /// Parse and validate a YAML document.
    pub fn from_yaml(yaml: &str) -> anyhow::Result<Self> {
        // An empty document means all defaults
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let settings: Self = serde_yaml::from_str(yaml)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate the settings.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.fixtures_dir.as_os_str().is_empty() {
            anyhow::bail!("fixtures_dir cannot be empty");
        }
        if self.fixtures_dir.exists() && !self.fixtures_dir.is_dir() {
            anyhow::bail!(
                "fixtures_dir {} is not a directory",
                self.fixtures_dir.display()
            );
        }
        Ok(())
    }

    /// Bundle over `fixtures_dir`, for
    /// [`BundleReadStrategy`](crate::BundleReadStrategy) and
    /// [`UrlReadStrategy::from_bundle`](crate::UrlReadStrategy::from_bundle).
    pub fn fixtures(&self) -> DirectoryBundle {
        DirectoryBundle::new(&self.fixtures_dir)
    }
}
