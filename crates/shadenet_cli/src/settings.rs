// SPDX-License-Identifier: MIT OR Apache-2.0
//! Conversion settings file.
//!
//! Settings live in a versioned RON document (`shadenet.ron`) holding:
//! - Shader source type preference
//! - Filter chain, by filter name
//! - Shader package search roots
//! - Log filter directive and watch debounce

use crate::package::ShaderPackage;
use serde::{Deserialize, Serialize};
use shadenet_network::{FilterChain, ResolveVstructs};
use shadenet_rman::ConverterConfig;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Current settings format version
pub const SETTINGS_FORMAT_VERSION: u32 = 1;

/// Settings file name
pub const SETTINGS_FILE_NAME: &str = "shadenet.ron";

fn default_filters() -> Vec<String> {
    vec![ResolveVstructs::NAME.to_string()]
}

fn default_log_filter() -> String {
    "info".to_string()
}

fn default_watch_debounce_ms() -> u64 {
    250
}

/// Contents of a settings file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Format version
    pub version: u32,
    /// Acceptable shader source types, most preferred first
    #[serde(default = "ConverterConfig::default_source_types")]
    pub source_types: Vec<String>,
    /// Filters to run before conversion, in order
    #[serde(default = "default_filters")]
    pub filters: Vec<String>,
    /// Shader package roots; relative roots are taken from the settings file's directory
    #[serde(default)]
    pub shader_roots: Vec<PathBuf>,
    /// Default `tracing` filter directive, overridden by `RUST_LOG`
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    /// Quiet period before a watched change triggers a re-sync
    #[serde(default = "default_watch_debounce_ms")]
    pub watch_debounce_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: SETTINGS_FORMAT_VERSION,
            source_types: ConverterConfig::default_source_types(),
            filters: default_filters(),
            shader_roots: Vec::new(),
            log_filter: default_log_filter(),
            watch_debounce_ms: default_watch_debounce_ms(),
        }
    }
}

impl Settings {
    /// Load settings from a file
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_ron_str(&content)
    }

    /// Parse settings from RON text
    pub fn from_ron_str(content: &str) -> std::io::Result<Self> {
        let settings: Settings = ron::from_str(content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;

        if settings.version > SETTINGS_FORMAT_VERSION {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!(
                    "Settings version {} is newer than supported version {}",
                    settings.version, SETTINGS_FORMAT_VERSION
                ),
            ));
        }

        Ok(settings)
    }

    /// Save settings to a file
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let config = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);

        let content = ron::ser::to_string_pretty(self, config)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;

        std::fs::write(path, content)
    }

    /// Get the settings file path for a directory
    pub fn settings_file_path(dir: &Path) -> PathBuf {
        dir.join(SETTINGS_FILE_NAME)
    }

    /// Build the converter configuration. Unknown filter names are logged and skipped.
    pub fn converter_config(&self) -> ConverterConfig {
        let (filter_chain, unknown) = FilterChain::from_names(self.filters.iter().map(String::as_str));
        for name in &unknown {
            tracing::warn!(filter = %name, "Unknown filter; ignoring");
        }
        ConverterConfig::default()
            .with_source_types(self.source_types.iter().cloned())
            .with_filter_chain(filter_chain)
    }

    /// Shader package for these settings, with relative roots taken from `base_dir`
    pub fn package(&self, base_dir: &Path) -> ShaderPackage {
        ShaderPackage::new(self.shader_roots.iter().map(|root| {
            if root.is_absolute() {
                root.clone()
            } else {
                base_dir.join(root)
            }
        }))
    }

    /// Watch debounce as a duration
    pub fn watch_debounce(&self) -> Duration {
        Duration::from_millis(self.watch_debounce_ms)
    }
}
