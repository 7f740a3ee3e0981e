//! Configuration file loading for swatch.
//!
//! Reads `swatch.config.json` from the project root (the working directory
//! unless `--root` says otherwise).

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::Path;
use swatch_atelier::{CompileOptions, NamingScheme, ScopeMode};

/// Config file name looked up in the project root.
pub const CONFIG_FILE: &str = "swatch.config.json";

/// Build environment, selecting the option preset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Env {
    /// Readable names with source maps
    #[default]
    Development,
    /// Hashed names, minified
    Production,
}

/// Top-level swatch configuration.
///
/// Every field is optional; unset fields fall back to the preset chosen by
/// `env`.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwatchConfig {
    /// JSON Schema reference (for editor autocompletion).
    #[serde(rename = "$schema", default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<Env>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme: Option<NamingScheme>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope_mode: Option<ScopeMode>,

    #[serde(default, alias = "sourceMapsEnabled", skip_serializing_if = "Option::is_none")]
    pub source_map: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minify: Option<bool>,

    /// Identifiers owned by the build (e.g. `["ember-application"]`).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reserved: Vec<String>,
}

impl SwatchConfig {
    /// Compile options for this config, with `env` picking the preset.
    pub fn compile_options(&self) -> CompileOptions {
        let mut options = match self.env.unwrap_or_default() {
            Env::Development => CompileOptions::development(),
            Env::Production => CompileOptions::production(),
        };
        if let Some(scheme) = self.scheme {
            options.scheme = scheme;
        }
        if let Some(scope_mode) = self.scope_mode {
            options.scope_mode = scope_mode;
        }
        if let Some(source_map) = self.source_map {
            options.source_map = source_map;
        }
        if let Some(minify) = self.minify {
            options.minify = minify;
        }
        options.reserved = self.reserved.clone();
        options
    }
}

/// Load `swatch.config.json` from the given directory (or CWD if None).
pub fn load_config(dir: Option<&Path>) -> SwatchConfig {
    let base = dir
        .map(|d| d.to_path_buf())
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_default());
    let config_path = base.join(CONFIG_FILE);

    if !config_path.exists() {
        return SwatchConfig::default();
    }

    match std::fs::read_to_string(&config_path) {
        Ok(content) => match serde_json::from_str(&content) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to parse {}: {}", config_path.display(), e);
                SwatchConfig::default()
            }
        },
        Err(e) => {
            tracing::warn!("Failed to read {}: {}", config_path.display(), e);
            SwatchConfig::default()
        }
    }
}
