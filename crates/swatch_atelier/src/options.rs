//! Compilation options.

use serde::{Deserialize, Serialize};

/// Module path used when no filename is given.
pub const DEFAULT_FILENAME: &str = "style.css";

/// How emitted class names are derived.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamingScheme {
    /// Fixed-length digest, for optimized builds
    Hashed,
    /// `[path][name]__[local]`, for development builds
    #[default]
    Readable,
}

/// Which selectors are renamed when nothing says otherwise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeMode {
    /// Selectors stay as written; only `:local(...)` names are renamed
    Global,
    /// Every class and id is renamed unless wrapped in `:global(...)`
    #[default]
    Local,
}

/// Style module compilation options
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileOptions {
    /// Module path relative to the project root (e.g. "components/my-widget.css")
    #[serde(default)]
    pub filename: Option<String>,

    /// Naming scheme for emitted class names
    #[serde(default)]
    pub scheme: NamingScheme,

    /// Default scoping of class and id selectors
    #[serde(default)]
    pub scope_mode: ScopeMode,

    /// Whether to generate a source map (readable scheme only)
    #[serde(default, alias = "sourceMapsEnabled")]
    pub source_map: bool,

    /// Whether to minify the output
    #[serde(default)]
    pub minify: bool,

    /// Identifiers owned by the build that emitted names must not reuse
    #[serde(default)]
    pub reserved: Vec<String>,
}

impl CompileOptions {
    /// Optimized build: hashed names, minified, no source map.
    pub fn production() -> Self {
        Self {
            scheme: NamingScheme::Hashed,
            minify: true,
            source_map: false,
            ..Default::default()
        }
    }

    /// Development build: readable names with a source map.
    pub fn development() -> Self {
        Self {
            scheme: NamingScheme::Readable,
            source_map: true,
            ..Default::default()
        }
    }

    /// Module path used for naming and diagnostics.
    pub fn filename(&self) -> &str {
        self.filename.as_deref().unwrap_or(DEFAULT_FILENAME)
    }
}
