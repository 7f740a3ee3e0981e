//! Resolution diagnostics and where they go.

use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use swatch_carton::CompactString;
use thiserror::Error;

/// Something a template asked for that could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum StyleDiagnostic {
    /// The owner has no style map attached
    #[error(
        "Import and assign your styles to your component class or controller class (owner: {owner})"
    )]
    MissingStyleMap { owner: CompactString },

    /// A requested name is not in the owner's style map
    #[error("The class or id named '{name}' does not exist (owner: {owner})")]
    MissingClass {
        owner: CompactString,
        name: CompactString,
    },
}

impl StyleDiagnostic {
    pub fn owner(&self) -> &str {
        match self {
            StyleDiagnostic::MissingStyleMap { owner }
            | StyleDiagnostic::MissingClass { owner, .. } => owner.as_str(),
        }
    }

    /// The missing semantic name, if the diagnostic is about one.
    pub fn name(&self) -> Option<&str> {
        match self {
            StyleDiagnostic::MissingStyleMap { .. } => None,
            StyleDiagnostic::MissingClass { name, .. } => Some(name.as_str()),
        }
    }
}

/// Receives resolver diagnostics.
pub trait DiagnosticSink {
    fn report(&self, diagnostic: StyleDiagnostic);
}

impl<F> DiagnosticSink for F
where
    F: Fn(StyleDiagnostic),
{
    fn report(&self, diagnostic: StyleDiagnostic) {
        self(diagnostic)
    }
}

/// Emits diagnostics as `tracing` error events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, diagnostic: StyleDiagnostic) {
        match &diagnostic {
            StyleDiagnostic::MissingStyleMap { owner } => {
                tracing::error!(owner = %owner, "{}", diagnostic);
            }
            StyleDiagnostic::MissingClass { owner, name } => {
                tracing::error!(owner = %owner, name = %name, "{}", diagnostic);
            }
        }
    }
}

/// Keeps diagnostics in memory, for tests and for callers that surface them
/// in their own UI.
#[derive(Debug, Default)]
pub struct CollectingSink {
    diagnostics: Mutex<Vec<StyleDiagnostic>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything reported so far.
    pub fn diagnostics(&self) -> Vec<StyleDiagnostic> {
        self.lock().clone()
    }

    /// Drain everything reported so far.
    pub fn take(&self) -> Vec<StyleDiagnostic> {
        std::mem::take(&mut *self.lock())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<StyleDiagnostic>> {
        self.diagnostics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&self, diagnostic: StyleDiagnostic) {
        self.lock().push(diagnostic);
    }
}
