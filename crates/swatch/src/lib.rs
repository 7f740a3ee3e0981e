//! # Swatch
//!
//! Symbolic CSS module class names for component templates.
//!
//! This crate re-exports all Swatch sub-crates for unified documentation.
//!
//! ## Crates
//!
//! - [`carton`] - Shared toolbox: the `StyleMap` and identifier helpers
//! - [`atelier`] - Build-time style module compiler
//! - [`easel`] - Render-time style class resolver
//!
//! ## Flow
//!
//! ```
//! use swatch::atelier::{compile_style_module, CompileOptions};
//! use swatch::easel::{OwnerRef, StyleResolver, CollectingSink};
//!
//! let module = compile_style_module(
//!     ".button { color: red; }",
//!     &CompileOptions {
//!         filename: Some("components/my-widget.css".into()),
//!         ..CompileOptions::development()
//!     },
//! )
//! .unwrap();
//!
//! let resolver = StyleResolver::with_sink(CollectingSink::new());
//! let owner = OwnerRef::new("my-widget", &module.styles);
//! assert_eq!(resolver.resolve(&owner, "button"), "components_my-widget__button");
//! ```

/// Shared toolbox: the `StyleMap` and identifier helpers.
pub use swatch_carton as carton;

/// Build-time style module compiler.
pub use swatch_atelier as atelier;

/// Render-time style class resolver.
pub use swatch_easel as easel;
