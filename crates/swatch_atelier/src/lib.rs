//! # swatch_atelier
//!
//! Atelier - The style module compiler for Swatch.
//!
//! ## Name Origin
//!
//! An **atelier** is the workshop where raw pigment becomes finished work.
//! `swatch_atelier` takes an authored stylesheet, gives every locally scoped
//! class and id a build-unique name, and hands back the rewritten sheet
//! together with the [`StyleMap`] that lets components refer to those names
//! symbolically.
//!
//! ## Usage
//!
//! ```
//! use swatch_atelier::{compile_style_module, CompileOptions};
//!
//! let options = CompileOptions {
//!     filename: Some("components/my-widget.css".to_string()),
//!     ..CompileOptions::development()
//! };
//! let module = compile_style_module(".button { color: red; }", &options).unwrap();
//!
//! assert_eq!(module.styles.get("button"), Some("components_my-widget__button"));
//! assert!(module.css.contains(".components_my-widget__button"));
//! ```
//!
//! ## Naming schemes
//!
//! - [`NamingScheme::Readable`]: `[path][name]__[local]`, for development builds.
//! - [`NamingScheme::Hashed`]: five characters of a SHA-512 digest, for
//!   optimized builds. Collisions between modules are not detected; with a
//!   64-symbol alphabet there is a 50% chance of at least one collision once
//!   roughly 38,600 distinct names share a build.

mod compile;
mod css;
mod error;
mod location;
mod naming;
mod options;
mod scope;
mod source_map;

pub use compile::{compile_style_module, StyleModule};
pub use error::{CompileError, CompileWarning};
pub use naming::{emitted_name, normalize_module_path, HASH_LENGTH, SCHEME_VERSION};
pub use options::{CompileOptions, NamingScheme, ScopeMode, DEFAULT_FILENAME};
pub use source_map::SourceMapV3;
pub use swatch_carton::StyleMap;
