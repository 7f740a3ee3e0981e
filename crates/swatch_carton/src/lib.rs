//! Carton - The shared toolbox for Swatch.
//!
//! Holds the pieces both halves of Swatch agree on: the [`StyleMap`] produced
//! by the compiler and read by the resolver, identifier helpers used when
//! naming emitted classes, and content hashing for build caching.
//!
//! # Example
//!
//! ```
//! use swatch_carton::StyleMap;
//!
//! let styles: StyleMap = [("button", "components_my-widget__button")]
//!     .into_iter()
//!     .collect();
//!
//! assert_eq!(styles.get("button"), Some("components_my-widget__button"));
//! assert_eq!(styles.get("missing"), None);
//! ```

pub mod hash;
pub mod ident;
pub mod style_map;

pub use style_map::{FxIndexMap, StyleMap};

// Re-export compact_str::CompactString for convenience
pub use compact_str::CompactString;

// Re-export smallvec for stack-optimized collections
pub use smallvec::{smallvec, SmallVec};

// Re-export rustc-hash for fast hash maps/sets
pub use rustc_hash::{FxBuildHasher, FxHashMap, FxHashSet};
