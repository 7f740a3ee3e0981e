//! # swatch_easel
//!
//! Easel - The render-time style class resolver for Swatch.
//!
//! ## Name Origin
//!
//! An **easel** holds the canvas while the painting happens. `swatch_easel`
//! runs while a template renders: given the owner of a template and a list of
//! semantic class names, it looks each one up in the owner's [`StyleMap`] and
//! returns the class attribute string.
//!
//! ## Failure policy
//!
//! Resolution never fails. An owner without a style map yields an empty
//! string and one diagnostic; an unknown name yields an empty slot and one
//! diagnostic naming it. Diagnostics go to an injected [`DiagnosticSink`]
//! ([`TracingSink`] by default).
//!
//! ## Usage
//!
//! ```
//! use swatch_carton::StyleMap;
//! use swatch_easel::{CollectingSink, StyleOwner, StyleResolver};
//!
//! struct MyWidget {
//!     styles: StyleMap,
//! }
//!
//! impl StyleOwner for MyWidget {
//!     fn styles(&self) -> Option<&StyleMap> {
//!         Some(&self.styles)
//!     }
//! }
//!
//! let widget = MyWidget {
//!     styles: [("button", "components_my-widget__button")].into_iter().collect(),
//! };
//!
//! let resolver = StyleResolver::with_sink(CollectingSink::new());
//! assert_eq!(
//!     resolver.resolve(&widget, "button missing"),
//!     "components_my-widget__button "
//! );
//! assert_eq!(resolver.sink().len(), 1);
//! ```

mod diagnostic;
mod owner;
mod resolver;

pub use diagnostic::{CollectingSink, DiagnosticSink, StyleDiagnostic, TracingSink};
pub use owner::{OwnerRef, StyleOwner};
pub use resolver::{resolve_styles, ResolveOptions, StyleResolver};
pub use swatch_carton::StyleMap;
