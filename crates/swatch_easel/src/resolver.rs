//! Render-time class resolution.

use serde::{Deserialize, Serialize};
use swatch_carton::CompactString;

use crate::diagnostic::{DiagnosticSink, StyleDiagnostic, TracingSink};
use crate::owner::StyleOwner;

/// Resolution options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveOptions {
    /// Drop the empty slot of a missing name instead of keeping its separator.
    ///
    /// Off by default: `"a missing b"` resolves to `"A  B"` so the gap stays
    /// visible next to the diagnostic.
    #[serde(default)]
    pub elide_missing: bool,
}

/// Resolves semantic class names against an owner's style map.
///
/// Stateless apart from its sink: every call depends only on the owner's map
/// and the requested names.
#[derive(Debug, Default)]
pub struct StyleResolver<S = TracingSink> {
    sink: S,
    options: ResolveOptions,
}

impl StyleResolver<TracingSink> {
    /// Resolver reporting through `tracing`.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S: DiagnosticSink> StyleResolver<S> {
    pub fn with_sink(sink: S) -> Self {
        Self {
            sink,
            options: ResolveOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ResolveOptions) -> Self {
        self.options = options;
        self
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn options(&self) -> ResolveOptions {
        self.options
    }

    /// Resolve ASCII-whitespace-separated semantic names into a class attribute.
    ///
    /// Tokens keep their order and each contributes one slot. A name that is
    /// missing (or maps to an empty string) contributes an empty slot and one
    /// diagnostic. An owner without a style map yields `""` and a single
    /// diagnostic, whatever was requested.
    pub fn resolve<O>(&self, owner: &O, class_names: &str) -> String
    where
        O: StyleOwner + ?Sized,
    {
        let Some(styles) = owner.styles() else {
            self.sink.report(StyleDiagnostic::MissingStyleMap {
                owner: CompactString::from(owner.owner_name()),
            });
            return String::new();
        };

        let mut out = String::with_capacity(class_names.len() * 2);
        let mut first = true;
        for name in class_names.split_ascii_whitespace() {
            let emitted = match styles.get(name) {
                Some(emitted) if !emitted.is_empty() => emitted,
                _ => {
                    self.sink.report(StyleDiagnostic::MissingClass {
                        owner: CompactString::from(owner.owner_name()),
                        name: CompactString::from(name),
                    });
                    if self.options.elide_missing {
                        continue;
                    }
                    ""
                }
            };

            if !first {
                out.push(' ');
            }
            first = false;
            out.push_str(emitted);
        }
        out
    }
}

/// Resolve with the default resolver, reporting through `tracing`.
///
/// This is the two-argument entry point template helpers call.
pub fn resolve_styles<O>(owner: &O, class_names: &str) -> String
where
    O: StyleOwner + ?Sized,
{
    StyleResolver::new().resolve(owner, class_names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::CollectingSink;
    use crate::owner::OwnerRef;
    use std::sync::{Arc, Mutex};
    use swatch_carton::StyleMap;

    fn styles() -> StyleMap {
        [("a", "X"), ("b", "Y"), ("c", "Z"), ("blank", "")]
            .into_iter()
            .collect()
    }

    fn resolver() -> StyleResolver<CollectingSink> {
        StyleResolver::with_sink(CollectingSink::new())
    }

    #[derive(Clone, Default)]
    struct CapturedLog(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_default_sink_emits_error_event() {
        let log = CapturedLog::default();
        let writer = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .without_time()
            .with_target(false)
            .finish();

        let map = styles();
        let owner = OwnerRef::new("Widget", &map);
        let resolved = tracing::subscriber::with_default(subscriber, || {
            resolve_styles(&owner, "a missing")
        });
        assert_eq!(resolved, "X ");

        let output = String::from_utf8(log.0.lock().unwrap().clone()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 1, "{output}");
        assert!(lines[0].contains("ERROR"));
        assert!(lines[0].contains("owner=Widget"));
        assert!(lines[0].contains("name=missing"));
    }

    #[test]
    fn test_only_ascii_whitespace_separates() {
        let map: StyleMap = [("a", "X"), ("a\u{a0}b", "NB")].into_iter().collect();
        let owner = OwnerRef::new("w", &map);
        let resolver = resolver();
        assert_eq!(resolver.resolve(&owner, "a\u{a0}b\ta\x0ca\r\na"), "NB X X X");
        assert!(resolver.sink().is_empty());
    }

    #[test]
    fn test_every_known_name_resolves_to_its_value() {
        let styles = styles();
        let owner = OwnerRef::new("w", &styles);
        let resolver = resolver();
        for (name, emitted) in styles.iter().filter(|(_, e)| !e.is_empty()) {
            assert_eq!(resolver.resolve(&owner, name), emitted);
        }
        assert!(resolver.sink().is_empty());
    }

    #[test]
    fn test_multiple_names_keep_order() {
        let styles = styles();
        let resolver = resolver();
        assert_eq!(resolver.resolve(&OwnerRef::new("w", &styles), "c a b"), "Z X Y");
    }

    #[test]
    fn test_missing_name_leaves_empty_slot() {
        let styles: StyleMap = [("a", "X"), ("c", "Z")].into_iter().collect();
        let resolver = resolver();
        assert_eq!(resolver.resolve(&OwnerRef::new("w", &styles), "a b c"), "X  Z");

        let diagnostics = resolver.sink().take();
        assert_eq!(
            diagnostics,
            vec![StyleDiagnostic::MissingClass {
                owner: "w".into(),
                name: "b".into(),
            }]
        );
    }

    #[test]
    fn test_missing_name_at_edges() {
        let styles = styles();
        let owner = OwnerRef::new("w", &styles);
        let resolver = resolver();
        assert_eq!(resolver.resolve(&owner, "nope a"), " X");
        assert_eq!(resolver.resolve(&owner, "a nope"), "X ");
        assert_eq!(resolver.resolve(&owner, "nope"), "");
        assert_eq!(resolver.sink().len(), 3);
    }

    #[test]
    fn test_empty_value_counts_as_missing() {
        let styles = styles();
        let resolver = resolver();
        assert_eq!(resolver.resolve(&OwnerRef::new("w", &styles), "blank a"), " X");
        assert_eq!(resolver.sink().take()[0].name(), Some("blank"));
    }

    #[test]
    fn test_whitespace_runs_do_not_make_tokens() {
        let styles = styles();
        let resolver = resolver();
        assert_eq!(
            resolver.resolve(&OwnerRef::new("w", &styles), "  a \t\n b  "),
            "X Y"
        );
        assert_eq!(resolver.resolve(&OwnerRef::new("w", &styles), "   "), "");
        assert!(resolver.sink().is_empty());
    }

    #[test]
    fn test_owner_without_styles_reports_once() {
        let resolver = resolver();
        let owner = OwnerRef::unstyled("route1");
        assert_eq!(resolver.resolve(&owner, "a b c d"), "");

        let diagnostics = resolver.sink().take();
        assert_eq!(
            diagnostics,
            vec![StyleDiagnostic::MissingStyleMap {
                owner: "route1".into()
            }]
        );
    }

    #[test]
    fn test_elide_missing() {
        let styles = styles();
        let resolver = resolver().with_options(ResolveOptions {
            elide_missing: true,
        });
        assert_eq!(resolver.resolve(&OwnerRef::new("w", &styles), "a nope c"), "X Z");
        assert_eq!(resolver.sink().len(), 1);
    }

    #[test]
    fn test_resolver_is_stateless() {
        let styles = styles();
        let owner = OwnerRef::new("w", &styles);
        let resolver = resolver();
        let first = resolver.resolve(&owner, "a nope b");
        let second = resolver.resolve(&owner, "a nope b");
        assert_eq!(first, second);
    }

    #[test]
    fn test_trait_object_owner() {
        let styles = styles();
        let owner: &dyn StyleOwner = &OwnerRef::new("w", &styles);
        assert_eq!(resolve_styles(owner, "a"), "X");
    }
}
