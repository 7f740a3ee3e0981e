//! Style module compilation.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use swatch_carton::StyleMap;

use crate::css;
use crate::error::{CompileError, CompileWarning};
use crate::naming::{normalize_module_path, LocalNamer};
use crate::options::{CompileOptions, NamingScheme};
use crate::scope::{rewrite_local_names, ScopedCss};
use crate::source_map::SourceMapV3;

/// A compiled stylesheet and the map that addresses its local names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleModule {
    /// Normalized module path
    pub filename: String,

    /// Rewritten stylesheet
    pub css: String,

    /// Source map JSON (readable scheme with source maps enabled only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub map: Option<String>,

    /// Semantic to emitted class names
    pub styles: StyleMap,

    /// Warnings during compilation
    #[serde(default)]
    pub warnings: Vec<CompileWarning>,
}

impl StyleModule {
    /// Render the map as an ES module: `export default { ... };`.
    ///
    /// `__proto__` is written as a computed key so it defines a property
    /// instead of setting the prototype.
    pub fn to_js_module(&self) -> String {
        if self.styles.is_empty() {
            return "export default {};\n".to_string();
        }

        let mut out = String::from("export default {\n");
        for (semantic, emitted) in self.styles.iter() {
            let key = serde_json::Value::from(semantic);
            let value = serde_json::Value::from(emitted);
            if semantic == "__proto__" {
                let _ = writeln!(out, "  [{}]: {},", key, value);
            } else {
                let _ = writeln!(out, "  {}: {},", key, value);
            }
        }
        out.push_str("};\n");
        out
    }
}

/// Compile one stylesheet into a [`StyleModule`].
///
/// Each call is independent; many files may be compiled concurrently.
pub fn compile_style_module(
    source: &str,
    options: &CompileOptions,
) -> Result<StyleModule, CompileError> {
    let filename = normalize_module_path(options.filename());

    css::validate(source, &filename)?;

    let namer = LocalNamer::new(options.scheme, &filename);
    // Minified output no longer lines up with the recorded positions.
    let with_map =
        options.source_map && options.scheme == NamingScheme::Readable && !options.minify;

    let ScopedCss {
        css: scoped_css,
        mappings,
        exports,
        globals,
    } = rewrite_local_names(source, &filename, options.scope_mode, &namer, with_map)?;

    let code = if options.minify {
        css::minify(&scoped_css, &filename)?
    } else {
        scoped_css
    };

    let map = mappings.map(|mappings| SourceMapV3::new(&filename, source, mappings).to_json());

    let mut warnings = Vec::new();
    for (local, emitted) in &exports {
        let emitted = emitted.as_str();
        if options.reserved.iter().any(|r| r == emitted) {
            warnings.push(CompileWarning {
                message: format!(
                    "Emitted name `{}` for `{}` collides with a reserved identifier",
                    emitted, local
                ),
            });
        } else if globals.contains(emitted) {
            warnings.push(CompileWarning {
                message: format!(
                    "Emitted name `{}` for `{}` collides with a global class in the same stylesheet",
                    emitted, local
                ),
            });
        }
    }
    for warning in &warnings {
        tracing::warn!(filename = %filename, "{}", warning);
    }

    let styles = StyleMap::from(exports);
    tracing::debug!(
        filename = %filename,
        scheme = ?options.scheme,
        exports = styles.len(),
        "compiled style module"
    );

    Ok(StyleModule {
        filename,
        css: code,
        map,
        styles,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ScopeMode;

    fn options(scheme: NamingScheme) -> CompileOptions {
        CompileOptions {
            filename: Some("components/my-widget.css".to_string()),
            scheme,
            ..Default::default()
        }
    }

    #[test]
    fn test_readable_module() {
        let module = compile_style_module(
            ".button { color: red; }\n.title { font-weight: bold; }\n",
            &options(NamingScheme::Readable),
        )
        .unwrap();

        insta::assert_snapshot!(module.css.trim_end(), @r"
        .components_my-widget__button { color: red; }
        .components_my-widget__title { font-weight: bold; }
        ");
        insta::assert_snapshot!(module.to_js_module().trim_end(), @r#"
        export default {
          "button": "components_my-widget__button",
          "title": "components_my-widget__title",
        };
        "#);
        assert!(module.warnings.is_empty());
        assert!(module.map.is_none());
    }

    #[test]
    fn test_hashed_names_are_deterministic() {
        let source = ".button {}\n.title {}\n#main {}";
        let first = compile_style_module(source, &options(NamingScheme::Hashed)).unwrap();
        let second = compile_style_module(source, &options(NamingScheme::Hashed)).unwrap();
        assert_eq!(first.styles, second.styles);
        assert_eq!(first.css, second.css);
        assert_eq!(first.styles.len(), 3);
    }

    #[test]
    fn test_schemes_differ() {
        let source = ".button {}";
        let hashed = compile_style_module(source, &options(NamingScheme::Hashed)).unwrap();
        let readable = compile_style_module(source, &options(NamingScheme::Readable)).unwrap();
        assert_ne!(hashed.styles.get("button"), readable.styles.get("button"));
        assert_ne!(hashed.styles.get("button"), Some("button"));
        assert_ne!(readable.styles.get("button"), Some("button"));
    }

    #[test]
    fn test_source_map_only_for_readable() {
        let source = ".button { color: red; }";
        let readable = compile_style_module(
            source,
            &CompileOptions {
                source_map: true,
                ..options(NamingScheme::Readable)
            },
        )
        .unwrap();
        let map: SourceMapV3 = serde_json::from_str(readable.map.as_deref().unwrap()).unwrap();
        assert_eq!(map.version, 3);
        assert_eq!(map.sources, vec!["components/my-widget.css"]);
        assert_eq!(map.sources_content, vec![source]);
        assert_eq!(map.mappings, "AAAA,CAAC,4BAAM");

        let hashed = compile_style_module(
            source,
            &CompileOptions {
                source_map: true,
                ..options(NamingScheme::Hashed)
            },
        )
        .unwrap();
        assert!(hashed.map.is_none());
    }

    #[test]
    fn test_global_scope_mode_exports_only_local() {
        let module = compile_style_module(
            ".page .header {}\n:local(.button) {}",
            &CompileOptions {
                scope_mode: ScopeMode::Global,
                ..options(NamingScheme::Readable)
            },
        )
        .unwrap();
        assert_eq!(module.css, ".page .header {}\n.components_my-widget__button {}");
        assert_eq!(module.styles.names().collect::<Vec<_>>(), vec!["button"]);
    }

    #[test]
    fn test_bare_global_in_local_mode() {
        let production = CompileOptions {
            filename: Some("components/my-widget.css".to_string()),
            ..CompileOptions::production()
        };
        for options in [options(NamingScheme::Readable), production] {
            let module = compile_style_module(":global .x .y, .z {}", &options).unwrap();
            assert_eq!(module.styles.names().collect::<Vec<_>>(), vec!["z"]);
        }

        let module =
            compile_style_module(":global .x .y, .z {}", &options(NamingScheme::Readable)).unwrap();
        assert_eq!(module.css, ".x .y, .components_my-widget__z {}");
    }

    #[test]
    fn test_bare_local_in_global_mode() {
        let module = compile_style_module(
            ":local .a .b, .c {}",
            &CompileOptions {
                scope_mode: ScopeMode::Global,
                ..options(NamingScheme::Readable)
            },
        )
        .unwrap();
        assert_eq!(
            module.css,
            ".components_my-widget__a .components_my-widget__b, .c {}"
        );
        assert_eq!(module.styles.names().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_proto_key_is_computed() {
        let module = compile_style_module(
            ".__proto__ {}\n.button {}",
            &options(NamingScheme::Readable),
        )
        .unwrap();
        insta::assert_snapshot!(module.to_js_module().trim_end(), @r#"
        export default {
          ["__proto__"]: "components_my-widget____proto__",
          "button": "components_my-widget__button",
        };
        "#);
    }

    #[test]
    fn test_reserved_collision_warns() {
        let module = compile_style_module(
            ".button {}",
            &CompileOptions {
                reserved: vec!["components_my-widget__button".to_string()],
                ..options(NamingScheme::Readable)
            },
        )
        .unwrap();
        assert_eq!(module.warnings.len(), 1);
        assert!(module.warnings[0].message.contains("reserved"));
    }

    #[test]
    fn test_parse_error_has_no_map() {
        let err = compile_style_module(".button { color: red;", &options(NamingScheme::Readable))
            .unwrap_err();
        assert_eq!(err.filename(), "components/my-widget.css");
        assert!(matches!(err, CompileError::Parse { line: 1, .. }));
    }

    #[test]
    fn test_empty_module() {
        let module = compile_style_module("", &options(NamingScheme::Hashed)).unwrap();
        assert!(module.styles.is_empty());
        assert_eq!(module.to_js_module(), "export default {};\n");
    }

    #[test]
    #[cfg(feature = "native")]
    fn test_production_preset_minifies() {
        let module = compile_style_module(
            ".button {\n  color: red;\n}\n",
            &CompileOptions {
                filename: Some("components/my-widget.css".to_string()),
                ..CompileOptions::production()
            },
        )
        .unwrap();
        let emitted = module.styles.get("button").unwrap();
        assert!(module.css.contains(emitted));
        assert!(!module.css.contains('\n'));
        assert!(module.map.is_none());
    }
}
