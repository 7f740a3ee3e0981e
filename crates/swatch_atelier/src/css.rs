//! Stylesheet validation and minification using LightningCSS.
//!
//! When the `native` feature is disabled (e.g., for wasm builds), validation
//! is left to the scoping pass and minification is a passthrough.

#[cfg(feature = "native")]
use lightningcss::printer::PrinterOptions;
#[cfg(feature = "native")]
use lightningcss::stylesheet::{MinifyOptions, ParserOptions, StyleSheet};

use crate::error::CompileError;

/// Parse the authored stylesheet, failing on malformed syntax.
///
/// CSS-module mode stays off: it rejects a bare `:global`/`:local`, which the
/// scoping pass handles. Both forms parse as unknown pseudo-classes here.
#[cfg(feature = "native")]
pub(crate) fn validate(source: &str, filename: &str) -> Result<(), CompileError> {
    let parser_options = ParserOptions {
        filename: filename.to_string(),
        ..Default::default()
    };

    match StyleSheet::parse(source, parser_options) {
        Ok(_) => Ok(()),
        Err(e) => {
            // LightningCSS lines are 0-based, columns 1-based
            let (line, column) = e
                .loc
                .as_ref()
                .map_or((1, 1), |loc| (loc.line + 1, loc.column));
            Err(CompileError::Parse {
                filename: filename.to_string(),
                line,
                column,
                message: e.kind.to_string(),
            })
        }
    }
}

#[cfg(not(feature = "native"))]
pub(crate) fn validate(_source: &str, _filename: &str) -> Result<(), CompileError> {
    Ok(())
}

/// Re-print a rewritten stylesheet in minified form.
#[cfg(feature = "native")]
pub(crate) fn minify(css: &str, filename: &str) -> Result<String, CompileError> {
    let parser_options = ParserOptions {
        filename: filename.to_string(),
        ..Default::default()
    };

    let mut stylesheet = StyleSheet::parse(css, parser_options).map_err(|e| CompileError::Parse {
        filename: filename.to_string(),
        line: e.loc.as_ref().map_or(1, |loc| loc.line + 1),
        column: e.loc.as_ref().map_or(1, |loc| loc.column),
        message: e.kind.to_string(),
    })?;

    stylesheet
        .minify(MinifyOptions::default())
        .map_err(|e| CompileError::Minify {
            filename: filename.to_string(),
            message: format!("{:?}", e),
        })?;

    let printer_options = PrinterOptions {
        minify: true,
        ..Default::default()
    };

    stylesheet
        .to_css(printer_options)
        .map(|result| result.code)
        .map_err(|e| CompileError::Print {
            filename: filename.to_string(),
            message: format!("{:?}", e),
        })
}

#[cfg(not(feature = "native"))]
pub(crate) fn minify(css: &str, _filename: &str) -> Result<String, CompileError> {
    Ok(css.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_module_pseudo_classes() {
        assert!(validate(".a :global(.b) { color: red; }", "a.css").is_ok());
        assert!(validate(":local(.a) { color: red; }", "a.css").is_ok());
    }

    #[test]
    fn test_validate_accepts_bare_module_pseudo_classes() {
        assert!(validate(":global .x .y, .z { color: red; }", "a.css").is_ok());
        assert!(validate(":local .a .b, .c { color: red; }", "a.css").is_ok());
    }

    #[test]
    #[cfg(feature = "native")]
    fn test_validate_reports_location() {
        let err = validate(".a {}\n.b..c { color: red; }", "a.css").unwrap_err();
        match err {
            CompileError::Parse { filename, line, .. } => {
                assert_eq!(filename, "a.css");
                assert_eq!(line, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    #[cfg(feature = "native")]
    fn test_minify() {
        let css = ".a {\n  color: red;\n  background: blue;\n}\n";
        let result = minify(css, "a.css").unwrap();
        assert!(!result.contains('\n'));
        assert!(result.contains(".a"));
    }
}
