//! In-process backend for plain CSS bundles, built on `lightningcss`.

use lightningcss::rules::{CssRule, CssRuleList};
use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};

use crate::adapter::{BoxError, StylesheetCompiler};

/// Parses and re-prints stylesheets with `lightningcss`.
///
/// Handles CSS only. Syntax errors are reported rather than recovered from,
/// and so are at-rules lightningcss does not know (which is how LESS
/// variable declarations such as `@primary: #336699;` parse), so LESS
/// sources fail instead of being cached uncompiled. Use
/// [`LesscCompiler`](crate::LesscCompiler) for LESS.
#[derive(Debug, Clone, Default)]
pub struct LightningCompiler {
    minify: bool,
}

impl LightningCompiler {
    /// Creates a compiler that pretty-prints its output.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether output whitespace is stripped.
    pub fn minify(mut self, minify: bool) -> Self {
        self.minify = minify;
        self
    }
}

impl StylesheetCompiler for LightningCompiler {
    fn name(&self) -> &str {
        "lightningcss"
    }

    fn compile(&self, source: &str) -> Result<String, BoxError> {
        let sheet = StyleSheet::parse(source, ParserOptions::default())
            .map_err(|e| e.to_string())?;
        reject_unknown_at_rules(&sheet.rules)?;
        let printed = sheet
            .to_css(PrinterOptions {
                minify: self.minify,
                ..PrinterOptions::default()
            })
            .map_err(|e| e.to_string())?;
        Ok(printed.code)
    }
}

/// Fails on the first at-rule lightningcss passes through unparsed.
fn reject_unknown_at_rules(rules: &CssRuleList<'_>) -> Result<(), String> {
    for rule in &rules.0 {
        match rule {
            CssRule::Unknown(at) => {
                let name: &str = &at.name;
                return Err(format!("unsupported at-rule @{name}"));
            }
            CssRule::Style(style) => reject_unknown_at_rules(&style.rules)?,
            CssRule::Media(media) => reject_unknown_at_rules(&media.rules)?,
            _ => {}
        }
    }
    Ok(())
}
