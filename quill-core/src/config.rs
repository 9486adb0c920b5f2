//! Rendering configuration.

use std::str::FromStr;

use serde::Deserialize;

use crate::{ConfigSource, Error, Indent, Result};

/// Column budget used when nothing else is configured.
pub const DEFAULT_COLUMN_LIMIT: usize = 100;

/// Settings shared by every render call.
///
/// Loaded from TOML either as a bare table or nested under `[render]`:
///
/// ```toml
/// [render]
/// column_limit = 80
/// indent = { spaces = 4 }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Indentation unit for one level.
    pub indent: Indent,
    /// Maximum line width before the wrapper breaks at a wrap point.
    pub column_limit: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            indent: Indent::default(),
            column_limit: DEFAULT_COLUMN_LIMIT,
        }
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RenderSection {
    render: RenderConfig,
}

impl RenderConfig {
    pub fn with_indent(mut self, indent: Indent) -> Self {
        self.indent = indent;
        self
    }

    pub fn with_column_limit(mut self, column_limit: usize) -> Self {
        self.column_limit = column_limit;
        self
    }

    /// Parse a configuration document, using `filename` in diagnostics.
    pub fn from_toml_str(content: &str, filename: &str) -> Result<Self> {
        let source = ConfigSource::new(content, filename);
        let table: toml::Table = toml::from_str(content).map_err(|e| source.parse_error(e))?;

        let config = if table.contains_key("render") {
            toml::from_str::<RenderSection>(content)
                .map_err(|e| source.parse_error(e))?
                .render
        } else {
            toml::from_str::<RenderConfig>(content).map_err(|e| source.parse_error(e))?
        };

        config.validate()?;
        Ok(config)
    }

    /// Check the value ranges serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.column_limit < 2 {
            return Err(Error::invalid_config(format!(
                "column_limit must be at least 2, got {}",
                self.column_limit
            )));
        }
        if self.indent == Indent::Spaces(0) {
            return Err(Error::invalid_config("indent must be at least one space"));
        }
        Ok(())
    }
}

impl FromStr for RenderConfig {
    type Err = Box<Error>;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_toml_str(s, "quill.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RenderConfig::default();
        assert_eq!(config.indent, Indent::Spaces(2));
        assert_eq!(config.column_limit, 100);
    }

    #[test]
    fn test_parse_bare_table() {
        let config: RenderConfig = "column_limit = 80\nindent = { spaces = 4 }"
            .parse()
            .unwrap();
        assert_eq!(config.column_limit, 80);
        assert_eq!(config.indent, Indent::Spaces(4));
    }

    #[test]
    fn test_parse_render_section() {
        let config: RenderConfig = "[render]\nindent = \"tab\"".parse().unwrap();
        assert_eq!(config.indent, Indent::Tab);
        assert_eq!(config.column_limit, DEFAULT_COLUMN_LIMIT);
    }

    #[test]
    fn test_empty_document_is_default() {
        let config: RenderConfig = "".parse().unwrap();
        assert_eq!(config, RenderConfig::default());
    }

    #[test]
    fn test_rejects_small_column_limit() {
        let err = "column_limit = 1".parse::<RenderConfig>().unwrap_err();
        assert!(matches!(*err, Error::InvalidConfig { .. }));
    }

    #[test]
    fn test_rejects_zero_spaces() {
        let err = "indent = { spaces = 0 }"
            .parse::<RenderConfig>()
            .unwrap_err();
        assert!(matches!(*err, Error::InvalidConfig { .. }));
    }

    #[test]
    fn test_unknown_key_is_parse_error() {
        let err = "columns = 80".parse::<RenderConfig>().unwrap_err();
        assert!(matches!(*err, Error::ConfigParse { .. }));
    }
}
