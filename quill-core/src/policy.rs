//! Target-language lexical rules, injected into the engine.

use crate::Result;

/// How a string literal should be quoted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuoteOptions {
    /// Leave template expressions (`$name`) live instead of escaping them.
    pub keep_templates: bool,
    /// Force the single-line form, e.g. in constant contexts.
    pub single_line: bool,
}

/// Language-specific lexical policy.
///
/// Defines the reserved words, how identifiers are escaped, how string
/// literals are quoted and which packages are implicitly imported.
#[derive(Debug, Clone, Copy)]
pub struct LexicalPolicy {
    /// Language name, for diagnostics.
    pub name: &'static str,
    /// List of reserved words in the language
    pub reserved_words: &'static [&'static str],
    /// Escape an identifier if it needs it; must be idempotent.
    pub escape_identifier: fn(&str) -> Result<String>,
    /// Render a string value as a literal.
    pub quote_string: fn(&str, QuoteOptions) -> String,
    /// Packages whose types are available without an import.
    pub default_imports: &'static [&'static str],
    /// Keywords that must stay on the same line as the token after them.
    pub glued_keywords: &'static [&'static str],
}

impl LexicalPolicy {
    /// Check if a name is a reserved word.
    pub fn is_reserved(&self, name: &str) -> bool {
        self.reserved_words.contains(&name)
    }

    pub fn escape(&self, name: &str) -> Result<String> {
        (self.escape_identifier)(name)
    }

    /// Escape each segment of a dotted name.
    pub fn escape_segments(&self, dotted: &str) -> Result<String> {
        let segments = dotted
            .split('.')
            .map(|segment| self.escape(segment))
            .collect::<Result<Vec<_>>>()?;
        Ok(segments.join("."))
    }

    pub fn quote(&self, value: &str, options: QuoteOptions) -> String {
        (self.quote_string)(value, options)
    }

    pub fn is_default_import(&self, package: &str) -> bool {
        self.default_imports.contains(&package)
    }

    /// True if `word` is a glued keyword, optionally followed by a label
    /// as in `return@forEach`.
    pub fn is_glued(&self, word: &str) -> bool {
        let keyword = word.split_once('@').map_or(word, |(keyword, _)| keyword);
        self.glued_keywords.contains(&keyword)
    }
}

fn escape_plain(name: &str) -> Result<String> {
    Ok(name.to_string())
}

fn quote_plain(value: &str, _options: QuoteOptions) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Policy with no reserved words, no escaping and C-style string quoting.
pub const PLAIN: LexicalPolicy = LexicalPolicy {
    name: "plain",
    reserved_words: &[],
    escape_identifier: escape_plain,
    quote_string: quote_plain,
    default_imports: &[],
    glued_keywords: &[],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_quote() {
        let quoted = PLAIN.quote("a \"b\"\nc", QuoteOptions::default());
        assert_eq!(quoted, r#""a \"b\"\nc""#);
    }

    #[test]
    fn test_plain_escape_is_identity() {
        assert_eq!(PLAIN.escape("type").unwrap(), "type");
        assert!(!PLAIN.is_reserved("type"));
        assert!(!PLAIN.is_default_import("kotlin"));
    }

    #[test]
    fn test_glued_keywords_accept_labels() {
        let policy = LexicalPolicy {
            glued_keywords: &["return"],
            ..PLAIN
        };
        assert!(policy.is_glued("return"));
        assert!(policy.is_glued("return@forEach"));
        assert!(!policy.is_glued("returned"));
        assert!(!PLAIN.is_glued("return"));
    }

    #[test]
    fn test_escape_segments() {
        assert_eq!(PLAIN.escape_segments("a.b.c").unwrap(), "a.b.c");
    }
}
