//! Kotlin lexical rules.

use quill_core::{Error, LexicalPolicy, QuoteOptions, Result};

/// Hard, soft and modifier keywords, plus names that still break code when
/// left unescaped.
pub const KEYWORDS: &[&str] = &[
    // hard
    "as", "break", "class", "continue", "do", "else", "false", "for", "fun", "if", "in",
    "interface", "is", "null", "object", "package", "return", "super", "this", "throw", "true",
    "try", "typealias", "typeof", "val", "var", "when", "while",
    // soft
    "by", "catch", "constructor", "delegate", "dynamic", "field", "file", "finally", "get",
    "import", "init", "param", "property", "receiver", "set", "setparam", "where",
    // modifier
    "actual", "abstract", "annotation", "companion", "const", "crossinline", "data", "enum",
    "expect", "external", "final", "infix", "inline", "inner", "internal", "lateinit", "noinline",
    "open", "operator", "out", "override", "private", "protected", "public", "reified", "sealed",
    "suspend", "tailrec", "value", "vararg",
    // no longer keywords
    "header", "impl",
    // reserved
    "yield",
];

/// Packages every Kotlin file sees without an import.
pub const DEFAULT_IMPORTS: &[&str] = &[
    "kotlin",
    "kotlin.annotation",
    "kotlin.collections",
    "kotlin.comparisons",
    "kotlin.io",
    "kotlin.ranges",
    "kotlin.sequences",
    "kotlin.text",
    "kotlin.jvm",
    "java.lang",
];

/// Characters the JVM rejects in names even inside backticks.
const ILLEGAL_CHARACTERS: &[char] = &['.', ';', '[', ']', '/', '<', '>', ':', '\\'];

pub const KOTLIN: LexicalPolicy = LexicalPolicy {
    name: "kotlin",
    reserved_words: KEYWORDS,
    escape_identifier,
    quote_string,
    default_imports: DEFAULT_IMPORTS,
    glued_keywords: &["return"],
};

/// Wrap `name` in backticks if Kotlin would not accept it bare.
///
/// Already escaped names are returned unchanged, so escaping is idempotent.
pub fn escape_identifier(name: &str) -> Result<String> {
    if name.is_empty() || is_escaped(name) {
        return Ok(name.to_string());
    }

    let illegal: String = ILLEGAL_CHARACTERS
        .iter()
        .filter(|c| name.contains(**c))
        .collect();
    if !illegal.is_empty() {
        return Err(Box::new(Error::InvalidIdentifier {
            name: name.to_string(),
            illegal,
        }));
    }

    let needs_escape = !is_java_identifier(name)
        || KEYWORDS.contains(&name)
        || name.contains('$')
        || name.chars().all(|c| c == '_');
    if needs_escape {
        Ok(format!("`{name}`"))
    } else {
        Ok(name.to_string())
    }
}

fn is_escaped(name: &str) -> bool {
    name.len() >= 2 && name.starts_with('`') && name.ends_with('`')
}

fn is_java_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_alphabetic() || first == '_' || first == '$')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

/// Render `value` as a Kotlin string literal.
///
/// Values containing a newline become `"""…""".trimMargin()` blocks unless
/// the single-line form is forced. With `keep_templates`, `$` is left live
/// so `${…}` expressions still evaluate.
pub fn quote_string(value: &str, options: QuoteOptions) -> String {
    if !options.single_line && value.contains('\n') {
        return quote_multiline(value, options.keep_templates);
    }

    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '$' if !options.keep_templates => out.push_str("${'$'}"),
            c => push_escaped_char(&mut out, c),
        }
    }
    out.push('"');
    out
}

fn quote_multiline(value: &str, keep_templates: bool) -> String {
    let mut out = String::with_capacity(value.len() + 32);
    out.push_str("\"\"\"\n|");
    let mut rest = value;
    while let Some(c) = rest.chars().next() {
        if rest.starts_with("\"\"\"") {
            // keep the raw string from ending early
            out.push_str("\"\"${'\"'}");
            rest = &rest[3..];
            continue;
        }
        match c {
            '\n' => out.push_str("\n|"),
            '$' if !keep_templates => out.push_str("${'$'}"),
            c => out.push(c),
        }
        rest = &rest[c.len_utf8()..];
    }
    // trimMargin() drops the final blank line
    if !value.ends_with('\n') {
        out.push('\n');
    }
    out.push_str("\"\"\".trimMargin()");
    out
}

fn push_escaped_char(out: &mut String, c: char) {
    match c {
        '\u{8}' => out.push_str("\\b"),
        '\t' => out.push_str("\\t"),
        '\n' => out.push_str("\\n"),
        '\r' => out.push_str("\\r"),
        '\\' => out.push_str("\\\\"),
        c if is_iso_control(c) => out.push_str(&format!("\\u{:04x}", u32::from(c))),
        c => out.push(c),
    }
}

fn is_iso_control(c: char) -> bool {
    matches!(c, '\u{0}'..='\u{1f}' | '\u{7f}'..='\u{9f}')
}
