use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Result type for quill operations (boxed to reduce size on stack)
pub type Result<T> = std::result::Result<T, Box<Error>>;

/// Template source used to point diagnostics at the offending placeholder.
///
/// Built once per bind call so each factory only needs the span.
///
/// # Example
///
/// ```
/// use quill_core::TemplateContext;
///
/// let ctx = TemplateContext::new("%1L %3L");
/// let err = ctx.index_out_of_range(3, 4..7, 1);
/// assert_eq!(err.to_string(), "index 3 for '%3L' not in range (received 1 arguments)");
/// ```
#[derive(Debug, Clone)]
pub struct TemplateContext {
    template: String,
}

impl TemplateContext {
    /// Create a new template context.
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// Get the template text.
    pub fn template(&self) -> &str {
        &self.template
    }

    fn named_source(&self) -> NamedSource<String> {
        NamedSource::new("template", self.template.clone())
    }

    fn placeholder_text(&self, span: &std::ops::Range<usize>) -> String {
        self.template
            .get(span.clone())
            .unwrap_or_default()
            .to_string()
    }

    /// A `%` with nothing usable after it.
    pub fn dangling(&self, at: usize) -> Box<Error> {
        Box::new(Error::DanglingPlaceholder {
            src: self.named_source(),
            span: SourceSpan::from(at..self.template.len()),
            template: self.template.clone(),
        })
    }

    /// A `%` followed by a character that is not a placeholder kind.
    pub fn unknown_placeholder(&self, placeholder: char, at: usize) -> Box<Error> {
        Box::new(Error::UnknownPlaceholder {
            src: self.named_source(),
            span: SourceSpan::from(at..at + placeholder.len_utf8()),
            placeholder,
            position: at,
            template: self.template.clone(),
        })
    }

    /// `%%` written with an index, e.g. `%1%`.
    pub fn indexed_escape(&self, span: std::ops::Range<usize>) -> Box<Error> {
        Box::new(Error::IndexedEscape {
            src: self.named_source(),
            span: SourceSpan::from(span),
        })
    }

    /// A 1-based index outside the supplied arguments.
    pub fn index_out_of_range(
        &self,
        index: usize,
        span: std::ops::Range<usize>,
        count: usize,
    ) -> Box<Error> {
        Box::new(Error::IndexOutOfRange {
            placeholder: self.placeholder_text(&span),
            src: self.named_source(),
            span: SourceSpan::from(span),
            index,
            count,
        })
    }

    /// Relative and indexed placeholders in one template.
    pub fn mixed_indexing(&self, span: std::ops::Range<usize>) -> Box<Error> {
        Box::new(Error::MixedIndexing {
            src: self.named_source(),
            span: SourceSpan::from(span),
        })
    }

    /// A named placeholder without a value.
    pub fn missing_named_argument(
        &self,
        name: impl Into<String>,
        span: std::ops::Range<usize>,
    ) -> Box<Error> {
        Box::new(Error::MissingNamedArgument {
            src: self.named_source(),
            span: SourceSpan::from(span),
            name: name.into(),
        })
    }

    /// An argument that cannot be used for the placeholder kind.
    pub fn argument_mismatch(
        &self,
        expected: &'static str,
        found: impl Into<String>,
        span: std::ops::Range<usize>,
    ) -> Box<Error> {
        Box::new(Error::ArgumentMismatch {
            src: self.named_source(),
            span: SourceSpan::from(span),
            expected,
            found: found.into(),
        })
    }
}

/// Source of a TOML configuration document, for error reporting.
#[derive(Debug, Clone)]
pub struct ConfigSource {
    src: String,
    filename: String,
}

impl ConfigSource {
    /// Create a new configuration source.
    pub fn new(src: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            filename: filename.into(),
        }
    }

    /// Get the source content.
    pub fn src(&self) -> &str {
        &self.src
    }

    /// Create a parse error from a toml error.
    pub fn parse_error(&self, source: toml::de::Error) -> Box<Error> {
        let span = source.span().map(SourceSpan::from);
        Box::new(Error::ConfigParse {
            src: NamedSource::new(&self.filename, self.src.clone()),
            span,
            source,
        })
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("dangling format characters in '{template}'")]
    #[diagnostic(code(quill::template::dangling))]
    DanglingPlaceholder {
        #[source_code]
        src: NamedSource<String>,
        #[label("placeholder is incomplete")]
        span: SourceSpan,
        template: String,
    },

    #[error("unknown format %{placeholder} at {position} in '{template}'")]
    #[diagnostic(
        code(quill::template::unknown_placeholder),
        help("valid placeholders are %L, %N, %S, %P, %T, %M and %%")
    )]
    UnknownPlaceholder {
        #[source_code]
        src: NamedSource<String>,
        #[label("unknown placeholder")]
        span: SourceSpan,
        placeholder: char,
        position: usize,
        template: String,
    },

    #[error("%% may not have an index")]
    #[diagnostic(code(quill::template::indexed_escape))]
    IndexedEscape {
        #[source_code]
        src: NamedSource<String>,
        #[label("indexed escape")]
        span: SourceSpan,
    },

    #[error("index {index} for '{placeholder}' not in range (received {count} arguments)")]
    #[diagnostic(code(quill::template::index_out_of_range))]
    IndexOutOfRange {
        #[source_code]
        src: NamedSource<String>,
        #[label("out of range")]
        span: SourceSpan,
        index: usize,
        placeholder: String,
        count: usize,
    },

    #[error("cannot mix indexed and positional parameters")]
    #[diagnostic(code(quill::template::mixed_indexing))]
    MixedIndexing {
        #[source_code]
        src: NamedSource<String>,
        #[label("mixed here")]
        span: SourceSpan,
    },

    #[error("unused arguments: expected {expected}, received {received}")]
    #[diagnostic(code(quill::template::unused_arguments))]
    UnusedRelativeArguments { expected: usize, received: usize },

    #[error("unused argument{plural}: {unused}")]
    #[diagnostic(code(quill::template::unused_arguments))]
    UnusedIndexedArguments { unused: String, plural: &'static str },

    #[error("Missing named argument for %{name}")]
    #[diagnostic(code(quill::template::missing_named_argument))]
    MissingNamedArgument {
        #[source_code]
        src: NamedSource<String>,
        #[label("no argument named '{name}'")]
        span: SourceSpan,
        name: String,
    },

    #[error("argument '{name}' must start with a lowercase character")]
    #[diagnostic(code(quill::template::invalid_argument_name))]
    InvalidArgumentName { name: String },

    #[error("expected {expected} but was {found}")]
    #[diagnostic(code(quill::template::argument_mismatch))]
    ArgumentMismatch {
        #[source_code]
        src: NamedSource<String>,
        #[label("placeholder bound here")]
        span: SourceSpan,
        expected: &'static str,
        found: String,
    },

    #[error("{message}")]
    #[diagnostic(code(quill::structure::statement), help("current code block: {parts}"))]
    UnbalancedStatement { message: String, parts: String },

    #[error("statement opened with « was never closed")]
    #[diagnostic(code(quill::structure::unclosed_statement))]
    UnclosedStatement,

    #[error("cannot unindent {levels} from {from}")]
    #[diagnostic(code(quill::structure::unindent))]
    Unindent { levels: usize, from: usize },

    #[error("indentation left open at level {level}")]
    #[diagnostic(code(quill::structure::unclosed_indent))]
    UnclosedIndent { level: usize },

    #[error("conflicting imports for '{name}': {first} and {second}")]
    #[diagnostic(
        code(quill::resolve::import_conflict),
        help("give one of them a different alias")
    )]
    ImportConflict {
        name: String,
        first: String,
        second: String,
    },

    #[error("can't escape identifier {name} because it contains illegal characters: {illegal}")]
    #[diagnostic(code(quill::lexical::invalid_identifier))]
    InvalidIdentifier { name: String, illegal: String },

    #[error("tag {tag} cannot be used for both '{first}' and '{second}'")]
    #[diagnostic(code(quill::names::duplicate_tag))]
    DuplicateTag {
        tag: String,
        first: String,
        second: String,
    },

    #[error("unknown tag: {tag}")]
    #[diagnostic(code(quill::names::unknown_tag))]
    UnknownTag { tag: String },

    #[error("invalid declaration: {message}")]
    #[diagnostic(code(quill::declaration))]
    InvalidDeclaration { message: String },

    #[error("line wrapper is closed")]
    #[diagnostic(code(quill::wrap::closed))]
    WrapperClosed,

    #[error("non-wrapping text must not contain a newline: {text:?}")]
    #[diagnostic(code(quill::wrap::newline))]
    NewlineInNonWrapping { text: String },

    #[error("invalid render configuration: {message}")]
    #[diagnostic(code(quill::config::invalid))]
    InvalidConfig { message: String },

    #[error("failed to parse render configuration")]
    #[diagnostic(code(quill::config::parse_error))]
    ConfigParse {
        #[source_code]
        src: NamedSource<String>,
        #[label("parse error here")]
        span: Option<SourceSpan>,
        #[source]
        source: toml::de::Error,
    },
}

impl Error {
    /// Create an unbalanced statement error with the offending code block parts.
    pub fn unbalanced_statement(message: impl Into<String>, parts: impl Into<String>) -> Box<Self> {
        Box::new(Error::UnbalancedStatement {
            message: message.into(),
            parts: parts.into(),
        })
    }

    /// Create an import conflict error.
    pub fn import_conflict(
        name: impl Into<String>,
        first: impl Into<String>,
        second: impl Into<String>,
    ) -> Box<Self> {
        Box::new(Error::ImportConflict {
            name: name.into(),
            first: first.into(),
            second: second.into(),
        })
    }

    /// Create an invalid declaration error.
    pub fn invalid_declaration(message: impl Into<String>) -> Box<Self> {
        Box::new(Error::InvalidDeclaration {
            message: message.into(),
        })
    }

    /// Create an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Box<Self> {
        Box::new(Error::InvalidConfig {
            message: message.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_out_of_range_message() {
        let ctx = TemplateContext::new("%1L %2L");
        let err = ctx.index_out_of_range(2, 4..7, 1);
        assert_eq!(
            err.to_string(),
            "index 2 for '%2L' not in range (received 1 arguments)"
        );
    }

    #[test]
    fn test_unknown_placeholder_message() {
        let ctx = TemplateContext::new("%X");
        let err = ctx.unknown_placeholder('X', 1);
        assert_eq!(err.to_string(), "unknown format %X at 1 in '%X'");
    }

    #[test]
    fn test_unused_indexed_message() {
        let err = Error::UnusedIndexedArguments {
            unused: "%2, %3".to_string(),
            plural: "s",
        };
        assert_eq!(err.to_string(), "unused arguments: %2, %3");
    }

    #[test]
    fn test_config_parse_error_variant() {
        let src = "x = ";
        let parse_err = toml::from_str::<toml::Table>(src).unwrap_err();
        let err = ConfigSource::new(src, "quill.toml").parse_error(parse_err);
        assert!(matches!(*err, Error::ConfigParse { .. }));
    }
}
