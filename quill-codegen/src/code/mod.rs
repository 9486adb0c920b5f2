//! Code fragments: templates bound to arguments.
//!
//! A [`CodeBlock`] is built from a template such as `"%T.out.println(%S)"`
//! and an argument list. Binding happens once, when the block is built, and
//! produces a flat list of [`Instruction`]s that both the collection and the
//! emit pass replay.
//!
//! Placeholders:
//!
//! - `%L` literal: the argument's own form, nested blocks and declarations are emitted inline
//! - `%N` name: an identifier, escaped by the lexical policy
//! - `%S` string: quoted and escaped as a string literal
//! - `%P` indented string: like `%S` but template expressions stay live
//! - `%T` type: resolved against the file's imports
//! - `%M` member: resolved against the file's imports
//! - `%%` a literal percent sign
//!
//! Structural characters: `⇥` indent, `⇤` unindent, `«` open statement,
//! `»` close statement. In text, a space or `♢` is a wrap point and `·` is
//! a space that never wraps.

mod builder;
mod template;

use std::{fmt, sync::Arc};

pub use builder::CodeBlockBuilder;
use quill_core::{ClassName, MemberName, PLAIN, Result, TypeName, TypeVariable};

use crate::{CodeWriter, Declaration};

/// What a placeholder does with its argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaceholderKind {
    Literal,
    Name,
    String,
    IndentedString,
    Type,
    Member,
}

impl PlaceholderKind {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'L' => Some(Self::Literal),
            'N' => Some(Self::Name),
            'S' => Some(Self::String),
            'P' => Some(Self::IndentedString),
            'T' => Some(Self::Type),
            'M' => Some(Self::Member),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            Self::Literal => 'L',
            Self::Name => 'N',
            Self::String => 'S',
            Self::IndentedString => 'P',
            Self::Type => 'T',
            Self::Member => 'M',
        }
    }
}

/// A template argument.
#[derive(Debug, Clone)]
pub enum Arg {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Null,
    Code(CodeBlock),
    Type(TypeName),
    Member(MemberName),
    /// A declaration node, emitted by `%L` and named by `%N`.
    Node(Arc<dyn Declaration>),
}

impl PartialEq for Arg {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Null, Self::Null) => true,
            (Self::Code(a), Self::Code(b)) => a == b,
            (Self::Type(a), Self::Type(b)) => a == b,
            (Self::Member(a), Self::Member(b)) => a == b,
            (Self::Node(a), Self::Node(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{n:?}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Null => f.write_str("null"),
            Self::Code(code) => write!(f, "{code}"),
            Self::Type(ty) => write!(f, "{ty}"),
            Self::Member(member) => write!(f, "{member}"),
            Self::Node(node) => f.write_str(node.name().unwrap_or("<anonymous>")),
        }
    }
}

macro_rules! arg_from {
    ($($ty:ty => |$v:ident| $body:expr),* $(,)?) => {
        $(
            impl From<$ty> for Arg {
                fn from($v: $ty) -> Self {
                    $body
                }
            }
        )*
    };
}

arg_from! {
    &str => |v| Arg::Str(v.to_string()),
    String => |v| Arg::Str(v),
    &String => |v| Arg::Str(v.clone()),
    char => |v| Arg::Str(v.to_string()),
    i32 => |v| Arg::Int(i64::from(v)),
    i64 => |v| Arg::Int(v),
    u32 => |v| Arg::Int(i64::from(v)),
    usize => |v| Arg::Int(i64::try_from(v).unwrap_or(i64::MAX)),
    f32 => |v| Arg::Float(f64::from(v)),
    f64 => |v| Arg::Float(v),
    bool => |v| Arg::Bool(v),
    CodeBlock => |v| Arg::Code(v),
    &CodeBlock => |v| Arg::Code(v.clone()),
    TypeName => |v| Arg::Type(v),
    &TypeName => |v| Arg::Type(v.clone()),
    ClassName => |v| Arg::Type(TypeName::from(v)),
    &ClassName => |v| Arg::Type(TypeName::from(v.clone())),
    TypeVariable => |v| Arg::Type(TypeName::from(v)),
    MemberName => |v| Arg::Member(v),
    &MemberName => |v| Arg::Member(v.clone()),
}

impl<T: Into<Arg>> From<Option<T>> for Arg {
    fn from(value: Option<T>) -> Self {
        value.map_or(Arg::Null, Into::into)
    }
}

/// One step of a bound template.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    /// Literal text; never contains a newline.
    Text(String),
    Newline,
    /// A bound argument, already coerced for its kind.
    Placeholder { kind: PlaceholderKind, arg: Arg },
    Indent,
    Unindent,
    OpenStatement,
    CloseStatement,
}

impl Instruction {
    fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::Indent | Self::Unindent | Self::OpenStatement | Self::CloseStatement
        )
    }
}

/// An immutable, bound code fragment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CodeBlock {
    instructions: Vec<Instruction>,
}

impl CodeBlock {
    /// Bind `template` to positional or indexed arguments.
    pub fn of(template: &str, args: &[Arg]) -> Result<Self> {
        Ok(Self {
            instructions: template::bind_positional(template, args)?,
        })
    }

    /// Bind `template` to named arguments (`%name:K`).
    pub fn of_named(template: &str, args: &[(&str, Arg)]) -> Result<Self> {
        Ok(Self {
            instructions: template::bind_named(template, args)?,
        })
    }

    pub fn builder() -> CodeBlockBuilder {
        CodeBlockBuilder::default()
    }

    pub fn to_builder(&self) -> CodeBlockBuilder {
        CodeBlockBuilder::from_instructions(self.instructions.clone())
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Join blocks with `separator`, wrapped in `prefix` and `suffix`.
    ///
    /// The surrounding text may carry structural characters and newlines but
    /// no placeholders.
    pub fn join<I>(blocks: I, separator: &str, prefix: &str, suffix: &str) -> Self
    where
        I: IntoIterator<Item = CodeBlock>,
    {
        let mut instructions = Vec::new();
        template::push_raw(&mut instructions, prefix);
        for (i, block) in blocks.into_iter().enumerate() {
            if i > 0 {
                template::push_raw(&mut instructions, separator);
            }
            instructions.extend(block.instructions);
        }
        template::push_raw(&mut instructions, suffix);
        Self { instructions }
    }

    /// Copy without leading and trailing structural instructions.
    pub fn trim(&self) -> Self {
        let start = self
            .instructions
            .iter()
            .position(|i| !i.is_structural())
            .unwrap_or(self.instructions.len());
        let end = self
            .instructions
            .iter()
            .rposition(|i| !i.is_structural())
            .map_or(start, |i| i + 1);
        Self {
            instructions: self.instructions[start..end.max(start)].to_vec(),
        }
    }

    /// The rest of this block after `prefix`, or `None` if it does not
    /// start with `prefix`. The last prefix instruction may match the start
    /// of a longer text run.
    pub fn without_prefix(&self, prefix: &CodeBlock) -> Option<CodeBlock> {
        let count = prefix.instructions.len();
        if self.instructions.len() < count {
            return None;
        }

        let mut rest = Vec::new();
        for (i, expected) in prefix.instructions.iter().enumerate() {
            let actual = &self.instructions[i];
            if actual == expected {
                continue;
            }
            match (actual, expected) {
                (Instruction::Text(actual), Instruction::Text(expected))
                    if i == count - 1 && actual.starts_with(expected.as_str()) =>
                {
                    let remainder = &actual[expected.len()..];
                    if !remainder.is_empty() {
                        rest.push(Instruction::Text(remainder.to_string()));
                    }
                }
                _ => return None,
            }
        }
        rest.extend(self.instructions[count..].iter().cloned());
        Some(Self { instructions: rest })
    }

    pub fn has_statements(&self) -> bool {
        self.instructions
            .iter()
            .any(|i| matches!(i, Instruction::OpenStatement))
    }

    /// True if a `»` appears before its matching `«`.
    pub fn has_unmatched_closing_statement(&self) -> bool {
        let mut open = 0usize;
        for instruction in &self.instructions {
            match instruction {
                Instruction::OpenStatement => open += 1,
                Instruction::CloseStatement if open == 0 => return true,
                Instruction::CloseStatement => open -= 1,
                _ => {}
            }
        }
        false
    }

    /// Copy that ends with a newline.
    pub fn ensure_ends_with_newline(&self) -> Self {
        let mut instructions = self.instructions.clone();
        if !instructions.is_empty() && instructions.last() != Some(&Instruction::Newline) {
            instructions.push(Instruction::Newline);
        }
        Self { instructions }
    }

    /// Copy without one trailing newline.
    pub fn trim_trailing_newline(&self) -> Self {
        let mut instructions = self.instructions.clone();
        if instructions.last() == Some(&Instruction::Newline) {
            instructions.pop();
        }
        Self { instructions }
    }

    /// Every bound argument, in order.
    pub fn arguments(&self) -> impl Iterator<Item = &Arg> {
        self.instructions.iter().filter_map(|i| match i {
            Instruction::Placeholder { arg, .. } => Some(arg),
            _ => None,
        })
    }
}

/// Renders without imports or a column limit, using fully qualified names.
impl fmt::Display for CodeBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match CodeWriter::render_fragment(self, &PLAIN) {
            Ok(rendered) => f.write_str(&rendered),
            Err(_) => write!(f, "{:?}", self.instructions),
        }
    }
}

/// Build a [`CodeBlock`] from a template and arguments convertible to [`Arg`].
///
/// ```
/// use quill_codegen::code_block;
///
/// let block = code_block!("val %N = %L", "answer", 42).unwrap();
/// assert_eq!(block.to_string(), "val answer = 42");
/// ```
#[macro_export]
macro_rules! code_block {
    ($template:expr $(, $arg:expr)* $(,)?) => {
        $crate::CodeBlock::of($template, &[$($crate::Arg::from($arg)),*])
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Instruction {
        Instruction::Text(s.to_string())
    }

    #[test]
    fn test_trim_drops_structural_edges() {
        let block = CodeBlock::of("«⇥return x⇤»", &[]).unwrap();
        assert_eq!(block.trim().instructions(), [text("return x")]);
    }

    #[test]
    fn test_trim_of_only_markers_is_empty() {
        let block = CodeBlock::of("«»", &[]).unwrap();
        assert!(block.trim().is_empty());
    }

    #[test]
    fn test_without_prefix() {
        let block = code_block!("return %L", 1).unwrap();
        let prefix = CodeBlock::of("return ", &[]).unwrap();
        let rest = block.without_prefix(&prefix).unwrap();
        assert_eq!(
            rest.instructions(),
            [Instruction::Placeholder {
                kind: PlaceholderKind::Literal,
                arg: Arg::Int(1),
            }]
        );
        assert!(block.without_prefix(&CodeBlock::of("throw ", &[]).unwrap()).is_none());
    }

    #[test]
    fn test_without_prefix_partial_text() {
        let block = CodeBlock::of("return x + y", &[]).unwrap();
        let prefix = CodeBlock::of("return ", &[]).unwrap();
        let rest = block.without_prefix(&prefix).unwrap();
        assert_eq!(rest.instructions(), [text("x + y")]);
    }

    #[test]
    fn test_unmatched_closing_statement() {
        assert!(CodeBlock::of("»x«", &[]).unwrap().has_unmatched_closing_statement());
        assert!(!CodeBlock::of("«x»", &[]).unwrap().has_unmatched_closing_statement());
        assert!(CodeBlock::of("«x»", &[]).unwrap().has_statements());
    }

    #[test]
    fn test_join() {
        let blocks = vec![
            code_block!("%L", 1).unwrap(),
            code_block!("%L", 2).unwrap(),
            code_block!("%L", 3).unwrap(),
        ];
        let joined = CodeBlock::join(blocks, ", ", "listOf(", ")");
        assert_eq!(joined.to_string(), "listOf(1, 2, 3)");
    }

    #[test]
    fn test_trailing_newline_helpers() {
        let block = CodeBlock::of("a()", &[]).unwrap();
        let ended = block.ensure_ends_with_newline();
        assert_eq!(ended.instructions(), [text("a()"), Instruction::Newline]);
        assert_eq!(ended.ensure_ends_with_newline(), ended);
        assert_eq!(ended.trim_trailing_newline(), block);
        assert!(CodeBlock::default().ensure_ends_with_newline().is_empty());
    }

    #[test]
    fn test_display_uses_canonical_names() {
        let block = code_block!("%T()", ClassName::new("java.util", "Date")).unwrap();
        assert_eq!(block.to_string(), "java.util.Date()");
    }

    #[test]
    fn test_arg_from_option() {
        assert_eq!(Arg::from(None::<&str>), Arg::Null);
        assert_eq!(Arg::from(Some("x")), Arg::Str("x".to_string()));
    }

    #[test]
    fn test_float_literal_keeps_decimal_point() {
        assert_eq!(Arg::from(1.0).to_string(), "1.0");
        assert_eq!(Arg::from(2.5f32).to_string(), "2.5");
    }
}
