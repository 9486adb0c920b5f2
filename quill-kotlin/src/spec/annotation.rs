//! Annotations such as `@Deprecated("use bar")`.

use std::sync::Arc;

use quill_codegen::{Arg, CodeBlock, CodeWriter, Declaration};
use quill_core::{Result, TypeName};

/// Where an annotation applies when the annotated element is ambiguous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UseSiteTarget {
    File,
    Property,
    Field,
    Get,
    Set,
    Receiver,
    Param,
    SetParam,
    Delegate,
}

impl UseSiteTarget {
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Property => "property",
            Self::Field => "field",
            Self::Get => "get",
            Self::Set => "set",
            Self::Receiver => "receiver",
            Self::Param => "param",
            Self::SetParam => "setparam",
            Self::Delegate => "delegate",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationSpec {
    pub(crate) type_name: TypeName,
    pub(crate) members: Vec<CodeBlock>,
    pub(crate) use_site_target: Option<UseSiteTarget>,
}

impl AnnotationSpec {
    pub fn new(type_name: impl Into<TypeName>) -> Self {
        Self {
            type_name: type_name.into(),
            members: Vec::new(),
            use_site_target: None,
        }
    }

    /// Add an argument, such as `name = "id"` or a bare value.
    pub fn member(mut self, member: CodeBlock) -> Self {
        self.members.push(member);
        self
    }

    pub fn add_member(self, template: &str, args: &[Arg]) -> Result<Self> {
        let member = CodeBlock::of(template, args)?;
        Ok(self.member(member))
    }

    pub fn use_site_target(mut self, target: UseSiteTarget) -> Self {
        self.use_site_target = Some(target);
        self
    }

    pub fn type_name(&self) -> &TypeName {
        &self.type_name
    }

    pub fn members(&self) -> &[CodeBlock] {
        &self.members
    }

    /// Emit the annotation. Inline annotations keep every member on one
    /// line; otherwise two or more members go one per line with a trailing
    /// comma. As a parameter, the `@` is dropped and parentheses are kept.
    pub(crate) fn emit_with(
        &self,
        writer: &mut CodeWriter,
        inline: bool,
        as_parameter: bool,
    ) -> Result<()> {
        if !as_parameter {
            writer.emit("@")?;
        }
        if let Some(target) = self.use_site_target {
            writer.emit(target.keyword())?;
            writer.emit(":")?;
        }
        writer.emit_format("%T", &[Arg::from(&self.type_name)])?;

        if self.members.is_empty() && !as_parameter {
            return Ok(());
        }

        let multiline = self.members.len() > 1;
        let whitespace = if inline { "" } else { "\n" };
        let separator = if inline { ", " } else { ",\n" };
        let suffix = if !inline && multiline { "," } else { "" };

        writer.emit("(")?;
        if multiline {
            writer.emit(whitespace)?;
            writer.indent(1);
        }
        let members = CodeBlock::join(self.members.iter().cloned(), separator, "", suffix);
        // Annotation arguments must be compile-time constants.
        writer.emit_code_with(&members, true, false)?;
        if multiline {
            writer.unindent(1)?;
            writer.emit(whitespace)?;
        }
        writer.emit(")")
    }
}

impl Declaration for AnnotationSpec {
    fn name(&self) -> Option<&str> {
        self.type_name.class_name().map(|class| class.simple_name())
    }

    fn emit(&self, writer: &mut CodeWriter) -> Result<()> {
        self.emit_with(writer, true, false)
    }
}

impl From<AnnotationSpec> for Arg {
    fn from(spec: AnnotationSpec) -> Self {
        Arg::Node(Arc::new(spec))
    }
}
