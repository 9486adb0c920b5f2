//! Function and constructor parameters.

use std::collections::BTreeSet;
use std::sync::Arc;

use quill_codegen::{Arg, CodeBlock, CodeWriter, Declaration};
use quill_core::{Error, Result, TypeName};

use super::{AnnotationSpec, emit_annotations};
use crate::KModifier;

const ALLOWED_MODIFIERS: [KModifier; 3] =
    [KModifier::Vararg, KModifier::Noinline, KModifier::Crossinline];

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSpec {
    pub(crate) name: String,
    pub(crate) type_name: TypeName,
    pub(crate) modifiers: BTreeSet<KModifier>,
    pub(crate) annotations: Vec<AnnotationSpec>,
    pub(crate) default_value: Option<CodeBlock>,
    pub(crate) kdoc: CodeBlock,
}

impl ParameterSpec {
    pub fn new(name: impl Into<String>, type_name: impl Into<TypeName>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            modifiers: BTreeSet::new(),
            annotations: Vec::new(),
            default_value: None,
            kdoc: CodeBlock::default(),
        }
    }

    /// Add a modifier. Only `vararg`, `noinline` and `crossinline` are
    /// accepted when the parameter is emitted.
    pub fn modifier(mut self, modifier: KModifier) -> Self {
        self.modifiers.insert(modifier);
        self
    }

    pub fn annotation(mut self, annotation: AnnotationSpec) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn default_value(mut self, value: CodeBlock) -> Self {
        self.default_value = Some(value);
        self
    }

    /// Documentation, emitted as an `@param` tag on the enclosing function.
    pub fn kdoc(mut self, kdoc: CodeBlock) -> Self {
        self.kdoc = kdoc;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_name(&self) -> &TypeName {
        &self.type_name
    }

    pub(crate) fn validate(&self) -> Result<()> {
        let illegal: Vec<&str> = self
            .modifiers
            .iter()
            .filter(|m| !ALLOWED_MODIFIERS.contains(m))
            .map(KModifier::keyword)
            .collect();
        if !illegal.is_empty() {
            return Err(Error::invalid_declaration(format!(
                "parameter {} has modifiers [{}], expected a subset of [vararg, noinline, crossinline]",
                self.name,
                illegal.join(", ")
            )));
        }
        Ok(())
    }

    /// Emit `name: Type = default`. Setters leave the type out.
    pub(crate) fn emit_with(
        &self,
        writer: &mut CodeWriter,
        include_type: bool,
        inline_annotations: bool,
    ) -> Result<()> {
        self.validate()?;
        emit_annotations(writer, &self.annotations, inline_annotations)?;
        for modifier in &self.modifiers {
            writer.emit(modifier.keyword())?;
            writer.emit(" ")?;
        }
        if include_type {
            writer.emit_format(
                "%N: %T",
                &[Arg::from(self.name.as_str()), Arg::from(&self.type_name)],
            )?;
        } else {
            writer.emit_format("%N", &[Arg::from(self.name.as_str())])?;
        }
        self.emit_default_value(writer)
    }

    pub(crate) fn emit_default_value(&self, writer: &mut CodeWriter) -> Result<()> {
        let Some(value) = &self.default_value else {
            return Ok(());
        };
        let template = if value.has_statements() {
            " = %L"
        } else {
            " = «%L»"
        };
        writer.emit_format(template, &[Arg::from(value)])
    }
}

impl Declaration for ParameterSpec {
    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn emit(&self, writer: &mut CodeWriter) -> Result<()> {
        self.emit_with(writer, true, true)
    }
}

impl From<ParameterSpec> for Arg {
    fn from(spec: ParameterSpec) -> Self {
        Arg::Node(Arc::new(spec))
    }
}

#[cfg(test)]
mod tests {
    use quill_codegen::code_block;

    use super::*;
    use crate::{KOTLIN, types};

    fn render(spec: ParameterSpec) -> Result<String> {
        CodeWriter::render_fragment(&code_block!("%L", spec)?, &KOTLIN)
    }

    #[test]
    fn test_plain_parameter() {
        let spec = ParameterSpec::new("count", types::int());
        assert_eq!(render(spec).unwrap(), "count: kotlin.Int");
    }

    #[test]
    fn test_keyword_name_is_escaped() {
        let spec = ParameterSpec::new("object", types::string());
        assert_eq!(render(spec).unwrap(), "`object`: kotlin.String");
    }

    #[test]
    fn test_vararg_with_default() {
        let spec = ParameterSpec::new("names", types::string())
            .modifier(KModifier::Vararg)
            .default_value(code_block!("%S", "x").unwrap());
        assert_eq!(render(spec).unwrap(), "vararg names: kotlin.String = \"x\"");
    }

    #[test]
    fn test_rejects_other_modifiers() {
        let spec = ParameterSpec::new("x", types::int()).modifier(KModifier::Private);
        let err = render(spec).unwrap_err();
        assert!(err.to_string().contains("parameter x has modifiers [private]"));
    }
}
