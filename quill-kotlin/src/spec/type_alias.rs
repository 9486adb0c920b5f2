//! `typealias` declarations.

use std::collections::BTreeSet;
use std::sync::Arc;

use quill_codegen::{Arg, CodeBlock, CodeWriter, Declaration};
use quill_core::{Error, Result, TypeName, TypeVariable};

use super::{AnnotationSpec, emit_annotations, emit_kdoc, emit_type_variables};
use crate::KModifier;
use crate::modifier::emit_modifiers;
use crate::types::nullable_any;

/// A top-level alias such as `typealias Handler<T> = (T) -> Unit`.
#[derive(Debug, Clone)]
pub struct TypeAliasSpec {
    name: String,
    type_name: TypeName,
    kdoc: CodeBlock,
    annotations: Vec<AnnotationSpec>,
    modifiers: BTreeSet<KModifier>,
    type_variables: Vec<TypeVariable>,
}

impl TypeAliasSpec {
    pub fn new(name: impl Into<String>, type_name: impl Into<TypeName>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            kdoc: CodeBlock::default(),
            annotations: Vec::new(),
            modifiers: BTreeSet::new(),
            type_variables: Vec::new(),
        }
    }

    pub fn kdoc(mut self, kdoc: CodeBlock) -> Self {
        self.kdoc = kdoc;
        self
    }

    pub fn annotation(mut self, annotation: AnnotationSpec) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn modifier(mut self, modifier: KModifier) -> Self {
        self.modifiers.insert(modifier);
        self
    }

    pub fn type_variable(mut self, variable: TypeVariable) -> Self {
        self.type_variables.push(variable);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_name(&self) -> &TypeName {
        &self.type_name
    }

    /// Only visibility and `actual` apply to an alias, and its type
    /// parameters take neither bounds nor variance.
    pub(crate) fn validate(&self) -> Result<()> {
        if let Some(modifier) = self
            .modifiers
            .iter()
            .find(|m| !m.is_visibility() && **m != KModifier::Actual)
        {
            return Err(Error::invalid_declaration(format!(
                "typealias {} cannot be {modifier}",
                self.name
            )));
        }
        for variable in &self.type_variables {
            let bounded = match variable.bounds.as_slice() {
                [] => false,
                [bound] => *bound != nullable_any(),
                _ => true,
            };
            if bounded || variable.variance.is_some() || variable.reified {
                return Err(Error::invalid_declaration(format!(
                    "typealias {}: type parameter {} must be unconstrained",
                    self.name, variable.name
                )));
            }
        }
        Ok(())
    }

    pub(crate) fn emit_with(
        &self,
        writer: &mut CodeWriter,
        implicit: &BTreeSet<KModifier>,
    ) -> Result<()> {
        self.validate()?;

        emit_kdoc(writer, &self.kdoc)?;
        emit_annotations(writer, &self.annotations, false)?;
        emit_modifiers(writer, &self.modifiers, implicit)?;
        writer.emit_format("typealias %N", &[Arg::from(self.name.as_str())])?;
        emit_type_variables(writer, &self.type_variables)?;
        writer.emit_format(" =♢%T\n", &[Arg::from(&self.type_name)])
    }
}

impl Declaration for TypeAliasSpec {
    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn emit(&self, writer: &mut CodeWriter) -> Result<()> {
        self.emit_with(writer, &BTreeSet::new())
    }
}

impl From<TypeAliasSpec> for Arg {
    fn from(spec: TypeAliasSpec) -> Self {
        Arg::Node(Arc::new(spec))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use quill_codegen::code_block;
    use quill_core::{ClassName, LambdaType, Variance};

    use super::*;
    use crate::{render_declaration, types};

    #[test]
    fn test_simple_alias() {
        let alias = TypeAliasSpec::new("Word", types::string());
        assert_eq!(
            render_declaration(alias).unwrap(),
            "typealias Word = kotlin.String\n"
        );
    }

    #[test]
    fn test_generic_function_alias() {
        let t = TypeVariable::new("T");
        let handler = LambdaType::new([TypeName::from(t.clone())], types::unit());
        let alias = TypeAliasSpec::new("Handler", handler)
            .modifier(KModifier::Internal)
            .type_variable(t)
            .kdoc(code_block!("Receives one event.").unwrap());
        assert_eq!(
            render_declaration(alias).unwrap(),
            "/**\n * Receives one event.\n */\ninternal typealias Handler<T> = (T) -> kotlin.Unit\n"
        );
    }

    #[test]
    fn test_alias_rejects_other_modifiers() {
        let alias = TypeAliasSpec::new("Word", types::string()).modifier(KModifier::Inline);
        let err = render_declaration(alias).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid declaration: typealias Word cannot be inline"
        );
    }

    #[test]
    fn test_alias_rejects_bounded_type_parameters() {
        let bounded = TypeVariable::new("T").bound(ClassName::new("kotlin", "Number"));
        let alias = TypeAliasSpec::new("Numbers", types::string()).type_variable(bounded);
        assert!(render_declaration(alias).is_err());

        let variant = TypeVariable::new("T").variance(Variance::Out);
        let alias = TypeAliasSpec::new("Numbers", types::string()).type_variable(variant);
        assert!(render_declaration(alias).is_err());
    }
}
