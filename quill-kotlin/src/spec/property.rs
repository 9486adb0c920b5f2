//! `val` and `var` declarations.

use std::collections::BTreeSet;
use std::sync::Arc;

use quill_codegen::{Arg, CodeBlock, CodeWriter, Declaration};
use quill_core::{Error, Result, TypeName, TypeVariable};

use super::{
    AnnotationSpec, FunSpec, ParameterSpec, emit_annotations, emit_kdoc, emit_type_variables,
    emit_where_block,
};
use crate::KModifier;
use crate::modifier::emit_modifiers;

#[derive(Debug, Clone)]
pub struct PropertySpec {
    pub(crate) name: String,
    pub(crate) type_name: TypeName,
    pub(crate) mutable: bool,
    pub(crate) kdoc: CodeBlock,
    pub(crate) annotations: Vec<AnnotationSpec>,
    pub(crate) modifiers: BTreeSet<KModifier>,
    type_variables: Vec<TypeVariable>,
    receiver: Option<TypeName>,
    pub(crate) initializer: Option<CodeBlock>,
    delegated: bool,
    pub(crate) getter: Option<FunSpec>,
    pub(crate) setter: Option<FunSpec>,
}

impl PropertySpec {
    pub fn new(name: impl Into<String>, type_name: impl Into<TypeName>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            mutable: false,
            kdoc: CodeBlock::default(),
            annotations: Vec::new(),
            modifiers: BTreeSet::new(),
            type_variables: Vec::new(),
            receiver: None,
            initializer: None,
            delegated: false,
            getter: None,
            setter: None,
        }
    }

    /// Declare with `var` instead of `val`.
    pub fn mutable(mut self) -> Self {
        self.mutable = true;
        self
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

    pub fn modifiers(mut self, modifiers: impl IntoIterator<Item = KModifier>) -> Self {
        self.modifiers.extend(modifiers);
        self
    }

    pub fn type_variable(mut self, variable: TypeVariable) -> Self {
        self.type_variables.push(variable);
        self
    }

    /// Make this an extension property on `receiver`.
    pub fn receiver(mut self, receiver: impl Into<TypeName>) -> Self {
        self.receiver = Some(receiver.into());
        self
    }

    pub fn initializer(mut self, initializer: CodeBlock) -> Self {
        self.initializer = Some(initializer);
        self.delegated = false;
        self
    }

    pub fn add_initializer(self, template: &str, args: &[Arg]) -> Result<Self> {
        let initializer = CodeBlock::of(template, args)?;
        Ok(self.initializer(initializer))
    }

    /// Delegate to `delegate`, as in `val x by lazy { … }`.
    pub fn delegate(mut self, delegate: CodeBlock) -> Self {
        self.initializer = Some(delegate);
        self.delegated = true;
        self
    }

    pub fn getter(mut self, getter: FunSpec) -> Self {
        self.getter = Some(getter);
        self
    }

    pub fn setter(mut self, setter: FunSpec) -> Self {
        self.setter = Some(setter);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_name(&self) -> &TypeName {
        &self.type_name
    }

    pub fn is_mutable(&self) -> bool {
        self.mutable
    }

    /// This property as declared in a primary constructor for `parameter`.
    pub(crate) fn from_constructor_parameter(&self, parameter: &ParameterSpec) -> Self {
        let mut property = self.clone();
        property
            .annotations
            .extend(parameter.annotations.iter().cloned());
        property.modifiers.extend(parameter.modifiers.iter().copied());
        if property.kdoc.is_empty() {
            property.kdoc = parameter.kdoc.clone();
        }
        property
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if let Some(getter) = &self.getter {
            if !getter.is_getter() {
                return Err(Error::invalid_declaration(format!(
                    "{}: {} is not a getter",
                    self.name,
                    getter.name()
                )));
            }
            getter.validate()?;
        }
        if let Some(setter) = &self.setter {
            if !setter.is_setter() {
                return Err(Error::invalid_declaration(format!(
                    "{}: {} is not a setter",
                    self.name,
                    setter.name()
                )));
            }
            if !self.mutable {
                return Err(Error::invalid_declaration(format!(
                    "only a mutable property can have a setter, {} is a val",
                    self.name
                )));
            }
            setter.validate()?;
        }
        if self.modifiers.contains(&KModifier::Const) && self.mutable {
            return Err(Error::invalid_declaration(format!(
                "const property {} cannot be mutable",
                self.name
            )));
        }
        Ok(())
    }

    /// Emit the property. Inside a primary constructor the initializer and
    /// accessors are left to the constructor and the line is not ended.
    pub(crate) fn emit_with(
        &self,
        writer: &mut CodeWriter,
        implicit: &BTreeSet<KModifier>,
        in_constructor: bool,
    ) -> Result<()> {
        self.validate()?;

        let inline_property = self.inline_accessors();
        let mut modifiers = self.modifiers.clone();
        if inline_property {
            modifiers.insert(KModifier::Inline);
        }

        if !in_constructor {
            emit_kdoc(writer, &self.kdoc)?;
        }
        emit_annotations(writer, &self.annotations, false)?;
        emit_modifiers(writer, &modifiers, implicit)?;
        writer.emit(if self.mutable { "var " } else { "val " })?;
        if !self.type_variables.is_empty() {
            emit_type_variables(writer, &self.type_variables)?;
            writer.emit("♢")?;
        }
        if let Some(receiver) = &self.receiver {
            writer.emit_format("%T.", &[Arg::from(receiver)])?;
        }
        writer.emit_format(
            "%N:♢%T",
            &[Arg::from(self.name.as_str()), Arg::from(&self.type_name)],
        )?;

        if !in_constructor {
            if let Some(initializer) = &self.initializer {
                writer.emit(if self.delegated { "♢by♢" } else { "♢=♢" })?;
                let template = if initializer.has_statements() {
                    "%L"
                } else {
                    "«%L»"
                };
                let code =
                    CodeBlock::of(template, &[Arg::from(initializer.trim_trailing_newline())])?;
                let constant = self.modifiers.contains(&KModifier::Const);
                writer.emit_code_with(&code, constant, false)?;
            }
        }
        emit_where_block(writer, &self.type_variables)?;
        if in_constructor {
            return Ok(());
        }
        writer.emit("\n")?;

        let mut accessor_implicit: BTreeSet<KModifier> = implicit
            .iter()
            .filter(|m| !m.is_visibility())
            .copied()
            .collect();
        if inline_property {
            accessor_implicit.insert(KModifier::Inline);
        }
        for accessor in [&self.getter, &self.setter].into_iter().flatten() {
            writer.indent(1);
            accessor.emit_with(writer, &accessor_implicit, false)?;
            writer.unindent(1)?;
        }
        Ok(())
    }

    /// True when every accessor is `inline`, which makes the property itself
    /// `inline`.
    fn inline_accessors(&self) -> bool {
        let is_inline = |accessor: &Option<FunSpec>| {
            accessor
                .as_ref()
                .is_some_and(|f| f.modifiers.contains(&KModifier::Inline))
        };
        is_inline(&self.getter) && (!self.mutable || is_inline(&self.setter))
    }
}

impl Declaration for PropertySpec {
    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn emit(&self, writer: &mut CodeWriter) -> Result<()> {
        self.emit_with(writer, &BTreeSet::new(), false)
    }
}

impl From<PropertySpec> for Arg {
    fn from(spec: PropertySpec) -> Self {
        Arg::Node(Arc::new(spec))
    }
}
