//! Functions, constructors and property accessors.

use std::collections::BTreeSet;
use std::sync::Arc;

use quill_codegen::{Arg, CodeBlock, CodeBlockBuilder, CodeWriter, Declaration, code_block};
use quill_core::{Error, Result, TypeName, TypeVariable};

use super::{
    AnnotationSpec, ParameterSpec, emit_annotations, emit_kdoc, emit_parameters,
    emit_type_variables, emit_where_block,
};
use crate::modifier::{emit_modifiers, modifier_set};
use crate::{KModifier, types};

const CONSTRUCTOR: &str = "constructor()";
const GETTER: &str = "get()";
const SETTER: &str = "set()";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FunKind {
    Function,
    Constructor,
    Getter,
    Setter,
}

/// A function, secondary constructor or property accessor.
///
/// # Example
///
/// ```
/// use quill_kotlin::{FunSpec, ParameterSpec, types};
///
/// let fun = FunSpec::new("double")
///     .parameter(ParameterSpec::new("x", types::int()))
///     .returns(types::int())
///     .add_statement("return x * 2", &[])?;
///
/// assert_eq!(
///     quill_kotlin::render_declaration(fun)?,
///     "public fun double(x: kotlin.Int): kotlin.Int = x * 2\n"
/// );
/// # Ok::<(), Box<quill_core::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct FunSpec {
    pub(crate) name: String,
    kind: FunKind,
    pub(crate) kdoc: CodeBlock,
    return_kdoc: CodeBlock,
    pub(crate) annotations: Vec<AnnotationSpec>,
    pub(crate) modifiers: BTreeSet<KModifier>,
    type_variables: Vec<TypeVariable>,
    receiver: Option<TypeName>,
    pub(crate) parameters: Vec<ParameterSpec>,
    return_type: Option<TypeName>,
    delegate_constructor: Option<(&'static str, Vec<CodeBlock>)>,
    body: CodeBlockBuilder,
}

impl FunSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_kind(name.into(), FunKind::Function)
    }

    pub fn constructor() -> Self {
        Self::with_kind(CONSTRUCTOR.to_string(), FunKind::Constructor)
    }

    pub fn getter() -> Self {
        Self::with_kind(GETTER.to_string(), FunKind::Getter)
    }

    pub fn setter() -> Self {
        Self::with_kind(SETTER.to_string(), FunKind::Setter)
    }

    fn with_kind(name: String, kind: FunKind) -> Self {
        Self {
            name,
            kind,
            kdoc: CodeBlock::default(),
            return_kdoc: CodeBlock::default(),
            annotations: Vec::new(),
            modifiers: BTreeSet::new(),
            type_variables: Vec::new(),
            receiver: None,
            parameters: Vec::new(),
            return_type: None,
            delegate_constructor: None,
            body: CodeBlockBuilder::default(),
        }
    }

    pub fn kdoc(mut self, kdoc: CodeBlock) -> Self {
        self.kdoc = kdoc;
        self
    }

    /// Documentation for the return value, emitted as an `@return` tag.
    pub fn return_kdoc(mut self, kdoc: CodeBlock) -> Self {
        self.return_kdoc = kdoc;
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

    /// Make this an extension function on `receiver`.
    pub fn receiver(mut self, receiver: impl Into<TypeName>) -> Self {
        self.receiver = Some(receiver.into());
        self
    }

    pub fn parameter(mut self, parameter: ParameterSpec) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn returns(mut self, return_type: impl Into<TypeName>) -> Self {
        self.return_type = Some(return_type.into());
        self
    }

    /// Delegate this constructor to another one in the same class.
    pub fn call_this_constructor(mut self, args: impl IntoIterator<Item = CodeBlock>) -> Self {
        self.delegate_constructor = Some(("this", args.into_iter().collect()));
        self
    }

    /// Delegate this constructor to one in the superclass.
    pub fn call_super_constructor(mut self, args: impl IntoIterator<Item = CodeBlock>) -> Self {
        self.delegate_constructor = Some(("super", args.into_iter().collect()));
        self
    }

    /// Append `code` to the body verbatim.
    pub fn body(mut self, code: &CodeBlock) -> Self {
        self.body = self.body.add_code(code);
        self
    }

    pub fn add_code(mut self, template: &str, args: &[Arg]) -> Result<Self> {
        self.body = self.body.add(template, args)?;
        Ok(self)
    }

    pub fn add_statement(mut self, template: &str, args: &[Arg]) -> Result<Self> {
        self.body = self.body.add_statement(template, args)?;
        Ok(self)
    }

    pub fn begin_control_flow(mut self, template: &str, args: &[Arg]) -> Result<Self> {
        self.body = self.body.begin_control_flow(template, args)?;
        Ok(self)
    }

    pub fn next_control_flow(mut self, template: &str, args: &[Arg]) -> Result<Self> {
        self.body = self.body.next_control_flow(template, args)?;
        Ok(self)
    }

    pub fn end_control_flow(mut self) -> Self {
        self.body = self.body.end_control_flow();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_constructor(&self) -> bool {
        self.kind == FunKind::Constructor
    }

    pub fn is_getter(&self) -> bool {
        self.kind == FunKind::Getter
    }

    pub fn is_setter(&self) -> bool {
        self.kind == FunKind::Setter
    }

    pub fn parameters(&self) -> &[ParameterSpec] {
        &self.parameters
    }

    pub fn parameter_named(&self, name: &str) -> Option<&ParameterSpec> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub(crate) fn body_code(&self) -> CodeBlock {
        self.body.clone().build()
    }

    fn is_empty_setter(&self) -> bool {
        self.kind == FunKind::Setter && self.parameters.is_empty()
    }

    pub(crate) fn validate(&self) -> Result<()> {
        for parameter in &self.parameters {
            parameter.validate()?;
        }

        let has_code = !self.body.is_empty();
        if has_code
            && (self.modifiers.contains(&KModifier::Abstract)
                || self.modifiers.contains(&KModifier::Expect))
        {
            return Err(Error::invalid_declaration(format!(
                "abstract function {} cannot have code",
                self.name
            )));
        }
        match self.kind {
            FunKind::Getter if !self.parameters.is_empty() => {
                return Err(Error::invalid_declaration(format!(
                    "{} cannot have parameters",
                    self.name
                )));
            }
            FunKind::Setter if self.parameters.len() > 1 => {
                return Err(Error::invalid_declaration(format!(
                    "{} can have at most one parameter",
                    self.name
                )));
            }
            FunKind::Setter if self.parameters.is_empty() && has_code => {
                return Err(Error::invalid_declaration(
                    "parameterless setter cannot have code",
                ));
            }
            _ => {}
        }
        if self.delegate_constructor.is_some() && self.kind != FunKind::Constructor {
            return Err(Error::invalid_declaration(format!(
                "{} is not a constructor and cannot delegate to one",
                self.name
            )));
        }
        if self.type_variables.iter().any(|v| v.reified)
            && !self.modifiers.contains(&KModifier::Inline)
        {
            return Err(Error::invalid_declaration(format!(
                "{}: only type parameters of inline functions can be reified",
                self.name
            )));
        }
        Ok(())
    }

    /// Emit the function. Modifiers in `implicit` are implied by the
    /// enclosing declaration and left out.
    pub(crate) fn emit_with(
        &self,
        writer: &mut CodeWriter,
        implicit: &BTreeSet<KModifier>,
        include_kdoc_tags: bool,
    ) -> Result<()> {
        self.validate()?;
        let body = self.body_code();

        let kdoc = if include_kdoc_tags {
            self.kdoc_with_tags()?
        } else {
            self.kdoc.clone()
        };
        emit_kdoc(writer, &kdoc)?;
        emit_annotations(writer, &self.annotations, false)?;
        emit_modifiers(writer, &self.modifiers, implicit)?;

        if self.kind == FunKind::Function {
            writer.emit("fun ")?;
        }
        if !self.type_variables.is_empty() {
            emit_type_variables(writer, &self.type_variables)?;
            writer.emit(" ")?;
        }

        let expression = expression_body(&body)?;
        self.emit_signature(writer, expression.is_some())?;
        emit_where_block(writer, &self.type_variables)?;

        if self.omits_body(&body, implicit)? {
            return writer.emit("\n");
        }
        if let Some(expression) = expression {
            return writer.emit_code_with(&code_block!(" = %L", expression)?, false, true);
        }
        if self.is_empty_setter() {
            return writer.emit("\n");
        }

        writer.emit(" {\n")?;
        writer.indent(1);
        writer.emit_code_with(&body, false, true)?;
        writer.unindent(1)?;
        writer.emit("}\n")
    }

    fn emit_signature(&self, writer: &mut CodeWriter, expression_body: bool) -> Result<()> {
        match self.kind {
            FunKind::Constructor => writer.emit("constructor")?,
            FunKind::Getter => writer.emit("get")?,
            FunKind::Setter => writer.emit("set")?,
            FunKind::Function => {
                if let Some(receiver) = &self.receiver {
                    writer.emit_format("%T.", &[Arg::from(receiver)])?;
                }
                writer.emit_format("%N", &[Arg::from(self.name.as_str())])?;
            }
        }

        if !self.is_empty_setter() {
            let include_type = self.kind != FunKind::Setter;
            emit_parameters(writer, &self.parameters, false, |writer, parameter| {
                parameter.emit_with(writer, include_type, true)
            })?;
        }

        match &self.return_type {
            Some(return_type) if !types::is_unit(return_type) => {
                writer.emit_format(": %T", &[Arg::from(return_type)])?;
            }
            // `fun f(): Unit = g()` reads better than leaving the type to inference.
            _ if expression_body && self.kind == FunKind::Function => {
                writer.emit_format(": %T", &[Arg::from(types::unit())])?;
            }
            _ => {}
        }

        if let Some((keyword, args)) = &self.delegate_constructor {
            let prefix = format!(" : {keyword}(");
            writer.emit_code(&CodeBlock::join(args.iter().cloned(), ", ", &prefix, ")"))?;
        }
        Ok(())
    }

    fn omits_body(&self, body: &CodeBlock, implicit: &BTreeSet<KModifier>) -> Result<bool> {
        let has = |modifier: KModifier| {
            self.modifiers.contains(&modifier) || implicit.contains(&modifier)
        };

        if self.modifiers.contains(&KModifier::Abstract) || has(KModifier::Expect) {
            if !body.is_empty() {
                return Err(Error::invalid_declaration(format!(
                    "function {} cannot have code",
                    self.name
                )));
            }
            return Ok(true);
        }

        let may_omit = self.kind == FunKind::Constructor
            || has(KModifier::External)
            || implicit.contains(&KModifier::Abstract);
        Ok(may_omit && body.is_empty())
    }

    fn kdoc_with_tags(&self) -> Result<CodeBlock> {
        let mut builder = self.kdoc.ensure_ends_with_newline().to_builder();
        let mut first_tag = true;
        let mut start_tag = |builder: CodeBlockBuilder| -> Result<CodeBlockBuilder> {
            let separate = first_tag && !self.kdoc.is_empty();
            first_tag = false;
            if separate {
                builder.add("\n", &[])
            } else {
                Ok(builder)
            }
        };

        for parameter in self.parameters.iter().filter(|p| !p.kdoc.is_empty()) {
            builder = start_tag(builder)?.add(
                "@param %L %L",
                &[
                    Arg::from(parameter.name.as_str()),
                    Arg::from(parameter.kdoc.ensure_ends_with_newline()),
                ],
            )?;
        }
        if !self.return_kdoc.is_empty() {
            builder = start_tag(builder)?.add(
                "@return %L",
                &[Arg::from(self.return_kdoc.ensure_ends_with_newline())],
            )?;
        }
        Ok(builder.build())
    }
}

/// The expression of a body that is a single `return` or `throw`.
///
/// `return x` becomes `x`; a `throw` is kept whole.
fn expression_body(body: &CodeBlock) -> Result<Option<CodeBlock>> {
    let trimmed = body.trim();
    if trimmed.is_empty() || trimmed.has_unmatched_closing_statement() {
        return Ok(None);
    }
    // More than one statement can't be an expression.
    let newlines = trimmed
        .instructions()
        .iter()
        .filter(|i| matches!(i, quill_codegen::Instruction::Newline))
        .count();
    if trimmed.has_statements() || newlines > 1 {
        return Ok(None);
    }

    for prefix in ["return ", "return·"] {
        if let Some(rest) = trimmed.without_prefix(&CodeBlock::of(prefix, &[])?) {
            return Ok(Some(rest));
        }
    }
    for prefix in ["throw ", "throw·"] {
        if trimmed.without_prefix(&CodeBlock::of(prefix, &[])?).is_some() {
            return Ok(Some(trimmed));
        }
    }
    Ok(None)
}

impl Declaration for FunSpec {
    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn emit(&self, writer: &mut CodeWriter) -> Result<()> {
        self.emit_with(writer, &modifier_set(&[KModifier::Public]), true)
    }
}

impl From<FunSpec> for Arg {
    fn from(spec: FunSpec) -> Self {
        Arg::Node(Arc::new(spec))
    }
}
