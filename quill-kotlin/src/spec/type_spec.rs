//! Classes, objects, interfaces and enums.

use std::collections::BTreeSet;
use std::sync::Arc;

use indexmap::IndexMap;
use quill_codegen::{Arg, CodeBlock, CodeWriter, Declaration, TypeScope, code_block};
use quill_core::{Error, LexicalPolicy, Result, TypeName, TypeVariable};

use super::{
    AnnotationSpec, FunSpec, PropertySpec, emit_annotations, emit_kdoc, emit_parameters,
    emit_type_variables, emit_where_block,
};
use crate::KModifier;
use crate::modifier::{emit_modifiers, modifier_set};

/// The declaration keyword of a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Class,
    Object,
    Interface,
}

impl TypeKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Object => "object",
            Self::Interface => "interface",
        }
    }

    /// Modifiers every property and function of this kind has without
    /// saying so.
    fn implicit_member_modifiers(&self, modifiers: &BTreeSet<KModifier>) -> BTreeSet<KModifier> {
        let mut implicit = match self {
            Self::Class | Self::Object => modifier_set(&[KModifier::Public]),
            Self::Interface => modifier_set(&[KModifier::Public, KModifier::Abstract]),
        };
        implicit.extend(inherited(modifiers));
        implicit
    }

    fn implicit_type_modifiers(&self, modifiers: &BTreeSet<KModifier>) -> BTreeSet<KModifier> {
        inherited(modifiers).collect()
    }
}

/// `expect` and `external` carry over to everything declared inside.
fn inherited(modifiers: &BTreeSet<KModifier>) -> impl Iterator<Item = KModifier> + '_ {
    modifiers
        .iter()
        .copied()
        .filter(|m| matches!(m, KModifier::Expect | KModifier::External))
}

/// A type declaration.
///
/// # Example
///
/// ```
/// use quill_codegen::code_block;
/// use quill_kotlin::{FunSpec, KModifier, ParameterSpec, PropertySpec, TypeSpec, types};
///
/// let point = TypeSpec::class("Point")
///     .modifier(KModifier::Data)
///     .primary_constructor(
///         FunSpec::constructor()
///             .parameter(ParameterSpec::new("x", types::int()))
///             .parameter(ParameterSpec::new("y", types::int())),
///     )
///     .property(PropertySpec::new("x", types::int()).initializer(code_block!("%N", "x")?))
///     .property(PropertySpec::new("y", types::int()).initializer(code_block!("%N", "y")?));
///
/// assert_eq!(
///     quill_kotlin::render_declaration(point)?,
///     "public data class Point(\n  public val x: kotlin.Int,\n  public val y: kotlin.Int,\n)\n"
/// );
/// # Ok::<(), Box<quill_core::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct TypeSpec {
    kind: TypeKind,
    name: Option<String>,
    kdoc: CodeBlock,
    annotations: Vec<AnnotationSpec>,
    modifiers: BTreeSet<KModifier>,
    type_variables: Vec<TypeVariable>,
    primary_constructor: Option<FunSpec>,
    superclass: Option<TypeName>,
    superclass_constructor_parameters: Vec<CodeBlock>,
    super_interfaces: IndexMap<TypeName, Option<CodeBlock>>,
    enum_constants: IndexMap<String, TypeSpec>,
    properties: Vec<PropertySpec>,
    initializer_block: CodeBlock,
    initializer_index: Option<usize>,
    functions: Vec<FunSpec>,
    types: Vec<TypeSpec>,
}

impl TypeSpec {
    fn with_kind(kind: TypeKind, name: Option<String>, modifiers: &[KModifier]) -> Self {
        Self {
            kind,
            name,
            kdoc: CodeBlock::default(),
            annotations: Vec::new(),
            modifiers: modifier_set(modifiers),
            type_variables: Vec::new(),
            primary_constructor: None,
            superclass: None,
            superclass_constructor_parameters: Vec::new(),
            super_interfaces: IndexMap::new(),
            enum_constants: IndexMap::new(),
            properties: Vec::new(),
            initializer_block: CodeBlock::default(),
            initializer_index: None,
            functions: Vec::new(),
            types: Vec::new(),
        }
    }

    pub fn class(name: impl Into<String>) -> Self {
        Self::with_kind(TypeKind::Class, Some(name.into()), &[])
    }

    pub fn object(name: impl Into<String>) -> Self {
        Self::with_kind(TypeKind::Object, Some(name.into()), &[])
    }

    pub fn interface(name: impl Into<String>) -> Self {
        Self::with_kind(TypeKind::Interface, Some(name.into()), &[])
    }

    pub fn fun_interface(name: impl Into<String>) -> Self {
        Self::with_kind(TypeKind::Interface, Some(name.into()), &[KModifier::Fun])
    }

    pub fn enum_class(name: impl Into<String>) -> Self {
        Self::with_kind(TypeKind::Class, Some(name.into()), &[KModifier::Enum])
    }

    pub fn annotation_class(name: impl Into<String>) -> Self {
        Self::with_kind(TypeKind::Class, Some(name.into()), &[KModifier::Annotation])
    }

    pub fn companion_object() -> Self {
        Self::with_kind(TypeKind::Object, None, &[KModifier::Companion])
    }

    /// An `object : Supertype { … }` expression, also used for enum
    /// constant bodies.
    pub fn anonymous_class() -> Self {
        Self::with_kind(TypeKind::Class, None, &[])
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

    /// Parameters of the primary constructor that match a property by name,
    /// type and a `%N` initializer become `val`/`var` parameters.
    pub fn primary_constructor(mut self, constructor: FunSpec) -> Self {
        self.primary_constructor = Some(constructor);
        self
    }

    pub fn superclass(mut self, superclass: impl Into<TypeName>) -> Self {
        self.superclass = Some(superclass.into());
        self
    }

    pub fn superclass_constructor_parameter(mut self, argument: CodeBlock) -> Self {
        self.superclass_constructor_parameters.push(argument);
        self
    }

    pub fn add_superclass_constructor_parameter(self, template: &str, args: &[Arg]) -> Result<Self> {
        let argument = CodeBlock::of(template, args)?;
        Ok(self.superclass_constructor_parameter(argument))
    }

    pub fn super_interface(mut self, interface: impl Into<TypeName>) -> Self {
        self.super_interfaces.insert(interface.into(), None);
        self
    }

    /// Implement `interface` by delegation, as in `Comparable<T> by other`.
    pub fn super_interface_delegate(
        mut self,
        interface: impl Into<TypeName>,
        delegate: CodeBlock,
    ) -> Self {
        self.super_interfaces.insert(interface.into(), Some(delegate));
        self
    }

    pub fn enum_constant(self, name: impl Into<String>) -> Self {
        self.enum_constant_with(name, Self::anonymous_class())
    }

    /// An enum constant with constructor arguments or a body of its own.
    pub fn enum_constant_with(mut self, name: impl Into<String>, body: TypeSpec) -> Self {
        self.enum_constants.insert(name.into(), body);
        self
    }

    pub fn property(mut self, property: PropertySpec) -> Self {
        self.properties.push(property);
        self
    }

    /// Add an `init { … }` block. The first one is placed after the
    /// properties added so far.
    pub fn initializer_block(mut self, code: &CodeBlock) -> Self {
        if self.initializer_index.is_none() {
            self.initializer_index = Some(self.properties.len());
        }
        let block = CodeBlock::join(
            [code.ensure_ends_with_newline()],
            "",
            "init {\n⇥",
            "⇤}\n",
        );
        let existing = std::mem::take(&mut self.initializer_block);
        self.initializer_block = CodeBlock::join([existing, block], "", "", "");
        self
    }

    pub fn function(mut self, function: FunSpec) -> Self {
        self.functions.push(function);
        self
    }

    pub fn nested_type(mut self, nested: TypeSpec) -> Self {
        self.types.push(nested);
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    pub fn is_enum(&self) -> bool {
        self.modifiers.contains(&KModifier::Enum)
    }

    pub fn is_companion(&self) -> bool {
        self.modifiers.contains(&KModifier::Companion)
    }

    pub fn is_anonymous(&self) -> bool {
        self.name.is_none() && !self.is_companion()
    }

    fn display_name(&self) -> &str {
        match &self.name {
            Some(name) => name,
            None if self.is_companion() => "Companion",
            None => "anonymous class",
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        let name = self.display_name();
        let invalid = |message: String| Err(Error::invalid_declaration(message));

        if !self.enum_constants.is_empty() && !self.is_enum() {
            return invalid(format!("{name} is not an enum and cannot have enum constants"));
        }
        if self.is_enum() && self.enum_constants.is_empty() {
            return invalid(format!("at least one enum constant is required for {name}"));
        }
        if self.superclass.is_some() && self.kind != TypeKind::Class {
            return invalid(format!("only classes have super classes, not {name}"));
        }
        if self.is_anonymous() && !self.type_variables.is_empty() {
            return invalid("anonymous classes cannot have type variables".to_string());
        }

        let has_secondary = self.functions.iter().any(FunSpec::is_constructor);
        match &self.primary_constructor {
            Some(constructor) if !constructor.is_constructor() => {
                return invalid(format!(
                    "{}: primary constructor of {name} must be a constructor",
                    constructor.name()
                ));
            }
            Some(_) if self.kind != TypeKind::Class => {
                return invalid(format!("{name} cannot have a primary constructor"));
            }
            None if has_secondary && !self.superclass_constructor_parameters.is_empty() => {
                return invalid(format!(
                    "{name}: types without a primary constructor cannot specify secondary \
                     constructors and superclass constructor parameters"
                ));
            }
            _ => {}
        }
        if has_secondary && self.kind != TypeKind::Class {
            return invalid(format!("{name} cannot have constructors"));
        }

        let is_abstract = self.kind == TypeKind::Interface
            || self.is_enum()
            || self.modifiers.contains(&KModifier::Abstract)
            || self.modifiers.contains(&KModifier::Sealed);
        if !is_abstract {
            if let Some(function) = self
                .functions
                .iter()
                .find(|f| f.modifiers.contains(&KModifier::Abstract))
            {
                return invalid(format!(
                    "non-abstract type {name} cannot declare abstract function {}",
                    function.name()
                ));
            }
        }

        if self.types.iter().filter(|t| t.is_companion()).count() > 1 {
            return invalid(format!("{name} has more than one companion object"));
        }
        Ok(())
    }

    /// Emit the type. `enum_name` is set when this is the body of an enum
    /// constant.
    pub(crate) fn emit_with(
        &self,
        writer: &mut CodeWriter,
        enum_name: Option<&str>,
        implicit: &BTreeSet<KModifier>,
    ) -> Result<()> {
        self.validate()?;
        // A type declared inside a statement does not continue it.
        let statement = writer.suspend_statement();
        let result = self.emit_declaration(writer, enum_name, implicit);
        writer.resume_statement(statement);
        result
    }

    fn emit_declaration(
        &self,
        writer: &mut CodeWriter,
        enum_name: Option<&str>,
        implicit: &BTreeSet<KModifier>,
    ) -> Result<()> {
        let constructor_properties = self.constructor_properties(writer.policy())?;
        let super_arguments = CodeBlock::join(
            self.superclass_constructor_parameters.iter().cloned(),
            ", ",
            "",
            "",
        );
        let modifiers: BTreeSet<KModifier> = self.modifiers.union(implicit).copied().collect();

        if let Some(enum_name) = enum_name {
            emit_kdoc(writer, &self.kdoc_with_constructor_docs(&constructor_properties)?)?;
            emit_annotations(writer, &self.annotations, false)?;
            writer.emit_format("%N", &[Arg::from(enum_name)])?;
            if !super_arguments.is_empty() {
                writer.emit("(")?;
                writer.emit_code(&super_arguments)?;
                writer.emit(")")?;
            }
            if self.has_no_body(&constructor_properties) {
                return Ok(());
            }
            writer.emit(" {\n")?;
        } else if self.is_anonymous() {
            writer.emit("object")?;
            let supertypes = self.supertypes(&super_arguments, true, &modifiers)?;
            if !supertypes.is_empty() {
                writer.emit_code(&CodeBlock::join(supertypes, ",♢", " : ", ""))?;
            }
            writer.emit(" {\n")?;
        } else {
            emit_kdoc(writer, &self.kdoc_with_constructor_docs(&constructor_properties)?)?;
            emit_annotations(writer, &self.annotations, false)?;
            emit_modifiers(writer, &self.modifiers, &modifier_set(&[KModifier::Public]))?;
            writer.emit(self.kind.keyword())?;
            if let Some(name) = &self.name {
                writer.emit_format(" %N", &[Arg::from(name.as_str())])?;
            }
            emit_type_variables(writer, &self.type_variables)?;

            let mut wrapped_parameters = false;
            if let Some(constructor) = &self.primary_constructor {
                writer.push_type(self.scope());
                let result =
                    self.emit_primary_constructor(writer, constructor, &constructor_properties);
                writer.pop_type();
                result?;
                wrapped_parameters = !constructor.parameters.is_empty();
            }

            // Without a primary constructor the superclass is called from the
            // secondary ones.
            let call_superclass = self.primary_constructor.is_some()
                || !self.functions.iter().any(FunSpec::is_constructor);
            let supertypes = self.supertypes(&super_arguments, call_superclass, &modifiers)?;
            if !supertypes.is_empty() {
                let separator = if wrapped_parameters { ",\n    " } else { ",♢" };
                writer.emit_code(&CodeBlock::join(supertypes, separator, " : ", ""))?;
            }
            emit_where_block(writer, &self.type_variables)?;

            if self.has_no_body(&constructor_properties) {
                return writer.emit("\n");
            }
            writer.emit(" {\n")?;
        }

        writer.push_type(self.scope());
        writer.indent(1);
        let result = self.emit_body(writer, &constructor_properties, &modifiers);
        writer.pop_type();
        result?;
        writer.unindent(1)?;
        writer.emit("}")?;
        if enum_name.is_none() && !self.is_anonymous() {
            writer.emit("\n")?;
        }
        Ok(())
    }

    fn emit_primary_constructor(
        &self,
        writer: &mut CodeWriter,
        constructor: &FunSpec,
        constructor_properties: &IndexMap<String, PropertySpec>,
    ) -> Result<()> {
        let has_annotations = !constructor.annotations.is_empty();
        let has_modifiers = !constructor.modifiers.is_empty();
        if has_annotations {
            writer.emit(" ")?;
            emit_annotations(writer, &constructor.annotations, true)?;
        }
        if has_modifiers {
            if !has_annotations {
                writer.emit(" ")?;
            }
            emit_modifiers(writer, &constructor.modifiers, &BTreeSet::new())?;
        }
        if has_annotations || has_modifiers {
            writer.emit("constructor")?;
        }

        let public = modifier_set(&[KModifier::Public]);
        emit_parameters(writer, constructor.parameters(), true, |writer, parameter| {
            match constructor_properties.get(parameter.name()) {
                Some(property) => {
                    property.emit_with(writer, &public, true)?;
                    parameter.emit_default_value(writer)
                }
                None => parameter.emit_with(writer, true, false),
            }
        })
    }

    fn emit_body(
        &self,
        writer: &mut CodeWriter,
        constructor_properties: &IndexMap<String, PropertySpec>,
        modifiers: &BTreeSet<KModifier>,
    ) -> Result<()> {
        let mut first = true;
        let mut separate = |writer: &mut CodeWriter| -> Result<()> {
            if !first {
                writer.emit("\n")?;
            }
            first = false;
            Ok(())
        };

        for (name, constant) in &self.enum_constants {
            separate(writer)?;
            constant.emit_with(writer, Some(name.as_str()), &BTreeSet::new())?;
            writer.emit(",")?;
        }
        if self.is_enum() {
            writer.emit("\n")?;
            let has_members = self
                .properties
                .iter()
                .any(|p| !constructor_properties.contains_key(&p.name))
                || !self.initializer_block.is_empty()
                || self.has_constructor_body()
                || !self.functions.is_empty()
                || !self.types.is_empty();
            if has_members {
                writer.emit(";\n")?;
            }
        }

        let member_implicit = self.kind.implicit_member_modifiers(modifiers);
        let initializer_at = self
            .initializer_index
            .filter(|_| !self.initializer_block.is_empty());
        for (index, property) in self.properties.iter().enumerate() {
            if initializer_at == Some(index) {
                separate(writer)?;
                writer.emit_code(&self.initializer_block)?;
            }
            if constructor_properties.contains_key(&property.name) {
                continue;
            }
            separate(writer)?;
            property.emit_with(writer, &member_implicit, false)?;
        }
        if initializer_at.is_some_and(|index| index >= self.properties.len()) {
            separate(writer)?;
            writer.emit_code(&self.initializer_block)?;
        }

        if let Some(constructor) = &self.primary_constructor {
            let body = constructor.body_code();
            if !body.is_empty() {
                separate(writer)?;
                writer.emit("init {\n")?;
                writer.indent(1);
                writer.emit_code(&body)?;
                writer.unindent(1)?;
                writer.emit("}\n")?;
            }
        }

        for constructor in self.functions.iter().filter(|f| f.is_constructor()) {
            separate(writer)?;
            constructor.emit_with(writer, &member_implicit, false)?;
        }
        for function in self.functions.iter().filter(|f| !f.is_constructor()) {
            separate(writer)?;
            function.emit_with(writer, &member_implicit, true)?;
        }

        let type_implicit = self.kind.implicit_type_modifiers(modifiers);
        for nested in &self.types {
            separate(writer)?;
            nested.emit_with(writer, None, &type_implicit)?;
        }
        Ok(())
    }

    fn supertypes(
        &self,
        super_arguments: &CodeBlock,
        call_superclass: bool,
        modifiers: &BTreeSet<KModifier>,
    ) -> Result<Vec<CodeBlock>> {
        let mut supertypes = Vec::new();
        if let Some(superclass) = &self.superclass {
            let declared_elsewhere =
                modifiers.contains(&KModifier::External) || modifiers.contains(&KModifier::Expect);
            supertypes.push(if call_superclass && !declared_elsewhere {
                code_block!("%T(%L)", superclass, super_arguments.clone())?
            } else {
                code_block!("%T", superclass)?
            });
        }
        for (interface, delegate) in &self.super_interfaces {
            supertypes.push(match delegate {
                Some(delegate) => code_block!("%T by %L", interface, delegate)?,
                None => code_block!("%T", interface)?,
            });
        }
        Ok(supertypes)
    }

    /// Properties declared as primary constructor parameters, by name.
    fn constructor_properties(
        &self,
        policy: &LexicalPolicy,
    ) -> Result<IndexMap<String, PropertySpec>> {
        let mut result = IndexMap::new();
        let Some(constructor) = &self.primary_constructor else {
            return Ok(result);
        };

        // Properties after an init block must stay in the body to keep
        // initialization order.
        let end = self
            .initializer_index
            .filter(|_| !self.initializer_block.is_empty())
            .unwrap_or(self.properties.len())
            .min(self.properties.len());
        for property in &self.properties[..end] {
            if property.getter.is_some() || property.setter.is_some() {
                continue;
            }
            let Some(parameter) = constructor.parameter_named(&property.name) else {
                continue;
            };
            if parameter.type_name != property.type_name {
                continue;
            }
            let Some(initializer) = &property.initializer else {
                continue;
            };
            let rendered = CodeWriter::render_fragment(initializer, policy)?;
            if rendered != policy.escape(&parameter.name)? {
                continue;
            }
            result.insert(
                property.name.clone(),
                property.from_constructor_parameter(parameter),
            );
        }
        Ok(result)
    }

    fn kdoc_with_constructor_docs(
        &self,
        constructor_properties: &IndexMap<String, PropertySpec>,
    ) -> Result<CodeBlock> {
        let kdoc = self.kdoc.ensure_ends_with_newline();
        let Some(constructor) = &self.primary_constructor else {
            return Ok(kdoc);
        };

        let mut tags = Vec::new();
        if !constructor.kdoc.is_empty() {
            tags.push(code_block!(
                "@constructor %L",
                constructor.kdoc.ensure_ends_with_newline()
            )?);
        }
        for parameter in &constructor.parameters {
            let docs = match constructor_properties.get(&parameter.name) {
                Some(property) if parameter.kdoc.is_empty() => &property.kdoc,
                _ => &parameter.kdoc,
            };
            if !docs.is_empty() {
                tags.push(code_block!(
                    "@param %L %L",
                    parameter.name.as_str(),
                    docs.ensure_ends_with_newline()
                )?);
            }
        }
        if tags.is_empty() {
            return Ok(kdoc);
        }

        let separator = if kdoc.is_empty() { "" } else { "\n" };
        Ok(CodeBlock::join(
            [kdoc, CodeBlock::join(tags, "", separator, "")],
            "",
            "",
            "",
        ))
    }

    fn has_constructor_body(&self) -> bool {
        self.primary_constructor
            .as_ref()
            .is_some_and(|c| !c.body_code().is_empty())
    }

    fn has_no_body(&self, constructor_properties: &IndexMap<String, PropertySpec>) -> bool {
        self.properties
            .iter()
            .all(|p| constructor_properties.contains_key(&p.name))
            && self.enum_constants.is_empty()
            && self.initializer_block.is_empty()
            && !self.has_constructor_body()
            && self.functions.is_empty()
            && self.types.is_empty()
    }

    fn scope(&self) -> TypeScope {
        let name = match &self.name {
            Some(name) => name.clone(),
            None if self.is_companion() => "Companion".to_string(),
            None => String::new(),
        };
        TypeScope {
            name,
            nested_types: self.types.iter().filter_map(|t| t.name.clone()).collect(),
            enum_constants: self.enum_constants.keys().cloned().collect(),
            functions: self
                .functions
                .iter()
                .filter(|f| !f.is_constructor())
                .map(|f| f.name.clone())
                .collect(),
            is_inner: self.modifiers.contains(&KModifier::Inner),
        }
    }
}

impl Declaration for TypeSpec {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn emit(&self, writer: &mut CodeWriter) -> Result<()> {
        self.emit_with(writer, None, &BTreeSet::new())
    }
}

impl From<TypeSpec> for Arg {
    fn from(spec: TypeSpec) -> Self {
        Arg::Node(Arc::new(spec))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use quill_core::ClassName;

    use super::*;
    use crate::{ParameterSpec, render_declaration, types};

    fn name_property(initializer: &str) -> PropertySpec {
        PropertySpec::new("name", types::string())
            .initializer(code_block!("%S", initializer).unwrap())
    }

    #[test]
    fn test_class_with_property() {
        let taco = TypeSpec::class("Taco").property(name_property("x"));
        assert_eq!(
            render_declaration(taco).unwrap(),
            "public class Taco {\n  public val name: kotlin.String = \"x\"\n}\n"
        );
    }

    #[test]
    fn test_enum() {
        let roshambo = TypeSpec::enum_class("Roshambo")
            .enum_constant("ROCK")
            .enum_constant("PAPER");
        assert_eq!(
            render_declaration(roshambo).unwrap(),
            "public enum class Roshambo {\n  ROCK,\n  PAPER,\n}\n"
        );
    }

    #[test]
    fn test_enum_with_constructor_and_members() {
        let roshambo = TypeSpec::enum_class("Roshambo")
            .primary_constructor(
                FunSpec::constructor().parameter(ParameterSpec::new("hand", types::string())),
            )
            .property(
                PropertySpec::new("hand", types::string())
                    .initializer(code_block!("%N", "hand").unwrap()),
            )
            .enum_constant_with(
                "ROCK",
                TypeSpec::anonymous_class()
                    .add_superclass_constructor_parameter("%S", &[Arg::from("fist")])
                    .unwrap(),
            )
            .function(FunSpec::new("shout").add_statement("println(hand)", &[]).unwrap());
        assert_eq!(
            render_declaration(roshambo).unwrap(),
            "public enum class Roshambo(\n  public val hand: kotlin.String,\n) {\n  ROCK(\"fist\"),\n  ;\n\n  public fun shout() {\n    println(hand)\n  }\n}\n"
        );
    }

    #[test]
    fn test_interface_members_are_abstract() {
        let runner = TypeSpec::interface("Runner")
            .property(PropertySpec::new("speed", types::int()))
            .function(FunSpec::new("run"));
        assert_eq!(
            render_declaration(runner).unwrap(),
            "public interface Runner {\n  public val speed: kotlin.Int\n\n  public fun run()\n}\n"
        );
    }

    #[test]
    fn test_supertypes_without_body() {
        let taco = TypeSpec::class("Taco")
            .superclass(ClassName::new("com.example", "Food"))
            .add_superclass_constructor_parameter("%S", &[Arg::from("taco")])
            .unwrap()
            .super_interface(ClassName::new("java.io", "Serializable"));
        assert_eq!(
            render_declaration(taco).unwrap(),
            "public class Taco : com.example.Food(\"taco\"), java.io.Serializable\n"
        );
    }

    #[test]
    fn test_companion_object() {
        let foo = TypeSpec::class("Foo").nested_type(
            TypeSpec::companion_object().property(
                PropertySpec::new("MAX", types::int())
                    .modifier(KModifier::Const)
                    .initializer(code_block!("10").unwrap()),
            ),
        );
        assert_eq!(
            render_declaration(foo).unwrap(),
            "public class Foo {\n  public companion object {\n    public const val MAX: kotlin.Int = 10\n  }\n}\n"
        );
    }

    #[test]
    fn test_anonymous_class_in_code() {
        let runnable = TypeSpec::anonymous_class()
            .super_interface(ClassName::new("java.lang", "Runnable"))
            .function(FunSpec::new("run").modifier(KModifier::Override));
        let code = code_block!("val task = %L", runnable).unwrap();
        assert_eq!(
            CodeWriter::render_fragment(&code, &crate::KOTLIN).unwrap(),
            "val task = object : java.lang.Runnable {\n  override fun run() {\n  }\n}"
        );
    }

    #[test]
    fn test_initializer_block_follows_earlier_properties() {
        let counter = TypeSpec::class("Counter")
            .property(
                PropertySpec::new("count", types::int())
                    .mutable()
                    .initializer(code_block!("0").unwrap()),
            )
            .initializer_block(&code_block!("count = 1\n").unwrap());
        assert_eq!(
            render_declaration(counter).unwrap(),
            "public class Counter {\n  public var count: kotlin.Int = 0\n\n  init {\n    count = 1\n  }\n}\n"
        );
    }

    #[test]
    fn test_constructor_docs_move_to_the_class() {
        let taco = TypeSpec::class("Taco")
            .kdoc(code_block!("A taco.").unwrap())
            .primary_constructor(
                FunSpec::constructor().parameter(
                    ParameterSpec::new("filling", types::string())
                        .kdoc(code_block!("what goes inside").unwrap()),
                ),
            );
        assert_eq!(
            render_declaration(taco).unwrap(),
            "/**\n * A taco.\n *\n * @param filling what goes inside\n */\npublic class Taco(\n  filling: kotlin.String,\n)\n"
        );
    }

    #[test]
    fn test_enum_constants_need_an_enum() {
        let err = render_declaration(TypeSpec::class("Taco").enum_constant("A")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid declaration: Taco is not an enum and cannot have enum constants"
        );
    }

    #[test]
    fn test_abstract_function_needs_abstract_type() {
        let taco = TypeSpec::class("Taco")
            .function(FunSpec::new("eat").modifier(KModifier::Abstract));
        let err = render_declaration(taco).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid declaration: non-abstract type Taco cannot declare abstract function eat"
        );
    }
}
