//! Symbolic names that the resolver turns into display forms.
//!
//! Identity is always the canonical (fully qualified) name. Nothing in here
//! knows about imports or escaping; that is decided per output file.

use std::fmt;

use crate::{Error, Result};

/// A fully qualified class name: a package plus one or more simple names,
/// outermost first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassName {
    package: String,
    simple_names: Vec<String>,
}

impl ClassName {
    /// A top-level class. `package` may be empty for the default package.
    pub fn new(package: impl Into<String>, simple_name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            simple_names: vec![simple_name.into()],
        }
    }

    /// A class nested inside `names[..len - 1]`.
    pub fn from_parts<I, S>(package: impl Into<String>, names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let simple_names: Vec<String> = names.into_iter().map(Into::into).collect();
        if simple_names.is_empty() {
            return Err(Error::invalid_declaration("class name needs at least one simple name"));
        }
        if let Some(empty) = simple_names.iter().position(|n| n.is_empty()) {
            return Err(Error::invalid_declaration(format!(
                "simple name {empty} of {simple_names:?} is empty"
            )));
        }
        Ok(Self {
            package: package.into(),
            simple_names,
        })
    }

    /// Guess a class name from a dotted string: lowercase leading segments
    /// form the package, the rest must start uppercase.
    ///
    /// `"java.util.Map.Entry"` becomes package `java.util`, names `Map`, `Entry`.
    pub fn best_guess(name: &str) -> Result<Self> {
        let guess_error = || Error::invalid_declaration(format!("couldn't make a guess for {name}"));

        let mut package = Vec::new();
        let mut simple_names = Vec::new();
        for part in name.split('.') {
            let first = part.chars().next().ok_or_else(guess_error)?;
            if simple_names.is_empty() && first.is_lowercase() {
                package.push(part);
            } else if first.is_uppercase() {
                simple_names.push(part.to_string());
            } else {
                return Err(guess_error());
            }
        }
        if simple_names.is_empty() {
            return Err(guess_error());
        }
        Ok(Self {
            package: package.join("."),
            simple_names,
        })
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    /// Simple names from the outermost class to this one.
    pub fn simple_names(&self) -> &[String] {
        &self.simple_names
    }

    /// The innermost simple name.
    pub fn simple_name(&self) -> &str {
        // from_parts/new guarantee at least one entry
        self.simple_names.last().map(String::as_str).unwrap_or_default()
    }

    /// Package followed by every simple name, dot separated.
    pub fn canonical_name(&self) -> String {
        let names = self.simple_names.join(".");
        if self.package.is_empty() {
            names
        } else {
            format!("{}.{}", self.package, names)
        }
    }

    pub fn is_nested(&self) -> bool {
        self.simple_names.len() > 1
    }

    /// The class enclosing this one, if nested.
    pub fn enclosing(&self) -> Option<ClassName> {
        if !self.is_nested() {
            return None;
        }
        Some(Self {
            package: self.package.clone(),
            simple_names: self.simple_names[..self.simple_names.len() - 1].to_vec(),
        })
    }

    /// The outermost class.
    pub fn top_level(&self) -> ClassName {
        Self {
            package: self.package.clone(),
            simple_names: self.simple_names[..1].to_vec(),
        }
    }

    /// A class nested inside this one.
    pub fn nested(&self, name: impl Into<String>) -> ClassName {
        let mut simple_names = self.simple_names.clone();
        simple_names.push(name.into());
        Self {
            package: self.package.clone(),
            simple_names,
        }
    }

    /// A class with the same enclosing scope as this one.
    pub fn peer(&self, name: impl Into<String>) -> ClassName {
        let mut simple_names = self.simple_names.clone();
        if let Some(last) = simple_names.last_mut() {
            *last = name.into();
        }
        Self {
            package: self.package.clone(),
            simple_names,
        }
    }

    pub fn to_type(&self) -> TypeName {
        TypeName::from(self.clone())
    }

    pub fn member(&self, name: impl Into<String>) -> MemberName {
        MemberName::in_class(self.clone(), name)
    }

    pub fn parameterized_by(&self, arguments: impl IntoIterator<Item = TypeName>) -> TypeName {
        TypeName::Parameterized {
            raw: self.clone(),
            arguments: arguments.into_iter().collect(),
            nullable: false,
        }
    }
}

impl fmt::Display for ClassName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical_name())
    }
}

/// A function or property: top-level in a package, or inside a class.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MemberName {
    package: String,
    enclosing: Option<ClassName>,
    simple_name: String,
    is_extension: bool,
}

impl MemberName {
    pub fn new(package: impl Into<String>, simple_name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            enclosing: None,
            simple_name: simple_name.into(),
            is_extension: false,
        }
    }

    pub fn in_class(enclosing: ClassName, simple_name: impl Into<String>) -> Self {
        Self {
            package: enclosing.package().to_string(),
            enclosing: Some(enclosing),
            simple_name: simple_name.into(),
            is_extension: false,
        }
    }

    /// Mark this member as an extension, which must always be imported.
    pub fn extension(mut self) -> Self {
        self.is_extension = true;
        self
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn enclosing(&self) -> Option<&ClassName> {
        self.enclosing.as_ref()
    }

    pub fn simple_name(&self) -> &str {
        &self.simple_name
    }

    pub fn is_extension(&self) -> bool {
        self.is_extension
    }

    pub fn canonical_name(&self) -> String {
        match &self.enclosing {
            Some(class) => format!("{}.{}", class.canonical_name(), self.simple_name),
            None if self.package.is_empty() => self.simple_name.clone(),
            None => format!("{}.{}", self.package, self.simple_name),
        }
    }
}

impl fmt::Display for MemberName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical_name())
    }
}

/// Declaration-site or use-site variance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variance {
    In,
    Out,
}

impl Variance {
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::In => "in",
            Self::Out => "out",
        }
    }
}

/// A type parameter such as `T`, `out E : Any` or `reified R`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeVariable {
    pub name: String,
    pub bounds: Vec<TypeName>,
    pub variance: Option<Variance>,
    pub reified: bool,
    pub nullable: bool,
}

impl TypeVariable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bounds: Vec::new(),
            variance: None,
            reified: false,
            nullable: false,
        }
    }

    pub fn bound(mut self, bound: impl Into<TypeName>) -> Self {
        self.bounds.push(bound.into());
        self
    }

    pub fn variance(mut self, variance: Variance) -> Self {
        self.variance = Some(variance);
        self
    }

    pub fn reified(mut self) -> Self {
        self.reified = true;
        self
    }
}

/// A type as it appears at a use site.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeName {
    Class {
        class: ClassName,
        nullable: bool,
    },
    Parameterized {
        raw: ClassName,
        arguments: Vec<TypeName>,
        nullable: bool,
    },
    Variable(TypeVariable),
    /// A use-site projection such as `out Number`.
    Wildcard {
        variance: Variance,
        bound: Box<TypeName>,
    },
    /// The star projection `*`.
    Star,
    /// A function type such as `suspend String.(Int) -> Unit`.
    Lambda {
        function: LambdaType,
        nullable: bool,
    },
}

impl TypeName {
    pub fn nullable(self) -> Self {
        self.with_nullable(true)
    }

    pub fn non_null(self) -> Self {
        self.with_nullable(false)
    }

    fn with_nullable(self, value: bool) -> Self {
        match self {
            Self::Class { class, .. } => Self::Class {
                class,
                nullable: value,
            },
            Self::Parameterized { raw, arguments, .. } => Self::Parameterized {
                raw,
                arguments,
                nullable: value,
            },
            Self::Variable(mut variable) => {
                variable.nullable = value;
                Self::Variable(variable)
            }
            Self::Lambda { function, .. } => Self::Lambda {
                function,
                nullable: value,
            },
            other => other,
        }
    }

    pub fn is_nullable(&self) -> bool {
        match self {
            Self::Class { nullable, .. }
            | Self::Parameterized { nullable, .. }
            | Self::Lambda { nullable, .. } => *nullable,
            Self::Variable(variable) => variable.nullable,
            Self::Wildcard { .. } | Self::Star => false,
        }
    }

    /// The raw class of a class or parameterized type.
    pub fn class_name(&self) -> Option<&ClassName> {
        match self {
            Self::Class { class, .. } => Some(class),
            Self::Parameterized { raw, .. } => Some(raw),
            _ => None,
        }
    }

    /// Every class this type mentions, outermost first.
    pub fn referenced_classes(&self) -> Vec<&ClassName> {
        let mut out = Vec::new();
        self.visit_classes(&mut out);
        out
    }

    fn visit_classes<'a>(&'a self, out: &mut Vec<&'a ClassName>) {
        match self {
            Self::Class { class, .. } => out.push(class),
            Self::Parameterized { raw, arguments, .. } => {
                out.push(raw);
                for argument in arguments {
                    argument.visit_classes(out);
                }
            }
            Self::Variable(variable) => {
                for bound in &variable.bounds {
                    bound.visit_classes(out);
                }
            }
            Self::Wildcard { bound, .. } => bound.visit_classes(out),
            Self::Star => {}
            Self::Lambda { function, .. } => {
                if let Some(receiver) = &function.receiver {
                    receiver.visit_classes(out);
                }
                for parameter in &function.parameters {
                    parameter.visit_classes(out);
                }
                function.return_type.visit_classes(out);
            }
        }
    }
}

impl From<ClassName> for TypeName {
    fn from(class: ClassName) -> Self {
        Self::Class {
            class,
            nullable: false,
        }
    }
}

impl From<TypeVariable> for TypeName {
    fn from(variable: TypeVariable) -> Self {
        Self::Variable(variable)
    }
}

impl From<LambdaType> for TypeName {
    fn from(function: LambdaType) -> Self {
        Self::Lambda {
            function,
            nullable: false,
        }
    }
}

/// The shape of a function type: optional receiver, parameter types and a
/// return type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LambdaType {
    pub receiver: Option<Box<TypeName>>,
    pub parameters: Vec<TypeName>,
    pub return_type: Box<TypeName>,
    pub suspend: bool,
}

impl LambdaType {
    pub fn new(
        parameters: impl IntoIterator<Item = TypeName>,
        return_type: impl Into<TypeName>,
    ) -> Self {
        Self {
            receiver: None,
            parameters: parameters.into_iter().collect(),
            return_type: Box::new(return_type.into()),
            suspend: false,
        }
    }

    /// Make this an extension function type, e.g. `String.() -> Unit`.
    pub fn receiver(mut self, receiver: impl Into<TypeName>) -> Self {
        self.receiver = Some(Box::new(receiver.into()));
        self
    }

    pub fn suspending(mut self) -> Self {
        self.suspend = true;
        self
    }

    pub fn to_type(self) -> TypeName {
        self.into()
    }
}

/// Fully qualified rendering, used in diagnostics and `%S` of a type.
impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Class { class, .. } => write!(f, "{class}")?,
            Self::Parameterized { raw, arguments, .. } => {
                write!(f, "{raw}<")?;
                for (i, argument) in arguments.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{argument}")?;
                }
                f.write_str(">")?;
            }
            Self::Variable(variable) => f.write_str(&variable.name)?,
            Self::Wildcard { variance, bound } => write!(f, "{} {bound}", variance.keyword())?,
            Self::Star => f.write_str("*")?,
            Self::Lambda { function, nullable } => {
                if *nullable {
                    f.write_str("(")?;
                }
                if function.suspend {
                    f.write_str("suspend ")?;
                }
                if let Some(receiver) = &function.receiver {
                    if matches!(**receiver, Self::Lambda { .. }) {
                        write!(f, "({receiver}).")?;
                    } else {
                        write!(f, "{receiver}.")?;
                    }
                }
                f.write_str("(")?;
                for (i, parameter) in function.parameters.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{parameter}")?;
                }
                write!(f, ") -> {}", function.return_type)?;
                if *nullable {
                    f.write_str(")")?;
                }
            }
        }
        if self.is_nullable() {
            f.write_str("?")?;
        }
        Ok(())
    }
}

/// A symbolic reference collected from a tree: the unit of name resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Reference {
    Type(ClassName),
    Member(MemberName),
}

impl Reference {
    pub fn canonical_name(&self) -> String {
        match self {
            Self::Type(class) => class.canonical_name(),
            Self::Member(member) => member.canonical_name(),
        }
    }

    pub fn simple_name(&self) -> &str {
        match self {
            Self::Type(class) => class.simple_name(),
            Self::Member(member) => member.simple_name(),
        }
    }

    pub fn package(&self) -> &str {
        match self {
            Self::Type(class) => class.package(),
            Self::Member(member) => member.package(),
        }
    }
}

impl From<ClassName> for Reference {
    fn from(class: ClassName) -> Self {
        Self::Type(class)
    }
}

impl From<MemberName> for Reference {
    fn from(member: MemberName) -> Self {
        Self::Member(member)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_name() {
        let entry = ClassName::from_parts("java.util", ["Map", "Entry"]).unwrap();
        assert_eq!(entry.canonical_name(), "java.util.Map.Entry");
        assert_eq!(entry.simple_name(), "Entry");
        assert_eq!(entry.top_level(), ClassName::new("java.util", "Map"));
        assert_eq!(entry.enclosing(), Some(ClassName::new("java.util", "Map")));
    }

    #[test]
    fn test_default_package() {
        let name = ClassName::new("", "Taco");
        assert_eq!(name.canonical_name(), "Taco");
        assert_eq!(MemberName::new("", "taco").canonical_name(), "taco");
    }

    #[test]
    fn test_nested_and_peer() {
        let outer = ClassName::new("com.example", "Outer");
        let inner = outer.nested("Inner");
        assert_eq!(inner.canonical_name(), "com.example.Outer.Inner");
        assert_eq!(inner.peer("Other").canonical_name(), "com.example.Outer.Other");
        assert!(outer.enclosing().is_none());
    }

    #[test]
    fn test_best_guess() {
        let entry = ClassName::best_guess("java.util.Map.Entry").unwrap();
        assert_eq!(entry.package(), "java.util");
        assert_eq!(entry.simple_names(), ["Map", "Entry"]);

        let top = ClassName::best_guess("Taco").unwrap();
        assert_eq!(top.package(), "");

        assert!(ClassName::best_guess("java.util").is_err());
        assert!(ClassName::best_guess("java..Map").is_err());
        assert!(ClassName::best_guess("java.Map.entry").is_err());
    }

    #[test]
    fn test_member_canonical_name() {
        let member = MemberName::new("kotlin.collections", "listOf");
        assert_eq!(member.canonical_name(), "kotlin.collections.listOf");

        let nested = ClassName::new("com.example", "Taco").member("createTaco");
        assert_eq!(nested.canonical_name(), "com.example.Taco.createTaco");
        assert_eq!(nested.package(), "com.example");
    }

    #[test]
    fn test_type_display() {
        let string = ClassName::new("kotlin", "String").to_type();
        let list = ClassName::new("kotlin.collections", "List").parameterized_by([string.nullable()]);
        assert_eq!(list.to_string(), "kotlin.collections.List<kotlin.String?>");
        assert_eq!(TypeName::Star.to_string(), "*");
    }

    #[test]
    fn test_lambda_display() {
        let string = ClassName::new("kotlin", "String").to_type();
        let unit = ClassName::new("kotlin", "Unit").to_type();
        let int = ClassName::new("kotlin", "Int").to_type();

        let handler = LambdaType::new([int.clone()], unit.clone())
            .receiver(string.clone())
            .suspending();
        assert_eq!(
            handler.to_type().to_string(),
            "suspend kotlin.String.(kotlin.Int) -> kotlin.Unit"
        );

        let callback = LambdaType::new([], unit.clone()).to_type().nullable();
        assert!(callback.is_nullable());
        assert_eq!(callback.to_string(), "(() -> kotlin.Unit)?");

        let curried = LambdaType::new([int], LambdaType::new([], string).to_type())
            .receiver(LambdaType::new([], unit).to_type());
        assert_eq!(
            curried.to_type().to_string(),
            "(() -> kotlin.Unit).(kotlin.Int) -> () -> kotlin.String"
        );
    }

    #[test]
    fn test_lambda_referenced_classes() {
        let ty = LambdaType::new(
            [ClassName::new("java.util", "Date").to_type()],
            ClassName::new("kotlin", "Unit"),
        )
        .receiver(ClassName::new("com.example", "Scope"))
        .to_type();
        let names: Vec<_> = ty
            .referenced_classes()
            .into_iter()
            .map(ClassName::simple_name)
            .collect();
        assert_eq!(names, ["Scope", "Date", "Unit"]);
    }

    #[test]
    fn test_referenced_classes() {
        let map = ClassName::new("kotlin.collections", "Map").parameterized_by([
            ClassName::new("kotlin", "String").to_type(),
            TypeName::Wildcard {
                variance: Variance::Out,
                bound: Box::new(ClassName::new("kotlin", "Number").to_type()),
            },
        ]);
        let names: Vec<_> = map
            .referenced_classes()
            .into_iter()
            .map(ClassName::simple_name)
            .collect();
        assert_eq!(names, ["Map", "String", "Number"]);
    }
}
