//! A single `.kt` source file.

use std::collections::BTreeSet;
use std::path::PathBuf;

use quill_codegen::{Arg, CodeBlock, CodeWriter, ImportRequest, SourceFile, render_source};
use quill_core::{Error, Indent, Reference, RenderConfig, Result};

use super::{
    AnnotationSpec, FunSpec, PropertySpec, TypeAliasSpec, TypeSpec, UseSiteTarget,
    emit_annotations,
};
use crate::modifier::modifier_set;
use crate::{KModifier, KOTLIN};

#[derive(Debug, Clone)]
enum Member {
    Type(TypeSpec),
    Function(FunSpec),
    Property(PropertySpec),
    TypeAlias(TypeAliasSpec),
}

/// A Kotlin file: package clause, imports and top-level members.
///
/// Imports are not declared by hand. Every type and member the file
/// mentions is collected and imported under its simple name unless that
/// name is already taken.
///
/// # Example
///
/// ```
/// use quill_core::ClassName;
/// use quill_kotlin::{FileSpec, FunSpec};
///
/// let system = ClassName::new("java.lang", "System");
/// let main = FunSpec::new("main")
///     .add_statement("%T.out.println(%S)", &[system.into(), "Hello!".into()])?;
/// let file = FileSpec::new("com.example", "Hello").function(main);
///
/// assert_eq!(
///     file.render()?,
///     "package com.example\n\npublic fun main() {\n  System.out.println(\"Hello!\")\n}\n"
/// );
/// # Ok::<(), Box<quill_core::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct FileSpec {
    package: String,
    name: String,
    comment: CodeBlock,
    annotations: Vec<AnnotationSpec>,
    imports: Vec<ImportRequest>,
    members: Vec<Member>,
    indent: Option<Indent>,
}

impl FileSpec {
    pub fn new(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
            comment: CodeBlock::default(),
            annotations: Vec::new(),
            imports: Vec::new(),
            members: Vec::new(),
            indent: None,
        }
    }

    /// A file named after, and holding only, `spec`.
    pub fn for_type(package: impl Into<String>, spec: TypeSpec) -> Result<Self> {
        let Some(name) = spec.name().map(str::to_string) else {
            return Err(Error::invalid_declaration(
                "a file cannot be named after an anonymous type",
            ));
        };
        Ok(Self::new(package, name).type_spec(spec))
    }

    /// A `//` comment at the top of the file.
    pub fn comment(mut self, comment: CodeBlock) -> Self {
        self.comment = comment;
        self
    }

    pub fn add_comment(self, template: &str, args: &[Arg]) -> Result<Self> {
        let comment = CodeBlock::of(template, args)?;
        Ok(self.comment(comment))
    }

    /// A file annotation. The use-site target is always `file`.
    pub fn annotation(mut self, annotation: AnnotationSpec) -> Self {
        self.annotations.push(annotation.use_site_target(UseSiteTarget::File));
        self
    }

    /// Import `reference` ahead of anything collected from the file.
    pub fn import(mut self, reference: impl Into<Reference>) -> Self {
        self.imports.push(ImportRequest::new(reference));
        self
    }

    /// Import `reference` as `alias`. Every use of it renders as the alias.
    pub fn aliased_import(
        mut self,
        reference: impl Into<Reference>,
        alias: impl Into<String>,
    ) -> Self {
        self.imports.push(ImportRequest::new(reference).aliased(alias));
        self
    }

    pub fn type_spec(mut self, spec: TypeSpec) -> Self {
        self.members.push(Member::Type(spec));
        self
    }

    pub fn function(mut self, function: FunSpec) -> Self {
        self.members.push(Member::Function(function));
        self
    }

    pub fn property(mut self, property: PropertySpec) -> Self {
        self.members.push(Member::Property(property));
        self
    }

    pub fn type_alias(mut self, alias: TypeAliasSpec) -> Self {
        self.members.push(Member::TypeAlias(alias));
        self
    }

    /// Override the indentation of the render configuration for this file.
    pub fn indent(mut self, indent: Indent) -> Self {
        self.indent = Some(indent);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Where the file goes in a source tree, e.g. `com/example/Taco.kt`.
    pub fn relative_path(&self) -> PathBuf {
        let mut path: PathBuf = self
            .package
            .split('.')
            .filter(|segment| !segment.is_empty())
            .collect();
        path.push(format!("{}.kt", self.name));
        path
    }

    pub fn render(&self) -> Result<String> {
        self.render_with(RenderConfig::default())
    }

    pub fn render_with(&self, config: RenderConfig) -> Result<String> {
        tracing::debug!(file = %self.name, members = self.members.len(), "rendering kotlin file");
        render_source(self, config, &KOTLIN)
    }

    fn emit_contents(&self, writer: &mut CodeWriter) -> Result<()> {
        if !self.package.is_empty() {
            let package = writer.policy().escape_segments(&self.package)?;
            writer.emit_non_wrapping(&format!("package {package}\n\n"))?;
        }

        let imports = writer.imports().render(writer.policy())?;
        for import in &imports {
            writer.emit_non_wrapping(&format!("import {import}\n"))?;
        }
        if !imports.is_empty() {
            writer.emit("\n")?;
        }

        let public = modifier_set(&[KModifier::Public]);
        for (i, member) in self.members.iter().enumerate() {
            if i > 0 {
                writer.emit("\n")?;
            }
            match member {
                Member::Type(spec) => spec.emit_with(writer, None, &BTreeSet::new())?,
                Member::Function(function) => function.emit_with(writer, &public, true)?,
                Member::Property(property) => property.emit_with(writer, &public, false)?,
                Member::TypeAlias(alias) => alias.emit_with(writer, &public)?,
            }
        }
        Ok(())
    }
}

impl SourceFile for FileSpec {
    fn package(&self) -> &str {
        &self.package
    }

    fn import_requests(&self) -> Vec<ImportRequest> {
        self.imports.clone()
    }

    fn render_config(&self, base: RenderConfig) -> RenderConfig {
        match self.indent {
            Some(indent) => base.with_indent(indent),
            None => base,
        }
    }

    fn emit(&self, writer: &mut CodeWriter) -> Result<()> {
        if !self.comment.is_empty() {
            writer.emit_comment(&self.comment.trim_trailing_newline())?;
        }
        if !self.annotations.is_empty() {
            emit_annotations(writer, &self.annotations, false)?;
            writer.emit("\n")?;
        }

        writer.push_package(&self.package)?;
        let result = self.emit_contents(writer);
        writer.pop_package();
        result
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use quill_codegen::code_block;
    use quill_core::ClassName;

    use super::*;
    use crate::types;

    #[test]
    fn test_relative_path() {
        let file = FileSpec::new("com.example.tacos", "Taco");
        assert_eq!(file.relative_path(), Path::new("com/example/tacos/Taco.kt"));
        assert_eq!(FileSpec::new("", "Main").relative_path(), Path::new("Main.kt"));
    }

    #[test]
    fn test_first_date_is_imported() {
        let util_date = ClassName::new("java.util", "Date");
        let sql_date = ClassName::new("java.sql", "Date");
        let file = FileSpec::new("com.example", "Dates")
            .property(
                PropertySpec::new("now", util_date.clone())
                    .initializer(code_block!("%T()", &util_date).unwrap()),
            )
            .property(
                PropertySpec::new("sqlNow", sql_date.clone())
                    .initializer(code_block!("%T(0)", &sql_date).unwrap()),
            );
        assert_eq!(
            file.render().unwrap(),
            "package com.example\n\nimport java.util.Date\n\n\
             public val now: Date = Date()\n\n\
             public val sqlNow: java.sql.Date = java.sql.Date(0)\n"
        );
    }

    #[test]
    fn test_comment_and_file_annotation() {
        let file = FileSpec::new("", "Main")
            .comment(code_block!("Generated. Do not edit.").unwrap())
            .annotation(
                AnnotationSpec::new(ClassName::new("kotlin.jvm", "JvmName"))
                    .add_member("%S", &[Arg::from("MainKt")])
                    .unwrap(),
            )
            .function(
                FunSpec::new("main")
                    .add_statement("println(%S)", &[Arg::from("hi")])
                    .unwrap(),
            );
        assert_eq!(
            file.render().unwrap(),
            "// Generated. Do not edit.\n@file:JvmName(\"MainKt\")\n\n\
             public fun main() {\n  println(\"hi\")\n}\n"
        );
    }

    #[test]
    fn test_indent_override() {
        let file = FileSpec::for_type(
            "com.example",
            TypeSpec::object("Config").property(
                PropertySpec::new("debug", types::boolean())
                    .initializer(code_block!("%L", false).unwrap()),
            ),
        )
        .unwrap()
        .indent(Indent::Tab);
        assert_eq!(
            file.render().unwrap(),
            "package com.example\n\npublic object Config {\n\tpublic val debug: Boolean = false\n}\n"
        );
    }

    #[test]
    fn test_keyword_package_segments_are_escaped() {
        let file = FileSpec::new("com.example.object", "Empty");
        assert_eq!(file.render().unwrap(), "package com.example.`object`\n\n");
    }

    #[test]
    fn test_anonymous_type_cannot_name_a_file() {
        let err = FileSpec::for_type("com.example", TypeSpec::anonymous_class()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid declaration: a file cannot be named after an anonymous type"
        );
    }
}
