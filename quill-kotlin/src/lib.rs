//! Kotlin source generation on top of the Quill emission engine.
//!
//! Build declarations with the spec builders, wrap them in a [`FileSpec`]
//! and render. Imports are derived from the types and members the file
//! references, with Kotlin's default imports left implicit.
//!
//! # Module Organization
//!
//! - [`KOTLIN`] - reserved words, identifier escaping and string quoting
//! - [`KModifier`] - declaration modifiers in coding-convention order
//! - [`FileSpec`], [`TypeSpec`], [`FunSpec`], [`PropertySpec`],
//!   [`ParameterSpec`], [`AnnotationSpec`], [`TypeAliasSpec`] - declaration
//!   nodes
//! - [`types`] - common `kotlin.*` class names

mod modifier;
mod policy;
mod spec;
pub mod types;

pub use modifier::KModifier;
pub use policy::{DEFAULT_IMPORTS, KEYWORDS, KOTLIN, escape_identifier, quote_string};
pub use spec::{
    AnnotationSpec, FileSpec, FunSpec, ParameterSpec, PropertySpec, TypeAliasSpec, TypeKind,
    TypeSpec, UseSiteTarget,
};

use quill_codegen::{Arg, CodeBlock, CodeWriter};
use quill_core::Result;

/// Render a single declaration on its own, outside of any file.
///
/// Nothing is imported, so every type is written with its qualified name.
pub fn render_declaration(declaration: impl Into<Arg>) -> Result<String> {
    let code = CodeBlock::of("%L", &[declaration.into()])?;
    CodeWriter::render_fragment(&code, &KOTLIN)
}
