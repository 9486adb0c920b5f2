//! Kotlin declaration nodes.
//!
//! Each node is an immutable value assembled with consuming builder methods
//! and emitted through a [`CodeWriter`]. Specs convert into [`Arg`] so they
//! can be spliced into templates with `%L` (and named with `%N`).

mod annotation;
mod file;
mod function;
mod parameter;
mod property;
mod type_alias;
mod type_spec;

pub use annotation::{AnnotationSpec, UseSiteTarget};
pub use file::FileSpec;
pub use function::FunSpec;
pub use parameter::ParameterSpec;
pub use property::PropertySpec;
pub use type_alias::TypeAliasSpec;
pub use type_spec::{TypeKind, TypeSpec};

use quill_codegen::{Arg, CodeBlock, CodeWriter};
use quill_core::{Result, TypeVariable};

use crate::types::nullable_any;

pub(crate) fn emit_kdoc(writer: &mut CodeWriter, kdoc: &CodeBlock) -> Result<()> {
    writer.emit_kdoc(&kdoc.ensure_ends_with_newline())
}

/// Emit annotations, either on one line separated by spaces or one per line.
pub(crate) fn emit_annotations(
    writer: &mut CodeWriter,
    annotations: &[AnnotationSpec],
    inline: bool,
) -> Result<()> {
    for annotation in annotations {
        annotation.emit_with(writer, inline, false)?;
        writer.emit(if inline { " " } else { "\n" })?;
    }
    Ok(())
}

/// Emit `<T, out E : Bound>`. Variables with more than one bound are
/// constrained in the `where` clause instead.
pub(crate) fn emit_type_variables(
    writer: &mut CodeWriter,
    variables: &[TypeVariable],
) -> Result<()> {
    if variables.is_empty() {
        return Ok(());
    }

    writer.emit("<")?;
    for (i, variable) in variables.iter().enumerate() {
        if i > 0 {
            writer.emit(", ")?;
        }
        if let Some(variance) = variable.variance {
            writer.emit(variance.keyword())?;
            writer.emit(" ")?;
        }
        if variable.reified {
            writer.emit("reified ")?;
        }
        writer.emit_format("%N", &[Arg::from(variable.name.as_str())])?;
        if let [bound] = variable.bounds.as_slice() {
            if *bound != nullable_any() {
                writer.emit_format(" : %T", &[Arg::from(bound)])?;
            }
        }
    }
    writer.emit(">")
}

pub(crate) fn emit_where_block(writer: &mut CodeWriter, variables: &[TypeVariable]) -> Result<()> {
    let mut first = true;
    for variable in variables.iter().filter(|v| v.bounds.len() > 1) {
        for bound in &variable.bounds {
            writer.emit(if first { " where " } else { ", " })?;
            writer.emit_format(
                "%N : %T",
                &[Arg::from(variable.name.as_str()), Arg::from(bound)],
            )?;
            first = false;
        }
    }
    Ok(())
}

/// Emit a parenthesized parameter list.
///
/// More than two parameters, or `force_newlines`, puts each parameter on its
/// own line with a trailing comma.
pub(crate) fn emit_parameters<F>(
    writer: &mut CodeWriter,
    parameters: &[ParameterSpec],
    force_newlines: bool,
    mut emit_parameter: F,
) -> Result<()>
where
    F: FnMut(&mut CodeWriter, &ParameterSpec) -> Result<()>,
{
    writer.emit("(")?;
    if !parameters.is_empty() {
        let newlines = force_newlines || parameters.len() > 2;
        if newlines {
            writer.emit("\n")?;
            writer.indent(1);
        }
        for (i, parameter) in parameters.iter().enumerate() {
            if i > 0 {
                writer.emit(if newlines { "\n" } else { ", " })?;
            }
            emit_parameter(writer, parameter)?;
            if newlines {
                writer.emit(",")?;
            }
        }
        if newlines {
            writer.unindent(1)?;
            writer.emit("\n")?;
        }
    }
    writer.emit(")")
}
