//! Kotlin modifiers in coding-convention order.

use std::collections::BTreeSet;

use quill_codegen::CodeWriter;
use quill_core::Result;

/// A declaration modifier.
///
/// Variants are declared in the order the Kotlin coding conventions list
/// them, so a `BTreeSet<KModifier>` iterates in emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KModifier {
    Public,
    Protected,
    Private,
    Internal,
    Expect,
    Actual,
    Final,
    Open,
    Abstract,
    Sealed,
    Const,
    External,
    Override,
    Lateinit,
    Tailrec,
    Vararg,
    Suspend,
    Inner,
    Enum,
    Annotation,
    Value,
    Fun,
    Companion,
    Inline,
    Noinline,
    Crossinline,
    Reified,
    Infix,
    Operator,
    Data,
    In,
    Out,
}

impl KModifier {
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Protected => "protected",
            Self::Private => "private",
            Self::Internal => "internal",
            Self::Expect => "expect",
            Self::Actual => "actual",
            Self::Final => "final",
            Self::Open => "open",
            Self::Abstract => "abstract",
            Self::Sealed => "sealed",
            Self::Const => "const",
            Self::External => "external",
            Self::Override => "override",
            Self::Lateinit => "lateinit",
            Self::Tailrec => "tailrec",
            Self::Vararg => "vararg",
            Self::Suspend => "suspend",
            Self::Inner => "inner",
            Self::Enum => "enum",
            Self::Annotation => "annotation",
            Self::Value => "value",
            Self::Fun => "fun",
            Self::Companion => "companion",
            Self::Inline => "inline",
            Self::Noinline => "noinline",
            Self::Crossinline => "crossinline",
            Self::Reified => "reified",
            Self::Infix => "infix",
            Self::Operator => "operator",
            Self::Data => "data",
            Self::In => "in",
            Self::Out => "out",
        }
    }

    pub fn is_visibility(&self) -> bool {
        matches!(
            self,
            Self::Public | Self::Protected | Self::Private | Self::Internal
        )
    }
}

impl std::fmt::Display for KModifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Build a modifier set from a slice.
pub(crate) fn modifier_set(modifiers: &[KModifier]) -> BTreeSet<KModifier> {
    modifiers.iter().copied().collect()
}

/// Emit `modifiers`, each followed by a space, skipping those in `implicit`.
///
/// `public` is always spelled out when it is the effective visibility, unless
/// the declaration overrides something or names another visibility.
pub(crate) fn emit_modifiers(
    writer: &mut CodeWriter,
    modifiers: &BTreeSet<KModifier>,
    implicit: &BTreeSet<KModifier>,
) -> Result<()> {
    let has_other_visibility = modifiers
        .iter()
        .any(|m| m.is_visibility() && *m != KModifier::Public);
    let implicitly_public = implicit.contains(&KModifier::Public)
        && !modifiers.contains(&KModifier::Override)
        && !has_other_visibility;
    if modifiers.contains(&KModifier::Public) || implicitly_public {
        writer.emit("public ")?;
    }

    for modifier in modifiers {
        if *modifier == KModifier::Public || implicit.contains(modifier) {
            continue;
        }
        writer.emit(modifier.keyword())?;
        writer.emit(" ")?;
    }
    Ok(())
}
