//! The Quill emission engine.
//!
//! This crate turns code templates into formatted source text. It is
//! language-agnostic: lexical rules come in through
//! [`quill_core::LexicalPolicy`].
//!
//! # Module Organization
//!
//! - [`CodeBlock`] - template binding into an instruction stream
//! - [`ReferenceCollector`] - dry-run reference collection
//! - [`resolve_imports`] - display names and import directives per file
//! - [`CodeWriter`] - replays instructions with resolved names
//! - [`LineWrapper`] - column-bounded wrapping
//! - [`render_source`] - the two-pass pipeline for one file
//! - [`NameAllocator`] - collision-free local names

mod allocate;
mod code;
mod collect;
mod render;
mod resolve;
mod wrap;
mod writer;

pub use allocate::NameAllocator;
pub use code::{Arg, CodeBlock, CodeBlockBuilder, Instruction, PlaceholderKind};
pub use collect::{CollectedReferences, ReferenceCollector};
pub use render::{SourceFile, render_source};
pub use resolve::{Import, ImportKind, ImportRequest, ImportTable, resolve_imports};
pub use wrap::{LineWrapper, NON_BREAKING_SPACE, WRAP_POINT};
pub use writer::{CodeWriter, Declaration, TypeScope};
