//! Core vocabulary for the quill source emitter.
//!
//! This crate provides the names the resolver works on, the lexical policy
//! seam a target language plugs into, and rendering configuration.

// Fields are read by miette's derive macros via #[source_code] and #[label].
#![allow(unused_assignments)]

mod config;
mod error;
mod indent;
mod names;
mod policy;

pub use config::{DEFAULT_COLUMN_LIMIT, RenderConfig};
pub use error::{ConfigSource, Error, Result, TemplateContext};
pub use indent::Indent;
pub use names::{
    ClassName, LambdaType, MemberName, Reference, TypeName, TypeVariable, Variance,
};
pub use policy::{LexicalPolicy, PLAIN, QuoteOptions};
