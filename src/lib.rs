#![warn(clippy::pedantic, missing_docs, rust_2018_idioms)]
#![allow(
    clippy::missing_errors_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::return_self_not_must_use
)]

//! A compiler for the COWEL markup language.
//!
//! A COWEL document is a mix of literal text, escape sequences, comments, and
//! nested *directive* invocations (`\name(args){content}`). The compiler
//! parses the source into an AST, resolves directive names against a stack of
//! name resolvers, and evaluates each directive under a *content policy* that
//! controls how text and child content flow into the output. Output is
//! collected into named *sections*; after evaluation, a resolution pass
//! splices section references together into the final HTML document.
//!
//! The crate is organised leaf-first:
//!
//! * [`status`] — the five-valued processing status and its composition
//!   algebra, which every evaluation step returns.
//! * [`ast`] — the immutable syntax tree over non-owning source spans.
//! * [`parse`] — the infallible recursive-descent parser.
//! * [`context`] — per-run mutable state (sections, variables, macros, macro
//!   frames, the resolver stack, services).
//! * [`policy`] — content policies: sinks that decide how text and AST nodes
//!   are consumed (HTML escaping, plaintext extraction, paragraph splitting,
//!   syntax highlighting, …).
//! * [`directives`] — the built-in directive behaviors.
//! * [`document`] — the top-level driver tying it all together.

pub mod args;
pub mod ast;
pub mod chars;
pub mod codemap;
pub mod context;
pub mod diagnostics;
pub mod directives;
pub mod document;
pub mod highlight;
pub mod html;
pub mod parse;
pub mod policy;
pub mod processing;
pub mod sections;
pub mod services;
pub mod status;
pub mod typo;

pub use context::Context;
pub use document::{GenerationOptions, generate_document, generate_fragment};
pub use status::ProcessingStatus;
