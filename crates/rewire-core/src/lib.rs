//! rewire-core: Core abstractions for import rewriting
//!
//! This crate provides:
//! - `ImportDecl` / `Binding`: the host-facing import declaration model
//! - `DeclId`: opaque declaration identity used by the rewrite dedup guard
//! - `Edit`: A span-based code modification
//! - `apply_edits()`: Function to apply edits preserving formatting

mod ast;
mod edit;

pub use ast::{Binding, DeclId, ImportDecl};
pub use edit::{apply_edits, Edit, EditError, Span};
