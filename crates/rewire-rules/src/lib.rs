//! rewire-rules: Configurable import rewriting
//!
//! Rewrites matching import declarations into per-member imports with
//! templated or functional replacement paths. Components:
//! - `config`: rule schema, deserialized from the host's plugin options
//! - `matcher`: exact / regex / relative-path rule matching
//! - `convert`: member-name case conversion
//! - `transform`: replacement path synthesis from templates or functions
//! - `loader`: the code-loader port for external function references
//! - `rewrite`: the orchestrator producing replacement plans and edits

pub mod config;
pub mod convert;
pub mod error;
pub mod loader;
pub mod matcher;
pub mod rewrite;
pub mod transform;

pub use config::{MemberConverter, Rule, RuleSet, TransformSpec, TransformStyle};
pub use error::RewriteError;
pub use loader::{CodeLoader, ConvertFn, FnRegistry, TransformFn};
pub use matcher::{match_rule, CaptureSet, MatchStrategy, RuleMatch};
pub use rewrite::{rewrite, rewrite_module, ReplacementPlan, RewriteSession};
pub use transform::build_path;
