//! Code loader port
//!
//! External transform, style, and converter references name code the engine
//! cannot load itself: the host injects a `CodeLoader` implementation, keeping
//! the engine free of ambient dynamic loading and testable with fakes. The
//! bundled `FnRegistry` is an in-memory map of registered callables and doubles
//! as the per-run cache: each reference resolves to the same `Arc` every time.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::error::RewriteError;
use crate::matcher::CaptureSet;

/// A loaded transform or style function: `(member, captures, current file)`
/// to replacement module path. `member` is `None` when building a full-import
/// replacement.
pub type TransformFn = dyn Fn(Option<&str>, &CaptureSet, &Path) -> String + Send + Sync;

/// A loaded member-name converter. `Err` carries the failure reason and
/// surfaces as `RewriteError::ConverterFailure`.
pub type ConvertFn = dyn Fn(&str) -> Result<String, String> + Send + Sync;

/// Resolves external function references to callables
pub trait CodeLoader {
    fn load_transform(&self, reference: &str) -> Result<Arc<TransformFn>, RewriteError>;

    fn load_converter(&self, reference: &str) -> Result<Arc<ConvertFn>, RewriteError>;
}

/// In-memory `CodeLoader` backed by registered callables
#[derive(Default)]
pub struct FnRegistry {
    transforms: HashMap<String, Arc<TransformFn>>,
    converters: HashMap<String, Arc<ConvertFn>>,
}

impl FnRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_transform(
        &mut self,
        reference: impl Into<String>,
        f: impl Fn(Option<&str>, &CaptureSet, &Path) -> String + Send + Sync + 'static,
    ) {
        self.transforms.insert(reference.into(), Arc::new(f));
    }

    pub fn register_converter(
        &mut self,
        reference: impl Into<String>,
        f: impl Fn(&str) -> Result<String, String> + Send + Sync + 'static,
    ) {
        self.converters.insert(reference.into(), Arc::new(f));
    }
}

impl CodeLoader for FnRegistry {
    fn load_transform(&self, reference: &str) -> Result<Arc<TransformFn>, RewriteError> {
        self.transforms
            .get(reference)
            .cloned()
            .ok_or_else(|| RewriteError::TransformLoadFailure {
                reference: reference.to_string(),
            })
    }

    fn load_converter(&self, reference: &str) -> Result<Arc<ConvertFn>, RewriteError> {
        self.converters
            .get(reference)
            .cloned()
            .ok_or_else(|| RewriteError::TransformLoadFailure {
                reference: reference.to_string(),
            })
    }
}
