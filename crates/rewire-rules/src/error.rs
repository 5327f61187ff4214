//! Rewrite error taxonomy
//!
//! Every variant is fatal for the declaration being rewritten; nothing here
//! is retried. A declaration whose source matches no rule is not an error.

use thiserror::Error;

/// Errors raised while rewriting an import declaration
#[derive(Debug, Error)]
pub enum RewriteError {
    /// A matched rule has no transform configured
    #[error("transform is required for imports from module {module}")]
    MissingTransform { module: String },

    /// A default or namespace binding was found for a module whose rule
    /// forbids importing it wholesale
    #[error("import of entire module {module} not allowed due to prevent_full_import setting")]
    FullImportForbidden { module: String },

    /// An external transform, style, or converter reference could not be
    /// resolved to a callable
    #[error("could not load function reference {reference}")]
    TransformLoadFailure { reference: String },

    /// A custom member-name converter failed
    #[error("member converter failed for {name}: {reason}")]
    ConverterFailure { name: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_offender() {
        let err = RewriteError::MissingTransform {
            module: "mod-a".into(),
        };
        assert_eq!(
            err.to_string(),
            "transform is required for imports from module mod-a"
        );

        let err = RewriteError::FullImportForbidden {
            module: "mod-a".into(),
        };
        assert_eq!(
            err.to_string(),
            "import of entire module mod-a not allowed due to prevent_full_import setting"
        );

        let err = RewriteError::TransformLoadFailure {
            reference: "./t.js".into(),
        };
        assert_eq!(err.to_string(), "could not load function reference ./t.js");
    }
}
