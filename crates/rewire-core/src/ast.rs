//! Import declaration model
//!
//! The host compiler parses ES modules; this crate only models the piece the
//! rewriter cares about: one import declaration, its source string, and its
//! ordered bindings. Bindings are a tagged variant so the orchestrator can
//! match exhaustively over the three kinds instead of inspecting node types.

use std::fmt;

/// Opaque identity of an import declaration within a rewrite session.
///
/// The host obtains ids from `RewriteSession::next_id` when building parsed
/// declarations; the rewriter allocates ids for the declarations it emits.
/// Identity, not equality: two structurally equal declarations with different
/// ids are different declarations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeclId(pub u64);

/// A single binding introduced by an import declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    /// `import local from 'module'` - binds the module's default export
    Default { local: String },
    /// `import * as local from 'module'` - binds the whole module namespace
    Namespace { local: String },
    /// `import { imported as local } from 'module'`
    Named { imported: String, local: String },
}

impl Binding {
    /// A named binding whose local alias equals the imported name
    pub fn named(imported: impl Into<String>) -> Self {
        let imported = imported.into();
        let local = imported.clone();
        Binding::Named { imported, local }
    }

    /// A named binding with an explicit local alias
    pub fn named_as(imported: impl Into<String>, local: impl Into<String>) -> Self {
        Binding::Named {
            imported: imported.into(),
            local: local.into(),
        }
    }

    /// Whether this binding imports the module wholesale (default or namespace)
    pub fn is_full(&self) -> bool {
        !matches!(self, Binding::Named { .. })
    }

    /// The name this binding introduces into the importing module
    pub fn local(&self) -> &str {
        match self {
            Binding::Default { local } => local,
            Binding::Namespace { local } => local,
            Binding::Named { local, .. } => local,
        }
    }
}

/// One import declaration: a module source plus its ordered bindings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDecl {
    pub id: DeclId,
    /// The module specifier, e.g. `react-bootstrap`
    pub source: String,
    /// Bindings in source order; empty for side-effect-only imports
    pub bindings: Vec<Binding>,
}

impl ImportDecl {
    pub fn new(id: DeclId, source: impl Into<String>, bindings: Vec<Binding>) -> Self {
        Self {
            id,
            source: source.into(),
            bindings,
        }
    }

    /// A bindingless import, included purely for its side effects
    pub fn side_effect(id: DeclId, source: impl Into<String>) -> Self {
        Self::new(id, source, Vec::new())
    }

    /// Render this declaration back to ES module syntax
    pub fn to_source(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ImportDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.bindings.is_empty() {
            return write!(f, "import '{}';", self.source);
        }

        let mut clauses: Vec<String> = Vec::new();
        let mut named: Vec<String> = Vec::new();

        for binding in &self.bindings {
            match binding {
                Binding::Default { local } => clauses.push(local.clone()),
                Binding::Namespace { local } => clauses.push(format!("* as {}", local)),
                Binding::Named { imported, local } => {
                    if imported == local {
                        named.push(imported.clone());
                    } else {
                        named.push(format!("{} as {}", imported, local));
                    }
                }
            }
        }

        if !named.is_empty() {
            clauses.push(format!("{{ {} }}", named.join(", ")));
        }

        write!(f, "import {} from '{}';", clauses.join(", "), self.source)
    }
}
