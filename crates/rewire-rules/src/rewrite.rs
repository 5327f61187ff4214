//! Import splitting and rewriting
//!
//! The orchestrator: matches each declaration against the rule set, splits
//! its bindings into full and member imports, and assembles the ordered
//! replacement plan. All state that spans declarations lives in the
//! `RewriteSession`, which the host passes explicitly; independent
//! compilation runs never share guard state.

use std::collections::HashSet;
use std::path::Path;

use rewire_core::{Binding, DeclId, Edit, ImportDecl, Span};

use crate::config::RuleSet;
use crate::convert::convert;
use crate::error::RewriteError;
use crate::loader::CodeLoader;
use crate::matcher::match_rule;
use crate::transform::build_path;

/// Per-compilation-run rewrite state
///
/// Allocates declaration ids and remembers which declarations this run
/// emitted, so that a host revisiting newly inserted nodes does not rewrite
/// them again.
#[derive(Debug, Default)]
pub struct RewriteSession {
    emitted: HashSet<DeclId>,
    next_id: u64,
}

impl RewriteSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh declaration id (for host-parsed and synthetic
    /// declarations alike)
    pub fn next_id(&mut self) -> DeclId {
        let id = DeclId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Whether this session produced the given declaration as a replacement
    pub fn was_emitted(&self, id: DeclId) -> bool {
        self.emitted.contains(&id)
    }

    fn mark_emitted(&mut self, id: DeclId) {
        self.emitted.insert(id);
    }
}

/// The ordered replacement declarations for one rewritten import
///
/// Empty means the original declaration is left untouched; non-empty fully
/// replaces it.
#[derive(Debug, Default)]
pub struct ReplacementPlan {
    decls: Vec<ImportDecl>,
}

impl ReplacementPlan {
    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    pub fn decls(&self) -> &[ImportDecl] {
        &self.decls
    }

    /// Render the plan as source text, one declaration per line
    pub fn to_source(&self) -> String {
        let rendered: Vec<String> = self.decls.iter().map(ImportDecl::to_source).collect();
        rendered.join("\n")
    }

    /// Package the plan as an edit over the original declaration's span;
    /// `None` when the plan is empty (no-op)
    pub fn to_edit(&self, span: Span, message: impl Into<String>) -> Option<Edit> {
        if self.is_empty() {
            return None;
        }
        Some(Edit::new(span, self.to_source(), message))
    }
}

/// Rewrite one import declaration into its replacement plan
///
/// Plan order: the full-import replacement first (when the declaration has
/// default/namespace bindings), then one declaration per member binding in
/// original order, each followed by its style-only declarations.
pub fn rewrite(
    decl: &ImportDecl,
    rules: &RuleSet,
    current_file: &Path,
    session: &mut RewriteSession,
    loader: &dyn CodeLoader,
) -> Result<ReplacementPlan, RewriteError> {
    // Declarations this session emitted are already in final form
    if session.was_emitted(decl.id) {
        return Ok(ReplacementPlan::default());
    }

    let Some(matched) = match_rule(&decl.source, current_file, rules) else {
        return Ok(ReplacementPlan::default());
    };

    let transform = matched
        .rule
        .transform
        .as_ref()
        .ok_or_else(|| RewriteError::MissingTransform {
            module: decl.source.clone(),
        })?;

    let full: Vec<Binding> = decl
        .bindings
        .iter()
        .filter(|binding| binding.is_full())
        .cloned()
        .collect();
    let members: Vec<(&str, &str)> = decl
        .bindings
        .iter()
        .filter_map(|binding| match binding {
            Binding::Named { imported, local } => Some((imported.as_str(), local.as_str())),
            _ => None,
        })
        .collect();

    let mut plan = Vec::new();

    if !full.is_empty() {
        if matched.rule.prevent_full_import {
            return Err(RewriteError::FullImportForbidden {
                module: decl.source.clone(),
            });
        }

        // Emitted even without member bindings, so path rewrites like
        // `module` -> `module/index` stay consistent
        let path = build_path(transform, None, &matched.captures, current_file, loader)?;
        plan.push(ImportDecl::new(session.next_id(), path, full));
    }

    for (imported, local) in members {
        let import_name = convert(imported, &matched.rule.member_converter, loader)?;
        let path = build_path(
            transform,
            Some(&import_name),
            &matched.captures,
            current_file,
            loader,
        )?;

        let binding = if matched.rule.skip_default_conversion {
            Binding::named_as(imported, local)
        } else {
            Binding::Default {
                local: local.to_string(),
            }
        };
        plan.push(ImportDecl::new(session.next_id(), path, vec![binding]));

        for spec in matched.rule.style_specs() {
            let style_path = build_path(
                spec,
                Some(&import_name),
                &matched.captures,
                current_file,
                loader,
            )?;
            // A spec yielding nothing usable is skipped, not an error
            if style_path.is_empty() {
                continue;
            }
            plan.push(ImportDecl::side_effect(session.next_id(), style_path));
        }
    }

    for emitted in &plan {
        session.mark_emitted(emitted.id);
    }

    Ok(ReplacementPlan { decls: plan })
}

/// Rewrite a module's import declarations into ready-to-apply edits
///
/// Declarations whose plan is empty contribute no edit and stay untouched.
pub fn rewrite_module(
    decls: &[(ImportDecl, Span)],
    rules: &RuleSet,
    current_file: &Path,
    session: &mut RewriteSession,
    loader: &dyn CodeLoader,
) -> Result<Vec<Edit>, RewriteError> {
    let mut edits = Vec::new();

    for (decl, span) in decls {
        let plan = rewrite(decl, rules, current_file, session, loader)?;
        let message = format!("Rewrite import of {}", decl.source);
        if let Some(edit) = plan.to_edit(*span, message) {
            edits.push(edit);
        }
    }

    Ok(edits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MemberConverter, Rule, RuleSet, TransformSpec};
    use crate::loader::FnRegistry;

    fn rules_with(pattern: &str, rule: Rule) -> RuleSet {
        let mut rules = RuleSet::new();
        rules.insert(pattern, rule);
        rules
    }

    fn file() -> &'static Path {
        Path::new("/project/src/app.js")
    }

    fn run(
        rules: &RuleSet,
        source: &str,
        bindings: Vec<Binding>,
    ) -> Result<ReplacementPlan, RewriteError> {
        let mut session = RewriteSession::new();
        let decl = ImportDecl::new(session.next_id(), source, bindings);
        rewrite(&decl, rules, file(), &mut session, &FnRegistry::new())
    }

    fn sources(plan: &ReplacementPlan) -> Vec<String> {
        plan.decls().iter().map(|d| d.source.clone()).collect()
    }

    #[test]
    fn test_no_match_yields_empty_plan() {
        let rules = rules_with("mod-a", Rule::template("mod-a/lib/${member}"));
        let plan = run(&rules, "lodash", vec![Binding::named("map")]).unwrap();
        assert!(plan.is_empty());
    }

    #[test]
    fn test_member_import_becomes_default_binding() {
        let rules = rules_with("mod-a", Rule::template("mod-a/lib/${member}"));
        let plan = run(&rules, "mod-a", vec![Binding::named("X")]).unwrap();

        assert_eq!(plan.decls().len(), 1);
        assert_eq!(plan.decls()[0].to_source(), "import X from 'mod-a/lib/X';");
    }

    #[test]
    fn test_member_alias_becomes_local_default() {
        let rules = rules_with("mod-a", Rule::template("mod-a/lib/${member}"));
        let plan = run(&rules, "mod-a", vec![Binding::named_as("Row", "row")]).unwrap();

        assert_eq!(plan.decls()[0].to_source(), "import row from 'mod-a/lib/Row';");
    }

    #[test]
    fn test_member_splitting_preserves_order() {
        let rules = rules_with("mod-a", Rule::template("mod-a/lib/${member}"));
        let plan = run(
            &rules,
            "mod-a",
            vec![Binding::named("A"), Binding::named("B"), Binding::named("C")],
        )
        .unwrap();

        assert_eq!(
            sources(&plan),
            vec!["mod-a/lib/A", "mod-a/lib/B", "mod-a/lib/C"]
        );
    }

    #[test]
    fn test_full_only_import_still_rewritten() {
        let rules = rules_with("mod-a", Rule::template("mod-a/index"));
        let plan = run(
            &rules,
            "mod-a",
            vec![Binding::Default { local: "D".into() }],
        )
        .unwrap();

        assert_eq!(plan.decls().len(), 1);
        assert_eq!(plan.decls()[0].to_source(), "import D from 'mod-a/index';");
    }

    #[test]
    fn test_mixed_import_full_replacement_first() {
        let rules = rules_with("mod-a", Rule::template("mod-a/lib/${member}"));
        let plan = run(
            &rules,
            "mod-a",
            vec![
                Binding::Default { local: "D".into() },
                Binding::named("A"),
                Binding::named_as("B", "bAlias"),
            ],
        )
        .unwrap();

        assert_eq!(plan.decls().len(), 3);
        // Full import first, member path has an empty ${member}
        assert_eq!(plan.decls()[0].to_source(), "import D from 'mod-a/lib/';");
        assert_eq!(plan.decls()[1].to_source(), "import A from 'mod-a/lib/A';");
        assert_eq!(
            plan.decls()[2].to_source(),
            "import bAlias from 'mod-a/lib/B';"
        );
    }

    #[test]
    fn test_namespace_kept_in_full_replacement() {
        let rules = rules_with("mod-a", Rule::template("mod-a/index"));
        let plan = run(
            &rules,
            "mod-a",
            vec![Binding::Namespace { local: "ns".into() }],
        )
        .unwrap();

        assert_eq!(
            plan.decls()[0].to_source(),
            "import * as ns from 'mod-a/index';"
        );
    }

    #[test]
    fn test_prevent_full_import_on_default() {
        let rules = rules_with(
            "mod-a",
            Rule::template("mod-a/lib/${member}").with_prevent_full_import(true),
        );
        let err = run(
            &rules,
            "mod-a",
            vec![Binding::Default { local: "D".into() }],
        )
        .unwrap_err();

        assert!(
            matches!(err, RewriteError::FullImportForbidden { ref module } if module == "mod-a")
        );
    }

    #[test]
    fn test_prevent_full_import_on_namespace() {
        let rules = rules_with(
            "mod-a",
            Rule::template("mod-a/lib/${member}").with_prevent_full_import(true),
        );
        let err = run(
            &rules,
            "mod-a",
            vec![Binding::Namespace { local: "ns".into() }],
        )
        .unwrap_err();

        assert!(matches!(err, RewriteError::FullImportForbidden { .. }));
    }

    #[test]
    fn test_prevent_full_import_allows_members() {
        let rules = rules_with(
            "mod-a",
            Rule::template("mod-a/lib/${member}").with_prevent_full_import(true),
        );
        let plan = run(&rules, "mod-a", vec![Binding::named("X")]).unwrap();
        assert_eq!(plan.decls().len(), 1);
    }

    #[test]
    fn test_missing_transform_fatal() {
        let rules = rules_with("mod-a", Rule::default());
        let err = run(&rules, "mod-a", vec![Binding::named("X")]).unwrap_err();
        assert!(matches!(err, RewriteError::MissingTransform { ref module } if module == "mod-a"));
    }

    #[test]
    fn test_skip_default_conversion_keeps_named_form() {
        let rules = rules_with(
            "mod-a",
            Rule::template("mod-a/lib/${member}").with_skip_default_conversion(true),
        );
        let plan = run(&rules, "mod-a", vec![Binding::named_as("Row", "row")]).unwrap();

        assert_eq!(
            plan.decls()[0].to_source(),
            "import { Row as row } from 'mod-a/lib/Row';"
        );
    }

    #[test]
    fn test_member_converter_feeds_template() {
        let rules = rules_with(
            "mod-a",
            Rule::template("mod-a/lib/${member}").with_member_converter(MemberConverter::Kebab),
        );
        let plan = run(&rules, "mod-a", vec![Binding::named("FooBar")]).unwrap();

        // Converted name in the path, local binding unchanged
        assert_eq!(
            plan.decls()[0].to_source(),
            "import FooBar from 'mod-a/lib/foo-bar';"
        );
    }

    #[test]
    fn test_regex_captures_feed_template() {
        let rules = rules_with(r"pkg-(\w+)", Rule::template("pkg-${1}/${member}"));
        let plan = run(&rules, "pkg-two", vec![Binding::named("Y")]).unwrap();

        assert_eq!(plan.decls()[0].to_source(), "import Y from 'pkg-two/Y';");
    }

    #[test]
    fn test_style_import_follows_member() {
        let rules = rules_with(
            "mod-a",
            Rule::template("mod-a/lib/${member}")
                .with_style(TransformSpec::Template("mod-a/${member}/style".into())),
        );
        let plan = run(&rules, "mod-a", vec![Binding::named("X")]).unwrap();

        assert_eq!(plan.decls().len(), 2);
        assert_eq!(plan.decls()[0].to_source(), "import X from 'mod-a/lib/X';");
        assert_eq!(plan.decls()[1].to_source(), "import 'mod-a/X/style';");
    }

    #[test]
    fn test_style_list_fan_out_in_order() {
        let rules = rules_with(
            "mod-a",
            Rule::template("mod-a/lib/${member}")
                .with_style(TransformSpec::Template("mod-a/${member}/a.css".into()))
                .with_style(TransformSpec::Template("mod-a/${member}/b.css".into())),
        );
        let plan = run(
            &rules,
            "mod-a",
            vec![Binding::named("X"), Binding::named("Y")],
        )
        .unwrap();

        assert_eq!(
            sources(&plan),
            vec![
                "mod-a/lib/X",
                "mod-a/X/a.css",
                "mod-a/X/b.css",
                "mod-a/lib/Y",
                "mod-a/Y/a.css",
                "mod-a/Y/b.css",
            ]
        );
    }

    #[test]
    fn test_empty_style_path_skipped() {
        let rules = rules_with(
            "mod-a",
            Rule::template("mod-a/lib/${member}")
                .with_style(TransformSpec::Template("${nope}".into())),
        );
        let plan = run(&rules, "mod-a", vec![Binding::named("X")]).unwrap();
        assert_eq!(plan.decls().len(), 1);
    }

    #[test]
    fn test_emitted_declarations_not_reprocessed() {
        let rules = rules_with("mod-a/lib/X", Rule::template("rewritten-again"));
        let mut session = RewriteSession::new();
        let loader = FnRegistry::new();

        // Simulate the host revisiting a declaration this session emitted
        let mut inner = rules_with("mod-a", Rule::template("mod-a/lib/${member}"));
        inner.insert("mod-a/lib/X", Rule::template("rewritten-again"));

        let decl = ImportDecl::new(session.next_id(), "mod-a", vec![Binding::named("X")]);
        let plan = rewrite(&decl, &inner, file(), &mut session, &loader).unwrap();
        assert_eq!(plan.decls().len(), 1);

        let emitted = plan.decls()[0].clone();
        let replan = rewrite(&emitted, &rules, file(), &mut session, &loader).unwrap();
        assert!(replan.is_empty());

        // A fresh session carries no guard state from the previous run
        let mut fresh = RewriteSession::new();
        let revisit = ImportDecl::new(
            fresh.next_id(),
            emitted.source.clone(),
            emitted.bindings.clone(),
        );
        let fresh_plan = rewrite(&revisit, &rules, file(), &mut fresh, &loader).unwrap();
        assert!(!fresh_plan.is_empty());
    }

    #[test]
    fn test_unmatched_declaration_not_recorded() {
        let rules = rules_with("mod-a", Rule::template("mod-a/lib/${member}"));
        let mut session = RewriteSession::new();
        let decl = ImportDecl::new(session.next_id(), "lodash", vec![Binding::named("map")]);

        rewrite(&decl, &rules, file(), &mut session, &FnRegistry::new()).unwrap();
        assert!(!session.was_emitted(decl.id));
    }
}
