//! Rule schema and deserialization
//!
//! Rules arrive as the host's plugin-options mapping: rule key (literal module
//! path or regex pattern) to rule object. Deserialization accepts both the
//! original camelCase option names and snake_case. Inline Rust closures for
//! transforms and converters cannot come from JSON; they attach through the
//! builder methods on `Rule`.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::loader::{ConvertFn, TransformFn};
use crate::matcher::CaptureSet;

/// How a replacement module path is produced
///
/// A plain string is a template; a string that looks like a script file
/// (`.js`, `.mjs`, `.cjs`) is a reference resolved through the code loader.
#[derive(Clone, Deserialize)]
#[serde(from = "String")]
pub enum TransformSpec {
    /// Template string with `${name}` placeholders
    Template(String),
    /// External function reference, resolved through the `CodeLoader` port
    Reference(String),
    /// Inline function supplied programmatically
    Function(Arc<TransformFn>),
}

impl TransformSpec {
    /// Inline transform function
    pub fn function(
        f: impl Fn(Option<&str>, &CaptureSet, &Path) -> String + Send + Sync + 'static,
    ) -> Self {
        TransformSpec::Function(Arc::new(f))
    }
}

fn is_script_reference(value: &str) -> bool {
    value.ends_with(".js") || value.ends_with(".mjs") || value.ends_with(".cjs")
}

impl From<String> for TransformSpec {
    fn from(value: String) -> Self {
        if is_script_reference(&value) {
            TransformSpec::Reference(value)
        } else {
            TransformSpec::Template(value)
        }
    }
}

impl fmt::Debug for TransformSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransformSpec::Template(t) => f.debug_tuple("Template").field(t).finish(),
            TransformSpec::Reference(r) => f.debug_tuple("Reference").field(r).finish(),
            TransformSpec::Function(_) => f.debug_tuple("Function").field(&"<fn>").finish(),
        }
    }
}

/// Casing applied to imported member names before templating
#[derive(Clone, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum MemberConverter {
    /// Identity - the raw imported name feeds the template
    #[default]
    None,
    Camel,
    Pascal,
    Kebab,
    Snake,
    /// External converter reference, resolved through the `CodeLoader` port
    Reference(String),
    /// Inline converter supplied programmatically
    Function(Arc<ConvertFn>),
}

impl MemberConverter {
    /// Inline converter function
    pub fn function(
        f: impl Fn(&str) -> Result<String, String> + Send + Sync + 'static,
    ) -> Self {
        MemberConverter::Function(Arc::new(f))
    }
}

impl TryFrom<String> for MemberConverter {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "" | "none" => return Ok(MemberConverter::None),
            "camel" => return Ok(MemberConverter::Camel),
            "pascal" => return Ok(MemberConverter::Pascal),
            "kebab" => return Ok(MemberConverter::Kebab),
            "snake" => return Ok(MemberConverter::Snake),
            _ => {}
        }

        if is_script_reference(&value) {
            Ok(MemberConverter::Reference(value))
        } else {
            Err(format!("unknown member converter: {}", value))
        }
    }
}

impl fmt::Debug for MemberConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberConverter::None => write!(f, "None"),
            MemberConverter::Camel => write!(f, "Camel"),
            MemberConverter::Pascal => write!(f, "Pascal"),
            MemberConverter::Kebab => write!(f, "Kebab"),
            MemberConverter::Snake => write!(f, "Snake"),
            MemberConverter::Reference(r) => f.debug_tuple("Reference").field(r).finish(),
            MemberConverter::Function(_) => f.debug_tuple("Function").field(&"<fn>").finish(),
        }
    }
}

/// Style-only import specification: one spec or an ordered list
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum TransformStyle {
    Single(TransformSpec),
    List(Vec<TransformSpec>),
}

impl TransformStyle {
    /// The specs in configured order
    pub fn specs(&self) -> &[TransformSpec] {
        match self {
            TransformStyle::Single(spec) => std::slice::from_ref(spec),
            TransformStyle::List(specs) => specs,
        }
    }
}

/// A configured rewrite rule, keyed in the `RuleSet` by its source pattern
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Rule {
    /// Produces the replacement module path. Required at use time: a matched
    /// rule without a transform is a configuration error.
    pub transform: Option<TransformSpec>,

    /// Forbid default/namespace imports of the matched module
    #[serde(alias = "preventFullImport")]
    pub prevent_full_import: bool,

    /// Casing applied to member names before templating
    #[serde(alias = "memberConverter")]
    pub member_converter: MemberConverter,

    /// Keep the original named-binding form instead of converting member
    /// imports to default bindings
    #[serde(alias = "skipDefaultConversion")]
    pub skip_default_conversion: bool,

    /// Additional side-effect-only imports emitted per member binding
    #[serde(alias = "transformStyle")]
    pub transform_style: Option<TransformStyle>,
}

impl Rule {
    /// A rule with a template transform
    pub fn template(transform: impl Into<String>) -> Self {
        Rule {
            transform: Some(TransformSpec::Template(transform.into())),
            ..Default::default()
        }
    }

    /// Attach an inline transform function
    pub fn with_transform_fn(
        mut self,
        f: impl Fn(Option<&str>, &CaptureSet, &Path) -> String + Send + Sync + 'static,
    ) -> Self {
        self.transform = Some(TransformSpec::function(f));
        self
    }

    /// Attach an inline member converter
    pub fn with_converter_fn(
        mut self,
        f: impl Fn(&str) -> Result<String, String> + Send + Sync + 'static,
    ) -> Self {
        self.member_converter = MemberConverter::function(f);
        self
    }

    pub fn with_member_converter(mut self, converter: MemberConverter) -> Self {
        self.member_converter = converter;
        self
    }

    pub fn with_prevent_full_import(mut self, prevent: bool) -> Self {
        self.prevent_full_import = prevent;
        self
    }

    pub fn with_skip_default_conversion(mut self, skip: bool) -> Self {
        self.skip_default_conversion = skip;
        self
    }

    /// Append a style spec, preserving any already configured
    pub fn with_style(mut self, spec: TransformSpec) -> Self {
        self.transform_style = Some(match self.transform_style.take() {
            None => TransformStyle::Single(spec),
            Some(TransformStyle::Single(existing)) => TransformStyle::List(vec![existing, spec]),
            Some(TransformStyle::List(mut specs)) => {
                specs.push(spec);
                TransformStyle::List(specs)
            }
        });
        self
    }

    /// Style specs in configured order; empty when unset
    pub fn style_specs(&self) -> &[TransformSpec] {
        self.transform_style.as_ref().map(TransformStyle::specs).unwrap_or(&[])
    }
}

/// The full rule configuration for a compilation run
///
/// Keys are matched in insertion order by the regex strategy, so the map must
/// preserve the order the configuration listed them in.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(transparent)]
pub struct RuleSet {
    rules: IndexMap<String, Rule>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a rule set from the host's plugin-options JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn insert(&mut self, pattern: impl Into<String>, rule: Rule) {
        self.rules.insert(pattern.into(), rule);
    }

    pub fn get(&self, pattern: &str) -> Option<&Rule> {
        self.rules.get(pattern)
    }

    /// Exact-key lookup returning the stored pattern alongside the rule
    pub fn entry(&self, pattern: &str) -> Option<(&str, &Rule)> {
        self.rules.get_key_value(pattern).map(|(k, v)| (k.as_str(), v))
    }

    /// Patterns and rules in configuration insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Rule)> {
        self.rules.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
