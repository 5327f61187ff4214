//! Replacement path synthesis
//!
//! A transform spec is either a `${name}` template or a function (inline or
//! loaded through the `CodeLoader` port). Template tokens: `member` is the
//! converted member name (empty when building a full-import replacement),
//! numeric tokens index the positional capture list (0 = whole match), any
//! other token is looked up among the named capture groups. Unmatched tokens
//! substitute as empty; that looseness is part of the observable contract of
//! existing configurations and is kept deliberately.

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use crate::config::TransformSpec;
use crate::error::RewriteError;
use crate::loader::CodeLoader;
use crate::matcher::CaptureSet;

/// Produce the replacement module path for one emitted declaration
pub fn build_path(
    spec: &TransformSpec,
    member: Option<&str>,
    captures: &CaptureSet,
    current_file: &Path,
    loader: &dyn CodeLoader,
) -> Result<String, RewriteError> {
    match spec {
        TransformSpec::Template(template) => {
            Ok(substitute_template(template, member, captures))
        }
        TransformSpec::Reference(reference) => {
            let f = loader.load_transform(reference)?;
            Ok(f(member, captures, current_file))
        }
        TransformSpec::Function(f) => Ok(f(member, captures, current_file)),
    }
}

/// Substitute `${ name }` placeholders (inner whitespace tolerated)
pub fn substitute_template(template: &str, member: Option<&str>, captures: &CaptureSet) -> String {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    let regex = PLACEHOLDER.get_or_init(|| Regex::new(r"\$\{\s*(\w+)\s*\}").unwrap());

    let result = regex.replace_all(template, |caps: &regex::Captures| {
        let token = &caps[1];
        if token == "member" {
            return member.unwrap_or_default().to_string();
        }
        if let Ok(index) = token.parse::<usize>() {
            return captures.get(index).unwrap_or_default().to_string();
        }
        captures.get_named(token).unwrap_or_default().to_string()
    });

    result.into_owned()
}
