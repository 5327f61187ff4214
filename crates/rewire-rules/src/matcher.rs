//! Rule matching strategies
//!
//! A source string is matched against the rule set by three strategies in
//! fixed precedence: exact key, regex pattern, relative-path resolution.
//! First hit wins; matching never fails, a miss is simply `None`. The order
//! is an explicit strategy list so each step stays independently testable.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use regex::Regex;

use crate::config::{Rule, RuleSet};

/// Capture groups extracted from a regex rule pattern
///
/// The positional list flattens every match of a global scan, each match
/// contributing all of its groups (group 0, the whole match, first). Named
/// groups additionally populate a name map for `${name}` template tokens.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CaptureSet {
    positional: Vec<String>,
    named: HashMap<String, String>,
}

impl CaptureSet {
    /// Capture by position; 0 is the whole match
    pub fn get(&self, index: usize) -> Option<&str> {
        self.positional.get(index).map(String::as_str)
    }

    /// Capture by regex group name
    pub fn get_named(&self, name: &str) -> Option<&str> {
        self.named.get(name).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty()
    }

    pub fn len(&self) -> usize {
        self.positional.len()
    }

    /// Append a positional capture
    pub fn push(&mut self, value: impl Into<String>) {
        self.positional.push(value.into());
    }

    /// Record a named capture
    pub fn insert_named(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.named.insert(name.into(), value.into());
    }
}

/// A resolved rule for an import source
#[derive(Debug)]
pub struct RuleMatch<'r> {
    pub rule: &'r Rule,
    /// The pattern key that matched, as stored in the rule set
    pub pattern: &'r str,
    pub captures: CaptureSet,
}

/// One step of the matching precedence chain
pub trait MatchStrategy {
    fn find<'r>(
        &self,
        source: &str,
        current_file: &Path,
        rules: &'r RuleSet,
    ) -> Option<RuleMatch<'r>>;
}

/// Step 1: the source string equals a rule key verbatim
pub struct ExactMatch;

impl MatchStrategy for ExactMatch {
    fn find<'r>(
        &self,
        source: &str,
        _current_file: &Path,
        rules: &'r RuleSet,
    ) -> Option<RuleMatch<'r>> {
        rules.entry(source).map(|(pattern, rule)| RuleMatch {
            rule,
            pattern,
            captures: CaptureSet::default(),
        })
    }
}

/// Step 2: the first regex-shaped rule key (in insertion order) that matches
/// the source string anywhere
pub struct RegexMatch;

impl RegexMatch {
    /// A key with none of these characters could only ever match literally,
    /// so it is left to the exact and relative-path strategies.
    fn is_plain_path(pattern: &str) -> bool {
        !pattern.chars().any(|c| {
            matches!(
                c,
                '(' | ')' | '[' | ']' | '{' | '}' | '^' | '$' | '+' | '*' | '?' | '|' | '\\'
            )
        })
    }

    /// Flatten every match's groups (group 0 included) into one positional
    /// list, collecting named groups on the side.
    fn scan_captures(re: &Regex, source: &str) -> CaptureSet {
        let mut captures = CaptureSet::default();
        for caps in re.captures_iter(source) {
            for i in 0..caps.len() {
                captures
                    .positional
                    .push(caps.get(i).map(|m| m.as_str().to_string()).unwrap_or_default());
            }
            for name in re.capture_names().flatten() {
                if let Some(m) = caps.name(name) {
                    captures.named.insert(name.to_string(), m.as_str().to_string());
                }
            }
        }
        captures
    }
}

impl MatchStrategy for RegexMatch {
    fn find<'r>(
        &self,
        source: &str,
        _current_file: &Path,
        rules: &'r RuleSet,
    ) -> Option<RuleMatch<'r>> {
        for (pattern, rule) in rules.iter() {
            if Self::is_plain_path(pattern) {
                continue;
            }
            // Unparseable patterns are skipped; matching never fails
            let Ok(re) = Regex::new(pattern) else {
                continue;
            };
            if re.is_match(source) {
                return Some(RuleMatch {
                    rule,
                    pattern,
                    captures: Self::scan_captures(&re, source),
                });
            }
        }
        None
    }
}

/// Step 3: a `./`, `../`, or `/` source is resolved against the current
/// file's directory and the resolved path is looked up as an exact key
pub struct RelativePathMatch;

impl MatchStrategy for RelativePathMatch {
    fn find<'r>(
        &self,
        source: &str,
        current_file: &Path,
        rules: &'r RuleSet,
    ) -> Option<RuleMatch<'r>> {
        if !(source.starts_with("./") || source.starts_with("../") || source.starts_with('/')) {
            return None;
        }

        let candidate = Path::new(source);
        let resolved = if candidate.is_absolute() {
            normalize(candidate)
        } else {
            normalize(&current_file.parent()?.join(candidate))
        };

        let key = resolved.to_string_lossy();
        rules.entry(&key).map(|(pattern, rule)| RuleMatch {
            rule,
            pattern,
            captures: CaptureSet::default(),
        })
    }
}

/// Lexical normalization: folds `.` away and resolves `..` against the
/// components already seen. No filesystem access.
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push(Component::ParentDir);
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}

/// Resolve the rule for an import source, if any
///
/// Strategies run in the fixed precedence order above; the first hit wins.
pub fn match_rule<'r>(
    source: &str,
    current_file: &Path,
    rules: &'r RuleSet,
) -> Option<RuleMatch<'r>> {
    let strategies: [&dyn MatchStrategy; 3] = [&ExactMatch, &RegexMatch, &RelativePathMatch];
    strategies
        .iter()
        .find_map(|strategy| strategy.find(source, current_file, rules))
}
