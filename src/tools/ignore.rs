// Ignore ruleset
//
// Exclusion patterns consulted before filesystem tools touch a path.
// A pattern without `*` matches as a substring of the relative path; a
// pattern with `*` matches the whole relative path with `*` as any-run.

use super::patterns::WildcardPattern;

#[derive(Debug, Clone)]
enum Rule {
    Substring(String),
    Wildcard(WildcardPattern),
}

#[derive(Debug, Clone, Default)]
pub struct IgnoreRuleset {
    rules: Vec<Rule>,
}

impl IgnoreRuleset {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let rules = patterns
            .into_iter()
            .filter_map(|p| {
                let p = p.as_ref().trim();
                if p.is_empty() {
                    return None;
                }
                if p.contains('*') {
                    match WildcardPattern::compile(p) {
                        Ok(compiled) => Some(Rule::Wildcard(compiled)),
                        Err(e) => {
                            tracing::warn!(pattern = p, "Ignoring invalid ignore pattern: {}", e);
                            None
                        }
                    }
                } else {
                    Some(Rule::Substring(p.to_string()))
                }
            })
            .collect();

        Self { rules }
    }

    /// The first pattern matching `relative_path`, if any
    pub fn matching(&self, relative_path: &str) -> Option<&str> {
        self.rules.iter().find_map(|rule| match rule {
            Rule::Substring(s) if relative_path.contains(s.as_str()) => Some(s.as_str()),
            Rule::Wildcard(w) if w.matches(relative_path) => Some(w.as_str()),
            _ => None,
        })
    }

    pub fn is_ignored(&self, relative_path: &str) -> bool {
        self.matching(relative_path).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
