// Wildcard pattern compiler
//
// Allow-list entries and ignore rules are written with `*` wildcards.
// Literal segments are regex-escaped and `*` becomes `.*`, so a signature
// such as `BashTool({"command":"ls (x)"})` never trips over regex syntax.

use regex::Regex;
use std::fmt;

/// A compiled, fully anchored wildcard pattern
#[derive(Debug, Clone)]
pub struct WildcardPattern {
    source: String,
    regex: Regex,
}

impl WildcardPattern {
    pub fn compile(pattern: &str) -> Result<Self, regex::Error> {
        let body = pattern
            .split('*')
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".*");
        let regex = Regex::new(&format!("^(?s:{})$", body))?;

        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    pub fn matches(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn has_wildcard(&self) -> bool {
        self.source.contains('*')
    }
}

impl fmt::Display for WildcardPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Compile a list of patterns, skipping (and logging) any that fail
pub fn compile_all<'a>(patterns: impl IntoIterator<Item = &'a str>) -> Vec<WildcardPattern> {
    patterns
        .into_iter()
        .filter_map(|p| match WildcardPattern::compile(p) {
            Ok(compiled) => Some(compiled),
            Err(e) => {
                tracing::warn!(pattern = p, "Skipping invalid pattern: {}", e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_wide_wildcard() {
        let pattern = WildcardPattern::compile("BashTool(*)").unwrap();
        assert!(pattern.matches(r#"BashTool({"command":"ls"})"#));
        assert!(pattern.matches(r#"BashTool({"command":"cargo test --release"})"#));
        assert!(!pattern.matches(r#"GitTool({"operation":"status"})"#));
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        let sig = r#"BashTool({"command":"ls (a|b)+ [x]? $HOME ^"})"#;
        let pattern = WildcardPattern::compile(sig).unwrap();
        assert!(pattern.matches(sig));
        assert!(!pattern.matches(r#"BashTool({"command":"ls a"})"#));

        // `.` must not act as any-char
        let dotted = WildcardPattern::compile("a.b").unwrap();
        assert!(dotted.matches("a.b"));
        assert!(!dotted.matches("axb"));
    }

    #[test]
    fn test_anchoring() {
        let pattern = WildcardPattern::compile("git *").unwrap();
        assert!(pattern.matches("git status"));
        assert!(!pattern.matches("sudo git status"));

        let exact = WildcardPattern::compile("ls").unwrap();
        assert!(exact.matches("ls"));
        assert!(!exact.matches("ls -la"));
    }

    #[test]
    fn test_wildcards_cross_separators_and_lines() {
        let pattern = WildcardPattern::compile("node_modules/*").unwrap();
        assert!(pattern.matches("node_modules/a/b/c.js"));

        let multi = WildcardPattern::compile("FileWriteTool(*)").unwrap();
        assert!(multi.matches("FileWriteTool({\"content\":\"a\nb\"})"));
    }

    #[test]
    fn test_middle_wildcard() {
        let pattern = WildcardPattern::compile("cargo * --release").unwrap();
        assert!(pattern.matches("cargo build --release"));
        assert!(pattern.matches("cargo test --lib --release"));
        assert!(!pattern.matches("cargo build"));
    }

    #[test]
    fn test_compile_all_keeps_order() {
        let compiled = compile_all(["a*", "b", "*c"]);
        let sources: Vec<&str> = compiled.iter().map(|p| p.as_str()).collect();
        assert_eq!(sources, vec!["a*", "b", "*c"]);
        assert!(compiled[0].has_wildcard());
        assert!(!compiled[1].has_wildcard());
    }
}
