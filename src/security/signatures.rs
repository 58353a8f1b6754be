//! Built-in attack signature table.
//!
//! Rules are grouped into four categories evaluated in a fixed order:
//! SQL injection, XSS, path traversal, command injection. Patterns are
//! regular expressions matched case-insensitively anywhere in a fragment.
//! `%20` alternatives cover raw (undecoded) query strings.

use std::fmt;

/// Attack category a signature belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    SqlInjection,
    Xss,
    PathTraversal,
    CommandInjection,
}

impl Category {
    /// Evaluation order. The first category with a matching rule wins.
    pub const ORDERED: [Category; 4] = [
        Category::SqlInjection,
        Category::Xss,
        Category::PathTraversal,
        Category::CommandInjection,
    ];

    /// Stable snake_case label for logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::SqlInjection => "sql_injection",
            Category::Xss => "xss",
            Category::PathTraversal => "path_traversal",
            Category::CommandInjection => "command_injection",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::SqlInjection => "SQL injection",
            Category::Xss => "XSS",
            Category::PathTraversal => "path traversal",
            Category::CommandInjection => "command injection",
        };
        f.write_str(name)
    }
}

/// A named pattern and the category it detects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignatureRule {
    pub name: &'static str,
    pub category: Category,
    pub pattern: &'static str,
}

const fn rule(name: &'static str, category: Category, pattern: &'static str) -> SignatureRule {
    SignatureRule {
        name,
        category,
        pattern,
    }
}

use Category::*;

/// The fixed rule set compiled by [`ContentInspector::new`](super::inspector::ContentInspector::new).
pub static BUILTIN_RULES: &[SignatureRule] = &[
    // SQL injection
    rule("quote-or-equals", SqlInjection, r"'\s*or\s*'?\d*'?\s*="),
    rule("quote-or-quote", SqlInjection, r"'(?:\s|%20)*or(?:\s|%20)*'"),
    rule("or-numeric-equals", SqlInjection, r"or(?:\s|%20)+[0-9]+(?:\s|%20)*="),
    rule("union-select", SqlInjection, r"union(?:\s|%20|\+)+select"),
    rule("select-from", SqlInjection, r"select(?:(?:\s|%20)+\*?(?:\s|%20)*|\s*\*\s*)from"),
    rule("comment", SqlInjection, r"--"),
    rule("xp-procedure", SqlInjection, r"\bxp_"),
    rule("drop", SqlInjection, r"\bdrop\b"),
    rule("stacked-query", SqlInjection, r";\s*$"),
    // XSS
    rule("script-tag", Xss, r"<script"),
    rule("javascript-uri", Xss, r"javascript:"),
    rule("event-handler", Xss, r"\bon(?:load|error|click|mouseover|focus|blur|submit|change)\s*="),
    rule("img-tag", Xss, r"<img"),
    rule("alert-call", Xss, r"alert\s*\("),
    rule("prompt-call", Xss, r"prompt\s*\("),
    // Path traversal
    rule("dot-dot-slash", PathTraversal, r"\.\./"),
    rule("dot-dot-backslash", PathTraversal, r"\.\.\\"),
    rule("encoded-dot-dot", PathTraversal, r"\.\.%2f|%2e%2e(?:/|%2f)"),
    rule("etc-passwd", PathTraversal, r"/etc/passwd"),
    rule("bin-bash", PathTraversal, r"/bin/bash"),
    rule("cmd-exe", PathTraversal, r"cmd\.exe"),
    // Command injection
    rule("pipe-shell", CommandInjection, r"\|\s*(?:cmd|bash|powershell|sh\b|nc\b)"),
    rule("semicolon-ampersand", CommandInjection, r";&"),
    rule(
        "semicolon-command",
        CommandInjection,
        r";\s*(?:cmd|cat|ls|id|whoami|uname|wget|curl|nc|rm)\b",
    ),
    rule(
        "and-command",
        CommandInjection,
        r"&&\s*(?:cat|ls|id|whoami|uname|wget|curl|nc|rm)\b",
    ),
    rule("ifs-variable", CommandInjection, r"\$\{IFS\}"),
    rule("command-substitution", CommandInjection, r"\$\("),
    rule("system-call", CommandInjection, r"system\s*\("),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_category_has_rules() {
        for category in Category::ORDERED {
            assert!(
                BUILTIN_RULES.iter().any(|r| r.category == category),
                "no rules for {category}"
            );
        }
    }

    #[test]
    fn rule_names_are_unique() {
        let mut names: Vec<_> = BUILTIN_RULES.iter().map(|r| r.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), BUILTIN_RULES.len());
    }

    #[test]
    fn labels() {
        assert_eq!(Category::SqlInjection.as_str(), "sql_injection");
        assert_eq!(Category::Xss.to_string(), "XSS");
    }
}
