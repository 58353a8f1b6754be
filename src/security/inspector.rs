//! Signature-based content classification.
//!
//! # Responsibilities
//! - Compile the signature table once at startup
//! - Classify a text fragment into the first matching category
//!
//! # Design Decisions
//! - One case-insensitive `RegexSet` per category, tried in category order
//! - Blunt substring/pattern matching, not parsing: false positives and
//!   negatives are accepted
//! - Immutable after construction (shared via `Arc` without locks)

use regex::{RegexSet, RegexSetBuilder};

use crate::security::signatures::{Category, SignatureRule, BUILTIN_RULES};

/// The rule that matched a fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignatureMatch {
    pub category: Category,
    pub rule: &'static str,
}

/// Compiled rules for a single category.
#[derive(Debug)]
struct CategorySet {
    category: Category,
    set: RegexSet,
    names: Vec<&'static str>,
}

/// Classifies fragments against the compiled signature table.
#[derive(Debug)]
pub struct ContentInspector {
    sets: Vec<CategorySet>,
}

impl ContentInspector {
    /// Compile the built-in signature table.
    pub fn new() -> Result<Self, regex::Error> {
        Self::with_rules(BUILTIN_RULES)
    }

    /// Compile an arbitrary rule table. Categories without rules are skipped.
    pub fn with_rules(rules: &[SignatureRule]) -> Result<Self, regex::Error> {
        let mut sets = Vec::with_capacity(Category::ORDERED.len());

        for category in Category::ORDERED {
            let (names, patterns): (Vec<_>, Vec<_>) = rules
                .iter()
                .filter(|r| r.category == category)
                .map(|r| (r.name, r.pattern))
                .unzip();

            if patterns.is_empty() {
                continue;
            }

            let set = RegexSetBuilder::new(&patterns)
                .case_insensitive(true)
                .build()?;

            sets.push(CategorySet {
                category,
                set,
                names,
            });
        }

        tracing::debug!(rules = rules.len(), categories = sets.len(), "Signature set compiled");
        Ok(Self { sets })
    }

    /// Return the first matching category, or `None` for clean input.
    pub fn classify(&self, fragment: &str) -> Option<Category> {
        self.sets
            .iter()
            .find(|s| s.set.is_match(fragment))
            .map(|s| s.category)
    }

    /// Like [`classify`](Self::classify) but also reports which rule fired.
    ///
    /// Within a category the lowest-indexed matching rule is reported.
    pub fn find(&self, fragment: &str) -> Option<SignatureMatch> {
        self.sets.iter().find_map(|s| {
            s.set
                .matches(fragment)
                .iter()
                .next()
                .map(|idx| SignatureMatch {
                    category: s.category,
                    rule: s.names[idx],
                })
        })
    }
}
