// src/intent.rs
//! Keyword-set intent classifier.
//!
//! Each intent owns a trigger set of canonical tokens. Classification walks the
//! intents in priority order and returns the first whose trigger set intersects
//! the query:
//!
//! `Register` > `When` > `Where` > `Who` > `What` > `Next`, else `Unknown`.
//!
//! So "how to register ... what are the fees?" is `Register`, never `What`.

use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Intent {
    Register,
    When,
    Where,
    Who,
    What,
    Next,
    Unknown,
}

impl Intent {
    /// Classification order; `Unknown` is the fallback and never listed.
    pub const PRIORITY: [Intent; 6] = [
        Intent::Register,
        Intent::When,
        Intent::Where,
        Intent::Who,
        Intent::What,
        Intent::Next,
    ];

    /// Built-in trigger keywords (canonical forms, see `canonical.rs`).
    pub fn default_triggers(self) -> &'static [&'static str] {
        match self {
            Intent::Register => &["register", "fees"],
            Intent::When => &["when"],
            Intent::Where => &["where"],
            Intent::Who => &["who"],
            Intent::What => &["what"],
            Intent::Next => &["next"],
            Intent::Unknown => &[],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Intent::Register => "REGISTER",
            Intent::When => "WHEN",
            Intent::Where => "WHERE",
            Intent::Who => "WHO",
            Intent::What => "WHAT",
            Intent::Next => "NEXT",
            Intent::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
struct IntentRule {
    intent: Intent,
    triggers: HashSet<String>,
}

#[derive(Debug, Clone)]
pub struct IntentClassifier {
    rules: Vec<IntentRule>,
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::with_rules(Intent::PRIORITY.iter().map(|&i| {
            let words = i
                .default_triggers()
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>();
            (i, words)
        }))
    }
}

impl IntentClassifier {
    /// Rules are tested in the order given. `Unknown` rules are ignored.
    pub fn with_rules<I>(rules: I) -> Self
    where
        I: IntoIterator<Item = (Intent, Vec<String>)>,
    {
        let rules = rules
            .into_iter()
            .filter(|(intent, _)| *intent != Intent::Unknown)
            .map(|(intent, words)| IntentRule {
                intent,
                triggers: words.into_iter().map(|w| w.to_lowercase()).collect(),
            })
            .collect();
        Self { rules }
    }

    pub fn classify(&self, tokens: &[String]) -> Intent {
        let bag: HashSet<&str> = tokens.iter().map(String::as_str).collect();
        self.rules
            .iter()
            .find(|r| r.triggers.iter().any(|t| bag.contains(t.as_str())))
            .map(|r| r.intent)
            .unwrap_or(Intent::Unknown)
    }

    pub fn is_trigger(&self, token: &str) -> bool {
        self.rules.iter().any(|r| r.triggers.contains(token))
    }

    /// Canonical tokens minus every trigger keyword: the part of the question
    /// that names *which* event, as opposed to *what about* it.
    pub fn content_tokens(&self, tokens: &[String]) -> Vec<String> {
        tokens
            .iter()
            .filter(|t| !self.is_trigger(t))
            .cloned()
            .collect()
    }
}
