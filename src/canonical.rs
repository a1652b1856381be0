// src/canonical.rs
//! Synonym canonicalization: maps surface variants ("venue", "location", "place")
//! onto one canonical token ("where") shared by intent detection and scoring.
//!
//! Extending the vocabulary means adding entries here or in `[synonyms]` of the
//! bot config; classifier logic never changes.

use std::collections::HashMap;

/// Built-in synonym groups: (canonical, variants).
const DEFAULT_GROUPS: &[(&str, &[&str])] = &[
    ("when", &["date", "time", "timing", "schedule", "scheduled"]),
    ("where", &["venue", "location", "place", "located", "auditorium"]),
    ("register", &["registration", "apply", "enroll", "enrol", "signup", "join"]),
    ("fees", &["fee", "cost", "costs", "price", "charge", "charges"]),
    (
        "who",
        &[
            "speaker", "speakers", "host", "hosted", "club", "department", "organizer",
            "organiser", "organized", "organised",
        ],
    ),
    (
        "what",
        &["info", "information", "details", "detail", "describe", "description", "about"],
    ),
    ("next", &["upcoming", "latest", "soon", "nearest"]),
];

#[derive(Debug, Clone)]
pub struct Canonicalizer {
    map: HashMap<String, String>,
}

impl Default for Canonicalizer {
    fn default() -> Self {
        let mut map = HashMap::new();
        for (canon, variants) in DEFAULT_GROUPS {
            for v in *variants {
                map.insert((*v).to_string(), (*canon).to_string());
            }
        }
        Self { map }
    }
}

impl Canonicalizer {
    /// Build from an explicit synonym → canonical mapping (no built-ins).
    pub fn from_map(map: HashMap<String, String>) -> Self {
        let map = map
            .into_iter()
            .map(|(k, v)| (k.trim().to_lowercase(), v.trim().to_lowercase()))
            .filter(|(k, v)| !k.is_empty() && !v.is_empty())
            .collect();
        Self { map }
    }

    /// Built-ins plus `extra` entries; `extra` wins on conflicts.
    pub fn extended(extra: &HashMap<String, String>) -> Self {
        let mut c = Self::default();
        for (k, v) in extra {
            let (k, v) = (k.trim().to_lowercase(), v.trim().to_lowercase());
            if !k.is_empty() && !v.is_empty() {
                c.map.insert(k, v);
            }
        }
        c
    }

    pub fn canonical<'a>(&'a self, token: &'a str) -> &'a str {
        self.map.get(token).map(String::as_str).unwrap_or(token)
    }

    /// Same length and order as the input.
    pub fn canonicalize(&self, tokens: &[String]) -> Vec<String> {
        tokens
            .iter()
            .map(|t| self.canonical(t).to_string())
            .collect()
    }
}
