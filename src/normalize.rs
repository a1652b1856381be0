// src/normalize.rs
//! Question normalizer: tokenizer, lower-casing and stopword removal.
//!
//! The stopword list is the usual English set of articles, auxiliaries and pronouns,
//! minus the question words (`when`, `where`, `who`, `what`, `about`) that intent
//! detection depends on.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// Letter/mark/digit runs, optionally joined by inner apostrophes ("what's", "o'clock").
/// Marks are included because lower-casing can emit them (`İ` → `i` + U+0307).
static TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?u)[\p{L}\p{M}\p{N}]+(?:'[\p{L}\p{M}\p{N}]+)*").expect("token regex")
});

const DEFAULT_STOPWORDS: &str = "
a an the is are was were be been being do does did to for of on in at by with from and or but as
into over after before between during under again further then once here there why how all
any both each few more most other some such no nor not only own same so than too very can will
just don don't should now i you he she it we they me my our your their which whom this that
these those afterwards also although among amongst am aren because couldn didn down hadn hasn
haven having isn let might must needn ought shouldn wasn weren won wouldn tell please know
would could i'm it's
";

/// Owns the stopword set; cheap to build, immutable once constructed.
#[derive(Debug, Clone)]
pub struct Normalizer {
    stopwords: HashSet<String>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::with_stopwords(DEFAULT_STOPWORDS.split_whitespace())
    }
}

impl Normalizer {
    /// Build a normalizer with an explicit stopword set (tests, custom vocabularies).
    pub fn with_stopwords<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let stopwords = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        Self { stopwords }
    }

    /// Default list plus `extra` words (from config).
    pub fn extended<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut n = Self::default();
        for w in extra {
            let w = w.as_ref().trim().to_lowercase();
            if !w.is_empty() {
                n.stopwords.insert(w);
            }
        }
        n
    }

    pub fn is_stopword(&self, token: &str) -> bool {
        self.stopwords.contains(token)
    }

    /// Raw text → ordered, lower-cased, stopword-free tokens. May be empty.
    pub fn normalize(&self, text: &str) -> Vec<String> {
        let decoded = html_escape::decode_html_entities(text);
        tokenize(&decoded)
            .into_iter()
            .filter(|t| !self.is_stopword(t))
            .collect()
    }
}

/// Lower-cased tokens without stopword filtering. Trailing possessive `'s` suffixes are dropped.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    TOKEN_RE
        .find_iter(&lowered)
        .map(|m| {
            let mut t = m.as_str().to_string();
            while t.len() > 2 && t.ends_with("'s") {
                t.truncate(t.len() - 2);
            }
            t
        })
        .collect()
}
