// src/retrieval.rs
//! Keyword-overlap retrieval over the event store.
//!
//! score = title_weight * |q ∩ title|
//!       + description_weight * |q ∩ description|
//!       + tag_weight * |q ∩ tags|
//!       + partial_weight * (#query tokens with no exact hit but a substring hit)
//!       + upcoming_boost (event dated today or later)
//!
//! Event fields go through the same normalizer and canonicalizer as questions,
//! once, when the index is built.

use chrono::NaiveDate;
use serde::Deserialize;
use std::cmp::Ordering;
use std::collections::HashSet;

use crate::canonical::Canonicalizer;
use crate::normalize::Normalizer;
use crate::store::{Event, EventStore};

/// Partial matches only count for query tokens longer than this.
const PARTIAL_MIN_CHARS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub title_weight: u32,
    pub tag_weight: u32,
    pub description_weight: u32,
    pub partial_weight: u32,
    pub upcoming_boost: u32,
    /// Best keyword score (boost excluded) needed for a confident match. Never below 1.
    pub min_keyword_score: u32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            title_weight: 3,
            tag_weight: 3,
            description_weight: 1,
            partial_weight: 1,
            upcoming_boost: 1,
            min_keyword_score: 1,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct EventTokens {
    title: HashSet<String>,
    description: HashSet<String>,
    tags: HashSet<String>,
}

impl EventTokens {
    fn build(ev: &Event, normalizer: &Normalizer, canon: &Canonicalizer) -> Self {
        let field = |text: &str| -> HashSet<String> {
            canon
                .canonicalize(&normalizer.normalize(text))
                .into_iter()
                .collect()
        };
        Self {
            title: field(ev.title.as_str()),
            description: field(ev.description.as_str()),
            tags: ev.tags.iter().flat_map(|t| field(t.as_str())).collect(),
        }
    }

    fn any_word_contains(&self, needle: &str) -> bool {
        self.title
            .iter()
            .chain(self.description.iter())
            .chain(self.tags.iter())
            .any(|w| w.contains(needle))
    }
}

/// One scored candidate.
#[derive(Debug, Clone)]
pub struct ScoredEvent<'a> {
    /// Position in the store (load order).
    pub index: usize,
    pub event: &'a Event,
    /// Keyword score plus boost.
    pub score: u32,
    pub keyword_score: u32,
    pub upcoming: bool,
}

#[derive(Debug, Clone)]
pub enum Retrieval<'a> {
    /// Ranked best-first; every entry has keyword overlap with the query.
    Matches(Vec<ScoredEvent<'a>>),
    NoMatch,
}

impl<'a> Retrieval<'a> {
    pub fn best(&self) -> Option<&ScoredEvent<'a>> {
        match self {
            Retrieval::Matches(v) => v.first(),
            Retrieval::NoMatch => None,
        }
    }

    pub fn is_match(&self) -> bool {
        self.best().is_some()
    }
}

/// Pre-tokenized index over an `EventStore`. Built once; read-only afterwards.
#[derive(Debug, Clone)]
pub struct Scorer {
    weights: ScoringWeights,
    index: Vec<EventTokens>,
}

impl Scorer {
    pub fn new(
        weights: ScoringWeights,
        store: &EventStore,
        normalizer: &Normalizer,
        canon: &Canonicalizer,
    ) -> Self {
        let index = store
            .iter()
            .map(|ev| EventTokens::build(ev, normalizer, canon))
            .collect();
        Self { weights, index }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// (keyword score, upcoming) for one indexed event.
    fn score_one(&self, toks: &EventTokens, ev: &Event, query: &HashSet<&str>, today: NaiveDate) -> (u32, bool) {
        let w = &self.weights;
        let mut keyword = 0u32;
        for &t in query {
            let mut hit = 0u32;
            if toks.title.contains(t) {
                hit = hit.saturating_add(w.title_weight);
            }
            if toks.description.contains(t) {
                hit = hit.saturating_add(w.description_weight);
            }
            if toks.tags.contains(t) {
                hit = hit.saturating_add(w.tag_weight);
            }
            let any_exact =
                toks.title.contains(t) || toks.description.contains(t) || toks.tags.contains(t);
            if !any_exact && t.chars().count() > PARTIAL_MIN_CHARS && toks.any_word_contains(t) {
                hit = hit.saturating_add(w.partial_weight);
            }
            keyword = keyword.saturating_add(hit);
        }
        (keyword, ev.is_upcoming(today))
    }

    /// Score every event against the query's content tokens and rank them.
    ///
    /// Ranking: total score desc, then upcoming events by earliest date, then load order.
    pub fn retrieve<'a>(&self, store: &'a EventStore, tokens: &[String], today: NaiveDate) -> Retrieval<'a> {
        debug_assert_eq!(store.len(), self.index.len(), "scorer built for a different store");
        let query: HashSet<&str> = tokens.iter().map(String::as_str).collect();
        if query.is_empty() {
            return Retrieval::NoMatch;
        }

        let mut scored: Vec<ScoredEvent<'a>> = store
            .iter()
            .zip(self.index.iter())
            .enumerate()
            .filter_map(|(index, (event, toks))| {
                let (keyword_score, upcoming) = self.score_one(toks, event, &query, today);
                if keyword_score == 0 {
                    return None;
                }
                let boost = if upcoming { self.weights.upcoming_boost } else { 0 };
                Some(ScoredEvent {
                    index,
                    event,
                    score: keyword_score.saturating_add(boost),
                    keyword_score,
                    upcoming,
                })
            })
            .collect();

        let best_keyword = scored.iter().map(|s| s.keyword_score).max().unwrap_or(0);
        if best_keyword < self.weights.min_keyword_score.max(1) {
            return Retrieval::NoMatch;
        }

        scored.sort_by(rank_order);
        Retrieval::Matches(scored)
    }
}

fn rank_order(a: &ScoredEvent<'_>, b: &ScoredEvent<'_>) -> Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| match (a.upcoming, b.upcoming) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (true, true) => a.event.date.cmp(&b.event.date),
            (false, false) => Ordering::Equal,
        })
        .then_with(|| a.index.cmp(&b.index))
}
