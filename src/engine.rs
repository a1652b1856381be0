// src/engine.rs
//! Question → reply pipeline.
//!
//! Order:
//! 1) empty question short-circuit
//! 2) normalize → canonicalize → intent
//! 3) retrieval over content tokens (intent keywords removed)
//! 4) greeting / NEXT listing / intent template / fallback listing

use anyhow::Result;
use chrono::{Local, NaiveDate};
use serde::Serialize;

use crate::canonical::Canonicalizer;
use crate::config::BotConfig;
use crate::debug::dev_log_answer;
use crate::intent::{Intent, IntentClassifier};
use crate::normalize::Normalizer;
use crate::reply::{Composer, EMPTY_QUESTION_REPLY, GREETING_REPLY};
use crate::retrieval::{Retrieval, Scorer};
use crate::store::{Event, EventStore};

const GREETINGS: [&str; 3] = ["hello", "hi", "hey"];

/// How the reply was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyKind {
    /// Intent template filled from the best-scoring event.
    Match,
    /// Upcoming listing requested explicitly (NEXT intent).
    Upcoming,
    /// No confident match; hint plus upcoming listing.
    Fallback,
    Greeting,
    EmptyQuestion,
}

/// What the HTTP layer renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatReply {
    pub reply: String,
    pub intent: Intent,
    pub kind: ReplyKind,
    /// Titles of every event the reply refers to, in reply order.
    pub events: Vec<String>,
    /// Total score of the matched event (`Match` only).
    pub score: Option<u32>,
}

/// Per-question working state. Lives only for one `answer` call.
#[derive(Debug, Clone)]
pub struct QueryContext<'a> {
    pub raw: &'a str,
    pub tokens: Vec<String>,
    pub canonical: Vec<String>,
    pub content: Vec<String>,
    pub intent: Intent,
    pub retrieval: Retrieval<'a>,
}

/// Everything needed to answer questions. Immutable after construction; share via `Arc`.
#[derive(Debug)]
pub struct ChatEngine {
    store: EventStore,
    normalizer: Normalizer,
    canonicalizer: Canonicalizer,
    classifier: IntentClassifier,
    scorer: Scorer,
    composer: Composer,
    fallback_limit: usize,
}

impl ChatEngine {
    pub fn new(store: EventStore, cfg: &BotConfig) -> Self {
        let normalizer = Normalizer::extended(&cfg.vocabulary.extra_stopwords);
        let canonicalizer = Canonicalizer::extended(&cfg.vocabulary.synonyms);
        let scorer = Scorer::new(cfg.scoring, &store, &normalizer, &canonicalizer);
        Self {
            store,
            normalizer,
            canonicalizer,
            classifier: IntentClassifier::default(),
            scorer,
            composer: Composer::new(cfg.templates.clone()),
            fallback_limit: cfg.replies.fallback_limit.max(1),
        }
    }

    /// Engine with built-in vocabulary, weights and templates.
    pub fn with_defaults(store: EventStore) -> Self {
        Self::new(store, &BotConfig::default())
    }

    /// Load config and knowledge base from their default locations / env overrides.
    /// Any failure here is a startup failure.
    pub fn from_env() -> Result<Self> {
        let cfg = BotConfig::load()?;
        let store = EventStore::load_default()?;
        Ok(Self::new(store, &cfg))
    }

    pub fn store(&self) -> &EventStore {
        &self.store
    }

    pub fn fallback_limit(&self) -> usize {
        self.fallback_limit
    }

    /// Upcoming events relative to `today`, at most `limit`.
    pub fn upcoming_on(&self, today: NaiveDate, limit: usize) -> Vec<&Event> {
        self.store.upcoming(today, limit)
    }

    /// Run understanding + retrieval without composing a reply.
    pub fn analyze_on<'a>(&'a self, question: &'a str, today: NaiveDate) -> QueryContext<'a> {
        let tokens = self.normalizer.normalize(question);
        let canonical = self.canonicalizer.canonicalize(&tokens);
        let intent = self.classifier.classify(&canonical);
        let content = self.classifier.content_tokens(&canonical);
        let retrieval = self.scorer.retrieve(&self.store, &content, today);
        QueryContext {
            raw: question,
            tokens,
            canonical,
            content,
            intent,
            retrieval,
        }
    }

    /// Answer relative to the local calendar date.
    pub fn answer(&self, question: &str) -> ChatReply {
        self.answer_on(question, Local::now().date_naive())
    }

    pub fn answer_on(&self, question: &str, today: NaiveDate) -> ChatReply {
        if question.trim().is_empty() {
            return ChatReply {
                reply: EMPTY_QUESTION_REPLY.to_string(),
                intent: Intent::Unknown,
                kind: ReplyKind::EmptyQuestion,
                events: Vec::new(),
                score: None,
            };
        }

        let ctx = self.analyze_on(question, today);
        let reply = self.compose(&ctx, today);
        dev_log_answer(question, &reply);
        reply
    }

    fn compose(&self, ctx: &QueryContext<'_>, today: NaiveDate) -> ChatReply {
        let greeting = ctx.intent == Intent::Unknown
            && !ctx.retrieval.is_match()
            && ctx.tokens.iter().any(|t| GREETINGS.contains(&t.as_str()));
        if greeting {
            return ChatReply {
                reply: GREETING_REPLY.to_string(),
                intent: ctx.intent,
                kind: ReplyKind::Greeting,
                events: Vec::new(),
                score: None,
            };
        }

        if ctx.intent == Intent::Next {
            let upcoming = self.upcoming_on(today, self.fallback_limit);
            return ChatReply {
                reply: self.composer.compose_upcoming(&upcoming),
                intent: ctx.intent,
                kind: ReplyKind::Upcoming,
                events: titles(&upcoming),
                score: None,
            };
        }

        match ctx.retrieval.best() {
            Some(best) => ChatReply {
                reply: self.composer.compose_match(ctx.intent, best.event),
                intent: ctx.intent,
                kind: ReplyKind::Match,
                events: vec![best.event.title.clone()],
                score: Some(best.score),
            },
            None => {
                let upcoming = self.upcoming_on(today, self.fallback_limit);
                ChatReply {
                    reply: self.composer.compose_fallback(&upcoming),
                    intent: ctx.intent,
                    kind: ReplyKind::Fallback,
                    events: titles(&upcoming),
                    score: None,
                }
            }
        }
    }
}

fn titles(events: &[&Event]) -> Vec<String> {
    events.iter().map(|e| e.title.clone()).collect()
}
