// src/config.rs
//! Bot configuration loaded from TOML (`config/bot.toml` by default).
//!
//! Every section is optional; anything omitted falls back to built-in defaults.
//!
//! ```toml
//! [scoring]
//! title_weight = 3
//! tag_weight = 3
//! description_weight = 1
//! partial_weight = 1
//! upcoming_boost = 1
//! min_keyword_score = 1
//!
//! [replies]
//! fallback_limit = 3
//!
//! [vocabulary]
//! extra_stopwords = ["pls"]
//! synonyms = { gig = "concert" }
//!
//! [templates]
//! where = "Head to {venue} for {title}."
//! ```

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::reply::Templates;
use crate::retrieval::ScoringWeights;

// --- env defaults & names ---
pub const DEFAULT_BOT_CONFIG_PATH: &str = "config/bot.toml";
pub const DEFAULT_FALLBACK_LIMIT: usize = 3;
pub const MAX_FALLBACK_LIMIT: usize = 10;

pub const ENV_BOT_CONFIG_PATH: &str = "BOT_CONFIG_PATH";
pub const ENV_FALLBACK_LIMIT: &str = "CHAT_FALLBACK_LIMIT";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BotConfig {
    #[serde(default)]
    pub scoring: ScoringWeights,
    #[serde(default)]
    pub replies: RepliesSection,
    #[serde(default)]
    pub vocabulary: VocabularySection,
    #[serde(default)]
    pub templates: Templates,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RepliesSection {
    /// How many upcoming events the fallback listing shows.
    #[serde(default = "default_fallback_limit")]
    pub fallback_limit: usize,
}

impl Default for RepliesSection {
    fn default() -> Self {
        Self {
            fallback_limit: DEFAULT_FALLBACK_LIMIT,
        }
    }
}

fn default_fallback_limit() -> usize {
    DEFAULT_FALLBACK_LIMIT
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VocabularySection {
    #[serde(default)]
    pub extra_stopwords: Vec<String>,
    /// synonym → canonical token, merged over the built-in table.
    #[serde(default)]
    pub synonyms: HashMap<String, String>,
}

// parse optional limit env and clamp to 1..=MAX_FALLBACK_LIMIT
fn parse_limit_env(raw: Option<String>) -> Option<usize> {
    raw.and_then(|s| s.trim().parse::<usize>().ok())
        .map(|v| v.clamp(1, MAX_FALLBACK_LIMIT))
}

impl BotConfig {
    /// Resolve the config path and load it:
    /// 1) `$BOT_CONFIG_PATH` (must exist)
    /// 2) `config/bot.toml` (optional; built-in defaults when absent)
    ///
    /// `$CHAT_FALLBACK_LIMIT` overrides `replies.fallback_limit` afterwards.
    pub fn load() -> Result<Self> {
        let mut cfg = match std::env::var(ENV_BOT_CONFIG_PATH) {
            Ok(p) => {
                let pb = PathBuf::from(p);
                if !pb.exists() {
                    return Err(anyhow!(
                        "{ENV_BOT_CONFIG_PATH} points to non-existent path {}",
                        pb.display()
                    ));
                }
                Self::from_path(&pb)?
            }
            Err(_) => {
                let pb = PathBuf::from(DEFAULT_BOT_CONFIG_PATH);
                if pb.exists() {
                    Self::from_path(&pb)?
                } else {
                    info!("no bot config found; using built-in defaults");
                    Self::default()
                }
            }
        };

        if let Some(limit) = parse_limit_env(std::env::var(ENV_FALLBACK_LIMIT).ok()) {
            cfg.replies.fallback_limit = limit;
        }
        Ok(cfg)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading bot config from {}", path.display()))?;
        let cfg = Self::from_toml_str(&content)
            .with_context(|| format!("parsing bot config {}", path.display()))?;
        info!(path = %path.display(), "bot config loaded");
        Ok(cfg)
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let mut cfg: BotConfig = toml::from_str(s)?;
        // harden: keep the listing non-empty and short
        cfg.replies.fallback_limit = cfg.replies.fallback_limit.clamp(1, MAX_FALLBACK_LIMIT);
        Ok(cfg)
    }
}
