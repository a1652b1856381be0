// src/store.rs
//! Event knowledge base: record type, tolerant JSON loader, and date queries.
//!
//! The store is loaded once at startup and never mutated afterwards; handlers
//! share it through `Arc` without locking.
//!
//! JSON shape (array, or `{"events": [...]}`):
//! ```json
//! [{ "title": "Tech Fest", "description": "...", "tags": ["tech"],
//!    "date": "2025-03-14", "time": "10:00 AM", "venue": "Main Auditorium",
//!    "organizer": "CS Club", "fees": 100, "registration_info": "https://..." }]
//! ```
//! `location`, `fee` and `registration_link` are accepted as aliases.

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const DEFAULT_EVENTS_PATH: &str = "data/events.json";
pub const ENV_EVENTS_PATH: &str = "EVENTS_PATH";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    /// `None` when absent or unparseable.
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub venue: Option<String>,
    pub organizer: Option<String>,
    pub fees: Option<String>,
    pub registration_info: Option<String>,
}

impl Event {
    /// Minimal event; fill the rest with struct update syntax.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            tags: Vec::new(),
            date: None,
            time: None,
            venue: None,
            organizer: None,
            fees: None,
            registration_info: None,
        }
    }

    /// Dated on or after `today`. Unknown dates are never upcoming.
    pub fn is_upcoming(&self, today: NaiveDate) -> bool {
        self.date.is_some_and(|d| d >= today)
    }

    /// Parse one record. `None` means the record as a whole is unusable.
    fn from_json(v: &Value) -> Option<Self> {
        let obj = v.as_object()?;
        let title = text_field(obj, &["title"])?;

        let date = obj.get("date").and_then(|d| match d.as_str() {
            Some(raw) => {
                let parsed = parse_date(raw);
                if parsed.is_none() {
                    debug!(%title, date = raw, "unparseable event date; treating as unknown");
                }
                parsed
            }
            None => None,
        });

        Some(Self {
            description: text_field(obj, &["description"]).unwrap_or_default(),
            tags: tags_field(obj.get("tags")),
            date,
            time: text_field(obj, &["time"]),
            venue: text_field(obj, &["venue", "location"]),
            organizer: text_field(obj, &["organizer"]),
            fees: text_field(obj, &["fees", "fee"]),
            registration_info: text_field(obj, &["registration_info", "registration_link"]),
            title,
        })
    }
}

/// First non-empty string (or number) under any of `keys`.
fn text_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| {
        let s = match obj.get(*k)? {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            _ => return None,
        };
        (!s.is_empty()).then_some(s)
    })
}

/// Array of strings (non-strings skipped) or a comma-separated string.
fn tags_field(v: Option<&Value>) -> Vec<String> {
    let raw: Vec<String> = match v {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|t| t.as_str().map(str::to_string))
            .collect(),
        Some(Value::String(s)) => s.split(',').map(str::to_string).collect(),
        _ => Vec::new(),
    };
    let mut tags: Vec<String> = Vec::with_capacity(raw.len());
    for t in raw {
        let t = t.trim().to_lowercase();
        if !t.is_empty() && !tags.contains(&t) {
            tags.push(t);
        }
    }
    tags
}

/// `YYYY-MM-DD`, or an RFC 3339 timestamp truncated to its date.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(d);
    }
    chrono::DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.date_naive())
}

#[derive(Debug, Clone, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    /// Wrap already-built events. Empty is allowed here (tests); the loaders reject it.
    pub fn from_events(events: Vec<Event>) -> Self {
        Self { events }
    }

    /// Parse a knowledge base document. Skips malformed records with a warning;
    /// fails when the document itself is invalid or yields no usable event.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let root: Value = serde_json::from_str(s).context("knowledge base is not valid JSON")?;
        let records = match root {
            Value::Array(items) => items,
            Value::Object(mut obj) => match obj.remove("events") {
                Some(Value::Array(items)) => items,
                _ => return Err(anyhow!("knowledge base object has no `events` array")),
            },
            _ => return Err(anyhow!("knowledge base must be a JSON array of events")),
        };

        let mut events = Vec::with_capacity(records.len());
        for (i, rec) in records.iter().enumerate() {
            match Event::from_json(rec) {
                Some(ev) => events.push(ev),
                None => warn!(index = i, "skipping malformed event record"),
            }
        }

        if events.is_empty() {
            return Err(anyhow!("knowledge base contains no usable events"));
        }
        Ok(Self { events })
    }

    /// Load from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading knowledge base from {}", path.display()))?;
        let store = Self::from_json_str(&content)
            .with_context(|| format!("loading knowledge base {}", path.display()))?;
        info!(path = %path.display(), events = store.len(), "knowledge base loaded");
        Ok(store)
    }

    /// Load from `$EVENTS_PATH`, falling back to `data/events.json`.
    pub fn load_default() -> Result<Self> {
        let path = std::env::var(ENV_EVENTS_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_EVENTS_PATH));
        Self::load_from(&path)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.events.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Event> {
        self.events.get(index)
    }

    /// Events dated on/after `today`, ascending by date (load order on ties), at most `limit`.
    pub fn upcoming(&self, today: NaiveDate, limit: usize) -> Vec<&Event> {
        let mut out: Vec<&Event> = self.events.iter().filter(|e| e.is_upcoming(today)).collect();
        out.sort_by_key(|e| e.date);
        out.truncate(limit);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn parses_full_record_and_aliases() {
        let s = r#"[{
            "title": " Tech Fest ",
            "description": "Annual fest",
            "tags": ["Tech", "fest", "tech", 5],
            "date": "2025-03-14",
            "time": "10:00 AM",
            "location": "Main Auditorium",
            "organizer": "CS Club",
            "fee": 100,
            "registration_link": "https://example.edu/fest"
        }]"#;
        let store = EventStore::from_json_str(s).unwrap();
        let ev = store.get(0).unwrap();
        assert_eq!(ev.title, "Tech Fest");
        assert_eq!(ev.tags, vec!["tech", "fest"]);
        assert_eq!(ev.date, Some(d("2025-03-14")));
        assert_eq!(ev.venue.as_deref(), Some("Main Auditorium"));
        assert_eq!(ev.fees.as_deref(), Some("100"));
        assert_eq!(ev.registration_info.as_deref(), Some("https://example.edu/fest"));
    }

    #[test]
    fn bad_fields_degrade_and_bad_records_are_skipped() {
        let s = r#"{"events": [
            {"title": "Quiz", "date": "next friday", "tags": "trivia, general knowledge", "description": 7},
            {"description": "no title"},
            "not an object",
            {"title": "   "}
        ]}"#;
        let store = EventStore::from_json_str(s).unwrap();
        assert_eq!(store.len(), 1);
        let ev = store.get(0).unwrap();
        assert_eq!(ev.date, None);
        assert_eq!(ev.tags, vec!["trivia", "general knowledge"]);
        assert_eq!(ev.description, "7");
    }

    #[test]
    fn empty_or_invalid_documents_fail() {
        assert!(EventStore::from_json_str("[]").is_err());
        assert!(EventStore::from_json_str(r#"[{"nope": 1}]"#).is_err());
        assert!(EventStore::from_json_str("{").is_err());
        assert!(EventStore::from_json_str(r#"{"items": []}"#).is_err());
        assert!(EventStore::from_json_str("42").is_err());
    }

    #[test]
    fn rfc3339_dates_are_truncated() {
        assert_eq!(parse_date("2025-03-14T18:30:00+05:30"), Some(d("2025-03-14")));
        assert_eq!(parse_date("14/03/2025"), None);
    }

    #[test]
    fn upcoming_is_sorted_filtered_and_limited() {
        let store = EventStore::from_events(vec![
            Event { date: Some(d("2025-05-01")), ..Event::new("C") },
            Event { date: Some(d("2024-12-31")), ..Event::new("Past") },
            Event::new("Undated"),
            Event { date: Some(d("2025-01-01")), ..Event::new("A") },
            Event { date: Some(d("2025-02-01")), ..Event::new("B") },
        ]);
        let today = d("2025-01-01");
        let titles: Vec<&str> = store.upcoming(today, 3).iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B", "C"]);
        assert_eq!(store.upcoming(today, 2).len(), 2);
        assert!(store.upcoming(d("2030-01-01"), 3).is_empty());
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = EventStore::load_from(Path::new("__no_such_dir__/events.json")).unwrap_err();
        assert!(format!("{err:#}").contains("reading knowledge base"));
    }
}
