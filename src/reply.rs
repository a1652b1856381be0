// src/reply.rs
//! Reply composition: intent-keyed templates filled from the best event, plus the
//! "next N upcoming events" listing used for `NEXT` questions and as fallback.
//!
//! Placeholders: `{title} {date} {time} {when} {venue} {organizer} {fees}
//! {registration} {description}`. `{when}` is the date with " at {time}" appended
//! when a time is known. Unknown placeholders are left as-is.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Deserialize;

use crate::intent::Intent;
use crate::store::Event;

static PLACEHOLDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([a-z_]+)\}").expect("placeholder regex"));

pub const EMPTY_QUESTION_REPLY: &str = "Please type a question about a college event.";
pub const GREETING_REPLY: &str = "Hi! Ask me about college events - try 'when is the tech fest?' or 'how to register for hackathon?'";
pub const NOT_FOUND_PREFIX: &str =
    "I couldn't find that event. Try including the event name (e.g., 'tech fest', 'hackathon').";
pub const NO_UPCOMING_REPLY: &str = "There are no upcoming events right now. Please check back later.";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Templates {
    pub when: String,
    pub r#where: String,
    pub register: String,
    pub who: String,
    pub what: String,
    /// Confident match but no recognizable intent.
    pub found: String,
    /// Header line of the upcoming listing.
    pub upcoming_header: String,
    /// One line per listed event.
    pub upcoming_item: String,
}

impl Default for Templates {
    fn default() -> Self {
        Self {
            when: "📅 {title} is scheduled on {when}.".into(),
            r#where: "📍 Venue: {venue} (for {title}).".into(),
            register: "📝 Registration for {title} | Fee: {fees} | {registration}".into(),
            who: "👥 Organized by {organizer} for {title}.".into(),
            what: "ℹ️ {title}: {description}".into(),
            found: "Here's what I found: {title} - {when} at {venue}. Register: {registration}\nAbout: {description}".into(),
            upcoming_header: "🗓️ Upcoming events:".into(),
            upcoming_item: "• {title} - {when} - {venue}".into(),
        }
    }
}

impl Templates {
    /// Template for a confident match under `intent`.
    pub fn for_intent(&self, intent: Intent) -> &str {
        match intent {
            Intent::When => &self.when,
            Intent::Where => &self.r#where,
            Intent::Register => &self.register,
            Intent::Who => &self.who,
            Intent::What => &self.what,
            Intent::Next | Intent::Unknown => &self.found,
        }
    }
}

/// `14 Mar 2025`, or a placeholder when unknown.
pub fn format_date(date: Option<NaiveDate>) -> String {
    match date {
        Some(d) => d.format("%d %b %Y").to_string(),
        None => "date to be announced".to_string(),
    }
}

fn format_when(ev: &Event) -> String {
    let d = format_date(ev.date);
    match ev.time.as_deref() {
        Some(t) => format!("{d} at {t}"),
        None => d,
    }
}

/// Substitute every known `{placeholder}` with the event's field (or a friendly default).
pub fn render(template: &str, ev: &Event) -> String {
    PLACEHOLDER_RE
        .replace_all(template, |caps: &Captures| {
            match &caps[1] {
                "title" => ev.title.clone(),
                "date" => format_date(ev.date),
                "time" => ev.time.clone().unwrap_or_else(|| "time to be announced".into()),
                "when" => format_when(ev),
                "venue" => ev.venue.clone().unwrap_or_else(|| "venue to be announced".into()),
                "organizer" => ev
                    .organizer
                    .clone()
                    .unwrap_or_else(|| "the organizing team".into()),
                "fees" => ev.fees.clone().unwrap_or_else(|| "not announced".into()),
                "registration" => ev
                    .registration_info
                    .clone()
                    .unwrap_or_else(|| "Registration details will be announced soon.".into()),
                "description" => {
                    if ev.description.is_empty() {
                        "No description available yet.".into()
                    } else {
                        ev.description.clone()
                    }
                }
                _ => caps[0].to_string(),
            }
        })
        .into_owned()
}

#[derive(Debug, Clone, Default)]
pub struct Composer {
    templates: Templates,
}

impl Composer {
    pub fn new(templates: Templates) -> Self {
        Self { templates }
    }

    pub fn templates(&self) -> &Templates {
        &self.templates
    }

    /// Reply for a confident match.
    pub fn compose_match(&self, intent: Intent, ev: &Event) -> String {
        render(self.templates.for_intent(intent), ev)
    }

    /// Upcoming listing over already-selected events (date-ascending).
    pub fn compose_upcoming(&self, events: &[&Event]) -> String {
        if events.is_empty() {
            return NO_UPCOMING_REPLY.to_string();
        }
        let mut lines = Vec::with_capacity(events.len() + 1);
        lines.push(self.templates.upcoming_header.clone());
        for ev in events {
            lines.push(render(&self.templates.upcoming_item, ev));
        }
        lines.join("\n")
    }

    /// No confident match: hint, then the upcoming listing.
    pub fn compose_fallback(&self, upcoming: &[&Event]) -> String {
        format!("{NOT_FOUND_PREFIX}\n\n{}", self.compose_upcoming(upcoming))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn workshop() -> Event {
        Event {
            description: "Hands-on ML".into(),
            date: Some(d("2025-04-02")),
            time: Some("2:00 PM".into()),
            venue: Some("Lab 3".into()),
            organizer: Some("AI Club".into()),
            fees: Some("₹200".into()),
            registration_info: Some("https://example.edu/ml".into()),
            ..Event::new("ML Workshop")
        }
    }

    #[test]
    fn intent_templates_fill_fields() {
        let c = Composer::default();
        let ev = workshop();
        assert_eq!(
            c.compose_match(Intent::When, &ev),
            "📅 ML Workshop is scheduled on 02 Apr 2025 at 2:00 PM."
        );
        assert_eq!(c.compose_match(Intent::Where, &ev), "📍 Venue: Lab 3 (for ML Workshop).");
        assert_eq!(
            c.compose_match(Intent::Register, &ev),
            "📝 Registration for ML Workshop | Fee: ₹200 | https://example.edu/ml"
        );
        assert_eq!(c.compose_match(Intent::Who, &ev), "👥 Organized by AI Club for ML Workshop.");
        assert_eq!(c.compose_match(Intent::What, &ev), "ℹ️ ML Workshop: Hands-on ML");
        assert!(c.compose_match(Intent::Unknown, &ev).starts_with("Here's what I found: ML Workshop"));
    }

    #[test]
    fn missing_fields_render_defaults() {
        let c = Composer::default();
        let ev = Event::new("Mystery Meetup");
        assert_eq!(
            c.compose_match(Intent::When, &ev),
            "📅 Mystery Meetup is scheduled on date to be announced."
        );
        assert!(c.compose_match(Intent::Who, &ev).contains("the organizing team"));
        assert!(c
            .compose_match(Intent::Register, &ev)
            .contains("Registration details will be announced soon."));
        assert!(c.compose_match(Intent::What, &ev).contains("No description available yet."));
    }

    #[test]
    fn unknown_placeholders_are_kept() {
        let ev = Event::new("X");
        assert_eq!(render("{title} {nope} {Title}", &ev), "X {nope} {Title}");
    }

    #[test]
    fn upcoming_listing_and_empty_message() {
        let c = Composer::default();
        let a = Event { date: Some(d("2025-01-05")), venue: Some("Hall A".into()), ..Event::new("A") };
        let b = Event { date: Some(d("2025-01-09")), ..Event::new("B") };
        let out = c.compose_upcoming(&[&a, &b]);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "• A - 05 Jan 2025 - Hall A");
        assert_eq!(lines[2], "• B - 09 Jan 2025 - venue to be announced");
        assert_eq!(c.compose_upcoming(&[]), NO_UPCOMING_REPLY);
        assert!(c.compose_fallback(&[]).starts_with(NOT_FOUND_PREFIX));
        assert!(c.compose_fallback(&[]).ends_with(NO_UPCOMING_REPLY));
    }

    #[test]
    fn custom_templates_are_used() {
        let c = Composer::new(Templates {
            r#where: "Head to {venue}.".into(),
            ..Templates::default()
        });
        assert_eq!(c.compose_match(Intent::Where, &workshop()), "Head to Lab 3.");
    }
}
