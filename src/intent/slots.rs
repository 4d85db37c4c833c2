// ABOUTME: Lenient parsing of completion output and keyword-based slot extraction
// ABOUTME: Regex heuristics fill body part, direction, weekdays, and ISO dates the model left empty
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::LazyLock;

use chrono::{NaiveDate, Weekday};
use regex::Regex;
use serde::Deserialize;

use pierre_training_core::models::{BodyPart, DifficultyDirection, WEEKDAYS};

use super::{Intent, IntentSlots};

/// Body-part keywords; a bare `back` only counts with a possessive (`back off` is a direction)
static BODY_PART_PATTERNS: LazyLock<Vec<(BodyPart, Option<Regex>)>> = LazyLock::new(|| {
    [
        (BodyPart::LowerBack, r"(?i)\b(lower[\s_-]?back|lumbar|(my|the) back)\b"),
        (BodyPart::Knee, r"(?i)\b(knees?|patella|acl|mcl|meniscus|it[\s-]?band)\b"),
        (BodyPart::Ankle, r"(?i)\b(ankles?|foot|feet|achilles|heel|plantar)\b"),
        (BodyPart::Hip, r"(?i)\b(hips?|groin|glutes?|hamstrings?)\b"),
        (BodyPart::Shoulder, r"(?i)\b(shoulders?|rotator[\s-]?cuff)\b"),
        (BodyPart::Wrist, r"(?i)\b(wrists?|elbows?|forearms?)\b"),
        (BodyPart::Neck, r"(?i)\b(neck)\b"),
    ]
    .into_iter()
    .map(|(part, pattern)| (part, Regex::new(pattern).ok()))
    .collect()
});

static EASIER_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(too (hard|difficult|intense|much)|easier|ease (off|up)|back off|lighter|dial (it )?back|exhausted|overtrain\w*)\b").ok()
});

static HARDER_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(too (easy|light)|harder|more (challenging|intense)|step it up|push me|not challenging)\b").ok()
});

static WEEKDAY_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)\b(mondays?|tuesdays?|wednesdays?|thursdays?|fridays?|saturdays?|sundays?",
        r"|mon|tues?|wed|thu(rs?)?|fri|sat|sun|weekends?|weekdays?)\b",
    ))
    .ok()
});

static ISO_DATE_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\b(\d{4}-\d{2}-\d{2})\b").ok());

/// Parsed completion: intent label, slots, and reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelOutput {
    /// Classified intent (`Unknown` for unrecognised labels)
    pub intent: Intent,
    /// Slots the model filled
    pub slots: IntentSlots,
    /// Reply text (may be empty)
    pub reply: String,
}

#[derive(Debug, Deserialize)]
struct RawOutput {
    intent: String,
    #[serde(default)]
    slots: RawSlots,
    #[serde(default)]
    reply: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawSlots {
    #[serde(default)]
    body_part: Option<String>,
    #[serde(default)]
    direction: Option<String>,
    #[serde(default)]
    days: Option<Vec<String>>,
    #[serde(default)]
    target_date: Option<String>,
}

impl RawSlots {
    fn into_slots(self) -> IntentSlots {
        let body_part = self.body_part.as_deref().and_then(parse_body_part);
        let direction = self
            .direction
            .as_deref()
            .and_then(|value| match value.trim().to_lowercase().as_str() {
                "easier" | "easy" | "down" => Some(DifficultyDirection::Easier),
                "harder" | "hard" | "up" => Some(DifficultyDirection::Harder),
                _ => None,
            });
        let days = sorted_days(
            self.days
                .unwrap_or_default()
                .iter()
                .flat_map(|day| expand_day_word(day)),
        );
        let target_date = self
            .target_date
            .as_deref()
            .and_then(|value| NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok());
        IntentSlots {
            body_part,
            direction,
            days,
            target_date,
        }
    }
}

/// Parse the JSON object embedded in a completion
///
/// Text around the outermost braces (code fences, preambles) is ignored.
/// Returns `None` when no object with an `intent` field can be decoded.
#[must_use]
pub fn parse_model_output(text: &str) -> Option<ModelOutput> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    let raw: RawOutput = serde_json::from_str(&text[start..=end]).ok()?;
    Some(ModelOutput {
        intent: Intent::from_label(&raw.intent),
        slots: raw.slots.into_slots(),
        reply: raw.reply.unwrap_or_default().trim().to_owned(),
    })
}

/// Keyword extraction over the raw message
#[must_use]
pub fn extract_slots(message: &str) -> IntentSlots {
    IntentSlots {
        body_part: extract_body_part(message),
        direction: extract_direction(message),
        days: extract_days(message),
        target_date: extract_date(message),
    }
}

fn parse_body_part(value: &str) -> Option<BodyPart> {
    let normalized = value.trim().to_lowercase().replace([' ', '-'], "_");
    BodyPart::ALL
        .into_iter()
        .find(|part| part.as_str() == normalized)
        .or_else(|| extract_body_part(value))
}

/// Earliest body part mentioned in the message
fn extract_body_part(message: &str) -> Option<BodyPart> {
    BODY_PART_PATTERNS
        .iter()
        .filter_map(|(part, pattern)| {
            pattern
                .as_ref()
                .and_then(|re| re.find(message))
                .map(|found| (found.start(), *part))
        })
        .min_by_key(|(position, _)| *position)
        .map(|(_, part)| part)
}

/// Direction of the earliest difficulty phrase
fn extract_direction(message: &str) -> Option<DifficultyDirection> {
    let position = |pattern: &LazyLock<Option<Regex>>| {
        pattern
            .as_ref()
            .and_then(|re| re.find(message))
            .map(|found| found.start())
    };
    match (position(&EASIER_PATTERN), position(&HARDER_PATTERN)) {
        (Some(easier), Some(harder)) if harder < easier => Some(DifficultyDirection::Harder),
        (Some(_), _) => Some(DifficultyDirection::Easier),
        (None, Some(_)) => Some(DifficultyDirection::Harder),
        (None, None) => None,
    }
}

fn extract_days(message: &str) -> Vec<Weekday> {
    let Some(re) = WEEKDAY_PATTERN.as_ref() else {
        return Vec::new();
    };
    sorted_days(
        re.find_iter(message)
            .flat_map(|found| expand_day_word(found.as_str())),
    )
}

fn extract_date(message: &str) -> Option<NaiveDate> {
    ISO_DATE_PATTERN
        .as_ref()?
        .find_iter(message)
        .find_map(|found| NaiveDate::parse_from_str(found.as_str(), "%Y-%m-%d").ok())
}

/// Weekdays named by one word (`weekends` expands to Saturday and Sunday)
fn expand_day_word(word: &str) -> Vec<Weekday> {
    let lower = word.trim().to_lowercase();
    let singular = lower.trim_end_matches('s');
    match singular {
        "weekend" => vec![Weekday::Sat, Weekday::Sun],
        "weekday" => WEEKDAYS[..5].to_vec(),
        _ => {
            let stem: String = singular.chars().take(3).collect();
            WEEKDAYS
                .into_iter()
                .filter(|day| day.to_string().to_lowercase() == stem)
                .collect()
        }
    }
}

fn sorted_days(days: impl Iterator<Item = Weekday>) -> Vec<Weekday> {
    let mut days: Vec<Weekday> = days.collect();
    days.sort_by_key(Weekday::num_days_from_monday);
    days.dedup();
    days
}
