// ABOUTME: Conversational intent taxonomy, extracted slots, and the classification result
// ABOUTME: Bridges free-text messages to structured adaptation triggers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Intent Classification
//!
//! [`IntentClassifier`] maps a message and its conversation history onto the
//! closed [`Intent`] taxonomy plus [`IntentSlots`]. The completion service
//! does the classification; keyword extraction fills any slots it left empty.
//! Failures of the service never reach the caller: the result degrades to
//! [`Intent::Unknown`] with the configured fallback reply.

mod classifier;
mod slots;

pub use classifier::IntentClassifier;
pub use slots::{extract_slots, parse_model_output, ModelOutput};

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

use pierre_training_core::models::{BodyPart, DifficultyDirection};

/// Classified purpose of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Why a workout is in the plan
    WorkoutRationale,
    /// Pain, injury, or limitation
    InjuryReport,
    /// Easier/harder request or goal-date move
    PlanModification,
    /// New training days
    ScheduleChange,
    /// Encouragement
    Motivation,
    /// Other training question
    GeneralQuestion,
    /// Unrelated to training
    OutOfScope,
    /// Not classifiable, or the service failed
    Unknown,
}

impl Intent {
    /// All intents in declaration order
    pub const ALL: [Self; 8] = [
        Self::WorkoutRationale,
        Self::InjuryReport,
        Self::PlanModification,
        Self::ScheduleChange,
        Self::Motivation,
        Self::GeneralQuestion,
        Self::OutOfScope,
        Self::Unknown,
    ];

    /// Label used in prompts and model output
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::WorkoutRationale => "workout_rationale",
            Self::InjuryReport => "injury_report",
            Self::PlanModification => "plan_modification",
            Self::ScheduleChange => "schedule_change",
            Self::Motivation => "motivation",
            Self::GeneralQuestion => "general_question",
            Self::OutOfScope => "out_of_scope",
            Self::Unknown => "unknown",
        }
    }

    /// Parse a label leniently (case, spaces, and hyphens ignored); unknown labels give `Unknown`
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        let normalized = label.trim().to_lowercase().replace([' ', '-'], "_");
        Self::ALL
            .into_iter()
            .find(|intent| intent.as_str() == normalized)
            .unwrap_or(Self::Unknown)
    }

    /// Whether this intent can lead to a plan adaptation
    #[must_use]
    pub const fn is_actionable(&self) -> bool {
        matches!(
            self,
            Self::InjuryReport | Self::PlanModification | Self::ScheduleChange
        )
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters extracted from a message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentSlots {
    /// Injured body part
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_part: Option<BodyPart>,
    /// Requested difficulty direction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<DifficultyDirection>,
    /// Days the athlete can train
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub days: Vec<Weekday>,
    /// New goal date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_date: Option<NaiveDate>,
}

impl IntentSlots {
    /// Fill empty slots from `other`, keeping values already present
    pub fn fill_from(&mut self, other: Self) {
        self.body_part = self.body_part.or(other.body_part);
        self.direction = self.direction.or(other.direction);
        if self.days.is_empty() {
            self.days = other.days;
        }
        self.target_date = self.target_date.or(other.target_date);
    }

    /// Whether no slot is filled
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.body_part.is_none()
            && self.direction.is_none()
            && self.days.is_empty()
            && self.target_date.is_none()
    }
}

/// Outcome of classifying one message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    /// Classified intent
    pub intent: Intent,
    /// Extracted parameters
    pub slots: IntentSlots,
    /// Reply for the athlete
    pub reply: String,
    /// `true` when the completion service failed and the fallback was used
    pub degraded: bool,
    /// Prompt tokens consumed (0 when degraded)
    pub prompt_tokens: u32,
    /// Completion tokens generated (0 when degraded)
    pub completion_tokens: u32,
}

impl Classification {
    /// Fallback result used when the completion service cannot be reached
    #[must_use]
    pub fn fallback(message: &str) -> Self {
        Self {
            intent: Intent::Unknown,
            slots: IntentSlots::default(),
            reply: message.to_owned(),
            degraded: true,
            prompt_tokens: 0,
            completion_tokens: 0,
        }
    }
}
