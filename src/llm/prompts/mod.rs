// ABOUTME: System prompts for completion calls, loaded at compile time from markdown
// ABOUTME: Intent classification prompt requesting a single JSON object with intent, slots, and reply
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # System Prompts
//!
//! Prompts live in markdown files next to this module for easy editing.

/// Intent classification prompt
///
/// Lists the closed intent taxonomy, the slot vocabulary (body parts,
/// directions, weekday names, ISO dates), and the exact JSON shape expected back.
pub const INTENT_CLASSIFIER_PROMPT: &str = include_str!("intent_classifier.md");

/// System prompt for the intent classifier
#[must_use]
pub const fn get_intent_system_prompt() -> &'static str {
    INTENT_CLASSIFIER_PROMPT
}
