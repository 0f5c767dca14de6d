//! Core domain types for the repdeck card game.
//!
//! This module defines the fundamental types shared by the session engine:
//! - Exercise definitions and the cards drawn from them
//! - Scaled exercise targets and per-card phases
//! - Opponent emotions and the signals they are derived from

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// ============================================================================
// Exercise Definitions
// ============================================================================

/// Authored exercise content (e.g., "Jumping Jacks")
///
/// Exactly one of `base_reps` / `base_duration` is expected to be set.
/// See [`ExerciseDefinition::validate`] for the strict check.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExerciseDefinition {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub base_reps: Option<u32>,
    /// Baseline duration in seconds
    pub base_duration: Option<u32>,
}

impl ExerciseDefinition {
    /// Rep-based exercise definition
    pub fn reps(id: &str, name: &str, category: &str, base_reps: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            category: category.into(),
            base_reps: Some(base_reps),
            base_duration: None,
        }
    }

    /// Time-based exercise definition
    pub fn timed(id: &str, name: &str, category: &str, base_duration: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            category: category.into(),
            base_reps: None,
            base_duration: Some(base_duration),
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.into();
        self
    }
}

// ============================================================================
// Card Types
// ============================================================================

/// Training category printed on a card
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum CardCategory {
    Cardio,
    Strength,
    Flexibility,
    Mixed,
    Warmup,
    Utility,
}

impl CardCategory {
    pub const ALL: [CardCategory; 6] = [
        CardCategory::Cardio,
        CardCategory::Strength,
        CardCategory::Flexibility,
        CardCategory::Mixed,
        CardCategory::Warmup,
        CardCategory::Utility,
    ];
}

/// Scoring modifier attached to a card
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Special {
    Double,
    Block,
    Steal,
    Bonus,
}

/// Distinguishes cards that require physical execution from the rest
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum CardType {
    #[default]
    Exercise,
    Warmup,
    Utility,
    Power,
}

impl CardType {
    /// Whether the player has to actually perform the exercise
    pub fn requires_execution(self) -> bool {
        matches!(self, CardType::Exercise | CardType::Warmup)
    }
}

/// A drawn, playable card wrapping an exercise definition
///
/// Cards are value objects: created on draw, dropped on resolution.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameCard {
    pub id: String,
    pub exercise: ExerciseDefinition,
    pub points: u32,
    /// Card difficulty, 1..=5
    pub difficulty: u8,
    pub category: CardCategory,
    pub special: Option<Special>,
    pub combo_tag: Option<String>,
    pub card_type: Option<CardType>,
}

impl GameCard {
    /// Effective card type (cards without one are plain exercise cards)
    pub fn card_type(&self) -> CardType {
        self.card_type.unwrap_or_default()
    }

    pub fn requires_execution(&self) -> bool {
        self.card_type().requires_execution()
    }
}

// ============================================================================
// Targets and Phases
// ============================================================================

/// Player-specific target computed once per drawn card
///
/// Serializes as `{"reps": n}` or `{"duration": n}`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseTarget {
    Reps(u32),
    /// Seconds
    Duration(u32),
}

impl ExerciseTarget {
    pub fn is_timed(&self) -> bool {
        matches!(self, ExerciseTarget::Duration(_))
    }
}

impl fmt::Display for ExerciseTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExerciseTarget::Reps(n) => write!(f, "{} reps", n),
            ExerciseTarget::Duration(s) => write!(f, "{} seconds", s),
        }
    }
}

/// Lifecycle stage of one card's execution
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum PhaseState {
    Waiting,
    Countdown { remaining: u8 },
    Active { elapsed: u32 },
    Completed,
}

impl fmt::Display for PhaseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhaseState::Waiting => write!(f, "waiting"),
            PhaseState::Countdown { remaining } => write!(f, "countdown({})", remaining),
            PhaseState::Active { elapsed } => write!(f, "active({})", elapsed),
            PhaseState::Completed => write!(f, "completed"),
        }
    }
}

// ============================================================================
// Opponent Affect
// ============================================================================

/// Discrete emotion displayed by the simulated opponent
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum Emotion {
    #[default]
    Neutral,
    Confident,
    Determined,
    Focused,
    Celebratory,
    Frustrated,
    Thinking,
    Surprised,
}

impl Emotion {
    /// Short speech line shown while the emotion is visible
    pub fn quip(self) -> &'static str {
        match self {
            Emotion::Neutral => "Let's see what you've got.",
            Emotion::Confident => "I've got this one in the bag.",
            Emotion::Determined => "Not bad. I'm coming back for you.",
            Emotion::Focused => "Neck and neck. No mistakes now.",
            Emotion::Celebratory => "Yes! Did you see that?",
            Emotion::Frustrated => "Ugh, lucky draw.",
            Emotion::Thinking => "Hmm, which card next...",
            Emotion::Surprised => "Whoa, where did that come from?",
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Emotion::Neutral => "neutral",
            Emotion::Confident => "confident",
            Emotion::Determined => "determined",
            Emotion::Focused => "focused",
            Emotion::Celebratory => "celebratory",
            Emotion::Frustrated => "frustrated",
            Emotion::Thinking => "thinking",
            Emotion::Surprised => "surprised",
        };
        f.write_str(name)
    }
}

/// Currently displayed emotion and the end of its visibility window
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct AffectState {
    pub emotion: Emotion,
    pub visible_until: Option<DateTime<Utc>>,
}

/// Which deck the session is drawing from
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeckType {
    #[default]
    Standard,
    Cardio,
    Strength,
    Flexibility,
    Warmup,
}

impl DeckType {
    pub const ALL: [DeckType; 5] = [
        DeckType::Standard,
        DeckType::Cardio,
        DeckType::Strength,
        DeckType::Flexibility,
        DeckType::Warmup,
    ];

    /// Whether cards of this category belong in the deck
    pub fn includes(self, category: CardCategory) -> bool {
        match self {
            DeckType::Standard => category != CardCategory::Warmup,
            DeckType::Cardio => matches!(category, CardCategory::Cardio | CardCategory::Mixed),
            DeckType::Strength => {
                matches!(category, CardCategory::Strength | CardCategory::Mixed)
            }
            DeckType::Flexibility => category == CardCategory::Flexibility,
            DeckType::Warmup => category == CardCategory::Warmup,
        }
    }
}

impl std::str::FromStr for DeckType {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().as_str() {
            "standard" => Ok(DeckType::Standard),
            "cardio" => Ok(DeckType::Cardio),
            "strength" => Ok(DeckType::Strength),
            "flexibility" => Ok(DeckType::Flexibility),
            "warmup" => Ok(DeckType::Warmup),
            other => Err(crate::Error::Config(format!("Unknown deck type: {}", other))),
        }
    }
}

/// Live game signals fed into the affect model on every change
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct SessionSignals {
    pub player_score: i64,
    pub ai_score: i64,
    pub is_opponent_turn: bool,
    pub deck_type: DeckType,
    pub explicit_emotion_override: Option<Emotion>,
}

/// One-shot game events the opponent reacts to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameEvent {
    GameStart,
    OpponentScored,
    PlayerScored,
    Tie,
    GameOver,
}

// ============================================================================
// Catalog Type
// ============================================================================

/// The complete catalog of exercises and card templates
#[derive(Clone, Debug)]
pub struct Catalog {
    pub exercises: HashMap<String, ExerciseDefinition>,
    pub cards: HashMap<String, GameCard>,
}
