#![forbid(unsafe_code)]

//! Session engine for the repdeck exercise card game.
//!
//! This crate provides:
//! - Domain types (exercises, cards, targets, phases, emotions)
//! - Adaptive difficulty scaling
//! - The per-card phase state machine
//! - The opponent affect model
//! - The session coordinator that composes them, plus catalog and decks

pub mod types;
pub mod error;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod scaling;
pub mod phase;
pub mod affect;
pub mod deck;
pub mod session;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use catalog::{build_default_catalog, get_default_catalog};
pub use config::Config;
pub use scaling::{scale, scale_checked};
pub use phase::{CompletionMode, ExercisePhaseMachine};
pub use affect::{derive, emotion_for_event, EmotionObserver, OpponentAffectModel};
pub use deck::Deck;
pub use session::{ComboStreak, ScoreUpdate, Scoreboard, ScoringRules, SessionCoordinator, Side};
