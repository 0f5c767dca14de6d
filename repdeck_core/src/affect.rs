//! Opponent affect model.
//!
//! Derives the simulated opponent's displayed emotion from live game
//! signals, and debounces visible reactions:
//! - Continuous channel: [`derive`] re-evaluated whenever signals change
//! - Event channel: [`emotion_for_event`] for one-shot reactions
//! - Display: a change opens a fixed visibility window and notifies the
//!   observer once; re-deriving the same emotion does nothing
//!
//! The two channels are not reconciled. Whichever writes last is displayed.

use crate::{AffectState, Emotion, GameEvent, SessionSignals};
use chrono::{DateTime, Duration, Utc};
use std::fmt;

/// Default length of the visibility window, in milliseconds
pub const DEFAULT_VISIBILITY_WINDOW_MS: u64 = 3000;

/// Score lead beyond which a side is considered clearly ahead
const CLEAR_LEAD: i64 = 2;

/// Score gap within which the game is considered close
const CLOSE_GAP: i64 = 1;

/// Receives `(previous, current)` once per displayed emotion change
pub trait EmotionObserver {
    fn on_emotion_change(&mut self, previous: Emotion, current: Emotion);
}

impl<F> EmotionObserver for F
where
    F: FnMut(Emotion, Emotion),
{
    fn on_emotion_change(&mut self, previous: Emotion, current: Emotion) {
        self(previous, current)
    }
}

/// Derive the opponent's emotion from the current signals
///
/// First match wins:
/// 1. explicit override, when it differs from `previous`
/// 2. opponent's turn => thinking
/// 3. opponent ahead by more than 2 => confident
/// 4. player ahead by more than 2 => determined
/// 5. within 1 point => focused
/// 6. otherwise neutral
pub fn derive(signals: &SessionSignals, previous: Emotion) -> Emotion {
    if let Some(explicit) = signals
        .explicit_emotion_override
        .filter(|explicit| *explicit != previous)
    {
        tracing::debug!("Explicit emotion override: {} -> {}", previous, explicit);
        return explicit;
    }

    if signals.is_opponent_turn {
        return Emotion::Thinking;
    }

    let lead = signals.ai_score - signals.player_score;
    if lead > CLEAR_LEAD {
        Emotion::Confident
    } else if -lead > CLEAR_LEAD {
        Emotion::Determined
    } else if lead.abs() <= CLOSE_GAP {
        Emotion::Focused
    } else {
        Emotion::Neutral
    }
}

/// Map a one-shot game event to a reaction
pub fn emotion_for_event(event: GameEvent, ai_score: i64, player_score: i64) -> Emotion {
    match event {
        GameEvent::GameStart => Emotion::Confident,
        GameEvent::OpponentScored => Emotion::Celebratory,
        GameEvent::PlayerScored if player_score > ai_score => Emotion::Frustrated,
        GameEvent::PlayerScored => Emotion::Surprised,
        GameEvent::Tie => Emotion::Focused,
        GameEvent::GameOver if ai_score > player_score => Emotion::Celebratory,
        GameEvent::GameOver if player_score > ai_score => Emotion::Frustrated,
        GameEvent::GameOver => Emotion::Focused,
    }
}

/// Displayed opponent emotion with its visibility window
pub struct OpponentAffectModel {
    state: AffectState,
    window: Duration,
    observer: Option<Box<dyn EmotionObserver>>,
}

impl fmt::Debug for OpponentAffectModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpponentAffectModel")
            .field("state", &self.state)
            .field("window", &self.window)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

impl Default for OpponentAffectModel {
    fn default() -> Self {
        Self::new(DEFAULT_VISIBILITY_WINDOW_MS)
    }
}

impl OpponentAffectModel {
    pub fn new(visibility_window_ms: u64) -> Self {
        let window_ms = visibility_window_ms.min(u64::from(u32::MAX)) as i64;
        Self {
            state: AffectState::default(),
            window: Duration::milliseconds(window_ms),
            observer: None,
        }
    }

    /// Register the `onEmotionChange` observer, replacing any previous one
    pub fn set_observer<O>(&mut self, observer: O)
    where
        O: EmotionObserver + 'static,
    {
        self.observer = Some(Box::new(observer));
    }

    pub fn state(&self) -> AffectState {
        self.state
    }

    pub fn emotion(&self) -> Emotion {
        self.state.emotion
    }

    /// Apply a newly derived emotion to the display
    ///
    /// Returns true when the displayed emotion actually changed. A change
    /// opens a fresh window (replacing any open one) and fires the observer.
    pub fn update_displayed(&mut self, newly_derived: Emotion, now: DateTime<Utc>) -> bool {
        let previous = self.state.emotion;
        if newly_derived == previous {
            return false;
        }

        self.state = AffectState {
            emotion: newly_derived,
            visible_until: Some(now + self.window),
        };
        tracing::debug!("Opponent emotion {} -> {}", previous, newly_derived);

        if let Some(observer) = self.observer.as_mut() {
            observer.on_emotion_change(previous, newly_derived);
        }
        true
    }

    /// Re-derive from signals and update the display
    pub fn refresh(&mut self, signals: &SessionSignals, now: DateTime<Utc>) -> bool {
        let derived = derive(signals, self.state.emotion);
        self.update_displayed(derived, now)
    }

    /// Apply a one-shot event reaction to the display
    pub fn react(
        &mut self,
        event: GameEvent,
        ai_score: i64,
        player_score: i64,
        now: DateTime<Utc>,
    ) -> bool {
        let emotion = emotion_for_event(event, ai_score, player_score);
        self.update_displayed(emotion, now)
    }

    /// Whether the reaction window is still open at `now`
    pub fn is_visible(&self, now: DateTime<Utc>) -> bool {
        self.state.visible_until.is_some_and(|until| now < until)
    }

    /// Close the window if it has run out; returns true if it was closed
    pub fn expire(&mut self, now: DateTime<Utc>) -> bool {
        match self.state.visible_until {
            Some(until) if now >= until => {
                self.state.visible_until = None;
                true
            }
            _ => false,
        }
    }

    /// Speech line to show at `now`, if any
    pub fn visible_quip(&self, now: DateTime<Utc>) -> Option<&'static str> {
        self.is_visible(now).then(|| self.state.emotion.quip())
    }
}
