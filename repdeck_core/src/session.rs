//! Session coordinator.
//!
//! Composes scaling, the phase machine and the affect model for one game:
//! - On draw, the target is scaled once and cached for the card's lifetime
//! - Card operations delegate to that card's [`ExercisePhaseMachine`]
//! - Resolving a completed card feeds its points into the running totals
//!
//! The coordinator is not reentrant. Callers serialize ticks with user input.

use crate::affect::{EmotionObserver, OpponentAffectModel};
use crate::phase::{CompletionMode, ExercisePhaseMachine};
use crate::scaling::scale_checked;
use crate::{
    AffectState, Config, DeckType, Emotion, Error, ExerciseTarget, GameCard, GameEvent,
    PhaseState, Result, SessionSignals, Special,
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Which side of the table a card belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Player,
    Opponent,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::Player => Side::Opponent,
            Side::Opponent => Side::Player,
        }
    }
}

/// Amounts used by special abilities
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScoringRules {
    pub bonus_points: u32,
    pub steal_points: u32,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            bonus_points: 2,
            steal_points: 2,
        }
    }
}

/// Outcome of resolving one card
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScoreUpdate {
    pub side: Side,
    pub card_id: String,
    pub base_points: u32,
    /// Points added to `side` before any steal
    pub awarded: u32,
    /// Points taken from the other side
    pub stolen: u32,
    /// Special that took effect, if any
    pub special_applied: Option<Special>,
    /// Special cancelled by the other side's block
    pub special_blocked: Option<Special>,
}

/// Running totals for both sides
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Scoreboard {
    pub player: u32,
    pub ai: u32,
    player_block_armed: bool,
    ai_block_armed: bool,
}

impl Scoreboard {
    pub fn total(&self, side: Side) -> u32 {
        match side {
            Side::Player => self.player,
            Side::Opponent => self.ai,
        }
    }

    /// Whether `side` holds a block against the other's next special
    pub fn block_armed(&self, side: Side) -> bool {
        match side {
            Side::Player => self.player_block_armed,
            Side::Opponent => self.ai_block_armed,
        }
    }

    fn total_mut(&mut self, side: Side) -> &mut u32 {
        match side {
            Side::Player => &mut self.player,
            Side::Opponent => &mut self.ai,
        }
    }

    fn block_mut(&mut self, side: Side) -> &mut bool {
        match side {
            Side::Player => &mut self.player_block_armed,
            Side::Opponent => &mut self.ai_block_armed,
        }
    }

    /// Add a resolved card's points to `side`, applying its special
    pub fn award(&mut self, side: Side, card: &GameCard, rules: &ScoringRules) -> ScoreUpdate {
        let base = card.points;
        let mut update = ScoreUpdate {
            side,
            card_id: card.id.clone(),
            base_points: base,
            awarded: base,
            stolen: 0,
            special_applied: None,
            special_blocked: None,
        };

        let special = match card.special {
            Some(special) if self.block_armed(side.other()) => {
                *self.block_mut(side.other()) = false;
                update.special_blocked = Some(special);
                None
            }
            special => special,
        };

        match special {
            Some(Special::Double) => update.awarded = base.saturating_mul(2),
            Some(Special::Bonus) => update.awarded = base.saturating_add(rules.bonus_points),
            Some(Special::Steal) => {
                let other = self.total_mut(side.other());
                update.stolen = rules.steal_points.min(*other);
                *other -= update.stolen;
            }
            Some(Special::Block) => *self.block_mut(side) = true,
            None => {}
        }
        update.special_applied = special;

        let total = self.total_mut(side);
        *total = total.saturating_add(update.awarded).saturating_add(update.stolen);
        update
    }
}

/// Consecutive player cards sharing a combo tag
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComboStreak {
    pub tag: String,
    pub length: u32,
}

/// The card currently in play
#[derive(Clone, Debug)]
struct CardInPlay {
    card: GameCard,
    target: ExerciseTarget,
    machine: ExercisePhaseMachine,
}

/// One game against the simulated opponent
#[derive(Debug)]
pub struct SessionCoordinator {
    id: Uuid,
    deck_type: DeckType,
    rules: ScoringRules,
    scoreboard: Scoreboard,
    turn: Side,
    current: Option<CardInPlay>,
    affect: OpponentAffectModel,
    combo: Option<ComboStreak>,
    cards_resolved: u32,
}

impl SessionCoordinator {
    pub fn new(deck_type: DeckType, rules: ScoringRules, visibility_window_ms: u64) -> Self {
        let id = Uuid::new_v4();
        tracing::info!("Starting session {} with {:?} deck", id, deck_type);
        Self {
            id,
            deck_type,
            rules,
            scoreboard: Scoreboard::default(),
            turn: Side::Player,
            current: None,
            affect: OpponentAffectModel::new(visibility_window_ms),
            combo: None,
            cards_resolved: 0,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let rules = ScoringRules {
            bonus_points: config.scoring.bonus_points,
            steal_points: config.scoring.steal_points,
        };
        Self::new(config.game.deck, rules, config.affect.visibility_window_ms)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn set_emotion_observer<O>(&mut self, observer: O)
    where
        O: EmotionObserver + 'static,
    {
        self.affect.set_observer(observer);
    }

    // ------------------------------------------------------------------------
    // Card lifecycle
    // ------------------------------------------------------------------------

    /// Put a freshly drawn card into play
    ///
    /// `difficulty_level` is snapshotted here: the scaled target stays fixed
    /// until the card is resolved or discarded.
    pub fn draw_card(&mut self, card: GameCard, difficulty_level: i32) -> Result<ExerciseTarget> {
        if let Some(current) = &self.current {
            return Err(Error::CardInProgress(current.card.id.clone()));
        }

        let target = scale_checked(&card.exercise, difficulty_level)?;
        tracing::info!(
            "Drew '{}' ({}) at level {}: {}",
            card.id,
            card.exercise.name,
            difficulty_level,
            target
        );

        let machine = ExercisePhaseMachine::new(target, card.card_type());
        self.current = Some(CardInPlay {
            card,
            target,
            machine,
        });
        Ok(target)
    }

    pub fn begin_card(&mut self) -> Result<PhaseState> {
        self.machine_mut()?.begin()
    }

    pub fn tick(&mut self) -> Result<PhaseState> {
        self.machine_mut()?.tick()
    }

    pub fn complete_card(&mut self) -> Result<PhaseState> {
        self.machine_mut()?.complete()
    }

    /// Skip the rest of the card; `authorized` comes from the caller
    pub fn skip_card(&mut self, authorized: bool) -> Result<PhaseState> {
        self.machine_mut()?.skip(authorized)
    }

    pub fn reset_card(&mut self) -> Result<PhaseState> {
        self.machine_mut()?.reset()
    }

    /// Submit the completed card and score it for the player
    pub fn resolve_card(&mut self) -> Result<ScoreUpdate> {
        let state = self.phase().ok_or(Error::NoActiveCard)?;
        if state != PhaseState::Completed {
            return Err(Error::IllegalTransition {
                operation: "resolve",
                state,
            });
        }

        let in_play = self.current.take().ok_or(Error::NoActiveCard)?;
        self.track_combo(&in_play.card);
        let update = self.scoreboard.award(Side::Player, &in_play.card, &self.rules);
        self.finish_turn(&update);
        Ok(update)
    }

    /// Drop the current card without scoring it
    pub fn discard_card(&mut self) -> Result<GameCard> {
        let in_play = self.current.take().ok_or(Error::NoActiveCard)?;
        tracing::info!("Discarded '{}' while {}", in_play.card.id, in_play.machine.state());
        Ok(in_play.card)
    }

    /// Score a card played by the simulated opponent
    pub fn resolve_opponent_card(&mut self, card: &GameCard) -> ScoreUpdate {
        let update = self.scoreboard.award(Side::Opponent, card, &self.rules);
        self.finish_turn(&update);
        update
    }

    fn finish_turn(&mut self, update: &ScoreUpdate) {
        self.cards_resolved += 1;
        self.turn = update.side.other();
        tracing::info!(
            "{:?} scored {} (+{} stolen) with '{}'; score {}-{}",
            update.side,
            update.awarded,
            update.stolen,
            update.card_id,
            self.scoreboard.player,
            self.scoreboard.ai
        );
    }

    fn track_combo(&mut self, card: &GameCard) {
        self.combo = match (&card.combo_tag, self.combo.take()) {
            (Some(tag), Some(streak)) if &streak.tag == tag => Some(ComboStreak {
                tag: streak.tag,
                length: streak.length + 1,
            }),
            (Some(tag), _) => Some(ComboStreak {
                tag: tag.clone(),
                length: 1,
            }),
            (None, _) => None,
        };
    }

    fn machine_mut(&mut self) -> Result<&mut ExercisePhaseMachine> {
        self.current
            .as_mut()
            .map(|in_play| &mut in_play.machine)
            .ok_or(Error::NoActiveCard)
    }

    // ------------------------------------------------------------------------
    // Affect
    // ------------------------------------------------------------------------

    /// Signals describing the game right now
    pub fn signals(&self, explicit_emotion_override: Option<Emotion>) -> SessionSignals {
        SessionSignals {
            player_score: i64::from(self.scoreboard.player),
            ai_score: i64::from(self.scoreboard.ai),
            is_opponent_turn: self.turn == Side::Opponent,
            deck_type: self.deck_type,
            explicit_emotion_override,
        }
    }

    /// Re-derive the opponent's emotion; returns true if the display changed
    pub fn refresh_affect(&mut self, signals: &SessionSignals, now: DateTime<Utc>) -> bool {
        self.affect.refresh(signals, now)
    }

    /// Apply a one-shot reaction; returns true if the display changed
    pub fn react(&mut self, event: GameEvent, now: DateTime<Utc>) -> bool {
        let ai = i64::from(self.scoreboard.ai);
        let player = i64::from(self.scoreboard.player);
        self.affect.react(event, ai, player, now)
    }

    /// Close an expired reaction window
    pub fn expire_affect(&mut self, now: DateTime<Utc>) -> bool {
        self.affect.expire(now)
    }

    pub fn affect(&self) -> AffectState {
        self.affect.state()
    }

    pub fn opponent_quip(&self, now: DateTime<Utc>) -> Option<&'static str> {
        self.affect.visible_quip(now)
    }

    // ------------------------------------------------------------------------
    // Read side for presentation
    // ------------------------------------------------------------------------

    pub fn current_card(&self) -> Option<&GameCard> {
        self.current.as_ref().map(|in_play| &in_play.card)
    }

    pub fn target(&self) -> Option<ExerciseTarget> {
        self.current.as_ref().map(|in_play| in_play.target)
    }

    pub fn phase(&self) -> Option<PhaseState> {
        self.current.as_ref().map(|in_play| in_play.machine.state())
    }

    pub fn completion_mode(&self) -> Option<CompletionMode> {
        self.current
            .as_ref()
            .map(|in_play| in_play.machine.completion_mode())
    }

    pub fn progress(&self) -> Option<f64> {
        self.current
            .as_ref()
            .and_then(|in_play| in_play.machine.progress())
    }

    pub fn scoreboard(&self) -> Scoreboard {
        self.scoreboard
    }

    pub fn turn(&self) -> Side {
        self.turn
    }

    pub fn combo(&self) -> Option<&ComboStreak> {
        self.combo.as_ref()
    }

    pub fn cards_resolved(&self) -> u32 {
        self.cards_resolved
    }

    pub fn deck_type(&self) -> DeckType {
        self.deck_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{build_default_catalog, CardCategory, CardType, ExerciseDefinition};
    use chrono::{Duration, TimeZone};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn session() -> SessionCoordinator {
        SessionCoordinator::new(DeckType::Standard, ScoringRules::default(), 3000)
    }

    fn card(id: &str, points: u32, special: Option<Special>) -> GameCard {
        GameCard {
            id: id.into(),
            exercise: ExerciseDefinition::timed("plank", "Plank", "strength", 10),
            points,
            difficulty: 2,
            category: CardCategory::Strength,
            special,
            combo_tag: None,
            card_type: None,
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap()
    }

    fn play_through(session: &mut SessionCoordinator) {
        session.begin_card().unwrap();
        session.skip_card(true).unwrap();
    }

    #[test]
    fn test_draw_caches_scaled_target() {
        let mut session = session();
        let catalog = build_default_catalog();
        let squats = catalog.cards["card_squats"].clone();

        let target = session.draw_card(squats, 10).unwrap();
        assert_eq!(target, ExerciseTarget::Reps(30));
        assert_eq!(session.target(), Some(ExerciseTarget::Reps(30)));
        assert_eq!(session.phase(), Some(PhaseState::Waiting));
    }

    #[test]
    fn test_draw_rejects_second_card() {
        let mut session = session();
        session.draw_card(card("a", 1, None), 5).unwrap();
        let err = session.draw_card(card("b", 1, None), 5).unwrap_err();
        assert!(matches!(err, Error::CardInProgress(id) if id == "a"));
    }

    #[test]
    fn test_draw_rejects_invalid_exercise() {
        let mut session = session();
        let mut bad = card("bad", 1, None);
        bad.exercise.base_duration = Some(0);
        let err = session.draw_card(bad, 5).unwrap_err();
        assert!(matches!(err, Error::InvalidExerciseDefinition { .. }));
        assert!(session.current_card().is_none());
    }

    #[test]
    fn test_full_timed_card_lifecycle() {
        let mut session = session();
        session.draw_card(card("plank", 3, None), 5).unwrap();

        assert_eq!(
            session.begin_card().unwrap(),
            PhaseState::Countdown { remaining: 3 }
        );
        for _ in 0..3 {
            session.tick().unwrap();
        }
        for _ in 0..9 {
            session.tick().unwrap();
        }
        assert_eq!(session.phase(), Some(PhaseState::Active { elapsed: 9 }));
        session.tick().unwrap();
        assert_eq!(session.phase(), Some(PhaseState::Completed));

        let update = session.resolve_card().unwrap();
        assert_eq!(update.awarded, 3);
        assert_eq!(session.scoreboard().player, 3);
        assert!(session.current_card().is_none());
        assert_eq!(session.turn(), Side::Opponent);
    }

    #[test]
    fn test_operations_without_card() {
        let mut session = session();
        assert!(matches!(session.tick(), Err(Error::NoActiveCard)));
        assert!(matches!(session.resolve_card(), Err(Error::NoActiveCard)));
        assert!(matches!(session.discard_card(), Err(Error::NoActiveCard)));
    }

    #[test]
    fn test_resolve_requires_completion() {
        let mut session = session();
        session.draw_card(card("a", 3, None), 5).unwrap();
        session.begin_card().unwrap();

        let err = session.resolve_card().unwrap_err();
        assert!(err.is_illegal_transition());
        assert_eq!(session.scoreboard().player, 0);
    }

    #[test]
    fn test_unauthorized_skip_is_reported() {
        let mut session = session();
        session.draw_card(card("a", 3, None), 5).unwrap();
        session.begin_card().unwrap();

        assert!(matches!(session.skip_card(false), Err(Error::UnauthorizedSkip)));
        assert_eq!(session.phase(), Some(PhaseState::Countdown { remaining: 3 }));
    }

    #[test]
    fn test_reset_before_submit_does_not_double_award() {
        let mut session = session();
        session.draw_card(card("a", 3, None), 5).unwrap();
        play_through(&mut session);

        assert_eq!(session.reset_card().unwrap(), PhaseState::Waiting);
        assert_eq!(session.target(), Some(ExerciseTarget::Duration(10)));
        play_through(&mut session);

        session.resolve_card().unwrap();
        assert_eq!(session.scoreboard().player, 3);
    }

    #[test]
    fn test_discard_scores_nothing() {
        let mut session = session();
        session.draw_card(card("a", 3, None), 5).unwrap();
        session.begin_card().unwrap();

        let dropped = session.discard_card().unwrap();
        assert_eq!(dropped.id, "a");
        assert_eq!(session.scoreboard().player, 0);
        assert!(session.draw_card(card("b", 1, None), 5).is_ok());
    }

    #[test]
    fn test_double_and_bonus() {
        let rules = ScoringRules::default();
        let mut board = Scoreboard::default();

        let update = board.award(Side::Player, &card("d", 4, Some(Special::Double)), &rules);
        assert_eq!(update.awarded, 8);
        assert_eq!(update.special_applied, Some(Special::Double));

        let update = board.award(Side::Player, &card("b", 4, Some(Special::Bonus)), &rules);
        assert_eq!(update.awarded, 6);
        assert_eq!(board.player, 14);
    }

    #[test]
    fn test_steal_transfers_points() {
        let rules = ScoringRules::default();
        let mut board = Scoreboard::default();
        board.award(Side::Opponent, &card("o", 5, None), &rules);

        let update = board.award(Side::Player, &card("s", 1, Some(Special::Steal)), &rules);
        assert_eq!(update.stolen, 2);
        assert_eq!(board.ai, 3);
        assert_eq!(board.player, 3);
    }

    #[test]
    fn test_steal_never_goes_negative() {
        let rules = ScoringRules::default();
        let mut board = Scoreboard::default();
        board.award(Side::Opponent, &card("o", 1, None), &rules);

        let update = board.award(Side::Player, &card("s", 1, Some(Special::Steal)), &rules);
        assert_eq!(update.stolen, 1);
        assert_eq!(board.ai, 0);
        assert_eq!(board.player, 2);
    }

    #[test]
    fn test_block_cancels_next_opposing_special_only() {
        let rules = ScoringRules::default();
        let mut board = Scoreboard::default();

        board.award(Side::Player, &card("blk", 1, Some(Special::Block)), &rules);
        assert!(board.block_armed(Side::Player));

        // Plain cards don't consume the block
        board.award(Side::Opponent, &card("plain", 2, None), &rules);
        assert!(board.block_armed(Side::Player));

        let update = board.award(Side::Opponent, &card("dbl", 4, Some(Special::Double)), &rules);
        assert_eq!(update.awarded, 4);
        assert_eq!(update.special_blocked, Some(Special::Double));
        assert!(!board.block_armed(Side::Player));

        let update = board.award(Side::Opponent, &card("dbl2", 4, Some(Special::Double)), &rules);
        assert_eq!(update.awarded, 8);
        assert_eq!(board.ai, 14);
    }

    #[test]
    fn test_block_cancels_steal() {
        let rules = ScoringRules::default();
        let mut board = Scoreboard::default();

        board.award(Side::Player, &card("blk", 3, Some(Special::Block)), &rules);
        let update = board.award(Side::Opponent, &card("stl", 4, Some(Special::Steal)), &rules);

        assert_eq!(update.stolen, 0);
        assert_eq!(update.awarded, 4);
        assert_eq!(update.special_applied, None);
        assert_eq!(update.special_blocked, Some(Special::Steal));
        assert_eq!(board.player, 3);
        assert_eq!(board.ai, 4);
        assert!(!board.block_armed(Side::Player));
    }

    #[test]
    fn test_opponent_steal_takes_from_player() {
        let rules = ScoringRules::default();
        let mut session = session();
        session.draw_card(card("a", 5, None), 5).unwrap();
        play_through(&mut session);
        session.resolve_card().unwrap();

        let update = session.resolve_opponent_card(&card("stl", 1, Some(Special::Steal)));
        assert_eq!(update.side, Side::Opponent);
        assert_eq!(update.stolen, rules.steal_points);
        assert_eq!(session.scoreboard().player, 3);
        assert_eq!(session.scoreboard().ai, 3);
    }

    #[test]
    fn test_opponent_turn_alternates() {
        let mut session = session();
        assert_eq!(session.turn(), Side::Player);
        session.resolve_opponent_card(&card("o", 2, None));
        assert_eq!(session.turn(), Side::Player);
        assert_eq!(session.scoreboard().ai, 2);
        assert_eq!(session.cards_resolved(), 1);
    }

    #[test]
    fn test_combo_streak() {
        let mut session = session();
        let mut tagged = card("a", 1, None);
        tagged.combo_tag = Some("leg_day".into());

        for expected in 1..=2 {
            session.draw_card(tagged.clone(), 5).unwrap();
            play_through(&mut session);
            session.resolve_card().unwrap();
            assert_eq!(session.combo().map(|c| c.length), Some(expected));
        }

        session.draw_card(card("plain", 1, None), 5).unwrap();
        play_through(&mut session);
        session.resolve_card().unwrap();
        assert!(session.combo().is_none());
    }

    #[test]
    fn test_utility_card_resolves_by_completion() {
        let mut session = session();
        let mut utility = card("u", 1, Some(Special::Block));
        utility.card_type = Some(CardType::Utility);
        session.draw_card(utility, 5).unwrap();

        assert_eq!(session.begin_card().unwrap(), PhaseState::Active { elapsed: 0 });
        session.complete_card().unwrap();
        session.resolve_card().unwrap();
        assert!(session.scoreboard().block_armed(Side::Player));
    }

    #[test]
    fn test_refresh_affect_reports_changes_once() {
        let changes = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&changes);

        let mut session = session();
        session.set_emotion_observer(move |_: Emotion, _: Emotion| *counter.borrow_mut() += 1);

        let signals = session.signals(None);
        assert!(session.refresh_affect(&signals, t0()));
        assert_eq!(session.affect().emotion, Emotion::Focused);
        assert!(!session.refresh_affect(&signals, t0() + Duration::seconds(1)));
        assert_eq!(*changes.borrow(), 1);

        session.resolve_opponent_card(&card("o", 1, None));
        session.resolve_opponent_card(&card("o2", 5, None));
        let signals = session.signals(None);
        assert!(session.refresh_affect(&signals, t0()));
        assert_eq!(session.affect().emotion, Emotion::Confident);
        assert_eq!(*changes.borrow(), 2);
    }

    #[test]
    fn test_signals_track_turn() {
        let mut session = session();
        session.draw_card(card("a", 1, None), 5).unwrap();
        play_through(&mut session);
        session.resolve_card().unwrap();

        let signals = session.signals(Some(Emotion::Surprised));
        assert!(signals.is_opponent_turn);
        assert_eq!(signals.player_score, 1);
        assert_eq!(signals.explicit_emotion_override, Some(Emotion::Surprised));
    }

    #[test]
    fn test_react_to_events() {
        let mut session = session();
        assert!(session.react(GameEvent::GameStart, t0()));
        assert_eq!(session.affect().emotion, Emotion::Confident);
        assert!(session.opponent_quip(t0()).is_some());
        assert!(session.expire_affect(t0() + Duration::seconds(3)));
        assert!(session.opponent_quip(t0() + Duration::seconds(3)).is_none());
    }
}
