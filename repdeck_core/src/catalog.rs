//! Default catalog of exercises and card templates.
//!
//! This module provides the built-in exercises and the cards drawn from them.

use crate::types::*;
use crate::DeckType;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Cached default catalog - built once and reused across all operations
static DEFAULT_CATALOG: Lazy<Catalog> = Lazy::new(build_default_catalog);

/// Get a reference to the cached default catalog
pub fn get_default_catalog() -> &'static Catalog {
    &DEFAULT_CATALOG
}

struct CardSpec {
    id: &'static str,
    exercise_id: &'static str,
    points: u32,
    difficulty: u8,
    category: CardCategory,
    special: Option<Special>,
    combo_tag: Option<&'static str>,
    card_type: Option<CardType>,
}

impl CardSpec {
    fn new(
        id: &'static str,
        exercise_id: &'static str,
        points: u32,
        difficulty: u8,
        category: CardCategory,
    ) -> Self {
        Self {
            id,
            exercise_id,
            points,
            difficulty,
            category,
            special: None,
            combo_tag: None,
            card_type: None,
        }
    }

    fn special(mut self, special: Special) -> Self {
        self.special = Some(special);
        self
    }

    fn combo(mut self, tag: &'static str) -> Self {
        self.combo_tag = Some(tag);
        self
    }

    fn card_type(mut self, card_type: CardType) -> Self {
        self.card_type = Some(card_type);
        self
    }
}

/// Builds the default catalog with built-in exercises and cards
///
/// **Note**: For production use, prefer `get_default_catalog()` which returns a
/// cached reference.
pub fn build_default_catalog() -> Catalog {
    let mut exercises = HashMap::new();

    // ========================================================================
    // Exercises
    // ========================================================================

    let definitions = [
        ExerciseDefinition::timed("jumping_jacks", "Jumping Jacks", "cardio", 30)
            .with_description("Jump feet out while raising arms overhead, then back."),
        ExerciseDefinition::timed("high_knees", "High Knees", "cardio", 30)
            .with_description("Run in place driving knees to hip height."),
        ExerciseDefinition::reps("burpees", "Burpees", "cardio", 10)
            .with_description("Squat, kick back to plank, return and jump."),
        ExerciseDefinition::timed("mountain_climbers", "Mountain Climbers", "cardio", 30)
            .with_description("From plank, alternate driving knees to chest."),
        ExerciseDefinition::reps("pushups", "Push-ups", "strength", 10)
            .with_description("Lower chest to the floor and press back up."),
        ExerciseDefinition::reps("squats", "Bodyweight Squats", "strength", 15)
            .with_description("Sit hips back and down, stand tall."),
        ExerciseDefinition::reps("lunges", "Alternating Lunges", "strength", 12)
            .with_description("Step forward and lower the back knee, alternate legs."),
        ExerciseDefinition::timed("plank", "Plank Hold", "strength", 30)
            .with_description("Hold a straight line from head to heels."),
        ExerciseDefinition::timed("hamstring_stretch", "Hamstring Stretch", "flexibility", 30)
            .with_description("Hinge forward over straight legs and hold."),
        ExerciseDefinition::reps("hip_cars", "Hip CARs", "flexibility", 5)
            .with_description("Slow controlled hip circles, each side."),
        ExerciseDefinition::reps("cat_cow", "Cat-Cow", "flexibility", 8)
            .with_description("Alternate arching and rounding the spine on all fours."),
        ExerciseDefinition::timed("arm_circles", "Arm Circles", "warmup", 20)
            .with_description("Small to large circles, forwards then backwards."),
        ExerciseDefinition::timed("march_in_place", "March in Place", "warmup", 30)
            .with_description("Easy marching with an arm swing."),
        ExerciseDefinition::reps("deep_breaths", "Deep Breaths", "utility", 5)
            .with_description("Slow breaths in through the nose, out through the mouth."),
    ];

    for definition in definitions {
        exercises.insert(definition.id.clone(), definition);
    }

    // ========================================================================
    // Cards
    // ========================================================================

    use CardCategory::*;

    let specs = [
        CardSpec::new("card_jumping_jacks", "jumping_jacks", 2, 1, Cardio).combo("cardio_burst"),
        CardSpec::new("card_high_knees", "high_knees", 3, 2, Cardio)
            .special(Special::Bonus)
            .combo("cardio_burst"),
        CardSpec::new("card_burpees", "burpees", 5, 4, Cardio).special(Special::Double),
        CardSpec::new("card_mountain_climbers", "mountain_climbers", 3, 3, Cardio)
            .combo("core_fire"),
        CardSpec::new("card_pushups", "pushups", 4, 3, Strength).special(Special::Steal),
        CardSpec::new("card_squats", "squats", 3, 2, Strength).combo("leg_day"),
        CardSpec::new("card_lunges", "lunges", 3, 3, Strength)
            .special(Special::Block)
            .combo("leg_day"),
        CardSpec::new("card_plank", "plank", 4, 3, Strength).combo("core_fire"),
        CardSpec::new("card_hamstring_stretch", "hamstring_stretch", 2, 1, Flexibility)
            .combo("stretch_flow"),
        CardSpec::new("card_hip_cars", "hip_cars", 2, 2, Flexibility)
            .special(Special::Bonus)
            .combo("stretch_flow"),
        CardSpec::new("card_cat_cow", "cat_cow", 2, 1, Flexibility),
        CardSpec::new("card_burpee_gauntlet", "burpees", 6, 5, Mixed).special(Special::Double),
        CardSpec::new("card_arm_circles", "arm_circles", 1, 1, Warmup).card_type(CardType::Warmup),
        CardSpec::new("card_march", "march_in_place", 1, 1, Warmup).card_type(CardType::Warmup),
        CardSpec::new("card_breather", "deep_breaths", 1, 1, Utility)
            .special(Special::Block)
            .card_type(CardType::Utility),
        CardSpec::new("card_power_surge", "deep_breaths", 2, 2, Utility)
            .special(Special::Steal)
            .card_type(CardType::Power),
    ];

    let mut cards = HashMap::new();
    for spec in specs {
        let Some(exercise) = exercises.get(spec.exercise_id) else {
            tracing::warn!(
                "Card '{}' references unknown exercise '{}'",
                spec.id,
                spec.exercise_id
            );
            continue;
        };

        cards.insert(
            spec.id.to_string(),
            GameCard {
                id: spec.id.into(),
                exercise: exercise.clone(),
                points: spec.points,
                difficulty: spec.difficulty,
                category: spec.category,
                special: spec.special,
                combo_tag: spec.combo_tag.map(String::from),
                card_type: spec.card_type,
            },
        );
    }

    Catalog { exercises, cards }
}

impl Catalog {
    /// Look up an exercise definition by id
    pub fn exercise(&self, id: &str) -> Option<&ExerciseDefinition> {
        self.exercises.get(id)
    }

    /// Cards belonging to a deck, sorted by id
    pub fn cards_for_deck(&self, deck_type: DeckType) -> Vec<&GameCard> {
        let mut cards: Vec<_> = self
            .cards
            .values()
            .filter(|card| deck_type.includes(card.category))
            .collect();
        cards.sort_by(|a, b| a.id.cmp(&b.id));
        cards
    }

    /// Validate the catalog for consistency and completeness
    ///
    /// Returns a list of validation errors, or empty Vec if valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        for (id, exercise) in &self.exercises {
            if id.is_empty() || exercise.id.is_empty() {
                errors.push("Exercise has empty ID".to_string());
            }
            if id != &exercise.id {
                errors.push(format!(
                    "Exercise key '{}' doesn't match exercise.id '{}'",
                    id, exercise.id
                ));
            }
            if exercise.name.is_empty() {
                errors.push(format!("Exercise '{}' has empty name", id));
            }
            if let Err(e) = exercise.validate() {
                errors.push(e.to_string());
            }
        }

        for (id, card) in &self.cards {
            if id != &card.id {
                errors.push(format!(
                    "Card key '{}' doesn't match card.id '{}'",
                    id, card.id
                ));
            }
            if !(1..=5).contains(&card.difficulty) {
                errors.push(format!(
                    "Card '{}': difficulty {} outside 1..=5",
                    id, card.difficulty
                ));
            }

            match self.exercises.get(&card.exercise.id) {
                None => errors.push(format!(
                    "Card '{}' references non-existent exercise '{}'",
                    id, card.exercise.id
                )),
                Some(exercise) if exercise != &card.exercise => errors.push(format!(
                    "Card '{}' carries a stale copy of exercise '{}'",
                    id, card.exercise.id
                )),
                Some(_) => {}
            }
        }

        // Check that every deck can be drawn from
        for deck_type in DeckType::ALL {
            if self.cards_for_deck(deck_type).is_empty() {
                errors.push(format!("Catalog has no cards for the {:?} deck", deck_type));
            }
        }

        errors
    }
}
