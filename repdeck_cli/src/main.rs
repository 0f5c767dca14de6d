use chrono::{DateTime, Duration, Utc};
use clap::{Parser, Subcommand};
use repdeck_core::*;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "repdeck")]
#[command(about = "Exercise card duel against a simulated opponent", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Use this config file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a game against the opponent (default)
    Play {
        /// Difficulty level 1-10 (5 is baseline)
        #[arg(long, value_parser = clap::value_parser!(i32).range(1..=10))]
        difficulty: Option<i32>,

        /// Deck to draw from (standard, cardio, strength, flexibility, warmup)
        #[arg(long)]
        deck: Option<DeckType>,

        /// Number of rounds
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        rounds: Option<u32>,

        /// Auto-complete (for testing) - no prompts, rep cards finish immediately
        #[arg(long)]
        auto_complete: bool,

        /// Simulated clock - ticks advance instantly
        #[arg(long)]
        fast: bool,

        /// Skip every exercise (requires --privileged)
        #[arg(long)]
        skip: bool,

        /// Caller is allowed to skip exercises
        #[arg(long)]
        privileged: bool,
    },

    /// Show the scaled target for an exercise
    Scale {
        /// Exercise id from the catalog
        exercise_id: String,

        /// Difficulty level 1-10
        #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(i32).range(1..=10))]
        level: i32,

        /// Print the target as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the cards in a deck
    Catalog {
        /// Deck to list
        #[arg(long, default_value = "standard")]
        deck: DeckType,

        /// Difficulty level used for the listed targets
        #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(i32).range(1..=10))]
        level: i32,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    repdeck_core::logging::init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let catalog = get_default_catalog();
    let errors = catalog.validate();
    if !errors.is_empty() {
        eprintln!("Catalog validation errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        return Err(Error::CatalogValidation("Invalid catalog".into()));
    }

    match cli.command {
        Some(Commands::Play {
            difficulty,
            deck,
            rounds,
            auto_complete,
            fast,
            skip,
            privileged,
        }) => {
            let options = PlayOptions {
                difficulty: difficulty.unwrap_or(config.player.difficulty_level),
                deck: deck.unwrap_or(config.game.deck),
                rounds: rounds.unwrap_or(config.game.rounds),
                auto_complete,
                fast,
                skip,
                privileged,
            };
            cmd_play(catalog, &config, options)
        }
        Some(Commands::Scale {
            exercise_id,
            level,
            json,
        }) => cmd_scale(catalog, &exercise_id, level, json),
        Some(Commands::Catalog { deck, level }) => cmd_catalog(catalog, deck, level),
        None => {
            // Default to "play" with config settings
            let options = PlayOptions {
                difficulty: config.player.difficulty_level,
                deck: config.game.deck,
                rounds: config.game.rounds,
                auto_complete: false,
                fast: false,
                skip: false,
                privileged: false,
            };
            cmd_play(catalog, &config, options)
        }
    }
}

struct PlayOptions {
    difficulty: i32,
    deck: DeckType,
    rounds: u32,
    auto_complete: bool,
    fast: bool,
    skip: bool,
    privileged: bool,
}

/// One-second tick source: wall clock, or simulated when `--fast`
struct Clock {
    simulated: Option<DateTime<Utc>>,
}

impl Clock {
    fn new(fast: bool) -> Self {
        Self {
            simulated: fast.then(Utc::now),
        }
    }

    fn now(&self) -> DateTime<Utc> {
        self.simulated.unwrap_or_else(Utc::now)
    }

    fn wait_one_second(&mut self) {
        match self.simulated.as_mut() {
            Some(now) => *now += Duration::seconds(1),
            None => std::thread::sleep(std::time::Duration::from_secs(1)),
        }
    }
}

fn cmd_play(catalog: &Catalog, config: &Config, options: PlayOptions) -> Result<()> {
    let mut player_deck = Deck::new(catalog, options.deck)?;
    let offset = player_deck.len() / 2;
    let mut opponent_deck = Deck::new(catalog, options.deck)?.with_offset(offset);

    let mut session = SessionCoordinator::from_config(config);
    session.set_emotion_observer(|_previous: Emotion, current: Emotion| {
        println!("  Opponent looks {}: \"{}\"", current, current.quip());
    });

    let mut clock = Clock::new(options.fast);

    println!("\n╭─────────────────────────────────────────╮");
    println!(
        "│  REPDECK: {:?} deck, level {}",
        player_deck.deck_type(),
        options.difficulty
    );
    println!("╰─────────────────────────────────────────╯");
    session.react(GameEvent::GameStart, clock.now());

    for round in 1..=options.rounds {
        println!("\n── Round {}/{} ──", round, options.rounds);

        // Player turn
        let signals = session.signals(None);
        session.refresh_affect(&signals, clock.now());

        let card = player_deck.draw();
        let target = session.draw_card(card, options.difficulty)?;
        if let Some(card) = session.current_card() {
            display_card(card, target);
        }

        play_card(&mut session, &mut clock, &options)?;

        let update = session.resolve_card()?;
        display_update(&update);
        if let Some(combo) = session.combo().filter(|c| c.length > 1) {
            println!("  Combo '{}' x{}", combo.tag, combo.length);
        }
        session.react(GameEvent::PlayerScored, clock.now());

        // Opponent turn
        let signals = session.signals(None);
        session.refresh_affect(&signals, clock.now());

        let opponent_card = opponent_deck.draw();
        println!(
            "\n  Opponent plays {} ({} pts)",
            opponent_card.exercise.name, opponent_card.points
        );
        let update = session.resolve_opponent_card(&opponent_card);
        display_update(&update);
        session.react(GameEvent::OpponentScored, clock.now());

        let board = session.scoreboard();
        println!("  Score: you {} - {} opponent", board.player, board.ai);
    }

    session.react(GameEvent::GameOver, clock.now());

    let board = session.scoreboard();
    tracing::info!(
        "Session {} finished after {} cards: {}-{}",
        session.id(),
        session.cards_resolved(),
        board.player,
        board.ai
    );
    println!("\n─────────────────────────────────────────");
    println!("Final score: you {} - {} opponent", board.player, board.ai);
    if board.player > board.ai {
        println!("✓ You win!");
    } else if board.ai > board.player {
        println!("✗ Opponent wins.");
    } else {
        println!("= Draw.");
    }

    Ok(())
}

/// Drive the current card from Waiting to Completed
fn play_card(session: &mut SessionCoordinator, clock: &mut Clock, options: &PlayOptions) -> Result<()> {
    if !options.auto_complete {
        prompt("Press Enter to start")?;
    }
    session.begin_card()?;

    if options.skip {
        match session.skip_card(options.privileged) {
            Ok(_) => {
                println!("  [Skipped]");
                return Ok(());
            }
            Err(Error::UnauthorizedSkip) => {
                println!("  Skip denied: not authorized. Play it out!");
            }
            Err(e) => return Err(e),
        }
    }

    loop {
        match session.phase() {
            Some(PhaseState::Countdown { remaining }) => {
                println!("  {}...", remaining);
                clock.wait_one_second();
                if let PhaseState::Active { .. } = session.tick()? {
                    println!("  GO!");
                }
            }
            Some(PhaseState::Active { elapsed }) => match session.completion_mode() {
                Some(CompletionMode::Timed { duration }) => {
                    if elapsed % 5 == 0 {
                        println!("  {}s / {}s", elapsed, duration);
                    }
                    clock.wait_one_second();
                    session.tick()?;
                }
                _ => {
                    if !options.auto_complete {
                        prompt("Press Enter when done")?;
                    }
                    session.complete_card()?;
                }
            },
            Some(PhaseState::Completed) => {
                println!("  ✓ Done!");
                return Ok(());
            }
            Some(PhaseState::Waiting) | None => {
                return Err(Error::Other("Card left play unexpectedly".into()));
            }
        }
        session.expire_affect(clock.now());
    }
}

fn cmd_scale(catalog: &Catalog, exercise_id: &str, level: i32, json: bool) -> Result<()> {
    let exercise = catalog
        .exercise(exercise_id)
        .ok_or_else(|| Error::Other(format!("Unknown exercise: {}", exercise_id)))?;

    let target = scale_checked(exercise, level)?;
    if json {
        println!("{}", serde_json::to_string(&target)?);
    } else {
        println!("{} at level {}: {}", exercise.name, level, target);
    }
    Ok(())
}

fn cmd_catalog(catalog: &Catalog, deck: DeckType, level: i32) -> Result<()> {
    println!("{:?} deck (level {}):", deck, level);
    for card in catalog.cards_for_deck(deck) {
        let special = card
            .special
            .map(|s| format!(" [{:?}]", s))
            .unwrap_or_default();
        println!(
            "  {:<24} {:<20} {:>2} pts  {}{}",
            card.id,
            card.exercise.name,
            card.points,
            scale(&card.exercise, level),
            special
        );
    }
    Ok(())
}

fn display_card(card: &GameCard, target: ExerciseTarget) {
    println!();
    println!("  {} ({:?}, {} pts)", card.exercise.name, card.category, card.points);
    if !card.exercise.description.is_empty() {
        println!("  {}", card.exercise.description);
    }
    if target.is_timed() {
        println!("  → {} (timed)", target);
    } else {
        println!("  → {}", target);
    }
    if let Some(special) = card.special {
        println!("  ★ Special: {:?}", special);
    }
}

fn display_update(update: &ScoreUpdate) {
    let who = match update.side {
        Side::Player => "You",
        Side::Opponent => "Opponent",
    };
    print!("  {} +{}", who, update.awarded);
    if update.stolen > 0 {
        print!(" (stole {})", update.stolen);
    }
    if let Some(special) = update.special_applied {
        print!(" [{:?}]", special);
    }
    if let Some(special) = update.special_blocked {
        print!(" [{:?} blocked]", special);
    }
    println!();
}

fn prompt(message: &str) -> Result<()> {
    print!("  {} > ", message);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(())
}
