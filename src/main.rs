//! Math Adventure entry point
//!
//! On the web the page drives `web::MathGame`; natively this is a small
//! terminal game over the same controller.

#[cfg(not(target_arch = "wasm32"))]
mod terminal {
    use std::error::Error;
    use std::io::{self, BufRead, Write};
    use std::path::PathBuf;

    use clap::Parser;
    use clap_verbosity_flag::{Verbosity, WarnLevel};

    use math_adventure::audio::AudioNotifier;
    use math_adventure::consts::FEEDBACK_DELAY;
    use math_adventure::highscores::{self, Achievement, SortBy};
    use math_adventure::platform::audio::TerminalBell;
    use math_adventure::platform::storage::FileStore;
    use math_adventure::settings::{GameSettings, SettingsField, parse_leading_int};
    use math_adventure::sim::{Difficulty, GameMode, GamePhase, GameState};

    #[derive(Parser, Debug)]
    #[command(version, about, long_about = None)]
    pub struct Args {
        /// Directory holding saved scores and settings
        #[arg(long, default_value = ".math_adventure")]
        data_dir: PathBuf,

        /// RNG seed for a reproducible game
        #[arg(long)]
        seed: Option<u64>,

        /// Skip the difficulty menu (easy or medium)
        #[arg(short, long, value_parser = parse_difficulty)]
        difficulty: Option<Difficulty>,

        /// Skip the mode menu (addition, subtraction or mixed)
        #[arg(short, long, value_parser = parse_mode)]
        mode: Option<GameMode>,

        /// Mute answer sounds for this session
        #[arg(long)]
        no_sound: bool,

        #[command(flatten)]
        verbose: Verbosity<WarnLevel>,
    }

    fn parse_difficulty(s: &str) -> Result<Difficulty, String> {
        Difficulty::from_str(s).ok_or_else(|| format!("unknown difficulty '{s}'"))
    }

    fn parse_mode(s: &str) -> Result<GameMode, String> {
        GameMode::from_str(s).ok_or_else(|| format!("unknown mode '{s}'"))
    }

    /// Log at the level picked by `-v`/`-q`; `RUST_LOG` still overrides
    pub fn init_logging(args: &Args) {
        env_logger::Builder::new()
            .filter_level(args.verbose.log_level_filter())
            .parse_default_env()
            .init();
    }

    /// What the player chose on a menu screen
    enum Flow {
        Continue,
        Quit,
    }

    struct Terminal {
        state: GameState,
        store: FileStore,
        audio: AudioNotifier<TerminalBell>,
        input: io::StdinLock<'static>,
        preset_difficulty: Option<Difficulty>,
        preset_mode: Option<GameMode>,
        sort_by: SortBy,
    }

    impl Terminal {
        /// Print `message` and read one trimmed line; `None` at end of input
        fn prompt(&mut self, message: &str) -> io::Result<Option<String>> {
            print!("{message}");
            io::stdout().flush()?;
            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            Ok(Some(line.trim().to_string()))
        }

        fn run(&mut self) -> Result<(), Box<dyn Error>> {
            println!("Math Adventure");
            loop {
                let flow = match self.state.phase() {
                    GamePhase::SelectingDifficulty => self.difficulty_menu()?,
                    GamePhase::SelectingMode { difficulty } => self.mode_menu(difficulty)?,
                    GamePhase::InRound => self.ask_problem()?,
                    GamePhase::RoundSummary { ended } => self.summary(ended)?,
                };
                if let Flow::Quit = flow {
                    println!("Bye!");
                    return Ok(());
                }
            }
        }

        fn difficulty_menu(&mut self) -> Result<Flow, Box<dyn Error>> {
            if let Some(difficulty) = self.preset_difficulty.take() {
                self.state.select_difficulty(difficulty)?;
                return Ok(Flow::Continue);
            }

            println!();
            println!("Choose a difficulty:");
            println!("  1) Easy ({})", Difficulty::Easy.label());
            println!("  2) Medium ({})", Difficulty::Medium.label());
            println!("  s) Settings   l) Leaderboard   q) Quit");
            let Some(choice) = self.prompt("> ")? else {
                return Ok(Flow::Quit);
            };
            match choice.to_lowercase().as_str() {
                "1" | "easy" => self.state.select_difficulty(Difficulty::Easy)?,
                "2" | "medium" => self.state.select_difficulty(Difficulty::Medium)?,
                "s" => return self.settings_menu(),
                "l" => return self.leaderboard_menu(),
                "q" => return Ok(Flow::Quit),
                _ => println!("Pick 1 or 2"),
            }
            Ok(Flow::Continue)
        }

        fn mode_menu(&mut self, difficulty: Difficulty) -> Result<Flow, Box<dyn Error>> {
            if let Some(mode) = self.preset_mode.take() {
                self.state.start_game(difficulty, mode)?;
                return Ok(Flow::Continue);
            }

            println!();
            println!("Choose a mode ({}):", difficulty.label());
            println!("  1) {}", GameMode::Addition.label());
            println!("  2) {}", GameMode::Subtraction.label());
            println!("  3) {}", GameMode::Mixed.label());
            println!("  b) Back");
            let Some(choice) = self.prompt("> ")? else {
                return Ok(Flow::Quit);
            };
            let mode = match choice.to_lowercase().as_str() {
                "1" => GameMode::Addition,
                "2" => GameMode::Subtraction,
                "3" => GameMode::Mixed,
                "b" => {
                    self.state.reset_game(&self.store);
                    return Ok(Flow::Continue);
                }
                other => match GameMode::from_str(other) {
                    Some(mode) => mode,
                    None => {
                        println!("Pick 1, 2 or 3");
                        return Ok(Flow::Continue);
                    }
                },
            };
            self.state.start_game(difficulty, mode)?;
            Ok(Flow::Continue)
        }

        fn ask_problem(&mut self) -> Result<Flow, Box<dyn Error>> {
            let (Some(problem), Some(session)) = (self.state.current_problem(), self.state.session())
            else {
                return Ok(Flow::Continue);
            };
            let header = format!(
                "Problem {}/{}   Lives: {}   Score: {}/{}",
                session.problem_index + 1,
                self.state.settings().problems_per_round,
                session.lives_remaining,
                session.correct_count,
                session.total_count
            );

            println!();
            println!("{header}");
            let Some(raw) = self.prompt(&format!("{problem} = "))? else {
                return Ok(Flow::Quit);
            };
            if raw.eq_ignore_ascii_case("q") {
                self.state.reset_game(&self.store);
                return Ok(Flow::Continue);
            }
            let Some(value) = parse_leading_int(&raw) else {
                println!("Please enter a number (or q to leave the game)");
                return Ok(Flow::Continue);
            };

            let outcome = self.state.submit_answer(value, &self.audio)?;
            println!("{}", self.state.feedback_message(&outcome));
            if outcome.round_finished {
                std::thread::sleep(FEEDBACK_DELAY);
                self.state.tick(FEEDBACK_DELAY);
            }
            Ok(Flow::Continue)
        }

        fn summary(&mut self, ended: bool) -> Result<Flow, Box<dyn Error>> {
            let Some(session) = self.state.session() else {
                self.state.reset_game(&self.store);
                return Ok(Flow::Continue);
            };
            let (correct, total) = (session.correct_count, session.total_count);
            let percentage = if total == 0 {
                0
            } else {
                (correct as f64 / total as f64 * 100.0).round() as u32
            };

            println!();
            if ended {
                println!("Game over!");
            } else {
                println!("Round complete!");
            }
            println!(
                "{}  {correct}/{total} correct ({percentage}%)",
                Achievement::for_percentage(percentage).title()
            );
            if ended {
                println!("  s) Save score   n) New game   q) Quit");
            } else {
                println!("  c) Continue   s) Save score   n) New game   q) Quit");
            }

            let Some(choice) = self.prompt("> ")? else {
                return Ok(Flow::Quit);
            };
            match choice.to_lowercase().as_str() {
                "c" if !ended => self.state.continue_round()?,
                "s" => self.save_score()?,
                "n" => {
                    self.state.reset_game(&self.store);
                }
                "q" => return Ok(Flow::Quit),
                _ => println!("Unknown choice"),
            }
            Ok(Flow::Continue)
        }

        fn save_score(&mut self) -> Result<(), Box<dyn Error>> {
            let Some(name) = self.prompt("Your name: ")? else {
                return Ok(());
            };
            let record = match self.state.score_record(&name, chrono::Utc::now()) {
                Ok(record) => record,
                Err(err) => {
                    println!("{err}");
                    return Ok(());
                }
            };
            if let Err(err) = highscores::append_score(&self.store, &record) {
                log::error!("Failed to save score: {err}");
                println!("Could not save the score: {err}");
                return Ok(());
            }
            println!("Saved {} for {}", record.achievement().title(), record.name);

            let scores = self.state.reset_game(&self.store);
            self.print_leaderboard(&scores);
            Ok(())
        }

        fn print_leaderboard(&self, scores: &[highscores::ScoreRecord]) {
            println!();
            println!("Leaderboard (by {})", self.sort_by.as_str());
            let rows = highscores::leaderboard(scores, self.sort_by, chrono::Utc::now());
            if rows.is_empty() {
                println!("  No scores yet");
            }
            for row in rows {
                println!(
                    "  {:>2}. {:<16} {:>7} {:>4}%  {}",
                    row.rank, row.name, row.result, row.percentage, row.date
                );
            }
        }

        fn leaderboard_menu(&mut self) -> Result<Flow, Box<dyn Error>> {
            loop {
                let scores = highscores::load_scores(&self.store);
                self.print_leaderboard(&scores);
                println!("  t) Sort by {}   b) Back", self.sort_by.toggled().as_str());
                let Some(choice) = self.prompt("> ")? else {
                    return Ok(Flow::Quit);
                };
                match choice.to_lowercase().as_str() {
                    "t" => self.sort_by = self.sort_by.toggled(),
                    _ => return Ok(Flow::Continue),
                }
            }
        }

        fn settings_menu(&mut self) -> Result<Flow, Box<dyn Error>> {
            loop {
                let settings = *self.state.settings();
                println!();
                println!("Settings:");
                println!("  1) Problems per round: {}", settings.problems_per_round);
                println!("  2) Lives: {}", settings.max_lives);
                println!(
                    "  3) Sound: {}",
                    if settings.sound_enabled { "on" } else { "off" }
                );
                println!("  c) Clear scores   b) Back");
                let Some(choice) = self.prompt("> ")? else {
                    return Ok(Flow::Quit);
                };

                let field = match choice.to_lowercase().as_str() {
                    "1" => SettingsField::ProblemsPerRound,
                    "2" => SettingsField::MaxLives,
                    "3" => {
                        self.change_settings(|s| s.set_sound_enabled(!s.sound_enabled))?;
                        continue;
                    }
                    "c" => {
                        self.confirm_clear_scores()?;
                        continue;
                    }
                    _ => return Ok(Flow::Continue),
                };
                let (min, max) = field.bounds();
                let Some(raw) = self.prompt(&format!("New value ({min}-{max}): "))? else {
                    return Ok(Flow::Quit);
                };
                let stored = self.change_settings(|s| s.apply_input(field, &raw))?;
                println!("Set to {stored}");
            }
        }

        /// Change, persist and apply settings
        fn change_settings<T>(
            &mut self,
            change: impl FnOnce(&mut GameSettings) -> T,
        ) -> Result<T, Box<dyn Error>> {
            let mut settings = *self.state.settings();
            let result = change(&mut settings);
            settings.save(&self.store)?;
            self.state.update_settings(settings);
            Ok(result)
        }

        fn confirm_clear_scores(&mut self) -> Result<(), Box<dyn Error>> {
            let answer = self.prompt("Clear all saved scores? [y/N] ")?;
            if matches!(answer.as_deref(), Some("y" | "Y" | "yes")) {
                highscores::clear_scores(&self.store)?;
                println!("Scores cleared");
            }
            Ok(())
        }
    }

    pub fn run(args: Args) -> Result<(), Box<dyn Error>> {
        let store = FileStore::open(&args.data_dir)?;
        let mut settings = GameSettings::load(&store);
        if args.no_sound {
            settings.sound_enabled = false;
        }

        let seed = args.seed.unwrap_or_else(rand::random);
        log::info!("Game initialized with seed: {}", seed);

        let mut terminal = Terminal {
            state: GameState::new(settings, seed),
            store,
            audio: AudioNotifier::new(TerminalBell),
            input: io::stdin().lock(),
            preset_difficulty: args.difficulty,
            preset_mode: args.mode,
            sort_by: SortBy::default(),
        };
        terminal.run()
    }

}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use clap::Parser;

    let args = terminal::Args::parse();
    terminal::init_logging(&args);
    log::info!("Math Adventure (native) starting...");

    if let Err(err) = terminal::run(args) {
        log::error!("{err}");
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is web::start; the page drives web::MathGame
}
