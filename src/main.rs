use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use serde::Serialize;
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
};
use tracing::{info, warn};

use wortschatz::{
    app::{App, Control},
    app_dirs::AppDirs,
    audio::BrowserPlayer,
    config::{Config, ConfigStore, FileConfigStore},
    exercise::{generate_mc, generate_writing, McExercise, WritingExercise},
    logging,
    runtime::{AppEvent, CrosstermEventSource, EventSource, Runner, TICK_RATE},
    session::{effective_word_count, SessionMachine},
    vocabulary::{draw, BundledDeck, VocabularyItem},
};

/// terminal vocabulary trainer: learn, quiz and write German words
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Study a handful of German words on flashcards, then test yourself with multiple choice and writing drills and finish with a scored summary."
)]
pub struct Cli {
    /// number of words per session (zero or negative means the default)
    #[clap(short = 'w', long, allow_negative_numbers = true)]
    word_count: Option<i64>,

    /// bundled deck to study
    #[clap(short = 'd', long)]
    deck: Option<String>,

    /// JSON deck file to study instead of a bundled deck
    #[clap(long)]
    deck_file: Option<PathBuf>,

    /// Anki package (.apkg) or extracted collection (collection.anki2) to study from
    #[clap(long)]
    anki_collection: Option<PathBuf>,

    /// seed for word picking and option shuffling, for reproducible sessions
    #[clap(long)]
    seed: Option<u64>,

    /// where to write logs (defaults to the state directory)
    #[clap(long)]
    log_file: Option<PathBuf>,

    /// print the generated exercises as JSON and exit
    #[clap(long)]
    preview: bool,

    /// list the bundled decks and exit
    #[clap(long)]
    list_decks: bool,

    /// persist the given options as the new defaults
    #[clap(long)]
    save_config: bool,
}

impl Cli {
    /// Layers the command line over a stored config.
    fn apply(&self, mut config: Config) -> Config {
        if let Some(n) = self.word_count {
            config.word_count = effective_word_count(usize::try_from(n).ok());
        }
        if let Some(ref deck) = self.deck {
            config.deck = deck.clone();
        }
        if let Some(ref path) = self.deck_file {
            config.deck_path = Some(path.clone());
        }
        if let Some(ref path) = self.anki_collection {
            config.anki_collection = Some(path.clone());
        }
        config.word_count = effective_word_count(Some(config.word_count));
        config
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Preview {
    source: String,
    vocabulary: Vec<VocabularyItem>,
    multiple_choice: Vec<McExercise>,
    writing: Vec<WritingExercise>,
}

fn build_preview(cli: &Cli, config: &Config) -> Result<Preview, Box<dyn Error>> {
    let mut rng = cli.rng();
    let vocabulary = draw(config.vocabulary_source().as_mut(), config.word_count, &mut rng)?;
    let multiple_choice = generate_mc(&vocabulary, &mut rng);
    let writing = generate_writing(&vocabulary);
    Ok(Preview {
        source: config.source_label(),
        vocabulary,
        multiple_choice,
        writing,
    })
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if cli.list_decks {
        for deck in BundledDeck::available() {
            println!("{deck}");
        }
        return Ok(());
    }

    if let Some(path) = cli.log_file.clone().or_else(AppDirs::log_path) {
        if let Err(err) = logging::init(&path) {
            eprintln!("logging disabled: {err}");
        }
    }

    let store = FileConfigStore::new();
    let config = cli.apply(store.load());
    if cli.save_config {
        store.save(&config)?;
        info!(path = %store.path().display(), "saved config");
    }

    if cli.preview {
        let preview = build_preview(&cli, &config)?;
        println!("{}", serde_json::to_string_pretty(&preview)?);
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let mut app = App::new(
        SessionMachine::with_rng(cli.rng()),
        config.vocabulary_source(),
        Box::new(BrowserPlayer),
        config.word_count,
        config.source_label(),
    );

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let runner = Runner::new(CrosstermEventSource::new(), TICK_RATE);
    let outcome = run(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(ref err) = outcome {
        warn!(error = %err, "terminal loop failed");
    }
    outcome
}

fn run<B: Backend, E: EventSource>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E>,
) -> Result<(), Box<dyn Error>> {
    terminal.draw(|f| f.render_widget(&*app, f.area()))?;
    loop {
        match runner.step() {
            AppEvent::Key(key) => {
                if app.handle_key(key) == Control::Quit {
                    info!(phase = %app.machine.phase(), "quit");
                    return Ok(());
                }
            }
            AppEvent::Resize => {
                terminal.autoresize()?;
            }
            AppEvent::Tick => continue,
        }
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;
    }
}
