use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};

use quiz_core::Clock;
use quiz_core::model::{Difficulty, Entry, EntryId, GameConfig, GameKind, GameStatus};
use services::{
    CatalogSource, GameController, GameSnapshot, NullAudio, PokeApiCatalog, ScoreHistoryService,
    StaticCatalog,
};
use storage::repository::Storage;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidNumber { flag: &'static str, raw: String },
    InvalidDifficulty { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidNumber { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
            ArgsError::InvalidDifficulty { raw } => {
                write!(f, "invalid --difficulty value: {raw} (easy|medium|hard)")
            }
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!(
        "  cargo run -p app -- play    [--db <sqlite_url>] [--difficulty easy|medium|hard]"
    );
    eprintln!("                              [--questions <n>] [--time-limit <seconds>] [--offline]");
    eprintln!("  cargo run -p app -- history [--db <sqlite_url>] [--limit <n>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite:quiz.sqlite3  --difficulty medium  --questions 10  --limit 10");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_DB_URL, QUIZ_DIFFICULTY, QUIZ_QUESTIONS");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Play,
    History,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "play" => Some(Self::Play),
            "history" => Some(Self::History),
            _ => None,
        }
    }
}

struct Args {
    db_url: String,
    difficulty: Difficulty,
    questions: u32,
    time_limit: Option<Duration>,
    offline: bool,
    limit: u32,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("QUIZ_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://quiz.sqlite3".into(), normalize_sqlite_url);
        let mut difficulty = std::env::var("QUIZ_DIFFICULTY")
            .ok()
            .and_then(|value| value.parse::<Difficulty>().ok())
            .unwrap_or(Difficulty::Medium);
        let mut questions = std::env::var("QUIZ_QUESTIONS")
            .ok()
            .and_then(|value| value.parse::<u32>().ok())
            .unwrap_or(10);
        let mut time_limit = None;
        let mut offline = false;
        let mut limit = 10;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--difficulty" => {
                    let value = require_value(args, "--difficulty")?;
                    difficulty = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidDifficulty { raw: value.clone() })?;
                }
                "--questions" => {
                    let value = require_value(args, "--questions")?;
                    questions = value.parse().map_err(|_| ArgsError::InvalidNumber {
                        flag: "--questions",
                        raw: value.clone(),
                    })?;
                }
                "--time-limit" => {
                    let value = require_value(args, "--time-limit")?;
                    let seconds: u64 = value.parse().map_err(|_| ArgsError::InvalidNumber {
                        flag: "--time-limit",
                        raw: value.clone(),
                    })?;
                    time_limit = Some(Duration::from_secs(seconds));
                }
                "--limit" => {
                    let value = require_value(args, "--limit")?;
                    limit = value.parse().map_err(|_| ArgsError::InvalidNumber {
                        flag: "--limit",
                        raw: value.clone(),
                    })?;
                }
                "--offline" => offline = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            difficulty,
            questions,
            time_limit,
            offline,
            limit,
        })
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

/// First-generation fallback roster for `--offline` play.
const OFFLINE_ROSTER: &[(u64, &str)] = &[
    (1, "Bulbasaur"),
    (4, "Charmander"),
    (7, "Squirtle"),
    (12, "Butterfree"),
    (16, "Pidgey"),
    (19, "Rattata"),
    (25, "Pikachu"),
    (27, "Sandshrew"),
    (35, "Clefairy"),
    (37, "Vulpix"),
    (39, "Jigglypuff"),
    (43, "Oddish"),
    (50, "Diglett"),
    (52, "Meowth"),
    (54, "Psyduck"),
    (58, "Growlithe"),
    (63, "Abra"),
    (66, "Machop"),
    (74, "Geodude"),
    (77, "Ponyta"),
    (79, "Slowpoke"),
    (81, "Magnemite"),
    (92, "Gastly"),
    (95, "Onix"),
    (104, "Cubone"),
    (109, "Koffing"),
    (113, "Chansey"),
    (116, "Horsea"),
    (122, "Mr. Mime"),
    (129, "Magikarp"),
    (131, "Lapras"),
    (133, "Eevee"),
    (143, "Snorlax"),
    (147, "Dratini"),
    (150, "Mewtwo"),
    (151, "Mew"),
];

fn offline_catalog() -> Result<StaticCatalog, Box<dyn std::error::Error>> {
    let mut entries = Vec::with_capacity(OFFLINE_ROSTER.len());
    for (id, name) in OFFLINE_ROSTER {
        let id = EntryId::new(*id);
        entries.push(Entry::new(
            id,
            *name,
            format!(
                "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon/{id}.png"
            ),
        )?);
    }
    Ok(StaticCatalog::new(entries))
}

fn print_question(snapshot: &GameSnapshot) {
    let Some(question) = snapshot.question.as_ref() else {
        return;
    };
    println!();
    println!(
        "Question {}/{}: who's that Pokémon?  (score: {})",
        snapshot.question_number, snapshot.total_questions, snapshot.score
    );
    println!("  sprite: {}", question.image_url);
    for (index, name) in question.options.iter().enumerate() {
        println!("  {}) {}", index + 1, name);
    }
    println!(
        "Answer with 1-{} within {}s, or q to give up.",
        question.options.len(),
        snapshot.time_remaining.as_secs()
    );
}

fn print_reveal(snapshot: &GameSnapshot) {
    let Some(question) = snapshot.question.as_ref() else {
        return;
    };
    let (Some(correct_option), Some(is_correct)) = (question.correct_option, question.is_correct)
    else {
        return;
    };
    let name = &question.options[correct_option];
    if is_correct {
        println!("Correct! It was {name}.  (score: {})", snapshot.score);
    } else {
        println!("It was {name}.");
    }
}

fn print_results(snapshot: &GameSnapshot) {
    let Some(results) = snapshot.results.as_ref() else {
        return;
    };
    println!();
    println!("Game over!");
    println!(
        "  score {}  |  {}/{} correct ({:.0}%)",
        results.score,
        results.correct_answers,
        results.total_questions,
        results.accuracy * 100.0
    );
    for question in &results.questions {
        let mark = if question.is_correct == Some(true) {
            "+"
        } else {
            "-"
        };
        if let Some(correct_option) = question.correct_option {
            println!("  {mark} {}", question.options[correct_option]);
        }
    }
}

async fn run_play(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    prepare_sqlite_file(&args.db_url)?;
    let storage = Storage::sqlite(&args.db_url).await?;
    log::debug!("score history ready at {}", args.db_url);

    let catalog: Arc<dyn CatalogSource> = if args.offline {
        Arc::new(offline_catalog()?)
    } else {
        Arc::new(PokeApiCatalog::new())
    };

    let clock = Clock::default_clock();
    let (mut controller, mut timer_events) = GameController::new(
        clock,
        catalog,
        Arc::clone(&storage.records),
        Arc::new(NullAudio),
    );

    let config = GameConfig::new(
        GameKind::WhosThatPokemon,
        args.difficulty,
        args.questions,
        args.time_limit,
    )?;
    controller.start_game(config).await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let snapshot = controller.snapshot();
        match snapshot.status {
            GameStatus::InProgress => {}
            GameStatus::Completed => {
                print_results(&snapshot);
                break;
            }
            GameStatus::NotStarted | GameStatus::Failed => break,
        }

        print_question(&snapshot);
        let option_count = snapshot
            .question
            .as_ref()
            .map_or(0, |question| question.options.len());

        tokio::select! {
            line = lines.next_line() => {
                match line? {
                    None => {
                        // stdin closed: finish the game with what we have
                        controller.end_game().await;
                        continue;
                    }
                    Some(text) => {
                        let text = text.trim();
                        if text.eq_ignore_ascii_case("q") {
                            controller.end_game().await;
                            continue;
                        }
                        match text.parse::<usize>() {
                            Ok(pick) if (1..=option_count).contains(&pick) => {
                                controller.answer(pick - 1);
                            }
                            _ => {
                                println!("Enter a number between 1 and {option_count}.");
                                continue;
                            }
                        }
                    }
                }
            }
            Some(event) = timer_events.recv() => {
                println!("Time's up!");
                controller.on_timer_expired(event);
            }
        }

        print_reveal(&controller.snapshot());
        controller.next().await;
    }

    let history = ScoreHistoryService::new(clock, storage.records);
    let items = history.list_recent(5).await?;
    if !items.is_empty() {
        println!();
        println!("Recent games:");
        for item in items {
            println!(
                "  {}  score {:>5}  {}/{} correct  [{}]",
                item.recorded_at.format("%Y-%m-%d %H:%M"),
                item.score,
                item.correct_answers,
                item.total_questions,
                item.kind
            );
        }
    }

    Ok(())
}

async fn run_history(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    prepare_sqlite_file(&args.db_url)?;
    let storage = Storage::sqlite(&args.db_url).await?;
    let history = ScoreHistoryService::new(Clock::default_clock(), storage.records);

    let items = history.list_recent(args.limit).await?;
    if items.is_empty() {
        println!("No games recorded yet.");
        return Ok(());
    }

    println!("{:<17} {:>7} {:>9} {:>9}  kind", "date", "score", "correct", "total");
    for item in items {
        println!(
            "{:<17} {:>7} {:>9} {:>9}  {}",
            item.recorded_at.format("%Y-%m-%d %H:%M"),
            item.score,
            item.correct_answers,
            item.total_questions,
            item.kind
        );
    }

    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // Default behavior: play when no subcommand is provided.
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Play,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Play,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    let parsed = Args::parse(&mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    match cmd {
        Command::Play => run_play(parsed).await,
        Command::History => run_history(parsed).await,
    }
}

#[tokio::main]
async fn main() {
    env_logger::init();

    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
