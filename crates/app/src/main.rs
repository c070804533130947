use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use url::Url;

use quiz_core::Clock;
use services::{
    DisplayEvent, HttpCatalogFetcher, HttpImageFetcher, QuestionGenerator, QuizCommand,
    QuizHandle, QuizLoop, StatisticsService,
};
use storage::SqliteStore;

const DEFAULT_DB_URL: &str = "sqlite:quiz.sqlite3?mode=rwc";
const DEFAULT_API_URL: &str = "https://tv-api.com/en/API/Top250Movies/k_zcuw1ytf";

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidApiUrl { raw: String },
    InvalidRevealMs { raw: String },
    InvalidQuestions { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidApiUrl { raw } => write!(f, "invalid --api-url value: {raw}"),
            ArgsError::InvalidRevealMs { raw } => write!(f, "invalid --reveal-ms value: {raw}"),
            ArgsError::InvalidQuestions { raw } => write!(f, "invalid --questions value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

struct Args {
    db_url: String,
    api_url: Url,
    reveal_delay: Duration,
    questions: u32,
}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Option<Args>, ArgsError> {
    let mut db_url = DEFAULT_DB_URL.to_owned();
    let mut api_url = DEFAULT_API_URL.to_owned();
    let mut reveal_ms = 1000_u64;
    let mut questions = services::QUESTIONS_PER_ROUND;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--db" => db_url = require_value(&mut args, "--db")?,
            "--api-url" => api_url = require_value(&mut args, "--api-url")?,
            "--reveal-ms" => {
                let raw = require_value(&mut args, "--reveal-ms")?;
                reveal_ms = raw
                    .parse()
                    .map_err(|_| ArgsError::InvalidRevealMs { raw })?;
            }
            "--questions" => {
                let raw = require_value(&mut args, "--questions")?;
                questions = raw
                    .parse()
                    .ok()
                    .filter(|n| *n > 0)
                    .ok_or(ArgsError::InvalidQuestions { raw })?;
            }
            "--help" | "-h" => {
                print_usage();
                return Ok(None);
            }
            other => return Err(ArgsError::UnknownArg(other.to_owned())),
        }
    }

    let api_url = Url::parse(&api_url).map_err(|_| ArgsError::InvalidApiUrl { raw: api_url })?;
    Ok(Some(Args {
        db_url,
        api_url,
        reveal_delay: Duration::from_millis(reveal_ms),
        questions,
    }))
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>     SQLite URL (default: {DEFAULT_DB_URL})");
    eprintln!("  --api-url <url>       Movie catalog endpoint");
    eprintln!("  --reveal-ms <n>       Answer feedback delay in milliseconds (default: 1000)");
    eprintln!(
        "  --questions <n>       Questions per round (default: {})",
        services::QUESTIONS_PER_ROUND
    );
    eprintln!("  --help                Show this help");
}

/// Forward stdin lines into the async world.
fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        let mut line = String::new();
        loop {
            line.clear();
            match stdin.read_line(&mut line) {
                Ok(0) | Err(_) => break,
                Ok(_) => {
                    if tx.send(line.trim().to_lowercase()).is_err() {
                        break;
                    }
                }
            }
        }
    });
    rx
}

fn render(event: &DisplayEvent) {
    match event {
        DisplayEvent::ShowLoading(true) => println!("Loading..."),
        DisplayEvent::ShowLoading(false) => {}
        DisplayEvent::ShowQuestion(view) => {
            println!();
            println!("Question {}", view.progress);
            println!("[poster: {} bytes]", view.image.len());
            println!("{}", view.prompt);
            println!("Answer with y / n");
        }
        DisplayEvent::ShowAnswerFeedback { is_correct } => {
            println!("{}", if *is_correct { "Correct!" } else { "Wrong!" });
        }
        DisplayEvent::ShowRoundSummary(view) => {
            println!();
            println!("=== {} ===", view.title);
            println!("{}", view.message);
            println!("Type a to {}, or q to quit", view.button_label.to_lowercase());
        }
        DisplayEvent::ShowError {
            message,
            retry_label,
        } => {
            println!("Error: {message}");
            println!("Type r to {}", retry_label.to_lowercase());
        }
    }
}

fn command_for(line: &str) -> Option<QuizCommand> {
    match line {
        "y" | "yes" => Some(QuizCommand::Answer(true)),
        "n" | "no" => Some(QuizCommand::Answer(false)),
        "r" | "retry" => Some(QuizCommand::Retry),
        "a" | "again" | "" => Some(QuizCommand::Continue),
        _ => None,
    }
}

async fn run_quiz(handle: QuizHandle, mut display_rx: mpsc::UnboundedReceiver<DisplayEvent>) {
    let mut input_rx = spawn_stdin_reader();
    handle.send(QuizCommand::Start);

    loop {
        tokio::select! {
            event = display_rx.recv() => match event {
                Some(event) => render(&event),
                None => break,
            },
            line = input_rx.recv() => match line.as_deref() {
                None | Some("q") | Some("quit") => break,
                Some(line) => {
                    if let Some(command) = command_for(line) {
                        if !handle.send(command) {
                            break;
                        }
                    } else {
                        println!("Unrecognized input: {line}");
                    }
                }
            },
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let Some(args) = parse_args(std::env::args().skip(1))? else {
        return Ok(());
    };

    let store = SqliteStore::open(&args.db_url).await?;
    tracing::info!(db = %args.db_url, "statistics store ready");
    let stats = StatisticsService::new(Arc::new(store));
    let generator = QuestionGenerator::new(
        Arc::new(HttpCatalogFetcher::new(args.api_url)),
        Arc::new(HttpImageFetcher::new()),
    );

    let (display_tx, display_rx) = mpsc::unbounded_channel();
    let (handle, quiz) = QuizLoop::new(generator, stats, Clock::default_clock(), display_tx);
    let quiz = quiz
        .with_reveal_delay(args.reveal_delay)
        .with_questions_per_round(args.questions);
    tokio::spawn(quiz.run());

    run_quiz(handle, display_rx).await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(parts: &[&str]) -> Result<Option<Args>, ArgsError> {
        parse_args(parts.iter().map(|s| (*s).to_owned()))
    }

    #[test]
    fn defaults_apply_without_flags() {
        let args = parse(&[]).unwrap().unwrap();
        assert_eq!(args.db_url, DEFAULT_DB_URL);
        assert_eq!(args.reveal_delay, Duration::from_millis(1000));
    }

    #[test]
    fn rejects_unknown_flags() {
        assert!(matches!(parse(&["--nope"]), Err(ArgsError::UnknownArg(_))));
    }

    #[test]
    fn rejects_missing_values() {
        assert!(matches!(
            parse(&["--db"]),
            Err(ArgsError::MissingValue { flag: "--db" })
        ));
    }

    #[test]
    fn questions_flag_overrides_round_length() {
        let args = parse(&["--questions", "5"]).unwrap().unwrap();
        assert_eq!(args.questions, 5);
        let args = parse(&[]).unwrap().unwrap();
        assert_eq!(args.questions, services::QUESTIONS_PER_ROUND);
    }

    #[test]
    fn rejects_a_zero_or_garbage_question_count() {
        assert!(matches!(
            parse(&["--questions", "0"]),
            Err(ArgsError::InvalidQuestions { .. })
        ));
        assert!(matches!(
            parse(&["--questions", "many"]),
            Err(ArgsError::InvalidQuestions { .. })
        ));
    }

    #[test]
    fn rejects_bad_api_url() {
        assert!(matches!(
            parse(&["--api-url", "not a url"]),
            Err(ArgsError::InvalidApiUrl { .. })
        ));
    }

    #[test]
    fn maps_input_lines_to_commands() {
        assert_eq!(command_for("y"), Some(QuizCommand::Answer(true)));
        assert_eq!(command_for("no"), Some(QuizCommand::Answer(false)));
        assert_eq!(command_for("r"), Some(QuizCommand::Retry));
        assert_eq!(command_for("a"), Some(QuizCommand::Continue));
        assert_eq!(command_for("zzz"), None);
    }
}
