use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use storage::LocalStore;
use storage::repository::Storage;
use visa_core::Timeline;
use visa_core::model::{
    CategoryCounts, InterviewAnswers, MilestoneDraft, MilestoneId, MilestoneKind, QUESTION_BANK,
};

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    milestones: u32,
    answers: u32,
    forms_done: u32,
    now: Option<DateTime<Utc>>,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidCount { flag: &'static str, raw: String },
    InvalidNow { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidCount { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
            ArgsError::InvalidNow { raw } => {
                write!(f, "invalid --now value (expected RFC3339): {raw}")
            }
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

fn parse_count(value: String, flag: &'static str) -> Result<u32, ArgsError> {
    value
        .parse::<u32>()
        .map_err(|_| ArgsError::InvalidCount { flag, raw: value })
}

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut db_url =
            std::env::var("VISA_DB_URL").unwrap_or_else(|_| "sqlite:visa.sqlite3?mode=rwc".into());
        let mut milestones = 6;
        let mut answers = 4;
        let mut forms_done = 2;
        let mut now: Option<DateTime<Utc>> = None;

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--milestones" => {
                    milestones = parse_count(require_value(&mut args, "--milestones")?, "--milestones")?;
                }
                "--answers" => {
                    answers = parse_count(require_value(&mut args, "--answers")?, "--answers")?;
                }
                "--forms-done" => {
                    forms_done = parse_count(require_value(&mut args, "--forms-done")?, "--forms-done")?;
                }
                "--now" => {
                    let value = require_value(&mut args, "--now")?;
                    let parsed = DateTime::parse_from_rfc3339(&value)
                        .map_err(|_| ArgsError::InvalidNow { raw: value.clone() })?
                        .with_timezone(&Utc);
                    now = Some(parsed);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            milestones,
            answers,
            forms_done,
            now,
        })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>     SQLite URL (default: sqlite:visa.sqlite3?mode=rwc)");
    eprintln!("  --milestones <n>      Sample timeline milestones to write (default: 6)");
    eprintln!("  --answers <n>         Sample interview answers to write (default: 4)");
    eprintln!("  --forms-done <n>      Completed forms out of 4 (default: 2)");
    eprintln!("  --now <rfc3339>       Fixed current time for deterministic seeding");
    eprintln!("  -h, --help            Show this help");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  VISA_DB_URL");
}

const SAMPLE_MILESTONES: [(i64, MilestoneKind, &str, &str); 6] = [
    (1460, MilestoneKind::FirstMet, "Met at a friend's birthday", "Sydney"),
    (1400, MilestoneKind::StartedDating, "First date", "Bondi"),
    (1000, MilestoneKind::Travel, "Trip to Vietnam together", "Hanoi"),
    (900, MilestoneKind::MovedIn, "Signed our first joint lease", "Newtown"),
    (400, MilestoneKind::Financial, "Opened a joint account", ""),
    (120, MilestoneKind::Engaged, "Engaged", "Blue Mountains"),
];

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let storage = Storage::sqlite(&args.db_url).await?;
    let local = LocalStore::new(Arc::clone(&storage.kv));
    let now = args.now.unwrap_or_else(Utc::now);

    let mut timeline = Timeline::new();
    for i in 0..args.milestones {
        let (days_ago, kind, title, location) =
            SAMPLE_MILESTONES[(i as usize) % SAMPLE_MILESTONES.len()];
        let milestone = MilestoneDraft::new(now - Duration::days(days_ago), kind, title)
            .with_location(location)
            .validate(MilestoneId::generate())?;
        timeline.insert(milestone)?;
    }
    local.save_timeline(&timeline).await?;

    let mut answers = InterviewAnswers::new();
    for question in QUESTION_BANK.iter().take(args.answers as usize) {
        answers.record(question.id, "Practice answer to refine later.", now)?;
    }
    local.save_interview(&answers).await?;

    let mut progress = local.load_progress().await?;
    progress.forms = CategoryCounts::new(args.forms_done.min(4), 4)?;
    progress.timeline = CategoryCounts::new(
        u32::try_from(timeline.key_kinds_recorded()).unwrap_or(u32::MAX).min(6),
        6,
    )?;
    progress.interview = answers.counts();
    local.save_progress(&progress).await?;

    println!(
        "Seeded {} milestones, {} interview answers and {} completed forms into {}",
        timeline.len(),
        answers.len(),
        progress.forms.completed(),
        args.db_url
    );

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
