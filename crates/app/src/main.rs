mod cli;
mod logging;

use std::sync::Arc;

use log::{info, warn};
use services::{AppSession, Clock, HttpDocumentConfig, HttpDocumentRemote};
use storage::repository::Storage;
use storage::{DocumentRemote, InMemoryDocumentRemote};
use visa_core::ProgressSummary;
use visa_core::model::{Category, QUESTION_BANK};

use crate::cli::{ArgsError, Args, Command, Parsed, print_usage};

const DEFAULT_OWNER_ID: &str = "local";

/// Pick the hosted backend when configured, otherwise an in-process stand-in.
fn document_remote(clock: Clock) -> Result<Arc<dyn DocumentRemote>, Box<dyn std::error::Error>> {
    match HttpDocumentConfig::from_env()? {
        Some(config) => {
            info!("event=backend_selected kind=http bucket={}", config.bucket());
            Ok(Arc::new(HttpDocumentRemote::new(config)))
        }
        None => {
            warn!("event=backend_selected kind=memory reason=not_configured");
            Ok(Arc::new(InMemoryDocumentRemote::new(clock)))
        }
    }
}

fn print_summary(summary: &ProgressSummary) {
    for category in Category::ALL {
        let style = category.presentation();
        println!("{:<10} {:>3}%", style.label, summary.get(category));
    }
    println!("{:<10} {:>3}%", "Overall", summary.overall);
}

/// Recompute derived progress and print anything the refresh raised.
async fn refresh(session: &mut AppSession) -> Result<ProgressSummary, Box<dyn std::error::Error>> {
    let summary = session.refresh_progress().await?;
    for notification in session.notifications().state().visible() {
        println!("* {}", notification.message());
    }
    Ok(summary)
}

async fn execute(mut session: AppSession, command: Command) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Summary => {
            let summary = refresh(&mut session).await?;
            print_summary(&summary);
        }
        Command::Progress {
            category,
            completed,
            total,
        } => {
            session
                .progress_mut()
                .update(category, completed, total)
                .await?;
            let summary = refresh(&mut session).await?;
            print_summary(&summary);
        }
        Command::TimelineList => {
            for milestone in session.timeline().timeline() {
                let location = milestone.location().unwrap_or("-");
                println!(
                    "{}  {}  {:<14} {}  ({location})",
                    milestone.id(),
                    milestone.date().format("%Y-%m-%d"),
                    milestone.kind().presentation().label,
                    milestone.title(),
                );
            }
            let counts = session.timeline().counts();
            println!(
                "key milestones: {}/{}",
                counts.completed(),
                counts.total()
            );
        }
        Command::TimelineAdd(draft) => {
            let id = session.timeline_mut().add(draft).await?;
            println!("{id}");
            refresh(&mut session).await?;
        }
        Command::TimelineRemove(id) => {
            let removed = session.timeline_mut().remove(id).await?;
            println!("removed {}", removed.title());
            refresh(&mut session).await?;
        }
        Command::InterviewQuestions => {
            let answers = session.interview().answers();
            for question in QUESTION_BANK {
                let mark = if answers.get(question.id).is_some() {
                    "x"
                } else {
                    " "
                };
                println!("[{mark}] {:<22} {}", question.id, question.prompt);
            }
        }
        Command::InterviewAnswer { question_id, text } => {
            session.interview_mut().answer(&question_id, &text).await?;
            refresh(&mut session).await?;
        }
        Command::DocumentsList => {
            session.sync_documents().await?;
            for record in session.documents().records() {
                println!(
                    "{}  {:<24} {:<10} {}",
                    record.id,
                    record.label.as_str(),
                    format!("{:?}", record.status).to_lowercase(),
                    record.name
                );
            }
            let counts = session.documents().counts();
            println!(
                "required: {}/{}  optional: {}/{}",
                counts.required().completed(),
                counts.required().total(),
                counts.optional().completed(),
                counts.optional().total()
            );
        }
        Command::DocumentsUpload { path, label } => {
            let file_name = path
                .file_name()
                .and_then(|name| name.to_str())
                .ok_or_else(|| ArgsError::InvalidValue {
                    what: "file",
                    raw: path.display().to_string(),
                })?
                .to_string();
            let bytes = std::fs::read(&path)?;
            let record = session
                .documents_mut()
                .upload(&file_name, label, bytes)
                .await?;
            println!("{}", record.id);
            refresh(&mut session).await?;
        }
        Command::DocumentsDelete(id) => {
            session.documents_mut().delete(&id).await?;
            refresh(&mut session).await?;
        }
        Command::ProfileShow => match session.profile().load().await? {
            Some(profile) => {
                println!("{} <{}>", profile.full_name(), profile.email());
                if let Some(partner) = profile.partner_name() {
                    println!("partner: {partner}");
                }
                println!("subclass: {}", profile.visa_subclass());
                if let Some(lodged) = profile.lodged_on() {
                    println!("lodged: {lodged}");
                }
            }
            None => println!("no profile saved"),
        },
        Command::ProfileSet(mut draft) => {
            draft.id = session.documents().owner_id().to_string();
            let profile = session.profile().save(draft).await?;
            println!("saved {}", profile.email());
        }
        Command::Reset => {
            session.end().await?;
            println!("local data cleared");
        }
    }
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let parsed = Args::parse(
        std::env::args().skip(1),
        std::env::var("VISA_DB_URL").ok(),
    )
    .map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;
    let args = match parsed {
        Parsed::Help => {
            print_usage();
            return Ok(());
        }
        Parsed::Run(args) => args,
    };

    let _logger = logging::init_logging(std::env::var(logging::LOG_LEVEL_ENV).ok().as_deref())?;

    // Open + migrate SQLite here so the library crates never touch the filesystem layout.
    prepare_sqlite_file(&args.db_url)?;
    let clock = Clock::system();
    let owner_id = std::env::var("VISA_OWNER_ID")
        .ok()
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_OWNER_ID.to_string());
    let remote = document_remote(clock)?;
    let storage = Storage::sqlite(&args.db_url).await?;
    let session = AppSession::start(storage, remote, &owner_id, clock).await?;

    execute(session, args.command).await
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" || db_url.starts_with("sqlite:file:") {
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

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
