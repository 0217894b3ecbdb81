use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};
use visa_core::model::{
    Category, DocumentId, DocumentLabel, MilestoneDraft, MilestoneId, MilestoneKind,
    UserProfileDraft, VisaSubclass,
};

pub const DEFAULT_DB_URL: &str = "sqlite://visa.sqlite3";

#[derive(Debug)]
pub enum ArgsError {
    MissingValue { flag: &'static str },
    MissingArgument { name: &'static str },
    UnknownArg(String),
    UnknownCommand(String),
    InvalidDbUrl { raw: String },
    InvalidValue { what: &'static str, raw: String },
    DerivedCategory(Category),
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingArgument { name } => write!(f, "missing <{name}>"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown command: {cmd}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidValue { what, raw } => write!(f, "invalid {what}: {raw}"),
            ArgsError::DerivedCategory(category) => write!(
                f,
                "{category} progress is derived from its own records and cannot be set by hand"
            ),
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

fn require_arg(
    args: &mut impl Iterator<Item = String>,
    name: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingArgument { name })
}

fn parse_value<T: std::str::FromStr>(raw: String, what: &'static str) -> Result<T, ArgsError> {
    raw.parse()
        .map_err(|_| ArgsError::InvalidValue { what, raw })
}

/// Accepts `YYYY-MM-DD` (midnight UTC) or a full RFC 3339 timestamp.
fn parse_date(raw: String) -> Result<DateTime<Utc>, ArgsError> {
    if let Ok(at) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(at.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
        .ok()
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .map(|at| at.and_utc())
        .ok_or(ArgsError::InvalidValue { what: "date", raw })
}

fn ensure_done(args: &mut impl Iterator<Item = String>) -> Result<(), ArgsError> {
    match args.next() {
        Some(extra) => Err(ArgsError::UnknownArg(extra)),
        None => Ok(()),
    }
}

#[derive(Debug, Clone)]
pub enum Command {
    Summary,
    Progress {
        category: Category,
        completed: u32,
        total: u32,
    },
    TimelineList,
    TimelineAdd(MilestoneDraft),
    TimelineRemove(MilestoneId),
    InterviewQuestions,
    InterviewAnswer {
        question_id: String,
        text: String,
    },
    DocumentsList,
    DocumentsUpload {
        path: PathBuf,
        label: DocumentLabel,
    },
    DocumentsDelete(DocumentId),
    ProfileShow,
    ProfileSet(UserProfileDraft),
    Reset,
}

#[derive(Debug)]
pub enum Parsed {
    Help,
    Run(Args),
}

#[derive(Debug)]
pub struct Args {
    pub db_url: String,
    pub command: Command,
}

pub fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  visa [--db <sqlite_url>] <command>");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  summary");
    eprintln!("  progress forms <completed> <total>");
    eprintln!("  timeline list");
    eprintln!("  timeline add <date> <kind> <title> [--description <text>] [--location <place>]");
    eprintln!("  timeline remove <id>");
    eprintln!("  interview questions");
    eprintln!("  interview answer <question-id> <answer...>");
    eprintln!("  documents list");
    eprintln!("  documents upload <file> <label>");
    eprintln!("  documents delete <id>");
    eprintln!("  profile [set --name <n> --email <e> [--partner <p>] [--subclass <code>] [--lodged <date>]]");
    eprintln!("  reset");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db {DEFAULT_DB_URL}");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  VISA_DB_URL, VISA_OWNER_ID, VISA_LOG,");
    eprintln!("  VISA_BACKEND_URL, VISA_BACKEND_KEY, VISA_BACKEND_BUCKET");
}

impl Args {
    /// Parse global flags followed by a command.
    ///
    /// `env_db_url` is the value of `VISA_DB_URL`, if set.
    pub fn parse(
        argv: impl IntoIterator<Item = String>,
        env_db_url: Option<String>,
    ) -> Result<Parsed, ArgsError> {
        let mut args = argv.into_iter();
        let mut db_url = env_db_url.map_or_else(|| DEFAULT_DB_URL.to_string(), normalize_sqlite_url);

        let first = loop {
            let Some(arg) = args.next() else {
                return Ok(Parsed::Help);
            };
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--help" | "-h" | "help" => return Ok(Parsed::Help),
                flag if flag.starts_with("--") => return Err(ArgsError::UnknownArg(arg)),
                _ => break arg,
            }
        };

        let command = parse_command(&first, &mut args)?;
        Ok(Parsed::Run(Self { db_url, command }))
    }
}

fn parse_command(
    first: &str,
    args: &mut impl Iterator<Item = String>,
) -> Result<Command, ArgsError> {
    let command = match first {
        "summary" => Command::Summary,
        "reset" => Command::Reset,
        "progress" => {
            let category: Category = parse_value(require_arg(args, "category")?, "category")?;
            if !is_manual(category) {
                return Err(ArgsError::DerivedCategory(category));
            }
            let completed = parse_value(require_arg(args, "completed")?, "completed count")?;
            let total = parse_value(require_arg(args, "total")?, "total count")?;
            Command::Progress {
                category,
                completed,
                total,
            }
        }
        "timeline" => match require_arg(args, "list|add|remove")?.as_str() {
            "list" => Command::TimelineList,
            "add" => return parse_timeline_add(args),
            "remove" => {
                let id = parse_value(require_arg(args, "id")?, "milestone id")?;
                Command::TimelineRemove(id)
            }
            other => return Err(ArgsError::UnknownCommand(format!("timeline {other}"))),
        },
        "interview" => match require_arg(args, "questions|answer")?.as_str() {
            "questions" => Command::InterviewQuestions,
            "answer" => {
                let question_id = require_arg(args, "question-id")?;
                let text = args.collect::<Vec<_>>().join(" ");
                return Ok(Command::InterviewAnswer { question_id, text });
            }
            other => return Err(ArgsError::UnknownCommand(format!("interview {other}"))),
        },
        "documents" => match require_arg(args, "list|upload|delete")?.as_str() {
            "list" => Command::DocumentsList,
            "upload" => {
                let path = PathBuf::from(require_arg(args, "file")?);
                let label = parse_value(require_arg(args, "label")?, "document label")?;
                Command::DocumentsUpload { path, label }
            }
            "delete" => Command::DocumentsDelete(DocumentId::new(require_arg(args, "id")?)),
            other => return Err(ArgsError::UnknownCommand(format!("documents {other}"))),
        },
        "profile" => match args.next().as_deref() {
            None => return Ok(Command::ProfileShow),
            Some("set") => return parse_profile_set(args),
            Some(other) => return Err(ArgsError::UnknownCommand(format!("profile {other}"))),
        },
        other => return Err(ArgsError::UnknownCommand(other.to_string())),
    };
    ensure_done(args)?;
    Ok(command)
}

/// Only forms are tracked by hand; `refresh_progress` recomputes the rest.
fn is_manual(category: Category) -> bool {
    matches!(category, Category::Forms)
}

fn parse_timeline_add(args: &mut impl Iterator<Item = String>) -> Result<Command, ArgsError> {
    let date = parse_date(require_arg(args, "date")?)?;
    let kind: MilestoneKind = parse_value(require_arg(args, "kind")?, "milestone kind")?;
    let title = require_arg(args, "title")?;
    let mut draft = MilestoneDraft::new(date, kind, title);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--description" => draft = draft.with_description(require_value(args, "--description")?),
            "--location" => draft = draft.with_location(require_value(args, "--location")?),
            _ => return Err(ArgsError::UnknownArg(arg)),
        }
    }
    Ok(Command::TimelineAdd(draft))
}

fn parse_profile_set(args: &mut impl Iterator<Item = String>) -> Result<Command, ArgsError> {
    let mut draft = UserProfileDraft::default();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--name" => draft.full_name = require_value(args, "--name")?,
            "--email" => draft.email = require_value(args, "--email")?,
            "--partner" => draft.partner_name = Some(require_value(args, "--partner")?),
            "--subclass" => {
                let raw = require_value(args, "--subclass")?;
                draft.visa_subclass = parse_value::<VisaSubclass>(raw, "visa subclass")?;
            }
            "--lodged" => {
                let lodged = parse_date(require_value(args, "--lodged")?)?;
                draft.lodged_on = Some(lodged.date_naive());
            }
            _ => return Err(ArgsError::UnknownArg(arg)),
        }
    }
    Ok(Command::ProfileSet(draft))
}

pub fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") || raw.starts_with("sqlite:file:") {
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
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(line: &str) -> Vec<String> {
        line.split_whitespace().map(str::to_string).collect()
    }

    fn run(line: &str) -> Args {
        match Args::parse(argv(line), None).unwrap() {
            Parsed::Run(args) => args,
            Parsed::Help => panic!("expected a command for `{line}`"),
        }
    }

    #[test]
    fn no_arguments_prints_help() {
        assert!(matches!(Args::parse(Vec::new(), None).unwrap(), Parsed::Help));
        assert!(matches!(Args::parse(argv("--help"), None).unwrap(), Parsed::Help));
    }

    #[test]
    fn db_flag_overrides_env() {
        let parsed = Args::parse(
            argv("--db sqlite::memory: summary"),
            Some("sqlite:///tmp/env.sqlite3".into()),
        )
        .unwrap();
        let Parsed::Run(args) = parsed else {
            panic!("expected a command");
        };
        assert_eq!(args.db_url, "sqlite::memory:");
        assert!(matches!(args.command, Command::Summary));

        let from_env = Args::parse(argv("summary"), Some("sqlite:///tmp/env.sqlite3".into()))
            .unwrap();
        let Parsed::Run(args) = from_env else {
            panic!("expected a command");
        };
        assert_eq!(args.db_url, "sqlite:///tmp/env.sqlite3");
    }

    #[test]
    fn progress_arguments_are_typed() {
        let args = run("progress forms 3 4");
        assert!(matches!(
            args.command,
            Command::Progress {
                category: Category::Forms,
                completed: 3,
                total: 4
            }
        ));
        assert!(matches!(
            Args::parse(argv("progress forms three 4"), None),
            Err(ArgsError::InvalidValue { what: "completed count", .. })
        ));
        assert!(matches!(
            Args::parse(argv("progress forms 1 2 3"), None),
            Err(ArgsError::UnknownArg(_))
        ));
    }

    #[test]
    fn derived_categories_cannot_be_set_by_hand() {
        for line in [
            "progress timeline 3 6",
            "progress interview 5 10",
            "progress documents 3 7",
        ] {
            let err = Args::parse(argv(line), None).unwrap_err();
            assert!(matches!(err, ArgsError::DerivedCategory(_)), "{line}");
            assert!(err.to_string().contains("derived"));
        }
    }

    #[test]
    fn timeline_add_reads_options() {
        let args = run("timeline add 2021-06-12 moved-in Keys --location Brisbane");
        let Command::TimelineAdd(draft) = args.command else {
            panic!("expected timeline add");
        };
        assert_eq!(draft.kind, MilestoneKind::MovedIn);
        assert_eq!(draft.title, "Keys");
        assert_eq!(draft.location.as_deref(), Some("Brisbane"));
        assert_eq!(draft.date.to_rfc3339(), "2021-06-12T00:00:00+00:00");

        assert!(matches!(
            Args::parse(argv("timeline add 12/06/2021 moved_in Keys"), None),
            Err(ArgsError::InvalidValue { what: "date", .. })
        ));
    }

    #[test]
    fn interview_answer_joins_remaining_words() {
        let args = run("interview answer fin-bills We split rent evenly");
        let Command::InterviewAnswer { question_id, text } = args.command else {
            panic!("expected interview answer");
        };
        assert_eq!(question_id, "fin-bills");
        assert_eq!(text, "We split rent evenly");
    }

    #[test]
    fn unknown_commands_are_rejected() {
        assert!(matches!(
            Args::parse(argv("timeline shuffle"), None),
            Err(ArgsError::UnknownCommand(_))
        ));
        assert!(matches!(
            Args::parse(argv("--verbose summary"), None),
            Err(ArgsError::UnknownArg(_))
        ));
        assert!(matches!(
            Args::parse(argv("documents upload scan.pdf"), None),
            Err(ArgsError::MissingArgument { name: "label" })
        ));
    }

    #[test]
    fn relative_sqlite_paths_become_absolute() {
        let url = normalize_sqlite_url("sqlite:data/visa.sqlite3".into());
        assert!(url.starts_with("sqlite:///"));
        assert!(url.ends_with("data/visa.sqlite3"));
    }
}
