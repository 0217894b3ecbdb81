//! Logger bootstrap for the binary.
//!
//! Library crates only emit through the `log` facade; this is the single
//! place a backend is installed. Output goes to stderr so command output on
//! stdout stays clean.

use flexi_logger::{Logger, LoggerHandle, WriteMode};
use log::info;

pub const LOG_LEVEL_ENV: &str = "VISA_LOG";
const DEFAULT_LOG_LEVEL: &str = "info";

/// Start the stderr logger. Keep the returned handle alive for the process.
///
/// # Errors
///
/// Returns a readable message for an unsupported level or a backend failure.
pub fn init_logging(level: Option<&str>) -> Result<LoggerHandle, String> {
    let level = normalize_level(level.unwrap_or(DEFAULT_LOG_LEVEL))?;
    let handle = Logger::try_with_str(level)
        .map_err(|err| format!("invalid log level `{level}`: {err}"))?
        .log_to_stderr()
        .write_mode(WriteMode::Direct)
        .format(flexi_logger::default_format)
        .start()
        .map_err(|err| format!("failed to start logger: {err}"))?;

    info!(
        "event=app_start level={level} version={}",
        env!("CARGO_PKG_VERSION")
    );
    Ok(handle)
}

fn normalize_level(level: &str) -> Result<&'static str, String> {
    match level.trim().to_ascii_lowercase().as_str() {
        "" => Ok(DEFAULT_LOG_LEVEL),
        "off" => Ok("off"),
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        other => Err(format!(
            "unsupported log level `{other}`; expected off|trace|debug|info|warn|error"
        )),
    }
}
