//! Logging setup shared by the toolkit's executables

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use colored::{ColoredString, Colorize};
use log::{info, Level, Record};
use std::fmt::Arguments;
use std::path::Path;
use thiserror::Error;

// Internal imports
use crate::session;

// Re-exports
pub use log::LevelFilter;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Dependencies whose records are only shown from this level up.
const QUIET_TARGETS: &[(&str, LevelFilter)] = &[("roxmltree", LevelFilter::Warn)];

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors associated with initialising the logger.
#[derive(Debug, Error)]
pub enum LoggerInitError {
    #[error("The minimum log level must include `INFO` records, found `{0}`")]
    InvalidMinLogLevel(LevelFilter),

    #[error("Cannot open the log file: {0}")]
    LogFileInitError(std::io::Error),

    #[error("A logger has already been installed: {0}")]
    FernInitError(log::SetLoggerError),
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Initialise the logger for this execution.
///
/// Records go to stdout and, if `log_file_path` is given, are appended to
/// that file as well. Every record is stamped with the seconds elapsed since
/// the session epoch.
///
/// # Notes
///
/// - `min_level` must be `Info` or more verbose.
/// - Only the first call installs a logger, later calls fail.
pub fn logger_init<P: AsRef<Path>>(
    min_level: LevelFilter,
    log_file_path: Option<P>,
) -> Result<(), LoggerInitError> {
    if min_level < Level::Info {
        return Err(LoggerInitError::InvalidMinLogLevel(min_level));
    }

    // Fix the epoch before the first record is stamped
    let epoch = session::get_epoch();

    let mut dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!("{}", format_record(message, record)))
        })
        .level(min_level);

    for (target, level) in QUIET_TARGETS.iter() {
        dispatch = dispatch.level_for(*target, *level);
    }

    dispatch = dispatch.chain(std::io::stdout());

    if let Some(ref path) = log_file_path {
        match fern::log_file(path.as_ref()) {
            Ok(f) => dispatch = dispatch.chain(f),
            Err(e) => return Err(LoggerInitError::LogFileInitError(e)),
        }
    }

    if let Err(e) = dispatch.apply() {
        return Err(LoggerInitError::FernInitError(e));
    }

    info!("Logger ready, session epoch {}, level {:?}", epoch, min_level);
    if let Some(path) = log_file_path {
        info!("Also logging to {:?}", path.as_ref());
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// `[ elapsed LVL] message`, with the record's target added for debug and
/// trace records.
fn format_record(message: &Arguments, record: &Record) -> String {
    let stamp = format!(
        "[{:10.6} {}]",
        session::get_elapsed_seconds(),
        level_tag(record.level())
    );

    if record.level() > Level::Info {
        format!("{} {}: {}", stamp, record.target(), message)
    } else {
        format!("{} {}", stamp, message)
    }
}

/// Short coloured tag of a log level
fn level_tag(level: Level) -> ColoredString {
    match level {
        Level::Trace => "TRC".dimmed().italic(),
        Level::Debug => "DBG".dimmed(),
        Level::Info => "INF".normal(),
        Level::Warn => "WRN".yellow(),
        Level::Error => "ERR".red().bold(),
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
