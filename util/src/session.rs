//! Session management
//!
//! A session is the lifetime of one process using the toolkit. The only state
//! it carries is the epoch against which log timestamps are measured.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use chrono::{DateTime, Utc};
use conquer_once::OnceCell;
use thiserror::Error;

// ---------------------------------------------------------------------------
// STATICS
// ---------------------------------------------------------------------------

static SESSION_EPOCH: OnceCell<DateTime<Utc>> = OnceCell::uninit();

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of nanoseconds in a second
const NANOS_PER_SECOND: f64 = 1e9;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors associated with the session module.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("The session epoch is already set ({0})")]
    EpochAlreadySet(conquer_once::TryInitError),
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Set the session epoch to the current time.
///
/// Calling this more than once is an error, the first epoch is kept.
pub fn init_epoch() -> Result<&'static DateTime<Utc>, SessionError> {
    if let Err(e) = SESSION_EPOCH.try_init_once(Utc::now) {
        return Err(SessionError::EpochAlreadySet(e));
    }

    Ok(get_epoch())
}

/// Get the number of seconds elapsed since the start of the session.
///
/// If the epoch has not been initialised yet it is initialised by this call,
/// so the first reading is always zero.
pub fn get_elapsed_seconds() -> f64 {
    let elapsed = Utc::now() - *get_epoch();

    match elapsed.num_nanoseconds() {
        Some(ns) => ns as f64 / NANOS_PER_SECOND,
        None => std::f64::NAN,
    }
}

/// Return a reference to the session's epoch, initialising it if needed.
pub fn get_epoch() -> &'static DateTime<Utc> {
    SESSION_EPOCH.get_or_init(Utc::now)
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
