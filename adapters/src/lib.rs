//! # Simulation result adapters
//!
//! Translate CSV result files of simulation tools into [`signal::Signal`]s,
//! one signal per value column sharing the file's time column.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

/// esmini scenario player results
pub mod esmini;

/// OpenMCX co-simulation results
pub mod openmcx;

mod table;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use signal::SignalError;
use thiserror::Error;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors raised while translating a result file.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("Could not open the CSV file: {0}")]
    FileOpenError(std::io::Error),

    #[error("The CSV file ends before header line {0}")]
    MissingHeader(usize),

    #[error("Invalid separator definition {0:?}, expected e.g. \"sep=,\"")]
    InvalidSeparator(String),

    #[error("Could not read the CSV data: {0}")]
    CsvError(csv::Error),

    #[error("The CSV file contains no data rows")]
    NoData,

    #[error("No time column {0:?} found")]
    MissingTimeColumn(&'static str),

    #[error("Column {column:?} has no value in data row {row}")]
    MissingValue { column: String, row: usize },

    #[error("Value {value:?} of column {column:?} is not a number")]
    InvalidValue { column: String, value: String },

    #[error("{0} does not exist in the result file")]
    UnknownSignal(String),

    #[error("Cannot build signal {0:?}: {1}")]
    SignalError(String, SignalError),
}
