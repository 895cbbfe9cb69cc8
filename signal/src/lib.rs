//! # Signal library
//!
//! Unit-aware time series for processing and validating simulation results.
//!
//! A [`Signal`] is a named series of `(time, value)` samples carrying physical
//! units, a fixed significant-digit precision and a record of every processing
//! step applied to it. Operations never modify a signal in place, each returns
//! a new signal with the step appended to its history:
//!
//! ```ignore
//! let speed = Signal::new(&[0.0, 1.0, 2.0], &[3.0, 4.0, 5.0], SignalConfig::new("speed").unit_values("m/s"))?;
//! let speed_kmh = speed.convert(Axis::Values, "km/h")?;
//! let too_fast = speed_kmh.compare(Operator::Gt, 15.0, &CompareOptions::default())?;
//! ```

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

/// Error estimation for discretised simulation results
pub mod error_estimation;

/// The `Signal` time series and its operations
pub mod signal;

/// Error metrics between two results in the time domain
pub mod time_domain;

/// Unit validation, conversion and rounding
pub mod units;

// ---------------------------------------------------------------------------
// REEXPORTS
// ---------------------------------------------------------------------------

pub use crate::signal::{
    compare::{CompareOptions, ComparisonMode, ComparisonOutput, Operator, Reference},
    history::HistoryEntry,
    ops::{Operand, Quantity},
    Axis, InterpolationMethod, Signal, SignalConfig, SignalError, SignalUnits,
};
