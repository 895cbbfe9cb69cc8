//! # Signal
//!
//! Named, unit-tagged, fixed-precision time series with a processing history.
//!
//! Every stored number is rounded to the signal's precision when it is
//! assigned. Operations take `&self` and return a new [`Signal`] holding the
//! post-operation state, the receiver is never modified.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod compare;
pub mod history;
pub mod interp;
pub mod ops;
pub mod slice;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use chrono::Utc;
use log::trace;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// Internal
use crate::units::{self, UnitError};
use history::HistoryEntry;

pub use interp::InterpolationMethod;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Time unit used when none is given.
pub const DEFAULT_TIME_UNIT: &str = "s";

/// Value unit used when none is given.
pub const DEFAULT_VALUES_UNIT: &str = units::UNITLESS;

/// Number of significant digits used when none is given.
pub const DEFAULT_PRECISION: usize = 6;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A time series of samples with physical units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    /// Name of the signal
    pub name: String,

    time: Vec<f64>,

    values: Vec<f64>,

    units: SignalUnits,

    precision: usize,

    history: Vec<HistoryEntry>,
}

/// Units of both axes of a signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalUnits {
    pub time: String,
    pub values: String,
}

/// Configuration of a new signal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalConfig {
    pub name: String,

    #[serde(default = "default_time_unit")]
    pub unit_time: String,

    #[serde(default = "default_values_unit")]
    pub unit_values: String,

    /// Number of significant digits kept for every number in the signal.
    #[serde(default = "default_precision")]
    pub precision: usize,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// One of the two axes of a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Time,
    Values,
}

/// Errors raised by signal operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SignalError {
    #[error("Time and value arrays must not be empty")]
    Empty,

    #[error("Time and value arrays must be of the same length, got {time} and {values}")]
    LengthMismatch { time: usize, values: usize },

    #[error("The {0} array contains a non-finite number at index {1}")]
    NonFinite(Axis, usize),

    #[error("Precision must be at least 1, found {0}")]
    InvalidPrecision(usize),

    #[error("Unit error: {0}")]
    UnitError(UnitError),

    #[error("Axis must be either \"time\" or \"values\", found {0:?}")]
    InvalidAxis(String),

    #[error("Signal length must be greater than 1 to identify the step size")]
    TooShortForTimestep,

    #[error("The time steps of the signal are not equal")]
    NonUniformTimestep,

    #[error("Cannot revert to step {step}, the signal has undergone {len} processing steps")]
    InvalidRevertStep { step: usize, len: usize },

    #[error("Slice start {start} must not be greater than slice end {end}")]
    SliceStartAfterEnd { start: f64, end: f64 },

    #[error("Slice bounds [{start}, {end}] lie outside of the signal's time range")]
    SliceOutOfRange { start: f64, end: f64 },

    #[error("Slicing would result in empty arrays")]
    EmptySlice,

    #[error("Cannot combine signals of different duration ({lhs} and {rhs})")]
    DurationMismatch { lhs: f64, rhs: f64 },

    #[error("Operands must be finite numbers, found {0}")]
    NonFiniteOperand(f64),

    #[error("Division by zero is not allowed")]
    DivideByZero,

    #[error("The target time array must contain at least one value")]
    EmptyInterpolationTarget,

    #[error("The target time array must be strictly monotonically increasing")]
    NonMonotonicTarget,

    #[error("Time {t} lies outside of the signal's time range [{start}, {end}]")]
    TimeOutOfRange { t: f64, start: f64, end: f64 },

    #[error("Invalid comparison: {0}")]
    InvalidComparison(String),

    #[error("Cannot serialise the signal: {0}")]
    SerialiseError(String),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Signal {
    /// Create a new signal from time and value arrays.
    ///
    /// Both arrays are copied and rounded to the configured precision.
    pub fn new(time: &[f64], values: &[f64], config: SignalConfig) -> Result<Self, SignalError> {
        if time.is_empty() || values.is_empty() {
            return Err(SignalError::Empty);
        }
        if time.len() != values.len() {
            return Err(SignalError::LengthMismatch {
                time: time.len(),
                values: values.len(),
            });
        }
        check_finite(Axis::Time, time)?;
        check_finite(Axis::Values, values)?;

        if config.precision < 1 {
            return Err(SignalError::InvalidPrecision(config.precision));
        }

        for unit in [&config.unit_time, &config.unit_values].iter() {
            if !units::is_unit_valid(unit) {
                return Err(SignalError::UnitError(UnitError::InvalidUnit(
                    unit.to_string(),
                )));
            }
        }

        let mut signal = Self {
            name: config.name,
            time: round_all(time, config.precision),
            values: round_all(values, config.precision),
            units: SignalUnits {
                time: config.unit_time,
                values: config.unit_values,
            },
            precision: config.precision,
            history: Vec::new(),
        };
        signal.push_history("initialized signal");

        trace!("Created signal {:?} with {} samples", signal.name, signal.len());

        Ok(signal)
    }

    /// Deep copy of this signal, including its history.
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// Sample times of the signal.
    pub fn time(&self) -> &[f64] {
        &self.time
    }

    /// Sample values of the signal.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn units(&self) -> &SignalUnits {
        &self.units
    }

    pub fn precision(&self) -> usize {
        self.precision
    }

    /// Every processing step the signal has undergone, oldest first.
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.time.len()
    }

    /// Signals are never empty, this exists for API completeness.
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Time between the first and last sample, rounded to the precision.
    pub fn duration(&self) -> f64 {
        units::round(self.last_time() - self.first_time(), self.precision)
    }

    /// The constant step size between samples.
    ///
    /// Fails if the signal has fewer than two samples or if the steps,
    /// rounded to the precision, are not all equal.
    pub fn timestep(&self) -> Result<f64, SignalError> {
        if self.len() < 2 {
            return Err(SignalError::TooShortForTimestep);
        }

        let diffs: Vec<f64> = self
            .time
            .windows(2)
            .map(|w| units::round(w[1] - w[0], self.precision))
            .collect();

        let step = diffs[0];
        if diffs.iter().any(|&dt| dt != step) {
            return Err(SignalError::NonUniformTimestep);
        }

        Ok(step)
    }

    /// Replace the values of the signal.
    pub fn with_values(&self, values: &[f64]) -> Result<Self, SignalError> {
        if values.len() != self.len() {
            return Err(SignalError::LengthMismatch {
                time: self.len(),
                values: values.len(),
            });
        }
        check_finite(Axis::Values, values)?;

        Ok(self.derive(
            self.time.clone(),
            round_all(values, self.precision),
            self.units.clone(),
            "manual change of values",
        ))
    }

    /// Replace the sample times of the signal.
    pub fn with_time(&self, time: &[f64]) -> Result<Self, SignalError> {
        if time.len() != self.len() {
            return Err(SignalError::LengthMismatch {
                time: time.len(),
                values: self.len(),
            });
        }
        check_finite(Axis::Time, time)?;

        Ok(self.derive(
            round_all(time, self.precision),
            self.values.clone(),
            self.units.clone(),
            "manual change of time",
        ))
    }

    /// Return the signal as it was at history step `step` (counting from 1).
    ///
    /// If no step is given the signal is reverted by one step. The history of
    /// the returned signal ends at the reverted step.
    pub fn revert(&self, step: Option<usize>) -> Result<Self, SignalError> {
        let len = self.history.len();
        let step = step.unwrap_or_else(|| len.saturating_sub(1));

        if step == 0 || step > len {
            return Err(SignalError::InvalidRevertStep { step, len });
        }

        let entry = &self.history[step - 1];

        let mut reverted = self.clone();
        reverted.time = entry.time.clone();
        reverted.values = entry.values.clone();
        reverted.units = entry.units.clone();
        reverted.history.truncate(step);

        Ok(reverted)
    }

    /// Serialise the signal to JSON.
    ///
    /// The output contains name, length, time, duration, values and both
    /// units. If `verbose` is set the precision and history are included too.
    pub fn print(&self, verbose: bool) -> Result<String, SignalError> {
        let view = PrintView {
            name: &self.name,
            length: self.len(),
            time: &self.time,
            duration: self.duration(),
            values: &self.values,
            unit_time: &self.units.time,
            unit_values: &self.units.values,
            precision: if verbose { Some(self.precision) } else { None },
            history: if verbose { Some(&self.history) } else { None },
        };

        serde_json::to_string(&view).map_err(|e| SignalError::SerialiseError(e.to_string()))
    }

    pub(crate) fn first_time(&self) -> f64 {
        self.time[0]
    }

    pub(crate) fn last_time(&self) -> f64 {
        self.time[self.time.len() - 1]
    }

    pub(crate) fn axis(&self, axis: Axis) -> &[f64] {
        match axis {
            Axis::Time => &self.time,
            Axis::Values => &self.values,
        }
    }

    pub(crate) fn axis_unit(&self, axis: Axis) -> &str {
        match axis {
            Axis::Time => &self.units.time,
            Axis::Values => &self.units.values,
        }
    }

    /// Build the post-operation state of this signal, recording the operation
    /// in its history.
    pub(crate) fn derive(
        &self,
        time: Vec<f64>,
        values: Vec<f64>,
        units: SignalUnits,
        description: &str,
    ) -> Self {
        let mut next = Self {
            name: self.name.clone(),
            time,
            values,
            units,
            precision: self.precision,
            history: self.history.clone(),
        };
        next.push_history(description);

        trace!("Signal {:?}: {}", next.name, description);

        next
    }

    fn push_history(&mut self, description: &str) {
        self.history.push(HistoryEntry {
            step: self.history.len() + 1,
            timestamp: Utc::now(),
            time: self.time.clone(),
            values: self.values.clone(),
            units: self.units.clone(),
            description: description.into(),
        });
    }
}

impl SignalConfig {
    /// Configuration with the given name and all defaults.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.into(),
            unit_time: default_time_unit(),
            unit_values: default_values_unit(),
            precision: default_precision(),
        }
    }

    pub fn unit_time(mut self, unit: &str) -> Self {
        self.unit_time = unit.into();
        self
    }

    pub fn unit_values(mut self, unit: &str) -> Self {
        self.unit_values = unit.into();
        self
    }

    pub fn precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Time => write!(f, "time"),
            Axis::Values => write!(f, "values"),
        }
    }
}

impl FromStr for Axis {
    type Err = SignalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "time" => Ok(Axis::Time),
            "values" => Ok(Axis::Values),
            _ => Err(SignalError::InvalidAxis(s.into())),
        }
    }
}

impl From<UnitError> for SignalError {
    fn from(e: UnitError) -> Self {
        SignalError::UnitError(e)
    }
}

// ---------------------------------------------------------------------------
// PRIVATE STRUCTS
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct PrintView<'a> {
    name: &'a str,
    length: usize,
    time: &'a [f64],
    duration: f64,
    values: &'a [f64],
    unit_time: &'a str,
    unit_values: &'a str,

    #[serde(skip_serializing_if = "Option::is_none")]
    precision: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    history: Option<&'a [HistoryEntry]>,
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Round every element of `array` to `precision` significant digits.
pub(crate) fn round_all(array: &[f64], precision: usize) -> Vec<f64> {
    array.iter().map(|&v| units::round(v, precision)).collect()
}

fn check_finite(axis: Axis, array: &[f64]) -> Result<(), SignalError> {
    match array.iter().position(|v| !v.is_finite()) {
        Some(i) => Err(SignalError::NonFinite(axis, i)),
        None => Ok(()),
    }
}

fn default_time_unit() -> String {
    DEFAULT_TIME_UNIT.into()
}

fn default_values_unit() -> String {
    DEFAULT_VALUES_UNIT.into()
}

fn default_precision() -> usize {
    DEFAULT_PRECISION
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn ramp() -> Signal {
        Signal::new(
            &[0.0, 0.1, 0.2, 0.3],
            &[1.0, 2.0, 3.0, 4.0],
            SignalConfig::new("ramp").unit_values("m"),
        )
        .unwrap()
    }

    #[test]
    fn test_new_rounds_values() -> Result<(), SignalError> {
        let s = Signal::new(
            &[1.4, 1.5, 1.6],
            &[0.0, 4.7, 16.9],
            SignalConfig::new("s").precision(2),
        )?;

        assert_eq!(s.values(), &[0.0, 4.7, 17.0]);
        assert_eq!(s.units().time, "s");
        assert_eq!(s.units().values, "-");
        assert_eq!(s.history().len(), 1);
        assert_eq!(s.history()[0].description, "initialized signal");

        Ok(())
    }

    #[test]
    fn test_new_rejects_invalid_input() {
        let cfg = || SignalConfig::new("bad");

        assert_eq!(Signal::new(&[], &[], cfg()), Err(SignalError::Empty));
        assert_eq!(
            Signal::new(&[0.0, 1.0], &[1.0], cfg()),
            Err(SignalError::LengthMismatch { time: 2, values: 1 })
        );
        assert_eq!(
            Signal::new(&[0.0, 1.0], &[1.0, std::f64::NAN], cfg()),
            Err(SignalError::NonFinite(Axis::Values, 1))
        );
        assert_eq!(
            Signal::new(&[0.0], &[1.0], cfg().precision(0)),
            Err(SignalError::InvalidPrecision(0))
        );
        assert!(matches!(
            Signal::new(&[0.0], &[1.0], cfg().unit_values("parsecz")),
            Err(SignalError::UnitError(UnitError::InvalidUnit(_)))
        ));
    }

    #[test]
    fn test_config_from_toml() {
        let cfg: SignalConfig = util::params::from_str("name = \"v\"\nunit_values = \"m/s\"\n")
            .expect("config should deserialise");

        assert_eq!(cfg.name, "v");
        assert_eq!(cfg.unit_time, "s");
        assert_eq!(cfg.unit_values, "m/s");
        assert_eq!(cfg.precision, 6);
    }

    #[test]
    fn test_copy_is_independent() {
        let s = ramp();
        let mut c = s.copy();

        assert_eq!(c, s);

        c.name = String::from("other");
        assert_eq!(s.name, "ramp");
        assert_eq!(c.values(), s.values());
    }

    #[test]
    fn test_duration_and_timestep() -> Result<(), SignalError> {
        let s = ramp();

        assert_eq!(s.duration(), 0.3);
        assert_eq!(s.timestep()?, 0.1);

        let single = Signal::new(&[1.0], &[1.0], SignalConfig::new("one"))?;
        assert_eq!(single.timestep(), Err(SignalError::TooShortForTimestep));

        let uneven = Signal::new(&[0.0, 0.1, 0.3], &[1.0, 1.0, 1.0], SignalConfig::new("u"))?;
        assert_eq!(uneven.timestep(), Err(SignalError::NonUniformTimestep));

        Ok(())
    }

    #[test]
    fn test_with_values() -> Result<(), SignalError> {
        let s = ramp();
        let changed = s.with_values(&[4.0, 3.0, 2.0, 1.0])?;

        assert_eq!(changed.values(), &[4.0, 3.0, 2.0, 1.0]);
        assert_eq!(s.values(), &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(
            changed.history().last().map(|h| h.description.as_str()),
            Some("manual change of values")
        );
        assert!(s.with_values(&[1.0]).is_err());

        Ok(())
    }

    #[test]
    fn test_revert() -> Result<(), SignalError> {
        let s = ramp();
        let converted = s.convert(Axis::Values, "cm")?;
        let added = converted.add(1.0)?;

        assert_eq!(added.history().len(), 3);

        // Default reverts by a single step
        let back = added.revert(None)?;
        assert_eq!(back.values(), converted.values());
        assert_eq!(back.history().len(), 2);

        // Units are restored with the values
        let start = added.revert(Some(1))?;
        assert_eq!(start.values(), s.values());
        assert_eq!(start.units().values, "m");

        // The receiver keeps its full timeline
        assert_eq!(added.history().len(), 3);
        assert_eq!(added.values(), &[101.0, 201.0, 301.0, 401.0]);

        assert_eq!(
            added.revert(Some(4)),
            Err(SignalError::InvalidRevertStep { step: 4, len: 3 })
        );
        assert!(added.revert(Some(0)).is_err());

        Ok(())
    }

    #[test]
    fn test_print() -> Result<(), SignalError> {
        let s = ramp();

        let short: serde_json::Value = serde_json::from_str(&s.print(false)?).unwrap();
        assert_eq!(short["name"], "ramp");
        assert_eq!(short["length"], 4);
        assert_eq!(short["duration"], 0.3);
        assert_eq!(short["unit_values"], "m");
        assert!(short.get("precision").is_none());
        assert!(short.get("history").is_none());

        let verbose: serde_json::Value = serde_json::from_str(&s.print(true)?).unwrap();
        assert_eq!(verbose["precision"], 6);
        assert_eq!(verbose["history"][0]["step"], 1);

        Ok(())
    }

    #[test]
    fn test_axis_from_str() {
        assert_eq!("time".parse::<Axis>(), Ok(Axis::Time));
        assert_eq!("values".parse::<Axis>(), Ok(Axis::Values));
        assert!("value".parse::<Axis>().is_err());
    }
}
