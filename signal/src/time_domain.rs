//! # Time domain metrics
//!
//! Error measures between an experiment and a reference result over an
//! evaluation window, and threshold checks on them.
//!
//! Both results are sliced to the window and the experiment is brought onto
//! the time grid and value unit of the reference before the sample-wise error
//! `reference - experiment` is formed.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::info;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::{Axis, Signal, SignalError};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters of a time domain check.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TimeDomainParams {
    /// Start of the evaluated time window.
    pub eval_start: f64,

    /// End of the evaluated time window.
    pub eval_end: f64,

    /// Largest accepted value of the metric. MAPE is in percent, all other
    /// metrics are in the reference's value unit except for the unitless TIC.
    pub threshold: f64,
}

/// Outcome of a time domain check.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricCheck {
    pub metric: Metric,
    pub passed: bool,
    pub value: f64,
    pub log: String,
}

/// Experiment and reference restricted to the evaluation window.
struct Windowed {
    experiment: Signal,
    reference: Signal,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// Mean absolute error
    Mae,

    /// Mean squared error
    Mse,

    /// Root mean squared error
    Rmse,

    /// Mean absolute percent error
    Mape,

    /// Theil's inequality coefficient
    Tic,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TimeDomainError {
    #[error("Evaluation start {start} must not be greater than evaluation end {end}")]
    InvalidWindow { start: f64, end: f64 },

    #[error("The threshold must be a non-negative number, found {0}")]
    InvalidThreshold(f64),

    #[error("Signal error: {0}")]
    SignalError(SignalError),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Metric {
    /// Compute the metric between the two results inside `[start, end]`.
    pub fn calc(
        &self,
        experiment: &Signal,
        reference: &Signal,
        start: f64,
        end: f64,
    ) -> Result<f64, TimeDomainError> {
        let w = window(experiment, reference, start, end)?;

        let value = match self {
            Metric::Mae => mean(&error(&w)?, f64::abs),
            Metric::Mse => mean(&error(&w)?, |e| e * e),
            Metric::Rmse => mean(&error(&w)?, |e| e * e).sqrt(),
            Metric::Mape => {
                let rel = match error(&w)?.divide(&w.reference) {
                    Ok(r) => r,
                    Err(e) => return Err(TimeDomainError::SignalError(e)),
                };
                100.0 * mean(&rel, f64::abs)
            }
            Metric::Tic => {
                let rmse = mean(&error(&w)?, |e| e * e).sqrt();
                let experiment = match w
                    .experiment
                    .convert(Axis::Values, &w.reference.units().values)
                {
                    Ok(e) => e,
                    Err(e) => return Err(TimeDomainError::SignalError(e)),
                };

                let denominator = rms(&w.reference) + rms(&experiment);
                if denominator == 0.0 {
                    0.0
                } else {
                    rmse / denominator
                }
            }
        };

        Ok(value)
    }

    fn describe(&self) -> &'static str {
        match self {
            Metric::Mae => "mean absolute error",
            Metric::Mse => "mean squared error",
            Metric::Rmse => "root mean squared error",
            Metric::Mape => "mean absolute percent error",
            Metric::Tic => "Theil's inequality coefficient",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Metric::Mae => "mae",
            Metric::Mse => "mse",
            Metric::Rmse => "rmse",
            Metric::Mape => "mape",
            Metric::Tic => "tic",
        };

        write!(f, "{}", s)
    }
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mae" => Ok(Metric::Mae),
            "mse" => Ok(Metric::Mse),
            "rmse" => Ok(Metric::Rmse),
            "mape" => Ok(Metric::Mape),
            "tic" => Ok(Metric::Tic),
            _ => Err(format!("Unknown time domain metric {:?}", s)),
        }
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Check that a metric between experiment and reference does not exceed the
/// threshold.
pub fn check_metric(
    metric: Metric,
    experiment: &Signal,
    reference: &Signal,
    params: &TimeDomainParams,
) -> Result<MetricCheck, TimeDomainError> {
    if !(params.threshold >= 0.0) {
        return Err(TimeDomainError::InvalidThreshold(params.threshold));
    }

    let value = metric.calc(experiment, reference, params.eval_start, params.eval_end)?;
    let passed = value <= params.threshold;

    let log = if passed {
        format!("{} is below threshold", metric.describe())
    } else {
        format!("{} exceeds threshold", metric.describe())
    };

    info!(
        "{} of {:?} against {:?} is {} (threshold {}): {}",
        metric,
        experiment.name,
        reference.name,
        value,
        params.threshold,
        log
    );

    Ok(MetricCheck {
        metric,
        passed,
        value,
        log,
    })
}

pub fn check_mae(
    experiment: &Signal,
    reference: &Signal,
    params: &TimeDomainParams,
) -> Result<MetricCheck, TimeDomainError> {
    check_metric(Metric::Mae, experiment, reference, params)
}

pub fn check_mse(
    experiment: &Signal,
    reference: &Signal,
    params: &TimeDomainParams,
) -> Result<MetricCheck, TimeDomainError> {
    check_metric(Metric::Mse, experiment, reference, params)
}

pub fn check_rmse(
    experiment: &Signal,
    reference: &Signal,
    params: &TimeDomainParams,
) -> Result<MetricCheck, TimeDomainError> {
    check_metric(Metric::Rmse, experiment, reference, params)
}

/// Fails with a signal error if the reference is zero anywhere in the window.
pub fn check_mape(
    experiment: &Signal,
    reference: &Signal,
    params: &TimeDomainParams,
) -> Result<MetricCheck, TimeDomainError> {
    check_metric(Metric::Mape, experiment, reference, params)
}

pub fn check_tic(
    experiment: &Signal,
    reference: &Signal,
    params: &TimeDomainParams,
) -> Result<MetricCheck, TimeDomainError> {
    check_metric(Metric::Tic, experiment, reference, params)
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn window(
    experiment: &Signal,
    reference: &Signal,
    start: f64,
    end: f64,
) -> Result<Windowed, TimeDomainError> {
    if start > end {
        return Err(TimeDomainError::InvalidWindow { start, end });
    }

    let slice = |s: &Signal| {
        s.slice_to_time(start, end)
            .map_err(TimeDomainError::SignalError)
    };

    Ok(Windowed {
        experiment: slice(experiment)?,
        reference: slice(reference)?,
    })
}

/// Sample-wise `reference - experiment` on the reference's grid.
fn error(w: &Windowed) -> Result<Signal, TimeDomainError> {
    w.reference
        .subtract(&w.experiment)
        .map_err(TimeDomainError::SignalError)
}

fn mean<F: Fn(f64) -> f64>(signal: &Signal, f: F) -> f64 {
    signal.values().iter().map(|&v| f(v)).sum::<f64>() / signal.len() as f64
}

/// Root mean square of the values.
fn rms(signal: &Signal) -> f64 {
    mean(signal, |v| v * v).sqrt()
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
