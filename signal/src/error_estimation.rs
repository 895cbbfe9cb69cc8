//! # Discretization error estimation
//!
//! Generalised Richardson extrapolation over two simulation results of the
//! same experiment computed with different, constant time steps.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{debug, info};
use serde::Deserialize;
use thiserror::Error;

use crate::{Signal, SignalError};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters of a discretization error check.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ErrorEstimationParams {
    /// Start of the evaluated time window.
    pub eval_start: f64,

    /// End of the evaluated time window.
    pub eval_end: f64,

    /// Accuracy order of the numerical scheme.
    #[serde(default = "default_order")]
    pub order: u32,

    /// Allowed relative discretization error in percent.
    pub threshold_percent: f64,
}

/// Outcome of a discretization error check.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscretizationCheck {
    pub passed: bool,

    /// Largest relative error of the fine solution in percent.
    pub max_error_percent: f64,

    pub log: String,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ErrorEstimationError {
    #[error("The order of the numerical scheme must be at least 1, found {0}")]
    InvalidOrder(u32),

    #[error("The durations of both signals differ ({0} and {1})")]
    DurationMismatch(f64, f64),

    #[error("The signals do not start at the same time ({0} and {1})")]
    StartMismatch(f64, f64),

    #[error("The time steps of both signals must differ, both are {0}")]
    EqualTimesteps(f64),

    #[error("The error threshold must be a non-negative percentage, found {0}")]
    InvalidThreshold(f64),

    #[error("Signal error: {0}")]
    SignalError(SignalError),
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Estimate the exact solution from two results with different time steps.
///
/// The finer result is interpolated onto the coarse time grid and the
/// estimate `fine + (fine - coarse) / (r^order - 1)` is returned, where `r`
/// is the ratio of the coarse to the fine time step. The order of the
/// arguments doesn't matter.
pub fn richardson_extrapolation(
    results_1: &Signal,
    results_2: &Signal,
    order: u32,
) -> Result<Signal, ErrorEstimationError> {
    if order < 1 {
        return Err(ErrorEstimationError::InvalidOrder(order));
    }

    if results_1.duration() != results_2.duration() {
        return Err(ErrorEstimationError::DurationMismatch(
            results_1.duration(),
            results_2.duration(),
        ));
    }

    if results_1.time()[0] != results_2.time()[0] {
        return Err(ErrorEstimationError::StartMismatch(
            results_1.time()[0],
            results_2.time()[0],
        ));
    }

    let dt_1 = results_1.timestep().map_err(ErrorEstimationError::SignalError)?;
    let dt_2 = results_2.timestep().map_err(ErrorEstimationError::SignalError)?;

    let (coarse, fine, coarse_step, fine_step) = if dt_1 > dt_2 {
        (results_1, results_2, dt_1, dt_2)
    } else if dt_2 > dt_1 {
        (results_2, results_1, dt_2, dt_1)
    } else {
        return Err(ErrorEstimationError::EqualTimesteps(dt_1));
    };

    // Mesh refinement factor
    let r = coarse_step / fine_step;

    debug!(
        "Richardson extrapolation with refinement factor {} and order {}",
        r, order
    );

    extrapolate(coarse, fine, r.powi(order as i32) - 1.0)
        .map_err(ErrorEstimationError::SignalError)
}

/// Check that the discretization error of two results stays within the
/// allowed threshold inside the evaluation window.
///
/// The error is measured between the finer result and the exact solution
/// estimated by [`richardson_extrapolation`], relative to the estimate.
pub fn verify_discretization_error(
    results_1: &Signal,
    results_2: &Signal,
    params: &ErrorEstimationParams,
) -> Result<DiscretizationCheck, ErrorEstimationError> {
    if !(params.threshold_percent >= 0.0) {
        return Err(ErrorEstimationError::InvalidThreshold(
            params.threshold_percent,
        ));
    }

    let slice = |s: &Signal| {
        s.slice_to_time(params.eval_start, params.eval_end)
            .map_err(ErrorEstimationError::SignalError)
    };
    let results_1 = slice(results_1)?;
    let results_2 = slice(results_2)?;

    let exact = richardson_extrapolation(&results_1, &results_2, params.order)?;

    let fine = if results_1.len() > results_2.len() {
        &results_1
    } else {
        &results_2
    };

    let rel_error = match fine
        .interpolate(exact.time())
        .and_then(|f| f.subtract(&exact))
        .and_then(|diff| diff.divide(&exact))
    {
        Ok(e) => e,
        Err(e) => return Err(ErrorEstimationError::SignalError(e)),
    };

    let max_error_percent = rel_error
        .values()
        .iter()
        .map(|e| 100.0 * e.abs())
        .fold(0.0, f64::max);

    let passed = max_error_percent <= params.threshold_percent;

    let log = if passed {
        "discretization error is below allowed error"
    } else {
        "discretization error exceeds allowed error"
    };

    info!(
        "Maximum discretization error {:.3} % (allowed {} %): {}",
        max_error_percent, params.threshold_percent, log
    );

    Ok(DiscretizationCheck {
        passed,
        max_error_percent,
        log: log.into(),
    })
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn extrapolate(coarse: &Signal, fine: &Signal, divisor: f64) -> Result<Signal, SignalError> {
    let fine = fine.interpolate(coarse.time())?;
    let correction = fine.subtract(coarse)?.divide(divisor)?;

    fine.add(&correction)
}

fn default_order() -> u32 {
    2
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::SignalConfig;
    use approx::assert_relative_eq;

    fn coarse() -> Signal {
        Signal::new(&[0.0, 1.0, 2.0], &[1.0, 2.0, 5.0], SignalConfig::new("coarse")).unwrap()
    }

    fn fine() -> Signal {
        Signal::new(
            &[0.0, 0.5, 1.0, 1.5, 2.0],
            &[1.0, 1.5, 2.5, 4.0, 5.5],
            SignalConfig::new("fine"),
        )
        .unwrap()
    }

    #[test]
    fn test_richardson_extrapolation() {
        let order = 2;
        let r: f64 = 2.0;

        let exact = richardson_extrapolation(&fine(), &coarse(), order).unwrap();

        assert_eq!(exact.time(), coarse().time());

        let fine_on_coarse = [1.0, 2.5, 5.5];
        for ((e, f), c) in exact
            .values()
            .iter()
            .zip(fine_on_coarse.iter())
            .zip(coarse().values().iter())
        {
            assert_relative_eq!(*e, f + (f - c) / (r.powi(order as i32) - 1.0), epsilon = 1e-5);
        }

        // Argument order is irrelevant
        let swapped = richardson_extrapolation(&coarse(), &fine(), order).unwrap();
        assert_eq!(swapped.values(), exact.values());
    }

    #[test]
    fn test_richardson_rejects_invalid_input() {
        assert_eq!(
            richardson_extrapolation(&fine(), &coarse(), 0),
            Err(ErrorEstimationError::InvalidOrder(0))
        );

        assert_eq!(
            richardson_extrapolation(&coarse(), &coarse(), 2),
            Err(ErrorEstimationError::EqualTimesteps(1.0))
        );

        let shorter = coarse().slice_to_time(0.0, 1.0).unwrap();
        assert!(matches!(
            richardson_extrapolation(&fine(), &shorter, 2),
            Err(ErrorEstimationError::DurationMismatch(..))
        ));

        let shifted = coarse().with_time(&[1.0, 2.0, 3.0]).unwrap();
        assert!(matches!(
            richardson_extrapolation(&fine(), &shifted, 2),
            Err(ErrorEstimationError::StartMismatch(..))
        ));
    }

    #[test]
    fn test_verify_discretization_error() {
        let mut params: ErrorEstimationParams = util::params::from_str(
            "eval_start = 0.0\neval_end = 2.0\nthreshold_percent = 10.0\n",
        )
        .unwrap();
        assert_eq!(params.order, 2);

        // Largest error is |2.5 - 2.666667| / 2.666667 = 6.25 %
        let check = verify_discretization_error(&fine(), &coarse(), &params).unwrap();
        assert!(check.passed);
        assert_relative_eq!(check.max_error_percent, 6.25, epsilon = 1e-3);

        params.threshold_percent = 5.0;
        let check = verify_discretization_error(&fine(), &coarse(), &params).unwrap();
        assert!(!check.passed);
    }
}
