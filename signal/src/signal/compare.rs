//! # Comparison
//!
//! Sample-wise comparison of a signal against a number or another signal,
//! with optional tolerance or threshold in absolute or relative terms.
//!
//! With `diff = lhs - rhs` and `rdiff = diff / |rhs|` the operators evaluate
//!
//! | operator | absolute                      | relative                       |
//! |----------|-------------------------------|--------------------------------|
//! | `<`      | `diff < tolerance - threshold`  | `rdiff < tolerance - threshold`  |
//! | `<=`     | `diff <= tolerance - threshold` | `rdiff <= tolerance - threshold` |
//! | `>`      | `diff > threshold - tolerance`  | `rdiff > threshold - tolerance`  |
//! | `>=`     | `diff >= threshold - tolerance` | `rdiff >= threshold - tolerance` |
//! | `!=`     | `abs(diff) > threshold`         | `abs(rdiff) > threshold`         |
//! | `==`     | `abs(diff) <= tolerance`        | `abs(rdiff) <= tolerance`        |

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{round_all, Signal, SignalConfig, SignalError};
use crate::units::{self, UnitError, UNITLESS};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Options of a comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareOptions {
    pub comparison: ComparisonMode,

    /// Margin by which the comparison must be exceeded. Must not be negative.
    pub threshold: f64,

    /// Margin by which the comparison may be violated. Must not be negative.
    pub tolerance: f64,

    /// Unit of a numeric reference and of an absolute threshold or tolerance.
    /// Defaults to the signal's value unit.
    pub unit: Option<String>,

    /// Significant digits used for a comparison with a number, defaults to the
    /// signal's precision. Not allowed when comparing with another signal.
    pub precision: Option<usize>,

    /// If set the result is a single boolean, true if all samples pass.
    pub reduce: bool,
}

/// Comparison data after all conversions and rounding.
struct ComparisonData {
    operator: Operator,
    comparison: ComparisonMode,
    lhs: Vec<f64>,
    rhs: Vec<f64>,
    threshold: f64,
    tolerance: f64,
    precision: usize,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = "==")]
    Eq,
}

/// Whether differences are taken absolute or relative to the reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComparisonMode {
    Absolute,
    Relative,
}

/// What a signal is compared against.
#[derive(Debug, Clone, Copy)]
pub enum Reference<'a> {
    Number(f64),
    Signal(&'a Signal),
}

/// Result of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum ComparisonOutput {
    /// All samples reduced to a single outcome.
    Reduced(bool),

    /// One sample per sample of the compared signal, `1` where the comparison
    /// holds and `0` where it doesn't.
    Signal(Signal),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Signal {
    /// Compare the values of this signal against a reference.
    pub fn compare<'a, R: Into<Reference<'a>>>(
        &self,
        operator: Operator,
        reference: R,
        options: &CompareOptions,
    ) -> Result<ComparisonOutput, SignalError> {
        let reference = reference.into();

        let data = self.comparison_data(operator, reference, options)?;

        let results: Vec<bool> = data
            .lhs
            .iter()
            .zip(data.rhs.iter())
            .map(|(&l, &r)| data.evaluate(l, r))
            .collect();

        debug!(
            "Compared signal {:?} {} {}: {} of {} samples pass",
            self.name,
            operator,
            reference.name(),
            results.iter().filter(|&&r| r).count(),
            results.len()
        );

        if options.reduce {
            return Ok(ComparisonOutput::Reduced(results.iter().all(|&r| r)));
        }

        let values: Vec<f64> = results.iter().map(|&r| if r { 1.0 } else { 0.0 }).collect();

        let config = SignalConfig::new(&format!(
            "comparison result of {} {} {}",
            self.name,
            operator,
            reference.name()
        ))
        .unit_time(&self.units.time)
        .unit_values(UNITLESS)
        .precision(self.precision);

        Ok(ComparisonOutput::Signal(Signal::new(
            &self.time,
            &values,
            config,
        )?))
    }

    /// Validate the options and bring both sides into the same units, time
    /// grid and precision.
    fn comparison_data(
        &self,
        operator: Operator,
        reference: Reference<'_>,
        options: &CompareOptions,
    ) -> Result<ComparisonData, SignalError> {
        let invalid = |msg: &str| Err(SignalError::InvalidComparison(msg.into()));

        if !(options.threshold >= 0.0 && options.threshold.is_finite()) {
            return invalid("the threshold must be a non-negative number");
        }
        if !(options.tolerance >= 0.0 && options.tolerance.is_finite()) {
            return invalid("the tolerance must be a non-negative number");
        }
        if options.threshold > 0.0 && options.tolerance > 0.0 {
            return invalid("either a threshold or a tolerance can be defined, not both");
        }
        if operator == Operator::Ne && options.tolerance > 0.0 {
            return invalid("a tolerance is not allowed for the `!=` operator");
        }
        if operator == Operator::Eq && options.threshold > 0.0 {
            return invalid("a threshold is not allowed for the `==` operator");
        }

        let value_unit = self.units.values.as_str();
        let unit = match options.unit {
            Some(ref u) => {
                if !units::is_unit_valid(u) {
                    return Err(UnitError::InvalidUnit(u.clone()).into());
                }
                if let Reference::Signal(_) = reference {
                    if options.threshold == 0.0 && options.tolerance == 0.0 {
                        return invalid(
                            "a unit given for comparing two signals applies to the \
                             threshold or tolerance, but neither is set",
                        );
                    }
                }
                u.as_str()
            }
            None => value_unit,
        };

        let precision = match reference {
            Reference::Signal(s) => self.precision.min(s.precision),
            Reference::Number(_) => self.precision,
        };
        let precision = match options.precision {
            Some(_) if matches!(reference, Reference::Signal(_)) => {
                return invalid(
                    "a precision can only be given for a numeric reference, two signals \
                     are compared at their own precision",
                );
            }
            Some(0) => return Err(SignalError::InvalidPrecision(0)),
            Some(p) => precision.min(p),
            None => precision,
        };

        let rhs = match reference {
            Reference::Signal(s) => {
                let aligned = self.align(s, true)?;
                round_all(&aligned.values, precision)
            }
            Reference::Number(n) => {
                if !n.is_finite() {
                    return Err(SignalError::NonFiniteOperand(n));
                }
                let n = units::convert(n, unit, value_unit, precision)?;
                vec![n; self.len()]
            }
        };

        if options.comparison == ComparisonMode::Relative && rhs.iter().any(|&r| r == 0.0) {
            return invalid("the reference must not contain zero for a relative comparison");
        }

        // Relative margins are ratios and never converted
        let (threshold, tolerance) =
            if options.comparison == ComparisonMode::Absolute && unit != value_unit {
                (
                    units::convert(options.threshold, unit, value_unit, precision)?,
                    units::convert(options.tolerance, unit, value_unit, precision)?,
                )
            } else {
                (options.threshold, options.tolerance)
            };

        Ok(ComparisonData {
            operator,
            comparison: options.comparison,
            lhs: round_all(&self.values, precision),
            rhs,
            threshold: units::round(threshold, precision),
            tolerance: units::round(tolerance, precision),
            precision,
        })
    }
}

impl ComparisonData {
    /// Evaluate the comparison for one pair of samples.
    fn evaluate(&self, lhs: f64, rhs: f64) -> bool {
        let diff = match self.comparison {
            ComparisonMode::Absolute => lhs - rhs,
            ComparisonMode::Relative => (lhs - rhs) / rhs.abs(),
        };
        let diff = units::round(diff, self.precision);

        // One of threshold and tolerance is always zero
        match self.operator {
            Operator::Lt => diff < self.tolerance - self.threshold,
            Operator::Le => diff <= self.tolerance - self.threshold,
            Operator::Gt => diff > self.threshold - self.tolerance,
            Operator::Ge => diff >= self.threshold - self.tolerance,
            Operator::Ne => diff.abs() > self.threshold,
            Operator::Eq => diff.abs() <= self.tolerance,
        }
    }
}

impl CompareOptions {
    pub fn relative(mut self) -> Self {
        self.comparison = ComparisonMode::Relative;
        self
    }

    pub fn threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn unit(mut self, unit: &str) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn precision(mut self, precision: usize) -> Self {
        self.precision = Some(precision);
        self
    }

    pub fn reduce(mut self, reduce: bool) -> Self {
        self.reduce = reduce;
        self
    }
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            comparison: ComparisonMode::Absolute,
            threshold: 0.0,
            tolerance: 0.0,
            unit: None,
            precision: None,
            reduce: false,
        }
    }
}

impl Default for ComparisonMode {
    fn default() -> Self {
        ComparisonMode::Absolute
    }
}

impl ComparisonOutput {
    /// The reduced outcome, or `None` if the output is a signal.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ComparisonOutput::Reduced(b) => Some(*b),
            ComparisonOutput::Signal(_) => None,
        }
    }

    /// The per-sample outcome, or `None` if the output was reduced.
    pub fn into_signal(self) -> Option<Signal> {
        match self {
            ComparisonOutput::Reduced(_) => None,
            ComparisonOutput::Signal(s) => Some(s),
        }
    }
}

impl<'a> Reference<'a> {
    fn name(&self) -> String {
        match self {
            Reference::Number(n) => n.to_string(),
            Reference::Signal(s) => s.name.clone(),
        }
    }
}

impl<'a> From<f64> for Reference<'a> {
    fn from(n: f64) -> Self {
        Reference::Number(n)
    }
}

impl<'a> From<&'a Signal> for Reference<'a> {
    fn from(s: &'a Signal) -> Self {
        Reference::Signal(s)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
            Operator::Ne => "!=",
            Operator::Eq => "==",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Operator {
    type Err = SignalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "<" => Ok(Operator::Lt),
            "<=" => Ok(Operator::Le),
            ">" => Ok(Operator::Gt),
            ">=" => Ok(Operator::Ge),
            "!=" => Ok(Operator::Ne),
            "==" => Ok(Operator::Eq),
            other => Err(SignalError::InvalidComparison(format!(
                "unknown operator {:?}",
                other
            ))),
        }
    }
}

impl FromStr for ComparisonMode {
    type Err = SignalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "absolute" => Ok(ComparisonMode::Absolute),
            "relative" => Ok(ComparisonMode::Relative),
            other => Err(SignalError::InvalidComparison(format!(
                "unknown comparison mode {:?}",
                other
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn speed() -> Signal {
        Signal::new(
            &[0.0, 1.0, 2.0, 3.0],
            &[9.0, 10.0, 11.0, 12.0],
            SignalConfig::new("speed").unit_values("m/s"),
        )
        .unwrap()
    }

    fn values(output: ComparisonOutput) -> Vec<f64> {
        output
            .into_signal()
            .map(|s| s.values().to_vec())
            .unwrap_or_default()
    }

    #[test]
    fn test_operators() -> Result<(), SignalError> {
        let s = speed();
        let opts = CompareOptions::default();

        assert_eq!(values(s.compare(Operator::Lt, 10.0, &opts)?), vec![1.0, 0.0, 0.0, 0.0]);
        assert_eq!(values(s.compare(Operator::Le, 10.0, &opts)?), vec![1.0, 1.0, 0.0, 0.0]);
        assert_eq!(values(s.compare(Operator::Gt, 10.0, &opts)?), vec![0.0, 0.0, 1.0, 1.0]);
        assert_eq!(values(s.compare(Operator::Ge, 10.0, &opts)?), vec![0.0, 1.0, 1.0, 1.0]);
        assert_eq!(values(s.compare(Operator::Ne, 10.0, &opts)?), vec![1.0, 0.0, 1.0, 1.0]);
        assert_eq!(values(s.compare(Operator::Eq, 10.0, &opts)?), vec![0.0, 1.0, 0.0, 0.0]);

        Ok(())
    }

    #[test]
    fn test_output_signal() -> Result<(), SignalError> {
        let s = speed();
        let out = s
            .compare(Operator::Lt, 10.5, &CompareOptions::default())?
            .into_signal()
            .expect("not reduced");

        assert_eq!(out.name, "comparison result of speed < 10.5");
        assert_eq!(out.time(), s.time());
        assert_eq!(out.units().values, "-");
        assert_eq!(out.precision(), s.precision());

        Ok(())
    }

    #[test]
    fn test_tolerance_and_threshold() -> Result<(), SignalError> {
        let s = speed();

        let tol = CompareOptions::default().tolerance(1.0);
        assert_eq!(values(s.compare(Operator::Eq, 10.0, &tol)?), vec![1.0, 1.0, 1.0, 0.0]);
        assert_eq!(values(s.compare(Operator::Lt, 10.0, &tol)?), vec![1.0, 1.0, 0.0, 0.0]);
        assert_eq!(values(s.compare(Operator::Gt, 10.0, &tol)?), vec![0.0, 1.0, 1.0, 1.0]);

        let thr = CompareOptions::default().threshold(1.0);
        assert_eq!(values(s.compare(Operator::Ne, 10.0, &thr)?), vec![0.0, 0.0, 0.0, 1.0]);
        assert_eq!(values(s.compare(Operator::Gt, 10.0, &thr)?), vec![0.0, 0.0, 0.0, 1.0]);
        assert_eq!(values(s.compare(Operator::Le, 10.0, &thr)?), vec![1.0, 0.0, 0.0, 0.0]);

        Ok(())
    }

    #[test]
    fn test_equality_is_negation_of_inequality() -> Result<(), SignalError> {
        let s = speed();
        let tol = 1.0;

        let eq = values(s.compare(Operator::Eq, 10.0, &CompareOptions::default().tolerance(tol))?);
        let ne = values(s.compare(Operator::Ne, 10.0, &CompareOptions::default().threshold(tol))?);

        for (e, n) in eq.iter().zip(ne.iter()) {
            assert_eq!(*e, 1.0 - *n);
        }

        Ok(())
    }

    #[test]
    fn test_relative() -> Result<(), SignalError> {
        let s = speed();
        let rel = CompareOptions::default().relative().tolerance(0.1);

        assert_eq!(values(s.compare(Operator::Eq, 10.0, &rel)?), vec![1.0, 1.0, 1.0, 0.0]);

        assert!(matches!(
            s.compare(Operator::Eq, 0.0, &rel),
            Err(SignalError::InvalidComparison(_))
        ));

        Ok(())
    }

    #[test]
    fn test_unit_conversion_of_reference() -> Result<(), SignalError> {
        let s = speed();

        // 36 km/h is 10 m/s, the tolerance is converted too
        let opts = CompareOptions::default().unit("km/h").tolerance(3.6);
        assert_eq!(values(s.compare(Operator::Eq, 36.0, &opts)?), vec![1.0, 1.0, 1.0, 0.0]);

        // Relative tolerances are never converted
        let rel = CompareOptions::default().unit("km/h").relative().tolerance(0.1);
        assert_eq!(values(s.compare(Operator::Eq, 36.0, &rel)?), vec![1.0, 1.0, 1.0, 0.0]);

        assert!(matches!(
            s.compare(Operator::Eq, 36.0, &CompareOptions::default().unit("kg")),
            Err(SignalError::UnitError(UnitError::IncompatibleUnits { .. }))
        ));

        Ok(())
    }

    #[test]
    fn test_compare_signals() -> Result<(), SignalError> {
        let s = speed();
        let reference = Signal::new(
            &[0.0, 1.5, 3.0],
            &[36.0, 36.0, 36.0],
            SignalConfig::new("limit").unit_values("km/h"),
        )?;

        let out = s.compare(Operator::Le, &reference, &CompareOptions::default())?;
        assert_eq!(values(out), vec![1.0, 1.0, 0.0, 0.0]);

        let reduced = s.compare(Operator::Le, &reference, &CompareOptions::default().reduce(true))?;
        assert_eq!(reduced.as_bool(), Some(false));

        // A unit without a margin is meaningless between two signals
        assert!(matches!(
            s.compare(Operator::Le, &reference, &CompareOptions::default().unit("km/h")),
            Err(SignalError::InvalidComparison(_))
        ));

        Ok(())
    }

    #[test]
    fn test_invalid_option_combinations() {
        let s = speed();

        let both = CompareOptions::default().threshold(1.0).tolerance(1.0);
        assert!(s.compare(Operator::Lt, 10.0, &both).is_err());

        let ne_tol = CompareOptions::default().tolerance(1.0);
        assert!(s.compare(Operator::Ne, 10.0, &ne_tol).is_err());

        let eq_thr = CompareOptions::default().threshold(1.0);
        assert!(s.compare(Operator::Eq, 10.0, &eq_thr).is_err());

        let negative = CompareOptions::default().tolerance(-1.0);
        assert!(s.compare(Operator::Lt, 10.0, &negative).is_err());
    }

    #[test]
    fn test_precision() -> Result<(), SignalError> {
        let s = Signal::new(&[0.0], &[10.04], SignalConfig::new("p"))?;

        let coarse = CompareOptions::default().precision(3);
        assert_eq!(values(s.compare(Operator::Eq, 10.0, &coarse)?), vec![1.0]);
        assert_eq!(values(s.compare(Operator::Eq, 10.0, &CompareOptions::default())?), vec![0.0]);

        let other = Signal::new(&[0.0], &[10.0], SignalConfig::new("q"))?;
        assert!(matches!(
            s.compare(Operator::Eq, &other, &coarse),
            Err(SignalError::InvalidComparison(_))
        ));

        assert_eq!(
            s.compare(Operator::Lt, f64::INFINITY, &CompareOptions::default()),
            Err(SignalError::NonFiniteOperand(f64::INFINITY))
        );

        Ok(())
    }

    #[test]
    fn test_parse_operator_and_options() {
        assert_eq!("<=".parse::<Operator>(), Ok(Operator::Le));
        assert_eq!("relative".parse::<ComparisonMode>(), Ok(ComparisonMode::Relative));
        assert!("=<".parse::<Operator>().is_err());

        let opts: CompareOptions =
            util::params::from_str("comparison = \"relative\"\ntolerance = 0.05\nreduce = true\n")
                .expect("options should deserialise");
        assert_eq!(opts, CompareOptions::default().relative().tolerance(0.05).reduce(true));
    }
}
