//! # Unit conversion and arithmetic
//!
//! Arithmetic accepts plain numbers, numbers with a unit or other signals.
//! When two signals are combined the right-hand side is brought into the
//! left-hand side's units and time grid first, results are always rounded to
//! the left-hand side's precision after the arithmetic is done.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::debug;

use super::{round_all, Axis, Signal, SignalError};
use crate::units::{self, Unit, UNITLESS};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A number with a physical unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quantity<'a> {
    pub value: f64,
    pub unit: &'a str,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Right-hand side of an arithmetic operation.
#[derive(Debug, Clone, Copy)]
pub enum Operand<'a> {
    /// A plain number, taken to be in the signal's own value unit for
    /// addition and subtraction, and unitless for multiplication and division.
    Number(f64),

    /// A number with an explicit unit.
    Quantity(Quantity<'a>),

    /// Another signal.
    Signal(&'a Signal),
}

/// The four arithmetic operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Signal {
    /// Convert one axis of the signal into another unit of the same dimension.
    pub fn convert(&self, axis: Axis, unit: &str) -> Result<Signal, SignalError> {
        let converted = self.convert_axis(axis, unit, self.precision)?;

        let mut new_units = self.units.clone();
        let (time, values) = match axis {
            Axis::Time => {
                new_units.time = unit.into();
                (converted, self.values.clone())
            }
            Axis::Values => {
                new_units.values = unit.into();
                (self.time.clone(), converted)
            }
        };

        Ok(self.derive(
            time,
            values,
            new_units,
            &format!("converted {} units to {}", axis, unit),
        ))
    }

    /// Add a number, quantity or signal to the values of this signal.
    pub fn add<'a, O: Into<Operand<'a>>>(&self, operand: O) -> Result<Signal, SignalError> {
        self.arith(ArithOp::Add, operand.into())
    }

    /// Subtract a number, quantity or signal from the values of this signal.
    pub fn subtract<'a, O: Into<Operand<'a>>>(&self, operand: O) -> Result<Signal, SignalError> {
        self.arith(ArithOp::Sub, operand.into())
    }

    /// Multiply the values of this signal by a number, quantity or signal.
    ///
    /// The value unit of the result is the product of both units.
    pub fn multiply<'a, O: Into<Operand<'a>>>(&self, operand: O) -> Result<Signal, SignalError> {
        self.arith(ArithOp::Mul, operand.into())
    }

    /// Divide the values of this signal by a number, quantity or signal.
    ///
    /// Fails if the divisor is or contains zero. The value unit of the result
    /// is the quotient of both units.
    pub fn divide<'a, O: Into<Operand<'a>>>(&self, operand: O) -> Result<Signal, SignalError> {
        self.arith(ArithOp::Div, operand.into())
    }

    /// Convert the samples of one axis into `unit` without building a signal.
    pub(crate) fn convert_axis(
        &self,
        axis: Axis,
        unit: &str,
        precision: usize,
    ) -> Result<Vec<f64>, SignalError> {
        let source = Unit::parse(self.axis_unit(axis))?;
        let target = Unit::parse(unit)?;

        self.axis(axis)
            .iter()
            .map(|&v| {
                units::convert_units(v, &source, &target)
                    .map(|c| units::round(c, precision))
                    .map_err(SignalError::from)
            })
            .collect()
    }

    /// Bring `other` onto this signal's time unit (and value unit if
    /// `convert_values` is set) and onto a time grid with this signal's number
    /// of samples, anchored at `other`'s first sample.
    pub(crate) fn align(&self, other: &Signal, convert_values: bool) -> Result<Signal, SignalError> {
        let mut aligned = other.clone();

        if other.units.time != self.units.time {
            aligned.time = other.convert_axis(Axis::Time, &self.units.time, self.precision)?;
            aligned.units.time = self.units.time.clone();
        }

        if convert_values && other.units.values != self.units.values {
            aligned.values = other.convert_axis(Axis::Values, &self.units.values, self.precision)?;
            aligned.units.values = self.units.values.clone();
        }

        let rhs_duration = units::round(aligned.last_time() - aligned.first_time(), self.precision);
        if self.duration() != rhs_duration {
            return Err(SignalError::DurationMismatch {
                lhs: self.duration(),
                rhs: rhs_duration,
            });
        }

        if aligned.len() != self.len() {
            debug!(
                "Resampling signal {:?} onto the time grid of {:?}",
                other.name, self.name
            );

            let offset = aligned.first_time() - self.first_time();
            let target: Vec<f64> = self.time.iter().map(|t| t + offset).collect();

            aligned = aligned.interpolate(&round_all(&target, self.precision))?;
        }

        Ok(aligned)
    }

    fn arith(&self, op: ArithOp, operand: Operand<'_>) -> Result<Signal, SignalError> {
        match operand {
            Operand::Number(n) => self.arith_number(op, n, UNITLESS),
            Operand::Quantity(q) => self.arith_number(op, q.value, q.unit),
            Operand::Signal(s) => self.arith_signal(op, s),
        }
    }

    fn arith_number(&self, op: ArithOp, number: f64, unit: &str) -> Result<Signal, SignalError> {
        if !number.is_finite() {
            return Err(SignalError::NonFiniteOperand(number));
        }

        let mut new_units = self.units.clone();

        let (number, description) = match op {
            ArithOp::Add | ArithOp::Sub => {
                // A quantity is converted into the value unit first
                let number = if unit != UNITLESS && unit != self.units.values {
                    units::convert(number, unit, &self.units.values, self.precision)?
                } else {
                    number
                };

                let sign = if op == ArithOp::Add { "+" } else { "-" };
                (number, format!("applied offset {}{}", sign, number))
            }
            ArithOp::Mul => {
                new_units.values = compose_unit(&self.units.values, unit, op)?;
                (number, format!("multiplied Signal values with {}", number))
            }
            ArithOp::Div => {
                if number == 0.0 {
                    return Err(SignalError::DivideByZero);
                }
                new_units.values = compose_unit(&self.units.values, unit, op)?;
                (number, format!("divided Signal values by {}", number))
            }
        };

        let values: Vec<f64> = self.values.iter().map(|&v| apply(op, v, number)).collect();

        Ok(self.derive(
            self.time.clone(),
            round_all(&values, self.precision),
            new_units,
            &description,
        ))
    }

    fn arith_signal(&self, op: ArithOp, other: &Signal) -> Result<Signal, SignalError> {
        let convert_values = matches!(op, ArithOp::Add | ArithOp::Sub);
        let rhs = self.align(other, convert_values)?;

        if op == ArithOp::Div && rhs.values.iter().any(|&v| v == 0.0) {
            return Err(SignalError::DivideByZero);
        }

        let values: Vec<f64> = self
            .values
            .iter()
            .zip(rhs.values.iter())
            .map(|(&l, &r)| apply(op, l, r))
            .collect();

        let mut new_units = self.units.clone();
        if !convert_values {
            new_units.values = compose_unit(&self.units.values, &rhs.units.values, op)?;
        }

        let description = match op {
            ArithOp::Add => format!("added Signal {}", other.name),
            ArithOp::Sub => format!("subtracted Signal {}", other.name),
            ArithOp::Mul => format!("multiplied Signal values with Signal {}", other.name),
            ArithOp::Div => format!("divided Signal values by Signal {}", other.name),
        };

        Ok(self.derive(
            self.time.clone(),
            round_all(&values, self.precision),
            new_units,
            &description,
        ))
    }
}

impl<'a> From<f64> for Operand<'a> {
    fn from(n: f64) -> Self {
        Operand::Number(n)
    }
}

impl<'a> From<Quantity<'a>> for Operand<'a> {
    fn from(q: Quantity<'a>) -> Self {
        Operand::Quantity(q)
    }
}

impl<'a> From<(f64, &'a str)> for Operand<'a> {
    fn from((value, unit): (f64, &'a str)) -> Self {
        Operand::Quantity(Quantity { value, unit })
    }
}

impl<'a> From<&'a Signal> for Operand<'a> {
    fn from(s: &'a Signal) -> Self {
        Operand::Signal(s)
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn apply(op: ArithOp, lhs: f64, rhs: f64) -> f64 {
    match op {
        ArithOp::Add => lhs + rhs,
        ArithOp::Sub => lhs - rhs,
        ArithOp::Mul => lhs * rhs,
        ArithOp::Div => lhs / rhs,
    }
}

/// Product or quotient of two unit strings. A unitless side leaves the other
/// side's unit unchanged.
fn compose_unit(lhs: &str, rhs: &str, op: ArithOp) -> Result<String, SignalError> {
    if rhs == UNITLESS {
        return Ok(lhs.into());
    }

    let lhs_unit = Unit::parse(lhs)?;
    let rhs_unit = Unit::parse(rhs)?;

    let composed = match op {
        ArithOp::Div => lhs_unit.divide(&rhs_unit),
        _ => lhs_unit.multiply(&rhs_unit),
    };

    Ok(composed.to_string())
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
