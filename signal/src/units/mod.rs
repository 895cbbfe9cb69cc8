//! # Unit and precision kernel
//!
//! Validation, conversion and significant-digit rounding of physical
//! quantities. Unit strings follow the usual engineering notation (`m/s^2`,
//! `kg m / s^2`, `N m`), and `-` marks a unitless quantity.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod registry;
mod unit;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use thiserror::Error;

pub use registry::{Dim, BASE_NAMES};
pub use unit::Unit;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Marker used in place of a unit for unitless quantities.
pub const UNITLESS: &str = "-";

/// Largest number of significant digits `round` will keep.
pub const MAX_PRECISION: usize = 100;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors raised by the unit kernel.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum UnitError {
    #[error("Unit {0:?} is not a valid unit")]
    InvalidUnit(String),

    #[error("Cannot convert from {from:?} to {to:?}, the units have different dimensions")]
    IncompatibleUnits { from: String, to: String },
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Returns true if `name` is `-` or a unit expression the kernel understands.
pub fn is_unit_valid(name: &str) -> bool {
    Unit::parse(name).is_ok()
}

/// Returns true if both units share the same physical dimension.
pub fn equal_base(a: &str, b: &str) -> Result<bool, UnitError> {
    Ok(Unit::parse(a)?.equal_base(&Unit::parse(b)?))
}

/// Convert `value` from one unit to another and round the result to
/// `precision` significant digits.
pub fn convert(value: f64, from: &str, to: &str, precision: usize) -> Result<f64, UnitError> {
    if from.trim() == to.trim() {
        // Still validate so a typo doesn't pass silently
        Unit::parse(from)?;
        return Ok(round(value, precision));
    }

    let from_unit = Unit::parse(from)?;
    let to_unit = Unit::parse(to)?;

    Ok(round(convert_units(value, &from_unit, &to_unit)?, precision))
}

/// Convert `value` between two parsed units without rounding.
pub fn convert_units(value: f64, from: &Unit, to: &Unit) -> Result<f64, UnitError> {
    if !from.equal_base(to) {
        return Err(UnitError::IncompatibleUnits {
            from: from.to_string(),
            to: to.to_string(),
        });
    }

    Ok(to.from_si(from.to_si(value)))
}

/// Round `value` to `precision` significant digits.
///
/// Rounding is done on the exact decimal expansion of `value`, with exact
/// ties going away from zero, so `round(16.9, 2) == 17.0` and
/// `round(0.125, 2) == 0.13`. A precision of zero is treated as one.
pub fn round(value: f64, precision: usize) -> f64 {
    if value == 0.0 || !value.is_finite() {
        return value;
    }

    let digits = precision.max(1).min(MAX_PRECISION) - 1;

    let rounded = match format!("{:.*e}", digits, value).parse::<f64>() {
        Ok(r) => r,
        Err(_) => return value,
    };

    // The formatter rounds exact ties to even, bump those away from zero
    if rounded.abs() < value.abs() && is_exact_tie(value, digits) {
        let exponent = match decimal_exponent(rounded) {
            Some(e) => e,
            None => return rounded,
        };
        let step = 10f64.powi(exponent - digits as i32);

        return format!("{:.*e}", digits, rounded + step.copysign(value))
            .parse()
            .unwrap_or(rounded);
    }

    rounded
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Returns true if the decimal expansion of `value` beyond `digits` digits
/// after the leading one is exactly `5000...`.
fn is_exact_tie(value: f64, digits: usize) -> bool {
    // Any f64 which is an exact tie at a sensible precision has a short
    // expansion, so a few extra digits are enough to tell
    let long = format!("{:.*e}", digits + 40, value);
    let mantissa = long.split('e').next().unwrap_or("");
    let sig: String = mantissa.chars().filter(|c| c.is_ascii_digit()).collect();

    match sig.get(digits + 1..) {
        Some(tail) => tail.starts_with('5') && tail[1..].chars().all(|c| c == '0'),
        None => false,
    }
}

/// Decimal exponent of `value` as printed in scientific notation.
fn decimal_exponent(value: f64) -> Option<i32> {
    format!("{:e}", value).split('e').nth(1)?.parse().ok()
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_round() {
        assert_eq!(round(16.9, 2), 17.0);
        assert_eq!(round(4.7, 2), 4.7);
        assert_eq!(round(0.0, 2), 0.0);
        assert_eq!(round(123456.0, 3), 123000.0);
        assert_eq!(round(0.000123456, 2), 0.00012);
        assert_eq!(round(-16.9, 2), -17.0);
        assert_eq!(round(1.0 / 3.0, 6), 0.333333);
        assert_eq!(round(0.1 + 0.2, 6), 0.3);
    }

    #[test]
    fn test_round_ties_away_from_zero() {
        assert_eq!(round(2.5, 1), 3.0);
        assert_eq!(round(0.125, 2), 0.13);
        assert_eq!(round(-0.125, 2), -0.13);
        assert_eq!(round(9.5, 1), 10.0);

        // 1.005 is really 1.00499999999999989..., so it isn't a tie
        assert_eq!(round(1.005, 3), 1.0);
    }

    #[test]
    fn test_is_unit_valid() {
        assert!(is_unit_valid("-"));
        assert!(is_unit_valid("m/s^2"));
        assert!(is_unit_valid("kW h"));
        assert!(!is_unit_valid("meterz"));
        assert!(!is_unit_valid(""));
    }

    #[test]
    fn test_convert() -> Result<(), UnitError> {
        assert_eq!(convert(105.0, "cm", "m", 6)?, 1.05);
        assert_eq!(convert(1.0, "km/h", "m/s", 4)?, 0.2778);
        assert_eq!(convert(100.0, "degC", "K", 6)?, 373.15);
        assert_eq!(convert(5.0, "m", "m", 6)?, 5.0);
        assert_relative_eq!(convert(180.0, "deg", "rad", 10)?, std::f64::consts::PI, epsilon = 1e-9);

        assert!(matches!(
            convert(1.0, "m^200", "m^-56", 6),
            Err(UnitError::IncompatibleUnits { .. })
        ));
        assert_eq!(equal_base("m^100 km^100", "m"), Ok(false));

        assert_eq!(
            convert(1.0, "kg", "m/s^2", 6),
            Err(UnitError::IncompatibleUnits {
                from: "kg".into(),
                to: "m / s^2".into()
            })
        );
        assert!(matches!(convert(1.0, "foo", "foo", 6), Err(UnitError::InvalidUnit(_))));

        Ok(())
    }

    #[test]
    fn test_equal_base() -> Result<(), UnitError> {
        assert!(equal_base("N m", "J")?);
        assert!(!equal_base("N m", "N")?);
        assert!(equal_base("-", "m/m")?);

        Ok(())
    }
}
