//! # OpenMCX CSV adapter
//!
//! OpenMCX result files start with a `sep=` separator definition, followed by
//! a line of quoted column names and a line of units.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use conquer_once::Lazy;
use log::debug;
use regex::{Captures, Regex};
use std::fs::read_to_string;
use std::path::Path;

use signal::Signal;

use crate::table;
use crate::AdapterError;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

const TIME_COLUMN: &str = "Time";

/// Unit spellings of OpenMCX and their replacements.
const UNIT_REPLACEMENTS: &[(&str, &str)] = &[
    ("none", "-"),
    ("_", " / "),
    (".", " * "),
    ("Nm", "N m"),
    ("Nms", "N m s"),
    ("kWh", "kW h"),
    ("kgm", "kg m"),
    ("kgmm", "kg mm"),
    ("Vs", "V s"),
    ("Ohm", "ohm"),
];

/// Matches any of the replaced spellings, longest first so that e.g. `Nms`
/// isn't read as `Nm` followed by `s`.
static UNIT_RE: Lazy<Regex> = Lazy::new(|| {
    let mut patterns: Vec<&str> = UNIT_REPLACEMENTS.iter().map(|(p, _)| *p).collect();
    patterns.sort_by(|a, b| b.len().cmp(&a.len()));

    let alternation = patterns
        .iter()
        .map(|p| regex::escape(p))
        .collect::<Vec<String>>()
        .join("|");

    Regex::new(&alternation).expect("invalid unit regex")
});

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Translate an OpenMCX result file.
pub fn translate<P: AsRef<Path>>(csv_path: P) -> Result<Vec<Signal>, AdapterError> {
    let csv_str = match read_to_string(csv_path.as_ref()) {
        Ok(s) => s,
        Err(e) => return Err(AdapterError::FileOpenError(e)),
    };

    extract_signals(&csv_str)
}

/// Extract all signals from the contents of an OpenMCX result file.
pub fn extract_signals(csv_str: &str) -> Result<Vec<Signal>, AdapterError> {
    let lines: Vec<&str> = csv_str.lines().collect();

    if lines.len() < 3 {
        return Err(AdapterError::MissingHeader(lines.len()));
    }

    let separator = get_separator(lines[0])?;

    let names = lines[1].split(separator as char).map(|raw| match raw.split('"').nth(1) {
        Some(name) => name.to_string(),
        None => raw.trim().to_string(),
    });
    let units = lines[2].split(separator as char).map(mcx_unit_to_unit);

    let columns = table::read_columns(&lines[3..], separator, names.zip(units).collect())?;

    debug!("Found {} OpenMCX columns besides the time", columns.len().saturating_sub(1));

    table::build_signals(columns, TIME_COLUMN)
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Read the separator from a `sep=,` line.
fn get_separator(line: &str) -> Result<u8, AdapterError> {
    let sep = match line.trim().strip_prefix("sep=") {
        Some(s) => s.trim(),
        None => return Err(AdapterError::InvalidSeparator(line.to_string())),
    };

    match sep.as_bytes() {
        [b] => Ok(*b),
        _ => Err(AdapterError::InvalidSeparator(line.to_string())),
    }
}

/// Rewrite an OpenMCX unit into a parseable unit expression.
fn mcx_unit_to_unit(mcx_unit: &str) -> String {
    let unit = UNIT_RE.replace_all(mcx_unit, |caps: &Captures| {
        UNIT_REPLACEMENTS
            .iter()
            .find(|(p, _)| *p == &caps[0])
            .map(|(_, r)| r.to_string())
            .unwrap_or_default()
    });

    unit.trim().to_string()
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    const RESULTS: &str = "\
sep=,
\"Time\",\"vehicle.speed\",\"motor.torque\",\"motor.momentum\"
s,m_s,Nm,Nms
0.0,1.0,20.0,0.1
0.5,1.5,22.5,0.2

1.0,2.0,25.0,0.3
";

    #[test]
    fn test_extract_signals() {
        let signals = extract_signals(RESULTS).unwrap();

        assert_eq!(signals.len(), 3);
        assert_eq!(signals[0].name, "vehicle.speed");
        assert_eq!(signals[0].units().values, "m / s");
        assert_eq!(signals[0].units().time, "s");
        assert_eq!(signals[0].time(), &[0.0, 0.5, 1.0]);

        assert_eq!(signals[1].units().values, "N m");
        assert_relative_eq!(signals[1].values()[1], 22.5);
    }

    #[test]
    fn test_unit_rewrites() {
        assert_eq!(mcx_unit_to_unit("none"), "-");
        assert_eq!(mcx_unit_to_unit("m_s.s"), "m / s * s");
        assert_eq!(mcx_unit_to_unit("Nms"), "N m s");
        assert_eq!(mcx_unit_to_unit("kgmm"), "kg mm");
        assert_eq!(mcx_unit_to_unit("kWh"), "kW h");
        assert_eq!(mcx_unit_to_unit("kOhm"), "kohm");
        assert_eq!(mcx_unit_to_unit(" rad_s "), "rad / s");
    }

    #[test]
    fn test_separator() {
        assert_eq!(get_separator("sep=;").unwrap(), b';');
        assert!(matches!(
            get_separator("Time,Speed"),
            Err(AdapterError::InvalidSeparator(_))
        ));
    }

    #[test]
    fn test_missing_time_column() {
        let no_time = "sep=,\n\"t\",\"x\"\ns,m\n0,1\n";
        assert!(matches!(
            extract_signals(no_time),
            Err(AdapterError::MissingTimeColumn("Time"))
        ));
    }
}
