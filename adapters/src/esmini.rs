//! # esmini CSV adapter
//!
//! esmini writes six free-form header lines followed by a line of
//! `Name [unit]` column headers. Columns of scenario entities are prefixed
//! with `#N ` and the entity's name is stored in its `#N Entity_Name` column.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use conquer_once::Lazy;
use log::{debug, warn};
use regex::Regex;
use std::fs::read_to_string;
use std::path::Path;

use signal::Signal;

use crate::table::{self, Column};
use crate::AdapterError;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Index of the column header line.
const HEADER_LINE: usize = 6;

const TIME_COLUMN: &str = "TimeStamp";

const ENTITY_NAME: &str = "Entity_Name";

static NAME_UNIT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([^\[]*)\[(.+)\]").expect("invalid name regex"));

static ENTITY_NUM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"#\d+").expect("invalid entity regex"));

/// Exponents written without a caret, e.g. `m/s2`.
static UNIT_EXP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([a-zA-Z]+)(\d)").expect("invalid unit regex"));

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Translate an esmini result file.
///
/// If `signal_to_extract` is given only the signal of that name is returned.
pub fn translate<P: AsRef<Path>>(
    csv_path: P,
    signal_to_extract: Option<&str>,
) -> Result<Vec<Signal>, AdapterError> {
    let csv_str = match read_to_string(csv_path.as_ref()) {
        Ok(s) => s,
        Err(e) => return Err(AdapterError::FileOpenError(e)),
    };

    let signals = extract_signals(&csv_str)?;

    match signal_to_extract {
        Some(name) => match signals.into_iter().find(|s| s.name == name) {
            Some(s) => Ok(vec![s]),
            None => Err(AdapterError::UnknownSignal(name.to_string())),
        },
        None => Ok(signals),
    }
}

/// Extract all signals from the contents of an esmini result file.
pub fn extract_signals(csv_str: &str) -> Result<Vec<Signal>, AdapterError> {
    let lines: Vec<&str> = csv_str.lines().collect();

    let header = match lines.get(HEADER_LINE) {
        Some(h) => h,
        None => return Err(AdapterError::MissingHeader(HEADER_LINE)),
    };

    let headers = header.split(',').map(split_name_and_unit).collect();

    let mut columns = table::read_columns(&lines[HEADER_LINE + 1..], b',', headers)?;

    replace_entity_names(&mut columns);

    // Index and trailing empty columns carry no signal, entity names are now
    // part of the signal names
    columns.retain(|c| c.name != "Index" && !c.name.is_empty() && !c.name.contains(ENTITY_NAME));

    for column in columns.iter_mut() {
        column.unit = UNIT_EXP_RE.replace_all(&column.unit, "$1^$2").into_owned();
    }

    debug!("Found {} esmini columns besides the time", columns.len().saturating_sub(1));

    table::build_signals(columns, TIME_COLUMN)
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// `" #2 Current_Speed [m/s] "` becomes `("#2 Current_Speed", "m/s")`.
fn split_name_and_unit(raw: &str) -> (String, String) {
    match NAME_UNIT_RE.captures(raw) {
        Some(caps) => (caps[1].trim().to_string(), caps[2].trim().to_string()),
        None => (raw.trim().to_string(), "-".to_string()),
    }
}

/// Replace the `#N ` prefixes with the name of entity `N`.
fn replace_entity_names(columns: &mut [Column]) {
    // esmini misspells the column
    for column in columns.iter_mut() {
        column.name = column.name.replace("Entitity", "Entity");
    }

    let replacements: Vec<(String, String)> = columns
        .iter()
        .filter(|c| c.name.contains(ENTITY_NAME))
        .filter_map(|c| {
            let num = ENTITY_NUM_RE.find(&c.name)?.as_str();
            match c.cells.first() {
                Some(entity) => Some((format!("{} ", num), format!("{}_", entity.trim()))),
                None => {
                    warn!("Entity column {:?} is empty", c.name);
                    None
                }
            }
        })
        .collect();

    for (prefix, entity) in replacements.iter() {
        for column in columns.iter_mut() {
            column.name = column.name.replace(prefix.as_str(), entity);
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    const RESULTS: &str = "\
esmini GIT REV: 2.20.5
esmini GIT TAG: v2.20.5
esmini GIT BRANCH: master
esmini BUILD VERSION: 2022-01-20
Params: --headless --osc cut-in.xosc --csv_logger results.csv
Scenario: cut-in.xosc
Index [-] , TimeStamp [s] , #0 Entitity_Name [-] , #0 Entitity_Id [-] , #0 Current_Speed [m/s] , #0 Acc [m/s2] , #1 Entitity_Name [-] , #1 Current_Speed [m/s] , 
0 , 0.000 , Ego , 0 , 10.000 , 0.500 , Target , 12.000 , 
1 , 0.050 , Ego , 0 , 10.025 , 0.500 , Target , 12.000 , 

2 , 0.100 , Ego , 0 , 10.050 , 0.500 , Target , 11.900 , 
";

    #[test]
    fn test_extract_signals() {
        let signals = extract_signals(RESULTS).unwrap();

        let names: Vec<&str> = signals.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Ego_Entity_Id", "Ego_Current_Speed", "Ego_Acc", "Target_Current_Speed"]
        );

        let acc = &signals[2];
        assert_eq!(acc.units().values, "m/s^2");
        assert_eq!(acc.units().time, "s");
        assert_eq!(acc.time(), &[0.0, 0.05, 0.1]);

        let speed = &signals[3];
        assert_relative_eq!(speed.values()[2], 11.9);
    }

    #[test]
    fn test_split_name_and_unit() {
        assert_eq!(
            split_name_and_unit(" #2 Current_Speed [m/s] "),
            ("#2 Current_Speed".to_string(), "m/s".to_string())
        );
        assert_eq!(split_name_and_unit(" "), (String::new(), "-".to_string()));
    }

    #[test]
    fn test_missing_header() {
        assert!(matches!(
            extract_signals("a\nb\nc\n"),
            Err(AdapterError::MissingHeader(6))
        ));
    }

    #[test]
    fn test_translate_filter() {
        let path = std::env::temp_dir().join("cdk_esmini_translate_test.csv");
        std::fs::write(&path, RESULTS).unwrap();

        let signals = translate(&path, Some("Target_Current_Speed")).unwrap();
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].name, "Target_Current_Speed");

        assert!(matches!(
            translate(&path, Some("Pedestrian_Current_Speed")),
            Err(AdapterError::UnknownSignal(_))
        ));

        std::fs::remove_file(&path).ok();
    }
}
