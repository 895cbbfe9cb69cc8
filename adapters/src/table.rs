//! Column-wise access to the data rows of a result file

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use csv::{ReaderBuilder, Trim};
use signal::{Signal, SignalConfig};

use crate::AdapterError;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A named column of raw cells.
#[derive(Debug, Clone)]
pub(crate) struct Column {
    pub name: String,
    pub unit: String,
    pub cells: Vec<String>,
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Read the data rows into one column per header.
///
/// Blank lines are skipped, missing trailing cells are read as empty and
/// every cell is trimmed.
pub(crate) fn read_columns(
    data_lines: &[&str],
    delimiter: u8,
    headers: Vec<(String, String)>,
) -> Result<Vec<Column>, AdapterError> {
    let body = data_lines
        .iter()
        .filter(|l| !l.trim().is_empty())
        .cloned()
        .collect::<Vec<&str>>()
        .join("\n");

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .delimiter(delimiter)
        .from_reader(body.as_bytes());

    let mut columns: Vec<Column> = headers
        .into_iter()
        .map(|(name, unit)| Column {
            name,
            unit,
            cells: Vec::new(),
        })
        .collect();

    for result in reader.records() {
        let record = match result {
            Ok(r) => r,
            Err(e) => return Err(AdapterError::CsvError(e)),
        };

        for (i, column) in columns.iter_mut().enumerate() {
            column.cells.push(record.get(i).unwrap_or("").to_string());
        }
    }

    if columns.first().map_or(true, |c| c.cells.is_empty()) {
        return Err(AdapterError::NoData);
    }

    Ok(columns)
}

/// Parse every cell of the column as a number.
pub(crate) fn parse_values(column: &Column) -> Result<Vec<f64>, AdapterError> {
    column
        .cells
        .iter()
        .enumerate()
        .map(|(row, cell)| {
            if cell.is_empty() {
                return Err(AdapterError::MissingValue {
                    column: column.name.clone(),
                    row,
                });
            }
            cell.parse::<f64>().map_err(|_| AdapterError::InvalidValue {
                column: column.name.clone(),
                value: cell.clone(),
            })
        })
        .collect()
}

/// Split off the time column and build one signal per remaining column.
pub(crate) fn build_signals(
    mut columns: Vec<Column>,
    time_column: &'static str,
) -> Result<Vec<Signal>, AdapterError> {
    let time_idx = match columns.iter().position(|c| c.name == time_column) {
        Some(i) => i,
        None => return Err(AdapterError::MissingTimeColumn(time_column)),
    };
    let time_col = columns.remove(time_idx);
    let time = parse_values(&time_col)?;

    columns
        .iter()
        .map(|column| {
            let values = parse_values(column)?;
            let config = SignalConfig::new(&column.name)
                .unit_time(&time_col.unit)
                .unit_values(&column.unit);

            Signal::new(&time, &values, config)
                .map_err(|e| AdapterError::SignalError(column.name.clone(), e))
        })
        .collect()
}
