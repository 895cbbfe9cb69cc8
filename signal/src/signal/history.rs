//! # Signal history
//!
//! Append-only log of the processing steps a signal has undergone.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::SignalUnits;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Snapshot of a signal taken after a processing step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Position of this entry in the history, starting at 1.
    pub step: usize,

    /// When the step was performed.
    pub timestamp: DateTime<Utc>,

    pub time: Vec<f64>,

    pub values: Vec<f64>,

    pub units: SignalUnits,

    /// Human readable description of the processing step.
    pub description: String,
}
