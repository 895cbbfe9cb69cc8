//! # Credibility Development Kit Executable Parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

use odr_reader::{MapCheckParams, MarkingSamplingParams, StatisticsParams};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct CdkExecParams {
    /// Print the processing history of translated signals
    #[serde(default)]
    pub verbose_signals: bool,

    /// Road mark sampling used by the `marks` command
    #[serde(default)]
    pub marks: MarkingSamplingParams,

    /// Map statistics settings used by the `stats` command
    pub stats: StatisticsParams,

    /// Thresholds used by the `check` command
    pub checks: MapCheckParams,
}
