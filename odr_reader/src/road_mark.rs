//! # Road marks
//!
//! Resolves which lines of a lane's road mark are painted at a position along
//! the lane section.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use crate::network::{find_last_at, Lane, RoadMark};
use util::maths::rem_euclid;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

const NO_MARK: &str = "none";
const BROKEN: &str = "broken";
const SOLID: &str = "solid";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A mark line painted at the queried position.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibleLine {
    /// Index of the line in the mark's pattern, `None` for marks without one
    pub line: Option<usize>,

    /// Lateral offset from the lane's outer border
    pub t_offset: f64,

    pub mark_type: String,
    pub color: String,
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// The road mark in effect `ds` metres after the start of the lane section.
///
/// Marks of type `none` are not returned.
pub fn active_road_mark(lane: &Lane, ds: f64) -> Option<&RoadMark> {
    find_last_at(&lane.road_marks, ds, |m| m.s_offset).filter(|m| m.mark_type != NO_MARK)
}

/// Lines of `mark` painted `ds` metres after the start of the lane section.
///
/// A mark without an explicit line pattern is one continuous line on the lane
/// border. Patterned lines repeat every `length + space` from their own start
/// and are skipped inside the gaps.
pub fn visible_lines(mark: &RoadMark, ds: f64) -> Vec<VisibleLine> {
    let lines = match mark.type_def {
        Some(ref t) if !t.lines.is_empty() => &t.lines,
        _ => {
            return vec![VisibleLine {
                line: None,
                t_offset: 0.0,
                mark_type: mark.mark_type.clone(),
                color: mark.color.clone(),
            }]
        }
    };

    lines
        .iter()
        .enumerate()
        .filter_map(|(i, line)| {
            let local = ds - mark.s_offset - line.s_offset;
            if local < 0.0 {
                return None;
            }

            let broken = line.space > 0.0;
            if broken && rem_euclid(local, line.length + line.space) > line.length {
                return None;
            }

            Some(VisibleLine {
                line: Some(i),
                t_offset: line.t_offset,
                mark_type: match broken {
                    true => BROKEN.into(),
                    false => SOLID.into(),
                },
                color: line.color.clone().unwrap_or_else(|| mark.color.clone()),
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
