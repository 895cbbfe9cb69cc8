//! Lane sections, lanes and road marks

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

use super::Poly3Record;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A longitudinal part of a road with a constant set of lanes.
///
/// Lanes are kept in their side groups: `left` holds positive IDs, `center`
/// the reference lane `0` and `right` negative IDs.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LaneSection {
    pub s: f64,
    pub single_side: Option<bool>,
    pub left: Vec<Lane>,
    pub center: Vec<Lane>,
    pub right: Vec<Lane>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Lane {
    pub id: i32,
    pub lane_type: String,
    pub level: Option<bool>,
    pub link: Option<LaneLink>,

    /// Width polynomials keyed by `sOffset` relative to the section start.
    pub width: Vec<Poly3Record>,

    pub height: Vec<LaneHeight>,
    pub road_marks: Vec<RoadMark>,

    /// Surface materials keyed by `sOffset` relative to the section start.
    pub materials: Vec<LaneMaterial>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LaneLink {
    pub predecessor: Vec<i32>,
    pub successor: Vec<i32>,
}

/// Height of a lane's inner and outer border above the road surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LaneHeight {
    pub s_offset: f64,
    pub inner: f64,
    pub outer: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LaneMaterial {
    pub s_offset: f64,
    pub surface: Option<String>,
    pub friction: f64,
    pub roughness: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RoadMark {
    pub s_offset: f64,
    pub mark_type: String,
    pub weight: Option<String>,
    pub color: String,
    pub material: Option<String>,
    pub width: Option<f64>,
    pub lane_change: Option<String>,
    pub height: Option<f64>,

    /// Explicit line pattern of the mark.
    pub type_def: Option<RoadMarkType>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RoadMarkType {
    pub name: String,
    pub width: f64,
    pub lines: Vec<RoadMarkLine>,
}

/// One line of a road mark pattern, repeating every `length + space`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RoadMarkLine {
    pub length: f64,
    pub space: f64,
    pub t_offset: f64,
    pub s_offset: f64,
    pub rule: Option<String>,
    pub width: Option<f64>,
    pub color: Option<String>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl LaneSection {
    /// All lanes of the section, left to right.
    pub fn lanes(&self) -> impl Iterator<Item = &Lane> {
        self.left
            .iter()
            .chain(self.center.iter())
            .chain(self.right.iter())
    }

    pub fn lane(&self, id: i32) -> Option<&Lane> {
        let group = match id {
            id if id < 0 => &self.right,
            id if id > 0 => &self.left,
            _ => &self.center,
        };

        group.iter().find(|l| l.id == id)
    }

    /// IDs of all lanes, descending.
    pub fn lane_ids(&self) -> Vec<i32> {
        let mut ids: Vec<i32> = self.lanes().map(|l| l.id).collect();
        ids.sort_unstable_by(|a, b| b.cmp(a));
        ids
    }
}

impl Lane {
    pub fn is_driving(&self) -> bool {
        self.lane_type == "driving"
    }
}
