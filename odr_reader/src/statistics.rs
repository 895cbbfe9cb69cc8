//! # Map statistics
//!
//! Summaries of a road network used to decide whether a map covers the
//! operating conditions a simulation needs: road length, lane widths and
//! counts, slopes, curve radii and the lane, mark and road types in use.
//!
//! Every statistic can be restricted to a selection of road IDs, unknown IDs
//! in the selection are ignored.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::{fmt, str::FromStr};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    error::OdrError,
    lane_geometry::Boundary,
    network::Road,
    pose::Pose3d,
    reader::OdrReader,
};
use util::maths::get_ang_dist_pi;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Sampling step along roads.
const SAMPLE_DS: f64 = 1.0;

/// Distance over which the heading change of a curve is measured.
const CURVE_EPS: f64 = 0.05;

const DEFAULT_TRAFFIC_RULE: &str = "RHT";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ValueRange<T> {
    pub min: T,
    pub max: T,
}

/// A distinct kind of road mark.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LaneMarkingType {
    pub mark_type: String,
    pub color: String,
    pub weight: Option<String>,
}

/// Parameters of [`MapStatistics::compute`].
#[derive(Debug, Clone, Deserialize)]
pub struct StatisticsParams {
    /// Curve radius above which a road counts as straight, in metres
    pub straight_radius_threshold: f64,

    #[serde(default)]
    pub slope_unit: SlopeUnit,

    /// Roads to include, all roads if empty
    #[serde(default)]
    pub road_selection: Vec<String>,
}

/// All statistics of a road network.
///
/// Ranges are `None` when the network holds nothing to measure. Straight lanes
/// do not count towards the curve radius range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapStatistics {
    pub road_length: f64,
    pub driving_lane_width_range: Option<ValueRange<f64>>,
    pub elevation_range: ValueRange<f64>,
    pub slope_unit: SlopeUnit,
    pub curve_radius_range: Option<ValueRange<f64>>,
    pub max_straight_length: f64,
    pub driving_lane_count_range: Option<ValueRange<usize>>,
    pub traction_range: Option<ValueRange<f64>>,
    pub lane_types: Vec<String>,
    pub lane_marking_types: Vec<LaneMarkingType>,
    pub road_types: Vec<String>,
    pub geometry_kinds: Vec<&'static str>,
    pub traffic_rule: String,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Unit road slopes are reported in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlopeUnit {
    Rad,
    Deg,
    Percent,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl MapStatistics {
    pub fn compute(reader: &OdrReader, params: &StatisticsParams) -> Result<Self, OdrError> {
        let ids: Vec<&str> = params.road_selection.iter().map(|s| s.as_str()).collect();
        let selection = match ids.is_empty() {
            true => None,
            false => Some(ids.as_slice()),
        };

        let stats = Self {
            road_length: road_length(reader, selection),
            driving_lane_width_range: driving_lane_width_range(reader, selection)?,
            elevation_range: elevation_range(reader, params.slope_unit, selection)?,
            slope_unit: params.slope_unit,
            curve_radius_range: curve_radius_range(reader, selection)?,
            max_straight_length: max_straight_length(
                reader,
                params.straight_radius_threshold,
                selection,
            )?,
            driving_lane_count_range: driving_lane_count_range(reader, selection),
            traction_range: traction_range(reader, selection),
            lane_types: lane_types(reader, selection),
            lane_marking_types: lane_marking_types(reader, selection),
            road_types: road_types(reader, selection),
            geometry_kinds: geometry_kinds(reader, selection),
            traffic_rule: traffic_rule(reader),
        };

        debug!("Computed map statistics: {:?}", stats);

        Ok(stats)
    }
}

impl<T: PartialOrd + Copy> ValueRange<T> {
    fn include(range: Option<Self>, value: T) -> Option<Self> {
        Some(match range {
            Some(r) => Self {
                min: if value < r.min { value } else { r.min },
                max: if value > r.max { value } else { r.max },
            },
            None => Self {
                min: value,
                max: value,
            },
        })
    }
}

impl SlopeUnit {
    fn convert_pitch(&self, pitch: f64) -> f64 {
        match self {
            SlopeUnit::Rad => pitch,
            SlopeUnit::Deg => pitch.to_degrees(),
            SlopeUnit::Percent => 100.0 * pitch.tan(),
        }
    }
}

impl Default for SlopeUnit {
    fn default() -> Self {
        SlopeUnit::Rad
    }
}

impl fmt::Display for SlopeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SlopeUnit::Rad => "rad",
            SlopeUnit::Deg => "deg",
            SlopeUnit::Percent => "%",
        };

        write!(f, "{}", s)
    }
}

impl FromStr for SlopeUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rad" => Ok(SlopeUnit::Rad),
            "deg" => Ok(SlopeUnit::Deg),
            "%" | "percent" => Ok(SlopeUnit::Percent),
            _ => Err(format!("Unknown slope unit {:?}", s)),
        }
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Total length of the selected roads.
pub fn road_length(reader: &OdrReader, selection: Option<&[&str]>) -> f64 {
    selected_roads(reader, selection).iter().map(|r| r.length).sum()
}

/// Narrowest and widest driving lane, sampled every metre of every lane
/// section.
pub fn driving_lane_width_range(
    reader: &OdrReader,
    selection: Option<&[&str]>,
) -> Result<Option<ValueRange<f64>>, OdrError> {
    let mut range = None;

    for road in selected_roads(reader, selection) {
        for (i, section) in road.lane_sections.iter().enumerate() {
            let (start, end) = match road.lane_section_range(i) {
                Some(r) => r,
                None => continue,
            };

            for s in sample_positions(start, end, 0.0) {
                for lane in section.left.iter().chain(section.right.iter()) {
                    if lane.is_driving() {
                        let width = reader.get_lane_width(&road.id, lane.id, s)?;
                        range = ValueRange::include(range, width);
                    }
                }
            }
        }
    }

    Ok(range)
}

/// Lowest and highest friction of the lane materials.
pub fn traction_range(reader: &OdrReader, selection: Option<&[&str]>) -> Option<ValueRange<f64>> {
    let mut range = None;

    for road in selected_roads(reader, selection) {
        for section in road.lane_sections.iter() {
            for lane in section.left.iter().chain(section.right.iter()) {
                for material in lane.materials.iter() {
                    range = ValueRange::include(range, material.friction);
                }
            }
        }
    }

    range
}

/// Lowest and highest pitch of the reference lines.
///
/// The range always includes a flat road.
pub fn elevation_range(
    reader: &OdrReader,
    unit: SlopeUnit,
    selection: Option<&[&str]>,
) -> Result<ValueRange<f64>, OdrError> {
    let mut range = ValueRange::<f64> { min: 0.0, max: 0.0 };

    for road in selected_roads(reader, selection) {
        for s in sample_positions(0.0, road.length, 0.0) {
            let pitch = reader.get_reference_line_pose(&road.id, s)?.pitch;
            range.min = range.min.min(pitch);
            range.max = range.max.max(pitch);
        }
    }

    Ok(ValueRange {
        min: unit.convert_pitch(range.min),
        max: unit.convert_pitch(range.max),
    })
}

/// Smallest and largest curve radius of the borders of all driving lanes.
///
/// Each pair of poses is taken inside a single lane section. Straight
/// stretches have no finite radius and are left out, so a network without
/// curves has no range.
pub fn curve_radius_range(
    reader: &OdrReader,
    selection: Option<&[&str]>,
) -> Result<Option<ValueRange<f64>>, OdrError> {
    let mut range = None;

    for road in selected_roads(reader, selection) {
        for (i, section) in road.lane_sections.iter().enumerate() {
            let (start, end) = match road.lane_section_range(i) {
                Some(r) => r,
                None => continue,
            };

            let driving: Vec<i32> = section
                .lane_ids()
                .into_iter()
                .filter(|id| section.lane(*id).map(|l| l.is_driving()).unwrap_or(false))
                .collect();

            for s in sample_positions(start, end, CURVE_EPS) {
                for lane_id in driving.iter() {
                    for boundary in [Boundary::Inner, Boundary::Outer].iter() {
                        let p1 =
                            reader.get_lane_boundary_pose(&road.id, *lane_id, s, *boundary)?;
                        let p2 = reader.get_lane_boundary_pose(
                            &road.id,
                            *lane_id,
                            s + CURVE_EPS,
                            *boundary,
                        )?;

                        let radius = curve_radius(&p1, &p2);
                        if radius.is_finite() {
                            range = ValueRange::include(range, radius);
                        }
                    }
                }
            }
        }
    }

    Ok(range)
}

/// Longest continuous stretch of road whose curve radius stays above
/// `radius_threshold`.
pub fn max_straight_length(
    reader: &OdrReader,
    radius_threshold: f64,
    selection: Option<&[&str]>,
) -> Result<f64, OdrError> {
    let mut longest: f64 = 0.0;

    for road in selected_roads(reader, selection) {
        let mut current = 0.0;

        for s in sample_positions(0.0, road.length, CURVE_EPS) {
            let p1 = reader.get_reference_line_pose(&road.id, s)?;
            let p2 = reader.get_reference_line_pose(&road.id, s + CURVE_EPS)?;

            if curve_radius(&p1, &p2) > radius_threshold {
                current += SAMPLE_DS;
            } else {
                longest = longest.max(current);
                current = 0.0;
            }
        }

        longest = longest.max(current);
    }

    Ok(longest)
}

/// Fewest and most driving lanes per driving direction, over all lane
/// sections that have any.
pub fn driving_lane_count_range(
    reader: &OdrReader,
    selection: Option<&[&str]>,
) -> Option<ValueRange<usize>> {
    let mut range = None;

    for road in selected_roads(reader, selection) {
        for section in road.lane_sections.iter() {
            for side in [&section.left, &section.right].iter() {
                let count = side.iter().filter(|l| l.is_driving()).count();

                if count > 0 {
                    range = ValueRange::include(range, count);
                }
            }
        }
    }

    range
}

/// Distinct types of the left and right lanes.
pub fn lane_types(reader: &OdrReader, selection: Option<&[&str]>) -> Vec<String> {
    let mut types = Vec::new();

    for road in selected_roads(reader, selection) {
        for section in road.lane_sections.iter() {
            for lane in section.left.iter().chain(section.right.iter()) {
                push_unique(&mut types, lane.lane_type.clone());
            }
        }
    }

    types
}

/// Distinct road marks of all lanes.
pub fn lane_marking_types(
    reader: &OdrReader,
    selection: Option<&[&str]>,
) -> Vec<LaneMarkingType> {
    let mut types = Vec::new();

    for road in selected_roads(reader, selection) {
        for lane in road.lane_sections.iter().flat_map(|ls| ls.lanes()) {
            for mark in lane.road_marks.iter() {
                push_unique(
                    &mut types,
                    LaneMarkingType {
                        mark_type: mark.mark_type.clone(),
                        color: mark.color.clone(),
                        weight: mark.weight.clone(),
                    },
                );
            }
        }
    }

    types
}

/// Distinct road types.
pub fn road_types(reader: &OdrReader, selection: Option<&[&str]>) -> Vec<String> {
    let mut types = Vec::new();

    for road in selected_roads(reader, selection) {
        for rt in road.road_types.iter() {
            push_unique(&mut types, rt.road_type.clone());
        }
    }

    types
}

/// Distinct plan view curve families used by the selected roads.
pub fn geometry_kinds(reader: &OdrReader, selection: Option<&[&str]>) -> Vec<&'static str> {
    let mut kinds = Vec::new();

    for road in selected_roads(reader, selection) {
        for geom in road.plan_view.iter() {
            push_unique(&mut kinds, geom.shape.kind());
        }
    }

    kinds
}

/// Traffic rule of the first road declaring one, right hand traffic if none
/// does.
pub fn traffic_rule(reader: &OdrReader) -> String {
    reader
        .get_all_roads()
        .iter()
        .find_map(|r| r.rule.clone())
        .unwrap_or_else(|| DEFAULT_TRAFFIC_RULE.into())
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

pub(crate) fn selected_roads<'a>(reader: &'a OdrReader, selection: Option<&[&str]>) -> Vec<&'a Road> {
    match selection {
        Some(ids) => ids
            .iter()
            .filter_map(|id| reader.network().road(id))
            .collect(),
        None => reader.get_all_roads().iter().collect(),
    }
}

/// Positions `start, start + 1, ...` for which `s + margin` stays before `end`.
fn sample_positions(start: f64, end: f64, margin: f64) -> impl Iterator<Item = f64> {
    (0..)
        .map(move |i| start + i as f64 * SAMPLE_DS)
        .take_while(move |s| *s + margin < end)
}

/// Radius of the curve between two poses `CURVE_EPS` apart.
fn curve_radius(p1: &Pose3d, p2: &Pose3d) -> f64 {
    (CURVE_EPS / get_ang_dist_pi(p1.heading, p2.heading)).abs()
}

fn push_unique<T: PartialEq>(items: &mut Vec<T>, item: T) {
    if !items.contains(&item) {
        items.push(item);
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
