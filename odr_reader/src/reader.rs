//! # OpenDRIVE reader
//!
//! [`OdrReader`] owns a parsed road network and answers pose, lane and
//! element queries against it.
//!
//! Lookups of elements by ID return `Option`, `None` meaning the element does
//! not exist. Geometric queries return `Result` and fail for unknown roads,
//! positions outside the road and unsupported plan view segments.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::path::Path;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::{
    error::{OdrError, ParseError},
    geometry::{eval_geometry, PlanViewPoint},
    lane_geometry::{boundary_t, lane_height, lane_offset, lane_section_at, lane_width, Boundary},
    network::{
        find_last_at, ElementType, Header, Junction, Lane, LaneSection, LinkElement, Road,
        RoadNetwork, RoadObject, RoadSignal,
    },
    parser::parse_opendrive,
    pose::Pose3d,
    profile::road_surface,
    road_mark::{active_road_mark, visible_lines},
};
use util::maths::wrap_pi;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Tolerance on the number of sampling steps fitting into a range.
const STEP_EPSILON: f64 = 1e-9;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

pub struct OdrReader {
    network: RoadNetwork,
}

/// Lane IDs of one lane section and the range of `s` it covers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaneSectionLaneIds {
    pub start: f64,
    pub end: f64,

    /// Descending lane IDs
    pub lane_ids: Vec<i32>,
}

/// A sampled point of a painted road mark line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkingPoint {
    pub s: f64,
    pub pose: Pose3d,
    pub mark_type: String,
    pub color: String,

    /// Index of the line in the road mark pattern, if the mark has one
    pub line: Option<usize>,
}

/// Parameters of road mark sampling.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct MarkingSamplingParams {
    /// Distance between samples in metres
    pub ds: f64,

    /// Sample on the inner lane border instead of the outer one
    #[serde(default)]
    pub inner: bool,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The kind of ID passed to [`OdrReader::get_road`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoadQuery {
    /// The road with this ID
    Road,

    /// All roads belonging to the junction with this ID
    Junction,

    /// The road carrying the object with this ID
    Object,

    /// The road carrying the signal with this ID
    Signal,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl OdrReader {
    /// Parse a reader from the contents of an OpenDRIVE file.
    pub fn new(xodr: &str) -> Result<Self, ParseError> {
        Ok(Self::from_network(parse_opendrive(xodr)?))
    }

    /// Read and parse an OpenDRIVE file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ParseError> {
        let xodr = match std::fs::read_to_string(path) {
            Ok(x) => x,
            Err(e) => return Err(ParseError::FileError(e)),
        };

        Self::new(&xodr)
    }

    pub fn from_network(network: RoadNetwork) -> Self {
        Self { network }
    }

    pub fn network(&self) -> &RoadNetwork {
        &self.network
    }

    pub fn get_header(&self) -> &Header {
        &self.network.header
    }

    /// Get roads by a road, junction, object or signal ID.
    ///
    /// Returns `None` if no road matches.
    pub fn get_road(&self, id: &str, query: RoadQuery) -> Option<Vec<&Road>> {
        let roads: Vec<&Road> = match query {
            RoadQuery::Road => self.network.road(id).into_iter().collect(),
            RoadQuery::Junction => self
                .network
                .roads
                .iter()
                .filter(|r| r.junction == id)
                .collect(),
            RoadQuery::Object => self
                .network
                .roads
                .iter()
                .filter(|r| r.objects.iter().any(|o| o.id == id))
                .take(1)
                .collect(),
            RoadQuery::Signal => self
                .network
                .roads
                .iter()
                .filter(|r| r.signals.iter().any(|s| s.id == id))
                .take(1)
                .collect(),
        };

        match roads.is_empty() {
            true => None,
            false => Some(roads),
        }
    }

    pub fn get_all_roads(&self) -> &[Road] {
        &self.network.roads
    }

    /// Roads connected to the start of the road.
    ///
    /// If the road starts in a junction these are the junction's roads ending
    /// at this road. Returns `None` if the road does not exist.
    pub fn get_predecessing_roads(&self, road_id: &str) -> Option<Vec<&Road>> {
        let road = self.network.road(road_id)?;

        Some(match road.predecessor() {
            Some(link) => self.linked_roads(road_id, link, Road::successor),
            None => Vec::new(),
        })
    }

    /// Roads connected to the end of the road.
    ///
    /// If the road ends in a junction these are the junction's roads starting
    /// at this road. Returns `None` if the road does not exist.
    pub fn get_successing_roads(&self, road_id: &str) -> Option<Vec<&Road>> {
        let road = self.network.road(road_id)?;

        Some(match road.successor() {
            Some(link) => self.linked_roads(road_id, link, Road::predecessor),
            None => Vec::new(),
        })
    }

    pub fn get_junction(&self, id: &str) -> Option<&Junction> {
        self.network.junction(id)
    }

    pub fn get_all_junctions(&self) -> &[Junction] {
        &self.network.junctions
    }

    pub fn get_object(&self, id: &str) -> Option<&RoadObject> {
        self.network
            .roads
            .iter()
            .flat_map(|r| r.objects.iter())
            .find(|o| o.id == id)
    }

    pub fn get_signal(&self, id: &str) -> Option<&RoadSignal> {
        self.network
            .roads
            .iter()
            .flat_map(|r| r.signals.iter())
            .find(|s| s.id == id)
    }

    /// Pose of the road's reference line at `s`.
    pub fn get_reference_line_pose(&self, road_id: &str, s: f64) -> Result<Pose3d, OdrError> {
        let road = self.checked_road(road_id, s)?;
        self.pose_on(road, s, 0.0)
    }

    /// Pose at `s` on a border of the lane.
    pub fn get_lane_boundary_pose(
        &self,
        road_id: &str,
        lane_id: i32,
        s: f64,
        boundary: Boundary,
    ) -> Result<Pose3d, OdrError> {
        let road = self.checked_road(road_id, s)?;
        let t = self.boundary_t_on(road, lane_id, s, boundary)?;

        self.pose_on(road, s, t)
    }

    /// Pose at the road coordinates `(s, t)`.
    pub fn get_pose(&self, road_id: &str, s: f64, t: f64) -> Result<Pose3d, OdrError> {
        let road = self.checked_road(road_id, s)?;
        self.pose_on(road, s, t)
    }

    /// Width of the lane at `s`.
    pub fn get_lane_width(&self, road_id: &str, lane_id: i32, s: f64) -> Result<f64, OdrError> {
        let road = self.checked_road(road_id, s)?;
        let section = self.section_on(road, s)?;

        match section.lane(lane_id) {
            Some(lane) => Ok(lane_width(lane, s - section.s)),
            None => Err(self.unknown_lane(road, lane_id, s)),
        }
    }

    /// The lane with this ID in the lane section in effect at `s`.
    pub fn get_lane(&self, road_id: &str, lane_id: i32, s: f64) -> Option<&Lane> {
        let road = self.network.road(road_id)?;
        lane_section_at(road, s)?.lane(lane_id)
    }

    /// Descending IDs of all lanes at `s`.
    pub fn get_lane_ids(&self, road_id: &str, s: f64) -> Result<Vec<i32>, OdrError> {
        let road = self.checked_road(road_id, s)?;
        Ok(self.section_on(road, s)?.lane_ids())
    }

    /// Descending IDs of the driving lanes at `s`.
    pub fn get_driving_lane_ids(&self, road_id: &str, s: f64) -> Result<Vec<i32>, OdrError> {
        let road = self.checked_road(road_id, s)?;
        let section = self.section_on(road, s)?;

        Ok(section
            .lane_ids()
            .into_iter()
            .filter(|id| section.lane(*id).map(Lane::is_driving).unwrap_or(false))
            .collect())
    }

    /// Lane IDs of every lane section of the road.
    pub fn get_lane_section_lane_ids(&self, road_id: &str) -> Option<Vec<LaneSectionLaneIds>> {
        let road = self.network.road(road_id)?;

        Some(
            road.lane_sections
                .iter()
                .enumerate()
                .filter_map(|(i, section)| {
                    road.lane_section_range(i).map(|(start, end)| LaneSectionLaneIds {
                        start,
                        end,
                        lane_ids: section.lane_ids(),
                    })
                })
                .collect(),
        )
    }

    /// Pose of an object, including its vertical offset and own orientation.
    pub fn get_object_pose(&self, id: &str) -> Result<Pose3d, OdrError> {
        let (road, object) = match self
            .network
            .roads
            .iter()
            .find_map(|r| r.objects.iter().find(|o| o.id == id).map(|o| (r, o)))
        {
            Some(ro) => ro,
            None => {
                warn!("The road network has no object with ID {:?}", id);
                return Err(OdrError::UnknownObject(id.to_string()));
            }
        };

        let pose = self.get_pose(&road.id, object.s, object.t)?;

        Ok(Pose3d {
            z: pose.z + object.z_offset,
            heading: wrap_pi(pose.heading + object.hdg.unwrap_or(0.0)),
            pitch: wrap_pi(pose.pitch + object.pitch.unwrap_or(0.0)),
            roll: wrap_pi(pose.roll + object.roll.unwrap_or(0.0)),
            ..pose
        })
    }

    /// Sample the painted road mark lines on the outer border of a lane.
    ///
    /// `s` runs from `s_start` to `s_end` in steps of `ds`. Positions where the
    /// lane does not exist, has no road mark or lies in the gap of a broken
    /// line produce no points.
    pub fn get_lane_marking_points(
        &self,
        road_id: &str,
        s_start: f64,
        s_end: f64,
        ds: f64,
        lane_id: i32,
    ) -> Result<Vec<MarkingPoint>, OdrError> {
        self.sample_marking_points(road_id, s_start, s_end, lane_id, Boundary::Outer, ds)
    }

    /// Sample road mark lines with parameters loaded from a parameter file.
    pub fn get_lane_marking_points_with(
        &self,
        road_id: &str,
        s_start: f64,
        s_end: f64,
        lane_id: i32,
        params: &MarkingSamplingParams,
    ) -> Result<Vec<MarkingPoint>, OdrError> {
        let boundary = match params.inner {
            true => Boundary::Inner,
            false => Boundary::Outer,
        };

        self.sample_marking_points(road_id, s_start, s_end, lane_id, boundary, params.ds)
    }

    // ---- PRIVATE ----

    /// The road with this ID, provided `s` lies on it.
    fn checked_road(&self, road_id: &str, s: f64) -> Result<&Road, OdrError> {
        let road = match self.network.road(road_id) {
            Some(r) => r,
            None => {
                warn!("The road network has no road with ID {:?}", road_id);
                return Err(OdrError::UnknownRoad(road_id.to_string()));
            }
        };

        if !(0.0..=road.length).contains(&s) {
            warn!(
                "Road {:?} is not defined at s = {} (length {})",
                road_id, s, road.length
            );
            return Err(OdrError::SOutOfRange {
                road: road_id.to_string(),
                s,
                length: road.length,
            });
        }

        Ok(road)
    }

    fn linked_roads<F>(&self, road_id: &str, link: &LinkElement, back_link: F) -> Vec<&Road>
    where
        F: Fn(&Road) -> Option<&LinkElement>,
    {
        match link.element_type {
            ElementType::Road => self.network.road(&link.element_id).into_iter().collect(),
            ElementType::Junction => self
                .network
                .roads
                .iter()
                .filter(|r| r.junction == link.element_id)
                .filter(|r| {
                    back_link(*r)
                        .map(|l| l.element_id == road_id)
                        .unwrap_or(false)
                })
                .collect(),
        }
    }

    fn section_on<'a>(&self, road: &'a Road, s: f64) -> Result<&'a LaneSection, OdrError> {
        lane_section_at(road, s).ok_or_else(|| OdrError::NoLaneSection {
            road: road.id.clone(),
            s,
        })
    }

    fn unknown_lane(&self, road: &Road, lane: i32, s: f64) -> OdrError {
        warn!("Road {:?} has no lane {} at s = {}", road.id, lane, s);
        OdrError::UnknownLane {
            road: road.id.clone(),
            lane,
            s,
        }
    }

    fn boundary_t_on(
        &self,
        road: &Road,
        lane_id: i32,
        s: f64,
        boundary: Boundary,
    ) -> Result<f64, OdrError> {
        let section = self.section_on(road, s)?;

        match boundary_t(section, lane_id, s - section.s, lane_offset(road, s), boundary) {
            Some(t) => Ok(t),
            None => Err(self.unknown_lane(road, lane_id, s)),
        }
    }

    fn plan_view_point(&self, road: &Road, s: f64) -> Result<PlanViewPoint, OdrError> {
        let geom = match find_last_at(&road.plan_view, s, |g| g.s) {
            Some(g) => g,
            None => {
                return Err(OdrError::NoGeometry {
                    road: road.id.clone(),
                    s,
                })
            }
        };

        eval_geometry(geom, s).ok_or_else(|| OdrError::UnsupportedGeometry {
            road: road.id.clone(),
            s,
            kind: geom.shape.kind(),
        })
    }

    /// Resolve `(s, t)` on a road already checked to contain `s`.
    fn pose_on(&self, road: &Road, s: f64, t: f64) -> Result<Pose3d, OdrError> {
        let point = self.plan_view_point(road, s)?.offset_lateral(t);
        let mut surface = road_surface(road, s, t);

        if let Some(section) = lane_section_at(road, s) {
            surface.z += lane_height(section, s - section.s, lane_offset(road, s), t);
        }

        let offset = self.network.header.offset.unwrap_or_default();

        Ok(Pose3d {
            x: point.x + offset.x,
            y: point.y + offset.y,
            z: surface.z + offset.z,
            heading: wrap_pi(point.hdg + offset.hdg),
            pitch: wrap_pi(surface.pitch),
            roll: wrap_pi(surface.roll),
        })
    }

    fn sample_marking_points(
        &self,
        road_id: &str,
        s_start: f64,
        s_end: f64,
        lane_id: i32,
        boundary: Boundary,
        ds: f64,
    ) -> Result<Vec<MarkingPoint>, OdrError> {
        if !(ds > 0.0) {
            return Err(OdrError::InvalidStep(ds));
        }

        if s_start > s_end {
            return Err(OdrError::InvalidRange {
                start: s_start,
                end: s_end,
            });
        }

        self.checked_road(road_id, s_end)?;
        let road = self.checked_road(road_id, s_start)?;

        let num_steps = ((s_end - s_start) / ds + STEP_EPSILON).floor() as usize;
        let mut points = Vec::new();

        for i in 0..=num_steps {
            let s = (s_start + i as f64 * ds).min(s_end);

            let section = match lane_section_at(road, s) {
                Some(ls) => ls,
                None => continue,
            };
            let section_ds = s - section.s;

            let mark = match section
                .lane(lane_id)
                .and_then(|l| active_road_mark(l, section_ds))
            {
                Some(m) => m,
                None => continue,
            };

            let border = match boundary_t(
                section,
                lane_id,
                section_ds,
                lane_offset(road, s),
                boundary,
            ) {
                Some(t) => t,
                None => continue,
            };

            for line in visible_lines(mark, section_ds) {
                points.push(MarkingPoint {
                    s,
                    pose: self.pose_on(road, s, border + line.t_offset)?,
                    mark_type: line.mark_type,
                    color: line.color,
                    line: line.line,
                });
            }
        }

        debug!(
            "Sampled {} marking points on lane {} of road {:?}",
            points.len(),
            lane_id,
            road_id
        );

        Ok(points)
    }
}

impl Default for MarkingSamplingParams {
    fn default() -> Self {
        Self {
            ds: 1.0,
            inner: false,
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

    const XODR: &str = r#"<?xml version="1.0" standalone="yes"?>
<OpenDRIVE>
    <header revMajor="1" revMinor="6" name="reader test"/>
    <road name="straight" length="100.0" id="1" junction="-1">
        <link>
            <successor elementType="junction" elementId="10"/>
        </link>
        <planView>
            <geometry s="0.0" x="0.0" y="0.0" hdg="0.0" length="100.0">
                <line/>
            </geometry>
        </planView>
        <lanes>
            <laneSection s="0.0">
                <left>
                    <lane id="1" type="driving">
                        <width sOffset="0.0" a="3.5" b="0.0" c="0.0" d="0.0"/>
                        <roadMark sOffset="0.0" type="solid" color="white"/>
                    </lane>
                </left>
                <center>
                    <lane id="0" type="none"/>
                </center>
                <right>
                    <lane id="-1" type="driving">
                        <width sOffset="0.0" a="3.0" b="0.0" c="0.0" d="0.0"/>
                        <roadMark sOffset="0.0" type="broken" color="standard">
                            <type name="broken" width="0.12">
                                <line length="3.0" space="9.0" tOffset="0.0" sOffset="0.0"/>
                            </type>
                        </roadMark>
                    </lane>
                    <lane id="-2" type="sidewalk">
                        <width sOffset="0.0" a="2.0" b="0.0" c="0.0" d="0.0"/>
                    </lane>
                </right>
            </laneSection>
            <laneSection s="60.0">
                <center>
                    <lane id="0" type="none"/>
                </center>
                <right>
                    <lane id="-1" type="driving">
                        <width sOffset="20.0" a="3.0" b="0.0" c="0.0" d="0.0"/>
                        <width sOffset="0.0" a="2.5" b="0.025" c="0.0" d="0.0"/>
                    </lane>
                </right>
            </laneSection>
        </lanes>
        <objects>
            <object id="pole" type="pole" s="50.0" t="-6.0" zOffset="1.5" hdg="0.5"/>
        </objects>
        <signals>
            <signal id="stop" s="90.0" t="-4.0" dynamic="no" orientation="+" type="206"/>
        </signals>
    </road>
    <road name="arc" length="50.0" id="2" junction="10">
        <link>
            <predecessor elementType="road" elementId="1" contactPoint="end"/>
            <successor elementType="road" elementId="3" contactPoint="start"/>
        </link>
        <planView>
            <geometry s="0.0" x="100.0" y="0.0" hdg="0.0" length="50.0">
                <arc curvature="0.01"/>
            </geometry>
        </planView>
    </road>
    <road name="other" length="50.0" id="4" junction="10">
        <link>
            <predecessor elementType="road" elementId="5" contactPoint="end"/>
            <successor elementType="road" elementId="3" contactPoint="start"/>
        </link>
        <planView>
            <geometry s="0.0" x="0.0" y="50.0" hdg="0.0" length="50.0">
                <poly3 a="0.0" b="0.0" c="0.0" d="0.0"/>
            </geometry>
        </planView>
    </road>
    <road name="exit" length="40.0" id="3" junction="-1">
        <link>
            <predecessor elementType="junction" elementId="10"/>
        </link>
        <planView>
            <geometry s="0.0" x="140.0" y="20.0" hdg="1.0" length="40.0">
                <line/>
            </geometry>
        </planView>
    </road>
    <junction id="10" name="crossing">
        <connection id="0" incomingRoad="1" connectingRoad="2" contactPoint="start"/>
    </junction>
</OpenDRIVE>"#;

    fn reader() -> OdrReader {
        OdrReader::new(XODR).unwrap()
    }

    #[test]
    fn test_lookups() {
        let reader = reader();

        assert_eq!(reader.get_header().name.as_deref(), Some("reader test"));
        assert_eq!(reader.get_all_roads().len(), 4);
        assert_eq!(reader.get_all_junctions().len(), 1);
        assert!(reader.get_junction("10").is_some());
        assert!(reader.get_junction("11").is_none());

        let ids = |roads: Option<Vec<&Road>>| -> Vec<String> {
            roads
                .unwrap_or_default()
                .iter()
                .map(|r| r.id.clone())
                .collect()
        };

        assert_eq!(ids(reader.get_road("1", RoadQuery::Road)), vec!["1"]);
        assert_eq!(ids(reader.get_road("10", RoadQuery::Junction)), vec!["2", "4"]);
        assert_eq!(ids(reader.get_road("pole", RoadQuery::Object)), vec!["1"]);
        assert_eq!(ids(reader.get_road("stop", RoadQuery::Signal)), vec!["1"]);
        assert!(reader.get_road("99", RoadQuery::Road).is_none());

        assert_eq!(reader.get_object("pole").map(|o| o.s), Some(50.0));
        assert!(reader.get_object("tree").is_none());
        assert_eq!(reader.get_signal("stop").map(|s| s.t), Some(-4.0));
        assert!(reader.get_signal("yield").is_none());
    }

    #[test]
    fn test_linked_roads() {
        let reader = reader();
        let ids = |roads: Vec<&Road>| -> Vec<String> { roads.iter().map(|r| r.id.clone()).collect() };

        // Only the junction road starting at road 1 is a successor
        assert_eq!(ids(reader.get_successing_roads("1").unwrap()), vec!["2"]);
        assert!(reader.get_predecessing_roads("1").unwrap().is_empty());

        assert_eq!(ids(reader.get_predecessing_roads("2").unwrap()), vec!["1"]);

        // Both junction roads end at road 3
        assert_eq!(ids(reader.get_predecessing_roads("3").unwrap()), vec!["2", "4"]);

        assert!(reader.get_successing_roads("99").is_none());
    }

    #[test]
    fn test_reference_line_pose() {
        let reader = reader();

        let pose = reader.get_reference_line_pose("1", 50.0).unwrap();
        assert_relative_eq!(pose.x, 50.0);
        assert_relative_eq!(pose.y, 0.0);
        assert_relative_eq!(pose.heading, 0.0);

        let pose = reader.get_reference_line_pose("2", 50.0).unwrap();
        assert_relative_eq!(pose.heading, 0.5, epsilon = 1e-12);
        assert_relative_eq!(pose.x, 100.0 + 100.0 * 0.5_f64.sin(), epsilon = 1e-9);
    }

    #[test]
    fn test_header_offset() {
        let xodr = XODR.replace(
            r#"<header revMajor="1" revMinor="6" name="reader test"/>"#,
            r#"<header revMajor="1" revMinor="6" name="reader test">
        <offset x="10.0" y="-5.0" z="1.5" hdg="0.25"/>
    </header>"#,
        );
        assert_ne!(xodr, XODR);
        let shifted = OdrReader::new(&xodr).unwrap();
        let reader = reader();

        let base = reader.get_reference_line_pose("1", 50.0).unwrap();
        let pose = shifted.get_reference_line_pose("1", 50.0).unwrap();
        assert_relative_eq!(pose.x, base.x + 10.0);
        assert_relative_eq!(pose.y, base.y - 5.0);
        assert_relative_eq!(pose.z, base.z + 1.5);
        assert_relative_eq!(pose.heading, base.heading + 0.25, epsilon = 1e-12);

        let base = reader.get_pose("1", 20.0, -2.0).unwrap();
        let pose = shifted.get_pose("1", 20.0, -2.0).unwrap();
        assert_relative_eq!(pose.x, base.x + 10.0);
        assert_relative_eq!(pose.y, base.y - 5.0);
        assert_relative_eq!(pose.z, base.z + 1.5);
        assert_relative_eq!(pose.heading, base.heading + 0.25, epsilon = 1e-12);
        assert_relative_eq!(pose.pitch, base.pitch);
    }

    #[test]
    fn test_pose_errors() {
        let reader = reader();

        assert_eq!(
            reader.get_pose("1", 100.5, 0.0),
            Err(OdrError::SOutOfRange {
                road: "1".into(),
                s: 100.5,
                length: 100.0
            })
        );
        assert_eq!(
            reader.get_pose("9", 1.0, 0.0),
            Err(OdrError::UnknownRoad("9".into()))
        );
        assert!(matches!(
            reader.get_pose("4", 1.0, 0.0),
            Err(OdrError::UnsupportedGeometry { kind: "poly3", .. })
        ));
    }

    #[test]
    fn test_lane_width() {
        let reader = reader();

        for s in [0.0, 25.0, 59.9].iter() {
            assert_relative_eq!(reader.get_lane_width("1", -1, *s).unwrap(), 3.0);
        }

        // Second section widens from 2.5 m then stays at 3 m
        assert_relative_eq!(reader.get_lane_width("1", -1, 70.0).unwrap(), 2.75);
        assert_relative_eq!(reader.get_lane_width("1", -1, 90.0).unwrap(), 3.0);

        assert!(matches!(
            reader.get_lane_width("1", -2, 70.0),
            Err(OdrError::UnknownLane { lane: -2, .. })
        ));
    }

    #[test]
    fn test_lane_boundary_pose() {
        let reader = reader();

        let pose = reader
            .get_lane_boundary_pose("1", -2, 10.0, Boundary::Outer)
            .unwrap();
        assert_relative_eq!(pose.y, -5.0);

        let pose = reader
            .get_lane_boundary_pose("1", -2, 10.0, Boundary::Inner)
            .unwrap();
        assert_relative_eq!(pose.y, -3.0);

        let pose = reader
            .get_lane_boundary_pose("1", 1, 10.0, Boundary::default())
            .unwrap();
        assert_relative_eq!(pose.y, 3.5);
    }

    #[test]
    fn test_lane_ids() {
        let reader = reader();

        assert_eq!(reader.get_lane_ids("1", 10.0).unwrap(), vec![1, 0, -1, -2]);
        assert_eq!(reader.get_driving_lane_ids("1", 10.0).unwrap(), vec![1, -1]);
        assert_eq!(reader.get_driving_lane_ids("1", 80.0).unwrap(), vec![-1]);

        assert_eq!(reader.get_lane("1", -2, 10.0).map(|l| l.lane_type.as_str()), Some("sidewalk"));
        assert!(reader.get_lane("1", -2, 80.0).is_none());

        let sections = reader.get_lane_section_lane_ids("1").unwrap();
        assert_eq!(
            sections,
            vec![
                LaneSectionLaneIds {
                    start: 0.0,
                    end: 60.0,
                    lane_ids: vec![1, 0, -1, -2]
                },
                LaneSectionLaneIds {
                    start: 60.0,
                    end: 100.0,
                    lane_ids: vec![0, -1]
                },
            ]
        );
        assert!(reader.get_lane_section_lane_ids("7").is_none());
    }

    #[test]
    fn test_object_pose() {
        let reader = reader();

        let pose = reader.get_object_pose("pole").unwrap();
        assert_relative_eq!(pose.x, 50.0);
        assert_relative_eq!(pose.y, -6.0);
        assert_relative_eq!(pose.z, 1.5);
        assert_relative_eq!(pose.heading, 0.5);

        assert_eq!(
            reader.get_object_pose("tree"),
            Err(OdrError::UnknownObject("tree".into()))
        );
    }

    #[test]
    fn test_marking_points() {
        let reader = reader();

        // Broken line painted on [0, 3] and [12, 15]
        let points = reader.get_lane_marking_points("1", 0.0, 15.0, 1.0, -1).unwrap();
        let s: Vec<f64> = points.iter().map(|p| p.s).collect();
        assert_eq!(s, vec![0.0, 1.0, 2.0, 3.0, 12.0, 13.0, 14.0, 15.0]);
        assert!(points.iter().all(|p| p.mark_type == "broken" && p.line == Some(0)));
        assert_relative_eq!(points[0].pose.y, -3.0);

        // Simple solid mark on the left lane
        let points = reader.get_lane_marking_points("1", 0.0, 2.0, 0.5, 1).unwrap();
        assert_eq!(points.len(), 5);
        assert_eq!(points[4].color, "white");
        assert_relative_eq!(points[4].pose.y, 3.5);

        // Lane 1 does not exist in the second section
        assert!(reader
            .get_lane_marking_points("1", 60.0, 80.0, 1.0, 1)
            .unwrap()
            .is_empty());

        assert_eq!(
            reader.get_lane_marking_points("1", 0.0, 10.0, 0.0, -1),
            Err(OdrError::InvalidStep(0.0))
        );
        assert_eq!(
            reader.get_lane_marking_points("1", 10.0, 5.0, 1.0, -1),
            Err(OdrError::InvalidRange {
                start: 10.0,
                end: 5.0
            })
        );
        assert!(matches!(
            reader.get_lane_marking_points("1", 0.0, 120.0, 1.0, -1),
            Err(OdrError::SOutOfRange { .. })
        ));
    }

    #[test]
    fn test_marking_points_with_params() {
        let reader = reader();
        let params: MarkingSamplingParams = util::params::from_str("ds = 1.5\ninner = true").unwrap();

        let points = reader
            .get_lane_marking_points_with("1", 0.0, 3.0, 1, &params)
            .unwrap();

        assert_eq!(points.len(), 3);
        assert_relative_eq!(points[1].s, 1.5);
        assert_relative_eq!(points[1].pose.y, 0.0);
    }
}
