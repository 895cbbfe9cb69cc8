//! # Map checks
//!
//! Pass/fail checks of a road network. Consistency checks look for gaps in
//! the geometry and for dangling references, requirement checks compare the
//! content of the map against what a simulation needs.
//!
//! Every check collects one log sentence per failed location and keeps
//! checking after the first failure.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::f64::consts::PI;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::{
    error::OdrError,
    lane_geometry::Boundary,
    network::{ContactPoint, ElementType, LaneSection, LinkElement, Road, RoadNetwork},
    pose::Pose3d,
    reader::OdrReader,
    statistics::{driving_lane_width_range, selected_roads, traction_range},
};
use util::maths::wrap_pi;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Distance before a segment start at which the pose of the previous segment
/// is taken.
const TRANSITION_EPS: f64 = 1e-6;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Outcome of a check, with one log sentence per failed location.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapCheck {
    pub passed: bool,
    pub log: String,
}

/// Parameters of the consistency checks.
#[derive(Debug, Clone, Deserialize)]
pub struct MapCheckParams {
    /// Largest allowed absolute offset of each pose component at a transition
    pub offset_threshold: Pose3d,
}

/// An object or signal a map is required to contain.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TargetElement {
    #[serde(rename = "type")]
    pub element_type: String,

    /// Any subtype matches if unset
    #[serde(default)]
    pub subtype: Option<String>,
}

/// The end of a road taking part in a road transition.
#[derive(Clone, Copy)]
struct RoadEnd<'a> {
    road: &'a Road,
    contact: ContactPoint,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl MapCheck {
    fn new() -> Self {
        Self {
            passed: true,
            log: String::new(),
        }
    }

    fn fail(&mut self, sentence: String) {
        self.passed = false;
        self.log += &sentence;
        self.log.push(' ');
    }

    fn merge(&mut self, other: MapCheck) {
        self.passed &= other.passed;
        self.log += &other.log;
    }

    /// Trim the log, replacing it by `success` if nothing failed.
    fn finish(mut self, success: &str) -> Self {
        if self.passed && !success.is_empty() {
            self.log = success.into();
        } else {
            self.log = self.log.trim().into();
        }

        self
    }
}

impl TargetElement {
    fn matches(&self, element_type: Option<&str>, subtype: Option<&str>) -> bool {
        element_type == Some(self.element_type.as_str())
            && match self.subtype {
                Some(ref s) => subtype == Some(s.as_str()),
                None => true,
            }
    }

    fn is_structure(&self) -> bool {
        let t = self.element_type.to_lowercase();
        t == "bridge" || t == "tunnel"
    }

    fn describe(&self) -> String {
        match self.subtype {
            Some(ref s) => format!("type {} and sub type {}", self.element_type, s),
            None => format!("type {}", self.element_type),
        }
    }
}

impl<'a> RoadEnd<'a> {
    fn s(&self) -> f64 {
        match self.contact {
            ContactPoint::Start => 0.0,
            ContactPoint::End => self.road.length,
        }
    }

    fn section(&self) -> Option<&'a LaneSection> {
        match self.contact {
            ContactPoint::Start => self.road.lane_sections.first(),
            ContactPoint::End => self.road.lane_sections.last(),
        }
    }

    fn has_lane(&self, lane_id: i32) -> bool {
        self.section().and_then(|s| s.lane(lane_id)).is_some()
    }

    /// Whether both reference lines point the same way across the transition.
    fn is_aligned_with(&self, other: &RoadEnd) -> bool {
        self.contact != other.contact
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Check every transition of the network: between linked roads and between
/// the plan view, elevation, superelevation and shape records of each road.
pub fn check_offsets(reader: &OdrReader, threshold: &Pose3d) -> Result<MapCheck, OdrError> {
    let mut check = MapCheck::new();

    for road in reader.get_all_roads() {
        check.merge(check_road_transitions(reader, &road.id, threshold)?);
    }

    for road in reader.get_all_roads() {
        check.merge(check_geometry_transitions(reader, &road.id, threshold)?);
        check.merge(check_elevation_transitions(reader, &road.id, threshold)?);
        check.merge(check_superelevation_transitions(reader, &road.id, threshold)?);
        check.merge(check_shape_transitions(reader, &road.id, threshold)?);
    }

    info!("Offset check passed: {}", check.passed);

    Ok(check.finish("All transitions are within the allowed offset."))
}

/// Check that the lane borders of a road meet those of the roads linked to
/// its start and end.
///
/// Lanes are paired by their lane links, or by ID if a lane has none. Links to
/// undefined roads or lanes are skipped, [`check_references`] reports them.
pub fn check_road_transitions(
    reader: &OdrReader,
    road_id: &str,
    threshold: &Pose3d,
) -> Result<MapCheck, OdrError> {
    let road = checked_road(reader, road_id)?;
    let mut check = MapCheck::new();

    let links = [
        (road.predecessor(), ContactPoint::Start, ContactPoint::End),
        (road.successor(), ContactPoint::End, ContactPoint::Start),
    ];

    for (link, contact, default_contact) in links.iter() {
        let link = match link {
            Some(l) => l,
            None => continue,
        };
        let end = RoadEnd {
            road,
            contact: *contact,
        };

        let transitions = match link.element_type {
            ElementType::Road => match reader.network().road(&link.element_id) {
                Some(other) => {
                    let other_end = RoadEnd {
                        road: other,
                        contact: link.contact_point.unwrap_or(*default_contact),
                    };
                    vec![(other_end, road_lane_pairs(&end, &other_end))]
                }
                None => continue,
            },
            ElementType::Junction => junction_transitions(reader.network(), &end, &link.element_id),
        };

        for (other_end, pairs) in transitions {
            for (lane, other_lane) in pairs {
                if !end.has_lane(lane) || !other_end.has_lane(other_lane) {
                    continue;
                }

                if !borders_meet(reader, &end, lane, &other_end, other_lane, threshold)? {
                    check.fail(format!(
                        "Offset in road transition greater than allowed threshold (for transition \
                        from road {}, lane {} to road {}, lane {}).",
                        road.id, lane, other_end.road.id, other_lane
                    ));
                }
            }
        }
    }

    Ok(check)
}

/// Check that consecutive plan view segments of a road join up.
///
/// The end pose of each segment is compared to the start pose of the next one,
/// and every component of the offset must be within `threshold`.
pub fn check_geometry_transitions(
    reader: &OdrReader,
    road_id: &str,
    threshold: &Pose3d,
) -> Result<MapCheck, OdrError> {
    let road = checked_road(reader, road_id)?;
    let mut check = MapCheck::new();

    for pair in road.plan_view.windows(2) {
        let (prev, curr) = (&pair[0], &pair[1]);

        let s_end = (prev.s + prev.length - TRANSITION_EPS).max(prev.s);
        let end_pose = reader.get_reference_line_pose(road_id, s_end)?;
        let start_pose = reader.get_reference_line_pose(road_id, curr.s)?;

        if !end_pose.is_within(&start_pose, threshold) {
            check.fail(format!(
                "Offset of reference line in geometry transition greater than allowed \
                threshold (for road {} at point s={}).",
                road_id, curr.s
            ));
        }
    }

    Ok(check)
}

pub fn check_elevation_transitions(
    reader: &OdrReader,
    road_id: &str,
    threshold: &Pose3d,
) -> Result<MapCheck, OdrError> {
    let road = checked_road(reader, road_id)?;
    let starts: Vec<f64> = road.elevation.iter().map(|e| e.s).collect();

    profile_transitions(reader, road, &starts, "elevation", threshold)
}

pub fn check_superelevation_transitions(
    reader: &OdrReader,
    road_id: &str,
    threshold: &Pose3d,
) -> Result<MapCheck, OdrError> {
    let road = checked_road(reader, road_id)?;
    let starts: Vec<f64> = road.superelevation.iter().map(|e| e.s).collect();

    profile_transitions(reader, road, &starts, "superelevation", threshold)
}

pub fn check_shape_transitions(
    reader: &OdrReader,
    road_id: &str,
    threshold: &Pose3d,
) -> Result<MapCheck, OdrError> {
    let road = checked_road(reader, road_id)?;

    // Shape records are sorted by s, then by t
    let mut starts: Vec<f64> = road.shape.iter().map(|e| e.s).collect();
    starts.dedup();

    profile_transitions(reader, road, &starts, "shape", threshold)
}

/// Check that every road, junction and lane referenced in the network is
/// defined.
pub fn check_references(reader: &OdrReader) -> MapCheck {
    let network = reader.network();
    let mut check = MapCheck::new();

    for road in network.roads.iter() {
        if let Some(junction_id) = road.junction_id() {
            if network.junction(junction_id).is_none() {
                check.fail(format!(
                    "Junction with ID {} is not defined, although referenced in road with ID {}.",
                    junction_id, road.id
                ));
            }
        }

        for link in road.predecessor().iter().chain(road.successor().iter()) {
            let defined = match link.element_type {
                ElementType::Road => network.road(&link.element_id).is_some(),
                ElementType::Junction => network.junction(&link.element_id).is_some(),
            };

            if !defined {
                check.fail(format!(
                    "{} with ID {} is not defined, although referenced in road with ID {}.",
                    element_name(link.element_type),
                    link.element_id,
                    road.id
                ));
            }
        }

        check_lane_links(network, road, &mut check);
    }

    for junction in network.junctions.iter() {
        for conn in junction.connections.iter() {
            if let Some(ref id) = conn.incoming_road {
                match network.road(id) {
                    Some(incoming) => {
                        let end = junction_end(incoming, &junction.id);
                        for link in conn.lane_links.iter() {
                            if !end.has_lane(link.from) {
                                check.fail(undefined_lane(link.from, id, "junction", &junction.id));
                            }
                        }
                    }
                    None => check.fail(format!(
                        "Road with ID {} is not defined, although referenced in junction with ID {}.",
                        id, junction.id
                    )),
                }
            }

            if let Some(ref id) = conn.connecting_road {
                match network.road(id) {
                    Some(connecting) => {
                        let end = RoadEnd {
                            road: connecting,
                            contact: conn.contact_point.unwrap_or(ContactPoint::Start),
                        };
                        for link in conn.lane_links.iter() {
                            if !end.has_lane(link.to) {
                                check.fail(undefined_lane(link.to, id, "junction", &junction.id));
                            }
                        }
                    }
                    None => check.fail(format!(
                        "Road with ID {} is not defined, although referenced in junction with ID {}.",
                        id, junction.id
                    )),
                }
            }
        }
    }

    debug!("Reference check passed: {}", check.passed);

    check.finish("Map is complete. All referenced roads, junctions and lanes are defined.")
}

/// Check that the selected roads contain at least one object matching each
/// target.
///
/// Targets of type `bridge` or `tunnel` match the road's bridges and tunnels,
/// their subtype is compared with the structure type.
pub fn check_objects_availability(
    reader: &OdrReader,
    selection: Option<&[&str]>,
    targets: &[TargetElement],
) -> MapCheck {
    let roads = selected_roads(reader, selection);
    let mut check = MapCheck::new();

    for target in targets {
        let found = roads.iter().any(|road| {
            if target.is_structure() {
                let structures = match target.element_type.to_lowercase().as_str() {
                    "bridge" => &road.bridges,
                    _ => &road.tunnels,
                };
                structures.iter().any(|s| match target.subtype {
                    Some(ref sub) => &s.structure_type == sub,
                    None => true,
                })
            } else {
                road.objects.iter().any(|o| {
                    target.matches(o.object_type.as_deref(), o.subtype.as_deref())
                })
            }
        });

        if !found {
            check.fail(format!(
                "Map does not contain objects of {}, although required.",
                target.describe()
            ));
        }
    }

    check.finish("Map contains all required objects.")
}

/// Check that the selected roads contain at least one signal matching each
/// target.
pub fn check_signal_availability(
    reader: &OdrReader,
    selection: Option<&[&str]>,
    targets: &[TargetElement],
) -> MapCheck {
    let roads = selected_roads(reader, selection);
    let mut check = MapCheck::new();

    for target in targets {
        let found = roads.iter().any(|road| {
            road.signals
                .iter()
                .any(|s| target.matches(Some(s.signal_type.as_str()), Some(s.subtype.as_str())))
        });

        if !found {
            check.fail(format!(
                "Map does not contain signals of {}, although required.",
                target.describe()
            ));
        }
    }

    check.finish("Map contains all required signals.")
}

/// Check that the spread between the narrowest and widest driving lane lies in
/// `[min, max]`, without upper bound if `max` is `None`.
pub fn check_driving_lane_variability(
    reader: &OdrReader,
    selection: Option<&[&str]>,
    min: f64,
    max: Option<f64>,
) -> Result<MapCheck, OdrError> {
    let max = max.unwrap_or(f64::INFINITY);
    let mut check = MapCheck::new();

    match driving_lane_width_range(reader, selection)? {
        Some(range) => {
            let variability = (range.max - range.min).abs();
            if !(variability >= min && variability <= max) {
                check.fail(format!(
                    "The lane width variability must be within {} and {} m, but is evaluated \
                    to be {} m.",
                    min, max, variability
                ));
            }
        }
        None => check.fail("The map contains no driving lanes.".into()),
    }

    Ok(check.finish("The lanes of the map fulfill the required variability."))
}

/// Check that the friction of every lane material lies in `[min, max]`.
pub fn check_traction_range(
    reader: &OdrReader,
    selection: Option<&[&str]>,
    min: f64,
    max: f64,
) -> MapCheck {
    let mut check = MapCheck::new();

    match traction_range(reader, selection) {
        Some(range) => {
            if !(range.min >= min && range.max <= max) {
                check.fail(format!(
                    "The traction of all roads must be within {} and {}, but is evaluated to be \
                    between {} and {}.",
                    min, max, range.min, range.max
                ));
            }
        }
        None => check.fail("The map defines no lane materials.".into()),
    }

    check.finish("The traction of all roads is within the allowed range.")
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn checked_road<'a>(reader: &'a OdrReader, road_id: &str) -> Result<&'a Road, OdrError> {
    match reader.network().road(road_id) {
        Some(r) => Ok(r),
        None => Err(OdrError::UnknownRoad(road_id.to_string())),
    }
}

/// Compare the reference line just before and at each record start but the
/// first.
fn profile_transitions(
    reader: &OdrReader,
    road: &Road,
    starts: &[f64],
    profile: &str,
    threshold: &Pose3d,
) -> Result<MapCheck, OdrError> {
    let mut check = MapCheck::new();

    for s in starts.iter().skip(1).copied() {
        if !(s > 0.0 && s <= road.length) {
            continue;
        }

        let before = reader.get_reference_line_pose(&road.id, (s - TRANSITION_EPS).max(0.0))?;
        let at = reader.get_reference_line_pose(&road.id, s)?;

        if !before.is_within(&at, threshold) {
            check.fail(format!(
                "Offset of reference line in {} transition greater than allowed threshold \
                (for road {} at point s={}).",
                profile, road.id, s
            ));
        }
    }

    Ok(check)
}

/// Lane pairs across a road to road transition.
fn road_lane_pairs(end: &RoadEnd, other: &RoadEnd) -> Vec<(i32, i32)> {
    let section = match end.section() {
        Some(s) => s,
        None => return Vec::new(),
    };
    let aligned = end.is_aligned_with(other);

    let mut pairs = Vec::new();

    for lane in section.left.iter().chain(section.right.iter()) {
        let linked = match (&lane.link, end.contact) {
            (Some(l), ContactPoint::Start) => l.predecessor.as_slice(),
            (Some(l), ContactPoint::End) => l.successor.as_slice(),
            (None, _) => &[],
        };

        if linked.is_empty() {
            pairs.push((lane.id, if aligned { lane.id } else { -lane.id }));
        } else {
            pairs.extend(linked.iter().map(|id| (lane.id, *id)));
        }
    }

    pairs
}

/// Connecting roads and lane pairs of the junction connections leaving `end`.
fn junction_transitions<'a>(
    network: &'a RoadNetwork,
    end: &RoadEnd,
    junction_id: &str,
) -> Vec<(RoadEnd<'a>, Vec<(i32, i32)>)> {
    let junction = match network.junction(junction_id) {
        Some(j) => j,
        None => return Vec::new(),
    };

    junction
        .connections
        .iter()
        .filter(|c| c.incoming_road.as_deref() == Some(end.road.id.as_str()))
        .filter_map(|c| {
            let road = network.road(c.connecting_road.as_deref()?)?;
            let other_end = RoadEnd {
                road,
                contact: c.contact_point.unwrap_or(ContactPoint::Start),
            };

            Some((other_end, c.lane_links.iter().map(|l| (l.from, l.to)).collect()))
        })
        .collect()
}

/// Whether both borders of two lanes meet across a transition.
fn borders_meet(
    reader: &OdrReader,
    end: &RoadEnd,
    lane: i32,
    other: &RoadEnd,
    other_lane: i32,
    threshold: &Pose3d,
) -> Result<bool, OdrError> {
    for boundary in [Boundary::Inner, Boundary::Outer].iter() {
        let pose = reader.get_lane_boundary_pose(&end.road.id, lane, end.s(), *boundary)?;
        let mut other_pose =
            reader.get_lane_boundary_pose(&other.road.id, other_lane, other.s(), *boundary)?;

        if !end.is_aligned_with(other) {
            other_pose = reversed(&other_pose);
        }

        if !pose.is_within(&other_pose, threshold) {
            return Ok(false);
        }
    }

    Ok(true)
}

/// The same pose facing the opposite way.
fn reversed(pose: &Pose3d) -> Pose3d {
    Pose3d {
        heading: wrap_pi(pose.heading + PI),
        pitch: -pose.pitch,
        roll: -pose.roll,
        ..*pose
    }
}

/// The end of an incoming road that touches the junction.
fn junction_end<'a>(road: &'a Road, junction_id: &str) -> RoadEnd<'a> {
    let touches = |link: Option<&LinkElement>| {
        link.map(|l| l.element_type == ElementType::Junction && l.element_id == junction_id)
            .unwrap_or(false)
    };

    let contact = if touches(road.predecessor()) && !touches(road.successor()) {
        ContactPoint::Start
    } else {
        ContactPoint::End
    };

    RoadEnd { road, contact }
}

/// Check the lane links of a road against its own lane sections and the lane
/// sections of its linked roads.
fn check_lane_links(network: &RoadNetwork, road: &Road, check: &mut MapCheck) {
    let last = road.lane_sections.len().saturating_sub(1);

    for (i, section) in road.lane_sections.iter().enumerate() {
        for lane in section.left.iter().chain(section.right.iter()) {
            let link = match lane.link {
                Some(ref l) => l,
                None => continue,
            };

            let neighbours = [
                (&link.predecessor, "predecessor", i > 0, i.wrapping_sub(1)),
                (&link.successor, "successor", i < last, i + 1),
            ];

            for (ids, relation, internal, neighbour) in neighbours.iter() {
                if ids.is_empty() {
                    continue;
                }

                let (target, target_road) = if *internal {
                    (road.lane_sections.get(*neighbour), road.id.as_str())
                } else {
                    let (link, default_contact) = if *relation == "predecessor" {
                        (road.predecessor(), ContactPoint::End)
                    } else {
                        (road.successor(), ContactPoint::Start)
                    };

                    // Lanes entering junctions are linked by the junction
                    let link = match link {
                        Some(l) if l.element_type == ElementType::Road => l,
                        _ => continue,
                    };
                    let other = match network.road(&link.element_id) {
                        Some(r) => r,
                        None => continue,
                    };
                    let end = RoadEnd {
                        road: other,
                        contact: link.contact_point.unwrap_or(default_contact),
                    };

                    (end.section(), other.id.as_str())
                };

                for id in ids.iter() {
                    if target.and_then(|s| s.lane(*id)).is_none() {
                        check.fail(format!(
                            "Lane with ID {} in road with ID {} is not defined, although \
                            referenced as {} of lane {} in road with ID {}.",
                            id, target_road, relation, lane.id, road.id
                        ));
                    }
                }
            }
        }
    }
}

fn undefined_lane(lane: i32, road_id: &str, element: &str, element_id: &str) -> String {
    format!(
        "Lane with ID {} in road with ID {} is not defined, although referenced in {} with ID {}.",
        lane, road_id, element, element_id
    )
}

fn element_name(element_type: ElementType) -> &'static str {
    match element_type {
        ElementType::Road => "Road",
        ElementType::Junction => "Junction",
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    const XODR: &str = r#"<OpenDRIVE>
    <header revMajor="1" revMinor="6"/>
    <road length="10.0" id="a" junction="-1">
        <link>
            <successor elementType="road" elementId="b" contactPoint="start"/>
        </link>
        <planView>
            <geometry s="0.0" x="0.0" y="0.0" hdg="0.0" length="10.0">
                <line/>
            </geometry>
        </planView>
        <lanes>
            <laneSection s="0.0">
                <left>
                    <lane id="1" type="driving">
                        <width sOffset="0.0" a="3.5" b="0.0" c="0.0" d="0.0"/>
                        <material sOffset="0.0" friction="0.7"/>
                    </lane>
                </left>
                <center>
                    <lane id="0" type="none"/>
                </center>
                <right>
                    <lane id="-1" type="driving">
                        <width sOffset="0.0" a="3.5" b="0.0" c="0.0" d="0.0"/>
                        <material sOffset="0.0" friction="0.8"/>
                    </lane>
                </right>
            </laneSection>
        </lanes>
        <objects>
            <object id="o1" type="pole" subtype="permanentDelineator" s="2.0" t="-5.0"/>
            <tunnel id="o2" s="4.0" length="5.0" type="standard"/>
        </objects>
        <signals>
            <signal id="s1" s="5.0" t="-4.0" type="274" subtype="60" dynamic="no" orientation="+"/>
        </signals>
    </road>
    <road length="10.0" id="b" junction="-1">
        <link>
            <predecessor elementType="road" elementId="a" contactPoint="end"/>
            <successor elementType="junction" elementId="j"/>
        </link>
        <planView>
            <geometry s="0.0" x="10.0" y="0.0" hdg="0.0" length="10.0">
                <line/>
            </geometry>
        </planView>
        <lanes>
            <laneSection s="0.0">
                <left>
                    <lane id="1" type="driving">
                        <width sOffset="0.0" a="3.5" b="0.0" c="0.0" d="0.0"/>
                    </lane>
                </left>
                <center>
                    <lane id="0" type="none"/>
                </center>
                <right>
                    <lane id="-1" type="driving">
                        <link>
                            <predecessor id="-1"/>
                        </link>
                        <width sOffset="0.0" a="3.5" b="0.0" c="0.0" d="0.0"/>
                        <material sOffset="0.0" friction="0.9"/>
                    </lane>
                </right>
            </laneSection>
        </lanes>
    </road>
    <road length="10.0" id="c" junction="j">
        <link>
            <successor elementType="road" elementId="b" contactPoint="end"/>
        </link>
        <planView>
            <geometry s="0.0" x="30.0" y="0.0" hdg="3.141592653589793" length="10.0">
                <line/>
            </geometry>
        </planView>
        <lanes>
            <laneSection s="0.0">
                <left>
                    <lane id="1" type="driving">
                        <width sOffset="0.0" a="3.5" b="0.0" c="0.0" d="0.0"/>
                    </lane>
                </left>
                <center>
                    <lane id="0" type="none"/>
                </center>
                <right>
                    <lane id="-1" type="driving">
                        <width sOffset="0.0" a="3.5" b="0.0" c="0.0" d="0.0"/>
                    </lane>
                </right>
            </laneSection>
        </lanes>
    </road>
    <road length="10.0" id="d" junction="-1">
        <link>
            <successor elementType="road" elementId="b" contactPoint="start"/>
        </link>
        <planView>
            <geometry s="0.0" x="0.0" y="5.0" hdg="0.0" length="10.0">
                <line/>
            </geometry>
        </planView>
        <lanes>
            <laneSection s="0.0">
                <center>
                    <lane id="0" type="none"/>
                </center>
                <right>
                    <lane id="-1" type="driving">
                        <width sOffset="0.0" a="3.0" b="0.0" c="0.0" d="0.0"/>
                    </lane>
                </right>
            </laneSection>
        </lanes>
    </road>
    <junction id="j">
        <connection id="0" incomingRoad="b" connectingRoad="c" contactPoint="end">
            <laneLink from="-1" to="1"/>
        </connection>
    </junction>
</OpenDRIVE>"#;

    fn reader() -> OdrReader {
        OdrReader::new(XODR).unwrap()
    }

    fn threshold() -> Pose3d {
        Pose3d {
            x: 0.01,
            y: 0.01,
            z: 0.01,
            heading: 0.01,
            pitch: 0.01,
            roll: 0.01,
        }
    }

    fn target(element_type: &str, subtype: Option<&str>) -> TargetElement {
        TargetElement {
            element_type: element_type.into(),
            subtype: subtype.map(|s| s.into()),
        }
    }

    #[test]
    fn test_road_transitions() {
        let reader = reader();

        // Same direction, implicit and explicit lane links
        assert!(check_road_transitions(&reader, "a", &threshold()).unwrap().passed);
        assert!(check_road_transitions(&reader, "b", &threshold()).unwrap().passed);

        // Opposite direction, lane 1 of c continues lane -1 of b
        assert!(check_road_transitions(&reader, "c", &threshold()).unwrap().passed);

        // d ends 5 m beside the start of b
        let check = check_road_transitions(&reader, "d", &threshold()).unwrap();
        assert!(!check.passed);
        assert!(check.log.contains("from road d, lane -1 to road b, lane -1"));

        assert_eq!(
            check_road_transitions(&reader, "x", &threshold()),
            Err(OdrError::UnknownRoad("x".into()))
        );
    }

    #[test]
    fn test_check_offsets() {
        let check = check_offsets(&reader(), &threshold()).unwrap();
        assert!(!check.passed);
        assert!(check.log.contains("road d"));
        assert!(!check.log.ends_with(' '));

        let xodr = XODR
            .replace(r#"y="5.0""#, r#"y="0.0""#)
            .replace(r#"a="3.0""#, r#"a="3.5""#);
        let reader = OdrReader::new(&xodr).unwrap();
        let check = check_offsets(&reader, &threshold()).unwrap();
        assert!(check.passed, "{}", check.log);
        assert_eq!(check.log, "All transitions are within the allowed offset.");
    }

    #[test]
    fn test_geometry_transitions() {
        let xodr = r#"<OpenDRIVE>
    <header revMajor="1" revMinor="6"/>
    <road length="10.0" id="gap" junction="-1">
        <planView>
            <geometry s="0.0" x="0.0" y="50.0" hdg="0.0" length="5.0">
                <line/>
            </geometry>
            <geometry s="5.0" x="5.0" y="51.0" hdg="0.0" length="5.0">
                <line/>
            </geometry>
        </planView>
    </road>
</OpenDRIVE>"#;
        let reader = OdrReader::new(xodr).unwrap();

        let check = check_geometry_transitions(&reader, "gap", &threshold()).unwrap();
        assert!(!check.passed);
        assert!(check.log.contains("s=5"));

        let reader = OdrReader::new(&xodr.replace(r#"y="51.0""#, r#"y="50.0""#)).unwrap();
        assert!(check_geometry_transitions(&reader, "gap", &threshold()).unwrap().passed);
    }

    #[test]
    fn test_profile_transitions() {
        let xodr = r#"<OpenDRIVE>
    <header revMajor="1" revMinor="6"/>
    <road length="10.0" id="step" junction="-1">
        <planView>
            <geometry s="0.0" x="0.0" y="0.0" hdg="0.0" length="10.0">
                <line/>
            </geometry>
        </planView>
        <elevationProfile>
            <elevation s="0.0" a="0.0" b="0.0" c="0.0" d="0.0"/>
            <elevation s="5.0" a="1.0" b="0.0" c="0.0" d="0.0"/>
        </elevationProfile>
        <lateralProfile>
            <superelevation s="0.0" a="0.0" b="0.0" c="0.0" d="0.0"/>
            <superelevation s="4.0" a="0.0" b="0.0" c="0.0" d="0.0"/>
        </lateralProfile>
    </road>
</OpenDRIVE>"#;
        let reader = OdrReader::new(xodr).unwrap();

        let check = check_elevation_transitions(&reader, "step", &threshold()).unwrap();
        assert!(!check.passed);
        assert_eq!(
            check.log.trim(),
            "Offset of reference line in elevation transition greater than allowed threshold \
            (for road step at point s=5)."
        );

        assert!(check_superelevation_transitions(&reader, "step", &threshold()).unwrap().passed);
        assert!(check_shape_transitions(&reader, "step", &threshold()).unwrap().passed);
    }

    #[test]
    fn test_references() {
        let check = check_references(&reader());
        assert!(check.passed, "{}", check.log);
        assert_eq!(
            check.log,
            "Map is complete. All referenced roads, junctions and lanes are defined."
        );

        let broken = XODR
            .replace(r#"junction="j">"#, r#"junction="k">"#)
            .replace(r#"<predecessor id="-1"/>"#, r#"<predecessor id="-5"/>"#)
            .replace(r#"<laneLink from="-1" to="1"/>"#, r#"<laneLink from="-1" to="2"/>"#)
            .replace(r#"elementId="a" contactPoint="end""#, r#"elementId="z" contactPoint="end""#);
        let check = check_references(&OdrReader::new(&broken).unwrap());

        assert!(!check.passed);
        assert!(check.log.contains("Junction with ID k is not defined"));
        assert!(check.log.contains("Road with ID z is not defined"));
        assert!(check.log.contains("Lane with ID 2 in road with ID c"));
        assert!(!check.log.contains("-5"));

        // A dangling lane link inside a defined predecessor
        let broken = XODR.replace(r#"<predecessor id="-1"/>"#, r#"<predecessor id="-5"/>"#);
        let check = check_references(&OdrReader::new(&broken).unwrap());
        assert!(!check.passed);
        assert!(check.log.contains("Lane with ID -5 in road with ID a"));
    }

    #[test]
    fn test_availability() {
        let reader = reader();

        let check = check_objects_availability(
            &reader,
            None,
            &[target("pole", None), target("tunnel", None)],
        );
        assert!(check.passed);
        assert_eq!(check.log, "Map contains all required objects.");

        let check = check_objects_availability(
            &reader,
            None,
            &[
                target("pole", Some("bollard")),
                target("Bridge", None),
                target("tree", None),
            ],
        );
        assert!(!check.passed);
        assert!(check.log.contains("objects of type pole and sub type bollard"));
        assert!(check.log.contains("objects of type Bridge,"));
        assert!(check.log.contains("objects of type tree,"));

        // Objects outside the selection don't count
        let check =
            check_objects_availability(&reader, Some(&["b"][..]), &[target("pole", None)]);
        assert!(!check.passed);

        assert!(check_signal_availability(&reader, None, &[target("274", Some("60"))]).passed);
        let check = check_signal_availability(&reader, None, &[target("206", None)]);
        assert!(!check.passed);
        assert_eq!(
            check.log,
            "Map does not contain signals of type 206, although required."
        );

        let parsed: TargetElement =
            util::params::from_str("type = \"274\"\nsubtype = \"60\"").unwrap();
        assert_eq!(parsed, target("274", Some("60")));
    }

    #[test]
    fn test_requirement_ranges() {
        let reader = reader();

        // Lane widths are 3.0 and 3.5 m
        assert!(check_driving_lane_variability(&reader, None, 0.5, None).unwrap().passed);
        assert!(!check_driving_lane_variability(&reader, None, 0.0, Some(0.4)).unwrap().passed);
        let check =
            check_driving_lane_variability(&reader, Some(&["a", "b"][..]), 0.5, None).unwrap();
        assert!(!check.passed);
        assert!(check.log.contains("evaluated to be 0 m"));

        // Frictions are 0.7, 0.8 and 0.9
        assert!(check_traction_range(&reader, None, 0.6, 1.0).passed);
        let check = check_traction_range(&reader, None, 0.75, 1.0);
        assert!(!check.passed);
        assert!(check.log.contains("between 0.7 and 0.9"));
        assert!(!check_traction_range(&reader, Some(&["c"][..]), 0.0, 1.0).passed);
    }
}
