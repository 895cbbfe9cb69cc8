//! Roads, their plan view and the elements placed along them

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

use super::{LaneSection, Poly3Record};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize)]
pub struct Road {
    pub id: String,
    pub name: Option<String>,
    pub length: f64,

    /// ID of the junction this road belongs to, `-1` if none.
    pub junction: String,

    /// Traffic rule, `RHT` or `LHT`.
    pub rule: Option<String>,

    pub link: Option<RoadLink>,
    pub road_types: Vec<RoadType>,
    pub plan_view: Vec<Geometry>,
    pub elevation: Vec<Poly3Record>,
    pub superelevation: Vec<Poly3Record>,
    pub shape: Vec<ShapeRecord>,
    pub lane_offsets: Vec<Poly3Record>,
    pub lane_sections: Vec<LaneSection>,
    pub objects: Vec<RoadObject>,
    pub bridges: Vec<RoadStructure>,
    pub tunnels: Vec<RoadStructure>,
    pub signals: Vec<RoadSignal>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RoadLink {
    pub predecessor: Option<LinkElement>,
    pub successor: Option<LinkElement>,
}

/// The road or junction a road is linked to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkElement {
    pub element_type: ElementType,
    pub element_id: String,
    pub contact_point: Option<ContactPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoadType {
    pub s: f64,
    pub road_type: String,
    pub country: Option<String>,
}

/// A plan view segment starting at `s`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Geometry {
    pub s: f64,
    pub x: f64,
    pub y: f64,
    pub hdg: f64,
    pub length: f64,
    pub shape: GeometryShape,
}

/// Coefficients of a parametric cubic segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParamPoly3 {
    pub a_u: f64,
    pub b_u: f64,
    pub c_u: f64,
    pub d_u: f64,
    pub a_v: f64,
    pub b_v: f64,
    pub c_v: f64,
    pub d_v: f64,
    pub p_range: PRange,
}

/// A lateral shape polynomial `a + b*dt + c*dt^2 + d*dt^3` starting at `t`,
/// valid from `s` onwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ShapeRecord {
    pub s: f64,
    pub t: f64,
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RoadObject {
    pub id: String,
    pub name: Option<String>,
    pub object_type: Option<String>,
    pub subtype: Option<String>,
    pub s: f64,
    pub t: f64,
    pub z_offset: f64,
    pub hdg: Option<f64>,
    pub pitch: Option<f64>,
    pub roll: Option<f64>,
    pub orientation: Option<String>,
    pub length: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub radius: Option<f64>,
}

/// A bridge or tunnel covering `[s, s + length]` of a road.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RoadStructure {
    pub id: String,
    pub name: Option<String>,
    pub s: f64,
    pub length: f64,
    pub structure_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RoadSignal {
    pub id: String,
    pub name: Option<String>,
    pub s: f64,
    pub t: f64,
    pub z_offset: f64,
    pub h_offset: Option<f64>,
    pub dynamic: String,
    pub orientation: String,
    pub country: Option<String>,
    pub signal_type: String,
    pub subtype: String,
    pub value: Option<f64>,
    pub unit: Option<String>,
    pub text: Option<String>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    Road,
    Junction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactPoint {
    Start,
    End,
}

/// The curve family of a plan view segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum GeometryShape {
    Line,
    Arc { curvature: f64 },
    Spiral { curv_start: f64, curv_end: f64 },
    Poly3 { a: f64, b: f64, c: f64, d: f64 },
    ParamPoly3(ParamPoly3),
}

/// Range of the parameter of a parametric cubic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PRange {
    /// `p` runs from 0 to the segment length
    ArcLength,

    /// `p` runs from 0 to 1
    Normalized,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Road {
    /// The junction this road belongs to, if any.
    pub fn junction_id(&self) -> Option<&str> {
        match self.junction.as_str() {
            "-1" | "" => None,
            id => Some(id),
        }
    }

    pub fn predecessor(&self) -> Option<&LinkElement> {
        self.link.as_ref().and_then(|l| l.predecessor.as_ref())
    }

    pub fn successor(&self) -> Option<&LinkElement> {
        self.link.as_ref().and_then(|l| l.successor.as_ref())
    }

    /// Start and end of lane section `idx`, the last one ends with the road.
    pub fn lane_section_range(&self, idx: usize) -> Option<(f64, f64)> {
        let section = self.lane_sections.get(idx)?;
        let end = match self.lane_sections.get(idx + 1) {
            Some(next) => next.s,
            None => self.length,
        };

        Some((section.s, end))
    }
}

impl GeometryShape {
    /// The OpenDRIVE element name of the shape.
    pub fn kind(&self) -> &'static str {
        match self {
            GeometryShape::Line => "line",
            GeometryShape::Arc { .. } => "arc",
            GeometryShape::Spiral { .. } => "spiral",
            GeometryShape::Poly3 { .. } => "poly3",
            GeometryShape::ParamPoly3(_) => "paramPoly3",
        }
    }
}
