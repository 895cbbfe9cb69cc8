//! # Road network model
//!
//! Typed representation of an OpenDRIVE file. Every list keyed by `s` or
//! `sOffset` is sorted ascending by the parser, which the query functions rely
//! on when searching for the last record starting at or before a position.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod junction;
pub mod lanes;
pub mod road;

pub use junction::{Connection, Junction, LaneLinkPair};
pub use lanes::{
    Lane, LaneHeight, LaneLink, LaneMaterial, LaneSection, RoadMark, RoadMarkLine, RoadMarkType,
};
pub use road::{
    ContactPoint, ElementType, Geometry, GeometryShape, LinkElement, PRange, ParamPoly3, Road,
    RoadLink, RoadObject, RoadSignal, RoadStructure, RoadType, ShapeRecord,
};

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;
use util::maths::{poly_deriv_val, poly_val};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A complete road network.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RoadNetwork {
    pub header: Header,
    pub roads: Vec<Road>,
    pub junctions: Vec<Junction>,
}

/// Global metadata of the network.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Header {
    pub rev_major: u32,
    pub rev_minor: u32,
    pub name: Option<String>,
    pub version: Option<String>,
    pub date: Option<String>,
    pub north: Option<f64>,
    pub south: Option<f64>,
    pub east: Option<f64>,
    pub west: Option<f64>,
    pub vendor: Option<String>,
    pub geo_reference: Option<String>,

    /// Offset added to every global coordinate.
    pub offset: Option<Offset>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Offset {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub hdg: f64,
}

/// A cubic polynomial `a + b*ds + c*ds^2 + d*ds^3` valid from `s` onwards.
///
/// Used for elevation, superelevation, lane offset and lane width records.
/// For lane widths `s` holds the `sOffset` relative to the lane section start.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Poly3Record {
    pub s: f64,
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Poly3Record {
    /// Value of the polynomial at position `s`.
    pub fn value(&self, s: f64) -> f64 {
        poly_val(s - self.s, &self.coeffs())
    }

    /// First derivative of the polynomial at position `s`.
    pub fn slope(&self, s: f64) -> f64 {
        poly_deriv_val(s - self.s, &self.coeffs())
    }

    fn coeffs(&self) -> [f64; 4] {
        [self.a, self.b, self.c, self.d]
    }
}

impl RoadNetwork {
    pub fn road(&self, id: &str) -> Option<&Road> {
        self.roads.iter().find(|r| r.id == id)
    }

    pub fn junction(&self, id: &str) -> Option<&Junction> {
        self.junctions.iter().find(|j| j.id == id)
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// The last record of an ascending list for which `key(record) <= pos`.
pub fn find_last_at<T, F>(records: &[T], pos: f64, key: F) -> Option<&T>
where
    F: Fn(&T) -> f64,
{
    records.iter().rev().find(|r| key(r) <= pos)
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_poly3_record() {
        let rec = Poly3Record {
            s: 10.0,
            a: 1.0,
            b: 0.5,
            c: 0.0,
            d: 0.1,
        };

        assert_relative_eq!(rec.value(10.0), 1.0);
        assert_relative_eq!(rec.value(12.0), 2.8, epsilon = 1e-12);
        assert_relative_eq!(rec.slope(12.0), 1.7, epsilon = 1e-12);
    }

    #[test]
    fn test_find_last_at() {
        let records = [0.0, 5.0, 10.0];

        assert_eq!(find_last_at(&records, 7.0, |r| *r), Some(&5.0));
        assert_eq!(find_last_at(&records, 10.0, |r| *r), Some(&10.0));
        assert_eq!(find_last_at(&records, -1.0, |r| *r), None);
    }
}
