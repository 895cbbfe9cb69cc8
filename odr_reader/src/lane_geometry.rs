//! # Lane geometry
//!
//! Lateral layout of the lanes of a lane section. Lane borders are found by
//! accumulating lane widths outward from the centre lane, shifted by the road's
//! lane offset.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use crate::network::{find_last_at, Lane, LaneSection, Road};
use util::maths::lin_map;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Which border of a lane to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    /// The border further from the centre lane
    Outer,

    /// The border shared with the next lane towards the centre
    Inner,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Boundary {
    fn default() -> Self {
        Boundary::Outer
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// The lane section in effect at `s`.
pub fn lane_section_at(road: &Road, s: f64) -> Option<&LaneSection> {
    find_last_at(&road.lane_sections, s, |ls| ls.s)
}

/// Lateral shift of the centre lane at `s`.
pub fn lane_offset(road: &Road, s: f64) -> f64 {
    find_last_at(&road.lane_offsets, s, |r| r.s)
        .map(|r| r.value(s))
        .unwrap_or(0.0)
}

/// Width of the lane at `ds` metres after the start of its section.
///
/// Lanes without width records are zero wide.
pub fn lane_width(lane: &Lane, ds: f64) -> f64 {
    find_last_at(&lane.width, ds, |r| r.s)
        .map(|r| r.value(ds))
        .unwrap_or(0.0)
}

/// Lateral position of a lane border, or `None` if the section has no such
/// lane.
///
/// `ds` is measured from the start of the section and `offset` is the lane
/// offset at the query position.
pub fn boundary_t(
    section: &LaneSection,
    lane_id: i32,
    ds: f64,
    offset: f64,
    boundary: Boundary,
) -> Option<f64> {
    section.lane(lane_id)?;

    if lane_id == 0 {
        return Some(offset);
    }

    let last = match boundary {
        Boundary::Outer => lane_id.abs(),
        Boundary::Inner => lane_id.abs() - 1,
    };

    let total: f64 = (1..=last)
        .filter_map(|k| section.lane(k * lane_id.signum()))
        .map(|l| lane_width(l, ds))
        .sum();

    Some(offset + lane_id.signum() as f64 * total)
}

/// Height of the lane surface above the road at lateral position `t`.
///
/// The height is interpolated between the inner and outer height records of
/// the lane containing `t`, zero if that lane carries no height record.
pub fn lane_height(section: &LaneSection, ds: f64, offset: f64, t: f64) -> f64 {
    let dist = (t - offset).abs();
    let side = match t - offset {
        d if d < 0.0 => -1,
        _ => 1,
    };

    let mut inner = 0.0;
    let mut k = 1;

    while let Some(lane) = section.lane(side * k) {
        let outer = inner + lane_width(lane, ds);

        if dist > inner && dist <= outer {
            return find_last_at(&lane.height, ds, |h| h.s_offset)
                .map(|h| lin_map((inner, outer), (h.inner, h.outer), dist))
                .unwrap_or(0.0);
        }

        inner = outer;
        k += 1;
    }

    0.0
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::network::{LaneHeight, Poly3Record};
    use approx::assert_relative_eq;

    fn lane(id: i32, width: f64) -> Lane {
        Lane {
            id,
            lane_type: "driving".into(),
            width: vec![Poly3Record {
                s: 0.0,
                a: width,
                b: 0.0,
                c: 0.0,
                d: 0.0,
            }],
            ..Lane::default()
        }
    }

    fn section() -> LaneSection {
        LaneSection {
            s: 0.0,
            left: vec![lane(2, 2.0), lane(1, 3.5)],
            center: vec![lane(0, 0.0)],
            right: vec![lane(-1, 3.0), lane(-2, 1.5)],
            ..LaneSection::default()
        }
    }

    #[test]
    fn test_lane_width() {
        let mut l = lane(-1, 3.0);
        assert_relative_eq!(lane_width(&l, 0.0), 3.0);
        assert_relative_eq!(lane_width(&l, 80.0), 3.0);

        l.width.clear();
        assert_relative_eq!(lane_width(&l, 10.0), 0.0);
    }

    #[test]
    fn test_boundary_t() {
        let sec = section();

        assert_eq!(boundary_t(&sec, 0, 0.0, 0.5, Boundary::Outer), Some(0.5));
        assert_eq!(boundary_t(&sec, -1, 0.0, 0.0, Boundary::Outer), Some(-3.0));
        assert_eq!(boundary_t(&sec, -1, 0.0, 0.0, Boundary::Inner), Some(0.0));
        assert_eq!(boundary_t(&sec, -2, 0.0, 0.0, Boundary::Outer), Some(-4.5));
        assert_eq!(boundary_t(&sec, 2, 0.0, 1.0, Boundary::Outer), Some(6.5));
        assert_eq!(boundary_t(&sec, 2, 0.0, 1.0, Boundary::Inner), Some(4.5));
        assert_eq!(boundary_t(&sec, -3, 0.0, 0.0, Boundary::Outer), None);
    }

    #[test]
    fn test_lane_offset() {
        let road = Road {
            lane_offsets: vec![Poly3Record {
                s: 10.0,
                a: 0.5,
                b: 0.1,
                c: 0.0,
                d: 0.0,
            }],
            ..Road::default()
        };

        assert_relative_eq!(lane_offset(&road, 5.0), 0.0);
        assert_relative_eq!(lane_offset(&road, 15.0), 1.0);
    }

    #[test]
    fn test_lane_height() {
        let mut sec = section();
        sec.right[0].height.push(LaneHeight {
            s_offset: 0.0,
            inner: 0.0,
            outer: 0.3,
        });

        assert_relative_eq!(lane_height(&sec, 0.0, 0.0, -1.5), 0.15);
        assert_relative_eq!(lane_height(&sec, 0.0, 0.0, -3.0), 0.3);
        assert_relative_eq!(lane_height(&sec, 0.0, 0.0, -4.0), 0.0);
        assert_relative_eq!(lane_height(&sec, 0.0, 0.0, 1.0), 0.0);
        assert_relative_eq!(lane_height(&sec, 0.0, 0.0, -10.0), 0.0);
    }
}
