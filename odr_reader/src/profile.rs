//! # Road surface profiles
//!
//! Height and attitude of the road surface contributed by the elevation,
//! superelevation and lateral shape profiles.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use crate::network::{find_last_at, Road, ShapeRecord};
use util::maths::{lin_map, poly_deriv_val, poly_val};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Height and attitude of the road surface at one `(s, t)` position.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SurfaceSample {
    pub z: f64,
    pub pitch: f64,
    pub roll: f64,
}

/// Lateral shape height and its derivatives at one `(s, t)` position.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct ShapeSample {
    height: f64,
    dh_dt: f64,
    dh_ds: f64,
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Combine all surface profiles of the road at `(s, t)`.
///
/// Missing profiles contribute nothing.
pub fn road_surface(road: &Road, s: f64, t: f64) -> SurfaceSample {
    let mut sample = SurfaceSample::default();

    if let Some(elev) = find_last_at(&road.elevation, s, |r| r.s) {
        sample.z = elev.value(s);
        sample.pitch = elev.slope(s).atan();
    }

    if let Some(superelev) = find_last_at(&road.superelevation, s, |r| r.s) {
        let roll = superelev.value(s);

        sample.roll = roll;
        sample.z += roll.sin() * t;
        sample.pitch += (superelev.slope(s) * roll.cos() * t).atan();
    }

    if let Some(shape) = shape_at(&road.shape, s, t) {
        sample.z += shape.height;
        sample.roll += shape.dh_dt.atan();
        sample.pitch += shape.dh_ds.atan();
    }

    sample
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Interpolate the shape profile between the record groups bracketing `s`.
fn shape_at(records: &[ShapeRecord], s: f64, t: f64) -> Option<ShapeSample> {
    let s_curr = find_last_at(records, s, |r| r.s)?.s;
    let curr = group_value(records, s_curr, t)?;

    let s_next = match records.iter().find(|r| r.s > s_curr) {
        Some(r) => r.s,
        None => {
            return Some(ShapeSample {
                height: curr.0,
                dh_dt: curr.1,
                dh_ds: 0.0,
            })
        }
    };
    let next = group_value(records, s_next, t)?;

    Some(ShapeSample {
        height: lin_map((s_curr, s_next), (curr.0, next.0), s),
        dh_dt: lin_map((s_curr, s_next), (curr.1, next.1), s),
        dh_ds: (next.0 - curr.0) / (s_next - s_curr),
    })
}

/// Height and lateral slope of the group of records starting at `s`.
fn group_value(records: &[ShapeRecord], s: f64, t: f64) -> Option<(f64, f64)> {
    let group: Vec<&ShapeRecord> = records.iter().filter(|r| r.s == s).collect();

    let rec = group
        .iter()
        .rev()
        .find(|r| r.t <= t)
        .or_else(|| group.first())?;

    let coeffs = [rec.a, rec.b, rec.c, rec.d];
    let dt = t - rec.t;

    Some((poly_val(dt, &coeffs), poly_deriv_val(dt, &coeffs)))
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::network::Poly3Record;
    use approx::assert_relative_eq;

    fn poly(s: f64, a: f64, b: f64) -> Poly3Record {
        Poly3Record {
            s,
            a,
            b,
            c: 0.0,
            d: 0.0,
        }
    }

    fn shape(s: f64, t: f64, a: f64, b: f64) -> ShapeRecord {
        ShapeRecord {
            s,
            t,
            a,
            b,
            c: 0.0,
            d: 0.0,
        }
    }

    #[test]
    fn test_flat_road() {
        let road = Road::default();

        assert_eq!(road_surface(&road, 10.0, 2.0), SurfaceSample::default());
    }

    #[test]
    fn test_elevation() {
        let road = Road {
            elevation: vec![poly(0.0, 1.0, 0.1), poly(10.0, 2.0, 0.0)],
            ..Road::default()
        };

        let sample = road_surface(&road, 5.0, 0.0);
        assert_relative_eq!(sample.z, 1.5);
        assert_relative_eq!(sample.pitch, 0.1_f64.atan());

        let sample = road_surface(&road, 12.0, 0.0);
        assert_relative_eq!(sample.z, 2.0);
        assert_relative_eq!(sample.pitch, 0.0);
    }

    #[test]
    fn test_superelevation_tilts_laterally() {
        let road = Road {
            superelevation: vec![poly(0.0, 0.05, 0.0)],
            ..Road::default()
        };

        let sample = road_surface(&road, 5.0, 3.0);
        assert_relative_eq!(sample.roll, 0.05);
        assert_relative_eq!(sample.z, 0.05_f64.sin() * 3.0);
        assert_relative_eq!(sample.pitch, 0.0);
    }

    #[test]
    fn test_shape_interpolates_between_groups() {
        let road = Road {
            shape: vec![
                shape(0.0, -5.0, 0.0, 0.0),
                shape(0.0, 0.0, 0.0, 0.1),
                shape(10.0, -5.0, 1.0, 0.0),
                shape(10.0, 0.0, 1.0, 0.3),
            ],
            ..Road::default()
        };

        // Group at s = 0 gives 0.2, group at s = 10 gives 1.6
        let sample = road_surface(&road, 5.0, 2.0);
        assert_relative_eq!(sample.z, 0.9, epsilon = 1e-12);
        assert_relative_eq!(sample.roll, 0.2_f64.atan(), epsilon = 1e-12);
        assert_relative_eq!(sample.pitch, 0.14_f64.atan(), epsilon = 1e-12);

        // Left of every record the first record of the group is used
        let sample = road_surface(&road, 0.0, -8.0);
        assert_relative_eq!(sample.z, 0.0);
    }

    #[test]
    fn test_shape_after_last_group() {
        let road = Road {
            shape: vec![shape(0.0, 0.0, 0.5, 0.1)],
            ..Road::default()
        };

        let sample = road_surface(&road, 20.0, 1.0);
        assert_relative_eq!(sample.z, 0.6);
        assert_relative_eq!(sample.pitch, 0.0);
    }
}
