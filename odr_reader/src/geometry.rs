//! # Plan view geometry
//!
//! Evaluates the reference line of a road. Every curve family is first solved
//! in the segment's local `(u, v)` frame, with `u` pointing along the start
//! heading, and then rotated and translated to the segment's global anchor.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use crate::network::{Geometry, GeometryShape, PRange, ParamPoly3};
use util::maths::{poly_deriv_val, poly_val};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Curvatures (and curvature rates) below this are treated as zero.
const CURV_EPSILON: f64 = 1e-12;

/// Magnitude below which a Fresnel series term ends the summation.
const FRESNEL_TERM_EPSILON: f64 = 1e-6;

const FRESNEL_MAX_ITERATIONS: usize = 50;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A point on the reference line in global coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanViewPoint {
    pub x: f64,
    pub y: f64,
    pub hdg: f64,
}

/// A point in the local frame of a segment.
#[derive(Debug, Clone, Copy, PartialEq)]
struct LocalPoint {
    u: f64,
    v: f64,

    /// Heading relative to the segment's start heading
    dhdg: f64,

    /// Additional rotation of the local frame
    rotation: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PlanViewPoint {
    /// Move the point by `t` perpendicular to its heading, positive to the left.
    pub fn offset_lateral(&self, t: f64) -> Self {
        Self {
            x: self.x - t * self.hdg.sin(),
            y: self.y + t * self.hdg.cos(),
            hdg: self.hdg,
        }
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Evaluate the segment at road position `s`.
///
/// Returns `None` for `poly3` segments, which are not supported.
pub fn eval_geometry(geom: &Geometry, s: f64) -> Option<PlanViewPoint> {
    let p = s - geom.s;

    let local = match geom.shape {
        GeometryShape::Line => line(p),
        GeometryShape::Arc { curvature } => arc(curvature, p),
        GeometryShape::Spiral {
            curv_start,
            curv_end,
        } => spiral(curv_start, curv_end, geom.length, p),
        GeometryShape::ParamPoly3(ref pp3) => param_poly3(pp3, geom.length, p),
        GeometryShape::Poly3 { .. } => return None,
    };

    let phi = geom.hdg + local.rotation;

    Some(PlanViewPoint {
        x: geom.x + local.u * phi.cos() - local.v * phi.sin(),
        y: geom.y + local.u * phi.sin() + local.v * phi.cos(),
        hdg: geom.hdg + local.dhdg,
    })
}

/// Position on a clothoid with curvature `2 * a * sigma`, measured from its
/// zero curvature point.
///
/// Sums the Taylor series of `integral(exp(i * a * x^2), 0, sigma)`.
pub fn fresnel(a: f64, sigma: f64) -> (f64, f64) {
    let z = a * sigma * sigma;

    let mut x = 0.0;
    let mut y = 0.0;

    // z^k / k!
    let mut power = 1.0;

    for k in 0..FRESNEL_MAX_ITERATIONS {
        let term = power * sigma / (2 * k + 1) as f64;

        // i^k cycles through 1, i, -1, -i
        match k % 4 {
            0 => x += term,
            1 => y += term,
            2 => x -= term,
            _ => y -= term,
        }

        if term.abs() < FRESNEL_TERM_EPSILON {
            break;
        }

        power *= z / (k + 1) as f64;
    }

    (x, y)
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn line(p: f64) -> LocalPoint {
    LocalPoint {
        u: p,
        v: 0.0,
        dhdg: 0.0,
        rotation: 0.0,
    }
}

fn arc(k: f64, p: f64) -> LocalPoint {
    if k.abs() < CURV_EPSILON {
        return line(p);
    }

    LocalPoint {
        u: (k * p).sin() / k,
        v: (1.0 - (k * p).cos()) / k,
        dhdg: k * p,
        rotation: 0.0,
    }
}

fn spiral(curv_start: f64, curv_end: f64, length: f64, p: f64) -> LocalPoint {
    let curv_rate = match length > 0.0 {
        true => (curv_end - curv_start) / length,
        false => 0.0,
    };

    if curv_rate.abs() < CURV_EPSILON {
        return arc(curv_start, p);
    }

    let a = curv_rate / 2.0;

    // Arc length from the zero curvature point to the segment start
    let sigma_0 = curv_start / curv_rate;

    let (x_0, y_0) = fresnel(a, sigma_0);
    let (x_1, y_1) = fresnel(a, sigma_0 + p);
    let hdg_0 = a * sigma_0 * sigma_0;

    let (dx, dy) = (x_1 - x_0, y_1 - y_0);

    LocalPoint {
        u: dx * hdg_0.cos() + dy * hdg_0.sin(),
        v: -dx * hdg_0.sin() + dy * hdg_0.cos(),
        dhdg: curv_start * p + a * p * p,
        rotation: 0.0,
    }
}

fn param_poly3(pp3: &ParamPoly3, length: f64, p: f64) -> LocalPoint {
    let p = match pp3.p_range {
        PRange::ArcLength => p,
        PRange::Normalized if length > 0.0 => p / length,
        PRange::Normalized => 0.0,
    };

    let u_coeffs = [pp3.a_u, pp3.b_u, pp3.c_u, pp3.d_u];
    let v_coeffs = [pp3.a_v, pp3.b_v, pp3.c_v, pp3.d_v];

    LocalPoint {
        u: poly_val(p, &u_coeffs),
        v: poly_val(p, &v_coeffs),
        dhdg: poly_deriv_val(p, &v_coeffs).atan2(poly_deriv_val(p, &u_coeffs)),
        rotation: pp3.b_v.atan2(pp3.b_u),
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    fn geometry(shape: GeometryShape, length: f64) -> Geometry {
        Geometry {
            s: 0.0,
            x: 0.0,
            y: 0.0,
            hdg: 0.0,
            length,
            shape,
        }
    }

    /// Midpoint integration of the heading of a segment.
    fn integrate(geom: &Geometry, p_end: f64) -> (f64, f64) {
        let steps = 20_000;
        let dp = p_end / steps as f64;
        let (mut x, mut y) = (geom.x, geom.y);

        for i in 0..steps {
            let hdg = eval_geometry(geom, geom.s + (i as f64 + 0.5) * dp).unwrap().hdg;
            x += dp * hdg.cos();
            y += dp * hdg.sin();
        }

        (x, y)
    }

    #[test]
    fn test_line() {
        let geom = geometry(GeometryShape::Line, 100.0);
        let pt = eval_geometry(&geom, 50.0).unwrap();

        assert_relative_eq!(pt.x, 50.0);
        assert_relative_eq!(pt.y, 0.0);
        assert_relative_eq!(pt.hdg, 0.0);
    }

    #[test]
    fn test_arc() {
        let geom = geometry(GeometryShape::Arc { curvature: 0.01 }, 100.0);
        let pt = eval_geometry(&geom, 50.0).unwrap();

        assert_relative_eq!(pt.hdg, 0.5, epsilon = 1e-12);
        assert_relative_eq!(pt.x, 100.0 * 0.5_f64.sin(), epsilon = 1e-9);
        assert_relative_eq!(pt.y, 100.0 * (1.0 - 0.5_f64.cos()), epsilon = 1e-9);
    }

    #[test]
    fn test_spiral_matches_integrated_heading() {
        for (curv_start, curv_end) in [(0.0, 0.02), (0.01, 0.03), (0.02, -0.01)].iter() {
            let geom = Geometry {
                s: 10.0,
                x: 5.0,
                y: -3.0,
                hdg: 0.3,
                length: 50.0,
                shape: GeometryShape::Spiral {
                    curv_start: *curv_start,
                    curv_end: *curv_end,
                },
            };

            let pt = eval_geometry(&geom, 60.0).unwrap();
            let (x, y) = integrate(&geom, 50.0);

            assert_relative_eq!(pt.x, x, epsilon = 1e-3);
            assert_relative_eq!(pt.y, y, epsilon = 1e-3);
            assert_relative_eq!(
                pt.hdg,
                0.3 + curv_start * 50.0 + (curv_end - curv_start) / 100.0 * 2500.0,
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn test_spiral_starts_at_anchor() {
        let geom = Geometry {
            s: 0.0,
            x: 1.0,
            y: 2.0,
            hdg: 1.0,
            length: 30.0,
            shape: GeometryShape::Spiral {
                curv_start: 0.05,
                curv_end: 0.01,
            },
        };
        let pt = eval_geometry(&geom, 0.0).unwrap();

        assert_relative_eq!(pt.x, 1.0, epsilon = 1e-9);
        assert_relative_eq!(pt.y, 2.0, epsilon = 1e-9);
        assert_relative_eq!(pt.hdg, 1.0);
    }

    #[test]
    fn test_param_poly3() {
        // A straight line written as a parametric cubic
        let pp3 = ParamPoly3 {
            a_u: 0.0,
            b_u: 1.0,
            c_u: 0.0,
            d_u: 0.0,
            a_v: 0.0,
            b_v: 0.0,
            c_v: 0.0,
            d_v: 0.0,
            p_range: PRange::ArcLength,
        };
        let pt = eval_geometry(&geometry(GeometryShape::ParamPoly3(pp3), 10.0), 4.0).unwrap();
        assert_relative_eq!(pt.x, 4.0);
        assert_relative_eq!(pt.hdg, 0.0);

        // Normalised range over a 10 m segment
        let normalized = ParamPoly3 {
            b_u: 10.0,
            c_v: 2.0,
            p_range: PRange::Normalized,
            ..pp3
        };
        let pt = eval_geometry(&geometry(GeometryShape::ParamPoly3(normalized), 10.0), 5.0)
            .unwrap();
        assert_relative_eq!(pt.x, 5.0);
        assert_relative_eq!(pt.y, 0.5);
        assert_relative_eq!(pt.hdg, 2.0_f64.atan2(10.0));
    }

    #[test]
    fn test_poly3_unsupported() {
        let geom = geometry(
            GeometryShape::Poly3 {
                a: 0.0,
                b: 0.0,
                c: 0.0,
                d: 0.0,
            },
            10.0,
        );

        assert_eq!(eval_geometry(&geom, 1.0), None);
    }

    #[test]
    fn test_offset_lateral() {
        let pt = PlanViewPoint {
            x: 1.0,
            y: 1.0,
            hdg: std::f64::consts::FRAC_PI_2,
        }
        .offset_lateral(2.0);

        assert_relative_eq!(pt.x, -1.0, epsilon = 1e-12);
        assert_relative_eq!(pt.y, 1.0, epsilon = 1e-12);
    }
}
