//! # 3D pose
//!
//! Position and attitude of a point on the road network, together with the
//! helpers used to check offsets between poses.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::{fmt, str::FromStr};

use nalgebra::{UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::error::OdrError;
use util::maths::get_ang_dist_pi;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A pose in the global frame of the road network.
///
/// Angles are in radians, wrapped into (-pi, pi].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose3d {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub heading: f64,
    pub pitch: f64,
    pub roll: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Operator applied component-wise by [`compare_poses`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoseComparison {
    Lt,
    Le,
    Eq,
    Ne,
    Ge,
    Gt,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Pose3d {
    pub fn position(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }

    pub fn attitude(&self) -> UnitQuaternion<f64> {
        UnitQuaternion::from_euler_angles(self.roll, self.pitch, self.heading)
    }

    /// Whether every component of the absolute difference to `other` is within
    /// the matching component of `threshold`.
    pub fn is_within(&self, other: &Pose3d, threshold: &Pose3d) -> bool {
        compare_poses(
            &subtract_pose(self, other, true),
            PoseComparison::Le,
            threshold,
        )
    }

    fn components(&self) -> [f64; 6] {
        [self.x, self.y, self.z, self.heading, self.pitch, self.roll]
    }
}

impl fmt::Display for Pose3d {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(x: {:.3}, y: {:.3}, z: {:.3}, heading: {:.4}, pitch: {:.4}, roll: {:.4})",
            self.x, self.y, self.z, self.heading, self.pitch, self.roll
        )
    }
}

impl PoseComparison {
    fn apply(&self, lhs: f64, rhs: f64) -> bool {
        match self {
            PoseComparison::Lt => lhs < rhs,
            PoseComparison::Le => lhs <= rhs,
            PoseComparison::Eq => lhs == rhs,
            PoseComparison::Ne => lhs != rhs,
            PoseComparison::Ge => lhs >= rhs,
            PoseComparison::Gt => lhs > rhs,
        }
    }
}

impl FromStr for PoseComparison {
    type Err = OdrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "<" => Ok(PoseComparison::Lt),
            "<=" => Ok(PoseComparison::Le),
            "==" => Ok(PoseComparison::Eq),
            "!=" => Ok(PoseComparison::Ne),
            ">=" => Ok(PoseComparison::Ge),
            ">" => Ok(PoseComparison::Gt),
            _ => Err(OdrError::UnknownOperator(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Component-wise difference `a - b`.
///
/// Angular components are the shortest signed distance, so poses either side
/// of the +/- pi seam are close together. With `abs` every component is made
/// non-negative.
pub fn subtract_pose(a: &Pose3d, b: &Pose3d, abs: bool) -> Pose3d {
    let diff = Pose3d {
        x: a.x - b.x,
        y: a.y - b.y,
        z: a.z - b.z,
        heading: get_ang_dist_pi(b.heading, a.heading),
        pitch: get_ang_dist_pi(b.pitch, a.pitch),
        roll: get_ang_dist_pi(b.roll, a.roll),
    };

    match abs {
        true => Pose3d {
            x: diff.x.abs(),
            y: diff.y.abs(),
            z: diff.z.abs(),
            heading: diff.heading.abs(),
            pitch: diff.pitch.abs(),
            roll: diff.roll.abs(),
        },
        false => diff,
    }
}

/// True if `a op b` holds for all six components.
pub fn compare_poses(a: &Pose3d, op: PoseComparison, b: &Pose3d) -> bool {
    a.components()
        .iter()
        .zip(b.components().iter())
        .all(|(l, r)| op.apply(*l, *r))
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn pose(x: f64, heading: f64) -> Pose3d {
        Pose3d {
            x,
            heading,
            ..Pose3d::default()
        }
    }

    #[test]
    fn test_subtract_pose() {
        let diff = subtract_pose(&pose(1.0, 0.2), &pose(3.0, 0.5), false);
        assert_relative_eq!(diff.x, -2.0);
        assert_relative_eq!(diff.heading, -0.3, epsilon = 1e-12);

        let diff = subtract_pose(&pose(1.0, 0.2), &pose(3.0, 0.5), true);
        assert_relative_eq!(diff.x, 2.0);
        assert_relative_eq!(diff.heading, 0.3, epsilon = 1e-12);

        // Across the seam
        let diff = subtract_pose(&pose(0.0, PI - 0.1), &pose(0.0, -PI + 0.1), true);
        assert_relative_eq!(diff.heading, 0.2, epsilon = 1e-12);
    }

    #[test]
    fn test_compare_poses() {
        let small = pose(0.1, 0.01);
        let threshold = pose(0.5, 0.05);

        assert!(compare_poses(&small, PoseComparison::Le, &threshold));
        assert!(compare_poses(&small, PoseComparison::Ne, &pose(0.2, 0.02)) == false);
        assert!(compare_poses(&small, PoseComparison::Eq, &small));
        assert!(compare_poses(&threshold, PoseComparison::Gt, &small) == false);
        assert!(compare_poses(&pose(1.0, 0.1), PoseComparison::Ge, &small));
    }

    #[test]
    fn test_is_within() {
        let threshold = Pose3d {
            x: 0.01,
            y: 0.01,
            z: 0.01,
            heading: 0.01,
            pitch: 0.01,
            roll: 0.01,
        };

        assert!(pose(1.0, 0.5).is_within(&pose(1.005, 0.495), &threshold));
        assert!(pose(1.0, 0.5).is_within(&pose(1.1, 0.5), &threshold) == false);
    }

    #[test]
    fn test_parse_comparison() {
        assert_eq!("<=".parse::<PoseComparison>(), Ok(PoseComparison::Le));
        assert_eq!(" > ".parse::<PoseComparison>(), Ok(PoseComparison::Gt));
        assert_eq!(
            "=<".parse::<PoseComparison>(),
            Err(OdrError::UnknownOperator("=<".into()))
        );
    }

    #[test]
    fn test_attitude() {
        let p = pose(2.0, PI / 2.0);
        let fwd = p.attitude() * Vector3::x();

        assert_relative_eq!(fwd[0], 0.0, epsilon = 1e-12);
        assert_relative_eq!(fwd[1], 1.0, epsilon = 1e-12);
        assert_relative_eq!(p.position()[0], 2.0);
    }
}
