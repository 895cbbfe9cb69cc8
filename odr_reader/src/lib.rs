//! # OpenDRIVE reader library
//!
//! Parses OpenDRIVE road networks and resolves road coordinates `(s, t)` to
//! global 3D poses, lane borders, lane widths and sampled road mark points.
//!
//! ```ignore
//! let reader = OdrReader::from_file("maps/town.xodr")?;
//! let pose = reader.get_pose("1", 25.0, -1.75)?;
//! let width = reader.get_lane_width("1", -1, 25.0)?;
//! ```

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

/// Map consistency and requirement checks
pub mod checks;

/// Errors of parsing and querying
pub mod error;

/// Plan view curve evaluation
pub mod geometry;

/// Lane borders, widths and heights
pub mod lane_geometry;

/// Typed road network model
pub mod network;

/// XML extraction of the road network
pub mod parser;

/// 3D poses and pose comparisons
pub mod pose;

/// Elevation, superelevation and shape profiles
pub mod profile;

/// Query interface over a parsed network
pub mod reader;

/// Road mark line patterns
pub mod road_mark;

/// Map statistics
pub mod statistics;

// ---------------------------------------------------------------------------
// REEXPORTS
// ---------------------------------------------------------------------------

pub use crate::checks::{MapCheck, MapCheckParams, TargetElement};
pub use crate::error::{OdrError, ParseError};
pub use crate::lane_geometry::Boundary;
pub use crate::network::RoadNetwork;
pub use crate::parser::parse_opendrive;
pub use crate::pose::{compare_poses, subtract_pose, Pose3d, PoseComparison};
pub use crate::reader::{
    LaneSectionLaneIds, MarkingPoint, MarkingSamplingParams, OdrReader, RoadQuery,
};
pub use crate::statistics::{MapStatistics, StatisticsParams};
