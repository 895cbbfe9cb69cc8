//! Errors raised while reading or querying a road network

use thiserror::Error;

/// Errors raised while building the road network from XML.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Cannot parse the XML document: {0}")]
    XmlError(roxmltree::Error),

    #[error("The root element must be <OpenDRIVE>, found <{0}>")]
    InvalidRoot(String),

    #[error("Element <{0}> is missing")]
    MissingElement(&'static str),

    #[error("Element <{element}> is missing the attribute {attribute:?}")]
    MissingAttribute {
        element: String,
        attribute: &'static str,
    },

    #[error("Attribute {attribute:?} of <{element}> has the invalid value {value:?}")]
    InvalidAttribute {
        element: String,
        attribute: &'static str,
        value: String,
    },

    #[error("Cannot read the OpenDRIVE file: {0}")]
    FileError(std::io::Error),
}

/// Errors raised by road network queries.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum OdrError {
    #[error("The road network has no road with ID {0:?}")]
    UnknownRoad(String),

    #[error("Road {road:?} is not defined at s = {s} (length {length})")]
    SOutOfRange { road: String, s: f64, length: f64 },

    #[error("Road {road:?} uses the unsupported geometry {kind} at s = {s}")]
    UnsupportedGeometry {
        road: String,
        s: f64,
        kind: &'static str,
    },

    #[error("Road {road:?} has no plan view geometry at s = {s}")]
    NoGeometry { road: String, s: f64 },

    #[error("Road {road:?} has no lane section at s = {s}")]
    NoLaneSection { road: String, s: f64 },

    #[error("Road {road:?} has no lane {lane} at s = {s}")]
    UnknownLane { road: String, lane: i32, s: f64 },

    #[error("The road network has no object with ID {0:?}")]
    UnknownObject(String),

    #[error("The sampling step must be positive, found {0}")]
    InvalidStep(f64),

    #[error("The start {start} of the sampled range lies after its end {end}")]
    InvalidRange { start: f64, end: f64 },

    #[error("Unknown pose comparison operator {0:?}")]
    UnknownOperator(String),
}
