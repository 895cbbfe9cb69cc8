//! Junctions and their connections

use serde::Serialize;

use super::ContactPoint;

/// A junction, binding incoming roads to connecting roads.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Junction {
    pub id: String,
    pub name: Option<String>,
    pub junction_type: Option<String>,
    pub connections: Vec<Connection>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Connection {
    pub id: String,
    pub incoming_road: Option<String>,
    pub connecting_road: Option<String>,
    pub contact_point: Option<ContactPoint>,
    pub lane_links: Vec<LaneLinkPair>,
}

/// Links lane `from` of the incoming road to lane `to` of the connecting road.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LaneLinkPair {
    pub from: i32,
    pub to: i32,
}
