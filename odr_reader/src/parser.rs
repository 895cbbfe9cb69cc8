//! # OpenDRIVE parser
//!
//! Builds the typed [`RoadNetwork`] from the XML text of an `.xodr` file.
//! Only the elements needed for geometric queries and map statistics are
//! extracted, everything else is ignored.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{debug, info};
use roxmltree::{Document, Node};
use std::cmp::Ordering;
use std::str::FromStr;

use crate::error::ParseError;
use crate::network::{
    Connection, ContactPoint, ElementType, Geometry, GeometryShape, Header, Junction, Lane,
    LaneHeight, LaneLink, LaneLinkPair, LaneMaterial, LaneSection, LinkElement, Offset, PRange,
    ParamPoly3, Poly3Record, Road, RoadLink, RoadMark, RoadMarkLine, RoadMarkType, RoadNetwork,
    RoadObject, RoadSignal, RoadStructure, RoadType, ShapeRecord,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

const ROOT_ELEMENT: &str = "OpenDRIVE";

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Parse the contents of an OpenDRIVE file.
pub fn parse_opendrive(xodr: &str) -> Result<RoadNetwork, ParseError> {
    let doc = match Document::parse(xodr) {
        Ok(d) => d,
        Err(e) => return Err(ParseError::XmlError(e)),
    };

    let root = doc.root_element();
    if root.tag_name().name() != ROOT_ELEMENT {
        return Err(ParseError::InvalidRoot(root.tag_name().name().to_string()));
    }

    let header = match child(root, "header") {
        Some(h) => parse_header(h)?,
        None => return Err(ParseError::MissingElement("header")),
    };

    let roads = children(root, "road")
        .map(parse_road)
        .collect::<Result<Vec<_>, _>>()?;

    let junctions = children(root, "junction")
        .map(parse_junction)
        .collect::<Result<Vec<_>, _>>()?;

    info!(
        "Parsed OpenDRIVE {}.{} network with {} roads and {} junctions",
        header.rev_major,
        header.rev_minor,
        roads.len(),
        junctions.len()
    );

    Ok(RoadNetwork {
        header,
        roads,
        junctions,
    })
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn parse_header(node: Node) -> Result<Header, ParseError> {
    let offset = match child(node, "offset") {
        Some(o) => Some(Offset {
            x: attr_or(o, "x", 0.0)?,
            y: attr_or(o, "y", 0.0)?,
            z: attr_or(o, "z", 0.0)?,
            hdg: attr_or(o, "hdg", 0.0)?,
        }),
        None => None,
    };

    Ok(Header {
        rev_major: attr_or(node, "revMajor", 1)?,
        rev_minor: attr_or(node, "revMinor", 6)?,
        name: opt_string(node, "name"),
        version: opt_string(node, "version"),
        date: opt_string(node, "date"),
        north: opt_attr(node, "north")?,
        south: opt_attr(node, "south")?,
        east: opt_attr(node, "east")?,
        west: opt_attr(node, "west")?,
        vendor: opt_string(node, "vendor"),
        geo_reference: child(node, "geoReference")
            .and_then(|g| g.text())
            .map(|t| t.trim().to_string()),
        offset,
    })
}

fn parse_road(node: Node) -> Result<Road, ParseError> {
    let id = string(node, "id")?;

    let link = match child(node, "link") {
        Some(l) => Some(RoadLink {
            predecessor: child(l, "predecessor").map(parse_link_element).transpose()?,
            successor: child(l, "successor").map(parse_link_element).transpose()?,
        }),
        None => None,
    };

    let road_types = children(node, "type")
        .map(|t| -> Result<RoadType, ParseError> {
            Ok(RoadType {
                s: attr(t, "s")?,
                road_type: string(t, "type")?,
                country: opt_string(t, "country"),
            })
        })
        .collect::<Result<Vec<_>, ParseError>>()?;

    let mut plan_view = match child(node, "planView") {
        Some(p) => children(p, "geometry")
            .map(parse_geometry)
            .collect::<Result<Vec<_>, _>>()?,
        None => return Err(ParseError::MissingElement("planView")),
    };
    sort_by_key(&mut plan_view, |g| g.s);

    let mut elevation = match child(node, "elevationProfile") {
        Some(e) => children(e, "elevation")
            .map(|p| parse_poly3(p, "s"))
            .collect::<Result<Vec<_>, _>>()?,
        None => Vec::new(),
    };
    sort_by_key(&mut elevation, |e| e.s);

    let (mut superelevation, mut shape) = match child(node, "lateralProfile") {
        Some(l) => (
            children(l, "superelevation")
                .map(|p| parse_poly3(p, "s"))
                .collect::<Result<Vec<_>, _>>()?,
            children(l, "shape")
                .map(parse_shape)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        None => (Vec::new(), Vec::new()),
    };
    sort_by_key(&mut superelevation, |e| e.s);
    shape.sort_by(|a, b| cmp_f64(a.s, b.s).then(cmp_f64(a.t, b.t)));

    let (mut lane_offsets, mut lane_sections) = match child(node, "lanes") {
        Some(l) => (
            children(l, "laneOffset")
                .map(|p| parse_poly3(p, "s"))
                .collect::<Result<Vec<_>, _>>()?,
            children(l, "laneSection")
                .map(parse_lane_section)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        None => (Vec::new(), Vec::new()),
    };
    sort_by_key(&mut lane_offsets, |o| o.s);
    sort_by_key(&mut lane_sections, |l| l.s);

    let (objects, bridges, tunnels) = match child(node, "objects") {
        Some(o) => (
            children(o, "object")
                .map(parse_object)
                .collect::<Result<Vec<_>, _>>()?,
            children(o, "bridge")
                .map(parse_structure)
                .collect::<Result<Vec<_>, _>>()?,
            children(o, "tunnel")
                .map(parse_structure)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        None => (Vec::new(), Vec::new(), Vec::new()),
    };

    let signals = match child(node, "signals") {
        Some(s) => children(s, "signal")
            .map(parse_signal)
            .collect::<Result<Vec<_>, _>>()?,
        None => Vec::new(),
    };

    debug!(
        "Parsed road {:?} with {} geometries and {} lane sections",
        id,
        plan_view.len(),
        lane_sections.len()
    );

    Ok(Road {
        id,
        name: opt_string(node, "name"),
        length: attr(node, "length")?,
        junction: opt_string(node, "junction").unwrap_or_else(|| "-1".into()),
        rule: opt_string(node, "rule"),
        link,
        road_types,
        plan_view,
        elevation,
        superelevation,
        shape,
        lane_offsets,
        lane_sections,
        objects,
        bridges,
        tunnels,
        signals,
    })
}

fn parse_link_element(node: Node) -> Result<LinkElement, ParseError> {
    let element_type = match node.attribute("elementType") {
        Some("road") | None => ElementType::Road,
        Some("junction") => ElementType::Junction,
        Some(other) => return Err(invalid(node, "elementType", other)),
    };

    Ok(LinkElement {
        element_type,
        element_id: string(node, "elementId")?,
        contact_point: parse_contact_point(node)?,
    })
}

fn parse_contact_point(node: Node) -> Result<Option<ContactPoint>, ParseError> {
    match node.attribute("contactPoint") {
        Some("start") => Ok(Some(ContactPoint::Start)),
        Some("end") => Ok(Some(ContactPoint::End)),
        Some(other) => Err(invalid(node, "contactPoint", other)),
        None => Ok(None),
    }
}

fn parse_geometry(node: Node) -> Result<Geometry, ParseError> {
    let shape_node = match node.children().find(|c| c.is_element()) {
        Some(s) => s,
        None => return Err(ParseError::MissingElement("line|arc|spiral|poly3|paramPoly3")),
    };

    let shape = match shape_node.tag_name().name() {
        "line" => GeometryShape::Line,
        "arc" => GeometryShape::Arc {
            curvature: attr(shape_node, "curvature")?,
        },
        "spiral" => GeometryShape::Spiral {
            curv_start: attr(shape_node, "curvStart")?,
            curv_end: attr(shape_node, "curvEnd")?,
        },
        "poly3" => GeometryShape::Poly3 {
            a: attr(shape_node, "a")?,
            b: attr(shape_node, "b")?,
            c: attr(shape_node, "c")?,
            d: attr(shape_node, "d")?,
        },
        "paramPoly3" => GeometryShape::ParamPoly3(ParamPoly3 {
            a_u: attr(shape_node, "aU")?,
            b_u: attr(shape_node, "bU")?,
            c_u: attr(shape_node, "cU")?,
            d_u: attr(shape_node, "dU")?,
            a_v: attr(shape_node, "aV")?,
            b_v: attr(shape_node, "bV")?,
            c_v: attr(shape_node, "cV")?,
            d_v: attr(shape_node, "dV")?,
            p_range: match shape_node.attribute("pRange") {
                Some("normalized") => PRange::Normalized,
                Some("arcLength") | None => PRange::ArcLength,
                Some(other) => return Err(invalid(shape_node, "pRange", other)),
            },
        }),
        _ => return Err(ParseError::MissingElement("line|arc|spiral|poly3|paramPoly3")),
    };

    Ok(Geometry {
        s: attr(node, "s")?,
        x: attr(node, "x")?,
        y: attr(node, "y")?,
        hdg: attr(node, "hdg")?,
        length: attr(node, "length")?,
        shape,
    })
}

/// Parse a cubic polynomial record whose start is stored in `key`.
fn parse_poly3(node: Node, key: &'static str) -> Result<Poly3Record, ParseError> {
    Ok(Poly3Record {
        s: attr(node, key)?,
        a: attr(node, "a")?,
        b: attr(node, "b")?,
        c: attr(node, "c")?,
        d: attr(node, "d")?,
    })
}

fn parse_shape(node: Node) -> Result<ShapeRecord, ParseError> {
    Ok(ShapeRecord {
        s: attr(node, "s")?,
        t: attr(node, "t")?,
        a: attr(node, "a")?,
        b: attr(node, "b")?,
        c: attr(node, "c")?,
        d: attr(node, "d")?,
    })
}

fn parse_lane_section(node: Node) -> Result<LaneSection, ParseError> {
    let side = |name: &'static str| -> Result<Vec<Lane>, ParseError> {
        match child(node, name) {
            Some(group) => children(group, "lane").map(parse_lane).collect(),
            None => Ok(Vec::new()),
        }
    };

    Ok(LaneSection {
        s: attr(node, "s")?,
        single_side: opt_bool(node, "singleSide")?,
        left: side("left")?,
        center: side("center")?,
        right: side("right")?,
    })
}

fn parse_lane(node: Node) -> Result<Lane, ParseError> {
    let link = match child(node, "link") {
        Some(l) => Some(LaneLink {
            predecessor: children(l, "predecessor")
                .map(|p| attr(p, "id"))
                .collect::<Result<Vec<_>, _>>()?,
            successor: children(l, "successor")
                .map(|p| attr(p, "id"))
                .collect::<Result<Vec<_>, _>>()?,
        }),
        None => None,
    };

    let mut width = children(node, "width")
        .map(|w| parse_poly3(w, "sOffset"))
        .collect::<Result<Vec<_>, _>>()?;
    sort_by_key(&mut width, |w| w.s);

    let mut height = children(node, "height")
        .map(|h| -> Result<LaneHeight, ParseError> {
            Ok(LaneHeight {
                s_offset: attr(h, "sOffset")?,
                inner: attr_or(h, "inner", 0.0)?,
                outer: attr_or(h, "outer", 0.0)?,
            })
        })
        .collect::<Result<Vec<_>, ParseError>>()?;
    sort_by_key(&mut height, |h| h.s_offset);

    let mut road_marks = children(node, "roadMark")
        .map(parse_road_mark)
        .collect::<Result<Vec<_>, _>>()?;
    sort_by_key(&mut road_marks, |m| m.s_offset);

    let mut materials = children(node, "material")
        .map(|m| -> Result<LaneMaterial, ParseError> {
            Ok(LaneMaterial {
                s_offset: attr(m, "sOffset")?,
                surface: opt_string(m, "surface"),
                friction: attr(m, "friction")?,
                roughness: opt_attr(m, "roughness")?,
            })
        })
        .collect::<Result<Vec<_>, ParseError>>()?;
    sort_by_key(&mut materials, |m| m.s_offset);

    Ok(Lane {
        id: attr(node, "id")?,
        lane_type: string(node, "type")?,
        level: opt_bool(node, "level")?,
        link,
        width,
        height,
        road_marks,
        materials,
    })
}

fn parse_road_mark(node: Node) -> Result<RoadMark, ParseError> {
    let type_def = match child(node, "type") {
        Some(t) => {
            let mut lines = children(t, "line")
                .map(|l| -> Result<RoadMarkLine, ParseError> {
                    Ok(RoadMarkLine {
                        length: attr(l, "length")?,
                        space: attr(l, "space")?,
                        t_offset: attr_or(l, "tOffset", 0.0)?,
                        s_offset: attr_or(l, "sOffset", 0.0)?,
                        rule: opt_string(l, "rule"),
                        width: opt_attr(l, "width")?,
                        color: opt_string(l, "color"),
                    })
                })
                .collect::<Result<Vec<_>, ParseError>>()?;
            sort_by_key(&mut lines, |l| l.s_offset);

            Some(RoadMarkType {
                name: opt_string(t, "name").unwrap_or_default(),
                width: attr_or(t, "width", 0.0)?,
                lines,
            })
        }
        None => None,
    };

    Ok(RoadMark {
        s_offset: attr(node, "sOffset")?,
        mark_type: string(node, "type")?,
        weight: opt_string(node, "weight"),
        color: opt_string(node, "color").unwrap_or_else(|| "standard".into()),
        material: opt_string(node, "material"),
        width: opt_attr(node, "width")?,
        lane_change: opt_string(node, "laneChange"),
        height: opt_attr(node, "height")?,
        type_def,
    })
}

fn parse_object(node: Node) -> Result<RoadObject, ParseError> {
    Ok(RoadObject {
        id: string(node, "id")?,
        name: opt_string(node, "name"),
        object_type: opt_string(node, "type"),
        subtype: opt_string(node, "subtype"),
        s: attr(node, "s")?,
        t: attr(node, "t")?,
        z_offset: attr_or(node, "zOffset", 0.0)?,
        hdg: opt_attr(node, "hdg")?,
        pitch: opt_attr(node, "pitch")?,
        roll: opt_attr(node, "roll")?,
        orientation: opt_string(node, "orientation"),
        length: opt_attr(node, "length")?,
        width: opt_attr(node, "width")?,
        height: opt_attr(node, "height")?,
        radius: opt_attr(node, "radius")?,
    })
}

fn parse_structure(node: Node) -> Result<RoadStructure, ParseError> {
    Ok(RoadStructure {
        id: string(node, "id")?,
        name: opt_string(node, "name"),
        s: attr(node, "s")?,
        length: attr(node, "length")?,
        structure_type: string(node, "type")?,
    })
}

fn parse_signal(node: Node) -> Result<RoadSignal, ParseError> {
    Ok(RoadSignal {
        id: string(node, "id")?,
        name: opt_string(node, "name"),
        s: attr(node, "s")?,
        t: attr(node, "t")?,
        z_offset: attr_or(node, "zOffset", 0.0)?,
        h_offset: opt_attr(node, "hOffset")?,
        dynamic: opt_string(node, "dynamic").unwrap_or_else(|| "no".into()),
        orientation: opt_string(node, "orientation").unwrap_or_else(|| "none".into()),
        country: opt_string(node, "country"),
        signal_type: opt_string(node, "type").unwrap_or_else(|| "-1".into()),
        subtype: opt_string(node, "subtype").unwrap_or_else(|| "-1".into()),
        value: opt_attr(node, "value")?,
        unit: opt_string(node, "unit"),
        text: opt_string(node, "text"),
    })
}

fn parse_junction(node: Node) -> Result<Junction, ParseError> {
    let connections = children(node, "connection")
        .map(|c| -> Result<Connection, ParseError> {
            Ok(Connection {
                id: string(c, "id")?,
                incoming_road: opt_string(c, "incomingRoad"),
                connecting_road: opt_string(c, "connectingRoad"),
                contact_point: parse_contact_point(c)?,
                lane_links: children(c, "laneLink")
                    .map(|l| -> Result<LaneLinkPair, ParseError> {
                        Ok(LaneLinkPair {
                            from: attr(l, "from")?,
                            to: attr(l, "to")?,
                        })
                    })
                    .collect::<Result<Vec<_>, ParseError>>()?,
            })
        })
        .collect::<Result<Vec<_>, ParseError>>()?;

    Ok(Junction {
        id: string(node, "id")?,
        name: opt_string(node, "name"),
        junction_type: opt_string(node, "type"),
        connections,
    })
}

fn child<'a, 'i>(node: Node<'a, 'i>, tag: &str) -> Option<Node<'a, 'i>> {
    node.children().find(|c| c.is_element() && c.tag_name().name() == tag)
}

fn children<'a, 'i: 'a>(
    node: Node<'a, 'i>,
    tag: &'static str,
) -> impl Iterator<Item = Node<'a, 'i>> {
    node.children()
        .filter(move |c| c.is_element() && c.tag_name().name() == tag)
}

fn string(node: Node, name: &'static str) -> Result<String, ParseError> {
    match node.attribute(name) {
        Some(v) => Ok(v.to_string()),
        None => Err(ParseError::MissingAttribute {
            element: node.tag_name().name().to_string(),
            attribute: name,
        }),
    }
}

fn opt_string(node: Node, name: &str) -> Option<String> {
    node.attribute(name).map(|v| v.to_string())
}

fn attr<T: FromStr>(node: Node, name: &'static str) -> Result<T, ParseError> {
    match opt_attr(node, name)? {
        Some(v) => Ok(v),
        None => Err(ParseError::MissingAttribute {
            element: node.tag_name().name().to_string(),
            attribute: name,
        }),
    }
}

fn attr_or<T: FromStr>(node: Node, name: &'static str, default: T) -> Result<T, ParseError> {
    Ok(opt_attr(node, name)?.unwrap_or(default))
}

fn opt_attr<T: FromStr>(node: Node, name: &'static str) -> Result<Option<T>, ParseError> {
    match node.attribute(name) {
        Some(v) => match v.trim().parse::<T>() {
            Ok(p) => Ok(Some(p)),
            Err(_) => Err(invalid(node, name, v)),
        },
        None => Ok(None),
    }
}

fn opt_bool(node: Node, name: &'static str) -> Result<Option<bool>, ParseError> {
    match node.attribute(name) {
        Some("true") | Some("1") => Ok(Some(true)),
        Some("false") | Some("0") => Ok(Some(false)),
        Some(other) => Err(invalid(node, name, other)),
        None => Ok(None),
    }
}

fn invalid(node: Node, attribute: &'static str, value: &str) -> ParseError {
    ParseError::InvalidAttribute {
        element: node.tag_name().name().to_string(),
        attribute,
        value: value.to_string(),
    }
}

fn cmp_f64(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// Stable ascending sort on a float key.
fn sort_by_key<T, F: Fn(&T) -> f64>(records: &mut [T], key: F) {
    records.sort_by(|a, b| cmp_f64(key(a), key(b)));
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
