//! # Unit registry
//!
//! Static table of the physical units understood by the kernel, together with
//! the SI prefixes they accept.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use conquer_once::Lazy;
use std::collections::HashMap;
use std::f64::consts::PI;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of base dimensions tracked for each unit.
pub const NUM_BASES: usize = 9;

/// Names of the base dimensions, in exponent vector order.
pub const BASE_NAMES: [&str; NUM_BASES] = [
    "mass",
    "length",
    "time",
    "current",
    "temperature",
    "luminous intensity",
    "amount of substance",
    "angle",
    "bit",
];

const MASS: Dim = [1, 0, 0, 0, 0, 0, 0, 0, 0];
const LENGTH: Dim = [0, 1, 0, 0, 0, 0, 0, 0, 0];
const TIME: Dim = [0, 0, 1, 0, 0, 0, 0, 0, 0];
const CURRENT: Dim = [0, 0, 0, 1, 0, 0, 0, 0, 0];
const TEMPERATURE: Dim = [0, 0, 0, 0, 1, 0, 0, 0, 0];
const LUMINOUS: Dim = [0, 0, 0, 0, 0, 1, 0, 0, 0];
const AMOUNT: Dim = [0, 0, 0, 0, 0, 0, 1, 0, 0];
const ANGLE: Dim = [0, 0, 0, 0, 0, 0, 0, 1, 0];
const BIT: Dim = [0, 0, 0, 0, 0, 0, 0, 0, 1];

const VOLUME: Dim = [0, 3, 0, 0, 0, 0, 0, 0, 0];
const FREQUENCY: Dim = [0, 0, -1, 0, 0, 0, 0, 0, 0];
const FORCE: Dim = [1, 1, -2, 0, 0, 0, 0, 0, 0];
const ENERGY: Dim = [1, 2, -2, 0, 0, 0, 0, 0, 0];
const POWER: Dim = [1, 2, -3, 0, 0, 0, 0, 0, 0];
const PRESSURE: Dim = [1, -1, -2, 0, 0, 0, 0, 0, 0];
const CHARGE: Dim = [0, 0, 1, 1, 0, 0, 0, 0, 0];
const VOLTAGE: Dim = [1, 2, -3, -1, 0, 0, 0, 0, 0];
const RESISTANCE: Dim = [1, 2, -3, -2, 0, 0, 0, 0, 0];
const CAPACITANCE: Dim = [-1, -2, 4, 2, 0, 0, 0, 0, 0];
const INDUCTANCE: Dim = [1, 2, -2, -2, 0, 0, 0, 0, 0];
const CONDUCTANCE: Dim = [-1, -2, 3, 2, 0, 0, 0, 0, 0];
const MAGNETIC_FLUX: Dim = [1, 2, -2, -1, 0, 0, 0, 0, 0];
const MAGNETIC_FLUX_DENSITY: Dim = [1, 0, -2, -1, 0, 0, 0, 0, 0];

const SHORT_PREFIXES: &[(&str, f64)] = &[
    ("da", 1e1),
    ("h", 1e2),
    ("k", 1e3),
    ("M", 1e6),
    ("G", 1e9),
    ("T", 1e12),
    ("P", 1e15),
    ("E", 1e18),
    ("d", 1e-1),
    ("c", 1e-2),
    ("m", 1e-3),
    ("u", 1e-6),
    ("µ", 1e-6),
    ("n", 1e-9),
    ("p", 1e-12),
    ("f", 1e-15),
    ("a", 1e-18),
];

const LONG_PREFIXES: &[(&str, f64)] = &[
    ("deca", 1e1),
    ("hecto", 1e2),
    ("kilo", 1e3),
    ("mega", 1e6),
    ("giga", 1e9),
    ("tera", 1e12),
    ("peta", 1e15),
    ("exa", 1e18),
    ("deci", 1e-1),
    ("centi", 1e-2),
    ("milli", 1e-3),
    ("micro", 1e-6),
    ("nano", 1e-9),
    ("pico", 1e-12),
    ("femto", 1e-15),
    ("atto", 1e-18),
];

use Prefixes::{Long, Short};

/// Every unit known to the kernel as `(names, prefixes, factor, offset, dim)`.
///
/// `factor` scales a value in the unit to the coherent SI unit of its
/// dimension, `offset` is added before scaling (only non-zero for
/// temperatures).
const UNIT_TABLE: &[(&[&str], Prefixes, f64, f64, Dim)] = &[
    // Length
    (&["m"], Short, 1.0, 0.0, LENGTH),
    (&["meter", "meters", "metre", "metres"], Long, 1.0, 0.0, LENGTH),
    (&["in", "inch", "inches"], Prefixes::None, 0.0254, 0.0, LENGTH),
    (&["ft", "foot", "feet"], Prefixes::None, 0.3048, 0.0, LENGTH),
    (&["yd", "yard", "yards"], Prefixes::None, 0.9144, 0.0, LENGTH),
    (&["mi", "mile", "miles"], Prefixes::None, 1609.344, 0.0, LENGTH),
    // Volume
    (&["l", "L"], Short, 1e-3, 0.0, VOLUME),
    (&["liter", "liters", "litre", "litres"], Long, 1e-3, 0.0, VOLUME),
    // Mass
    (&["g"], Short, 1e-3, 0.0, MASS),
    (&["gram", "grams"], Long, 1e-3, 0.0, MASS),
    (&["t", "tonne", "tonnes"], Prefixes::None, 1e3, 0.0, MASS),
    (&["lb", "lbs", "lbm", "poundmass"], Prefixes::None, 0.45359237, 0.0, MASS),
    // Time
    (&["s"], Short, 1.0, 0.0, TIME),
    (&["second", "seconds"], Long, 1.0, 0.0, TIME),
    (&["min", "minute", "minutes"], Prefixes::None, 60.0, 0.0, TIME),
    (&["h", "hr", "hour", "hours"], Prefixes::None, 3600.0, 0.0, TIME),
    (&["day", "days"], Prefixes::None, 86400.0, 0.0, TIME),
    // Frequency
    (&["Hz"], Short, 1.0, 0.0, FREQUENCY),
    (&["hertz"], Long, 1.0, 0.0, FREQUENCY),
    // Angle
    (&["rad"], Short, 1.0, 0.0, ANGLE),
    (&["radian", "radians"], Long, 1.0, 0.0, ANGLE),
    (&["deg", "degree", "degrees"], Prefixes::None, PI / 180.0, 0.0, ANGLE),
    (&["rev", "revolution", "revolutions"], Prefixes::None, 2.0 * PI, 0.0, ANGLE),
    // Electric current
    (&["A"], Short, 1.0, 0.0, CURRENT),
    (&["ampere", "amperes"], Long, 1.0, 0.0, CURRENT),
    // Temperature
    (&["K"], Short, 1.0, 0.0, TEMPERATURE),
    (&["kelvin"], Long, 1.0, 0.0, TEMPERATURE),
    (&["degC", "celsius"], Prefixes::None, 1.0, 273.15, TEMPERATURE),
    (&["degF", "fahrenheit"], Prefixes::None, 5.0 / 9.0, 459.67, TEMPERATURE),
    (&["degR", "rankine"], Prefixes::None, 5.0 / 9.0, 0.0, TEMPERATURE),
    // Amount of substance
    (&["mol"], Short, 1.0, 0.0, AMOUNT),
    (&["mole", "moles"], Long, 1.0, 0.0, AMOUNT),
    // Luminous intensity
    (&["cd"], Short, 1.0, 0.0, LUMINOUS),
    (&["candela"], Long, 1.0, 0.0, LUMINOUS),
    // Force
    (&["N"], Short, 1.0, 0.0, FORCE),
    (&["newton", "newtons"], Long, 1.0, 0.0, FORCE),
    (&["lbf", "poundforce"], Prefixes::None, 4.4482216152605, 0.0, FORCE),
    // Energy
    (&["J"], Short, 1.0, 0.0, ENERGY),
    (&["joule", "joules"], Long, 1.0, 0.0, ENERGY),
    (&["Wh"], Short, 3600.0, 0.0, ENERGY),
    (&["erg"], Prefixes::None, 1e-7, 0.0, ENERGY),
    // Power
    (&["W"], Short, 1.0, 0.0, POWER),
    (&["watt", "watts"], Long, 1.0, 0.0, POWER),
    (&["hp"], Prefixes::None, 745.6998715822702, 0.0, POWER),
    // Pressure
    (&["Pa"], Short, 1.0, 0.0, PRESSURE),
    (&["pascal", "pascals"], Long, 1.0, 0.0, PRESSURE),
    (&["bar"], Short, 1e5, 0.0, PRESSURE),
    (&["psi"], Prefixes::None, 6894.757293168361, 0.0, PRESSURE),
    (&["atm"], Prefixes::None, 101325.0, 0.0, PRESSURE),
    // Electromagnetism
    (&["C"], Short, 1.0, 0.0, CHARGE),
    (&["coulomb", "coulombs"], Long, 1.0, 0.0, CHARGE),
    (&["V"], Short, 1.0, 0.0, VOLTAGE),
    (&["volt", "volts"], Long, 1.0, 0.0, VOLTAGE),
    (&["ohm", "Ω"], Short, 1.0, 0.0, RESISTANCE),
    (&["F"], Short, 1.0, 0.0, CAPACITANCE),
    (&["farad", "farads"], Long, 1.0, 0.0, CAPACITANCE),
    (&["H"], Short, 1.0, 0.0, INDUCTANCE),
    (&["henry", "henries"], Long, 1.0, 0.0, INDUCTANCE),
    (&["S"], Short, 1.0, 0.0, CONDUCTANCE),
    (&["siemens"], Long, 1.0, 0.0, CONDUCTANCE),
    (&["Wb"], Short, 1.0, 0.0, MAGNETIC_FLUX),
    (&["weber", "webers"], Long, 1.0, 0.0, MAGNETIC_FLUX),
    (&["T"], Short, 1.0, 0.0, MAGNETIC_FLUX_DENSITY),
    (&["tesla", "teslas"], Long, 1.0, 0.0, MAGNETIC_FLUX_DENSITY),
    // Information
    (&["b", "bit", "bits"], Short, 1.0, 0.0, BIT),
    (&["B", "byte", "bytes"], Short, 8.0, 0.0, BIT),
];

// ---------------------------------------------------------------------------
// STATICS
// ---------------------------------------------------------------------------

static REGISTRY: Lazy<HashMap<&'static str, BaseUnit>> = Lazy::new(build_registry);

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Exponent vector over the base dimensions.
pub type Dim = [i32; NUM_BASES];

/// A named unit as stored in the registry, before any prefix is applied.
#[derive(Debug, Clone, Copy)]
pub struct BaseUnit {
    /// Multiplier to the coherent SI unit.
    pub factor: f64,

    /// Offset added before scaling, in the unit's own scale.
    pub offset: f64,

    /// Dimension exponents.
    pub dim: Dim,

    prefixes: Prefixes,
}

/// A unit symbol resolved against the registry, including its prefix.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedUnit {
    pub unit: BaseUnit,

    /// Prefix multiplier, 1 if no prefix was used.
    pub prefix: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The set of prefixes a unit accepts.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Prefixes {
    None,
    Short,
    Long,
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Look up a single unit symbol such as `km` or `kilometers`.
///
/// Exact names are preferred over prefixed ones, so `min` is minutes rather
/// than milli-inches.
pub fn resolve(symbol: &str) -> Option<ResolvedUnit> {
    if let Some(unit) = REGISTRY.get(symbol) {
        return Some(ResolvedUnit {
            unit: *unit,
            prefix: 1.0,
        });
    }

    // Longer prefixes are listed first so `da` is tried before `d`
    let candidates = SHORT_PREFIXES
        .iter()
        .map(|p| (Short, p))
        .chain(LONG_PREFIXES.iter().map(|p| (Long, p)));

    for (kind, (prefix, scale)) in candidates {
        if let Some(rest) = symbol.strip_prefix(prefix) {
            if let Some(unit) = REGISTRY.get(rest) {
                if unit.prefixes == kind {
                    return Some(ResolvedUnit {
                        unit: *unit,
                        prefix: *scale,
                    });
                }
            }
        }
    }

    None
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn build_registry() -> HashMap<&'static str, BaseUnit> {
    let mut map = HashMap::new();

    for (names, prefixes, factor, offset, dim) in UNIT_TABLE {
        for name in names.iter() {
            map.insert(
                *name,
                BaseUnit {
                    factor: *factor,
                    offset: *offset,
                    dim: *dim,
                    prefixes: *prefixes,
                },
            );
        }
    }

    map
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
