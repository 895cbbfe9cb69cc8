//! # Unit expressions
//!
//! A [`Unit`] is a product of powers of registry units, e.g. `kg m / s^2`.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use conquer_once::Lazy;
use regex::Regex;
use std::fmt;
use std::str::FromStr;

use super::registry::{self, Dim, ResolvedUnit, NUM_BASES};
use super::{UnitError, UNITLESS};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Largest magnitude of a factor's power accepted in a unit expression.
const MAX_POWER: i32 = 1000;

// ---------------------------------------------------------------------------
// STATICS
// ---------------------------------------------------------------------------

/// One token of a unit expression, with any leading whitespace.
static TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\s*)(\(|\)|\*|/|\^\s*[+-]?\d+|[^\s()*/^]+)")
        .expect("unit token regex is valid")
});

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A physical unit made from one or more factors.
///
/// The empty product is the unitless unit, displayed as `-`.
#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    factors: Vec<Factor>,
}

/// A single `symbol^power` factor of a unit.
#[derive(Debug, Clone, PartialEq)]
struct Factor {
    /// The symbol as written, including prefix (e.g. `km`).
    symbol: String,

    /// Prefix times unit factor.
    scale: f64,

    offset: f64,

    dim: Dim,

    power: i32,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Open,
    Close,
    Mul,
    Div,
    Pow(i32),
    Name(String),

    /// Whitespace between two operands, an implicit multiplication.
    Juxtapose,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Unit {
    /// The unitless unit.
    pub fn unitless() -> Self {
        Self {
            factors: Vec::new(),
        }
    }

    /// Parse a unit expression.
    ///
    /// Factors are separated by whitespace or `*`, `/` divides by the factor
    /// or parenthesised group that follows it, and `^n` raises the preceding
    /// factor or group to an integer power.
    pub fn parse(expr: &str) -> Result<Self, UnitError> {
        let trimmed = expr.trim();

        if trimmed == UNITLESS {
            return Ok(Self::unitless());
        }

        let tokens = tokenise(trimmed).ok_or_else(|| UnitError::InvalidUnit(expr.into()))?;

        let mut parser = Parser {
            tokens: &tokens,
            pos: 0,
        };

        let unit = parser
            .product()
            .map_err(|_| UnitError::InvalidUnit(expr.into()))?;

        if parser.pos != tokens.len() {
            return Err(UnitError::InvalidUnit(expr.into()));
        }

        Ok(unit)
    }

    /// Returns true if this is the unitless unit.
    pub fn is_unitless(&self) -> bool {
        self.factors.is_empty()
    }

    /// The dimension exponent vector of this unit.
    pub fn dim(&self) -> Dim {
        let mut dim = [0i32; NUM_BASES];

        for f in self.factors.iter() {
            for (d, fd) in dim.iter_mut().zip(f.dim.iter()) {
                *d = d.saturating_add(fd.saturating_mul(f.power));
            }
        }

        dim
    }

    /// Returns true if both units have the same physical dimension.
    pub fn equal_base(&self, other: &Unit) -> bool {
        self.dim() == other.dim()
    }

    /// Multiplier taking a value in this unit to the coherent SI unit.
    pub fn scale(&self) -> f64 {
        self.factors
            .iter()
            .map(|f| f.scale.powi(f.power))
            .product()
    }

    /// Convert a value in this unit into the coherent SI unit.
    pub fn to_si(&self, value: f64) -> f64 {
        (value + self.offset()) * self.scale()
    }

    /// Convert a value in the coherent SI unit into this unit.
    pub fn from_si(&self, value: f64) -> f64 {
        value / self.scale() - self.offset()
    }

    /// Product of two units. Identical symbols are merged.
    pub fn multiply(&self, other: &Unit) -> Unit {
        let mut factors = self.factors.clone();

        for f in other.factors.iter() {
            match factors.iter_mut().find(|e| e.symbol == f.symbol) {
                Some(existing) => existing.power = existing.power.saturating_add(f.power),
                None => factors.push(f.clone()),
            }
        }

        factors.retain(|f| f.power != 0);

        Unit { factors }
    }

    /// Quotient of two units.
    pub fn divide(&self, other: &Unit) -> Unit {
        self.multiply(&other.pow(-1))
    }

    /// Raise this unit to an integer power.
    pub fn pow(&self, power: i32) -> Unit {
        Unit {
            factors: self
                .factors
                .iter()
                .filter(|_| power != 0)
                .map(|f| Factor {
                    power: f.power.saturating_mul(power),
                    ..f.clone()
                })
                .collect(),
        }
    }

    /// Returns true if no factor's power exceeds [`MAX_POWER`] in magnitude.
    fn is_bounded(&self) -> bool {
        self.factors.iter().all(|f| f.power.abs() <= MAX_POWER)
    }

    /// Offsets only apply to a lone temperature unit, composite units such as
    /// `degC / s` describe differences and are scaled only.
    fn offset(&self) -> f64 {
        match self.factors.as_slice() {
            [f] if f.power == 1 => f.offset,
            _ => 0.0,
        }
    }
}

impl Factor {
    fn new(symbol: &str, resolved: ResolvedUnit) -> Self {
        Self {
            symbol: symbol.into(),
            scale: resolved.prefix * resolved.unit.factor,
            offset: resolved.unit.offset,
            dim: resolved.unit.dim,
            power: 1,
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unitless() {
            return write!(f, "{}", UNITLESS);
        }

        let fmt_factor = |factor: &Factor, power: i32| {
            if power == 1 {
                factor.symbol.clone()
            } else {
                format!("{}^{}", factor.symbol, power)
            }
        };

        let num: Vec<String> = self
            .factors
            .iter()
            .filter(|f| f.power > 0)
            .map(|f| fmt_factor(f, f.power))
            .collect();
        let den: Vec<String> = self
            .factors
            .iter()
            .filter(|f| f.power < 0)
            .map(|f| fmt_factor(f, -f.power))
            .collect();

        match (num.is_empty(), den.len()) {
            (false, 0) => write!(f, "{}", num.join(" ")),
            (true, _) => write!(f, "1 / {}", group(&den)),
            (false, _) => write!(f, "{} / {}", num.join(" "), group(&den)),
        }
    }
}

impl FromStr for Unit {
    type Err = UnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Unit::parse(s)
    }
}

// ---------------------------------------------------------------------------
// PARSER
// ---------------------------------------------------------------------------

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) -> Option<&Token> {
        let t = self.tokens.get(self.pos);
        self.pos += 1;
        t
    }

    /// `product := power (('*' | '/' | ' ') power)*`
    fn product(&mut self) -> Result<Unit, ()> {
        let mut unit = self.power()?;

        loop {
            match self.peek() {
                Some(Token::Mul) | Some(Token::Juxtapose) => {
                    self.pos += 1;
                    unit = unit.multiply(&self.power()?);
                }
                Some(Token::Div) => {
                    self.pos += 1;
                    unit = unit.divide(&self.power()?);
                }
                _ => break,
            }

            if !unit.is_bounded() {
                return Err(());
            }
        }

        Ok(unit)
    }

    /// `power := atom ('^' int)?`
    fn power(&mut self) -> Result<Unit, ()> {
        let unit = self.atom()?;

        if let Some(Token::Pow(p)) = self.peek() {
            let p = *p;
            self.pos += 1;

            let raised = unit.pow(p);
            if !raised.is_bounded() {
                return Err(());
            }

            return Ok(raised);
        }

        Ok(unit)
    }

    /// `atom := name | '1' | '(' product ')'`
    fn atom(&mut self) -> Result<Unit, ()> {
        match self.bump().cloned() {
            Some(Token::Name(name)) => {
                if name == "1" {
                    return Ok(Unit::unitless());
                }

                let resolved = registry::resolve(&name).ok_or(())?;

                Ok(Unit {
                    factors: vec![Factor::new(&name, resolved)],
                })
            }
            Some(Token::Open) => {
                let unit = self.product()?;

                match self.bump() {
                    Some(Token::Close) => Ok(unit),
                    _ => Err(()),
                }
            }
            _ => Err(()),
        }
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Split an expression into tokens, or `None` if it contains anything that
/// isn't a valid token.
fn tokenise(expr: &str) -> Option<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut rest = expr;

    while !rest.is_empty() {
        let caps = TOKEN_RE.captures(rest)?;
        let whole = caps.get(0)?;
        let space = caps.get(1).map_or("", |m| m.as_str());
        let text = caps.get(2)?.as_str();

        let token = match text {
            "(" => Token::Open,
            ")" => Token::Close,
            "*" => Token::Mul,
            "/" => Token::Div,
            t if t.starts_with('^') => {
                let power: i32 = t[1..].trim().trim_start_matches('+').parse().ok()?;
                if power.abs() > MAX_POWER {
                    return None;
                }
                Token::Pow(power)
            }
            t => Token::Name(t.into()),
        };

        // Whitespace between two operands is a multiplication, elsewhere it is
        // just padding around an operator
        let prev_is_operand = matches!(
            tokens.last(),
            Some(Token::Name(_)) | Some(Token::Close) | Some(Token::Pow(_))
        );
        let next_is_operand = matches!(token, Token::Name(_) | Token::Open);

        if !space.is_empty() && prev_is_operand && next_is_operand {
            tokens.push(Token::Juxtapose);
        }

        tokens.push(token);
        rest = &rest[whole.end()..];
    }

    Some(tokens)
}

/// Format a list of denominator factors, bracketing if there is more than one.
fn group(factors: &[String]) -> String {
    if factors.len() == 1 {
        factors[0].clone()
    } else {
        format!("({})", factors.join(" "))
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
