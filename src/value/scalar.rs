//! Numeric kinds and cell values

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The numeric kind of a datacube's buffer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataKind {
    /// 64-bit signed integer
    Int,
    /// 64-bit floating point
    #[default]
    Float,
    /// Pair of 64-bit floats
    Complex,
    /// Boolean
    Bool,
}

impl DataKind {
    /// Returns the kind name used in logs and snapshots
    pub fn as_str(&self) -> &'static str {
        match self {
            DataKind::Int => "int",
            DataKind::Float => "float",
            DataKind::Complex => "complex",
            DataKind::Bool => "bool",
        }
    }

    /// Returns the zero value of this kind
    pub fn zero(&self) -> Scalar {
        match self {
            DataKind::Int => Scalar::Int(0),
            DataKind::Float => Scalar::Float(0.0),
            DataKind::Complex => Scalar::Complex(Complex::default()),
            DataKind::Bool => Scalar::Bool(false),
        }
    }
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Complex number with 64-bit components
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Complex {
    pub re: f64,
    pub im: f64,
}

impl Complex {
    pub fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }

    /// Modulus |z|
    pub fn norm(&self) -> f64 {
        self.re.hypot(self.im)
    }

    /// Lexicographic total order: real part first, then imaginary part
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        self.re
            .total_cmp(&other.re)
            .then_with(|| self.im.total_cmp(&other.im))
    }
}

impl fmt::Display for Complex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.im < 0.0 {
            write!(f, "{}-{}j", self.re, -self.im)
        } else {
            write!(f, "{}+{}j", self.re, self.im)
        }
    }
}

/// A single cell value crossing the public API
///
/// Values are converted to the node's [`DataKind`] when written, so writing
/// `Scalar::Int(3)` into a float cube stores `3.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Scalar {
    Int(i64),
    Float(f64),
    Complex(Complex),
    Bool(bool),
}

impl Scalar {
    /// Returns the kind this value carries
    pub fn kind(&self) -> DataKind {
        match self {
            Scalar::Int(_) => DataKind::Int,
            Scalar::Float(_) => DataKind::Float,
            Scalar::Complex(_) => DataKind::Complex,
            Scalar::Bool(_) => DataKind::Bool,
        }
    }

    /// Real projection of the value. Complex values drop the imaginary part.
    pub fn as_f64(&self) -> f64 {
        match *self {
            Scalar::Int(v) => v as f64,
            Scalar::Float(v) => v,
            Scalar::Complex(c) => c.re,
            Scalar::Bool(b) => {
                if b {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }

    /// Integer projection. Floats truncate toward zero.
    pub fn as_i64(&self) -> i64 {
        match *self {
            Scalar::Int(v) => v,
            Scalar::Float(v) => v as i64,
            Scalar::Complex(c) => c.re as i64,
            Scalar::Bool(b) => b as i64,
        }
    }

    pub fn as_complex(&self) -> Complex {
        match *self {
            Scalar::Complex(c) => c,
            other => Complex::new(other.as_f64(), 0.0),
        }
    }

    /// Non-zero test, matching numeric truthiness
    pub fn as_bool(&self) -> bool {
        match *self {
            Scalar::Int(v) => v != 0,
            Scalar::Float(v) => v != 0.0,
            Scalar::Complex(c) => c.re != 0.0 || c.im != 0.0,
            Scalar::Bool(b) => b,
        }
    }

    /// Converts the value into the given kind
    pub fn cast(&self, kind: DataKind) -> Scalar {
        match kind {
            DataKind::Int => Scalar::Int(self.as_i64()),
            DataKind::Float => Scalar::Float(self.as_f64()),
            DataKind::Complex => Scalar::Complex(self.as_complex()),
            DataKind::Bool => Scalar::Bool(self.as_bool()),
        }
    }

    /// Parses a literal as it appears on a command line: `true`/`false`,
    /// integers, floats, or `re+imj` complex values.
    pub fn parse(text: &str) -> Option<Scalar> {
        let text = text.trim();
        match text {
            "true" | "True" => return Some(Scalar::Bool(true)),
            "false" | "False" => return Some(Scalar::Bool(false)),
            _ => {}
        }
        if let Ok(v) = text.parse::<i64>() {
            return Some(Scalar::Int(v));
        }
        if let Ok(v) = text.parse::<f64>() {
            return Some(Scalar::Float(v));
        }
        parse_complex(text).map(Scalar::Complex)
    }
}

fn parse_complex(text: &str) -> Option<Complex> {
    let body = text.strip_suffix('j')?;
    // split at the last sign that is not the leading one and not part of an exponent
    let bytes = body.as_bytes();
    let split = (1..bytes.len())
        .rev()
        .find(|&i| (bytes[i] == b'+' || bytes[i] == b'-') && !matches!(bytes[i - 1], b'e' | b'E'));
    match split {
        Some(i) => {
            let re = body[..i].parse::<f64>().ok()?;
            let im = body[i..].parse::<f64>().ok()?;
            Some(Complex::new(re, im))
        }
        None => {
            let im = if body.is_empty() { 1.0 } else { body.parse::<f64>().ok()? };
            Some(Complex::new(0.0, im))
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Int(v) => write!(f, "{}", v),
            Scalar::Float(v) => write!(f, "{}", v),
            Scalar::Complex(c) => write!(f, "{}", c),
            Scalar::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Scalar::Int(v)
    }
}

impl From<i32> for Scalar {
    fn from(v: i32) -> Self {
        Scalar::Int(v as i64)
    }
}

impl From<usize> for Scalar {
    fn from(v: usize) -> Self {
        Scalar::Int(v as i64)
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Scalar::Float(v)
    }
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self {
        Scalar::Bool(v)
    }
}

impl From<Complex> for Scalar {
    fn from(v: Complex) -> Self {
        Scalar::Complex(v)
    }
}
