//! Tagged values for child attributes and node parameters

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::scalar::{Complex, Scalar};

/// String-keyed map of attribute values, ordered by key
pub type Attributes = BTreeMap<String, AttrValue>;

/// A heterogeneous attribute or parameter value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum AttrValue {
    Int(i64),
    Float(f64),
    Complex(Complex),
    Bool(bool),
    Text(String),
    Map(Attributes),
}

impl AttrValue {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AttrValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttrValue::Int(v) => Some(*v as f64),
            AttrValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Interprets the value as a row anchor
    pub fn as_row(&self) -> Option<usize> {
        match self {
            AttrValue::Int(v) if *v >= 0 => Some(*v as usize),
            _ => None,
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Int(v) => write!(f, "{}", v),
            AttrValue::Float(v) => write!(f, "{}", v),
            AttrValue::Complex(c) => write!(f, "{}", c),
            AttrValue::Bool(b) => write!(f, "{}", b),
            AttrValue::Text(s) => write!(f, "{}", s),
            AttrValue::Map(m) => {
                write!(f, "{{")?;
                for (i, (k, v)) in m.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<Scalar> for AttrValue {
    fn from(v: Scalar) -> Self {
        match v {
            Scalar::Int(i) => AttrValue::Int(i),
            Scalar::Float(x) => AttrValue::Float(x),
            Scalar::Complex(c) => AttrValue::Complex(c),
            Scalar::Bool(b) => AttrValue::Bool(b),
        }
    }
}

impl From<i64> for AttrValue {
    fn from(v: i64) -> Self {
        AttrValue::Int(v)
    }
}

impl From<i32> for AttrValue {
    fn from(v: i32) -> Self {
        AttrValue::Int(v as i64)
    }
}

impl From<usize> for AttrValue {
    fn from(v: usize) -> Self {
        AttrValue::Int(v as i64)
    }
}

impl From<f64> for AttrValue {
    fn from(v: f64) -> Self {
        AttrValue::Float(v)
    }
}

impl From<bool> for AttrValue {
    fn from(v: bool) -> Self {
        AttrValue::Bool(v)
    }
}

impl From<&str> for AttrValue {
    fn from(v: &str) -> Self {
        AttrValue::Text(v.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(v: String) -> Self {
        AttrValue::Text(v)
    }
}

impl From<Attributes> for AttrValue {
    fn from(v: Attributes) -> Self {
        AttrValue::Map(v)
    }
}
