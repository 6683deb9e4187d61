//! Cell element trait implemented by each numeric kind

use std::cmp::Ordering;
use std::fmt;

use crate::value::{Complex, DataKind, Scalar};

/// A value that can live in a dense table buffer
///
/// `Default` must be the kind's zero: new rows and columns are zero-filled.
pub trait Element: Copy + Default + PartialEq + fmt::Debug + 'static {
    /// The kind tag for this element type
    const KIND: DataKind;

    /// Converts an API value into this element type
    fn from_scalar(value: Scalar) -> Self;

    /// Converts back into an API value
    fn to_scalar(self) -> Scalar;

    /// Equality within `tolerance`. Exact for integer and boolean kinds.
    fn approx_eq(self, other: Self, tolerance: f64) -> bool;

    /// Natural total order used for sorting
    fn total_cmp(&self, other: &Self) -> Ordering;
}

impl Element for i64 {
    const KIND: DataKind = DataKind::Int;

    fn from_scalar(value: Scalar) -> Self {
        value.as_i64()
    }

    fn to_scalar(self) -> Scalar {
        Scalar::Int(self)
    }

    fn approx_eq(self, other: Self, _tolerance: f64) -> bool {
        self == other
    }

    fn total_cmp(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }
}

impl Element for f64 {
    const KIND: DataKind = DataKind::Float;

    fn from_scalar(value: Scalar) -> Self {
        value.as_f64()
    }

    fn to_scalar(self) -> Scalar {
        Scalar::Float(self)
    }

    fn approx_eq(self, other: Self, tolerance: f64) -> bool {
        self == other || (self - other).abs() <= tolerance
    }

    fn total_cmp(&self, other: &Self) -> Ordering {
        f64::total_cmp(self, other)
    }
}

impl Element for Complex {
    const KIND: DataKind = DataKind::Complex;

    fn from_scalar(value: Scalar) -> Self {
        value.as_complex()
    }

    fn to_scalar(self) -> Scalar {
        Scalar::Complex(self)
    }

    fn approx_eq(self, other: Self, tolerance: f64) -> bool {
        self == other || Complex::new(self.re - other.re, self.im - other.im).norm() <= tolerance
    }

    fn total_cmp(&self, other: &Self) -> Ordering {
        Complex::total_cmp(self, other)
    }
}

impl Element for bool {
    const KIND: DataKind = DataKind::Bool;

    fn from_scalar(value: Scalar) -> Self {
        value.as_bool()
    }

    fn to_scalar(self) -> Scalar {
        Scalar::Bool(self)
    }

    fn approx_eq(self, other: Self, _tolerance: f64) -> bool {
        self == other
    }

    fn total_cmp(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }
}
