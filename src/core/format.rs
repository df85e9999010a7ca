//! Record layout described by a short format string.
//!
//! Each character of the format string names one `f32` slot of a record:
//! `x`, `y`, `z` for the sphere center, `r` for the radius and `s` for a
//! scalar used to derive colors. Any other character reserves a slot that
//! is read but never used, so `"xyz_s"` skips the fourth value.

use std::fmt;

use thiserror::Error;

/// Errors produced while parsing a format string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("invalid points format: no {0} component")]
    MissingField(char),
}

/// Logical fields a record slot can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    X,
    Y,
    Z,
    Radius,
    Scalar,
}

impl Field {
    /// Tag character used for this field in a format string.
    pub const fn tag(self) -> char {
        match self {
            Field::X => 'x',
            Field::Y => 'y',
            Field::Z => 'z',
            Field::Radius => 'r',
            Field::Scalar => 's',
        }
    }
}

/// Offsets of each logical field within a fixed-width record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldLayout {
    arity: usize,
    x: usize,
    y: usize,
    z: usize,
    radius: Option<usize>,
    scalar: Option<usize>,
}

impl FieldLayout {
    /// Parse a format string such as `"xyz"`, `"xyzr"` or `"xyzs"`.
    ///
    /// A tag that appears more than once resolves to its first occurrence.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::MissingField`] if `x`, `y` or `z` is absent.
    pub fn parse(format: &str) -> Result<Self, FormatError> {
        let find = |field: Field| format.chars().position(|c| c == field.tag());
        let required = |field: Field| find(field).ok_or(FormatError::MissingField(field.tag()));

        Ok(Self {
            arity: format.chars().count(),
            x: required(Field::X)?,
            y: required(Field::Y)?,
            z: required(Field::Z)?,
            radius: find(Field::Radius),
            scalar: find(Field::Scalar),
        })
    }

    /// Number of `f32` values per record.
    #[inline]
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Record offset of `field`, or `None` when the format does not carry it.
    pub fn offset(&self, field: Field) -> Option<usize> {
        match field {
            Field::X => Some(self.x),
            Field::Y => Some(self.y),
            Field::Z => Some(self.z),
            Field::Radius => self.radius,
            Field::Scalar => self.scalar,
        }
    }

    /// Center position stored in `record`.
    #[inline]
    pub fn position(&self, record: &[f32]) -> [f32; 3] {
        [record[self.x], record[self.y], record[self.z]]
    }

    /// Per-record radius, if the layout has one.
    #[inline]
    pub fn radius(&self, record: &[f32]) -> Option<f32> {
        self.radius.map(|i| record[i])
    }

    /// Per-record scalar, if the layout has one.
    #[inline]
    pub fn scalar(&self, record: &[f32]) -> Option<f32> {
        self.scalar.map(|i| record[i])
    }

    pub fn has_radius(&self) -> bool {
        self.radius.is_some()
    }

    pub fn has_scalar(&self) -> bool {
        self.scalar.is_some()
    }
}

impl fmt::Display for FieldLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "arity={} x={} y={} z={}", self.arity, self.x, self.y, self.z)?;
        if let Some(r) = self.radius {
            write!(f, " r={}", r)?;
        }
        if let Some(s) = self.scalar {
            write!(f, " s={}", s)?;
        }
        Ok(())
    }
}
