//! Streaming decode of records into spheres.
//!
//! A single pass over the input builds the sphere buffer, grows the
//! bounding box and, when the layout has a scalar field, collects scalars
//! together with their running minimum and maximum.

use std::fmt;
use std::io::BufRead;

use super::error::{ImportError, Result};
use super::format::FieldLayout;
use super::reader::{Encoding, ReadOutcome, RecordReader};

/// Initial capacity for the sphere buffer.
const INITIAL_CAPACITY: usize = 4096;

/// A single imported point: center and radius.
#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(C)]
pub struct Sphere {
    pub position: [f32; 3],
    pub radius: f32,
}

impl Sphere {
    pub fn new(position: [f32; 3], radius: f32) -> Self {
        Self { position, radius }
    }

    /// Lowest corner of the sphere's extent.
    #[inline]
    pub fn lower(&self) -> [f32; 3] {
        self.position.map(|c| c - self.radius)
    }

    /// Highest corner of the sphere's extent.
    #[inline]
    pub fn upper(&self) -> [f32; 3] {
        self.position.map(|c| c + self.radius)
    }
}

/// Axis-aligned box grown incrementally.
///
/// The empty box has `lower = +inf` and `upper = -inf`, so any extension
/// replaces both corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub lower: [f32; 3],
    pub upper: [f32; 3],
}

impl BoundingBox {
    pub fn empty() -> Self {
        Self {
            lower: [f32::INFINITY; 3],
            upper: [f32::NEG_INFINITY; 3],
        }
    }

    /// True until at least one point has been added.
    pub fn is_empty(&self) -> bool {
        (0..3).any(|i| self.lower[i] > self.upper[i])
    }

    /// Grows the box to contain `point`.
    pub fn extend(&mut self, point: [f32; 3]) {
        for i in 0..3 {
            self.lower[i] = self.lower[i].min(point[i]);
            self.upper[i] = self.upper[i].max(point[i]);
        }
    }

    /// Grows the box to contain the full extent of `sphere`.
    pub fn extend_sphere(&mut self, sphere: &Sphere) {
        self.extend(sphere.lower());
        self.extend(sphere.upper());
    }

    /// Edge lengths, or zero for an empty box.
    pub fn size(&self) -> [f32; 3] {
        if self.is_empty() {
            return [0.0; 3];
        }
        [
            self.upper[0] - self.lower[0],
            self.upper[1] - self.lower[1],
            self.upper[2] - self.lower[2],
        ]
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "[empty]");
        }
        write!(
            f,
            "[({}, {}, {}) : ({}, {}, {})]",
            self.lower[0], self.lower[1], self.lower[2], self.upper[0], self.upper[1], self.upper[2]
        )
    }
}

/// Everything accumulated by one pass over a points stream.
#[derive(Debug, Clone)]
pub struct PointSet {
    /// One sphere per record, in file order.
    pub spheres: Vec<Sphere>,
    /// Union of all sphere extents.
    pub bounds: BoundingBox,
    /// Raw scalars, parallel to `spheres`. `None` when the layout has no
    /// scalar field.
    pub scalars: Option<Vec<f32>>,
    /// Smallest and largest scalar seen, infinities included. NaN never
    /// takes part. `None` until a non-NaN scalar is read.
    pub scalar_range: Option<(f32, f32)>,
}

impl PointSet {
    #[inline]
    pub fn len(&self) -> usize {
        self.spheres.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.spheres.is_empty()
    }
}

/// Checks that a fallback radius can be used for spheres.
///
/// # Errors
///
/// Returns [`ImportError::Config`] unless `radius` is strictly positive.
pub fn validate_default_radius(radius: f32) -> Result<()> {
    if radius > 0.0 {
        Ok(())
    } else {
        Err(ImportError::Config(format!(
            "default radius must be positive, got {}",
            radius
        )))
    }
}

/// Decode every record of `input` into spheres.
///
/// Reading stops cleanly at the end of the stream. An empty stream yields
/// an empty [`PointSet`] with empty bounds.
///
/// # Arguments
///
/// * `input` - Buffered source positioned at the first record
/// * `layout` - Record layout from the format string
/// * `encoding` - Binary or text decoding
/// * `default_radius` - Radius used when the layout has no `r` field
///
/// # Errors
///
/// Fails before reading anything if `default_radius` is not positive, and
/// fails with [`ImportError::MalformedRecord`] if a record is cut short.
pub fn read_points<R: BufRead>(
    input: R,
    layout: &FieldLayout,
    encoding: Encoding,
    default_radius: f32,
) -> Result<PointSet> {
    validate_default_radius(default_radius)?;

    let mut reader = RecordReader::new(input, layout.arity(), encoding);

    let mut spheres = Vec::with_capacity(INITIAL_CAPACITY);
    let mut bounds = BoundingBox::empty();
    let mut scalars = layout.has_scalar().then(|| Vec::with_capacity(INITIAL_CAPACITY));
    let mut scalar_min = f32::INFINITY;
    let mut scalar_max = f32::NEG_INFINITY;

    loop {
        let record = match reader.read_record()? {
            ReadOutcome::Record(values) => values,
            ReadOutcome::EndOfStream => break,
            ReadOutcome::Malformed { record, offset, .. } => {
                return Err(ImportError::MalformedRecord { record, offset });
            }
        };

        let sphere = Sphere::new(
            layout.position(record),
            layout.radius(record).unwrap_or(default_radius),
        );
        bounds.extend_sphere(&sphere);
        spheres.push(sphere);

        if let (Some(values), Some(s)) = (scalars.as_mut(), layout.scalar(record)) {
            values.push(s);
            if !s.is_nan() {
                scalar_min = scalar_min.min(s);
                scalar_max = scalar_max.max(s);
            }
        }
    }

    let scalar_range = (scalar_min <= scalar_max).then_some((scalar_min, scalar_max));

    Ok(PointSet {
        spheres,
        bounds,
        scalars,
        scalar_range,
    })
}
