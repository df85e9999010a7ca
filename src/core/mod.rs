//! Core data types, decoding and I/O.

pub mod colormap;
pub mod error;
pub mod format;
pub mod reader;
pub mod stream;
pub mod writers;

pub use colormap::{ColorMap, ColorMapError, Palette};
pub use error::ImportError;
pub use format::{Field, FieldLayout, FormatError};
pub use reader::{Encoding, ReadOutcome, RecordReader};
pub use stream::{read_points, BoundingBox, PointSet, Sphere};
pub use writers::{write_ply, write_spheres_csv, WriteError};
