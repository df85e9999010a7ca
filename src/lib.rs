//! Streaming importer for sphere point clouds.
//!
//! This crate provides tools for:
//! - Parsing a per-record format string ("xyz", "xyzr", "xyzs", ...)
//! - Decoding raw binary or whitespace-separated text records into spheres
//! - Mapping an optional scalar field to colors with a cool-to-warm palette
//! - Attaching the resulting buffers to a scene node
//! - Exporting spheres to PLY/CSV and plotting them
//!
//! # Example
//!
//! ```no_run
//! use points_import::{import_points, ImportOptions, Node};
//!
//! let options = ImportOptions::from_pairs([("format", "xyzs"), ("ascii", "")]).unwrap();
//! let mut world = Node::world();
//! let summary = import_points("points.txt", &options, &mut world).unwrap();
//! println!("{} spheres in {}", summary.num_spheres, summary.bounds);
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod processors;
pub mod scene;
pub mod visualization;

pub use config::{ConfigError, ImportOptions};
pub use crate::core::{BoundingBox, ColorMap, Encoding, FieldLayout, ImportError, Palette, Sphere};
pub use processors::{import_file, import_points, import_reader, ImportResult, ImportSummary};
pub use scene::Node;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
