//! End-to-end import of a points file into a scene node.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use log::{debug, info};

use crate::config::ImportOptions;
use crate::core::colormap::ColorMap;
use crate::core::error::{ImportError, Result};
use crate::core::format::FieldLayout;
use crate::core::stream::{read_points, validate_default_radius, BoundingBox, PointSet, Sphere};
use crate::scene::{BufferData, DataBuffer, Node};

/// Name of the child node that receives imported spheres.
pub const SPHERES_NODE: &str = "spheres";
/// Type tag of the spheres node.
pub const SPHERES_TYPE: &str = "Spheres";
/// Buffer name for the sphere geometry.
pub const SPHERE_DATA: &str = "sphereData";
/// Buffer name for the per-sphere colors.
pub const COLOR_DATA: &str = "colorData";

const READ_BUFFER_SIZE: usize = 64 * 1024;

/// Buffers produced by a successful import.
#[derive(Debug, Clone)]
pub struct ImportResult {
    /// One sphere per record, in file order.
    pub spheres: Vec<Sphere>,
    /// One RGBA color per sphere. Present when the format has a scalar
    /// field and at least one record was read.
    pub colors: Option<Vec<[f32; 4]>>,
    /// Union of all sphere extents.
    pub bounds: BoundingBox,
    /// Scalar range the colors were mapped over.
    pub scalar_range: Option<(f32, f32)>,
}

/// What was attached to the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImportSummary {
    pub num_spheres: usize,
    pub has_colors: bool,
    pub bounds: BoundingBox,
    pub scalar_range: Option<(f32, f32)>,
}

impl ImportResult {
    #[inline]
    pub fn len(&self) -> usize {
        self.spheres.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.spheres.is_empty()
    }

    pub fn summary(&self) -> ImportSummary {
        ImportSummary {
            num_spheres: self.spheres.len(),
            has_colors: self.colors.is_some(),
            bounds: self.bounds,
            scalar_range: self.scalar_range,
        }
    }

    /// Hands the buffers to `world` under the spheres node.
    ///
    /// `sphereData` and `colorData` replace earlier buffers of the same
    /// name. A stale `colorData` is dropped when this import has no colors.
    pub fn attach(self, world: &mut Node) -> ImportSummary {
        let summary = self.summary();
        let node = world.create_child(SPHERES_NODE, SPHERES_TYPE);

        node.add(DataBuffer::new(SPHERE_DATA, BufferData::Spheres(self.spheres)));
        match self.colors {
            Some(colors) => node.add(DataBuffer::new(COLOR_DATA, BufferData::Colors(colors))),
            None => {
                node.remove(COLOR_DATA);
            }
        }

        summary
    }
}

/// Decode points from any byte source.
///
/// # Errors
///
/// Returns an error if the format string lacks an axis, the default
/// radius is not positive, the stream cannot be read, or a record is
/// truncated.
pub fn import_reader<R: Read>(reader: R, options: &ImportOptions) -> Result<ImportResult> {
    let layout = FieldLayout::parse(&options.format)?;
    validate_default_radius(options.radius)?;
    debug!("Points layout '{}': {}", options.format, layout);

    let points = read_points(
        BufReader::with_capacity(READ_BUFFER_SIZE, reader),
        &layout,
        options.encoding(),
        options.radius,
    )?;

    colorize(points)
}

/// Decode points from a file. The file is closed before this returns.
///
/// # Errors
///
/// Returns [`ImportError::Io`] if the file cannot be opened, otherwise
/// the same errors as [`import_reader`].
pub fn import_file<P: AsRef<Path>>(path: P, options: &ImportOptions) -> Result<ImportResult> {
    let path = path.as_ref();
    info!("Importing points from {}", path.display());

    let file = File::open(path).map_err(|source| ImportError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    import_reader(file, options)
}

/// Import a points file and attach its buffers to `world`.
///
/// Nothing is attached if the import fails.
///
/// # Example
///
/// ```no_run
/// use points_import::config::ImportOptions;
/// use points_import::processors::import::import_points;
/// use points_import::scene::Node;
///
/// let mut world = Node::world();
/// let options = ImportOptions { format: "xyzs".into(), ascii: true, ..Default::default() };
/// let summary = import_points("points.txt", &options, &mut world).unwrap();
/// println!("{} spheres", summary.num_spheres);
/// ```
pub fn import_points<P: AsRef<Path>>(
    path: P,
    options: &ImportOptions,
    world: &mut Node,
) -> Result<ImportSummary> {
    let result = import_file(path, options)?;
    let summary = result.attach(world);

    info!(
        "Imported {} points, bounds = {}",
        summary.num_spheres, summary.bounds
    );

    Ok(summary)
}

/// Derives colors from collected scalars, once their full range is known.
fn colorize(points: PointSet) -> Result<ImportResult> {
    let PointSet {
        spheres,
        bounds,
        scalars,
        scalar_range,
    } = points;

    let colors = match scalars {
        Some(scalars) if !scalars.is_empty() => {
            // All-NaN scalars leave no range; collapse onto the first color.
            let (lo, hi) = scalar_range.unwrap_or((0.0, 0.0));
            info!("Creating color map for points data over [{}, {}]", lo, hi);
            let map = ColorMap::cool_to_warm(lo, hi)?;
            Some(map.colors_for(&scalars))
        }
        _ => None,
    };

    Ok(ImportResult {
        spheres,
        colors,
        bounds,
        scalar_range,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::colormap::Palette;
    use std::io::{Cursor, Write};
    use tempfile::NamedTempFile;

    fn text_options(format: &str, radius: f32) -> ImportOptions {
        ImportOptions {
            radius,
            format: format.to_string(),
            ascii: true,
        }
    }

    #[test]
    fn test_scalar_colors_end_to_end() {
        let result =
            import_reader(Cursor::new("0 0 0 1\n1 1 1 2\n"), &text_options("xyzs", 0.5)).unwrap();

        assert_eq!(
            result.spheres,
            vec![Sphere::new([0.0, 0.0, 0.0], 0.5), Sphere::new([1.0, 1.0, 1.0], 0.5)]
        );
        assert_eq!(result.scalar_range, Some((1.0, 2.0)));

        let palette = Palette::cool_to_warm();
        let [r0, g0, b0] = palette.first();
        let [r1, g1, b1] = palette.last();
        assert_eq!(
            result.colors,
            Some(vec![[r0, g0, b0, 1.0], [r1, g1, b1, 1.0]])
        );
    }

    #[test]
    fn test_no_scalar_field_means_no_colors() {
        let result = import_reader(Cursor::new("0 0 0 1\n"), &text_options("xyzr", 0.5)).unwrap();
        assert_eq!(result.spheres, vec![Sphere::new([0.0, 0.0, 0.0], 1.0)]);
        assert!(result.colors.is_none());
    }

    #[test]
    fn test_empty_scalar_stream_has_no_colors() {
        let result = import_reader(Cursor::new(""), &text_options("xyzs", 0.5)).unwrap();
        assert!(result.is_empty());
        assert!(result.bounds.is_empty());
        assert!(result.colors.is_none());
    }

    #[test]
    fn test_all_nan_scalars_take_first_color() {
        let result = import_reader(Cursor::new("0 0 0 NaN\n"), &text_options("xyzs", 0.5)).unwrap();
        let [r, g, b] = Palette::cool_to_warm().first();
        assert_eq!(result.colors, Some(vec![[r, g, b, 1.0]]));
    }

    #[test]
    fn test_infinite_scalar_widens_range() {
        let result = import_reader(
            Cursor::new("0 0 0 0\n0 0 0 1\n0 0 0 inf\n"),
            &text_options("xyzs", 0.5),
        )
        .unwrap();

        assert_eq!(result.scalar_range, Some((0.0, f32::INFINITY)));
        let palette = Palette::cool_to_warm();
        let [r0, g0, b0] = palette.first();
        let [r1, g1, b1] = palette.last();
        assert_eq!(
            result.colors,
            Some(vec![[r0, g0, b0, 1.0], [r0, g0, b0, 1.0], [r1, g1, b1, 1.0]])
        );
    }

    #[test]
    fn test_truncated_text_fails() {
        let err = import_reader(Cursor::new("0 0 0\n1 1"), &text_options("xyzr", 0.5)).unwrap_err();
        assert!(matches!(err, ImportError::MalformedRecord { .. }));
    }

    #[test]
    fn test_missing_axis_fails() {
        let err = import_reader(Cursor::new("0 0"), &text_options("xy", 0.5)).unwrap_err();
        assert!(matches!(err, ImportError::Format(_)));
    }

    #[test]
    fn test_zero_radius_fails() {
        let err = import_reader(Cursor::new("0 0 0"), &text_options("xyz", 0.0)).unwrap_err();
        assert!(matches!(err, ImportError::Config(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = import_file("/definitely/not/here.xyz", &ImportOptions::default()).unwrap_err();
        assert!(matches!(err, ImportError::Io { .. }));
    }

    #[test]
    fn test_import_binary_file_into_scene() {
        let mut file = NamedTempFile::new().unwrap();
        for v in [0.0f32, 0.0, 0.0, 5.0, 2.0, 2.0, 2.0, 15.0, 4.0, 4.0, 4.0, 10.0] {
            file.write_all(&v.to_ne_bytes()).unwrap();
        }
        file.flush().unwrap();

        let options = ImportOptions {
            radius: 1.0,
            format: "xyzs".to_string(),
            ascii: false,
        };
        let mut world = Node::world();
        let summary = import_points(file.path(), &options, &mut world).unwrap();

        assert_eq!(summary.num_spheres, 3);
        assert!(summary.has_colors);
        assert_eq!(summary.scalar_range, Some((5.0, 15.0)));
        assert_eq!(summary.bounds.lower, [-1.0, -1.0, -1.0]);
        assert_eq!(summary.bounds.upper, [5.0, 5.0, 5.0]);

        let node = world.child(SPHERES_NODE).unwrap();
        assert_eq!(node.type_tag(), SPHERES_TYPE);
        match node.buffer(SPHERE_DATA).unwrap().data() {
            BufferData::Spheres(spheres) => assert_eq!(spheres[1], Sphere::new([2.0, 2.0, 2.0], 1.0)),
            other => panic!("Expected sphere data, got {:?}", other),
        }
        match node.buffer(COLOR_DATA).unwrap().data() {
            BufferData::Colors(colors) => {
                assert_eq!(colors.len(), 3);
                let [r, g, b] = Palette::cool_to_warm().colors()[1];
                assert_eq!(colors[2], [r, g, b, 1.0]);
            }
            other => panic!("Expected color data, got {:?}", other),
        }
    }

    #[test]
    fn test_reimport_replaces_buffers() {
        let mut first = NamedTempFile::new().unwrap();
        writeln!(first, "0 0 0 1\n1 1 1 2").unwrap();
        first.flush().unwrap();
        let mut second = NamedTempFile::new().unwrap();
        writeln!(second, "5 5 5").unwrap();
        second.flush().unwrap();

        let mut world = Node::world();
        import_points(first.path(), &text_options("xyzs", 0.5), &mut world).unwrap();
        import_points(second.path(), &text_options("xyz", 0.5), &mut world).unwrap();

        assert_eq!(world.children().len(), 1);
        let node = world.child(SPHERES_NODE).unwrap();
        assert_eq!(node.buffers().len(), 1);
        assert_eq!(node.buffer(SPHERE_DATA).unwrap().data().len(), 1);
        assert!(node.buffer(COLOR_DATA).is_none());
    }

    #[test]
    fn test_failed_import_attaches_nothing() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "0 0 0\n1 1").unwrap();
        file.flush().unwrap();

        let mut world = Node::world();
        let result = import_points(file.path(), &text_options("xyzr", 0.5), &mut world);

        assert!(result.is_err());
        assert!(world.children().is_empty());
    }
}
