//! Export of imported spheres to PLY and CSV.
//!
//! - PLY (ASCII) with a per-vertex radius and optional RGBA colors
//! - CSV with x, y, z, radius columns and optional r, g, b, a columns

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use thiserror::Error;

use super::colormap::to_rgba8;
use super::stream::Sphere;

/// Errors that can occur during write operations.
#[derive(Error, Debug)]
pub enum WriteError {
    /// Failed to create parent directories.
    #[error("failed to create parent directories for '{path}': {source}")]
    CreateDirectory {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to create or open file for writing.
    #[error("failed to create file '{path}': {source}")]
    CreateFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write data to file.
    #[error("failed to write to file '{path}': {source}")]
    WriteFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// CSV writing error.
    #[error("CSV write error for '{path}': {source}")]
    CsvError {
        path: String,
        #[source]
        source: csv::Error,
    },

    /// Color buffer does not line up with the spheres.
    #[error("array length mismatch: {spheres_len} spheres, {colors_len} colors")]
    LengthMismatch { spheres_len: usize, colors_len: usize },
}

/// Result type for write operations.
pub type Result<T> = std::result::Result<T, WriteError>;

fn check_lengths(spheres: &[Sphere], colors: Option<&[[f32; 4]]>) -> Result<()> {
    match colors {
        Some(c) if c.len() != spheres.len() => Err(WriteError::LengthMismatch {
            spheres_len: spheres.len(),
            colors_len: c.len(),
        }),
        _ => Ok(()),
    }
}

/// Creates parent directories for a file path if they don't exist.
fn ensure_parent_dirs(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| WriteError::CreateDirectory {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
    }
    Ok(())
}

/// Creates a buffered writer for the given path.
fn create_buffered_writer(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path).map_err(|e| WriteError::CreateFile {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(BufWriter::new(file))
}

fn ply_header(num_spheres: usize, with_colors: bool) -> String {
    let mut header = format!(
        "ply\nformat ascii 1.0\nelement vertex {}\nproperty float x\nproperty float y\nproperty float z\nproperty float radius\n",
        num_spheres
    );
    if with_colors {
        header.push_str(
            "property uchar red\nproperty uchar green\nproperty uchar blue\nproperty uchar alpha\n",
        );
    }
    header.push_str("end_header\n");
    header
}

/// Write spheres to an ASCII PLY file.
///
/// Each vertex carries its center and radius. When `colors` is given, the
/// RGBA values are written as 8-bit channels after the radius.
///
/// # Errors
///
/// Returns an error if:
/// - `colors` does not have one entry per sphere
/// - Parent directories cannot be created
/// - File cannot be created or written to
///
/// # Example
///
/// ```no_run
/// use points_import::core::stream::Sphere;
/// use points_import::core::writers::write_ply;
/// use std::path::Path;
///
/// let spheres = vec![Sphere::new([0.0, 0.0, 0.0], 0.1)];
/// write_ply(Path::new("output.ply"), &spheres, None).unwrap();
/// ```
pub fn write_ply(path: &Path, spheres: &[Sphere], colors: Option<&[[f32; 4]]>) -> Result<()> {
    check_lengths(spheres, colors)?;
    ensure_parent_dirs(path)?;
    let mut writer = create_buffered_writer(path)?;
    let path_str = path.display().to_string();
    let write_err = |e| WriteError::WriteFile {
        path: path_str.clone(),
        source: e,
    };

    writer
        .write_all(ply_header(spheres.len(), colors.is_some()).as_bytes())
        .map_err(write_err)?;

    for (i, sphere) in spheres.iter().enumerate() {
        let [x, y, z] = sphere.position;
        write!(writer, "{:.6} {:.6} {:.6} {:.6}", x, y, z, sphere.radius).map_err(write_err)?;
        if let Some(colors) = colors {
            let [r, g, b, a] = to_rgba8(colors[i]);
            write!(writer, " {} {} {} {}", r, g, b, a).map_err(write_err)?;
        }
        writeln!(writer).map_err(write_err)?;
    }

    writer.flush().map_err(write_err)?;

    Ok(())
}

/// Write spheres to CSV.
///
/// Columns are `x,y,z,radius`, followed by `r,g,b,a` (unit range) when
/// colors are given.
///
/// # Errors
///
/// Returns an error if:
/// - `colors` does not have one entry per sphere
/// - Parent directories cannot be created
/// - File cannot be created or written to
pub fn write_spheres_csv(path: &Path, spheres: &[Sphere], colors: Option<&[[f32; 4]]>) -> Result<()> {
    check_lengths(spheres, colors)?;
    ensure_parent_dirs(path)?;

    let buf_writer = create_buffered_writer(path)?;
    let mut csv_writer = csv::Writer::from_writer(buf_writer);
    let path_str = path.display().to_string();
    let csv_err = |e| WriteError::CsvError {
        path: path_str.clone(),
        source: e,
    };

    let mut header = vec!["x", "y", "z", "radius"];
    if colors.is_some() {
        header.extend(["r", "g", "b", "a"]);
    }
    csv_writer.write_record(&header).map_err(csv_err)?;

    let mut row: Vec<String> = Vec::with_capacity(header.len());
    for (i, sphere) in spheres.iter().enumerate() {
        row.clear();
        row.extend(sphere.position.iter().map(|c| format!("{:.6}", c)));
        row.push(format!("{:.6}", sphere.radius));
        if let Some(colors) = colors {
            row.extend(colors[i].iter().map(|c| format!("{:.6}", c)));
        }
        csv_writer.write_record(&row).map_err(csv_err)?;
    }

    csv_writer.flush().map_err(|e| WriteError::WriteFile {
        path: path_str.clone(),
        source: e,
    })?;

    Ok(())
}
