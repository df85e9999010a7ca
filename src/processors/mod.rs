//! Data processing stages.

pub mod import;

pub use import::{
    import_file, import_points, import_reader, ImportResult, ImportSummary, COLOR_DATA,
    SPHERES_NODE, SPHERES_TYPE, SPHERE_DATA,
};
