//! Command-line interface for the points importer.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::core::writers;
use crate::processors::import::{import_file, ImportResult};
use crate::ImportOptions;

#[derive(Parser)]
#[command(name = "points-import")]
#[command(about = "Import sphere point clouds from binary or text records", version)]
pub struct Cli {
    /// Path to YAML config file with import options
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every command that reads a points file.
#[derive(Args)]
struct InputArgs {
    /// Points file to import
    input: PathBuf,
    /// Record layout, one character per float (x, y, z, r, s)
    #[arg(short, long)]
    format: Option<String>,
    /// Radius for spheres when the format has no 'r' field
    #[arg(short, long)]
    radius: Option<f32>,
    /// Read whitespace-separated text instead of binary floats
    #[arg(long)]
    ascii: bool,
}

impl InputArgs {
    /// Applies command-line overrides on top of the loaded options.
    fn options(&self, base: &ImportOptions) -> ImportOptions {
        ImportOptions {
            radius: self.radius.unwrap_or(base.radius),
            format: self.format.clone().unwrap_or_else(|| base.format.clone()),
            ascii: self.ascii || base.ascii,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Import a points file and report what was read
    Import {
        #[command(flatten)]
        input: InputArgs,
        /// Export spheres (and colors) to an ASCII PLY file
        #[arg(long)]
        ply: Option<PathBuf>,
        /// Export spheres (and colors) to a CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Plot imported sphere centers as a 2D scatter plot (PNG)
    Visualize {
        #[command(flatten)]
        input: InputArgs,
        /// Output PNG file path (defaults to same name as input with .png extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Maximum number of points to plot (subsamples if exceeded)
        #[arg(long, default_value_t = 1_000_000)]
        max_points: usize,
        /// Alpha/transparency value for points (0.0 to 1.0)
        #[arg(long, default_value_t = 0.5)]
        alpha: f32,
    },
}

/// Create a spinner for indeterminate operations
fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

/// Print a summary box
fn print_summary(title: &str, items: &[(&str, String)]) {
    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║ {:<60} ║", title);
    println!("╠══════════════════════════════════════════════════════════════╣");
    for (key, value) in items {
        let display_value = if value.chars().count() > 39 {
            format!("{}...", value.chars().take(36).collect::<String>())
        } else {
            value.clone()
        };
        println!("║ {:<19}: {:<39} ║", key, display_value);
    }
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();
}

pub fn run() {
    let cli = Cli::parse();

    // Initialize logging based on verbosity (must come first)
    env_logger::Builder::new()
        .filter_level(match cli.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        })
        .format_timestamp_secs()
        .init();

    // Load config
    let config = match &cli.config {
        Some(path) => match ImportOptions::from_yaml(path) {
            Ok(cfg) => {
                info!("Loaded config from: {}", path.display());
                cfg
            }
            Err(e) => {
                warn!("Failed to load config from {}: {}, using defaults", path.display(), e);
                ImportOptions::default()
            }
        },
        None => ImportOptions::default(),
    };

    let outcome = match cli.command {
        Commands::Import { input, ply, csv } => {
            cmd_import(&input.input, &input.options(&config), ply.as_deref(), csv.as_deref())
        }
        Commands::Visualize { input, output, max_points, alpha } => {
            cmd_visualize(&input.input, &input.options(&config), output, max_points, alpha)
        }
    };

    if let Err(e) = outcome {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

/// Runs the import behind a spinner.
fn load(input: &Path, options: &ImportOptions) -> Result<ImportResult> {
    let spinner = create_spinner("Importing points...");
    let result = import_file(input, options);
    spinner.finish_and_clear();

    result.with_context(|| format!("Import failed for {}", input.display()))
}

fn scalar_range_label(result: &ImportResult) -> String {
    match result.scalar_range {
        Some((lo, hi)) => format!("[{}, {}]", lo, hi),
        None => "none".to_string(),
    }
}

fn cmd_import(
    input: &Path,
    options: &ImportOptions,
    ply: Option<&Path>,
    csv: Option<&Path>,
) -> Result<()> {
    let start = Instant::now();

    let result = load(input, options)?;
    let colors = result.colors.as_deref();

    if let Some(path) = ply {
        writers::write_ply(path, &result.spheres, colors)
            .with_context(|| format!("PLY export failed: {}", path.display()))?;
        info!("PLY -> {}", path.display());
    }

    if let Some(path) = csv {
        writers::write_spheres_csv(path, &result.spheres, colors)
            .with_context(|| format!("CSV export failed: {}", path.display()))?;
        info!("CSV -> {}", path.display());
    }

    print_summary(
        "Import Complete",
        &[
            ("Input file", input.display().to_string()),
            ("Format", options.format.clone()),
            ("Encoding", format!("{:?}", options.encoding())),
            ("Points", result.len().to_string()),
            ("Bounds", result.bounds.to_string()),
            ("Colors", result.colors.is_some().to_string()),
            ("Scalar range", scalar_range_label(&result)),
            ("Duration", format!("{:.2?}", start.elapsed())),
        ],
    );

    Ok(())
}

fn cmd_visualize(
    input: &Path,
    options: &ImportOptions,
    output: Option<PathBuf>,
    max_points: usize,
    alpha: f32,
) -> Result<()> {
    use crate::visualization;

    let start = Instant::now();

    // Determine output path (default to same name as input with .png extension)
    let output_path = output.unwrap_or_else(|| input.with_extension("png"));

    let result = load(input, options)?;

    let spinner = create_spinner("Generating plot...");
    let plotted = visualization::plot_spheres(
        &output_path,
        &result.spheres,
        result.colors.as_deref(),
        max_points,
        alpha,
    );
    spinner.finish_and_clear();
    plotted.with_context(|| format!("Visualization failed: {}", output_path.display()))?;

    print_summary(
        "Visualization Complete",
        &[
            ("Input file", input.display().to_string()),
            ("Output PNG", output_path.display().to_string()),
            ("Points", result.len().to_string()),
            ("Max points plotted", max_points.to_string()),
            ("Alpha", alpha.to_string()),
            ("Duration", format!("{:.2?}", start.elapsed())),
        ],
    );

    Ok(())
}
