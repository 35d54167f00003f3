//! beadcal CLI — batch bead detection on dual-view calibration slides.

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use beadcal::{
    list_calibration_images, process_image, run_batch, CompositeReporter, DetectConfig,
    DualViewImage, PlotReporter, TsvReporter,
};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "beadcal")]
#[command(
    about = "Detect fluorescent bead pairs in dual-view (donor/acceptor) calibration images"
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process every calibration image in a directory.
    Run(CliRunArgs),

    /// Detect pairs in a single image and write the result as JSON.
    Detect {
        /// Path to the input image.
        #[arg(long)]
        image: PathBuf,

        /// Path to write the detection result (JSON).
        #[arg(long)]
        out: PathBuf,

        #[command(flatten)]
        detect: CliDetectArgs,
    },
}

#[derive(Debug, Clone, Args)]
struct CliRunArgs {
    /// Directory containing calibration images (.tif/.tiff/.png).
    #[arg(long, default_value = ".")]
    dir: PathBuf,

    /// Directory for the result table and plots (defaults to --dir).
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Write an overlay plot PNG per processed image.
    #[arg(long)]
    plot: bool,

    /// Write the run-wide aggregate scatter plot.
    #[arg(long)]
    aggregate_plot: bool,

    /// Path to additionally dump the full batch result as JSON.
    #[arg(long)]
    json: Option<PathBuf>,

    #[command(flatten)]
    detect: CliDetectArgs,
}

#[derive(Debug, Clone, Args)]
struct CliDetectArgs {
    /// Contrast threshold for the donor (left) channel.
    #[arg(long, default_value = "300")]
    threshold_donor: u16,

    /// Contrast threshold for the acceptor (right) channel.
    #[arg(long, default_value = "300")]
    threshold_acceptor: u16,

    /// Side length of the peak-detection neighborhood (pixels).
    #[arg(long, default_value = "5")]
    neighborhood: usize,

    /// Matching radius between donor and acceptor peaks (pixels).
    #[arg(long, default_value = "10.0")]
    max_distance: f64,
}

impl CliDetectArgs {
    fn to_config(&self) -> DetectConfig {
        DetectConfig {
            threshold_donor: self.threshold_donor,
            threshold_acceptor: self.threshold_acceptor,
            neighborhood: self.neighborhood,
            max_distance: self.max_distance,
        }
    }
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => run_directory(&args),
        Commands::Detect { image, out, detect } => run_single(&image, &out, &detect),
    }
}

// ── run ────────────────────────────────────────────────────────────────

fn run_directory(args: &CliRunArgs) -> CliResult<()> {
    let config = args.detect.to_config();
    let out_dir = args.out_dir.as_deref().unwrap_or(&args.dir);
    if !out_dir.exists() {
        std::fs::create_dir_all(out_dir)?;
    }

    let paths = list_calibration_images(&args.dir)?;
    if paths.is_empty() {
        tracing::warn!("No calibration images found in {}", args.dir.display());
    } else {
        tracing::info!(
            "Found {} calibration images in {}",
            paths.len(),
            args.dir.display()
        );
    }

    let tsv = TsvReporter::create(out_dir)?;
    let table_path = tsv.path().to_path_buf();
    let mut reporter = CompositeReporter::new();
    reporter.push(Box::new(tsv));
    if args.plot || args.aggregate_plot {
        reporter.push(Box::new(PlotReporter::with_outputs(
            out_dir,
            args.plot,
            args.aggregate_plot,
        )));
    }

    let batch = run_batch(&paths, &config, &mut reporter)?;

    tracing::info!(
        "Result table written to {} ({} pairs from {} images)",
        table_path.display(),
        batch.aggregate.len(),
        batch.images.len(),
    );

    if let Some(json_path) = &args.json {
        let json = serde_json::to_string_pretty(&batch)?;
        std::fs::write(json_path, &json)?;
        tracing::info!("Batch JSON written to {}", json_path.display());
    }

    Ok(())
}

// ── detect ─────────────────────────────────────────────────────────────

fn run_single(image_path: &Path, out_path: &Path, detect: &CliDetectArgs) -> CliResult<()> {
    let config = detect.to_config();
    config.validate()?;

    tracing::info!("Loading image: {}", image_path.display());
    let image = DualViewImage::load(image_path)?;
    let [w, h] = image.channel_size();
    tracing::info!("Channel size: {}x{}", w, h);

    let result = process_image(&image, &config, image_path);
    tracing::info!(
        "{} donor peaks, {} acceptor peaks, {} candidates, {} cleaned pairs",
        result.donor_peaks.len(),
        result.acceptor_peaks.len(),
        result.candidates.len(),
        result.cleaned.len(),
    );

    let json = serde_json::to_string_pretty(&result)?;
    std::fs::write(out_path, &json)?;
    tracing::info!("Results written to {}", out_path.display());

    Ok(())
}
