use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use hough_lines::core::level_from_verbosity;
use hough_lines::detect::run_config;
use hough_lines::io::{HoughDetectConfig, HoughIoError};
use hough_lines::ToleranceMode;

#[derive(Parser, Debug)]
#[command(name = "hough-lines", version, about = "Detect straight lines with the Hough transform")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Detect lines in an image and print them.
    Detect(DetectArgs),
    /// Print a default JSON configuration.
    DefaultConfig {
        /// Image path written into the config.
        #[arg(default_value = "input.png")]
        image: String,
    },
}

#[derive(Args, Debug)]
struct DetectArgs {
    /// Input image; bright pixels are treated as points.
    image: Option<PathBuf>,
    /// JSON config; command-line flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    threshold: Option<u32>,
    /// Clustering tolerance in degrees.
    #[arg(long)]
    tolerance_t: Option<f64>,
    /// Distance tolerance in pixels (only used with --separate-tolerances).
    #[arg(long)]
    tolerance_r: Option<f64>,
    /// Angle subdivisions per degree.
    #[arg(long)]
    precision: Option<u32>,
    /// Maximum number of lines (0 = 500).
    #[arg(long)]
    max_lines: Option<usize>,
    /// Compare distances against --tolerance-r instead of the angle tolerance.
    #[arg(long)]
    separate_tolerances: bool,
    #[arg(long)]
    luma_threshold: Option<u8>,
    /// Write a JSON report.
    #[arg(long)]
    report: Option<PathBuf>,
    /// Write the accumulator heat map.
    #[arg(long)]
    accumulator: Option<PathBuf>,
    /// Write the detected lines drawn over the background image.
    #[arg(long)]
    overlay: Option<PathBuf>,
    /// Background for --overlay (defaults to the input image).
    #[arg(long)]
    background: Option<PathBuf>,
    /// Background pixels per input pixel.
    #[arg(long)]
    scale: Option<f64>,
    /// Skip drawing lines with |slope| below this value.
    #[arg(long)]
    min_abs_slope: Option<f64>,
    /// Skip drawing lines with |intercept| below this value.
    #[arg(long)]
    min_abs_intercept: Option<f64>,
}

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error("no input image: pass IMAGE or --config")]
    MissingImage,
    #[error(transparent)]
    Io(#[from] HoughIoError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

fn path_string(p: PathBuf) -> String {
    p.to_string_lossy().into_owned()
}

fn build_config(args: DetectArgs) -> Result<HoughDetectConfig, CliError> {
    let mut cfg = match (&args.config, &args.image) {
        (Some(path), _) => HoughDetectConfig::load_json(path)?,
        (None, Some(image)) => HoughDetectConfig::new(image.to_string_lossy()),
        (None, None) => return Err(CliError::MissingImage),
    };
    if let Some(image) = args.image {
        cfg.image_path = path_string(image);
    }

    let params = &mut cfg.params;
    if let Some(v) = args.threshold {
        params.threshold = v;
    }
    if let Some(v) = args.tolerance_t {
        params.tolerance_t = v;
    }
    if let Some(v) = args.tolerance_r {
        params.tolerance_r = v;
    }
    if let Some(v) = args.precision {
        params.precision = v;
    }
    if let Some(v) = args.max_lines {
        params.max_lines = v;
    }
    if args.separate_tolerances {
        params.tolerance_mode = ToleranceMode::Separate;
    }
    if let Some(v) = args.luma_threshold {
        cfg.luma_threshold = v;
    }

    cfg.report_path = args.report.map(path_string).or(cfg.report_path);
    cfg.accumulator_path = args.accumulator.map(path_string).or(cfg.accumulator_path);
    cfg.overlay_path = args.overlay.map(path_string).or(cfg.overlay_path);
    cfg.background_path = args.background.map(path_string).or(cfg.background_path);
    if let Some(v) = args.scale {
        cfg.overlay.scale = v;
    }
    if args.min_abs_slope.is_some() {
        cfg.overlay.min_abs_slope = args.min_abs_slope;
    }
    if args.min_abs_intercept.is_some() {
        cfg.overlay.min_abs_intercept = args.min_abs_intercept;
    }
    Ok(cfg)
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Detect(args) => {
            let cfg = build_config(args)?;
            let run = run_config(&cfg)?;
            print!("{}", run.description);
            println!(
                "{} lines from {} points",
                run.report.lines.len(),
                run.report.num_points
            );
        }
        Command::DefaultConfig { image } => {
            let cfg = HoughDetectConfig::new(image);
            println!("{}", serde_json::to_string_pretty(&cfg)?);
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let level = level_from_verbosity(cli.verbose);
    #[cfg(feature = "tracing")]
    hough_lines::core::init_tracing(level, false);
    #[cfg(not(feature = "tracing"))]
    let _ = hough_lines::core::init_with_level(level);
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
