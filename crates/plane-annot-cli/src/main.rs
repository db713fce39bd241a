//! plane-annot CLI — inspect calibrations, rectify frames, manage labels.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use plane_annot::core::init_with_level;
use plane_annot::{rectify, CalibrationStore, GrayFrameView, LabelVocabulary, QuadState};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "plane-annot")]
#[command(about = "Planar rectification and label-store utilities for inspection captures")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rectify an image through a locked calibration.
    Rectify(RectifyArgs),

    /// Print the state of a calibration point file.
    CalibInfo {
        /// Calibration point file (JSON array of four [x, y] pairs).
        #[arg(long)]
        calib: PathBuf,
    },

    /// Inspect or extend a label list file.
    Labels(LabelsArgs),
}

#[derive(Debug, Clone, Args)]
struct RectifyArgs {
    /// Input image (any format the image crate decodes; converted to gray).
    #[arg(long)]
    image: PathBuf,

    /// Calibration point file.
    #[arg(long)]
    calib: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Debug, Clone, Args)]
struct LabelsArgs {
    /// Label list file, one label per line.
    #[arg(long)]
    file: PathBuf,

    #[command(subcommand)]
    action: LabelsAction,
}

#[derive(Debug, Clone, Subcommand)]
enum LabelsAction {
    /// Print every label with its class index.
    List,
    /// Register a label (no-op if already present) and print its index.
    Add { name: String },
}

fn cmd_rectify(args: &RectifyArgs) -> CliResult<()> {
    let store = CalibrationStore::open(&args.calib);
    if !store.is_locked() {
        return Err(format!("no locked calibration in {}", args.calib.display()).into());
    }

    let img = image::ImageReader::open(&args.image)?.decode()?.to_luma8();
    let view = GrayFrameView {
        width: img.width() as usize,
        height: img.height() as usize,
        data: img.as_raw(),
    };

    let rect = rectify(&view, store.quad())?;
    let out = image::GrayImage::from_raw(
        rect.frame.width as u32,
        rect.frame.height as u32,
        rect.frame.data,
    )
    .ok_or("rectified buffer size mismatch")?;
    out.save(&args.out)?;
    println!(
        "rectified {} -> {} ({}x{})",
        args.image.display(),
        args.out.display(),
        out.width(),
        out.height()
    );
    Ok(())
}

fn cmd_calib_info(calib: &PathBuf) -> CliResult<()> {
    let store = CalibrationStore::open(calib);
    match store.quad().state() {
        QuadState::Empty => println!("uncalibrated"),
        QuadState::Collecting(n) => println!("collecting ({n}/4 points)"),
        QuadState::Locked => {
            let (w, h) = store.quad().target_size().expect("locked quad has a size");
            println!("locked, target {w}x{h}");
            for (name, p) in ["tl", "tr", "br", "bl"].iter().zip(store.quad().points()) {
                println!("  {name}: ({}, {})", p.x, p.y);
            }
        }
    }
    Ok(())
}

fn cmd_labels(args: &LabelsArgs) -> CliResult<()> {
    let mut vocab = LabelVocabulary::open(&args.file);
    match &args.action {
        LabelsAction::List => {
            for (index, label) in vocab.labels().iter().enumerate() {
                println!("{index} {label}");
            }
        }
        LabelsAction::Add { name } => match vocab.add(name)? {
            Some(index) => println!("{index} {name}"),
            None => return Err("label name must not be empty".into()),
        },
    }
    Ok(())
}

fn main() -> CliResult<()> {
    let _ = init_with_level(log::LevelFilter::Info);
    let cli = Cli::parse();
    match &cli.command {
        Commands::Rectify(args) => cmd_rectify(args),
        Commands::CalibInfo { calib } => cmd_calib_info(calib),
        Commands::Labels(args) => cmd_labels(args),
    }
}
