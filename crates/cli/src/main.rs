use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use clap::Parser;

use eyepong_core::annotation::domain::frame_processor::FrameProcessor;
use eyepong_core::annotation::domain::highlight_style::HighlightStyle;
use eyepong_core::annotation::infrastructure::eye_highlighter::EyeHighlighter;
use eyepong_core::detection::domain::detection_params::DetectionParams;
use eyepong_core::detection::infrastructure::detector_set::DetectorSet;
use eyepong_core::pipeline::annotate_image_use_case::AnnotateImageUseCase;
use eyepong_core::pipeline::annotate_sequence_use_case::AnnotateSequenceUseCase;
use eyepong_core::pipeline::infrastructure::threaded_pipeline_executor::ThreadedPipelineExecutor;
use eyepong_core::pipeline::pipeline_logger::StdoutPipelineLogger;
use eyepong_core::shared::constants::{EYE_CASCADE_NAME, FACE_CASCADE_NAME, IMAGE_EXTENSIONS};
use eyepong_core::video::infrastructure::image_file_reader::ImageFileReader;
use eyepong_core::video::infrastructure::image_file_writer::ImageFileWriter;
use eyepong_core::video::infrastructure::image_sequence_reader::ImageSequenceReader;
use eyepong_core::video::infrastructure::image_sequence_writer::ImageSequenceWriter;

/// Draws translucent green boxes around the eyes found in images.
#[derive(Parser)]
#[command(name = "eyepong-annotate")]
struct Cli {
    /// Input image file, or a directory of images.
    input: PathBuf,

    /// Output image file, or a directory when the input is a directory.
    output: PathBuf,

    /// Scale step of the face search (must be > 1.0).
    #[arg(long, default_value = "1.2")]
    face_scale_factor: f64,

    /// Neighbors a face candidate needs to be kept.
    #[arg(long, default_value = "5")]
    face_min_neighbors: u32,

    /// Scale step of the eye search inside each face (must be > 1.0).
    #[arg(long, default_value = "1.1")]
    eye_scale_factor: f64,

    /// Neighbors an eye candidate needs to be kept.
    #[arg(long, default_value = "6")]
    eye_min_neighbors: u32,

    /// Weight of the highlight layer when blended over the image (0.0-1.0).
    #[arg(long, default_value = "0.35")]
    opacity: f32,

    /// Directory holding the face and eye cascade XML files. When omitted
    /// the stock cascades are looked up in the cache and downloaded if needed.
    #[arg(long)]
    cascade_dir: Option<PathBuf>,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let detectors = build_detectors(&cli)?;
    let style = HighlightStyle::default().with_overlay_weight(cli.opacity);
    let processor: Arc<dyn FrameProcessor> =
        Arc::new(EyeHighlighter::new(Arc::new(detectors), style));

    if cli.input.is_dir() {
        run_directory(&cli.input, &cli.output, processor)
    } else {
        run_image(&cli.input, &cli.output, processor)
    }
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if !cli.input.exists() {
        return Err(format!("Input not found: {}", cli.input.display()).into());
    }
    if cli.input.is_file() && !is_image(&cli.input) {
        return Err(format!(
            "Unsupported input type: {} (expected one of {})",
            cli.input.display(),
            IMAGE_EXTENSIONS.join(", ")
        )
        .into());
    }
    if cli.input.is_file() && !is_image(&cli.output) {
        return Err(format!(
            "Output must be an image file when the input is an image: {}",
            cli.output.display()
        )
        .into());
    }
    if cli.input.is_dir() && cli.output.is_file() {
        return Err(format!(
            "Output must be a directory when the input is a directory: {}",
            cli.output.display()
        )
        .into());
    }
    face_params(cli).validate()?;
    eye_params(cli).validate()?;
    HighlightStyle::default()
        .with_overlay_weight(cli.opacity)
        .validate()?;
    if let Some(dir) = &cli.cascade_dir {
        if !dir.is_dir() {
            return Err(format!("Cascade directory not found: {}", dir.display()).into());
        }
    }
    Ok(())
}

fn face_params(cli: &Cli) -> DetectionParams {
    DetectionParams::new(cli.face_scale_factor, cli.face_min_neighbors)
}

fn eye_params(cli: &Cli) -> DetectionParams {
    DetectionParams::new(cli.eye_scale_factor, cli.eye_min_neighbors)
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn build_detectors(cli: &Cli) -> Result<DetectorSet, Box<dyn std::error::Error>> {
    if let Some(dir) = &cli.cascade_dir {
        log::info!("Loading cascades from {}", dir.display());
        return Ok(DetectorSet::load(
            &dir.join(FACE_CASCADE_NAME),
            &dir.join(EYE_CASCADE_NAME),
            face_params(cli),
            eye_params(cli),
        )?);
    }

    let detectors = DetectorSet::resolve(
        None,
        face_params(cli),
        eye_params(cli),
        Some(Box::new(download_progress)),
    )
    .map_err(|e| e.to_string())?;
    Ok(detectors)
}

fn run_image(
    input: &Path,
    output: &Path,
    processor: Arc<dyn FrameProcessor>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut use_case = AnnotateImageUseCase::new(
        Box::new(ImageFileReader::new()),
        Box::new(ImageFileWriter::new()),
        processor,
        Box::new(StdoutPipelineLogger::default()),
    );
    use_case.execute(input, output)?;
    eprintln!("Done. Output saved to {}", output.display());
    Ok(())
}

fn run_directory(
    input: &Path,
    output: &Path,
    processor: Arc<dyn FrameProcessor>,
) -> Result<(), Box<dyn std::error::Error>> {
    let use_case = AnnotateSequenceUseCase::new(
        Box::new(ImageSequenceReader::new()),
        Box::new(ImageSequenceWriter::new(Box::new(ImageFileWriter::new()))),
        processor,
        Box::new(ThreadedPipelineExecutor::new()),
        Box::new(StdoutPipelineLogger::default()),
    );

    use_case.execute(
        input,
        output,
        Arc::new(AtomicBool::new(false)),
        Some(Box::new(|current, total| {
            eprint!("\rAnnotating image {current}/{total}");
            true
        })),
    )?;
    eprintln!("\nDone. Output saved to {}", output.display());
    Ok(())
}

fn download_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading cascade... {pct}%");
    } else {
        eprint!("\rDownloading cascade... {downloaded} bytes");
    }
}
