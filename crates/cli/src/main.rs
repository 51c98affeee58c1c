use std::path::PathBuf;
use std::process;

use clap::Parser;

use facecount_core::detection::domain::detection_order::DetectionOrder;
use facecount_core::input::infrastructure::json_detection_reader::JsonDetectionReader;
use facecount_core::pipeline::batch_executor::{BatchExecutor, ImageOutcome};
use facecount_core::pipeline::count_images_use_case::{BatchSummary, CountImagesUseCase};
use facecount_core::pipeline::count_individuals_use_case::CountConfig;
use facecount_core::pipeline::infrastructure::sequential_batch_executor::SequentialBatchExecutor;
use facecount_core::pipeline::infrastructure::threaded_batch_executor::ThreadedBatchExecutor;
use facecount_core::pipeline::pipeline_logger::SummaryPipelineLogger;
use facecount_core::shared::constants::{CLI_DISTANCE_THRESHOLD, DEFAULT_IOU_THRESHOLD};

/// Count distinct individuals in face detection results.
#[derive(Parser)]
#[command(name = "facecount")]
struct Cli {
    /// Detection JSON file, batch file, or directory of JSON files.
    input: PathBuf,

    /// Boxes overlapping more than this IoU are one face (0.0-1.0).
    #[arg(long, default_value_t = DEFAULT_IOU_THRESHOLD)]
    iou_threshold: f64,

    /// Descriptor distance below which two faces are the same person.
    #[arg(long, default_value_t = CLI_DISTANCE_THRESHOLD)]
    distance_threshold: f64,

    /// Detection order before deduplication: input or confidence.
    #[arg(long, default_value = "input")]
    order: String,

    /// Worker threads (1 = count images sequentially).
    #[arg(long, default_value = "1")]
    workers: usize,

    /// Print the full summary as JSON instead of text.
    #[arg(long)]
    json: bool,
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
    let config = count_config(&cli)?;

    log::info!(
        "Counting {} (iou {}, distance {}, order {}, {} worker(s))",
        cli.input.display(),
        config.iou_threshold,
        config.distance_threshold,
        config.order,
        cli.workers
    );

    let executor: Box<dyn BatchExecutor> = if cli.workers > 1 {
        Box::new(ThreadedBatchExecutor::new(cli.workers))
    } else {
        Box::new(SequentialBatchExecutor)
    };

    let show_progress = !cli.json;
    let progress: Box<dyn Fn(usize, usize) -> bool + Send> = Box::new(move |current, total| {
        if show_progress {
            eprint!("\rCounting image {current}/{total}");
        }
        true
    });

    let mut use_case = CountImagesUseCase::new(
        Box::new(JsonDetectionReader::new()),
        executor,
        Box::new(SummaryPipelineLogger::default()),
        config,
        Some(progress),
    );
    let summary = use_case.execute(&cli.input)?;
    if show_progress && !summary.images.is_empty() {
        eprintln!();
    }
    log::info!(
        "Counted {} image(s): {} individual(s), {} failed",
        summary.images.len(),
        summary.total_individuals,
        summary.failed
    );

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_results(&summary);
    }
    Ok(())
}

fn print_results(summary: &BatchSummary) {
    if summary.images.is_empty() {
        println!("No images found in input.");
        return;
    }

    println!("========== RESULTS ==========\n");
    for image in &summary.images {
        match &image.outcome {
            ImageOutcome::Counted(report) => {
                println!("{}: {} individual(s)", image.name, report.individuals());
            }
            ImageOutcome::Failed { error } => {
                println!("{}: 0 individual(s) (error: {error})", image.name);
            }
        }
    }
    println!("\nTotal: {} individual(s)", summary.total_individuals);
    if summary.failed > 0 {
        println!("Failed: {} image(s)", summary.failed);
    }
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if !cli.input.exists() {
        return Err(format!("Input not found: {}", cli.input.display()).into());
    }
    if cli.workers == 0 {
        return Err("Workers must be at least 1".into());
    }
    Ok(())
}

fn count_config(cli: &Cli) -> Result<CountConfig, Box<dyn std::error::Error>> {
    let config = CountConfig {
        iou_threshold: cli.iou_threshold,
        distance_threshold: cli.distance_threshold,
        order: cli.order.parse::<DetectionOrder>()?,
    };
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("facecount").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = count_config(&parse(&["detections.json"])).unwrap();
        assert_eq!(config.iou_threshold, DEFAULT_IOU_THRESHOLD);
        assert_eq!(config.distance_threshold, CLI_DISTANCE_THRESHOLD);
        assert_eq!(config.order, DetectionOrder::Input);
    }

    #[test]
    fn test_confidence_order() {
        let config = count_config(&parse(&["in.json", "--order", "confidence"])).unwrap();
        assert_eq!(config.order, DetectionOrder::Confidence);
    }

    #[test]
    fn test_out_of_range_iou_rejected() {
        let err = count_config(&parse(&["in.json", "--iou-threshold", "1.5"])).unwrap_err();
        assert!(err.to_string().contains("IoU threshold"), "{err}");
    }

    #[test]
    fn test_negative_distance_rejected() {
        let err = count_config(&parse(&["in.json", "--distance-threshold=-0.1"])).unwrap_err();
        assert!(err.to_string().contains("distance threshold"), "{err}");
    }

    #[test]
    fn test_unknown_order_rejected() {
        assert!(count_config(&parse(&["in.json", "--order", "random"])).is_err());
    }

    #[test]
    fn test_missing_input_rejected() {
        let err = validate(&parse(&["/nonexistent/detections.json"])).unwrap_err();
        assert!(err.to_string().contains("Input not found"));
    }

    #[test]
    fn test_zero_workers_rejected() {
        let cli = parse(&[env!("CARGO_MANIFEST_DIR"), "--workers", "0"]);
        assert_eq!(validate(&cli).unwrap_err().to_string(), "Workers must be at least 1");
    }
}
