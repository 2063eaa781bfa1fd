use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use callbrief_core::{
    format_timestamp, pipeline, Config, Layout, RunReport, Stage, StageStatus,
    DEFAULT_SUMMARY_MODEL, DEFAULT_TRANSCRIPTION_MODEL,
};

#[derive(Parser)]
#[command(name = "callbrief")]
#[command(
    about = "Extract audio from recorded calls, transcribe them with Whisper, and generate focused summaries"
)]
struct Cli {
    /// Data root containing the videos/ input directory
    #[arg(short, long, default_value = "data")]
    data_dir: PathBuf,

    /// Model used for transcription
    #[arg(long, default_value = DEFAULT_TRANSCRIPTION_MODEL)]
    transcription_model: String,

    /// Model used for summarization
    #[arg(long, default_value = DEFAULT_SUMMARY_MODEL)]
    summary_model: String,

    /// Override what the summaries should emphasize (default: pricing discussion)
    #[arg(long)]
    focus: Option<String>,

    /// Process at most N videos
    #[arg(short, long)]
    limit: Option<usize>,

    /// Re-run every stage even if cached output files exist
    #[arg(short, long)]
    force: bool,
}

fn create_spinner(msg: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    pb.set_message(msg);
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

fn stage_label(stage: Stage) -> &'static str {
    match stage {
        Stage::Extract => "Audio extracted",
        Stage::Transcribe => "Transcribed",
        Stage::Summarize => "Summarized",
    }
}

fn print_asset_report(report: &callbrief_core::AssetReport) {
    for (stage, status) in &report.stages {
        match (stage, status) {
            (Stage::Transcribe, StageStatus::Ran) => {
                let meta = report
                    .transcript
                    .as_ref()
                    .map(|m| format!(": {}, {}", format_timestamp(m.duration), m.language))
                    .unwrap_or_default();
                println!("  {} Transcribed{}", style("✓").green().bold(), meta);
            }
            (stage, StageStatus::Ran) => {
                println!("  {} {}", style("✓").green().bold(), stage_label(*stage));
            }
            (stage, StageStatus::Skipped) => {
                println!(
                    "  {} {} {}",
                    style("✓").green().bold(),
                    stage_label(*stage),
                    style("(cached)").dim()
                );
            }
        }
    }
    if let Some((stage, error)) = &report.failure {
        println!(
            "  {} {} failed: {}",
            style("✗").red().bold(),
            stage,
            style(error).red()
        );
    }
}

fn print_run_summary(run: &RunReport) {
    println!("\n{}", style("─".repeat(60)).dim());
    for (label, stage) in [
        ("Extraction", Stage::Extract),
        ("Transcription", Stage::Transcribe),
        ("Summaries", Stage::Summarize),
    ] {
        let summary = run.stage_summary(stage);
        println!(
            "{:<14} {} ok, {} cached, {} failed",
            label, summary.successful, summary.skipped, summary.failed
        );
    }
    if run.has_failures() {
        println!(
            "\n{} {}",
            style("Failed:").red().bold(),
            run.failed_assets.join(", ")
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "callbrief=warn".into()),
        )
        .init();

    let cli = Cli::parse();

    // Validate the credential early; without it no asset can be processed.
    let api_key = match Config::api_key_from_env() {
        Ok(key) => key,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            std::process::exit(1);
        }
    };

    let mut config = Config::new(Layout::new(&cli.data_dir), api_key);
    config.transcription_model = cli.transcription_model;
    config.summary_model = cli.summary_model;
    if let Some(focus) = cli.focus {
        config.focus = focus;
    }
    config.force = cli.force;
    config.limit = cli.limit;

    println!(
        "\n{}  {}\n",
        style("callbrief").cyan().bold(),
        style("Call Summarizer").dim()
    );

    if let Err(e) = pipeline::preflight(&config).await {
        eprintln!("{} {}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    let videos = match config.layout.discover_videos(config.limit) {
        Ok(videos) => videos,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            std::process::exit(1);
        }
    };

    if videos.is_empty() {
        println!(
            "No video files found in {}",
            config.layout.videos_dir().display()
        );
        return Ok(());
    }

    println!("Found {} video file(s)\n", videos.len());

    let mut run = RunReport::default();
    for video in &videos {
        let name = video
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let spinner = create_spinner(format!("Processing {name}..."));
        let report = pipeline::process_video(&config, video).await;
        spinner.finish_with_message(format!("{}", style(&name).bold()));

        print_asset_report(&report);
        run.record(&report);

        // A broken environment fails every remaining asset the same way.
        if let Some(error) = report.fatal_error() {
            eprintln!("\n{} {}", style("Aborting run:").red().bold(), error);
            std::process::exit(1);
        }
    }

    print_run_summary(&run);

    if run.has_failures() {
        std::process::exit(1);
    }
    Ok(())
}
