//! sga-ui - Score Grade Analysis console client
//!
//! Submits a score file to the analysis service, follows the per-channel
//! progress feed, and prints the normalized result (grade-confidence
//! markers and timeline ticks) once the completed job is acknowledged.

use anyhow::Result;
use clap::Parser;
use sga_common::api::AnalysisOptions;
use sga_common::config;
use sga_ui::client::AnalysisClient;
use sga_ui::controller::{JobController, JobOutcome};
use sga_ui::score::{extract_score_title, sniff_score_format, LogScoreWidget, ScoreFormat, ScoreWidget};
use sga_ui::surface::ConsoleSurface;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "sga-ui", about = "Score Grade Analysis client", version)]
struct Args {
    /// Score file to analyze (MusicXML or MEI)
    score_file: std::path::PathBuf,

    /// Analyze the target grade only (skip the observed-grade search)
    #[arg(long)]
    target_only: bool,

    /// Restrict analysis to string instruments
    #[arg(long)]
    strings_only: bool,

    /// Search the full half-grade range
    #[arg(long)]
    full_grade_search: bool,

    /// Target grade to analyze against
    #[arg(long, default_value_t = 2.0)]
    target_grade: f64,

    /// Analysis service URL (overrides SGA_SERVICE_URL and the config file)
    #[arg(long)]
    service_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!(
        "Starting SGA client (sga-ui) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();

    let service_url = config::resolve_service_url(args.service_url.as_deref());
    info!("Analysis service: {}", service_url);

    let options = AnalysisOptions::new(
        args.target_only,
        args.strings_only,
        args.full_grade_search,
        args.target_grade,
    )?;

    if !args.score_file.is_file() {
        anyhow::bail!(
            "Please choose a score file ({} not found)",
            args.score_file.display()
        );
    }
    let text = std::fs::read_to_string(&args.score_file)?;

    let file_name = args
        .score_file
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("score.musicxml")
        .to_string();
    let fallback_title = file_name
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or(&file_name);
    let title = extract_score_title(&text)
        .filter(|t| !t.eq_ignore_ascii_case("title"))
        .unwrap_or_else(|| fallback_title.to_string());
    info!("Score title: {}", title);

    match sniff_score_format(&text) {
        ScoreFormat::Unknown => warn!("File doesn't look like MEI or MusicXML"),
        format => info!("Score format: {:?}", format),
    }

    let mut widget = LogScoreWidget::default();
    widget.load(&text).await?;

    let client = AnalysisClient::new(service_url)?;
    let mut controller = JobController::new(client);
    let mut surface = ConsoleSurface::default();

    controller
        .submit(&file_name, text.into_bytes(), &options)
        .await?;

    match controller.run(&mut surface).await {
        Ok(JobOutcome::Completed) => {}
        Ok(JobOutcome::Superseded) => return Ok(()),
        Err(e) => {
            error!("{}", e);
            return Err(e.into());
        }
    }

    match controller.acknowledge(&mut surface) {
        Some(applied) => {
            if let Some(total) = applied.total_measures {
                info!("Measures 1 through {}", total);
            }
            for tick in &applied.ticks {
                info!(
                    "Timeline tick at measure {}: {}",
                    tick.measure,
                    tick.text().unwrap_or("")
                );
            }
        }
        None => info!("No analysis result available to apply"),
    }

    Ok(())
}
