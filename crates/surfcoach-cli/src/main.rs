//! Surfcoach CLI
//!
//! Submits a surf video to the analysis backend, watches the session until
//! it completes, saves the technique report and opens a chat with the coach.

use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tokio::io::AsyncBufReadExt;
use tracing_subscriber::EnvFilter;

use surfcoach_client::{
    validate_video, CoachApi, HttpClient, SessionReport, VideoUpload, DEFAULT_SERVER_URL,
};
use surfcoach_report::{MarkdownGenerator, SeverityCounts};
use surfcoach_session::{ChatSession, LifecycleController, LifecycleState, SendOutcome};

/// Surfcoach - AI Surf Technique Analysis
///
/// Uploads a surf session video to the analysis backend, tracks the analysis
/// to completion, renders the technique report and lets you ask the AI coach
/// follow-up questions.
#[derive(Parser, Debug)]
#[command(name = "surfcoach")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the surf session video
    #[arg(value_name = "VIDEO")]
    video: PathBuf,

    /// Surfer name to attach to the session
    #[arg(short, long, value_name = "NAME")]
    name: Option<String>,

    /// Skill level (beginner, intermediate, advanced)
    #[arg(short, long, value_name = "LEVEL")]
    skill_level: Option<String>,

    /// Backend server address
    #[arg(long, value_name = "URL", default_value = DEFAULT_SERVER_URL)]
    server: String,

    /// Output directory for the Markdown report
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    output: PathBuf,

    /// Skip the interactive chat after the report
    #[arg(long)]
    no_chat: bool,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if args.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::debug!(video = %args.video.display(), server = %args.server, "Surfcoach starting");

    match run_flow(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}

/// Runs the full upload → analysis → report → chat flow.
async fn run_flow(args: Args) -> anyhow::Result<()> {
    // Local validation first; an unsupported or oversized file never
    // produces a request.
    validate_video(&args.video)
        .await
        .map_err(|e| anyhow::anyhow!("{}", e.message()))?;

    let client = HttpClient::new(&args.server).map_err(|e| anyhow::anyhow!("{}", e.message()))?;

    println!("Checking coach service at {}...", args.server);
    client
        .health_check()
        .await
        .map_err(|e| anyhow::anyhow!("service unavailable: {}", e.message()))?;
    println!("Coach service is healthy");

    let mut upload = VideoUpload::new(&args.video);
    if let Some(name) = args.name {
        upload = upload.with_surfer_name(name);
    }
    if let Some(level) = args.skill_level {
        upload = upload.with_skill_level(level);
    }

    println!();
    println!("Uploading {}...", args.video.display());
    let summary = client
        .create_session(upload)
        .await
        .map_err(|e| anyhow::anyhow!("{}", e.message()))?;
    println!("Session created: {}", summary.session_id);

    let api: Arc<dyn CoachApi> = Arc::new(client);
    let controller = LifecycleController::new(Arc::clone(&api));
    let mut updates = controller.subscribe();

    controller.session_created(summary.session_id.clone()).await?;

    println!();
    println!("Analyzing video...");
    println!("Press Ctrl+C to abort");

    let report = loop {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result?;
                tracing::info!("Received Ctrl+C, aborting flow");
                controller.reset().await;
                println!();
                println!("Analysis aborted");
                return Ok(());
            }
            changed = updates.changed() => {
                changed?;
                let state = updates.borrow_and_update().clone();
                match state {
                    LifecycleState::Processing { .. } => {}
                    LifecycleState::Upload { error } => {
                        anyhow::bail!(error
                            .unwrap_or_else(|| "Analysis ended unexpectedly".to_string()));
                    }
                    LifecycleState::Results { report, .. } => break report,
                }
            }
        }
    };

    print_report_summary(&report);
    let report_path = write_report(&report, &args.output)?;
    println!("Report saved to {}", report_path.display());

    if !args.no_chat {
        run_chat(api, &report.session_id).await?;
    }

    Ok(())
}

/// Prints the headline numbers of a completed report.
fn print_report_summary(report: &SessionReport) {
    let counts = SeverityCounts::from_findings(&report.aggregated_errors);

    println!();
    println!("=== Analysis Complete ===");
    println!(
        "Frames analyzed: {} of {} ({} skipped)",
        report.analyzed_frames, report.total_frames, report.skipped_frames
    );
    println!("Processing time: {:.1}s", report.processing_time_sec);

    if counts.total() > 0 {
        println!(
            "Findings: {} ({} high, {} medium, {} low)",
            counts.total(),
            counts.high,
            counts.medium,
            counts.low
        );
    } else {
        println!("No technique deviations detected!");
    }
}

/// Writes the Markdown report into the output directory.
fn write_report(report: &SessionReport, output_dir: &Path) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(output_dir)?;

    let markdown = MarkdownGenerator::new(report).generate();
    let path = output_dir.join(format!("surfcoach-report-{}.md", report.session_id));
    std::fs::write(&path, markdown)?;
    Ok(path)
}

/// Runs the interactive chat loop over stdin.
async fn run_chat(api: Arc<dyn CoachApi>, session_id: &str) -> anyhow::Result<()> {
    let chat = ChatSession::new(api, session_id);

    println!();
    println!("Ask the coach about your session (type 'exit' to quit)");

    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            break;
        }

        match chat.send(input).await {
            SendOutcome::Answered { reply } => println!("Coach: {reply}"),
            SendOutcome::Failed { message } => println!("Error: {message}"),
            SendOutcome::Ignored => {}
        }
    }

    Ok(())
}
