use clap::{Args, Parser, Subcommand, ValueEnum};
use log::{error, info};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::thread;
use std::time::{Duration, Instant};
use ticketpress::{GenerationRequest, OutputMode, PipelineBuilder, PipelineConfig, PipelineError};

// Pages allocate and free large buffers continuously; mimalloc keeps
// fragmentation down over long sessions.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "ticketpress", version, about = "Generate numbered ticket PDFs")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render the request and write the PDF files.
    Generate(GenerateArgs),
    /// Print the page and file plan without rendering.
    Plan(RequestArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    /// Save each file into the output directory.
    Download,
    /// Hand one unsplit document to the print spool.
    Print,
}

impl From<ModeArg> for OutputMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Download => OutputMode::Download,
            ModeArg::Print => OutputMode::Print,
        }
    }
}

#[derive(Args)]
struct RequestArgs {
    /// JSON file with the generation request.
    #[arg(long)]
    request: PathBuf,

    #[arg(long, value_enum, default_value_t = ModeArg::Download)]
    mode: ModeArg,

    /// Pipeline settings (TOML, JSON or YAML).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Keep the whole range in a single file.
    #[arg(long)]
    no_split: bool,
}

#[derive(Args)]
struct GenerateArgs {
    #[command(flatten)]
    request: RequestArgs,

    /// Directory for downloaded files.
    #[arg(long, default_value = ".")]
    out: PathBuf,

    /// Directory relative asset paths are resolved against.
    #[arg(long)]
    assets: Option<PathBuf>,

    /// Log resident memory once per second.
    #[arg(long)]
    monitor_memory: bool,
}

/// Logs physical memory usage (RSS) and its peak from a background thread.
fn spawn_memory_monitor() {
    thread::spawn(|| {
        let mut peak = 0;
        let start = Instant::now();
        loop {
            if let Some(usage) = memory_stats::memory_stats() {
                let mb = usage.physical_mem / 1024 / 1024;
                peak = peak.max(mb);
                info!(
                    "[MONITOR] T+{:<3}s | RSS: {:<4} MB | Peak: {:<4} MB",
                    start.elapsed().as_secs(),
                    mb,
                    peak
                );
            }
            thread::sleep(Duration::from_secs(1));
        }
    });
}

fn load_request(args: &RequestArgs) -> Result<GenerationRequest, PipelineError> {
    let source = fs::read_to_string(&args.request).map_err(|e| {
        PipelineError::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to read request from '{}': {}", args.request.display(), e),
        ))
    })?;
    let mut request: GenerationRequest = serde_json::from_str(&source)?;
    if args.no_split {
        request.split_pdf = false;
    }
    Ok(request)
}

fn load_config(path: Option<&Path>) -> Result<PipelineConfig, PipelineError> {
    PipelineConfig::load(path)
}

fn plan(args: RequestArgs) -> Result<(), PipelineError> {
    let request = load_request(&args)?;
    let config = load_config(args.config.as_deref())?;
    let plan = ticketpress::pipeline::planner::plan(&request, args.mode.into(), &config)?;
    for file in &plan.files {
        println!(
            "{}  tickets {}-{}  {} pages",
            file.file_name(),
            file.first,
            file.last,
            file.page_count()
        );
    }
    println!(
        "{} tickets, {} pages, {} files (scale {}, capture {}x at quality {:.2})",
        plan.total_tickets,
        plan.total_pages,
        plan.files.len(),
        plan.scale,
        plan.quality.scale,
        plan.quality.quality
    );
    Ok(())
}

async fn generate(args: GenerateArgs) -> Result<(), PipelineError> {
    if args.monitor_memory {
        spawn_memory_monitor();
    }
    let request = load_request(&args.request)?;
    let config = load_config(args.request.config.as_deref())?;

    let mut builder = PipelineBuilder::new()
        .with_config(config)
        .with_output_dir(&args.out);
    if let Some(assets) = &args.assets {
        builder = builder.with_asset_dir(assets);
    }
    let pipeline = builder.build()?;

    let cancel = pipeline.cancel_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() && cancel.cancel() {
            info!("Cancellation requested; stopping after the current page");
        }
    });

    let report = pipeline.generate(&request, args.request.mode.into()).await?;
    for saved in &report.files {
        println!("{}", saved.path.display());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Generate(args) => generate(args).await,
        Command::Plan(args) => plan(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(PipelineError::Cancelled { .. }) => ExitCode::from(130),
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
