//! Command-line entry point for Plugin Scout.

use anyhow::{bail, Context, Result};
use clap::Parser;
use plugin_scout::api::server;
use plugin_scout::infrastructure::concurrency::init_thread_pool;
use plugin_scout::infrastructure::config::ScoutConfig;
use plugin_scout::infrastructure::project_loader::ProjectLoader;
use plugin_scout::infrastructure::build_introspector;
use plugin_scout::ports::report_exporter::exporter_for;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Plugin file to introspect (can specify multiple)
    #[arg(short, long, required = false)]
    input: Vec<PathBuf>,

    /// Folder scanned recursively for plugin files
    #[arg(short = 'd', long, required = false)]
    folder: Vec<PathBuf>,

    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output file path; stdout when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format (json, text)
    #[arg(short, long, default_value = "json")]
    format: String,

    /// Serve line-delimited JSON requests on this port instead of a one-shot run
    #[arg(long)]
    serve: Option<u16>,
}

fn init_logging(config: &ScoutConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = ScoutConfig::load_or_default(cli.config.as_ref())?;
    init_logging(&config);

    let workers = init_thread_pool(config.threads)?;
    let introspector = build_introspector(&config)?;

    if let Some(port) = cli.serve {
        return server::start_server(port, introspector);
    }

    let mut paths = cli.input.clone();
    for folder in &cli.folder {
        paths.extend(ProjectLoader::collect_plugins(folder, &config.scan)?);
    }
    if paths.is_empty() {
        bail!("Please provide at least one --input <file> or --folder <dir>");
    }
    info!(files = paths.len(), workers, "Introspecting plugins");

    let reports = introspector.introspect_many(&paths);
    let exporter = exporter_for(&cli.format)?;

    match &cli.output {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
            let mut out = BufWriter::new(file);
            exporter.export(&reports, &mut out)?;
            out.flush()?;
            info!("Output written to {} (format: {})", path.display(), cli.format);
        }
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            exporter.export(&reports, &mut out)?;
        }
    }

    let incomplete = reports.iter().filter(|r| !r.is_complete()).count();
    if incomplete > 0 {
        info!(incomplete, "Some plugins could not be fully introspected");
    }
    Ok(())
}
