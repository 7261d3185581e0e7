// ask/src/main.rs
use std::fs;
use std::path::Path;
use std::process;
use std::sync::Arc;

use ask_common::config::Config;
use ask_common::error::{AskError, Result as AskResult};
use ask_common::events::InstallOutcome;
use ask_common::model::{CachedResource, PackageMetadata};
use ask_core::{
    fetch_metadata, spawn_signal_listener, start_install, InstallLauncher, InstallRequest,
    MonitorTimings, Teardown,
};
use ask_net::ResourceCache;
use clap::Parser;
use colored::Colorize;
use tokio::sync::mpsc;
use tracing::level_filters::LevelFilter;
use tracing::{debug, error, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

mod cli;
mod ui;

use cli::CliArgs;

#[tokio::main]
async fn main() {
    let cli_args = CliArgs::parse();

    let mut config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red().bold(), e);
            process::exit(1);
        }
    };
    cli_args.apply_to(&mut config);

    let log_guard = init_logging(&config, cli_args.verbose);

    let code = match run(&cli_args, &config).await {
        Ok(code) => code,
        Err(e) => {
            error!("dbin-ask failed: {:#}", e);
            eprintln!("{}: {:#}", "Error".red().bold(), e);
            1
        }
    };

    debug!("Exiting with status {}", code);
    drop(log_guard);
    // Exit explicitly: a progress-pipe reader may still be parked on the blocking pool.
    process::exit(code);
}

fn init_logging(config: &Config, verbose: u8) -> Option<WorkerGuard> {
    let level_filter = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let max_log_level = level_filter.into_level().unwrap_or(tracing::Level::WARN);

    let env_filter = EnvFilter::builder()
        .with_default_directive(level_filter.into())
        .with_env_var("DBIN_ASK_LOG")
        .from_env_lossy();

    let log_dir = config.logs_dir();
    if verbose > 0 {
        match fs::create_dir_all(log_dir) {
            Ok(()) => {
                let file_appender = tracing_appender::rolling::daily(log_dir, "dbin-ask.log");
                let (non_blocking_appender, guard) = tracing_appender::non_blocking(file_appender);

                let stderr_writer = std::io::stderr.with_max_level(max_log_level);
                let file_writer = non_blocking_appender.with_max_level(max_log_level);

                let _ = tracing_subscriber::fmt()
                    .with_env_filter(env_filter)
                    .with_writer(stderr_writer.and(file_writer))
                    .with_ansi(true)
                    .without_time()
                    .try_init();

                debug!(
                    "Verbose logging enabled. Writing logs to: {}/dbin-ask.log",
                    log_dir.display()
                );
                return Some(guard);
            }
            Err(e) => {
                eprintln!(
                    "{} Failed to create log directory {}: {}",
                    "Warning:".yellow().bold(),
                    log_dir.display(),
                    e
                );
            }
        }
    }

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .without_time()
        .try_init();
    None
}

/// Parse, fetch metadata, then hand over to the session. Returns the exit status.
async fn run(cli_args: &CliArgs, config: &Config) -> AskResult<i32> {
    let request = InstallRequest::parse(&cli_args.uri, config.scheme())?;
    debug!("Install request for {}", request.identifier());

    let metadata = fetch_metadata(config.tool(), request.identifier())?;

    let scratch_dir = config.scratch_dir(&metadata.id());
    let teardown = Arc::new(Teardown::new(&scratch_dir));
    if let Err(e) = spawn_signal_listener(Arc::clone(&teardown)) {
        warn!("Could not install signal handlers: {}", e);
    }

    let result = session(cli_args, config, &request, &metadata, &scratch_dir).await;
    teardown.run();
    result
}

/// Icons and screenshots are decoration: any failure here leaves the list empty.
async fn fetch_resources(scratch_dir: &Path, metadata: &PackageMetadata) -> Vec<CachedResource> {
    match ResourceCache::create(scratch_dir) {
        Ok(mut cache) => cache.fetch_all(metadata).await,
        Err(e) => {
            warn!("Skipping package resources: {}", e);
            Vec::new()
        }
    }
}

async fn session(
    cli_args: &CliArgs,
    config: &Config,
    request: &InstallRequest,
    metadata: &PackageMetadata,
    scratch_dir: &Path,
) -> AskResult<i32> {
    let display_id = metadata.id().to_string();

    let resources = if cli_args.no_resources {
        Vec::new()
    } else {
        fetch_resources(scratch_dir, metadata).await
    };
    ui::print_summary(metadata, &resources);

    if !cli_args.yes && !ui::confirm(&display_id)? {
        println!("Installation cancelled.");
        return Ok(0);
    }

    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let monitor = start_install(
        &InstallLauncher::from_config(config),
        request.identifier(),
        config.pipe_path(&metadata.id()),
        MonitorTimings::default(),
        event_tx,
    )?;

    let mut view = ui::ProgressView::new(&display_id);
    while let Some(event) = event_rx.recv().await {
        view.handle(&event);
    }

    let outcome = match monitor.await {
        Ok(report) => {
            debug!("Install monitor states: {:?}", report.states);
            report.outcome
        }
        Err(e) => {
            error!("Install monitor stopped unexpectedly: {}", e);
            InstallOutcome::Interrupted
        }
    };

    match outcome {
        InstallOutcome::Succeeded => {
            println!("The package {display_id} was installed successfully.");
            Ok(0)
        }
        InstallOutcome::Failed(e) => Err(e),
        InstallOutcome::Interrupted => Err(AskError::InstallFailed(
            "installation status unknown: monitoring was interrupted".to_string(),
        )),
    }
}
