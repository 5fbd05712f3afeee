//! anchor-replay - Main Entry Point
//!
//! Command line front end for listing, inspecting, recording and replaying
//! anchor transform sessions.

use anchor_replay::{
    config::{self, AppConfig, LoggingConfig},
    provider::{MockProvider, TrackingFeed},
    session::{self, PlaybackEvent, SessionCatalog, SessionPlayer, SessionRecorder},
    taxonomy::CanonicalTarget,
};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Record and replay tracked head and hand transforms
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, env = "ANCHOR_REPLAY_CONFIG")]
    config: Option<PathBuf>,

    /// Recordings folder, overriding the configuration
    #[arg(short, long)]
    dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List recorded sessions, most recent first
    List,
    /// Show a single session file
    Info { file: PathBuf },
    /// Replay a session file at its recorded cadence
    Play { file: PathBuf },
    /// Record the synthetic provider for a while and save the session
    Record {
        /// Recording length in seconds
        #[arg(short, long, default_value_t = 5.0)]
        seconds: f64,

        /// Provider update rate
        #[arg(short, long, default_value_t = 60)]
        rate: u32,
    },
    /// Print every canonical target tag
    Tags,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => AppConfig::load(path).with_context(|| format!("Loading {:?}", path))?,
        None => AppConfig::load_or_default(),
    };

    let _log_guard = init_logging(&config.logging)?;
    tracing::debug!("Configuration: {:?}", config);

    match args.command {
        Command::List => list(&recordings_dir(args.dir.as_deref(), &config)?, &config),
        Command::Info { file } => info(&file),
        Command::Play { file } => play(&file),
        Command::Record { seconds, rate } => {
            record(&recordings_dir(args.dir.as_deref(), &config)?, &config, seconds, rate)
        }
        Command::Tags => {
            for target in CanonicalTarget::all() {
                println!("{}", target);
            }
            Ok(())
        }
    }
}

fn init_logging(logging: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.filter))
        .unwrap_or_else(|_| EnvFilter::new(config::DEFAULT_LOG_FILTER));

    let (file_layer, guard) = match &logging.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, "anchor-replay.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .try_init()
        .context("Failed to initialise logging")?;

    Ok(guard)
}

fn recordings_dir(cli_dir: Option<&Path>, config: &AppConfig) -> Result<PathBuf> {
    match cli_dir {
        Some(dir) => Ok(dir.to_path_buf()),
        None => Ok(config.storage.resolved_recordings_dir()?),
    }
}

fn list(dir: &Path, config: &AppConfig) -> Result<()> {
    let mut catalog = SessionCatalog::new(dir, config.storage.file_extension.clone());
    let report = catalog.reload()?;

    for (index, entry) in catalog.entries().iter().enumerate() {
        let name = entry
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        println!("{:>3}  {}  {}", index, entry.session.summary(), name);
    }
    if catalog.is_empty() {
        println!("No sessions in {:?}", dir);
    }
    if !report.is_clean() {
        println!("{} file(s) skipped", report.failures.len());
    }
    Ok(())
}

fn info(file: &Path) -> Result<()> {
    let session = session::read_session(file)?;
    println!("{}", session.summary());
    for (index, frame) in session.frames.iter().enumerate() {
        println!(
            "{:>6}  {:>9.3}s  {} targets",
            index,
            frame.time,
            frame.transforms.len()
        );
    }
    Ok(())
}

fn play(file: &Path) -> Result<()> {
    let session = Arc::new(session::read_session(file)?);
    if session.is_empty() {
        println!("Session has no frames");
        return Ok(());
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start tokio runtime")?;

    runtime.block_on(async move {
        let mut player = SessionPlayer::new();
        let mut events = player.events();
        player.play(session.clone()).await;

        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            tokio::select! {
                _ = &mut ctrl_c => {
                    tracing::info!("Interrupted, stopping playback");
                    player.stop().await;
                    break;
                }
                event = events.recv() => match event {
                    Ok(PlaybackEvent::Frame { index, .. }) => {
                        let frame = &session.frames[index];
                        println!("{:>6}  {:>9.3}s  {} targets", index, frame.time, frame.transforms.len());
                    }
                    Ok(PlaybackEvent::Finished { .. }) | Ok(PlaybackEvent::Cancelled { .. }) => break,
                    Ok(PlaybackEvent::Started { .. }) => {}
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!("Output fell behind, {} frames not printed", skipped);
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    });

    Ok(())
}

fn record(dir: &Path, config: &AppConfig, seconds: f64, rate: u32) -> Result<()> {
    let length = Duration::try_from_secs_f64(seconds).context("Invalid recording length")?;

    let feed = TrackingFeed::new();
    let provider = MockProvider::new(feed.clone()).with_rate_hz(rate).start();
    let mut recorder = SessionRecorder::with_config(feed, config.recorder.clone());

    recorder.start();
    std::thread::sleep(length);
    let saved = recorder.stop_and_save(dir, &config.storage);
    let published = provider.stop();

    let (path, session) = match saved {
        Ok(saved) => saved,
        Err(err) => {
            let fallback = std::env::temp_dir().join(config::APP_ID);
            tracing::warn!("{}: {}; retrying in {:?}", err, err.error, fallback);
            let path = session::write_session(&fallback, &err.session, &config.storage)
                .with_context(|| format!("Recording could not be saved to {:?} either", fallback))?;
            (path, err.into_session())
        }
    };
    println!("{}", session.summary());
    println!("Saved to {:?} ({} updates published)", path, published);
    if recorder.dropped_targets() > 0 {
        println!("{} provider entries dropped", recorder.dropped_targets());
    }
    Ok(())
}
