//! Transync (transync) - Main entry point
//!
//! Headless transcript follower: plays a transcript against a simulated
//! playback clock, prints the segment window as the current segment changes,
//! and accepts navigation/editing commands on stdin.

use std::io::BufRead;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use transync_common::config::TomlConfig;
use transync_common::events::SessionEvent;
use transync_player::config::SessionConfig;
use transync_player::console::{self, Outcome};
use transync_player::playback::SimulatedEngine;
use transync_player::Session;

/// Command-line arguments for transync
#[derive(Parser, Debug)]
#[command(name = "transync")]
#[command(about = "Follow a timestamped transcript against a playback clock")]
#[command(version)]
struct Args {
    /// Transcript file (`start,end,text,modified` rows)
    #[arg(short, long, env = "TRANSYNC_TRANSCRIPT")]
    transcript: PathBuf,

    /// Save destination (defaults to the transcript file)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print session events as JSON lines instead of the segment window
    #[arg(long)]
    json: bool,

    /// Segment to start from
    #[arg(long)]
    start_at: Option<usize>,

    /// Start with playback paused
    #[arg(long)]
    paused: bool,

    /// Boundary tolerance in milliseconds (overrides config)
    #[arg(long)]
    tolerance_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let toml_config =
        TomlConfig::load(args.config.as_deref()).context("Failed to load configuration")?;

    // Initialize tracing
    let level = toml_config.logging.level.clone();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            format!("transync_player={level},transync_common={level}").into()
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = SessionConfig::from(&toml_config);
    config.destination = args.output.clone();
    config.start_paused |= args.paused;
    if let Some(ms) = args.tolerance_ms {
        config.boundary_tolerance = Duration::from_millis(ms);
    }

    let session = Session::open(&args.transcript, SimulatedEngine::new(), config)
        .with_context(|| format!("Failed to open transcript {}", args.transcript.display()))?;
    info!("{} segments loaded", session.transcript().len());

    let renderer = spawn_renderer(&session, args.json);

    session.start().context("Failed to start session")?;
    if !args.json {
        println!("{}\n", console::render_window(session.transcript(), 0, session.config().window_size));
    }
    if let Some(index) = args.start_at {
        session.jump_to(index).context("Failed to jump to start segment")?;
    }

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);
    let mut lines = spawn_stdin_reader();

    loop {
        tokio::select! {
            line = lines.recv() => {
                let Some(line) = line else {
                    info!("stdin closed");
                    break;
                };
                match console::parse_command(&line).and_then(|cmd| match cmd {
                    Some(cmd) => console::execute(&session, cmd),
                    None => Ok(Outcome::Continue(None)),
                }) {
                    Ok(Outcome::Quit) => break,
                    Ok(Outcome::Continue(Some(message))) => println!("{}", message),
                    Ok(Outcome::Continue(None)) => {}
                    Err(e) => eprintln!("error: {}", e),
                }
            }
            _ = &mut shutdown => break,
        }
    }

    // Joins the scheduler thread
    tokio::task::block_in_place(|| session.close()).context("Failed to close session")?;
    drop(session);

    if let Err(e) = renderer.await {
        warn!("Renderer task failed: {}", e);
    }

    info!("Session closed");
    Ok(())
}

/// Read stdin lines on a dedicated thread
///
/// A blocking read cannot be cancelled, so it stays off the runtime; the
/// thread ends with the process.
fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!("Failed to read stdin: {}", e);
                    break;
                }
            }
        }
    });
    rx
}

/// Print segment windows (or JSON events) as the session publishes them
fn spawn_renderer(session: &Session, json: bool) -> tokio::task::JoinHandle<()> {
    let mut events = session.subscribe_events();
    let transcript = session.transcript().clone();
    let window_size = session.config().window_size;

    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) if json => println!("{}", event.to_json()),
                Ok(SessionEvent::SegmentChanged { index }) => {
                    println!("{}\n", console::render_window(&transcript, index, window_size));
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => warn!("Renderer lagged, skipped {} events", skipped),
                Err(RecvError::Closed) => break,
            }
        }
    })
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
