use std::io::stdout;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use crossterm::event::EventStream;
use droidex::adb::{AdbBridge, AdbTool};
use droidex::config::ConfigManager;
use droidex::{App, AppError, AppEvent, Result, init_panic_hook, init_tracing, restore_tui};
use futures::StreamExt;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::sync::mpsc;
use tokio::{select, time};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

const TICK_INTERVAL: Duration = Duration::from_millis(250);

/// Browse the file system of Android devices over adb.
#[derive(Parser, Debug)]
#[command(name = "droidex", version, about)]
struct Cli {
    /// Path to the adb executable, tried before any other location
    #[arg(long, value_name = "PATH")]
    adb: Option<PathBuf>,

    /// Alternate config file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Device directory shown first
    #[arg(long, value_name = "DEVICE_PATH", default_value = "/sdcard")]
    path: String,

    /// Serial of the device to select when it is online
    #[arg(long, value_name = "SERIAL")]
    device: Option<String>,

    /// Seconds between device polls
    #[arg(long, value_name = "SECS", default_value_t = 3, value_parser = clap::value_parser!(u64).range(1..))]
    poll_interval: u64,

    /// Exit when no working adb executable is found
    #[arg(long)]
    strict: bool,

    /// Log level used when RUST_LOG is not set
    #[arg(long, value_name = "LEVEL", default_value = "info")]
    log_level: String,
}

/// Merge terminal input, the UI tick and the device poll timer into one
/// channel until cancelled.
fn spawn_event_source(
    tx: mpsc::Sender<AppEvent>,
    poll_every: Duration,
    cancel: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut events = EventStream::new();
        let mut ticker = time::interval(TICK_INTERVAL);
        // The app polls once on startup, so the first poll tick is skipped
        let mut poller = time::interval_at(time::Instant::now() + poll_every, poll_every);
        poller.set_missed_tick_behavior(time::MissedTickBehavior::Skip);

        loop {
            let event = select! {
                _ = cancel.cancelled() => break,
                event_result = events.next() => match event_result {
                    Some(Ok(event)) => AppEvent::Input(event),
                    Some(Err(e)) => {
                        error!("Terminal event stream failed: {}", e);
                        break;
                    }
                    None => break,
                },
                _ = ticker.tick() => AppEvent::Tick,
                _ = poller.tick() => AppEvent::PollDevices,
            };
            if tx.send(event).await.is_err() {
                break;
            }
        }
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let data_dir = ConfigManager::data_dir()?;
    init_tracing(&cli.log_level, &data_dir)?;
    init_panic_hook();
    info!("droidex {} starting", env!("CARGO_PKG_VERSION"));

    let mut config = match &cli.config {
        Some(path) => ConfigManager::with_path(path)?,
        None => ConfigManager::new()?,
    };

    let tool = AdbTool::discover(cli.adb.as_deref(), config.adb_path()).await;
    if tool.is_resolved() {
        if let Err(e) = config.set_adb_path(&tool.path) {
            warn!("Could not remember adb location: {}", e);
        }
    } else if cli.strict {
        return Err(AppError::ToolNotFound(
            "no working adb executable found; pass --adb <PATH> or install platform-tools"
                .to_string(),
        ));
    }

    let terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    let mut app = App::new(
        terminal,
        config,
        AdbBridge::new(tool),
        &cli.path,
        cli.device.clone(),
    );
    app.init_terminal()?;

    let (tx, mut rx) = mpsc::channel::<AppEvent>(100);
    app.set_event_sender(tx.clone());

    let cancel = CancellationToken::new();
    let source = spawn_event_source(
        tx,
        Duration::from_secs(cli.poll_interval),
        cancel.clone(),
    );

    let res = app.run(&mut rx).await;

    cancel.cancel();
    source.await.ok();
    drop(app);
    restore_tui().ok();

    if let Err(e) = &res {
        error!("droidex exited with an error: {}", e);
    }
    info!("droidex stopped");
    res
}
