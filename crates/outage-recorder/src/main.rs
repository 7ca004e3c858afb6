//! Outage recorder: logs Wi-Fi radio and internet connectivity changes.

mod app;
mod app_command;
mod cli;
mod config;
mod device;
mod error;
mod link_monitor;
mod log_file;
mod recording_state;

pub(crate) use {
    app::App,
    app_command::AppCommand,
    error::{AppError, Result as AppResult},
    link_monitor::{LinkMonitor, SysfsProbe},
    recording_state::RecordingState,
};

use crate::{
    cli::{Cli, Command},
    config::Config,
    device::detect_device,
};

use std::{panic::Location, path::PathBuf, sync::Arc};

use clap::Parser;
use error_location::ErrorLocation;
use outage_recorder_core::{NotificationHub, SessionConfig, SystemClock};
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

const DEFAULT_FILTER: &str = "outage_recorder=info,outage_recorder_core=info";
const VERBOSE_FILTER: &str = "outage_recorder=debug,outage_recorder_core=debug";

/// Application entry point.
fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if cli.verbose {
            VERBOSE_FILTER
        } else {
            DEFAULT_FILTER
        })
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load config: {:?}", e);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Command::Show { file } => {
            let path = file.unwrap_or_else(|| config.recording.log_file.clone());
            log_file::show(&path, &mut std::io::stdout().lock())
        }
        Command::Record { file, fresh } => {
            let path = file.unwrap_or_else(|| config.recording.log_file.clone());
            record(config, path, fresh)
        }
    };

    if let Err(e) = result {
        error!("{:?}", e);
        std::process::exit(1);
    }
}

/// Records until Ctrl-C or the record cap, then tears down.
fn record(config: Config, path: PathBuf, fresh: bool) -> AppResult<()> {
    if fresh {
        log_file::remove_existing(&path)?;
    }

    let probe = SysfsProbe::from_config(&config.monitor)?;
    let device = detect_device(&config.device, &config.monitor.sysfs_root);
    let session_config =
        SessionConfig::new(device).with_max_records(config.recording.max_records);

    let rt = tokio::runtime::Runtime::new()?;

    rt.block_on(async {
        let hub = Arc::new(NotificationHub::new());
        let (command_tx, command_rx) = mpsc::channel(32);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let monitor = LinkMonitor::new(probe, Arc::clone(&hub), config.poll_interval());

        let app = App {
            hub,
            clock: Arc::new(SystemClock),
            session_config,
            command_tx: command_tx.clone(),
            command_rx,
            shutdown_tx,
            state: RecordingState::Idle,
            session: None,
        };

        let (_, _, started) = tokio::join!(
            async {
                if let Err(e) = monitor.run(shutdown_rx).await {
                    error!(error = ?e, "Link monitor error");
                }
            },
            async {
                if let Err(e) = app.run().await {
                    error!(error = ?e, "App error");
                }
            },
            async {
                let started = request_start(&command_tx, path).await;
                if started.is_err() {
                    let _ = command_tx.send(AppCommand::Shutdown).await;
                }
                started
            }
        );

        started
    })
}

/// Asks the app loop to start recording and waits for the outcome.
async fn request_start(command_tx: &mpsc::Sender<AppCommand>, path: PathBuf) -> AppResult<()> {
    let session_id = Uuid::new_v4();
    let (reply, outcome) = oneshot::channel();

    command_tx
        .send(AppCommand::StartRecording {
            path,
            session_id,
            reply,
        })
        .await
        .map_err(|e| AppError::ChannelSendFailed {
            message: format!("Failed to send start command: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

    outcome.await.map_err(|e| AppError::ChannelSendFailed {
        message: format!("App loop dropped start reply: {}", e),
        location: ErrorLocation::from(Location::caller()),
    })??;

    info!(session_id = %session_id, "Recording, press Ctrl-C to stop");

    Ok(())
}
