//! Sysfs poller feeding radio and link notifications into the hub.
//!
//! Each tick reads the interface `operstate` and the wlan rfkill switch and
//! publishes one notification per kind. Duplicates are expected; the
//! recording session filters them.

use crate::{AppError, AppResult, config::MonitorConfig};

use std::{
    fs,
    panic::Location,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use error_location::ErrorLocation;
use outage_recorder_core::{
    EventKind, Notification, NotificationHub,
    source::{KEY_STATE, KEY_TRANSPORT},
};
use tokio::{
    sync::watch,
    time::{MissedTickBehavior, interval},
};
use tracing::{debug, info, instrument, trace, warn};

/// Paths read on every poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SysfsProbe {
    root: PathBuf,
    interface: String,
}

impl SysfsProbe {
    /// Probe for `interface` under `root`.
    pub fn new(root: impl Into<PathBuf>, interface: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            interface: interface.into(),
        }
    }

    /// Uses the configured interface or the detected uplink.
    #[track_caller]
    #[instrument]
    pub fn from_config(config: &MonitorConfig) -> AppResult<Self> {
        let interface = match &config.interface {
            Some(interface) => interface.clone(),
            None => detect_interface(&config.sysfs_root)?,
        };

        info!(%interface, "Monitoring interface");

        Ok(Self::new(config.sysfs_root.clone(), interface))
    }

    /// Interface being watched.
    pub fn interface(&self) -> &str {
        &self.interface
    }

    fn net_dir(&self) -> PathBuf {
        self.root.join("class/net").join(&self.interface)
    }

    /// Current link state as a notification.
    pub fn read_link(&self) -> Notification {
        let mut notification = Notification::new(EventKind::Link);
        let dir = self.net_dir();

        match read_trimmed(&dir.join("operstate")).as_deref() {
            Some("up") => {
                let transport = if dir.join("wireless").exists() {
                    "wifi"
                } else {
                    "ethernet"
                };
                notification = notification
                    .with(KEY_STATE, "connected")
                    .with(KEY_TRANSPORT, transport);
            }
            Some("down" | "dormant" | "lowerlayerdown") => {
                notification = notification.with(KEY_STATE, "disconnected");
            }
            other => trace!(operstate = ?other, "Link state not determinable"),
        }

        notification
    }

    /// Current wlan radio state as a notification.
    pub fn read_radio(&self) -> Notification {
        let notification = Notification::new(EventKind::Radio);

        let Some(switch) = self.wlan_rfkill() else {
            trace!("No wlan rfkill switch");
            return notification;
        };

        let soft = read_trimmed(&switch.join("soft"));
        let hard = read_trimmed(&switch.join("hard"));

        match (soft.as_deref(), hard.as_deref()) {
            (Some("0"), Some("0")) => notification.with(KEY_STATE, "enabled"),
            (Some("1"), _) | (_, Some("1")) => notification.with(KEY_STATE, "disabled"),
            _ => notification,
        }
    }

    fn wlan_rfkill(&self) -> Option<PathBuf> {
        let mut entries = sorted_entries(&self.root.join("class/rfkill"));
        entries.retain(|entry| read_trimmed(&entry.join("type")).as_deref() == Some("wlan"));
        entries.into_iter().next()
    }
}

/// Publishes one radio and one link notification.
pub fn poll_once(probe: &SysfsProbe, hub: &NotificationHub) {
    let radio = hub.publish(probe.read_radio());
    let link = hub.publish(probe.read_link());
    trace!(radio, link, "Poll published");
}

const VIRTUAL_PREFIXES: [&str; 4] = ["docker", "br-", "veth", "virbr"];

/// Picks the uplink under `<root>/class/net`.
///
/// Loopback and bridge or container interfaces are skipped. Among the rest,
/// wireless hardware ranks before other hardware, which ranks before
/// interfaces without a `device` entry. Ties go to the first name.
#[track_caller]
pub fn detect_interface(root: &Path) -> AppResult<String> {
    sorted_entries(&root.join("class/net"))
        .into_iter()
        .filter_map(|dir| {
            let name = dir.file_name()?.to_string_lossy().into_owned();
            if name == "lo" || VIRTUAL_PREFIXES.iter().any(|p| name.starts_with(p)) {
                return None;
            }
            let rank = match (dir.join("device").exists(), dir.join("wireless").exists()) {
                (true, true) => 0,
                (true, false) => 1,
                (false, _) => 2,
            };
            Some((rank, name))
        })
        .min()
        .map(|(_, name)| name)
        .ok_or_else(|| AppError::MonitorError {
            reason: format!("No network interface found under {:?}", root),
            location: ErrorLocation::from(Location::caller()),
        })
}

fn sorted_entries(dir: &Path) -> Vec<PathBuf> {
    let mut entries: Vec<PathBuf> = match fs::read_dir(dir) {
        Ok(rd) => rd.filter_map(|e| e.ok().map(|e| e.path())).collect(),
        Err(e) => {
            debug!(dir = ?dir, error = %e, "Cannot list directory");
            Vec::new()
        }
    };
    entries.sort();
    entries
}

fn read_trimmed(path: &Path) -> Option<String> {
    fs::read_to_string(path)
        .ok()
        .map(|s| s.trim().to_ascii_lowercase())
        .filter(|s| !s.is_empty())
}

/// Periodic poller driving a [`NotificationHub`].
pub struct LinkMonitor {
    probe: SysfsProbe,
    hub: Arc<NotificationHub>,
    period: Duration,
}

impl LinkMonitor {
    /// Poll `probe` every `period` into `hub`.
    pub fn new(probe: SysfsProbe, hub: Arc<NotificationHub>, period: Duration) -> Self {
        Self { probe, hub, period }
    }

    /// Run the poll loop until a shutdown signal is received.
    ///
    /// Sysfs reads run on the blocking pool so a slow filesystem cannot
    /// stall the command loop.
    #[instrument(skip(self, shutdown_rx), fields(interface = %self.probe.interface()))]
    pub async fn run(&self, mut shutdown_rx: watch::Receiver<bool>) -> AppResult<()> {
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(period_ms = self.period.as_millis(), "Link monitor started");

        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    info!("Link monitor shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    let probe = self.probe.clone();
                    let hub = Arc::clone(&self.hub);
                    if let Err(e) = tokio::task::spawn_blocking(move || poll_once(&probe, &hub)).await {
                        warn!(error = ?e, "Poll task panicked");
                    }
                }
            }
        }

        Ok(())
    }
}
