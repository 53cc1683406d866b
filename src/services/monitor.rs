//! The supervisory monitor loop.
//!
//! One cycle every poll interval: make sure the kiosk browser is alive,
//! ask the feed whether an alarm is active, and drive the display to the
//! matching power state. Every error is caught inside the cycle so the
//! schedule itself can never be lost; failure classes are debounced into
//! at most one problem and one resolved notification each.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::domain::models::MonitorConfig;
use crate::domain::ports::{AlarmSource, DeviceController, KioskBrowser, Notifier};
use crate::services::fault::{FaultFlag, FaultTransition};

/// Fault class covering the HDMI CEC device.
const DEVICE_FAULT: &str = "device-unreachable";
/// Fault class covering the kiosk browser process.
const BROWSER_FAULT: &str = "process-unhealthy";

/// Announcement sent when the daemon comes up with `notify_on_start` set.
const START_MESSAGE: &str = "START - Alarm monitor started";

/// Configuration for the monitor daemon.
#[derive(Debug, Clone)]
pub struct MonitorDaemonConfig {
    /// Interval between cycles.
    pub poll_interval: Duration,
    /// Send a notification on fault transitions.
    pub notify_on_failure: bool,
    /// Announce daemon start through the notifier.
    pub notify_on_start: bool,
}

impl Default for MonitorDaemonConfig {
    fn default() -> Self {
        Self::from(&MonitorConfig::default())
    }
}

impl From<&MonitorConfig> for MonitorDaemonConfig {
    fn from(config: &MonitorConfig) -> Self {
        Self {
            poll_interval: Duration::from_secs(config.poll_interval_secs),
            notify_on_failure: config.notify_on_failure,
            notify_on_start: config.notify_on_start,
        }
    }
}

/// Status of the monitor loop.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MonitorStatus {
    /// Whether the loop is currently running.
    pub running: bool,
    /// Cycles completed so far.
    pub cycles: u64,
    /// Whether the last cycle saw an active alarm.
    pub alarm_active: bool,
    /// Whether the device-unreachable fault is flagged.
    pub device_fault: bool,
    /// Whether the process-unhealthy fault is flagged.
    pub browser_fault: bool,
    /// Browser restarts performed.
    pub browser_restarts: u64,
    /// When the last cycle finished.
    pub last_cycle: Option<DateTime<Utc>>,
}

/// Handle to observe and stop the monitor loop.
pub struct MonitorHandle {
    stop_flag: Arc<AtomicBool>,
    status: Arc<RwLock<MonitorStatus>>,
}

impl MonitorHandle {
    /// Request the loop to stop after the current cycle.
    pub fn stop(&self) {
        self.stop_flag.store(true, Ordering::Release);
    }

    /// Check if stop was requested.
    pub fn is_stop_requested(&self) -> bool {
        self.stop_flag.load(Ordering::Acquire)
    }

    /// Get the current loop status.
    pub async fn status(&self) -> MonitorStatus {
        self.status.read().await.clone()
    }
}

/// The supervisory monitor.
pub struct AlarmMonitor<D, A, B, N>
where
    D: DeviceController,
    A: AlarmSource,
    B: KioskBrowser,
    N: Notifier,
{
    config: MonitorDaemonConfig,
    device: D,
    alarms: A,
    browser: B,
    notifier: N,
    device_fault: FaultFlag,
    browser_fault: FaultFlag,
    status: Arc<RwLock<MonitorStatus>>,
    stop_flag: Arc<AtomicBool>,
}

impl<D, A, B, N> AlarmMonitor<D, A, B, N>
where
    D: DeviceController,
    A: AlarmSource,
    B: KioskBrowser,
    N: Notifier,
{
    /// Create a monitor around its four collaborators.
    pub fn new(config: MonitorDaemonConfig, device: D, alarms: A, browser: B, notifier: N) -> Self {
        Self {
            config,
            device,
            alarms,
            browser,
            notifier,
            device_fault: FaultFlag::new(DEVICE_FAULT),
            browser_fault: FaultFlag::new(BROWSER_FAULT),
            status: Arc::new(RwLock::new(MonitorStatus::default())),
            stop_flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Get a handle to observe and stop the loop.
    pub fn handle(&self) -> MonitorHandle {
        MonitorHandle {
            stop_flag: Arc::clone(&self.stop_flag),
            status: Arc::clone(&self.status),
        }
    }

    /// Run the daemon until interrupted or stopped, then shut down.
    ///
    /// The first cycle runs immediately; transient trouble in it only
    /// flags faults, it never aborts the daemon. The shutdown sequence
    /// runs however the loop ends.
    pub async fn run(mut self) {
        info!(
            poll_interval_secs = self.config.poll_interval.as_secs(),
            device = self.device.name(),
            notifier = self.notifier.name(),
            "Monitor loop starting"
        );
        {
            let mut status = self.status.write().await;
            status.running = true;
        }

        if self.config.notify_on_start {
            self.notifier.send_message(START_MESSAGE).await;
        }

        self.run_cycle().await;

        let mut ticker = interval_at(
            Instant::now() + self.config.poll_interval,
            self.config.poll_interval,
        );
        // A stalled cycle must not be followed by a burst of catch-up runs.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut interrupt = Box::pin(tokio::signal::ctrl_c());

        loop {
            tokio::select! {
                _ = &mut interrupt => {
                    info!("Interrupt received, leaving the monitor loop");
                    break;
                }
                _ = ticker.tick() => {
                    if self.stop_flag.load(Ordering::Acquire) {
                        break;
                    }
                    self.run_cycle().await;
                }
            }
            if self.stop_flag.load(Ordering::Acquire) {
                break;
            }
        }

        self.shutdown().await;
    }

    /// Run one monitor cycle.
    ///
    /// Never fails: everything that can go wrong is logged and folded
    /// into the fault flags, so the periodic schedule is never lost.
    pub async fn run_cycle(&mut self) {
        let cycle = {
            let mut status = self.status.write().await;
            status.cycles += 1;
            status.cycles
        };
        debug!(cycle, "Monitor cycle starting");

        let browser_healthy = self.ensure_browser().await;
        if let Some(transition) = self.browser_fault.observe(browser_healthy) {
            self.notify_fault(BROWSER_FAULT, transition).await;
        }

        let alarm_active = self.alarms.is_alarm_active().await;

        let device_result = if alarm_active {
            self.device.power_on().await
        } else {
            self.device.standby().await
        };
        let device_healthy = match device_result {
            Ok(()) => true,
            Err(err) => {
                error!(error = %err, alarm_active, "Could not drive the display");
                false
            }
        };
        if let Some(transition) = self.device_fault.observe(device_healthy) {
            self.notify_fault(DEVICE_FAULT, transition).await;
        }

        let mut status = self.status.write().await;
        status.alarm_active = alarm_active;
        status.device_fault = self.device_fault.is_flagged();
        status.browser_fault = self.browser_fault.is_flagged();
        status.last_cycle = Some(Utc::now());
    }

    /// Orderly shutdown: display into standby when it is on, browser
    /// terminated. Each step logs failures and continues.
    pub async fn shutdown(&mut self) {
        info!("Shutting down: releasing display and browser");

        match self.device.is_on().await {
            Ok(true) => {
                if let Err(err) = self.device.standby().await {
                    warn!(error = %err, "Could not put display into standby during shutdown");
                }
            }
            Ok(false) => {}
            Err(err) => warn!(error = %err, "Could not query display during shutdown"),
        }

        self.browser.terminate().await;

        let mut status = self.status.write().await;
        status.running = false;
    }

    /// Keep the kiosk process alive. True when it runs by the end of the
    /// check; a restart needs a fresh session-scoped URL first.
    async fn ensure_browser(&mut self) -> bool {
        if self.browser.is_alive() {
            return true;
        }
        warn!("Kiosk browser is not running, restarting it");

        let url = match self.alarms.dashboard_url().await {
            Ok(url) => url,
            Err(err) => {
                error!(error = %err, "No dashboard session for the browser restart");
                return false;
            }
        };
        match self.browser.ensure_alive(&url).await {
            Ok(restarted) => {
                if restarted {
                    let mut status = self.status.write().await;
                    status.browser_restarts += 1;
                }
                true
            }
            Err(err) => {
                error!(error = %err, "Could not restart the kiosk browser");
                false
            }
        }
    }

    async fn notify_fault(&self, fault: &str, transition: FaultTransition) {
        let text = match (fault, transition) {
            (DEVICE_FAULT, FaultTransition::Raised) => {
                "Problem: no connection to the HDMI CEC device"
            }
            (DEVICE_FAULT, FaultTransition::Cleared) => {
                "Resolved: HDMI CEC device is reachable again"
            }
            (BROWSER_FAULT, FaultTransition::Raised) => {
                "Problem: the dashboard browser could not be kept running"
            }
            (BROWSER_FAULT, FaultTransition::Cleared) => {
                "Resolved: the dashboard browser is running again"
            }
            _ => return,
        };
        if self.config.notify_on_failure {
            self.notifier.send_message(text).await;
        } else {
            debug!(message = text, "Failure notifications disabled, not sending");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_daemon_config_from_model() {
        let model = MonitorConfig {
            poll_interval_secs: 12,
            alarm_duration_secs: 600,
            notify_on_failure: false,
            notify_on_start: true,
        };
        let config = MonitorDaemonConfig::from(&model);
        assert_eq!(config.poll_interval, Duration::from_secs(12));
        assert!(!config.notify_on_failure);
        assert!(config.notify_on_start);
    }
}
