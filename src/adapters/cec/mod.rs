//! HDMI CEC device adapter.
//!
//! Drives the display through `cec-client`: `on <id>` / `standby <id>`
//! switch power, `as` claims this input as the active source, `pow <id>`
//! queries the power state and `scan` enumerates the bus. The adapter owns
//! a believed-state cache with a short TTL so repeated idempotent calls do
//! not hammer the hardware, and it reports unknown state as an error
//! instead of guessing.

pub mod transport;

pub use transport::{CecTransport, ChannelTransport, OneShotTransport, TaggedLine};

use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::domain::errors::DeviceError;
use crate::domain::models::{CecBackendKind, CecConfig, PowerState};
use crate::domain::ports::DeviceController;

/// Marker introducing a power state in `cec-client` output.
const POWER_STATUS_MARKER: &str = "power status:";
/// Marker introducing a device OSD name in `scan` output.
const OSD_STRING_MARKER: &str = "osd string:";
/// Marker opening a device block in `scan` output.
const DEVICE_BLOCK_MARKER: &str = "device #";

/// Extract the power state from one line of `cec-client` output.
pub(crate) fn parse_power_status(line: &str) -> Option<PowerState> {
    let idx = line.find(POWER_STATUS_MARKER)?;
    Some(PowerState::from_raw(&line[idx + POWER_STATUS_MARKER.len()..]))
}

/// Find the logical address of the device whose OSD name matches `name`
/// (case-insensitive) in `scan` output.
pub(crate) fn parse_scan_for_device(lines: &[String], name: &str) -> Option<u8> {
    let mut current: Option<u8> = None;
    for line in lines {
        let trimmed = line.trim();
        if let Some(rest) = trimmed.strip_prefix(DEVICE_BLOCK_MARKER) {
            current = rest.split(':').next().and_then(|n| n.trim().parse().ok());
        } else if let Some(idx) = trimmed.find(OSD_STRING_MARKER) {
            let osd = trimmed[idx + OSD_STRING_MARKER.len()..].trim();
            if osd.eq_ignore_ascii_case(name) {
                return current;
            }
        }
    }
    None
}

#[derive(Debug, Clone, Copy)]
struct BelievedState {
    state: PowerState,
    confirmed_at: Instant,
}

/// The display as seen through `cec-client`.
///
/// `power_on` and `standby` are idempotent from the caller's point of view:
/// the adapter checks what it believes about the device first and only
/// issues hardware commands when the belief says they are needed. Beliefs
/// expire after `state_cache_secs` so a wall-switch override is picked up
/// within one TTL.
pub struct CecDevice {
    transport: Box<dyn CecTransport>,
    device_id: u8,
    cache_ttl: Duration,
    believed: Option<BelievedState>,
}

impl CecDevice {
    /// Build the device from configuration. The transport backend is chosen
    /// here, once.
    pub fn from_config(config: &CecConfig) -> Self {
        let transport: Box<dyn CecTransport> = match config.backend {
            CecBackendKind::Channel => Box::new(ChannelTransport::new(config.clone())),
            CecBackendKind::OneShot => Box::new(OneShotTransport::new(config.clone())),
        };
        Self::with_transport(transport, config)
    }

    /// Build the device around an explicit transport.
    pub fn with_transport(transport: Box<dyn CecTransport>, config: &CecConfig) -> Self {
        Self {
            transport,
            device_id: config.device_id,
            cache_ttl: Duration::from_secs(config.state_cache_secs),
            believed: None,
        }
    }

    /// The logical CEC address commands are sent to.
    pub const fn device_id(&self) -> u8 {
        self.device_id
    }

    /// List every device on the CEC bus, as raw `scan` output lines.
    pub async fn scan(&mut self) -> Result<Vec<String>, DeviceError> {
        self.transport.collect("scan").await
    }

    /// Ask the device for its power state, bypassing the belief cache.
    pub async fn power_status(&mut self) -> Result<PowerState, DeviceError> {
        self.query_state().await
    }

    /// Resolve the device id from an OSD name on the bus.
    ///
    /// Keeps the configured id with a warning when the name is not found;
    /// a display in deep standby may simply not answer the scan.
    pub async fn discover_device(&mut self, name: &str) -> Result<(), DeviceError> {
        let lines = self.scan().await?;
        match parse_scan_for_device(&lines, name) {
            Some(id) => {
                info!(osd_name = %name, device_id = id, "Resolved CEC device by OSD name");
                self.device_id = id;
            }
            None => {
                warn!(
                    osd_name = %name,
                    device_id = self.device_id,
                    "OSD name not found on the CEC bus, keeping configured device id"
                );
            }
        }
        Ok(())
    }

    fn believed_state(&self) -> PowerState {
        match self.believed {
            Some(belief) if belief.confirmed_at.elapsed() < self.cache_ttl => belief.state,
            _ => PowerState::Unknown,
        }
    }

    fn remember(&mut self, state: PowerState) {
        self.believed = Some(BelievedState { state, confirmed_at: Instant::now() });
    }

    fn forget(&mut self) {
        self.believed = None;
    }

    /// Ask the device for its power state, bypassing the cache.
    async fn query_state(&mut self) -> Result<PowerState, DeviceError> {
        let command = format!("pow {}", self.device_id);
        let lines = match self.transport.collect(&command).await {
            Ok(lines) => lines,
            Err(err) => {
                self.forget();
                return Err(err);
            }
        };
        for line in &lines {
            if let Some(state) = parse_power_status(line) {
                if state.is_confirmed() {
                    self.remember(state);
                    return Ok(state);
                }
            }
        }
        self.forget();
        Err(DeviceError::NoStatus { command })
    }
}

#[async_trait]
impl DeviceController for CecDevice {
    fn name(&self) -> &'static str {
        self.transport.name()
    }

    async fn power_on(&mut self) -> Result<(), DeviceError> {
        if self.believed_state() == PowerState::On {
            debug!("Display already believed on, skipping power-on");
            return Ok(());
        }
        // A display that answers "on" is left alone; one that is off or not
        // answering gets the command anyway.
        if let Ok(PowerState::On) = self.query_state().await {
            return Ok(());
        }
        info!(device_id = self.device_id, "Powering display on");
        self.transport.send(&format!("on {}", self.device_id)).await?;
        self.transport.send("as").await?;
        self.remember(PowerState::On);
        Ok(())
    }

    async fn standby(&mut self) -> Result<(), DeviceError> {
        if self.believed_state() == PowerState::Standby {
            debug!("Display already believed in standby, skipping standby");
            return Ok(());
        }
        if let Ok(PowerState::Standby) = self.query_state().await {
            return Ok(());
        }
        info!(device_id = self.device_id, "Putting display into standby");
        self.transport.send(&format!("standby {}", self.device_id)).await?;
        self.remember(PowerState::Standby);
        Ok(())
    }

    async fn is_on(&mut self) -> Result<bool, DeviceError> {
        let state = match self.believed_state() {
            PowerState::Unknown => self.query_state().await?,
            cached => cached,
        };
        Ok(state == PowerState::On)
    }
}
