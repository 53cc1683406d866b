//! Common test utilities for integration tests
//!
//! Provides scriptable implementations of the monitor's four ports. Each
//! mock hands out a shared handle so the test body can steer behavior
//! between cycles and inspect what the monitor did.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use einsatzmonitor::domain::ports::{AlarmSource, DeviceController, KioskBrowser, Notifier};
use einsatzmonitor::{BrowserError, DashboardError, DeviceError};

/// Shared view of the mock display.
#[derive(Default)]
pub struct DeviceProbe {
    pub power_on_calls: AtomicU64,
    pub standby_calls: AtomicU64,
    pub is_on: AtomicBool,
    /// When set, every device operation fails.
    pub fail_commands: AtomicBool,
}

pub struct MockDevice {
    probe: Arc<DeviceProbe>,
}

impl MockDevice {
    pub fn new() -> (Self, Arc<DeviceProbe>) {
        let probe = Arc::new(DeviceProbe::default());
        (Self { probe: Arc::clone(&probe) }, probe)
    }
}

#[async_trait]
impl DeviceController for MockDevice {
    fn name(&self) -> &'static str {
        "mock-device"
    }

    async fn power_on(&mut self) -> Result<(), DeviceError> {
        if self.probe.fail_commands.load(Ordering::SeqCst) {
            return Err(DeviceError::ChannelClosed);
        }
        self.probe.power_on_calls.fetch_add(1, Ordering::SeqCst);
        self.probe.is_on.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn standby(&mut self) -> Result<(), DeviceError> {
        if self.probe.fail_commands.load(Ordering::SeqCst) {
            return Err(DeviceError::ChannelClosed);
        }
        self.probe.standby_calls.fetch_add(1, Ordering::SeqCst);
        self.probe.is_on.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn is_on(&mut self) -> Result<bool, DeviceError> {
        if self.probe.fail_commands.load(Ordering::SeqCst) {
            return Err(DeviceError::ChannelClosed);
        }
        Ok(self.probe.is_on.load(Ordering::SeqCst))
    }
}

/// Shared script for the mock alarm feed.
pub struct AlarmScript {
    /// Per-cycle answers to `is_alarm_active`; the last answer repeats.
    answers: Mutex<VecDeque<bool>>,
    last: AtomicBool,
    /// When cleared, `dashboard_url` fails as if no session could be made.
    pub url_ok: AtomicBool,
    pub url_requests: AtomicU64,
}

pub struct MockAlarmSource {
    script: Arc<AlarmScript>,
}

impl MockAlarmSource {
    pub fn new(answers: &[bool]) -> (Self, Arc<AlarmScript>) {
        let script = Arc::new(AlarmScript {
            answers: Mutex::new(answers.iter().copied().collect()),
            last: AtomicBool::new(answers.last().copied().unwrap_or(false)),
            url_ok: AtomicBool::new(true),
            url_requests: AtomicU64::new(0),
        });
        (Self { script: Arc::clone(&script) }, script)
    }
}

#[async_trait]
impl AlarmSource for MockAlarmSource {
    async fn is_alarm_active(&mut self) -> bool {
        let mut answers = self.script.answers.lock().unwrap();
        match answers.pop_front() {
            Some(answer) => {
                self.script.last.store(answer, Ordering::SeqCst);
                answer
            }
            None => self.script.last.load(Ordering::SeqCst),
        }
    }

    async fn dashboard_url(&mut self) -> Result<String, DashboardError> {
        if !self.script.url_ok.load(Ordering::SeqCst) {
            return Err(DashboardError::SessionInit("login refused".to_string()));
        }
        // Every request mints a new session so tests can tell restarts apart.
        let n = self.script.url_requests.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("https://dashboard.example.test/session-{n}"))
    }
}

/// Shared view of the mock kiosk browser.
#[derive(Default)]
pub struct BrowserProbe {
    pub alive: AtomicBool,
    pub started_urls: Mutex<Vec<String>>,
    pub fail_start: AtomicBool,
    pub terminations: AtomicU64,
}

pub struct MockBrowser {
    probe: Arc<BrowserProbe>,
}

impl MockBrowser {
    pub fn new() -> (Self, Arc<BrowserProbe>) {
        let probe = Arc::new(BrowserProbe::default());
        (Self { probe: Arc::clone(&probe) }, probe)
    }
}

#[async_trait]
impl KioskBrowser for MockBrowser {
    async fn start(&mut self, url: &str) -> Result<(), BrowserError> {
        if self.probe.fail_start.load(Ordering::SeqCst) {
            return Err(BrowserError::Spawn {
                binary: "mock-browser".to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "scripted failure"),
            });
        }
        self.probe.started_urls.lock().unwrap().push(url.to_string());
        self.probe.alive.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn is_alive(&mut self) -> bool {
        self.probe.alive.load(Ordering::SeqCst)
    }

    async fn ensure_alive(&mut self, url: &str) -> Result<bool, BrowserError> {
        if self.is_alive() {
            return Ok(false);
        }
        self.start(url).await?;
        Ok(true)
    }

    async fn terminate(&mut self) {
        self.probe.alive.store(false, Ordering::SeqCst);
        self.probe.terminations.fetch_add(1, Ordering::SeqCst);
    }
}

/// Notifier recording every delivered message.
pub struct MockNotifier {
    sent: Arc<Mutex<Vec<String>>>,
}

impl MockNotifier {
    pub fn new() -> (Self, Arc<Mutex<Vec<String>>>) {
        let sent = Arc::new(Mutex::new(Vec::new()));
        (Self { sent: Arc::clone(&sent) }, sent)
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    fn name(&self) -> &'static str {
        "mock-notifier"
    }

    async fn send_message(&self, text: &str) {
        self.sent.lock().unwrap().push(text.to_string());
    }
}

/// Count recorded messages containing a marker word.
#[allow(dead_code)]
pub fn count_containing(messages: &Arc<Mutex<Vec<String>>>, needle: &str) -> usize {
    messages
        .lock()
        .unwrap()
        .iter()
        .filter(|message| message.contains(needle))
        .count()
}
