//! Kiosk browser supervisor.
//!
//! Spawns Chromium in kiosk trim pointed at the session-scoped dashboard
//! URL, watches its liveness without blocking, and restarts it at most
//! once per death. Before every start the crash marker in the profile's
//! Preferences file is cleared in place so the "restore pages?" bubble
//! never reaches the screen.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use tokio::process::{Child, Command};
use tracing::{debug, error, info, warn};

use crate::domain::errors::BrowserError;
use crate::domain::models::BrowserConfig;
use crate::domain::ports::KioskBrowser;

/// The marker Chromium leaves in Preferences after an unclean exit.
const CRASH_MARKER: &[u8] = br#""exit_type":"Crashed""#;
/// Replacement; every byte outside the marker stays untouched.
const CLEAN_MARKER: &[u8] = br#""exit_type":"Normal""#;

/// Kiosk flags; the display flag is prepended and the URL appended.
const KIOSK_FLAGS: &[&str] = &[
    "--noerrdialogs",
    "--disable-session-restore",
    "--disable-session-crashed-bubble",
    "--disable-infobars",
    "--start-fullscreen",
];

fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => match std::env::var_os("HOME") {
            Some(home) => PathBuf::from(home).join(rest),
            None => PathBuf::from(path),
        },
        None => PathBuf::from(path),
    }
}

/// Replace every `needle` in `haystack`; `None` when nothing matched.
fn replace_all_bytes(haystack: &[u8], needle: &[u8], replacement: &[u8]) -> Option<Vec<u8>> {
    let mut out = Vec::with_capacity(haystack.len());
    let mut i = 0;
    let mut found = false;
    while i < haystack.len() {
        if haystack[i..].starts_with(needle) {
            out.extend_from_slice(replacement);
            i += needle.len();
            found = true;
        } else {
            out.push(haystack[i]);
            i += 1;
        }
    }
    found.then_some(out)
}

/// Clear the crash marker in the given Preferences file.
///
/// The edit is byte-precise: only the marker itself changes, nothing is
/// re-serialized. A missing file or missing marker is a silent no-op.
/// Returns whether a marker was cleared.
pub(crate) async fn clear_crash_marker(preferences: &Path) -> std::io::Result<bool> {
    let content = match tokio::fs::read(preferences).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(false),
        Err(err) => return Err(err),
    };
    match replace_all_bytes(&content, CRASH_MARKER, CLEAN_MARKER) {
        Some(cleaned) => {
            tokio::fs::write(preferences, cleaned).await?;
            Ok(true)
        }
        None => Ok(false),
    }
}

/// Supervisor for the Chromium kiosk process.
pub struct ChromiumBrowser {
    config: BrowserConfig,
    child: Option<Child>,
}

impl ChromiumBrowser {
    pub fn new(config: BrowserConfig) -> Self {
        Self { config, child: None }
    }

    fn preferences_path(&self) -> PathBuf {
        expand_home(&self.config.profile_dir).join("Default").join("Preferences")
    }

    fn build_command(&self, url: &str) -> Command {
        let mut cmd = Command::new(&self.config.binary);
        cmd.arg(format!("--display={}", self.config.display));
        cmd.args(KIOSK_FLAGS);
        cmd.args(&self.config.extra_flags);
        cmd.arg(url);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl KioskBrowser for ChromiumBrowser {
    async fn start(&mut self, url: &str) -> Result<(), BrowserError> {
        // A replaced browser must not linger.
        if let Some(mut old) = self.child.take() {
            let _ = old.start_kill();
        }

        let preferences = self.preferences_path();
        match clear_crash_marker(&preferences).await {
            Ok(true) => debug!(path = %preferences.display(), "Cleared browser crash marker"),
            Ok(false) => {}
            Err(err) => warn!(
                error = %err,
                path = %preferences.display(),
                "Could not clear browser crash marker"
            ),
        }

        info!(binary = %self.config.binary, url = %url, "Starting kiosk browser");
        let child = self.build_command(url).spawn().map_err(|e| BrowserError::Spawn {
            binary: self.config.binary.clone(),
            source: e,
        })?;
        self.child = Some(child);
        Ok(())
    }

    fn is_alive(&mut self) -> bool {
        match self.child.as_mut() {
            Some(child) => match child.try_wait() {
                Ok(None) => true,
                Ok(Some(status)) => {
                    debug!(?status, "Kiosk browser exited");
                    self.child = None;
                    false
                }
                Err(err) => {
                    warn!(error = %err, "Could not check kiosk browser, assuming dead");
                    self.child = None;
                    false
                }
            },
            None => false,
        }
    }

    async fn ensure_alive(&mut self, url: &str) -> Result<bool, BrowserError> {
        if self.is_alive() {
            return Ok(false);
        }
        self.start(url).await?;
        Ok(true)
    }

    async fn terminate(&mut self) {
        let Some(mut child) = self.child.take() else {
            return;
        };
        info!("Terminating kiosk browser");

        // SIGTERM first so Chromium records a clean exit in its profile.
        if let Some(pid) = child.id() {
            match i32::try_from(pid) {
                Ok(raw) => {
                    if let Err(err) = signal::kill(Pid::from_raw(raw), Signal::SIGTERM) {
                        warn!(error = %err, "Failed to signal kiosk browser");
                    }
                }
                Err(_) => warn!(pid, "Kiosk browser pid out of signalling range"),
            }
        }

        match tokio::time::timeout(
            Duration::from_secs(self.config.terminate_timeout_secs),
            child.wait(),
        )
        .await
        {
            Ok(Ok(status)) => info!(?status, "Kiosk browser exited"),
            Ok(Err(err)) => error!(error = %err, "Error waiting for kiosk browser to exit"),
            Err(_) => {
                warn!("Kiosk browser shutdown timeout, forcing kill");
                let _ = child.kill().await;
            }
        }
    }
}

impl Drop for ChromiumBrowser {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.start_kill();
        }
    }
}
