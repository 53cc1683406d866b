//! CEC transport backends.
//!
//! Both backends speak the line-oriented `cec-client` protocol; they differ
//! in how commands reach the binary. [`ChannelTransport`] keeps a single
//! `cec-client` running and drains its stdout through a background reader
//! task into a bounded queue. [`OneShotTransport`] spawns a fresh
//! `cec-client -s` per command and collects its full output. The choice is
//! made once at startup from configuration.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, Command};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::time::{timeout, Instant};
use tracing::{debug, trace};

use crate::domain::errors::DeviceError;
use crate::domain::models::CecConfig;

/// Capacity of the stdout line queue. Chatter beyond this backpressures the
/// reader task instead of growing without bound.
const LINE_QUEUE_CAPACITY: usize = 256;

/// Pause that ends open-ended response collection; `scan` output has no
/// terminator line.
const QUIET_GAP: Duration = Duration::from_millis(400);

/// A line of `cec-client` output tagged with its arrival order.
#[derive(Debug, Clone)]
pub struct TaggedLine {
    /// Monotonically increasing arrival sequence number.
    pub seq: u64,
    /// The raw line text.
    pub text: String,
}

/// Transport carrying line-oriented commands to `cec-client`.
#[async_trait]
pub trait CecTransport: Send + Sync {
    /// Get the backend name for logs.
    fn name(&self) -> &'static str;

    /// Send a command that needs no response.
    async fn send(&mut self, command: &str) -> Result<(), DeviceError>;

    /// Send a command and collect the response lines that follow it.
    async fn collect(&mut self, command: &str) -> Result<Vec<String>, DeviceError>;
}

async fn write_line(stdin: &mut ChildStdin, command: &str) -> std::io::Result<()> {
    stdin.write_all(command.as_bytes()).await?;
    stdin.write_all(b"\n").await?;
    stdin.flush().await
}

/// A persistent `cec-client` process with a background stdout reader.
///
/// Responses are correlated positionally: stale queued lines are drained
/// before a command is written, so whatever arrives afterwards (within the
/// command timeout) belongs to that command. A dead channel is respawned
/// transparently on next use; the command that noticed the death still
/// fails, and the caller retries on a later cycle.
pub struct ChannelTransport {
    config: CecConfig,
    child: Option<Child>,
    stdin: Option<ChildStdin>,
    lines: Option<mpsc::Receiver<TaggedLine>>,
}

impl ChannelTransport {
    pub fn new(config: CecConfig) -> Self {
        Self { config, child: None, stdin: None, lines: None }
    }

    fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.config.command_timeout_secs)
    }

    /// Drop queued lines left over from earlier commands or spontaneous
    /// bus traffic. Returns false when the reader side has shut down.
    fn drain_stale(&mut self) -> bool {
        let Some(rx) = self.lines.as_mut() else {
            return false;
        };
        loop {
            match rx.try_recv() {
                Ok(line) => trace!(seq = line.seq, text = %line.text, "Discarding stale CEC line"),
                Err(TryRecvError::Empty) => return true,
                Err(TryRecvError::Disconnected) => return false,
            }
        }
    }

    fn teardown(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.start_kill();
        }
        self.stdin = None;
        self.lines = None;
    }

    async fn ensure_channel(&mut self) -> Result<(), DeviceError> {
        if self.child.is_some() && self.drain_stale() {
            return Ok(());
        }
        self.respawn().await
    }

    async fn respawn(&mut self) -> Result<(), DeviceError> {
        self.teardown();
        debug!(binary = %self.config.binary, "Starting cec-client channel");

        let mut cmd = Command::new(&self.config.binary);
        cmd.args(&self.config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|e| DeviceError::Spawn {
            binary: self.config.binary.clone(),
            source: e,
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| DeviceError::Io(std::io::Error::other("failed to open cec-client stdin")))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| DeviceError::Io(std::io::Error::other("failed to capture cec-client stdout")))?;

        let (tx, rx) = mpsc::channel(LINE_QUEUE_CAPACITY);

        // Reader task: drain stdout for the life of the subprocess. Ends on
        // EOF (child died) or when the transport is dropped; either way the
        // closed channel is how the main side learns the channel is gone.
        tokio::spawn(async move {
            let reader = BufReader::new(stdout);
            let mut lines = reader.lines();
            let mut seq = 0u64;
            while let Ok(Some(text)) = lines.next_line().await {
                seq += 1;
                if tx.send(TaggedLine { seq, text }).await.is_err() {
                    break;
                }
            }
        });

        self.child = Some(child);
        self.stdin = Some(stdin);
        self.lines = Some(rx);
        Ok(())
    }

    async fn write_command(&mut self, command: &str) -> Result<(), DeviceError> {
        let Some(stdin) = self.stdin.as_mut() else {
            return Err(DeviceError::ChannelClosed);
        };
        if let Err(err) = write_line(stdin, command).await {
            self.teardown();
            return Err(DeviceError::Io(err));
        }
        Ok(())
    }

    async fn collect_response(&mut self, command: &str) -> Result<Vec<String>, DeviceError> {
        let deadline = Instant::now() + self.command_timeout();
        let mut collected = Vec::new();

        loop {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            // Wait until the deadline for the first line; once lines are
            // flowing, a short quiet gap ends the response.
            let wait = if collected.is_empty() {
                deadline - now
            } else {
                QUIET_GAP.min(deadline - now)
            };
            let Some(rx) = self.lines.as_mut() else {
                return Err(DeviceError::ChannelClosed);
            };
            match timeout(wait, rx.recv()).await {
                Ok(Some(line)) => {
                    trace!(seq = line.seq, text = %line.text, "CEC response line");
                    collected.push(line.text);
                }
                Ok(None) => {
                    self.teardown();
                    if collected.is_empty() {
                        return Err(DeviceError::ChannelClosed);
                    }
                    break;
                }
                Err(_) => break,
            }
        }

        if collected.is_empty() {
            return Err(DeviceError::Timeout {
                command: command.to_string(),
                timeout_secs: self.config.command_timeout_secs,
            });
        }
        Ok(collected)
    }
}

impl Drop for ChannelTransport {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[async_trait]
impl CecTransport for ChannelTransport {
    fn name(&self) -> &'static str {
        "cec-channel"
    }

    async fn send(&mut self, command: &str) -> Result<(), DeviceError> {
        self.ensure_channel().await?;
        self.write_command(command).await
    }

    async fn collect(&mut self, command: &str) -> Result<Vec<String>, DeviceError> {
        self.ensure_channel().await?;
        self.write_command(command).await?;
        self.collect_response(command).await
    }
}

/// A fresh `cec-client -s` invocation per command.
///
/// The single-command flag makes `cec-client` execute whatever arrives on
/// stdin and exit, so collecting output is just waiting for the process to
/// finish. Slower than the channel but with no long-lived state to lose.
pub struct OneShotTransport {
    config: CecConfig,
}

impl OneShotTransport {
    pub fn new(config: CecConfig) -> Self {
        Self { config }
    }

    async fn run(&self, command: &str) -> Result<Vec<String>, DeviceError> {
        let mut args = self.config.args.clone();
        args.push("-s".to_string());

        let mut cmd = Command::new(&self.config.binary);
        cmd.args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|e| DeviceError::Spawn {
            binary: self.config.binary.clone(),
            source: e,
        })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| DeviceError::Io(std::io::Error::other("failed to open cec-client stdin")))?;
        write_line(&mut stdin, command).await?;
        // Closing stdin is what tells -s mode to run the command and exit.
        drop(stdin);

        let output = timeout(
            Duration::from_secs(self.config.command_timeout_secs),
            child.wait_with_output(),
        )
        .await
        .map_err(|_| DeviceError::Timeout {
            command: command.to_string(),
            timeout_secs: self.config.command_timeout_secs,
        })??;

        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(ToString::to_string)
            .collect())
    }
}

#[async_trait]
impl CecTransport for OneShotTransport {
    fn name(&self) -> &'static str {
        "cec-oneshot"
    }

    async fn send(&mut self, command: &str) -> Result<(), DeviceError> {
        self.run(command).await.map(|_| ())
    }

    async fn collect(&mut self, command: &str) -> Result<Vec<String>, DeviceError> {
        self.run(command).await
    }
}
