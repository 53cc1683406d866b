//! End-to-end tests for the CEC device adapter
//!
//! `CecDevice::from_config` is exercised against a shell stub standing in
//! for `cec-client`, so command writing, response collection and power
//! state parsing all run through a real subprocess for both backends.

#![cfg(unix)]

use std::path::Path;
use std::time::Duration;

use einsatzmonitor::adapters::cec::CecDevice;
use einsatzmonitor::domain::models::{CecBackendKind, CecConfig};
use einsatzmonitor::domain::ports::DeviceController;
use einsatzmonitor::domain::DeviceError;
use tokio_test::{assert_err, assert_ok};

fn stub_config(backend: CecBackendKind, script: &str) -> CecConfig {
    CecConfig {
        backend,
        binary: "sh".to_string(),
        args: vec!["-c".to_string(), script.to_string()],
        device_id: 0,
        device_name: None,
        command_timeout_secs: 5,
        state_cache_secs: 60,
    }
}

/// Poll the stub's command log until `expected` lines arrived; the stub
/// appends asynchronously to the spawned shell's pace.
async fn wait_for_lines(path: &Path, expected: usize) -> Vec<String> {
    for _ in 0..40 {
        if let Ok(content) = tokio::fs::read_to_string(path).await {
            let lines: Vec<String> = content.lines().map(ToString::to_string).collect();
            if lines.len() >= expected {
                return lines;
            }
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("stub never logged {expected} commands");
}

#[tokio::test]
async fn test_channel_backend_reads_power_state() {
    let script = r#"while read cmd; do echo "power status: on"; done"#;
    let mut device = CecDevice::from_config(&stub_config(CecBackendKind::Channel, script));

    assert!(device.is_on().await.unwrap());
}

#[tokio::test]
async fn test_one_shot_backend_reads_power_state() {
    let script = r#"cat >/dev/null; echo "opening a connection..."; echo "power status: standby""#;
    let mut device = CecDevice::from_config(&stub_config(CecBackendKind::OneShot, script));

    assert!(!device.is_on().await.unwrap());
}

#[tokio::test]
async fn test_power_on_wire_sequence() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("commands.log");
    let script = format!(
        r#"while read cmd; do printf '%s\n' "$cmd" >> {}; echo "power status: standby"; done"#,
        log.display()
    );
    let mut device = CecDevice::from_config(&stub_config(CecBackendKind::Channel, &script));

    tokio_test::assert_ok!(device.power_on().await);

    // Status probe first, then power-on, then claiming the active source.
    let commands = wait_for_lines(&log, 3).await;
    assert_eq!(commands, vec!["pow 0", "on 0", "as"]);
}

#[tokio::test]
async fn test_standby_wire_sequence() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("commands.log");
    let script = format!(
        r#"while read cmd; do printf '%s\n' "$cmd" >> {}; echo "power status: on"; done"#,
        log.display()
    );
    let mut device = CecDevice::from_config(&stub_config(CecBackendKind::Channel, &script));

    device.standby().await.unwrap();

    let commands = wait_for_lines(&log, 2).await;
    assert_eq!(commands, vec!["pow 0", "standby 0"]);
}

#[tokio::test]
async fn test_discovery_resolves_device_id_from_scan() {
    let script = r#"cat >/dev/null
echo "CEC bus information"
echo "==================="
echo "device #0: TV"
echo "osd string:    TV"
echo "power status:  on"
echo "device #1:       Recorder 1"
echo "osd string:    Beamer"
echo "power status:  standby""#;
    let mut device = CecDevice::from_config(&stub_config(CecBackendKind::OneShot, script));

    device.discover_device("beamer").await.unwrap();
    assert_eq!(device.device_id(), 1);
}

#[tokio::test]
async fn test_missing_binary_surfaces_spawn_error() {
    let config = CecConfig {
        backend: CecBackendKind::Channel,
        binary: "/nonexistent/cec-client".to_string(),
        ..CecConfig::default()
    };
    let mut device = CecDevice::from_config(&config);

    let err = tokio_test::assert_err!(device.is_on().await);
    assert!(matches!(err, DeviceError::Spawn { .. }));
}
