//! Integration tests for the supervisory monitor loop.
//!
//! Covers the cycle semantics end to end with scripted ports: alarm edges
//! driving display power, per-class fault debouncing, browser restarts
//! with fresh session URLs, and the startup and shutdown sequences.

mod common;

use std::sync::atomic::Ordering;
use std::time::Duration;

use common::{count_containing, MockAlarmSource, MockBrowser, MockDevice, MockNotifier};
use einsatzmonitor::services::{AlarmMonitor, MonitorDaemonConfig};

fn daemon_config() -> MonitorDaemonConfig {
    MonitorDaemonConfig {
        poll_interval: Duration::from_millis(50),
        notify_on_failure: true,
        notify_on_start: false,
    }
}

#[tokio::test]
async fn test_alarm_appearance_powers_display_on() {
    let (device, probe) = MockDevice::new();
    let (alarms, _script) = MockAlarmSource::new(&[false, true]);
    let (browser, _browser_probe) = MockBrowser::new();
    let (notifier, _sent) = MockNotifier::new();
    let mut monitor = AlarmMonitor::new(daemon_config(), device, alarms, browser, notifier);
    let handle = monitor.handle();

    monitor.run_cycle().await;
    assert_eq!(probe.standby_calls.load(Ordering::SeqCst), 1);
    assert!(!handle.status().await.alarm_active);

    monitor.run_cycle().await;
    assert_eq!(probe.power_on_calls.load(Ordering::SeqCst), 1);
    assert!(probe.is_on.load(Ordering::SeqCst));
    let status = handle.status().await;
    assert!(status.alarm_active);
    assert_eq!(status.cycles, 2);
    assert!(status.last_cycle.is_some());
}

#[tokio::test]
async fn test_alarm_clearance_returns_display_to_standby() {
    let (device, probe) = MockDevice::new();
    let (alarms, _script) = MockAlarmSource::new(&[true, false]);
    let (browser, _browser_probe) = MockBrowser::new();
    let (notifier, _sent) = MockNotifier::new();
    let mut monitor = AlarmMonitor::new(daemon_config(), device, alarms, browser, notifier);

    monitor.run_cycle().await;
    assert_eq!(probe.power_on_calls.load(Ordering::SeqCst), 1);

    monitor.run_cycle().await;
    assert_eq!(probe.standby_calls.load(Ordering::SeqCst), 1);
    assert!(!probe.is_on.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_device_fault_notifies_once_per_transition() {
    let (device, probe) = MockDevice::new();
    let (alarms, _script) = MockAlarmSource::new(&[false]);
    let (browser, _browser_probe) = MockBrowser::new();
    let (notifier, sent) = MockNotifier::new();
    let mut monitor = AlarmMonitor::new(daemon_config(), device, alarms, browser, notifier);

    probe.fail_commands.store(true, Ordering::SeqCst);
    monitor.run_cycle().await;
    monitor.run_cycle().await;
    monitor.run_cycle().await;
    // Three failing cycles, one problem notification.
    assert_eq!(count_containing(&sent, "Problem"), 1);
    assert_eq!(count_containing(&sent, "HDMI CEC"), 1);

    probe.fail_commands.store(false, Ordering::SeqCst);
    monitor.run_cycle().await;
    monitor.run_cycle().await;
    assert_eq!(count_containing(&sent, "Resolved"), 1);
    assert_eq!(count_containing(&sent, "reachable again"), 1);
}

#[tokio::test]
async fn test_fault_classes_raise_and_clear_independently() {
    let (device, device_probe) = MockDevice::new();
    let (alarms, _script) = MockAlarmSource::new(&[false]);
    let (browser, browser_probe) = MockBrowser::new();
    let (notifier, sent) = MockNotifier::new();
    let mut monitor = AlarmMonitor::new(daemon_config(), device, alarms, browser, notifier);

    device_probe.fail_commands.store(true, Ordering::SeqCst);
    browser_probe.fail_start.store(true, Ordering::SeqCst);
    monitor.run_cycle().await;
    monitor.run_cycle().await;

    assert_eq!(count_containing(&sent, "Problem"), 2);
    assert_eq!(count_containing(&sent, "HDMI CEC"), 1);
    assert_eq!(count_containing(&sent, "dashboard browser"), 1);

    device_probe.fail_commands.store(false, Ordering::SeqCst);
    browser_probe.fail_start.store(false, Ordering::SeqCst);
    monitor.run_cycle().await;
    monitor.run_cycle().await;

    assert_eq!(count_containing(&sent, "Resolved"), 2);
    assert_eq!(count_containing(&sent, "Problem"), 2);
}

#[tokio::test]
async fn test_browser_restart_uses_a_fresh_session_url() {
    let (device, _probe) = MockDevice::new();
    let (alarms, script) = MockAlarmSource::new(&[false]);
    let (browser, browser_probe) = MockBrowser::new();
    let (notifier, _sent) = MockNotifier::new();
    let mut monitor = AlarmMonitor::new(daemon_config(), device, alarms, browser, notifier);
    let handle = monitor.handle();

    // Browser starts dead; first cycle brings it up.
    monitor.run_cycle().await;
    {
        let urls = browser_probe.started_urls.lock().unwrap();
        assert_eq!(urls.as_slice(), ["https://dashboard.example.test/session-1"]);
    }

    // It dies again; the next cycle restarts it with a new session.
    browser_probe.alive.store(false, Ordering::SeqCst);
    monitor.run_cycle().await;
    {
        let urls = browser_probe.started_urls.lock().unwrap();
        assert_eq!(urls.len(), 2);
        assert_eq!(urls[1], "https://dashboard.example.test/session-2");
    }
    assert_eq!(script.url_requests.load(Ordering::SeqCst), 2);
    assert_eq!(handle.status().await.browser_restarts, 2);
}

#[tokio::test]
async fn test_browser_left_alone_while_alive() {
    let (device, _probe) = MockDevice::new();
    let (alarms, _script) = MockAlarmSource::new(&[false]);
    let (browser, browser_probe) = MockBrowser::new();
    let (notifier, _sent) = MockNotifier::new();
    let mut monitor = AlarmMonitor::new(daemon_config(), device, alarms, browser, notifier);

    monitor.run_cycle().await;
    monitor.run_cycle().await;
    monitor.run_cycle().await;

    // One initial start, no further restarts while it keeps running.
    assert_eq!(browser_probe.started_urls.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_browser_restart_skipped_without_a_session() {
    let (device, _probe) = MockDevice::new();
    let (alarms, script) = MockAlarmSource::new(&[false]);
    let (browser, browser_probe) = MockBrowser::new();
    let (notifier, sent) = MockNotifier::new();
    let mut monitor = AlarmMonitor::new(daemon_config(), device, alarms, browser, notifier);

    script.url_ok.store(false, Ordering::SeqCst);
    monitor.run_cycle().await;
    assert!(browser_probe.started_urls.lock().unwrap().is_empty());
    assert_eq!(count_containing(&sent, "dashboard browser"), 1);

    script.url_ok.store(true, Ordering::SeqCst);
    monitor.run_cycle().await;
    assert_eq!(browser_probe.started_urls.lock().unwrap().len(), 1);
    assert_eq!(count_containing(&sent, "running again"), 1);
}

#[tokio::test]
async fn test_no_notifications_when_disabled() {
    let (device, probe) = MockDevice::new();
    let (alarms, _script) = MockAlarmSource::new(&[false]);
    let (browser, _browser_probe) = MockBrowser::new();
    let (notifier, sent) = MockNotifier::new();
    let config = MonitorDaemonConfig {
        notify_on_failure: false,
        ..daemon_config()
    };
    let mut monitor = AlarmMonitor::new(config, device, alarms, browser, notifier);

    probe.fail_commands.store(true, Ordering::SeqCst);
    monitor.run_cycle().await;
    monitor.run_cycle().await;
    probe.fail_commands.store(false, Ordering::SeqCst);
    monitor.run_cycle().await;

    assert!(sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_cycle_completes_with_every_collaborator_failing() {
    let (device, device_probe) = MockDevice::new();
    let (alarms, script) = MockAlarmSource::new(&[false]);
    let (browser, browser_probe) = MockBrowser::new();
    let (notifier, sent) = MockNotifier::new();
    let mut monitor = AlarmMonitor::new(daemon_config(), device, alarms, browser, notifier);
    let handle = monitor.handle();

    device_probe.fail_commands.store(true, Ordering::SeqCst);
    browser_probe.fail_start.store(true, Ordering::SeqCst);
    script.url_ok.store(false, Ordering::SeqCst);

    monitor.run_cycle().await;
    monitor.run_cycle().await;

    let status = handle.status().await;
    assert_eq!(status.cycles, 2);
    assert!(status.device_fault);
    assert!(status.browser_fault);
    assert_eq!(count_containing(&sent, "Problem"), 2);
}

#[tokio::test]
async fn test_shutdown_releases_display_and_browser() {
    let (device, probe) = MockDevice::new();
    let (alarms, _script) = MockAlarmSource::new(&[true]);
    let (browser, browser_probe) = MockBrowser::new();
    let (notifier, _sent) = MockNotifier::new();
    let mut monitor = AlarmMonitor::new(daemon_config(), device, alarms, browser, notifier);

    probe.is_on.store(true, Ordering::SeqCst);
    monitor.shutdown().await;

    assert_eq!(probe.standby_calls.load(Ordering::SeqCst), 1);
    assert_eq!(browser_probe.terminations.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_shutdown_terminates_browser_even_when_device_unreachable() {
    let (device, probe) = MockDevice::new();
    let (alarms, _script) = MockAlarmSource::new(&[false]);
    let (browser, browser_probe) = MockBrowser::new();
    let (notifier, _sent) = MockNotifier::new();
    let mut monitor = AlarmMonitor::new(daemon_config(), device, alarms, browser, notifier);

    probe.fail_commands.store(true, Ordering::SeqCst);
    monitor.shutdown().await;

    assert_eq!(probe.standby_calls.load(Ordering::SeqCst), 0);
    assert_eq!(browser_probe.terminations.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_run_announces_start_and_stops_cleanly() {
    let (device, _probe) = MockDevice::new();
    let (alarms, _script) = MockAlarmSource::new(&[false]);
    let (browser, browser_probe) = MockBrowser::new();
    let (notifier, sent) = MockNotifier::new();
    let config = MonitorDaemonConfig {
        notify_on_start: true,
        ..daemon_config()
    };
    let monitor = AlarmMonitor::new(config, device, alarms, browser, notifier);
    let handle = monitor.handle();

    let task = tokio::spawn(monitor.run());
    tokio::time::sleep(Duration::from_millis(120)).await;
    handle.stop();
    tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .expect("monitor loop should stop after the stop request")
        .expect("monitor task should not panic");

    {
        let messages = sent.lock().unwrap();
        assert_eq!(messages.first().map(String::as_str), Some("START - Alarm monitor started"));
    }
    let status = handle.status().await;
    assert!(!status.running);
    assert!(status.cycles >= 1);
    assert_eq!(browser_probe.terminations.load(Ordering::SeqCst), 1);
}
