//! End-to-end bootstrap runs against a scripted network.

use std::fs;
use std::net::Ipv6Addr;
use std::sync::atomic::Ordering;

use ipv6_bootstrap::lifecycle::run_and_handoff;
use ipv6_bootstrap::net::Link;
use ipv6_bootstrap::rotation::AddressPool;

mod common;
use common::{fast_config, MockNetwork, RecordingLauncher};

const BASE: &str = "2a01:4f8:c17:b8f1:9c3e:1ff:fe42:7";

fn read_lines(path: &std::path::Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn test_full_list_written_and_server_started() {
    let dir = tempfile::tempdir().unwrap();
    let config = fast_config(dir.path());
    let net = MockNetwork::with_global_address("eth0", BASE);
    let launcher = RecordingLauncher::default();

    let report = run_and_handoff(&config, &net, &launcher).await.unwrap();

    let lines = read_lines(&config.rotation.list_file);
    assert_eq!(lines.len(), 200);
    assert_eq!(lines[0], BASE);
    for (i, line) in lines[1..].iter().enumerate() {
        assert_eq!(line, &format!("2a01:4f8:c17:b8f1::{}", i + 2));
    }

    let assigned = net.assigned();
    assert_eq!(assigned.len(), 199);
    assert!(assigned.iter().all(|(iface, _, len)| iface == "eth0" && *len == 64));

    assert_eq!(report.interface.as_deref(), Some("eth0"));
    assert_eq!(report.base_address, Some(BASE.parse().unwrap()));
    assert_eq!(report.assigned, 199);
    assert_eq!(report.listed, 200);
    assert!(report.rotation_ready());

    assert_eq!(launcher.count(), 1);
    assert_eq!(
        launcher.launches.lock().unwrap()[0].to_string(),
        "uvicorn app:app --host 0.0.0.0 --port 7860 --workers 1"
    );
}

#[tokio::test]
async fn test_base_inside_sibling_range_keeps_full_list() {
    let dir = tempfile::tempdir().unwrap();
    let config = fast_config(dir.path());
    let net = MockNetwork::with_global_address("eth0", "2001:db8:1:2::2");
    let launcher = RecordingLauncher::default();

    let report = run_and_handoff(&config, &net, &launcher).await.unwrap();

    let lines = read_lines(&config.rotation.list_file);
    assert_eq!(lines.len(), 200);
    assert_eq!(lines[0], "2001:db8:1:2::2");
    for (i, line) in lines[1..].iter().enumerate() {
        assert_eq!(line, &format!("2001:db8:1:2::{}", i + 2));
    }

    assert_eq!(net.assigned().len(), 199);
    assert_eq!(report.attempted, 199);
    assert_eq!(report.already_present, 1);
    assert_eq!(report.assigned, 198);
    assert_eq!(report.listed, 200);
    assert_eq!(launcher.count(), 1);
}

#[tokio::test]
async fn test_no_interface_leaves_empty_list_and_starts_server() {
    let dir = tempfile::tempdir().unwrap();
    let config = fast_config(dir.path());
    let net = MockNetwork {
        links: vec![Link {
            index: 1,
            name: "lo".into(),
            flags: vec!["LOOPBACK".into(), "UP".into()],
        }],
        ..Default::default()
    };
    let launcher = RecordingLauncher::default();

    let report = run_and_handoff(&config, &net, &launcher).await.unwrap();

    assert!(config.rotation.list_file.exists());
    assert_eq!(fs::read_to_string(&config.rotation.list_file).unwrap(), "");
    assert!(report.interface.is_none());
    assert_eq!(net.listing_calls.load(Ordering::SeqCst), 0);
    assert_eq!(launcher.count(), 1);
}

#[tokio::test]
async fn test_falls_back_to_first_non_loopback_link() {
    let dir = tempfile::tempdir().unwrap();
    let config = fast_config(dir.path());
    let mut net = MockNetwork::with_global_address("unused", BASE);
    net.default_route = None;
    net.links = vec![
        Link { index: 1, name: "lo".into(), flags: vec!["LOOPBACK".into()] },
        Link { index: 2, name: "ens3".into(), flags: vec!["UP".into()] },
    ];
    let launcher = RecordingLauncher::default();

    let report = run_and_handoff(&config, &net, &launcher).await.unwrap();

    assert_eq!(report.interface.as_deref(), Some("ens3"));
    assert!(net.assigned().iter().all(|(iface, _, _)| iface == "ens3"));
}

#[tokio::test]
async fn test_exhausted_retries_log_diagnostics_and_start_once() {
    let dir = tempfile::tempdir().unwrap();
    let config = fast_config(dir.path());
    let mut net = MockNetwork::with_global_address("eth0", BASE);
    net.addresses_from_attempt = 100;
    let launcher = RecordingLauncher::default();

    let report = run_and_handoff(&config, &net, &launcher).await.unwrap();

    assert_eq!(net.listing_calls.load(Ordering::SeqCst), 3);
    assert_eq!(net.diagnostics_calls.load(Ordering::SeqCst), 1);
    assert!(net.assigned().is_empty());
    assert!(report.base_address.is_none());
    assert_eq!(fs::read_to_string(&config.rotation.list_file).unwrap(), "");
    assert_eq!(launcher.count(), 1);
}

#[tokio::test]
async fn test_address_found_on_later_attempt() {
    let dir = tempfile::tempdir().unwrap();
    let config = fast_config(dir.path());
    let mut net = MockNetwork::with_global_address("eth0", BASE);
    net.addresses_from_attempt = 3;
    let launcher = RecordingLauncher::default();

    let report = run_and_handoff(&config, &net, &launcher).await.unwrap();

    assert_eq!(net.listing_calls.load(Ordering::SeqCst), 3);
    assert_eq!(net.diagnostics_calls.load(Ordering::SeqCst), 0);
    assert_eq!(report.listed, 200);
}

#[tokio::test]
async fn test_rerun_truncates_stale_entries() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = fast_config(dir.path());
    fs::write(&config.rotation.list_file, "2001:db8:dead:beef::1\n".repeat(500)).unwrap();

    config.rotation.address_count = 5;
    let net = MockNetwork::with_global_address("eth0", "2001:db8:1:2::10");
    run_and_handoff(&config, &net, &RecordingLauncher::default())
        .await
        .unwrap();

    assert_eq!(
        read_lines(&config.rotation.list_file),
        vec!["2001:db8:1:2::10", "2001:db8:1:2::2", "2001:db8:1:2::3", "2001:db8:1:2::4", "2001:db8:1:2::5"]
    );

    // Second run with no interface must not keep the first run's list.
    let empty = MockNetwork::default();
    run_and_handoff(&config, &empty, &RecordingLauncher::default())
        .await
        .unwrap();
    assert_eq!(fs::read_to_string(&config.rotation.list_file).unwrap(), "");
}

#[tokio::test]
async fn test_permission_denied_does_not_abort_loop() {
    let dir = tempfile::tempdir().unwrap();
    let config = fast_config(dir.path());
    let mut net = MockNetwork::with_global_address("eth0", BASE);
    net.deny_assignment = true;
    let launcher = RecordingLauncher::default();

    let report = run_and_handoff(&config, &net, &launcher).await.unwrap();

    assert_eq!(net.assigned().len(), 199);
    assert_eq!(report.attempted, 199);
    assert_eq!(report.failed, 199);
    assert!(!report.rotation_ready());
    assert_eq!(read_lines(&config.rotation.list_file).len(), 200);
    assert_eq!(launcher.count(), 1);
}

#[tokio::test]
async fn test_written_list_loads_into_pool() {
    let dir = tempfile::tempdir().unwrap();
    let config = fast_config(dir.path());
    let net = MockNetwork::with_global_address("eth0", BASE);
    run_and_handoff(&config, &net, &RecordingLauncher::default())
        .await
        .unwrap();

    let pool = AddressPool::load(&config.rotation.list_file);
    assert_eq!(pool.len(), 200);
    let sibling: Ipv6Addr = "2a01:4f8:c17:b8f1::200".parse().unwrap();
    assert!(pool.contains(&sibling));
}
