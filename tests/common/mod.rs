//! Shared fakes for bootstrap integration tests.

use std::net::Ipv6Addr;
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use ipv6_bootstrap::config::BootstrapConfig;
use ipv6_bootstrap::lifecycle::{HandoffError, Launcher, ServerCommand};
use ipv6_bootstrap::net::{AssignmentOutcome, InterfaceAddress, Link, NetError, NetworkOps};

/// Config with every delay zeroed and the list file under `dir`.
pub fn fast_config(dir: &Path) -> BootstrapConfig {
    let mut config = BootstrapConfig::default();
    config.network.startup_delay_secs = 0;
    config.discovery.max_attempts = 3;
    config.discovery.retry_interval_secs = 0;
    config.rotation.list_file = dir.join("ipv6_ips.txt");
    config
}

/// Scripted host network.
#[derive(Default)]
pub struct MockNetwork {
    pub default_route: Option<String>,
    pub links: Vec<Link>,
    pub addresses: Vec<InterfaceAddress>,
    /// Addresses only show up from this attempt on (1-based); 0 means immediately.
    pub addresses_from_attempt: u32,
    pub deny_assignment: bool,
    pub listing_calls: AtomicU32,
    pub diagnostics_calls: AtomicU32,
    pub assigned: Mutex<Vec<(String, Ipv6Addr, u8)>>,
}

impl MockNetwork {
    pub fn with_global_address(iface: &str, addr: &str) -> Self {
        Self {
            default_route: Some(iface.to_string()),
            addresses: vec![InterfaceAddress {
                addr: addr.parse().unwrap(),
                prefix_len: 64,
                flags: vec![],
            }],
            ..Default::default()
        }
    }

    pub fn assigned(&self) -> Vec<(String, Ipv6Addr, u8)> {
        self.assigned.lock().unwrap().clone()
    }
}

#[async_trait]
impl NetworkOps for MockNetwork {
    async fn default_route_interface(&self) -> Result<Option<String>, NetError> {
        Ok(self.default_route.clone())
    }

    async fn links(&self) -> Result<Vec<Link>, NetError> {
        Ok(self.links.clone())
    }

    async fn global_addresses(&self, _iface: &str) -> Result<Vec<InterfaceAddress>, NetError> {
        let attempt = self.listing_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if attempt >= self.addresses_from_attempt {
            Ok(self.addresses.clone())
        } else {
            Ok(vec![])
        }
    }

    async fn add_address(
        &self,
        iface: &str,
        addr: Ipv6Addr,
        prefix_len: u8,
    ) -> Result<AssignmentOutcome, NetError> {
        self.assigned
            .lock()
            .unwrap()
            .push((iface.to_string(), addr, prefix_len));

        if self.deny_assignment {
            return Err(NetError::CommandFailed {
                command: format!("ip -6 addr add {}/{} dev {}", addr, prefix_len, iface),
                code: Some(2),
                stderr: "RTNETLINK answers: Operation not permitted".into(),
            });
        }
        if self.addresses.iter().any(|a| a.addr == addr) {
            return Ok(AssignmentOutcome::AlreadyPresent);
        }
        Ok(AssignmentOutcome::Assigned)
    }

    async fn diagnostics(&self, iface: &str) -> String {
        self.diagnostics_calls.fetch_add(1, Ordering::SeqCst);
        format!("$ ip -6 addr show dev {}\n", iface)
    }
}

/// Launcher that records instead of exec-ing.
#[derive(Default)]
pub struct RecordingLauncher {
    pub launches: Mutex<Vec<ServerCommand>>,
}

impl RecordingLauncher {
    pub fn count(&self) -> usize {
        self.launches.lock().unwrap().len()
    }
}

impl Launcher for RecordingLauncher {
    fn launch(&self, command: &ServerCommand) -> Result<(), HandoffError> {
        self.launches.lock().unwrap().push(command.clone());
        Ok(())
    }
}
