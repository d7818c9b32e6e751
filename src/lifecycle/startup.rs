//! Bootstrap sequencing.
//!
//! # Responsibilities
//! - Prepare the address list file (truncate)
//! - Wait for the network stack, resolve the interface, discover the base address
//! - Assign and record the rotation siblings
//! - Hand off to the application server
//!
//! # Design Decisions
//! - Steps run strictly in order, never concurrently
//! - Every network failure is logged and downgraded; the only error that
//!   leaves this module is a failed handoff
//! - The list file exists after every run, even when empty

use std::net::Ipv6Addr;
use std::path::PathBuf;

use crate::config::BootstrapConfig;
use crate::lifecycle::handoff::{HandoffError, Launcher, ServerCommand};
use crate::net::{
    discover_base_address, generate_siblings, resolve_interface, AssignmentOutcome, NetworkOps,
    Prefix64,
};
use crate::resilience::RetryPolicy;
use crate::rotation::ListWriter;

/// Summary of one bootstrap run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootstrapReport {
    pub interface: Option<String>,
    pub base_address: Option<Ipv6Addr>,
    pub attempted: usize,
    pub assigned: usize,
    pub already_present: usize,
    pub failed: usize,
    pub listed: usize,
    pub list_file: PathBuf,
}

impl BootstrapReport {
    fn record(&mut self, outcome: &AssignmentOutcome) {
        self.attempted += 1;
        match outcome {
            AssignmentOutcome::Assigned => self.assigned += 1,
            AssignmentOutcome::AlreadyPresent => self.already_present += 1,
            AssignmentOutcome::Failed(_) => self.failed += 1,
        }
    }

    /// Whether any rotation address is usable.
    pub fn rotation_ready(&self) -> bool {
        self.assigned + self.already_present > 0
    }
}

/// Runs the bootstrap steps against a `NetworkOps` implementation.
pub struct Bootstrap<'a> {
    config: &'a BootstrapConfig,
    ops: &'a dyn NetworkOps,
}

impl<'a> Bootstrap<'a> {
    pub fn new(config: &'a BootstrapConfig, ops: &'a dyn NetworkOps) -> Self {
        Self { config, ops }
    }

    /// Run every step up to, but not including, the server handoff.
    pub async fn run(&self) -> BootstrapReport {
        let rotation = &self.config.rotation;
        let mut report = BootstrapReport {
            list_file: rotation.list_file.clone(),
            ..Default::default()
        };

        let mut writer = match ListWriter::create(&rotation.list_file) {
            Ok(writer) => Some(writer),
            Err(e) => {
                tracing::warn!(
                    path = %rotation.list_file.display(),
                    error = %e,
                    "Cannot prepare address list file, continuing without it"
                );
                None
            }
        };

        let delay = self.config.network.startup_delay();
        if !delay.is_zero() {
            tracing::info!(delay_secs = delay.as_secs(), "Waiting for network stack");
            tokio::time::sleep(delay).await;
        }

        let Some(iface) =
            resolve_interface(self.ops, self.config.network.interface.as_deref()).await
        else {
            tracing::warn!("No network interface found, skipping IPv6 setup");
            finish_list(writer, &mut report);
            return report;
        };
        report.interface = Some(iface.clone());

        let policy = RetryPolicy::from(&self.config.discovery);
        let Some(base) = discover_base_address(self.ops, &iface, policy).await else {
            finish_list(writer, &mut report);
            return report;
        };
        report.base_address = Some(base);

        let prefix = Prefix64::from_addr(base);
        tracing::info!(interface = %iface, base = %base, prefix = %prefix, "Derived /64 prefix");

        append(&mut writer, base);

        let siblings = generate_siblings(
            base,
            rotation.first_suffix,
            rotation.address_count.saturating_sub(1),
        );
        tracing::info!(count = siblings.len(), "Assigning rotation addresses");

        let mut warned_privileges = false;
        for addr in siblings {
            let outcome = match self.ops.add_address(&iface, addr, rotation.prefix_len).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    if e.is_permission_denied() && !warned_privileges {
                        tracing::warn!("Address assignment needs CAP_NET_ADMIN; the platform may not grant it");
                        warned_privileges = true;
                    }
                    AssignmentOutcome::Failed(e.to_string())
                }
            };

            match &outcome {
                AssignmentOutcome::Failed(reason) => {
                    tracing::warn!(address = %addr, interface = %iface, reason = %reason, "Address assignment failed")
                }
                other => tracing::debug!(address = %addr, interface = %iface, outcome = %other, "Address ready"),
            }

            report.record(&outcome);
            append(&mut writer, addr);
        }

        finish_list(writer, &mut report);
        report
    }
}

fn append(writer: &mut Option<ListWriter>, addr: Ipv6Addr) {
    let Some(w) = writer.as_mut() else {
        return;
    };
    if let Err(e) = w.append(addr) {
        tracing::warn!(path = %w.path().display(), error = %e, "Failed to write address, dropping list file");
        *writer = None;
    }
}

fn finish_list(writer: Option<ListWriter>, report: &mut BootstrapReport) {
    let Some(writer) = writer else {
        return;
    };
    let path = writer.path().to_path_buf();
    match writer.finish() {
        Ok(count) => {
            report.listed = count;
            tracing::info!(path = %path.display(), count, "Address list written");
        }
        Err(e) => tracing::warn!(path = %path.display(), error = %e, "Failed to flush address list"),
    }
}

/// Run the bootstrap, then start the server exactly once.
///
/// Returns only if the launcher returns: on Unix that means the exec failed.
pub async fn run_and_handoff(
    config: &BootstrapConfig,
    ops: &dyn NetworkOps,
    launcher: &dyn Launcher,
) -> Result<BootstrapReport, HandoffError> {
    let report = Bootstrap::new(config, ops).run().await;

    tracing::info!(
        interface = report.interface.as_deref().unwrap_or("-"),
        base = %report.base_address.map(|a| a.to_string()).unwrap_or_else(|| "-".into()),
        attempted = report.attempted,
        assigned = report.assigned,
        already_present = report.already_present,
        failed = report.failed,
        listed = report.listed,
        rotation_ready = report.rotation_ready(),
        "Bootstrap finished"
    );

    let command = ServerCommand::from_config(&config.server);
    launcher.launch(&command)?;
    Ok(report)
}
