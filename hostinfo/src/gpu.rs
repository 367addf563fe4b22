//! GPU inventory
//!
//! The inventory is either a list of devices or a statement that no
//! detection capability exists on this host. An empty device list means the
//! capability is there but found nothing, which callers treat differently
//! from a missing capability.

use crate::exec::{CommandExecutor, CommandSpec, ExecError};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// A single accelerator
#[derive(Debug, Clone, PartialEq)]
pub struct GpuDevice {
    pub index: usize,
    pub name: String,
    /// Device memory in MiB
    pub memory_mib: u64,
}

impl GpuDevice {
    pub fn memory_gib(&self) -> f64 {
        self.memory_mib as f64 / 1024.0
    }
}

/// Result of asking a provider for devices
#[derive(Debug, Clone, PartialEq)]
pub enum Inventory {
    /// Detection works; the list may be empty
    Available(Vec<GpuDevice>),
    /// Detection itself is not possible, with the reason
    Unavailable(String),
}

/// Something that can enumerate accelerators
#[async_trait]
pub trait DeviceProvider: Send + Sync {
    /// Short name of the detection mechanism, used in messages
    fn name(&self) -> &str;

    /// The external command the provider runs, if any
    fn command(&self) -> Option<CommandSpec> {
        None
    }

    async fn inventory(&self) -> Inventory;
}

/// Device inventory through `nvidia-smi`
pub struct NvidiaSmi {
    executor: Arc<dyn CommandExecutor>,
    timeout: Duration,
}

impl NvidiaSmi {
    pub const PROGRAM: &'static str = "nvidia-smi";

    pub fn new(executor: Arc<dyn CommandExecutor>, timeout: Duration) -> Self {
        Self { executor, timeout }
    }

    pub fn query() -> CommandSpec {
        CommandSpec::new(Self::PROGRAM).args([
            "--query-gpu=index,name,memory.total",
            "--format=csv,noheader,nounits",
        ])
    }
}

#[async_trait]
impl DeviceProvider for NvidiaSmi {
    fn name(&self) -> &str {
        Self::PROGRAM
    }

    fn command(&self) -> Option<CommandSpec> {
        Some(Self::query())
    }

    async fn inventory(&self) -> Inventory {
        match self.executor.run(&Self::query(), self.timeout).await {
            Ok(output) if output.success() => {
                let devices = parse_query_output(&output.stdout);
                debug!("nvidia-smi reported {} device(s)", devices.len());
                Inventory::Available(devices)
            }
            // Installed but unable to talk to a driver or device.
            Ok(output) => {
                warn!(
                    "nvidia-smi exited with {:?}: {}",
                    output.status,
                    output.stderr.trim()
                );
                Inventory::Available(Vec::new())
            }
            Err(e @ ExecError::NotFound { .. }) => Inventory::Unavailable(e.to_string()),
            Err(e) => {
                warn!("GPU inventory failed: {}", e);
                Inventory::Unavailable(e.to_string())
            }
        }
    }
}

/// Parse `index, name, memory.total` CSV rows as printed by `nvidia-smi`
///
/// Rows with fewer than three columns are skipped. An unparsable index
/// falls back to the row position and unparsable memory (e.g. `[N/A]`) to 0.
pub fn parse_query_output(stdout: &str) -> Vec<GpuDevice> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .enumerate()
        .filter_map(|(position, line)| {
            let parts: Vec<&str> = line.split(',').map(str::trim).collect();
            if parts.len() < 3 {
                return None;
            }
            let last = parts.len() - 1;
            Some(GpuDevice {
                index: parts[0].parse().unwrap_or(position),
                name: parts[1..last].join(","),
                memory_mib: parts[last].parse().unwrap_or(0),
            })
        })
        .collect()
}
