//! Fakes shared by the integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use health::probes::REQUIRED_VARS;
use health::{Console, Environment, HealthConfig, Outcome, Probe, ProbeContext};
use hostinfo::{
    CommandExecutor, CommandOutput, CommandSpec, DeviceProvider, DiskUsage, ExecError,
    ExecResult, GpuDevice, Inventory, SpaceSource,
};
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::NamedTempFile;

pub const KIB_PER_GIB: u64 = 1024 * 1024;

/// Canned response for a program
#[derive(Debug, Clone)]
pub enum Reply {
    Exit(i32, &'static str),
    NotFound,
    Timeout,
}

/// Executor answering from a table keyed by program name
///
/// Programs without an entry behave as if they were not installed.
#[derive(Default)]
pub struct FakeExecutor {
    replies: HashMap<String, Reply>,
    calls: Mutex<Vec<(CommandSpec, Duration)>>,
}

impl FakeExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(mut self, program: &str, reply: Reply) -> Self {
        self.replies.insert(program.to_string(), reply);
        self
    }

    pub fn calls(&self) -> Vec<(CommandSpec, Duration)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandExecutor for FakeExecutor {
    async fn run(&self, command: &CommandSpec, limit: Duration) -> ExecResult<CommandOutput> {
        self.calls.lock().unwrap().push((command.clone(), limit));

        match self.replies.get(&command.program) {
            Some(Reply::Exit(code, stderr)) => Ok(CommandOutput {
                status: Some(*code),
                stdout: String::new(),
                stderr: stderr.to_string(),
            }),
            Some(Reply::Timeout) => Err(ExecError::Timeout {
                program: command.program.clone(),
                timeout: limit,
            }),
            Some(Reply::NotFound) | None => Err(ExecError::NotFound {
                program: command.program.clone(),
            }),
        }
    }
}

pub struct FakeDevices(pub Inventory);

#[async_trait]
impl DeviceProvider for FakeDevices {
    fn name(&self) -> &str {
        "fake-smi"
    }

    async fn inventory(&self) -> Inventory {
        self.0.clone()
    }
}

pub fn h100s(count: usize) -> FakeDevices {
    FakeDevices(Inventory::Available(
        (0..count)
            .map(|index| GpuDevice {
                index,
                name: "NVIDIA H100 80GB HBM3".to_string(),
                memory_mib: 81920,
            })
            .collect(),
    ))
}

/// Disk source returning fixed figures, or an error when `None`
pub struct FixedSpace(pub Option<DiskUsage>);

impl SpaceSource for FixedSpace {
    fn usage(&self, _path: &Path) -> std::io::Result<DiskUsage> {
        self.0
            .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, "statvfs failed"))
    }
}

pub fn meminfo_kib(total_kib: u64, available_kib: u64) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "MemTotal:       {} kB", total_kib).unwrap();
    writeln!(file, "MemFree:        {} kB", available_kib / 2).unwrap();
    writeln!(file, "MemAvailable:   {} kB", available_kib).unwrap();
    file
}

pub fn meminfo_gib(total_gib: u64, available_gib: u64) -> NamedTempFile {
    meminfo_kib(total_gib * KIB_PER_GIB, available_gib * KIB_PER_GIB)
}

/// All required variables set, storage credentials not set
pub fn required_env() -> Environment {
    REQUIRED_VARS
        .iter()
        .map(|key| (key.to_string(), format!("{}-value", key.to_lowercase())))
        .collect()
}

/// Required variables plus storage read credentials
pub fn full_env() -> Environment {
    required_env()
        .with("R2_GRADIENTS_READ_ACCESS_KEY_ID", "read-key")
        .with("R2_GRADIENTS_READ_SECRET_ACCESS_KEY", "read-secret")
}

pub fn context(
    env: Environment,
    executor: Arc<dyn CommandExecutor>,
    devices: FakeDevices,
    disk: Option<DiskUsage>,
    meminfo: &Path,
) -> ProbeContext {
    ProbeContext::system(HealthConfig::default().with_meminfo_path(meminfo), env)
        .with_executor(executor)
        .with_devices(Arc::new(devices))
        .with_disk(Arc::new(FixedSpace(disk)))
}

/// Context in which every default probe passes
pub fn healthy_context(meminfo: &Path) -> ProbeContext {
    let executor = FakeExecutor::new()
        .reply("btcli", Reply::Exit(0, ""))
        .reply("aws", Reply::Exit(0, ""));
    context(
        full_env(),
        Arc::new(executor),
        h100s(8),
        Some(DiskUsage::from_gib(2000, 500)),
        meminfo,
    )
}

pub async fn check(probe: &dyn Probe, ctx: &ProbeContext, verbose: bool) -> (Outcome, String) {
    let (mut console, captured) = Console::capture(verbose);
    let outcome = probe.check(ctx, &mut console).await.unwrap();
    (outcome, captured.contents())
}
