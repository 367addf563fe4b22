use crate::config::{Environment, HealthConfig};
use crate::console::Console;
use crate::outcome::Outcome;
use async_trait::async_trait;
use hostinfo::{CommandExecutor, DeviceProvider, FsSpace, NvidiaSmi, SpaceSource, SystemExecutor};
use std::sync::Arc;
use thiserror::Error;

/// Unexpected failures at the probe boundary
///
/// Expected conditions (missing tool, unreadable source) are reported by the
/// probe itself. These errors are converted to
/// [`Outcome::Indeterminate`] by the runner.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Disk query for {path} failed: {source}")]
    Disk {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Probe panicked: {message}")]
    Panicked { message: String },
}

pub type ProbeResult<T> = Result<T, ProbeError>;

/// Everything a probe may consult: configuration, environment and host
/// capabilities
pub struct ProbeContext {
    pub config: HealthConfig,
    pub env: Environment,
    pub executor: Arc<dyn CommandExecutor>,
    pub devices: Arc<dyn DeviceProvider>,
    pub disk: Arc<dyn SpaceSource>,
}

impl ProbeContext {
    /// Context backed by real processes, `nvidia-smi` and the filesystem
    pub fn system(config: HealthConfig, env: Environment) -> Self {
        let executor: Arc<dyn CommandExecutor> = Arc::new(SystemExecutor::new());
        let devices = Arc::new(NvidiaSmi::new(executor.clone(), config.gpu_timeout()));
        Self {
            config,
            env,
            executor,
            devices,
            disk: Arc::new(FsSpace),
        }
    }

    pub fn with_executor(mut self, executor: Arc<dyn CommandExecutor>) -> Self {
        self.executor = executor;
        self
    }

    pub fn with_devices(mut self, devices: Arc<dyn DeviceProvider>) -> Self {
        self.devices = devices;
        self
    }

    pub fn with_disk(mut self, disk: Arc<dyn SpaceSource>) -> Self {
        self.disk = disk;
        self
    }
}

/// One independent health check
#[async_trait]
pub trait Probe: Send + Sync {
    /// Display name, used as the section header
    fn name(&self) -> &str;

    /// Evaluate the check, writing findings to `console`
    async fn check(&self, ctx: &ProbeContext, console: &mut Console) -> ProbeResult<Outcome>;
}

/// Ordered collection of probes; run order is registration order
#[derive(Default)]
pub struct ProbeSet {
    probes: Vec<Box<dyn Probe>>,
}

impl ProbeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, probe: Box<dyn Probe>) {
        self.probes.push(probe);
    }

    pub fn with(mut self, probe: Box<dyn Probe>) -> Self {
        self.register(probe);
        self
    }

    pub fn names(&self) -> Vec<&str> {
        self.probes.iter().map(|p| p.name()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Probe> {
        self.probes.iter().map(|p| p.as_ref())
    }

    pub fn len(&self) -> usize {
        self.probes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probes.is_empty()
    }
}
