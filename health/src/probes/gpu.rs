use crate::console::Console;
use crate::outcome::Outcome;
use crate::probe::{Probe, ProbeContext, ProbeResult};
use async_trait::async_trait;
use hostinfo::Inventory;
use tracing::{debug, info};

/// At least one GPU is visible
pub struct GpuProbe;

#[async_trait]
impl Probe for GpuProbe {
    fn name(&self) -> &str {
        "GPU Availability"
    }

    async fn check(&self, ctx: &ProbeContext, console: &mut Console) -> ProbeResult<Outcome> {
        if let Some(command) = ctx.devices.command() {
            console.verbose(format!("Running: {}", command));
        }

        match ctx.devices.inventory().await {
            Inventory::Available(devices) if devices.is_empty() => {
                console.fail("No CUDA GPUs available");
                Ok(Outcome::Fail)
            }
            Inventory::Available(devices) => {
                info!("Detected {} GPU(s)", devices.len());
                console.pass(format!("{} GPU(s) available", devices.len()));
                for device in &devices {
                    console.detail(format!(
                        "GPU {}: {} ({:.1} GB)",
                        device.index,
                        device.name,
                        device.memory_gib()
                    ));
                }
                Ok(Outcome::Pass)
            }
            Inventory::Unavailable(reason) => {
                debug!("GPU inventory unavailable: {}", reason);
                console.warn(format!(
                    "{} not available, cannot check GPU availability",
                    ctx.devices.name()
                ));
                console.verbose(reason);
                Ok(Outcome::Indeterminate)
            }
        }
    }
}
