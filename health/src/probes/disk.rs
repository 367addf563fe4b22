use crate::console::Console;
use crate::outcome::Outcome;
use crate::probe::{Probe, ProbeContext, ProbeError, ProbeResult};
use async_trait::async_trait;
use tracing::debug;

/// The configured filesystem has enough free space
pub struct DiskSpaceProbe;

#[async_trait]
impl Probe for DiskSpaceProbe {
    fn name(&self) -> &str {
        "Disk Space"
    }

    async fn check(&self, ctx: &ProbeContext, console: &mut Console) -> ProbeResult<Outcome> {
        let path = &ctx.config.disk_path;
        let usage = ctx.disk.usage(path).map_err(|e| ProbeError::Disk {
            path: path.display().to_string(),
            source: e,
        })?;
        debug!("Disk usage for {}: {:?}", path.display(), usage);

        console.line(format!(
            "💾 Disk: {:.1} GB free / {:.1} GB total ({:.1}% free)",
            usage.free_gib(),
            usage.total_gib(),
            usage.percent_free()
        ));

        let minimum = ctx.config.min_free_disk_gib;
        let outcome = Outcome::at_least(usage.free_gib(), minimum);
        match outcome {
            Outcome::Pass => console.detail("✅ Sufficient disk space"),
            _ => console.detail(format!("❌ Low disk space (< {} GB free)", minimum)),
        }
        Ok(outcome)
    }
}
