use crate::console::Console;
use crate::outcome::Outcome;
use crate::probe::{Probe, ProbeContext, ProbeResult};
use async_trait::async_trait;
use hostinfo::MemInfo;
use tracing::{debug, warn};

/// Total physical memory meets the minimum
pub struct MemoryProbe;

#[async_trait]
impl Probe for MemoryProbe {
    fn name(&self) -> &str {
        "System Memory"
    }

    async fn check(&self, ctx: &ProbeContext, console: &mut Console) -> ProbeResult<Outcome> {
        let path = &ctx.config.meminfo_path;
        let summary = match MemInfo::read(path).and_then(|info| info.summary()) {
            Ok(summary) => summary,
            Err(e) => {
                warn!("Reading {} failed: {}", path.display(), e);
                console.warn(format!("Could not check memory: {}", e));
                return Ok(Outcome::Indeterminate);
            }
        };
        debug!("Memory summary: {:?}", summary);

        console.line(format!(
            "🧠 Memory: {:.1} GB available / {:.1} GB total ({:.1}% available)",
            summary.available_gib,
            summary.total_gib,
            summary.percent_available()
        ));

        let minimum = ctx.config.min_total_memory_gib;
        let outcome = Outcome::at_least(summary.total_gib, minimum);
        match outcome {
            Outcome::Pass => console.detail("✅ Sufficient memory"),
            _ => console.detail(format!(
                "❌ Low total memory (< {} GB, have {:.1} GB)",
                minimum, summary.total_gib
            )),
        }
        Ok(outcome)
    }
}
