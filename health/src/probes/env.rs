use crate::console::Console;
use crate::outcome::Outcome;
use crate::probe::{Probe, ProbeContext, ProbeResult};
use async_trait::async_trait;
use tracing::debug;

/// Variables a miner cannot start without
pub const REQUIRED_VARS: [&str; 8] = [
    "HF_TOKEN",
    "WANDB_API_KEY",
    "R2_GRADIENTS_ACCOUNT_ID",
    "R2_GRADIENTS_BUCKET_NAME",
    "R2_DATASET_ACCOUNT_ID",
    "R2_DATASET_BUCKET_NAME",
    "WALLET_NAME",
    "WALLET_HOTKEY",
];

/// Every required variable is set and non-empty
pub struct EnvironmentProbe;

#[async_trait]
impl Probe for EnvironmentProbe {
    fn name(&self) -> &str {
        "Environment Variables"
    }

    async fn check(&self, ctx: &ProbeContext, console: &mut Console) -> ProbeResult<Outcome> {
        let missing: Vec<&str> = REQUIRED_VARS
            .iter()
            .copied()
            .filter(|key| ctx.env.non_empty(key).is_none())
            .collect();

        debug!("{} required variable(s) missing", missing.len());

        if missing.is_empty() {
            console.pass("All required environment variables are set");
            Ok(Outcome::Pass)
        } else {
            console.fail(format!(
                "Missing environment variables: {}",
                missing.join(", ")
            ));
            Ok(Outcome::Fail)
        }
    }
}
