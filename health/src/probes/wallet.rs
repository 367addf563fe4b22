use crate::config::{Environment, HealthConfig};
use crate::console::Console;
use crate::outcome::Outcome;
use crate::probe::{Probe, ProbeContext, ProbeResult};
use async_trait::async_trait;
use hostinfo::{CommandSpec, ExecError};
use tracing::{info, warn};

pub const WALLET_NAME_VAR: &str = "WALLET_NAME";
pub const WALLET_HOTKEY_VAR: &str = "WALLET_HOTKEY";
pub const NETUID_VAR: &str = "NETUID";

/// `btcli wallet overview` for the configured wallet and subnet
pub fn registration_command(config: &HealthConfig, env: &Environment) -> CommandSpec {
    CommandSpec::new(&config.btcli_program)
        .args(["wallet", "overview"])
        .arg("--wallet.name")
        .arg(env.get_or(WALLET_NAME_VAR, &config.default_wallet_name))
        .arg("--wallet.hotkey")
        .arg(env.get_or(WALLET_HOTKEY_VAR, &config.default_wallet_hotkey))
        .arg("--netuid")
        .arg(env.get_or(NETUID_VAR, &config.default_netuid))
}

/// The wallet hotkey is registered on the subnet
///
/// Registration is judged solely by the CLI's exit status.
pub struct WalletProbe;

#[async_trait]
impl Probe for WalletProbe {
    fn name(&self) -> &str {
        "Wallet Registration"
    }

    async fn check(&self, ctx: &ProbeContext, console: &mut Console) -> ProbeResult<Outcome> {
        let netuid = ctx.env.get_or(NETUID_VAR, &ctx.config.default_netuid);
        let command = registration_command(&ctx.config, &ctx.env);
        console.verbose(format!("Running: {}", command));

        match ctx
            .executor
            .run(&command, ctx.config.registration_timeout())
            .await
        {
            Ok(output) if output.success() => {
                info!("Wallet registered on subnet {}", netuid);
                console.pass(format!("Wallet registered to subnet {}", netuid));
                Ok(Outcome::Pass)
            }
            Ok(output) => {
                console.fail("Wallet not registered or btcli error");
                let stderr = output.stderr.trim();
                if !stderr.is_empty() {
                    console.detail(format!("Error: {}", stderr));
                }
                Ok(Outcome::Fail)
            }
            Err(ExecError::NotFound { program }) => {
                console.warn(format!("{} not found in PATH", program));
                Ok(Outcome::Indeterminate)
            }
            Err(e) => {
                warn!("Registration check failed: {}", e);
                console.warn(format!("Could not check registration: {}", e));
                Ok(Outcome::Indeterminate)
            }
        }
    }
}
