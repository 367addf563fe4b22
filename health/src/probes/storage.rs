use crate::console::Console;
use crate::outcome::Outcome;
use crate::probe::{Probe, ProbeContext, ProbeResult};
use async_trait::async_trait;
use hostinfo::{CommandSpec, ExecError};
use tracing::{info, warn};

pub const ACCOUNT_ID_VAR: &str = "R2_GRADIENTS_ACCOUNT_ID";
pub const BUCKET_NAME_VAR: &str = "R2_GRADIENTS_BUCKET_NAME";
pub const ACCESS_KEY_ID_VAR: &str = "R2_GRADIENTS_READ_ACCESS_KEY_ID";
pub const SECRET_ACCESS_KEY_VAR: &str = "R2_GRADIENTS_READ_SECRET_ACCESS_KEY";

pub fn endpoint_url(account_id: &str) -> String {
    format!("https://{}.r2.cloudflarestorage.com", account_id)
}

/// `aws s3 ls` against the gradient bucket
///
/// `credentials` is an access key id and secret pair. Without a complete pair
/// nothing is exported and `aws` falls back to its own credential chain.
pub fn listing_command(
    aws_program: &str,
    bucket: &str,
    endpoint: &str,
    credentials: Option<(&str, &str)>,
) -> CommandSpec {
    let command = CommandSpec::new(aws_program)
        .args(["s3", "ls"])
        .arg(format!("s3://{}", bucket))
        .arg("--endpoint-url")
        .arg(endpoint);

    match credentials {
        Some((access_key_id, secret)) => command
            .env("AWS_ACCESS_KEY_ID", access_key_id)
            .env("AWS_SECRET_ACCESS_KEY", secret),
        None => command,
    }
}

/// The gradient bucket can be listed
pub struct StorageProbe;

#[async_trait]
impl Probe for StorageProbe {
    fn name(&self) -> &str {
        "Storage Connectivity"
    }

    async fn check(&self, ctx: &ProbeContext, console: &mut Console) -> ProbeResult<Outcome> {
        let env = &ctx.env;
        let (Some(account_id), Some(bucket), Some(access_key_id)) = (
            env.non_empty(ACCOUNT_ID_VAR),
            env.non_empty(BUCKET_NAME_VAR),
            env.non_empty(ACCESS_KEY_ID_VAR),
        ) else {
            console.warn("R2 environment variables not fully set");
            for key in [ACCOUNT_ID_VAR, BUCKET_NAME_VAR, ACCESS_KEY_ID_VAR] {
                if env.non_empty(key).is_none() {
                    console.verbose(format!("{} is not set", key));
                }
            }
            return Ok(Outcome::Indeterminate);
        };

        let endpoint = endpoint_url(account_id);
        let credentials = env
            .non_empty(SECRET_ACCESS_KEY_VAR)
            .map(|secret| (access_key_id, secret));
        if credentials.is_none() {
            console.verbose(format!(
                "{} is not set, using the aws CLI's own credentials",
                SECRET_ACCESS_KEY_VAR
            ));
        }
        let command = listing_command(&ctx.config.aws_program, bucket, &endpoint, credentials);
        console.verbose(format!("Running: {}", command));

        match ctx.executor.run(&command, ctx.config.storage_timeout()).await {
            Ok(output) if output.success() => {
                info!("Bucket {} reachable at {}", bucket, endpoint);
                console.pass("R2 gradient bucket accessible");
                Ok(Outcome::Pass)
            }
            Ok(output) => {
                console.fail("Cannot access R2 gradient bucket");
                let stderr = output.stderr.trim();
                if !stderr.is_empty() {
                    console.detail(format!("Error: {}", stderr));
                }
                Ok(Outcome::Fail)
            }
            Err(ExecError::NotFound { program }) => {
                console.warn(format!(
                    "{} CLI not found, cannot check R2 connectivity",
                    program
                ));
                Ok(Outcome::Indeterminate)
            }
            Err(e) => {
                warn!("Storage connectivity check failed: {}", e);
                console.warn(format!("R2 connectivity check failed: {}", e));
                Ok(Outcome::Indeterminate)
            }
        }
    }
}
