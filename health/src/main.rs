use clap::Parser;
use health::{
    default_probes, install_panic_hook, Console, Environment, HealthConfig, ProbeContext, Runner,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "miner-health")]
#[command(about = "Check that this host is ready to run a miner")]
struct Cli {
    /// Show commands, thresholds and timings
    #[arg(short, long)]
    verbose: bool,
    /// TOML file overriding thresholds, timeouts and tool paths
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr so they never interleave with the report.
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match cli.config.as_deref().map(HealthConfig::load).transpose() {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => {
            debug!("Configuration error: {:?}", e);
            eprintln!("❌ {}", e);
            return ExitCode::from(1);
        }
    };

    install_panic_hook();

    let context = ProbeContext::system(config, Environment::from_process());
    let runner = Runner::new(context, default_probes());
    let mut console = Console::stdout(cli.verbose);

    let report = runner.run(&mut console).await;
    let code = report.summary().exit_code();
    info!("Health check finished with exit code {}", code);

    ExitCode::from(code)
}
