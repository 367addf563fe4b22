//! Preflight health checks for compute-node miners
//!
//! A [`Runner`] executes an ordered [`ProbeSet`] against a [`ProbeContext`],
//! printing each probe's findings as it goes, and returns a [`Report`] whose
//! [`Summary`] maps to the process exit code:
//!
//! | Condition | Exit code |
//! |---|---|
//! | any probe failed | 1 |
//! | no failures, some probe indeterminate | 2 |
//! | everything passed | 0 |
//!
//! # Examples
//!
//! ```no_run
//! use health::{default_probes, Console, Environment, HealthConfig, ProbeContext, Runner};
//!
//! # async fn example() {
//! let context = ProbeContext::system(HealthConfig::default(), Environment::from_process());
//! let runner = Runner::new(context, default_probes());
//! let mut console = Console::stdout(false);
//!
//! let report = runner.run(&mut console).await;
//! std::process::exit(report.summary().exit_code().into());
//! # }
//! ```

pub mod config;
pub mod console;
pub mod outcome;
pub mod probe;
pub mod probes;
pub mod runner;

pub use config::{ConfigError, Environment, HealthConfig};
pub use console::{CapturedOutput, Console};
pub use outcome::Outcome;
pub use probe::{Probe, ProbeContext, ProbeError, ProbeResult, ProbeSet};
pub use probes::default_probes;
pub use runner::{install_panic_hook, Report, ReportEntry, Runner, Summary};
