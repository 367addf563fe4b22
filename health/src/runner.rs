//! Sequential probe execution, reporting and exit-code mapping

use crate::console::Console;
use crate::outcome::Outcome;
use crate::probe::{Probe, ProbeContext, ProbeError, ProbeSet};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Title printed in the report banner
pub const TITLE: &str = "Miner Health Check";

/// Result of one probe in a run
#[derive(Debug, Clone, PartialEq)]
pub struct ReportEntry {
    pub name: String,
    pub outcome: Outcome,
    pub elapsed: Duration,
}

/// Outcomes of one run, in probe order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    entries: Vec<ReportEntry>,
}

impl Report {
    pub fn push(&mut self, entry: ReportEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    pub fn outcomes(&self) -> Vec<Outcome> {
        self.entries.iter().map(|e| e.outcome).collect()
    }

    pub fn outcome_of(&self, name: &str) -> Option<Outcome> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.outcome)
    }

    pub fn summary(&self) -> Summary {
        self.entries.iter().map(|e| e.outcome).collect()
    }
}

/// Outcome counts for a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub passed: usize,
    pub failed: usize,
    pub warnings: usize,
}

impl Summary {
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Pass => self.passed += 1,
            Outcome::Fail => self.failed += 1,
            Outcome::Indeterminate => self.warnings += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.passed + self.failed + self.warnings
    }

    /// `1` if anything failed, else `2` if anything was indeterminate, else `0`
    pub fn exit_code(&self) -> u8 {
        if self.failed > 0 {
            1
        } else if self.warnings > 0 {
            2
        } else {
            0
        }
    }
}

impl FromIterator<Outcome> for Summary {
    fn from_iter<I: IntoIterator<Item = Outcome>>(iter: I) -> Self {
        let mut summary = Summary::default();
        for outcome in iter {
            summary.record(outcome);
        }
        summary
    }
}

/// Runs a probe set against a context, one probe at a time
pub struct Runner {
    context: ProbeContext,
    probes: ProbeSet,
}

impl Runner {
    pub fn new(context: ProbeContext, probes: ProbeSet) -> Self {
        Self { context, probes }
    }

    /// Run every probe in order and print the report
    ///
    /// Never stops early: a failing, erroring or panicking probe is recorded
    /// and the next one runs.
    pub async fn run(&self, console: &mut Console) -> Report {
        info!("Running {} health probes", self.probes.len());
        self.print_banner(console);

        let mut report = Report::default();
        for probe in self.probes.iter() {
            console.blank();
            console.line(format!("{}:", probe.name()));

            let started = Instant::now();
            let outcome = self.run_probe(probe, console).await;
            let elapsed = started.elapsed();

            debug!("{} -> {} in {:?}", probe.name(), outcome, elapsed);
            console.verbose(format!("({} in {:.2?})", outcome, elapsed));
            console.blank();

            report.push(ReportEntry {
                name: probe.name().to_string(),
                outcome,
                elapsed,
            });
        }

        let summary = report.summary();
        print_summary(console, &summary);
        console.flush();
        report
    }

    async fn run_probe(&self, probe: &dyn Probe, console: &mut Console) -> Outcome {
        let result = AssertUnwindSafe(probe.check(&self.context, console))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| {
                Err(ProbeError::Panicked {
                    message: panic_message(panic.as_ref()),
                })
            });

        match result {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("{} could not be evaluated: {}", probe.name(), e);
                console.warn(format!("{} could not be evaluated: {}", probe.name(), e));
                Outcome::Indeterminate
            }
        }
    }

    fn print_banner(&self, console: &mut Console) {
        console.rule();
        console.line(TITLE);
        console.rule();
        if console.is_verbose() {
            let config = &self.context.config;
            console.line(format!("Started: {}", chrono::Utc::now().to_rfc3339()));
            console.line(format!(
                "Thresholds: disk >= {} GB free on {}, memory >= {} GB total",
                config.min_free_disk_gib,
                config.disk_path.display(),
                config.min_total_memory_gib
            ));
        }
        console.blank();
    }
}

pub fn print_summary(console: &mut Console, summary: &Summary) {
    console.rule();
    console.line("Summary:");
    console.outcome(Outcome::Pass, format!("Passed: {}", summary.passed));
    console.outcome(Outcome::Fail, format!("Failed: {}", summary.failed));
    console.outcome(
        Outcome::Indeterminate,
        format!("Warnings: {}", summary.warnings),
    );
    console.rule();

    if summary.failed > 0 {
        warn!("{} probe(s) failed", summary.failed);
    }
}

/// Send panic reports to the log instead of stderr
///
/// The runner already reports a panicking probe as a warning in the report,
/// so the default hook's message and backtrace are only noise.
pub fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        debug!("Panic contained: {}", info);
    }));
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
