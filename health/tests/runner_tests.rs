mod common;

use async_trait::async_trait;
use common::*;
use health::{
    default_probes, Console, Outcome, Probe, ProbeContext, ProbeResult, ProbeSet, Runner,
};
use hostinfo::{DiskUsage, Inventory};
use std::sync::Arc;
use Outcome::{Fail, Indeterminate, Pass};

async fn run(context: ProbeContext, probes: ProbeSet, verbose: bool) -> (health::Report, String) {
    let runner = Runner::new(context, probes);
    let (mut console, captured) = Console::capture(verbose);
    let report = runner.run(&mut console).await;
    (report, captured.contents())
}

struct FixedProbe(&'static str, Outcome);

#[async_trait]
impl Probe for FixedProbe {
    fn name(&self) -> &str {
        self.0
    }

    async fn check(&self, _ctx: &ProbeContext, console: &mut Console) -> ProbeResult<Outcome> {
        console.outcome(self.1, format!("{} reported {}", self.0, self.1));
        Ok(self.1)
    }
}

struct PanickingProbe;

#[async_trait]
impl Probe for PanickingProbe {
    fn name(&self) -> &str {
        "Panicking"
    }

    async fn check(&self, _ctx: &ProbeContext, _console: &mut Console) -> ProbeResult<Outcome> {
        panic!("probe exploded");
    }
}

/// All required variables set, no GPU tooling, no btcli, no storage
/// credentials, 500 GB free disk, 256 GB of memory
#[tokio::test]
async fn test_scenario_missing_tooling_warns() {
    let meminfo = meminfo_gib(256, 128);
    let context = context(
        required_env(),
        Arc::new(FakeExecutor::new()),
        FakeDevices(Inventory::Unavailable("nvidia-smi not found".to_string())),
        Some(DiskUsage::from_gib(1000, 500)),
        meminfo.path(),
    );

    let (report, output) = run(context, default_probes(), false).await;

    assert_eq!(
        report.outcomes(),
        vec![Pass, Indeterminate, Indeterminate, Indeterminate, Pass, Pass]
    );
    assert_eq!(report.summary().exit_code(), 2);
    assert!(output.contains("✅ Passed: 3"));
    assert!(output.contains("❌ Failed: 0"));
    assert!(output.contains("⚠️  Warnings: 3"));
}

#[tokio::test]
async fn test_scenario_missing_variable_fails() {
    let meminfo = meminfo_gib(256, 128);
    let mut context = healthy_context(meminfo.path());
    context.env = full_env().without("WANDB_API_KEY");

    let (report, output) = run(context, default_probes(), false).await;

    assert_eq!(report.outcome_of("Environment Variables"), Some(Fail));
    assert_eq!(report.summary().failed, 1);
    assert_eq!(report.summary().passed, 5);
    assert_eq!(report.summary().exit_code(), 1);
    assert!(output.contains("Missing environment variables: WANDB_API_KEY"));
}

#[tokio::test]
async fn test_scenario_all_pass() {
    let meminfo = meminfo_gib(256, 128);
    let (report, output) = run(healthy_context(meminfo.path()), default_probes(), false).await;

    assert_eq!(report.outcomes(), vec![Pass; 6]);
    assert_eq!(report.summary().exit_code(), 0);
    assert!(output.contains("✅ Passed: 6"));
    assert!(output.contains("❌ Failed: 0"));
    assert!(output.contains("⚠️  Warnings: 0"));
}

#[tokio::test]
async fn test_failure_dominates_warnings() {
    let meminfo = meminfo_gib(64, 32);
    let context = context(
        required_env(),
        Arc::new(FakeExecutor::new()),
        FakeDevices(Inventory::Unavailable("nvidia-smi not found".to_string())),
        Some(DiskUsage::from_gib(1000, 500)),
        meminfo.path(),
    );

    let (report, _) = run(context, default_probes(), false).await;
    let summary = report.summary();
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.warnings, 3);
    assert_eq!(summary.exit_code(), 1);
}

#[tokio::test]
async fn test_report_layout_follows_probe_order() {
    let meminfo = meminfo_gib(256, 128);
    let (report, output) = run(healthy_context(meminfo.path()), default_probes(), false).await;

    let rule = "=".repeat(60);
    assert!(output.starts_with(&format!("{}\nMiner Health Check\n{}\n\n", rule, rule)));

    let names: Vec<&str> = report.entries().iter().map(|e| e.name.as_str()).collect();
    let positions: Vec<usize> = names
        .iter()
        .map(|name| output.find(&format!("\n{}:\n", name)).unwrap())
        .collect();
    assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));

    // Each probe's findings sit under its own header.
    let gpu = output.find("\nGPU Availability:\n").unwrap();
    let wallet = output.find("\nWallet Registration:\n").unwrap();
    let gpu_line = output.find("8 GPU(s) available").unwrap();
    assert!(gpu < gpu_line && gpu_line < wallet);

    assert!(output.ends_with(&format!("{}\n", rule)));
}

#[tokio::test]
async fn test_probe_error_becomes_indeterminate_and_run_continues() {
    let meminfo = meminfo_gib(256, 128);
    let context = healthy_context(meminfo.path()).with_disk(Arc::new(FixedSpace(None)));

    let (report, output) = run(context, default_probes(), false).await;

    assert_eq!(report.outcome_of("Disk Space"), Some(Indeterminate));
    assert_eq!(report.outcome_of("System Memory"), Some(Pass));
    assert_eq!(report.entries().len(), 6);
    assert_eq!(report.summary().exit_code(), 2);
    assert!(output.contains("⚠️  Disk Space could not be evaluated: Disk query for / failed: statvfs failed"));
}

#[tokio::test]
async fn test_panicking_probe_becomes_indeterminate() {
    let meminfo = meminfo_gib(256, 128);
    let probes = ProbeSet::new()
        .with(Box::new(FixedProbe("First", Pass)))
        .with(Box::new(PanickingProbe))
        .with(Box::new(FixedProbe("Last", Pass)));

    let (report, output) = run(healthy_context(meminfo.path()), probes, false).await;

    assert_eq!(report.outcomes(), vec![Pass, Indeterminate, Pass]);
    assert!(output.contains("Panicking could not be evaluated: Probe panicked: probe exploded"));
    assert!(output.contains("Last reported passed"));
}

#[tokio::test]
async fn test_no_short_circuit_after_failure() {
    let meminfo = meminfo_gib(256, 128);
    let probes = ProbeSet::new()
        .with(Box::new(FixedProbe("A", Fail)))
        .with(Box::new(FixedProbe("B", Indeterminate)))
        .with(Box::new(FixedProbe("C", Pass)));

    let (report, _) = run(healthy_context(meminfo.path()), probes, false).await;
    assert_eq!(report.outcomes(), vec![Fail, Indeterminate, Pass]);
    assert_eq!(report.summary().exit_code(), 1);
}

#[tokio::test]
async fn test_verbose_adds_detail_without_changing_outcomes() {
    let meminfo = meminfo_gib(256, 128);
    let (quiet, quiet_output) =
        run(healthy_context(meminfo.path()), default_probes(), false).await;
    let (loud, loud_output) = run(healthy_context(meminfo.path()), default_probes(), true).await;

    assert_eq!(quiet.outcomes(), loud.outcomes());
    assert!(!quiet_output.contains("Running:"));
    assert!(loud_output.contains("Started: "));
    assert!(loud_output.contains("Thresholds: disk >= 50 GB free on /, memory >= 200 GB total"));
    assert!(loud_output.contains("Running: btcli wallet overview"));
    assert!(loud_output.contains("Running: aws s3 ls"));
    assert!(!loud_output.contains("read-secret"));
}

#[tokio::test]
async fn test_empty_probe_set() {
    let meminfo = meminfo_gib(256, 128);
    let (report, output) = run(healthy_context(meminfo.path()), ProbeSet::new(), false).await;
    assert!(report.entries().is_empty());
    assert_eq!(report.summary().exit_code(), 0);
    assert!(output.contains("✅ Passed: 0"));
}
