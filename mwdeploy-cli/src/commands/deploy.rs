//! `mwdeploy deploy`: run a deployment from the local staging tree.

use anyhow::{anyhow, Context, Result};
use chrono::Local;
use clap::Args;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use mwdeploy_core::{DeployRequest, ExtensionName, RequestDraft, ServerName, SkinName, Topology};
use mwdeploy_exec::{
    CommandRunner, DeployError, DeployExecutor, DeployReport, DryRunRunner, Invocation,
    OutputMode, ShellSteps, SystemRunner,
};

use crate::{host, GlobalArgs};

/// Arguments for `mwdeploy deploy`.
#[derive(Args, Debug)]
pub struct DeployArgs {
    /// Extensions to pull from git before syncing (comma separated).
    #[arg(long, value_delimiter = ',', value_name = "NAMES")]
    pub upgrade_extensions: Vec<String>,

    /// Skins to pull from git before syncing (comma separated).
    #[arg(long, value_delimiter = ',', value_name = "NAMES")]
    pub upgrade_skins: Vec<String>,

    /// Reset and pull vendor, then run composer.
    #[arg(long)]
    pub upgrade_vendor: bool,

    /// Upgrade vendor plus every extension and skin in staging.
    #[arg(long)]
    pub upgrade_world: bool,

    /// Rebuild the localization cache after syncing.
    #[arg(long)]
    pub l10n: bool,

    /// Languages to rebuild (comma separated); requires --l10n.
    #[arg(long, value_delimiter = ',', value_name = "CODES")]
    pub lang: Vec<String>,

    /// Target servers (comma separated), or `all` for the whole roster.
    #[arg(long, value_delimiter = ',', value_name = "SERVERS")]
    pub servers: Vec<String>,

    /// Overwrite files in place instead of comparing timestamps.
    #[arg(long)]
    pub ignore_time: bool,

    /// Keep going after a failed step and report every failure at the end.
    #[arg(long)]
    pub force: bool,

    /// Log every command instead of running it.
    #[arg(long)]
    pub dry_run: bool,

    /// Emit the run report as JSON; child process output is discarded.
    #[arg(long)]
    pub json: bool,

    /// Name of this host as it appears in the server list.
    #[arg(long, env = "MWDEPLOY_HOSTNAME", value_name = "NAME")]
    pub local_host: Option<String>,
}

impl DeployArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<()> {
        let (topology, inventory) = super::load(global)?;
        let local_host = host::local_server(self.local_host.as_deref())
            .context("could not determine local hostname")?;

        let roster = topology.servers.clone();
        let request = self.draft().finalize(&inventory, &roster)?;
        tracing::debug!(host = %local_host, servers = ?request.servers(), "request validated");

        let outcome = if self.dry_run {
            let runner = DryRunRunner::new();
            let outcome = execute(topology, &runner, local_host, &request);
            if !self.json {
                print_invocations(&runner.invocations());
            }
            outcome
        } else {
            let mode = if self.json {
                OutputMode::Quiet
            } else {
                OutputMode::Inherit
            };
            execute(topology, SystemRunner::new(mode), local_host, &request)
        };

        match outcome {
            Ok(report) => self.print_report(&report),
            Err(err) => {
                self.print_report(err.report())?;
                // The message already includes the step's cause.
                Err(anyhow!("{err}"))
            }
        }
    }

    /// Empty list entries count as "not given", so `--upgrade-extensions ""`
    /// selects nothing.
    fn draft(&self) -> RequestDraft {
        RequestDraft {
            dependency_update: self.upgrade_vendor,
            full_upgrade: self.upgrade_world,
            extensions: non_empty(&self.upgrade_extensions)
                .map(ExtensionName::from)
                .collect(),
            skins: non_empty(&self.upgrade_skins).map(SkinName::from).collect(),
            localization: self.l10n,
            localization_languages: non_empty(&self.lang).map(str::to_string).collect(),
            servers: non_empty(&self.servers).map(ServerName::from).collect(),
            bypass_timestamp_sync: self.ignore_time,
            continue_on_error: self.force,
        }
    }

    fn print_report(&self, report: &DeployReport) -> Result<()> {
        if self.json {
            println!(
                "{}",
                report.to_json().context("failed to serialize deploy report")?
            );
        } else {
            print_summary(report, self.dry_run);
        }
        Ok(())
    }
}

fn non_empty(values: &[String]) -> impl Iterator<Item = &str> {
    values.iter().map(|v| v.trim()).filter(|v| !v.is_empty())
}

fn execute<R: CommandRunner>(
    topology: Topology,
    runner: R,
    local_host: ServerName,
    request: &DeployRequest,
) -> Result<DeployReport, DeployError> {
    DeployExecutor::new(ShellSteps::new(topology, runner), local_host).execute(request)
}

// ---------------------------------------------------------------------------
// Human output
// ---------------------------------------------------------------------------

#[derive(Tabled)]
struct StepRow {
    #[tabled(rename = "step")]
    step: String,
    #[tabled(rename = "result")]
    result: String,
    #[tabled(rename = "time")]
    time: String,
    #[tabled(rename = "detail")]
    detail: String,
}

fn print_invocations(invocations: &[Invocation]) {
    println!("[dry-run] {} commands would run:", invocations.len());
    for invocation in invocations {
        println!("  ~  {invocation}");
    }
}

fn print_summary(report: &DeployReport, dry_run: bool) {
    let prefix = if dry_run { "[dry-run] " } else { "" };

    if report.planned == 0 {
        println!("{prefix}✓ nothing to do on {}", report.local_host);
        return;
    }

    let rows: Vec<StepRow> = report
        .outcomes
        .iter()
        .map(|outcome| StepRow {
            step: outcome.step.to_string(),
            result: if outcome.succeeded {
                "ok".green().to_string()
            } else {
                "FAILED".red().bold().to_string()
            },
            time: format!("{:.1}s", outcome.duration_ms as f64 / 1000.0),
            detail: outcome.error.clone().unwrap_or_default(),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");

    let failed = report.failures().count();
    let elapsed = report.finished_at - report.started_at;
    let seconds = elapsed.num_milliseconds() as f64 / 1000.0;
    let finished = report.finished_at.with_timezone(&Local).format("%H:%M:%S");
    if failed == 0 {
        println!(
            "{prefix}{} deployed from {} ({} steps, {seconds:.1}s, finished {finished})",
            "✓".green().bold(),
            report.local_host,
            report.outcomes.len(),
        );
    } else {
        println!(
            "{prefix}{} {failed} of {} steps failed",
            "✗".red().bold(),
            report.outcomes.len(),
        );
    }
    if report.skipped() > 0 {
        println!("  ·  {} steps not attempted", report.skipped());
    }
}
