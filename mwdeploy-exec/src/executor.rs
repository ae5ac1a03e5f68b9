//! Deploy orchestration: run a [`DeployPlan`] step by step and apply the
//! continue-on-error policy.
//!
//! - Fail-fast (default): the first failing step ends the run with
//!   [`DeployError::Aborted`] carrying that step's error.
//! - Continue-on-error: every planned step is attempted once; any failure
//!   turns the result into [`DeployError::CompletedWithErrors`].
//!
//! Either way the [`DeployReport`] records every attempted step.

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;

use mwdeploy_core::{DeployRequest, ServerName};

use crate::error::{DeployError, StepError};
use crate::plan::{DeployPlan, Step};
use crate::steps::DeploySteps;

// ---------------------------------------------------------------------------
// Report types
// ---------------------------------------------------------------------------

/// Result of one attempted step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepOutcome {
    pub step: Step,
    pub succeeded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub duration_ms: u128,
}

/// Everything that happened during one run.
#[derive(Debug, Clone, Serialize)]
pub struct DeployReport {
    pub local_host: ServerName,
    pub local_sequence: bool,
    pub continue_on_error: bool,
    pub planned: usize,
    pub outcomes: Vec<StepOutcome>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl DeployReport {
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(|o| o.succeeded)
    }

    pub fn failures(&self) -> impl Iterator<Item = &StepOutcome> {
        self.outcomes.iter().filter(|o| !o.succeeded)
    }

    /// Planned steps that never ran because the run aborted.
    pub fn skipped(&self) -> usize {
        self.planned.saturating_sub(self.outcomes.len())
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

// ---------------------------------------------------------------------------
// Executor
// ---------------------------------------------------------------------------

/// Drives [`DeploySteps`] in plan order for the host named `local_host`.
pub struct DeployExecutor<S> {
    steps: S,
    local_host: ServerName,
}

impl<S: DeploySteps> DeployExecutor<S> {
    pub fn new(steps: S, local_host: ServerName) -> Self {
        Self { steps, local_host }
    }

    pub fn steps(&self) -> &S {
        &self.steps
    }

    /// The steps `execute` would run for `request`.
    pub fn plan(&self, request: &DeployRequest) -> DeployPlan {
        DeployPlan::build(request, &self.local_host)
    }

    /// Run every planned step in order.
    pub fn execute(&self, request: &DeployRequest) -> Result<DeployReport, DeployError> {
        let plan = self.plan(request);
        let started_at = Utc::now();
        let mut outcomes = Vec::with_capacity(plan.steps().len());

        if plan.includes_local() {
            tracing::info!(host = %self.local_host, "local host is a target; running local sequence");
        } else {
            tracing::info!(host = %self.local_host, "local host not targeted; skipping local sequence");
        }

        for (index, step) in plan.steps().iter().enumerate() {
            tracing::info!("{step}...");
            let clock = Instant::now();
            let result = self.run_step(step, request);
            let duration_ms = clock.elapsed().as_millis();

            match result {
                Ok(()) => outcomes.push(StepOutcome {
                    step: step.clone(),
                    succeeded: true,
                    error: None,
                    duration_ms,
                }),
                Err(err) => {
                    tracing::error!(step = %step, "{err}");
                    outcomes.push(StepOutcome {
                        step: step.clone(),
                        succeeded: false,
                        error: Some(err.to_string()),
                        duration_ms,
                    });
                    if !request.continue_on_error() {
                        for skipped in &plan.steps()[index + 1..] {
                            tracing::debug!("skipping {skipped}");
                        }
                        let report = self.report(&plan, request, outcomes, started_at);
                        return Err(DeployError::Aborted {
                            step: step.clone(),
                            source: err,
                            report: Box::new(report),
                        });
                    }
                }
            }
        }

        let report = self.report(&plan, request, outcomes, started_at);
        if report.is_success() {
            Ok(report)
        } else {
            Err(DeployError::CompletedWithErrors {
                report: Box::new(report),
            })
        }
    }

    fn run_step(&self, step: &Step, request: &DeployRequest) -> Result<(), StepError> {
        match step {
            Step::UpdateDependencies => self.steps.update_dependencies(),
            Step::UpdateExtension(name) => self.steps.update_extension(name),
            Step::UpdateSkin(name) => self.steps.update_skin(name),
            Step::SyncLocal => self.steps.sync_local(request),
            Step::RebuildLocalization => self
                .steps
                .rebuild_localization(request.localization_languages()),
            Step::SyncRemote(server) => self.steps.sync_remote(server, request),
        }
    }

    fn report(
        &self,
        plan: &DeployPlan,
        request: &DeployRequest,
        outcomes: Vec<StepOutcome>,
        started_at: DateTime<Utc>,
    ) -> DeployReport {
        DeployReport {
            local_host: self.local_host.clone(),
            local_sequence: plan.includes_local(),
            continue_on_error: request.continue_on_error(),
            planned: plan.steps().len(),
            outcomes,
            started_at,
            finished_at: Utc::now(),
        }
    }
}
