//! Error types for mwdeploy-exec.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use mwdeploy_core::types::{ExtensionName, ServerName, SkinName};

use crate::executor::DeployReport;
use crate::plan::Step;

/// Failure of a single external command.
#[derive(Debug, Error)]
pub enum InvocationError {
    /// The program could not be started at all (missing binary, bad cwd).
    #[error("failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The program ran and reported failure.
    #[error("`{command}` {}", describe_exit(.code))]
    Failed { command: String, code: Option<i32> },
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exited with status {code}"),
        None => "was terminated by a signal".to_string(),
    }
}

/// Sub-command of the dependency update that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyStage {
    Reset,
    Pull,
    Install,
}

impl fmt::Display for DependencyStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DependencyStage::Reset => write!(f, "reset vendor"),
            DependencyStage::Pull => write!(f, "pull vendor"),
            DependencyStage::Install => write!(f, "run composer update"),
        }
    }
}

/// Sub-command of the localization rebuild that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalizationStage {
    MergeMessageFiles,
    RebuildCache,
}

impl fmt::Display for LocalizationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocalizationStage::MergeMessageFiles => write!(f, "merge message files"),
            LocalizationStage::RebuildCache => write!(f, "rebuild l10n cache"),
        }
    }
}

/// One failed deploy step, one variant per step kind.
#[derive(Debug, Error)]
pub enum StepError {
    #[error("failed to {stage}: {source}")]
    DependencyUpdateFailed {
        stage: DependencyStage,
        #[source]
        source: InvocationError,
    },

    #[error("failed to update extension {name}: {source}")]
    ExtensionUpdateFailed {
        name: ExtensionName,
        #[source]
        source: InvocationError,
    },

    #[error("failed to update skin {name}: {source}")]
    SkinUpdateFailed {
        name: SkinName,
        #[source]
        source: InvocationError,
    },

    #[error("failed to sync {} to production: {source}", .path.display())]
    LocalSyncFailed {
        path: PathBuf,
        #[source]
        source: InvocationError,
    },

    #[error("failed to {stage}: {source}")]
    LocalizationRebuildFailed {
        stage: LocalizationStage,
        #[source]
        source: InvocationError,
    },

    #[error("failed to sync to remote server {server}: {source}")]
    RemoteSyncFailed {
        server: ServerName,
        #[source]
        source: InvocationError,
    },
}

/// Outcome of a deploy run that did not fully succeed.
///
/// Both variants carry the report of every step attempted so far.
#[derive(Debug, Error)]
pub enum DeployError {
    /// Fail-fast run stopped at `step`; nothing after it was attempted.
    #[error("{source}")]
    Aborted {
        step: Step,
        #[source]
        source: StepError,
        report: Box<DeployReport>,
    },

    /// Continue-on-error run finished with at least one failed step.
    #[error("deployment completed with errors")]
    CompletedWithErrors { report: Box<DeployReport> },
}

impl DeployError {
    pub fn report(&self) -> &DeployReport {
        match self {
            DeployError::Aborted { report, .. } => report,
            DeployError::CompletedWithErrors { report } => report,
        }
    }
}
