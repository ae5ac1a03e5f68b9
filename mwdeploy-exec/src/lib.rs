//! # mwdeploy-exec
//!
//! Step executors and deploy orchestration.
//!
//! Build a [`DeployExecutor`] over a [`DeploySteps`] implementation (usually
//! [`ShellSteps`] with a [`SystemRunner`]) and call
//! [`DeployExecutor::execute`] with a validated request.

pub mod error;
pub mod executor;
pub mod mirror;
pub mod plan;
pub mod process;
pub mod steps;

pub use error::{DeployError, InvocationError, StepError};
pub use executor::{DeployExecutor, DeployReport, StepOutcome};
pub use plan::{DeployPlan, Step};
pub use process::{CommandRunner, DryRunRunner, Invocation, OutputMode, SystemRunner};
pub use steps::{DeploySteps, ShellSteps};
