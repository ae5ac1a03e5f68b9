//! The ordered list of steps a request turns into.
//!
//! ```text
//! local host in servers?
//!   yes → dependency update → extensions… → skins… → local sync → l10n rebuild
//! then, for every other server in declared order:
//!   remote sync
//! ```
//!
//! Steps whose request flag or list is empty are left out. All local steps
//! precede all remote steps.

use std::fmt;

use serde::Serialize;

use mwdeploy_core::{DeployRequest, ExtensionName, ServerName, SkinName};

/// One unit of work, executed by exactly one [`DeploySteps`] method.
///
/// [`DeploySteps`]: crate::steps::DeploySteps
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "target", rename_all = "snake_case")]
pub enum Step {
    UpdateDependencies,
    UpdateExtension(ExtensionName),
    UpdateSkin(SkinName),
    SyncLocal,
    RebuildLocalization,
    SyncRemote(ServerName),
}

impl Step {
    /// Whether the step runs against this host's trees.
    pub fn is_local(&self) -> bool {
        !matches!(self, Step::SyncRemote(_))
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::UpdateDependencies => write!(f, "dependency update"),
            Step::UpdateExtension(name) => write!(f, "extension update ({name})"),
            Step::UpdateSkin(name) => write!(f, "skin update ({name})"),
            Step::SyncLocal => write!(f, "local sync"),
            Step::RebuildLocalization => write!(f, "localization rebuild"),
            Step::SyncRemote(server) => write!(f, "remote sync ({server})"),
        }
    }
}

/// Steps for one run, in execution order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeployPlan {
    includes_local: bool,
    steps: Vec<Step>,
}

impl DeployPlan {
    pub fn build(request: &DeployRequest, local_host: &ServerName) -> Self {
        let includes_local = request.targets_server(local_host);
        let mut steps = Vec::new();

        if includes_local {
            if request.dependency_update() {
                steps.push(Step::UpdateDependencies);
            }
            steps.extend(request.extensions().iter().cloned().map(Step::UpdateExtension));
            steps.extend(request.skins().iter().cloned().map(Step::UpdateSkin));
            if request.has_local_sync_scope() {
                steps.push(Step::SyncLocal);
            }
            if request.localization() {
                steps.push(Step::RebuildLocalization);
            }
        }

        // Request servers are already de-duplicated.
        steps.extend(
            request
                .servers()
                .iter()
                .filter(|server| *server != local_host)
                .cloned()
                .map(Step::SyncRemote),
        );

        Self {
            includes_local,
            steps,
        }
    }

    pub fn includes_local(&self) -> bool {
        self.includes_local
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn remote_servers(&self) -> impl Iterator<Item = &ServerName> {
        self.steps.iter().filter_map(|step| match step {
            Step::SyncRemote(server) => Some(server),
            _ => None,
        })
    }
}
