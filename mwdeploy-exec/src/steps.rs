//! Step executors: one method per step kind.
//!
//! [`DeploySteps`] is the seam the executor drives. [`ShellSteps`] is the
//! production implementation, turning each step into git / composer / rsync /
//! php invocations against the [`Topology`].

use std::path::{Path, PathBuf};

use mwdeploy_core::{DeployRequest, ExtensionName, ServerName, SkinName, Topology};

use crate::error::{DependencyStage, InvocationError, LocalizationStage, StepError};
use crate::mirror::{self, MirrorMode};
use crate::process::{CommandRunner, Invocation};

/// Capability interface for the individual deploy steps.
pub trait DeploySteps {
    /// Reset and pull the vendor checkout, then install non-dev dependencies.
    fn update_dependencies(&self) -> Result<(), StepError>;

    /// Pull the extension's checkout, including submodules.
    fn update_extension(&self, name: &ExtensionName) -> Result<(), StepError>;

    /// Pull the skin's checkout (no submodules).
    fn update_skin(&self, name: &SkinName) -> Result<(), StepError>;

    /// Mirror the request's vendor/extension/skin subtrees from staging to
    /// production.
    fn sync_local(&self, request: &DeployRequest) -> Result<(), StepError>;

    /// Regenerate the message file list and rebuild the localization cache,
    /// limited to `languages` when non-empty.
    fn rebuild_localization(&self, languages: &[String]) -> Result<(), StepError>;

    /// Mirror the full production tree to `server`.
    fn sync_remote(&self, server: &ServerName, request: &DeployRequest) -> Result<(), StepError>;
}

// ---------------------------------------------------------------------------
// Shell implementation
// ---------------------------------------------------------------------------

/// Runs each step as external commands through `R`.
#[derive(Debug)]
pub struct ShellSteps<R> {
    topology: Topology,
    runner: R,
}

impl<R: CommandRunner> ShellSteps<R> {
    pub fn new(topology: Topology, runner: R) -> Self {
        Self { topology, runner }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    fn git(&self, checkout: &Path) -> Invocation {
        Invocation::new(&self.topology.tools.git)
            .arg("-C")
            .path_arg(checkout)
    }

    fn php(&self, script: &Path) -> Invocation {
        Invocation::new(&self.topology.tools.php)
            .path_arg(script)
            .arg("--quiet")
            .arg(format!("--wiki={}", self.topology.wiki))
    }

    fn run(&self, invocation: Invocation) -> Result<(), InvocationError> {
        self.runner.run(&invocation)
    }

    /// Staging → production pairs in scope for `request`, in sync order.
    fn local_sync_pairs(&self, request: &DeployRequest) -> Vec<(PathBuf, PathBuf)> {
        let t = &self.topology;
        let mut pairs = Vec::new();
        if request.dependency_update() {
            pairs.push((t.staging_vendor(), t.production_vendor()));
        }
        for ext in request.extensions() {
            pairs.push((t.staging_extension(ext), t.production_extension(ext)));
        }
        for skin in request.skins() {
            pairs.push((t.staging_skin(skin), t.production_skin(skin)));
        }
        pairs
    }
}

impl<R: CommandRunner> DeploySteps for ShellSteps<R> {
    fn update_dependencies(&self) -> Result<(), StepError> {
        let vendor = self.topology.staging_vendor();
        let failed = |stage| move |source| StepError::DependencyUpdateFailed { stage, source };

        self.run(self.git(&vendor).args(["reset", "--hard"]))
            .map_err(failed(DependencyStage::Reset))?;

        self.run(self.git(&vendor).args([
            "pull",
            "--recurse-submodules",
            "origin",
            self.topology.vendor_branch.as_str(),
            "--quiet",
        ]))
        .map_err(failed(DependencyStage::Pull))?;

        self.run(
            Invocation::new(&self.topology.tools.composer)
                .args(["update", "--no-dev", "--quiet"])
                .current_dir(&self.topology.staging_root),
        )
        .map_err(failed(DependencyStage::Install))
    }

    fn update_extension(&self, name: &ExtensionName) -> Result<(), StepError> {
        let checkout = self.topology.staging_extension(name);
        self.run(self.git(&checkout).args(["pull", "--recurse-submodules", "--quiet"]))
            .map_err(|source| StepError::ExtensionUpdateFailed {
                name: name.clone(),
                source,
            })
    }

    fn update_skin(&self, name: &SkinName) -> Result<(), StepError> {
        let checkout = self.topology.staging_skin(name);
        self.run(self.git(&checkout).args(["pull", "--quiet"]))
            .map_err(|source| StepError::SkinUpdateFailed {
                name: name.clone(),
                source,
            })
    }

    fn sync_local(&self, request: &DeployRequest) -> Result<(), StepError> {
        let mode = MirrorMode::from_bypass(request.bypass_timestamp_sync());
        let pairs = self.local_sync_pairs(request);
        if pairs.is_empty() {
            tracing::debug!("local sync: nothing in scope");
            return Ok(());
        }

        // First failing subtree ends the step.
        for (src, dst) in pairs {
            tracing::debug!(src = %src.display(), dst = %dst.display(), "mirroring");
            self.run(mirror::local(&self.topology.tools, mode, &src, &dst))
                .map_err(|source| StepError::LocalSyncFailed { path: src, source })?;
        }
        Ok(())
    }

    fn rebuild_localization(&self, languages: &[String]) -> Result<(), StepError> {
        let t = &self.topology;
        let extensions_dirs = format!(
            "--extensions-dir={}:{}",
            t.production_extensions().display(),
            t.production_skins().display()
        );

        self.run(
            self.php(&t.merge_script())
                .arg(extensions_dirs)
                .arg("--output")
                .path_arg(&t.message_file_list()),
        )
        .map_err(|source| StepError::LocalizationRebuildFailed {
            stage: LocalizationStage::MergeMessageFiles,
            source,
        })?;

        let mut rebuild = self.php(&t.rebuild_script());
        if !languages.is_empty() {
            rebuild = rebuild.arg(format!("--lang={}", languages.join(",")));
        }
        self.run(rebuild)
            .map_err(|source| StepError::LocalizationRebuildFailed {
                stage: LocalizationStage::RebuildCache,
                source,
            })
    }

    fn sync_remote(&self, server: &ServerName, request: &DeployRequest) -> Result<(), StepError> {
        let mode = MirrorMode::from_bypass(request.bypass_timestamp_sync());
        self.run(mirror::remote(&self.topology, mode, server))
            .map_err(|source| StepError::RemoteSyncFailed {
                server: server.clone(),
                source,
            })
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    use mwdeploy_core::{Inventory, RequestDraft};

    use crate::process::DryRunRunner;

    /// Records invocations and fails any whose command line contains `fail_on`.
    #[derive(Default)]
    struct ScriptedRunner {
        fail_on: Option<&'static str>,
        seen: RefCell<Vec<String>>,
    }

    impl CommandRunner for ScriptedRunner {
        fn run(&self, invocation: &Invocation) -> Result<(), InvocationError> {
            let line = invocation.command_line();
            self.seen.borrow_mut().push(line.clone());
            match self.fail_on {
                Some(needle) if line.contains(needle) => Err(InvocationError::Failed {
                    command: line,
                    code: Some(1),
                }),
                _ => Ok(()),
            }
        }
    }

    fn inventory() -> Inventory {
        Inventory {
            extensions: ["CheckUser", "Echo", "Foo"]
                .into_iter()
                .map(ExtensionName::from)
                .collect(),
            skins: [SkinName::from("Vector")].into_iter().collect(),
        }
    }

    fn request(draft: RequestDraft) -> DeployRequest {
        draft.finalize(&inventory(), &[]).expect("valid request")
    }

    fn command_lines(steps: &ShellSteps<DryRunRunner>) -> Vec<String> {
        steps
            .runner()
            .invocations()
            .iter()
            .map(Invocation::command_line)
            .collect()
    }

    #[test]
    fn dependency_update_resets_pulls_then_installs() {
        let steps = ShellSteps::new(Topology::default(), DryRunRunner::new());
        steps.update_dependencies().expect("update");

        assert_eq!(
            command_lines(&steps),
            vec![
                "git -C /prod/mediawiki-staging/vendor reset --hard",
                "git -C /prod/mediawiki-staging/vendor pull --recurse-submodules origin REL1_43 --quiet",
                "composer update --no-dev --quiet",
            ]
        );
        let composer = &steps.runner().invocations()[2];
        assert_eq!(composer.cwd, Some(PathBuf::from("/prod/mediawiki-staging")));
    }

    #[test]
    fn dependency_update_stops_at_failed_pull() {
        let runner = ScriptedRunner {
            fail_on: Some(" pull "),
            ..ScriptedRunner::default()
        };
        let steps = ShellSteps::new(Topology::default(), &runner);
        let err = steps.update_dependencies().unwrap_err();

        assert!(
            matches!(
                err,
                StepError::DependencyUpdateFailed {
                    stage: DependencyStage::Pull,
                    ..
                }
            ),
            "got: {err}"
        );
        assert_eq!(runner.seen.borrow().len(), 2, "composer must not run");
    }

    #[test]
    fn extension_pull_recurses_but_skin_pull_does_not() {
        let steps = ShellSteps::new(Topology::default(), DryRunRunner::new());
        steps.update_extension(&"Echo".into()).expect("ext");
        steps.update_skin(&"Vector".into()).expect("skin");

        assert_eq!(
            command_lines(&steps),
            vec![
                "git -C /prod/mediawiki-staging/extensions/Echo pull --recurse-submodules --quiet",
                "git -C /prod/mediawiki-staging/skins/Vector pull --quiet",
            ]
        );
    }

    #[test]
    fn local_sync_mirrors_vendor_extensions_then_skins() {
        let steps = ShellSteps::new(Topology::default(), DryRunRunner::new());
        let req = request(RequestDraft {
            dependency_update: true,
            extensions: vec!["Echo".into()],
            skins: vec!["Vector".into()],
            bypass_timestamp_sync: true,
            servers: vec!["mw1".into()],
            ..RequestDraft::default()
        });
        steps.sync_local(&req).expect("sync");

        let lines = command_lines(&steps);
        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with("/prod/mediawiki-staging/vendor/ /prod/mediawiki/vendor/"));
        assert!(lines[1].ends_with(
            "/prod/mediawiki-staging/extensions/Echo/ /prod/mediawiki/extensions/Echo/"
        ));
        assert!(lines[2].ends_with("/prod/mediawiki-staging/skins/Vector/ /prod/mediawiki/skins/Vector/"));
        assert!(lines.iter().all(|l| l.starts_with("rsync --inplace ")));
    }

    #[test]
    fn local_sync_failure_names_the_subtree() {
        let runner = ScriptedRunner {
            fail_on: Some("extensions/Echo"),
            ..ScriptedRunner::default()
        };
        let steps = ShellSteps::new(Topology::default(), &runner);
        let req = request(RequestDraft {
            extensions: vec!["Echo".into(), "Foo".into()],
            servers: vec!["mw1".into()],
            ..RequestDraft::default()
        });
        let err = steps.sync_local(&req).unwrap_err();

        match err {
            StepError::LocalSyncFailed { path, .. } => {
                assert_eq!(path, PathBuf::from("/prod/mediawiki-staging/extensions/Echo"));
            }
            other => panic!("expected local sync failure, got {other:?}"),
        }
        assert_eq!(runner.seen.borrow().len(), 1, "Foo must not be mirrored");
    }

    #[test]
    fn localization_rebuild_passes_language_filter() {
        let steps = ShellSteps::new(Topology::default(), DryRunRunner::new());
        steps
            .rebuild_localization(&["de".to_string(), "fr".to_string()])
            .expect("l10n");

        let lines = command_lines(&steps);
        assert_eq!(
            lines[0],
            "php /prod/mediawiki/extensions/TelepediaMagic/maintenance/mergeMessageFileList.php \
             --quiet --wiki=metawiki \
             --extensions-dir=/prod/mediawiki/extensions:/prod/mediawiki/skins \
             --output /prod/mediawiki/config/ExtensionMessageFiles.php"
        );
        assert_eq!(
            lines[1],
            "php /prod/mediawiki/maintenance/rebuildLocalisationCache.php --quiet --wiki=metawiki --lang=de,fr"
        );
    }

    #[test]
    fn localization_rebuild_without_filter_rebuilds_everything() {
        let steps = ShellSteps::new(Topology::default(), DryRunRunner::new());
        steps.rebuild_localization(&[]).expect("l10n");
        assert!(!command_lines(&steps)[1].contains("--lang"));
    }

    #[test]
    fn remote_sync_error_names_the_server() {
        let runner = ScriptedRunner {
            fail_on: Some("@mw2:"),
            ..ScriptedRunner::default()
        };
        let steps = ShellSteps::new(Topology::default(), &runner);
        let req = request(RequestDraft {
            servers: vec!["mw2".into()],
            ..RequestDraft::default()
        });
        let err = steps.sync_remote(&"mw2".into(), &req).unwrap_err();
        assert!(err.to_string().starts_with("failed to sync to remote server mw2: "));
    }
}
