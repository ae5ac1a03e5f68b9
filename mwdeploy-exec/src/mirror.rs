//! rsync command construction for local and remote mirroring.
//!
//! Every mirror is recursive, deletes destination files missing from the
//! source, and excludes dot-entries on both sides (`--exclude=.*` also keeps
//! `--delete` away from hidden destination files).

use std::path::Path;

use serde::Serialize;

use mwdeploy_core::{topology::Tools, ServerName, Topology};

use crate::process::Invocation;

/// How the mirror decides whether to overwrite a destination file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MirrorMode {
    /// Skip files that are newer on the destination (`--update`).
    Update,
    /// Overwrite every file in place regardless of timestamps (`--inplace`).
    InPlace,
}

impl MirrorMode {
    pub fn from_bypass(bypass_timestamp_sync: bool) -> Self {
        if bypass_timestamp_sync {
            MirrorMode::InPlace
        } else {
            MirrorMode::Update
        }
    }

    pub fn flag(self) -> &'static str {
        match self {
            MirrorMode::Update => "--update",
            MirrorMode::InPlace => "--inplace",
        }
    }
}

/// Copy the contents of `src` into `dst` on this host.
pub fn local(tools: &Tools, mode: MirrorMode, src: &Path, dst: &Path) -> Invocation {
    rsync(tools, mode, None, dir_contents(src), dir_contents(dst))
}

/// Copy the whole production tree to the same path on `server`.
pub fn remote(topology: &Topology, mode: MirrorMode, server: &ServerName) -> Invocation {
    let prod = dir_contents(&topology.production_root);
    let remote_shell = format!(
        "{} -i {}",
        topology.tools.ssh,
        topology.deploy_key.display()
    );
    let dst = format!("{}@{}:{}", topology.deploy_user, server, prod);
    rsync(&topology.tools, mode, Some(remote_shell), prod, dst)
}

fn rsync(
    tools: &Tools,
    mode: MirrorMode,
    remote_shell: Option<String>,
    src: String,
    dst: String,
) -> Invocation {
    let mut inv = Invocation::new(&tools.rsync).arg(mode.flag());
    if let Some(shell) = remote_shell {
        inv = inv.arg("-e").arg(shell);
    }
    inv.args(["-r", "--delete", "--exclude=.*"]).arg(src).arg(dst)
}

/// `path` with exactly one trailing slash, so rsync copies the contents
/// rather than nesting the directory inside the destination.
fn dir_contents(path: &Path) -> String {
    let rendered = path.display().to_string();
    format!("{}/", rendered.trim_end_matches('/'))
}
