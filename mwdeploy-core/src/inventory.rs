//! Discovery of deployable extensions and skins.
//!
//! A target is deployable iff `<dir>/<name>` is a directory and
//! `<dir>/<name>/.git` exists. The scan is recomputed on every run and never
//! cached; any read error aborts the scan.

use std::collections::BTreeSet;
use std::path::Path;

use serde::Serialize;

use crate::error::DiscoveryError;
use crate::topology::Topology;
use crate::types::{ExtensionName, SkinName, TargetKind};

/// Name of the version-control marker checked inside each candidate.
pub const VCS_MARKER: &str = ".git";

/// Snapshot of what can be deployed right now.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Inventory {
    pub extensions: BTreeSet<ExtensionName>,
    pub skins: BTreeSet<SkinName>,
}

impl Inventory {
    /// Scan the staging extensions and skins directories of `topology`.
    pub fn scan(topology: &Topology) -> Result<Self, DiscoveryError> {
        Ok(Self {
            extensions: list_extensions_at(&topology.staging_extensions())?,
            skins: list_skins_at(&topology.staging_skins())?,
        })
    }

    pub fn has_extension(&self, name: &ExtensionName) -> bool {
        self.extensions.contains(name)
    }

    pub fn has_skin(&self, name: &SkinName) -> bool {
        self.skins.contains(name)
    }
}

/// Version-controlled extension directories under `dir`.
pub fn list_extensions_at(dir: &Path) -> Result<BTreeSet<ExtensionName>, DiscoveryError> {
    Ok(scan_dir(dir, TargetKind::Extension)?
        .into_iter()
        .map(ExtensionName::from)
        .collect())
}

/// Version-controlled skin directories under `dir`.
pub fn list_skins_at(dir: &Path) -> Result<BTreeSet<SkinName>, DiscoveryError> {
    Ok(scan_dir(dir, TargetKind::Skin)?
        .into_iter()
        .map(SkinName::from)
        .collect())
}

fn scan_dir(dir: &Path, kind: TargetKind) -> Result<Vec<String>, DiscoveryError> {
    let io_err = |source| DiscoveryError::Io {
        kind,
        path: dir.to_path_buf(),
        source,
    };

    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        // Symlinks are not followed: only real directories count.
        if !entry.file_type().map_err(io_err)?.is_dir() {
            continue;
        }
        if !entry.path().join(VCS_MARKER).exists() {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => names.push(name),
            Err(raw) => tracing::warn!(
                "skipping {kind} with non-UTF-8 name {:?} in {}",
                raw,
                dir.display()
            ),
        }
    }
    Ok(names)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
