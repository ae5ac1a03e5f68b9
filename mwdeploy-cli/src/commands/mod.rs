pub mod deploy;
pub mod inventory;

use anyhow::{Context, Result};

use mwdeploy_core::topology::{self, Topology, TopologySource};
use mwdeploy_core::Inventory;

use crate::GlobalArgs;

/// Resolve the topology and scan staging for deployable targets.
pub(crate) fn load(global: &GlobalArgs) -> Result<(Topology, Inventory)> {
    let (topology, source) =
        topology::resolve(global.config.as_deref()).context("failed to load topology")?;
    match &source {
        TopologySource::File(path) => tracing::debug!("topology loaded from {}", path.display()),
        TopologySource::Defaults => tracing::debug!("no topology file found; using defaults"),
    }

    let inventory = Inventory::scan(&topology).with_context(|| {
        format!(
            "failed to scan staging tree {}",
            topology.staging_root.display()
        )
    })?;
    tracing::debug!(
        extensions = inventory.extensions.len(),
        skins = inventory.skins.len(),
        "inventory scanned"
    );
    Ok((topology, inventory))
}
