//! `mwdeploy inventory`: what staging can deploy.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use mwdeploy_core::{Inventory, TargetKind, Topology};

use crate::GlobalArgs;

/// Arguments for `mwdeploy inventory`.
#[derive(Args, Debug)]
pub struct InventoryArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Tabled)]
struct TargetRow {
    #[tabled(rename = "kind")]
    kind: String,
    #[tabled(rename = "name")]
    name: String,
}

impl InventoryArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<()> {
        let (topology, inventory) = super::load(global)?;
        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&inventory)
                    .context("failed to serialize inventory JSON")?
            );
            return Ok(());
        }
        print_table(&topology, &inventory);
        Ok(())
    }
}

fn print_table(topology: &Topology, inventory: &Inventory) {
    println!(
        "{} | {} extensions | {} skins",
        topology.staging_root.display().to_string().bold(),
        inventory.extensions.len(),
        inventory.skins.len(),
    );

    let rows: Vec<TargetRow> = inventory
        .extensions
        .iter()
        .map(|name| TargetRow {
            kind: TargetKind::Extension.to_string(),
            name: name.to_string(),
        })
        .chain(inventory.skins.iter().map(|name| TargetRow {
            kind: TargetKind::Skin.to_string(),
            name: name.to_string(),
        }))
        .collect();
    if rows.is_empty() {
        println!("No git checkouts found under staging.");
        return;
    }

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
}
