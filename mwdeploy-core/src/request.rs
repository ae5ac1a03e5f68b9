//! Deploy requests: a mutable draft collected from input, the frozen,
//! fully expanded request, and the validated request the executor consumes.
//!
//! ```text
//! RequestDraft ──expand()──▶ ExpandedRequest ──validate()──▶ DeployRequest
//! ```
//!
//! [`RequestDraft::finalize`] does both steps, so validation can never see a
//! request whose shorthands have not been applied yet. A [`DeployRequest`]
//! can only be obtained through validation.

use std::ops::Deref;

use serde::Serialize;

use crate::error::ValidationError;
use crate::inventory::Inventory;
use crate::types::{ExtensionName, ServerName, SkinName};
use crate::validate::validate;

// ---------------------------------------------------------------------------
// Draft
// ---------------------------------------------------------------------------

/// Raw request as collected from flags. Nothing here is checked yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestDraft {
    pub dependency_update: bool,
    pub full_upgrade: bool,
    pub extensions: Vec<ExtensionName>,
    pub skins: Vec<SkinName>,
    pub localization: bool,
    pub localization_languages: Vec<String>,
    /// May contain the `all` sentinel.
    pub servers: Vec<ServerName>,
    pub bypass_timestamp_sync: bool,
    pub continue_on_error: bool,
}

impl RequestDraft {
    /// Expand shorthands, then validate against `inventory`.
    pub fn finalize(
        self,
        inventory: &Inventory,
        roster: &[ServerName],
    ) -> Result<DeployRequest, ValidationError> {
        expand(self, inventory, roster).validate(inventory)
    }
}

// ---------------------------------------------------------------------------
// Frozen request
// ---------------------------------------------------------------------------

/// A fully expanded deploy request. Read-only once built, not yet checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpandedRequest {
    full_upgrade: bool,
    dependency_update: bool,
    extensions: Vec<ExtensionName>,
    skins: Vec<SkinName>,
    localization: bool,
    localization_languages: Vec<String>,
    servers: Vec<ServerName>,
    bypass_timestamp_sync: bool,
    continue_on_error: bool,
}

impl ExpandedRequest {
    /// Check against `inventory`; the only way to build a [`DeployRequest`].
    pub fn validate(self, inventory: &Inventory) -> Result<DeployRequest, ValidationError> {
        validate(&self, inventory)?;
        Ok(DeployRequest(self))
    }

    /// Whether this request came from the full-upgrade shorthand.
    pub fn full_upgrade(&self) -> bool {
        self.full_upgrade
    }

    pub fn dependency_update(&self) -> bool {
        self.dependency_update
    }

    /// Extensions to update, in execution order.
    pub fn extensions(&self) -> &[ExtensionName] {
        &self.extensions
    }

    /// Skins to update, in execution order.
    pub fn skins(&self) -> &[SkinName] {
        &self.skins
    }

    pub fn localization(&self) -> bool {
        self.localization
    }

    /// Languages to restrict the cache rebuild to; empty means all.
    pub fn localization_languages(&self) -> &[String] {
        &self.localization_languages
    }

    /// Target servers with the `all` sentinel already expanded.
    pub fn servers(&self) -> &[ServerName] {
        &self.servers
    }

    pub fn bypass_timestamp_sync(&self) -> bool {
        self.bypass_timestamp_sync
    }

    pub fn continue_on_error(&self) -> bool {
        self.continue_on_error
    }

    pub fn targets_server(&self, server: &ServerName) -> bool {
        self.servers.contains(server)
    }

    /// True when the local mirror has at least one subtree to copy.
    pub fn has_local_sync_scope(&self) -> bool {
        self.dependency_update || !self.extensions.is_empty() || !self.skins.is_empty()
    }
}

/// An [`ExpandedRequest`] that passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DeployRequest(ExpandedRequest);

impl Deref for DeployRequest {
    type Target = ExpandedRequest;

    fn deref(&self) -> &ExpandedRequest {
        &self.0
    }
}

/// Apply the full-upgrade shorthand and the `all` server sentinel.
///
/// Full upgrade replaces the extension and skin lists with the whole
/// inventory (sorted) and turns on dependency update, localization and
/// timestamp bypass. Any `all` entry in `servers` is replaced by `roster`.
/// Lists are de-duplicated keeping the first occurrence.
pub fn expand(
    draft: RequestDraft,
    inventory: &Inventory,
    roster: &[ServerName],
) -> ExpandedRequest {
    let RequestDraft {
        mut dependency_update,
        full_upgrade,
        mut extensions,
        mut skins,
        mut localization,
        localization_languages,
        servers,
        mut bypass_timestamp_sync,
        continue_on_error,
    } = draft;

    if full_upgrade {
        extensions = inventory.extensions.iter().cloned().collect();
        skins = inventory.skins.iter().cloned().collect();
        dependency_update = true;
        localization = true;
        bypass_timestamp_sync = true;
    }

    let mut expanded_servers = Vec::with_capacity(servers.len());
    for server in servers {
        if server.is_all_sentinel() {
            expanded_servers.extend(roster.iter().cloned());
        } else {
            expanded_servers.push(server);
        }
    }

    ExpandedRequest {
        full_upgrade,
        dependency_update,
        extensions: dedup_ordered(extensions),
        skins: dedup_ordered(skins),
        localization,
        localization_languages: dedup_ordered(localization_languages),
        servers: dedup_ordered(expanded_servers),
        bypass_timestamp_sync,
        continue_on_error,
    }
}

fn dedup_ordered<T: PartialEq>(items: Vec<T>) -> Vec<T> {
    let mut out: Vec<T> = Vec::with_capacity(items.len());
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
