//! mwdeploy core library: domain names, topology, inventory, requests.
//!
//! - [`types`]: newtypes for extensions, skins and servers
//! - [`error`]: [`ConfigError`], [`DiscoveryError`], [`ValidationError`]
//! - [`topology`]: fixed deployment layout, loaded from YAML or defaults
//! - [`inventory`]: scan of deployable extensions and skins
//! - [`request`] / [`validate`]: draft → expanded request → checked request

pub mod error;
pub mod inventory;
pub mod request;
pub mod topology;
pub mod types;
pub mod validate;

pub use error::{ConfigError, DiscoveryError, ValidationError};
pub use inventory::Inventory;
pub use request::{DeployRequest, ExpandedRequest, RequestDraft};
pub use topology::Topology;
pub use types::{ExtensionName, ServerName, SkinName, TargetKind};
pub use validate::validate;
