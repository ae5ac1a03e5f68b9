//! Deployment topology: where the trees live, who the servers are, and which
//! tools are invoked.
//!
//! # Resolution order
//!
//! ```text
//! --config <path>                      (must exist)
//! $MWDEPLOY_CONFIG                     (must exist)
//! /etc/mwdeploy/topology.yaml          (used if present)
//! <config_dir>/mwdeploy/topology.yaml  (used if present)
//! compiled-in defaults
//! ```
//!
//! Every field is optional in YAML; missing fields keep their default.
//! Relative paths in the `localization` section are resolved against the
//! production root.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::{ExtensionName, ServerName, SkinName};

/// Environment variable naming a topology file.
pub const CONFIG_ENV: &str = "MWDEPLOY_CONFIG";

/// System-wide topology location.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/mwdeploy/topology.yaml";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// The fixed layout a deploy operates on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Topology {
    /// Root of the staging checkout that updates are pulled into.
    pub staging_root: PathBuf,
    /// Root of the tree served in production.
    pub production_root: PathBuf,
    pub extensions_dir: PathBuf,
    pub skins_dir: PathBuf,
    pub vendor_dir: PathBuf,
    /// Remote login used for mirroring to other servers.
    pub deploy_user: String,
    /// Private key passed to ssh for remote mirroring.
    pub deploy_key: PathBuf,
    /// Full roster; `--servers all` expands to this list.
    pub servers: Vec<ServerName>,
    /// Upstream branch the vendor checkout tracks.
    pub vendor_branch: String,
    /// Wiki id passed to maintenance scripts.
    pub wiki: String,
    pub localization: LocalizationScripts,
    pub tools: Tools,
}

/// Maintenance scripts used for the localization rebuild.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalizationScripts {
    pub merge_script: PathBuf,
    pub message_file_list: PathBuf,
    pub rebuild_script: PathBuf,
}

/// External programs, looked up on `PATH` unless absolute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tools {
    pub git: String,
    pub composer: String,
    pub rsync: String,
    pub php: String,
    pub ssh: String,
}

impl Default for Topology {
    fn default() -> Self {
        Self {
            staging_root: PathBuf::from("/prod/mediawiki-staging"),
            production_root: PathBuf::from("/prod/mediawiki"),
            extensions_dir: PathBuf::from("extensions"),
            skins_dir: PathBuf::from("skins"),
            vendor_dir: PathBuf::from("vendor"),
            deploy_user: "mediawikiuser".to_string(),
            deploy_key: PathBuf::from("/prod/mediawiki-staging/deploykey"),
            servers: vec![
                ServerName::from("mw1"),
                ServerName::from("mw2"),
                ServerName::from("mwtask1"),
            ],
            vendor_branch: "REL1_43".to_string(),
            wiki: "metawiki".to_string(),
            localization: LocalizationScripts::default(),
            tools: Tools::default(),
        }
    }
}

impl Default for LocalizationScripts {
    fn default() -> Self {
        Self {
            merge_script: PathBuf::from(
                "extensions/TelepediaMagic/maintenance/mergeMessageFileList.php",
            ),
            message_file_list: PathBuf::from("config/ExtensionMessageFiles.php"),
            rebuild_script: PathBuf::from("maintenance/rebuildLocalisationCache.php"),
        }
    }
}

impl Default for Tools {
    fn default() -> Self {
        Self {
            git: "git".to_string(),
            composer: "composer".to_string(),
            rsync: "rsync".to_string(),
            php: "php".to_string(),
            ssh: "ssh".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Path helpers (pure, no I/O)
// ---------------------------------------------------------------------------

impl Topology {
    pub fn staging_extensions(&self) -> PathBuf {
        self.staging_root.join(&self.extensions_dir)
    }

    pub fn staging_skins(&self) -> PathBuf {
        self.staging_root.join(&self.skins_dir)
    }

    pub fn staging_vendor(&self) -> PathBuf {
        self.staging_root.join(&self.vendor_dir)
    }

    pub fn staging_extension(&self, name: &ExtensionName) -> PathBuf {
        self.staging_extensions().join(name.as_str())
    }

    pub fn staging_skin(&self, name: &SkinName) -> PathBuf {
        self.staging_skins().join(name.as_str())
    }

    pub fn production_extensions(&self) -> PathBuf {
        self.production_root.join(&self.extensions_dir)
    }

    pub fn production_skins(&self) -> PathBuf {
        self.production_root.join(&self.skins_dir)
    }

    pub fn production_vendor(&self) -> PathBuf {
        self.production_root.join(&self.vendor_dir)
    }

    pub fn production_extension(&self, name: &ExtensionName) -> PathBuf {
        self.production_extensions().join(name.as_str())
    }

    pub fn production_skin(&self, name: &SkinName) -> PathBuf {
        self.production_skins().join(name.as_str())
    }

    pub fn merge_script(&self) -> PathBuf {
        self.production_root.join(&self.localization.merge_script)
    }

    pub fn message_file_list(&self) -> PathBuf {
        self.production_root.join(&self.localization.message_file_list)
    }

    pub fn rebuild_script(&self) -> PathBuf {
        self.production_root.join(&self.localization.rebuild_script)
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Where a resolved topology came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopologySource {
    File(PathBuf),
    Defaults,
}

/// Load a topology from `path`.
///
/// Returns `ConfigError::NotFound` if the file is absent and
/// `ConfigError::Parse` (with path + line context) if malformed.
pub fn load_at(path: &Path) -> Result<Topology, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let topology: Topology = if contents.trim().is_empty() {
        Topology::default()
    } else {
        serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?
    };
    if topology.servers.is_empty() {
        return Err(ConfigError::EmptyRoster {
            path: path.to_path_buf(),
        });
    }
    Ok(topology)
}

/// Resolve the topology with every input made explicit.
///
/// `explicit` and `env_override` must point at an existing file; the
/// `fallbacks` are tried in order and skipped when absent.
pub fn resolve_at(
    explicit: Option<&Path>,
    env_override: Option<&Path>,
    fallbacks: &[PathBuf],
) -> Result<(Topology, TopologySource), ConfigError> {
    if let Some(path) = explicit.or(env_override) {
        let topology = load_at(path)?;
        return Ok((topology, TopologySource::File(path.to_path_buf())));
    }
    for candidate in fallbacks {
        if candidate.is_file() {
            let topology = load_at(candidate)?;
            return Ok((topology, TopologySource::File(candidate.clone())));
        }
    }
    Ok((Topology::default(), TopologySource::Defaults))
}

/// `resolve_at` using `$MWDEPLOY_CONFIG` and the standard fallback locations.
pub fn resolve(explicit: Option<&Path>) -> Result<(Topology, TopologySource), ConfigError> {
    let env_override = std::env::var_os(CONFIG_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from);
    resolve_at(explicit, env_override.as_deref(), &default_locations())
}

/// System-wide file first, then the per-user config directory.
pub fn default_locations() -> Vec<PathBuf> {
    let mut locations = vec![PathBuf::from(SYSTEM_CONFIG_PATH)];
    if let Some(dir) = dirs::config_dir() {
        locations.push(dir.join("mwdeploy").join("topology.yaml"));
    }
    locations
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
