//! Error types for mwdeploy-core.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::TargetKind;

/// Errors raised while locating or parsing the topology file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The topology file could not be read.
    #[error("I/O error reading topology at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid topology YAML. Carries serde_yaml's line context.
    #[error("failed to parse topology at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// A file was named explicitly (flag or environment) but does not exist.
    #[error("topology file not found at {path}")]
    NotFound { path: PathBuf },

    /// The topology lists no servers, so `all` would expand to nothing.
    #[error("topology at {path} defines an empty server roster")]
    EmptyRoster { path: PathBuf },
}

/// Failure to scan the staging tree for installable targets.
///
/// Always fatal: validation cannot run against a partial inventory.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("cannot list {kind} directory {path}: {source}")]
    Io {
        kind: TargetKind,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A deploy request that must not be executed.
///
/// Only the first violation found is reported.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid {kind}: {name}")]
    UnknownTarget { kind: TargetKind, name: String },

    #[error("at least one server required")]
    NoServersSpecified,

    #[error("--lang requires --l10n flag")]
    LanguageWithoutLocalization,
}
