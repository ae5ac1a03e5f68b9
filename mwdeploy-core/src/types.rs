//! Domain names used throughout a deploy.
//!
//! Extension, skin and server names are kept apart at the type level so a
//! skin can never be handed to an extension step by accident.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// The directory name of an extension under the staging `extensions/` tree.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtensionName(pub String);

impl ExtensionName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExtensionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ExtensionName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ExtensionName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// The directory name of a skin under the staging `skins/` tree.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkinName(pub String);

impl SkinName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SkinName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for SkinName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SkinName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Short host name of an application server (`mw1`, not `mw1.example.org`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServerName(pub String);

impl ServerName {
    /// Sentinel accepted on the command line in place of the full roster.
    pub const ALL: &'static str = "all";

    /// Build a server name from a possibly fully-qualified host name.
    ///
    /// Everything from the first `.` onwards is dropped.
    pub fn short(host: &str) -> Self {
        let short = host.trim().split('.').next().unwrap_or_default();
        Self(short.to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_all_sentinel(&self) -> bool {
        self.0 == Self::ALL
    }
}

impl fmt::Display for ServerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ServerName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ServerName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which inventory a target name belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Extension,
    Skin,
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetKind::Extension => write!(f, "extension"),
            TargetKind::Skin => write!(f, "skin"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newtype_display() {
        assert_eq!(ExtensionName::from("Echo").to_string(), "Echo");
        assert_eq!(SkinName::from("Vector").to_string(), "Vector");
        assert_eq!(ServerName::from("mw1").to_string(), "mw1");
    }

    #[test]
    fn short_server_name_drops_domain() {
        assert_eq!(ServerName::short("mw1.telepedia.net"), ServerName::from("mw1"));
        assert_eq!(ServerName::short("mwtask1\n"), ServerName::from("mwtask1"));
        assert_eq!(ServerName::short("mw2"), ServerName::from("mw2"));
    }

    #[test]
    fn all_sentinel_is_exact() {
        assert!(ServerName::from("all").is_all_sentinel());
        assert!(!ServerName::from("ALL").is_all_sentinel());
        assert!(!ServerName::from("mw1").is_all_sentinel());
    }

    #[test]
    fn target_kind_display() {
        assert_eq!(TargetKind::Extension.to_string(), "extension");
        assert_eq!(TargetKind::Skin.to_string(), "skin");
    }

    #[test]
    fn names_serialize_as_plain_strings() {
        let yaml = serde_yaml::to_string(&vec![ServerName::from("mw1")]).expect("serialize");
        assert_eq!(yaml.trim(), "- mw1");
    }
}
