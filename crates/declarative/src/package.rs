//! Package identity and version model

use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator used when a versioned package must be rendered but the
/// package manager did not declare one.
pub const DEFAULT_VERSION_JOIN: &str = "=";

/// A package name with an optional version constraint
///
/// Used both for operator-declared packages and for the concrete
/// identities a [`crate::PackageResolver`] expands a name into.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DesiredPackage {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
}

impl DesiredPackage {
    /// A package with no version constraint
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
        }
    }

    /// A package pinned to a version
    pub fn versioned(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: Some(version.into()),
        }
    }

    /// Parse `name` or `name<join>version`
    ///
    /// The split happens once, at the rightmost `join`, so names that contain
    /// the separator keep it. Without a `join` the whole input is the name.
    pub fn parse(raw: &str, version_join: Option<&str>) -> Self {
        match version_join
            .filter(|j| !j.is_empty())
            .and_then(|j| raw.rsplit_once(j))
        {
            Some((name, version)) => Self::versioned(name, version),
            None => Self::new(raw),
        }
    }

    /// Whether a version was requested
    pub fn is_versioned(&self) -> bool {
        self.version.is_some()
    }

    /// Command-line token: `name` or `name<join>version`
    pub fn token(&self, version_join: Option<&str>) -> String {
        match &self.version {
            Some(version) => format!(
                "{}{}{}",
                self.name,
                version_join.unwrap_or(DEFAULT_VERSION_JOIN),
                version
            ),
            None => self.name.clone(),
        }
    }
}

impl fmt::Display for DesiredPackage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.token(None))
    }
}

impl From<&str> for DesiredPackage {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Parse a list of declared packages with a manager's version separator
pub fn parse_packages<S: AsRef<str>>(raw: &[S], version_join: Option<&str>) -> Vec<DesiredPackage> {
    raw.iter()
        .map(|p| DesiredPackage::parse(p.as_ref(), version_join))
        .collect()
}
