//! Host facts read from the deploy file

use crate::config::HostConfig;
use declarative::package::DEFAULT_VERSION_JOIN;
use declarative::{DesiredPackage, HostFacts, RpmInfo, StaticResolver};
use std::collections::{BTreeMap, BTreeSet};

/// Facts recorded in a deploy file instead of probed over a connection
#[derive(Debug, Clone, Default)]
pub struct StaticFacts {
    files: BTreeSet<String>,
    file_hashes: BTreeMap<String, String>,
    rpm_files: BTreeMap<String, RpmInfo>,
}

impl StaticFacts {
    pub fn from_host(host: &HostConfig) -> Self {
        Self {
            files: host.files.clone(),
            file_hashes: host.file_hashes.clone(),
            rpm_files: host.rpms.clone(),
        }
    }
}

impl HostFacts for StaticFacts {
    /// A file with a recorded hash exists too
    fn file_exists(&self, path: &str) -> declarative::Result<bool> {
        Ok(self.files.contains(path) || self.file_hashes.contains_key(path))
    }

    fn file_hash(&self, path: &str) -> declarative::Result<Option<String>> {
        Ok(self.file_hashes.get(path).cloned())
    }

    fn rpm_package(&self, path: &str) -> declarative::Result<Option<RpmInfo>> {
        Ok(self.rpm_files.get(path).cloned())
    }
}

/// Capability expansion from the host's `provides` table
pub fn resolver(host: &HostConfig) -> StaticResolver {
    host.provides
        .iter()
        .fold(StaticResolver::new(), |resolver, (capability, providers)| {
            let providers = providers
                .iter()
                .map(|raw| DesiredPackage::parse(raw, Some(DEFAULT_VERSION_JOIN)))
                .collect();
            resolver.provide(capability, providers)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use declarative::{PackageResolver, content_hash};

    fn host() -> HostConfig {
        let mut host = HostConfig::default();
        host.files.insert("/etc/motd".to_string());
        host.file_hashes
            .insert("/etc/issue".to_string(), content_hash("Welcome\n"));
        host.rpms.insert(
            "/tmp/foo.rpm".to_string(),
            RpmInfo {
                name: "foo".to_string(),
                version: "1.0".to_string(),
            },
        );
        host.provides
            .insert("editor".to_string(), vec!["vim".to_string(), "nano=2.0".to_string()]);
        host
    }

    #[test]
    fn test_file_exists() {
        let facts = StaticFacts::from_host(&host());
        assert!(facts.file_exists("/etc/motd").unwrap());
        assert!(facts.file_exists("/etc/issue").unwrap());
        assert!(!facts.file_exists("/etc/hosts").unwrap());
    }

    #[test]
    fn test_file_hash() {
        let facts = StaticFacts::from_host(&host());
        assert_eq!(facts.file_hash("/etc/issue").unwrap(), Some(content_hash("Welcome\n")));
        assert_eq!(facts.file_hash("/etc/motd").unwrap(), None);
    }

    #[test]
    fn test_rpm_package_by_path() {
        let facts = StaticFacts::from_host(&host());

        let info = facts.rpm_package("/tmp/foo.rpm").unwrap().unwrap();
        assert_eq!(info.name, "foo");
        assert!(facts.rpm_package("foo").unwrap().is_none());
    }

    #[test]
    fn test_resolver_from_provides() {
        let resolver = resolver(&host());
        let providers = resolver.expand("editor");
        assert_eq!(
            providers,
            vec![DesiredPackage::new("vim"), DesiredPackage::versioned("nano", "2.0")]
        );
        assert!(resolver.expand("pager").is_empty());
    }
}
