//! Deploy file: hosts, their facts and the operations to plan

use anyhow::{Context, Result, bail};
use declarative::{
    PackageCommands, PackageManager, PackageSnapshot, RepoSpec, RpmInfo, ServiceManager,
    ServiceStatuses,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

/// Get the config directory path
pub fn config_dir() -> Result<PathBuf> {
    let dir = dirs::config_dir().context("Could not determine config directory")?;
    Ok(dir.join("converge"))
}

/// Default deploy file location
pub fn default_deploy_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("deploy.toml"))
}

/// Expand `~` in a user-supplied path
pub fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(&raw).as_ref())
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct DeployConfig {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub hosts: BTreeMap<String, HostConfig>,
    #[serde(default)]
    pub operations: Vec<OperationConfig>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Directory on the hosts for downloaded files
    #[serde(default)]
    pub temp_dir: Option<String>,
    #[serde(default)]
    pub jobs: Option<usize>,
}

/// Facts gathered from one host
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HostConfig {
    #[serde(default)]
    pub files: BTreeSet<String>,
    /// Content hashes (blake3 hex) of files on the host, keyed by path
    #[serde(default)]
    pub file_hashes: BTreeMap<String, String>,
    #[serde(default)]
    pub packages: PackageSnapshot,
    #[serde(default)]
    pub services: ServiceStatuses,
    /// Metadata of RPM files on the host, keyed by path
    #[serde(default)]
    pub rpms: BTreeMap<String, RpmInfo>,
    /// Virtual package name to its providers ("name" or "name=version")
    #[serde(default)]
    pub provides: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OperationConfig {
    Packages(PackagesConfig),
    Service(ServiceConfig),
    Rpm(RpmConfig),
    Repo(RepoSpec),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackagesConfig {
    pub packages: Vec<String>,
    #[serde(default = "default_true")]
    pub present: bool,
    #[serde(default)]
    pub latest: bool,
    #[serde(default)]
    pub manager: Option<PackageManager>,
    #[serde(default)]
    pub install: Option<String>,
    #[serde(default)]
    pub uninstall: Option<String>,
    #[serde(default)]
    pub upgrade: Option<String>,
    #[serde(default)]
    pub version_join: Option<String>,
}

impl PackagesConfig {
    /// Manager preset with any explicit command overrides applied
    pub fn commands(&self) -> Result<PackageCommands> {
        let mut commands = match (self.manager, &self.install, &self.uninstall) {
            (Some(manager), _, _) => manager.commands(),
            (None, Some(install), Some(uninstall)) => PackageCommands::new(install, uninstall),
            (None, _, _) => bail!(
                "packages {:?}: set `manager` or both `install` and `uninstall`",
                self.packages
            ),
        };

        if let Some(install) = &self.install {
            commands.install.clone_from(install);
        }
        if let Some(uninstall) = &self.uninstall {
            commands.uninstall.clone_from(uninstall);
        }
        if self.upgrade.is_some() {
            commands.upgrade.clone_from(&self.upgrade);
        }
        if self.version_join.is_some() {
            commands.version_join.clone_from(&self.version_join);
        }
        Ok(commands)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    #[serde(default)]
    pub init: Option<ServiceManager>,
    /// Command template with `{name}` and `{action}`
    #[serde(default)]
    pub template: Option<String>,
    #[serde(default)]
    pub status_argument: Option<String>,
    #[serde(default)]
    pub running: Option<bool>,
    #[serde(default)]
    pub restarted: bool,
    #[serde(default)]
    pub reloaded: bool,
    #[serde(default)]
    pub command: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpmConfig {
    pub source: String,
    #[serde(default = "default_true")]
    pub present: bool,
    #[serde(default)]
    pub manager: Option<PackageManager>,
    /// Removal command (e.g. "yum"); defaults from `manager`
    #[serde(default)]
    pub manager_command: Option<String>,
}

impl RpmConfig {
    pub fn manager_command(&self) -> Result<String> {
        if let Some(command) = &self.manager_command {
            return Ok(command.clone());
        }
        match self.manager {
            None => Ok("yum".to_string()),
            Some(manager) => manager
                .rpm_remove_command()
                .map(str::to_string)
                .with_context(|| format!("rpm {}: {manager:?} cannot remove RPMs", self.source)),
        }
    }
}

fn default_true() -> bool {
    true
}

/// Supported deploy file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployFormat {
    Toml,
    Json,
}

impl DeployFormat {
    /// Pick the format from the file extension; anything but `.json` is TOML
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::Json,
            _ => Self::Toml,
        }
    }
}

impl DeployConfig {
    /// Load a deploy file, or the default one when `path` is `None`
    pub fn load(path: Option<&Path>) -> Result<(Self, PathBuf)> {
        let path = match path {
            Some(path) => expand_path(path),
            None => default_deploy_path()?,
        };

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        let config = Self::parse(&content, DeployFormat::from_path(&path))
            .with_context(|| format!("Invalid deploy file {}", path.display()))?;

        log::debug!(
            "loaded {} host(s) and {} operation(s) from {}",
            config.hosts.len(),
            config.operations.len(),
            path.display()
        );
        Ok((config, path))
    }

    pub fn parse(content: &str, format: DeployFormat) -> Result<Self> {
        let config: Self = match format {
            DeployFormat::Toml => toml::from_str(content)?,
            DeployFormat::Json => serde_json::from_str(content)?,
        };
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const DEPLOY: &str = r#"
[settings]
temp_dir = "/var/tmp"
jobs = 2

[hosts.web1]
files = ["/etc/yum.repos.d/epel.repo"]
[hosts.web1.file_hashes]
"/etc/motd" = "af1349b9f5f9a1a6a0404dea36dcc9499bcb25c9adc112b7cc9a93cae41f3262"
[hosts.web1.packages]
vim = ["8.2"]
[hosts.web1.services]
nginx = true
[hosts.web1.rpms]
"/tmp/foo.rpm" = { name = "foo", version = "1.0" }
[hosts.web1.provides]
editor = ["vim", "nano=2.0"]

[hosts.db1]

[[operations]]
type = "packages"
manager = "dnf"
packages = ["vim", "curl=7.1"]

[[operations]]
type = "service"
name = "nginx"
init = "systemd"
running = true

[[operations]]
type = "rpm"
source = "https://example.com/foo.rpm"
manager = "dnf"

[[operations]]
type = "repo"
identifier = "epel"
baseurl = "https://mirror/epel"
repo_type = "rpm-md"
"#;

    #[test]
    fn test_parse_toml_deploy() {
        let config = DeployConfig::parse(DEPLOY, DeployFormat::Toml).unwrap();

        assert_eq!(config.settings.temp_dir.as_deref(), Some("/var/tmp"));
        assert_eq!(config.settings.jobs, Some(2));
        assert_eq!(config.hosts.len(), 2);

        let web1 = &config.hosts["web1"];
        assert!(web1.packages.has("vim", Some("8.2")));
        assert_eq!(web1.file_hashes["/etc/motd"].len(), 64);
        assert!(web1.services.get("nginx").is_running());
        assert_eq!(web1.rpms["/tmp/foo.rpm"].version, "1.0");
        assert_eq!(web1.provides["editor"], vec!["vim", "nano=2.0"]);
        assert!(config.hosts["db1"].packages.is_empty());

        assert_eq!(config.operations.len(), 4);
        match &config.operations[3] {
            OperationConfig::Repo(spec) => {
                assert_eq!(spec.identifier, "epel");
                assert_eq!(spec.repo_type.as_deref(), Some("rpm-md"));
                assert!(spec.present);
            }
            other => panic!("expected repo, got {other:?}"),
        }
    }

    #[test]
    fn test_package_commands_from_manager_and_overrides() {
        let config: PackagesConfig = toml::from_str(
            r#"
packages = ["vim"]
manager = "apt"
install = "apt-get install -y"
"#,
        )
        .unwrap();
        let commands = config.commands().unwrap();
        assert_eq!(commands.install, "apt-get install -y");
        assert_eq!(commands.uninstall, PackageManager::Apt.commands().uninstall);
        assert!(config.present);
        assert!(!config.latest);
    }

    #[test]
    fn test_package_commands_require_manager_or_verbs() {
        let config: PackagesConfig = toml::from_str(r#"packages = ["vim"]"#).unwrap();
        assert!(config.commands().is_err());

        let config: PackagesConfig = toml::from_str(
            r#"
packages = ["vim"]
install = "xbps-install -y"
uninstall = "xbps-remove -y"
"#,
        )
        .unwrap();
        let commands = config.commands().unwrap();
        assert_eq!(commands.install, "xbps-install -y");
        assert!(commands.upgrade.is_none());
    }

    #[test]
    fn test_rpm_manager_command() {
        let rpm = |manager: Option<PackageManager>, command: Option<&str>| RpmConfig {
            source: "/tmp/foo.rpm".to_string(),
            present: false,
            manager,
            manager_command: command.map(str::to_string),
        };

        assert_eq!(rpm(None, None).manager_command().unwrap(), "yum");
        assert_eq!(rpm(Some(PackageManager::Dnf), None).manager_command().unwrap(), "dnf");
        assert_eq!(rpm(None, Some("zypper")).manager_command().unwrap(), "zypper");
        assert!(rpm(Some(PackageManager::Apt), None).manager_command().is_err());
    }

    #[test]
    fn test_load_json_by_extension() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{"hosts": {{"web1": {{"packages": {{"curl": ["7.1"]}}}}}},
                "operations": [{{"type": "service", "name": "cron", "init": "openrc",
                                 "running": false}}]}}"#
        )
        .unwrap();

        let (config, path) = DeployConfig::load(Some(file.path())).unwrap();
        assert_eq!(path, file.path());
        assert!(config.hosts["web1"].packages.contains("curl"));
        assert!(matches!(
            &config.operations[0],
            OperationConfig::Service(ServiceConfig { init: Some(ServiceManager::OpenRc), .. })
        ));
    }

    #[test]
    fn test_load_missing_file_reports_path() {
        let file = NamedTempFile::new().unwrap();
        let missing = file.path().with_extension("missing");
        let err = DeployConfig::load(Some(&missing)).unwrap_err();
        assert!(err.to_string().contains("Could not read"));
    }

    #[test]
    fn test_unknown_operation_type_is_rejected() {
        let err = DeployConfig::parse(
            "[[operations]]\ntype = \"cron\"\nname = \"x\"\n",
            DeployFormat::Toml,
        );
        assert!(err.is_err());
    }

    #[test]
    fn test_expand_path_tilde() {
        let expanded = expand_path(Path::new("~/deploy.toml"));
        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert_eq!(expand_path(Path::new("/etc/deploy.toml")), PathBuf::from("/etc/deploy.toml"));
    }
}
