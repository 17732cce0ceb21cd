//! Package-set reconciliation
//!
//! Compares declared packages with the host's package snapshot and emits at
//! most one install or uninstall command plus, when asked for, one upgrade
//! command. Packages that already match produce observations instead.

use crate::matcher::{MatchMode, MatchedPackage, PackageResolver, matches};
use crate::package::{DesiredPackage, parse_packages};
use crate::shell;
use crate::snapshot::PackageSnapshot;
use crate::types::{Observation, Outcome};
use serde::{Deserialize, Serialize};

/// CLI verbs of one package manager
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageCommands {
    /// Prefix for installing packages (e.g. "apt-get install -y")
    pub install: String,
    /// Prefix for removing packages
    pub uninstall: String,
    /// Prefix for upgrading installed packages, if the manager has one
    #[serde(default)]
    pub upgrade: Option<String>,
    /// Separator between name and version (e.g. "=" for apt, "@" for brew)
    #[serde(default)]
    pub version_join: Option<String>,
}

impl PackageCommands {
    pub fn new(install: &str, uninstall: &str) -> Self {
        Self {
            install: install.to_string(),
            uninstall: uninstall.to_string(),
            upgrade: None,
            version_join: None,
        }
    }

    pub fn with_upgrade(mut self, upgrade: &str) -> Self {
        self.upgrade = Some(upgrade.to_string());
        self
    }

    pub fn with_version_join(mut self, join: &str) -> Self {
        self.version_join = Some(join.to_string());
        self
    }
}

/// Package managers with known command sets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageManager {
    Apt,
    Yum,
    Dnf,
    Zypper,
    Apk,
    Pacman,
    Pkg,
    Brew,
    Pip,
}

impl PackageManager {
    /// Commands this manager is driven with
    pub fn commands(self) -> PackageCommands {
        match self {
            Self::Apt => PackageCommands::new(
                "DEBIAN_FRONTEND=noninteractive apt-get -y install",
                "DEBIAN_FRONTEND=noninteractive apt-get -y remove",
            )
            .with_upgrade("DEBIAN_FRONTEND=noninteractive apt-get -y install --only-upgrade")
            .with_version_join("="),
            Self::Yum => PackageCommands::new("yum install -y", "yum remove -y")
                .with_upgrade("yum update -y")
                .with_version_join("="),
            Self::Dnf => PackageCommands::new("dnf install -y", "dnf remove -y")
                .with_upgrade("dnf update -y")
                .with_version_join("="),
            Self::Zypper => PackageCommands::new(
                "zypper --non-interactive install -y",
                "zypper --non-interactive remove -y",
            )
            .with_upgrade("zypper --non-interactive update -y")
            .with_version_join("="),
            Self::Apk => PackageCommands::new("apk add", "apk del")
                .with_upgrade("apk upgrade")
                .with_version_join("="),
            Self::Pacman => PackageCommands::new("pacman --noconfirm -S", "pacman --noconfirm -R")
                .with_upgrade("pacman --noconfirm -S"),
            Self::Pkg => PackageCommands::new("pkg install -y", "pkg delete -y"),
            Self::Brew => PackageCommands::new("brew install", "brew uninstall")
                .with_upgrade("brew upgrade")
                .with_version_join("@"),
            Self::Pip => PackageCommands::new("pip install", "pip uninstall --yes")
                .with_upgrade("pip install --upgrade")
                .with_version_join("=="),
        }
    }

    /// Command used by the RPM installer to remove packages
    pub fn rpm_remove_command(self) -> Option<&'static str> {
        match self {
            Self::Yum => Some("yum"),
            Self::Dnf => Some("dnf"),
            Self::Zypper => Some("zypper"),
            _ => None,
        }
    }
}

/// A declared package set and whether it should be installed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRequest {
    pub packages: Vec<DesiredPackage>,
    pub present: bool,
    /// Upgrade already-installed, unversioned packages
    pub latest: bool,
}

impl PackageRequest {
    /// Parse raw `name` / `name<join>version` entries with the manager's separator
    pub fn parse<S: AsRef<str>>(raw: &[S], commands: &PackageCommands) -> Self {
        Self {
            packages: parse_packages(raw, commands.version_join.as_deref()),
            present: true,
            latest: false,
        }
    }

    pub fn present(mut self, present: bool) -> Self {
        self.present = present;
        self
    }

    pub fn latest(mut self, latest: bool) -> Self {
        self.latest = latest;
        self
    }
}

/// Compute the commands that bring `snapshot` to `request`
///
/// The snapshot is updated with the predicted result of the emitted install
/// or uninstall command, so reconciling the same request again yields no
/// install or uninstall command.
pub fn ensure_packages(
    request: &PackageRequest,
    snapshot: &mut PackageSnapshot,
    commands: &PackageCommands,
    resolver: &dyn PackageResolver,
) -> Outcome {
    let join = commands.version_join.as_deref();
    let mut outcome = Outcome::new();
    let mut diff: Vec<(&DesiredPackage, Vec<MatchedPackage>)> = Vec::new();
    let mut upgrades: Vec<&DesiredPackage> = Vec::new();

    for package in &request.packages {
        let mode = if request.present {
            MatchMode::All
        } else {
            MatchMode::Any
        };
        let found = matches(package, snapshot, resolver, mode);

        match (request.present, found.satisfied) {
            (true, false) | (false, true) => diff.push((package, found.matched)),
            (true, true) => {
                if !package.is_versioned() {
                    upgrades.push(package);
                }
                if !request.latest {
                    outcome.observe(Observation::PackageInstalled {
                        package: package.token(join),
                        versions: snapshot.versions(&package.name),
                    });
                }
            }
            (false, false) => outcome.observe(Observation::PackageNotInstalled {
                package: package.token(join),
            }),
        }
    }

    if !diff.is_empty() {
        let prefix = if request.present {
            &commands.install
        } else {
            &commands.uninstall
        };
        let tokens = diff.iter().map(|(p, _)| p.token(join));
        let command = format!("{} {}", prefix, shell::join(tokens));
        log::debug!("package command: {command}");
        outcome.push_command(command);

        for (_, matched) in &diff {
            for identity in matched {
                if request.present {
                    record_installed(snapshot, identity);
                } else {
                    snapshot.remove(&identity.name);
                }
            }
        }
    }

    if request.latest
        && let Some(upgrade) = &commands.upgrade
        && !upgrades.is_empty()
    {
        let names = upgrades.iter().map(|p| p.name.as_str());
        outcome.push_command(format!("{} {}", upgrade, shell::join(names)));
    }

    outcome
}

fn record_installed(snapshot: &mut PackageSnapshot, identity: &MatchedPackage) {
    if identity.versions.is_empty() {
        if !snapshot.contains(&identity.name) {
            snapshot.record_installed(&identity.name, None);
        }
        return;
    }
    for version in &identity.versions {
        snapshot.record_installed(&identity.name, Some(version));
    }
}
