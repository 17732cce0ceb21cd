//! Per-host reconciliation session
//!
//! A session owns everything reconciliation mutates for one host during one
//! run: the package snapshot and the service statuses. Package and RPM
//! reconcilers share the snapshot. Reconcile calls take `&mut self`, so calls for one host
//! are serialized and each sees the state the previous one left behind.

use crate::context::{FileOperations, HostFacts};
use crate::error::Result;
use crate::matcher::PackageResolver;
use crate::packages::{PackageCommands, PackageRequest, ensure_packages};
use crate::repo::{RepoSpec, ensure_repo};
use crate::rpm::{RpmRequest, ensure_rpm};
use crate::service::{CommandTemplate, ServiceIntent, control_service};
use crate::snapshot::{PackageSnapshot, ServiceStatuses};
use crate::types::Outcome;

/// Default directory for downloaded temporary files
pub const DEFAULT_TEMP_DIR: &str = "/tmp";

/// Reconciliation state for one host for one run
#[derive(Debug, Clone)]
pub struct HostSession {
    host: String,
    packages: PackageSnapshot,
    services: ServiceStatuses,
    temp_dir: String,
}

impl HostSession {
    /// Start a session from the host's gathered facts
    pub fn new(host: &str, packages: PackageSnapshot, services: ServiceStatuses) -> Self {
        Self {
            host: host.to_string(),
            packages,
            services,
            temp_dir: DEFAULT_TEMP_DIR.to_string(),
        }
    }

    /// Use a different directory for temporary downloads
    pub fn with_temp_dir(mut self, temp_dir: &str) -> Self {
        self.temp_dir = temp_dir.trim_end_matches('/').to_string();
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn packages(&self) -> &PackageSnapshot {
        &self.packages
    }

    pub fn services(&self) -> &ServiceStatuses {
        &self.services
    }

    /// Stable temporary path on the host for `key` (e.g. a download URL)
    pub fn temp_filename(&self, key: &str) -> String {
        let hash = blake3::hash(key.as_bytes());
        format!("{}/converge-{}", self.temp_dir, hash.to_hex())
    }

    /// Reconcile a package set
    pub fn ensure_packages(
        &mut self,
        request: &PackageRequest,
        commands: &PackageCommands,
        resolver: &dyn PackageResolver,
    ) -> Outcome {
        log::debug!(
            "{}: ensure {} package(s) present={}",
            self.host,
            request.packages.len(),
            request.present
        );
        ensure_packages(request, &mut self.packages, commands, resolver)
    }

    /// Reconcile one service
    pub fn control_service(
        &mut self,
        name: &str,
        template: &CommandTemplate,
        intent: &ServiceIntent,
    ) -> Outcome {
        log::debug!("{}: control service {name}", self.host);
        control_service(name, &mut self.services, template, intent)
    }

    /// Reconcile an RPM file
    pub fn ensure_rpm(
        &mut self,
        request: &RpmRequest,
        facts: &dyn HostFacts,
        files: &dyn FileOperations,
    ) -> Result<Outcome> {
        log::debug!("{}: ensure rpm {}", self.host, request.source);
        let temp_path = format!("{}.rpm", self.temp_filename(&request.source));
        ensure_rpm(request, &temp_path, &mut self.packages, facts, files)
    }

    /// Reconcile a repository file
    pub fn ensure_repo(
        &self,
        spec: &RepoSpec,
        facts: &dyn HostFacts,
        files: &dyn FileOperations,
    ) -> Result<Outcome> {
        log::debug!("{}: ensure repo {}", self.host, spec.identifier);
        ensure_repo(spec, facts, files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::NoFacts;
    use crate::error::Error;
    use crate::matcher::NoExpansion;
    use crate::service::ServiceManager;
    use crate::snapshot::ServiceStatus;

    struct DownloadOnly;

    impl FileOperations for DownloadOnly {
        fn download(&self, src: &str, dest: &str) -> Result<Outcome> {
            Ok(Outcome::command(format!("curl -sSLf {src} -o {dest}")))
        }

        fn put(&self, _contents: &str, dest: &str) -> Result<Outcome> {
            Err(Error::File {
                path: dest.to_string(),
                message: "read-only".into(),
            })
        }

        fn ensure_absent(&self, path: &str) -> Result<Outcome> {
            Ok(Outcome::command(format!("rm -f {path}")))
        }
    }

    #[test]
    fn test_temp_filename_is_stable() {
        let session = HostSession::new("web1", PackageSnapshot::new(), ServiceStatuses::new())
            .with_temp_dir("/var/tmp/");
        let a = session.temp_filename("https://example.com/a.rpm");
        assert_eq!(a, session.temp_filename("https://example.com/a.rpm"));
        assert_ne!(a, session.temp_filename("https://example.com/b.rpm"));
        assert!(a.starts_with("/var/tmp/converge-"));
    }

    #[test]
    fn test_session_carries_state_between_calls() {
        let mut session =
            HostSession::new("web1", PackageSnapshot::new(), ServiceStatuses::new());
        let commands = PackageCommands::new("dnf install -y", "dnf remove -y");
        let request = PackageRequest::parse(&["nginx"], &commands);

        let first = session.ensure_packages(&request, &commands, &NoExpansion);
        assert_eq!(first.commands, vec!["dnf install -y nginx"]);
        let second = session.ensure_packages(&request, &commands, &NoExpansion);
        assert!(second.is_noop());

        let template = ServiceManager::Systemd.template();
        let intent = ServiceIntent::default()
            .running(true)
            .status_argument(ServiceManager::Systemd.status_argument());
        session.control_service("nginx", &template, &intent);
        assert_eq!(session.services().get("nginx"), ServiceStatus::Running);
    }

    #[test]
    fn test_session_downloads_rpm_to_temp_path() {
        let mut session =
            HostSession::new("web1", PackageSnapshot::new(), ServiceStatuses::new());
        let request = RpmRequest {
            source: "https://example.com/foo.rpm".to_string(),
            present: true,
            manager_command: "dnf".to_string(),
        };
        let expected = format!("{}.rpm", session.temp_filename(&request.source));

        let outcome = session.ensure_rpm(&request, &NoFacts, &DownloadOnly).unwrap();

        assert_eq!(outcome.commands.len(), 2);
        assert!(outcome.commands[0].ends_with(&expected));
        assert!(outcome.commands[1].starts_with("rpm -q `rpm -qp "));
    }

    #[test]
    fn test_rpm_sees_package_removed_earlier_in_run() {
        struct FooFile;

        impl HostFacts for FooFile {
            fn file_exists(&self, _path: &str) -> Result<bool> {
                Ok(false)
            }

            fn rpm_package(&self, path: &str) -> Result<Option<crate::RpmInfo>> {
                Ok((path == "/tmp/foo.rpm").then(|| crate::RpmInfo {
                    name: "foo".to_string(),
                    version: "1.0".to_string(),
                }))
            }
        }

        let installed: PackageSnapshot = [("foo", vec!["1.0"])].into_iter().collect();
        let mut session = HostSession::new("db1", installed, ServiceStatuses::new());
        let commands = PackageCommands::new("dnf install -y", "dnf remove -y");
        let remove = PackageRequest::parse(&["foo"], &commands).present(false);

        let removed = session.ensure_packages(&remove, &commands, &NoExpansion);
        assert_eq!(removed.commands, vec!["dnf remove -y foo"]);

        let rpm = RpmRequest {
            source: "/tmp/foo.rpm".to_string(),
            present: true,
            manager_command: "dnf".to_string(),
        };
        let installed = session.ensure_rpm(&rpm, &FooFile, &DownloadOnly).unwrap();
        assert_eq!(installed.commands, vec!["rpm -i /tmp/foo.rpm"]);
        assert!(session.packages().has("foo", Some("1.0")));

        let reinstall = session.ensure_packages(
            &PackageRequest::parse(&["foo"], &commands),
            &commands,
            &NoExpansion,
        );
        assert!(reinstall.is_noop());
    }
}
