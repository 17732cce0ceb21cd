//! Package repository definition files (`/etc/yum.repos.d/*.repo`)

use crate::context::{FileOperations, HostFacts};
use crate::error::{Error, Result};
use crate::types::{Observation, Outcome};
use serde::{Deserialize, Serialize};
use url::Url;

/// Default directory for yum/dnf repository files
pub const DEFAULT_REPO_DIRECTORY: &str = "/etc/yum.repos.d";

/// A repository file to ensure on the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoSpec {
    /// Repository name, or a URL of a ready-made `.repo` file
    pub identifier: String,
    #[serde(default)]
    pub baseurl: Option<String>,
    #[serde(default = "default_true")]
    pub present: bool,
    /// Human-readable name; defaults to the repository name
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_true")]
    pub gpgcheck: bool,
    #[serde(default)]
    pub gpgkey: Option<String>,
    #[serde(default = "default_directory")]
    pub directory: String,
    #[serde(default)]
    pub repo_type: Option<String>,
}

fn default_true() -> bool {
    true
}

fn default_directory() -> String {
    DEFAULT_REPO_DIRECTORY.to_string()
}

impl RepoSpec {
    /// A present, enabled, gpg-checked repository
    pub fn new(identifier: &str) -> Self {
        Self {
            identifier: identifier.to_string(),
            baseurl: None,
            present: true,
            description: None,
            enabled: true,
            gpgcheck: true,
            gpgkey: None,
            directory: default_directory(),
            repo_type: None,
        }
    }

    pub fn baseurl(mut self, baseurl: &str) -> Self {
        self.baseurl = Some(baseurl.to_string());
        self
    }

    pub fn present(mut self, present: bool) -> Self {
        self.present = present;
        self
    }
}

/// Where a repository file lives and where its contents come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoTarget {
    pub name: String,
    /// Set when the identifier was a URL to download
    pub url: Option<String>,
    pub path: String,
}

/// Resolve the repository name and file path for an identifier
///
/// A URL names the repository after the raw last segment of its path, so
/// the name matches the file the server hands out. Identifiers such as
/// `epel:8` that parse without a `//` authority are plain names.
pub fn repo_target(identifier: &str, directory: &str) -> Result<RepoTarget> {
    let is_url = Url::parse(identifier).is_ok_and(|url| !url.cannot_be_a_base());

    let (name, url) = if is_url {
        let segment = last_path_segment(identifier);
        let name = segment.strip_suffix(".repo").unwrap_or(segment);
        if name.is_empty() {
            return Err(Error::InvalidRepository {
                identifier: identifier.to_string(),
                message: "URL does not end in a file name".to_string(),
            });
        }
        (name.to_string(), Some(identifier.to_string()))
    } else {
        (identifier.to_string(), None)
    };

    let path = format!("{}/{}.repo", directory.trim_end_matches('/'), name);
    Ok(RepoTarget { name, url, path })
}

/// Last `/`-separated segment of a URL's path, as written
fn last_path_segment(url: &str) -> &str {
    let without_query = url.split(['?', '#']).next().unwrap_or_default();
    let path = without_query
        .split_once("://")
        .and_then(|(_, rest)| rest.split_once('/'))
        .map(|(_, path)| path)
        .unwrap_or_default();
    path.rsplit('/').next().unwrap_or_default()
}

/// Render the INI body of a repository file
pub fn render_repo_file(name: &str, spec: &RepoSpec, baseurl: &str) -> String {
    let description = spec.description.as_deref().unwrap_or(name);
    let mut lines = vec![
        format!("[{name}]"),
        format!("name={description}"),
        format!("baseurl={baseurl}"),
        format!("enabled={}", u8::from(spec.enabled)),
        format!("gpgcheck={}", u8::from(spec.gpgcheck)),
    ];

    if let Some(repo_type) = &spec.repo_type {
        lines.push(format!("type={repo_type}"));
    }
    if let Some(gpgkey) = &spec.gpgkey {
        lines.push(format!("gpgkey={gpgkey}"));
    }

    lines.push(String::new());
    lines.join("\n")
}

/// Compute the file work that ensures a repository definition
///
/// Content diffing is left to [`FileOperations::put`]; a downloaded repo
/// file is never re-validated once it exists.
pub fn ensure_repo(
    spec: &RepoSpec,
    facts: &dyn HostFacts,
    files: &dyn FileOperations,
) -> Result<Outcome> {
    let target = repo_target(&spec.identifier, &spec.directory)?;

    if !spec.present {
        return files.ensure_absent(&target.path);
    }

    if let Some(url) = &target.url {
        if facts.file_exists(&target.path)? {
            return Ok(Outcome::observation(Observation::FileExists {
                path: target.path,
            }));
        }
        return files.download(url, &target.path);
    }

    let baseurl = spec
        .baseurl
        .as_deref()
        .ok_or_else(|| Error::InvalidRepository {
            identifier: spec.identifier.clone(),
            message: "baseurl is required unless the repository is a URL".to_string(),
        })?;

    let contents = render_repo_file(&target.name, spec, baseurl);
    files.put(&contents, &target.path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::RpmInfo;
    use std::sync::Mutex;

    struct MockFacts {
        existing: Vec<String>,
    }

    impl HostFacts for MockFacts {
        fn file_exists(&self, path: &str) -> Result<bool> {
            Ok(self.existing.iter().any(|p| p == path))
        }

        fn rpm_package(&self, _path: &str) -> Result<Option<RpmInfo>> {
            Ok(None)
        }
    }

    #[derive(Default)]
    struct RecordingFiles {
        puts: Mutex<Vec<(String, String)>>,
    }

    impl FileOperations for RecordingFiles {
        fn download(&self, src: &str, dest: &str) -> Result<Outcome> {
            Ok(Outcome::command(format!("download {src} {dest}")))
        }

        fn put(&self, contents: &str, dest: &str) -> Result<Outcome> {
            self.puts
                .lock()
                .unwrap()
                .push((contents.to_string(), dest.to_string()));
            Ok(Outcome::command(format!("put {dest}")))
        }

        fn ensure_absent(&self, path: &str) -> Result<Outcome> {
            Ok(Outcome::command(format!("rm -f {path}")))
        }
    }

    fn no_files() -> MockFacts {
        MockFacts { existing: vec![] }
    }

    #[test]
    fn test_repo_target_from_name() {
        let target = repo_target("epel", "/etc/yum.repos.d/").unwrap();
        assert_eq!(target.name, "epel");
        assert_eq!(target.path, "/etc/yum.repos.d/epel.repo");
        assert!(target.url.is_none());
    }

    #[test]
    fn test_repo_target_from_url() {
        let target = repo_target(
            "https://download.docker.com/linux/centos/docker-ce.repo",
            DEFAULT_REPO_DIRECTORY,
        )
        .unwrap();
        assert_eq!(target.name, "docker-ce");
        assert_eq!(target.path, "/etc/yum.repos.d/docker-ce.repo");
        assert!(target.url.is_some());

        assert!(repo_target("https://example.com/", DEFAULT_REPO_DIRECTORY).is_err());
        assert!(repo_target("https://example.com", DEFAULT_REPO_DIRECTORY).is_err());
    }

    #[test]
    fn test_repo_target_keeps_raw_url_segment() {
        let target = repo_target(
            "https://example.com/repos/my repo.repo?arch=x86_64",
            DEFAULT_REPO_DIRECTORY,
        )
        .unwrap();
        assert_eq!(target.name, "my repo");
        assert_eq!(target.path, "/etc/yum.repos.d/my repo.repo");

        let encoded =
            repo_target("https://example.com/my%20repo.repo", DEFAULT_REPO_DIRECTORY).unwrap();
        assert_eq!(encoded.name, "my%20repo");
    }

    #[test]
    fn test_repo_target_colon_name_is_not_url() {
        let target = repo_target("epel:8", DEFAULT_REPO_DIRECTORY).unwrap();
        assert_eq!(target.name, "epel:8");
        assert!(target.url.is_none());
    }

    #[test]
    fn test_render_repo_file() {
        let mut spec = RepoSpec::new("epel").baseurl("https://mirror/epel");
        spec.gpgcheck = false;
        spec.repo_type = Some("rpm-md".to_string());
        spec.gpgkey = Some("https://mirror/key".to_string());

        assert_eq!(
            render_repo_file("epel", &spec, "https://mirror/epel"),
            "[epel]\nname=epel\nbaseurl=https://mirror/epel\nenabled=1\ngpgcheck=0\n\
             type=rpm-md\ngpgkey=https://mirror/key\n"
        );
    }

    #[test]
    fn test_ensure_named_repo_puts_contents() {
        let files = RecordingFiles::default();
        let mut spec = RepoSpec::new("internal").baseurl("http://repo/internal");
        spec.description = Some("Internal packages".to_string());
        spec.enabled = false;

        let outcome = ensure_repo(&spec, &no_files(), &files).unwrap();

        assert_eq!(outcome.commands, vec!["put /etc/yum.repos.d/internal.repo"]);
        let puts = files.puts.lock().unwrap();
        assert_eq!(
            puts[0].0,
            "[internal]\nname=Internal packages\nbaseurl=http://repo/internal\n\
             enabled=0\ngpgcheck=1\n"
        );
    }

    #[test]
    fn test_ensure_url_repo_downloads_once() {
        let files = RecordingFiles::default();
        let spec = RepoSpec::new("https://example.com/repos/tools.repo");

        let outcome = ensure_repo(&spec, &no_files(), &files).unwrap();
        assert_eq!(
            outcome.commands,
            vec!["download https://example.com/repos/tools.repo /etc/yum.repos.d/tools.repo"]
        );

        let existing = MockFacts {
            existing: vec!["/etc/yum.repos.d/tools.repo".to_string()],
        };
        let outcome = ensure_repo(&spec, &existing, &files).unwrap();
        assert!(outcome.is_noop());
    }

    #[test]
    fn test_ensure_absent_repo() {
        let files = RecordingFiles::default();
        let spec = RepoSpec::new("epel").present(false);

        let outcome = ensure_repo(&spec, &no_files(), &files).unwrap();
        assert_eq!(outcome.commands, vec!["rm -f /etc/yum.repos.d/epel.repo"]);
    }

    #[test]
    fn test_named_repo_requires_baseurl() {
        let files = RecordingFiles::default();
        let err = ensure_repo(&RepoSpec::new("epel"), &no_files(), &files).unwrap_err();
        assert!(matches!(err, Error::InvalidRepository { .. }));
    }
}
