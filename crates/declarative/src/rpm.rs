//! RPM file installation
//!
//! Installs or removes a package supplied as an `.rpm` file path or URL
//! rather than by name.

use crate::context::{FileOperations, HostFacts};
use crate::error::Result;
use crate::snapshot::PackageSnapshot;
use crate::types::{Observation, Outcome};
use url::Url;

/// A package file to ensure on the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpmRequest {
    /// Local path on the host or a URL to download
    pub source: String,
    pub present: bool,
    /// Package manager used for removal (e.g. "yum", "dnf")
    pub manager_command: String,
}

/// Whether `source` is a URL rather than a path
pub fn is_url(source: &str) -> bool {
    Url::parse(source).is_ok_and(|url| !url.scheme().is_empty())
}

/// Compute the commands that ensure an RPM file is (not) installed
///
/// `temp_path` is where a URL source is downloaded to. Whether the file's
/// package is installed is read from `snapshot`, which is updated with the
/// emitted install or removal.
pub fn ensure_rpm(
    request: &RpmRequest,
    temp_path: &str,
    snapshot: &mut PackageSnapshot,
    facts: &dyn HostFacts,
    files: &dyn FileOperations,
) -> Result<Outcome> {
    let mut outcome = Outcome::new();
    let mut source = request.source.as_str();

    if is_url(source) {
        outcome.merge(files.download(source, temp_path)?);
        source = temp_path;
    }

    let info = facts.rpm_package(source)?;
    let exists = info
        .as_ref()
        .is_some_and(|info| snapshot.has(&info.name, Some(&info.version)));

    match (request.present, exists, info) {
        (true, false, Some(info)) => {
            outcome.push_command(format!("rpm -i {source}"));
            snapshot.record_installed(&info.name, Some(&info.version));
        }
        // Metadata is unavailable when the file was only downloaded this run,
        // so the installed check has to happen on the host
        (true, false, None) => {
            outcome.push_command(format!(
                "rpm -q `rpm -qp {source}` 2> /dev/null || rpm -i {source}"
            ));
        }
        (false, true, Some(info)) => {
            outcome.push_command(format!(
                "{} remove -y {}",
                request.manager_command, info.name
            ));
            snapshot.remove(&info.name);
        }
        _ => outcome.observe(Observation::RpmState {
            source: request.source.clone(),
            installed: request.present,
        }),
    }

    Ok(outcome)
}
