//! Error types for reconciliation.
//!
//! Package and service reconciliation are total functions and never fail.
//! Errors only come from the collaborators the RPM and repository
//! reconcilers call out to (facts, downloads, file writes) and from
//! caller-supplied templates or repository definitions that cannot be used.

use thiserror::Error;

/// Errors that can occur while reconciling a host.
#[derive(Debug, Error)]
pub enum Error {
    /// A fact could not be gathered from the host
    #[error("failed to gather fact {fact}: {message}")]
    Fact {
        /// Name of the fact that failed (e.g. "rpm_package")
        fact: String,
        /// Details from the fact provider
        message: String,
    },

    /// A download could not be planned
    #[error("failed to download {src} to {dest}: {message}")]
    Download {
        /// Source URL
        src: String,
        /// Destination path on the host
        dest: String,
        /// Details from the file collaborator
        message: String,
    },

    /// A file could not be written or removed
    #[error("file operation on {path} failed: {message}")]
    File {
        /// Target path on the host
        path: String,
        /// Details from the file collaborator
        message: String,
    },

    /// A service command template is missing a placeholder
    #[error("invalid command template {template:?}: {message}")]
    InvalidTemplate {
        /// The template as given
        template: String,
        /// What is wrong with it
        message: String,
    },

    /// A repository definition cannot be turned into a repo file
    #[error("invalid repository {identifier}: {message}")]
    InvalidRepository {
        /// Name or URL of the repository
        identifier: String,
        /// What is wrong with it
        message: String,
    },

    /// The worker pool for planning hosts could not be built
    #[error("failed to create thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl Error {
    /// Build a fact error from any displayable cause.
    pub fn fact(fact: &str, cause: impl std::fmt::Display) -> Self {
        Self::Fact {
            fact: fact.to_string(),
            message: cause.to_string(),
        }
    }
}

/// Result type for reconciliation operations.
pub type Result<T> = std::result::Result<T, Error>;
