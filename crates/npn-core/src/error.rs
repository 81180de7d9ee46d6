//! Domain-specific errors for the acquisition engine.
//!
//! Every error propagates: a failure at any recursion depth aborts the whole
//! invocation. An incomplete dependency tree is assumed unusable, so there is
//! no per-package isolation that would let sibling installs continue.

use thiserror::Error;

use crate::archive::DownloadError;
use crate::fetch::FetchError;
use crate::git::GitError;
use crate::hooks::HookError;
use crate::manifest::ManifestError;
use crate::spec::ParseError;
use crate::types::PackageName;

/// Umbrella error for a package installation.
#[derive(Error, Debug)]
pub enum InstallError {
    /// The identifier string matched no recognized grammar.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Network-level transport failure.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The registry answered an archive request with a non-200 status.
    #[error(transparent)]
    Download(#[from] DownloadError),

    /// A version-control command failed with no fallback left.
    #[error(transparent)]
    Git(#[from] GitError),

    /// The manifest is missing or malformed.
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// A lifecycle hook failed.
    #[error(transparent)]
    Hook(#[from] HookError),

    /// Filesystem-level failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Failure while installing a specific package; names the package and
    /// its constraint so the user sees what sank the run.
    #[error("failed to install {name}@{constraint}")]
    Package {
        /// The package whose installation failed.
        name: PackageName,
        /// The constraint it was requested at (may be empty).
        constraint: String,
        /// The underlying failure.
        #[source]
        source: Box<InstallError>,
    },

    /// A reserved surface was invoked; deliberate, reported, never a silent
    /// no-op.
    #[error("'{0}' is not implemented")]
    Unimplemented(&'static str),
}

impl InstallError {
    /// Wrap an error with the package it sank.
    pub fn for_package(name: PackageName, constraint: impl Into<String>, source: Self) -> Self {
        Self::Package {
            name,
            constraint: constraint.into(),
            source: Box::new(source),
        }
    }

    /// Whether the root cause is a non-200 archive response. The command
    /// surface maps this to its own exit code.
    pub fn is_download_failure(&self) -> bool {
        match self {
            Self::Download(_) => true,
            Self::Package { source, .. } => source.is_download_failure(),
            _ => false,
        }
    }
}
