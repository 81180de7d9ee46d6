//! npn-core - acquisition engine for npn, the simple package manager for node
//!
//! # Overview
//!
//! Given a package identifier (a bare name plus a version constraint, or a
//! source-location string such as `gitlab:thann/pingg#v0.0.1`), the engine
//! resolves it to a concrete source - a git repository at a ref, or a
//! registry tarball - retrieves the package into
//! `<project>/node_modules/<name>`, and recursively installs the declared
//! dependencies from its `package.json`.
//!
//! # Architecture
//!
//! - **Ordered grammar matchers**: [`spec::PackageSpec::parse`] tries each
//!   identifier grammar in turn and yields the first match.
//! - **Capability injection**: git runs through the [`git::CommandRunner`]
//!   trait so tests can substitute fakes; lifecycle hooks go through
//!   [`hooks::Hooks`].
//! - **Streaming pipeline**: registry tarballs are gunzipped and unpacked
//!   while the response body streams; no temp file is written.
//!
//! Installs are strictly sequential and depth-first. A failure at any depth
//! aborts the whole invocation; there is no per-package isolation. The
//! target tree is not locked, so concurrent invocations against the same
//! project directory are undefined behavior.

pub mod archive;
pub mod error;
pub mod fetch;
pub mod git;
pub mod hooks;
pub mod install;
pub mod manifest;
pub mod registry;
pub mod spec;
pub mod types;

pub use error::InstallError;
pub use install::{Engine, Session};
pub use registry::Registry;
pub use spec::PackageSpec;
pub use types::PackageName;

/// User Agent string for network operations
pub const USER_AGENT: &str = concat!("npn/", env!("CARGO_PKG_VERSION"));
