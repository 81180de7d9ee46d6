//! Package identifier parsing.
//!
//! An identifier names a desired package and optionally its version or
//! source. Two source-location grammars are recognized, tried in order:
//!
//! 1. Full location: `<proto>://<domain>/<path>#<ref>` (`#<ref>` optional)
//! 2. Short location: `<alias>:<path>#<ref>`, where a dotless alias is a
//!    hosting shorthand (`gitlab` means `gitlab.com`)
//!
//! Each grammar is a matcher returning `Option<PackageSpec>`; the parser
//! yields the first match, or [`ParseError::InvalidIdentifier`] when none
//! applies. Plain version constraints (`^1.2.3`) are not identifiers and do
//! not match here; see [`crate::types::split_constraint`].

use thiserror::Error;

use crate::types::{PackageName, split_constraint};

/// Protocols accepted in a full source location.
const PROTOCOLS: [&str; 4] = ["http", "https", "ssh", "git"];

/// Errors from identifier parsing.
#[derive(Error, Debug)]
pub enum ParseError {
    /// The identifier matched none of the recognized grammars.
    #[error("invalid package identifier: {0:?}")]
    InvalidIdentifier(String),
}

/// A parsed package source: name, version constraint, and optional
/// repository URL.
///
/// When `repository` is present, the constraint (minus its relational
/// prefix) is a git ref name. When absent, the package must be installable
/// from the registry by name and version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSpec {
    /// Package name, derived from the last path segment for URL sources.
    pub name: PackageName,
    /// Raw version constraint; may carry a `^ ~ = >` prefix, or be a ref.
    pub constraint: String,
    /// Clone URL of the backing repository, without the `#<ref>` fragment.
    pub repository: Option<String>,
}

impl PackageSpec {
    /// Parse a source-location identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidIdentifier`] if no grammar matches.
    pub fn parse(identifier: &str) -> Result<Self, ParseError> {
        Self::try_parse(identifier)
            .ok_or_else(|| ParseError::InvalidIdentifier(identifier.to_string()))
    }

    /// Try each grammar in order, returning the first match.
    pub fn try_parse(identifier: &str) -> Option<Self> {
        const MATCHERS: [fn(&str) -> Option<PackageSpec>; 2] = [parse_full, parse_short];
        MATCHERS.iter().find_map(|matcher| matcher(identifier))
    }

    /// The constraint with its relational prefix stripped: a git ref name or
    /// a registry version.
    pub fn ref_name(&self) -> &str {
        split_constraint(&self.constraint).1
    }
}

/// Matcher for `<proto>://<domain>/<path>#<ref>`.
///
/// A `git+` scheme prefix (as npm manifests write for git dependencies) is
/// accepted and dropped.
fn parse_full(identifier: &str) -> Option<PackageSpec> {
    let identifier = identifier.strip_prefix("git+").unwrap_or(identifier);
    let (proto, rest) = identifier.split_once("://")?;
    if !PROTOCOLS.contains(&proto) {
        return None;
    }

    let (location, ref_name) = split_fragment(rest);
    let (domain, path) = location.split_once('/')?;
    if domain.is_empty() || path.is_empty() {
        return None;
    }

    Some(assemble(proto, domain, path, ref_name))
}

/// Matcher for `<alias>:<path>#<ref>`.
///
/// The alias is a domain, or a hosting shorthand when it contains no dot
/// (`gitlab` becomes `gitlab.com`). Protocol defaults to `https`.
fn parse_short(identifier: &str) -> Option<PackageSpec> {
    if identifier.contains("://") {
        return None;
    }
    let (alias, rest) = identifier.split_once(':')?;
    if alias.is_empty() || alias.contains('/') {
        return None;
    }

    let (path, ref_name) = split_fragment(rest);
    if path.is_empty() {
        return None;
    }

    let domain = if alias.contains('.') {
        alias.to_string()
    } else {
        format!("{alias}.com")
    };

    Some(assemble("https", &domain, path, ref_name))
}

/// Split an optional `#<ref>` fragment off a location string.
fn split_fragment(location: &str) -> (&str, &str) {
    match location.split_once('#') {
        Some((loc, ref_name)) => (loc, ref_name),
        None => (location, ""),
    }
}

fn assemble(proto: &str, domain: &str, path: &str, ref_name: &str) -> PackageSpec {
    let last_segment = path.rsplit('/').next().unwrap_or(path);
    let name = last_segment.strip_suffix(".git").unwrap_or(last_segment);

    PackageSpec {
        name: PackageName::new(name),
        constraint: ref_name.to_string(),
        repository: Some(format!("{proto}://{domain}/{path}")),
    }
}
