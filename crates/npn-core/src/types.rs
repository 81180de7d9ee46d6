//! Shared newtypes for the acquisition engine.

use serde::{Deserialize, Serialize};

/// A package name.
///
/// Registry names are lowercase by publication rule; git-sourced names follow
/// the last segment of the repository path. The name is stored as given.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PackageName(String);

impl PackageName {
    /// Create a new package name.
    pub fn new(name: &str) -> Self {
        Self(name.to_string())
    }

    /// Return the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PackageName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for PackageName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl AsRef<std::path::Path> for PackageName {
    fn as_ref(&self) -> &std::path::Path {
        std::path::Path::new(&self.0)
    }
}

impl From<&str> for PackageName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for PackageName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl PartialEq<str> for PackageName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for PackageName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// The relational prefix of a version constraint (`^1.2.3`, `~0.4.0`, ...).
///
/// Nothing consumes the prefix for range matching; it is split off so the
/// bare version can serve as a git ref or a registry version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintPrefix {
    /// `^` - compatible within the same major version.
    Caret,
    /// `~` - compatible within the same minor version.
    Tilde,
    /// `=` - exactly this version.
    Exact,
    /// `>` - any later version.
    Greater,
    /// No prefix.
    None,
}

/// Split a raw version constraint into its relational prefix and bare version.
///
/// ```
/// use npn_core::types::{ConstraintPrefix, split_constraint};
///
/// assert_eq!(split_constraint("^1.2.3"), (ConstraintPrefix::Caret, "1.2.3"));
/// assert_eq!(split_constraint("0.0.1"), (ConstraintPrefix::None, "0.0.1"));
/// ```
pub fn split_constraint(raw: &str) -> (ConstraintPrefix, &str) {
    match raw.as_bytes().first() {
        Some(b'^') => (ConstraintPrefix::Caret, &raw[1..]),
        Some(b'~') => (ConstraintPrefix::Tilde, &raw[1..]),
        Some(b'=') => (ConstraintPrefix::Exact, &raw[1..]),
        Some(b'>') => (ConstraintPrefix::Greater, &raw[1..]),
        _ => (ConstraintPrefix::None, raw),
    }
}
