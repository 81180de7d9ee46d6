//! Update command
//!
//! Policy: `update <name>` re-runs acquisition with no pinned constraint.
//! For a repository already checked out under `node_modules/<name>` this is
//! the pull path with an empty ref, i.e. `git pull origin` of whatever
//! branch the checkout is on. It does not re-resolve a newer published ref.

use std::path::Path;

use npn_core::{Engine, InstallError, Session};

/// Re-acquire `name` against the existing target.
///
/// # Errors
///
/// [`InstallError::Unimplemented`] when no name is given; otherwise the
/// engine's failure, if any.
pub async fn run(engine: &Engine, name: Option<&str>) -> Result<(), InstallError> {
    let Some(name) = name else {
        return Err(InstallError::Unimplemented("update without a package name"));
    };

    let session = Session::new();
    engine
        .install(Some(name), Some(""), Path::new("."), &session)
        .await?;

    println!("Updated: {name}");
    Ok(())
}
