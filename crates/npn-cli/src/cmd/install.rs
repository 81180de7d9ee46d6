//! Install command

use std::path::Path;

use npn_core::manifest::PACKAGES_DIR;
use npn_core::{Engine, InstallError, Session};

/// Install one package, or the whole project's dependencies when no
/// identifier is given (dev dependencies included at the top level only).
///
/// # Errors
///
/// Propagates the engine's first failure; nothing continues past it.
pub async fn run(engine: &Engine, identifier: Option<&str>) -> Result<(), InstallError> {
    let project = Path::new(".");

    // Make sure basic things exist before the engine starts.
    tokio::fs::create_dir_all(project.join(PACKAGES_DIR)).await?;

    let session = Session::new();
    engine
        .install(identifier, None, project, &session)
        .await?;

    println!("Installed: {} packages", session.installed());
    Ok(())
}
