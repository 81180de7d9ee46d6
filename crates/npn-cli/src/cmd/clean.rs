//! Clean command (reserved)

use npn_core::InstallError;

/// Reserved surface; fails loudly rather than silently doing nothing.
///
/// # Errors
///
/// Always [`InstallError::Unimplemented`].
pub fn run() -> Result<(), InstallError> {
    Err(InstallError::Unimplemented("clean"))
}
