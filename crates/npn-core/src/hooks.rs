//! Lifecycle hook extension points.
//!
//! Reserved for future install scripts. The engine calls the hooks at the
//! documented points in the recursive install; the only shipped
//! implementation is the no-op. Injecting an implementation is how a test
//! suite asserts the call points fire.

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Failure raised by a lifecycle hook.
#[derive(Error, Debug)]
#[error("lifecycle hook failed: {0}")]
pub struct HookError(
    /// The hook's failure message.
    pub String,
);

/// Pre/post install lifecycle hooks for a package directory.
#[async_trait]
pub trait Hooks: Send + Sync {
    /// Runs after a directory's manifest is read, before its dependencies
    /// install.
    async fn pre_install(&self, dir: &Path) -> Result<(), HookError>;

    /// Runs after all of a directory's dependencies installed.
    async fn post_install(&self, dir: &Path) -> Result<(), HookError>;
}

/// The shipped hook implementation: lifecycle scripts are not implemented,
/// and each call point says so at debug level rather than silently skipping.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullHooks;

#[async_trait]
impl Hooks for NullHooks {
    async fn pre_install(&self, dir: &Path) -> Result<(), HookError> {
        debug!(dir = %dir.display(), "pre-install hook: lifecycle scripts not implemented");
        Ok(())
    }

    async fn post_install(&self, dir: &Path) -> Result<(), HookError> {
        debug!(dir = %dir.display(), "post-install hook: lifecycle scripts not implemented");
        Ok(())
    }
}
