//! Per-package acquisition and recursive dependency installation.
//!
//! [`Engine::install`] is the top-level state machine for one package:
//! resolve the identifier, pick the repository or tarball strategy, recurse
//! into the new target's manifest, and count the success in the
//! [`Session`]. [`Engine::install_dependencies`] walks a manifest's
//! declarations sequentially and depth-first, in declared order.
//!
//! There is no memoization and no cycle detection: a diamond dependency is
//! installed once per occurrence, and circular manifests recurse without
//! bound. Keeping the traversal this simple is deliberate; hardening it
//! would change observable behavior.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures::future::BoxFuture;
use tracing::{debug, info};

use crate::archive;
use crate::error::InstallError;
use crate::git::{CommandRunner, RepoInstaller, SystemRunner};
use crate::hooks::{Hooks, NullHooks};
use crate::manifest::{Manifest, PACKAGES_DIR};
use crate::registry::Registry;
use crate::spec::PackageSpec;
use crate::types::PackageName;

/// Counts successful installs across one engine invocation.
///
/// Replaces what would otherwise be hidden global state: the caller owns the
/// session, threads it through the engine, and reads the total once at the
/// end for its summary line.
#[derive(Debug, Default)]
pub struct Session {
    installed: AtomicUsize,
}

impl Session {
    /// Start a session with nothing installed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of packages installed so far.
    pub fn installed(&self) -> usize {
        self.installed.load(Ordering::Relaxed)
    }

    fn record(&self) {
        self.installed.fetch_add(1, Ordering::Relaxed);
    }
}

/// The per-package acquisition engine.
pub struct Engine {
    registry: Registry,
    runner: Arc<dyn CommandRunner>,
    hooks: Arc<dyn Hooks>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Create an engine over the given registry, with the system git runner
    /// and no-op lifecycle hooks.
    pub fn new(registry: Registry) -> Self {
        Self {
            registry,
            runner: Arc::new(SystemRunner),
            hooks: Arc::new(NullHooks),
        }
    }

    /// Substitute the command runner (tests inject fakes here).
    pub fn with_runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.runner = runner;
        self
    }

    /// Substitute the lifecycle hooks.
    pub fn with_hooks(mut self, hooks: Arc<dyn Hooks>) -> Self {
        self.hooks = hooks;
        self
    }

    /// The registry this engine installs from.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Install one package into `<base_dir>/node_modules/<name>`, then its
    /// dependency tree.
    ///
    /// With no `name`, installs `base_dir`'s own declared dependencies
    /// (including dev dependencies) instead; that umbrella call is not
    /// counted in the session.
    ///
    /// Boxed because the recursion goes through
    /// [`Engine::install_dependencies`] and back.
    ///
    /// # Errors
    ///
    /// Any failure aborts the invocation; per-package failures arrive
    /// wrapped in [`InstallError::Package`] naming the package and
    /// constraint.
    pub fn install<'a>(
        &'a self,
        name: Option<&'a str>,
        constraint: Option<&'a str>,
        base_dir: &'a Path,
        session: &'a Session,
    ) -> BoxFuture<'a, Result<(), InstallError>> {
        Box::pin(self.install_inner(name, constraint, base_dir, session))
    }

    async fn install_inner(
        &self,
        name: Option<&str>,
        constraint: Option<&str>,
        base_dir: &Path,
        session: &Session,
    ) -> Result<(), InstallError> {
        let Some(raw) = name else {
            return self.install_dependencies(base_dir, true, session).await;
        };

        debug!(identifier = raw, ?constraint, "installing");
        tokio::fs::create_dir_all(base_dir).await?;

        let spec = resolve_spec(raw, constraint)?;
        let target_dir = target_dir(base_dir, &spec.name);

        self.acquire(&spec, &target_dir, session)
            .await
            .map_err(|err| {
                InstallError::for_package(spec.name.clone(), spec.constraint.clone(), err)
            })?;

        session.record();
        info!(name = %spec.name, constraint = %spec.constraint, "installed");
        Ok(())
    }

    /// Steps 4-8 of the per-package flow: pick a strategy, materialize the
    /// target, recurse into its manifest.
    async fn acquire(
        &self,
        spec: &PackageSpec,
        target_dir: &Path,
        session: &Session,
    ) -> Result<(), InstallError> {
        let ref_name = spec.ref_name();

        let repository = match &spec.repository {
            Some(url) => Some(url.clone()),
            None => self.registry.repository_of(&spec.name).await?,
        };

        if let Some(url) = repository {
            RepoInstaller::new(self.runner.as_ref(), &self.registry)
                .install(&spec.name, &url, ref_name, target_dir)
                .await?;
        } else {
            archive::install_tarball(&self.registry, &spec.name, ref_name, target_dir).await?;
        }

        if Manifest::exists(target_dir) {
            self.install_dependencies(target_dir, false, session).await?;
        }

        Ok(())
    }

    /// Install every dependency a manifest declares, sequentially and in
    /// declared order; dev dependencies are included only when asked (the
    /// project root).
    ///
    /// # Errors
    ///
    /// [`crate::manifest::ManifestError`] when `dir` has no readable
    /// manifest; otherwise the first failing dependency's error.
    pub async fn install_dependencies(
        &self,
        dir: &Path,
        include_dev: bool,
        session: &Session,
    ) -> Result<(), InstallError> {
        let manifest = Manifest::load(dir).await?;

        self.hooks.pre_install(dir).await?;

        for (name, constraint) in declared(&manifest, include_dev) {
            self.install(Some(name), Some(constraint), dir, session)
                .await?;
        }

        self.hooks.post_install(dir).await?;
        Ok(())
    }
}

/// Dependency pairs to install, production first, dev appended on request.
fn declared(manifest: &Manifest, include_dev: bool) -> impl Iterator<Item = (&str, &str)> {
    let dev = include_dev
        .then_some(manifest.dev_dependencies.as_slice())
        .unwrap_or_default();
    manifest
        .dependencies
        .iter()
        .chain(dev)
        .map(|(n, c)| (n.as_str(), c.as_str()))
}

/// Resolve the (name, constraint) argument pair into a concrete source.
///
/// With an explicit constraint the name is authoritative; the constraint may
/// still be a source location (manifests write git dependencies as
/// `git+https://host/owner/name#ref`). With no constraint the identifier
/// itself must parse.
fn resolve_spec(raw: &str, constraint: Option<&str>) -> Result<PackageSpec, InstallError> {
    let spec = match constraint {
        Some(c) => match PackageSpec::try_parse(c) {
            Some(mut parsed) => {
                parsed.name = PackageName::new(raw);
                parsed
            }
            None => PackageSpec {
                name: PackageName::new(raw),
                constraint: c.to_string(),
                repository: None,
            },
        },
        None => PackageSpec::parse(raw)?,
    };
    Ok(spec)
}

/// Compute the target directory for a package under a base directory.
pub fn target_dir(base_dir: &Path, name: &PackageName) -> PathBuf {
    base_dir.join(PACKAGES_DIR).join(name.as_str())
}
