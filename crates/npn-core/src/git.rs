//! Version-control acquisition: clone and pull through an injected runner.
//!
//! The installer is a two-entry state machine keyed on whether the target
//! directory already exists:
//!
//! - existing target: `git pull` the ref from origin, retrying once with a
//!   `v`-prefixed ref, then [`GitError::Update`];
//! - absent target: `git clone` restricted to the ref's branch, retrying
//!   once with the `v`-prefixed ref, then falling back to the registry
//!   tarball.
//!
//! The `v` retry covers packages that tag releases as `v1.2.3` while the
//! constraint says `1.2.3`. It is a naming heuristic, not tag matching.
//!
//! Commands run through the [`CommandRunner`] capability so tests can
//! substitute fakes for the real `git` binary.

use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::archive;
use crate::error::InstallError;
use crate::registry::Registry;
use crate::types::PackageName;

/// Errors from version-control commands with no further fallback available.
#[derive(Error, Debug)]
pub enum GitError {
    /// `git pull` failed for both the ref and its `v`-prefixed form.
    #[error("git pull of {ref_name:?} failed in {}: {stderr}", .dir.display())]
    Update {
        /// The ref that was pulled.
        ref_name: String,
        /// The checkout the pull ran in.
        dir: PathBuf,
        /// Captured stderr of the first failed attempt.
        stderr: String,
    },

    /// The version-control binary could not be executed at all.
    #[error("failed to run git: {0}")]
    Spawn(#[from] io::Error),
}

/// Exit status and captured output of one external command.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Whether the command exited zero.
    pub success: bool,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
}

/// Capability to run an external command and capture its output.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `program` with `args`, optionally in `cwd`, and wait for exit.
    async fn run(
        &self,
        program: &str,
        args: &[&str],
        cwd: Option<&Path>,
    ) -> io::Result<CommandOutput>;
}

/// The production runner: spawns real processes via tokio.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(
        &self,
        program: &str,
        args: &[&str],
        cwd: Option<&Path>,
    ) -> io::Result<CommandOutput> {
        let mut command = tokio::process::Command::new(program);
        command.args(args).stdin(Stdio::null());
        if let Some(dir) = cwd {
            command.current_dir(dir);
        }

        let output = command.output().await?;
        Ok(CommandOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Installs a package from its version-control repository.
pub struct RepoInstaller<'a> {
    runner: &'a dyn CommandRunner,
    registry: &'a Registry,
}

impl std::fmt::Debug for RepoInstaller<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepoInstaller").finish_non_exhaustive()
    }
}

impl<'a> RepoInstaller<'a> {
    /// Create an installer over the given runner, falling back to `registry`
    /// tarballs when cloning fails.
    pub fn new(runner: &'a dyn CommandRunner, registry: &'a Registry) -> Self {
        Self { runner, registry }
    }

    /// Clone or update `repo_url` at `ref_name` into `target_dir`.
    ///
    /// # Errors
    ///
    /// [`GitError::Update`] when an existing checkout cannot be pulled;
    /// clone failures fall back to the registry tarball and surface that
    /// path's errors instead.
    pub async fn install(
        &self,
        name: &PackageName,
        repo_url: &str,
        ref_name: &str,
        target_dir: &Path,
    ) -> Result<(), InstallError> {
        if target_dir.exists() {
            self.update(ref_name, target_dir).await?;
        } else {
            self.clone_or_fall_back(name, repo_url, ref_name, target_dir)
                .await?;
        }

        self.verify_commit(target_dir);
        Ok(())
    }

    /// Update path: pull the ref from origin inside the existing checkout.
    async fn update(&self, ref_name: &str, target_dir: &Path) -> Result<(), InstallError> {
        let first = self.pull(ref_name, target_dir).await.map_err(GitError::from)?;
        if first.success {
            return Ok(());
        }
        debug!(ref_name, stderr = %first.stderr.trim(), "git pull failed");

        if !ref_name.is_empty() {
            let retry = self
                .pull(&format!("v{ref_name}"), target_dir)
                .await
                .map_err(GitError::from)?;
            if retry.success {
                return Ok(());
            }
            debug!(ref_name = %format!("v{ref_name}"), stderr = %retry.stderr.trim(), "git pull retry failed");
        }

        Err(GitError::Update {
            ref_name: ref_name.to_string(),
            dir: target_dir.to_path_buf(),
            stderr: first.stderr.trim().to_string(),
        }
        .into())
    }

    /// Clone path: try the ref, then its `v`-prefixed form, then the
    /// registry tarball.
    async fn clone_or_fall_back(
        &self,
        name: &PackageName,
        repo_url: &str,
        ref_name: &str,
        target_dir: &Path,
    ) -> Result<(), InstallError> {
        let branch = (!ref_name.is_empty()).then_some(ref_name);
        let attempt = self
            .clone_repo(repo_url, branch, target_dir)
            .await
            .map_err(GitError::from)?;
        if attempt.success {
            return Ok(());
        }
        debug!(repo_url, ref_name, stderr = %attempt.stderr.trim(), "git clone failed");

        if !ref_name.is_empty() {
            let retry = self
                .clone_repo(repo_url, Some(&format!("v{ref_name}")), target_dir)
                .await
                .map_err(GitError::from)?;
            if retry.success {
                return Ok(());
            }
            debug!(repo_url, stderr = %retry.stderr.trim(), "git clone retry failed");
        }

        debug!(%name, ref_name, "falling back to registry tarball");
        archive::install_tarball(self.registry, name, ref_name, target_dir).await
    }

    async fn pull(&self, ref_name: &str, target_dir: &Path) -> io::Result<CommandOutput> {
        let mut args = vec!["pull", "origin"];
        if !ref_name.is_empty() {
            args.push(ref_name);
        }
        self.runner.run("git", &args, Some(target_dir)).await
    }

    async fn clone_repo(
        &self,
        repo_url: &str,
        branch: Option<&str>,
        target_dir: &Path,
    ) -> io::Result<CommandOutput> {
        let dir = target_dir.to_string_lossy();
        let mut args = vec!["clone"];
        if let Some(branch) = branch {
            args.extend(["--branch", branch, "--single-branch"]);
        }
        args.extend(["--", repo_url, dir.as_ref()]);
        self.runner.run("git", &args, None).await
    }

    /// Commit signature verification extension point; intentionally a no-op.
    fn verify_commit(&self, target_dir: &Path) {
        debug!(dir = %target_dir.display(), "commit verification not implemented");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records every git invocation and answers from a scripted list of
    /// exit statuses.
    struct ScriptedGit {
        script: Mutex<Vec<bool>>,
        calls: Mutex<Vec<Vec<String>>>,
    }

    impl ScriptedGit {
        fn new(script: &[bool]) -> Self {
            Self {
                script: Mutex::new(script.to_vec()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<Vec<String>> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CommandRunner for ScriptedGit {
        async fn run(
            &self,
            _program: &str,
            args: &[&str],
            _cwd: Option<&Path>,
        ) -> io::Result<CommandOutput> {
            self.calls
                .lock()
                .unwrap()
                .push(args.iter().map(ToString::to_string).collect());
            let mut script = self.script.lock().unwrap();
            let success = if script.is_empty() {
                true
            } else {
                script.remove(0)
            };
            Ok(CommandOutput {
                success,
                stdout: String::new(),
                stderr: "scripted failure".to_string(),
            })
        }
    }

    fn registry() -> Registry {
        Registry::new("http://127.0.0.1:1")
    }

    #[tokio::test]
    async fn clone_with_ref_restricts_the_branch() {
        let git = ScriptedGit::new(&[true]);
        let registry = registry();
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("node_modules/pingg");

        RepoInstaller::new(&git, &registry)
            .install(
                &PackageName::new("pingg"),
                "https://gitlab.com/thann/pingg",
                "v0.0.1",
                &target,
            )
            .await
            .unwrap();

        let calls = git.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0][..4],
            ["clone", "--branch", "v0.0.1", "--single-branch"].map(String::from)
        );
    }

    #[tokio::test]
    async fn clone_without_ref_omits_branch_flags() {
        let git = ScriptedGit::new(&[true]);
        let registry = registry();
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("node_modules/pingg");

        RepoInstaller::new(&git, &registry)
            .install(
                &PackageName::new("pingg"),
                "https://gitlab.com/thann/pingg",
                "",
                &target,
            )
            .await
            .unwrap();

        let calls = git.calls();
        assert_eq!(calls.len(), 1);
        assert!(!calls[0].contains(&"--branch".to_string()));
        assert!(!calls[0].contains(&"--single-branch".to_string()));
    }

    #[tokio::test]
    async fn failed_clone_retries_with_v_prefix() {
        let git = ScriptedGit::new(&[false, true]);
        let registry = registry();
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("node_modules/pingg");

        RepoInstaller::new(&git, &registry)
            .install(
                &PackageName::new("pingg"),
                "https://gitlab.com/thann/pingg",
                "0.0.1",
                &target,
            )
            .await
            .unwrap();

        let calls = git.calls();
        assert_eq!(calls.len(), 2);
        assert!(calls[0].contains(&"0.0.1".to_string()));
        assert!(calls[1].contains(&"v0.0.1".to_string()));
    }

    #[tokio::test]
    async fn existing_target_takes_the_pull_path() {
        let git = ScriptedGit::new(&[true]);
        let registry = registry();
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("node_modules/pingg");
        std::fs::create_dir_all(&target).unwrap();

        RepoInstaller::new(&git, &registry)
            .install(
                &PackageName::new("pingg"),
                "https://gitlab.com/thann/pingg",
                "main",
                &target,
            )
            .await
            .unwrap();

        let calls = git.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0], ["pull", "origin", "main"].map(String::from));
    }

    #[tokio::test]
    async fn exhausted_pull_is_an_update_error() {
        let git = ScriptedGit::new(&[false, false]);
        let registry = registry();
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("node_modules/pingg");
        std::fs::create_dir_all(&target).unwrap();

        let err = RepoInstaller::new(&git, &registry)
            .install(
                &PackageName::new("pingg"),
                "https://gitlab.com/thann/pingg",
                "0.0.2",
                &target,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, InstallError::Git(GitError::Update { .. })));
        assert_eq!(git.calls().len(), 2);
    }

    #[tokio::test]
    async fn pull_with_empty_ref_does_not_retry() {
        let git = ScriptedGit::new(&[false]);
        let registry = registry();
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("node_modules/pingg");
        std::fs::create_dir_all(&target).unwrap();

        let err = RepoInstaller::new(&git, &registry)
            .install(
                &PackageName::new("pingg"),
                "https://gitlab.com/thann/pingg",
                "",
                &target,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, InstallError::Git(GitError::Update { .. })));
        assert_eq!(git.calls().len(), 1);
    }
}
