//! Registry tarball installer.
//!
//! Downloads a published archive for a resolved name and version and unpacks
//! it into the target directory via a streaming pipeline: the response body
//! feeds a gzip decoder feeding a tar reader, entry by entry, with no
//! intermediate file. Published tarballs wrap their content in a single
//! top-level folder (`package/`), so the first path component of every entry
//! is stripped.

use std::io;
use std::path::{Component, Path, PathBuf};

use async_compression::tokio::bufread::GzipDecoder;
use futures::{StreamExt, TryStreamExt};
use thiserror::Error;
use tokio::io::AsyncRead;
use tokio_tar::Archive;
use tokio_util::io::StreamReader;
use tracing::debug;

use crate::error::InstallError;
use crate::fetch;
use crate::registry::Registry;
use crate::types::PackageName;

/// A non-200 answer to an archive request.
#[derive(Error, Debug)]
#[error("download failed: HTTP {status} for {url}")]
pub struct DownloadError {
    /// The HTTP status the registry answered with.
    pub status: u16,
    /// The archive URL that was requested.
    pub url: String,
}

/// Download the registry tarball for `name` at `version` and unpack it into
/// `target_dir`, wrapper folder stripped.
///
/// # Errors
///
/// [`DownloadError`] on a non-200 response; transfer and filesystem failures
/// propagate as their own variants.
pub async fn install_tarball(
    registry: &Registry,
    name: &PackageName,
    version: &str,
    target_dir: &Path,
) -> Result<(), InstallError> {
    tokio::fs::create_dir_all(target_dir).await?;

    let url = registry.tarball_url(name, version);
    debug!(%name, version, %url, "fetching tarball");

    let response = fetch::fetch_stream(registry.client(), &url).await?;
    let status = response.status();
    if status != reqwest::StatusCode::OK {
        return Err(DownloadError {
            status: status.as_u16(),
            url,
        }
        .into());
    }

    let stream = response.bytes_stream().map_err(io::Error::other);
    let decoder = GzipDecoder::new(StreamReader::new(stream));
    let mut archive = Archive::new(decoder);
    unpack_flattened(&mut archive, target_dir).await?;

    debug!(%name, version, dir = %target_dir.display(), "tarball unpacked");
    Ok(())
}

/// Unpack a tar stream into `dest`, stripping the first path component of
/// every entry.
async fn unpack_flattened<R: AsyncRead + Unpin>(
    archive: &mut Archive<R>,
    dest: &Path,
) -> Result<(), InstallError> {
    let mut entries = archive.entries()?;

    while let Some(entry) = entries.next().await {
        let mut entry = entry?;

        if entry.header().entry_type().is_dir() {
            continue;
        }

        let raw = entry.path()?.into_owned();
        let Some(relative) = flattened_path(&raw)? else {
            // The wrapper folder itself, or metadata with no remaining path.
            continue;
        };

        let absolute = dest.join(&relative);
        if let Some(parent) = absolute.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        entry.unpack(&absolute).await?;
    }

    Ok(())
}

/// Strip the wrapper component from an entry path.
///
/// Returns `None` for paths that vanish entirely once stripped. Entries that
/// would escape the extraction root are rejected.
fn flattened_path(raw: &Path) -> io::Result<Option<PathBuf>> {
    let stripped: PathBuf = raw
        .components()
        .filter(|c| *c != Component::CurDir)
        .skip(1)
        .collect();
    if stripped.as_os_str().is_empty() {
        return Ok(None);
    }

    let escapes = stripped
        .components()
        .any(|c| !matches!(c, Component::Normal(_)));
    if escapes {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("invalid path in archive: {}", raw.display()),
        ));
    }

    Ok(Some(stripped))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    /// Build a gzipped tarball from (path, contents) pairs.
    fn tarball(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut builder = tar::Builder::new(Vec::new());
        for (path, contents) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_size(contents.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder
                .append_data(&mut header, path, contents.as_bytes())
                .unwrap();
        }
        let tar = builder.into_inner().unwrap();

        let mut encoder =
            flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(&tar).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn wrapper_component_is_stripped() {
        let flattened = flattened_path(Path::new("package/lib/index.js"))
            .unwrap()
            .unwrap();
        assert_eq!(flattened, Path::new("lib/index.js"));

        // Some producers emit ./-prefixed entry names.
        let dotted = flattened_path(Path::new("./package/lib/index.js"))
            .unwrap()
            .unwrap();
        assert_eq!(dotted, Path::new("lib/index.js"));
    }

    #[test]
    fn wrapper_folder_itself_vanishes() {
        assert!(flattened_path(Path::new("package")).unwrap().is_none());
    }

    #[test]
    fn escaping_entries_are_rejected() {
        assert!(flattened_path(Path::new("package/../escape.js")).is_err());
    }

    #[tokio::test]
    async fn tarball_unpacks_without_wrapper_folder() {
        let mut server = mockito::Server::new_async().await;
        let body = tarball(&[
            ("package/package.json", r#"{"name":"pingg"}"#),
            ("package/lib/main.js", "module.exports = 1;\n"),
        ]);
        let _m = server
            .mock("GET", "/pingg/-/pingg-0.0.1.tgz")
            .with_status(200)
            .with_header("content-type", "application/octet-stream")
            .with_body(body)
            .create_async()
            .await;

        let registry = Registry::new(&server.url());
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("node_modules").join("pingg");

        install_tarball(&registry, &PackageName::new("pingg"), "0.0.1", &target)
            .await
            .unwrap();

        assert!(target.join("package.json").exists());
        assert!(target.join("lib/main.js").exists());
        assert!(!target.join("package").exists());
    }

    #[tokio::test]
    async fn non_200_status_is_a_download_error() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/ghost/-/ghost-1.2.3.tgz")
            .with_status(404)
            .create_async()
            .await;

        let registry = Registry::new(&server.url());
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("node_modules").join("ghost");

        let err = install_tarball(&registry, &PackageName::new("ghost"), "1.2.3", &target)
            .await
            .unwrap_err();

        match err {
            InstallError::Download(DownloadError { status, url }) => {
                assert_eq!(status, 404);
                assert!(url.ends_with("/ghost/-/ghost-1.2.3.tgz"));
            }
            other => panic!("expected DownloadError, got {other:?}"),
        }
    }
}
