//! Attachment naming and downloading.
//!
//! Every file comment links to a local copy of its first upload, named
//! `./<base>-<comment id><ext>` so two comments reusing one file name never
//! clash. Path separators in either part become `_`, keeping every copy
//! directly inside the attachments directory. Fetching goes through [`AttachmentFetcher`]; the HTTP implementation
//! is a plain blocking GET with no retries.

use crate::error::{ConvertError, Result};
use crate::model::Upload;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Split a file name into base and extension (dot included).
///
/// The extension starts at the last `.` of the final path component, unless
/// every character before that dot is itself a dot (`.bashrc` has no
/// extension).
#[must_use]
pub fn split_extension(name: &str) -> (&str, &str) {
    let file_start = name.rfind(['/', '\\']).map_or(0, |i| i + 1);
    let file = &name[file_start..];
    match file.rfind('.') {
        Some(dot) if file[..dot].chars().any(|c| c != '.') => {
            let split = file_start + dot;
            (&name[..split], &name[split..])
        }
        _ => (name, ""),
    }
}

/// Local link target for an upload owned by `comment_id`.
#[must_use]
pub fn local_file_name(upload_name: &str, comment_id: &str) -> String {
    let upload_name = flatten_separators(upload_name);
    let (base, ext) = split_extension(&upload_name);
    format!("./{base}-{}{ext}", flatten_separators(comment_id))
}

fn flatten_separators(name: &str) -> String {
    name.replace(['/', '\\'], "_")
}

/// Fetches an upload's bytes to a local file.
pub trait AttachmentFetcher {
    /// Fetch `upload` and store it under `local_name`.
    ///
    /// # Errors
    ///
    /// Any failure is fatal for the run.
    fn fetch(&self, upload: &Upload, local_name: &str) -> Result<()>;
}

/// Used when downloads are disabled: links are still rendered.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopFetcher;

impl AttachmentFetcher for NoopFetcher {
    fn fetch(&self, upload: &Upload, local_name: &str) -> Result<()> {
        debug!(url = %upload.url, local_name, "Download disabled, linking only");
        Ok(())
    }
}

/// Blocking HTTP downloader writing into `base_dir`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
    base_dir: PathBuf,
}

impl HttpFetcher {
    /// Build a fetcher. `timeout` of `None` waits indefinitely.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(base_dir: impl Into<PathBuf>, timeout: Option<Duration>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("nozbe2org/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_dir: base_dir.into(),
        })
    }

    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Where `local_name` ends up on disk.
    #[must_use]
    pub fn destination(&self, local_name: &str) -> PathBuf {
        self.base_dir
            .join(local_name.strip_prefix("./").unwrap_or(local_name))
    }
}

impl AttachmentFetcher for HttpFetcher {
    fn fetch(&self, upload: &Upload, local_name: &str) -> Result<()> {
        let destination = self.destination(local_name);
        info!(
            "Downloading {} to {}",
            upload.name,
            destination.display()
        );

        let response = self
            .client
            .get(&upload.url)
            .send()
            .map_err(|source| ConvertError::Download {
                url: upload.url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ConvertError::DownloadStatus {
                url: upload.url.clone(),
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().map_err(|source| ConvertError::Download {
            url: upload.url.clone(),
            source,
        })?;

        fs::write(&destination, &bytes).map_err(|source| ConvertError::Write {
            path: destination.clone(),
            source,
        })?;
        debug!(bytes = bytes.len(), path = %destination.display(), "Attachment saved");
        Ok(())
    }
}
