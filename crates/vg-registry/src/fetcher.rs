use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use reqwest::blocking::Client;
use tracing::{debug, info, warn};
use vg_core::{ArchiveType, DistributionFetcher, FetchedArchive, VersionId, DEFAULT_MIRROR};
use vg_security::verify_sha256_file;

use crate::release_index::{
    archive_file_name, go_arch, go_os, index_url, parse_release_index, select_archive, GoFile,
};

const USER_AGENT: &str = concat!("vg/", env!("CARGO_PKG_VERSION"));
const DOWNLOAD_ATTEMPTS: usize = 3;
const HTTP_TIMEOUT: Duration = Duration::from_secs(300);
const GO_ARCHIVE_ROOT: &str = "go";

/// Receives download progress; the CLI drives a progress bar from it.
pub trait DownloadObserver {
    fn started(&self, filename: &str, total_bytes: Option<u64>);
    fn advanced(&self, bytes: u64);
    fn finished(&self);
}

/// Fetches official Go distributions from go.dev (or a mirror of it) into the
/// local dists cache.
pub struct GoDevFetcher {
    mirror: String,
    verify_checksum: bool,
    os: String,
    arch: String,
    observer: Option<Box<dyn DownloadObserver>>,
}

impl GoDevFetcher {
    pub fn new(mirror: impl Into<String>, verify_checksum: bool) -> Self {
        Self {
            mirror: mirror.into(),
            verify_checksum,
            os: go_os().to_string(),
            arch: go_arch().to_string(),
            observer: None,
        }
    }

    pub fn with_platform(mut self, os: impl Into<String>, arch: impl Into<String>) -> Self {
        self.os = os.into();
        self.arch = arch.into();
        self
    }

    pub fn with_observer(mut self, observer: Box<dyn DownloadObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    fn lookup(&self, client: &Client, version: &VersionId) -> Result<GoFile> {
        let url = index_url(&self.mirror);
        let raw = client
            .get(&url)
            .send()
            .with_context(|| format!("failed to fetch {url}"))?
            .error_for_status()
            .with_context(|| format!("unexpected response for {url}"))?
            .text()
            .with_context(|| format!("failed to read {url}"))?;
        let releases = parse_release_index(&raw)?;
        Ok(select_archive(&releases, version, &self.os, &self.arch)?.clone())
    }

    /// Resolves the archive into `dists_dir`, downloading only when no usable
    /// cached copy exists. `expected` carries the index entry when checksums
    /// are verified.
    pub(crate) fn fetch_archive(
        &self,
        client: &Client,
        version: &VersionId,
        dists_dir: &Path,
        expected: Option<&GoFile>,
    ) -> Result<FetchedArchive> {
        let filename = match expected {
            Some(file) => file.filename.clone(),
            None => archive_file_name(version, &self.os, &self.arch),
        };
        let archive_type = ArchiveType::infer_from_filename(&filename)
            .ok_or_else(|| anyhow!("unsupported archive format: {filename}"))?;
        let cache_path = dists_dir.join(&filename);

        if cache_path.is_file() {
            match expected {
                Some(file) if !verify_sha256_file(&cache_path, &file.sha256)? => {
                    warn!(
                        path = %cache_path.display(),
                        "cached archive failed sha256; downloading again"
                    );
                    fs::remove_file(&cache_path).with_context(|| {
                        format!("failed to remove stale archive: {}", cache_path.display())
                    })?;
                }
                _ => {
                    info!(path = %cache_path.display(), "using cached archive");
                    return Ok(FetchedArchive {
                        path: cache_path,
                        archive_type,
                        root_dir: GO_ARCHIVE_ROOT.to_string(),
                    });
                }
            }
        }

        let url = format!("{}/{}", self.mirror.trim_end_matches('/'), filename);
        self.download_with_retry(client, &url, &cache_path)?;

        if let Some(file) = expected {
            if !verify_sha256_file(&cache_path, &file.sha256)? {
                let _ = fs::remove_file(&cache_path);
                return Err(anyhow!(
                    "sha256 mismatch for {} (expected {})",
                    cache_path.display(),
                    file.sha256
                ));
            }
        }

        Ok(FetchedArchive {
            path: cache_path,
            archive_type,
            root_dir: GO_ARCHIVE_ROOT.to_string(),
        })
    }

    fn download_with_retry(&self, client: &Client, url: &str, cache_path: &Path) -> Result<()> {
        let mut last_err = None;
        for attempt in 1..=DOWNLOAD_ATTEMPTS {
            match self.download_once(client, url, cache_path) {
                Ok(()) => return Ok(()),
                Err(err) => {
                    debug!(url, attempt, error = %err, "download attempt failed");
                    last_err = Some(err);
                }
            }
        }
        Err(last_err.unwrap_or_else(|| anyhow!("failed to download {url}; no attempts left")))
    }

    fn download_once(&self, client: &Client, url: &str, cache_path: &Path) -> Result<()> {
        if let Some(parent) = cache_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create dists dir: {}", parent.display()))?;
        }

        let part_path = part_path_for(cache_path);
        let result = self.stream_to(client, url, &part_path);
        if let Err(err) = result {
            let _ = fs::remove_file(&part_path);
            return Err(err);
        }

        fs::rename(&part_path, cache_path).with_context(|| {
            format!(
                "failed to move downloaded archive into cache: {}",
                cache_path.display()
            )
        })?;
        info!(url, path = %cache_path.display(), "downloaded archive");
        Ok(())
    }

    fn stream_to(&self, client: &Client, url: &str, out_path: &Path) -> Result<()> {
        let mut response = client
            .get(url)
            .send()
            .with_context(|| format!("failed to fetch {url}"))?
            .error_for_status()
            .with_context(|| format!("unexpected response for {url}"))?;

        let filename = out_path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("archive")
            .trim_end_matches(".part");
        if let Some(observer) = &self.observer {
            observer.started(filename, response.content_length());
        }

        let file = File::create(out_path)
            .with_context(|| format!("failed to create {}", out_path.display()))?;
        let mut writer = BufWriter::new(file);
        let mut buffer = vec![0_u8; 64 * 1024];
        loop {
            let read = response
                .read(&mut buffer)
                .with_context(|| format!("stream error for {url}"))?;
            if read == 0 {
                break;
            }
            writer
                .write_all(&buffer[..read])
                .with_context(|| format!("failed to write {}", out_path.display()))?;
            if let Some(observer) = &self.observer {
                observer.advanced(read as u64);
            }
        }
        writer
            .flush()
            .with_context(|| format!("failed to flush {}", out_path.display()))?;

        if let Some(observer) = &self.observer {
            observer.finished();
        }
        Ok(())
    }
}

impl Default for GoDevFetcher {
    fn default() -> Self {
        Self::new(DEFAULT_MIRROR, true)
    }
}

impl DistributionFetcher for GoDevFetcher {
    fn fetch(&self, version: &VersionId, dists_dir: &Path) -> Result<FetchedArchive> {
        let client = http_client()?;
        let expected = if self.verify_checksum {
            Some(self.lookup(&client, version)?)
        } else {
            None
        };
        self.fetch_archive(&client, version, dists_dir, expected.as_ref())
    }
}

pub(crate) fn http_client() -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(HTTP_TIMEOUT)
        .build()
        .context("failed to build http client")
}

fn part_path_for(cache_path: &Path) -> PathBuf {
    cache_path.with_file_name(format!(
        "{}.part",
        cache_path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("archive")
    ))
}
