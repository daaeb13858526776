use super::*;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use vg_core::{ArchiveType, VersionId};
use vg_security::sha256_hex;

use crate::fetcher::http_client;

static TEST_DIR_COUNTER: AtomicU64 = AtomicU64::new(0);

const SAMPLE_INDEX: &str = r#"[
  {
    "version": "go1.22.0",
    "stable": true,
    "files": [
      {"filename": "go1.22.0.src.tar.gz", "os": "", "arch": "", "version": "go1.22.0",
       "sha256": "4d196c3d41a0d6c1dfc64d04e3cc1f608b0c436bd87b7060ce3e23234e1f4d5c",
       "size": 27562476, "kind": "source"},
      {"filename": "go1.22.0.linux-amd64.tar.gz", "os": "linux", "arch": "amd64",
       "version": "go1.22.0",
       "sha256": "f6c8a87aa03b92c4b0bf3d558e28ea03006eb29db78917daec5cfb6ec1046265",
       "size": 68988925, "kind": "archive"},
      {"filename": "go1.22.0.windows-amd64.zip", "os": "windows", "arch": "amd64",
       "version": "go1.22.0",
       "sha256": "78b3158fe3aa358e0b6c9f26ecd338f9a11441e88bc434ae2e9f0ca2b0cc4dd3",
       "size": 75906262, "kind": "archive"},
      {"filename": "go1.22.0.windows-amd64.msi", "os": "windows", "arch": "amd64",
       "version": "go1.22.0", "sha256": "00", "size": 1, "kind": "installer"}
    ]
  },
  {
    "version": "go1.21rc2",
    "stable": false,
    "files": [
      {"filename": "go1.21rc2.darwin-arm64.tar.gz", "os": "darwin", "arch": "arm64",
       "version": "go1.21rc2", "sha256": "ab", "size": 2, "kind": "archive"}
    ]
  }
]"#;

fn test_dir() -> PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("system time")
        .as_nanos();
    std::env::temp_dir().join(format!(
        "vg-registry-tests-{}-{}-{}",
        std::process::id(),
        nanos,
        TEST_DIR_COUNTER.fetch_add(1, Ordering::Relaxed)
    ))
}

fn version(raw: &str) -> VersionId {
    VersionId::parse(raw).expect("version must parse")
}

fn go_file(filename: &str, sha256: String) -> GoFile {
    GoFile {
        filename: filename.to_string(),
        os: "linux".to_string(),
        arch: "amd64".to_string(),
        version: "go1.22.0".to_string(),
        sha256,
        size: 0,
        kind: "archive".to_string(),
    }
}

#[test]
fn parse_release_index_reads_files() {
    let releases = parse_release_index(SAMPLE_INDEX).expect("must parse index");
    assert_eq!(releases.len(), 2);
    assert_eq!(releases[0].version, "go1.22.0");
    assert!(releases[0].stable);
    assert_eq!(releases[0].files.len(), 4);
    assert!(!releases[1].stable);
}

#[test]
fn parse_release_index_rejects_garbage() {
    let err = parse_release_index("<html>").expect_err("html is not an index");
    assert!(err.to_string().contains("release index"));
}

#[test]
fn select_archive_picks_platform_archive() {
    let releases = parse_release_index(SAMPLE_INDEX).expect("must parse index");

    let linux = select_archive(&releases, &version("go1.22.0"), "linux", "amd64")
        .expect("linux archive must exist");
    assert_eq!(linux.filename, "go1.22.0.linux-amd64.tar.gz");
    assert_eq!(linux.archive_type(), Some(ArchiveType::TarGz));

    let windows = select_archive(&releases, &version("1.22.0"), "windows", "amd64")
        .expect("windows archive must exist");
    assert_eq!(windows.filename, "go1.22.0.windows-amd64.zip");
    assert_eq!(windows.archive_type(), Some(ArchiveType::Zip));

    let rc = select_archive(&releases, &version("1.21rc2"), "darwin", "arm64")
        .expect("pre-release archive must exist");
    assert_eq!(rc.sha256, "ab");
}

#[test]
fn select_archive_reports_missing_version_or_platform() {
    let releases = parse_release_index(SAMPLE_INDEX).expect("must parse index");

    let err = select_archive(&releases, &version("1.99.0"), "linux", "amd64")
        .expect_err("unknown version");
    assert!(err.to_string().contains("not listed"));

    let err = select_archive(&releases, &version("1.22.0"), "plan9", "amd64")
        .expect_err("unknown platform");
    assert!(err.to_string().contains("plan9/amd64"));
}

#[test]
fn archive_file_name_follows_go_dev_naming() {
    assert_eq!(
        archive_file_name(&version("1.22.0"), "linux", "amd64"),
        "go1.22.0.linux-amd64.tar.gz"
    );
    assert_eq!(
        archive_file_name(&version("1.21rc2"), "windows", "arm64"),
        "go1.21rc2.windows-arm64.zip"
    );
}

#[test]
fn index_url_handles_trailing_slash() {
    assert_eq!(
        index_url("https://go.dev/dl/"),
        "https://go.dev/dl/?mode=json&include=all"
    );
    assert_eq!(
        index_url("https://mirror.example/golang"),
        "https://mirror.example/golang/?mode=json&include=all"
    );
}

#[test]
fn platform_names_use_go_spelling() {
    assert_ne!(go_os(), "macos");
    assert_ne!(go_arch(), "x86_64");
    assert_ne!(go_arch(), "aarch64");
}

#[test]
fn fetch_archive_uses_cache_without_checksum() {
    let dists = test_dir();
    fs::create_dir_all(&dists).expect("must create dists dir");
    let cached = dists.join("go1.22.0.linux-amd64.tar.gz");
    fs::write(&cached, b"cached").expect("must write cached archive");

    let fetcher = GoDevFetcher::new("http://127.0.0.1:9/", false).with_platform("linux", "amd64");
    let client = http_client().expect("must build client");
    let fetched = fetcher
        .fetch_archive(&client, &version("1.22.0"), &dists, None)
        .expect("cache hit must not touch the network");
    assert_eq!(fetched.path, cached);
    assert_eq!(fetched.archive_type, ArchiveType::TarGz);
    assert_eq!(fetched.root_dir, "go");

    let _ = fs::remove_dir_all(&dists);
}

#[test]
fn fetch_archive_accepts_cache_with_matching_checksum() {
    let dists = test_dir();
    fs::create_dir_all(&dists).expect("must create dists dir");
    let cached = dists.join("go1.22.0.linux-amd64.tar.gz");
    fs::write(&cached, b"archive bytes").expect("must write cached archive");

    let fetcher = GoDevFetcher::new("http://127.0.0.1:9/", true);
    let client = http_client().expect("must build client");
    let expected = go_file("go1.22.0.linux-amd64.tar.gz", sha256_hex(b"archive bytes"));
    let fetched = fetcher
        .fetch_archive(&client, &version("1.22.0"), &dists, Some(&expected))
        .expect("verified cache hit must succeed");
    assert_eq!(fetched.path, cached);

    let _ = fs::remove_dir_all(&dists);
}

#[test]
fn fetch_archive_discards_cache_with_wrong_checksum() {
    let dists = test_dir();
    fs::create_dir_all(&dists).expect("must create dists dir");
    let cached = dists.join("go1.22.0.linux-amd64.tar.gz");
    fs::write(&cached, b"corrupted").expect("must write cached archive");

    let fetcher = GoDevFetcher::new("http://127.0.0.1:9/", true);
    let client = http_client().expect("must build client");
    let expected = go_file("go1.22.0.linux-amd64.tar.gz", sha256_hex(b"archive bytes"));
    fetcher
        .fetch_archive(&client, &version("1.22.0"), &dists, Some(&expected))
        .expect_err("unreachable mirror must fail the re-download");
    assert!(!cached.exists());
    assert!(!dists.join("go1.22.0.linux-amd64.tar.gz.part").exists());

    let _ = fs::remove_dir_all(&dists);
}
