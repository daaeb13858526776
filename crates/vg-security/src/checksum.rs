use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};

pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Compares against a hex digest; case and surrounding whitespace are ignored.
pub fn verify_sha256(bytes: &[u8], expected_hex: &str) -> bool {
    digest_matches(&sha256_hex(bytes), expected_hex)
}

pub fn verify_sha256_reader(reader: &mut impl Read, expected_hex: &str) -> Result<bool> {
    let mut hasher = Sha256::new();
    let mut buffer = [0_u8; 64 * 1024];
    loop {
        let read = reader
            .read(&mut buffer)
            .context("failed reading data for sha256")?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    Ok(digest_matches(
        &hex::encode(hasher.finalize()),
        expected_hex,
    ))
}

pub fn verify_sha256_file(path: &Path, expected_hex: &str) -> Result<bool> {
    let file = File::open(path)
        .with_context(|| format!("failed to open {} for sha256", path.display()))?;
    verify_sha256_reader(&mut BufReader::new(file), expected_hex)
        .with_context(|| format!("failed to hash {}", path.display()))
}

fn digest_matches(actual_hex: &str, expected_hex: &str) -> bool {
    actual_hex.eq_ignore_ascii_case(expected_hex.trim())
}
