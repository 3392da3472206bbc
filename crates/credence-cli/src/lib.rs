//! # credence-cli — Command-Line Front End
//!
//! Provides the `credence` binary:
//!
//! - `credence keygen`: Ed25519 key pair plus a controller document
//!   template.
//! - `credence issue`: sign a credential.
//! - `credence present`: wrap credentials in an unsigned presentation.
//! - `credence sign-presentation`: sign a presentation for a challenge.
//! - `credence verify`: verify a credential or presentation and print
//!   the verdict. Exit code 0 when verified, 1 otherwise.
//!
//! Signed documents and verdicts are written to stdout as pretty JSON.

pub mod config;
pub mod keys;
pub mod sign;
pub mod verify;

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Serialize;
use serde_json::Value;

/// Read and parse a JSON file.
pub fn read_json(path: &Path) -> Result<Value> {
    if !path.exists() {
        bail!("file not found: {}", path.display());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("failed to parse JSON: {}", path.display()))
}

/// Pretty-print `value` to stdout.
pub fn print_json(value: &impl Serialize) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{out}");
    Ok(())
}
