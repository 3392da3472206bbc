//! # Key Files
//!
//! `NAME.key` holds the 32-byte Ed25519 seed and `NAME.pub` the public
//! key, both lowercase hex on a single line.

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde_json::{json, Value};

use credence_crypto::Ed25519KeyPair;
use credence_vc::Ed25519Signature2020;

/// Generate a key pair under `output_dir` and print a controller document
/// template for `controller`.
pub fn cmd_keygen(output_dir: &Path, prefix: &str, controller: &str) -> Result<u8> {
    std::fs::create_dir_all(output_dir).with_context(|| {
        format!(
            "failed to create output directory: {}",
            output_dir.display()
        )
    })?;

    let key_pair = Ed25519KeyPair::generate();
    let public_hex = key_pair.public_key().to_hex();

    let key_path = output_dir.join(format!("{prefix}.key"));
    let pub_path = output_dir.join(format!("{prefix}.pub"));
    std::fs::write(&key_path, key_pair.seed_hex())
        .with_context(|| format!("failed to write private key: {}", key_path.display()))?;
    std::fs::write(&pub_path, &public_hex)
        .with_context(|| format!("failed to write public key: {}", pub_path.display()))?;

    tracing::info!(
        private_key = %key_path.display(),
        public_key = %pub_path.display(),
        "generated Ed25519 key pair"
    );
    crate::print_json(&controller_document(controller, &format!("{controller}#{prefix}"), &key_pair))?;
    Ok(0)
}

/// A controller document listing one Ed25519 method under both purposes.
pub fn controller_document(controller: &str, method_id: &str, key_pair: &Ed25519KeyPair) -> Value {
    let method =
        Ed25519Signature2020::verification_method_document(method_id, controller, &key_pair.public_key());
    json!({
        "id": controller,
        "verificationMethod": [method],
        "assertionMethod": [method_id],
        "authentication": [method_id]
    })
}

/// Read a private key file written by [`cmd_keygen`].
pub fn read_key_pair(path: &Path) -> Result<Ed25519KeyPair> {
    if !path.exists() {
        bail!("private key file not found: {}", path.display());
    }
    let hex = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read private key: {}", path.display()))?;
    Ed25519KeyPair::from_seed_hex(hex.trim())
        .with_context(|| format!("invalid private key: {}", path.display()))
}
