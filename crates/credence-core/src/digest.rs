//! # Digests and Signing Inputs
//!
//! SHA-256 digests computed exclusively from [`CanonicalBytes`], and the
//! two-digest [`SigningInput`] that linked-data proofs sign over.
//!
//! ## Security Invariant
//!
//! `sha256_digest(&CanonicalBytes)` makes it a compile error to hash raw
//! bytes. `SigningInput::new()` accepts only two `&CanonicalBytes` (the
//! proof configuration and the unsecured document), so a signature can
//! never cover a non-canonical payload.

use sha2::{Digest, Sha256};

use crate::canonical::CanonicalBytes;

/// A SHA-256 digest of canonical bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentDigest([u8; 32]);

impl ContentDigest {
    /// Return the raw 32-byte digest.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Render the digest as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl std::fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sha256:{}", self.to_hex())
    }
}

/// Compute a SHA-256 digest from canonical bytes.
pub fn sha256_digest(data: &CanonicalBytes) -> ContentDigest {
    let hash = Sha256::digest(data.as_bytes());
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&hash);
    ContentDigest(bytes)
}

/// Compute a SHA-256 hex string from canonical bytes.
pub fn sha256_hex(data: &CanonicalBytes) -> String {
    sha256_digest(data).to_hex()
}

/// The 64-byte message a linked-data proof signs:
/// `sha256(proof options) || sha256(document)`.
///
/// Hashing the proof options binds `created`, `proofPurpose`,
/// `verificationMethod`, `challenge` and `domain` into the signature, so
/// none of them can be swapped without invalidating it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningInput([u8; 64]);

impl SigningInput {
    /// Build the signing input from canonical proof options and the
    /// canonical unsecured document.
    pub fn new(proof_options: &CanonicalBytes, document: &CanonicalBytes) -> Self {
        let mut bytes = [0u8; 64];
        bytes[..32].copy_from_slice(sha256_digest(proof_options).as_bytes());
        bytes[32..].copy_from_slice(sha256_digest(document).as_bytes());
        Self(bytes)
    }

    /// Access the signing input bytes.
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }
}
