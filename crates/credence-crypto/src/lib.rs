//! # credence-crypto — Ed25519 Primitives
//!
//! Key pairs, hex-encoded public keys and signatures, and verification.
//!
//! Signing and verification accept only a [`credence_core::SigningInput`],
//! which in turn can only be built from canonical bytes. There is no path
//! from raw `&[u8]` to a signature.
//!
//! ## Crate Policy
//!
//! - Depends only on `credence-core` internally.
//! - No mocking of cryptographic operations in tests. All tests use real
//!   canonical bytes, real SHA-256 and real Ed25519.

pub mod ed25519;
pub mod hex;

pub use ed25519::{verify, verify_with_public_key, Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};
