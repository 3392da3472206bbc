//! # credence-core — Foundational Types for Credence
//!
//! The leaf of the workspace DAG. Every other crate depends on it; it
//! depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **`CanonicalBytes` newtype.** Every byte sequence that is signed or
//!    verified flows through `CanonicalBytes::new()` (RFC 8785 JCS). No raw
//!    `serde_json::to_vec()` on a signing path.
//!
//! 2. **`SigningInput` is built only from canonical bytes.** A proof's
//!    signing input is the concatenation of two SHA-256 digests, and the
//!    only constructor takes two `&CanonicalBytes`.
//!
//! 3. **UTC-only timestamps.** [`Timestamp`] is UTC with a `Z` suffix and
//!    seconds precision. [`is_vc_datetime`] is the strict lexical check
//!    applied to `issuanceDate` / `expirationDate`.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `credence-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod digest;
pub mod error;
pub mod temporal;

pub use canonical::CanonicalBytes;
pub use digest::{sha256_digest, sha256_hex, ContentDigest, SigningInput};
pub use error::{CanonicalizationError, CoreError, CryptoError};
pub use temporal::{is_vc_datetime, Timestamp, VC_DATETIME_PATTERN};
