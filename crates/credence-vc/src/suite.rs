//! # Signature Suites
//!
//! A [`SignatureSuite`] produces and checks proofs for one proof `type`.
//! The orchestrators canonicalize the document (through the document
//! loader) and hand the suite canonical bytes; the suite owns the
//! signature mathematics and key material.
//!
//! [`SuiteSet`] is the dispatch table consulted during verification: an
//! ordered list keyed by proof type where the first matching suite wins.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use credence_core::{CanonicalBytes, Timestamp};

use crate::proof::Proof;

/// Everything a suite needs to build a proof besides the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofOptions {
    /// The purpose term recorded in `proofPurpose`.
    pub proof_purpose: String,
    /// Creation time; the suite uses the current time when absent.
    pub created: Option<Timestamp>,
    /// Challenge to bind into the proof.
    pub challenge: Option<String>,
    /// Domain to bind into the proof.
    pub domain: Option<String>,
    /// Whether the caller asked for a compacted proof. Suites that do not
    /// expand JSON-LD may ignore it.
    pub compact: bool,
}

impl ProofOptions {
    /// Options for the given purpose term, everything else unset.
    pub fn new(proof_purpose: impl Into<String>) -> Self {
        Self {
            proof_purpose: proof_purpose.into(),
            created: None,
            challenge: None,
            domain: None,
            compact: false,
        }
    }
}

/// Outcome of a suite's cryptographic check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiteVerification {
    /// Whether the signature is valid.
    pub verified: bool,
    /// Why it is not, when it is not.
    pub error: Option<String>,
}

impl SuiteVerification {
    /// A passing check.
    pub fn valid() -> Self {
        Self {
            verified: true,
            error: None,
        }
    }

    /// A failing check with a reason.
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self {
            verified: false,
            error: Some(reason.into()),
        }
    }
}

/// A suite failed to produce a proof.
#[derive(Error, Debug)]
pub enum SuiteError {
    /// The suite has no private key, so it can only verify.
    #[error("suite \"{0}\" has no signing key")]
    MissingKey(String),

    /// The suite's key material is unusable.
    #[error("key material error: {0}")]
    KeyMaterial(#[from] credence_core::CryptoError),

    /// The proof options could not be canonicalized.
    #[error("proof canonicalization failed: {0}")]
    Canonicalization(#[from] credence_core::CanonicalizationError),

    /// Any other suite-specific failure.
    #[error("{0}")]
    Other(String),
}

/// A pluggable signature scheme.
#[async_trait]
pub trait SignatureSuite: Send + Sync {
    /// The proof `type` this suite produces and verifies.
    fn proof_type(&self) -> &str;

    /// The verification method this suite signs as, if it holds a key.
    fn verification_method(&self) -> Option<&str>;

    /// Produce a proof over `document`, which is the canonical form of the
    /// document without its `proof` member.
    async fn sign(&self, document: &CanonicalBytes, options: &ProofOptions) -> Result<Proof, SuiteError>;

    /// Check `proof` against `document` using the resolved verification
    /// method.
    async fn verify(
        &self,
        document: &CanonicalBytes,
        proof: &Proof,
        verification_method: &Value,
    ) -> SuiteVerification;
}

/// Ordered dispatch table of acceptable suites.
#[derive(Clone, Default)]
pub struct SuiteSet {
    suites: Vec<Arc<dyn SignatureSuite>>,
}

impl SuiteSet {
    /// An empty set. Verification with an empty set is a configuration
    /// error.
    pub fn new() -> Self {
        Self::default()
    }

    /// A set holding one suite.
    pub fn single(suite: Arc<dyn SignatureSuite>) -> Self {
        Self { suites: vec![suite] }
    }

    /// Append a suite. Earlier suites take precedence for a shared type.
    pub fn with(mut self, suite: Arc<dyn SignatureSuite>) -> Self {
        self.suites.push(suite);
        self
    }

    /// Append a suite in place.
    pub fn push(&mut self, suite: Arc<dyn SignatureSuite>) {
        self.suites.push(suite);
    }

    /// The first suite whose type equals `proof_type`.
    pub fn find(&self, proof_type: &str) -> Option<&Arc<dyn SignatureSuite>> {
        self.suites.iter().find(|s| s.proof_type() == proof_type)
    }

    /// Returns true if no suite is configured.
    pub fn is_empty(&self) -> bool {
        self.suites.is_empty()
    }

    /// Number of configured suites.
    pub fn len(&self) -> usize {
        self.suites.len()
    }

    /// Proof types in precedence order.
    pub fn proof_types(&self) -> Vec<&str> {
        self.suites.iter().map(|s| s.proof_type()).collect()
    }
}

impl std::fmt::Debug for SuiteSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SuiteSet").field(&self.proof_types()).finish()
    }
}

impl From<Arc<dyn SignatureSuite>> for SuiteSet {
    fn from(suite: Arc<dyn SignatureSuite>) -> Self {
        Self::single(suite)
    }
}

impl FromIterator<Arc<dyn SignatureSuite>> for SuiteSet {
    fn from_iter<I: IntoIterator<Item = Arc<dyn SignatureSuite>>>(iter: I) -> Self {
        Self {
            suites: iter.into_iter().collect(),
        }
    }
}
