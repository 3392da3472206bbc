//! # Linked-Data Proofs
//!
//! The [`Proof`] object attached under a document's `proof` member, the
//! purpose vocabulary, and the single-or-sequence normalization of the
//! `proof` member itself.
//!
//! A document's `proof` member may hold one proof object or an ordered
//! array of them. Both forms are read as a sequence (a single object is a
//! sequence of length one). Attaching a new proof never replaces an
//! existing one: a single object becomes a two-element array, an array is
//! extended.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use credence_core::{CanonicalBytes, CanonicalizationError};

/// The member under which proofs are attached.
pub const PROOF_MEMBER: &str = "proof";

/// A linked-data proof.
///
/// Unknown members are preserved in `extra` so that a proof produced by
/// another implementation re-serializes to the same canonical bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proof {
    /// The suite discriminator, e.g. `Ed25519Signature2020`.
    #[serde(rename = "type")]
    pub proof_type: String,

    /// When the proof was created (`YYYY-MM-DDTHH:MM:SSZ`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,

    /// URL of the key that produced the signature.
    pub verification_method: String,

    /// The purpose term the proof claims, e.g. `assertionMethod`.
    pub proof_purpose: String,

    /// Replay-protection nonce bound into presentation proofs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub challenge: Option<String>,

    /// Operational domain bound into presentation proofs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,

    /// Suite-specific signature material.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof_value: Option<String>,

    /// Any other members, carried through verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Proof {
    /// Canonical bytes of the proof options: every member except
    /// `proofValue`.
    pub fn options_bytes(&self) -> Result<CanonicalBytes, CanonicalizationError> {
        CanonicalBytes::without_members(self, &["proofValue"])
    }

    /// Parse a proof from its JSON form.
    pub fn from_value(value: &Value) -> Result<Self, serde_json::Error> {
        Self::deserialize(value)
    }
}

/// The relationship a verification method must hold with its controller
/// for a proof to count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PurposeTerm {
    /// The issuer asserts the claims (credential issuance).
    AssertionMethod,
    /// The holder authenticates (presentation signing).
    Authentication,
}

impl PurposeTerm {
    /// The JSON-LD term as it appears in `proofPurpose` and in controller
    /// documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AssertionMethod => "assertionMethod",
            Self::Authentication => "authentication",
        }
    }
}

impl std::fmt::Display for PurposeTerm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read the `proof` member as an ordered sequence.
///
/// Absent and `null` both yield an empty sequence.
pub fn proof_entries(document: &Map<String, Value>) -> Vec<&Value> {
    match document.get(PROOF_MEMBER) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.iter().collect(),
        Some(single) => vec![single],
    }
}

/// Attach `proof`, preserving any proofs already present.
pub fn attach_proof(document: &mut Map<String, Value>, proof: Value) {
    match document.remove(PROOF_MEMBER) {
        None | Some(Value::Null) => {
            document.insert(PROOF_MEMBER.to_string(), proof);
        }
        Some(Value::Array(mut items)) => {
            items.push(proof);
            document.insert(PROOF_MEMBER.to_string(), Value::Array(items));
        }
        Some(existing) => {
            document.insert(PROOF_MEMBER.to_string(), Value::Array(vec![existing, proof]));
        }
    }
}
