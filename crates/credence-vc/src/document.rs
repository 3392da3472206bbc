//! # Credential and Presentation Documents
//!
//! [`Credential`] and [`Presentation`] wrap the raw JSON object rather
//! than a rigid struct. A caller-supplied document with a malformed
//! `issuanceDate` or a missing `type` must still reach the structural
//! validator, which reports the violation; a typed deserializer would
//! reject it earlier with a less useful error.
//!
//! Both types are immutable from the protocol's point of view. Issuance
//! and signing return a new document with the proof attached.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ValidationError;
use crate::proof::{attach_proof, proof_entries};

/// The VC Data Model v1 context. Must be the first `@context` entry.
pub const CREDENTIALS_V1_CONTEXT: &str = "https://www.w3.org/2018/credentials/v1";

/// The security vocabulary v2 context.
pub const SECURITY_V2_CONTEXT: &str = "https://w3id.org/security/v2";

/// The Ed25519Signature2020 suite context.
pub const ED25519_2020_CONTEXT: &str = "https://w3id.org/security/suites/ed25519-2020/v1";

/// Type every credential must declare.
pub const VERIFIABLE_CREDENTIAL_TYPE: &str = "VerifiableCredential";

/// Type every presentation must declare.
pub const VERIFIABLE_PRESENTATION_TYPE: &str = "VerifiablePresentation";

/// A Verifiable Credential as a JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(Map<String, Value>);

/// A Verifiable Presentation as a JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Presentation(Map<String, Value>);

macro_rules! document_common {
    ($ty:ident) => {
        impl $ty {
            /// Wrap a JSON object.
            pub fn from_map(map: Map<String, Value>) -> Self {
                Self(map)
            }

            /// The underlying JSON object.
            pub fn as_map(&self) -> &Map<String, Value> {
                &self.0
            }

            /// Consume into the underlying JSON object.
            pub fn into_map(self) -> Map<String, Value> {
                self.0
            }

            /// Look up a top-level member.
            pub fn get(&self, key: &str) -> Option<&Value> {
                self.0.get(key)
            }

            /// The `id` member, when it is a string.
            pub fn id(&self) -> Option<&str> {
                self.0.get("id").and_then(Value::as_str)
            }

            /// Attached proofs in document order.
            pub fn proofs(&self) -> Vec<&Value> {
                proof_entries(&self.0)
            }

            /// Returns true if at least one proof is attached.
            pub fn has_proof(&self) -> bool {
                !self.proofs().is_empty()
            }

            /// A copy of this document with `proof` appended.
            pub fn with_proof(&self, proof: Value) -> Self {
                let mut map = self.0.clone();
                attach_proof(&mut map, proof);
                Self(map)
            }
        }

        impl TryFrom<Value> for $ty {
            type Error = ValidationError;

            fn try_from(value: Value) -> Result<Self, Self::Error> {
                match value {
                    Value::Object(map) => Ok(Self(map)),
                    _ => Err(ValidationError::NotAnObject),
                }
            }
        }

        impl From<$ty> for Value {
            fn from(doc: $ty) -> Self {
                Value::Object(doc.0)
            }
        }
    };
}

document_common!(Credential);
document_common!(Presentation);

impl Credential {
    /// The issuer's identifier: the string form, or the `id` of the
    /// object form.
    pub fn issuer_id(&self) -> Option<&str> {
        id_of(self.0.get("issuer"))
    }

    /// Set a top-level member on this (owned) copy.
    pub(crate) fn set(&mut self, key: &str, value: Value) {
        self.0.insert(key.to_string(), value);
    }
}

impl Presentation {
    /// The holder's identifier: the string form, or the `id` of the object
    /// form.
    pub fn holder_id(&self) -> Option<&str> {
        id_of(self.0.get("holder"))
    }

    /// Nested credentials in document order. Absent yields an empty
    /// sequence; a single object yields one entry.
    pub fn verifiable_credentials(&self) -> Vec<&Value> {
        match self.0.get("verifiableCredential") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items.iter().collect(),
            Some(single) => vec![single],
        }
    }
}

/// Identifier of a member that is either a string or an object with a
/// string `id`.
pub(crate) fn id_of(value: Option<&Value>) -> Option<&str> {
    match value? {
        Value::String(s) => Some(s),
        Value::Object(o) => o.get("id").and_then(Value::as_str),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn credential(v: Value) -> Credential {
        Credential::try_from(v).unwrap()
    }

    #[test]
    fn issuer_id_accepts_both_forms() {
        assert_eq!(
            credential(json!({"issuer": "did:example:1"})).issuer_id(),
            Some("did:example:1")
        );
        assert_eq!(
            credential(json!({"issuer": {"id": "did:example:2", "name": "Uni"}})).issuer_id(),
            Some("did:example:2")
        );
        assert_eq!(credential(json!({"issuer": 7})).issuer_id(), None);
    }

    #[test]
    fn non_object_is_rejected() {
        assert_eq!(
            Credential::try_from(json!("nope")),
            Err(ValidationError::NotAnObject)
        );
    }

    #[test]
    fn with_proof_leaves_original_untouched() {
        let original = credential(json!({"id": "urn:uuid:1"}));
        let signed = original.with_proof(json!({"type": "X"}));
        assert!(!original.has_proof());
        assert!(signed.has_proof());
        assert_eq!(signed.id(), Some("urn:uuid:1"));
    }

    #[test]
    fn verifiable_credentials_normalizes_single() {
        let p = Presentation::try_from(json!({"verifiableCredential": {"id": "a"}})).unwrap();
        assert_eq!(p.verifiable_credentials().len(), 1);
        let p = Presentation::try_from(json!({"verifiableCredential": [{"id": "a"}, {"id": "b"}]}))
            .unwrap();
        assert_eq!(p.verifiable_credentials()[1]["id"], "b");
        let p = Presentation::try_from(json!({})).unwrap();
        assert!(p.verifiable_credentials().is_empty());
    }

    #[test]
    fn serde_is_transparent() {
        let v = json!({"@context": [CREDENTIALS_V1_CONTEXT], "holder": {"id": "did:ex:h"}});
        let p: Presentation = serde_json::from_value(v.clone()).unwrap();
        assert_eq!(p.holder_id(), Some("did:ex:h"));
        assert_eq!(serde_json::to_value(&p).unwrap(), v);
    }
}
