//! # Canonical Serialization — JCS Byte Production
//!
//! Defines `CanonicalBytes`, the sole construction path for bytes that are
//! signed or verified anywhere in Credence.
//!
//! ## Security Invariant
//!
//! The inner `Vec<u8>` is private. The only constructors run the value
//! through RFC 8785 (JSON Canonicalization Scheme) serialization: keys
//! sorted by UTF-16 code units, compact separators, ECMAScript number
//! formatting. Two documents that differ only in key order or whitespace
//! produce identical bytes; two documents that differ in any member value
//! never do.
//!
//! Any function that signs or verifies must accept `&CanonicalBytes`, so a
//! "wrong serialization path" cannot be expressed.

use serde::Serialize;
use serde_json::Value;

use crate::error::CanonicalizationError;

/// Bytes produced exclusively by JCS canonicalization.
///
/// # Invariants
///
/// - The only constructors are [`CanonicalBytes::new()`] and
///   [`CanonicalBytes::without_members()`].
/// - Serialization uses sorted keys with compact separators (RFC 8785).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Construct canonical bytes from any serializable value.
    ///
    /// # Errors
    ///
    /// Returns `CanonicalizationError::SerializationFailed` if the value
    /// cannot be represented as JSON.
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let value = serde_json::to_value(obj)?;
        let bytes = serialize_canonical(&value)?;
        Ok(Self(bytes))
    }

    /// Canonicalize a JSON object with the named top-level members removed.
    ///
    /// This is how a secured document's signing payload is produced: the
    /// `proof` member is dropped and the remainder is canonicalized. The
    /// caller's value is never mutated.
    ///
    /// # Errors
    ///
    /// Returns `CanonicalizationError::NotAnObject` if `obj` does not
    /// serialize to a JSON object.
    pub fn without_members(
        obj: &impl Serialize,
        members: &[&str],
    ) -> Result<Self, CanonicalizationError> {
        let mut value = serde_json::to_value(obj)?;
        let map = value
            .as_object_mut()
            .ok_or(CanonicalizationError::NotAnObject)?;
        for member in members {
            map.remove(*member);
        }
        let bytes = serialize_canonical(&value)?;
        Ok(Self(bytes))
    }

    /// Access the canonical bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the length of the canonical byte sequence.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the canonical byte sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Serialize a JSON value in JCS-canonical form (RFC 8785).
fn serialize_canonical(value: &Value) -> Result<Vec<u8>, CanonicalizationError> {
    let s = serde_jcs::to_string(value)?;
    Ok(s.into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sorted_keys_compact_separators() {
        let data = json!({"b": 2, "a": 1, "c": "hello"});
        let cb = CanonicalBytes::new(&data).expect("should canonicalize");
        let s = std::str::from_utf8(cb.as_bytes()).unwrap();
        assert_eq!(s, r#"{"a":1,"b":2,"c":"hello"}"#);
    }

    #[test]
    fn nested_objects_are_sorted() {
        let data = json!({
            "outer": {"b": 2, "a": 1},
            "list": [3, 2, 1]
        });
        let cb = CanonicalBytes::new(&data).unwrap();
        let s = std::str::from_utf8(cb.as_bytes()).unwrap();
        // Array order is significant and preserved.
        assert_eq!(s, r#"{"list":[3,2,1],"outer":{"a":1,"b":2}}"#);
    }

    #[test]
    fn floats_use_ecmascript_formatting() {
        let data = json!({"gpa": 3.5, "n": 1.0});
        let cb = CanonicalBytes::new(&data).unwrap();
        let s = std::str::from_utf8(cb.as_bytes()).unwrap();
        assert_eq!(s, r#"{"gpa":3.5,"n":1}"#);
    }

    #[test]
    fn without_members_drops_proof_only() {
        let doc = json!({
            "issuer": "did:example:issuer",
            "proof": {"type": "Ed25519Signature2020"}
        });
        let stripped = CanonicalBytes::without_members(&doc, &["proof"]).unwrap();
        let bare = CanonicalBytes::new(&json!({"issuer": "did:example:issuer"})).unwrap();
        assert_eq!(stripped, bare);
        // The input keeps its proof.
        assert!(doc.get("proof").is_some());
    }

    #[test]
    fn without_members_rejects_non_object() {
        let result = CanonicalBytes::without_members(&json!(["a"]), &["proof"]);
        assert!(matches!(result, Err(CanonicalizationError::NotAnObject)));
    }

    #[test]
    fn key_order_does_not_change_bytes() {
        let a: Value = serde_json::from_str(r#"{"x":1,"y":{"q":true,"p":null}}"#).unwrap();
        let b: Value = serde_json::from_str(r#"{"y":{"p":null,"q":true},"x":1}"#).unwrap();
        assert_eq!(
            CanonicalBytes::new(&a).unwrap(),
            CanonicalBytes::new(&b).unwrap()
        );
    }

    #[test]
    fn unicode_passes_through_as_utf8() {
        let data = json!({"name": "\u{00e9}\u{00e8}"});
        let cb = CanonicalBytes::new(&data).unwrap();
        let s = std::str::from_utf8(cb.as_bytes()).unwrap();
        assert!(s.contains('\u{00e9}'));
        assert!(!cb.is_empty());
    }
}
