//! # Ed25519Signature2020 Suite
//!
//! The bundled [`SignatureSuite`].
//!
//! ## Signing input
//!
//! ```text
//! sha256(JCS(proof options)) || sha256(JCS(document without proof))
//! ```
//!
//! where the proof options are the proof object minus `proofValue`. The
//! `proofValue` is the 64-byte Ed25519 signature in lowercase hex. The
//! verification method document must carry the public key as
//! `publicKeyHex`.

use async_trait::async_trait;
use serde_json::{Map, Value};

use credence_core::{CanonicalBytes, SigningInput, Timestamp};
use credence_crypto::{verify_with_public_key, Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};

use crate::proof::Proof;
use crate::suite::{ProofOptions, SignatureSuite, SuiteError, SuiteVerification};

/// Verification method type this suite expects, when one is declared.
pub const ED25519_VERIFICATION_KEY_2020: &str = "Ed25519VerificationKey2020";

/// Ed25519 linked-data signatures over JCS canonical bytes.
#[derive(Debug)]
pub struct Ed25519Signature2020 {
    signer: Option<(Ed25519KeyPair, String)>,
}

impl Ed25519Signature2020 {
    /// The proof `type` handled by this suite.
    pub const PROOF_TYPE: &'static str = "Ed25519Signature2020";

    /// A suite that signs as `verification_method` with `key_pair` (and
    /// can also verify).
    pub fn signer(key_pair: Ed25519KeyPair, verification_method: impl Into<String>) -> Self {
        Self {
            signer: Some((key_pair, verification_method.into())),
        }
    }

    /// A verify-only suite.
    pub fn verifier() -> Self {
        Self { signer: None }
    }

    /// A verification method document for `public_key`, suitable for
    /// registering with a document loader.
    pub fn verification_method_document(
        id: &str,
        controller: &str,
        public_key: &Ed25519PublicKey,
    ) -> Value {
        let mut doc = Map::new();
        doc.insert("id".into(), Value::String(id.to_string()));
        doc.insert(
            "type".into(),
            Value::String(ED25519_VERIFICATION_KEY_2020.to_string()),
        );
        doc.insert("controller".into(), Value::String(controller.to_string()));
        doc.insert("publicKeyHex".into(), Value::String(public_key.to_hex()));
        Value::Object(doc)
    }
}

#[async_trait]
impl SignatureSuite for Ed25519Signature2020 {
    fn proof_type(&self) -> &str {
        Self::PROOF_TYPE
    }

    fn verification_method(&self) -> Option<&str> {
        self.signer.as_ref().map(|(_, vm)| vm.as_str())
    }

    async fn sign(&self, document: &CanonicalBytes, options: &ProofOptions) -> Result<Proof, SuiteError> {
        let (key_pair, verification_method) = self
            .signer
            .as_ref()
            .ok_or_else(|| SuiteError::MissingKey(Self::PROOF_TYPE.to_string()))?;

        let created = options.created.unwrap_or_else(Timestamp::now);
        let mut proof = Proof {
            proof_type: Self::PROOF_TYPE.to_string(),
            created: Some(created.to_iso8601()),
            verification_method: verification_method.clone(),
            proof_purpose: options.proof_purpose.clone(),
            challenge: options.challenge.clone(),
            domain: options.domain.clone(),
            proof_value: None,
            extra: Map::new(),
        };

        let input = SigningInput::new(&proof.options_bytes()?, document);
        proof.proof_value = Some(key_pair.sign(&input).to_hex());
        Ok(proof)
    }

    async fn verify(
        &self,
        document: &CanonicalBytes,
        proof: &Proof,
        verification_method: &Value,
    ) -> SuiteVerification {
        match check(document, proof, verification_method) {
            Ok(()) => SuiteVerification::valid(),
            Err(reason) => SuiteVerification::invalid(reason),
        }
    }
}

fn check(document: &CanonicalBytes, proof: &Proof, method: &Value) -> Result<(), String> {
    if let Some(method_type) = method.get("type").and_then(Value::as_str) {
        if method_type != ED25519_VERIFICATION_KEY_2020 {
            return Err(format!("unsupported verification method type \"{method_type}\""));
        }
    }
    let key_hex = method
        .get("publicKeyHex")
        .and_then(Value::as_str)
        .ok_or("verification method has no \"publicKeyHex\"")?;
    let public_key = Ed25519PublicKey::from_hex(key_hex).map_err(|e| e.to_string())?;

    let value = proof.proof_value.as_deref().ok_or("proof has no \"proofValue\"")?;
    let signature = Ed25519Signature::from_hex(value).map_err(|e| e.to_string())?;

    let options = proof.options_bytes().map_err(|e| e.to_string())?;
    let input = SigningInput::new(&options, document);
    verify_with_public_key(&input, &signature, &public_key).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc() -> CanonicalBytes {
        CanonicalBytes::new(&json!({"credentialSubject": {"id": "did:ex:s"}})).unwrap()
    }

    fn suite() -> (Ed25519Signature2020, Value) {
        let kp = Ed25519KeyPair::from_seed(&[7u8; 32]);
        let method = Ed25519Signature2020::verification_method_document(
            "did:ex:issuer#key-1",
            "did:ex:issuer",
            &kp.public_key(),
        );
        (Ed25519Signature2020::signer(kp, "did:ex:issuer#key-1"), method)
    }

    #[tokio::test]
    async fn sign_then_verify() {
        let (suite, method) = suite();
        let proof = suite
            .sign(&doc(), &ProofOptions::new("assertionMethod"))
            .await
            .unwrap();
        assert_eq!(proof.proof_type, "Ed25519Signature2020");
        assert_eq!(proof.verification_method, "did:ex:issuer#key-1");
        assert_eq!(proof.proof_value.as_ref().map(String::len), Some(128));
        assert!(suite.verify(&doc(), &proof, &method).await.verified);
        assert!(Ed25519Signature2020::verifier().verify(&doc(), &proof, &method).await.verified);
    }

    #[tokio::test]
    async fn verifier_cannot_sign() {
        let err = Ed25519Signature2020::verifier()
            .sign(&doc(), &ProofOptions::new("assertionMethod"))
            .await
            .unwrap_err();
        assert!(matches!(err, SuiteError::MissingKey(_)));
        assert!(Ed25519Signature2020::verifier().verification_method().is_none());
    }

    #[tokio::test]
    async fn challenge_is_bound_into_signature() {
        let (suite, method) = suite();
        let mut options = ProofOptions::new("authentication");
        options.challenge = Some("c-1".into());
        let mut proof = suite.sign(&doc(), &options).await.unwrap();
        assert_eq!(proof.challenge.as_deref(), Some("c-1"));
        proof.challenge = Some("c-2".into());
        assert!(!suite.verify(&doc(), &proof, &method).await.verified);
    }

    #[tokio::test]
    async fn explicit_created_is_used() {
        let (suite, _) = suite();
        let mut options = ProofOptions::new("assertionMethod");
        options.created = Some(Timestamp::parse("2026-01-15T12:00:00Z").unwrap());
        let proof = suite.sign(&doc(), &options).await.unwrap();
        assert_eq!(proof.created.as_deref(), Some("2026-01-15T12:00:00Z"));
    }

    #[tokio::test]
    async fn missing_material_is_reported() {
        let (suite, method) = suite();
        let mut proof = suite
            .sign(&doc(), &ProofOptions::new("assertionMethod"))
            .await
            .unwrap();

        let result = suite.verify(&doc(), &proof, &json!({"id": "k"})).await;
        assert!(result.error.unwrap().contains("publicKeyHex"));

        let mut wrong_type = method.clone();
        wrong_type["type"] = json!("JsonWebKey2020");
        assert!(!suite.verify(&doc(), &proof, &wrong_type).await.verified);

        proof.proof_value = None;
        let result = suite.verify(&doc(), &proof, &method).await;
        assert!(result.error.unwrap().contains("proofValue"));
    }
}
