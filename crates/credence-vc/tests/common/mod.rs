//! Shared fixtures: one issuer, one holder, a loader that knows both
//! controller documents, and a suite wrapper that counts calls.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use credence_core::CanonicalBytes;
use credence_crypto::Ed25519KeyPair;
use credence_vc::{
    document::CREDENTIALS_V1_CONTEXT, issue, Credential, DocumentLoader, Ed25519Signature2020,
    IssueOptions, Proof, ProofOptions, SignatureSuite, StaticDocumentLoader, SuiteError, SuiteSet,
    SuiteVerification, VerifyCredentialOptions,
};

pub const ISSUER: &str = "did:example:issuer";
pub const ISSUER_KEY: &str = "did:example:issuer#key-1";
pub const HOLDER: &str = "did:example:holder";
pub const HOLDER_KEY: &str = "did:example:holder#key-1";

pub fn issuer_key() -> Ed25519KeyPair {
    Ed25519KeyPair::from_seed(&[11u8; 32])
}

pub fn holder_key() -> Ed25519KeyPair {
    Ed25519KeyPair::from_seed(&[22u8; 32])
}

fn controller(id: &str, method_id: &str, key: &Ed25519KeyPair) -> Value {
    let method = Ed25519Signature2020::verification_method_document(method_id, id, &key.public_key());
    json!({
        "id": id,
        "verificationMethod": [method],
        "assertionMethod": [method_id],
        "authentication": [method_id]
    })
}

pub fn loader() -> Arc<dyn DocumentLoader> {
    Arc::new(
        StaticDocumentLoader::with_defaults()
            .with_document(ISSUER, controller(ISSUER, ISSUER_KEY, &issuer_key()))
            .with_document(HOLDER, controller(HOLDER, HOLDER_KEY, &holder_key())),
    )
}

pub fn issuer_suite() -> Arc<dyn SignatureSuite> {
    Arc::new(Ed25519Signature2020::signer(issuer_key(), ISSUER_KEY))
}

pub fn holder_suite() -> Arc<dyn SignatureSuite> {
    Arc::new(Ed25519Signature2020::signer(holder_key(), HOLDER_KEY))
}

pub fn verifier_suites() -> SuiteSet {
    SuiteSet::single(Arc::new(Ed25519Signature2020::verifier()))
}

pub fn credential(subject: &str) -> Credential {
    Credential::try_from(json!({
        "@context": [CREDENTIALS_V1_CONTEXT],
        "id": format!("urn:uuid:{subject}"),
        "type": ["VerifiableCredential", "AlumniCredential"],
        "issuer": ISSUER,
        "issuanceDate": "2026-01-01T00:00:00Z",
        "credentialSubject": {"id": format!("did:example:{subject}"), "alumniOf": "Example University"}
    }))
    .unwrap()
}

pub async fn issued(subject: &str) -> Credential {
    issue(
        &credential(subject),
        &IssueOptions::new(issuer_suite()).with_loader(loader()),
    )
    .await
    .unwrap()
}

pub fn verify_options() -> VerifyCredentialOptions {
    VerifyCredentialOptions::new(verifier_suites()).with_loader(loader())
}

/// Replace a top-level member of a signed document, keeping its proof.
pub fn tampered(credential: &Credential, key: &str, value: Value) -> Credential {
    let mut map = credential.clone().into_map();
    map.insert(key.to_string(), value);
    Credential::from_map(map)
}

/// Delegates to an inner suite and counts every call.
pub struct CountingSuite {
    inner: Arc<dyn SignatureSuite>,
    pub signs: AtomicUsize,
    pub verifies: AtomicUsize,
}

impl CountingSuite {
    pub fn new(inner: Arc<dyn SignatureSuite>) -> Arc<Self> {
        Arc::new(Self {
            inner,
            signs: AtomicUsize::new(0),
            verifies: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.signs.load(Ordering::SeqCst) + self.verifies.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SignatureSuite for CountingSuite {
    fn proof_type(&self) -> &str {
        self.inner.proof_type()
    }

    fn verification_method(&self) -> Option<&str> {
        self.inner.verification_method()
    }

    async fn sign(&self, document: &CanonicalBytes, options: &ProofOptions) -> Result<Proof, SuiteError> {
        self.signs.fetch_add(1, Ordering::SeqCst);
        self.inner.sign(document, options).await
    }

    async fn verify(&self, document: &CanonicalBytes, proof: &Proof, method: &Value) -> SuiteVerification {
        self.verifies.fetch_add(1, Ordering::SeqCst);
        self.inner.verify(document, proof, method).await
    }
}

/// A suite whose verification never completes.
pub struct StalledSuite;

#[async_trait]
impl SignatureSuite for StalledSuite {
    fn proof_type(&self) -> &str {
        Ed25519Signature2020::PROOF_TYPE
    }

    fn verification_method(&self) -> Option<&str> {
        None
    }

    async fn sign(&self, _: &CanonicalBytes, _: &ProofOptions) -> Result<Proof, SuiteError> {
        Err(SuiteError::Other("stalled".into()))
    }

    async fn verify(&self, _: &CanonicalBytes, _: &Proof, _: &Value) -> SuiteVerification {
        std::future::pending::<SuiteVerification>().await
    }
}
