//! # Issuance and Presentation Signing
//!
//! - [`issue`] validates a bare credential, fills `issuanceDate` when it is
//!   absent, and returns a copy with a new `assertionMethod` proof.
//! - [`create_presentation`] wraps credentials in an unsigned presentation.
//! - [`sign_presentation`] returns a copy of a presentation with a new
//!   `authentication` proof bound to a challenge.
//!
//! Inputs are never mutated. A document that already carries proofs keeps
//! them; the new proof is appended.

use std::sync::Arc;

use serde_json::{Map, Value};
use tokio_util::sync::CancellationToken;

use credence_core::Timestamp;

use crate::cancel::with_cancellation;
use crate::document::{
    Credential, Presentation, CREDENTIALS_V1_CONTEXT, VERIFIABLE_PRESENTATION_TYPE,
};
use crate::error::VcError;
use crate::loader::{canonicalize, DocumentLoader, StaticDocumentLoader};
use crate::purpose::{authentication_or_default, CredentialIssuancePurpose, Purpose};
use crate::suite::SignatureSuite;
use crate::validate::{check_credential, check_presentation};

/// Options for [`issue`].
#[derive(Clone)]
pub struct IssueOptions {
    /// Suite holding the issuer's key. Required.
    pub suite: Arc<dyn SignatureSuite>,
    /// Proof purpose. Default: [`CredentialIssuancePurpose`].
    pub purpose: Option<Purpose>,
    /// Loader for `@context` resolution. Default:
    /// [`StaticDocumentLoader::with_defaults`].
    pub loader: Arc<dyn DocumentLoader>,
    /// Forwarded to the suite as [`ProofOptions::compact`](crate::suite::ProofOptions::compact).
    /// Default: `false`.
    pub compact_proof: bool,
    /// Proof creation time and filled-in `issuanceDate`. Default: now.
    pub created: Option<Timestamp>,
    /// Aborts the call with [`VcError::Cancelled`]. Default: none.
    pub cancel: Option<CancellationToken>,
}

impl IssueOptions {
    /// Options with every optional field at its default.
    pub fn new(suite: Arc<dyn SignatureSuite>) -> Self {
        Self {
            suite,
            purpose: None,
            loader: Arc::new(StaticDocumentLoader::with_defaults()),
            compact_proof: false,
            created: None,
            cancel: None,
        }
    }

    /// Use a custom proof purpose.
    pub fn with_purpose(mut self, purpose: Purpose) -> Self {
        self.purpose = Some(purpose);
        self
    }

    /// Use a custom document loader.
    pub fn with_loader(mut self, loader: Arc<dyn DocumentLoader>) -> Self {
        self.loader = loader;
        self
    }

    /// Ask the suite for a compacted proof.
    pub fn with_compact_proof(mut self, compact: bool) -> Self {
        self.compact_proof = compact;
        self
    }

    /// Pin the creation time.
    pub fn with_created(mut self, created: Timestamp) -> Self {
        self.created = Some(created);
        self
    }

    /// Abort when `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

/// Sign `credential`, returning a new credential with the proof attached.
///
/// # Errors
///
/// - `VcError::Configuration` if the suite holds no signing key.
/// - `VcError::Validation` if the credential is malformed.
/// - `VcError::Resolution` if an `@context` cannot be loaded.
/// - `VcError::Signing` if the suite fails.
/// - `VcError::Cancelled` if the token fires first.
pub async fn issue(credential: &Credential, options: &IssueOptions) -> Result<Credential, VcError> {
    let verification_method = signing_method(options.suite.as_ref())?;
    with_cancellation(options.cancel.as_ref(), async {
        check_credential(credential)?;

        let purpose = options
            .purpose
            .clone()
            .unwrap_or_else(|| Purpose::Issuance(CredentialIssuancePurpose::new()));

        let mut unsigned = credential.clone();
        if unsigned.get("issuanceDate").is_none() {
            let issued = options.created.unwrap_or_else(Timestamp::now);
            unsigned.set("issuanceDate", Value::String(issued.to_iso8601()));
        }

        let canonical = canonicalize(unsigned.as_map(), options.loader.as_ref()).await?;
        let mut proof_options = purpose.proof_options();
        proof_options.created = options.created;
        proof_options.compact = options.compact_proof;

        let proof = options.suite.sign(&canonical, &proof_options).await?;
        tracing::info!(
            proof_type = %proof.proof_type,
            verification_method = %verification_method,
            purpose = %proof.proof_purpose,
            "credential issued"
        );
        Ok::<_, VcError>(unsigned.with_proof(serde_json::to_value(&proof)?))
    })
    .await
}

/// Options for [`create_presentation`]. Every field is optional.
#[derive(Debug, Clone, Default)]
pub struct PresentationOptions {
    /// One credential object or an array of them, in presentation order.
    pub verifiable_credential: Option<Value>,
    /// Presentation `id`.
    pub id: Option<String>,
    /// Presentation `holder`.
    pub holder: Option<String>,
}

impl PresentationOptions {
    /// An empty presentation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one credential after any already added.
    pub fn with_credential(mut self, credential: Credential) -> Self {
        let added = Value::from(credential);
        self.verifiable_credential = Some(match self.verifiable_credential.take() {
            None => added,
            Some(Value::Array(mut items)) => {
                items.push(added);
                Value::Array(items)
            }
            Some(existing) => Value::Array(vec![existing, added]),
        });
        self
    }

    /// Set `verifiableCredential` verbatim (a single object or an array).
    pub fn with_verifiable_credential(mut self, value: Value) -> Self {
        self.verifiable_credential = Some(value);
        self
    }

    /// Set the presentation `id`.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the presentation `holder`.
    pub fn with_holder(mut self, holder: impl Into<String>) -> Self {
        self.holder = Some(holder.into());
        self
    }
}

/// Wrap credentials into an unsigned presentation. No I/O.
///
/// Credential contents are not validated here; that happens when the
/// presentation is verified.
///
/// # Errors
///
/// - `VcError::Configuration` if a `verifiableCredential` entry is not an
///   object.
pub fn create_presentation(options: PresentationOptions) -> Result<Presentation, VcError> {
    let mut map = Map::new();
    map.insert(
        "@context".to_string(),
        Value::Array(vec![Value::String(CREDENTIALS_V1_CONTEXT.to_string())]),
    );
    map.insert(
        "type".to_string(),
        Value::Array(vec![Value::String(VERIFIABLE_PRESENTATION_TYPE.to_string())]),
    );

    if let Some(vc) = options.verifiable_credential {
        let bad = match &vc {
            Value::Array(items) => items.iter().position(|item| !item.is_object()),
            single => (!single.is_object()).then_some(0),
        };
        if let Some(index) = bad {
            return Err(VcError::Configuration(format!(
                "verifiableCredential entry {index} must be an object"
            )));
        }
        map.insert("verifiableCredential".to_string(), vc);
    }
    if let Some(id) = options.id {
        map.insert("id".to_string(), Value::String(id));
    }
    if let Some(holder) = options.holder {
        map.insert("holder".to_string(), Value::String(holder));
    }

    let presentation = Presentation::from_map(map);
    check_presentation(&presentation)?;
    Ok(presentation)
}

/// Options for [`sign_presentation`].
#[derive(Clone)]
pub struct SignPresentationOptions {
    /// Suite holding the holder's key. Required.
    pub suite: Arc<dyn SignatureSuite>,
    /// Proof purpose. Default: an `authentication` purpose built from
    /// `challenge` and `domain`.
    pub purpose: Option<Purpose>,
    /// Required unless `purpose` is set.
    pub challenge: Option<String>,
    /// Optional domain for the default purpose.
    pub domain: Option<String>,
    /// Loader for `@context` resolution. Default:
    /// [`StaticDocumentLoader::with_defaults`].
    pub loader: Arc<dyn DocumentLoader>,
    /// Forwarded to the suite. Default: `false`.
    pub compact_proof: bool,
    /// Proof creation time. Default: now.
    pub created: Option<Timestamp>,
    /// Aborts the call with [`VcError::Cancelled`]. Default: none.
    pub cancel: Option<CancellationToken>,
}

impl SignPresentationOptions {
    /// Options with every optional field at its default. A challenge (or a
    /// custom purpose) must still be supplied before signing.
    pub fn new(suite: Arc<dyn SignatureSuite>) -> Self {
        Self {
            suite,
            purpose: None,
            challenge: None,
            domain: None,
            loader: Arc::new(StaticDocumentLoader::with_defaults()),
            compact_proof: false,
            created: None,
            cancel: None,
        }
    }

    /// Bind proofs to `challenge`.
    pub fn with_challenge(mut self, challenge: impl Into<String>) -> Self {
        self.challenge = Some(challenge.into());
        self
    }

    /// Bind proofs to `domain`.
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Use a custom proof purpose instead of the default.
    pub fn with_purpose(mut self, purpose: Purpose) -> Self {
        self.purpose = Some(purpose);
        self
    }

    /// Use a custom document loader.
    pub fn with_loader(mut self, loader: Arc<dyn DocumentLoader>) -> Self {
        self.loader = loader;
        self
    }

    /// Ask the suite for a compacted proof.
    pub fn with_compact_proof(mut self, compact: bool) -> Self {
        self.compact_proof = compact;
        self
    }

    /// Pin the creation time.
    pub fn with_created(mut self, created: Timestamp) -> Self {
        self.created = Some(created);
        self
    }

    /// Abort when `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

/// Sign `presentation`, returning a new presentation with the proof
/// attached.
///
/// # Errors
///
/// - `VcError::Configuration` if there is neither a challenge nor a custom
///   purpose, or the suite holds no signing key. Raised before any I/O.
/// - `VcError::Validation` if the presentation is malformed.
/// - `VcError::Resolution`, `VcError::Signing`, `VcError::Cancelled` as for
///   [`issue`].
pub async fn sign_presentation(
    presentation: &Presentation,
    options: &SignPresentationOptions,
) -> Result<Presentation, VcError> {
    let purpose = authentication_or_default(
        options.purpose.as_ref(),
        options.challenge.as_deref(),
        options.domain.as_deref(),
        None,
    )?;
    let verification_method = signing_method(options.suite.as_ref())?;

    with_cancellation(options.cancel.as_ref(), async {
        check_presentation(presentation)?;

        let canonical = canonicalize(presentation.as_map(), options.loader.as_ref()).await?;
        let mut proof_options = purpose.proof_options();
        proof_options.created = options.created;
        proof_options.compact = options.compact_proof;

        let proof = options.suite.sign(&canonical, &proof_options).await?;
        tracing::info!(
            proof_type = %proof.proof_type,
            verification_method = %verification_method,
            purpose = %proof.proof_purpose,
            "presentation signed"
        );
        Ok::<_, VcError>(presentation.with_proof(serde_json::to_value(&proof)?))
    })
    .await
}

fn signing_method(suite: &dyn SignatureSuite) -> Result<String, VcError> {
    suite.verification_method().map(str::to_string).ok_or_else(|| {
        VcError::Configuration(format!(
            "suite \"{}\" has no key to sign with",
            suite.proof_type()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use credence_crypto::Ed25519KeyPair;
    use serde_json::json;

    use crate::ed25519_suite::Ed25519Signature2020;

    fn suite() -> Arc<dyn SignatureSuite> {
        Arc::new(Ed25519Signature2020::signer(
            Ed25519KeyPair::from_seed(&[1u8; 32]),
            "did:example:issuer#key-1",
        ))
    }

    fn credential() -> Credential {
        Credential::try_from(json!({
            "@context": [CREDENTIALS_V1_CONTEXT],
            "type": ["VerifiableCredential"],
            "issuer": "did:example:issuer",
            "credentialSubject": {"id": "did:example:subject", "degree": "BSc"}
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn issue_attaches_proof_and_fills_issuance_date() {
        let created = Timestamp::parse("2026-01-15T12:00:00Z").unwrap();
        let options = IssueOptions::new(suite()).with_created(created);
        let input = credential();
        let signed = issue(&input, &options).await.unwrap();

        assert_eq!(signed.get("issuanceDate"), Some(&json!("2026-01-15T12:00:00Z")));
        let proofs = signed.proofs();
        assert_eq!(proofs.len(), 1);
        assert_eq!(proofs[0]["proofPurpose"], "assertionMethod");
        assert_eq!(proofs[0]["created"], "2026-01-15T12:00:00Z");
        // The input is untouched.
        assert!(!input.has_proof());
        assert!(input.get("issuanceDate").is_none());
    }

    #[tokio::test]
    async fn issue_keeps_existing_issuance_date() {
        let mut input = credential();
        input.set("issuanceDate", json!("2010-01-01T19:23:24Z"));
        let signed = issue(&input, &IssueOptions::new(suite())).await.unwrap();
        assert_eq!(signed.get("issuanceDate"), Some(&json!("2010-01-01T19:23:24Z")));
    }

    #[tokio::test]
    async fn issuing_twice_appends() {
        let options = IssueOptions::new(suite());
        let once = issue(&credential(), &options).await.unwrap();
        let twice = issue(&once, &options).await.unwrap();
        assert_eq!(twice.proofs().len(), 2);
        assert_eq!(twice.proofs()[0], once.proofs()[0]);
    }

    #[tokio::test]
    async fn issue_rejects_malformed_credential() {
        let mut input = credential();
        input.set("issuanceDate", json!("2020-13-40"));
        let err = issue(&input, &IssueOptions::new(suite())).await.unwrap_err();
        assert!(matches!(err, VcError::Validation(_)));
    }

    #[tokio::test]
    async fn issue_with_verify_only_suite_is_configuration_error() {
        let options = IssueOptions::new(Arc::new(Ed25519Signature2020::verifier()));
        let err = issue(&credential(), &options).await.unwrap_err();
        assert!(matches!(err, VcError::Configuration(_)));
    }

    #[tokio::test]
    async fn issue_with_unknown_context_is_resolution_error() {
        let mut input = credential();
        input.set(
            "@context",
            json!([CREDENTIALS_V1_CONTEXT, "https://example.com/unknown/v1"]),
        );
        let err = issue(&input, &IssueOptions::new(suite())).await.unwrap_err();
        assert!(matches!(err, VcError::Resolution(_)));
    }

    #[tokio::test]
    async fn issue_honours_cancellation() {
        let token = CancellationToken::new();
        token.cancel();
        let options = IssueOptions::new(suite()).with_cancellation(token);
        assert!(matches!(
            issue(&credential(), &options).await,
            Err(VcError::Cancelled)
        ));
    }

    #[test]
    fn create_presentation_shape() {
        let p = create_presentation(
            PresentationOptions::new()
                .with_credential(credential())
                .with_credential(credential())
                .with_id("urn:uuid:p1")
                .with_holder("did:example:holder"),
        )
        .unwrap();
        assert_eq!(p.get("type"), Some(&json!(["VerifiablePresentation"])));
        assert_eq!(p.get("@context"), Some(&json!([CREDENTIALS_V1_CONTEXT])));
        assert_eq!(p.verifiable_credentials().len(), 2);
        assert_eq!(p.id(), Some("urn:uuid:p1"));
        assert_eq!(p.holder_id(), Some("did:example:holder"));
        assert!(!p.has_proof());
    }

    #[test]
    fn create_presentation_keeps_single_credential_as_object() {
        let p = create_presentation(PresentationOptions::new().with_credential(credential())).unwrap();
        assert!(p.get("verifiableCredential").unwrap().is_object());
    }

    #[test]
    fn create_presentation_without_credentials() {
        let p = create_presentation(PresentationOptions::new()).unwrap();
        assert!(p.get("verifiableCredential").is_none());
    }

    #[test]
    fn create_presentation_accepts_any_holder_string() {
        let p = create_presentation(PresentationOptions::new().with_holder("alice")).unwrap();
        assert_eq!(p.holder_id(), Some("alice"));
    }

    #[test]
    fn create_presentation_rejects_non_object_entries() {
        let err = create_presentation(
            PresentationOptions::new().with_verifiable_credential(json!([{"id": "a"}, "eyJhbGciOi"])),
        )
        .unwrap_err();
        assert!(matches!(err, VcError::Configuration(msg) if msg.contains("entry 1")));
    }

    #[tokio::test]
    async fn sign_presentation_requires_challenge() {
        let p = create_presentation(PresentationOptions::new()).unwrap();
        let err = sign_presentation(&p, &SignPresentationOptions::new(suite()))
            .await
            .unwrap_err();
        assert!(matches!(err, VcError::Configuration(_)));
    }

    #[tokio::test]
    async fn sign_presentation_binds_challenge_and_domain() {
        let p = create_presentation(PresentationOptions::new().with_holder("did:example:issuer")).unwrap();
        let options = SignPresentationOptions::new(suite())
            .with_challenge("nonce-1")
            .with_domain("verifier.example");
        let signed = sign_presentation(&p, &options).await.unwrap();
        let proof = signed.proofs()[0].clone();
        assert_eq!(proof["proofPurpose"], "authentication");
        assert_eq!(proof["challenge"], "nonce-1");
        assert_eq!(proof["domain"], "verifier.example");
    }
}
