//! # Verification
//!
//! [`verify_credential`] and [`verify`] share one engine. Per document the
//! engine moves strictly forward:
//!
//! ```text
//! Unchecked -> StructurallyInvalid (verdict)
//!           -> StructurallyValid -> ProofsEvaluated -> [StatusChecked] -> verdict
//! ```
//!
//! Proofs of one document are evaluated concurrently, and so are the
//! nested credentials of a presentation. Results are reassembled in input
//! order. A proof counts only when both its signature and its purpose
//! check pass, and a document verifies when at least one proof counts.
//!
//! Content that does not verify never produces an `Err`: the verdict
//! carries `verified = false` plus every [`CheckError`] found. `Err` is
//! reserved for caller misconfiguration and cancellation.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use serde::Serialize;
use serde_json::{Map, Value};
use tokio_util::sync::CancellationToken;

use credence_core::{CanonicalBytes, Timestamp};

use crate::cancel::with_cancellation;
use crate::document::{Credential, Presentation};
use crate::error::{CheckError, VcError, ValidationError, VerificationErrors};
use crate::loader::{canonicalize, DocumentLoader, StaticDocumentLoader};
use crate::proof::{proof_entries, Proof};
use crate::purpose::{
    authentication_or_default, CredentialIssuancePurpose, Purpose, PurposeContext, PurposeResult,
};
use crate::suite::SuiteSet;
use crate::validate::{check_credential_at, check_presentation};

// ---------------------------------------------------------------------------
// Status checking
// ---------------------------------------------------------------------------

/// Outcome of a revocation or suspension check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusResult {
    /// Whether the credential is in good standing.
    pub verified: bool,
    /// Why it is not.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StatusResult {
    /// Good standing.
    pub fn valid() -> Self {
        Self {
            verified: true,
            error: None,
        }
    }

    /// Revoked, suspended, or the check itself failed.
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self {
            verified: false,
            error: Some(reason.into()),
        }
    }
}

/// Checks the status of credentials that declare `credentialStatus`.
#[async_trait]
pub trait StatusChecker: Send + Sync {
    /// Report the status of `credential`.
    async fn check_status(&self, credential: &Credential) -> StatusResult;
}

/// Adapts a synchronous closure into a [`StatusChecker`].
pub struct StatusFn<F>(pub F);

#[async_trait]
impl<F> StatusChecker for StatusFn<F>
where
    F: Fn(&Credential) -> StatusResult + Send + Sync,
{
    async fn check_status(&self, credential: &Credential) -> StatusResult {
        (self.0)(credential)
    }
}

// ---------------------------------------------------------------------------
// Verdicts
// ---------------------------------------------------------------------------

/// Outcome for one proof, in the document's proof order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofOutcome {
    /// Position within the document's proof sequence.
    pub index: usize,
    /// Signature and purpose both passed.
    pub verified: bool,
    /// The parsed proof, absent when it was malformed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof: Option<Proof>,
    /// The purpose check, absent when it was never reached.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purpose_result: Option<PurposeResult>,
    /// Everything that failed for this proof.
    #[serde(skip_serializing_if = "VerificationErrors::is_empty")]
    pub errors: VerificationErrors,
}

impl ProofOutcome {
    fn failed(index: usize, proof: Option<Proof>, error: CheckError) -> Self {
        Self {
            index,
            verified: false,
            proof,
            purpose_result: None,
            errors: std::iter::once(error).collect(),
        }
    }
}

/// Verdict for one credential.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialVerification {
    /// Structure, at least one proof, and status all passed.
    pub verified: bool,
    /// One entry per proof, in document order.
    pub results: Vec<ProofOutcome>,
    /// The status check, when one ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_result: Option<StatusResult>,
    /// Every failure, absent when `verified`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<VerificationErrors>,
}

impl CredentialVerification {
    fn failed(error: CheckError) -> Self {
        Self {
            verified: false,
            results: Vec::new(),
            status_result: None,
            error: Some(std::iter::once(error).collect()),
        }
    }
}

/// Verdict for a presentation's own proof.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentationProofVerification {
    /// The presentation's proof passed, or none was required.
    pub verified: bool,
    /// One entry per proof, in document order.
    pub results: Vec<ProofOutcome>,
    /// Every failure, absent when `verified`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<VerificationErrors>,
}

impl PresentationProofVerification {
    fn unsigned() -> Self {
        Self {
            verified: true,
            results: Vec::new(),
            error: None,
        }
    }

    fn failed(error: CheckError) -> Self {
        Self {
            verified: false,
            results: Vec::new(),
            error: Some(std::iter::once(error).collect()),
        }
    }
}

/// Verdict for a presentation and everything it carries.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentationVerification {
    /// The presentation proof and every nested credential passed.
    pub verified: bool,
    /// The presentation's own proof.
    pub presentation_result: PresentationProofVerification,
    /// One verdict per nested credential, in `verifiableCredential` order.
    pub credential_results: Vec<CredentialVerification>,
    /// Every failure, absent when `verified`. Nested credential failures
    /// appear as [`CheckError::Credential`] with their position.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<VerificationErrors>,
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Options for [`verify_credential`].
#[derive(Clone)]
pub struct VerifyCredentialOptions {
    /// Acceptable suites, first match wins. Must not be empty.
    pub suites: SuiteSet,
    /// Proof purpose. Default: [`CredentialIssuancePurpose`].
    pub purpose: Option<Purpose>,
    /// Loader for contexts, verification methods and controllers.
    /// Default: [`StaticDocumentLoader::with_defaults`].
    pub loader: Arc<dyn DocumentLoader>,
    /// Required when a credential declares `credentialStatus`.
    pub status_checker: Option<Arc<dyn StatusChecker>>,
    /// Reference time for `expirationDate`. Default: now.
    pub now: Option<Timestamp>,
    /// Aborts the call with [`VcError::Cancelled`]. Default: none.
    pub cancel: Option<CancellationToken>,
}

impl VerifyCredentialOptions {
    /// Options with every optional field at its default.
    pub fn new(suites: impl Into<SuiteSet>) -> Self {
        Self {
            suites: suites.into(),
            purpose: None,
            loader: Arc::new(StaticDocumentLoader::with_defaults()),
            status_checker: None,
            now: None,
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

    /// Check `credentialStatus` with `checker`.
    pub fn with_status_checker(mut self, checker: Arc<dyn StatusChecker>) -> Self {
        self.status_checker = Some(checker);
        self
    }

    /// Pin the reference time.
    pub fn with_now(mut self, now: Timestamp) -> Self {
        self.now = Some(now);
        self
    }

    /// Abort when `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

/// Options for [`verify`].
#[derive(Clone)]
pub struct VerifyPresentationOptions {
    /// Acceptable suites for the presentation and its credentials.
    pub suites: SuiteSet,
    /// Skip the presentation proof. Default: `false`.
    pub unsigned_presentation: bool,
    /// Purpose for the presentation proof. Default: an `authentication`
    /// purpose built from `challenge`, `domain` and `controller`.
    pub presentation_purpose: Option<Purpose>,
    /// Purpose for nested credential proofs. Default:
    /// [`CredentialIssuancePurpose`].
    pub credential_purpose: Option<Purpose>,
    /// Required for a signed presentation unless `presentation_purpose`
    /// is set.
    pub challenge: Option<String>,
    /// Expected domain.
    pub domain: Option<String>,
    /// Expected controller of the presentation key. Default: `holder`.
    pub controller: Option<String>,
    /// Loader. Default: [`StaticDocumentLoader::with_defaults`].
    pub loader: Arc<dyn DocumentLoader>,
    /// Required when a nested credential declares `credentialStatus`.
    pub status_checker: Option<Arc<dyn StatusChecker>>,
    /// Reference time for `expirationDate`. Default: now.
    pub now: Option<Timestamp>,
    /// Aborts the call with [`VcError::Cancelled`]. Default: none.
    pub cancel: Option<CancellationToken>,
}

impl VerifyPresentationOptions {
    /// Options with every optional field at its default.
    pub fn new(suites: impl Into<SuiteSet>) -> Self {
        Self {
            suites: suites.into(),
            unsigned_presentation: false,
            presentation_purpose: None,
            credential_purpose: None,
            challenge: None,
            domain: None,
            controller: None,
            loader: Arc::new(StaticDocumentLoader::with_defaults()),
            status_checker: None,
            now: None,
            cancel: None,
        }
    }

    /// Accept a presentation without its own proof.
    pub fn unsigned(mut self) -> Self {
        self.unsigned_presentation = true;
        self
    }

    /// Expect `challenge` in the presentation proof.
    pub fn with_challenge(mut self, challenge: impl Into<String>) -> Self {
        self.challenge = Some(challenge.into());
        self
    }

    /// Expect `domain` in the presentation proof.
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Expect the presentation key to be controlled by `controller`.
    pub fn with_controller(mut self, controller: impl Into<String>) -> Self {
        self.controller = Some(controller.into());
        self
    }

    /// Use a custom purpose for the presentation proof.
    pub fn with_presentation_purpose(mut self, purpose: Purpose) -> Self {
        self.presentation_purpose = Some(purpose);
        self
    }

    /// Use a custom purpose for nested credential proofs.
    pub fn with_credential_purpose(mut self, purpose: Purpose) -> Self {
        self.credential_purpose = Some(purpose);
        self
    }

    /// Use a custom document loader.
    pub fn with_loader(mut self, loader: Arc<dyn DocumentLoader>) -> Self {
        self.loader = loader;
        self
    }

    /// Check `credentialStatus` with `checker`.
    pub fn with_status_checker(mut self, checker: Arc<dyn StatusChecker>) -> Self {
        self.status_checker = Some(checker);
        self
    }

    /// Pin the reference time.
    pub fn with_now(mut self, now: Timestamp) -> Self {
        self.now = Some(now);
        self
    }

    /// Abort when `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Verify a credential.
///
/// # Errors
///
/// - `VcError::Configuration` if no suite is configured.
/// - `VcError::Cancelled` if the token fires first.
///
/// Everything else is reported in the returned verdict.
pub async fn verify_credential(
    credential: &Credential,
    options: &VerifyCredentialOptions,
) -> Result<CredentialVerification, VcError> {
    require_suites(&options.suites)?;
    let purpose = options
        .purpose
        .clone()
        .unwrap_or_else(|| Purpose::Issuance(CredentialIssuancePurpose::new()));
    let now = options.now.unwrap_or_else(Timestamp::now);

    with_cancellation(options.cancel.as_ref(), async {
        let engine = Engine {
            suites: &options.suites,
            loader: options.loader.as_ref(),
            status_checker: options.status_checker.as_deref(),
            now,
        };
        Ok(engine.credential(credential, &purpose).await)
    })
    .await
}

/// Verify a presentation and every credential it carries.
///
/// # Errors
///
/// - `VcError::Configuration` if no suite is configured, or the
///   presentation is expected to be signed and there is neither a
///   challenge nor a custom presentation purpose.
/// - `VcError::Cancelled` if the token fires first.
///
/// Everything else is reported in the returned verdict.
pub async fn verify(
    presentation: &Presentation,
    options: &VerifyPresentationOptions,
) -> Result<PresentationVerification, VcError> {
    require_suites(&options.suites)?;
    let presentation_purpose = if options.unsigned_presentation {
        None
    } else {
        Some(authentication_or_default(
            options.presentation_purpose.as_ref(),
            options.challenge.as_deref(),
            options.domain.as_deref(),
            options.controller.as_deref(),
        )?)
    };
    let credential_purpose = options
        .credential_purpose
        .clone()
        .unwrap_or_else(|| Purpose::Issuance(CredentialIssuancePurpose::new()));
    let now = options.now.unwrap_or_else(Timestamp::now);

    with_cancellation(options.cancel.as_ref(), async {
        let engine = Engine {
            suites: &options.suites,
            loader: options.loader.as_ref(),
            status_checker: options.status_checker.as_deref(),
            now,
        };
        Ok(engine
            .presentation(presentation, presentation_purpose.as_ref(), &credential_purpose)
            .await)
    })
    .await
}

fn require_suites(suites: &SuiteSet) -> Result<(), VcError> {
    if suites.is_empty() {
        return Err(VcError::Configuration(
            "at least one signature suite is required".to_string(),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

struct Engine<'a> {
    suites: &'a SuiteSet,
    loader: &'a dyn DocumentLoader,
    status_checker: Option<&'a dyn StatusChecker>,
    now: Timestamp,
}

impl Engine<'_> {
    async fn credential(&self, credential: &Credential, purpose: &Purpose) -> CredentialVerification {
        if let Err(e) = check_credential_at(credential, &self.now) {
            tracing::warn!(error = %e, "credential is structurally invalid");
            return CredentialVerification::failed(CheckError::Validation(e));
        }
        tracing::debug!(id = credential.id().unwrap_or("-"), "credential structurally valid");

        let mut errors = VerificationErrors::new();
        let results = if credential.has_proof() {
            self.proofs(credential.as_map(), purpose).await
        } else {
            errors.push(CheckError::MissingProof);
            Vec::new()
        };
        let any_proof = results.iter().any(|r| r.verified);
        if !any_proof {
            errors.extend(results.iter().flat_map(|r| r.errors.iter().cloned()));
        }
        tracing::debug!(proofs = results.len(), any_proof, "proofs evaluated");

        // Status is checked even when no proof passed so the verdict
        // reports every failure.
        let status_result = match (credential.get("credentialStatus"), self.status_checker) {
            (None, _) => None,
            (Some(_), None) => {
                errors.push(CheckError::StatusNotConfigured);
                None
            }
            (Some(_), Some(checker)) => {
                let status = checker.check_status(credential).await;
                if !status.verified {
                    let reason = status.error.clone().unwrap_or_else(|| "status check failed".into());
                    tracing::warn!(reason = %reason, "credential status check failed");
                    errors.push(CheckError::Status(reason));
                }
                Some(status)
            }
        };

        let verified = errors.is_empty();
        CredentialVerification {
            verified,
            results,
            status_result,
            error: errors.into_option(),
        }
    }

    async fn presentation(
        &self,
        presentation: &Presentation,
        purpose: Option<&Purpose>,
        credential_purpose: &Purpose,
    ) -> PresentationVerification {
        if let Err(e) = check_presentation(presentation) {
            tracing::warn!(error = %e, "presentation is structurally invalid");
            let presentation_result = PresentationProofVerification::failed(CheckError::Validation(e));
            return PresentationVerification {
                verified: false,
                error: presentation_result.error.clone(),
                presentation_result,
                credential_results: Vec::new(),
            };
        }

        let presentation_check = async {
            match purpose {
                None => PresentationProofVerification::unsigned(),
                Some(_) if !presentation.has_proof() => {
                    PresentationProofVerification::failed(CheckError::MissingProof)
                }
                Some(purpose) => {
                    let results = self.proofs(presentation.as_map(), purpose).await;
                    let verified = results.iter().any(|r| r.verified);
                    let error = if verified {
                        None
                    } else {
                        results
                            .iter()
                            .flat_map(|r| r.errors.iter().cloned())
                            .collect::<VerificationErrors>()
                            .into_option()
                    };
                    PresentationProofVerification {
                        verified,
                        results,
                        error,
                    }
                }
            }
        };

        let entries = presentation.verifiable_credentials();
        let credential_checks = join_all(
            entries
                .iter()
                .map(|entry| self.nested_credential(entry, credential_purpose)),
        );
        let (presentation_result, credential_results) =
            futures::join!(presentation_check, credential_checks);

        let mut errors = presentation_result.error.clone().unwrap_or_default();
        for (index, result) in credential_results.iter().enumerate() {
            if let Some(nested) = &result.error {
                tracing::warn!(index, "nested credential failed verification");
                errors.push(CheckError::Credential {
                    index,
                    errors: nested.clone(),
                });
            }
        }

        let verified =
            presentation_result.verified && credential_results.iter().all(|r| r.verified);
        PresentationVerification {
            verified,
            presentation_result,
            credential_results,
            error: if verified { None } else { errors.into_option() },
        }
    }

    async fn nested_credential(&self, entry: &Value, purpose: &Purpose) -> CredentialVerification {
        match Credential::try_from(entry.clone()) {
            Ok(credential) => self.credential(&credential, purpose).await,
            Err(_) => CredentialVerification::failed(CheckError::Validation(ValidationError::NotAnObject)),
        }
    }

    /// Evaluate every proof on `document`. The document is canonicalized
    /// once and shared by all proofs.
    async fn proofs(&self, document: &Map<String, Value>, purpose: &Purpose) -> Vec<ProofOutcome> {
        let canonical = canonicalize(document, self.loader)
            .await
            .map_err(|e| e.to_string());
        let entries = proof_entries(document);
        join_all(
            entries
                .into_iter()
                .enumerate()
                .map(|(index, entry)| self.proof(index, entry, document, canonical.as_ref(), purpose)),
        )
        .await
    }

    async fn proof(
        &self,
        index: usize,
        entry: &Value,
        document: &Map<String, Value>,
        canonical: Result<&CanonicalBytes, &String>,
        purpose: &Purpose,
    ) -> ProofOutcome {
        let proof = match Proof::from_value(entry) {
            Ok(proof) => proof,
            Err(e) => {
                return ProofOutcome::failed(
                    index,
                    None,
                    CheckError::ProofVerification(format!("malformed proof: {e}")),
                )
            }
        };

        let Some(suite) = self.suites.find(&proof.proof_type) else {
            tracing::warn!(index, proof_type = %proof.proof_type, "no suite for proof type");
            let proof_type = proof.proof_type.clone();
            return ProofOutcome::failed(index, Some(proof), CheckError::UnsupportedSuite { proof_type });
        };

        let canonical = match canonical {
            Ok(bytes) => bytes,
            Err(reason) => {
                let error = CheckError::ProofVerification(reason.clone());
                return ProofOutcome::failed(index, Some(proof), error);
            }
        };

        let method = match self.loader.load(&proof.verification_method).await {
            Ok(remote) => remote.document,
            Err(e) => {
                let error = CheckError::ProofVerification(format!(
                    "could not load verification method: {e}"
                ));
                return ProofOutcome::failed(index, Some(proof), error);
            }
        };

        let ctx = PurposeContext {
            document,
            verification_method: &method,
            loader: self.loader,
        };
        let (signature, purpose_result) = futures::join!(
            suite.verify(canonical, &proof, &method),
            purpose.validate(&proof, ctx)
        );

        let mut errors = VerificationErrors::new();
        if !signature.verified {
            let reason = signature.error.unwrap_or_else(|| "invalid signature".into());
            tracing::warn!(index, proof_type = %proof.proof_type, reason = %reason, "signature check failed");
            errors.push(CheckError::ProofVerification(reason));
        }
        if !purpose_result.valid {
            let reason = purpose_result
                .error
                .clone()
                .unwrap_or_else(|| "purpose not authorized".into());
            tracing::warn!(index, purpose = %purpose.term(), reason = %reason, "purpose check failed");
            errors.push(CheckError::Purpose(reason));
        }

        ProofOutcome {
            index,
            verified: errors.is_empty(),
            proof: Some(proof),
            purpose_result: Some(purpose_result),
            errors,
        }
    }
}
