//! # Error Taxonomy
//!
//! Two families with different delivery:
//!
//! - [`VcError`] is returned as `Err` from the entry points. It covers API
//!   misuse (missing challenge, suite without key material), failures of
//!   issuance and signing where there is no partial result to report, and
//!   cancellation.
//! - [`CheckError`] never escapes verification as `Err`. Each one records a
//!   sub-check that did not pass, and a verdict carries all of them in a
//!   [`VerificationErrors`] collector.

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::loader::LoaderError;
use crate::suite::SuiteError;

/// Errors returned from `issue`, `sign_presentation`, `create_presentation`,
/// `verify_credential` and `verify`.
#[derive(Error, Debug)]
pub enum VcError {
    /// A required option is missing or inconsistent.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The document failed structural validation.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The signature suite could not produce a proof.
    #[error("signing failed: {0}")]
    Signing(#[from] SuiteError),

    /// Canonicalization of the document failed.
    #[error("canonicalization failed: {0}")]
    Canonicalization(#[from] credence_core::CanonicalizationError),

    /// A context or verification method could not be loaded.
    #[error("resolution failed: {0}")]
    Resolution(#[from] LoaderError),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The caller cancelled the operation.
    #[error("operation cancelled")]
    Cancelled,
}

/// The first structural rule a credential or presentation violates.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The document is not a JSON object.
    #[error("document must be a JSON object")]
    NotAnObject,

    /// `@context` is absent.
    #[error("\"@context\" property is required")]
    MissingContext,

    /// The first `@context` entry is not the VC core context.
    #[error("first \"@context\" entry must be \"{expected}\", got {found}")]
    InvalidFirstContext {
        /// The required context URI.
        expected: &'static str,
        /// What the document carries instead.
        found: String,
    },

    /// `type` is absent.
    #[error("\"type\" property is required")]
    MissingType,

    /// `type` does not include the required type name.
    #[error("\"type\" must include \"{0}\"")]
    MissingRequiredType(&'static str),

    /// `credentialSubject` is absent.
    #[error("\"credentialSubject\" property is required")]
    MissingCredentialSubject,

    /// `credentialSubject` is empty or not an object.
    #[error("\"credentialSubject\" must be a non-empty object or array of objects")]
    InvalidCredentialSubject,

    /// `issuer` is absent.
    #[error("\"issuer\" property is required")]
    MissingIssuer,

    /// `issuer` is neither a string nor an object with a string `id`.
    #[error("\"issuer\" must be a URL or an object containing an \"id\" property")]
    InvalidIssuer,

    /// A date property does not match the strict timestamp pattern.
    #[error("\"{field}\" must be a valid date: {value}")]
    InvalidDate {
        /// `issuanceDate` or `expirationDate`.
        field: &'static str,
        /// The rejected value, rendered as JSON.
        value: String,
    },

    /// The credential expired before the reference time.
    #[error("credential has expired (expirationDate {expiration_date}, now {now})")]
    Expired {
        /// The credential's `expirationDate`.
        expiration_date: String,
        /// The reference time it was checked against.
        now: String,
    },

    /// `credentialStatus` lacks `id` or `type`.
    #[error("\"credentialStatus\" must include \"{0}\"")]
    InvalidCredentialStatus(&'static str),

    /// An `evidence` entry lacks `type`.
    #[error("\"evidence\" entry {0} must include \"type\"")]
    InvalidEvidence(usize),

    /// `holder` is neither a string nor an object with a string `id`.
    #[error("\"holder\" must be a string or an object containing an \"id\" property")]
    InvalidHolder,

    /// A `verifiableCredential` entry is not a JSON object.
    #[error("\"verifiableCredential\" entry {0} must be an object")]
    InvalidVerifiableCredential(usize),
}

/// A sub-check that did not pass. Folded into a verdict, never returned
/// as `Err`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CheckError {
    /// Structural validation failed; no proof was checked.
    #[error("{0}")]
    Validation(ValidationError),

    /// The document carries no proof.
    #[error("no proof found on document")]
    MissingProof,

    /// No configured suite handles the proof's type.
    #[error("no suite supports proof type \"{proof_type}\"")]
    UnsupportedSuite {
        /// The proof's `type`.
        proof_type: String,
    },

    /// The proof is malformed or its signature does not verify.
    #[error("proof verification failed: {0}")]
    ProofVerification(String),

    /// The proof's purpose is not authorized.
    #[error("proof purpose check failed: {0}")]
    Purpose(String),

    /// The status check reported revoked, suspended or failed.
    #[error("credential status check failed: {0}")]
    Status(String),

    /// `credentialStatus` is present but no status checker was supplied.
    #[error("\"credentialStatus\" is present but no status checker was configured")]
    StatusNotConfigured,

    /// A nested credential of a presentation did not verify.
    #[error("credential {index} failed verification: {errors}")]
    Credential {
        /// Position within `verifiableCredential`.
        index: usize,
        /// Everything that failed for that credential.
        errors: VerificationErrors,
    },
}

impl CheckError {
    /// Stable machine-readable name of the variant.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Validation(_) => "ValidationError",
            Self::MissingProof => "MissingProofError",
            Self::UnsupportedSuite { .. } => "UnsupportedSuiteError",
            Self::ProofVerification(_) => "ProofVerificationError",
            Self::Purpose(_) => "PurposeError",
            Self::Status(_) => "StatusError",
            Self::StatusNotConfigured => "ConfigurationError",
            Self::Credential { .. } => "CredentialError",
        }
    }
}

impl Serialize for CheckError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let nested = matches!(self, Self::Credential { .. });
        let mut s = serializer.serialize_struct("CheckError", if nested { 4 } else { 2 })?;
        s.serialize_field("name", self.name())?;
        s.serialize_field("message", &self.to_string())?;
        if let Self::Credential { index, errors } = self {
            s.serialize_field("index", index)?;
            s.serialize_field("errors", errors)?;
        }
        s.end()
    }
}

/// Ordered collector of every [`CheckError`] a verification encountered.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct VerificationErrors(Vec<CheckError>);

impl VerificationErrors {
    /// An empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one failure.
    pub fn push(&mut self, error: CheckError) {
        self.0.push(error);
    }

    /// Returns true if nothing failed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of recorded failures.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate recorded failures in the order they were found.
    pub fn iter(&self) -> std::slice::Iter<'_, CheckError> {
        self.0.iter()
    }

    /// Returns true if any recorded failure matches `pred`, searching into
    /// nested credential failures.
    pub fn any(&self, pred: &dyn Fn(&CheckError) -> bool) -> bool {
        self.0.iter().any(|e| match e {
            CheckError::Credential { errors, .. } => pred(e) || errors.any(pred),
            other => pred(other),
        })
    }

    /// `None` when empty, otherwise the collector itself.
    pub fn into_option(self) -> Option<Self> {
        if self.is_empty() {
            None
        } else {
            Some(self)
        }
    }
}

impl Extend<CheckError> for VerificationErrors {
    fn extend<I: IntoIterator<Item = CheckError>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl FromIterator<CheckError> for VerificationErrors {
    fn from_iter<I: IntoIterator<Item = CheckError>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for VerificationErrors {
    type Item = CheckError;
    type IntoIter = std::vec::IntoIter<CheckError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a VerificationErrors {
    type Item = &'a CheckError;
    type IntoIter = std::slice::Iter<'a, CheckError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl std::fmt::Display for VerificationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, e) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{e}")?;
        }
        Ok(())
    }
}
