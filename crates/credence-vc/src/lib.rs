//! # credence-vc — Verifiable Credentials and Presentations
//!
//! The protocol core. Five entry points:
//!
//! - [`issue`]: sign a credential (`assertionMethod`).
//! - [`create_presentation`]: wrap credentials in an unsigned presentation.
//! - [`sign_presentation`]: sign a presentation (`authentication`).
//! - [`verify_credential`]: verify a credential into a [`CredentialVerification`].
//! - [`verify`]: verify a presentation and its credentials into a
//!   [`PresentationVerification`].
//!
//! Around them:
//!
//! - **Validation** (`validate.rs`): side-effect-free structural gate run
//!   before any I/O or cryptography.
//! - **Purposes** (`purpose.rs`): whether a proof's key was authorized for
//!   the role the proof claims.
//! - **Suites** (`suite.rs`, `ed25519_suite.rs`): pluggable signature
//!   schemes and the ordered [`SuiteSet`] that dispatches on proof type.
//! - **Loader** (`loader.rs`): the document loader contract and an
//!   in-memory default.
//!
//! ## Security Invariant
//!
//! Suites sign and verify [`credence_core::CanonicalBytes`] produced by
//! [`loader::canonicalize`] only. A proof counts only when both its
//! signature and its purpose check pass.
//!
//! ## Crate Policy
//!
//! - Depends on `credence-core` and `credence-crypto` internally.
//! - Inputs are never mutated. Issuance and signing return new documents.
//! - Verification reports content failures in the verdict. `Err` means
//!   misconfiguration or cancellation.

#![recursion_limit = "256"]

mod cancel;
mod contexts;
pub mod document;
pub mod ed25519_suite;
pub mod error;
pub mod issue;
pub mod loader;
pub mod proof;
pub mod purpose;
pub mod suite;
pub mod validate;
pub mod verify;

pub use document::{Credential, Presentation};
pub use ed25519_suite::Ed25519Signature2020;
pub use error::{CheckError, ValidationError, VcError, VerificationErrors};
pub use issue::{
    create_presentation, issue, sign_presentation, IssueOptions, PresentationOptions,
    SignPresentationOptions,
};
pub use loader::{DocumentLoader, LoaderError, RemoteDocument, StaticDocumentLoader};
pub use proof::{Proof, PurposeTerm};
pub use purpose::{
    AuthenticationProofPurpose, CredentialIssuancePurpose, ProofPurposeHandler, Purpose,
    PurposeContext, PurposeResult,
};
pub use suite::{ProofOptions, SignatureSuite, SuiteError, SuiteSet, SuiteVerification};
pub use validate::{check_credential, check_credential_at, check_presentation};
pub use verify::{
    verify, verify_credential, CredentialVerification, PresentationProofVerification,
    PresentationVerification, ProofOutcome, StatusChecker, StatusFn, StatusResult,
    VerifyCredentialOptions, VerifyPresentationOptions,
};
