//! # Proof Purpose Policy
//!
//! A purpose decides whether a proof's key was authorized for the role the
//! proof claims. Two defaults are bundled, and callers can plug in their
//! own through [`ProofPurposeHandler`]:
//!
//! - [`CredentialIssuancePurpose`]: `assertionMethod`; the key's controller
//!   must be the credential's issuer.
//! - [`AuthenticationProofPurpose`]: `authentication`; the proof must carry
//!   the expected challenge (and domain, when one is expected), and the
//!   key's controller must be the expected controller or, failing that,
//!   the presentation's holder.
//!
//! Both defaults share the controller check: resolve the verification
//! method's `controller` through the document loader and require the
//! controller document to list the method under the purpose term.
//!
//! A failed purpose check is reported in a [`PurposeResult`], never as an
//! `Err`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};

use credence_core::Timestamp;

use crate::document::id_of;
use crate::error::VcError;
use crate::loader::DocumentLoader;
use crate::proof::{Proof, PurposeTerm};
use crate::suite::ProofOptions;

/// Outcome of a purpose check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PurposeResult {
    /// Whether the purpose is authorized.
    pub valid: bool,
    /// The resolved controller, when resolution got that far.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controller: Option<String>,
    /// Why the purpose is not authorized.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PurposeResult {
    /// An authorized purpose for `controller`.
    pub fn valid(controller: Option<String>) -> Self {
        Self {
            valid: true,
            controller,
            error: None,
        }
    }

    /// An unauthorized purpose.
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self {
            valid: false,
            controller: None,
            error: Some(reason.into()),
        }
    }
}

/// What a purpose sees when validating one proof.
#[derive(Clone, Copy)]
pub struct PurposeContext<'a> {
    /// The secured document (credential or presentation) as a JSON object.
    pub document: &'a Map<String, Value>,
    /// The verification method resolved from `proof.verificationMethod`.
    pub verification_method: &'a Value,
    /// Loader for controller documents.
    pub loader: &'a dyn DocumentLoader,
}

/// A caller-defined proof purpose.
#[async_trait]
pub trait ProofPurposeHandler: Send + Sync {
    /// The purpose term recorded in `proofPurpose`.
    fn term(&self) -> &str;

    /// Add purpose-specific members to the options before signing.
    fn update_options(&self, _options: &mut ProofOptions) {}

    /// Decide whether `proof` is authorized.
    async fn validate(&self, proof: &Proof, ctx: PurposeContext<'_>) -> PurposeResult;
}

/// A proof purpose: one of the bundled defaults or a caller-defined one.
#[derive(Clone)]
pub enum Purpose {
    /// Credential issuance (`assertionMethod`).
    Issuance(CredentialIssuancePurpose),
    /// Presentation authentication (`authentication`).
    Authentication(AuthenticationProofPurpose),
    /// Anything else.
    Custom(Arc<dyn ProofPurposeHandler>),
}

impl Purpose {
    /// The purpose term.
    pub fn term(&self) -> &str {
        match self {
            Self::Issuance(_) => PurposeTerm::AssertionMethod.as_str(),
            Self::Authentication(_) => PurposeTerm::Authentication.as_str(),
            Self::Custom(handler) => handler.term(),
        }
    }

    /// Options for signing under this purpose.
    pub fn proof_options(&self) -> ProofOptions {
        let mut options = ProofOptions::new(self.term());
        match self {
            Self::Issuance(_) => {}
            Self::Authentication(auth) => {
                options.challenge = Some(auth.challenge.clone());
                options.domain = auth.domain.clone();
            }
            Self::Custom(handler) => handler.update_options(&mut options),
        }
        options
    }

    /// Check one proof.
    pub async fn validate(&self, proof: &Proof, ctx: PurposeContext<'_>) -> PurposeResult {
        match self {
            Self::Issuance(p) => p.validate(proof, ctx).await,
            Self::Authentication(p) => p.validate(proof, ctx).await,
            Self::Custom(handler) => handler.validate(proof, ctx).await,
        }
    }
}

impl std::fmt::Debug for Purpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Issuance(p) => f.debug_tuple("Issuance").field(p).finish(),
            Self::Authentication(p) => f.debug_tuple("Authentication").field(p).finish(),
            Self::Custom(h) => f.debug_tuple("Custom").field(&h.term()).finish(),
        }
    }
}

/// The purpose for signing or verifying a presentation: the caller's, or
/// an [`AuthenticationProofPurpose`] built from `challenge`, `domain` and
/// `controller`.
///
/// # Errors
///
/// `VcError::Configuration` if there is neither a custom purpose nor a
/// challenge.
pub(crate) fn authentication_or_default(
    custom: Option<&Purpose>,
    challenge: Option<&str>,
    domain: Option<&str>,
    controller: Option<&str>,
) -> Result<Purpose, VcError> {
    if let Some(purpose) = custom {
        return Ok(purpose.clone());
    }
    let challenge = challenge.ok_or_else(|| {
        VcError::Configuration(
            "a \"challenge\" is required when no custom presentation purpose is supplied"
                .to_string(),
        )
    })?;
    let mut purpose = AuthenticationProofPurpose::new(challenge);
    if let Some(domain) = domain {
        purpose = purpose.with_domain(domain);
    }
    if let Some(controller) = controller {
        purpose = purpose.with_controller(controller);
    }
    Ok(Purpose::Authentication(purpose))
}

/// Optional `created` window shared by the bundled purposes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct TimeWindow {
    date: Option<Timestamp>,
    max_delta: Option<Duration>,
}

impl TimeWindow {
    fn check(&self, proof: &Proof) -> Result<(), String> {
        let Some(max_delta) = self.max_delta else {
            return Ok(());
        };
        let reference = self.date.unwrap_or_else(Timestamp::now);
        let created = proof
            .created
            .as_deref()
            .ok_or("proof has no \"created\" timestamp")?;
        let created = Timestamp::parse(created).map_err(|e| e.to_string())?;
        if created.abs_diff_secs(&reference) > max_delta.as_secs() {
            return Err(format!(
                "proof created {} is outside the allowed window around {}",
                created, reference
            ));
        }
        Ok(())
    }
}

/// `assertionMethod` purpose for credentials.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialIssuancePurpose {
    window: TimeWindow,
}

impl CredentialIssuancePurpose {
    /// The default issuance purpose.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reference time for the `created` window (default: now).
    pub fn with_date(mut self, date: Timestamp) -> Self {
        self.window.date = Some(date);
        self
    }

    /// Reject proofs whose `created` is further than `delta` from the
    /// reference time.
    pub fn with_max_timestamp_delta(mut self, delta: Duration) -> Self {
        self.window.max_delta = Some(delta);
        self
    }

    async fn validate(&self, proof: &Proof, ctx: PurposeContext<'_>) -> PurposeResult {
        let controller = match validate_controller(
            PurposeTerm::AssertionMethod,
            &self.window,
            proof,
            &ctx,
        )
        .await
        {
            Ok(controller) => controller,
            Err(reason) => return PurposeResult::invalid(reason),
        };

        match id_of(ctx.document.get("issuer")) {
            Some(issuer) if issuer == controller => PurposeResult::valid(Some(controller)),
            Some(issuer) => PurposeResult::invalid(format!(
                "credential issuer \"{issuer}\" does not match the verification method controller \"{controller}\""
            )),
            None => PurposeResult::invalid("credential has no issuer to match against"),
        }
    }
}

/// `authentication` purpose for presentations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticationProofPurpose {
    challenge: String,
    domain: Option<String>,
    controller: Option<String>,
    window: TimeWindow,
}

impl AuthenticationProofPurpose {
    /// Expect proofs bound to `challenge`.
    pub fn new(challenge: impl Into<String>) -> Self {
        Self {
            challenge: challenge.into(),
            domain: None,
            controller: None,
            window: TimeWindow::default(),
        }
    }

    /// Also expect proofs bound to `domain`.
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Require this controller instead of the presentation's holder.
    pub fn with_controller(mut self, controller: impl Into<String>) -> Self {
        self.controller = Some(controller.into());
        self
    }

    /// Reference time for the `created` window (default: now).
    pub fn with_date(mut self, date: Timestamp) -> Self {
        self.window.date = Some(date);
        self
    }

    /// Reject proofs whose `created` is further than `delta` from the
    /// reference time.
    pub fn with_max_timestamp_delta(mut self, delta: Duration) -> Self {
        self.window.max_delta = Some(delta);
        self
    }

    /// The expected challenge.
    pub fn challenge(&self) -> &str {
        &self.challenge
    }

    /// The expected domain, if any.
    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    async fn validate(&self, proof: &Proof, ctx: PurposeContext<'_>) -> PurposeResult {
        if proof.challenge.as_deref() != Some(self.challenge.as_str()) {
            return PurposeResult::invalid("the challenge is not as expected");
        }
        if let Some(domain) = &self.domain {
            if proof.domain.as_deref() != Some(domain.as_str()) {
                return PurposeResult::invalid("the domain is not as expected");
            }
        }

        let controller = match validate_controller(
            PurposeTerm::Authentication,
            &self.window,
            proof,
            &ctx,
        )
        .await
        {
            Ok(controller) => controller,
            Err(reason) => return PurposeResult::invalid(reason),
        };

        let expected = self
            .controller
            .as_deref()
            .or_else(|| id_of(ctx.document.get("holder")));
        match expected {
            Some(expected) if expected != controller => PurposeResult::invalid(format!(
                "verification method controller \"{controller}\" is not \"{expected}\""
            )),
            _ => PurposeResult::valid(Some(controller)),
        }
    }
}

/// The controller check shared by both bundled purposes. Returns the
/// controller's id.
async fn validate_controller(
    term: PurposeTerm,
    window: &TimeWindow,
    proof: &Proof,
    ctx: &PurposeContext<'_>,
) -> Result<String, String> {
    if proof.proof_purpose != term.as_str() {
        return Err(format!(
            "proof purpose \"{}\" does not match the expected \"{}\"",
            proof.proof_purpose, term
        ));
    }
    window.check(proof)?;

    let method_id = proof.verification_method.as_str();
    if let Some(claimed) = ctx.verification_method.get("id").and_then(Value::as_str) {
        if resolve_id(claimed, method_id) != method_id {
            return Err(format!(
                "verification method document claims id \"{claimed}\" but was loaded from \"{method_id}\""
            ));
        }
    }
    let controller_id = id_of(ctx.verification_method.get("controller"))
        .ok_or_else(|| format!("verification method \"{method_id}\" has no controller"))?;

    let controller = ctx
        .loader
        .load(controller_id)
        .await
        .map_err(|e| format!("could not load controller \"{controller_id}\": {e}"))?
        .document;
    if let Some(claimed) = controller.get("id").and_then(Value::as_str) {
        if claimed != controller_id {
            return Err(format!(
                "controller document claims id \"{claimed}\" but was loaded from \"{controller_id}\""
            ));
        }
    }

    let authorized = match controller.get(term.as_str()) {
        Some(Value::Array(entries)) => entries
            .iter()
            .any(|entry| lists_method(entry, controller_id, method_id)),
        Some(single) => lists_method(single, controller_id, method_id),
        None => false,
    };
    if !authorized {
        return Err(format!(
            "verification method \"{method_id}\" is not authorized by controller \"{controller_id}\" for \"{term}\""
        ));
    }
    Ok(controller_id.to_string())
}

/// A controller document entry names a method either by string or as an
/// embedded object with an `id`. Relative `#fragment` ids resolve against
/// the controller.
fn lists_method(entry: &Value, controller_id: &str, method_id: &str) -> bool {
    id_of(Some(entry)).is_some_and(|id| resolve_id(id, controller_id) == method_id)
}

/// Resolve a relative `#fragment` id against `base`, dropping any fragment
/// `base` already carries.
fn resolve_id(id: &str, base: &str) -> String {
    if !id.starts_with('#') {
        return id.to_string();
    }
    let base = base.split_once('#').map_or(base, |(base, _)| base);
    format!("{base}{id}")
}
