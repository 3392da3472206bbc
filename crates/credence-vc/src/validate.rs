//! # Structural Validator
//!
//! Pure, synchronous shape checks run before any cryptography. Each check
//! returns the first violated rule, in this order:
//!
//! 1. `@context` present, first entry is the VC v1 context.
//! 2. `type` includes `VerifiableCredential` / `VerifiablePresentation`.
//! 3. `credentialSubject` present and non-empty (credentials).
//! 4. `issuer` is a URL or an object with a URL `id` (credentials).
//! 5. `issuanceDate` / `expirationDate` match [`VC_DATETIME_PATTERN`].
//! 6. `credentialStatus` carries `id` and `type`.
//! 7. Every `evidence` entry carries `type`.
//!
//! Presentations additionally check `holder` and that every
//! `verifiableCredential` entry is an object. Nested credential contents
//! are not validated here; each is validated when it is verified.
//!
//! [`VC_DATETIME_PATTERN`]: credence_core::VC_DATETIME_PATTERN

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use credence_core::{is_vc_datetime, Timestamp};

use crate::document::{
    id_of, Credential, Presentation, CREDENTIALS_V1_CONTEXT, VERIFIABLE_CREDENTIAL_TYPE,
    VERIFIABLE_PRESENTATION_TYPE,
};
use crate::error::ValidationError;

/// Check that `credential` is shaped like a Verifiable Credential.
///
/// Time-independent: `expirationDate` is checked for form only. Use
/// [`check_credential_at`] to also reject expired credentials.
pub fn check_credential(credential: &Credential) -> Result<(), ValidationError> {
    let doc = credential.as_map();
    check_context(doc)?;
    check_type(doc, VERIFIABLE_CREDENTIAL_TYPE)?;
    check_credential_subject(doc)?;
    check_issuer(doc)?;
    check_date(doc, "issuanceDate")?;
    check_date(doc, "expirationDate")?;
    check_credential_status(doc)?;
    check_evidence(doc)
}

/// [`check_credential`], then reject the credential if its
/// `expirationDate` precedes `now`.
pub fn check_credential_at(credential: &Credential, now: &Timestamp) -> Result<(), ValidationError> {
    check_credential(credential)?;

    let Some(raw) = credential.get("expirationDate").and_then(Value::as_str) else {
        return Ok(());
    };
    // Lexically valid but not a real instant (e.g. February 30th).
    let expiration = Timestamp::parse(raw).map_err(|_| ValidationError::InvalidDate {
        field: "expirationDate",
        value: Value::String(raw.to_string()).to_string(),
    })?;
    if expiration < *now {
        return Err(ValidationError::Expired {
            expiration_date: raw.to_string(),
            now: now.to_iso8601(),
        });
    }
    Ok(())
}

/// Check that `presentation` is shaped like a Verifiable Presentation.
pub fn check_presentation(presentation: &Presentation) -> Result<(), ValidationError> {
    let doc = presentation.as_map();
    check_context(doc)?;
    check_type(doc, VERIFIABLE_PRESENTATION_TYPE)?;

    if let Some(holder) = doc.get("holder") {
        if id_of(Some(holder)).is_none() {
            return Err(ValidationError::InvalidHolder);
        }
    }

    for (index, vc) in presentation.verifiable_credentials().into_iter().enumerate() {
        if !vc.is_object() {
            return Err(ValidationError::InvalidVerifiableCredential(index));
        }
    }
    Ok(())
}

fn check_context(doc: &Map<String, Value>) -> Result<(), ValidationError> {
    let first = match doc.get("@context") {
        None | Some(Value::Null) => return Err(ValidationError::MissingContext),
        Some(Value::Array(entries)) => entries.first(),
        Some(single) => Some(single),
    };
    match first {
        Some(Value::String(s)) if s == CREDENTIALS_V1_CONTEXT => Ok(()),
        other => Err(ValidationError::InvalidFirstContext {
            expected: CREDENTIALS_V1_CONTEXT,
            found: other.map_or_else(|| "nothing".to_string(), Value::to_string),
        }),
    }
}

fn check_type(doc: &Map<String, Value>, required: &'static str) -> Result<(), ValidationError> {
    let found = match doc.get("type") {
        None | Some(Value::Null) => return Err(ValidationError::MissingType),
        Some(Value::String(s)) => s == required,
        Some(Value::Array(types)) => types.iter().any(|t| t.as_str() == Some(required)),
        Some(_) => false,
    };
    if found {
        Ok(())
    } else {
        Err(ValidationError::MissingRequiredType(required))
    }
}

fn check_credential_subject(doc: &Map<String, Value>) -> Result<(), ValidationError> {
    let non_empty_object = |v: &Value| v.as_object().is_some_and(|o| !o.is_empty());
    let ok = match doc.get("credentialSubject") {
        None | Some(Value::Null) => return Err(ValidationError::MissingCredentialSubject),
        Some(Value::Array(subjects)) => {
            !subjects.is_empty() && subjects.iter().all(non_empty_object)
        }
        Some(subject) => non_empty_object(subject),
    };
    if ok {
        Ok(())
    } else {
        Err(ValidationError::InvalidCredentialSubject)
    }
}

fn check_issuer(doc: &Map<String, Value>) -> Result<(), ValidationError> {
    match doc.get("issuer") {
        None | Some(Value::Null) => Err(ValidationError::MissingIssuer),
        issuer if is_url(id_of(issuer)) => Ok(()),
        _ => Err(ValidationError::InvalidIssuer),
    }
}

fn check_date(doc: &Map<String, Value>, field: &'static str) -> Result<(), ValidationError> {
    match doc.get(field) {
        None => Ok(()),
        Some(Value::String(s)) if is_vc_datetime(s) => Ok(()),
        Some(other) => Err(ValidationError::InvalidDate {
            field,
            value: other.to_string(),
        }),
    }
}

fn check_credential_status(doc: &Map<String, Value>) -> Result<(), ValidationError> {
    let Some(status) = doc.get("credentialStatus") else {
        return Ok(());
    };
    for member in ["id", "type"] {
        if status.get(member).map_or(true, Value::is_null) {
            return Err(ValidationError::InvalidCredentialStatus(member));
        }
    }
    Ok(())
}

fn check_evidence(doc: &Map<String, Value>) -> Result<(), ValidationError> {
    let entries: Vec<&Value> = match doc.get("evidence") {
        None => return Ok(()),
        Some(Value::Array(items)) => items.iter().collect(),
        Some(single) => vec![single],
    };
    match entries
        .iter()
        .position(|e| e.get("type").map_or(true, Value::is_null))
    {
        Some(index) => Err(ValidationError::InvalidEvidence(index)),
        None => Ok(()),
    }
}

/// A scheme followed by a non-empty, whitespace-free remainder. Admits DIDs
/// and `urn:` identifiers as well as `https:` URLs.
static URL_RE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.-]*:\S+$").ok());

fn is_url(id: Option<&str>) -> bool {
    match (id, URL_RE.as_ref()) {
        (Some(s), Some(re)) => re.is_match(s),
        _ => false,
    }
}
