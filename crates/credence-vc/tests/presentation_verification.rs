//! # Presentation Building, Signing and Verification
//!
//! Covers unsigned presentations, challenge/domain binding, and
//! per-credential results correlated by position.

mod common;

use std::sync::atomic::Ordering;

use serde_json::json;

use common::*;
use credence_vc::{
    create_presentation, sign_presentation, verify, CheckError, Credential, Presentation,
    PresentationOptions, SignPresentationOptions, VcError, VerifyPresentationOptions,
};

fn presentation_of(credentials: Vec<Credential>) -> Presentation {
    let options = credentials
        .into_iter()
        .fold(PresentationOptions::new().with_holder(HOLDER), |o, c| o.with_credential(c));
    create_presentation(options).unwrap()
}

fn unsigned_options() -> VerifyPresentationOptions {
    VerifyPresentationOptions::new(verifier_suites())
        .with_loader(loader())
        .unsigned()
}

#[tokio::test]
async fn unsigned_presentation_with_valid_credentials() {
    let p = presentation_of(vec![issued("alice").await, issued("bob").await]);
    let result = verify(&p, &unsigned_options()).await.unwrap();
    assert!(result.verified, "{:?}", result.error);
    assert!(result.presentation_result.verified);
    assert!(result.presentation_result.results.is_empty());
    assert_eq!(result.credential_results.len(), 2);
    assert!(result.error.is_none());
}

#[tokio::test]
async fn tampered_credential_is_reported_at_its_position() {
    const N: usize = 4;
    const K: usize = 2;
    let mut credentials = Vec::new();
    for i in 0..N {
        let cred = issued(&format!("subject-{i}")).await;
        credentials.push(if i == K {
            tampered(&cred, "issuanceDate", json!("2026-06-01T00:00:00Z"))
        } else {
            cred
        });
    }
    let p = presentation_of(credentials);
    let result = verify(&p, &unsigned_options()).await.unwrap();

    assert!(!result.verified);
    assert_eq!(result.credential_results.len(), N);
    for (i, r) in result.credential_results.iter().enumerate() {
        assert_eq!(r.verified, i != K, "credential {i}");
    }
    let errors = result.error.unwrap();
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors.iter().next(), Some(CheckError::Credential { index: K, .. })));
}

#[tokio::test]
async fn signed_presentation_round_trip() {
    let p = presentation_of(vec![issued("alice").await]);
    let signed = sign_presentation(
        &p,
        &SignPresentationOptions::new(holder_suite())
            .with_loader(loader())
            .with_challenge("nonce-42")
            .with_domain("verifier.example"),
    )
    .await
    .unwrap();
    assert!(!p.has_proof());

    let options = VerifyPresentationOptions::new(verifier_suites())
        .with_loader(loader())
        .with_challenge("nonce-42")
        .with_domain("verifier.example");
    let result = verify(&signed, &options).await.unwrap();
    assert!(result.verified, "{:?}", result.error);
    assert!(result.presentation_result.verified);
    let purpose = result.presentation_result.results[0].purpose_result.as_ref().unwrap();
    assert_eq!(purpose.controller.as_deref(), Some(HOLDER));

    let replayed = VerifyPresentationOptions::new(verifier_suites())
        .with_loader(loader())
        .with_challenge("nonce-43");
    let result = verify(&signed, &replayed).await.unwrap();
    assert!(!result.verified);
    assert!(result
        .presentation_result
        .error
        .unwrap()
        .any(&|e| matches!(e, CheckError::Purpose(_))));
    assert!(result.credential_results[0].verified);
}

#[tokio::test]
async fn sign_presentation_without_challenge_never_calls_the_suite() {
    let counting = CountingSuite::new(holder_suite());
    let p = presentation_of(vec![]);
    let err = sign_presentation(
        &p,
        &SignPresentationOptions::new(counting.clone()).with_loader(loader()),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, VcError::Configuration(_)));
    assert_eq!(counting.signs.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn signed_presentation_requires_challenge_to_verify() {
    let p = presentation_of(vec![]);
    let options = VerifyPresentationOptions::new(verifier_suites()).with_loader(loader());
    assert!(matches!(
        verify(&p, &options).await,
        Err(VcError::Configuration(_))
    ));
}

#[tokio::test]
async fn holder_mismatch_fails_authentication() {
    let mut map = presentation_of(vec![]).into_map();
    map.insert("holder".into(), json!(ISSUER));
    let p = Presentation::from_map(map);
    let signed = sign_presentation(
        &p,
        &SignPresentationOptions::new(holder_suite())
            .with_loader(loader())
            .with_challenge("c"),
    )
    .await
    .unwrap();
    let result = verify(
        &signed,
        &VerifyPresentationOptions::new(verifier_suites())
            .with_loader(loader())
            .with_challenge("c"),
    )
    .await
    .unwrap();
    assert!(!result.verified);
}

#[tokio::test]
async fn structurally_invalid_presentation_short_circuits() {
    let p = Presentation::try_from(json!({
        "@context": ["https://www.w3.org/2018/credentials/v1"],
        "type": ["VerifiableCredential"],
        "verifiableCredential": [{"id": "urn:uuid:x"}]
    }))
    .unwrap();
    let result = verify(&p, &unsigned_options()).await.unwrap();
    assert!(!result.verified);
    assert!(result.credential_results.is_empty());
    assert!(matches!(
        result.error.unwrap().iter().next(),
        Some(CheckError::Validation(_))
    ));
}

#[tokio::test]
async fn verdict_json_separates_presentation_and_credentials() {
    let p = presentation_of(vec![issued("alice").await]);
    let result = verify(&p, &unsigned_options()).await.unwrap();
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["verified"], true);
    assert_eq!(json["presentationResult"]["verified"], true);
    assert_eq!(json["credentialResults"][0]["verified"], true);
    assert_eq!(
        json["credentialResults"][0]["results"][0]["proof"]["proofPurpose"],
        "assertionMethod"
    );
}
