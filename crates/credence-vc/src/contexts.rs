//! Bundled JSON-LD context documents served by
//! [`StaticDocumentLoader::with_defaults`](crate::loader::StaticDocumentLoader::with_defaults).
//!
//! These carry the term definitions the protocol relies on. Credence does
//! not expand JSON-LD, so the bodies only have to be present and
//! well-formed for context resolution to succeed.

use serde_json::{json, Value};

pub(crate) fn credentials_v1() -> Value {
    json!({
        "@context": {
            "@version": 1.1,
            "@protected": true,
            "id": "@id",
            "type": "@type",
            "VerifiableCredential": {
                "@id": "https://www.w3.org/2018/credentials#VerifiableCredential",
                "@context": {
                    "@version": 1.1,
                    "@protected": true,
                    "id": "@id",
                    "type": "@type",
                    "cred": "https://www.w3.org/2018/credentials#",
                    "sec": "https://w3id.org/security#",
                    "xsd": "http://www.w3.org/2001/XMLSchema#",
                    "credentialSchema": {"@id": "cred:credentialSchema", "@type": "@id"},
                    "credentialStatus": {"@id": "cred:credentialStatus", "@type": "@id"},
                    "credentialSubject": {"@id": "cred:credentialSubject", "@type": "@id"},
                    "evidence": {"@id": "cred:evidence", "@type": "@id"},
                    "expirationDate": {"@id": "cred:expirationDate", "@type": "xsd:dateTime"},
                    "holder": {"@id": "cred:holder", "@type": "@id"},
                    "issued": {"@id": "cred:issued", "@type": "xsd:dateTime"},
                    "issuer": {"@id": "cred:issuer", "@type": "@id"},
                    "issuanceDate": {"@id": "cred:issuanceDate", "@type": "xsd:dateTime"},
                    "proof": {"@id": "sec:proof", "@type": "@id", "@container": "@graph"},
                    "refreshService": {"@id": "cred:refreshService", "@type": "@id"},
                    "termsOfUse": {"@id": "cred:termsOfUse", "@type": "@id"},
                    "validFrom": {"@id": "cred:validFrom", "@type": "xsd:dateTime"},
                    "validUntil": {"@id": "cred:validUntil", "@type": "xsd:dateTime"}
                }
            },
            "VerifiablePresentation": {
                "@id": "https://www.w3.org/2018/credentials#VerifiablePresentation",
                "@context": {
                    "@version": 1.1,
                    "@protected": true,
                    "id": "@id",
                    "type": "@type",
                    "cred": "https://www.w3.org/2018/credentials#",
                    "sec": "https://w3id.org/security#",
                    "holder": {"@id": "cred:holder", "@type": "@id"},
                    "proof": {"@id": "sec:proof", "@type": "@id", "@container": "@graph"},
                    "verifiableCredential": {
                        "@id": "cred:verifiableCredential",
                        "@type": "@id",
                        "@container": "@graph"
                    }
                }
            }
        }
    })
}

pub(crate) fn security_v2() -> Value {
    json!({
        "@context": {
            "@version": 1.1,
            "id": "@id",
            "type": "@type",
            "sec": "https://w3id.org/security#",
            "xsd": "http://www.w3.org/2001/XMLSchema#",
            "assertionMethod": {"@id": "sec:assertionMethod", "@type": "@id", "@container": "@set"},
            "authentication": {"@id": "sec:authenticationMethod", "@type": "@id", "@container": "@set"},
            "challenge": "sec:challenge",
            "controller": {"@id": "sec:controller", "@type": "@id"},
            "created": {"@id": "http://purl.org/dc/terms/created", "@type": "xsd:dateTime"},
            "domain": "sec:domain",
            "proof": {"@id": "sec:proof", "@type": "@id", "@container": "@graph"},
            "proofPurpose": {"@id": "sec:proofPurpose", "@type": "@vocab"},
            "proofValue": "sec:proofValue",
            "publicKeyHex": "sec:publicKeyHex",
            "verificationMethod": {"@id": "sec:verificationMethod", "@type": "@id"}
        }
    })
}

pub(crate) fn ed25519_2020() -> Value {
    json!({
        "@context": {
            "id": "@id",
            "type": "@type",
            "@protected": true,
            "proof": {"@id": "https://w3id.org/security#proof", "@type": "@id", "@container": "@graph"},
            "Ed25519VerificationKey2020": {
                "@id": "https://w3id.org/security#Ed25519VerificationKey2020",
                "@context": {
                    "@protected": true,
                    "id": "@id",
                    "type": "@type",
                    "controller": {"@id": "https://w3id.org/security#controller", "@type": "@id"},
                    "revoked": {"@id": "https://w3id.org/security#revoked", "@type": "http://www.w3.org/2001/XMLSchema#dateTime"},
                    "publicKeyMultibase": {"@id": "https://w3id.org/security#publicKeyMultibase", "@type": "https://w3id.org/security#multibase"}
                }
            },
            "Ed25519Signature2020": {
                "@id": "https://w3id.org/security#Ed25519Signature2020",
                "@context": {
                    "@protected": true,
                    "id": "@id",
                    "type": "@type",
                    "challenge": "https://w3id.org/security#challenge",
                    "created": {"@id": "http://purl.org/dc/terms/created", "@type": "http://www.w3.org/2001/XMLSchema#dateTime"},
                    "domain": "https://w3id.org/security#domain",
                    "expires": {"@id": "https://w3id.org/security#expiration", "@type": "http://www.w3.org/2001/XMLSchema#dateTime"},
                    "nonce": "https://w3id.org/security#nonce",
                    "proofPurpose": {"@id": "https://w3id.org/security#proofPurpose", "@type": "@vocab"},
                    "proofValue": {"@id": "https://w3id.org/security#proofValue", "@type": "https://w3id.org/security#multibase"},
                    "verificationMethod": {"@id": "https://w3id.org/security#verificationMethod", "@type": "@id"}
                }
            }
        }
    })
}
