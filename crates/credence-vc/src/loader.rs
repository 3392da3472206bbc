//! # Document Loader
//!
//! Resolves `@context` URLs, verification methods and controller
//! documents. The loader is the only I/O boundary the protocol core
//! needs; callers supply their own for network or cached resolution.
//!
//! [`StaticDocumentLoader`] is the bundled implementation: an in-memory
//! table preloaded with the well-known VC and security contexts. Unknown
//! URLs fail with [`LoaderError::NotFound`]; a loader never answers with
//! an empty document.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

use credence_core::CanonicalBytes;

use crate::contexts;
use crate::document::{CREDENTIALS_V1_CONTEXT, ED25519_2020_CONTEXT, SECURITY_V2_CONTEXT};
use crate::error::VcError;
use crate::proof::PROOF_MEMBER;

/// A resolved document.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteDocument {
    /// The document body.
    pub document: Value,
    /// The URL it was resolved from (after any redirects).
    pub document_url: String,
    /// A context URL advertised alongside the document, if any.
    pub context_url: Option<String>,
}

/// Failure to resolve a URL.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoaderError {
    /// The loader does not know this URL.
    #[error("document not found: {0}")]
    NotFound(String),

    /// The URL resolved to something unusable.
    #[error("invalid document at {url}: {reason}")]
    InvalidDocument {
        /// The URL that was loaded.
        url: String,
        /// What was wrong with it.
        reason: String,
    },

    /// The loader's backing transport failed.
    #[error("failed to load {url}: {reason}")]
    Transport {
        /// The URL being loaded.
        url: String,
        /// Transport-level detail.
        reason: String,
    },
}

/// Resolves URLs to documents.
#[async_trait]
pub trait DocumentLoader: Send + Sync {
    /// Load the document at `url`.
    async fn load(&self, url: &str) -> Result<RemoteDocument, LoaderError>;
}

/// In-memory document loader.
#[derive(Debug, Clone, Default)]
pub struct StaticDocumentLoader {
    documents: HashMap<String, Value>,
}

impl StaticDocumentLoader {
    /// An empty loader. Every URL fails until inserted.
    pub fn new() -> Self {
        Self::default()
    }

    /// A loader that serves the VC v1, security v2 and Ed25519-2020
    /// contexts.
    pub fn with_defaults() -> Self {
        let mut loader = Self::new();
        loader.insert(CREDENTIALS_V1_CONTEXT, contexts::credentials_v1());
        loader.insert(SECURITY_V2_CONTEXT, contexts::security_v2());
        loader.insert(ED25519_2020_CONTEXT, contexts::ed25519_2020());
        loader
    }

    /// Register (or replace) the document served for `url`.
    pub fn insert(&mut self, url: impl Into<String>, document: Value) {
        self.documents.insert(url.into(), document);
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with_document(mut self, url: impl Into<String>, document: Value) -> Self {
        self.insert(url, document);
        self
    }

    /// Returns true if `url` resolves without fragment dereferencing.
    pub fn contains(&self, url: &str) -> bool {
        self.documents.contains_key(url)
    }

    /// Find `url` inside the document registered for its base, by `id`.
    fn dereference_fragment(&self, url: &str) -> Option<Value> {
        let (base, fragment) = url.split_once('#')?;
        let root = self.documents.get(base)?;
        let relative = format!("#{fragment}");
        find_by_id(root, url, &relative).cloned()
    }
}

#[async_trait]
impl DocumentLoader for StaticDocumentLoader {
    async fn load(&self, url: &str) -> Result<RemoteDocument, LoaderError> {
        let document = match self.documents.get(url) {
            Some(doc) => doc.clone(),
            None => self
                .dereference_fragment(url)
                .ok_or_else(|| LoaderError::NotFound(url.to_string()))?,
        };
        Ok(RemoteDocument {
            document,
            document_url: url.to_string(),
            context_url: None,
        })
    }
}

/// Depth-first search for an object whose `id` is `absolute` or
/// `relative`.
fn find_by_id<'a>(value: &'a Value, absolute: &str, relative: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => {
            if let Some(id) = map.get("id").and_then(Value::as_str) {
                if id == absolute || id == relative {
                    return Some(value);
                }
            }
            map.iter()
                .filter(|(k, _)| k.as_str() != "@context")
                .find_map(|(_, v)| find_by_id(v, absolute, relative))
        }
        Value::Array(items) => items.iter().find_map(|v| find_by_id(v, absolute, relative)),
        _ => None,
    }
}

/// Canonical bytes of a document without its `proof`, after confirming
/// every string `@context` entry resolves through `loader`.
pub async fn canonicalize(
    document: &Map<String, Value>,
    loader: &dyn DocumentLoader,
) -> Result<CanonicalBytes, VcError> {
    for url in context_urls(document) {
        loader.load(url).await?;
    }
    Ok(CanonicalBytes::without_members(document, &[PROOF_MEMBER])?)
}

fn context_urls(document: &Map<String, Value>) -> Vec<&str> {
    match document.get("@context") {
        Some(Value::String(s)) => vec![s.as_str()],
        Some(Value::Array(entries)) => entries.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn controller_doc() -> Value {
        json!({
            "@context": [SECURITY_V2_CONTEXT],
            "id": "did:example:issuer",
            "verificationMethod": [{
                "id": "did:example:issuer#key-1",
                "type": "Ed25519VerificationKey2020",
                "controller": "did:example:issuer",
                "publicKeyHex": "00"
            }, {
                "id": "#key-2",
                "type": "Ed25519VerificationKey2020",
                "controller": "did:example:issuer"
            }],
            "assertionMethod": ["did:example:issuer#key-1"]
        })
    }

    #[tokio::test]
    async fn defaults_resolve_well_known_contexts() {
        let loader = StaticDocumentLoader::with_defaults();
        for url in [CREDENTIALS_V1_CONTEXT, SECURITY_V2_CONTEXT, ED25519_2020_CONTEXT] {
            let doc = loader.load(url).await.unwrap();
            assert!(doc.document.get("@context").is_some(), "{url}");
            assert_eq!(doc.document_url, url);
        }
    }

    #[tokio::test]
    async fn unknown_url_is_not_found() {
        let loader = StaticDocumentLoader::with_defaults();
        assert_eq!(
            loader.load("https://example.com/unknown").await,
            Err(LoaderError::NotFound("https://example.com/unknown".into()))
        );
    }

    #[tokio::test]
    async fn fragment_dereferences_absolute_and_relative_ids() {
        let loader = StaticDocumentLoader::new().with_document("did:example:issuer", controller_doc());
        let key1 = loader.load("did:example:issuer#key-1").await.unwrap();
        assert_eq!(key1.document["publicKeyHex"], "00");
        let key2 = loader.load("did:example:issuer#key-2").await.unwrap();
        assert_eq!(key2.document["id"], "#key-2");
        assert!(loader.load("did:example:issuer#key-3").await.is_err());
    }

    #[tokio::test]
    async fn explicit_entry_wins_over_fragment() {
        let loader = StaticDocumentLoader::new()
            .with_document("did:example:issuer", controller_doc())
            .with_document("did:example:issuer#key-1", json!({"override": true}));
        let doc = loader.load("did:example:issuer#key-1").await.unwrap();
        assert_eq!(doc.document["override"], true);
    }

    #[tokio::test]
    async fn canonicalize_requires_resolvable_contexts() {
        let loader = StaticDocumentLoader::with_defaults();
        let doc = json!({
            "@context": [CREDENTIALS_V1_CONTEXT, "https://example.com/custom/v1"],
            "proof": {"type": "X"}
        });
        let err = canonicalize(doc.as_object().unwrap(), &loader).await.unwrap_err();
        assert!(matches!(err, VcError::Resolution(LoaderError::NotFound(_))));

        let loader = loader.with_document("https://example.com/custom/v1", json!({"@context": {}}));
        let bytes = canonicalize(doc.as_object().unwrap(), &loader).await.unwrap();
        let text = std::str::from_utf8(bytes.as_bytes()).unwrap();
        assert!(!text.contains("proof"));
    }

    #[tokio::test]
    async fn inline_context_objects_are_not_loaded() {
        let loader = StaticDocumentLoader::with_defaults();
        let doc = json!({"@context": [CREDENTIALS_V1_CONTEXT, {"ex": "https://example.com/#"}]});
        assert!(canonicalize(doc.as_object().unwrap(), &loader).await.is_ok());
    }
}
