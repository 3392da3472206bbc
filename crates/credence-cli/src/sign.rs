//! # Issue, Present, Sign-Presentation
//!
//! Thin wrappers over the `credence-vc` entry points. Inputs are JSON
//! files; the resulting document goes to stdout.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;

use credence_vc::{
    create_presentation, issue, sign_presentation, Credential, Ed25519Signature2020,
    IssueOptions, Presentation, PresentationOptions, SignPresentationOptions,
};

use crate::config::CliConfig;
use crate::keys::read_key_pair;

/// Arguments for `credence issue`.
#[derive(Args, Debug)]
pub struct IssueArgs {
    /// Private key file written by `credence keygen`.
    #[arg(long)]
    pub key: PathBuf,
    /// Verification method URL recorded in the proof.
    #[arg(long)]
    pub verification_method: String,
    /// Credential to sign.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

/// Arguments for `credence present`.
#[derive(Args, Debug)]
pub struct PresentArgs {
    /// Presentation holder.
    #[arg(long)]
    pub holder: Option<String>,
    /// Presentation id. Default: a fresh `urn:uuid:` identifier.
    #[arg(long)]
    pub id: Option<String>,
    /// Credentials to include, in order.
    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,
}

/// Arguments for `credence sign-presentation`.
#[derive(Args, Debug)]
pub struct SignPresentationArgs {
    /// Private key file written by `credence keygen`.
    #[arg(long)]
    pub key: PathBuf,
    /// Verification method URL recorded in the proof.
    #[arg(long)]
    pub verification_method: String,
    /// Challenge to bind. Falls back to the config file.
    #[arg(long)]
    pub challenge: Option<String>,
    /// Domain to bind. Falls back to the config file.
    #[arg(long)]
    pub domain: Option<String>,
    /// Presentation to sign.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

/// Sign a credential file.
pub async fn run_issue(args: &IssueArgs, config: &CliConfig) -> Result<u8> {
    let suite = signer(&args.key, &args.verification_method)?;
    let credential = read_credential(&args.file)?;
    let options = IssueOptions::new(suite).with_loader(Arc::new(config.loader()?));
    let signed = issue(&credential, &options)
        .await
        .with_context(|| format!("failed to issue {}", args.file.display()))?;
    crate::print_json(&signed)?;
    Ok(0)
}

/// Build an unsigned presentation from credential files.
pub fn run_present(args: &PresentArgs) -> Result<u8> {
    let mut options = PresentationOptions::new();
    for file in &args.files {
        options = options.with_credential(read_credential(file)?);
    }
    if let Some(holder) = &args.holder {
        options = options.with_holder(holder.clone());
    }
    let id = args
        .id
        .clone()
        .unwrap_or_else(|| format!("urn:uuid:{}", uuid::Uuid::new_v4()));
    options = options.with_id(id);
    let presentation = create_presentation(options).context("failed to create presentation")?;
    crate::print_json(&presentation)?;
    Ok(0)
}

/// Sign a presentation file.
pub async fn run_sign_presentation(args: &SignPresentationArgs, config: &CliConfig) -> Result<u8> {
    let suite = signer(&args.key, &args.verification_method)?;
    let presentation = Presentation::try_from(crate::read_json(&args.file)?)
        .with_context(|| format!("not a presentation: {}", args.file.display()))?;

    let mut options = SignPresentationOptions::new(suite).with_loader(Arc::new(config.loader()?));
    if let Some(challenge) = args.challenge.as_ref().or(config.challenge.as_ref()) {
        options = options.with_challenge(challenge.clone());
    }
    if let Some(domain) = args.domain.as_ref().or(config.domain.as_ref()) {
        options = options.with_domain(domain.clone());
    }

    let signed = sign_presentation(&presentation, &options)
        .await
        .with_context(|| format!("failed to sign {}", args.file.display()))?;
    crate::print_json(&signed)?;
    Ok(0)
}

fn signer(key: &Path, verification_method: &str) -> Result<Arc<Ed25519Signature2020>> {
    let key_pair = read_key_pair(key)?;
    Ok(Arc::new(Ed25519Signature2020::signer(key_pair, verification_method)))
}

pub(crate) fn read_credential(path: &Path) -> Result<Credential> {
    Credential::try_from(crate::read_json(path)?)
        .with_context(|| format!("not a credential: {}", path.display()))
}
