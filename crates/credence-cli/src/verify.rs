//! # Verify
//!
//! Prints the verdict JSON for a credential or presentation. Exit code 0
//! when verified, 1 otherwise. Controller documents must be preloaded via
//! the config file.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;

use credence_vc::{
    verify, verify_credential, Ed25519Signature2020, Presentation, SuiteSet,
    VerifyCredentialOptions, VerifyPresentationOptions,
};

use crate::config::CliConfig;

/// Arguments for `credence verify`.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Treat the input as a presentation.
    #[arg(long)]
    pub presentation: bool,
    /// Do not require a presentation proof.
    #[arg(long, requires = "presentation")]
    pub unsigned: bool,
    /// Expected challenge. Falls back to the config file.
    #[arg(long)]
    pub challenge: Option<String>,
    /// Expected domain. Falls back to the config file.
    #[arg(long)]
    pub domain: Option<String>,
    /// Document to verify.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

/// Verify a document and print the verdict.
pub async fn run_verify(args: &VerifyArgs, config: &CliConfig) -> Result<u8> {
    let suites = SuiteSet::single(Arc::new(Ed25519Signature2020::verifier()));
    let loader = Arc::new(config.loader()?);

    let verified = if args.presentation {
        let presentation = Presentation::try_from(crate::read_json(&args.file)?)
            .with_context(|| format!("not a presentation: {}", args.file.display()))?;
        let mut options = VerifyPresentationOptions::new(suites).with_loader(loader);
        if args.unsigned {
            options = options.unsigned();
        }
        if let Some(challenge) = args.challenge.as_ref().or(config.challenge.as_ref()) {
            options = options.with_challenge(challenge.clone());
        }
        if let Some(domain) = args.domain.as_ref().or(config.domain.as_ref()) {
            options = options.with_domain(domain.clone());
        }
        let verdict = verify(&presentation, &options).await?;
        crate::print_json(&verdict)?;
        verdict.verified
    } else {
        let credential = crate::sign::read_credential(&args.file)?;
        let options = VerifyCredentialOptions::new(suites).with_loader(loader);
        let verdict = verify_credential(&credential, &options).await?;
        crate::print_json(&verdict)?;
        verdict.verified
    };

    if verified {
        tracing::info!(file = %args.file.display(), "verified");
        Ok(0)
    } else {
        tracing::warn!(file = %args.file.display(), "verification failed");
        Ok(1)
    }
}
