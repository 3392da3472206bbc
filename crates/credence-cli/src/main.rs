//! # credence CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use credence_cli::config::CliConfig;
use credence_cli::keys::cmd_keygen;
use credence_cli::sign::{
    run_issue, run_present, run_sign_presentation, IssueArgs, PresentArgs, SignPresentationArgs,
};
use credence_cli::verify::{run_verify, VerifyArgs};

/// Issue, present and verify W3C Verifiable Credentials.
#[derive(Parser, Debug)]
#[command(name = "credence", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a YAML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate an Ed25519 key pair and print a controller document.
    Keygen {
        /// Output directory for the key files.
        #[arg(long, short, default_value = ".")]
        output: PathBuf,
        /// Prefix for the key filenames and the method fragment.
        #[arg(long, default_value = "credence")]
        prefix: String,
        /// Controller identifier for the printed document.
        #[arg(long, default_value = "did:example:controller")]
        controller: String,
    },

    /// Sign a credential.
    Issue(IssueArgs),

    /// Wrap credentials in an unsigned presentation.
    Present(PresentArgs),

    /// Sign a presentation for a challenge.
    SignPresentation(SignPresentationArgs),

    /// Verify a credential or presentation.
    Verify(VerifyArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match CliConfig::load(cli.config.as_deref()) {
        Err(e) => Err(e),
        Ok(config) => match &cli.command {
            Commands::Keygen {
                output,
                prefix,
                controller,
            } => cmd_keygen(output, prefix, controller),
            Commands::Issue(args) => run_issue(args, &config).await,
            Commands::Present(args) => run_present(args),
            Commands::SignPresentation(args) => run_sign_presentation(args, &config).await,
            Commands::Verify(args) => run_verify(args, &config).await,
        },
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
