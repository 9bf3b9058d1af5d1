//! # conforma CLI Entry Point
//!
//! Assembles subcommands, initializes tracing, and maps the CI verdict to
//! the process exit status: 0 continues an automated pipeline, 1 fails
//! the gate.

use clap::Parser;

/// Conforma — batch conformance validation for clinical resources.
///
/// Validates directories of JSON/YAML resources against named profiles
/// and renders HTML/JSON/CSV/console reports plus a CI pass/fail verdict.
#[derive(Parser, Debug)]
#[command(name = "conforma", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Validate a directory of resources and gate on the result.
    Validate(conforma_cli::validate::ValidateArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate(args) => {
            let ci = conforma_cli::validate::run(args).await?;
            tracing::info!(success = ci.success, exit_code = ci.exit_code, "{}", ci.summary);
            if !ci.success {
                eprintln!("{}", ci.details);
            }
            std::process::exit(ci.exit_code);
        }
    }
}
