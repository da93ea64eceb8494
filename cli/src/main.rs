#![deny(missing_docs)]

//! # Autodoc CLI
//!
//! Command Line Interface for turning capture artifacts into API documentation.
//!
//! Supported Commands:
//! - `generate`: Artifacts -> Document -> OpenAPI + request collection.
//! - `init`: Writes the default configuration file.

use autodoc_core::AppResult;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod config;
mod generate;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Autodoc documentation generator")]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG).
    #[clap(short, long, global = true)]
    verbose: bool,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Merge capture artifacts and write the documentation exports.
    Generate(generate::GenerateArgs),
    /// Write the default configuration file.
    Init(config::InitArgs),
}

fn initialise_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    if tracing::subscriber::set_global_default(
        FmtSubscriber::builder().with_env_filter(filter).finish(),
    )
    .is_err()
    {
        // Subscriber already installed.
    }
}

fn main() -> AppResult<()> {
    let cli = Cli::parse();
    initialise_logging(cli.verbose);

    match &cli.command {
        Commands::Generate(args) => generate::execute(args)?,
        Commands::Init(args) => config::execute_init(args)?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli_structure() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_generate_flags() {
        let cli = Cli::parse_from(["autodoc", "generate", "--root", "svc", "-v"]);
        assert!(cli.verbose);
        match cli.command {
            Commands::Generate(args) => {
                assert_eq!(args.root, std::path::PathBuf::from("svc"));
                assert_eq!(args.config, std::path::PathBuf::from("autodoc/config.yaml"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
