//! Resolve and inspect the TLS client identity of the KES CLI.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use kes_auth::{ApiKey, Client, EnvConfig, TerminalPrompt};

/// Command line arguments.
#[derive(Parser, Debug)]
#[command(name = "kes-auth", version, about)]
struct Args {
    /// Print debug logs to standard error.
    #[arg(short = 'v', long = "verbose", global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve the client credentials from the environment and print the identity.
    Identity {
        /// Skip verification of the server certificate.
        #[arg(short = 'k', long = "insecure")]
        insecure: bool,

        /// Enclave to use instead of $KES_ENCLAVE.
        #[arg(short = 'e', long = "enclave")]
        enclave: Option<String>,
    },
    /// Generate a new API key.
    ApiKey,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::WARN })
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to install log subscriber")?;

    match args.command {
        Command::Identity { insecure, enclave } => {
            let config = EnvConfig::from_env();
            let client = Client::from_config(
                &config,
                enclave.as_deref(),
                insecure,
                &TerminalPrompt::stderr(),
            )?;
            println!("Server     {}", client.endpoint);
            if let Some(enclave) = &client.enclave {
                println!("Enclave    {}", enclave);
            }
            match client.identity {
                Some(identity) => println!("Identity   {}", identity),
                None => println!("Identity   unknown"),
            }
        }
        Command::ApiKey => {
            let key = ApiKey::generate();
            println!("API Key    {}", key);
            println!("Identity   {}", key.identity());
        }
    }
    Ok(())
}
