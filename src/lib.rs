//! Mutual TLS client identity for the KES command-line client.
//!
//! A client proves who it is with a certificate. That certificate is either
//! derived from an API key (`KES_API_KEY`) or loaded together with its private
//! key from disk (`KES_CLIENT_CERT`, `KES_CLIENT_KEY`). The private key file may
//! be encrypted, in which case the user is asked for the password.
//!
//! ```no_run
//! use kes_auth::{Client, EnvConfig, TerminalPrompt};
//!
//! let config = EnvConfig::from_env();
//! let client = Client::from_config(&config, None, false, &TerminalPrompt::stderr())?;
//! println!("{} as {:?}", client.endpoint, client.identity);
//! # Ok::<(), kes_auth::Error>(())
//! ```

pub mod api_key;
pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod identity;
pub mod prompt;
pub mod tls;

pub use api_key::ApiKey;
pub use client::{client_config, Client};
pub use config::EnvConfig;
pub use credentials::CredentialSource;
pub use error::{Error, Result};
pub use identity::Identity;
pub use prompt::{SecretReader, TerminalPrompt};
pub use tls::KeyPair;
