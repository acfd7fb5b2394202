//! Client configuration from environment variables.
//!
//! The environment is read once into an [`EnvConfig`] snapshot. Everything
//! downstream works on the snapshot, never on the live process environment.

use crate::error::{Error, Result};

/// Server endpoint. Defaults to [`DEFAULT_SERVER`].
pub const ENV_SERVER: &str = "KES_SERVER";
/// API key. Selects the derived-certificate credentials.
pub const ENV_API_KEY: &str = "KES_API_KEY";
/// Path of the client certificate file.
pub const ENV_CLIENT_CERT: &str = "KES_CLIENT_CERT";
/// Path of the client private key file.
pub const ENV_CLIENT_KEY: &str = "KES_CLIENT_KEY";
/// Default enclave.
pub const ENV_ENCLAVE: &str = "KES_ENCLAVE";

pub const DEFAULT_SERVER: &str = "https://127.0.0.1:7373";

/// A snapshot of the environment variables the client cares about.
///
/// `None` means the variable is not set. `Some("")` means it is set but empty,
/// which is a different error for the variables that are required.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvConfig {
    pub server: Option<String>,
    pub api_key: Option<String>,
    pub client_cert: Option<String>,
    pub client_key: Option<String>,
    pub enclave: Option<String>,
}

impl EnvConfig {
    /// Read the process environment.
    ///
    /// Values that are not valid unicode are converted lossily.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| {
            std::env::var_os(name).map(|value| value.to_string_lossy().into_owned())
        })
    }

    /// Build a snapshot from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            server: lookup(ENV_SERVER),
            api_key: lookup(ENV_API_KEY),
            client_cert: lookup(ENV_CLIENT_CERT),
            client_key: lookup(ENV_CLIENT_KEY),
            enclave: lookup(ENV_ENCLAVE),
        }
    }

    /// The server endpoint.
    ///
    /// Falls back to [`DEFAULT_SERVER`] only if the variable is not set. Any
    /// non-blank value is used verbatim; a blank one is an error.
    pub fn server(&self) -> Result<&str> {
        match self.server.as_deref() {
            None => Ok(DEFAULT_SERVER),
            Some(addr) if addr.trim().is_empty() => Err(Error::EnvEmpty {
                var: ENV_SERVER,
                what: "no KES server endpoint",
            }),
            Some(addr) => Ok(addr),
        }
    }

    /// The enclave to talk to: `name` if given, otherwise [`ENV_ENCLAVE`].
    pub fn enclave<'a>(&'a self, name: Option<&'a str>) -> Option<&'a str> {
        name.filter(|name| !name.is_empty())
            .or(self.enclave.as_deref())
            .filter(|name| !name.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> EnvConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        EnvConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn reads_all_variables() {
        let config = env(&[
            (ENV_SERVER, "https://kes.example.com:7373"),
            (ENV_API_KEY, "kes:v1:key"),
            (ENV_CLIENT_CERT, "client.crt"),
            (ENV_CLIENT_KEY, "client.key"),
            (ENV_ENCLAVE, "tenant-1"),
        ]);
        assert_eq!(config.server.as_deref(), Some("https://kes.example.com:7373"));
        assert_eq!(config.api_key.as_deref(), Some("kes:v1:key"));
        assert_eq!(config.client_cert.as_deref(), Some("client.crt"));
        assert_eq!(config.client_key.as_deref(), Some("client.key"));
        assert_eq!(config.enclave.as_deref(), Some("tenant-1"));
    }

    #[test]
    fn default_server() {
        assert_eq!(env(&[]).server().unwrap(), DEFAULT_SERVER);
    }

    #[test]
    fn server_is_used_verbatim() {
        let config = env(&[(ENV_SERVER, "kes.internal:443")]);
        assert_eq!(config.server().unwrap(), "kes.internal:443");
    }

    #[test]
    fn empty_server_is_rejected() {
        let err = env(&[(ENV_SERVER, " ")]).server().unwrap_err();
        assert!(matches!(err, Error::EnvEmpty { var: ENV_SERVER, .. }));
    }

    #[test]
    fn enclave_flag_wins() {
        let config = env(&[(ENV_ENCLAVE, "from-env")]);
        assert_eq!(config.enclave(Some("from-flag")), Some("from-flag"));
        assert_eq!(config.enclave(Some("")), Some("from-env"));
        assert_eq!(config.enclave(None), Some("from-env"));
        assert_eq!(env(&[]).enclave(None), None);
    }
}
