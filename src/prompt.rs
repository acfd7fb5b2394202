//! Password entry
//!
//! Reading a password blocks until the user answers, so it is hidden behind
//! the [`SecretReader`] trait. The terminal implementation refuses to prompt
//! when standard error is not a terminal.

use console::Term;
use zeroize::Zeroizing;

use crate::error::{Error, Result};

/// Something that can be asked for a secret.
pub trait SecretReader {
    /// Show `prompt` and return the secret the user entered.
    fn read_secret(&self, prompt: &str) -> Result<Zeroizing<String>>;
}

/// Reads secrets from the controlling terminal without echoing them.
///
/// The prompt goes to standard error so that it never mixes with piped
/// standard output.
#[derive(Debug, Clone)]
pub struct TerminalPrompt {
    term: Term,
}

impl TerminalPrompt {
    /// Prompt on standard error.
    pub fn stderr() -> Self {
        Self::with_term(Term::stderr())
    }

    pub fn with_term(term: Term) -> Self {
        Self { term }
    }

    /// Whether a prompt can be shown at all.
    pub fn is_interactive(&self) -> bool {
        self.term.is_term()
    }
}

impl Default for TerminalPrompt {
    fn default() -> Self {
        Self::stderr()
    }
}

impl SecretReader for TerminalPrompt {
    fn read_secret(&self, prompt: &str) -> Result<Zeroizing<String>> {
        if !self.is_interactive() {
            return Err(Error::NotInteractive);
        }
        self.term.write_str(prompt).map_err(Error::Prompt)?;
        // read_secure_line prints the newline itself when it succeeds.
        match self.term.read_secure_line() {
            Ok(secret) => Ok(Zeroizing::new(secret)),
            Err(err) => {
                let _ = self.term.write_line("");
                Err(Error::Prompt(err))
            }
        }
    }
}

impl<R: SecretReader + ?Sized> SecretReader for &R {
    fn read_secret(&self, prompt: &str) -> Result<Zeroizing<String>> {
        (**self).read_secret(prompt)
    }
}
