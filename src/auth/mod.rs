//! API key storage: the system keyring first, then the environment.

use std::error::Error as StdError;
use std::fmt;
use std::io::{self, BufRead, Write};

use keyring::Entry;
use tracing::{debug, warn};

use crate::core::keyring::KeyringAccessError;

const KEYRING_SERVICE: &str = "parley";
const KEYRING_ENTRY: &str = "gemini";

/// Checked in order when the keyring has no key.
pub const API_KEY_ENV_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

#[derive(Debug)]
pub enum AuthError {
    MissingApiKey,
    EmptyToken,
    Keyring(KeyringAccessError),
    Io(io::Error),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::MissingApiKey => write!(
                f,
                "No API key found. Run 'parley auth' or set {}.",
                API_KEY_ENV_VARS.join(" or ")
            ),
            AuthError::EmptyToken => f.write_str("API key cannot be empty"),
            AuthError::Keyring(err) => write!(f, "{err}"),
            AuthError::Io(err) => write!(f, "{err}"),
        }
    }
}

impl StdError for AuthError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            AuthError::Keyring(err) => Some(err),
            AuthError::Io(err) => Some(err),
            AuthError::MissingApiKey | AuthError::EmptyToken => None,
        }
    }
}

impl From<KeyringAccessError> for AuthError {
    fn from(err: KeyringAccessError) -> Self {
        AuthError::Keyring(err)
    }
}

impl From<keyring::Error> for AuthError {
    fn from(err: keyring::Error) -> Self {
        AuthError::Keyring(err.into())
    }
}

impl From<io::Error> for AuthError {
    fn from(err: io::Error) -> Self {
        AuthError::Io(err)
    }
}

pub struct AuthManager {
    use_keyring: bool,
}

impl AuthManager {
    pub fn new() -> Self {
        Self::new_with_keyring(true)
    }

    /// Construct an AuthManager, optionally disabling keyring access (useful for tests)
    pub fn new_with_keyring(use_keyring: bool) -> Self {
        Self { use_keyring }
    }

    pub fn store_token(&self, token: &str) -> Result<(), AuthError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AuthError::EmptyToken);
        }
        if !self.use_keyring {
            return Ok(());
        }
        Entry::new(KEYRING_SERVICE, KEYRING_ENTRY)?.set_password(token)?;
        Ok(())
    }

    pub fn get_token(&self) -> Result<Option<String>, KeyringAccessError> {
        if !self.use_keyring {
            return Ok(None);
        }
        let entry = Entry::new(KEYRING_SERVICE, KEYRING_ENTRY)?;
        match entry.get_password() {
            Ok(token) => Ok(Some(token)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Returns whether a stored key was removed.
    pub fn remove_token(&self) -> Result<bool, AuthError> {
        if !self.use_keyring {
            return Ok(false);
        }
        match Entry::new(KEYRING_SERVICE, KEYRING_ENTRY)?.delete_credential() {
            Ok(()) => Ok(true),
            Err(keyring::Error::NoEntry) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    pub fn resolve_api_key(&self) -> Result<String, AuthError> {
        self.resolve_api_key_with(|name| std::env::var(name).ok())
    }

    /// Keyring first; a temporarily unavailable keyring falls through to the
    /// environment lookup.
    pub fn resolve_api_key_with<F>(&self, lookup: F) -> Result<String, AuthError>
    where
        F: Fn(&str) -> Option<String>,
    {
        match self.get_token() {
            Ok(Some(token)) => return Ok(token),
            Ok(None) => {}
            Err(err) if err.is_recoverable() => {
                warn!(%err, "keyring unavailable; trying environment");
            }
            Err(err) => return Err(err.into()),
        }

        API_KEY_ENV_VARS
            .iter()
            .find_map(|name| {
                let value = lookup(name).filter(|value| !value.trim().is_empty())?;
                debug!(source = *name, "using API key from environment");
                Some(value.trim().to_string())
            })
            .ok_or(AuthError::MissingApiKey)
    }

    pub fn interactive_auth(&self) -> Result<(), AuthError> {
        let mut stdout = io::stdout();
        write!(stdout, "Enter your Gemini API key: ")?;
        stdout.flush()?;

        let mut token = String::new();
        io::stdin().lock().read_line(&mut token)?;
        self.store_token(&token)?;

        println!("✓ API key stored securely");
        Ok(())
    }

    pub fn interactive_deauth(&self) -> Result<(), AuthError> {
        if self.remove_token()? {
            println!("✓ Stored API key removed");
        } else {
            println!("No stored API key found.");
        }
        Ok(())
    }
}

impl Default for AuthManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn gemini_key_wins_over_generic_key() {
        let auth = AuthManager::new_with_keyring(false);
        let key = auth
            .resolve_api_key_with(env(&[("API_KEY", "generic"), ("GEMINI_API_KEY", " gem ")]))
            .expect("key");
        assert_eq!(key, "gem");
    }

    #[test]
    fn blank_values_are_skipped() {
        let auth = AuthManager::new_with_keyring(false);
        let key = auth
            .resolve_api_key_with(env(&[("GEMINI_API_KEY", "  "), ("API_KEY", "fallback")]))
            .expect("key");
        assert_eq!(key, "fallback");
    }

    #[test]
    fn missing_key_is_reported() {
        let auth = AuthManager::new_with_keyring(false);
        let err = auth
            .resolve_api_key_with(env(&[]))
            .expect_err("no key anywhere");
        assert!(matches!(err, AuthError::MissingApiKey));
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }

    #[test]
    fn empty_token_is_rejected_before_storage() {
        let auth = AuthManager::new_with_keyring(false);
        assert!(matches!(auth.store_token("\n"), Err(AuthError::EmptyToken)));
        assert!(auth.store_token("abc").is_ok());
        assert!(!auth.remove_token().expect("no keyring"));
    }
}
