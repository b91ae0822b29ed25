//! Secure handling of the gateway bearer token
//!
//! The token is read from an environment variable and kept in a
//! `secrecy::SecretString` so it cannot leak through `Debug` output. Anything
//! that might echo it back (error bodies, URLs) is passed through
//! [`GatewayTokenManager::mask_token_in_string`] before being surfaced.

use secrecy::{ExposeSecret, SecretString};
use std::collections::HashMap;
use std::env;

/// Holds the optional bearer token used to authenticate against the gateway
///
/// # Examples
///
/// ```
/// use gateway_publisher::security::GatewayTokenManager;
///
/// let manager = GatewayTokenManager::with_token("abcdef123456");
/// assert!(manager.has_token());
/// assert_eq!(manager.mask_token_in_string("token=abcdef123456"), "token=abc...456");
/// ```
#[derive(Default)]
pub struct GatewayTokenManager {
    token: Option<SecretString>,
}

impl GatewayTokenManager {
    /// A manager without any token; requests are sent unauthenticated
    pub fn new() -> Self {
        Self { token: None }
    }

    /// Reads the token from the named process environment variable
    ///
    /// Empty values are treated as unset.
    pub fn from_env(var_name: &str) -> Self {
        Self::from_lookup(env::var(var_name).ok())
    }

    /// Reads the token from an already captured environment map
    pub fn from_env_map(env: &HashMap<String, String>, var_name: &str) -> Self {
        Self::from_lookup(env.get(var_name).cloned())
    }

    pub fn with_token(token: &str) -> Self {
        Self::from_lookup(Some(token.to_string()))
    }

    fn from_lookup(value: Option<String>) -> Self {
        let token = value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(|v| SecretString::new(v.into()));
        Self { token }
    }

    pub fn token(&self) -> Option<&SecretString> {
        self.token.as_ref()
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Masks a token for safe logging
    ///
    /// Shows only the first 3 and last 3 characters for identification purposes.
    /// Tokens shorter than 10 characters are fully masked as "****".
    pub fn mask_token(token: &str) -> String {
        if token.len() < 10 || !token.is_ascii() {
            return "****".to_string();
        }

        let prefix = &token[..3];
        let suffix = &token[token.len() - 3..];
        format!("{}...{}", prefix, suffix)
    }

    /// Replaces every occurrence of the held token in `text` with its mask
    pub fn mask_token_in_string(&self, text: &str) -> String {
        match &self.token {
            Some(token) => {
                let token_str = token.expose_secret();
                text.replace(token_str, &Self::mask_token(token_str))
            }
            None => text.to_string(),
        }
    }
}

impl std::fmt::Debug for GatewayTokenManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayTokenManager")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_manager_has_no_token() {
        let manager = GatewayTokenManager::new();
        assert!(!manager.has_token());
        assert_eq!(manager.mask_token_in_string("nothing here"), "nothing here");
    }

    #[test]
    fn test_from_env_map() {
        let mut env = HashMap::new();
        env.insert("GW_TOKEN".to_string(), "test-gw-token-12345".to_string());

        let manager = GatewayTokenManager::from_env_map(&env, "GW_TOKEN");
        assert_eq!(
            manager.token().unwrap().expose_secret(),
            "test-gw-token-12345"
        );
    }

    #[test]
    fn test_blank_value_is_unset() {
        let mut env = HashMap::new();
        env.insert("GW_TOKEN".to_string(), "   ".to_string());

        assert!(!GatewayTokenManager::from_env_map(&env, "GW_TOKEN").has_token());
        assert!(!GatewayTokenManager::from_env_map(&env, "OTHER").has_token());
    }

    #[test]
    fn test_mask_token() {
        assert_eq!(GatewayTokenManager::mask_token("short"), "****");
        assert_eq!(GatewayTokenManager::mask_token(""), "****");
        assert_eq!(GatewayTokenManager::mask_token("abcdef123456"), "abc...456");
    }

    #[test]
    fn test_mask_token_in_string() {
        let manager = GatewayTokenManager::with_token("secret-gw-token-12345");
        let output = manager.mask_token_in_string("401: bad token secret-gw-token-12345");
        assert!(output.contains("sec...345"));
        assert!(!output.contains("secret-gw-token-12345"));
    }

    #[test]
    fn test_debug_redacts_token() {
        let manager = GatewayTokenManager::with_token("secret-gw-token-12345");
        let debug = format!("{:?}", manager);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("secret"));
    }
}
