use anyhow::Result;
use log::*;
use serde_json::Value;
use std::fmt;

use crate::model::auth::{Provider, TokenPair};
use crate::storage::Storage;

const ACCESS_TOKEN_KEY: &str = "access_token";
const REFRESH_TOKEN_KEY: &str = "refresh_token";
const USER_KEY: &str = "user";
const CUSTOM_SIGNUP_KEY: &str = "customSignUp";
const PROVIDER_KEY: &str = "provider";

/// A bearer token that is known to be non-empty.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: &str) -> Option<Self> {
        let token = token.trim();
        if token.is_empty() {
            None
        } else {
            Some(AccessToken(token.to_owned()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(..)")
    }
}

/// Platform credentials kept in persistent storage.
///
/// Acquired on login or signup, cleared on logout. Anything that makes
/// authenticated calls is handed this store rather than reading storage keys
/// itself.
pub struct SessionStore<S> {
    storage: S,
}

impl<S: Storage> SessionStore<S> {
    pub fn new(storage: S) -> Self {
        SessionStore { storage }
    }

    /// Persists a fresh token pair and user profile, returning the usable access token.
    ///
    /// Returns `None` when the backend handed out an empty access token; nothing
    /// is stored in that case.
    pub fn save(&self, tokens: &TokenPair, user: &Value) -> Result<Option<AccessToken>> {
        let access = match AccessToken::new(&tokens.access) {
            Some(a) => a,
            None => {
                warn!("Backend issued an empty access token, not storing session");
                return Ok(None);
            }
        };
        self.storage.set_item(ACCESS_TOKEN_KEY, access.as_str())?;
        self.storage.set_item(REFRESH_TOKEN_KEY, &tokens.refresh)?;
        self.storage.set_item(USER_KEY, &serde_json::to_string(user)?)?;
        debug!("Session stored");
        Ok(Some(access))
    }

    pub fn access_token(&self) -> Result<Option<AccessToken>> {
        Ok(self
            .storage
            .get_item(ACCESS_TOKEN_KEY)?
            .and_then(|t| AccessToken::new(&t)))
    }

    pub fn refresh_token(&self) -> Result<Option<String>> {
        self.storage.get_item(REFRESH_TOKEN_KEY)
    }

    pub fn user(&self) -> Result<Option<Value>> {
        Ok(self
            .storage
            .get_item(USER_KEY)?
            .and_then(|u| serde_json::from_str(&u).ok()))
    }

    pub fn clear(&self) -> Result<()> {
        self.storage.remove_item(ACCESS_TOKEN_KEY)?;
        self.storage.remove_item(REFRESH_TOKEN_KEY)?;
        self.storage.remove_item(USER_KEY)?;
        debug!("Session cleared");
        Ok(())
    }

    /// Marks that a password registration should continue into onboarding.
    pub fn mark_custom_signup(&self) -> Result<()> {
        self.storage.set_item(CUSTOM_SIGNUP_KEY, "true")
    }

    /// Reads and clears the custom signup flag.
    pub fn take_custom_signup(&self) -> Result<bool> {
        let set = self.storage.get_item(CUSTOM_SIGNUP_KEY)?.as_deref() == Some("true");
        if set {
            self.storage.remove_item(CUSTOM_SIGNUP_KEY)?;
        }
        Ok(set)
    }

    /// Remembers which provider a social signup was started with.
    pub fn set_provider(&self, provider: Provider) -> Result<()> {
        self.storage.set_item(PROVIDER_KEY, provider.as_str())
    }

    pub fn provider(&self) -> Result<Option<Provider>> {
        Ok(self
            .storage
            .get_item(PROVIDER_KEY)?
            .and_then(|p| p.parse().ok()))
    }
}
