use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Response of both social signup and social login.
#[derive(Debug, Clone, Deserialize)]
pub struct SocialAuth {
    pub tokens: TokenPair,
    #[serde(default)]
    pub user: Value,
}

/// Password login puts the tokens at the top level instead of under `tokens`.
#[derive(Debug, Clone, Deserialize)]
pub struct PasswordAuth {
    pub access: String,
    pub refresh: String,
    #[serde(default)]
    pub user: Value,
}

impl PasswordAuth {
    pub fn tokens(&self) -> TokenPair {
        TokenPair {
            access: self.access.clone(),
            refresh: self.refresh.clone(),
        }
    }
}

/// Body of a password login.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct Credentials {
    #[validate(length(min = 1, message = "Email is required"))]
    #[validate(email(message = "Email is invalid"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Validate)]
pub struct Registration {
    #[validate(email(message = "Email is invalid"))]
    pub email: String,

    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    pub password: String,

    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub confirm_password: String,

    pub is_team_lead: bool,
    pub is_admin: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Discord,
    Twitch,
    Facebook,
}

impl Provider {
    pub fn as_str(self) -> &'static str {
        match self {
            Provider::Discord => "discord",
            Provider::Twitch => "twitch",
            Provider::Facebook => "facebook",
        }
    }
}

impl Default for Provider {
    fn default() -> Self {
        Provider::Discord
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "discord" => Ok(Provider::Discord),
            "twitch" => Ok(Provider::Twitch),
            "facebook" => Ok(Provider::Facebook),
            other => Err(format!("unknown provider {:?}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountType {
    TeamLead,
    Player,
}

impl AccountType {
    pub fn as_str(self) -> &'static str {
        match self {
            AccountType::TeamLead => "team_lead",
            AccountType::Player => "player",
        }
    }

    pub fn is_team_lead(self) -> bool {
        self == AccountType::TeamLead
    }
}

impl FromStr for AccountType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "team_lead" => Ok(AccountType::TeamLead),
            "player" => Ok(AccountType::Player),
            other => Err(format!("unknown account type {:?}", other)),
        }
    }
}
