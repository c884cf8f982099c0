#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Mutex;

use levelgg::api::{ApiResult, AuthApi, FeedApi, PlayerApi};
use levelgg::model::auth::{Credentials, PasswordAuth, Provider, Registration, SocialAuth, TokenPair};
use levelgg::model::logical::{Match, MemberStats, NewsItem, Team, Tournament};
use levelgg::{AccessToken, ApiError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Exchange { provider: Provider, token: String },
    SocialLogin { provider: Provider, code: String },
    Login { email: String },
    Register { username: String },
    Country { bearer: String, code: String },
    AccountType { bearer: String, is_team_lead: bool },
    CreateTeam { bearer: String, name: String },
    JoinTeam { bearer: String, code: String },
    Tournaments,
    Matches,
    News,
    MemberStats,
}

#[derive(Debug, Clone, Copy)]
pub enum Failure {
    Status(u16, &'static str),
    Transport,
}

impl Failure {
    fn into_error(self) -> ApiError {
        match self {
            Failure::Status(status, body) => ApiError::rejected(status, body),
            Failure::Transport => ApiError::Transport("connection refused".into()),
        }
    }
}

fn outcome(failure: Option<Failure>) -> ApiResult<()> {
    match failure {
        Some(f) => Err(f.into_error()),
        None => Ok(()),
    }
}

/// Backend double that records every call and fails where told to.
pub struct FakeBackend {
    pub calls: Mutex<Vec<Call>>,
    pub exchange_failure: Option<Failure>,
    pub social_login_failure: Option<Failure>,
    pub login_failure: Option<Failure>,
    pub country_failure: Option<Failure>,
    pub account_type_failure: Option<Failure>,
    pub team_failure: Option<Failure>,
    pub access_token: String,
    pub user: Value,
    pub team_code: String,
    pub tournaments: Vec<Tournament>,
    pub member_stats: MemberStats,
}

impl Default for FakeBackend {
    fn default() -> Self {
        FakeBackend {
            calls: Mutex::new(vec![]),
            exchange_failure: None,
            social_login_failure: None,
            login_failure: None,
            country_failure: None,
            account_type_failure: None,
            team_failure: None,
            access_token: "platform-access".into(),
            user: json!({"username": "kat"}),
            team_code: "JOIN-4242".into(),
            tournaments: vec![Tournament {
                id: 7,
                title: "Conquest Cup".into(),
                start_date: Some("2026-11-01".into()),
                mode: Some("Conquest".into()),
                region: Some("EU".into()),
                platform: Some("PC".into()),
                language: Some("English".into()),
                registered_players: 12,
                max_players: 64,
                is_active: true,
                game: Some("battlefield".into()),
            }],
            member_stats: MemberStats {
                total_members: 1200,
                online_members: 87,
            },
        }
    }
}

impl FakeBackend {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| pred(*c)).count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn tokens(&self) -> TokenPair {
        TokenPair {
            access: self.access_token.clone(),
            refresh: "platform-refresh".into(),
        }
    }
}

#[async_trait]
impl AuthApi for FakeBackend {
    async fn exchange_social_token(&self, provider: Provider, access_token: &str) -> ApiResult<SocialAuth> {
        self.record(Call::Exchange {
            provider,
            token: access_token.into(),
        });
        outcome(self.exchange_failure)?;
        Ok(SocialAuth {
            tokens: self.tokens(),
            user: self.user.clone(),
        })
    }

    async fn social_login(&self, provider: Provider, code: &str) -> ApiResult<SocialAuth> {
        self.record(Call::SocialLogin {
            provider,
            code: code.into(),
        });
        outcome(self.social_login_failure)?;
        Ok(SocialAuth {
            tokens: self.tokens(),
            user: self.user.clone(),
        })
    }

    async fn login(&self, credentials: &Credentials) -> ApiResult<PasswordAuth> {
        self.record(Call::Login {
            email: credentials.email.clone(),
        });
        outcome(self.login_failure)?;
        let tokens = self.tokens();
        Ok(PasswordAuth {
            access: tokens.access,
            refresh: tokens.refresh,
            user: self.user.clone(),
        })
    }

    async fn register(&self, registration: &Registration) -> ApiResult<()> {
        self.record(Call::Register {
            username: registration.username.clone(),
        });
        Ok(())
    }
}

#[async_trait]
impl PlayerApi for FakeBackend {
    async fn set_country(&self, token: &AccessToken, country_code: &str) -> ApiResult<()> {
        self.record(Call::Country {
            bearer: token.as_str().into(),
            code: country_code.into(),
        });
        outcome(self.country_failure)
    }

    async fn set_account_type(&self, token: &AccessToken, is_team_lead: bool) -> ApiResult<()> {
        self.record(Call::AccountType {
            bearer: token.as_str().into(),
            is_team_lead,
        });
        outcome(self.account_type_failure)
    }

    async fn create_team(&self, token: &AccessToken, name: &str) -> ApiResult<Team> {
        self.record(Call::CreateTeam {
            bearer: token.as_str().into(),
            name: name.into(),
        });
        outcome(self.team_failure)?;
        Ok(Team {
            id: Some(3),
            name: Some(name.into()),
            code: self.team_code.clone(),
        })
    }

    async fn join_team(&self, token: &AccessToken, join_code: &str) -> ApiResult<()> {
        self.record(Call::JoinTeam {
            bearer: token.as_str().into(),
            code: join_code.into(),
        });
        Ok(())
    }
}

#[async_trait]
impl FeedApi for FakeBackend {
    async fn upcoming_tournaments(&self) -> ApiResult<Vec<Tournament>> {
        self.record(Call::Tournaments);
        Ok(self.tournaments.clone())
    }

    async fn matches(&self) -> ApiResult<Vec<Match>> {
        self.record(Call::Matches);
        Ok(vec![])
    }

    async fn news(&self) -> ApiResult<Vec<NewsItem>> {
        self.record(Call::News);
        Err(ApiError::Transport("news is down".into()))
    }

    async fn member_stats(&self) -> ApiResult<MemberStats> {
        self.record(Call::MemberStats);
        Ok(self.member_stats)
    }
}

pub const REDIRECT: &str =
    "https://level.gg/social_callback#token_type=Bearer&access_token=provider-token&expires_in=604800&scope=identify+email";
