//! Profile completion after a social signup.
//!
//! A new user arriving from a provider redirect goes through
//! `ExchangingToken → CountrySelection → AccountTypeSelection →
//! (TeamCreation | Done)`. Each step is acknowledged by the backend before
//! the next one opens; a step that fails leaves the machine where it was.

use log::*;
use std::fmt;
use thiserror::Error;

use crate::api::{AuthApi, PlayerApi};
use crate::error::ApiError;
use crate::model::auth::AccountType;
use crate::redirect::{fragment_param, Route};
use crate::session::{AccessToken, SessionStore};
use crate::storage::Storage;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum State {
    ExchangingToken,
    CountrySelection,
    AccountTypeSelection,
    TeamCreation,
    /// Terminal. `team_code` is set when the flow ended by creating a team.
    Done { route: Route, team_code: Option<String> },
}

impl State {
    fn done(route: Route) -> Self {
        State::Done {
            route,
            team_code: None,
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, State::Done { .. })
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            State::ExchangingToken => f.write_str("exchanging token"),
            State::CountrySelection => f.write_str("selecting country"),
            State::AccountTypeSelection => f.write_str("selecting account type"),
            State::TeamCreation => f.write_str("creating team"),
            State::Done { route, .. } => write!(f, "done ({})", route),
        }
    }
}

/// What the server has acknowledged so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Profile {
    pub has_country: bool,
    pub has_account_type: bool,
    pub is_team_lead: bool,
    pub has_team: bool,
}

/// Short message for the user after a step, the terminal's toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Info(String),
    Error(String),
}

impl Notice {
    fn success(msg: &str) -> Self {
        Notice::Success(msg.to_owned())
    }

    fn info(msg: &str) -> Self {
        Notice::Info(msg.to_owned())
    }

    fn error(msg: &str) -> Self {
        Notice::Error(msg.to_owned())
    }

    pub fn message(&self) -> &str {
        match self {
            Notice::Success(m) | Notice::Info(m) | Notice::Error(m) => m,
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// A submit that was refused or failed. The machine's state is unchanged.
#[derive(Debug, Error)]
pub enum OnboardingError {
    #[error("signup has already been processed for this redirect")]
    AlreadyExchanged,
    #[error("cannot {action} while {state}")]
    OutOfOrder { action: &'static str, state: State },
    #[error("Missing required information")]
    MissingToken,
    #[error("{0}")]
    MissingField(&'static str),
    #[error("{message}")]
    Rejected {
        message: String,
        #[source]
        source: ApiError,
    },
}

impl OnboardingError {
    fn rejected(source: ApiError, fallback: &str) -> Self {
        OnboardingError::Rejected {
            message: source.user_message(fallback),
            source,
        }
    }
}

pub struct Onboarding<'a, A: ?Sized, S> {
    api: &'a A,
    session: &'a SessionStore<S>,
    state: State,
    profile: Profile,
    access_token: Option<AccessToken>,
}

impl<'a, A, S> Onboarding<'a, A, S>
where
    A: AuthApi + PlayerApi + ?Sized,
    S: Storage,
{
    /// A machine waiting for the provider redirect.
    pub fn new(api: &'a A, session: &'a SessionStore<S>) -> Self {
        Onboarding {
            api,
            session,
            state: State::ExchangingToken,
            profile: Profile::default(),
            access_token: None,
        }
    }

    /// Continues onboarding for an account that already holds platform tokens.
    ///
    /// Used after a password registration that opted into onboarding: if the
    /// custom signup flag is set and a token is stored, the flag is consumed
    /// and the machine opens at country selection with no exchange.
    pub fn resume(api: &'a A, session: &'a SessionStore<S>) -> anyhow::Result<Option<Self>> {
        let token = match session.access_token()? {
            Some(token) => token,
            None => return Ok(None),
        };
        if !session.take_custom_signup()? {
            return Ok(None);
        }
        info!("Resuming onboarding with stored session");
        Ok(Some(Onboarding {
            api,
            session,
            state: State::CountrySelection,
            profile: Profile::default(),
            access_token: Some(token),
        }))
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn profile(&self) -> Profile {
        self.profile
    }

    /// Exchanges the provider token in `redirect` for platform tokens.
    ///
    /// Runs once per machine. Whatever the outcome, the machine leaves
    /// `ExchangingToken`, and later calls are refused without touching the
    /// network.
    pub async fn exchange_token(&mut self, redirect: &str) -> Result<Notice, OnboardingError> {
        if self.state != State::ExchangingToken {
            return Err(OnboardingError::AlreadyExchanged);
        }

        let provider_token = match fragment_param(redirect, "access_token") {
            Some(t) => t,
            None => {
                warn!("Redirect carries no provider access token");
                self.state = State::done(Route::Login);
                return Ok(Notice::error("Missing access token"));
            }
        };
        let provider = match self.session.provider() {
            Ok(p) => p.unwrap_or_default(),
            Err(e) => {
                warn!("Could not read signup provider, assuming default: {:#}", e);
                Default::default()
            }
        };

        debug!("Exchanging {} token", provider);
        let auth = match self.api.exchange_social_token(provider, &provider_token).await {
            Ok(auth) => auth,
            Err(e) => {
                warn!("Social signup failed: {}", e);
                let (route, notice) = if e.is_already_exists() {
                    (Route::Login, Notice::info("Account exists. Redirecting to login..."))
                } else if e.status() == Some(400) {
                    (Route::Login, Notice::error(&e.user_message("Signup failed")))
                } else {
                    (Route::Signup, Notice::error("Signup failed. Please try again."))
                };
                self.state = State::done(route);
                return Ok(notice);
            }
        };

        match self.session.save(&auth.tokens, &auth.user) {
            Ok(Some(token)) => {
                self.access_token = Some(token);
                self.state = State::CountrySelection;
                info!("Social signup complete, selecting country");
                Ok(Notice::success("Signed up"))
            }
            Ok(None) => {
                self.state = State::done(Route::Signup);
                Ok(Notice::error("Signup failed. Please try again."))
            }
            Err(e) => {
                error!("Could not store session: {:#}", e);
                self.state = State::done(Route::Signup);
                Ok(Notice::error("Could not save your session"))
            }
        }
    }

    pub async fn submit_country(&mut self, country_code: &str) -> Result<Notice, OnboardingError> {
        self.require_state(State::CountrySelection, "select a country")?;
        let token = self.token()?;
        let country_code = country_code.trim();
        if country_code.is_empty() {
            return Err(OnboardingError::MissingField("Country is required"));
        }

        self.api
            .set_country(&token, country_code)
            .await
            .map_err(|e| OnboardingError::rejected(e, "Failed to set country code"))?;

        debug!("Country set to {}", country_code);
        self.profile.has_country = true;
        self.state = State::AccountTypeSelection;
        Ok(Notice::success("Country code saved"))
    }

    /// `account_type` is `"team_lead"` or `"player"`.
    pub async fn submit_account_type(&mut self, account_type: &str) -> Result<Notice, OnboardingError> {
        self.require_state(State::AccountTypeSelection, "select an account type")?;
        let token = self.token()?;
        let account_type: AccountType = account_type
            .parse()
            .map_err(|_| OnboardingError::MissingField("Please select an account type"))?;

        self.api
            .set_account_type(&token, account_type.is_team_lead())
            .await
            .map_err(|e| OnboardingError::rejected(e, "Failed to set account type"))?;

        debug!("Account type set to {}", account_type.as_str());
        self.profile.has_account_type = true;
        self.profile.is_team_lead = account_type.is_team_lead();
        self.state = if account_type.is_team_lead() {
            State::TeamCreation
        } else {
            State::done(Route::Home)
        };
        Ok(Notice::success("Account type saved"))
    }

    pub async fn submit_team(&mut self, name: &str) -> Result<Notice, OnboardingError> {
        self.require_state(State::TeamCreation, "create a team")?;
        let token = self.token()?;
        let name = name.trim();
        if name.is_empty() {
            return Err(OnboardingError::MissingField("Team name is required"));
        }

        let team = self
            .api
            .create_team(&token, name)
            .await
            .map_err(|e| OnboardingError::rejected(e, "Failed to create team"))?;

        info!("Team {:?} created", name);
        self.profile.has_team = true;
        self.state = State::Done {
            route: Route::Home,
            team_code: Some(team.code),
        };
        Ok(Notice::success("Team created successfully"))
    }

    fn require_state(&self, state: State, action: &'static str) -> Result<(), OnboardingError> {
        if self.state == state {
            Ok(())
        } else {
            Err(OnboardingError::OutOfOrder {
                action,
                state: self.state.clone(),
            })
        }
    }

    fn token(&self) -> Result<AccessToken, OnboardingError> {
        self.access_token.clone().ok_or(OnboardingError::MissingToken)
    }
}
