use async_trait::async_trait;
use log::*;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;
use url::Url;

use crate::error::ApiError;
use crate::model::auth::{Credentials, PasswordAuth, Provider, Registration, SocialAuth};
use crate::model::logical::{Match, MemberStats, NewsItem, Team, Tournament, TournamentList};
use crate::session::AccessToken;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const USER_AGENT: &str = concat!("levelgg/", env!("CARGO_PKG_VERSION"));

pub type ApiResult<T> = Result<T, ApiError>;

/// Unauthenticated account calls.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Trades a provider access token from an implicit-grant redirect for platform tokens.
    async fn exchange_social_token(&self, provider: Provider, access_token: &str) -> ApiResult<SocialAuth>;
    async fn social_login(&self, provider: Provider, code: &str) -> ApiResult<SocialAuth>;
    async fn login(&self, credentials: &Credentials) -> ApiResult<PasswordAuth>;
    async fn register(&self, registration: &Registration) -> ApiResult<()>;
}

/// Calls that act on the logged-in player.
#[async_trait]
pub trait PlayerApi: Send + Sync {
    async fn set_country(&self, token: &AccessToken, country_code: &str) -> ApiResult<()>;
    async fn set_account_type(&self, token: &AccessToken, is_team_lead: bool) -> ApiResult<()>;
    async fn create_team(&self, token: &AccessToken, name: &str) -> ApiResult<Team>;
    async fn join_team(&self, token: &AccessToken, join_code: &str) -> ApiResult<()>;
}

/// Public, read-mostly listings.
#[async_trait]
pub trait FeedApi: Send + Sync {
    async fn upcoming_tournaments(&self) -> ApiResult<Vec<Tournament>>;
    async fn matches(&self) -> ApiResult<Vec<Match>>;
    async fn news(&self) -> ApiResult<Vec<NewsItem>>;
    async fn member_stats(&self) -> ApiResult<MemberStats>;
}

/// REST client for the platform backend.
///
/// Can only be built from a resolved base address, so every call it makes
/// has somewhere to go.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    http: Client,
    base: Url,
}

impl HttpBackend {
    pub fn new(base: Url) -> ApiResult<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(HttpBackend { http, base })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> ApiResult<Url> {
        join(&self.base, path)
    }

    fn request(&self, method: Method, path: &str, token: Option<&AccessToken>) -> ApiResult<RequestBuilder> {
        let url = self.endpoint(path)?;
        debug!("{} {}", method, url);
        let request = self.http.request(method, url);
        Ok(match token {
            Some(token) => request.bearer_auth(token.as_str()),
            None => request,
        })
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> ApiResult<T> {
        let response = checked(request).await?;
        Ok(response.json().await?)
    }

    async fn send_ignoring_body(&self, request: RequestBuilder) -> ApiResult<()> {
        checked(request).await.map(drop)
    }
}

async fn checked(request: RequestBuilder) -> ApiResult<reqwest::Response> {
    let response = request.send().await?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    debug!("Request rejected with {}: {}", status, body);
    Err(ApiError::rejected(status.as_u16(), &body))
}

/// Appends an `/api/...` path to the base address, keeping any path prefix the base has.
fn join(base: &Url, path: &str) -> ApiResult<Url> {
    let joined = format!(
        "{}/{}",
        base.as_str().trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    Url::parse(&joined).map_err(|_| ApiError::InvalidBackendUrl(joined))
}

#[async_trait]
impl AuthApi for HttpBackend {
    async fn exchange_social_token(&self, provider: Provider, access_token: &str) -> ApiResult<SocialAuth> {
        let request = self
            .request(Method::POST, "/api/auth/social/signup/", None)?
            .json(&json!({ "provider": provider, "access_token": access_token }));
        self.send(request).await
    }

    async fn social_login(&self, provider: Provider, code: &str) -> ApiResult<SocialAuth> {
        let request = self
            .request(Method::POST, "/api/auth/social/login/", None)?
            .json(&json!({ "provider": provider, "code": code }));
        self.send(request).await
    }

    async fn login(&self, credentials: &Credentials) -> ApiResult<PasswordAuth> {
        let request = self
            .request(Method::POST, "/api/auth/login/", None)?
            .json(credentials);
        self.send(request).await
    }

    async fn register(&self, registration: &Registration) -> ApiResult<()> {
        let request = self
            .request(Method::POST, "/api/auth/register/", None)?
            .json(registration);
        self.send_ignoring_body(request).await
    }
}

#[async_trait]
impl PlayerApi for HttpBackend {
    async fn set_country(&self, token: &AccessToken, country_code: &str) -> ApiResult<()> {
        let request = self
            .request(Method::PATCH, "/api/player/country-code/", Some(token))?
            .json(&json!({ "country_code": country_code }));
        self.send_ignoring_body(request).await
    }

    async fn set_account_type(&self, token: &AccessToken, is_team_lead: bool) -> ApiResult<()> {
        let request = self
            .request(Method::PATCH, "/api/player/account-type/", Some(token))?
            .json(&json!({ "is_team_lead": is_team_lead }));
        self.send_ignoring_body(request).await
    }

    async fn create_team(&self, token: &AccessToken, name: &str) -> ApiResult<Team> {
        let request = self
            .request(Method::POST, "/api/teams/", Some(token))?
            .json(&json!({ "name": name }));
        self.send(request).await
    }

    async fn join_team(&self, token: &AccessToken, join_code: &str) -> ApiResult<()> {
        let request = self
            .request(Method::POST, "/api/team/join/", Some(token))?
            .json(&json!({ "join_code": join_code }));
        self.send_ignoring_body(request).await
    }
}

#[async_trait]
impl FeedApi for HttpBackend {
    async fn upcoming_tournaments(&self) -> ApiResult<Vec<Tournament>> {
        let request = self.request(Method::GET, "/api/upcoming_tournaments/", None)?;
        let list: TournamentList = self.send(request).await?;
        Ok(list.tournaments)
    }

    async fn matches(&self) -> ApiResult<Vec<Match>> {
        let request = self.request(Method::GET, "/api/matches/", None)?;
        self.send(request).await
    }

    async fn news(&self) -> ApiResult<Vec<NewsItem>> {
        let request = self.request(Method::GET, "/api/news/", None)?;
        self.send(request).await
    }

    async fn member_stats(&self) -> ApiResult<MemberStats> {
        let request = self.request(Method::GET, "/api/member-stats/", None)?;
        self.send(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_keeps_base_path() {
        let base = Url::parse("https://api.level.gg/v2/").unwrap();
        assert_eq!(
            join(&base, "/api/teams/").unwrap().as_str(),
            "https://api.level.gg/v2/api/teams/"
        );
    }

    #[test]
    fn join_without_trailing_slash() {
        let base = Url::parse("http://localhost:8000").unwrap();
        assert_eq!(
            join(&base, "/api/player/country-code/").unwrap().as_str(),
            "http://localhost:8000/api/player/country-code/"
        );
    }

    #[test]
    fn backend_builds_from_base() {
        let backend = HttpBackend::new(Url::parse("http://localhost:8000").unwrap()).unwrap();
        assert_eq!(backend.base().host_str(), Some("localhost"));
    }
}
