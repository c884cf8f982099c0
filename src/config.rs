use log::*;
use url::Url;

use crate::error::ApiError;
use crate::model::auth::Provider;
use crate::model::config::RemoteConfig;

pub const DEFAULT_CONFIG_URL: &str = "http://localhost:3000/api/my-wrapper";

/// Path on the web origin that social providers redirect back to after signup.
pub const SOCIAL_CALLBACK_PATH: &str = "/social_callback";

pub async fn load_remote_config(config_url: &str) -> Result<RemoteConfig, ApiError> {
    debug!("Loading remote config from {}", config_url);
    let response = reqwest::get(config_url).await?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ApiError::rejected(status.as_u16(), &body));
    }
    Ok(response.json().await?)
}

impl RemoteConfig {
    /// The backend address every API call is made against.
    pub fn backend_url(&self) -> Result<Url, ApiError> {
        let raw = self
            .backend_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or(ApiError::MissingBackendUrl)?;
        Url::parse(raw).map_err(|_| ApiError::InvalidBackendUrl(raw.to_owned()))
    }

    pub fn client_id(&self, provider: Provider) -> Option<&str> {
        match provider {
            Provider::Discord => self.discord_client_id.as_deref(),
            Provider::Twitch => self.twitch_client_id.as_deref(),
            Provider::Facebook => self.facebook_client_id.as_deref(),
        }
        .filter(|id| !id.is_empty())
    }
}

impl Provider {
    fn authorize_endpoint(self) -> &'static str {
        match self {
            Provider::Discord => "https://discord.com/api/oauth2/authorize",
            Provider::Twitch => "https://id.twitch.tv/oauth2/authorize",
            Provider::Facebook => "https://www.facebook.com/v17.0/dialog/oauth",
        }
    }

    fn scope(self) -> &'static str {
        match self {
            Provider::Discord => "identify email",
            Provider::Twitch => "user:read:email",
            Provider::Facebook => "email",
        }
    }

    /// Implicit-grant authorization URL that sends the user back to `origin`'s
    /// social callback with an access token in the fragment.
    ///
    /// Returns `None` when the remote config has no client id for this provider
    /// or `origin` is not a URL.
    pub fn authorize_url(self, config: &RemoteConfig, origin: &str) -> Option<Url> {
        let client_id = config.client_id(self)?;
        let redirect = Url::parse(origin).ok()?.join(SOCIAL_CALLBACK_PATH).ok()?;
        let mut url = Url::parse(self.authorize_endpoint()).ok()?;
        url.query_pairs_mut()
            .append_pair("client_id", client_id)
            .append_pair("redirect_uri", redirect.as_str())
            .append_pair("response_type", "token")
            .append_pair("scope", self.scope());
        Some(url)
    }
}
