use serde::{Deserialize, Serialize};

/// Configuration served by the web frontend's config endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemoteConfig {
    #[serde(rename = "BACKEND_URL", default)]
    pub backend_url: Option<String>,
    #[serde(rename = "DISCORD_CLIENT_ID", default)]
    pub discord_client_id: Option<String>,
    #[serde(rename = "TWITCH_CLIENT_ID", default)]
    pub twitch_client_id: Option<String>,
    #[serde(rename = "FACEBOOK_CLIENT_ID", default)]
    pub facebook_client_id: Option<String>,
}
