use std::fmt;
use url::form_urlencoded;

/// Where a flow sends the user once it is over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    Signup,
    TeamLead,
    Admin,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Route::Home => "/home",
            Route::Login => "/login",
            Route::Signup => "/signup",
            Route::TeamLead => "/team-lead",
            Route::Admin => "/admin",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Reads `name` from the fragment of a provider redirect.
///
/// Accepts a full URL, a bare `#...` fragment or the fragment without `#`.
pub fn fragment_param(redirect: &str, name: &str) -> Option<String> {
    let fragment = match redirect.find('#') {
        Some(i) => &redirect[i + 1..],
        None if redirect.contains("://") => return None,
        None => redirect,
    };
    param(fragment, name)
}

/// Reads `name` from the query string of a redirect URL (or a bare `?...` query).
pub fn query_param(redirect: &str, name: &str) -> Option<String> {
    let query = match redirect.find('?') {
        Some(i) => &redirect[i + 1..],
        None if redirect.contains("://") => return None,
        None => redirect,
    };
    let query = query.split('#').next().unwrap_or_default();
    param(query, name)
}

fn param(encoded: &str, name: &str) -> Option<String> {
    form_urlencoded::parse(encoded.as_bytes())
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.into_owned())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_from_full_redirect() {
        let redirect = "https://level.gg/social_callback#token_type=Bearer&access_token=abc%2B1&expires_in=604800";
        assert_eq!(fragment_param(redirect, "access_token").as_deref(), Some("abc+1"));
    }

    #[test]
    fn token_from_bare_fragment() {
        assert_eq!(fragment_param("#access_token=xyz", "access_token").as_deref(), Some("xyz"));
        assert_eq!(fragment_param("access_token=xyz", "access_token").as_deref(), Some("xyz"));
    }

    #[test]
    fn url_without_fragment_has_no_token() {
        assert_eq!(fragment_param("https://level.gg/social_callback", "access_token"), None);
        assert_eq!(fragment_param("https://level.gg/cb#access_token=", "access_token"), None);
    }

    #[test]
    fn code_and_provider_from_query() {
        let redirect = "https://level.gg/login_callback?code=c0de&provider=twitch";
        assert_eq!(query_param(redirect, "code").as_deref(), Some("c0de"));
        assert_eq!(query_param(redirect, "provider").as_deref(), Some("twitch"));
        assert_eq!(query_param("https://level.gg/login_callback", "code"), None);
    }

    #[test]
    fn route_paths() {
        assert_eq!(Route::Home.to_string(), "/home");
        assert_eq!(Route::Login.path(), "/login");
    }
}
