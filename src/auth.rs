use log::*;
use serde_json::Value;
use validator::{Validate, ValidationErrors};

use crate::api::AuthApi;
use crate::error::{ApiError, LoginError};
use crate::model::auth::{Credentials, Provider, Registration};
use crate::redirect::{query_param, Route};
use crate::session::SessionStore;
use crate::storage::Storage;

/// Reports the first failing field in `fields` order, presence before shape.
fn invalid(errors: &ValidationErrors, fields: &[&str]) -> LoginError {
    let field_errors = errors.field_errors();
    let message = fields
        .iter()
        .filter_map(|field| field_errors.get(*field))
        .find_map(|failures| failures.iter().find(|e| e.code == "length").or_else(|| failures.first()))
        .and_then(|e| e.message.as_ref())
        .map_or_else(|| errors.to_string(), |m| m.to_string());
    LoginError::Invalid(message)
}

fn route_for(user: &Value) -> Route {
    let flag = |name: &str| user.get(name).and_then(Value::as_bool).unwrap_or(false);
    if flag("is_admin") {
        Route::Admin
    } else if flag("is_team_lead") {
        Route::TeamLead
    } else {
        Route::Home
    }
}

/// Email/password login. On success the session is stored and the user is
/// routed by role.
pub async fn login<A, S>(
    api: &A,
    session: &SessionStore<S>,
    email: &str,
    password: &str,
) -> Result<Route, LoginError>
where
    A: AuthApi + ?Sized,
    S: Storage,
{
    let credentials = Credentials {
        email: email.to_owned(),
        password: password.to_owned(),
    };
    credentials
        .validate()
        .map_err(|e| invalid(&e, &["email", "password"]))?;

    let auth = api.login(&credentials).await.map_err(|e| match e.status() {
        Some(401) => LoginError::InvalidCredentials,
        _ => LoginError::Api(e),
    })?;
    match session.save(&auth.tokens(), &auth.user) {
        Ok(Some(_)) => {}
        Ok(None) => return Err(LoginError::Api(ApiError::Decode("empty access token".into()))),
        Err(e) => return Err(LoginError::Session(e)),
    }
    let route = route_for(&auth.user);
    info!("Logged in, continuing to {}", route);
    Ok(route)
}

/// Finishes a social login redirect (`?code=...&provider=...`).
///
/// Never fails: every outcome is a place to send the user.
pub async fn complete_social_login<A, S>(api: &A, session: &SessionStore<S>, redirect: &str) -> Route
where
    A: AuthApi + ?Sized,
    S: Storage,
{
    let code = query_param(redirect, "code");
    let provider = query_param(redirect, "provider").and_then(|p| p.parse::<Provider>().ok());
    let (code, provider) = match (code, provider) {
        (Some(code), Some(provider)) => (code, provider),
        _ => {
            warn!("Missing code or provider in the redirect");
            return Route::Login;
        }
    };

    match api.social_login(provider, &code).await {
        Ok(auth) => match session.save(&auth.tokens, &auth.user) {
            Ok(Some(_)) => {
                info!("Logged in with {}", provider);
                Route::Home
            }
            Ok(None) => Route::Login,
            Err(e) => {
                error!("Could not store session: {:#}", e);
                Route::Login
            }
        },
        Err(e) if e.is_not_registered() || e.status() == Some(400) => {
            info!("No account linked to this {} login, sending to signup", provider);
            Route::Signup
        }
        Err(e) => {
            warn!("Social login failed: {}", e);
            Route::Login
        }
    }
}

/// Creates a password account. The user logs in afterwards.
pub async fn register<A>(api: &A, registration: &Registration) -> Result<Route, LoginError>
where
    A: AuthApi + ?Sized,
{
    registration
        .validate()
        .map_err(|e| invalid(&e, &["confirm_password", "email", "username"]))?;
    api.register(registration).await?;
    info!("Account {} created", registration.username);
    Ok(Route::Login)
}

pub fn logout<S: Storage>(session: &SessionStore<S>) -> anyhow::Result<Route> {
    session.clear()?;
    Ok(Route::Login)
}
