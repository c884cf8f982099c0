use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use url::Url;

use levelgg::api::{AuthApi, FeedApi, PlayerApi};
use levelgg::model::auth::{Credentials, Provider};
use levelgg::{AccessToken, HttpBackend};

/// One request as the server saw it.
struct Received {
    request_line: String,
    headers: Vec<(String, String)>,
    body: String,
}

impl Received {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

fn find_head_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n").map(|p| p + 4)
}

/// Answers a single request with `status` and `reply`, then hands back what it received.
async fn serve_once(status: u16, reply: &'static str) -> (HttpBackend, JoinHandle<Received>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = Url::parse(&format!("http://{}", listener.local_addr().unwrap())).unwrap();

    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        let head_end = loop {
            let n = socket.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed before the request head");
            buf.extend_from_slice(&chunk[..n]);
            if let Some(end) = find_head_end(&buf) {
                break end;
            }
        };

        let head = String::from_utf8_lossy(&buf[..head_end]).into_owned();
        let mut lines = head.split("\r\n");
        let request_line = lines.next().unwrap().to_owned();
        let headers: Vec<(String, String)> = lines
            .filter_map(|l| l.split_once(':'))
            .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_owned()))
            .collect();
        let length = headers
            .iter()
            .find(|(k, _)| k == "content-length")
            .map_or(0, |(_, v)| v.parse::<usize>().unwrap());
        while buf.len() < head_end + length {
            let n = socket.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed before the request body");
            buf.extend_from_slice(&chunk[..n]);
        }
        let body = String::from_utf8_lossy(&buf[head_end..head_end + length]).into_owned();

        let response = format!(
            "HTTP/1.1 {} Stub\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            status,
            reply.len(),
            reply
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();

        Received {
            request_line,
            headers,
            body,
        }
    });

    (HttpBackend::new(base).unwrap(), server)
}

fn token() -> AccessToken {
    AccessToken::new("platform-access").unwrap()
}

#[tokio::test]
async fn exchange_posts_provider_token_without_bearer() {
    let (backend, server) = serve_once(
        200,
        r#"{"tokens": {"access": "a1", "refresh": "r1"}, "user": {"username": "kat"}}"#,
    )
    .await;

    let auth = backend
        .exchange_social_token(Provider::Discord, "provider-token")
        .await
        .unwrap();
    let received = server.await.unwrap();

    assert_eq!(received.request_line, "POST /api/auth/social/signup/ HTTP/1.1");
    assert_eq!(received.header("authorization"), None);
    assert_eq!(
        received.json(),
        json!({"provider": "discord", "access_token": "provider-token"})
    );
    assert_eq!(auth.tokens.access, "a1");
    assert_eq!(auth.user["username"], "kat");
}

#[tokio::test]
async fn exchange_rejection_keeps_detail() {
    let (backend, server) = serve_once(400, r#"{"detail": "User already exists"}"#).await;

    let err = backend
        .exchange_social_token(Provider::Twitch, "provider-token")
        .await
        .unwrap_err();
    server.await.unwrap();

    assert_eq!(err.status(), Some(400));
    assert!(err.is_already_exists());
}

#[tokio::test]
async fn set_country_patches_with_bearer() {
    let (backend, server) = serve_once(200, "{}").await;

    backend.set_country(&token(), "DE").await.unwrap();
    let received = server.await.unwrap();

    assert_eq!(received.request_line, "PATCH /api/player/country-code/ HTTP/1.1");
    assert_eq!(received.header("authorization"), Some("Bearer platform-access"));
    assert_eq!(received.json(), json!({"country_code": "DE"}));
}

#[tokio::test]
async fn set_country_rejection() {
    let (backend, server) = serve_once(400, r#"{"detail": ["Unknown country code"]}"#).await;

    let err = backend.set_country(&token(), "ZZ").await.unwrap_err();
    server.await.unwrap();

    assert_eq!(err.status(), Some(400));
    assert_eq!(err.detail(), Some("Unknown country code"));
}

#[tokio::test]
async fn create_team_returns_join_code() {
    let (backend, server) =
        serve_once(201, r#"{"id": 3, "name": "Sky Pirates", "code": "JOIN-4242"}"#).await;

    let team = backend.create_team(&token(), "Sky Pirates").await.unwrap();
    let received = server.await.unwrap();

    assert_eq!(received.request_line, "POST /api/teams/ HTTP/1.1");
    assert_eq!(received.header("authorization"), Some("Bearer platform-access"));
    assert_eq!(received.json(), json!({"name": "Sky Pirates"}));
    assert_eq!(team.code, "JOIN-4242");
}

#[tokio::test]
async fn create_team_rejection() {
    let (backend, server) = serve_once(500, "oops").await;

    let err = backend.create_team(&token(), "Sky Pirates").await.unwrap_err();
    server.await.unwrap();

    assert_eq!(err.status(), Some(500));
    assert_eq!(err.detail(), None);
    assert_eq!(err.user_message("Failed to create team"), "Failed to create team");
}

#[tokio::test]
async fn login_posts_credentials_without_bearer() {
    let (backend, server) =
        serve_once(200, r#"{"access": "a1", "refresh": "r1", "user": {"is_admin": true}}"#).await;

    let credentials = Credentials {
        email: "kat@level.gg".into(),
        password: "hunter2hunter2".into(),
    };
    let auth = backend.login(&credentials).await.unwrap();
    let received = server.await.unwrap();

    assert_eq!(received.request_line, "POST /api/auth/login/ HTTP/1.1");
    assert_eq!(received.header("authorization"), None);
    assert_eq!(
        received.json(),
        json!({"email": "kat@level.gg", "password": "hunter2hunter2"})
    );
    assert_eq!(auth.tokens().refresh, "r1");
}

#[tokio::test]
async fn listings_are_public_gets() {
    let (backend, server) = serve_once(200, r#"{"tournaments": [{"id": 7, "title": "Conquest Cup"}]}"#).await;

    let tournaments = backend.upcoming_tournaments().await.unwrap();
    let received = server.await.unwrap();

    assert_eq!(received.request_line, "GET /api/upcoming_tournaments/ HTTP/1.1");
    assert_eq!(received.header("authorization"), None);
    assert_eq!(tournaments.len(), 1);
    assert_eq!(tournaments[0].title, "Conquest Cup");
}
