use reqwest::Url;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{debug, info};
use crate::error::{Error, Result};
use crate::models::TokenResponse;

pub const TOKEN_STORAGE_KEY: &str = "access_token";

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded;charset=UTF-8";
const GRANT_BODY: &str = "grant_type=client_credentials";

#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Keep tokens out of logs
impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(..)")
    }
}

// Pre-encoded Basic credential (base64 of `key:secret`).
#[derive(Clone)]
pub struct ClientCredential(String);

impl ClientCredential {
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }
}

impl fmt::Debug for ClientCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ClientCredential(..)")
    }
}

pub trait TokenStore: Send + Sync {
    fn load(&self) -> Result<Option<AccessToken>>;
    fn store(&self, token: &AccessToken) -> Result<()>;
}

// Token store that lives as long as the process
#[derive(Default)]
pub struct MemoryTokenStore {
    entries: Mutex<HashMap<String, String>>,
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<AccessToken>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| Error::Config("token store lock poisoned".to_string()))?;
        Ok(entries.get(TOKEN_STORAGE_KEY).cloned().map(AccessToken))
    }

    fn store(&self, token: &AccessToken) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| Error::Config("token store lock poisoned".to_string()))?;
        entries.insert(TOKEN_STORAGE_KEY.to_string(), token.0.clone());
        Ok(())
    }
}

// Token store backed by a JSON object file. Keys other than the token are left alone.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_entries(&self) -> Result<Map<String, Value>> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(Map::new()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Map::new()),
            Err(e) => Err(e.into()),
        }
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<AccessToken>> {
        let entries = self.read_entries()?;
        Ok(entries
            .get(TOKEN_STORAGE_KEY)
            .and_then(Value::as_str)
            .map(AccessToken::new))
    }

    fn store(&self, token: &AccessToken) -> Result<()> {
        let mut entries = self.read_entries()?;
        entries.insert(TOKEN_STORAGE_KEY.to_string(), Value::String(token.0.clone()));
        std::fs::write(&self.path, serde_json::to_vec_pretty(&entries)?)?;
        Ok(())
    }
}

// Exchanges the client credential for a bearer token and persists it,
// overwriting whatever token was stored before.
pub async fn acquire_token(
    client: &reqwest::Client,
    token_url: &Url,
    credential: &ClientCredential,
    store: &dyn TokenStore,
) -> Result<AccessToken> {
    debug!(url = %token_url, "requesting access token");

    let res = client
        .post(token_url.clone())
        .header(AUTHORIZATION, format!("Basic {}", credential.0))
        .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
        .body(GRANT_BODY)
        .send()
        .await
        .map_err(|e| Error::Auth(format!("token request failed: {e}")))?;

    let status = res.status();
    let body = res
        .text()
        .await
        .map_err(|e| Error::Auth(format!("could not read token response: {e}")))?;

    let parsed: TokenResponse = serde_json::from_str(&body)
        .map_err(|e| Error::Auth(format!("malformed token response ({status}): {e}")))?;

    if !parsed.errors.is_empty() {
        let messages: Vec<&str> = parsed.errors.iter().map(|e| e.message.as_str()).collect();
        return Err(Error::Auth(messages.join("; ")));
    }

    let token = match parsed.access_token {
        Some(t) if !t.is_empty() => AccessToken(t),
        _ => return Err(Error::Auth(format!("token response ({status}) has no access_token"))),
    };

    store.store(&token)?;
    info!("access token acquired");
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, http::HeaderMap, routing::post};
    use tempfile::NamedTempFile;

    async fn serve(app: Router) -> Url {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Url::parse(&format!("http://{addr}/oauth2/token")).unwrap()
    }

    #[tokio::test]
    async fn test_acquire_token_persists() {
        let app = Router::new().route(
            "/oauth2/token",
            post(|headers: HeaderMap, body: String| async move {
                assert_eq!(headers[AUTHORIZATION], "Basic c2VjcmV0");
                assert_eq!(body, GRANT_BODY);
                Json(serde_json::json!({"token_type": "bearer", "access_token": "tok-1"}))
            }),
        );
        let url = serve(app).await;
        let store = MemoryTokenStore::default();
        store.store(&AccessToken::new("stale")).unwrap();

        let token = acquire_token(&reqwest::Client::new(), &url, &ClientCredential::new("c2VjcmV0"), &store)
            .await
            .unwrap();

        assert_eq!(token.as_str(), "tok-1");
        assert_eq!(store.load().unwrap(), Some(AccessToken::new("tok-1")));
    }

    #[tokio::test]
    async fn test_missing_token_is_auth_error() {
        let app = Router::new().route(
            "/oauth2/token",
            post(|| async {
                Json(serde_json::json!({"errors": [{"code": 99, "message": "Unable to verify your credentials"}]}))
            }),
        );
        let url = serve(app).await;
        let store = MemoryTokenStore::default();

        let err = acquire_token(&reqwest::Client::new(), &url, &ClientCredential::new("bad"), &store)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Auth(ref m) if m.contains("Unable to verify")));
        assert_eq!(store.load().unwrap(), None);
    }

    #[tokio::test]
    async fn test_non_json_is_auth_error() {
        let app = Router::new().route("/oauth2/token", post(|| async { "<html>nope</html>" }));
        let url = serve(app).await;

        let err = acquire_token(&reqwest::Client::new(), &url, &ClientCredential::new("x"), &MemoryTokenStore::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Auth(_)));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_auth_error() {
        // bind then drop to get a port nobody listens on
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let url = Url::parse(&format!("http://{addr}/oauth2/token")).unwrap();

        let err = acquire_token(&reqwest::Client::new(), &url, &ClientCredential::new("x"), &MemoryTokenStore::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Auth(_)));
    }

    #[test]
    fn test_file_store_round_trip_keeps_other_keys() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), r#"{"theme":"dark"}"#).unwrap();
        let store = FileTokenStore::new(file.path());

        assert_eq!(store.load().unwrap(), None);
        store.store(&AccessToken::new("a")).unwrap();
        store.store(&AccessToken::new("b")).unwrap();

        assert_eq!(store.load().unwrap(), Some(AccessToken::new("b")));
        let content: Value = serde_json::from_str(&std::fs::read_to_string(file.path()).unwrap()).unwrap();
        assert_eq!(content["theme"], "dark");
    }

    #[test]
    fn test_file_store_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("tokens.json"));
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_token_debug_is_redacted() {
        assert_eq!(format!("{:?}", AccessToken::new("secret")), "AccessToken(..)");
    }
}
