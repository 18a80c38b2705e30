//! Access token issuing and caching
//!
//! Uses the OAuth2 client credentials grant. A token is reused until its
//! declared expiry and replaced on the next request after that.

use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::models::{TokenErrorResponse, TokenResponse};
use crate::error::{Result, SetlistError};

/// Spotify application credentials
#[derive(Debug, Clone)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
}

/// An issued access token and when it stops being valid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedToken {
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

impl CachedToken {
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// On-disk form of the cache, tied to the client that requested it
#[derive(Debug, Serialize, Deserialize)]
struct PersistedToken {
    client_id: String,
    token: CachedToken,
}

/// Hands out bearer tokens, refreshing when the cached one has expired
pub struct TokenProvider {
    http_client: Client,
    token_url: String,
    credentials: ClientCredentials,
    cache: Mutex<Option<CachedToken>>,
    cache_path: Option<PathBuf>,
}

impl TokenProvider {
    pub fn new(http_client: Client, token_url: &str, credentials: ClientCredentials) -> Self {
        Self {
            http_client,
            token_url: token_url.to_string(),
            credentials,
            cache: Mutex::new(None),
            cache_path: None,
        }
    }

    /// Persist tokens to `path` and pick up one left by a previous run
    pub fn with_cache_file(mut self, path: PathBuf) -> Self {
        match std::fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<PersistedToken>(&contents) {
                Ok(persisted) if persisted.client_id == self.credentials.client_id => {
                    debug!("Loaded cached token expiring at {}", persisted.token.expires_at);
                    self.cache = Mutex::new(Some(persisted.token));
                }
                Ok(_) => debug!("Ignoring cached token issued to another client"),
                Err(e) => warn!("Ignoring unreadable token cache {:?}: {}", path, e),
            },
            Err(_) => debug!("No token cache at {:?}", path),
        }
        self.cache_path = Some(path);
        self
    }

    /// Return a valid bearer token, requesting a new one if needed
    pub async fn get_token(&self) -> Result<String> {
        let mut cache = self.cache.lock().await;

        if let Some(token) = cache.as_ref()
            && token.is_valid_at(Utc::now())
        {
            debug!("Using cached token");
            return Ok(token.value.clone());
        }

        let token = self.request_token().await?;
        self.persist(&token).await;
        let value = token.value.clone();
        *cache = Some(token);
        Ok(value)
    }

    /// Drop the cached token so the next call requests a fresh one
    pub async fn invalidate(&self) {
        *self.cache.lock().await = None;
        if let Some(path) = &self.cache_path
            && let Err(e) = tokio::fs::remove_file(path).await
            && e.kind() != std::io::ErrorKind::NotFound
        {
            warn!("Failed to remove token cache {:?}: {}", path, e);
        }
        debug!("Token cache cleared");
    }

    async fn request_token(&self) -> Result<CachedToken> {
        debug!("Requesting access token from {}", self.token_url);

        let response = self
            .http_client
            .post(&self.token_url)
            .basic_auth(
                &self.credentials.client_id,
                Some(&self.credentials.client_secret),
            )
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| SetlistError::TokenRequest(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<TokenErrorResponse>(&body)
                .map(|e| e.error_description.unwrap_or(e.error))
                .unwrap_or_else(|_| status.to_string());
            return Err(SetlistError::TokenRequest(message));
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| SetlistError::TokenRequest(e.to_string()))?;

        let expires_at = Utc::now() + Duration::seconds(body.expires_in);
        info!("Obtained access token (expires at {})", expires_at.format("%H:%M:%S"));

        Ok(CachedToken {
            value: body.access_token,
            expires_at,
        })
    }

    async fn persist(&self, token: &CachedToken) {
        let Some(path) = &self.cache_path else {
            return;
        };

        let persisted = PersistedToken {
            client_id: self.credentials.client_id.clone(),
            token: token.clone(),
        };

        let result = async {
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            let contents = serde_json::to_string_pretty(&persisted)?;
            tokio::fs::write(path, contents).await?;
            Ok::<_, SetlistError>(())
        }
        .await;

        match result {
            Ok(()) => debug!("Saved token cache to {:?}", path),
            Err(e) => warn!("Failed to save token cache to {:?}: {}", path, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn credentials() -> ClientCredentials {
        ClientCredentials {
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
        }
    }

    fn provider(server: &mockito::Server) -> TokenProvider {
        TokenProvider::new(
            Client::new(),
            &format!("{}/api/token", server.url()),
            credentials(),
        )
    }

    #[test]
    fn test_token_validity() {
        let now = Utc::now();
        let token = CachedToken {
            value: "t".to_string(),
            expires_at: now + Duration::seconds(10),
        };
        assert!(token.is_valid_at(now));
        assert!(!token.is_valid_at(now + Duration::seconds(10)));
    }

    #[tokio::test]
    async fn test_token_requested_once_then_cached() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/token")
            .match_header("authorization", "Basic aWQ6c2VjcmV0")
            .match_body(Matcher::UrlEncoded(
                "grant_type".into(),
                "client_credentials".into(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token": "abc", "token_type": "Bearer", "expires_in": 3600}"#)
            .expect(1)
            .create_async()
            .await;

        let provider = provider(&server);
        assert_eq!(provider.get_token().await.unwrap(), "abc");
        assert_eq!(provider.get_token().await.unwrap(), "abc");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_expired_token_is_refreshed() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token": "fresh", "expires_in": 3600}"#)
            .expect(1)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        let stale = PersistedToken {
            client_id: "id".to_string(),
            token: CachedToken {
                value: "stale".to_string(),
                expires_at: Utc::now() - Duration::seconds(1),
            },
        };
        std::fs::write(&path, serde_json::to_string(&stale).unwrap()).unwrap();

        let provider = provider(&server).with_cache_file(path.clone());
        assert_eq!(provider.get_token().await.unwrap(), "fresh");
        mock.assert_async().await;

        // The refreshed token was written back
        let saved: PersistedToken =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved.token.value, "fresh");
    }

    #[tokio::test]
    async fn test_persisted_token_reused() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/token")
            .expect(0)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        let valid = PersistedToken {
            client_id: "id".to_string(),
            token: CachedToken {
                value: "still-good".to_string(),
                expires_at: Utc::now() + Duration::seconds(600),
            },
        };
        std::fs::write(&path, serde_json::to_string(&valid).unwrap()).unwrap();

        let provider = provider(&server).with_cache_file(path);
        assert_eq!(provider.get_token().await.unwrap(), "still-good");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_token_from_other_client_ignored() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token": "mine", "expires_in": 3600}"#)
            .expect(1)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        let foreign = PersistedToken {
            client_id: "someone-else".to_string(),
            token: CachedToken {
                value: "theirs".to_string(),
                expires_at: Utc::now() + Duration::seconds(600),
            },
        };
        std::fs::write(&path, serde_json::to_string(&foreign).unwrap()).unwrap();

        let provider = provider(&server).with_cache_file(path);
        assert_eq!(provider.get_token().await.unwrap(), "mine");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_token_failure_reported() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/token")
            .with_status(400)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error": "invalid_client", "error_description": "Invalid client secret"}"#)
            .create_async()
            .await;

        let provider = provider(&server);
        match provider.get_token().await {
            Err(SetlistError::TokenRequest(message)) => {
                assert_eq!(message, "Invalid client secret")
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_invalidate_forces_new_request() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token": "abc", "expires_in": 3600}"#)
            .expect(2)
            .create_async()
            .await;

        let provider = provider(&server);
        provider.get_token().await.unwrap();
        provider.invalidate().await;
        provider.get_token().await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_invalidate_removes_cache_file() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token": "abc", "expires_in": 3600}"#)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        let provider = provider(&server).with_cache_file(path.clone());
        provider.get_token().await.unwrap();
        assert!(path.exists());

        provider.invalidate().await;
        assert!(!path.exists());

        // Already gone
        provider.invalidate().await;
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_invalidate_clears_memory_when_file_cannot_be_removed() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token": "abc", "expires_in": 3600}"#)
            .expect(2)
            .create_async()
            .await;

        // A directory at the cache path: reading, writing and removing all fail
        let dir = tempfile::tempdir().unwrap();
        let provider = provider(&server).with_cache_file(dir.path().to_path_buf());
        provider.get_token().await.unwrap();
        provider.invalidate().await;
        provider.get_token().await.unwrap();
        mock.assert_async().await;
        assert!(dir.path().is_dir());
    }
}
