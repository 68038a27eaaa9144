use crate::error::{Result, SearchError};
use crate::http::read_json;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

#[async_trait]
pub trait TokenRefresher: Send + Sync {
    /// Exchanges a refresh credential for a new access token.
    async fn refresh(&self, refresh_token: &str) -> std::result::Result<String, SearchError>;
}

/// OAuth2 `refresh_token` grant, as used by both HubSpot and Zoho.
#[derive(Debug, Clone)]
pub struct OAuthRefresher {
    client: Client,
    token_url: Url,
    client_id: String,
    client_secret: String,
}

impl OAuthRefresher {
    pub fn new(
        client: Client,
        token_url: &str,
        client_id: String,
        client_secret: String,
    ) -> Result<Self> {
        Ok(Self {
            client,
            token_url: Url::parse(token_url)?,
            client_id,
            client_secret,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error: Option<String>,
}

#[async_trait]
impl TokenRefresher for OAuthRefresher {
    async fn refresh(&self, refresh_token: &str) -> std::result::Result<String, SearchError> {
        let form = [
            ("grant_type", "refresh_token"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("refresh_token", refresh_token),
        ];
        let response = self
            .client
            .post(self.token_url.clone())
            .form(&form)
            .send()
            .await?;
        let token: TokenResponse = read_json(response).await?;

        // Zoho reports a bad refresh token as 200 with an `error` field.
        if let Some(error) = token.error {
            return Err(SearchError::Unauthorized { status: 200, body: error });
        }
        token
            .access_token
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| SearchError::Decode("token response has no access_token".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::{OAuthRefresher, TokenRefresher};
    use crate::http::build_client;
    use httpmock::prelude::*;
    use serde_json::json;

    fn refresher(server: &MockServer) -> OAuthRefresher {
        OAuthRefresher::new(
            build_client(None).expect("client"),
            &server.url("/oauth/v1/token"),
            "client".to_string(),
            "secret".to_string(),
        )
        .expect("refresher")
    }

    #[tokio::test]
    async fn refresh_posts_grant_and_reads_token() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/oauth/v1/token")
                .body_contains("grant_type=refresh_token")
                .body_contains("refresh_token=r-1");
            then.status(200)
                .json_body(json!({"access_token": "fresh", "expires_in": 1800}));
        });

        let token = refresher(&server).refresh("r-1").await.expect("refresh");
        mock.assert();
        assert_eq!(token, "fresh");
    }

    #[tokio::test]
    async fn refresh_surfaces_error_payload() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/oauth/v1/token");
            then.status(200).json_body(json!({"error": "invalid_code"}));
        });

        let err = refresher(&server).refresh("bad").await.unwrap_err();
        assert!(err.is_unauthorized());
    }

    #[tokio::test]
    async fn refresh_rejected_by_server() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/oauth/v1/token");
            then.status(400).json_body(json!({"status": "BAD_REFRESH_TOKEN"}));
        });

        assert!(refresher(&server).refresh("bad").await.is_err());
    }
}
