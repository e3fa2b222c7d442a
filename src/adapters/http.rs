use crate::config::ApiConfig;
use crate::domain::ports::Fetcher;
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, USER_AGENT};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

/// HTTP session against the users API.
pub struct ApiClient {
    client: Client,
    config: ApiConfig,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let user_agent =
            HeaderValue::from_str(&config.user_agent).map_err(|e| EtlError::InvalidConfigValueError {
                field: "api.user_agent".to_string(),
                value: config.user_agent.clone(),
                reason: e.to_string(),
            })?;
        headers.insert(USER_AGENT, user_agent);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self { client, config })
    }

    /// A single user; `Ok(None)` when the API does not answer with success.
    pub async fn fetch_user_by_id(&self, user_id: i64) -> Result<Option<Value>> {
        let url = self.config.user_url(user_id);
        tracing::debug!("Fetching user ID {}", user_id);

        let response = self.client.get(&url).send().await.map_err(|e| {
            tracing::error!("Error fetching user {}: {}", user_id, e);
            EtlError::ApiError(e)
        })?;

        if !response.status().is_success() {
            tracing::warn!("User {} not found (status {})", user_id, response.status());
            return Ok(None);
        }

        Ok(Some(response.json().await?))
    }
}

#[async_trait]
impl Fetcher for ApiClient {
    async fn fetch_users(&self) -> Result<Value> {
        let url = self.config.users_url();
        tracing::info!("🌐 Fetching data from API: {}", url);

        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                tracing::error!("Timeout calling API (>{}s)", self.config.timeout_seconds);
            } else if e.is_connect() {
                tracing::error!("Connection error calling API");
            } else {
                tracing::error!("Error calling API: {}", e);
            }
            EtlError::ApiError(e)
        })?;

        let status = response.status();
        tracing::debug!("API response status: {}", status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("API error: status {}", status);
            tracing::error!("Response: {}", body);
            return Err(EtlError::HttpStatusError {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        let data: Value = serde_json::from_slice(&bytes).map_err(|e| {
            tracing::error!("Error parsing JSON: {}", e);
            EtlError::InvalidResponse(e)
        })?;

        match data.as_array() {
            Some(items) => tracing::info!("📊 Data collected: {} records", items.len()),
            None => tracing::info!("📊 Data collected: non-list payload"),
        }
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::ErrorCategory;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client_for(server: &MockServer) -> ApiClient {
        ApiClient::new(ApiConfig {
            base_url: server.base_url(),
            timeout_seconds: 5,
            ..ApiConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_fetch_users_sends_session_headers() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/users")
                .header("user-agent", "DataCollector/2.0")
                .header("content-type", "application/json");
            then.status(200).json_body(json!([{"id": 1}, {"id": 2}]));
        });

        let data = client_for(&server).fetch_users().await.unwrap();

        api_mock.assert();
        assert_eq!(data.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_fetch_users_fails_on_error_status() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/users");
            then.status(500).body("boom");
        });

        let err = client_for(&server).fetch_users().await.unwrap_err();

        api_mock.assert();
        assert!(matches!(
            err,
            EtlError::HttpStatusError { status: 500, ref body } if body == "boom"
        ));
    }

    #[tokio::test]
    async fn test_fetch_users_fails_on_malformed_json() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/users");
            then.status(200).body("{not json");
        });

        let err = client_for(&server).fetch_users().await.unwrap_err();
        assert!(matches!(err, EtlError::InvalidResponse(_)));
        assert_eq!(err.category(), ErrorCategory::Transport);
    }

    #[tokio::test]
    async fn test_fetch_user_by_id() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/users/3");
            then.status(200).json_body(json!({"id": 3, "name": "Clementine"}));
        });
        server.mock(|when, then| {
            when.method(GET).path("/users/99");
            then.status(404);
        });

        let client = client_for(&server);
        let user = client.fetch_user_by_id(3).await.unwrap().unwrap();
        assert_eq!(user["name"], "Clementine");
        assert!(client.fetch_user_by_id(99).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_any_2xx_status_is_accepted() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/users");
            then.status(203).json_body(json!([{"id": 1}]));
        });

        let data = client_for(&server).fetch_users().await.unwrap();
        assert_eq!(data.as_array().unwrap().len(), 1);
    }
}
