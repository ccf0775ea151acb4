//! API client for a running premium-api server

use anyhow::{Context, Result};
use premium_lib::FeatureRecord;
use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Non-success answer from the server
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request rejected ({status}): {message}")]
    Rejected { status: StatusCode, message: String },

    #[error("server failed to predict ({status}): {message}")]
    Server { status: StatusCode, message: String },
}

/// API client for the prediction endpoint
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = Url::parse(base_url).context("Invalid API URL")?;

        Ok(Self { client, base_url })
    }

    /// Ask the server's default model for a premium
    pub async fn predict(&self, record: &FeatureRecord) -> Result<PredictResponse> {
        self.post("predict", record).await
    }

    /// Make a POST request with JSON body
    pub async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.base_url.join(path).context("Invalid path")?;

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .context("Failed to send request")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            let err = if status.is_client_error() {
                ClientError::Rejected { status, message }
            } else {
                ClientError::Server { status, message }
            };
            return Err(err.into());
        }

        response.json().await.context("Failed to parse response")
    }
}

// API response types

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictResponse {
    pub predicted_premium: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_base_url() {
        assert!(ApiClient::new("not a url").is_err());
    }

    #[tokio::test]
    async fn test_predict_posts_all_fields() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/predict")
            .match_header("content-type", "application/json")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "Age": 35,
                "AnyTransplants": 0,
                "AgeGroup_31-45": true
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"predicted_premium": 24150.4873}"#)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let response = client.predict(&FeatureRecord::default()).await.unwrap();

        assert_eq!(response.predicted_premium, 24150.4873);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_bad_request_is_rejected() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/predict")
            .with_status(400)
            .with_body(r#"{"error": "expected a JSON object", "code": "malformed_request"}"#)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let err = client.predict(&FeatureRecord::default()).await.unwrap_err();

        match err.downcast_ref::<ClientError>() {
            Some(ClientError::Rejected { status, message }) => {
                assert_eq!(*status, StatusCode::BAD_REQUEST);
                assert_eq!(message, "expected a JSON object");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_server_error_keeps_plain_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/predict")
            .with_status(500)
            .with_body("model exploded")
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let err = client.predict(&FeatureRecord::default()).await.unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ClientError>(),
            Some(ClientError::Server { message, .. }) if message == "model exploded"
        ));
    }
}
