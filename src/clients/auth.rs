use async_trait::async_trait;
use prometheus::IntGauge;
use serde::Deserialize;

#[cfg(test)]
use mockall::automock;

use super::{endpoint, through_breaker, ClientError};
use crate::utils::{CircuitBreaker, CircuitBreakerConfig};

const SERVICE: &str = "auth";

/// Caller identity returned by the auth collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub user_id: String,
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Resolve a bearer token. Any rejection is `ClientError::Unauthorized`.
    async fn validate_token(&self, token: &str) -> Result<Identity, ClientError>;
}

pub struct HttpAuthClient {
    client: reqwest::Client,
    verify_url: String,
    circuit_breaker: CircuitBreaker,
}

impl HttpAuthClient {
    pub fn new(client: reqwest::Client, base_url: &str, gauge: IntGauge) -> Self {
        Self {
            client,
            verify_url: endpoint(base_url, "/auth/verify"),
            circuit_breaker: CircuitBreaker::new(SERVICE, CircuitBreakerConfig::default())
                .with_gauge(gauge),
        }
    }

    /// `Ok(None)` is a rejected token; only transport errors and 5xx are failures.
    async fn verify(&self, token: &str) -> Result<Option<Identity>, ClientError> {
        let response = self
            .client
            .get(&self.verify_url)
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        if status.is_server_error() {
            return Err(ClientError::UnexpectedStatus {
                service: SERVICE,
                status: status.as_u16(),
            });
        }
        if status != reqwest::StatusCode::OK {
            tracing::debug!(status = status.as_u16(), "Token rejected by auth service");
            return Ok(None);
        }

        let identity: Identity = response.json().await?;
        Ok(Some(identity))
    }
}

#[async_trait]
impl AuthService for HttpAuthClient {
    async fn validate_token(&self, token: &str) -> Result<Identity, ClientError> {
        let result = self.circuit_breaker.call(self.verify(token)).await;

        match through_breaker(SERVICE, result)? {
            Some(identity) if !identity.user_id.trim().is_empty() => Ok(identity),
            _ => Err(ClientError::Unauthorized),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_reads_camel_case() {
        let identity: Identity = serde_json::from_str(r#"{"userId":"u1"}"#).unwrap();
        assert_eq!(identity.user_id, "u1");
    }

    #[tokio::test]
    async fn test_unreachable_auth_service_is_transport_error() {
        let gauge = IntGauge::new("test_auth_breaker", "test").unwrap();
        let client = HttpAuthClient::new(reqwest::Client::new(), "http://127.0.0.1:1", gauge);

        let result = client.validate_token("token").await;
        assert!(matches!(result, Err(ClientError::Http(_))));
    }
}
