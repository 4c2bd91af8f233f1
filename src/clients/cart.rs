use async_trait::async_trait;
use prometheus::IntGauge;

#[cfg(test)]
use mockall::automock;

use super::{resource_url, through_breaker, ClientError};
use crate::utils::{CircuitBreaker, CircuitBreakerConfig};

const SERVICE: &str = "cart";

#[cfg_attr(test, automock)]
#[async_trait]
pub trait CartService: Send + Sync {
    async fn clear_cart(&self, cart_id: &str) -> Result<(), ClientError>;
}

pub struct HttpCartClient {
    client: reqwest::Client,
    base_url: String,
    circuit_breaker: CircuitBreaker,
}

impl HttpCartClient {
    pub fn new(client: reqwest::Client, base_url: &str, gauge: IntGauge) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
            circuit_breaker: CircuitBreaker::new(SERVICE, CircuitBreakerConfig::default())
                .with_gauge(gauge),
        }
    }

    async fn delete_cart(&self, url: reqwest::Url) -> Result<(), ClientError> {
        let response = self.client.delete(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::UnexpectedStatus {
                service: SERVICE,
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl CartService for HttpCartClient {
    async fn clear_cart(&self, cart_id: &str) -> Result<(), ClientError> {
        // Malformed ids fail before the breaker sees a call.
        let url = resource_url(&self.base_url, "carts", cart_id)?;
        let result = self.circuit_breaker.call(self.delete_cart(url)).await;
        through_breaker(SERVICE, result)?;

        tracing::debug!(cart_id = %cart_id, "Cart cleared");
        Ok(())
    }
}
