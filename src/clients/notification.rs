use async_trait::async_trait;
use prometheus::IntGauge;
use serde::Serialize;

#[cfg(test)]
use mockall::automock;

use super::{endpoint, through_breaker, ClientError};
use crate::domain::order::OrderStatus;
use crate::utils::{CircuitBreaker, CircuitBreakerConfig};

const SERVICE: &str = "notification";

/// Body of `POST /notifications/email`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Email {
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub user_id: String,
}

impl Email {
    pub fn order_created(user_id: &str, order_id: &str) -> Self {
        Self {
            title: "Order created".to_string(),
            message: format!("Your order {order_id} has been placed."),
            kind: "order_created".to_string(),
            user_id: user_id.to_string(),
        }
    }

    pub fn order_status_updated(user_id: &str, order_id: &str, status: OrderStatus) -> Self {
        Self {
            title: "Order status updated".to_string(),
            message: format!("Your order {order_id} is now {status}."),
            kind: "order_status_updated".to_string(),
            user_id: user_id.to_string(),
        }
    }
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait NotificationService: Send + Sync {
    async fn send_email(&self, email: &Email) -> Result<(), ClientError>;
}

pub struct HttpNotificationClient {
    client: reqwest::Client,
    email_url: String,
    circuit_breaker: CircuitBreaker,
}

impl HttpNotificationClient {
    pub fn new(client: reqwest::Client, base_url: &str, gauge: IntGauge) -> Self {
        Self {
            client,
            email_url: endpoint(base_url, "/notifications/email"),
            circuit_breaker: CircuitBreaker::new(SERVICE, CircuitBreakerConfig::default())
                .with_gauge(gauge),
        }
    }

    async fn post_email(&self, email: &Email) -> Result<(), ClientError> {
        let response = self.client.post(&self.email_url).json(email).send().await?;

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
impl NotificationService for HttpNotificationClient {
    async fn send_email(&self, email: &Email) -> Result<(), ClientError> {
        let result = self.circuit_breaker.call(self.post_email(email)).await;
        through_breaker(SERVICE, result)?;

        tracing::debug!(user_id = %email.user_id, kind = %email.kind, "Email sent");
        Ok(())
    }
}
