use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::aggregate::{format_timestamp, parse_timestamp, NewOrder, OrderUpdate};
use super::errors::OrderError;
use super::value_objects::{is_valid_status, Item, OrderStatus};

// ============================================================================
// Order Commands - Inbound payloads, validated before any I/O
// ============================================================================

/// Payload of `POST /orders`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrder {
    pub user_id: String,
    #[serde(default)]
    pub cart_id: Option<String>,
    #[serde(default)]
    pub items: Vec<Item>,
    pub cost: f64,
    pub address: String,
    pub country: String,
    pub city: String,
    pub postal_code: String,
    /// Accepted for compatibility, never honored.
    #[serde(default)]
    pub status: Option<String>,
}

/// Payload of `PUT /orders/{id}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrder {
    pub status: String,
    #[serde(default)]
    pub delivered_at: Option<String>,
}

fn require(field: &str, value: &str) -> Result<(), OrderError> {
    if value.trim().is_empty() {
        return Err(OrderError::InvalidInput(format!("{field} is required")));
    }
    Ok(())
}

fn require_amount(field: &str, value: f64) -> Result<(), OrderError> {
    if !value.is_finite() || value < 0.0 {
        return Err(OrderError::InvalidInput(format!(
            "{field} must be a non-negative number"
        )));
    }
    Ok(())
}

/// Gate for every status arriving from outside, in a path or a body.
pub fn parse_status(raw: &str) -> Result<OrderStatus, OrderError> {
    raw.parse()
        .map_err(|_| OrderError::InvalidInput("Invalid order status".to_string()))
}

impl CreateOrder {
    pub fn validate(&self) -> Result<(), OrderError> {
        require("userId", &self.user_id)?;
        require("address", &self.address)?;
        require("country", &self.country)?;
        require("city", &self.city)?;
        require("postalCode", &self.postal_code)?;
        require_amount("cost", self.cost)?;

        for item in &self.items {
            require("item id", &item.id)?;
            require_amount("item price", item.price)?;
        }

        if let Some(status) = &self.status {
            tracing::debug!(
                status = %status,
                recognized = is_valid_status(status),
                "Ignoring client-supplied status on new order"
            );
        }

        Ok(())
    }

    /// Validate and split into the repository input and the cart to clear.
    pub fn into_new_order(self) -> Result<(NewOrder, Option<String>), OrderError> {
        self.validate()?;

        let cart_id = self.cart_id.filter(|id| !id.trim().is_empty());
        let new_order = NewOrder {
            user_id: self.user_id,
            items: self.items,
            cost: self.cost,
            address: self.address,
            country: self.country,
            city: self.city,
            postal_code: self.postal_code,
        };

        Ok((new_order, cart_id))
    }
}

impl UpdateOrder {
    /// Validate the payload and derive `deliveredAt` for deliveries.
    ///
    /// An absent `deliveredAt` on any other status clears the stored one.
    pub fn into_update(self, now: DateTime<Utc>) -> Result<OrderUpdate, OrderError> {
        let status = parse_status(&self.status)?;

        if let Some(delivered_at) = &self.delivered_at {
            parse_timestamp(delivered_at)
                .map_err(|_| OrderError::InvalidInput("Invalid date time format".to_string()))?;
        }

        let delivered_at = match (status, self.delivered_at) {
            (OrderStatus::Delivered, None) => format_timestamp(now),
            (_, delivered_at) => delivered_at.unwrap_or_default(),
        };

        Ok(OrderUpdate {
            status,
            delivered_at,
        })
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
