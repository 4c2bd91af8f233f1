use chrono::{DateTime, Days, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::value_objects::{Item, OrderStatus};

// ============================================================================
// Order Aggregate
// ============================================================================
//
// Invariants:
// - id, items, cost and the shipping destination never change after creation
// - a new order always starts out Pending
// - expected_delivery_date is derived from the creation time, never supplied
// - status, delivered_at and updated_at change only through an OrderUpdate
//
// ============================================================================

/// Timestamp layout shared by `createdAt`, `updatedAt` and `deliveredAt`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Days between order creation and expected delivery.
pub const DELIVERY_WINDOW_DAYS: u64 = 7;

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
}

/// Creation time plus the delivery window, truncated to the day.
pub fn derive_expected_delivery(created_at: DateTime<Utc>) -> NaiveDate {
    created_at.date_naive() + Days::new(DELIVERY_WINDOW_DAYS)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    // Identity
    pub id: Uuid,
    pub user_id: String,

    // Contents
    pub items: Vec<Item>,
    pub cost: f64,

    // Lifecycle
    pub status: OrderStatus,
    pub expected_delivery_date: NaiveDate,
    pub delivered_at: String,

    // Shipping destination
    pub address: String,
    pub country: String,
    pub city: String,
    pub postal_code: String,

    // Audit Trail
    pub created_at: String,
    pub updated_at: String,
}

/// Validated creation input. Carries no status: new orders are always pending.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub user_id: String,
    pub items: Vec<Item>,
    pub cost: f64,
    pub address: String,
    pub country: String,
    pub city: String,
    pub postal_code: String,
}

/// Partial update applied by `update_one`.
///
/// Both fields replace the stored values; an empty `delivered_at` clears it.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderUpdate {
    pub status: OrderStatus,
    pub delivered_at: String,
}

impl Order {
    pub fn new(data: NewOrder) -> Self {
        Self::new_at(data, Utc::now())
    }

    /// Build a pending order stamped with the given creation time.
    pub fn new_at(data: NewOrder, now: DateTime<Utc>) -> Self {
        let created_at = format_timestamp(now);

        Self {
            id: Uuid::new_v4(),
            user_id: data.user_id,
            items: data.items,
            cost: data.cost,
            status: OrderStatus::Pending,
            expected_delivery_date: derive_expected_delivery(now),
            delivered_at: String::new(),
            address: data.address,
            country: data.country,
            city: data.city,
            postal_code: data.postal_code,
            updated_at: created_at.clone(),
            created_at,
        }
    }

    pub fn apply_update(&mut self, update: &OrderUpdate, now: DateTime<Utc>) {
        self.status = update.status;
        self.delivered_at = update.delivered_at.clone();
        self.updated_at = format_timestamp(now);
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
