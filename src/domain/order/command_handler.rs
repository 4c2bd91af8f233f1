use std::future::Future;
use std::sync::Arc;

use chrono::Utc;

use crate::clients::{CartService, ClientError, Email, NotificationService};
use crate::metrics::{Metrics, SideEffectOutcome};

use super::aggregate::Order;
use super::commands::{CreateOrder, UpdateOrder};
use super::errors::OrderError;
use super::repository::OrderRepository;

// ============================================================================
// Order Command Handler
// ============================================================================
//
// Orchestrates: Command → Validation → Repository → best-effort side effects
//
// The primary write decides the outcome. Cart clearing and emails run only
// after it succeeded, and their failures are logged and counted but never
// returned to the caller.
//
// ============================================================================

const CART: &str = "cart";
const NOTIFICATION: &str = "notification";

#[derive(Clone)]
pub struct OrderCommandHandler {
    orders: OrderRepository,
    carts: Option<Arc<dyn CartService>>,
    notifications: Option<Arc<dyn NotificationService>>,
    metrics: Arc<Metrics>,
}

impl OrderCommandHandler {
    pub fn new(orders: OrderRepository, metrics: Arc<Metrics>) -> Self {
        Self {
            orders,
            carts: None,
            notifications: None,
            metrics,
        }
    }

    pub fn with_carts(mut self, carts: Arc<dyn CartService>) -> Self {
        self.carts = Some(carts);
        self
    }

    pub fn with_notifications(mut self, notifications: Arc<dyn NotificationService>) -> Self {
        self.notifications = Some(notifications);
        self
    }

    /// Validate, persist, then clear the cart and send the confirmation email.
    pub async fn create_order(&self, command: CreateOrder) -> Result<Order, OrderError> {
        let (new_order, cart_id) = command.into_new_order()?;

        let order = self.orders.insert_one(new_order).await?;
        self.metrics.record_order_created();
        tracing::info!(order_id = %order.id, user_id = %order.user_id, "Order created");

        match (&self.carts, cart_id) {
            (Some(carts), Some(cart_id)) => {
                self.best_effort(CART, carts.clear_cart(&cart_id)).await;
            }
            _ => self.metrics.record_side_effect(CART, SideEffectOutcome::Skipped),
        }

        let email = Email::order_created(&order.user_id, &order.id.to_string());
        self.notify(&email).await;

        Ok(order)
    }

    /// Validate the status change, persist it, then email the owner.
    pub async fn update_order(&self, id: &str, command: UpdateOrder) -> Result<Order, OrderError> {
        let update = command.into_update(Utc::now())?;

        let order = self.orders.update_one(id, update).await?;
        self.metrics.record_order_updated(order.status.as_str());
        tracing::info!(order_id = %order.id, status = %order.status, "Order updated");

        let email = Email::order_status_updated(&order.user_id, &order.id.to_string(), order.status);
        self.notify(&email).await;

        Ok(order)
    }

    async fn notify(&self, email: &Email) {
        match &self.notifications {
            Some(notifications) => {
                self.best_effort(NOTIFICATION, notifications.send_email(email))
                    .await
            }
            None => self
                .metrics
                .record_side_effect(NOTIFICATION, SideEffectOutcome::Skipped),
        }
    }

    async fn best_effort<F>(&self, collaborator: &'static str, call: F)
    where
        F: Future<Output = Result<(), ClientError>>,
    {
        match call.await {
            Ok(()) => self
                .metrics
                .record_side_effect(collaborator, SideEffectOutcome::Success),
            Err(e) => {
                tracing::warn!(collaborator, error = %e, "Side effect failed, order kept");
                self.metrics
                    .record_side_effect(collaborator, SideEffectOutcome::Failure);
            }
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
