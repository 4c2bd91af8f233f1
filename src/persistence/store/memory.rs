use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::order::{NewOrder, Order, OrderFilter, OrderUpdate};
use crate::persistence::core::{Repository, RepositoryError};

/// Process-local order store. Keeps insertion order.
#[derive(Debug, Default)]
pub struct InMemoryOrderStore {
    orders: RwLock<Vec<Order>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn parse_id(id: &str) -> Result<Uuid, RepositoryError> {
    Uuid::parse_str(id).map_err(|_| RepositoryError::NotFound)
}

#[async_trait]
impl Repository for InMemoryOrderStore {
    type Entity = Order;
    type Create = NewOrder;
    type Update = OrderUpdate;
    type Filter = OrderFilter;

    async fn find_one(&self, id: &str) -> Result<Order, RepositoryError> {
        let id = parse_id(id)?;
        let orders = self.orders.read().await;

        orders
            .iter()
            .find(|order| order.id == id)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn find_many(&self, filter: OrderFilter) -> Result<Vec<Order>, RepositoryError> {
        let orders = self.orders.read().await;

        Ok(orders
            .iter()
            .filter(|order| filter.matches(*order))
            .cloned()
            .collect())
    }

    async fn insert_one(&self, data: NewOrder) -> Result<Order, RepositoryError> {
        let order = Order::new(data);
        self.orders.write().await.push(order.clone());

        tracing::debug!(order_id = %order.id, "Inserted order into memory store");
        Ok(order)
    }

    async fn update_one(&self, id: &str, data: OrderUpdate) -> Result<Order, RepositoryError> {
        let id = parse_id(id)?;
        let mut orders = self.orders.write().await;

        let order = orders
            .iter_mut()
            .find(|order| order.id == id)
            .ok_or(RepositoryError::NotFound)?;
        order.apply_update(&data, Utc::now());

        Ok(order.clone())
    }

    async fn delete_one(&self, id: &str) -> Result<Order, RepositoryError> {
        let id = parse_id(id)?;
        let mut orders = self.orders.write().await;

        let index = orders
            .iter()
            .position(|order| order.id == id)
            .ok_or(RepositoryError::NotFound)?;

        Ok(orders.remove(index))
    }

    async fn delete_many(&self, filter: OrderFilter) -> Result<u64, RepositoryError> {
        let mut orders = self.orders.write().await;

        let before = orders.len();
        orders.retain(|order| !filter.matches(order));

        Ok((before - orders.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::{OrderField, OrderStatus};

    fn new_order(user_id: &str) -> NewOrder {
        NewOrder {
            user_id: user_id.to_string(),
            items: vec![],
            cost: 1.0,
            address: "A".to_string(),
            country: "C".to_string(),
            city: "Ci".to_string(),
            postal_code: "P".to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_then_find_one() {
        let store = InMemoryOrderStore::new();
        let order = store.insert_one(new_order("u1")).await.unwrap();

        let found = store.find_one(&order.id.to_string()).await.unwrap();
        assert_eq!(found, order);
    }

    #[tokio::test]
    async fn test_find_many_keeps_insertion_order() {
        let store = InMemoryOrderStore::new();
        let first = store.insert_one(new_order("u1")).await.unwrap();
        let second = store.insert_one(new_order("u1")).await.unwrap();

        let found = store
            .find_many(OrderFilter::all().where_eq(OrderField::UserId, "u1"))
            .await
            .unwrap();

        let ids: Vec<Uuid> = found.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
    }

    #[tokio::test]
    async fn test_delete_one_returns_removed_order() {
        let store = InMemoryOrderStore::new();
        let order = store.insert_one(new_order("u1")).await.unwrap();

        let removed = store.delete_one(&order.id.to_string()).await.unwrap();
        assert_eq!(removed.id, order.id);
        assert!(matches!(
            store.find_one(&order.id.to_string()).await,
            Err(RepositoryError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_delete_many_counts_removed() {
        let store = InMemoryOrderStore::new();
        let order = store.insert_one(new_order("u1")).await.unwrap();
        store.insert_one(new_order("u2")).await.unwrap();

        store
            .update_one(
                &order.id.to_string(),
                OrderUpdate {
                    status: OrderStatus::Shipped,
                    delivered_at: String::new(),
                },
            )
            .await
            .unwrap();

        let removed = store
            .delete_many(OrderFilter::all().where_eq(OrderField::Status, "shipped"))
            .await
            .unwrap();

        assert_eq!(removed, 1);
        assert_eq!(store.find_many(OrderFilter::all()).await.unwrap().len(), 1);
    }
}
