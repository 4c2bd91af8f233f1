use std::borrow::Cow;
use std::sync::Arc;

use crate::persistence::{Filter, Filterable, Repository, RepositoryError};

use super::aggregate::{NewOrder, Order, OrderUpdate};
use super::value_objects::{OrderField, OrderStatus};

// ============================================================================
// Order Repository
// ============================================================================
//
// Orders instantiate the generic repository contract; every order-specific
// finder is a filter composed over `find_many` / `delete_many`.
//
// ============================================================================

pub type OrderFilter = Filter<OrderField>;

/// Any store that persists orders through the generic repository contract.
pub trait OrderStore:
    Repository<Entity = Order, Create = NewOrder, Update = OrderUpdate, Filter = OrderFilter>
{
}

impl<T> OrderStore for T where
    T: Repository<Entity = Order, Create = NewOrder, Update = OrderUpdate, Filter = OrderFilter>
{
}

impl Filterable for Order {
    type Field = OrderField;

    fn field_value(&self, field: &OrderField) -> Cow<'_, str> {
        match field {
            OrderField::UserId => Cow::Borrowed(&self.user_id),
            OrderField::Status => Cow::Borrowed(self.status.as_str()),
        }
    }
}

#[derive(Clone)]
pub struct OrderRepository {
    store: Arc<dyn OrderStore>,
}

impl OrderRepository {
    pub fn new(store: Arc<dyn OrderStore>) -> Self {
        Self { store }
    }

    pub async fn find_one(&self, id: &str) -> Result<Order, RepositoryError> {
        self.store.find_one(id).await
    }

    pub async fn find_all(&self) -> Result<Vec<Order>, RepositoryError> {
        self.store.find_many(OrderFilter::all()).await
    }

    pub async fn find_by_user(&self, user_id: &str) -> Result<Vec<Order>, RepositoryError> {
        self.store
            .find_many(OrderFilter::all().where_eq(OrderField::UserId, user_id))
            .await
    }

    pub async fn find_by_status(&self, status: OrderStatus) -> Result<Vec<Order>, RepositoryError> {
        self.store
            .find_many(OrderFilter::all().where_eq(OrderField::Status, status.as_str()))
            .await
    }

    pub async fn find_by_user_and_status(
        &self,
        user_id: &str,
        status: OrderStatus,
    ) -> Result<Vec<Order>, RepositoryError> {
        let filter = OrderFilter::all()
            .where_eq(OrderField::UserId, user_id)
            .where_eq(OrderField::Status, status.as_str());

        self.store.find_many(filter).await
    }

    pub async fn insert_one(&self, data: NewOrder) -> Result<Order, RepositoryError> {
        self.store.insert_one(data).await
    }

    /// Sets status and (when supplied) deliveredAt, refreshing updatedAt.
    pub async fn update_one(&self, id: &str, data: OrderUpdate) -> Result<Order, RepositoryError> {
        self.store.update_one(id, data).await
    }

    pub async fn delete_one(&self, id: &str) -> Result<Order, RepositoryError> {
        self.store.delete_one(id).await
    }

    pub async fn delete_all(&self) -> Result<u64, RepositoryError> {
        self.store.delete_many(OrderFilter::all()).await
    }

    pub async fn delete_all_by_user(&self, user_id: &str) -> Result<u64, RepositoryError> {
        self.store
            .delete_many(OrderFilter::all().where_eq(OrderField::UserId, user_id))
            .await
    }
}

#[cfg(test)]
mockall::mock! {
    /// Store double for asserting which storage calls a flow makes.
    pub OrderRepo {}

    #[async_trait::async_trait]
    impl Repository for OrderRepo {
        type Entity = Order;
        type Create = NewOrder;
        type Update = OrderUpdate;
        type Filter = OrderFilter;

        async fn find_one(&self, id: &str) -> Result<Order, RepositoryError>;
        async fn find_many(&self, filter: OrderFilter) -> Result<Vec<Order>, RepositoryError>;
        async fn insert_one(&self, data: NewOrder) -> Result<Order, RepositoryError>;
        async fn update_one(&self, id: &str, data: OrderUpdate) -> Result<Order, RepositoryError>;
        async fn delete_one(&self, id: &str) -> Result<Order, RepositoryError>;
        async fn delete_many(&self, filter: OrderFilter) -> Result<u64, RepositoryError>;
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
