use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder, Row};
use uuid::Uuid;

use crate::domain::order::{
    format_timestamp, Item, NewOrder, Order, OrderField, OrderFilter, OrderStatus, OrderUpdate,
};
use crate::persistence::core::{Filter, Repository, RepositoryError};

// ============================================================================
// PostgreSQL Order Store
// ============================================================================
//
// Filters are translated into parameterised WHERE clauses; values are always
// bound, never interpolated. Single-row writes use `... RETURNING` so that
// update-and-return and delete-and-return are one atomic statement each.
//
// ============================================================================

const SCHEMA_SQL: &str = include_str!("sql/schema.sql");

macro_rules! order_columns {
    () => {
        "id, user_id, items, cost, status, expected_delivery_date, delivered_at, \
         address, country, city, postal_code, created_at, updated_at"
    };
}

const SELECT_ORDERS_SQL: &str = concat!("SELECT ", order_columns!(), " FROM orders");
const FIND_ORDER_SQL: &str = concat!("SELECT ", order_columns!(), " FROM orders WHERE id = $1");
const INSERT_ORDER_SQL: &str = concat!(
    "INSERT INTO orders (",
    order_columns!(),
    ") VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)"
);
const UPDATE_ORDER_SQL: &str = concat!(
    "UPDATE orders SET status = $2, delivered_at = $3, updated_at = $4 \
     WHERE id = $1 RETURNING ",
    order_columns!()
);
const DELETE_ORDER_SQL: &str = concat!("DELETE FROM orders WHERE id = $1 RETURNING ", order_columns!());
const DELETE_ORDERS_SQL: &str = "DELETE FROM orders";

/// Maps a filter field key onto its column.
pub trait ColumnName {
    fn column(&self) -> &'static str;
}

impl ColumnName for OrderField {
    fn column(&self) -> &'static str {
        match self {
            OrderField::UserId => "user_id",
            OrderField::Status => "status",
        }
    }
}

/// Append `WHERE a = $n AND b = $m ...` for every constraint in the filter.
pub fn push_filter<K: ColumnName>(builder: &mut QueryBuilder<'_, Postgres>, filter: &Filter<K>) {
    for (index, constraint) in filter.constraints().iter().enumerate() {
        builder.push(if index == 0 { " WHERE " } else { " AND " });
        builder
            .push(constraint.field.column())
            .push(" = ")
            .push_bind(constraint.value.clone());
    }
}

fn parse_id(id: &str) -> Result<Uuid, RepositoryError> {
    Uuid::parse_str(id).map_err(|_| RepositoryError::NotFound)
}

#[derive(Debug, Clone)]
pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the `orders` table and its indexes if they are missing.
    pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
        sqlx::raw_sql(SCHEMA_SQL).execute(pool).await?;
        tracing::info!("Order schema is ready");
        Ok(())
    }
}

#[async_trait]
impl Repository for PgOrderStore {
    type Entity = Order;
    type Create = NewOrder;
    type Update = OrderUpdate;
    type Filter = OrderFilter;

    async fn find_one(&self, id: &str) -> Result<Order, RepositoryError> {
        let id = parse_id(id)?;

        sqlx::query_as::<Postgres, Order>(FIND_ORDER_SQL)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    async fn find_many(&self, filter: OrderFilter) -> Result<Vec<Order>, RepositoryError> {
        let mut builder = QueryBuilder::<Postgres>::new(SELECT_ORDERS_SQL);
        push_filter(&mut builder, &filter);
        builder.push(" ORDER BY created_at");

        let orders = builder
            .build_query_as::<Order>()
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!(
            constraints = filter.constraints().len(),
            count = orders.len(),
            "Loaded orders"
        );
        Ok(orders)
    }

    async fn insert_one(&self, data: NewOrder) -> Result<Order, RepositoryError> {
        let order = Order::new(data);

        sqlx::query(INSERT_ORDER_SQL)
            .bind(order.id)
            .bind(&order.user_id)
            .bind(Json(&order.items))
            .bind(order.cost)
            .bind(order.status.as_str())
            .bind(order.expected_delivery_date)
            .bind(&order.delivered_at)
            .bind(&order.address)
            .bind(&order.country)
            .bind(&order.city)
            .bind(&order.postal_code)
            .bind(&order.created_at)
            .bind(&order.updated_at)
            .execute(&self.pool)
            .await?;

        tracing::info!(order_id = %order.id, user_id = %order.user_id, "Inserted order");
        Ok(order)
    }

    async fn update_one(&self, id: &str, data: OrderUpdate) -> Result<Order, RepositoryError> {
        let id = parse_id(id)?;

        sqlx::query_as::<Postgres, Order>(UPDATE_ORDER_SQL)
            .bind(id)
            .bind(data.status.as_str())
            .bind(data.delivered_at)
            .bind(format_timestamp(Utc::now()))
            .fetch_optional(&self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    async fn delete_one(&self, id: &str) -> Result<Order, RepositoryError> {
        let id = parse_id(id)?;

        sqlx::query_as::<Postgres, Order>(DELETE_ORDER_SQL)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    async fn delete_many(&self, filter: OrderFilter) -> Result<u64, RepositoryError> {
        if filter.is_empty() {
            tracing::warn!("Deleting every order");
        }

        let mut builder = QueryBuilder::<Postgres>::new(DELETE_ORDERS_SQL);
        push_filter(&mut builder, &filter);

        let removed = builder.build().execute(&self.pool).await?.rows_affected();

        tracing::info!(removed, "Deleted orders");
        Ok(removed)
    }
}

impl<'r> FromRow<'r, PgRow> for Order {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let status: String = row.try_get("status")?;
        let status = status
            .parse::<OrderStatus>()
            .map_err(|e| sqlx::Error::ColumnDecode {
                index: "status".to_string(),
                source: Box::new(e),
            })?;
        let Json(items): Json<Vec<Item>> = row.try_get("items")?;

        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            items,
            cost: row.try_get("cost")?,
            status,
            expected_delivery_date: row.try_get("expected_delivery_date")?,
            delivered_at: row.try_get("delivered_at")?,
            address: row.try_get("address")?,
            country: row.try_get("country")?,
            city: row.try_get("city")?,
            postal_code: row.try_get("postal_code")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
//
// Statements against a live database belong to integration testing; these
// cover SQL construction only.
//
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filter_has_no_where_clause() {
        let mut builder = QueryBuilder::<Postgres>::new(SELECT_ORDERS_SQL);
        push_filter(&mut builder, &OrderFilter::all());

        assert!(!builder.sql().contains("WHERE"));
    }

    #[test]
    fn test_filter_becomes_bound_conjunction() {
        let filter = OrderFilter::all()
            .where_eq(OrderField::UserId, "u1'; DROP TABLE orders; --")
            .where_eq(OrderField::Status, "shipped");

        let mut builder = QueryBuilder::<Postgres>::new(DELETE_ORDERS_SQL);
        push_filter(&mut builder, &filter);

        assert_eq!(
            builder.sql(),
            "DELETE FROM orders WHERE user_id = $1 AND status = $2"
        );
    }

    #[test]
    fn test_statements_share_the_column_list() {
        assert!(FIND_ORDER_SQL.starts_with("SELECT id, user_id, items,"));
        assert!(UPDATE_ORDER_SQL.contains("RETURNING id, user_id"));
        assert!(DELETE_ORDER_SQL.ends_with("created_at, updated_at"));
        assert_eq!(INSERT_ORDER_SQL.matches('$').count(), 13);
    }

    #[test]
    fn test_schema_creates_orders_table() {
        assert!(SCHEMA_SQL.contains("CREATE TABLE IF NOT EXISTS orders"));
    }
}
