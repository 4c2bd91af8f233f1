// ============================================================================
// Persistence Store - Concrete order stores
// ============================================================================
//
// - postgres: production store backed by a shared `PgPool`
// - memory:   process-local store for tests and database-less local runs
//
// ============================================================================

pub mod memory;
pub mod postgres;

pub use memory::InMemoryOrderStore;
pub use postgres::PgOrderStore;
