// ============================================================================
// Order Domain - Business Logic for the Order Aggregate
// ============================================================================
//
// This module contains ALL Order-specific code:
// - Value objects (Item, OrderStatus, OrderField)
// - Aggregate (Order, NewOrder, OrderUpdate and the clock rules)
// - Commands (CreateOrder, UpdateOrder payload validation)
// - Errors (OrderError enum)
// - Repository (OrderRepository finders over any OrderStore)
// - Command Handler (OrderCommandHandler with best-effort side effects)
//
// ============================================================================

pub mod value_objects;
pub mod aggregate;
pub mod commands;
pub mod errors;
pub mod repository;
pub mod command_handler;

// Re-export for convenience
pub use value_objects::*;
pub use aggregate::*;
pub use commands::*;
pub use errors::*;
pub use repository::*;
pub use command_handler::*;
