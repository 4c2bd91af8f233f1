// ============================================================================
// Persistence Core - Generic repository abstractions
// ============================================================================
//
// No domain-specific code lives here: the contract and the filter primitive
// work for any entity type.
//
// ============================================================================

pub mod error;
pub mod filter;
pub mod repository;

pub use error::RepositoryError;
pub use filter::{Filter, Filterable};
pub use repository::Repository;
