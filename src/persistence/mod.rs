// ============================================================================
// Persistence Layer
// ============================================================================
//
// Generic repository contract and filter primitive (core), plus the stores
// that instantiate it for orders (store).
//
// ============================================================================

mod core;
mod store;

pub use self::core::*;
pub use self::store::*;
