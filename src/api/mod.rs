// ============================================================================
// HTTP Surface - actix-web routes over the order domain
// ============================================================================
//
// Reads and deletes go straight to the repository; creates and updates go
// through the command handler. Identity-scoped ("me") routes resolve the
// caller through the auth collaborator before touching storage.
//
// ============================================================================

mod auth;
mod errors;
mod handlers;
mod middleware;

use std::sync::Arc;

use crate::clients::AuthService;
use crate::domain::order::{OrderCommandHandler, OrderRepository};
use crate::metrics::Metrics;

pub use auth::CallerIdentity;
pub use handlers::configure;
pub use middleware::{cors, request_logger};

/// Shared state injected into every handler.
#[derive(Clone)]
pub struct AppState {
    pub orders: OrderRepository,
    pub commands: OrderCommandHandler,
    pub auth: Arc<dyn AuthService>,
    pub metrics: Arc<Metrics>,
}
