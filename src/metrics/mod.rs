// Private module declaration
mod server;

use prometheus::{IntCounter, IntCounterVec, IntGauge, IntGaugeVec, Opts, Registry};

pub use server::metrics_handler;

// ============================================================================
// Metrics Module - Prometheus metrics for the order service
// ============================================================================
//
// Covers:
// - order lifecycle writes (create, update by status, delete by scope)
// - best-effort side effects per collaborator and outcome
// - circuit breaker state per collaborator
//
// Scraped via GET /metrics.
// ============================================================================

/// Outcome label for a best-effort side effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideEffectOutcome {
    Success,
    Failure,
    Skipped,
}

impl SideEffectOutcome {
    fn as_label(&self) -> &'static str {
        match self {
            SideEffectOutcome::Success => "success",
            SideEffectOutcome::Failure => "failure",
            SideEffectOutcome::Skipped => "skipped",
        }
    }
}

pub struct Metrics {
    registry: Registry,

    // Order Lifecycle Metrics
    pub orders_created: IntCounter,
    pub orders_updated: IntCounterVec,
    pub orders_deleted: IntCounterVec,

    // Side Effect Metrics
    pub side_effect_calls: IntCounterVec,

    // Circuit Breaker Metrics
    pub circuit_breaker_state: IntGaugeVec,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let orders_created = IntCounter::new("orders_created_total", "Total orders created")?;
        registry.register(Box::new(orders_created.clone()))?;

        let orders_updated = IntCounterVec::new(
            Opts::new("orders_updated_total", "Total order updates by resulting status"),
            &["status"],
        )?;
        registry.register(Box::new(orders_updated.clone()))?;

        let orders_deleted = IntCounterVec::new(
            Opts::new("orders_deleted_total", "Total orders deleted by request scope"),
            &["scope"],
        )?;
        registry.register(Box::new(orders_deleted.clone()))?;

        let side_effect_calls = IntCounterVec::new(
            Opts::new(
                "side_effect_calls_total",
                "Best-effort collaborator calls by outcome",
            ),
            &["collaborator", "outcome"],
        )?;
        registry.register(Box::new(side_effect_calls.clone()))?;

        let circuit_breaker_state = IntGaugeVec::new(
            Opts::new(
                "circuit_breaker_state",
                "Circuit breaker state (0=Closed, 1=Open, 2=HalfOpen)",
            ),
            &["collaborator"],
        )?;
        registry.register(Box::new(circuit_breaker_state.clone()))?;

        Ok(Self {
            registry,
            orders_created,
            orders_updated,
            orders_deleted,
            side_effect_calls,
            circuit_breaker_state,
        })
    }

    /// Get the Prometheus registry for exposing metrics via HTTP
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn record_order_created(&self) {
        self.orders_created.inc();
    }

    pub fn record_order_updated(&self, status: &str) {
        self.orders_updated.with_label_values(&[status]).inc();
    }

    pub fn record_orders_deleted(&self, scope: &str, count: u64) {
        self.orders_deleted.with_label_values(&[scope]).inc_by(count);
    }

    pub fn record_side_effect(&self, collaborator: &str, outcome: SideEffectOutcome) {
        self.side_effect_calls
            .with_label_values(&[collaborator, outcome.as_label()])
            .inc();
    }

    /// Gauge handed to a collaborator's circuit breaker.
    pub fn circuit_breaker_gauge(&self, collaborator: &str) -> IntGauge {
        self.circuit_breaker_state.with_label_values(&[collaborator])
    }
}
