//! Metrics collection for observability
//!
//! Prometheus metrics for the chain actor, held in a private registry so
//! several nodes (or tests) can coexist in one process.
//!
//! # Metrics
//!
//! - `chain_operations_evaluated_total` - Operations that passed evaluation
//! - `chain_operations_rejected_total` - Operations rejected during evaluation
//! - `chain_transactions_applied_total` - Transactions applied
//! - `chain_apply_duration_seconds` - Histogram of transaction latencies
//! - `chain_cheques_redeemed_total` - Cheque slots redeemed

use prometheus::{Histogram, HistogramOpts, IntCounter, Registry};
use std::sync::Arc;

/// Metrics collector
#[derive(Clone, Debug)]
pub struct Metrics {
    /// Operations that passed evaluation
    pub operations_evaluated: IntCounter,

    /// Operations rejected during evaluation
    pub operations_rejected: IntCounter,

    /// Transactions applied
    pub transactions_applied: IntCounter,

    /// Apply duration histogram
    pub apply_duration: Histogram,

    /// Cheque slots redeemed
    pub cheques_redeemed: IntCounter,

    /// Prometheus registry
    pub registry: Arc<Registry>,
}

impl Metrics {
    /// Create new metrics collector
    pub fn new() -> prometheus::Result<Self> {
        let registry = Arc::new(Registry::new());

        let operations_evaluated = IntCounter::new(
            "chain_operations_evaluated_total",
            "Operations that passed evaluation",
        )?;
        registry.register(Box::new(operations_evaluated.clone()))?;

        let operations_rejected = IntCounter::new(
            "chain_operations_rejected_total",
            "Operations rejected during evaluation",
        )?;
        registry.register(Box::new(operations_rejected.clone()))?;

        let transactions_applied = IntCounter::new(
            "chain_transactions_applied_total",
            "Transactions applied",
        )?;
        registry.register(Box::new(transactions_applied.clone()))?;

        let apply_duration = Histogram::with_opts(
            HistogramOpts::new(
                "chain_apply_duration_seconds",
                "Histogram of transaction apply latencies",
            )
            .buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.010, 0.050, 0.100, 0.500]),
        )?;
        registry.register(Box::new(apply_duration.clone()))?;

        let cheques_redeemed = IntCounter::new(
            "chain_cheques_redeemed_total",
            "Cheque slots redeemed",
        )?;
        registry.register(Box::new(cheques_redeemed.clone()))?;

        Ok(Self {
            operations_evaluated,
            operations_rejected,
            transactions_applied,
            apply_duration,
            cheques_redeemed,
            registry,
        })
    }

    /// Record an operation that passed evaluation
    pub fn record_evaluated(&self) {
        self.operations_evaluated.inc();
    }

    /// Record a rejected operation
    pub fn record_rejected(&self) {
        self.operations_rejected.inc();
    }

    /// Record an applied transaction
    pub fn record_transaction(&self, operations: usize, duration_seconds: f64) {
        self.transactions_applied.inc();
        self.operations_evaluated.inc_by(operations as u64);
        self.apply_duration.observe(duration_seconds);
    }

    /// Record a redeemed cheque slot
    pub fn record_cheque_redeemed(&self) {
        self.cheques_redeemed.inc();
    }

    /// Get metrics registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new().unwrap();
        assert_eq!(metrics.transactions_applied.get(), 0);
        assert_eq!(metrics.cheques_redeemed.get(), 0);
        assert_eq!(metrics.registry().gather().len(), 5);
    }

    #[test]
    fn test_record_transaction() {
        let metrics = Metrics::new().unwrap();
        metrics.record_transaction(3, 0.002);
        metrics.record_transaction(1, 0.001);
        assert_eq!(metrics.transactions_applied.get(), 2);
        assert_eq!(metrics.operations_evaluated.get(), 4);
        assert_eq!(metrics.apply_duration.get_sample_count(), 2);
    }

    #[test]
    fn test_independent_registries() {
        let a = Metrics::new().unwrap();
        let b = Metrics::new().unwrap();
        a.record_rejected();
        assert_eq!(a.operations_rejected.get(), 1);
        assert_eq!(b.operations_rejected.get(), 0);
    }
}
