//! Prometheus metrics for the explorer API.

use prometheus::{Counter, CounterVec, Encoder, Gauge, Opts, Registry, TextEncoder};

/// Explorer metrics collection
pub struct ExplorerMetrics {
    registry: Registry,

    /// Best height reported by the node, as of the last request that
    /// asked for it
    pub chain_height: Gauge,
    /// Live entries in the response cache
    pub cache_entries: Gauge,
    /// Requests served, labeled by route
    pub requests_total: CounterVec,
    /// Requests that ended in an error response, labeled by route
    pub errors_total: CounterVec,
    /// Cacheable requests answered from the cache
    pub cache_hits_total: Counter,
    /// Cacheable requests that had to run their handler
    pub cache_misses_total: Counter,
}

impl ExplorerMetrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let chain_height = Gauge::with_opts(Opts::new(
            "sightline_chain_height",
            "Best block height reported by the node",
        ))
        .expect("metric can be created");

        let cache_entries = Gauge::with_opts(Opts::new(
            "sightline_cache_entries",
            "Live entries in the response cache",
        ))
        .expect("metric can be created");

        let requests_total = CounterVec::new(
            Opts::new("sightline_http_requests_total", "HTTP requests served"),
            &["route"],
        )
        .expect("metric can be created");

        let errors_total = CounterVec::new(
            Opts::new("sightline_http_errors_total", "HTTP requests that returned an error"),
            &["route"],
        )
        .expect("metric can be created");

        let cache_hits_total = Counter::with_opts(Opts::new(
            "sightline_cache_hits_total",
            "Cacheable requests answered from the cache",
        ))
        .expect("metric can be created");

        let cache_misses_total = Counter::with_opts(Opts::new(
            "sightline_cache_misses_total",
            "Cacheable requests that ran their handler",
        ))
        .expect("metric can be created");

        registry
            .register(Box::new(chain_height.clone()))
            .expect("collector can be registered");
        registry
            .register(Box::new(cache_entries.clone()))
            .expect("collector can be registered");
        registry
            .register(Box::new(requests_total.clone()))
            .expect("collector can be registered");
        registry
            .register(Box::new(errors_total.clone()))
            .expect("collector can be registered");
        registry
            .register(Box::new(cache_hits_total.clone()))
            .expect("collector can be registered");
        registry
            .register(Box::new(cache_misses_total.clone()))
            .expect("collector can be registered");

        Self {
            registry,
            chain_height,
            cache_entries,
            requests_total,
            errors_total,
            cache_hits_total,
            cache_misses_total,
        }
    }

    pub fn record_request(&self, route: &str) {
        self.requests_total.with_label_values(&[route]).inc();
    }

    pub fn record_error(&self, route: &str) {
        self.errors_total.with_label_values(&[route]).inc();
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits_total.inc();
    }

    pub fn record_cache_miss(&self) {
        self.cache_misses_total.inc();
    }

    pub fn set_chain_height(&self, height: u64) {
        self.chain_height.set(height as f64);
    }

    pub fn set_cache_entries(&self, entries: usize) {
        self.cache_entries.set(entries as f64);
    }

    /// Render all metrics in Prometheus text exposition format
    pub fn encode(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        if encoder.encode(&metric_families, &mut buffer).is_err() {
            return String::new();
        }
        String::from_utf8(buffer).unwrap_or_default()
    }
}

impl Default for ExplorerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = ExplorerMetrics::new();
        metrics.set_chain_height(400_000);
        metrics.set_cache_entries(12);
        assert_eq!(metrics.chain_height.get(), 400_000.0);
        assert_eq!(metrics.cache_entries.get(), 12.0);
    }

    #[test]
    fn test_request_counters_by_route() {
        let metrics = ExplorerMetrics::new();
        metrics.record_request("addr_balance");
        metrics.record_request("addr_balance");
        metrics.record_request("block");
        metrics.record_error("block");

        assert_eq!(
            metrics.requests_total.with_label_values(&["addr_balance"]).get(),
            2.0
        );
        assert_eq!(metrics.errors_total.with_label_values(&["block"]).get(), 1.0);
    }

    #[test]
    fn test_encode_contains_metric_names() {
        let metrics = ExplorerMetrics::new();
        metrics.record_cache_hit();
        metrics.record_cache_miss();

        let text = metrics.encode();
        assert!(text.contains("sightline_chain_height"));
        assert!(text.contains("sightline_cache_hits_total"));
        assert!(text.contains("sightline_cache_misses_total"));
    }
}
