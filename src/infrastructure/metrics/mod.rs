//! Prometheus Metrics Module
//!
//! Application-wide metrics collection.
//!
//! # Metrics Collected
//! - Active gateway connection gauge
//! - Messages persisted/broadcast counters
//! - Gateway event counters by event name

use once_cell::sync::Lazy;
use prometheus::{Encoder, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

/// Global metrics registry
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

/// Active gateway connections gauge
pub static GATEWAY_CONNECTIONS_ACTIVE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::with_opts(
        Opts::new(
            "gateway_connections_active",
            "Number of active gateway connections",
        )
        .namespace("campaign_chat"),
    )
    .expect("Failed to create GATEWAY_CONNECTIONS_ACTIVE metric")
});

/// Gateway events processed, by event name and outcome
pub static GATEWAY_EVENTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("gateway_events_total", "Gateway events processed")
            .namespace("campaign_chat"),
        &["event", "outcome"], // outcome: "ok", "error"
    )
    .expect("Failed to create GATEWAY_EVENTS_TOTAL metric")
});

/// Messages persisted and broadcast
pub static MESSAGES_SENT_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("messages_sent_total", "Messages persisted and broadcast")
            .namespace("campaign_chat"),
        &["channel_state"], // "public" | "private"
    )
    .expect("Failed to create MESSAGES_SENT_TOTAL metric")
});

fn register_metrics(registry: &Registry) {
    registry
        .register(Box::new(GATEWAY_CONNECTIONS_ACTIVE.clone()))
        .expect("Failed to register GATEWAY_CONNECTIONS_ACTIVE");
    registry
        .register(Box::new(GATEWAY_EVENTS_TOTAL.clone()))
        .expect("Failed to register GATEWAY_EVENTS_TOTAL");
    registry
        .register(Box::new(MESSAGES_SENT_TOTAL.clone()))
        .expect("Failed to register MESSAGES_SENT_TOTAL");
}

/// Collect and encode all metrics as Prometheus text format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .expect("Failed to encode metrics");
    String::from_utf8(buffer).expect("Metrics should be valid UTF-8")
}

/// Record the outcome of a handled gateway event.
pub fn record_gateway_event(event: &str, ok: bool) {
    GATEWAY_EVENTS_TOTAL
        .with_label_values(&[event, if ok { "ok" } else { "error" }])
        .inc();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_registration() {
        let _ = &*REGISTRY;
        record_gateway_event("message:send", true);
        let output = gather_metrics();
        assert!(output.contains("campaign_chat_gateway_events_total"));
    }
}
