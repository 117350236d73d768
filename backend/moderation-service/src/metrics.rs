//! Prometheus metrics for the moderation pipeline
//!
//! Tracks queue ingestion, rule matches, auto-enforcement, action execution and reviews

use prometheus::{register_int_counter_vec, Encoder, IntCounterVec, TextEncoder};

lazy_static::lazy_static! {
    /// Items added to the queue, by whether a rule matched
    static ref QUEUE_ITEMS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "moderation_queue_items_total",
        "Items added to the moderation queue",
        &["matched"]
    ).expect("Prometheus metrics registration should succeed at startup");

    /// Items approved by the system without human review
    static ref AUTO_ENFORCEMENTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "moderation_auto_enforcements_total",
        "Queue items auto-enforced by rule",
        &["severity"]
    ).expect("Prometheus metrics registration should succeed at startup");

    /// Action inserts by executor and outcome
    static ref ACTIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "moderation_actions_total",
        "Moderation actions by executor and outcome",
        &["executed_by", "outcome"]
    ).expect("Prometheus metrics registration should succeed at startup");

    /// Human reviews by decision
    static ref REVIEWS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "moderation_reviews_total",
        "Queue items reviewed by decision",
        &["decision"]
    ).expect("Prometheus metrics registration should succeed at startup");
}

pub fn record_queue_item(matched: bool) {
    QUEUE_ITEMS_TOTAL
        .with_label_values(&[if matched { "true" } else { "false" }])
        .inc();
}

pub fn record_auto_enforcement(severity: &str) {
    AUTO_ENFORCEMENTS_TOTAL.with_label_values(&[severity]).inc();
}

pub fn record_action(executed_by: &str, succeeded: bool) {
    ACTIONS_TOTAL
        .with_label_values(&[executed_by, if succeeded { "executed" } else { "failed" }])
        .inc();
}

pub fn record_review(decision: &str) {
    REVIEWS_TOTAL.with_label_values(&[decision]).inc();
}

/// Render the default registry in the Prometheus text format
pub fn render() -> String {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&prometheus::gather(), &mut buffer) {
        tracing::warn!("Failed to encode metrics: {}", e);
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_includes_recorded_counters() {
        record_queue_item(true);
        record_action("system", false);

        let output = render();
        assert!(output.contains("moderation_queue_items_total"));
        assert!(output.contains("moderation_actions_total"));
    }
}
