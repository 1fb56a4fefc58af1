//! Service-level Prometheus metrics and the `/metrics` exposition handler

use crate::services::content_filter::RedactionCategory;
use actix_web::{get, HttpResponse};
use prometheus::{register_int_counter, register_int_counter_vec, Encoder, IntCounter, IntCounterVec, TextEncoder};
use std::sync::LazyLock;

pub static MESSAGES_SENT_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    register_int_counter!(
        "collab_chat_messages_sent_total",
        "Messages stored by collab-chat-service"
    )
    .expect("failed to register collab_chat_messages_sent_total")
});

pub static MESSAGES_REDACTED_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    register_int_counter_vec!(
        "collab_chat_messages_redacted_total",
        "Messages with contact information masked, by detector",
        &["category"]
    )
    .expect("failed to register collab_chat_messages_redacted_total")
});

pub fn record_message_sent(categories: &[RedactionCategory]) {
    MESSAGES_SENT_TOTAL.inc();
    for category in categories {
        MESSAGES_REDACTED_TOTAL
            .with_label_values(&[category.as_str()])
            .inc();
    }
}

#[get("/metrics")]
pub async fn metrics_handler() -> HttpResponse {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&prometheus::gather(), &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return HttpResponse::InternalServerError().finish();
    }

    HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buffer)
}
