use anyhow::Result;
use once_cell::sync::Lazy;
use prometheus::{opts, register_int_counter, Encoder, IntCounter, TextEncoder};

pub static MESSAGES_CREATED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(opts!(
        "missive_messages_created_total",
        "Total number of messages created"
    ))
    .expect("metric registration")
});

pub static AUTH_FAILURES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(opts!(
        "missive_auth_failures_total",
        "Requests rejected by the authentication gate"
    ))
    .expect("metric registration")
});

pub static STATUS_TRANSITIONS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(opts!(
        "missive_status_transitions_total",
        "Message status changes written to the store"
    ))
    .expect("metric registration")
});

pub fn gather_metrics() -> Result<String> {
    // Touch the counters so they show up before their first increment.
    Lazy::force(&MESSAGES_CREATED_TOTAL);
    Lazy::force(&AUTH_FAILURES_TOTAL);
    Lazy::force(&STATUS_TRANSITIONS_TOTAL);

    let mut buffer = vec![];
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    encoder.encode(&metric_families, &mut buffer)?;

    Ok(String::from_utf8(buffer)?)
}
