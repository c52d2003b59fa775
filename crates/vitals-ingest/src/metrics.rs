//! Prometheus metrics for the ingestion service

use once_cell::sync::Lazy;
use prometheus::{Counter, Histogram, HistogramOpts};

pub static INGESTED_TOTAL: Lazy<Counter> = Lazy::new(|| {
    let c = Counter::new(
        "vitals_ingest_accepted_total",
        "Samples that passed validation and ran the best-effort stages",
    )
    .unwrap();
    prometheus::register(Box::new(c.clone())).unwrap();
    c
});

pub static REJECTED_TOTAL: Lazy<Counter> = Lazy::new(|| {
    let c = Counter::new(
        "vitals_ingest_rejected_total",
        "Samples dropped by the validation stage",
    )
    .unwrap();
    prometheus::register(Box::new(c.clone())).unwrap();
    c
});

pub static STAGE_FAILURES: Lazy<Counter> = Lazy::new(|| {
    let c = Counter::new(
        "vitals_ingest_stage_failures_total",
        "Pipeline stages that failed and were skipped past",
    )
    .unwrap();
    prometheus::register(Box::new(c.clone())).unwrap();
    c
});

pub static BACKPRESSURE_DROPS: Lazy<Counter> = Lazy::new(|| {
    let c = Counter::new(
        "vitals_ingest_dropped_total",
        "Inbound samples dropped because a shard queue was full",
    )
    .unwrap();
    prometheus::register(Box::new(c.clone())).unwrap();
    c
});

pub static PROCESS_LATENCY: Lazy<Histogram> = Lazy::new(|| {
    let h = Histogram::with_opts(HistogramOpts::new(
        "vitals_ingest_processing_duration_seconds",
        "Histogram of per-sample pipeline latency",
    ))
    .unwrap();
    prometheus::register(Box::new(h.clone())).unwrap();
    h
});
