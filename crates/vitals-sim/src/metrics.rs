//! Prometheus metrics for the simulator service

use once_cell::sync::Lazy;
use prometheus::{Counter, Gauge};

pub static SAMPLES_EMITTED: Lazy<Counter> = Lazy::new(|| {
    let c = Counter::new(
        "vitals_sim_samples_emitted_total",
        "Samples emitted by monitor cycles",
    )
    .unwrap();
    prometheus::register(Box::new(c.clone())).unwrap();
    c
});

pub static PUBLISH_FAILURES: Lazy<Counter> = Lazy::new(|| {
    let c = Counter::new(
        "vitals_sim_publish_failures_total",
        "Cycles skipped because the sink rejected the sample",
    )
    .unwrap();
    prometheus::register(Box::new(c.clone())).unwrap();
    c
});

pub static INJECTIONS_TOTAL: Lazy<Counter> = Lazy::new(|| {
    let c = Counter::new(
        "vitals_sim_injections_total",
        "Fault injections accepted by the scheduler",
    )
    .unwrap();
    prometheus::register(Box::new(c.clone())).unwrap();
    c
});

pub static ACTIVE_MONITORS: Lazy<Gauge> = Lazy::new(|| {
    let g = Gauge::new("vitals_sim_active_monitors", "Currently monitored patients").unwrap();
    prometheus::register(Box::new(g.clone())).unwrap();
    g
});
