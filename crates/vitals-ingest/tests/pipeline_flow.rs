//! End-to-end flow: scheduler → channel bus → shard workers → stores.
//!
//! Wires the simulator and the ingestion pipeline in-process through a
//! ChannelSink standing in for the bus, then checks that emitted samples
//! land in the durable store and the cache, with anomaly flags intact.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use vitals_core::{ChannelSink, FaultVariant, LogSink};
use vitals_ingest::{
    BroadcastChannel, CacheConfig, CacheStore, DurableStore, IngestionPipeline, MemoryCacheStore,
    MemoryDurableStore, MemoryPatientDirectory, ShardRouter,
};
use vitals_sim::{SimulationScheduler, SimulatorConfig};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_simulator_to_store_flow() {
    let (bus, mut bus_rx) = ChannelSink::bounded(4096);
    let scheduler = Arc::new(SimulationScheduler::new(
        Arc::new(bus),
        SimulatorConfig {
            interval_min_ms: 5,
            interval_max_ms: 15,
            fault_expiry: Duration::from_secs(30),
        },
    ));

    let durable = Arc::new(MemoryDurableStore::new());
    let cache = Arc::new(MemoryCacheStore::new(CacheConfig::default()));
    let notifier = Arc::new(BroadcastChannel::new(256));
    let mut updates = notifier.subscribe();

    let pipeline = Arc::new(IngestionPipeline::new(
        Arc::new(MemoryPatientDirectory::with_demo_roster()),
        durable.clone(),
        cache.clone(),
        notifier,
        Arc::new(LogSink),
    ));
    let router = Arc::new(ShardRouter::spawn(pipeline, 2, 1024));

    // Bridge the bus into the dispatcher, as the bus consumer would
    let bridge = router.clone();
    tokio::spawn(async move {
        while let Some(sample) = bus_rx.recv().await {
            bridge.dispatch(sample);
        }
    });

    assert!(scheduler.start("P001"));
    tokio::time::sleep(Duration::from_millis(300)).await;

    scheduler
        .inject_fault("P001", FaultVariant::LowOxygen)
        .unwrap();
    tokio::time::sleep(Duration::from_millis(300)).await;

    assert!(scheduler.stop("P001"));
    // Let the workers drain what was already on the bus
    tokio::time::sleep(Duration::from_millis(200)).await;

    let now = Utc::now();
    let records = durable
        .history("P001", now - chrono::Duration::hours(1), now)
        .await
        .unwrap();
    assert!(
        records.len() >= 10,
        "expected a steady sample stream, got {}",
        records.len()
    );

    // Pre-injection samples are normal, post-injection ones carry the fault
    assert!(records.iter().any(|r| !r.is_anomaly));
    assert!(
        records
            .iter()
            .any(|r| r.is_anomaly && (75..=88).contains(&r.oxygen_level)),
        "no LOW_OXYGEN sample reached the store"
    );

    // Latest value was cached and fan-out notifications went out
    assert!(cache.get_latest("P001").await.unwrap().is_some());
    assert!(updates.try_recv().is_ok());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_unregistered_patient_never_persisted() {
    let (bus, mut bus_rx) = ChannelSink::bounded(1024);
    let scheduler = Arc::new(SimulationScheduler::new(
        Arc::new(bus),
        SimulatorConfig {
            interval_min_ms: 5,
            interval_max_ms: 15,
            fault_expiry: Duration::from_secs(30),
        },
    ));

    let durable = Arc::new(MemoryDurableStore::new());
    let pipeline = Arc::new(IngestionPipeline::new(
        Arc::new(MemoryPatientDirectory::with_demo_roster()),
        durable.clone(),
        Arc::new(MemoryCacheStore::new(CacheConfig::default())),
        Arc::new(BroadcastChannel::new(16)),
        Arc::new(LogSink),
    ));
    let router = Arc::new(ShardRouter::spawn(pipeline, 2, 256));

    let bridge = router.clone();
    tokio::spawn(async move {
        while let Some(sample) = bus_rx.recv().await {
            bridge.dispatch(sample);
        }
    });

    // P999 is not on the roster; its stream must be rejected wholesale
    assert!(scheduler.start("P999"));
    tokio::time::sleep(Duration::from_millis(200)).await;
    scheduler.stop("P999");
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert!(durable.latest("P999").await.unwrap().is_none());
}
