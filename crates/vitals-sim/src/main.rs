//! vitals-sim - patient vitals device simulator
//!
//! Usage:
//!   vitals-sim --listen 0.0.0.0:8081
//!   vitals-sim --ingest-url http://localhost:8080 --start P001,P002
//!   vitals-sim --interval-min-ms 500 --interval-max-ms 1500

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;

use vitals_core::{ForwarderConfig, HttpSink, LogSink, MessageSink};
use vitals_sim::{ApiState, SimulationScheduler, SimulatorConfig, router};

#[derive(Parser)]
#[command(name = "vitals-sim")]
#[command(about = "Patient vitals simulator with injectable fault overlays")]
struct Cli {
    /// Address for the control API
    #[arg(long, default_value = "0.0.0.0:8081")]
    listen: String,

    /// Base URL of the ingestion service; samples are logged when omitted
    #[arg(long)]
    ingest_url: Option<String>,

    /// Lower bound of the jittered cycle interval
    #[arg(long, default_value_t = 2000)]
    interval_min_ms: u64,

    /// Upper bound of the jittered cycle interval
    #[arg(long, default_value_t = 5000)]
    interval_max_ms: u64,

    /// How long an injected fault stays active without a newer injection
    #[arg(long, default_value_t = 30)]
    fault_expiry_secs: u64,

    /// Patients to start monitoring immediately (comma-separated)
    #[arg(long)]
    start: Option<String>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let sink: Arc<dyn MessageSink> = match &cli.ingest_url {
        Some(url) => {
            info!(url = %url, "forwarding samples to ingest over http");
            Arc::new(HttpSink::new(ForwarderConfig {
                ingest_url: url.clone(),
                ..Default::default()
            }))
        }
        None => {
            info!("no ingest url configured, samples go to the log sink");
            Arc::new(LogSink)
        }
    };

    let config = SimulatorConfig {
        interval_min_ms: cli.interval_min_ms,
        interval_max_ms: cli.interval_max_ms,
        fault_expiry: Duration::from_secs(cli.fault_expiry_secs),
    };
    let scheduler = Arc::new(SimulationScheduler::new(sink, config));

    if let Some(list) = &cli.start {
        for patient_id in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            scheduler.start(patient_id);
        }
    }

    let app = router(ApiState {
        scheduler: scheduler.clone(),
    });

    let listener = TcpListener::bind(&cli.listen)
        .await
        .expect("failed to bind control port");
    info!(addr = %cli.listen, "simulator listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            tokio::signal::ctrl_c()
                .await
                .expect("failed to install CTRL+C handler");
            let stopped = scheduler.shutdown();
            info!(stopped, "shutting down, monitors cancelled");
        })
        .await
        .expect("server crashed");
}
