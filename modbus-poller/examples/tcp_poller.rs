/// TCP Modbus polling engine demo
///
/// Run `tcp-device` first, then this example. Snapshots of the decoded
/// telemetry are printed on every delivery cycle; the device clock registers
/// are written back every ten seconds.
use async_trait::async_trait;
use chrono::Local;
use modbus_poller::snapshot::MeasurementValue;
use modbus_poller::{
    EngineConfig, PointDef, PointKind, PollerResult, PollingEngine, SnapshotSink,
    TelemetrySnapshot,
};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

/// Renders each snapshot as a small console report.
struct ConsoleSink;

#[async_trait]
impl SnapshotSink for ConsoleSink {
    async fn deliver(&mut self, snapshot: &TelemetrySnapshot) -> PollerResult<()> {
        println!(
            "Last update: {}\n",
            snapshot
                .timestamp
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
        );
        for measurement in &snapshot.measurements {
            match measurement.value {
                MeasurementValue::Uint(v) => println!("  {:<16} {v}", measurement.name),
                MeasurementValue::Float(v) => println!("  {:<16} {v:.2}", measurement.name),
            }
        }
        for flag in &snapshot.flags {
            println!(
                "  {:<16} {}",
                flag.name,
                if flag.active { "FAULT" } else { "ok" }
            );
        }
        println!();
        Ok(())
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "modbus_poller=info".into()),
        )
        .init();

    let config = EngineConfig {
        endpoint: SocketAddr::new(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)), 5502),
        deliver_period: Duration::from_secs(5),
        points: vec![
            PointDef::new("fan_energy", 200, PointKind::Uint32),
            PointDef::new("supply_temp", 210, PointKind::Float32),
            PointDef::new("fan_fault", 216, PointKind::ErrorFlag),
        ],
        ..EngineConfig::default()
    };

    PollingEngine::new(config, ConsoleSink).run().await;
}
