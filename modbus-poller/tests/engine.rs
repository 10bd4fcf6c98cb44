//! End-to-end polling against a simulated TCP device.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use async_trait::async_trait;
use modbus_poller::simulator::{spawn_tcp_simulator, RegisterBank, Simulator};
use modbus_poller::snapshot::MeasurementValue;
use modbus_poller::timewrite::TimeFields;
use modbus_poller::{
    EngineConfig, PointDef, PointKind, PollerError, PollerResult, PollingEngine, SnapshotSink,
    TelemetrySnapshot,
};
use tokio::sync::mpsc;
use tokio::time::timeout;

struct ChannelSink(mpsc::UnboundedSender<TelemetrySnapshot>);

#[async_trait]
impl SnapshotSink for ChannelSink {
    async fn deliver(&mut self, snapshot: &TelemetrySnapshot) -> PollerResult<()> {
        self.0
            .send(snapshot.clone())
            .map_err(|err| PollerError::Delivery(err.to_string()))
    }
}

fn test_config(endpoint: SocketAddr) -> EngineConfig {
    EngineConfig {
        endpoint,
        response_timeout: Duration::from_secs(2),
        reconnect_delay: Duration::from_millis(100),
        sample_period: Duration::from_millis(50),
        deliver_period: Duration::from_millis(150),
        time_write_period: Duration::from_millis(200),
        points: vec![
            PointDef::new("fan_energy", 200, PointKind::Uint32),
            PointDef::new("supply_temp", 210, PointKind::Float32),
            PointDef::new("fan_fault", 216, PointKind::ErrorFlag),
            PointDef::new("filter_fault", 218, PointKind::ErrorFlag),
        ],
        ..EngineConfig::default()
    }
}

#[tokio::test]
async fn polls_decodes_and_writes_clock_end_to_end() {
    let simulator = Simulator::new(RegisterBank::new(400));
    let bank = simulator.bank();
    {
        let mut bank = bank.lock().unwrap();
        bank.set_pair(200, 100);
        bank.set_pair(210, 21.5f32.to_bits());
        bank.write(216, &[3, 0]).unwrap();
        // Junk in the clock window so the write-back is observable.
        bank.write(242, &[0xAAAA; 12]).unwrap();
        bank.write(262, &[0xAAAA]).unwrap();
    }

    let any_port = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)), 0);
    let (endpoint, server) = spawn_tcp_simulator(any_port, simulator).await.unwrap();

    let (tx, mut rx) = mpsc::unbounded_channel();
    let engine = PollingEngine::new(test_config(endpoint), ChannelSink(tx));
    let poller = tokio::spawn(engine.run());

    let snapshot = timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("no snapshot within 5s")
        .expect("sink channel closed");

    assert_eq!(snapshot.measurements.len(), 2);
    assert_eq!(snapshot.measurements[0].name, "fan_energy");
    assert_eq!(snapshot.measurements[0].value, MeasurementValue::Uint(100));
    assert_eq!(snapshot.measurements[1].value, MeasurementValue::Float(21.5));
    assert_eq!(snapshot.flags.len(), 2);
    assert!(snapshot.flags[0].active, "nonzero error code must trip the flag");
    assert!(!snapshot.flags[1].active);

    // Give the first clock write time to land.
    tokio::time::sleep(Duration::from_millis(500)).await;
    let expected = TimeFields::now_local();
    {
        let bank = bank.lock().unwrap();
        assert_eq!(bank.get(242), expected.year);
        // High words of all six pairs are always zero.
        for addr in [243, 245, 247, 249, 251, 253] {
            assert_eq!(bank.get(addr), 0, "high word at {addr}");
        }
        assert!((1..=12).contains(&bank.get(244)));
        assert!((1..=31).contains(&bank.get(246)));
        assert!(bank.get(248) < 24);
        assert!(bank.get(250) < 60);
        assert!(bank.get(252) < 60);
        // Acknowledgement register was overwritten with the sentinel.
        assert_eq!(bank.get(262), 0);
    }

    poller.abort();
    server.abort();
}

#[tokio::test]
async fn keeps_polling_after_device_values_change() {
    let simulator = Simulator::new(RegisterBank::new(400));
    let bank = simulator.bank();
    bank.lock().unwrap().set_pair(200, 1);

    let any_port = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)), 0);
    let (endpoint, server) = spawn_tcp_simulator(any_port, simulator).await.unwrap();

    let (tx, mut rx) = mpsc::unbounded_channel();
    let engine = PollingEngine::new(test_config(endpoint), ChannelSink(tx));
    let poller = tokio::spawn(engine.run());

    let first = timeout(Duration::from_secs(5), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(first.measurements[0].value, MeasurementValue::Uint(1));

    bank.lock().unwrap().set_pair(200, 2);
    let updated = timeout(Duration::from_secs(5), async {
        loop {
            let snapshot = rx.recv().await.unwrap();
            if snapshot.measurements[0].value == MeasurementValue::Uint(2) {
                break snapshot;
            }
        }
    })
    .await
    .expect("snapshot never reflected the updated register pair");
    assert!(updated.timestamp >= first.timestamp);

    poller.abort();
    server.abort();
}
