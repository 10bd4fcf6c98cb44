use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

use crate::block::RegisterBlock;
use crate::config::EngineConfig;
use crate::scheduler::Cadence;
use crate::session::{LinkSession, LinkState};
use crate::snapshot::{SnapshotBuilder, SnapshotSink};
use crate::timewrite::{TimeFields, TimeWriter};
use crate::transport::{Connector, TcpConnector};

/// Pause between loop iterations; short enough not to materially delay any
/// schedule, long enough to bound CPU use.
const TICK_SLEEP: Duration = Duration::from_millis(20);

/// The connection-resilience and multi-cadence polling engine.
///
/// One cooperative task owns the device link, the register image and all
/// periodic actions. Each tick evaluates the cadences in fixed priority
/// order — sample, deliver, time write — because delivery consumes the
/// sample's result. A failed sampling read unwinds to the reconnect loop;
/// delivery and clock-write failures are reported and skipped, since a
/// write task failing does not indicate link loss while reads still succeed.
pub struct PollingEngine<S> {
    config: EngineConfig,
    session: LinkSession,
    block: RegisterBlock,
    time_writer: TimeWriter,
    sink: S,
}

impl<S: SnapshotSink> PollingEngine<S> {
    /// Engine over a Modbus TCP link described by `config`.
    pub fn new(config: EngineConfig, sink: S) -> Self {
        let connector = Box::new(TcpConnector::new(
            config.endpoint,
            config.unit_id,
            config.response_timeout,
        ));
        Self::with_connector(config, connector, sink)
    }

    /// Engine over an arbitrary transport factory; used by tests and by
    /// deployments with a non-TCP link.
    pub fn with_connector(config: EngineConfig, connector: Box<dyn Connector>, sink: S) -> Self {
        let session = LinkSession::new(
            connector,
            config.reconnect_delay,
            config.max_per_request,
        );
        let block = RegisterBlock::new(config.block_capacity);
        let time_writer = TimeWriter::new(config.time_base_addr, config.ack_addr, config.ack_value);
        Self {
            config,
            session,
            block,
            time_writer,
            sink,
        }
    }

    /// Run forever: connect with fixed-delay retry, then poll until the link
    /// fails, then reconnect. Intended to outlive the process; stop it by
    /// cancelling the task, which can only interrupt between iterations and
    /// therefore never leaves the transport half-open.
    pub async fn run(mut self) {
        loop {
            while self.session.state() != LinkState::Connected {
                // connect() already waited the fixed delay on failure.
                let _ = self.session.connect().await;
            }
            self.poll_until_link_failure().await;
        }
    }

    async fn poll_until_link_failure(&mut self) {
        let now = Instant::now();
        let mut sample = Cadence::new(self.config.sample_period, now);
        let mut deliver = Cadence::new(self.config.deliver_period, now);
        let mut time_write = Cadence::new(self.config.time_write_period, now);

        loop {
            let now = Instant::now();

            if sample.poll(now) {
                if let Err(err) = self
                    .session
                    .read_registers(&mut self.block, self.config.poll_start, self.config.poll_count)
                    .await
                {
                    // The session is already disconnected; skip the remaining
                    // actions for this tick and restart the connect cycle.
                    warn!(error = %err, "sampling read failed, restarting link");
                    return;
                }
                debug!(
                    start = self.config.poll_start,
                    count = self.config.poll_count,
                    "sampled register range"
                );
            }

            if deliver.poll(now) {
                let snapshot = SnapshotBuilder::build(&self.config.points, &self.block);
                if let Err(err) = self.sink.deliver(&snapshot).await {
                    warn!(error = %err, "snapshot delivery failed");
                }
            }

            if time_write.poll(now) {
                if let Err(err) = self
                    .time_writer
                    .write_time(&mut self.session, &mut self.block, TimeFields::now_local())
                    .await
                {
                    warn!(error = %err, "device clock write failed");
                }
            }

            sleep(TICK_SLEEP).await;
        }
    }
}
