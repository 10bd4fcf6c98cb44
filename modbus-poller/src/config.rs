use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::codec::{Address, Quantity, Word};
use crate::snapshot::TelemetryMap;

/// Everything the engine needs to run against one device.
///
/// All values are load-time constants from the engine's point of view;
/// defaults mirror the observed deployment (Modbus TCP port 502, unit 1,
/// 400-register window with the polled range and time registers in its upper
/// half).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Remote device endpoint.
    pub endpoint: SocketAddr,
    /// Modbus unit/slave identifier.
    pub unit_id: u8,
    /// Per-request response timeout; expiry counts as a link failure.
    pub response_timeout: Duration,
    /// Fixed wait between reconnect attempts.
    pub reconnect_delay: Duration,
    /// First register of the sampled range.
    pub poll_start: Address,
    /// Number of registers sampled each cycle.
    pub poll_count: Quantity,
    /// Size of the local register image; must cover every address used.
    pub block_capacity: usize,
    /// Device-imposed cap on registers per read/write request.
    pub max_per_request: Quantity,
    /// Sampling (read) period.
    pub sample_period: Duration,
    /// Snapshot delivery period.
    pub deliver_period: Duration,
    /// Device clock write-back period.
    pub time_write_period: Duration,
    /// First register of the six time-field pairs.
    pub time_base_addr: Address,
    /// Acknowledgement register written after each clock write.
    pub ack_addr: Address,
    /// Value written to the acknowledgement register.
    pub ack_value: Word,
    /// Declarative name/address/kind mapping for snapshot points.
    pub points: TelemetryMap,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            endpoint: SocketAddr::new(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)), 502),
            unit_id: 1,
            response_timeout: Duration::from_secs(10),
            reconnect_delay: Duration::from_secs(2),
            poll_start: 200,
            poll_count: 200,
            block_capacity: 400,
            max_per_request: 64,
            sample_period: Duration::from_millis(500),
            deliver_period: Duration::from_secs(30),
            time_write_period: Duration::from_secs(10),
            time_base_addr: 242,
            ack_addr: 262,
            ack_value: 0,
            points: TelemetryMap::new(),
        }
    }
}
