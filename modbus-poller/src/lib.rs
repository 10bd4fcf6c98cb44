//! A connection-resilient, multi-cadence Modbus holding-register polling
//! engine based on [tokio-modbus](https://github.com/slowtec/tokio-modbus).

//! ## Overview
//!
//! The crate maintains a live link to a register-addressed device, repeatedly
//! reads a contiguous holding-register range in bounded-size chunks into one
//! owned [`block::RegisterBlock`], decodes register pairs into typed telemetry
//! values, and drives several independently-periodic actions from a single
//! cooperative loop:
//!
//! - **sampling** — chunked read of the polled range (connection health is
//!   judged solely by this path; a failed read triggers a reconnect),
//! - **delivery** — projecting the register image into an immutable
//!   [`snapshot::TelemetrySnapshot`] and handing it to a
//!   [`snapshot::SnapshotSink`],
//! - **clock write-back** — writing host local time and an acknowledgement
//!   register to the device.
//!
//! Wire framing, CRC and PDU encoding are delegated to tokio-modbus behind
//! the [`transport::RegisterTransport`] capability; snapshot transmission and
//! persistence are left to the sink implementation.
//!
//! See [examples/](examples/) for a poller/device pair that forms a closed
//! loop over TCP.

/// The engine's owned holding-register image
pub mod block;
/// Utilities for decoding from and encoding to register pairs
pub mod codec;
/// Engine configuration
pub mod config;
/// Polling engine tying link, schedule and snapshot delivery together
pub mod engine;
/// Error taxonomy
pub mod error;
/// Connection lifecycle state machine
pub mod session;
/// Periodic action scheduling
pub mod scheduler;
/// Telemetry mapping and snapshot projection
pub mod snapshot;
/// Device clock write-back
pub mod timewrite;
/// Bounded-size chunked register transfers
pub mod transfer;
/// Transport capability over tokio-modbus
pub mod transport;

/// Device simulator (based on tokio-modbus [servers examples](https://github.com/slowtec/tokio-modbus/tree/main/examples))
#[cfg(feature = "simulator")]
pub mod simulator;

pub use block::RegisterBlock;
pub use codec::{Address, Quantity, Word};
pub use config::EngineConfig;
pub use engine::PollingEngine;
pub use error::{PollerError, PollerResult};
pub use session::{LinkSession, LinkState};
pub use snapshot::{PointDef, PointKind, SnapshotSink, TelemetryMap, TelemetrySnapshot};
