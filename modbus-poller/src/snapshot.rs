use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::block::RegisterBlock;
use crate::codec::{self, Address};
use crate::error::PollerResult;

/// How to decode the register pair behind one telemetry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointKind {
    Uint32,
    Float32,
    ErrorFlag,
}

/// One entry of the declarative telemetry mapping: which register pair a
/// named value lives at, and how to decode it. The mapping is configuration;
/// nothing in the engine hard-codes addresses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointDef {
    pub name: String,
    pub addr: Address,
    pub kind: PointKind,
}

impl PointDef {
    pub fn new(name: impl Into<String>, addr: Address, kind: PointKind) -> Self {
        Self {
            name: name.into(),
            addr,
            kind,
        }
    }
}

/// Ordered list of point descriptors; order is preserved in the snapshot.
pub type TelemetryMap = Vec<PointDef>;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MeasurementValue {
    Uint(u32),
    Float(f32),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Measurement {
    pub name: String,
    pub value: MeasurementValue,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorFlag {
    pub name: String,
    pub active: bool,
}

/// One immutable, freshly-timestamped projection of the register image.
///
/// Snapshots have no identity beyond their timestamp and are never mutated
/// after construction.
#[derive(Debug, Clone, Serialize)]
pub struct TelemetrySnapshot {
    pub timestamp: DateTime<Utc>,
    pub measurements: Vec<Measurement>,
    pub flags: Vec<ErrorFlag>,
}

/// Pure projection from the current register image to a snapshot. Performs no
/// I/O; safe to call any time the block is not mid-read.
pub struct SnapshotBuilder;

impl SnapshotBuilder {
    pub fn build(map: &[PointDef], block: &RegisterBlock) -> TelemetrySnapshot {
        let mut measurements = Vec::new();
        let mut flags = Vec::new();
        for point in map {
            match point.kind {
                PointKind::Uint32 => measurements.push(Measurement {
                    name: point.name.clone(),
                    value: MeasurementValue::Uint(codec::u32_from_pair(block, point.addr)),
                }),
                PointKind::Float32 => measurements.push(Measurement {
                    name: point.name.clone(),
                    value: MeasurementValue::Float(codec::f32_from_pair(block, point.addr)),
                }),
                PointKind::ErrorFlag => flags.push(ErrorFlag {
                    name: point.name.clone(),
                    active: codec::flag_from_pair(block, point.addr),
                }),
            }
        }
        TelemetrySnapshot {
            timestamp: Utc::now(),
            measurements,
            flags,
        }
    }
}

/// Delivery collaborator for finished snapshots. Rendering, transmission and
/// persistence all live behind this seam.
#[async_trait]
pub trait SnapshotSink: Send {
    async fn deliver(&mut self, snapshot: &TelemetrySnapshot) -> PollerResult<()>;
}

/// Sink that reports snapshots through the log output.
#[derive(Debug, Default)]
pub struct LogSink;

#[async_trait]
impl SnapshotSink for LogSink {
    async fn deliver(&mut self, snapshot: &TelemetrySnapshot) -> PollerResult<()> {
        info!(
            timestamp = %snapshot.timestamp,
            measurements = ?snapshot.measurements,
            flags = ?snapshot.flags,
            "telemetry snapshot"
        );
        Ok(())
    }
}
