use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

use crate::session::LinkState;

/// Convenience alias used throughout the crate.
pub type PollerResult<T> = Result<T, PollerError>;

/// Failure classes surfaced by the polling engine.
///
/// None of these terminate the engine: connect failures are retried after a
/// fixed delay, transport failures on the sampling path unwind to a
/// reconnect, and secondary-task failures are reported and skipped.
#[derive(Debug, Error)]
pub enum PollerError {
    #[error("connect to {endpoint} failed: {source}")]
    Connect {
        endpoint: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("device exception: {0:?}")]
    Exception(tokio_modbus::Exception),

    #[error("no response within {0:?}")]
    ResponseTimeout(Duration),

    #[error("register I/O attempted while link is {state:?}")]
    NotConnected { state: LinkState },

    #[error("snapshot delivery failed: {0}")]
    Delivery(String),
}
