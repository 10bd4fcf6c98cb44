use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::timeout;
use tokio_modbus::client::{tcp::connect_slave, Context, Reader, Writer};
use tokio_modbus::slave::Slave;

use crate::codec::{Address, Quantity, Word};
use crate::error::{PollerError, PollerResult};

/// Register-level capability of a remote device link.
///
/// The engine depends only on this contract; wire framing, CRC and PDU
/// encoding live behind it. Every operation must complete within a bounded
/// time: a timeout is reported as [`PollerError::ResponseTimeout`] and is
/// treated by callers as a link failure.
#[async_trait]
pub trait RegisterTransport: Send {
    async fn read_holding_registers(
        &mut self,
        addr: Address,
        cnt: Quantity,
    ) -> PollerResult<Vec<Word>>;

    async fn write_multiple_registers(&mut self, addr: Address, words: &[Word])
        -> PollerResult<()>;

    async fn write_single_register(&mut self, addr: Address, word: Word) -> PollerResult<()>;

    /// Best-effort shutdown of the underlying session.
    async fn close(&mut self);
}

/// Factory for fresh transport sessions, one per (re)connect.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self) -> PollerResult<Box<dyn RegisterTransport>>;
}

/// Connects to a Modbus TCP slave identified by endpoint and unit id.
#[derive(Debug, Clone)]
pub struct TcpConnector {
    endpoint: SocketAddr,
    unit_id: u8,
    response_timeout: Duration,
}

impl TcpConnector {
    pub fn new(endpoint: SocketAddr, unit_id: u8, response_timeout: Duration) -> Self {
        Self {
            endpoint,
            unit_id,
            response_timeout,
        }
    }
}

#[async_trait]
impl Connector for TcpConnector {
    async fn connect(&self) -> PollerResult<Box<dyn RegisterTransport>> {
        let ctx = connect_slave(self.endpoint, Slave(self.unit_id))
            .await
            .map_err(|source| PollerError::Connect {
                endpoint: self.endpoint,
                source,
            })?;
        Ok(Box::new(TcpTransport {
            ctx,
            response_timeout: self.response_timeout,
        }))
    }
}

/// Transport over a live tokio-modbus TCP context.
///
/// Device exception responses and transport-level errors are flattened into
/// [`PollerError`]; each request is bounded by the configured response
/// timeout so no operation can stall the poll loop indefinitely.
pub struct TcpTransport {
    ctx: Context,
    response_timeout: Duration,
}

#[async_trait]
impl RegisterTransport for TcpTransport {
    async fn read_holding_registers(
        &mut self,
        addr: Address,
        cnt: Quantity,
    ) -> PollerResult<Vec<Word>> {
        match timeout(self.response_timeout, self.ctx.read_holding_registers(addr, cnt)).await {
            Err(_) => Err(PollerError::ResponseTimeout(self.response_timeout)),
            Ok(Err(err)) => Err(PollerError::Transport(err.to_string())),
            Ok(Ok(Err(exc))) => Err(PollerError::Exception(exc)),
            Ok(Ok(Ok(words))) => Ok(words),
        }
    }

    async fn write_multiple_registers(
        &mut self,
        addr: Address,
        words: &[Word],
    ) -> PollerResult<()> {
        match timeout(
            self.response_timeout,
            self.ctx.write_multiple_registers(addr, words),
        )
        .await
        {
            Err(_) => Err(PollerError::ResponseTimeout(self.response_timeout)),
            Ok(Err(err)) => Err(PollerError::Transport(err.to_string())),
            Ok(Ok(Err(exc))) => Err(PollerError::Exception(exc)),
            Ok(Ok(Ok(()))) => Ok(()),
        }
    }

    async fn write_single_register(&mut self, addr: Address, word: Word) -> PollerResult<()> {
        match timeout(
            self.response_timeout,
            self.ctx.write_single_register(addr, word),
        )
        .await
        {
            Err(_) => Err(PollerError::ResponseTimeout(self.response_timeout)),
            Ok(Err(err)) => Err(PollerError::Transport(err.to_string())),
            Ok(Ok(Err(exc))) => Err(PollerError::Exception(exc)),
            Ok(Ok(Ok(()))) => Ok(()),
        }
    }

    async fn close(&mut self) {
        if let Err(err) = self.ctx.disconnect().await {
            tracing::debug!(error = %err, "error while closing transport");
        }
    }
}
