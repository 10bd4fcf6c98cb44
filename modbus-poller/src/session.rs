use std::time::Duration;

use tokio::time::sleep;
use tracing::{info, warn};

use crate::block::RegisterBlock;
use crate::codec::{Address, Quantity, Word};
use crate::error::{PollerError, PollerResult};
use crate::transfer::{read_chunked, write_chunked};
use crate::transport::{Connector, RegisterTransport};

/// Lifecycle state of the device link. Register I/O is only attempted in
/// `Connected`; every other state requires a successful [`LinkSession::connect`]
/// first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Disconnected,
    Connecting,
    Connected,
    Failed,
}

/// Owner of one physical connection's lifecycle.
///
/// Connect failures wait a fixed delay before handing control back to the
/// caller's retry loop; there is no internal attempt limit and no exponential
/// backoff. Liveness is judged solely by I/O success: a failed chunked read is
/// the disconnect signal, and the transport is closed before the link is
/// reported down so a later connect never reuses a dangling session.
///
/// Write failures are reported without leaving `Connected`: as long as the
/// sampling reads succeed the link is considered healthy, and a genuinely dead
/// link surfaces through the next read within one sampling period.
pub struct LinkSession {
    connector: Box<dyn Connector>,
    transport: Option<Box<dyn RegisterTransport>>,
    state: LinkState,
    reconnect_delay: Duration,
    max_per_request: Quantity,
}

impl LinkSession {
    pub fn new(
        connector: Box<dyn Connector>,
        reconnect_delay: Duration,
        max_per_request: Quantity,
    ) -> Self {
        Self {
            connector,
            transport: None,
            state: LinkState::Disconnected,
            reconnect_delay,
            max_per_request,
        }
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    /// Attempt to establish the transport session.
    ///
    /// On failure the session sleeps the fixed reconnect delay and returns to
    /// `Disconnected`; the caller retries indefinitely.
    pub async fn connect(&mut self) -> PollerResult<()> {
        self.drop_link().await;
        self.state = LinkState::Connecting;
        match self.connector.connect().await {
            Ok(transport) => {
                self.transport = Some(transport);
                self.state = LinkState::Connected;
                info!("device link established");
                Ok(())
            }
            Err(err) => {
                self.state = LinkState::Failed;
                warn!(error = %err, delay = ?self.reconnect_delay, "connect failed");
                sleep(self.reconnect_delay).await;
                self.state = LinkState::Disconnected;
                Err(err)
            }
        }
    }

    /// Chunked read of `count` registers at `start` into `block`.
    ///
    /// Any failure closes the transport and leaves the session `Disconnected`
    /// with the block possibly partially updated.
    pub async fn read_registers(
        &mut self,
        block: &mut RegisterBlock,
        start: Address,
        count: Quantity,
    ) -> PollerResult<()> {
        let max = self.max_per_request;
        let transport = self.transport_mut()?;
        match read_chunked(transport.as_mut(), block, start, count, max).await {
            Ok(()) => Ok(()),
            Err(err) => {
                self.drop_link().await;
                Err(err)
            }
        }
    }

    /// Chunked write of `count` registers at `start`, sourced from `block`.
    pub async fn write_registers(
        &mut self,
        block: &RegisterBlock,
        start: Address,
        count: Quantity,
    ) -> PollerResult<()> {
        let max = self.max_per_request;
        let transport = self.transport_mut()?;
        write_chunked(transport.as_mut(), block, start, count, max).await
    }

    /// Single-register write, used for acknowledgement/heartbeat cells.
    pub async fn write_single(&mut self, addr: Address, value: Word) -> PollerResult<()> {
        let transport = self.transport_mut()?;
        transport.write_single_register(addr, value).await
    }

    /// Close the transport, if any, and mark the link down.
    pub async fn drop_link(&mut self) {
        if let Some(mut transport) = self.transport.take() {
            transport.close().await;
            warn!("device link closed");
        }
        self.state = LinkState::Disconnected;
    }

    fn transport_mut(&mut self) -> PollerResult<&mut Box<dyn RegisterTransport>> {
        if self.state != LinkState::Connected {
            return Err(PollerError::NotConnected { state: self.state });
        }
        match self.transport.as_mut() {
            Some(transport) => Ok(transport),
            None => Err(PollerError::NotConnected { state: self.state }),
        }
    }
}
