use std::{
    net::SocketAddr,
    sync::{Arc, Mutex},
};

use futures::future;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_modbus::{server, Exception, Request, Response};

use crate::codec::{u32_to_pair, Address, Quantity, Word};

/// A simulated device's holding-register bank, address == index.
#[derive(Debug, Clone)]
pub struct RegisterBank(Vec<Word>);

impl RegisterBank {
    /// Zero-initialized bank covering addresses `0..capacity`.
    pub fn new(capacity: usize) -> Self {
        Self(vec![0; capacity])
    }

    /// Read `cnt` consecutive registers starting at `addr`.
    pub fn read(&self, addr: Address, cnt: Quantity) -> Result<Vec<Word>, Exception> {
        self.check(addr, cnt)?;
        Ok(self.0[addr as usize..addr as usize + cnt as usize].to_vec())
    }

    /// Write `words` into consecutive registers starting at `addr`.
    pub fn write(&mut self, addr: Address, words: &[Word]) -> Result<(), Exception> {
        self.check(addr, words.len() as Quantity)?;
        self.0[addr as usize..addr as usize + words.len()].copy_from_slice(words);
        Ok(())
    }

    /// Store a 32-bit value as a low-word-first pair, for seeding telemetry.
    pub fn set_pair(&mut self, low_addr: Address, value: u32) {
        let pair = u32_to_pair(value);
        self.0[low_addr as usize] = pair[0];
        self.0[low_addr as usize + 1] = pair[1];
    }

    pub fn get(&self, addr: Address) -> Word {
        self.0[addr as usize]
    }

    fn check(&self, addr: Address, cnt: Quantity) -> Result<(), Exception> {
        let end = addr as usize + cnt as usize;
        if end > self.0.len() {
            return Err(Exception::IllegalDataAddress);
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
/// Modbus TCP device simulator serving one shared [`RegisterBank`].
pub struct Simulator(Arc<Mutex<RegisterBank>>);

impl Simulator {
    pub fn new(bank: RegisterBank) -> Self {
        Self(Arc::new(Mutex::new(bank)))
    }

    /// Shared handle to the bank, for seeding values and asserting on writes.
    pub fn bank(&self) -> Arc<Mutex<RegisterBank>> {
        Arc::clone(&self.0)
    }

    fn service_call(&self, req: Request) -> Result<Response, Exception> {
        let bank = &mut self.0.lock().unwrap();
        match req {
            Request::ReadHoldingRegisters(addr, cnt) => bank
                .read(addr, cnt)
                .map(Response::ReadHoldingRegisters),
            Request::WriteMultipleRegisters(addr, values) => bank
                .write(addr, &values)
                .map(|_| Response::WriteMultipleRegisters(addr, values.len() as u16)),
            Request::WriteSingleRegister(addr, value) => bank
                .write(addr, std::slice::from_ref(&value))
                .map(|_| Response::WriteSingleRegister(addr, value)),
            _ => Err(Exception::IllegalFunction),
        }
    }
}

impl tokio_modbus::server::Service for Simulator {
    type Request = Request<'static>;
    type Future = future::Ready<Result<Response, Exception>>;

    fn call(&self, req: Self::Request) -> Self::Future {
        future::ready(self.service_call(req))
    }
}

async fn run_tcp_server_context(listener: TcpListener, simulator: Simulator) {
    let server = server::tcp::Server::new(listener);
    let new_service = |_socket_addr| Ok(Some(simulator.clone()));
    let on_connected = |stream, socket_addr| async move {
        server::tcp::accept_tcp_connection(stream, socket_addr, new_service)
    };
    let on_process_error = |err| {
        tracing::error!("{err}");
    };
    if let Err(err) = server.serve(&on_connected, on_process_error).await {
        tracing::error!("{err}");
    }
}

/// Bind the simulator and serve it forever on a background task.
///
/// Returns the bound address so callers may pass port 0.
pub async fn spawn_tcp_simulator(
    socket_addr: SocketAddr,
    simulator: Simulator,
) -> Result<(SocketAddr, JoinHandle<()>), std::io::Error> {
    let listener = TcpListener::bind(socket_addr).await?;
    let bound_addr = listener.local_addr()?;
    let handle = tokio::spawn(run_tcp_server_context(listener, simulator));
    Ok((bound_addr, handle))
}
