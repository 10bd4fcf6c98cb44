//! Chunked register transfers.
//!
//! The device caps how many registers one request may carry, so an arbitrary
//! contiguous range is covered by a sequence of bounded sub-operations. The
//! first failing sub-operation aborts the whole transfer; whatever prefix
//! already landed in the block stays there, and the next successful full read
//! overwrites it.

use tracing::warn;

use crate::block::RegisterBlock;
use crate::codec::{Address, Quantity};
use crate::error::PollerResult;
use crate::transport::RegisterTransport;

/// Read `count` registers starting at `start` into `block`, in chunks of at
/// most `max_per_request`.
///
/// A short read (fewer words returned than requested, without an error) is
/// logged and not retried; the loop continues with the next chunk.
pub async fn read_chunked(
    transport: &mut dyn RegisterTransport,
    block: &mut RegisterBlock,
    start: Address,
    count: Quantity,
    max_per_request: Quantity,
) -> PollerResult<()> {
    check_request(block, start, count, max_per_request);

    let mut addr = start;
    let mut remaining = count;
    while remaining > 0 {
        let cnt = remaining.min(max_per_request);
        let words = transport.read_holding_registers(addr, cnt).await?;
        let received = (words.len() as Quantity).min(cnt);
        if received < cnt {
            warn!(addr, requested = cnt, received, "short read from device");
        }
        if received > 0 {
            block
                .words_mut(addr, received)
                .copy_from_slice(&words[..received as usize]);
        }
        addr += cnt;
        remaining -= cnt;
    }
    Ok(())
}

/// Write `count` registers starting at `start` from `block` to the device,
/// in chunks of at most `max_per_request`.
pub async fn write_chunked(
    transport: &mut dyn RegisterTransport,
    block: &RegisterBlock,
    start: Address,
    count: Quantity,
    max_per_request: Quantity,
) -> PollerResult<()> {
    check_request(block, start, count, max_per_request);

    let mut addr = start;
    let mut remaining = count;
    while remaining > 0 {
        let cnt = remaining.min(max_per_request);
        transport
            .write_multiple_registers(addr, block.words(addr, cnt))
            .await?;
        addr += cnt;
        remaining -= cnt;
    }
    Ok(())
}

fn check_request(block: &RegisterBlock, start: Address, count: Quantity, max_per_request: Quantity) {
    assert!(max_per_request > 0, "chunk limit must be positive");
    // Bounds are a precondition, not a runtime condition; panics on violation.
    let _ = block.words(start, count);
}
