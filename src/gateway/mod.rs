//! Sync gateway: the single boundary between the board and the remote store
//! of record.
//!
//! The gateway exposes four generic primitives over JSON records and is the
//! only component allowed to perform I/O. Services decode the returned
//! records into domain types with [`decode_record`] and [`decode_records`].
//!
//! - Port contract in [`SyncGateway`]
//! - Record vocabulary ([`Table`], [`Filter`], [`OrderBy`]) in this module
//! - In-memory adapter in [`memory`]

pub mod memory;
mod port;
mod record;

#[cfg(test)]
pub use port::MockSyncGateway;
pub use port::{GatewayResult, RemoteError, SyncGateway};
pub use record::{
    Filter, OrderBy, Record, Table, decode_record, decode_records, encode_record,
};
