//! Execution adapters. Both run the same [`CrudBase`](crate::CrudBase)
//! logic; they differ only in how the caller waits.

pub mod asynchronous;
pub mod blocking;

pub use asynchronous::AsyncCrud;
pub use blocking::{BlockingConnection, SyncCrud};
