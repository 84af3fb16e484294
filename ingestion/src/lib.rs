//! Concurrent ingestion fan-out and the durable realtime sync queue — both
//! independent of the daily decision pipeline.

pub mod fanout;
pub mod sync_queue;

pub use fanout::{fetch_all, FanoutConfig, FetchOutcome};
pub use sync_queue::{InMemoryTickStore, SyncQueueError, Tick, TickState, TickStore};
