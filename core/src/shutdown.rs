//! Graceful shutdown primitives shared by the scheduler and ingestion
//! fan-out.

use serde::{Deserialize, Serialize};
use std::future::Future;

/// Components that can complete shutdown immediately, without async work.
pub trait SyncShutdown {
    type Result;
    fn shutdown(&mut self) -> Self::Result;
}

/// Components that need to await in-flight work (draining a channel,
/// flushing a queue) during shutdown.
pub trait AsyncShutdown {
    type Result;
    fn shutdown(&mut self) -> impl Future<Output = Self::Result>;
}

/// A shutdown signal, sendable through an event stream.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Deserialize, Serialize,
)]
pub struct Shutdown;
