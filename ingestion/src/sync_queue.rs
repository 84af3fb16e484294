//! The realtime sync queue: a durable inbox for price
//! ticks arriving outside the daily batch cycle. `TickStore` is the
//! storage boundary; [`InMemoryTickStore`] is the reference implementation
//! used by tests and by the `quant` CLI's dry-run path.

use chrono::{DateTime, Utc};
use quant_core::ids::StockCode;
use quant_core::money::Won;
use std::collections::VecDeque;
use thiserror::Error;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum TickState {
    Pending,
    Processing,
    Done,
    Failed,
    DeadLettered,
}

#[derive(Debug, Clone)]
pub struct Tick {
    pub id: u64,
    pub code: StockCode,
    pub price: Won,
    pub volume: u64,
    pub created_at: DateTime<Utc>,
    pub state: TickState,
    pub retry_count: u32,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("sync queue error: {0}")]
pub struct SyncQueueError(pub String);

pub trait TickStore {
    fn enqueue(&mut self, code: StockCode, price: Won, volume: u64, created_at: DateTime<Utc>) -> u64;

    /// Claims up to `limit` pending ticks, oldest `created_at` first, and
    /// transitions them to `Processing`.
    fn claim_batch(&mut self, limit: usize) -> Vec<Tick>;

    fn mark_done(&mut self, id: u64) -> Result<(), SyncQueueError>;

    /// Marks a tick failed; re-queues it as `Pending` unless `retry_count`
    /// has reached `max_retries`, in which case it is dead-lettered.
    fn mark_failed(&mut self, id: u64, max_retries: u32) -> Result<(), SyncQueueError>;

    fn dead_letters(&self) -> Vec<Tick>;
}

#[derive(Debug, Default)]
pub struct InMemoryTickStore {
    ticks: VecDeque<Tick>,
    next_id: u64,
}

impl InMemoryTickStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TickStore for InMemoryTickStore {
    fn enqueue(&mut self, code: StockCode, price: Won, volume: u64, created_at: DateTime<Utc>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.ticks.push_back(Tick {
            id,
            code,
            price,
            volume,
            created_at,
            state: TickState::Pending,
            retry_count: 0,
        });
        id
    }

    fn claim_batch(&mut self, limit: usize) -> Vec<Tick> {
        let mut pending: Vec<&mut Tick> = self
            .ticks
            .iter_mut()
            .filter(|t| t.state == TickState::Pending)
            .collect();
        pending.sort_by_key(|t| t.created_at);
        pending
            .into_iter()
            .take(limit)
            .map(|t| {
                t.state = TickState::Processing;
                t.clone()
            })
            .collect()
    }

    fn mark_done(&mut self, id: u64) -> Result<(), SyncQueueError> {
        let tick = self
            .ticks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| SyncQueueError(format!("tick {id} not found")))?;
        tick.state = TickState::Done;
        Ok(())
    }

    fn mark_failed(&mut self, id: u64, max_retries: u32) -> Result<(), SyncQueueError> {
        let tick = self
            .ticks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| SyncQueueError(format!("tick {id} not found")))?;
        tick.retry_count += 1;
        if tick.retry_count >= max_retries {
            tick.state = TickState::DeadLettered;
        } else {
            tick.state = TickState::Pending;
        }
        Ok(())
    }

    fn dead_letters(&self) -> Vec<Tick> {
        self.ticks
            .iter()
            .filter(|t| t.state == TickState::DeadLettered)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(seconds: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + seconds, 0).unwrap()
    }

    #[test]
    fn claim_batch_drains_oldest_first() {
        let mut store = InMemoryTickStore::new();
        store.enqueue(StockCode::from("B"), Won(1), 1, at(20));
        store.enqueue(StockCode::from("A"), Won(1), 1, at(10));
        let batch = store.claim_batch(10);
        assert_eq!(batch[0].code, StockCode::from("A"));
        assert_eq!(batch[1].code, StockCode::from("B"));
    }

    #[test]
    fn failed_tick_requeues_until_max_retries_then_dead_letters() {
        let mut store = InMemoryTickStore::new();
        let id = store.enqueue(StockCode::from("A"), Won(1), 1, at(0));
        store.claim_batch(10);
        store.mark_failed(id, 2).unwrap();
        assert!(store.dead_letters().is_empty());

        store.claim_batch(10);
        store.mark_failed(id, 2).unwrap();
        assert_eq!(store.dead_letters().len(), 1);
    }

    #[test]
    fn done_tick_is_not_reclaimed() {
        let mut store = InMemoryTickStore::new();
        let id = store.enqueue(StockCode::from("A"), Won(1), 1, at(0));
        store.claim_batch(10);
        store.mark_done(id).unwrap();
        assert!(store.claim_batch(10).is_empty());
    }
}
