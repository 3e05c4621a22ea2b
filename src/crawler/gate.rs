//! Concurrency gate bounding in-flight fetches
//!
//! The gate is a counting semaphore with a fixed capacity. It is created by
//! the caller and injected into the engine, so tests can use a gate of
//! capacity 1.

use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// A slot in the gate; the slot is released when this value is dropped
pub type GatePermit = OwnedSemaphorePermit;

/// Bounds the number of simultaneous fetches across a run
#[derive(Debug, Clone)]
pub struct ConcurrencyGate {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

impl ConcurrencyGate {
    /// Creates a gate admitting at most `capacity` holders at once
    ///
    /// A capacity of zero is raised to one so the gate can always make progress.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Waits for a free slot and returns a permit holding it
    ///
    /// Waiters are admitted as slots free up, with no further fairness
    /// guarantee.
    pub async fn acquire(&self) -> GatePermit {
        match self.semaphore.clone().acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => unreachable!("gate semaphore is never closed"),
        }
    }

    /// Maximum number of simultaneous holders
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of slots currently free
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Number of slots currently held
    pub fn in_flight(&self) -> usize {
        self.capacity - self.available()
    }
}
