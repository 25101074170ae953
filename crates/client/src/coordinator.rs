//! Per-item sequencing of remote writes.
//!
//! Each item id has a FIFO gate. A write must hold the gate from dispatch
//! until its outcome has been applied locally, so two writes to the same
//! item never overlap and are applied in the order they were issued.
//! Writes to different items proceed independently.
//!
//! A reload is exclusive with respect to writes: it waits for every write in
//! flight, and writes issued while it runs wait for it. Both queues are fair,
//! so a reload and the writes around it resolve in issue order.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use stockview_core::ItemId;
use tokio::sync::{OwnedMutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Lifecycle of the most recent write for an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MutationState {
    /// No write has been issued (or the item has no history).
    #[default]
    Idle,
    /// Request sent, local state not yet changed.
    InFlight,
    /// The service accepted the write and the store was reconciled.
    Committed,
    /// The service rejected the write; the store is untouched.
    Failed,
}

#[derive(Debug, Default)]
struct Inner {
    gates: HashMap<ItemId, Arc<tokio::sync::Mutex<()>>>,
    states: HashMap<ItemId, MutationState>,
}

#[derive(Debug, Default)]
pub struct MutationCoordinator {
    inner: Mutex<Inner>,
    reload: RwLock<()>,
}

/// Held by a reload while its snapshot is fetched and applied.
pub type ReloadGuard<'a> = RwLockWriteGuard<'a, ()>;

impl MutationCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self, id: &ItemId) -> MutationState {
        self.lock().states.get(id).copied().unwrap_or_default()
    }

    /// Wait for every earlier write to `id` to resolve, then mark this one
    /// in flight. The returned permit must be resolved with
    /// [`MutationPermit::commit`] or [`MutationPermit::fail`].
    pub async fn begin(&self, id: &ItemId) -> MutationPermit<'_> {
        let shared = self.reload.read().await;
        let gate = {
            let mut inner = self.lock();
            inner.gates.entry(id.clone()).or_default().clone()
        };

        let guard = gate.lock_owned().await;
        self.set_state(id, MutationState::InFlight);

        MutationPermit {
            coordinator: self,
            id: id.clone(),
            guard: Some(guard),
            resolved: false,
            _shared: shared,
        }
    }

    /// Wait until no write is in flight, then hold off new writes until the
    /// returned guard is dropped.
    pub async fn begin_reload(&self) -> ReloadGuard<'_> {
        self.reload.write().await
    }

    fn set_state(&self, id: &ItemId, state: MutationState) {
        self.lock().states.insert(id.clone(), state);
    }

    /// Drop the gate for `id` once nobody holds or waits on it.
    fn release(&self, id: &ItemId) {
        let mut inner = self.lock();
        if inner
            .gates
            .get(id)
            .is_some_and(|gate| Arc::strong_count(gate) == 1)
        {
            inner.gates.remove(id);
        }
    }

    /// Forget outcomes for ids that are no longer loaded.
    pub fn retain_states<F>(&self, mut keep: F)
    where
        F: FnMut(&ItemId) -> bool,
    {
        self.lock().states.retain(|id, _| keep(id));
    }
}

/// Exclusive right to write one item, held until the outcome is applied.
#[derive(Debug)]
pub struct MutationPermit<'a> {
    coordinator: &'a MutationCoordinator,
    id: ItemId,
    guard: Option<OwnedMutexGuard<()>>,
    resolved: bool,
    _shared: RwLockReadGuard<'a, ()>,
}

impl MutationPermit<'_> {
    pub fn id(&self) -> &ItemId {
        &self.id
    }

    pub fn commit(mut self) {
        self.resolve(MutationState::Committed);
    }

    pub fn fail(mut self) {
        self.resolve(MutationState::Failed);
    }

    fn resolve(&mut self, state: MutationState) {
        self.coordinator.set_state(&self.id, state);
        self.resolved = true;
    }
}

impl Drop for MutationPermit<'_> {
    fn drop(&mut self) {
        if !self.resolved {
            tracing::warn!(item_id = %self.id, "write abandoned before it resolved");
            self.coordinator.set_state(&self.id, MutationState::Failed);
        }
        drop(self.guard.take());
        self.coordinator.release(&self.id);
    }
}
