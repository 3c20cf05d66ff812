//! Item list controller.
//!
//! # Responsibility
//! - Turn UI intents (add, remove) into background store writes.
//! - Expose the store's live item list to the UI unchanged.
//!
//! # Invariants
//! - Writes never run on the caller's thread; `add_item`/`remove_item`
//!   return immediately.
//! - Write outcomes are not reported to the caller. Failures are logged.
//! - The controller keeps no copy of the list beyond its subscription.
//! - The in-flight write count drops only after a write has published (or
//!   failed) and released its store handle, so `settled()` never resolves
//!   ahead of a queued write.

use crate::model::item::{Item, NewItem};
use crate::store::{ItemListReceiver, ItemSnapshot, ItemStore};
use log::{debug, error};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::watch;

/// Mediates between UI intents and an [`ItemStore`].
pub struct ItemListController {
    store: Arc<ItemStore>,
    runtime: Handle,
    items: ItemListReceiver,
    in_flight: Arc<watch::Sender<usize>>,
}

/// Counts one dispatched write until it is dropped on the blocking pool.
struct InFlightWrite(Arc<watch::Sender<usize>>);

impl InFlightWrite {
    fn start(counter: &Arc<watch::Sender<usize>>) -> Self {
        counter.send_modify(|count| *count += 1);
        Self(Arc::clone(counter))
    }
}

impl Drop for InFlightWrite {
    fn drop(&mut self) {
        self.0.send_modify(|count| *count -= 1);
    }
}

impl ItemListController {
    /// Creates a controller over an explicitly owned store.
    ///
    /// `runtime` supplies the blocking pool used for writes, so the controller
    /// can be driven from threads outside the runtime.
    pub fn new(store: Arc<ItemStore>, runtime: Handle) -> Self {
        let items = store.get_all();
        let (in_flight, _) = watch::channel(0);
        Self {
            store,
            runtime,
            items,
            in_flight: Arc::new(in_flight),
        }
    }

    /// Returns a new subscription to the live item list.
    pub fn items(&self) -> ItemListReceiver {
        self.items.clone()
    }

    /// Latest snapshot seen by the retained subscription.
    pub fn current_items(&self) -> ItemSnapshot {
        self.items.borrow().clone()
    }

    /// Number of dispatched writes that have not finished yet.
    pub fn pending_writes(&self) -> usize {
        *self.in_flight.borrow()
    }

    /// Resolves once every write dispatched so far has finished.
    pub async fn settled(&self) {
        let mut pending = self.in_flight.subscribe();
        // The sender lives in `self`, so the channel cannot close here.
        let _ = pending.wait_for(|count| *count == 0).await;
    }

    /// Queues insertion of a new item named `name`.
    pub fn add_item(&self, name: impl Into<String>) {
        let item = NewItem::new(name);
        let store = Arc::clone(&self.store);
        let write = InFlightWrite::start(&self.in_flight);
        self.runtime.spawn_blocking(move || {
            match store.insert(&item) {
                Ok(id) => {
                    debug!("event=item_write module=controller op=add status=ok item_id={id}")
                }
                Err(err) => {
                    error!("event=item_write module=controller op=add status=error error={err}")
                }
            }
            drop(store);
            drop(write);
        });
    }

    /// Queues deletion of `item`, matched by identity.
    pub fn remove_item(&self, item: Item) {
        let store = Arc::clone(&self.store);
        let write = InFlightWrite::start(&self.in_flight);
        self.runtime.spawn_blocking(move || {
            match store.delete(&item) {
                Ok(removed) => debug!(
                    "event=item_write module=controller op=remove status=ok item_id={} removed={removed}",
                    item.id
                ),
                Err(err) => error!(
                    "event=item_write module=controller op=remove status=error item_id={} error={err}",
                    item.id
                ),
            }
            drop(store);
            drop(write);
        });
    }
}
