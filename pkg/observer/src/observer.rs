use std::{collections::BTreeMap, sync::Arc};

use accumulator::{Accumulator, SharedAccumulator};
use futures::StreamExt;
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::{Error, EventSource, NoteEvent, Result, SharedAccount, Subscribers};

/// Applies ledger events to the local commitment tree, in index order
///
/// The observer is the only writer of its tree. Each insertion happens under the tree's write
/// lock, so anyone holding the [`SharedAccumulator`] sees either the state before or after an
/// insertion, never a partial one.
pub struct Observer<const DEPTH: usize> {
    tree: SharedAccumulator<DEPTH>,
    pending: BTreeMap<u64, NoteEvent>,
    subscribers: Subscribers,
}

impl<const DEPTH: usize> Default for Observer<DEPTH> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const DEPTH: usize> Observer<DEPTH> {
    /// An observer with an empty tree
    #[must_use]
    pub fn new() -> Self {
        Self {
            tree: Arc::new(RwLock::new(Accumulator::new())),
            pending: BTreeMap::new(),
            subscribers: Subscribers::default(),
        }
    }

    /// A handle to the tree, for proof assembly
    #[must_use]
    pub fn tree(&self) -> SharedAccumulator<DEPTH> {
        Arc::clone(&self.tree)
    }

    /// The number of commitments inserted so far
    #[must_use]
    pub fn num_leaves(&self) -> u64 {
        self.tree.read().num_leaves()
    }

    /// The number of events waiting for a lower index to arrive
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// A handle to the subscribed accounts, for adding accounts while the observer runs
    #[must_use]
    pub fn subscribers(&self) -> Subscribers {
        self.subscribers.clone()
    }

    /// Offer every note inserted from now on to `account`
    ///
    /// Notes already in the tree are not offered again; use [`rescan`](crate::rescan) for those.
    pub fn subscribe(&self, account: SharedAccount) {
        self.subscribers.add(account);
    }

    /// Apply one event, returning how many commitments were inserted as a result
    ///
    /// - an event at the next free index is inserted, followed by any buffered events that
    ///   are now contiguous
    /// - an event above the next free index is buffered
    /// - an event below it has already been inserted and is ignored
    /// - an event beyond the tree's capacity can never be inserted and is dropped
    pub fn handle(&mut self, event: NoteEvent) -> Result<usize> {
        let (next, capacity) = {
            let tree = self.tree.read();
            (tree.num_leaves(), tree.capacity())
        };

        if event.index >= capacity {
            warn!(index = event.index, capacity, "dropping event beyond the tree's capacity");
            return Ok(0);
        }

        if event.index < next {
            let known = self.tree.read().leaf(event.index);
            if known != Some(event.commitment) {
                warn!(
                    index = event.index,
                    commitment = %event.commitment,
                    "ledger re-announced an inserted index with a different commitment"
                );
            }
            return Ok(0);
        }

        if event.index > next {
            debug!(index = event.index, next, "buffering out-of-order event");
            self.pending.insert(event.index, event);
            return Ok(0);
        }

        self.insert(event)?;
        let mut count = 1;

        loop {
            let next = self.num_leaves();
            let Some(entry) = self.pending.first_entry() else {
                break;
            };
            if *entry.key() != next {
                break;
            }

            let event = entry.remove();
            self.insert(event)?;
            count += 1;
        }

        Ok(count)
    }

    /// Replay every historical event
    pub async fn ready<S: EventSource>(&mut self, source: &S) -> Result<()> {
        let history = source.history().await.map_err(Error::from_source)?;
        let total = history.len();

        for event in history {
            self.handle(event)?;
        }

        if !self.pending.is_empty() {
            warn!(
                pending = self.pending.len(),
                num_leaves = self.num_leaves(),
                "history has gaps, waiting for live events to fill them"
            );
        }

        info!(total, num_leaves = self.num_leaves(), "replayed ledger history");

        Ok(())
    }

    /// Subscribe to live events, replay history, then apply live events until the stream ends
    ///
    /// The subscription is opened before history is fetched so nothing emitted in between is
    /// lost; the overlap is dropped by [`handle`](Self::handle).
    pub async fn run<S: EventSource>(&mut self, source: &S) -> Result<()> {
        let mut live = source.subscribe().await.map_err(Error::from_source)?;

        self.ready(source).await?;

        while let Some(event) = live.next().await {
            self.handle(event.map_err(Error::from_source)?)?;
        }

        Ok(())
    }

    fn insert(&mut self, event: NoteEvent) -> Result<()> {
        self.tree.write().insert_at(event.index, event.commitment)?;
        self.subscribers.offer(&event);

        Ok(())
    }
}
