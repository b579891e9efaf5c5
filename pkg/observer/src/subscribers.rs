use std::sync::Arc;

use accumulator::SharedAccumulator;
use notes::OwnedAccount;
use parking_lot::{Mutex, RwLock};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::{Error, EventSource, NoteEvent, Result};

/// An account that the observer offers every new note to
pub type SharedAccount = Arc<Mutex<OwnedAccount>>;

/// The accounts an [`Observer`](crate::Observer) offers notes to
///
/// Clones share the same list, so accounts can be added while the observer is running.
#[derive(Clone, Default)]
pub struct Subscribers(Arc<RwLock<Vec<SharedAccount>>>);

impl Subscribers {
    /// Offer every note inserted from now on to `account`
    pub fn add(&self, account: SharedAccount) {
        self.0.write().push(account);
    }

    /// The number of subscribed accounts
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.read().len()
    }

    /// Whether no account is subscribed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.read().is_empty()
    }

    pub(crate) fn offer(&self, event: &NoteEvent) {
        self.0.read().par_iter().for_each(|account| {
            offer(account, event);
        });
    }
}

fn offer(account: &SharedAccount, event: &NoteEvent) -> bool {
    let found = account
        .lock()
        .attempt_decrypt_and_add(event.commitment, &event.encrypted_data, event.index)
        .is_some();

    if found {
        debug!(index = event.index, "discovered note");
    }

    found
}

/// Offer `account` every note already in `tree`, reading their envelopes back from `source`
///
/// Events the tree has not reached yet, or whose commitment differs from the tree's leaf, are
/// skipped. Returns the number of notes found.
pub async fn rescan<S: EventSource, const DEPTH: usize>(
    account: &SharedAccount,
    tree: &SharedAccumulator<DEPTH>,
    source: &S,
) -> Result<usize> {
    let history = source.history().await.map_err(Error::from_source)?;

    let mut found = 0;
    for event in &history {
        let inserted = tree.read().leaf(event.index) == Some(event.commitment);
        if inserted && offer(account, event) {
            found += 1;
        }
    }

    info!(found, scanned = history.len(), "rescanned ledger history");

    Ok(found)
}
