#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]
#![deny(missing_docs)]

//! Keeps a local copy of the ledger's commitment tree in sync and hands every new note to the
//! accounts that want to discover their funds
//!
//! Ledger events can arrive out of order. The [`Observer`] buffers them and only inserts a
//! commitment once every lower index has been inserted, so the local root always matches a
//! root the ledger has had.

mod error;
mod event;
mod observer;
mod source;
mod subscribers;

pub use error::{Error, Result};
pub use event::NoteEvent;
pub use observer::Observer;
pub use source::{EventSource, EventStream};
pub use subscribers::{rescan, SharedAccount, Subscribers};
