use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::NoteEvent;

/// A live stream of ledger events
pub type EventStream<E> = BoxStream<'static, Result<NoteEvent, E>>;

/// Where ledger events come from
#[async_trait]
pub trait EventSource: Send + Sync {
    /// The error type of the underlying transport
    type Error: std::error::Error + Send + Sync + 'static;

    /// Every event emitted so far
    async fn history(&self) -> Result<Vec<NoteEvent>, Self::Error>;

    /// Events emitted from now on
    ///
    /// The stream may overlap with [`history`](Self::history).
    async fn subscribe(&self) -> Result<EventStream<Self::Error>, Self::Error>;
}
