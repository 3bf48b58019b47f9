/* 📖 # Why a MessageStore trait?

Contact messages are a flat, append-only collection: insert one, list them all, count
them. The trait captures exactly that, so the in-memory store used in tests and the
JSON lines file used in production are interchangeable behind a StoreHandle.
Ordering for display is applied by the handle, not by each backend.
*/

use std::sync::Arc;

use parking_lot::RwLock;

use folio_base::FolioResult;

use crate::message::{ContactMessage, MessageId};

/// Trait for contact message storage implementations.
pub trait MessageStore: Send + Sync + 'static {
    /// Append a message. Fails if a message with the same id is already stored.
    fn insert(&mut self, message: ContactMessage) -> FolioResult<MessageId>;

    /// All stored messages in insertion order.
    fn list(&self) -> FolioResult<Vec<ContactMessage>>;

    /// Check if a message with the given id exists.
    fn contains(&self, id: &MessageId) -> FolioResult<bool>;

    /// Get the number of stored messages.
    fn len(&self) -> FolioResult<usize>;

    /// Returns true if the store contains no messages.
    fn is_empty(&self) -> FolioResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Short human readable description used in startup logs and the status route.
    fn describe(&self) -> String;
}

/// A thread-safe handle to a message store.
///
/// Cloning is cheap and every clone sees the same store.
#[derive(Clone)]
pub struct StoreHandle(Arc<RwLock<dyn MessageStore>>);

impl StoreHandle {
    /// Create a new StoreHandle wrapping the given store implementation.
    pub fn new<S: MessageStore>(store: S) -> Self {
        Self(Arc::new(RwLock::new(store)))
    }

    /// See [`MessageStore::insert`].
    pub fn insert(&self, message: ContactMessage) -> FolioResult<MessageId> {
        self.0.write().insert(message)
    }

    /// See [`MessageStore::list`].
    pub fn list(&self) -> FolioResult<Vec<ContactMessage>> {
        self.0.read().list()
    }

    /// All messages, newest first.
    ///
    /// Messages with equal creation times are ordered by insertion, latest first.
    pub fn list_newest_first(&self) -> FolioResult<Vec<ContactMessage>> {
        let mut messages = self.list()?;
        messages.reverse();
        // stable sort keeps the reversed insertion order for equal timestamps
        messages.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(messages)
    }

    pub fn contains(&self, id: &MessageId) -> FolioResult<bool> {
        self.0.read().contains(id)
    }

    pub fn len(&self) -> FolioResult<usize> {
        self.0.read().len()
    }

    pub fn is_empty(&self) -> FolioResult<bool> {
        self.0.read().is_empty()
    }

    pub fn describe(&self) -> String {
        self.0.read().describe()
    }
}

impl std::fmt::Debug for StoreHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("StoreHandle").field(&self.describe()).finish()
    }
}
