/* 📖 # Why keep an in-memory store?

Selected with `STORE_URL=memory://`. Useful for tests and for running the backend
without touching disk; everything is lost when the process exits.
*/

use std::collections::HashSet;

use folio_base::FolioResult;

use crate::message::{ContactMessage, MessageId};
use crate::store::traits::MessageStore;

/// A message store backed by a Vec in insertion order.
///
/// ```
/// use folio_engine::{ContactMessage, ContactSubmission, MessageId, MessageStore};
/// use folio_engine::store::InMemoryStore;
///
/// let mut store = InMemoryStore::new();
/// let valid = ContactSubmission::new("A", "a@x.com", "Hi", "Hello").validate().unwrap();
/// let id = store
///     .insert(ContactMessage::new(MessageId::generate(), valid, chrono::Utc::now()))
///     .unwrap();
///
/// assert!(store.contains(&id).unwrap());
/// assert_eq!(store.len().unwrap(), 1);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryStore {
    messages: Vec<ContactMessage>,
    ids: HashSet<MessageId>,
}

impl InMemoryStore {
    /// Create a new, empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store preloaded with messages, e.g. loaded from a file.
    pub(crate) fn from_messages(messages: Vec<ContactMessage>) -> FolioResult<Self> {
        let mut store = Self::new();
        for message in messages {
            store.insert(message)?;
        }
        Ok(store)
    }
}

impl MessageStore for InMemoryStore {
    fn insert(&mut self, message: ContactMessage) -> FolioResult<MessageId> {
        let id = message.id().clone();
        if !self.ids.insert(id.clone()) {
            folio_base::bail!("Message {} already exists", id);
        }
        self.messages.push(message);
        Ok(id)
    }

    fn list(&self) -> FolioResult<Vec<ContactMessage>> {
        Ok(self.messages.clone())
    }

    fn contains(&self, id: &MessageId) -> FolioResult<bool> {
        Ok(self.ids.contains(id))
    }

    fn len(&self) -> FolioResult<usize> {
        Ok(self.messages.len())
    }

    fn describe(&self) -> String {
        "memory://".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{ids, sample_message};

    #[test]
    fn test_store_new() {
        let store = InMemoryStore::new();
        assert!(store.is_empty().unwrap());
        assert_eq!(store.len().unwrap(), 0);
        assert_eq!(store.describe(), "memory://");
    }

    #[test]
    fn test_store_insert_and_list_in_insertion_order() {
        let mut store = InMemoryStore::new();
        store.insert(sample_message("b", "Bea", 20)).unwrap();
        let id = store.insert(sample_message("a", "Al", 10)).unwrap();

        assert_eq!(id.as_str(), "a");
        assert_eq!(ids(&store.list().unwrap()), ["b", "a"]);
        assert_eq!(store.len().unwrap(), 2);
    }

    #[test]
    fn test_store_rejects_duplicate_id() {
        let mut store = InMemoryStore::new();
        store.insert(sample_message("a", "Al", 0)).unwrap();

        let error = store.insert(sample_message("a", "Bea", 5)).unwrap_err();
        assert_eq!(error.to_string(), "Message a already exists");
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn test_store_contains() {
        let mut store = InMemoryStore::new();
        let id = MessageId::from_string("a");

        assert!(!store.contains(&id).unwrap());
        store.insert(sample_message("a", "Al", 0)).unwrap();
        assert!(store.contains(&id).unwrap());
    }
}
