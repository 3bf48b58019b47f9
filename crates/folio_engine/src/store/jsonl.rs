/* 📖 # Why a JSON lines file as the document store?

Messages are never updated or deleted, so an append-only file with one JSON document
per line is a complete document store for this workload. Each insert is a single
append through the PAL; on open the file is read once and kept in memory for listing.
A line that fails to parse stops the open with its line number instead of silently
dropping messages. The one exception is a line that ends mid-document: that is what an
append torn by a crash or a full disk leaves behind, and it is skipped with a warning.
After such a tear the next append starts on a fresh line, so it is never glued onto
the fragment.
*/

use folio_base::{FilePath, FolioResult, PalHandle, ResultExt};
use tracing::{debug, info, warn};

use crate::message::{ContactMessage, MessageId};
use crate::store::memory::InMemoryStore;
use crate::store::traits::MessageStore;

/// Message store persisted as a JSON lines file relative to the PAL base directory.
#[derive(Debug)]
pub struct JsonLinesStore {
    pal: PalHandle,
    path: FilePath,
    cache: InMemoryStore,
    /// The file may end in a partial line; the next append must begin with a newline.
    needs_separator: bool,
}

impl JsonLinesStore {
    /// Open the store, creating its directory and loading any existing messages.
    pub fn open(pal: PalHandle, path: FilePath) -> FolioResult<Self> {
        if path.as_str().is_empty() || path.escapes_base() {
            folio_base::bail!(
                "Store file '{}' must be a relative path inside the working directory",
                path
            );
        }
        if let Some(parent) = path.parent() {
            pal.create_directory_all(&parent)
                .with_context(|| format!("Failed to create store directory {}", parent))?;
        }

        let (messages, needs_separator) = if pal.file_exists(&path)? {
            let content = pal
                .read_file_to_string(&path)
                .with_context(|| format!("Failed to read store file {}", path))?;
            let messages = parse_lines(&content)
                .with_context(|| format!("Failed to load store file {}", path))?;
            (messages, !content.is_empty() && !content.ends_with('\n'))
        } else {
            debug!(%path, "store file does not exist yet");
            (Vec::new(), false)
        };

        info!(%path, messages = messages.len(), "opened message store");
        Ok(Self {
            cache: InMemoryStore::from_messages(messages)?,
            pal,
            path,
            needs_separator,
        })
    }
}

fn parse_lines(content: &str) -> FolioResult<Vec<ContactMessage>> {
    let mut messages = Vec::new();
    for (index, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str(line) {
            Ok(message) => messages.push(message),
            Err(e) if e.is_eof() => {
                warn!(line = index + 1, error = %e, "skipping truncated message line");
            }
            Err(e) => folio_base::bail!("Invalid message on line {}: {}", index + 1, e),
        }
    }
    Ok(messages)
}

impl MessageStore for JsonLinesStore {
    fn insert(&mut self, message: ContactMessage) -> FolioResult<MessageId> {
        if self.cache.contains(message.id())? {
            folio_base::bail!("Message {} already exists", message.id());
        }
        let mut line = if self.needs_separator {
            vec![b'\n']
        } else {
            Vec::new()
        };
        serde_json::to_writer(&mut line, &message)
            .map_err(|e| folio_base::err!("Failed to serialize message: {}", e))?;
        line.push(b'\n');

        let appended = self.pal.append_to_file(&self.path, &line);
        // a failed append may still have written part of the line
        self.needs_separator = appended.is_err();
        appended.with_context(|| format!("Failed to append message to {}", self.path))?;
        self.cache.insert(message)
    }

    fn list(&self) -> FolioResult<Vec<ContactMessage>> {
        self.cache.list()
    }

    fn contains(&self, id: &MessageId) -> FolioResult<bool> {
        self.cache.contains(id)
    }

    fn len(&self) -> FolioResult<usize> {
        self.cache.len()
    }

    fn describe(&self) -> String {
        format!("file://{}", self.path)
    }
}
