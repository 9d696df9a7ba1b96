//! Document Management
//!
//! Byte-exact buffers for open documents, each with a lazily rebuilt
//! line-start index.

use std::cell::{Ref, RefCell};
use std::collections::HashMap;
use std::ops::Range as ByteRange;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tower_lsp::lsp_types::{Position, Range, Url};

use crate::core::edit::{Change, apply_changes};
use crate::core::error::{DocumentError, EditError, PositionError};
use crate::core::position;

/// Line-start table stamped with the buffer version it was computed from
#[derive(Debug, Default)]
struct LineCache {
    stamp: Option<u64>,
    starts: Vec<usize>,
}

/// An open document
#[derive(Debug)]
pub struct Document {
    uri: Url,
    text: String,
    /// Bumped on every buffer mutation
    version: u64,
    /// Version last reported by the client
    client_version: Option<i32>,
    line_cache: RefCell<LineCache>,
}

impl Document {
    pub fn new(uri: Url, text: String, client_version: Option<i32>) -> Self {
        Self {
            uri,
            text,
            version: 0,
            client_version,
            line_cache: RefCell::new(LineCache::default()),
        }
    }

    pub fn uri(&self) -> &Url {
        &self.uri
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn client_version(&self) -> Option<i32> {
        self.client_version
    }

    pub fn set_client_version(&mut self, client_version: Option<i32>) {
        if client_version.is_some() {
            self.client_version = client_version;
        }
    }

    /// Swap in a new buffer. The line cache goes stale with the version bump.
    pub fn replace_text(&mut self, text: String) {
        self.text = text;
        self.version += 1;
    }

    /// Apply a batch of changes atomically
    ///
    /// Either every change applies, in order, or the document is left exactly
    /// as it was. A batch that leaves the buffer byte-identical does not bump
    /// the version.
    pub fn apply(
        &mut self,
        changes: &[Change],
        client_version: Option<i32>,
    ) -> Result<ChangeOutcome, EditError> {
        let text = apply_changes(&self.text, changes)?;
        self.set_client_version(client_version);

        if text == self.text {
            log::debug!("change to {} left the buffer unchanged", self.uri);
            return Ok(ChangeOutcome { changed: false });
        }

        self.replace_text(text);
        log::debug!(
            "applied {} change(s) to {}, now at version {}",
            changes.len(),
            self.uri,
            self.version
        );
        Ok(ChangeOutcome { changed: true })
    }

    /// Line-start byte offsets for the current buffer
    ///
    /// Rebuilt whenever the cache stamp differs from the buffer version.
    pub fn line_starts(&self) -> Ref<'_, [usize]> {
        let stale = self.line_cache.borrow().stamp != Some(self.version);
        if stale {
            let starts = position::compute_line_starts(&self.text);
            log::trace!(
                "rebuilt line index for {} at version {} ({} lines)",
                self.uri,
                self.version,
                starts.len()
            );
            *self.line_cache.borrow_mut() = LineCache {
                stamp: Some(self.version),
                starts,
            };
        }
        Ref::map(self.line_cache.borrow(), |cache| cache.starts.as_slice())
    }

    pub fn line_count(&self) -> usize {
        self.line_starts().len()
    }

    pub fn offset_of(&self, position: Position) -> Result<usize, PositionError> {
        position::offset_of(&self.text, &self.line_starts(), position)
    }

    pub fn position_of(&self, offset: usize) -> Result<Position, PositionError> {
        position::position_of(&self.text, &self.line_starts(), offset)
    }

    pub fn range_of(&self, span: ByteRange<usize>) -> Result<Range, PositionError> {
        position::range_of(&self.text, &self.line_starts(), span)
    }

    /// Position of the end of the buffer
    pub fn end_position(&self) -> Position {
        let starts = self.line_starts();
        let last = starts.len() - 1;
        let character = self.text[starts[last]..]
            .chars()
            .map(|ch| ch.len_utf16() as u32)
            .sum();
        Position::new(last as u32, character)
    }
}

/// Result of applying a change notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeOutcome {
    /// False when the buffer ended up byte-identical to what it was
    pub changed: bool,
}

/// An open document behind its own lock
pub type SharedDocument = Arc<Mutex<Document>>;

/// Store of open documents keyed by URI
///
/// The map lock only guards membership. Reading or editing a document takes
/// that document's lock, so work on one document never waits on another.
#[derive(Debug, Default)]
pub struct DocumentManager {
    documents: RwLock<HashMap<Url, SharedDocument>>,
}

impl DocumentManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a document, replacing any existing one with the same URI
    pub async fn open(
        &self,
        uri: Url,
        text: String,
        client_version: Option<i32>,
    ) -> SharedDocument {
        log::debug!("open {} ({} bytes)", uri, text.len());
        let document = Document::new(uri.clone(), text, client_version);
        let document = Arc::new(Mutex::new(document));
        self.documents
            .write()
            .await
            .insert(uri, Arc::clone(&document));
        document
    }

    /// Apply a batch of changes to an open document
    ///
    /// Only the target document is locked while the batch is applied.
    pub async fn change(
        &self,
        uri: &Url,
        changes: &[Change],
        client_version: Option<i32>,
    ) -> Result<ChangeOutcome, DocumentError> {
        let document = self
            .get(uri)
            .await
            .ok_or_else(|| DocumentError::NotOpen(uri.clone()))?;

        let mut document = document.lock().await;
        document
            .apply(changes, client_version)
            .map_err(|source| DocumentError::Edit {
                uri: uri.clone(),
                source,
            })
    }

    /// Close a document and release its buffer. Returns whether it was open.
    pub async fn close(&self, uri: &Url) -> bool {
        let was_open = self.documents.write().await.remove(uri).is_some();
        if was_open {
            log::debug!("closed {}", uri);
        }
        was_open
    }

    pub async fn get(&self, uri: &Url) -> Option<SharedDocument> {
        self.documents.read().await.get(uri).cloned()
    }

    pub async fn is_open(&self, uri: &Url) -> bool {
        self.documents.read().await.contains_key(uri)
    }

    pub async fn uris(&self) -> Vec<Url> {
        self.documents.read().await.keys().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}
