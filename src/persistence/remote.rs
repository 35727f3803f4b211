//! Remote mirror
//!
//! The mirror holds one document under a single key. Writes are submitted as
//! independent tasks: nothing waits for them, nothing orders them, and the last
//! one to land wins. Only the teardown flush hands back a completion future.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use futures_util::FutureExt;
use futures_util::future::{self, LocalBoxFuture};

use super::document::Document;
use crate::error::RemoteError;

/// Asynchronous single-document store
pub trait RemoteMirror {
    /// Current document, `None` when the mirror holds nothing
    fn fetch(&self) -> LocalBoxFuture<'static, Result<Option<Document>, RemoteError>>;
    /// Replace the document
    fn store(&self, document: Document) -> LocalBoxFuture<'static, Result<(), RemoteError>>;
}

/// Runs detached tasks on the current thread
pub trait Spawner {
    fn spawn(&self, task: LocalBoxFuture<'static, ()>);
}

/// Fire-and-forget writer in front of a `RemoteMirror`
#[derive(Clone)]
pub struct RemoteQueue {
    mirror: Rc<dyn RemoteMirror>,
    spawner: Rc<dyn Spawner>,
    generation: Rc<Cell<u64>>,
    in_flight: Rc<Cell<usize>>,
}

impl RemoteQueue {
    pub fn new(mirror: Rc<dyn RemoteMirror>, spawner: Rc<dyn Spawner>) -> Self {
        Self {
            mirror,
            spawner,
            generation: Rc::new(Cell::new(0)),
            in_flight: Rc::new(Cell::new(0)),
        }
    }

    /// Writes submitted but not yet settled
    pub fn in_flight(&self) -> usize {
        self.in_flight.get()
    }

    /// Number of writes submitted so far
    pub fn generation(&self) -> u64 {
        self.generation.get()
    }

    /// Write `document` and return a future that settles with the outcome.
    /// Failures are logged here; the result is informational.
    pub fn submit_tracked(&self, document: Document) -> LocalBoxFuture<'static, Result<(), RemoteError>> {
        let generation = self.generation.get() + 1;
        self.generation.set(generation);
        self.in_flight.set(self.in_flight.get() + 1);

        let in_flight = Rc::clone(&self.in_flight);
        let latest = Rc::clone(&self.generation);
        let write = self.mirror.store(document);
        async move {
            let result = write.await;
            in_flight.set(in_flight.get().saturating_sub(1));
            match &result {
                Ok(()) if generation < latest.get() => {
                    log::debug!("Remote write #{} landed, #{} already issued", generation, latest.get())
                }
                Ok(()) => log::info!("Remote write #{} saved", generation),
                Err(e) => log::warn!("Remote write #{} failed: {}", generation, e),
            }
            result
        }
        .boxed_local()
    }

    /// Write `document` without waiting
    pub fn submit(&self, document: Document) {
        let write = self.submit_tracked(document);
        self.spawner.spawn(write.map(|_| ()).boxed_local());
    }

    /// Read the remote document; errors are logged and read as "nothing there"
    pub fn fetch(&self) -> LocalBoxFuture<'static, Option<Document>> {
        self.mirror
            .fetch()
            .map(|result| match result {
                Ok(Some(doc)) => Some(doc),
                Ok(None) => {
                    log::info!("No remote data found");
                    None
                }
                Err(e) => {
                    log::warn!("Loading from the remote mirror failed: {}", e);
                    None
                }
            })
            .boxed_local()
    }
}

/// In-memory mirror. Clones share the same document.
#[derive(Clone, Default)]
pub struct MemoryMirror {
    document: Rc<RefCell<Option<Document>>>,
    writes: Rc<Cell<usize>>,
    failing: Rc<Cell<bool>>,
}

impl MemoryMirror {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(document: Document) -> Self {
        let mirror = Self::default();
        mirror.document.replace(Some(document));
        mirror
    }

    pub fn document(&self) -> Option<Document> {
        self.document.borrow().clone()
    }

    /// Successful writes so far
    pub fn writes(&self) -> usize {
        self.writes.get()
    }

    /// Make every subsequent call fail
    pub fn set_failing(&self, failing: bool) {
        self.failing.set(failing);
    }
}

impl RemoteMirror for MemoryMirror {
    fn fetch(&self) -> LocalBoxFuture<'static, Result<Option<Document>, RemoteError>> {
        let result = if self.failing.get() {
            Err(RemoteError::Request("memory mirror offline".into()))
        } else {
            // An emptied node reads as absent, like the hosted database
            Ok(self.document().filter(|doc| !doc.is_empty()))
        };
        future::ready(result).boxed_local()
    }

    fn store(&self, document: Document) -> LocalBoxFuture<'static, Result<(), RemoteError>> {
        let slot = Rc::clone(&self.document);
        let writes = Rc::clone(&self.writes);
        let failing = self.failing.get();
        async move {
            if failing {
                return Err(RemoteError::Request("memory mirror offline".into()));
            }
            slot.replace(Some(document));
            writes.set(writes.get() + 1);
            Ok(())
        }
        .boxed_local()
    }
}
