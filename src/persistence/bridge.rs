//! Persistence bridge
//!
//! Keeps the in-memory flat fields, the local store and the remote mirror
//! eventually consistent. The local store is written synchronously and is the
//! durable source of truth; the remote mirror is a best-effort backup.

use futures_util::future::LocalBoxFuture;

use super::document::Document;
use super::key::StoreKey;
use super::remote::RemoteQueue;
use super::store::{KeyValueStore, Repository};
use crate::error::RemoteError;
use crate::wizard::AppState;

/// Where the startup state came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    Remote,
    Local,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadOutcome {
    pub state: AppState,
    pub source: LoadSource,
}

pub struct PersistenceBridge<S> {
    repo: Repository<S>,
    remote: RemoteQueue,
}

impl<S: KeyValueStore> PersistenceBridge<S> {
    pub fn new(store: S, remote: RemoteQueue) -> Self {
        Self {
            repo: Repository::new(store),
            remote,
        }
    }

    pub fn repo(&self) -> &Repository<S> {
        &self.repo
    }

    pub fn repo_mut(&mut self) -> &mut Repository<S> {
        &mut self.repo
    }

    pub fn remote(&self) -> &RemoteQueue {
        &self.remote
    }

    /// Startup load: the remote document wins when there is one and its
    /// namespaced entries are copied into the local store; otherwise the flat
    /// fields are read from the local store.
    pub async fn load(&mut self) -> LoadOutcome {
        log::info!("Loading planning data...");
        if let Some(doc) = self.remote.fetch().await {
            log::info!("Loaded {} entries from the remote mirror", doc.len());
            for (name, value) in doc.iter() {
                if StoreKey::parse(name).is_some_and(|key| key.is_namespaced()) {
                    self.repo.write_raw(name, value);
                }
            }
            return LoadOutcome {
                state: AppState::from_document(&doc),
                source: LoadSource::Remote,
            };
        }

        log::info!("No remote data, loading from local storage");
        LoadOutcome {
            state: self.read_local(),
            source: LoadSource::Local,
        }
    }

    fn read_local(&self) -> AppState {
        AppState {
            shops: self.repo.get(&StoreKey::shops(), Vec::new()),
            selected_shop: self.repo.get(&StoreKey::selected_shop(), String::new()),
            selected_week: self.repo.get(&StoreKey::selected_week(), String::new()),
            time_slot_config: AppState::config_from_value(
                &self.repo.get_value(&StoreKey::time_slot_config()),
            ),
        }
    }

    /// Synchronous local write of the four flat keys
    pub fn write_flat(&mut self, state: &AppState) {
        self.repo.set(&StoreKey::shops(), &state.shops);
        self.repo.set(&StoreKey::selected_shop(), &state.selected_shop);
        self.repo.set(&StoreKey::selected_week(), &state.selected_week);
        self.repo.set(&StoreKey::time_slot_config(), &state.config_value());
    }

    /// Flat fields plus every namespaced local entry
    pub fn snapshot(&self, state: &AppState) -> Document {
        Document::assemble(state, self.repo.namespaced_entries())
    }

    /// Mirror the current state remotely without waiting
    pub fn persist(&self, state: &AppState) {
        let doc = self.snapshot(state);
        log::debug!("Mirroring {} entries remotely", doc.len());
        self.remote.submit(doc);
    }

    /// Teardown flush: one best-effort write whose outcome the caller may await
    pub fn flush(&self, state: &AppState) -> LocalBoxFuture<'static, Result<(), RemoteError>> {
        log::info!("Flushing state before shutdown");
        self.remote.submit_tracked(self.snapshot(state))
    }

    /// Wipe the local store and write every key of `doc` verbatim
    pub fn replace_all(&mut self, doc: &Document) {
        self.repo.clear();
        for (name, value) in doc.iter() {
            self.repo.write_raw(name, value);
        }
    }

    /// Mirror a given document remotely without waiting
    pub fn push(&self, doc: Document) {
        self.remote.submit(doc);
    }

    pub fn clear_all(&mut self) {
        self.repo.clear();
    }
}
