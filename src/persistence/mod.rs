//! Local and remote persistence
//!
//! - `key`: typed composite keys and their string layout
//! - `store`: synchronous local store and its typed repository
//! - `remote`: asynchronous single-document mirror
//! - `document`: the merged state document
//! - `bridge`: load/persist/flush across both stores

pub mod bridge;
pub mod document;
pub mod key;
pub mod remote;
pub mod store;

pub use bridge::{LoadOutcome, LoadSource, PersistenceBridge};
pub use document::Document;
pub use key::{KeyKind, StoreKey};
pub use remote::{MemoryMirror, RemoteMirror, RemoteQueue, Spawner};
pub use store::{KeyValueStore, MemoryStore, Repository};
