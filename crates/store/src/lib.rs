//! `brickerp-store`
//!
//! **Responsibility:** durable local key-value persistence for the client.
//!
//! - `KeyValueStore`: the `get`/`set` contract every backend implements
//! - `SqliteStore`: file-backed store used by the client process
//! - `InMemoryStore`: tests/dev
//! - `LocalStorage`: namespaced keys plus `save_local` / `load_local`

pub mod error;
pub mod kv;
pub mod local;
pub mod memory;
pub mod sqlite;

pub use error::StorageError;
pub use kv::KeyValueStore;
pub use local::{LocalRecord, LocalStorage, DEFAULT_NAMESPACE};
pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;
