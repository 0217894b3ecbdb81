#![forbid(unsafe_code)]

pub mod keys;
pub mod local;
pub mod records;
pub mod remote;
pub mod repository;
pub mod sqlite;

pub use local::LocalStore;
pub use remote::{DocumentRemote, InMemoryDocumentRemote, RemoteError};
pub use repository::{InMemoryStore, KeyValueStore, Storage, StorageError};
