//! Database access for export staging

pub mod memory;
pub mod mongo;
pub mod schemas;
pub mod store;

pub use memory::MemoryStore;
pub use mongo::MongoClient;
pub use store::{DocumentStore, DocumentStream};
