//! History store adapters.

mod file;
mod in_memory;

pub use file::FileHistoryStore;
pub use in_memory::InMemoryHistoryStore;
