//! Chat store adapters
//!
//! [`InMemoryChatStore`] keeps documents in process memory with live
//! snapshot listeners. Opened with a file path, it also writes every
//! change through to a JSON document so conversations survive restarts.

mod memory;

pub use memory::InMemoryChatStore;
