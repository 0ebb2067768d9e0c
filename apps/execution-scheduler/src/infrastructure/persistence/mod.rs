//! Persistence Adapters
//!
//! Implementations of `StateRepositoryPort`.

pub mod in_memory;
pub mod json_file;

pub use in_memory::InMemoryStateRepository;
pub use json_file::JsonFileStateRepository;
