// Implementations of the draft store.

#[cfg(test)]
pub mod in_memory;
pub mod json_store;

#[cfg(test)]
pub use in_memory::InMemoryDraftStore;
pub use json_store::JsonDraftStore;
