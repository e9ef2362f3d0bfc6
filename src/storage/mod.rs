mod memory;

pub use memory::{InMemoryLogStorage, StoredBlock};
