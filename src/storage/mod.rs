/// The block storage abstraction.
mod block_storage;
/// Memory-backed block storage.
mod memory;

pub use block_storage::*;
pub use memory::*;
