pub mod normalizer;
pub mod store;

pub use normalizer::{basic_normalize, Normalizer};
pub use store::{Archive, ArchiveEntry};
