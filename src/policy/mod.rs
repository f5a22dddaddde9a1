pub mod eviction;

pub use eviction::{EvictWith, MaxEntries, NeverEvict};
