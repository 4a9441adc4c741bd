//! Pattern-store implementations for the preference engine.

pub mod memory;

pub use memory::MemoryPatternStore;
