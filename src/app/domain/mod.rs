//! Core data structures: the versioned document schema, the persisted
//! settings mapping, and the window state derived from it.

pub mod document;
pub mod settings;
pub mod windowing;
