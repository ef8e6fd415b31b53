//! Application core.
//!
//! # Structure
//!
//! - `domain/` - the document schema, settings store and windowing state
//! - `error.rs` - the crate error taxonomy
//! - `api.rs` - the facade the GUI shell calls into

pub mod api;
pub mod domain;
pub mod error;
