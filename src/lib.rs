//! Stackist core - the backing store of a sprite-stack editing tool.
//!
//! The GUI shell is a thin layer over three pieces:
//!
//! - the versioned sprite-stack document schema and its JSON codec
//! - a settings store with recursive default-merging, persisted to a
//!   single file in the user's config directory
//! - a windowing adapter that captures live window geometry into the
//!   settings store and derives startup parameters back out of it
//!
//! Rendering, event handling and native dialogs live in the shell; this
//! crate only ever sees resolved file paths and raw bytes.

pub mod app;

pub use app::api::App;
pub use app::domain::document::{Animation, Frame, Group, Slice, StackDocument, FORMAT_VERSION};
pub use app::domain::settings::{merge, SettingsMap, SettingsStore};
pub use app::domain::windowing::{StartMode, Windowing, WINDOWING_KEY};
pub use app::error::{AppError, Result};
