//! Storm Services Layer
//!
//! Settings file and input classification: the pieces between the platform
//! and the simulation core.

pub mod input;
pub mod settings;

pub use input::{apply, InputEvent, InputOutcome, PointerButton};
pub use settings::{BackendKind, Settings, SettingsError};
