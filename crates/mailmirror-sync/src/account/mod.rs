//! Account settings.
//!
//! Notification policy, special folder names and sync options, loadable
//! from JSON.

mod model;
mod validation;

pub use model::{AccountSettings, FolderClass, FolderMode, SpecialFolders, StoreKind};
pub use validation::{ValidationError, ValidationResult, validate_settings};
