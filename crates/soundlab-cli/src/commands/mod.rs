//! CLI command implementations.

pub mod common;
pub mod defaults;
pub mod info;
pub mod presets;
pub mod settings;
pub mod validate;
