//! Configuration loading, merging and the resolved run settings.
mod apply;
mod loader;
mod settings;
pub mod types;


pub use apply::apply_config;
pub use loader::load_config;
pub use settings::{PromptSourceKind, Settings};

pub(crate) use loader::{ConfigFormat, load_config_file};
