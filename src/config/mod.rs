// Configuration module
// Public interface for configuration loading

mod loader;
mod settings;

pub use loader::{parse_value, ConfigStore, Scope, CONFIG_DIR};
pub use settings::{Settings, DEFAULT_BASE_URL, DEFAULT_MODEL};
