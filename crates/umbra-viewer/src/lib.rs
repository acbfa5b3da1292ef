//! Umbra Viewer
//!
//! eframe application hosting the shadow renderer. The renderer draws into a
//! texture registered with egui, which is shown in the central panel.

mod app;

pub use app::ViewerApp;

use umbra_core::{ConfigError, SceneConfig};

/// Environment variable holding the path of a RON scene configuration
pub const CONFIG_ENV: &str = "UMBRA_CONFIG";

/// Loads the configuration named by [`CONFIG_ENV`], or the defaults
pub fn load_config() -> Result<SceneConfig, ConfigError> {
    match std::env::var_os(CONFIG_ENV) {
        Some(path) => {
            tracing::info!("Loading scene configuration from {:?}", path);
            SceneConfig::load(&path).inspect_err(|e| {
                tracing::error!("Failed to load {:?}: {}", path, e);
            })
        }
        None => {
            tracing::debug!("{} not set, using default scene", CONFIG_ENV);
            Ok(SceneConfig::default())
        }
    }
}
