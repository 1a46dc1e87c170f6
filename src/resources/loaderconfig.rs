//! Loader configuration resource.
//!
//! Manages asset locations and loader settings loaded from an INI
//! configuration file. Provides defaults for safe startup and methods to
//! load/save configuration.
//!
//! # Configuration File Format
//!
//! ```ini
//! [assets]
//! root = ./assets
//! internal_root = /internal
//! font_base = /internal/common/font
//!
//! [loader]
//! font_concurrency = 5
//!
//! [boot]
//! next_scene = HOME
//! ```

use bevy_ecs::prelude::*;
use configparser::ini::Ini;
use log::info;
use std::path::PathBuf;

use crate::resources::scenestate::SceneStates;

/// Default safe values for startup
const DEFAULT_ASSET_ROOT: &str = "./assets";
const DEFAULT_INTERNAL_ROOT: &str = "/internal";
const DEFAULT_FONT_BASE: &str = "/internal/common/font";
const DEFAULT_FONT_CONCURRENCY: usize = 5;
const DEFAULT_NEXT_SCENE: SceneStates = SceneStates::Home;
const DEFAULT_CONFIG_PATH: &str = "./config.ini";

/// Loader configuration resource.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct LoaderConfig {
    /// Directory URLs like `/internal/x.png` are resolved against.
    pub asset_root: PathBuf,
    /// Prefix of paths derived from layout files.
    pub internal_root: String,
    /// Directory of font files named in layouts (`<font_base>/<name>.ttf`).
    pub font_base: String,
    /// Maximum number of fonts decoded at once.
    pub font_concurrency: usize,
    /// Scene entered once the boot scene finishes loading.
    pub next_scene: SceneStates,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl LoaderConfig {
    /// Create a new configuration with safe default values.
    pub fn new() -> Self {
        Self {
            asset_root: PathBuf::from(DEFAULT_ASSET_ROOT),
            internal_root: DEFAULT_INTERNAL_ROOT.to_string(),
            font_base: DEFAULT_FONT_BASE.to_string(),
            font_concurrency: DEFAULT_FONT_CONCURRENCY,
            next_scene: DEFAULT_NEXT_SCENE,
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Create a new configuration with a custom config file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Load configuration from the INI file.
    ///
    /// Missing values retain their current (default) values.
    /// Returns an error if the file cannot be read or parsed, or holds an
    /// invalid value; nothing is applied in that case.
    pub fn load_from_file(&mut self) -> Result<(), String> {
        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(|e| format!("Failed to load config file: {}", e))?;

        // [boot] section
        let next_scene = match config.get("boot", "next_scene") {
            Some(next) => match SceneStates::from_name(&next) {
                Some(SceneStates::Boot | SceneStates::None) => {
                    return Err(format!("next_scene can not be '{}'", next));
                }
                Some(scene) => scene,
                None => return Err(format!("Unknown next_scene '{}'", next)),
            },
            None => self.next_scene,
        };

        // [loader] section
        let font_concurrency = match config.getuint("loader", "font_concurrency")? {
            Some(concurrency) => (concurrency as usize).max(1),
            None => self.font_concurrency,
        };

        // [assets] section
        if let Some(root) = config.get("assets", "root") {
            self.asset_root = PathBuf::from(root);
        }
        if let Some(internal_root) = config.get("assets", "internal_root") {
            self.internal_root = internal_root;
        }
        if let Some(font_base) = config.get("assets", "font_base") {
            self.font_base = font_base;
        }
        self.font_concurrency = font_concurrency;
        self.next_scene = next_scene;

        info!(
            "Loaded config: root={:?}, internal_root={}, font_base={}, font_concurrency={}, next_scene={:?}",
            self.asset_root,
            self.internal_root,
            self.font_base,
            self.font_concurrency,
            self.next_scene
        );

        Ok(())
    }

    /// Save configuration to the INI file.
    ///
    /// Creates the file if it doesn't exist.
    pub fn save_to_file(&self) -> Result<(), String> {
        let mut config = Ini::new();

        // [assets] section
        config.set(
            "assets",
            "root",
            Some(self.asset_root.to_string_lossy().into_owned()),
        );
        config.set("assets", "internal_root", Some(self.internal_root.clone()));
        config.set("assets", "font_base", Some(self.font_base.clone()));

        // [loader] section
        config.set(
            "loader",
            "font_concurrency",
            Some(self.font_concurrency.to_string()),
        );

        // [boot] section
        config.set("boot", "next_scene", Some(self.next_scene.name().to_string()));

        config
            .write(&self.config_path)
            .map_err(|e| format!("Failed to save config file: {}", e))?;

        info!("Saved config to {:?}", self.config_path);

        Ok(())
    }
}
