//! Editor configuration.
//!
//! Layered: built-in defaults, then `<config_dir>/wfs-editor/config.json`,
//! then `WFS_EDITOR_*` environment variables.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};

const APP_NAME: &str = "wfs-editor";
const CONFIG_FILE: &str = "config.json";

const DEFAULT_GEOSERVER_URL: &str = "http://localhost:8080/geoserver/wfs";
const OSM_TILE_URL: &str = "https://tile.openstreetmap.org/{z}/{x}/{y}.png";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EditorConfig {
    /// WFS endpoint, e.g. `https://maps.example.com/geoserver/wfs`
    pub geoserver_url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Qualified feature type name
    pub type_name: String,
    /// Namespace URI bound to the type name prefix in transactions
    pub namespace_uri: Option<String>,
    /// Name of the geometry attribute of the feature type
    pub geometry_property: String,
    pub max_features: u32,
    pub timeout_secs: u64,
    /// MapTiler key for the satellite base map. Without one OSM tiles are used.
    pub tile_key: Option<String>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            geoserver_url: DEFAULT_GEOSERVER_URL.to_string(),
            username: None,
            password: None,
            type_name: "test:test".to_string(),
            namespace_uri: None,
            geometry_property: "the_geom".to_string(),
            max_features: 50,
            timeout_secs: 30,
            tile_key: None,
        }
    }
}

impl EditorConfig {
    /// Load the config file (if any) and apply environment overrides.
    pub fn load() -> Self {
        let mut config = match get_config_path().and_then(|p| Self::load_from(&p)) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load config, using defaults: {:#}", e);
                Self::default()
            }
        };
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    /// Read a config file. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config = serde_json::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content).context("Failed to write config file")?;
        Ok(())
    }

    /// Apply `WFS_EDITOR_*` overrides read through `var`.
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(url) = var("WFS_EDITOR_GEOSERVER_URL") {
            self.geoserver_url = url;
        }
        if let Some(user) = var("WFS_EDITOR_GEOSERVER_USERNAME") {
            self.username = Some(user);
        }
        if let Some(pass) = var("WFS_EDITOR_GEOSERVER_PASSWORD") {
            self.password = Some(pass);
        }
        if let Some(type_name) = var("WFS_EDITOR_TYPE_NAME") {
            self.type_name = type_name;
        }
        if let Some(uri) = var("WFS_EDITOR_NAMESPACE_URI") {
            self.namespace_uri = Some(uri);
        }
        if let Some(prop) = var("WFS_EDITOR_GEOMETRY_PROPERTY") {
            self.geometry_property = prop;
        }
        if let Some(key) = var("WFS_EDITOR_TILE_KEY") {
            self.tile_key = Some(key);
        }
        if let Some(n) = parse_var(&var, "WFS_EDITOR_MAX_FEATURES") {
            self.max_features = n;
        }
        if let Some(n) = parse_var(&var, "WFS_EDITOR_TIMEOUT_SECS") {
            self.timeout_secs = n;
        }
    }

    /// Base map tile URL template.
    pub fn tile_url(&self) -> String {
        match &self.tile_key {
            Some(key) => format!(
                "https://api.maptiler.com/maps/satellite/{{z}}/{{x}}/{{y}}.jpg?key={}",
                key
            ),
            None => OSM_TILE_URL.to_string(),
        }
    }

    /// Copy safe to print or serve: secrets replaced.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.password.is_some() {
            copy.password = Some("********".to_string());
        }
        if copy.tile_key.is_some() {
            copy.tile_key = Some("********".to_string());
        }
        copy
    }
}

fn parse_var<T: std::str::FromStr>(var: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = var(key)?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!("Ignoring {}: {:?} is not a valid number", key, raw);
            None
        }
    }
}

pub fn get_config_path() -> Result<PathBuf> {
    let mut path =
        config_dir().ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
    path.push(APP_NAME);
    path.push(CONFIG_FILE);
    Ok(path)
}
