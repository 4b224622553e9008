//! Configuration du rendu

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use anyhow::{ensure, Context, Result};
use geomap::{Icon, InitOptions, Size, TileLayerOptions};

/// Variable d'environnement désignant un fichier de configuration
pub const CONFIG_ENV: &str = "PORTFOLIO_MAP_CONFIG";

/// Côté maximal du conteneur en pixels
pub const MAX_CONTAINER_SIZE: f64 = 16384.0;

/// Configuration principale (tous les champs ont une valeur par défaut)
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Identifiant du conteneur de la carte
    pub container_id: String,

    /// Identifiant du script JSON contenant le GeoJSON
    pub data_id: String,

    /// Propriété affichée dans les popups
    pub popup_property: String,

    /// Largeur du conteneur en pixels
    pub width: f64,

    /// Hauteur du conteneur en pixels
    pub height: f64,

    /// Marge de calage en pixels
    pub padding: f64,

    /// Fond de tuiles
    pub tile: TileLayerOptions,

    /// Icône des marqueurs
    pub icon: Icon,
}

impl Default for Config {
    fn default() -> Self {
        let options = InitOptions::default();
        Self {
            container_id: options.container_id,
            data_id: options.data_id,
            popup_property: options.popup_property,
            width: options.size.width,
            height: options.size.height,
            padding: options.padding,
            tile: options.tile,
            icon: options.icon,
        }
    }
}

impl Config {
    /// Charge une configuration depuis un fichier
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        serde_json::from_str(&content).context("Failed to parse config JSON")
    }

    /// Fichier explicite, sinon `PORTFOLIO_MAP_CONFIG`, sinon valeurs par défaut
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }
        match std::env::var_os(CONFIG_ENV) {
            Some(path) if !path.is_empty() => Self::load(&PathBuf::from(path)),
            _ => Ok(Self::default()),
        }
    }

    /// Surcharge la taille du conteneur (arguments CLI)
    pub fn with_size(mut self, width: Option<f64>, height: Option<f64>) -> Self {
        if let Some(width) = width {
            self.width = width;
        }
        if let Some(height) = height {
            self.height = height;
        }
        self
    }

    /// Rejette une taille de conteneur ou une marge inutilisable
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("width", self.width), ("height", self.height)] {
            ensure!(
                value.is_finite() && value > 0.0 && value <= MAX_CONTAINER_SIZE,
                "Invalid container {}: {} (expected 0 < {} <= {})",
                name,
                value,
                name,
                MAX_CONTAINER_SIZE
            );
        }
        ensure!(
            self.padding.is_finite() && self.padding >= 0.0,
            "Invalid padding: {} (expected a finite value >= 0)",
            self.padding
        );
        Ok(())
    }

    /// Options d'initialisation de la carte
    pub fn to_options(&self) -> InitOptions {
        InitOptions {
            container_id: self.container_id.clone(),
            data_id: self.data_id.clone(),
            size: Size::new(self.width, self.height),
            tile: self.tile.clone(),
            icon: self.icon.clone(),
            popup_property: self.popup_property.clone(),
            padding: self.padding,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_init_options() {
        assert_eq!(Config::default().to_options(), InitOptions::default());
    }

    #[test]
    fn test_partial_config() {
        let config: Config = serde_json::from_str(
            r#"{"width": 800, "icon": {"url": "/static/pin.png", "size": [25, 41], "anchor": [12, 41]}}"#,
        )
        .unwrap();

        assert_eq!(config.width, 800.0);
        assert_eq!(config.height, 720.0);
        assert_eq!(config.icon.anchor, [12, 41]);
        assert_eq!(config.popup_property, "nuts_id");
        assert_eq!(config.tile, TileLayerOptions::default());
    }

    #[test]
    fn test_partial_tile_config() {
        let config: Config =
            serde_json::from_str(r#"{"tile": {"max_zoom": 12, "subdomains": ["x"]}}"#).unwrap();
        assert_eq!(config.tile.max_zoom, 12);
        assert_eq!(config.tile.subdomains, vec!["x".to_string()]);
        assert!(config.tile.attribution.contains("OpenStreetMap"));
    }

    #[test]
    fn test_with_size() {
        let config = Config::default().with_size(Some(400.0), None);
        assert_eq!(config.width, 400.0);
        assert_eq!(config.height, 720.0);
    }

    #[test]
    fn test_validate_size() {
        assert!(Config::default().validate().is_ok());
        assert!(Config::default()
            .with_size(Some(MAX_CONTAINER_SIZE), Some(1.0))
            .validate()
            .is_ok());

        for (width, height) in [
            (0.0, 720.0),
            (-10.0, 720.0),
            (f64::NAN, 720.0),
            (f64::INFINITY, 720.0),
            (1280.0, 1e9),
        ] {
            let config = Config::default().with_size(Some(width), Some(height));
            assert!(config.validate().is_err(), "{}x{}", width, height);
        }

        let err = Config::default()
            .with_size(None, Some(-1.0))
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("height"));
    }

    #[test]
    fn test_validate_padding() {
        let config: Config = serde_json::from_str(r#"{"padding": -5}"#).unwrap();
        assert!(config.validate().is_err());
        let config: Config = serde_json::from_str(r#"{"padding": 0}"#).unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join("portfolio_map_config_test.json");
        std::fs::write(&path, r#"{"padding": 20, "container_id": "nuts-map"}"#).unwrap();

        let config = Config::resolve(Some(&path)).unwrap();
        assert_eq!(config.padding, 20.0);
        assert_eq!(config.to_options().container_id, "nuts-map");

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load(Path::new("/nonexistent/config.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
