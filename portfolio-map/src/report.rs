//! Instantané de la carte après initialisation
//!
//! Sérialisé en JSON pour l'hôte (template, serveur) ou affiché en résumé.

use std::path::Path;

use anyhow::Result;
use geomap::{GeomapError, LatLng, LatLngBounds, Layer, MapView, PopupBinding, Size};
use serde::Serialize;

/// Statut global du rendu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RenderStatus {
    /// Données chargées et vue calée
    Rendered,
    /// Données chargées mais sans étendue: vue non positionnée
    Empty,
    /// Payload illisible: seul le fond de tuiles est présent
    BaseMapOnly,
}

/// Fond de tuiles
#[derive(Debug, Clone, Serialize)]
pub struct TileSnapshot {
    pub url_template: String,
    pub attribution_html: String,
    pub attribution_text: String,
    pub min_zoom: u8,
    pub max_zoom: u8,
}

/// Une couche de la carte
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayerSnapshot {
    Tile(TileSnapshot),
    Geojson {
        features: usize,
        markers: usize,
        paths: usize,
        popup: PopupBinding,
    },
}

/// Popup lié à une feature
#[derive(Debug, Clone, Serialize)]
pub struct PopupSnapshot {
    /// Index de la couche dans la carte
    pub layer: usize,
    /// Index de la feature dans le document GeoJSON
    pub feature: usize,
    pub text: String,
    pub html: String,
}

/// Marqueur placé dans le conteneur
#[derive(Debug, Clone, Serialize)]
pub struct MarkerSnapshot {
    pub position: LatLng,
    pub icon_url: String,
    /// Coin haut-gauche de l'icône, pixels conteneur
    pub top_left: [f64; 2],
    pub size: [f64; 2],
}

/// Vue calée
#[derive(Debug, Clone, Serialize)]
pub struct ViewSnapshot {
    pub center: LatLng,
    pub zoom: f64,
    pub bounds: LatLngBounds,
}

/// Instantané complet
#[derive(Debug, Clone, Serialize)]
pub struct MapSnapshot {
    pub container: String,
    pub size: Size,
    pub status: RenderStatus,
    pub layers: Vec<LayerSnapshot>,
    pub popups: Vec<PopupSnapshot>,
    pub markers: Vec<MarkerSnapshot>,
    pub view: Option<ViewSnapshot>,
    /// URLs des tuiles couvrant la vue
    pub tiles: Vec<String>,
    /// Erreur de chargement des données
    pub error: Option<String>,
}

impl MapSnapshot {
    /// Capture l'état d'une carte
    pub fn capture(map: &MapView) -> Self {
        let mut layers = Vec::new();
        let mut popups = Vec::new();
        let mut markers = Vec::new();

        for (layer_index, layer) in map.layers().iter().enumerate() {
            match layer {
                Layer::Tile(tiles) => layers.push(LayerSnapshot::Tile(TileSnapshot {
                    url_template: tiles.url_template().to_string(),
                    attribution_html: tiles.attribution_html().to_string(),
                    attribution_text: tiles.attribution_text(),
                    min_zoom: tiles.min_zoom(),
                    max_zoom: tiles.max_zoom(),
                })),
                Layer::GeoJson(geojson) => {
                    layers.push(LayerSnapshot::Geojson {
                        features: geojson.len(),
                        markers: geojson.markers().count(),
                        paths: geojson.path_count(),
                        popup: geojson.binding().clone(),
                    });
                    for (feature, popup) in geojson.popups() {
                        popups.push(PopupSnapshot {
                            layer: layer_index,
                            feature,
                            text: popup.content().to_string(),
                            html: popup.html(),
                        });
                    }
                    for (position, icon) in geojson.markers() {
                        let Some(point) = map.container_point(position) else {
                            continue;
                        };
                        let placement = icon.placement(point);
                        markers.push(MarkerSnapshot {
                            position,
                            icon_url: icon.url.clone(),
                            top_left: [placement.top_left.x, placement.top_left.y],
                            size: [placement.size.x, placement.size.y],
                        });
                    }
                }
            }
        }

        let view = map.view().zip(map.bounds()).map(|(view, bounds)| ViewSnapshot {
            center: view.center,
            zoom: view.zoom,
            bounds,
        });

        let tiles = match map.view() {
            Some(view) => map
                .tile_layers()
                .flat_map(|t| {
                    t.tiles_for_view(&view, map.size())
                        .into_iter()
                        .map(|coord| t.tile_url(coord))
                })
                .collect(),
            None => Vec::new(),
        };

        let status = if view.is_some() {
            RenderStatus::Rendered
        } else {
            RenderStatus::Empty
        };

        Self {
            container: map.container_id().to_string(),
            size: map.size(),
            status,
            layers,
            popups,
            markers,
            view,
            tiles,
            error: None,
        }
    }

    /// Marque l'instantané comme fond de carte seul
    pub fn with_error(mut self, error: &GeomapError) -> Self {
        self.status = RenderStatus::BaseMapOnly;
        self.error = Some(error.to_string());
        self
    }

    /// Affiche le rapport sur la console
    pub fn display(&self) {
        println!("\n{}", "=".repeat(60));
        println!("MAP SNAPSHOT - #{}", self.container);
        println!("{}", "=".repeat(60));

        println!("\nStatus: {:?}", self.status);
        println!("Container: {:.0}x{:.0} px", self.size.width, self.size.height);

        println!("\n--- LAYERS ---");
        for (i, layer) in self.layers.iter().enumerate() {
            match layer {
                LayerSnapshot::Tile(t) => {
                    println!("  [{}] tiles {} ({})", i, t.url_template, t.attribution_text)
                }
                LayerSnapshot::Geojson {
                    features,
                    markers,
                    paths,
                    popup,
                } => println!(
                    "  [{}] geojson: {} features, {} markers, {} paths, popups {:?}",
                    i, features, markers, paths, popup
                ),
            }
        }

        match &self.view {
            Some(view) => println!(
                "\nView: center ({:.5}, {:.5}) zoom {}, {} tiles",
                view.center.lat,
                view.center.lng,
                view.zoom,
                self.tiles.len()
            ),
            None => println!("\nView: not set"),
        }

        if !self.popups.is_empty() {
            println!("\n--- POPUPS ({}) ---", self.popups.len());
            for p in self.popups.iter().take(20) {
                println!("  feature {}: {}", p.feature, p.text);
            }
            if self.popups.len() > 20 {
                println!("  ... and {} more", self.popups.len() - 20);
            }
        }

        if let Some(ref error) = self.error {
            println!("\n--- ERROR ---");
            println!("  {}", error);
        }

        println!("\n{}", "=".repeat(60));
    }

    /// Sauvegarde l'instantané en JSON
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Affichage compact pour le résumé
    pub fn summary(&self) -> String {
        let features = self
            .layers
            .iter()
            .find_map(|l| match l {
                LayerSnapshot::Geojson { features, .. } => Some(*features),
                LayerSnapshot::Tile(_) => None,
            })
            .unwrap_or(0);
        format!(
            "#{}: {:?}, {} features, {} popups, {} tiles",
            self.container,
            self.status,
            features,
            self.popups.len(),
            self.tiles.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geomap::{initialize, mount, InitOptions, Page};

    fn page(geodata: &str) -> Page {
        Page::from_html(format!(
            r#"<div id="map"></div><script id="geodata" type="application/json">{}</script>"#,
            geodata
        ))
    }

    const DE1: &str = r#"{"type":"FeatureCollection","features":[{"type":"Feature","properties":{"nuts_id":"DE1"},"geometry":{"type":"Point","coordinates":[9.0,51.0]}}]}"#;

    #[test]
    fn test_capture_rendered_map() {
        let map = initialize(&page(DE1), &InitOptions::default()).unwrap();
        let snapshot = MapSnapshot::capture(&map);

        assert_eq!(snapshot.status, RenderStatus::Rendered);
        assert_eq!(snapshot.layers.len(), 3);
        assert_eq!(snapshot.popups.len(), 1);
        assert_eq!(snapshot.popups[0].layer, 2);
        assert_eq!(snapshot.popups[0].text, "DE1");
        assert!(!snapshot.tiles.is_empty());

        // Deux passes -> deux marqueurs superposés, centrés dans le conteneur
        assert_eq!(snapshot.markers.len(), 2);
        let marker = &snapshot.markers[0];
        assert!((marker.top_left[0] - 635.0).abs() < 1e-6);
        assert!((marker.top_left[1] - 355.0).abs() < 1e-6);
        assert_eq!(marker.size, [11.0, 10.0]);
    }

    #[test]
    fn test_capture_empty_map() {
        let map = initialize(
            &page(r#"{"type":"FeatureCollection","features":[]}"#),
            &InitOptions::default(),
        )
        .unwrap();
        let snapshot = MapSnapshot::capture(&map);

        assert_eq!(snapshot.status, RenderStatus::Empty);
        assert!(snapshot.view.is_none());
        assert!(snapshot.tiles.is_empty());
        assert!(snapshot.summary().contains("0 features"));
    }

    #[test]
    fn test_base_map_only() {
        let page = page("{oops");
        let options = InitOptions::default();
        let mut map = mount(&page, &options).unwrap();
        let err = geomap::load(&mut map, &page, &options).unwrap_err();

        let snapshot = MapSnapshot::capture(&map).with_error(&err);
        assert_eq!(snapshot.status, RenderStatus::BaseMapOnly);
        assert_eq!(snapshot.layers.len(), 1);
        assert!(snapshot.error.unwrap().starts_with("Invalid JSON payload"));
    }

    #[test]
    fn test_snapshot_json() {
        let map = initialize(&page(DE1), &InitOptions::default()).unwrap();
        let json = serde_json::to_value(MapSnapshot::capture(&map)).unwrap();

        assert_eq!(json["status"], "Rendered");
        assert_eq!(json["layers"][0]["kind"], "tile");
        assert_eq!(json["layers"][1]["kind"], "geojson");
        assert_eq!(json["layers"][1]["popup"]["mode"], "none");
        assert_eq!(json["layers"][2]["popup"]["mode"], "property");
        assert_eq!(json["layers"][2]["popup"]["key"], "nuts_id");
        assert_eq!(json["view"]["zoom"], 18.0);
    }

    #[test]
    fn test_save_to_file() {
        let map = initialize(&page(DE1), &InitOptions::default()).unwrap();
        let path = std::env::temp_dir().join("portfolio_map_snapshot_test.json");
        MapSnapshot::capture(&map).save_to_file(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"DE1\""));
        assert!(content.contains("openstreetmap.org/copyright"));

        std::fs::remove_file(path).ok();
    }
}
