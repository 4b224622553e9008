//! Couche de tuiles raster (fond de carte)
//!
//! Aucune tuile n'est téléchargée ici: la couche sait seulement quelles
//! tuiles couvrent une vue et quelle URL leur correspond.

use std::collections::HashSet;

use geo::Coord;
use serde::{Deserialize, Serialize};

use crate::projection;
use crate::types::{Size, View};
use crate::GeomapError;

/// Template OpenStreetMap standard
pub const OSM_TEMPLATE: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";

/// Attribution exigée par la licence ODbL
pub const OSM_ATTRIBUTION: &str = r#"&copy; <a href="https://www.openstreetmap.org/copyright">OpenStreetMap</a> contributors"#;

/// Options d'une couche de tuiles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileLayerOptions {
    /// Template d'URL avec `{s}`, `{z}`, `{x}`, `{y}` et `{r}`
    ///
    /// `{r}` (suffixe haute densité, `@2x`) est toujours remplacé par une
    /// chaîne vide: les tuiles standard sont demandées.
    pub url_template: String,

    /// Sous-domaines pour `{s}`
    pub subdomains: Vec<String>,

    /// Attribution HTML
    pub attribution: String,

    pub min_zoom: u8,
    pub max_zoom: u8,
}

impl Default for TileLayerOptions {
    fn default() -> Self {
        Self {
            url_template: OSM_TEMPLATE.to_string(),
            subdomains: vec!["a".to_string(), "b".to_string(), "c".to_string()],
            attribution: OSM_ATTRIBUTION.to_string(),
            min_zoom: 0,
            max_zoom: 18,
        }
    }
}

/// Coordonnées d'une tuile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TileCoord {
    pub x: u32,
    pub y: u32,
    pub z: u8,
}

/// Couche de tuiles validée
#[derive(Debug, Clone, PartialEq)]
pub struct TileLayer {
    options: TileLayerOptions,
}

impl TileLayer {
    /// Valide le template et crée la couche
    pub fn new(options: TileLayerOptions) -> Result<Self, GeomapError> {
        validate_template(&options.url_template)?;
        if options.url_template.contains("{s}") && options.subdomains.is_empty() {
            return Err(GeomapError::invalid_template(
                &options.url_template,
                "{s} placeholder without subdomains",
            ));
        }
        if options.min_zoom > options.max_zoom {
            return Err(GeomapError::invalid_template(
                &options.url_template,
                format!("min_zoom {} > max_zoom {}", options.min_zoom, options.max_zoom),
            ));
        }
        Ok(Self { options })
    }

    /// Fond OpenStreetMap par défaut
    pub fn openstreetmap() -> Self {
        Self {
            options: TileLayerOptions::default(),
        }
    }

    pub fn options(&self) -> &TileLayerOptions {
        &self.options
    }

    pub fn url_template(&self) -> &str {
        &self.options.url_template
    }

    pub fn min_zoom(&self) -> u8 {
        self.options.min_zoom
    }

    pub fn max_zoom(&self) -> u8 {
        self.options.max_zoom
    }

    /// Attribution telle qu'insérée dans la page
    pub fn attribution_html(&self) -> &str {
        &self.options.attribution
    }

    /// Attribution en texte brut (balises retirées, entités décodées)
    pub fn attribution_text(&self) -> String {
        let mut text = String::with_capacity(self.options.attribution.len());
        let mut in_tag = false;
        for c in self.options.attribution.chars() {
            match c {
                '<' => in_tag = true,
                '>' => in_tag = false,
                c if !in_tag => text.push(c),
                _ => {}
            }
        }
        decode_entities(&text)
    }

    /// Sous-domaine d'une tuile, réparti en damier
    fn subdomain(&self, coord: TileCoord) -> &str {
        let subdomains = &self.options.subdomains;
        if subdomains.is_empty() {
            return "";
        }
        let index = (coord.x as u64 + coord.y as u64) % subdomains.len() as u64;
        &subdomains[index as usize]
    }

    /// URL d'une tuile
    pub fn tile_url(&self, coord: TileCoord) -> String {
        self.options
            .url_template
            .replace("{s}", self.subdomain(coord))
            .replace("{z}", &coord.z.to_string())
            .replace("{x}", &coord.x.to_string())
            .replace("{y}", &coord.y.to_string())
            .replace("{r}", "")
    }

    /// Zoom des tuiles à charger pour un zoom de carte
    pub fn tile_zoom(&self, zoom: f64) -> u8 {
        let z = zoom.round().clamp(self.min_zoom() as f64, self.max_zoom() as f64);
        z as u8
    }

    /// Tuiles couvrant le conteneur pour la vue donnée
    ///
    /// Les colonnes sont repliées autour de l'antiméridien, les lignes hors
    /// du monde sont ignorées.
    pub fn tiles_for_view(&self, view: &View, size: Size) -> Vec<TileCoord> {
        let z = self.tile_zoom(view.zoom);
        let center = projection::project(view.center, z as f64);
        let half = size.as_coord() / 2.0;
        let min: Coord<f64> = center - half;
        let max: Coord<f64> = center + half;

        let tile = projection::TILE_SIZE;
        let count = 1i64 << z;
        let x_start = (min.x / tile).floor() as i64;
        // Au-delà d'un tour du monde, les colonnes se répètent
        let x_end = ((max.x / tile).ceil() as i64 - 1).min(x_start + count - 1);
        let x_range = x_start..=x_end;
        let y_range = (min.y / tile).floor() as i64..=((max.y / tile).ceil() as i64 - 1);

        let mut seen = HashSet::new();
        let mut tiles = Vec::new();
        for y in y_range {
            if y < 0 || y >= count {
                continue;
            }
            for x in x_range.clone() {
                let wrapped = x.rem_euclid(count);
                let coord = TileCoord {
                    x: wrapped as u32,
                    y: y as u32,
                    z,
                };
                if seen.insert(coord) {
                    tiles.push(coord);
                }
            }
        }
        tiles
    }
}

/// Vérifie que le template ne contient que des placeholders connus
fn validate_template(template: &str) -> Result<(), GeomapError> {
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        let after = &rest[start + 1..];
        let Some(end) = after.find('}') else {
            return Err(GeomapError::invalid_template(template, "unclosed placeholder"));
        };
        let name = &after[..end];
        if !matches!(name, "s" | "z" | "x" | "y" | "r") {
            return Err(GeomapError::invalid_template(
                template,
                format!("unknown placeholder {{{}}}", name),
            ));
        }
        rest = &after[end + 1..];
    }
    Ok(())
}

/// Décode les quelques entités HTML rencontrées dans les attributions
fn decode_entities(s: &str) -> String {
    s.replace("&copy;", "©")
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LatLng;

    #[test]
    fn test_osm_attribution() {
        let layer = TileLayer::openstreetmap();
        let html = layer.attribution_html();
        assert!(html.contains("OpenStreetMap"));
        assert!(html.contains(r#"href="https://www.openstreetmap.org/copyright""#));
        assert_eq!(layer.attribution_text(), "© OpenStreetMap contributors");
    }

    #[test]
    fn test_tile_url() {
        let layer = TileLayer::openstreetmap();
        let url = layer.tile_url(TileCoord { x: 4, y: 2, z: 3 });
        // (4 + 2) % 3 = 0 -> "a"
        assert_eq!(url, "https://a.tile.openstreetmap.org/3/4/2.png");
        let url = layer.tile_url(TileCoord { x: 4, y: 3, z: 3 });
        assert_eq!(url, "https://b.tile.openstreetmap.org/3/4/3.png");
    }

    #[test]
    fn test_invalid_templates() {
        let bad = TileLayerOptions {
            url_template: "https://tiles/{z}/{x}/{y}/{q}.png".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            TileLayer::new(bad),
            Err(GeomapError::InvalidTemplate { .. })
        ));

        let unclosed = TileLayerOptions {
            url_template: "https://tiles/{z/{x}/{y}.png".to_string(),
            ..Default::default()
        };
        assert!(TileLayer::new(unclosed).is_err());

        let no_subdomains = TileLayerOptions {
            subdomains: vec![],
            ..Default::default()
        };
        assert!(TileLayer::new(no_subdomains).is_err());
    }

    #[test]
    fn test_retina_placeholder() {
        let options = TileLayerOptions {
            url_template: "https://tiles.example.org/{z}/{x}/{y}{r}.png".to_string(),
            subdomains: vec![],
            ..Default::default()
        };
        let layer = TileLayer::new(options).unwrap();
        let url = layer.tile_url(TileCoord { x: 1, y: 2, z: 3 });
        assert_eq!(url, "https://tiles.example.org/3/1/2.png");
    }

    #[test]
    fn test_wide_container_lists_each_column_once() {
        let layer = TileLayer::openstreetmap();
        let view = View {
            center: LatLng::new(0.0, 0.0),
            zoom: 1.0,
        };
        // Conteneur bien plus large que le monde (512 px au zoom 1)
        let tiles = layer.tiles_for_view(&view, Size::new(1_000_000.0, 512.0));
        assert_eq!(tiles.len(), 4);
        let unique: HashSet<_> = tiles.iter().collect();
        assert_eq!(unique.len(), tiles.len());
    }

    #[test]
    fn test_tile_zoom_is_clamped() {
        let layer = TileLayer::openstreetmap();
        assert_eq!(layer.tile_zoom(25.0), 18);
        assert_eq!(layer.tile_zoom(-2.0), 0);
        assert_eq!(layer.tile_zoom(5.4), 5);
    }

    #[test]
    fn test_tiles_cover_whole_world_at_zoom_zero() {
        let layer = TileLayer::openstreetmap();
        let view = View {
            center: LatLng::new(0.0, 0.0),
            zoom: 0.0,
        };
        let tiles = layer.tiles_for_view(&view, Size::new(512.0, 512.0));
        assert_eq!(tiles, vec![TileCoord { x: 0, y: 0, z: 0 }]);
    }

    #[test]
    fn test_tiles_for_view() {
        let layer = TileLayer::openstreetmap();
        let view = View {
            center: LatLng::new(0.0, 0.0),
            zoom: 2.0,
        };
        // Monde de 1024 px, conteneur de 512 px centré: tuiles 1..=2 sur chaque axe
        let tiles = layer.tiles_for_view(&view, Size::new(512.0, 512.0));
        assert_eq!(tiles.len(), 4);
        assert!(tiles.iter().all(|t| t.z == 2));
        assert!(tiles.iter().all(|t| (1..=2).contains(&t.x) && (1..=2).contains(&t.y)));
    }

    #[test]
    fn test_tiles_wrap_antimeridian() {
        let layer = TileLayer::openstreetmap();
        let view = View {
            center: LatLng::new(0.0, 180.0),
            zoom: 1.0,
        };
        let tiles = layer.tiles_for_view(&view, Size::new(256.0, 256.0));
        let xs: Vec<u32> = tiles.iter().map(|t| t.x).collect();
        assert!(xs.contains(&0));
        assert!(xs.contains(&1));
    }
}
