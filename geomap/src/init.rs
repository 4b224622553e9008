//! Initialisation de la carte à partir d'une page
//!
//! Deux phases:
//! - [`mount`]: conteneur + fond de tuiles
//! - [`load`]: lecture du GeoJSON, deux couches superposées, calage de la vue
//!
//! Si le payload est illisible, `load` échoue mais la carte montée garde son
//! fond de tuiles.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::icon::Icon;
use crate::layer::{parse_geodata, GeoJsonLayer, GeoJsonOptions, PopupBinding};
use crate::map::{FitBoundsOptions, Layer, LayerId, MapView};
use crate::page::Page;
use crate::tile::{TileLayer, TileLayerOptions};
use crate::types::Size;
use crate::GeomapError;

/// Identifiant du conteneur de la carte
pub const CONTAINER_ID: &str = "map";

/// Identifiant du script JSON embarqué
pub const GEODATA_ID: &str = "geodata";

/// Propriété affichée dans les popups
pub const POPUP_PROPERTY: &str = "nuts_id";

/// Marge de calage en pixels, sur chaque bord
pub const FIT_PADDING: f64 = 100.0;

/// Paramètres de l'initialisation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitOptions {
    pub container_id: String,
    pub data_id: String,

    /// Taille du conteneur en pixels
    pub size: Size,

    pub tile: TileLayerOptions,

    /// Icône des marqueurs, propre à cette carte
    pub icon: Icon,

    pub popup_property: String,
    pub padding: f64,
}

impl Default for InitOptions {
    fn default() -> Self {
        Self {
            container_id: CONTAINER_ID.to_string(),
            data_id: GEODATA_ID.to_string(),
            size: Size::default(),
            tile: TileLayerOptions::default(),
            icon: Icon::sort_desc(),
            popup_property: POPUP_PROPERTY.to_string(),
            padding: FIT_PADDING,
        }
    }
}

/// Couches ajoutées par [`load`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overlays {
    /// Couche sans popup, sert au calcul de l'emprise
    pub base: LayerId,

    /// Couche avec un popup par feature identifiée
    pub labelled: LayerId,
}

/// Monte la carte dans son conteneur et ajoute le fond de tuiles
pub fn mount(page: &Page, options: &InitOptions) -> Result<MapView, GeomapError> {
    page.require(&options.container_id)?;

    let mut map = MapView::new(&options.container_id, options.size);
    let tiles = TileLayer::new(options.tile.clone())?;
    info!(
        container = %options.container_id,
        template = %tiles.url_template(),
        "Map mounted with tile layer"
    );
    map.add_layer(Layer::Tile(tiles));

    Ok(map)
}

/// Charge le GeoJSON de la page sur une carte montée
pub fn load(map: &mut MapView, page: &Page, options: &InitOptions) -> Result<Overlays, GeomapError> {
    if map.geojson_layers().next().is_some() {
        return Err(GeomapError::AlreadyLoaded(map.container_id().to_string()));
    }

    let payload = page.text_content(&options.data_id)?;
    let geodata = parse_geodata(&payload)?;

    let base = GeoJsonLayer::new(
        &geodata,
        &GeoJsonOptions {
            icon: options.icon.clone(),
            popup: PopupBinding::None,
        },
    )?;
    let labelled = GeoJsonLayer::new(
        &geodata,
        &GeoJsonOptions {
            icon: options.icon.clone(),
            popup: PopupBinding::property(&options.popup_property),
        },
    )?;

    let bounds = base.bounds();
    info!(
        features = base.len(),
        popups = labelled.popups().count(),
        "Geodata loaded"
    );

    let overlays = Overlays {
        base: map.add_layer(Layer::GeoJson(base)),
        labelled: map.add_layer(Layer::GeoJson(labelled)),
    };

    match bounds {
        Some(bounds) => {
            let view = map.fit_bounds(&bounds, &FitBoundsOptions::padding(options.padding))?;
            info!(
                lat = view.center.lat,
                lng = view.center.lng,
                zoom = view.zoom,
                "Viewport fitted to geodata"
            );
        }
        None => warn!("Geodata has no extent, viewport left unset"),
    }

    Ok(overlays)
}

/// Monte et charge la carte en une seule étape
pub fn initialize(page: &Page, options: &InitOptions) -> Result<MapView, GeomapError> {
    let mut map = mount(page, options)?;
    load(&mut map, page, options)?;
    Ok(map)
}
