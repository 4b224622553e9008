//! Modèle de carte sans rendu: couches, vue et calage sur une emprise

use geo::Coord;
use tracing::debug;

use crate::layer::{GeoJsonLayer, Popup};
use crate::projection;
use crate::tile::TileLayer;
use crate::types::{LatLng, LatLngBounds, Size, View};
use crate::GeomapError;

/// Zoom max quand aucune couche de tuiles ne le fixe
pub const DEFAULT_MAX_ZOOM: f64 = 18.0;

/// Identifiant d'une couche dans la carte (ordre d'ajout)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerId(pub usize);

/// Couche ajoutée à la carte
#[derive(Debug, Clone, PartialEq)]
pub enum Layer {
    Tile(TileLayer),
    GeoJson(GeoJsonLayer),
}

/// Options de [`MapView::fit_bounds`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitBoundsOptions {
    /// Marge en pixels appliquée sur chaque bord [x, y]
    pub padding: [f64; 2],
}

impl FitBoundsOptions {
    pub fn padding(px: f64) -> Self {
        Self { padding: [px, px] }
    }
}

impl Default for FitBoundsOptions {
    fn default() -> Self {
        Self::padding(0.0)
    }
}

/// Carte liée à un conteneur de la page
#[derive(Debug, Clone)]
pub struct MapView {
    container_id: String,
    size: Size,
    layers: Vec<Layer>,
    view: Option<View>,
}

impl MapView {
    pub fn new(container_id: impl Into<String>, size: Size) -> Self {
        Self {
            container_id: container_id.into(),
            size,
            layers: Vec::new(),
            view: None,
        }
    }

    pub fn container_id(&self) -> &str {
        &self.container_id
    }

    pub fn size(&self) -> Size {
        self.size
    }

    /// Ajoute une couche et retourne son identifiant
    pub fn add_layer(&mut self, layer: Layer) -> LayerId {
        let id = LayerId(self.layers.len());
        self.layers.push(layer);
        id
    }

    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.get(id.0)
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Couche GeoJSON par identifiant
    pub fn geojson_layer(&self, id: LayerId) -> Option<&GeoJsonLayer> {
        match self.layer(id)? {
            Layer::GeoJson(layer) => Some(layer),
            Layer::Tile(_) => None,
        }
    }

    pub fn tile_layers(&self) -> impl Iterator<Item = &TileLayer> {
        self.layers.iter().filter_map(|l| match l {
            Layer::Tile(t) => Some(t),
            Layer::GeoJson(_) => None,
        })
    }

    pub fn geojson_layers(&self) -> impl Iterator<Item = &GeoJsonLayer> {
        self.layers.iter().filter_map(|l| match l {
            Layer::GeoJson(g) => Some(g),
            Layer::Tile(_) => None,
        })
    }

    /// Tous les popups de la carte
    pub fn popups(&self) -> impl Iterator<Item = (usize, &Popup)> {
        self.geojson_layers().flat_map(|l| l.popups())
    }

    pub fn min_zoom(&self) -> f64 {
        self.tile_layers()
            .map(|t| t.min_zoom() as f64)
            .reduce(f64::min)
            .unwrap_or(0.0)
    }

    pub fn max_zoom(&self) -> f64 {
        self.tile_layers()
            .map(|t| t.max_zoom() as f64)
            .reduce(f64::max)
            .unwrap_or(DEFAULT_MAX_ZOOM)
    }

    /// Vue courante, `None` tant que la carte n'a pas été positionnée
    pub fn view(&self) -> Option<View> {
        self.view
    }

    pub fn set_view(&mut self, center: LatLng, zoom: f64) {
        let zoom = zoom.clamp(self.min_zoom(), self.max_zoom());
        self.view = Some(View { center, zoom });
    }

    /// Zoom le plus fort auquel l'emprise tient dans le conteneur
    pub fn bounds_zoom(&self, bounds: &LatLngBounds, padding: Coord<f64>) -> f64 {
        let zoom = self.view.map(|v| v.zoom).unwrap_or(0.0);
        let size = self.size.as_coord() - padding;

        let nw = projection::project(bounds.north_west(), zoom);
        let se = projection::project(bounds.south_east(), zoom);
        let extent = se - nw;

        let scale_x = size.x / extent.x.abs();
        let scale_y = size.y / extent.y.abs();
        // Un axe indéterminé rend l'échelle indéterminée
        let scale = if scale_x.is_nan() || scale_y.is_nan() {
            f64::NAN
        } else {
            scale_x.min(scale_y)
        };

        let mut zoom = zoom + scale.log2();
        if zoom.is_nan() {
            // Marge plus grande que le conteneur: zoom maximal
            zoom = f64::INFINITY;
        }

        // Accrochage au zoom entier, après arrondi au centième
        zoom = (zoom * 100.0).round() / 100.0;
        zoom = zoom.floor();

        zoom.clamp(self.min_zoom(), self.max_zoom())
    }

    /// Centre et zoom pour afficher l'emprise avec la marge demandée
    pub fn bounds_view(
        &self,
        bounds: &LatLngBounds,
        options: &FitBoundsOptions,
    ) -> Result<View, GeomapError> {
        if !bounds.is_valid() {
            return Err(GeomapError::InvalidBounds);
        }

        let padding_tl = Coord {
            x: options.padding[0],
            y: options.padding[1],
        };
        let padding_br = padding_tl;
        let zoom = self.bounds_zoom(bounds, padding_tl + padding_br);

        let offset = (padding_br - padding_tl) / 2.0;
        let sw = projection::project(bounds.south_west, zoom);
        let ne = projection::project(bounds.north_east, zoom);
        let center = projection::unproject((sw + ne) / 2.0 + offset, zoom);

        Ok(View { center, zoom })
    }

    /// Cale la vue sur l'emprise
    pub fn fit_bounds(
        &mut self,
        bounds: &LatLngBounds,
        options: &FitBoundsOptions,
    ) -> Result<View, GeomapError> {
        let view = self.bounds_view(bounds, options)?;
        debug!(
            lat = view.center.lat,
            lng = view.center.lng,
            zoom = view.zoom,
            "Viewport fitted"
        );
        self.view = Some(view);
        Ok(view)
    }

    /// Position d'un point dans le conteneur, en pixels
    pub fn container_point(&self, latlng: LatLng) -> Option<Coord<f64>> {
        let view = self.view?;
        let origin = projection::project(view.center, view.zoom) - self.size.as_coord() / 2.0;
        Some(projection::project(latlng, view.zoom) - origin)
    }

    /// Emprise géographique visible dans le conteneur
    pub fn bounds(&self) -> Option<LatLngBounds> {
        let view = self.view?;
        let center = projection::project(view.center, view.zoom);
        let half = self.size.as_coord() / 2.0;
        let top_left = projection::unproject(center - half, view.zoom);
        let bottom_right = projection::unproject(center + half, view.zoom);
        Some(LatLngBounds::new(top_left, bottom_right))
    }
}
