//! Couche GeoJSON: une entrée par feature, marqueurs et tracés, popups
//!
//! Les points deviennent des marqueurs portant l'icône des options de la
//! couche, les autres géométries des tracés. Les features sans géométrie
//! sont ignorées.

use geo::{BoundingRect, Geometry};
use geojson::{Feature, GeoJson};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::icon::Icon;
use crate::types::{LatLng, LatLngBounds};
use crate::GeomapError;

/// Source du contenu des popups d'une couche
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PopupBinding {
    /// Aucun popup
    #[default]
    None,

    /// Popup texte tiré d'une propriété de la feature, si elle est non vide
    Property { key: String },
}

impl PopupBinding {
    pub fn property(key: impl Into<String>) -> Self {
        Self::Property { key: key.into() }
    }

    /// Contenu du popup pour une feature
    fn content_for(&self, feature: &Feature) -> Option<String> {
        match self {
            Self::None => None,
            Self::Property { key } => feature
                .properties
                .as_ref()
                .and_then(|props| props.get(key))
                .and_then(|value| value.as_str())
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        }
    }
}

/// Options de construction d'une couche GeoJSON
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GeoJsonOptions {
    /// Icône des marqueurs créés pour les points
    pub icon: Icon,

    /// Popups attachés aux features
    pub popup: PopupBinding,
}

/// Popup en texte brut
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Popup {
    content: String,
}

impl Popup {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Contenu échappé, prêt à être inséré dans la page
    pub fn html(&self) -> String {
        escape_html(&self.content)
    }
}

/// Élément dessiné pour une feature
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Marker { position: LatLng, icon: Icon },
    Path { geometry: Geometry<f64> },
}

/// Une feature rendue sur la carte
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureLayer {
    /// Position de la feature dans le document source
    pub index: usize,

    /// Identifiant GeoJSON éventuel
    pub id: Option<String>,

    pub shapes: Vec<Shape>,
    pub popup: Option<Popup>,

    /// `None` quand la géométrie n'a pas d'étendue (collection vide)
    pub bounds: Option<LatLngBounds>,
}

/// Couche construite depuis un document GeoJSON
#[derive(Debug, Clone, PartialEq)]
pub struct GeoJsonLayer {
    features: Vec<FeatureLayer>,
    binding: PopupBinding,
}

impl GeoJsonLayer {
    /// Construit la couche depuis un document déjà parsé
    pub fn new(geojson: &GeoJson, options: &GeoJsonOptions) -> Result<Self, GeomapError> {
        let mut features = Vec::new();

        for (index, feature) in features_of(geojson).iter().enumerate() {
            let Some(ref geometry) = feature.geometry else {
                debug!(index, "Feature without geometry skipped");
                continue;
            };

            let geometry: Geometry<f64> = Geometry::try_from(geometry.value.clone())?;
            let mut shapes = Vec::new();
            collect_shapes(&geometry, &options.icon, &mut shapes);

            features.push(FeatureLayer {
                index,
                id: feature.id.as_ref().map(id_to_string),
                shapes,
                popup: options.popup.content_for(feature).map(Popup::new),
                bounds: geometry.bounding_rect().map(LatLngBounds::from_rect),
            });
        }

        debug!(
            features = features.len(),
            binding = ?options.popup,
            "GeoJSON layer built"
        );

        Ok(Self {
            features,
            binding: options.popup.clone(),
        })
    }

    pub fn features(&self) -> &[FeatureLayer] {
        &self.features
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn binding(&self) -> &PopupBinding {
        &self.binding
    }

    /// Emprise de toutes les features, `None` si rien n'a d'étendue
    pub fn bounds(&self) -> Option<LatLngBounds> {
        self.features
            .iter()
            .filter_map(|f| f.bounds)
            .fold(None, LatLngBounds::union)
    }

    /// Popups liés, avec l'index de leur feature
    pub fn popups(&self) -> impl Iterator<Item = (usize, &Popup)> {
        self.features
            .iter()
            .filter_map(|f| f.popup.as_ref().map(|p| (f.index, p)))
    }

    /// Tous les marqueurs de la couche
    pub fn markers(&self) -> impl Iterator<Item = (LatLng, &Icon)> {
        self.features.iter().flat_map(|f| {
            f.shapes.iter().filter_map(|s| match s {
                Shape::Marker { position, icon } => Some((*position, icon)),
                Shape::Path { .. } => None,
            })
        })
    }

    pub fn path_count(&self) -> usize {
        self.features
            .iter()
            .flat_map(|f| f.shapes.iter())
            .filter(|s| matches!(s, Shape::Path { .. }))
            .count()
    }
}

/// Parse le payload texte en GeoJSON
///
/// Un JSON illisible donne `InvalidPayload`, un JSON qui n'est pas du
/// GeoJSON donne `InvalidGeoJson`.
pub fn parse_geodata(text: &str) -> Result<GeoJson, GeomapError> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    Ok(GeoJson::from_json_value(value)?)
}

/// Normalise FeatureCollection, Feature ou Geometry en liste de features
fn features_of(geojson: &GeoJson) -> Vec<Feature> {
    match geojson {
        GeoJson::FeatureCollection(fc) => fc.features.clone(),
        GeoJson::Feature(f) => vec![f.clone()],
        GeoJson::Geometry(g) => vec![Feature {
            bbox: None,
            geometry: Some(g.clone()),
            id: None,
            properties: None,
            foreign_members: None,
        }],
    }
}

fn collect_shapes(geometry: &Geometry<f64>, icon: &Icon, shapes: &mut Vec<Shape>) {
    match geometry {
        Geometry::Point(p) => shapes.push(Shape::Marker {
            position: LatLng::from_coord(p.0),
            icon: icon.clone(),
        }),
        Geometry::MultiPoint(mp) => {
            for p in mp.iter() {
                shapes.push(Shape::Marker {
                    position: LatLng::from_coord(p.0),
                    icon: icon.clone(),
                });
            }
        }
        Geometry::GeometryCollection(gc) => {
            for g in gc.iter() {
                collect_shapes(g, icon, shapes);
            }
        }
        other => shapes.push(Shape::Path {
            geometry: other.clone(),
        }),
    }
}

fn id_to_string(id: &geojson::feature::Id) -> String {
    match id {
        geojson::feature::Id::String(s) => s.clone(),
        geojson::feature::Id::Number(n) => n.to_string(),
    }
}

/// Échappe une chaîne pour HTML
fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#39;"),
            c => result.push(c),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIXED: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "id": "a", "properties": {"nuts_id": "DE1"},
             "geometry": {"type": "Point", "coordinates": [9.0, 51.0]}},
            {"type": "Feature", "properties": {"nuts_id": ""},
             "geometry": {"type": "Point", "coordinates": [2.35, 48.85]}},
            {"type": "Feature", "properties": {"name": "no id"},
             "geometry": {"type": "LineString", "coordinates": [[0.0, 0.0], [1.0, 1.0]]}},
            {"type": "Feature", "id": 7, "properties": null,
             "geometry": {"type": "MultiPoint", "coordinates": [[10.0, 45.0], [11.0, 46.0]]}},
            {"type": "Feature", "properties": {"nuts_id": "FR1"}, "geometry": null}
        ]
    }"#;

    fn layer(binding: PopupBinding) -> GeoJsonLayer {
        let geojson = parse_geodata(MIXED).unwrap();
        let options = GeoJsonOptions {
            icon: Icon::sort_desc(),
            popup: binding,
        };
        GeoJsonLayer::new(&geojson, &options).unwrap()
    }

    #[test]
    fn test_features_without_geometry_are_skipped() {
        let layer = layer(PopupBinding::None);
        assert_eq!(layer.len(), 4);
        assert_eq!(layer.features()[3].index, 3);
    }

    #[test]
    fn test_no_popup_binding() {
        let layer = layer(PopupBinding::None);
        assert_eq!(layer.popups().count(), 0);
    }

    #[test]
    fn test_property_popup_binding() {
        let layer = layer(PopupBinding::property("nuts_id"));
        let popups: Vec<_> = layer.popups().collect();
        assert_eq!(popups.len(), 1);
        assert_eq!(popups[0].0, 0);
        assert_eq!(popups[0].1.content(), "DE1");
    }

    #[test]
    fn test_shapes_and_ids() {
        let layer = layer(PopupBinding::None);
        assert_eq!(layer.markers().count(), 4);
        assert_eq!(layer.path_count(), 1);
        assert_eq!(layer.features()[0].id.as_deref(), Some("a"));
        assert_eq!(layer.features()[3].id.as_deref(), Some("7"));
        assert!(layer.markers().all(|(_, icon)| *icon == Icon::sort_desc()));
    }

    #[test]
    fn test_layer_bounds() {
        let layer = layer(PopupBinding::None);
        let bounds = layer.bounds().unwrap();
        assert_eq!(bounds.south_west, LatLng::new(0.0, 0.0));
        assert_eq!(bounds.north_east, LatLng::new(51.0, 11.0));
    }

    #[test]
    fn test_bare_geometry_document() {
        let geojson = parse_geodata(r#"{"type":"Point","coordinates":[9.0,51.0]}"#).unwrap();
        let layer = GeoJsonLayer::new(&geojson, &GeoJsonOptions::default()).unwrap();
        assert_eq!(layer.len(), 1);
        assert_eq!(
            layer.bounds(),
            Some(LatLngBounds::from_point(LatLng::new(51.0, 9.0)))
        );
    }

    #[test]
    fn test_empty_collection_has_no_bounds() {
        let geojson = parse_geodata(r#"{"type":"FeatureCollection","features":[]}"#).unwrap();
        let layer = GeoJsonLayer::new(&geojson, &GeoJsonOptions::default()).unwrap();
        assert!(layer.is_empty());
        assert_eq!(layer.bounds(), None);
    }

    #[test]
    fn test_empty_geometry_collection_has_no_extent() {
        let geojson = parse_geodata(
            r#"{"type":"Feature","properties":{"nuts_id":"X"},
                "geometry":{"type":"GeometryCollection","geometries":[]}}"#,
        )
        .unwrap();
        let options = GeoJsonOptions {
            popup: PopupBinding::property("nuts_id"),
            ..Default::default()
        };
        let layer = GeoJsonLayer::new(&geojson, &options).unwrap();
        assert_eq!(layer.len(), 1);
        assert!(layer.features()[0].shapes.is_empty());
        assert_eq!(layer.bounds(), None);
        assert_eq!(layer.popups().count(), 1);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            parse_geodata("{not json"),
            Err(GeomapError::InvalidPayload(_))
        ));
        assert!(matches!(
            parse_geodata(r#"{"type":"Nope"}"#),
            Err(GeomapError::InvalidGeoJson(_))
        ));
    }

    #[test]
    fn test_popup_html_is_escaped() {
        let popup = Popup::new("<b>DE&1</b>");
        assert_eq!(popup.content(), "<b>DE&1</b>");
        assert_eq!(popup.html(), "&lt;b&gt;DE&amp;1&lt;/b&gt;");
    }
}
