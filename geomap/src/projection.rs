//! Projection Web Mercator (EPSG:3857)
//!
//! Aussi connu sous le nom de Pseudo-Mercator ou Spherical Mercator.
//! Utilisé par OpenStreetMap et les tuiles `{z}/{x}/{y}`.
//!
//! Les coordonnées pixel sont celles du "monde" au zoom demandé:
//! le monde entier fait `256 * 2^zoom` pixels de côté, origine au coin nord-ouest.

use geo::Coord;

use crate::types::LatLng;

/// Rayon équatorial WGS84 utilisé par le modèle sphérique
pub const EARTH_RADIUS: f64 = 6_378_137.0;

/// Latitude maximale représentable (le monde projeté est carré)
pub const MAX_LATITUDE: f64 = 85.051_128_779_8;

/// Taille d'une tuile en pixels au zoom 0
pub const TILE_SIZE: f64 = 256.0;

/// Convertit coordonnées géographiques vers Web Mercator (mètres)
pub fn geographic_to_web_mercator(latlng: LatLng) -> Coord<f64> {
    let d = std::f64::consts::PI / 180.0;

    // Limiter la latitude pour éviter l'infini
    let lat = latlng.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE);
    let sin = (lat * d).sin();

    Coord {
        x: EARTH_RADIUS * latlng.lng * d,
        y: EARTH_RADIUS * ((1.0 + sin) / (1.0 - sin)).ln() / 2.0,
    }
}

/// Convertit Web Mercator (mètres) vers coordonnées géographiques
pub fn web_mercator_to_geographic(point: Coord<f64>) -> LatLng {
    let d = 180.0 / std::f64::consts::PI;

    // Latitude = 2 * atan(exp(y/R)) - π/2
    let lat = (2.0 * (point.y / EARTH_RADIUS).exp().atan() - std::f64::consts::FRAC_PI_2) * d;
    let lng = point.x * d / EARTH_RADIUS;

    LatLng::new(lat, lng)
}

/// Facteur d'échelle du monde au zoom donné
pub fn scale(zoom: f64) -> f64 {
    TILE_SIZE * 2f64.powf(zoom)
}

/// Zoom correspondant à un facteur d'échelle
pub fn zoom_for_scale(scale: f64) -> f64 {
    (scale / TILE_SIZE).log2()
}

/// Projette une position en pixels monde au zoom donné
pub fn project(latlng: LatLng, zoom: f64) -> Coord<f64> {
    let meters = geographic_to_web_mercator(latlng);
    let k = 0.5 / (std::f64::consts::PI * EARTH_RADIUS);
    let s = scale(zoom);

    Coord {
        x: s * (k * meters.x + 0.5),
        y: s * (-k * meters.y + 0.5),
    }
}

/// Inverse de [`project`]
pub fn unproject(point: Coord<f64>, zoom: f64) -> LatLng {
    let k = 0.5 / (std::f64::consts::PI * EARTH_RADIUS);
    let s = scale(zoom);

    let meters = Coord {
        x: (point.x / s - 0.5) / k,
        y: (point.y / s - 0.5) / -k,
    };
    web_mercator_to_geographic(meters)
}
