//! Types de données pour le crate geomap

use geo::{Coord, Rect};
use serde::{Deserialize, Serialize};

/// Position géographique en degrés (latitude, longitude)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Crée depuis une coordonnée GeoJSON (x = longitude, y = latitude)
    pub fn from_coord(coord: Coord<f64>) -> Self {
        Self {
            lat: coord.y,
            lng: coord.x,
        }
    }
}

/// Emprise géographique (coin sud-ouest, coin nord-est)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLngBounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl LatLngBounds {
    /// Crée une emprise depuis deux coins quelconques
    pub fn new(a: LatLng, b: LatLng) -> Self {
        Self {
            south_west: LatLng::new(a.lat.min(b.lat), a.lng.min(b.lng)),
            north_east: LatLng::new(a.lat.max(b.lat), a.lng.max(b.lng)),
        }
    }

    /// Emprise réduite à un point
    pub fn from_point(point: LatLng) -> Self {
        Self::new(point, point)
    }

    /// Convertit un rectangle `geo` (x = longitude, y = latitude)
    pub fn from_rect(rect: Rect<f64>) -> Self {
        Self::new(LatLng::from_coord(rect.min()), LatLng::from_coord(rect.max()))
    }

    /// Étend l'emprise pour inclure une autre emprise
    pub fn extend(&mut self, other: &LatLngBounds) {
        self.south_west.lat = self.south_west.lat.min(other.south_west.lat);
        self.south_west.lng = self.south_west.lng.min(other.south_west.lng);
        self.north_east.lat = self.north_east.lat.max(other.north_east.lat);
        self.north_east.lng = self.north_east.lng.max(other.north_east.lng);
    }

    /// Union optionnelle, pratique pour les folds
    pub fn union(acc: Option<LatLngBounds>, other: LatLngBounds) -> Option<LatLngBounds> {
        match acc {
            Some(mut bounds) => {
                bounds.extend(&other);
                Some(bounds)
            }
            None => Some(other),
        }
    }

    pub fn north_west(&self) -> LatLng {
        LatLng::new(self.north_east.lat, self.south_west.lng)
    }

    pub fn south_east(&self) -> LatLng {
        LatLng::new(self.south_west.lat, self.north_east.lng)
    }

    pub fn center(&self) -> LatLng {
        LatLng::new(
            (self.south_west.lat + self.north_east.lat) / 2.0,
            (self.south_west.lng + self.north_east.lng) / 2.0,
        )
    }

    pub fn contains(&self, point: LatLng) -> bool {
        point.lat >= self.south_west.lat
            && point.lat <= self.north_east.lat
            && point.lng >= self.south_west.lng
            && point.lng <= self.north_east.lng
    }

    /// Une emprise n'est exploitable que si ses coins sont finis
    pub fn is_valid(&self) -> bool {
        [
            self.south_west.lat,
            self.south_west.lng,
            self.north_east.lat,
            self.north_east.lng,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}

/// Taille du conteneur en pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn as_coord(&self) -> Coord<f64> {
        Coord {
            x: self.width,
            y: self.height,
        }
    }
}

impl Default for Size {
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}

/// Vue courante de la carte: centre et niveau de zoom
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct View {
    pub center: LatLng,
    pub zoom: f64,
}
