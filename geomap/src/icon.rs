//! Icône des marqueurs
//!
//! L'icône est une valeur de configuration passée à chaque couche GeoJSON,
//! jamais un état partagé: deux cartes construites dans le même processus
//! peuvent utiliser des icônes différentes.

use geo::Coord;
use serde::{Deserialize, Serialize};

/// Icône utilisée par la page de reporting
pub const SORT_DESC_URL: &str = "/static/reporting/img/sort_desc.png";

/// Image de marqueur avec taille et point d'ancrage en pixels
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Icon {
    /// URL de l'image
    pub url: String,

    /// Taille affichée [largeur, hauteur]
    pub size: [u32; 2],

    /// Point de l'image placé sur la position du marqueur
    pub anchor: [i32; 2],
}

/// Rectangle occupé par une icône dans le conteneur
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IconPlacement {
    /// Coin haut-gauche en pixels conteneur
    pub top_left: Coord<f64>,

    /// Taille en pixels
    pub size: Coord<f64>,
}

impl Icon {
    pub fn new(url: impl Into<String>, size: [u32; 2], anchor: [i32; 2]) -> Self {
        Self {
            url: url.into(),
            size,
            anchor,
        }
    }

    /// Flèche 11×10 ancrée en son centre
    pub fn sort_desc() -> Self {
        Self::new(SORT_DESC_URL, [11, 10], [5, 5])
    }

    /// Position de l'image pour un marqueur situé en `point`
    pub fn placement(&self, point: Coord<f64>) -> IconPlacement {
        let anchor = Coord {
            x: self.anchor[0] as f64,
            y: self.anchor[1] as f64,
        };
        IconPlacement {
            top_left: point - anchor,
            size: Coord {
                x: self.size[0] as f64,
                y: self.size[1] as f64,
            },
        }
    }
}

impl Default for Icon {
    fn default() -> Self {
        Self::sort_desc()
    }
}
