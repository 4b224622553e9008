//! # geomap
//!
//! Modèle de carte web sans rendu: fond de tuiles, couches GeoJSON avec
//! popups, et calage de la vue sur l'emprise des données.
//!
//! ## Features
//!
//! - Lecture du GeoJSON embarqué dans une page (`<script id="geodata">`)
//! - Projection Web Mercator et calcul du zoom comme un client de tuiles standard
//! - Icône des marqueurs passée en configuration, sans état global
//! - Types `geo` pour l'interopérabilité avec l'écosystème Rust géospatial
//!
//! ## Usage
//!
//! ```rust,ignore
//! use geomap::{initialize, InitOptions, Page};
//! use std::path::Path;
//!
//! let page = Page::load(Path::new("portfolio_map.html"))?;
//! let map = initialize(&page, &InitOptions::default())?;
//!
//! for (index, popup) in map.popups() {
//!     println!("feature {}: {}", index, popup.content());
//! }
//! println!("Vue: {:?}", map.view());
//! ```

pub mod error;
pub mod icon;
pub mod init;
pub mod layer;
pub mod map;
pub mod page;
pub mod projection;
pub mod tile;
pub mod types;

pub use error::GeomapError;
pub use icon::Icon;
pub use init::{initialize, load, mount, InitOptions, Overlays};
pub use layer::{GeoJsonLayer, GeoJsonOptions, Popup, PopupBinding, Shape};
pub use map::{FitBoundsOptions, Layer, LayerId, MapView};
pub use page::Page;
pub use tile::{TileCoord, TileLayer, TileLayerOptions};
pub use types::{LatLng, LatLngBounds, Size, View};
