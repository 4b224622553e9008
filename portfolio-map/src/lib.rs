//! # portfolio-map
//!
//! Rendu sans navigateur de la carte NUTS3 du portfolio.
//!
//! ## Features
//!
//! - Lecture de la page HTML (conteneur `#map`, script `#geodata`)
//! - Configuration JSON optionnelle (taille, tuiles, icône, propriété des popups)
//! - Instantané JSON de la carte: couches, popups, marqueurs, vue, tuiles
//!
//! ## Usage CLI
//!
//! ```bash
//! # Instantané JSON sur stdout
//! portfolio-map render --page ./portfolio_map.html
//!
//! # Instantané dans un fichier, conteneur 800x600
//! portfolio-map render --page ./portfolio_map.html --width 800 --height 600 --output map.json
//!
//! # URLs des tuiles couvrant la vue
//! portfolio-map tiles --page ./portfolio_map.html
//! ```

pub mod config;
pub mod report;

pub use config::Config;
pub use report::{MapSnapshot, RenderStatus};
