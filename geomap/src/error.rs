//! Types d'erreurs pour le crate geomap

use thiserror::Error;

/// Erreurs pouvant survenir lors de l'initialisation de la carte
#[derive(Debug, Error)]
pub enum GeomapError {
    /// Erreur d'I/O lors de la lecture de la page
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Élément absent de la page
    #[error("Missing page element: #{0}")]
    MissingElement(String),

    /// Payload JSON illisible
    #[error("Invalid JSON payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),

    /// JSON valide mais pas du GeoJSON
    #[error("Invalid GeoJSON: {0}")]
    InvalidGeoJson(#[from] geojson::Error),

    /// Template d'URL de tuiles invalide
    #[error("Invalid tile template {template}: {reason}")]
    InvalidTemplate { template: String, reason: String },

    /// Emprise vide ou non finie
    #[error("Bounds are not valid")]
    InvalidBounds,

    /// Les données ont déjà été chargées sur cette carte
    #[error("Geodata already loaded on map #{0}")]
    AlreadyLoaded(String),
}

impl GeomapError {
    /// Crée une erreur de template avec contexte
    pub fn invalid_template(template: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidTemplate {
            template: template.into(),
            reason: reason.into(),
        }
    }
}
