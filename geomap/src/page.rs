//! Lecture de la page HTML hôte
//!
//! La page fournit deux éléments: le conteneur de la carte et un
//! `<script type="application/json">` contenant le GeoJSON sérialisé.
//! Seul le repérage par attribut `id` est supporté, pas de DOM complet.

use std::borrow::Cow;
use std::path::Path;

use regex::{Captures, Regex};

use crate::GeomapError;

/// Page HTML chargée en mémoire
#[derive(Debug, Clone)]
pub struct Page {
    html: String,
}

/// Élément repéré dans la page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Identifiant (attribut `id`)
    pub id: String,

    /// Nom de balise en minuscules (`div`, `script`, ...)
    pub tag: String,

    /// Contenu brut entre la balise ouvrante et la fermante
    pub text: String,
}

/// Éléments sans balise fermante
const VOID_TAGS: &[&str] = &["area", "br", "embed", "hr", "img", "input", "link", "meta"];

impl Page {
    pub fn from_html(html: impl Into<String>) -> Self {
        Self { html: html.into() }
    }

    /// Charge une page depuis le disque
    pub fn load(path: &Path) -> Result<Self, GeomapError> {
        let html = std::fs::read_to_string(path)?;
        Ok(Self::from_html(html))
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    /// HTML avec les commentaires remplacés par des espaces (offsets conservés)
    fn without_comments(&self) -> Cow<'_, str> {
        match Regex::new(r"(?s)<!--.*?-->") {
            Ok(comments) => {
                comments.replace_all(&self.html, |caps: &Captures| " ".repeat(caps[0].len()))
            }
            Err(_) => Cow::Borrowed(&self.html),
        }
    }

    /// Cherche le premier élément portant l'identifiant `id`
    ///
    /// Noms de balise et d'attribut insensibles à la casse, valeur de l'id
    /// comparée exactement. Le contenu des commentaires est ignoré.
    pub fn element(&self, id: &str) -> Option<Element> {
        let pattern = format!(
            r#"(?s)<((?i:[a-z][a-z0-9-]*))(?:\s[^>]*)?\s(?i:id)\s*=\s*["']{}["'][^>]*>"#,
            regex::escape(id)
        );
        // Le motif est construit à partir d'un id échappé: il compile toujours
        let open = Regex::new(&pattern).ok()?;
        let html = self.without_comments();
        let html: &str = &html;
        let caps = open.captures(html)?;
        let whole = caps.get(0)?;
        let tag = caps.get(1)?.as_str().to_ascii_lowercase();

        let self_closing = whole.as_str().ends_with("/>");
        if self_closing || VOID_TAGS.contains(&tag.as_str()) {
            return Some(Element {
                id: id.to_string(),
                tag,
                text: String::new(),
            });
        }

        let rest = &html[whole.end()..];
        let close = Regex::new(&format!(r"(?i)</{}\s*>", regex::escape(&tag))).ok()?;
        let text = match close.find(rest) {
            Some(m) => &rest[..m.start()],
            None => rest,
        };

        Some(Element {
            id: id.to_string(),
            tag,
            text: text.to_string(),
        })
    }

    /// Vérifie la présence d'un élément
    pub fn require(&self, id: &str) -> Result<Element, GeomapError> {
        self.element(id)
            .ok_or_else(|| GeomapError::MissingElement(id.to_string()))
    }

    /// Contenu texte d'un élément (le payload JSON pour `#geodata`)
    pub fn text_content(&self, id: &str) -> Result<String, GeomapError> {
        self.require(id).map(|e| e.text)
    }
}
