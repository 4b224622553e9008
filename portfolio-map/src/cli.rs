//! Définition et implémentation des commandes CLI
//!
//! - `render`: page HTML → instantané JSON de la carte
//! - `tiles`: page HTML → URLs des tuiles couvrant la vue calée

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use geomap::{GeomapError, Page};
use tracing::{error, info, warn};

use portfolio_map::{Config, MapSnapshot};

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the map from a page and output a JSON snapshot
    Render {
        #[command(flatten)]
        page: PageArgs,

        /// Write the snapshot to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the tile URLs covering the fitted view
    Tiles {
        #[command(flatten)]
        page: PageArgs,
    },
}

/// Arguments communs: page source et taille du conteneur
#[derive(Args)]
pub struct PageArgs {
    /// HTML page holding the map container and the geodata script
    #[arg(short, long)]
    pub page: PathBuf,

    /// JSON config file (défaut : env PORTFOLIO_MAP_CONFIG / valeurs intégrées)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Container width in pixels
    #[arg(long)]
    pub width: Option<f64>,

    /// Container height in pixels
    #[arg(long)]
    pub height: Option<f64>,
}

/// Initialise la carte; une erreur de données donne un instantané partiel
fn render_page(args: &PageArgs) -> Result<(MapSnapshot, Option<GeomapError>)> {
    let config = Config::resolve(args.config.as_deref())?.with_size(args.width, args.height);
    config.validate()?;
    let options = config.to_options();

    let page = Page::load(&args.page)
        .context(format!("Failed to read page: {}", args.page.display()))?;

    let mut map = geomap::mount(&page, &options)
        .context(format!("Failed to mount map #{}", options.container_id))?;

    match geomap::load(&mut map, &page, &options) {
        Ok(overlays) => {
            let snapshot = MapSnapshot::capture(&map);
            info!(
                base = overlays.base.0,
                labelled = overlays.labelled.0,
                summary = %snapshot.summary(),
                "Map rendered"
            );
            Ok((snapshot, None))
        }
        Err(e) => {
            error!(error = %e, "Geodata not loaded, base map only");
            let snapshot = MapSnapshot::capture(&map).with_error(&e);
            Ok((snapshot, Some(e)))
        }
    }
}

/// Exécute la commande render
pub fn cmd_render(args: &PageArgs, output: Option<&Path>) -> Result<()> {
    info!(page = %args.page.display(), "Render");
    let (snapshot, load_error) = render_page(args)?;

    match output {
        Some(path) => {
            snapshot
                .save_to_file(path)
                .context(format!("Failed to write snapshot: {}", path.display()))?;
            snapshot.display();
            info!(output = %path.display(), "Snapshot written");
        }
        None => println!("{}", serde_json::to_string_pretty(&snapshot)?),
    }

    match load_error {
        Some(e) => Err(e).context("Geodata could not be loaded"),
        None => Ok(()),
    }
}

/// Exécute la commande tiles
pub fn cmd_tiles(args: &PageArgs) -> Result<()> {
    let (snapshot, load_error) = render_page(args)?;

    if let Some(e) = load_error {
        return Err(e).context("Geodata could not be loaded");
    }
    if snapshot.view.is_none() {
        warn!("No view fitted, no tiles to list");
    }
    for url in &snapshot.tiles {
        println!("{}", url);
    }

    Ok(())
}
