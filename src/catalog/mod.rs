mod types;
mod validation;

pub use types::{AnswerType, CatalogFile, Pillar, PositiveAnswer, Question};
pub use validation::validate_catalog;

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Anything that can hand the engine an ordered pillar catalog.
pub trait CatalogSource {
    fn load_catalog(&self) -> Result<Vec<Pillar>>;
}

/// Catalog read from a YAML file on disk.
#[derive(Debug, Clone)]
pub struct YamlCatalog {
    path: PathBuf,
}

impl YamlCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CatalogSource for YamlCatalog {
    fn load_catalog(&self) -> Result<Vec<Pillar>> {
        load_catalog(&self.path)
    }
}

impl CatalogSource for Vec<Pillar> {
    fn load_catalog(&self) -> Result<Vec<Pillar>> {
        Ok(self.clone())
    }
}

/// Load a catalog from a YAML file
///
/// Pillars and their questions come back sorted by `order`. The sort is
/// stable, so entries sharing an order keep their file order.
///
/// # Errors
///
/// Returns an error if:
/// - The file does not exist or cannot be read
/// - The YAML cannot be parsed
/// - The catalog fails validation (all problems are reported together)
pub fn load_catalog(path: &Path) -> Result<Vec<Pillar>> {
    if !path.exists() {
        anyhow::bail!("Catalog file not found at {}", path.display());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog file at {}", path.display()))?;

    parse_catalog(&content)
        .with_context(|| format!("Invalid catalog in {}", path.display()))
}

/// Parse and order a catalog from YAML text.
pub fn parse_catalog(content: &str) -> Result<Vec<Pillar>> {
    let file: CatalogFile =
        serde_saphyr::from_str(content).context("Failed to parse catalog: invalid YAML")?;

    let pillars = order_catalog(file.pillars);

    if let Err(errors) = validate_catalog(&pillars) {
        anyhow::bail!("{}", errors.join("; "));
    }

    tracing::debug!(pillars = pillars.len(), "catalog loaded");
    Ok(pillars)
}

fn order_catalog(mut pillars: Vec<Pillar>) -> Vec<Pillar> {
    pillars.sort_by_key(|p| p.order);
    for pillar in &mut pillars {
        pillar.questions.sort_by_key(|q| q.order);
    }
    pillars
}
