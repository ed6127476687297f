//! Static MacroBaby seed catalog, loaded from YAML.
//!
//! MacroBaby has no affiliate feed; its catalog presence comes from a
//! curated seed file shipped with the deployment and imported like any
//! other source.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedProduct {
    pub id: Option<String>,
    pub title: String,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub image: Option<String>,
    pub url: Option<String>,
    pub price: Option<f64>,
    pub retailer: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SeedFile {
    pub products: Vec<SeedProduct>,
}

/// Load and validate the seed catalog from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_seed_catalog(path: &Path) -> Result<SeedFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SeedFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let seed_file: SeedFile =
        serde_yaml::from_str(&content).map_err(ConfigError::SeedFileParse)?;

    validate_seed(&seed_file)?;

    Ok(seed_file)
}

fn validate_seed(seed_file: &SeedFile) -> Result<(), ConfigError> {
    let mut seen_ids = HashSet::new();

    for product in &seed_file.products {
        if product.title.trim().is_empty() {
            return Err(ConfigError::Validation(
                "seed product title must be non-empty".to_string(),
            ));
        }

        if let Some(price) = product.price {
            if !price.is_finite() || price < 0.0 {
                return Err(ConfigError::Validation(format!(
                    "seed product '{}' has invalid price {price}",
                    product.title
                )));
            }
        }

        if let Some(id) = &product.id {
            if !seen_ids.insert(id.clone()) {
                return Err(ConfigError::Validation(format!(
                    "duplicate seed product id: '{id}'"
                )));
            }
        }
    }

    Ok(())
}
