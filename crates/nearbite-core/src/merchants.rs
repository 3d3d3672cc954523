use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{ConfigError, Coordinate};

/// One merchant entry in the seed file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MerchantEntry {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default = "default_online")]
    pub online: bool,
}

fn default_online() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct MerchantsFile {
    pub merchants: Vec<MerchantEntry>,
}

/// Load and validate the merchants seed file (YAML).
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails
/// validation.
pub fn load_merchants(path: &Path) -> Result<MerchantsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::MerchantsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let merchants_file: MerchantsFile = serde_yaml::from_str(&content)?;

    validate_merchants(&merchants_file)?;

    Ok(merchants_file)
}

fn validate_merchants(merchants_file: &MerchantsFile) -> Result<(), ConfigError> {
    let mut seen_ids = HashSet::new();

    for merchant in &merchants_file.merchants {
        if merchant.id.trim().is_empty() {
            return Err(ConfigError::Validation(
                "merchant id must be non-empty".to_string(),
            ));
        }

        if merchant.name.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "merchant '{}' has an empty name",
                merchant.id
            )));
        }

        if Coordinate::new(merchant.latitude, merchant.longitude).is_err() {
            return Err(ConfigError::Validation(format!(
                "merchant '{}' has out-of-range coordinates ({}, {})",
                merchant.id, merchant.latitude, merchant.longitude
            )));
        }

        if !seen_ids.insert(merchant.id.clone()) {
            return Err(ConfigError::Validation(format!(
                "duplicate merchant id: '{}'",
                merchant.id
            )));
        }
    }

    Ok(())
}
