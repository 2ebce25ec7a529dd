//! Loading the legacy flat JSON catalog (`products.json`) into the product store.

use serde_json::Value;
use tracing::{info, warn};

use storefront_core::domain::product::Product;

use crate::repositories::{ProductRepository, RepositoryError};

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("catalog is not a JSON array of product records: {0}")]
    Malformed(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct ImportReport {
    pub imported: usize,
    pub skipped: usize,
}

/// Parses every record it can. A record that does not decode into a `Product`
/// is counted in the second element instead of failing the whole catalog.
pub fn parse_catalog(raw: &str) -> Result<(Vec<Product>, usize), ImportError> {
    let records: Vec<Value> =
        serde_json::from_str(raw).map_err(|e| ImportError::Malformed(e.to_string()))?;

    let mut products = Vec::with_capacity(records.len());
    let mut skipped = 0;
    for (index, record) in records.into_iter().enumerate() {
        match serde_json::from_value::<Product>(record) {
            Ok(product) if !product.id.as_str().trim().is_empty() => products.push(product),
            Ok(_) => {
                skipped += 1;
                warn!(event_name = "catalog.import.skipped", index, reason = "empty product_id");
            }
            Err(error) => {
                skipped += 1;
                warn!(
                    event_name = "catalog.import.skipped",
                    index,
                    reason = %error,
                );
            }
        }
    }

    Ok((products, skipped))
}

pub async fn import_catalog(
    repository: &dyn ProductRepository,
    raw: &str,
) -> Result<ImportReport, ImportError> {
    let (products, skipped) = parse_catalog(raw)?;

    let mut imported = 0;
    for product in products {
        repository.save(product).await?;
        imported += 1;
    }

    info!(event_name = "catalog.import.completed", imported, skipped);
    Ok(ImportReport { imported, skipped })
}
