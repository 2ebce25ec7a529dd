use crate::connection::DbPool;
use crate::import::{parse_catalog, ImportError};
use crate::repositories::{ProductRepository, RepositoryError, SqlProductRepository};

/// Demo product ids and the category each one is expected to carry.
const DEMO_PRODUCTS: &[(&str, &str)] = &[
    ("demo-usb-cable-braided", "USBCables"),
    ("demo-usb-cable-basic", "USBCables"),
    ("demo-smart-tv-32", "SmartTelevisions"),
    ("demo-wireless-mouse", "Mice"),
    ("demo-wall-charger", "WallChargers"),
];

/// Small deterministic catalog for local runs and smoke tests.
pub struct DemoCatalog;

impl DemoCatalog {
    pub const JSON: &str = include_str!("../../../config/fixtures/demo_catalog.json");

    /// Upserts the demo products. Safe to run repeatedly.
    pub async fn load(pool: &DbPool) -> Result<SeedResult, ImportError> {
        let (products, _) = parse_catalog(Self::JSON)?;
        let repository = SqlProductRepository::new(pool.clone());

        let mut products_seeded = Vec::with_capacity(products.len());
        for product in products {
            products_seeded.push(product.id.0.clone());
            repository.save(product).await?;
        }

        Ok(SeedResult { products_seeded })
    }

    pub async fn verify(pool: &DbPool) -> Result<VerificationResult, RepositoryError> {
        let mut checks = Vec::with_capacity(DEMO_PRODUCTS.len());

        for (product_id, category) in DEMO_PRODUCTS {
            let categories_json: Option<String> =
                sqlx::query_scalar("SELECT categories_json FROM product WHERE id = ?1")
                    .bind(*product_id)
                    .fetch_optional(pool)
                    .await?;

            let present = match categories_json {
                Some(raw) => {
                    let categories: Vec<String> = serde_json::from_str(&raw)
                        .map_err(|error| RepositoryError::Decode(error.to_string()))?;
                    categories.iter().any(|candidate| candidate == category)
                }
                None => false,
            };
            checks.push((*product_id, present));
        }

        let all_present = checks.iter().all(|(_, present)| *present);
        Ok(VerificationResult { all_present, checks })
    }

    pub async fn clean(pool: &DbPool) -> Result<u64, RepositoryError> {
        let mut tx = pool.begin().await?;
        let mut removed = 0;
        for (product_id, _) in DEMO_PRODUCTS {
            removed += sqlx::query("DELETE FROM product WHERE id = ?1")
                .bind(*product_id)
                .execute(&mut *tx)
                .await?
                .rows_affected();
        }
        tx.commit().await?;
        Ok(removed)
    }
}

#[derive(Debug)]
pub struct SeedResult {
    pub products_seeded: Vec<String>,
}

#[derive(Debug)]
pub struct VerificationResult {
    pub all_present: bool,
    pub checks: Vec<(&'static str, bool)>,
}
