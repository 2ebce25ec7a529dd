use storefront_core::{filter_products, keyword_search, sort_products, SearchMode, SortOrder};
use storefront_db::repositories::{ProductRepository, SqlProductRepository};
use storefront_db::{connect_with_settings, import_catalog, migrations, DemoCatalog};

type StoreTestResult<T = ()> = Result<T, String>;

fn ensure(condition: bool, message: impl Into<String>) -> StoreTestResult {
    if condition {
        Ok(())
    } else {
        Err(message.into())
    }
}

async fn seeded_repository() -> StoreTestResult<SqlProductRepository> {
    let pool = connect_with_settings("sqlite::memory:", 1, 30)
        .await
        .map_err(|error| format!("connect: {error}"))?;
    migrations::run_pending(&pool).await.map_err(|error| format!("migrate: {error}"))?;
    let repository = SqlProductRepository::new(pool);
    import_catalog(&repository, DemoCatalog::JSON)
        .await
        .map_err(|error| format!("import: {error}"))?;
    Ok(repository)
}

#[tokio::test]
async fn imported_catalog_feeds_the_filter_pipeline() -> StoreTestResult {
    let repository = seeded_repository().await?;
    let products = repository.list().await.map_err(|error| error.to_string())?;
    ensure(products.len() == 5, format!("expected 5 demo products, got {}", products.len()))?;

    let cables = filter_products(products.clone(), "USBCables&min=100&max=500");
    let ids: Vec<&str> = cables.iter().map(|product| product.id.as_str()).collect();
    ensure(
        ids == vec!["demo-usb-cable-braided", "demo-usb-cable-basic"],
        format!("unexpected cable filter result {ids:?}"),
    )?;

    let keywords = ["tv".to_string(), "mouse".to_string()];
    let wide = keyword_search(products, &keywords, SearchMode::Wide, None);
    ensure(wide.len() == 2, format!("wide search should match tv and mouse, got {}", wide.len()))
}

#[tokio::test]
async fn stored_catalog_sorts_by_price() -> StoreTestResult {
    let repository = seeded_repository().await?;
    let mut products = repository.list().await.map_err(|error| error.to_string())?;
    sort_products(&mut products, SortOrder::PriceAsc);

    let prices: Vec<f64> = products.iter().map(|product| product.discounted_price).collect();
    ensure(
        prices.windows(2).all(|pair| pair[0] <= pair[1]),
        format!("prices not ascending: {prices:?}"),
    )
}
