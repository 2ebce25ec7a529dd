use storefront_core::{
    filter_by_category, filter_by_price, filter_products, keyword_search, to_previews,
    PriceBounds, Product, ProductId, ProductReviews, RecommendationEngine, SearchMode,
};

fn product(
    id: &str,
    name: &str,
    categories: &[&str],
    price: f64,
    rating: f64,
    count: u64,
) -> Product {
    Product {
        id: ProductId::from(id),
        name: name.to_string(),
        categories: categories.iter().map(|c| c.to_string()).collect(),
        discounted_price: price,
        actual_price: price,
        discount_percentage: "0%".to_string(),
        rating,
        rating_count: count,
        about_product: String::new(),
        reviews: ProductReviews::default(),
        img_link: String::new(),
        product_link: String::new(),
    }
}

fn scenario() -> Vec<Product> {
    vec![
        product("1", "Alpha", &["cat1"], 100.0, 4.0, 10),
        product("2", "Beta", &["cat2"], 200.0, 4.5, 30),
        product("3", "Gamma", &["cat1", "cat2"], 300.0, 3.0, 5),
        product("4", "Delta", &["cat4"], 400.0, 5.0, 2),
    ]
}

fn ids(products: &[Product]) -> Vec<&str> {
    products.iter().map(|p| p.id.as_str()).collect()
}

#[test]
fn category_scenarios() {
    assert_eq!(ids(&filter_by_category(scenario(), "cat1")), vec!["1", "3"]);
    assert_eq!(ids(&filter_by_category(scenario(), "cat2*cat4")), vec!["2", "3", "4"]);
    assert!(filter_by_category(scenario(), "cat3").is_empty());
}

#[test]
fn price_scenarios() {
    assert_eq!(ids(&filter_by_price(scenario(), PriceBounds::normalize(0, 200))), vec!["1", "2"]);
    assert_eq!(ids(&filter_by_price(scenario(), PriceBounds::normalize(250, 0))), vec!["3", "4"]);

    let swapped = PriceBounds::normalize(250, 125);
    assert_eq!(swapped, PriceBounds::normalize(125, 250));
    assert_eq!(ids(&filter_by_price(scenario(), swapped))[0], "2");
}

#[test]
fn filters_are_idempotent() {
    for filter in ["cat1*cat2&min=150", "all&max=300", "cat4", ""] {
        let once = filter_products(scenario(), filter);
        let twice = filter_products(once.clone(), filter);
        assert_eq!(once, twice, "filter {filter}");
    }
}

#[test]
fn search_then_preview() {
    let hits = keyword_search(
        scenario(),
        &["gamma".to_string(), "cat4".to_string()],
        SearchMode::Wide,
        Some("all&min=250"),
    );
    let previews = to_previews(&hits);

    assert_eq!(previews.len(), 2);
    assert_eq!(previews[0].product_name, "Gamma");
    assert_eq!(previews[1].product_name, "Delta");
}

#[test]
fn recommendations_without_history_rank_by_popularity() {
    let products = scenario();
    let result = RecommendationEngine::new().recommend(&[], &products, None, 3);
    let ids: Vec<&str> = result.iter().map(|p| p.id.as_str()).collect();

    // 135, 40, 15
    assert_eq!(ids, vec!["2", "1", "3"]);
}
