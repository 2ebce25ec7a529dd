//! Keyword search over product names and categories.
//!
//! Wide mode keeps a product when any keyword hits its name or category tokens.
//! Strict mode keeps it when every keyword hits the name, or when the number of
//! keywords hitting a category is more than half the product's raw category count.

mod tokenizer;

use std::borrow::Borrow;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::filter_products;
use crate::domain::product::Product;

pub use tokenizer::{category_tokens, name_tokens, ProductTokens};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    #[default]
    Wide,
    Strict,
}

/// A decoded search request: keywords plus an optional trailing filter string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeywordQuery {
    pub keywords: Vec<String>,
    pub filter: Option<String>,
}

impl KeywordQuery {
    /// Decodes `"kw1 kw2[&filter]"`. Splits on the first `&` only, so the filter
    /// keeps its own `&min=`/`&max=` segments. Keywords are split on single spaces.
    pub fn parse(raw: &str) -> Self {
        let (head, filter) = match raw.split_once('&') {
            Some((head, filter)) => (head, Some(filter.to_string())),
            None => (raw, None),
        };

        Self { keywords: head.split(' ').map(str::to_string).collect(), filter }
    }
}

pub fn keyword_search<P: Borrow<Product>>(
    products: Vec<P>,
    keywords: &[String],
    mode: SearchMode,
    filter: Option<&str>,
) -> Vec<P> {
    let candidates = match filter {
        Some(filter) => filter_products(products, filter),
        None => products,
    };
    let candidate_count = candidates.len();
    let keywords: Vec<String> = keywords.iter().map(|keyword| keyword.to_lowercase()).collect();

    let result: Vec<P> = candidates
        .into_iter()
        .filter(|product| matches_keywords(product.borrow(), &keywords, mode))
        .collect();

    debug!(
        event_name = "catalog.search.completed",
        mode = ?mode,
        keyword_count = keywords.len(),
        filtered = filter.is_some(),
        candidate_count,
        match_count = result.len(),
        "keyword search completed"
    );

    result
}

pub fn search_query<P: Borrow<Product>>(
    products: Vec<P>,
    query: &KeywordQuery,
    mode: SearchMode,
) -> Vec<P> {
    keyword_search(products, &query.keywords, mode, query.filter.as_deref())
}

/// `keywords` must already be lower-cased.
fn matches_keywords(product: &Product, keywords: &[String], mode: SearchMode) -> bool {
    let tokens = ProductTokens::of(product);

    match mode {
        SearchMode::Wide => keywords.iter().any(|keyword| {
            tokens.name.contains(keyword) || tokens.categories.contains(keyword)
        }),
        SearchMode::Strict => {
            let name_hits = keywords.iter().filter(|k| tokens.name.contains(*k)).count();
            let category_hits = keywords.iter().filter(|k| tokens.categories.contains(*k)).count();

            // An empty keyword list satisfies the name branch vacuously.
            name_hits == keywords.len() || category_hits * 2 > product.categories.len()
        }
    }
}
