use std::borrow::Borrow;
use std::collections::HashSet;

use crate::domain::product::Product;

/// Category selection decoded from a `*`-delimited category string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CategorySelector {
    All,
    AnyOf(HashSet<String>),
}

impl CategorySelector {
    /// `""` and `"all"` select everything; anything else is split on `*`.
    pub fn parse(category_string: &str) -> Self {
        if category_string.is_empty() || category_string == "all" {
            return Self::All;
        }

        Self::AnyOf(category_string.split('*').map(str::to_string).collect())
    }

    /// Exact, case-sensitive membership; a product with no categories never matches `AnyOf`.
    pub fn matches(&self, product: &Product) -> bool {
        match self {
            Self::All => true,
            Self::AnyOf(tokens) => {
                product.categories.iter().any(|category| tokens.contains(category))
            }
        }
    }
}

pub fn filter_by_category<P: Borrow<Product>>(products: Vec<P>, category_string: &str) -> Vec<P> {
    let selector = CategorySelector::parse(category_string);
    if selector == CategorySelector::All {
        return products;
    }

    products.into_iter().filter(|product| selector.matches(product.borrow())).collect()
}
