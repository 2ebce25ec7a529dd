use std::collections::HashSet;

use crate::domain::product::Product;

/// Lower-cased name tokens: whitespace pieces, with comma-bearing pieces split again on `,`.
///
/// `"Cable,Black USB"` yields `{"cable", "black", "usb"}`. Empty sub-tokens from a
/// trailing comma are kept; they only ever match an empty keyword.
pub fn name_tokens(name: &str) -> HashSet<String> {
    let mut tokens = HashSet::new();

    for piece in name.split_whitespace().map(str::to_lowercase) {
        if piece.contains(',') {
            tokens.extend(piece.split(',').map(str::to_string));
        } else {
            tokens.insert(piece);
        }
    }

    tokens
}

/// Lower-cased raw categories, no sub-splitting.
pub fn category_tokens(categories: &[String]) -> HashSet<String> {
    categories.iter().map(|category| category.to_lowercase()).collect()
}

/// Token sets for one product, built once per search.
#[derive(Debug)]
pub struct ProductTokens {
    pub name: HashSet<String>,
    pub categories: HashSet<String>,
}

impl ProductTokens {
    pub fn of(product: &Product) -> Self {
        Self { name: name_tokens(&product.name), categories: category_tokens(&product.categories) }
    }
}

#[cfg(test)]
mod tests {
    use super::{category_tokens, name_tokens};

    #[test]
    fn name_is_lowercased_and_split_on_whitespace() {
        let tokens = name_tokens("HDMI  Cable\t4K");
        assert_eq!(tokens.len(), 3);
        assert!(tokens.contains("hdmi") && tokens.contains("cable") && tokens.contains("4k"));
    }

    #[test]
    fn comma_pieces_are_split_again() {
        let tokens = name_tokens("Charger,Fast Cable,Black,");
        assert!(tokens.contains("charger"));
        assert!(tokens.contains("fast"));
        assert!(tokens.contains("cable"));
        assert!(tokens.contains("black"));
        assert!(tokens.contains(""));
        assert!(!tokens.contains("charger,fast"));
    }

    #[test]
    fn duplicate_words_collapse() {
        assert_eq!(name_tokens("usb USB Usb").len(), 1);
    }

    #[test]
    fn categories_are_lowercased_whole() {
        let tokens =
            category_tokens(&["HDMICables".to_string(), "Computers&Accessories".to_string()]);
        assert!(tokens.contains("hdmicables"));
        assert!(tokens.contains("computers&accessories"));
        assert_eq!(tokens.len(), 2);
    }
}
