//! Compact filter encoding: `<category_part>[&min=N][&max=N]`.

use serde::{Deserialize, Serialize};

use super::price::PriceBounds;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub category_string: String,
    pub min_price: i64,
    pub max_price: i64,
}

impl FilterSpec {
    /// Decodes a filter string. Never fails: unknown segments and unparsable
    /// bounds are dropped, and a later `min=`/`max=` overrides an earlier one.
    pub fn parse(input: &str) -> Self {
        let mut segments = input.split('&');
        let mut spec = Self {
            category_string: segments.next().unwrap_or_default().to_string(),
            ..Self::default()
        };

        for segment in segments {
            if let Some(value) = segment.strip_prefix("max=") {
                if let Some(max) = parse_bound(value) {
                    spec.max_price = max;
                }
            } else if let Some(value) = segment.strip_prefix("min=") {
                if let Some(min) = parse_bound(value) {
                    spec.min_price = min;
                }
            }
        }

        spec
    }

    pub fn from_optional(input: Option<&str>) -> Self {
        input.map(Self::parse).unwrap_or_default()
    }

    pub fn price_bounds(&self) -> PriceBounds {
        PriceBounds::normalize(self.min_price, self.max_price)
    }
}

fn parse_bound(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok()
}
