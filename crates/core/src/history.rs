//! Recently-viewed policy: most recent first, one entry per product, capped.

use chrono::{DateTime, Utc};

use crate::domain::product::ProductId;
use crate::domain::user::ViewHistoryEntry;

pub const DEFAULT_VIEW_HISTORY_LIMIT: usize = 20;
pub const DEFAULT_RECENTLY_VIEWED: usize = 4;

/// Moves `product_id` to the front of `history`, stamped `viewed_at`, then truncates to `cap`.
pub fn record_view(
    history: &mut Vec<ViewHistoryEntry>,
    product_id: ProductId,
    viewed_at: DateTime<Utc>,
    cap: usize,
) {
    history.retain(|entry| entry.product_id != product_id);
    history.insert(0, ViewHistoryEntry { product_id, viewed_at });
    history.truncate(cap);
}

pub fn recent(history: &[ViewHistoryEntry], limit: usize) -> &[ViewHistoryEntry] {
    &history[..limit.min(history.len())]
}
