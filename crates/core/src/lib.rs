pub mod catalog;
pub mod config;
pub mod credentials;
pub mod domain;
pub mod errors;
pub mod history;
pub mod recommendations;
pub mod search;

pub use catalog::{
    apply_filter, filter_by_category, filter_by_price, filter_products, sort_products,
    to_previews, CategorySelector, FilterSpec, PriceBounds, ProductPreview, SortOrder,
};
pub use domain::product::{Product, ProductDraft, ProductId, ProductReviews};
pub use domain::session::{PasswordReset, Session};
pub use domain::user::{User, UserId, UserProfile, ViewHistoryEntry};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use recommendations::{RecommendationEngine, RecommendationScore, ScoringWeights};
pub use search::{keyword_search, search_query, KeywordQuery, SearchMode};
