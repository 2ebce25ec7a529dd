pub mod connection;
pub mod fixtures;
pub mod import;
pub mod migrations;
pub mod repositories;

pub use connection::{connect, connect_with_settings, DbPool};
pub use fixtures::{DemoCatalog, SeedResult, VerificationResult};
pub use import::{import_catalog, parse_catalog, ImportError, ImportReport};
