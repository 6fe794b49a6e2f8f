pub mod audit;
pub mod client;
pub mod config;
pub mod error;
pub mod location;
pub mod plants;
pub mod report;
pub mod sync;
pub mod types;
pub mod zone;

pub use audit::{AuditReport, ZoneFormat, run_audit};
pub use client::{AdminClient, ProductApi, fetch_all_products};
pub use config::Config;
pub use error::Error;
pub use location::describe_zip;
pub use plants::{MatchResult, MatchType, PlantDatabase, extract_plant_name};
pub use report::{REPORT_PATH, SyncReport};
pub use sync::{DEFAULT_WRITE_DELAY, FixedDelay, NoDelay, SyncDriver, SyncOptions, WritePacer};
pub use types::Product;
pub use zone::{ZoneInfo, ZoneTable};
