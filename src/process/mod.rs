// src/process/mod.rs
pub mod collect;
pub mod columns;
pub mod currency;
pub mod enrich;
pub mod finalize;
pub mod ticker;

pub use collect::{collect, CollectOutcome};
pub use columns::ColumnRules;
pub use enrich::{enrich, EnrichReport, PriceAttempt, PriceOutcome};
pub use finalize::{finalize, save};
