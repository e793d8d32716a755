//! Replenishment need calculation and warehouse allocation for store networks.
//!
//! A run takes a snapshot of store/product inventory lines and a warehouse
//! stock pool, works out how much each store needs of each product, and hands
//! out the warehouse stock greedily, largest need first.
//!
//! ```no_run
//! use store_replenishment::engine::config::RunParameters;
//! use store_replenishment::engine::run::ReplenishmentEngine;
//! use store_replenishment::io::snapshot;
//!
//! # fn main() -> store_replenishment::error::Result<()> {
//! let records = snapshot::load_inventory_path("inventory.csv")?;
//! let pool = snapshot::load_warehouse_stock_path("warehouse.csv")?;
//! let engine = ReplenishmentEngine::new(RunParameters::default())?;
//! let report = engine.run(&records, pool)?;
//! println!("fulfilled {:.1}%", report.summary.fulfillment_rate);
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod engine;
pub mod error;
pub mod io;
pub mod logging;
pub mod model;
pub mod strategy;

pub use engine::config::RunParameters;
pub use engine::run::{ReplenishmentEngine, RunReport};
pub use error::{ConfigurationError, ReplenishmentError, Result};
pub use model::outcome::{AllocationResult, NeedRecord, NeedType};
pub use model::pool::WarehouseStock;
pub use model::record::InventoryRecord;
pub use strategy::classifier::{classify, StockStatus};
pub use strategy::need::compute_need;
pub use strategy::segmentation::{segment, SegmentBand};
