// src/strategy/classifier.rs

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::record::InventoryRecord;

/// Cover reported for a line that has stock but no sales.
pub const NO_SALES_COVER: f64 = 999.0;

/// A line is slow-moving once its cover exceeds this many times its target.
pub const SLOW_MOVING_FACTOR: f64 = 3.0;

/// Informational stock status of one store/product line.
///
/// This label is for reporting only. Needs are computed from the raw
/// thresholds, never from the status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StockStatus {
    ReplenishmentRequired,
    Overstock,
    SlowMoving,
    #[serde(rename = "NORMAL")]
    Normal,
}

impl StockStatus {
    /// Reporting order.
    pub const ALL: [StockStatus; 4] = [
        StockStatus::ReplenishmentRequired,
        StockStatus::Overstock,
        StockStatus::SlowMoving,
        StockStatus::Normal,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            StockStatus::ReplenishmentRequired => "ReplenishmentRequired",
            StockStatus::Overstock => "Overstock",
            StockStatus::SlowMoving => "SlowMoving",
            StockStatus::Normal => "NORMAL",
        }
    }
}

impl fmt::Display for StockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Weeks of stock left at the current sales rate.
pub fn cover_weeks(stock: f64, weekly_sales_rate: f64) -> f64 {
    if weekly_sales_rate > 0.0 {
        stock / weekly_sales_rate
    } else if stock > 0.0 {
        NO_SALES_COVER
    } else {
        0.0
    }
}

/// Classifies a record. The first matching rule wins:
/// below min, above max, cover beyond three targets, otherwise normal.
pub fn classify(record: &InventoryRecord) -> StockStatus {
    let stock = record.current_store_stock;

    if stock < record.min_threshold {
        return StockStatus::ReplenishmentRequired;
    }
    if stock > record.max_threshold {
        return StockStatus::Overstock;
    }

    let cover = cover_weeks(stock, record.weekly_sales_rate);
    if cover > record.target_cover_weeks * SLOW_MOVING_FACTOR {
        StockStatus::SlowMoving
    } else {
        StockStatus::Normal
    }
}
