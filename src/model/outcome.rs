// src/model/outcome.rs

use serde::{Deserialize, Serialize};

use crate::model::record::InventoryRecord;
use crate::strategy::segmentation::SegmentBand;
use crate::strategy::traits::Multipliers;

/// Which formula produced the need.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NeedType {
    #[serde(rename = "None")]
    NoNeed,
    Replenishment,
    MinimumFloor,
}

impl NeedType {
    pub fn label(&self) -> &'static str {
        match self {
            NeedType::NoNeed => "None",
            NeedType::Replenishment => "Replenishment",
            NeedType::MinimumFloor => "MinimumFloor",
        }
    }
}

/// An inventory record together with its computed need.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeedRecord {
    /// Position of the source record in the run input.
    pub row: usize,
    pub record: InventoryRecord,

    // Segmentation context, filled in by the engine
    pub product_band: Option<SegmentBand>,
    pub store_band: Option<SegmentBand>,
    pub multipliers: Multipliers,

    pub rpt_need: f64,
    pub min_need: f64,
    pub need: f64,
    pub need_type: NeedType,
}

impl NeedRecord {
    pub fn with_origin(
        mut self,
        row: usize,
        product_band: SegmentBand,
        store_band: SegmentBand,
    ) -> Self {
        self.row = row;
        self.product_band = Some(product_band);
        self.store_band = Some(store_band);
        self
    }

    pub fn has_need(&self) -> bool {
        self.need > 0.0
    }
}

/// Outcome of the allocation pass for one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationResult {
    pub need_record: NeedRecord,
    pub shipped_units: f64,
    pub unmet_units: f64,
    /// Position in the allocation order; `None` when the record had no need.
    pub priority: Option<usize>,
}

impl AllocationResult {
    pub fn store_id(&self) -> &str {
        &self.need_record.record.store_id
    }

    pub fn product_id(&self) -> &str {
        &self.need_record.record.product_id
    }

    pub fn warehouse_id(&self) -> &str {
        &self.need_record.record.warehouse_id
    }

    pub fn need(&self) -> f64 {
        self.need_record.need
    }

    pub fn need_type(&self) -> NeedType {
        self.need_record.need_type
    }

    pub fn is_fully_met(&self) -> bool {
        self.unmet_units <= 0.0
    }
}
