// src/strategy/need.rs

use crate::model::outcome::{NeedRecord, NeedType};
use crate::model::record::InventoryRecord;
use crate::model::units::ceil_units;
use crate::strategy::traits::Multipliers;

/// Weeks of sales a replenishment brings a store up to when the run sets nothing else.
pub const DEFAULT_FORWARD_COVER_WEEKS: f64 = 7.0;

/// Computes how much a store needs of a product and why.
///
/// - RPT need: `forward_cover * weekly_sales * stretch - (stock + in_transit)`
/// - Min need: `min_ratio * min_threshold - (stock + in_transit)`
///
/// Both are clamped at zero and rounded up to whole units; the larger one is
/// the need. When they are equal and positive the need is labelled
/// `Replenishment`.
///
/// The returned record has row 0 and no bands; the engine fills those in.
pub fn compute_need(
    record: &InventoryRecord,
    forward_cover_weeks: f64,
    multipliers: &Multipliers,
) -> NeedRecord {
    let position = record.stock_position();

    let rpt_target = forward_cover_weeks * record.weekly_sales_rate * multipliers.stretch;
    let rpt_need = ceil_units((rpt_target - position).max(0.0));

    let min_target = multipliers.min_ratio * record.min_threshold;
    let min_need = ceil_units((min_target - position).max(0.0));

    let need = rpt_need.max(min_need);
    let need_type = if need <= 0.0 {
        NeedType::NoNeed
    } else if need == rpt_need {
        NeedType::Replenishment
    } else {
        NeedType::MinimumFloor
    };

    NeedRecord {
        row: 0,
        record: record.clone(),
        product_band: None,
        store_band: None,
        multipliers: *multipliers,
        rpt_need,
        min_need,
        need,
        need_type,
    }
}
