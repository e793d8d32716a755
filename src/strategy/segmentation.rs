// src/strategy/segmentation.rs

//! Cover-ratio segmentation of products and stores.
//!
//! A product's ratio aggregates its stock and sales over every store; a store's
//! ratio aggregates over every product it carries. The two bands together pick
//! the multipliers applied to each store/product line.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::record::InventoryRecord;

/// Cover-ratio band in weeks. Lower bounds are inclusive, upper bounds exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SegmentBand {
    #[serde(rename = "0-4")]
    UpTo4,
    #[serde(rename = "4-8")]
    From4To8,
    #[serde(rename = "8-12")]
    From8To12,
    #[serde(rename = "12-15")]
    From12To15,
    #[serde(rename = "15-20")]
    From15To20,
    #[serde(rename = "20+")]
    From20,
}

impl SegmentBand {
    pub const ALL: [SegmentBand; 6] = [
        SegmentBand::UpTo4,
        SegmentBand::From4To8,
        SegmentBand::From8To12,
        SegmentBand::From12To15,
        SegmentBand::From15To20,
        SegmentBand::From20,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SegmentBand::UpTo4 => "0-4",
            SegmentBand::From4To8 => "4-8",
            SegmentBand::From8To12 => "8-12",
            SegmentBand::From12To15 => "12-15",
            SegmentBand::From15To20 => "15-20",
            SegmentBand::From20 => "20+",
        }
    }

    /// Inclusive lower bound of the band.
    pub fn lower_bound(&self) -> f64 {
        match self {
            SegmentBand::UpTo4 => 0.0,
            SegmentBand::From4To8 => 4.0,
            SegmentBand::From8To12 => 8.0,
            SegmentBand::From12To15 => 12.0,
            SegmentBand::From15To20 => 15.0,
            SegmentBand::From20 => 20.0,
        }
    }
}

impl fmt::Display for SegmentBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Maps a cover ratio onto its band.
///
/// Ratios below zero (or NaN) land in the first band.
pub fn segment(ratio: f64) -> SegmentBand {
    SegmentBand::ALL
        .iter()
        .rev()
        .find(|band| ratio >= band.lower_bound())
        .copied()
        .unwrap_or(SegmentBand::UpTo4)
}

/// Aggregate stock over aggregate weekly sales.
///
/// Zero sales count as one unit per week, so a group that sells nothing is
/// banded by its raw stock instead of dividing by zero.
pub fn cover_ratio(total_stock: f64, total_sales: f64) -> f64 {
    let divisor = if total_sales > 0.0 { total_sales } else { 1.0 };
    total_stock / divisor
}

#[derive(Debug, Default, Clone, Copy)]
struct Totals {
    stock: f64,
    sales: f64,
}

fn ratios_by<F>(records: &[InventoryRecord], key: F) -> BTreeMap<String, f64>
where
    F: Fn(&InventoryRecord) -> &str,
{
    let mut totals: BTreeMap<String, Totals> = BTreeMap::new();
    for record in records {
        let entry = totals.entry(key(record).to_owned()).or_default();
        entry.stock += record.current_store_stock;
        entry.sales += record.weekly_sales_rate;
    }
    totals
        .into_iter()
        .map(|(id, t)| (id, cover_ratio(t.stock, t.sales)))
        .collect()
}

/// Cover ratio of each product across all stores.
pub fn product_ratios(records: &[InventoryRecord]) -> BTreeMap<String, f64> {
    ratios_by(records, |r| r.product_id.as_str())
}

/// Cover ratio of each store across all products.
pub fn store_ratios(records: &[InventoryRecord]) -> BTreeMap<String, f64> {
    ratios_by(records, |r| r.store_id.as_str())
}

/// Band assignment for every product and store of one run.
#[derive(Debug, Clone, Default)]
pub struct Segmentation {
    pub product_bands: BTreeMap<String, SegmentBand>,
    pub store_bands: BTreeMap<String, SegmentBand>,
}

impl Segmentation {
    pub fn from_records(records: &[InventoryRecord]) -> Self {
        let band_all = |ratios: BTreeMap<String, f64>| {
            ratios
                .into_iter()
                .map(|(id, ratio)| (id, segment(ratio)))
                .collect()
        };
        Self {
            product_bands: band_all(product_ratios(records)),
            store_bands: band_all(store_ratios(records)),
        }
    }

    /// (product band, store band) for a record; ids never seen fall in the first band.
    pub fn bands_for(&self, record: &InventoryRecord) -> (SegmentBand, SegmentBand) {
        let product = self
            .product_bands
            .get(&record.product_id)
            .copied()
            .unwrap_or(SegmentBand::UpTo4);
        let store = self
            .store_bands
            .get(&record.store_id)
            .copied()
            .unwrap_or(SegmentBand::UpTo4);
        (product, store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_edges_are_lower_inclusive() {
        assert_eq!(segment(0.0), SegmentBand::UpTo4);
        assert_eq!(segment(3.99), SegmentBand::UpTo4);
        assert_eq!(segment(4.0), SegmentBand::From4To8);
        assert_eq!(segment(8.0), SegmentBand::From8To12);
        assert_eq!(segment(11.5), SegmentBand::From8To12);
        assert_eq!(segment(12.0), SegmentBand::From12To15);
        assert_eq!(segment(15.0), SegmentBand::From15To20);
        assert_eq!(segment(19.99), SegmentBand::From15To20);
        assert_eq!(segment(20.0), SegmentBand::From20);
        assert_eq!(segment(f64::INFINITY), SegmentBand::From20);
    }

    #[test]
    fn odd_ratios_fall_into_first_band() {
        assert_eq!(segment(-1.0), SegmentBand::UpTo4);
        assert_eq!(segment(f64::NAN), SegmentBand::UpTo4);
    }

    #[test]
    fn zero_sales_uses_raw_stock() {
        assert_eq!(cover_ratio(9.0, 0.0), 9.0);
        assert_eq!(cover_ratio(9.0, 3.0), 3.0);
    }

    #[test]
    fn products_and_stores_aggregate_independently() {
        let records = vec![
            InventoryRecord::new("S1", "P1", "W1")
                .with_stock(10.0, 0.0)
                .with_sales_rate(5.0),
            InventoryRecord::new("S2", "P1", "W1")
                .with_stock(30.0, 0.0)
                .with_sales_rate(0.0),
            InventoryRecord::new("S1", "P2", "W1")
                .with_stock(50.0, 0.0)
                .with_sales_rate(1.0),
        ];

        let products = product_ratios(&records);
        assert_eq!(products["P1"], 8.0); // 40 / 5
        assert_eq!(products["P2"], 50.0);

        let stores = store_ratios(&records);
        assert_eq!(stores["S1"], 10.0); // 60 / 6
        assert_eq!(stores["S2"], 30.0);

        let seg = Segmentation::from_records(&records);
        assert_eq!(
            seg.bands_for(&records[0]),
            (SegmentBand::From8To12, SegmentBand::From8To12)
        );
        assert_eq!(
            seg.bands_for(&records[1]),
            (SegmentBand::From8To12, SegmentBand::From20)
        );
    }

    #[test]
    fn band_labels_round_trip_through_serde() {
        let json = serde_json::to_string(&SegmentBand::From12To15).unwrap();
        assert_eq!(json, "\"12-15\"");
        let band: SegmentBand = serde_json::from_str("\"20+\"").unwrap();
        assert_eq!(band, SegmentBand::From20);
    }
}
