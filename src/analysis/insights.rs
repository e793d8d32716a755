// src/analysis/insights.rs

//! Secondary views over a run: status distribution, top recipients,
//! per-product dispatch feasibility, markdown candidates and drill-downs into
//! one category, store or product.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::model::outcome::{AllocationResult, NeedRecord};
use crate::model::pool::WarehouseStock;
use crate::model::record::InventoryRecord;
use crate::strategy::classifier::{classify, StockStatus};

/// Cover (weeks) above which excess stock calls for an aggressive markdown.
pub const AGGRESSIVE_MARKDOWN_COVER: f64 = 52.0;
/// Cover (weeks) above which excess stock calls for a campaign.
pub const CAMPAIGN_COVER: f64 = 26.0;
/// Added to aggregate sales so products that sell nothing get a finite cover.
const SALES_FLOOR: f64 = 0.1;

fn by_value_desc_then_id(a: (f64, &str), b: (f64, &str)) -> Ordering {
    b.0.total_cmp(&a.0).then_with(|| a.1.cmp(b.1))
}

// =========================================================================
// Status breakdown
// =========================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusCount {
    pub status: StockStatus,
    pub records: usize,
    pub store_stock: f64,
}

/// Record count and store stock per status, in reporting order.
/// Every status is listed, including those with no records.
pub fn status_breakdown(records: &[InventoryRecord]) -> Vec<StatusCount> {
    let mut counts: BTreeMap<StockStatus, (usize, f64)> = BTreeMap::new();
    for record in records {
        let entry = counts.entry(classify(record)).or_default();
        entry.0 += 1;
        entry.1 += record.current_store_stock;
    }

    StockStatus::ALL
        .iter()
        .map(|&status| {
            let (records, store_stock) = counts.get(&status).copied().unwrap_or_default();
            StatusCount {
                status,
                records,
                store_stock,
            }
        })
        .collect()
}

// =========================================================================
// Top recipients
// =========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipientKind {
    Product,
    Store,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recipient {
    pub id: String,
    pub shipped_units: f64,
}

/// Products or stores that received the most units.
pub fn top_recipients(
    results: &[AllocationResult],
    kind: RecipientKind,
    limit: usize,
) -> Vec<Recipient> {
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
    for result in results.iter().filter(|r| r.shipped_units > 0.0) {
        let id = match kind {
            RecipientKind::Product => result.product_id(),
            RecipientKind::Store => result.store_id(),
        };
        *totals.entry(id).or_insert(0.0) += result.shipped_units;
    }

    let mut ranked: Vec<Recipient> = totals
        .into_iter()
        .map(|(id, shipped_units)| Recipient {
            id: id.to_owned(),
            shipped_units,
        })
        .collect();
    ranked.sort_by(|a, b| {
        by_value_desc_then_id((a.shipped_units, &a.id), (b.shipped_units, &b.id))
    });
    ranked.truncate(limit);
    ranked
}

// =========================================================================
// Dispatch feasibility
// =========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Feasibility {
    /// Warehouses hold at least the total need.
    Full,
    /// Some stock, not enough for every store.
    Partial,
    /// Nothing in any warehouse.
    NoStock,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductFeasibility {
    pub product_id: String,
    pub store_count: usize,
    pub total_need: f64,
    pub available_units: f64,
    pub feasibility: Feasibility,
}

/// Compares each product's total need with what all warehouses hold of it.
///
/// Must be called with the pool as it stands before allocation.
pub fn dispatch_feasibility(
    need_records: &[NeedRecord],
    pool: &WarehouseStock,
) -> Vec<ProductFeasibility> {
    let mut needs: BTreeMap<&str, (f64, BTreeSet<&str>)> = BTreeMap::new();
    for nr in need_records.iter().filter(|nr| nr.has_need()) {
        let entry = needs.entry(nr.record.product_id.as_str()).or_default();
        entry.0 += nr.need;
        entry.1.insert(nr.record.store_id.as_str());
    }

    let mut rows: Vec<ProductFeasibility> = needs
        .into_iter()
        .map(|(product_id, (total_need, stores))| {
            let available_units = pool.available_for_product(product_id);
            let feasibility = if available_units >= total_need {
                Feasibility::Full
            } else if available_units > 0.0 {
                Feasibility::Partial
            } else {
                Feasibility::NoStock
            };
            ProductFeasibility {
                product_id: product_id.to_owned(),
                store_count: stores.len(),
                total_need,
                available_units,
                feasibility,
            }
        })
        .collect();
    rows.sort_by(|a, b| {
        by_value_desc_then_id((a.total_need, &a.product_id), (b.total_need, &b.product_id))
    });
    rows
}

// =========================================================================
// Markdown candidates
// =========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MarkdownAction {
    AggressiveMarkdown,
    Campaign,
    Watch,
}

impl MarkdownAction {
    pub fn for_cover(cover_weeks: f64) -> Self {
        if cover_weeks > AGGRESSIVE_MARKDOWN_COVER {
            MarkdownAction::AggressiveMarkdown
        } else if cover_weeks > CAMPAIGN_COVER {
            MarkdownAction::Campaign
        } else {
            MarkdownAction::Watch
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkdownCandidate {
    pub product_id: String,
    pub store_count: usize,
    pub total_stock: f64,
    pub total_sales: f64,
    pub cover_weeks: f64,
    pub action: MarkdownAction,
}

/// Products carrying overstocked or slow-moving lines, largest stock first.
pub fn markdown_candidates(records: &[InventoryRecord], limit: usize) -> Vec<MarkdownCandidate> {
    let mut totals: BTreeMap<&str, (usize, f64, f64)> = BTreeMap::new();
    for record in records {
        if !matches!(
            classify(record),
            StockStatus::Overstock | StockStatus::SlowMoving
        ) {
            continue;
        }
        let entry = totals.entry(record.product_id.as_str()).or_default();
        entry.0 += 1;
        entry.1 += record.current_store_stock;
        entry.2 += record.weekly_sales_rate;
    }

    let mut candidates: Vec<MarkdownCandidate> = totals
        .into_iter()
        .map(|(product_id, (store_count, total_stock, total_sales))| {
            let cover_weeks = total_stock / (total_sales + SALES_FLOOR);
            MarkdownCandidate {
                product_id: product_id.to_owned(),
                store_count,
                total_stock,
                total_sales,
                cover_weeks,
                action: MarkdownAction::for_cover(cover_weeks),
            }
        })
        .collect();
    candidates.sort_by(|a, b| {
        by_value_desc_then_id((a.total_stock, &a.product_id), (b.total_stock, &b.product_id))
    });
    candidates.truncate(limit);
    candidates
}

// =========================================================================
// Scope drill-down
// =========================================================================

/// One slice of the snapshot to look into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Scope {
    Category(String),
    Store(String),
    Product(String),
}

impl Scope {
    /// Whether a record belongs to the scope. Records without a category are
    /// never in a category scope.
    pub fn contains(&self, record: &InventoryRecord) -> bool {
        match self {
            Scope::Category(id) => record.category_id.as_deref() == Some(id.as_str()),
            Scope::Store(id) => record.store_id == *id,
            Scope::Product(id) => record.product_id == *id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScopeSummary {
    pub scope: Scope,
    pub records: usize,
    pub product_count: usize,
    pub store_count: usize,
    pub total_stock: f64,
    pub total_sales: f64,
    pub statuses: Vec<StatusCount>,
    /// Lines below their minimum, in input order.
    pub replenishment_required: Vec<InventoryRecord>,
}

/// Totals, status distribution and below-minimum lines for one scope.
///
/// Returns `None` when no record falls in the scope.
pub fn scope_summary(records: &[InventoryRecord], scope: &Scope) -> Option<ScopeSummary> {
    let in_scope: Vec<InventoryRecord> = records
        .iter()
        .filter(|r| scope.contains(r))
        .cloned()
        .collect();
    if in_scope.is_empty() {
        return None;
    }

    let products: BTreeSet<&str> = in_scope.iter().map(|r| r.product_id.as_str()).collect();
    let stores: BTreeSet<&str> = in_scope.iter().map(|r| r.store_id.as_str()).collect();
    let replenishment_required = in_scope
        .iter()
        .filter(|r| classify(r) == StockStatus::ReplenishmentRequired)
        .cloned()
        .collect();

    Some(ScopeSummary {
        scope: scope.clone(),
        records: in_scope.len(),
        product_count: products.len(),
        store_count: stores.len(),
        total_stock: in_scope.iter().map(|r| r.current_store_stock).sum(),
        total_sales: in_scope.iter().map(|r| r.weekly_sales_rate).sum(),
        statuses: status_breakdown(&in_scope),
        replenishment_required,
    })
}
