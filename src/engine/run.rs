// src/engine/run.rs

use serde::Serialize;
use tracing::{debug, info, info_span};

use crate::analysis::insights::{
    dispatch_feasibility, markdown_candidates, status_breakdown, MarkdownCandidate,
    ProductFeasibility, StatusCount,
};
use crate::analysis::summary::{summarize, AllocationSummary};
use crate::engine::allocator::allocate;
use crate::engine::config::RunParameters;
use crate::error::Result;
use crate::model::outcome::{AllocationResult, NeedRecord};
use crate::model::pool::WarehouseStock;
use crate::model::record::{validate_records, InventoryRecord};
use crate::strategy::classifier::{classify, StockStatus};
use crate::strategy::implementations::{OverriddenPolicy, UniformMultipliers};
use crate::strategy::need::compute_need;
use crate::strategy::segmentation::Segmentation;
use crate::strategy::traits::MultiplierPolicy;

/// Maximum number of markdown candidates kept in a report.
pub const MARKDOWN_CANDIDATE_LIMIT: usize = 50;

/// Everything one run produces.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// One result per record that passed the filters, in input order.
    pub results: Vec<AllocationResult>,
    /// Status of each filtered record, aligned with `results`.
    pub statuses: Vec<StockStatus>,
    pub summary: AllocationSummary,
    pub status_breakdown: Vec<StatusCount>,
    pub feasibility: Vec<ProductFeasibility>,
    pub markdown_candidates: Vec<MarkdownCandidate>,
}

impl RunReport {
    fn empty() -> Self {
        Self {
            results: Vec::new(),
            statuses: Vec::new(),
            summary: AllocationSummary::empty(),
            status_breakdown: status_breakdown(&[]),
            feasibility: Vec::new(),
            markdown_candidates: Vec::new(),
        }
    }
}

/// Stateless replenishment planner.
///
/// The engine holds only parameters and the multiplier policy; each call to
/// [`ReplenishmentEngine::run`] takes its own warehouse pool.
#[derive(Debug)]
pub struct ReplenishmentEngine {
    params: RunParameters,
    policy: Box<dyn MultiplierPolicy>,
}

impl ReplenishmentEngine {
    pub fn new(params: RunParameters) -> Result<Self> {
        params.validate()?;

        let base: Box<dyn MultiplierPolicy> = match &params.matrix {
            Some(matrix) => Box::new(matrix.clone()),
            None => Box::new(UniformMultipliers::default()),
        };
        let policy: Box<dyn MultiplierPolicy> = if params.overrides.is_empty() {
            base
        } else {
            Box::new(OverriddenPolicy::new(base, params.overrides))
        };

        Ok(Self { params, policy })
    }

    pub fn params(&self) -> &RunParameters {
        &self.params
    }

    /// Validates, filters, classifies, segments, computes needs and allocates.
    ///
    /// Invalid records fail the whole run before anything is computed.
    /// An input with no records (or none left after filtering) is not an
    /// error: the report is empty and flags that nothing needs replenishing.
    pub fn run(&self, records: &[InventoryRecord], pool: WarehouseStock) -> Result<RunReport> {
        let span = info_span!("replenishment_run", records = records.len());
        let _guard = span.enter();

        validate_records(records)?;

        // Keep input positions; results refer to the caller's rows
        let (rows, selected): (Vec<usize>, Vec<InventoryRecord>) = records
            .iter()
            .enumerate()
            .filter(|(_, r)| self.params.accepts(r))
            .map(|(row, r)| (row, r.clone()))
            .unzip();
        debug!(
            selected = selected.len(),
            category = ?self.params.category,
            brand = ?self.params.brand,
            "filters applied"
        );

        if selected.is_empty() {
            info!("no records to plan; no replenishment required");
            return Ok(RunReport::empty());
        }

        let statuses: Vec<StockStatus> = selected.iter().map(classify).collect();

        let segmentation = Segmentation::from_records(&selected);
        debug!(
            products = segmentation.product_bands.len(),
            stores = segmentation.store_bands.len(),
            "segmentation done"
        );

        let need_records = self.compute_needs(&rows, &selected, &segmentation);
        let feasibility = dispatch_feasibility(&need_records, &pool);

        let results = allocate(need_records, pool);
        let summary = summarize(&results);

        info!(
            total_need = summary.total_need,
            total_shipped = summary.total_shipped,
            total_unmet = summary.total_unmet,
            fulfillment_rate = summary.fulfillment_rate,
            "run complete"
        );

        Ok(RunReport {
            status_breakdown: status_breakdown(&selected),
            markdown_candidates: markdown_candidates(&selected, MARKDOWN_CANDIDATE_LIMIT),
            results,
            statuses,
            summary,
            feasibility,
        })
    }

    fn compute_needs(
        &self,
        rows: &[usize],
        records: &[InventoryRecord],
        segmentation: &Segmentation,
    ) -> Vec<NeedRecord> {
        rows.iter()
            .zip(records)
            .map(|(&row, record)| {
                let (product_band, store_band) = segmentation.bands_for(record);
                let multipliers = self.policy.multipliers(product_band, store_band);
                compute_need(record, self.params.forward_cover_weeks, &multipliers)
                    .with_origin(row, product_band, store_band)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReplenishmentError;
    use crate::model::outcome::NeedType;
    use crate::strategy::implementations::{MultiplierOverrides, SegmentMatrix};
    use crate::strategy::segmentation::SegmentBand;
    use crate::strategy::traits::Multipliers;

    fn pool_with(lines: &[(&str, &str, f64)]) -> WarehouseStock {
        let mut pool = WarehouseStock::new();
        for &(w, p, units) in lines {
            pool.add(w, p, units).unwrap();
        }
        pool
    }

    #[test]
    fn single_line_run() {
        crate::logging::init_test();
        let engine = ReplenishmentEngine::new(RunParameters::default()).unwrap();
        let record = InventoryRecord::new("S1", "P1", "W1")
            .with_stock(2.0, 0.0)
            .with_sales_rate(5.0)
            .with_thresholds(3.0, 20.0)
            .with_target_cover(4.0);

        let report = engine
            .run(&[record], pool_with(&[("W1", "P1", 100.0)]))
            .unwrap();

        let result = &report.results[0];
        assert_eq!(result.need(), 33.0);
        assert_eq!(result.need_type(), NeedType::Replenishment);
        assert_eq!(result.shipped_units, 33.0);
        assert_eq!(report.statuses, vec![StockStatus::ReplenishmentRequired]);
        assert_eq!(report.summary.fulfillment_rate, 100.0);
    }

    #[test]
    fn filters_drop_records_before_segmentation() {
        let engine =
            ReplenishmentEngine::new(RunParameters::default().with_category("11")).unwrap();
        let records = vec![
            InventoryRecord::new("S1", "P1", "W1")
                .with_sales_rate(1.0)
                .with_category("11"),
            InventoryRecord::new("S1", "P2", "W1")
                .with_sales_rate(1.0)
                .with_category("14"),
        ];
        let report = engine.run(&records, WarehouseStock::new()).unwrap();
        assert_eq!(report.results.len(), 1);
        assert_eq!(report.results[0].product_id(), "P1");
    }

    #[test]
    fn filtered_results_keep_input_rows() {
        let engine =
            ReplenishmentEngine::new(RunParameters::default().with_category("11")).unwrap();
        let records = vec![
            InventoryRecord::new("S1", "P1", "W1")
                .with_thresholds(5.0, 20.0)
                .with_category("14"),
            InventoryRecord::new("S2", "P1", "W1")
                .with_thresholds(5.0, 20.0)
                .with_category("11"),
            InventoryRecord::new("S3", "P1", "W1")
                .with_thresholds(5.0, 20.0)
                .with_category("11"),
        ];
        let report = engine
            .run(&records, pool_with(&[("W1", "P1", 100.0)]))
            .unwrap();

        let rows: Vec<_> = report
            .results
            .iter()
            .map(|r| (r.store_id(), r.need_record.row))
            .collect();
        assert_eq!(rows, vec![("S2", 1), ("S3", 2)]);
    }

    #[test]
    fn everything_filtered_out_is_an_empty_report() {
        let engine = ReplenishmentEngine::new(RunParameters::default().with_brand("none")).unwrap();
        let records = vec![InventoryRecord::new("S1", "P1", "W1").with_sales_rate(3.0)];
        let report = engine.run(&records, WarehouseStock::new()).unwrap();
        assert!(report.results.is_empty());
        assert!(report.summary.no_replenishment_required);
    }

    #[test]
    fn invalid_record_fails_the_run() {
        let engine = ReplenishmentEngine::new(RunParameters::default()).unwrap();
        let records = vec![
            InventoryRecord::new("S1", "P1", "W1"),
            InventoryRecord::new("S1", "", "W1").with_stock(-1.0, 0.0),
        ];
        let err = engine.run(&records, WarehouseStock::new()).unwrap_err();
        match err {
            ReplenishmentError::Configuration(cfg) => {
                assert_eq!(cfg.issues.len(), 2);
                assert!(cfg.issues.iter().all(|i| i.row == 1));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn matrix_cell_selected_by_bands() {
        // product ratio 2/1 and store ratio 2/1 both land in 0-4
        let matrix = SegmentMatrix::new().with_cell(
            SegmentBand::UpTo4,
            SegmentBand::UpTo4,
            Multipliers::new(0.5, 2.0, 1.0),
        );
        let engine = ReplenishmentEngine::new(RunParameters::default().with_matrix(matrix)).unwrap();
        let record = InventoryRecord::new("S1", "P1", "W1")
            .with_stock(2.0, 0.0)
            .with_sales_rate(1.0);

        let report = engine.run(&[record], WarehouseStock::new()).unwrap();
        let nr = &report.results[0].need_record;
        assert_eq!(nr.product_band, Some(SegmentBand::UpTo4));
        assert_eq!(nr.store_band, Some(SegmentBand::UpTo4));
        assert_eq!(nr.rpt_need, 12.0); // 7 * 1 * 2 - 2
    }

    #[test]
    fn overrides_apply_over_defaults() {
        let params = RunParameters::default().with_overrides(MultiplierOverrides {
            min_ratio: Some(2.0),
            ..MultiplierOverrides::default()
        });
        let engine = ReplenishmentEngine::new(params).unwrap();
        let record = InventoryRecord::new("S1", "P1", "W1").with_thresholds(5.0, 20.0);

        let report = engine.run(&[record], WarehouseStock::new()).unwrap();
        let nr = &report.results[0].need_record;
        assert_eq!(nr.min_need, 10.0);
        assert_eq!(nr.need_type, NeedType::MinimumFloor);
        assert_eq!(report.results[0].unmet_units, 10.0);
    }

    #[test]
    fn invalid_parameters_are_rejected_up_front() {
        let err = ReplenishmentEngine::new(RunParameters::default().with_forward_cover(f64::NAN))
            .unwrap_err();
        assert!(matches!(err, ReplenishmentError::InvalidParameter { .. }));
    }
}
