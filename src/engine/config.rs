// src/engine/config.rs

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ReplenishmentError, Result};
use crate::model::record::InventoryRecord;
use crate::strategy::implementations::{MultiplierOverrides, SegmentMatrix};
use crate::strategy::need::DEFAULT_FORWARD_COVER_WEEKS;

/// Parameters of one replenishment run.
///
/// Loadable from JSON; every field is optional there and falls back to the
/// values of [`RunParameters::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunParameters {
    /// Weeks of sales the replenishment need targets.
    pub forward_cover_weeks: f64,
    /// Keep only records of this category.
    pub category: Option<String>,
    /// Keep only records of this brand.
    pub brand: Option<String>,
    pub matrix: Option<SegmentMatrix>,
    pub overrides: MultiplierOverrides,
}

impl Default for RunParameters {
    fn default() -> Self {
        Self {
            forward_cover_weeks: DEFAULT_FORWARD_COVER_WEEKS,
            category: None,
            brand: None,
            matrix: None,
            overrides: MultiplierOverrides::default(),
        }
    }
}

impl RunParameters {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let params: RunParameters = serde_json::from_reader(reader)?;
        params.validate()?;
        Ok(params)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn with_forward_cover(mut self, weeks: f64) -> Self {
        self.forward_cover_weeks = weeks;
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    pub fn with_matrix(mut self, matrix: SegmentMatrix) -> Self {
        self.matrix = Some(matrix);
        self
    }

    pub fn with_overrides(mut self, overrides: MultiplierOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.forward_cover_weeks.is_finite() || self.forward_cover_weeks < 0.0 {
            return Err(ReplenishmentError::invalid_parameter(
                "forward_cover_weeks",
                format!("must be a finite number >= 0, got {}", self.forward_cover_weeks),
            ));
        }

        for (name, value) in [
            ("overrides.swell", self.overrides.swell),
            ("overrides.stretch", self.overrides.stretch),
            ("overrides.min_ratio", self.overrides.min_ratio),
        ] {
            if let Some(v) = value {
                if !v.is_finite() || v < 0.0 {
                    return Err(ReplenishmentError::invalid_parameter(
                        name,
                        format!("must be a finite number >= 0, got {v}"),
                    ));
                }
            }
        }

        if let Some((product_band, store_band, field)) =
            self.matrix.as_ref().and_then(SegmentMatrix::invalid_cell)
        {
            return Err(ReplenishmentError::invalid_parameter(
                "matrix",
                format!(
                    "{field} for product band {product_band} / store band {store_band} must be a finite number >= 0"
                ),
            ));
        }

        Ok(())
    }

    /// Whether a record passes the category and brand filters.
    ///
    /// A record without the attribute never matches a filter on it.
    pub fn accepts(&self, record: &InventoryRecord) -> bool {
        let matches = |filter: &Option<String>, value: &Option<String>| match filter {
            Some(wanted) => value.as_deref() == Some(wanted.as_str()),
            None => true,
        };
        matches(&self.category, &record.category_id) && matches(&self.brand, &record.brand_id)
    }
}

/// Reads a segment matrix from a JSON file.
pub fn load_matrix(path: impl AsRef<Path>) -> Result<SegmentMatrix> {
    let file = File::open(path)?;
    let matrix: SegmentMatrix = serde_json::from_reader(BufReader::new(file))?;
    if let Some((p, s, field)) = matrix.invalid_cell() {
        return Err(ReplenishmentError::invalid_parameter(
            "matrix",
            format!("{field} for product band {p} / store band {s} must be a finite number >= 0"),
        ));
    }
    Ok(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::segmentation::SegmentBand;
    use crate::strategy::traits::Multipliers;

    #[test]
    fn empty_json_gives_defaults() {
        let params = RunParameters::from_reader("{}".as_bytes()).unwrap();
        assert_eq!(params, RunParameters::default());
        assert_eq!(params.forward_cover_weeks, 7.0);
    }

    #[test]
    fn json_sets_filters_matrix_and_overrides() {
        let json = r#"{
            "forward_cover_weeks": 5,
            "category": "11",
            "matrix": [{"product_band": "0-4", "store_band": "4-8", "stretch": 1.2}],
            "overrides": {"min_ratio": 1.5}
        }"#;
        let params = RunParameters::from_reader(json.as_bytes()).unwrap();
        assert_eq!(params.forward_cover_weeks, 5.0);
        assert_eq!(params.category.as_deref(), Some("11"));
        assert_eq!(params.brand, None);
        assert_eq!(params.overrides.min_ratio, Some(1.5));
        let matrix = params.matrix.unwrap();
        assert_eq!(
            matrix.get(SegmentBand::UpTo4, SegmentBand::From4To8),
            Some(Multipliers::new(0.5, 1.2, 1.0))
        );
    }

    #[test]
    fn negative_forward_cover_is_rejected() {
        let err = RunParameters::default()
            .with_forward_cover(-1.0)
            .validate()
            .unwrap_err();
        assert!(matches!(
            err,
            ReplenishmentError::InvalidParameter { name: "forward_cover_weeks", .. }
        ));
    }

    #[test]
    fn bad_override_and_matrix_cell_are_rejected() {
        let params = RunParameters::default().with_overrides(MultiplierOverrides {
            stretch: Some(f64::NAN),
            ..MultiplierOverrides::default()
        });
        assert!(params.validate().is_err());

        let params = RunParameters::default().with_matrix(SegmentMatrix::new().with_cell(
            SegmentBand::From20,
            SegmentBand::From20,
            Multipliers::new(-0.5, 1.0, 1.0),
        ));
        let err = params.validate().unwrap_err();
        assert!(err.to_string().contains("swell for product band 20+ / store band 20+"));
    }

    #[test]
    fn filters_require_matching_attribute() {
        let params = RunParameters::default().with_category("11").with_brand("B1");
        let hit = InventoryRecord::new("S", "P", "W")
            .with_category("11")
            .with_brand("B1");
        let wrong_brand = hit.clone().with_brand("B2");
        let no_category = InventoryRecord::new("S", "P", "W").with_brand("B1");

        assert!(params.accepts(&hit));
        assert!(!params.accepts(&wrong_brand));
        assert!(!params.accepts(&no_category));
        assert!(RunParameters::default().accepts(&no_category));
    }
}
