// src/strategy/implementations.rs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::strategy::segmentation::SegmentBand;
use crate::strategy::traits::{MultiplierPolicy, Multipliers};

// =========================================================================
// 1. Uniform Multipliers
// =========================================================================

/// Applies the same multipliers to every pairing.
/// Used when the run has no segment matrix.
#[derive(Debug, Clone, Default)]
pub struct UniformMultipliers {
    multipliers: Multipliers,
}

impl UniformMultipliers {
    pub fn new(multipliers: Multipliers) -> Self {
        Self { multipliers }
    }
}

impl MultiplierPolicy for UniformMultipliers {
    fn multipliers(&self, _product_band: SegmentBand, _store_band: SegmentBand) -> Multipliers {
        self.multipliers
    }
}

// =========================================================================
// 2. Segment Matrix
// =========================================================================

/// One cell of the segment matrix as written in configuration files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixEntry {
    pub product_band: SegmentBand,
    pub store_band: SegmentBand,
    #[serde(default = "default_swell")]
    pub swell: f64,
    #[serde(default = "default_stretch")]
    pub stretch: f64,
    #[serde(default = "default_min_ratio")]
    pub min_ratio: f64,
}

fn default_swell() -> f64 {
    Multipliers::DEFAULT_SWELL
}

fn default_stretch() -> f64 {
    Multipliers::DEFAULT_STRETCH
}

fn default_min_ratio() -> f64 {
    Multipliers::DEFAULT_MIN_RATIO
}

/// Product-band × store-band lookup of multipliers.
///
/// Cells that are not listed fall back to the defaults. Fast-moving pairings
/// can get a longer stretch, slow ones a tighter floor, without special cases
/// in the need formulas.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<MatrixEntry>", into = "Vec<MatrixEntry>")]
pub struct SegmentMatrix {
    cells: BTreeMap<(SegmentBand, SegmentBand), Multipliers>,
}

impl SegmentMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cell(
        mut self,
        product_band: SegmentBand,
        store_band: SegmentBand,
        multipliers: Multipliers,
    ) -> Self {
        self.cells.insert((product_band, store_band), multipliers);
        self
    }

    pub fn get(&self, product_band: SegmentBand, store_band: SegmentBand) -> Option<Multipliers> {
        self.cells.get(&(product_band, store_band)).copied()
    }

    /// First cell holding a negative or non-finite multiplier.
    pub fn invalid_cell(&self) -> Option<(SegmentBand, SegmentBand, &'static str)> {
        self.cells.iter().find_map(|(&(p, s), m)| {
            m.invalid_field().map(|field| (p, s, field))
        })
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl TryFrom<Vec<MatrixEntry>> for SegmentMatrix {
    type Error = String;

    fn try_from(entries: Vec<MatrixEntry>) -> Result<Self, Self::Error> {
        let mut cells = BTreeMap::new();
        for entry in entries {
            let key = (entry.product_band, entry.store_band);
            let value = Multipliers::new(entry.swell, entry.stretch, entry.min_ratio);
            if cells.insert(key, value).is_some() {
                return Err(format!(
                    "duplicate matrix cell for product band {} and store band {}",
                    key.0, key.1
                ));
            }
        }
        Ok(Self { cells })
    }
}

impl From<SegmentMatrix> for Vec<MatrixEntry> {
    fn from(matrix: SegmentMatrix) -> Self {
        matrix
            .cells
            .into_iter()
            .map(|((product_band, store_band), m)| MatrixEntry {
                product_band,
                store_band,
                swell: m.swell,
                stretch: m.stretch,
                min_ratio: m.min_ratio,
            })
            .collect()
    }
}

impl MultiplierPolicy for SegmentMatrix {
    fn multipliers(&self, product_band: SegmentBand, store_band: SegmentBand) -> Multipliers {
        self.get(product_band, store_band).unwrap_or_default()
    }
}

// =========================================================================
// 3. Run-level Overrides
// =========================================================================

/// Per-field values that replace whatever the underlying policy returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MultiplierOverrides {
    pub swell: Option<f64>,
    pub stretch: Option<f64>,
    pub min_ratio: Option<f64>,
}

impl MultiplierOverrides {
    pub fn is_empty(&self) -> bool {
        self.swell.is_none() && self.stretch.is_none() && self.min_ratio.is_none()
    }

    pub fn apply(&self, base: Multipliers) -> Multipliers {
        Multipliers {
            swell: self.swell.unwrap_or(base.swell),
            stretch: self.stretch.unwrap_or(base.stretch),
            min_ratio: self.min_ratio.unwrap_or(base.min_ratio),
        }
    }
}

/// Wraps another policy and applies run-level overrides on top of it.
#[derive(Debug)]
pub struct OverriddenPolicy {
    inner: Box<dyn MultiplierPolicy>,
    overrides: MultiplierOverrides,
}

impl OverriddenPolicy {
    pub fn new(inner: Box<dyn MultiplierPolicy>, overrides: MultiplierOverrides) -> Self {
        Self { inner, overrides }
    }
}

impl MultiplierPolicy for OverriddenPolicy {
    fn multipliers(&self, product_band: SegmentBand, store_band: SegmentBand) -> Multipliers {
        self.overrides
            .apply(self.inner.multipliers(product_band, store_band))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_ignores_bands() {
        let policy = UniformMultipliers::default();
        let m = policy.multipliers(SegmentBand::From20, SegmentBand::UpTo4);
        assert_eq!(m, Multipliers::new(0.5, 1.0, 1.0));
    }

    #[test]
    fn matrix_falls_back_to_defaults_for_missing_cells() {
        let matrix = SegmentMatrix::new().with_cell(
            SegmentBand::UpTo4,
            SegmentBand::From4To8,
            Multipliers::new(0.7, 1.4, 1.2),
        );
        assert_eq!(
            matrix.multipliers(SegmentBand::UpTo4, SegmentBand::From4To8),
            Multipliers::new(0.7, 1.4, 1.2)
        );
        assert_eq!(
            matrix.multipliers(SegmentBand::From4To8, SegmentBand::UpTo4),
            Multipliers::default()
        );
    }

    #[test]
    fn matrix_parses_from_entry_list() {
        let json = r#"[
            {"product_band": "0-4", "store_band": "0-4", "stretch": 1.5},
            {"product_band": "20+", "store_band": "8-12", "swell": 0.2, "stretch": 0.8, "min_ratio": 0.5}
        ]"#;
        let matrix: SegmentMatrix = serde_json::from_str(json).unwrap();
        assert_eq!(matrix.len(), 2);
        assert_eq!(
            matrix.get(SegmentBand::UpTo4, SegmentBand::UpTo4),
            Some(Multipliers::new(0.5, 1.5, 1.0))
        );
        assert_eq!(
            matrix.get(SegmentBand::From20, SegmentBand::From8To12),
            Some(Multipliers::new(0.2, 0.8, 0.5))
        );
    }

    #[test]
    fn matrix_rejects_duplicate_cells() {
        let json = r#"[
            {"product_band": "4-8", "store_band": "4-8"},
            {"product_band": "4-8", "store_band": "4-8", "stretch": 2.0}
        ]"#;
        let err = serde_json::from_str::<SegmentMatrix>(json).unwrap_err();
        assert!(err.to_string().contains("duplicate matrix cell"));
    }

    #[test]
    fn invalid_cell_is_found() {
        let matrix = SegmentMatrix::new().with_cell(
            SegmentBand::From12To15,
            SegmentBand::UpTo4,
            Multipliers::new(0.5, -1.0, 1.0),
        );
        assert_eq!(
            matrix.invalid_cell(),
            Some((SegmentBand::From12To15, SegmentBand::UpTo4, "stretch"))
        );
    }

    #[test]
    fn overrides_replace_only_the_fields_they_set() {
        let matrix = SegmentMatrix::new().with_cell(
            SegmentBand::UpTo4,
            SegmentBand::UpTo4,
            Multipliers::new(0.7, 1.4, 1.2),
        );
        let policy = OverriddenPolicy::new(
            Box::new(matrix),
            MultiplierOverrides {
                stretch: Some(2.0),
                ..MultiplierOverrides::default()
            },
        );
        assert_eq!(
            policy.multipliers(SegmentBand::UpTo4, SegmentBand::UpTo4),
            Multipliers::new(0.7, 2.0, 1.2)
        );
        assert_eq!(
            policy.multipliers(SegmentBand::From20, SegmentBand::From20),
            Multipliers::new(0.5, 2.0, 1.0)
        );
    }
}
