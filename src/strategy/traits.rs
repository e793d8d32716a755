// src/strategy/traits.rs

use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::strategy::segmentation::SegmentBand;

/// Multipliers that scale the need formulas for one product/store pairing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Multipliers {
    /// Carried for callers outside the need formulas; not used by them.
    pub swell: f64,
    /// Scales the forward-cover target.
    pub stretch: f64,
    /// Scales the minimum stocking floor.
    pub min_ratio: f64,
}

impl Multipliers {
    pub const DEFAULT_SWELL: f64 = 0.5;
    pub const DEFAULT_STRETCH: f64 = 1.0;
    pub const DEFAULT_MIN_RATIO: f64 = 1.0;

    pub fn new(swell: f64, stretch: f64, min_ratio: f64) -> Self {
        Self {
            swell,
            stretch,
            min_ratio,
        }
    }

    /// Name of the first field that is negative or not finite.
    pub fn invalid_field(&self) -> Option<&'static str> {
        [
            ("swell", self.swell),
            ("stretch", self.stretch),
            ("min_ratio", self.min_ratio),
        ]
        .into_iter()
        .find(|(_, v)| !v.is_finite() || *v < 0.0)
        .map(|(name, _)| name)
    }
}

impl Default for Multipliers {
    fn default() -> Self {
        Self {
            swell: Self::DEFAULT_SWELL,
            stretch: Self::DEFAULT_STRETCH,
            min_ratio: Self::DEFAULT_MIN_RATIO,
        }
    }
}

/// Decides which multipliers apply to a product band / store band pairing.
///
/// We require `Debug` so the engine can log the active policy, and
/// `Send + Sync` so one engine can be shared by request handlers.
pub trait MultiplierPolicy: Debug + Send + Sync {
    fn multipliers(&self, product_band: SegmentBand, store_band: SegmentBand) -> Multipliers;
}
