// src/model/units.rs

//! Stock moves in whole units.
//!
//! Needs round up and warehouse stock rounds down before allocation, so every
//! shipped, unmet and pooled quantity is an integer-valued `f64` and their sums
//! and differences are exact.

/// Relative distance from a whole number below which a value snaps to it.
const SNAP: f64 = 1e-9;

fn snapped(value: f64) -> Option<f64> {
    let nearest = value.round();
    ((value - nearest).abs() <= SNAP * value.abs().max(1.0)).then_some(nearest)
}

/// Smallest whole number of units covering `value`.
///
/// Values within float noise of a whole number snap to it, so `42.00000000000001`
/// is 42 and not 43.
pub fn ceil_units(value: f64) -> f64 {
    snapped(value).unwrap_or_else(|| value.ceil())
}

/// Largest whole number of units contained in `value`.
pub fn floor_units(value: f64) -> f64 {
    snapped(value).unwrap_or_else(|| value.floor())
}
