//! Bolt load-deformation relation (Crawford & Kulak, 1971).
//!
//! ```text
//! R = Rult · (1 - e^(-10Δ))^0.55        Δ in inches, Δmax = 0.34 in
//! ```
//!
//! The bolt farthest from the instant center is taken at `Δmax`; every other
//! bolt deforms in proportion to its distance from the instant center.

/// Deformation of the critical bolt at ultimate load (in)
pub const ULTIMATE_DEFORMATION: f64 = 0.34;

/// Decay coefficient μ (1/in)
const DECAY: f64 = 10.0;

/// Shape exponent λ
const EXPONENT: f64 = 0.55;

/// R / Rult for a bolt deformation `deformation` (in).
pub fn force_ratio(deformation: f64) -> f64 {
    if deformation <= 0.0 {
        return 0.0;
    }
    (1.0 - (-DECAY * deformation).exp()).powf(EXPONENT)
}

/// Deformation of a bolt at `distance` from the instant center when the
/// farthest bolt sits at `max_distance`.
pub fn deformation(distance: f64, max_distance: f64) -> f64 {
    if max_distance > 0.0 {
        ULTIMATE_DEFORMATION * distance / max_distance
    } else {
        0.0
    }
}

/// R / Rult reached by the critical bolt
pub fn peak_ratio() -> f64 {
    force_ratio(ULTIMATE_DEFORMATION)
}
