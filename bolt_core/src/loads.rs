//! # Load Case
//!
//! In-plane shear and torsion applied to a bolt group, all referenced to the
//! group centroid. Torsion is positive counter-clockwise; no sign relation
//! between torsion and shear is assumed.
//!
//! ## Example
//!
//! ```rust
//! use bolt_core::loads::LoadCase;
//!
//! let load = LoadCase::new(0.0, -50.0, -200.0);
//! assert_eq!(load.resultant(), 50.0);
//!
//! // The load line sits 4" to the right of the centroid
//! let e = load.eccentricity();
//! assert!((e.ex - 4.0).abs() < 1e-12);
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{require_finite, CalcResult};
use crate::geometry::Point;

/// Applied loads at the bolt group centroid.
///
/// ## JSON Example
///
/// ```json
/// { "vx": 0.0, "vy": -50.0, "torsion": -200.0 }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LoadCase {
    /// Shear along X (kips)
    #[serde(default)]
    pub vx: f64,

    /// Shear along Y (kips)
    #[serde(default)]
    pub vy: f64,

    /// In-plane torsion about the centroid (kip-in, counter-clockwise positive)
    #[serde(default)]
    pub torsion: f64,
}

/// Location of the applied load line relative to the centroid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Eccentricity {
    /// Signed eccentricity, -T / |V|
    pub e: f64,
    /// X component, measured along the direction θ + 90°
    pub ex: f64,
    /// Y component, measured along the direction θ + 90°
    pub ey: f64,
}

impl LoadCase {
    pub fn new(vx: f64, vy: f64, torsion: f64) -> Self {
        LoadCase { vx, vy, torsion }
    }

    /// Validate that every component is finite.
    pub fn validate(&self) -> CalcResult<()> {
        require_finite("vx", self.vx)?;
        require_finite("vy", self.vy)?;
        require_finite("torsion", self.torsion)?;
        Ok(())
    }

    /// Magnitude of the applied shear
    pub fn resultant(&self) -> f64 {
        self.vx.hypot(self.vy)
    }

    /// Direction of the applied shear, degrees from +X
    pub fn angle_deg(&self) -> f64 {
        self.vy.atan2(self.vx).to_degrees()
    }

    /// True when there is nothing to distribute
    pub fn is_zero(&self) -> bool {
        self.vx == 0.0 && self.vy == 0.0 && self.torsion == 0.0
    }

    /// Point on the load line closest to the centroid.
    ///
    /// A shear `V` acting there produces the moment `T` about the centroid.
    /// Zero when there is no shear (pure torsion has no load line).
    pub fn eccentricity(&self) -> Eccentricity {
        let v = self.resultant();
        if v == 0.0 {
            return Eccentricity { e: 0.0, ex: 0.0, ey: 0.0 };
        }
        let e = -self.torsion / v;
        let normal = (self.angle_deg() + 90.0).to_radians();
        Eccentricity {
            e,
            ex: e * normal.cos(),
            ey: e * normal.sin(),
        }
    }

    /// Moment of the applied loads about an arbitrary point given relative to the centroid.
    pub fn moment_about(&self, point: Point) -> f64 {
        // (centroid - point) x V + T
        self.torsion - (point.x * self.vy - point.y * self.vx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_resultant_and_angle() {
        let load = LoadCase::new(30.0, 40.0, 0.0);
        assert_relative_eq!(load.resultant(), 50.0);
        assert_relative_eq!(load.angle_deg(), 53.130102354155978, epsilon = 1e-9);
        assert_relative_eq!(LoadCase::new(0.0, -50.0, 0.0).angle_deg(), -90.0);
    }

    #[test]
    fn test_eccentricity_reproduces_torsion() {
        let load = LoadCase::new(30.0, -50.0, -200.0);
        let e = load.eccentricity();
        assert_relative_eq!(e.e, 200.0 / load.resultant(), epsilon = 1e-12);

        // Shear applied at (ex, ey) must produce the torsion about the centroid
        let moment = e.ex * load.vy - e.ey * load.vx;
        assert_relative_eq!(moment, load.torsion, epsilon = 1e-9);
    }

    #[test]
    fn test_eccentricity_zero_without_shear() {
        let e = LoadCase::new(0.0, 0.0, 100.0).eccentricity();
        assert_eq!(e.e, 0.0);
        assert_eq!(e.ex, 0.0);
        assert_eq!(e.ey, 0.0);
    }

    #[test]
    fn test_moment_about_point() {
        let load = LoadCase::new(0.0, -50.0, -200.0);
        assert_relative_eq!(load.moment_about(Point::origin()), -200.0);
        // Point on the load line: no moment
        assert_relative_eq!(load.moment_about(Point::new(4.0, 0.0)), 0.0, epsilon = 1e-12);
        assert_relative_eq!(load.moment_about(Point::new(-2.0, 0.0)), -300.0, epsilon = 1e-12);
    }

    #[test]
    fn test_validate_rejects_nan() {
        assert!(LoadCase::new(f64::NAN, 0.0, 0.0).validate().is_err());
        assert!(LoadCase::new(0.0, 0.0, f64::INFINITY).validate().is_err());
        assert!(LoadCase::new(1.0, -2.0, 3.0).validate().is_ok());
    }

    #[test]
    fn test_is_zero() {
        assert!(LoadCase::default().is_zero());
        assert!(!LoadCase::new(0.0, 0.0, 3.0).is_zero());
        assert!(!LoadCase::new(1.0, -2.0, 3.0).is_zero());
    }
}
