//! # Bolt Force Calculations
//!
//! Each method is a pure function of an immutable [`BoltGroup`], a
//! [`LoadCase`] and a bolt capacity, returning a fresh [`SolveResult`]:
//!
//! - [`elastic`] - Elastic Method, superposition of direct and torsional shear
//! - [`ecr`] - Elastic Method, rotation about the elastic center
//! - [`icr`] - Instant Center of Rotation Method (Crawford & Kulak / Brandt)
//!
//! Bolt forces are the forces the connected plate delivers to each bolt, in
//! the same sense as the applied load. At equilibrium `ΣFx = Vx`, `ΣFy = Vy`
//! and `Σ(dx·Fy - dy·Fx) = T`.
//!
//! [`BoltGroup`]: crate::geometry::BoltGroup
//! [`LoadCase`]: crate::loads::LoadCase

pub mod ecr;
pub mod elastic;
pub mod icr;

use serde::{Deserialize, Serialize};

use crate::errors::{require_finite, CalcError, CalcResult};
use crate::geometry::{BoltGroup, Point};

pub use ecr::EcrDetail;
pub use elastic::ElasticComponents;
pub use icr::{IcrDetail, IcrSettings, IcrStatus, InstantCenter};

/// Analysis method identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Method {
    /// Elastic Method - Superposition
    ElasticSuperposition,
    /// Elastic Method - Center of Rotation
    ElasticCenterOfRotation,
    /// Instant Center of Rotation Method
    InstantCenterOfRotation,
}

impl Method {
    /// All methods in reporting order
    pub const ALL: [Method; 3] = [
        Method::ElasticSuperposition,
        Method::ElasticCenterOfRotation,
        Method::InstantCenterOfRotation,
    ];

    /// Display name
    pub fn name(&self) -> &'static str {
        match self {
            Method::ElasticSuperposition => "Elastic Method - Superposition",
            Method::ElasticCenterOfRotation => "Elastic Method - Center of Rotation",
            Method::InstantCenterOfRotation => "Instant Center of Rotation Method",
        }
    }

    /// File stem used when exporting the bolt force table
    pub fn file_stem(&self) -> &'static str {
        match self {
            Method::ElasticSuperposition => "bolt_force_elastic",
            Method::ElasticCenterOfRotation => "bolt_force_ecr",
            Method::InstantCenterOfRotation => "bolt_force_icr",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Force carried by one bolt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoltForce {
    /// Bolt id (zero-based)
    pub bolt: usize,
    pub x: f64,
    pub y: f64,
    /// Offset from centroid, kept for moment checks
    pub dx: f64,
    pub dy: f64,
    pub fx: f64,
    pub fy: f64,
    /// √(fx² + fy²)
    pub resultant: f64,
    /// resultant / bolt capacity
    pub utilization: f64,
    /// Direction of the force, degrees from +X
    pub angle_deg: f64,
    /// Contribution to the moment about the centroid, dx·fy - dy·fx
    pub moment: f64,
}

/// The bolt with the highest utilization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Governing {
    pub bolt: usize,
    pub resultant: f64,
    pub utilization: f64,
}

/// Sums over all bolts, the "Total" row of a force table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Equilibrium {
    pub fx: f64,
    pub fy: f64,
    /// Moment about the centroid
    pub moment: f64,
}

/// Method-specific data carried alongside the common force table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum MethodDetail {
    Elastic(elastic::ElasticDetail),
    CenterOfRotation(EcrDetail),
    InstantCenter(IcrDetail),
}

/// Result of one method applied to one load case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveResult {
    pub method: Method,
    pub bolt_capacity: f64,
    /// One row per bolt, in bolt id order
    pub forces: Vec<BoltForce>,
    pub governing: Governing,
    pub detail: MethodDetail,
}

impl SolveResult {
    /// Assemble rows and the governing bolt from raw force vectors.
    ///
    /// `forces` must be in bolt id order. Ties for the governing bolt go to
    /// the lowest id.
    pub(crate) fn from_forces(
        method: Method,
        group: &BoltGroup,
        bolt_capacity: f64,
        forces: &[Point],
        detail: MethodDetail,
    ) -> CalcResult<Self> {
        if forces.len() != group.len() {
            return Err(CalcError::Internal {
                message: format!("{} forces for {} bolts", forces.len(), group.len()),
            });
        }

        let rows: Vec<BoltForce> = group
            .bolts()
            .iter()
            .zip(forces)
            .map(|(bolt, f)| {
                let resultant = f.norm();
                BoltForce {
                    bolt: bolt.id,
                    x: bolt.x,
                    y: bolt.y,
                    dx: bolt.dx,
                    dy: bolt.dy,
                    fx: f.x,
                    fy: f.y,
                    resultant,
                    utilization: resultant / bolt_capacity,
                    angle_deg: f.y.atan2(f.x).to_degrees(),
                    moment: bolt.dx * f.y - bolt.dy * f.x,
                }
            })
            .collect();

        let mut governing = Governing {
            bolt: rows[0].bolt,
            resultant: rows[0].resultant,
            utilization: rows[0].utilization,
        };
        for row in &rows[1..] {
            if row.utilization > governing.utilization {
                governing = Governing {
                    bolt: row.bolt,
                    resultant: row.resultant,
                    utilization: row.utilization,
                };
            }
        }

        Ok(SolveResult {
            method,
            bolt_capacity,
            forces: rows,
            governing,
            detail,
        })
    }

    /// Sum of forces and moments over all bolts
    pub fn equilibrium(&self) -> Equilibrium {
        Equilibrium {
            fx: self.forces.iter().map(|f| f.fx).sum(),
            fy: self.forces.iter().map(|f| f.fy).sum(),
            moment: self.forces.iter().map(|f| f.moment).sum(),
        }
    }

    /// Highest utilization in the group
    pub fn max_utilization(&self) -> f64 {
        self.governing.utilization
    }

    /// True when no bolt exceeds its capacity
    pub fn passes(&self) -> bool {
        self.governing.utilization <= 1.0
    }

    /// Instant center, ICR results only
    pub fn instant_center(&self) -> Option<&InstantCenter> {
        match &self.detail {
            MethodDetail::InstantCenter(detail) => detail.instant_center.as_ref(),
            _ => None,
        }
    }

    /// ICR detail, if this is an ICR result
    pub fn icr(&self) -> Option<&IcrDetail> {
        match &self.detail {
            MethodDetail::InstantCenter(detail) => Some(detail),
            _ => None,
        }
    }

    /// Convergence status: closed-form methods always converge
    pub fn converged(&self) -> bool {
        match &self.detail {
            MethodDetail::InstantCenter(detail) => detail.status.is_converged(),
            _ => true,
        }
    }
}

/// Validate the bolt capacity shared by every method.
pub(crate) fn validate_capacity(bolt_capacity: f64) -> CalcResult<()> {
    require_finite("bolt_capacity", bolt_capacity)?;
    if bolt_capacity <= 0.0 {
        return Err(CalcError::invalid_input(
            "bolt_capacity",
            bolt_capacity.to_string(),
            "Bolt capacity must be positive",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn two_bolts() -> BoltGroup {
        BoltGroup::from_points(&[Point::new(0.0, 0.0), Point::new(4.0, 0.0)]).unwrap()
    }

    fn detail() -> MethodDetail {
        MethodDetail::Elastic(elastic::ElasticDetail { components: vec![] })
    }

    #[test]
    fn test_rows_and_governing() {
        let forces = [Point::new(3.0, 4.0), Point::new(0.0, -8.0)];
        let result =
            SolveResult::from_forces(Method::ElasticSuperposition, &two_bolts(), 10.0, &forces, detail()).unwrap();

        assert_eq!(result.forces.len(), 2);
        assert_relative_eq!(result.forces[0].resultant, 5.0);
        assert_relative_eq!(result.forces[0].utilization, 0.5);
        assert_eq!(result.governing.bolt, 1);
        assert_relative_eq!(result.max_utilization(), 0.8);
        assert!(result.passes());
        assert_relative_eq!(result.forces[1].angle_deg, -90.0);
    }

    #[test]
    fn test_governing_tie_goes_to_lowest_id() {
        let forces = [Point::new(0.0, 5.0), Point::new(0.0, -5.0)];
        let result =
            SolveResult::from_forces(Method::ElasticSuperposition, &two_bolts(), 10.0, &forces, detail()).unwrap();
        assert_eq!(result.governing.bolt, 0);
    }

    #[test]
    fn test_equilibrium_sums() {
        // dx = -2 and +2 about the centroid at (2, 0)
        let forces = [Point::new(1.0, -5.0), Point::new(1.0, 5.0)];
        let result =
            SolveResult::from_forces(Method::ElasticSuperposition, &two_bolts(), 10.0, &forces, detail()).unwrap();
        let total = result.equilibrium();
        assert_relative_eq!(total.fx, 2.0);
        assert_relative_eq!(total.fy, 0.0);
        assert_relative_eq!(total.moment, 20.0);
    }

    #[test]
    fn test_force_count_mismatch_is_internal_error() {
        let err = SolveResult::from_forces(
            Method::ElasticSuperposition,
            &two_bolts(),
            10.0,
            &[Point::origin()],
            detail(),
        )
        .unwrap_err();
        assert_eq!(err.error_code(), "INTERNAL_ERROR");
    }

    #[test]
    fn test_capacity_validation() {
        assert!(validate_capacity(17.9).is_ok());
        assert!(validate_capacity(0.0).is_err());
        assert!(validate_capacity(-1.0).is_err());
        assert!(validate_capacity(f64::NAN).is_err());
    }

    #[test]
    fn test_method_names() {
        assert_eq!(Method::InstantCenterOfRotation.to_string(), "Instant Center of Rotation Method");
        assert_eq!(Method::ElasticSuperposition.file_stem(), "bolt_force_elastic");
        assert_eq!(Method::ALL.len(), 3);
    }
}
