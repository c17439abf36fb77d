//! # Elastic Method - Superposition
//!
//! Closed-form distribution: every bolt takes an equal share of the direct
//! shear, plus a torsional share proportional to its distance from the
//! centroid and perpendicular to its radius vector.
//!
//! ```text
//! direct:    Fx = Vx / n          Fy = Vy / n
//! torsion:   Fx = -T·dy / J       Fy = T·dx / J
//! ```
//!
//! When `J = 0` (single bolt) the torsional term is dropped and the bolt
//! carries the full shear.
//!
//! ## Example
//!
//! ```rust
//! use bolt_core::calculations::elastic;
//! use bolt_core::geometry::{BoltGroup, Point};
//! use bolt_core::loads::LoadCase;
//!
//! let group = BoltGroup::grid(Point::new(0.0, 0.0), 3.0, 6.0, 2, 3).unwrap();
//! let load = LoadCase::new(0.0, -50.0, -200.0);
//!
//! let result = elastic::solve(&group, &load, 17.9).unwrap();
//! assert_eq!(result.forces.len(), 6);
//! assert!((result.equilibrium().fy + 50.0).abs() < 1e-9);
//! ```

use serde::{Deserialize, Serialize};

use super::{validate_capacity, Method, MethodDetail, SolveResult};
use crate::errors::CalcResult;
use crate::geometry::{BoltGroup, Point};
use crate::loads::LoadCase;

/// Direct and torsional parts of one bolt's force.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElasticComponents {
    pub vx_direct: f64,
    pub vy_direct: f64,
    pub vx_torsion: f64,
    pub vy_torsion: f64,
}

/// Per-bolt breakdown, in bolt id order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElasticDetail {
    pub components: Vec<ElasticComponents>,
}

/// Split each bolt's force into its direct and torsional parts.
pub fn components(group: &BoltGroup, load: &LoadCase) -> Vec<ElasticComponents> {
    let n = group.len() as f64;
    let j = group.properties().j;
    let torsional = !group.is_degenerate();

    group
        .bolts()
        .iter()
        .map(|bolt| {
            let (vx_torsion, vy_torsion) = if torsional {
                (-load.torsion * bolt.dy / j, load.torsion * bolt.dx / j)
            } else {
                (0.0, 0.0)
            };
            ElasticComponents {
                vx_direct: load.vx / n,
                vy_direct: load.vy / n,
                vx_torsion,
                vy_torsion,
            }
        })
        .collect()
}

/// Solve bolt forces by elastic superposition.
///
/// Fails only on invalid input (non-finite load, non-positive capacity).
pub fn solve(group: &BoltGroup, load: &LoadCase, bolt_capacity: f64) -> CalcResult<SolveResult> {
    load.validate()?;
    validate_capacity(bolt_capacity)?;

    let components = components(group, load);
    let forces: Vec<Point> = components
        .iter()
        .map(|c| Point::new(c.vx_direct + c.vx_torsion, c.vy_direct + c.vy_torsion))
        .collect();

    let result = SolveResult::from_forces(
        Method::ElasticSuperposition,
        group,
        bolt_capacity,
        &forces,
        MethodDetail::Elastic(ElasticDetail { components }),
    )?;

    tracing::debug!(
        governing = result.governing.bolt,
        utilization = result.governing.utilization,
        "elastic superposition solved"
    );

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn reference_group() -> BoltGroup {
        BoltGroup::grid(Point::new(0.0, 0.0), 3.0, 6.0, 2, 3).unwrap()
    }

    #[test]
    fn test_reference_scenario() {
        let group = reference_group();
        let load = LoadCase::new(0.0, -50.0, -200.0);
        let result = solve(&group, &load, 17.9).unwrap();

        // Right-hand corners: Fx = ±200·3/49.5, Fy = -50/6 - 200·1.5/49.5
        let corner = result.forces[3];
        assert_relative_eq!(corner.fx, -600.0 / 49.5, epsilon = 1e-9);
        assert_relative_eq!(corner.fy, -50.0 / 6.0 - 300.0 / 49.5, epsilon = 1e-9);
        assert_relative_eq!(corner.resultant, 18.8178, epsilon = 1e-4);

        // Bolts 3 and 5 tie exactly; lowest id governs
        assert_eq!(result.governing.bolt, 3);
        assert_relative_eq!(result.governing.utilization, 1.05127, epsilon = 1e-5);
        assert!(!result.passes());
    }

    #[test]
    fn test_equilibrium() {
        let group = reference_group();
        let load = LoadCase::new(12.0, -50.0, 175.0);
        let total = solve(&group, &load, 17.9).unwrap().equilibrium();

        assert_relative_eq!(total.fx, 12.0, epsilon = 1e-9);
        assert_relative_eq!(total.fy, -50.0, epsilon = 1e-9);
        assert_relative_eq!(total.moment, 175.0, epsilon = 1e-9);
    }

    #[test]
    fn test_pure_shear_is_uniform() {
        let group = reference_group();
        let load = LoadCase::new(6.0, -30.0, 0.0);
        let result = solve(&group, &load, 17.9).unwrap();

        for row in &result.forces {
            assert_relative_eq!(row.fx, 1.0, epsilon = 1e-12);
            assert_relative_eq!(row.fy, -5.0, epsilon = 1e-12);
        }
        assert_eq!(result.governing.bolt, 0);
    }

    #[test]
    fn test_single_bolt_takes_full_shear() {
        let group = BoltGroup::grid(Point::new(1.0, 1.0), 3.0, 6.0, 1, 1).unwrap();
        let load = LoadCase::new(30.0, -40.0, 500.0);
        let result = solve(&group, &load, 100.0).unwrap();

        assert_relative_eq!(result.forces[0].fx, 30.0);
        assert_relative_eq!(result.forces[0].fy, -40.0);
        assert_relative_eq!(result.forces[0].resultant, 50.0, epsilon = 1e-12);
        assert_relative_eq!(result.governing.utilization, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_utilization_grows_with_torsion() {
        let group = reference_group();
        let mut last = 0.0;
        for torsion in [0.0, 50.0, 100.0, 200.0, 400.0] {
            let result = solve(&group, &LoadCase::new(0.0, -50.0, -torsion), 17.9).unwrap();
            assert!(result.max_utilization() > last);
            last = result.max_utilization();
        }
    }

    #[test]
    fn test_components_breakdown() {
        let group = reference_group();
        let comps = components(&group, &LoadCase::new(0.0, -60.0, 99.0));
        assert_relative_eq!(comps[0].vy_direct, -10.0);
        // bolt 0 at dx = -1.5, dy = -3: torsion Fx = 99·3/49.5 = 6, Fy = -99·1.5/49.5 = -3
        assert_relative_eq!(comps[0].vx_torsion, 6.0, epsilon = 1e-12);
        assert_relative_eq!(comps[0].vy_torsion, -3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_invalid_capacity() {
        let group = reference_group();
        let err = solve(&group, &LoadCase::new(0.0, -50.0, 0.0), 0.0).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }
}
