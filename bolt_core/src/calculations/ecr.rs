//! # Elastic Method - Center of Rotation
//!
//! The elastic superposition result is a rigid rotation about a single point,
//! the elastic center of rotation (ECR). It lies on the line through the
//! centroid perpendicular to the shear, at
//!
//! ```text
//! (-Vy·J / (T·n),  Vx·J / (T·n))   relative to the centroid
//! ```
//!
//! Rotating about the ECR gives the same bolt forces as superposition, and it
//! yields the elastic connection coefficient
//!
//! ```text
//! Ce = Σd² / (e'·dmax)
//! ```
//!
//! where `d` is a bolt's distance to the ECR and `e'` the distance from the
//! ECR to the load line. For pure torsion `Ce = Σd² / dmax`, a length.
//!
//! The method needs torsion and a non-zero polar moment; [`solve`] returns
//! `None` otherwise.

use serde::{Deserialize, Serialize};

use super::{validate_capacity, Method, MethodDetail, SolveResult};
use crate::errors::CalcResult;
use crate::geometry::{BoltGroup, Point};
use crate::loads::LoadCase;

/// Summary of the elastic center of rotation solution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EcrDetail {
    /// Absolute location of the ECR
    pub center: Point,
    /// ECR relative to the centroid
    pub offset: Point,
    /// Distance from the ECR to the load line (zero for pure torsion)
    pub eccentricity: f64,
    /// Elastic coefficient Ce
    pub coefficient: f64,
    /// Ce x bolt capacity
    pub connection_capacity: f64,
    /// |V|, or |T| for pure torsion
    pub connection_demand: f64,
    /// demand / capacity
    pub dcr: f64,
}

/// Whether the ECR exists for this group and load.
pub fn is_applicable(group: &BoltGroup, load: &LoadCase) -> bool {
    load.torsion != 0.0 && !group.is_degenerate()
}

/// Location of the ECR relative to the centroid.
///
/// Callers must check [`is_applicable`] first.
pub fn center_offset(group: &BoltGroup, load: &LoadCase) -> Point {
    let n = group.len() as f64;
    let j = group.properties().j;
    Point::new(
        -load.vy * j / (load.torsion * n),
        load.vx * j / (load.torsion * n),
    )
}

/// Solve bolt forces as a rigid rotation about the elastic center.
pub fn solve(group: &BoltGroup, load: &LoadCase, bolt_capacity: f64) -> CalcResult<Option<SolveResult>> {
    load.validate()?;
    validate_capacity(bolt_capacity)?;

    if !is_applicable(group, load) {
        tracing::debug!("elastic center of rotation not applicable");
        return Ok(None);
    }

    let j = group.properties().j;
    let k = load.torsion / j;
    let offset = center_offset(group, load);

    let mut sum_d2 = 0.0;
    let mut d_max: f64 = 0.0;
    let forces: Vec<Point> = group
        .bolts()
        .iter()
        .map(|bolt| {
            let dx = bolt.dx - offset.x;
            let dy = bolt.dy - offset.y;
            let d2 = dx * dx + dy * dy;
            sum_d2 += d2;
            d_max = d_max.max(d2.sqrt());
            Point::new(-k * dy, k * dx)
        })
        .collect();

    let v = load.resultant();
    let (eccentricity, coefficient, connection_demand) = if v == 0.0 {
        (0.0, sum_d2 / d_max, load.torsion.abs())
    } else {
        let eccentricity = load.moment_about(offset).abs() / v;
        (eccentricity, sum_d2 / (eccentricity * d_max), v)
    };
    let connection_capacity = coefficient * bolt_capacity;

    let centroid = group.centroid();
    let detail = EcrDetail {
        center: Point::new(centroid.x + offset.x, centroid.y + offset.y),
        offset,
        eccentricity,
        coefficient,
        connection_capacity,
        connection_demand,
        dcr: connection_demand / connection_capacity,
    };

    tracing::debug!(
        ecr_x = detail.center.x,
        ecr_y = detail.center.y,
        ce = coefficient,
        "elastic center of rotation solved"
    );

    SolveResult::from_forces(
        Method::ElasticCenterOfRotation,
        group,
        bolt_capacity,
        &forces,
        MethodDetail::CenterOfRotation(detail),
    )
    .map(Some)
}
