//! # Instant Center of Rotation Method
//!
//! Under eccentric shear a bolt group rotates about an instant center (IC).
//! Each bolt deforms in proportion to its distance from the IC, perpendicular
//! to the line joining them, and carries a force given by the Crawford-Kulak
//! load-deformation curve (see [`curve`]). The IC is found where the bolt
//! forces balance the applied shear and torsion.
//!
//! For a trial IC at offset `o` from the centroid:
//!
//! ```text
//! ρi  = |di - o|               Δi = 0.34 · ρi / ρmax
//! Ri  = (1 - e^(-10Δi))^0.55   s  = Mo / Σ(Ri·ρi)
//! Fi  = s · Ri · (-eiy, eix) / ρi
//! ```
//!
//! where `Mo` is the moment of the applied loads about the IC and `s` plays
//! the role of the bolt ultimate strength needed to carry this load.
//!
//! Special cases:
//!
//! - A single bolt (or coincident bolts) takes the shear directly
//! - Shear without torsion, or torsion too small to pull the IC within
//!   [`IcrSettings::translation_radius_factor`] group radii, is pure
//!   translation: every bolt carries `V / n`
//! - A search that runs out of iterations fails with
//!   [`CalcError::ConvergenceFailed`]
//!
//! ## Example
//!
//! ```rust
//! use bolt_core::calculations::icr::{self, IcrSettings};
//! use bolt_core::geometry::{BoltGroup, Point};
//! use bolt_core::loads::LoadCase;
//!
//! let group = BoltGroup::grid(Point::new(0.0, 0.0), 3.0, 6.0, 2, 3).unwrap();
//! let load = LoadCase::new(0.0, -50.0, -200.0);
//!
//! let result = icr::solve(&group, &load, 17.9, &IcrSettings::default()).unwrap();
//! let ic = result.instant_center().unwrap();
//! assert!((ic.x + 0.3296).abs() < 1e-3);
//! assert!(result.max_utilization() < 1.0);
//! ```

pub mod curve;
mod search;

use serde::{Deserialize, Serialize};

use super::{validate_capacity, Method, MethodDetail, SolveResult};
use crate::errors::{CalcError, CalcResult};
use crate::geometry::{BoltGroup, Point};
use crate::loads::LoadCase;
use search::{Criteria, LineOutcome, Outcome, Search};

pub use search::Residual;

/// Convergence controls for the instant center search.
///
/// ## JSON Example
///
/// ```json
/// { "tolerance": 1e-6, "max_iterations": 200, "translation_radius_factor": 10000.0 }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IcrSettings {
    /// Relative tolerance on the force and moment residuals
    pub tolerance: f64,

    /// Maximum number of accepted trial instant centers. Jacobian and
    /// backtracking evaluations inside a Newton step are not counted.
    pub max_iterations: usize,

    /// IC distance, in group radii, beyond which the motion is translation
    pub translation_radius_factor: f64,
}

impl Default for IcrSettings {
    fn default() -> Self {
        IcrSettings {
            tolerance: 1e-6,
            max_iterations: 200,
            translation_radius_factor: 1e4,
        }
    }
}

impl IcrSettings {
    pub fn validate(&self) -> CalcResult<()> {
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(CalcError::invalid_input(
                "icr.tolerance",
                self.tolerance.to_string(),
                "Tolerance must be positive",
            ));
        }
        if self.max_iterations == 0 {
            return Err(CalcError::invalid_input(
                "icr.max_iterations",
                "0",
                "At least one iteration is required",
            ));
        }
        if !(self.translation_radius_factor.is_finite() && self.translation_radius_factor > 1.0) {
            return Err(CalcError::invalid_input(
                "icr.translation_radius_factor",
                self.translation_radius_factor.to_string(),
                "Translation radius factor must be greater than 1",
            ));
        }
        Ok(())
    }
}

/// How the ICR result was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IcrStatus {
    /// Search converged on an instant center
    Converged,
    /// No rotation: shear shared equally
    Translation,
    /// Single bolt or coincident bolts: load assigned directly
    SingleBolt,
}

impl IcrStatus {
    /// True only when an instant center was found
    pub fn is_converged(&self) -> bool {
        matches!(self, IcrStatus::Converged)
    }

    pub fn label(&self) -> &'static str {
        match self {
            IcrStatus::Converged => "converged",
            IcrStatus::Translation => "translation",
            IcrStatus::SingleBolt => "single bolt",
        }
    }
}

/// The converged instant center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InstantCenter {
    /// Absolute location
    pub x: f64,
    pub y: f64,
    /// Offset from the centroid
    pub dx: f64,
    pub dy: f64,
    /// Δmax / ρmax, deformation per unit distance from the IC (1/in · in)
    pub deformation_scale: f64,
    /// Trial instant centers evaluated
    pub iterations: usize,
    /// Final force residual
    pub residual: f64,
}

impl InstantCenter {
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// A bolt's state relative to the instant center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IcrBoltState {
    pub bolt: usize,
    /// ρ, distance to the IC
    pub distance: f64,
    /// Δ (in)
    pub deformation: f64,
    /// R / Rult
    pub force_ratio: f64,
    /// Moment of the bolt force about the IC
    pub moment: f64,
}

/// One step of the search, kept for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IcrTrial {
    pub iteration: usize,
    /// Trial IC offset from the centroid
    pub dx: f64,
    pub dy: f64,
    pub force_residual: f64,
    pub moment_residual: f64,
}

/// Connection strength implied by the ICR distribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConnectionStrength {
    /// Bolt ultimate strength needed to carry the load, |s|
    pub bolt_ultimate: f64,
    /// Connection coefficient C = demand / |s|
    pub coefficient: f64,
    /// C x bolt capacity
    pub connection_capacity: f64,
    /// |V|, or |T| for pure torsion
    pub connection_demand: f64,
    /// demand / capacity
    pub dcr: f64,
    /// Bolt capacity / governing bolt force
    pub strength_factor: f64,
}

/// ICR-specific output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IcrDetail {
    pub status: IcrStatus,
    /// `None` unless the search converged
    pub instant_center: Option<InstantCenter>,
    /// `None` when the bolts carry no force
    pub strength: Option<ConnectionStrength>,
    /// Per-bolt state about the IC, empty without rotation
    pub bolts: Vec<IcrBoltState>,
    pub trials: Vec<IcrTrial>,
}

/// Bolt forces for one trial instant center.
#[derive(Debug, Clone, PartialEq)]
pub struct IcEvaluation {
    pub forces: Vec<Point>,
    pub bolts: Vec<IcrBoltState>,
    /// Signed bolt ultimate strength `s`
    pub scale: f64,
    /// ρmax
    pub max_distance: f64,
    pub residual: Residual,
}

/// Distribute the load for an instant center at `ic` (offset from the centroid).
pub fn evaluate(group: &BoltGroup, load: &LoadCase, ic: Point) -> IcEvaluation {
    let max_distance = group
        .bolts()
        .iter()
        .map(|b| b.offset().distance_to(ic))
        .fold(0.0, f64::max);

    let mut bolts: Vec<IcrBoltState> = group
        .bolts()
        .iter()
        .map(|b| {
            let distance = b.offset().distance_to(ic);
            let deformation = curve::deformation(distance, max_distance);
            IcrBoltState {
                bolt: b.id,
                distance,
                deformation,
                force_ratio: curve::force_ratio(deformation),
                moment: 0.0,
            }
        })
        .collect();

    let resisting: f64 = bolts.iter().map(|s| s.force_ratio * s.distance).sum();
    let scale = if resisting > 0.0 {
        load.moment_about(ic) / resisting
    } else {
        0.0
    };

    let mut residual = Residual {
        fx: -load.vx,
        fy: -load.vy,
        moment: -load.torsion,
    };
    let forces = group
        .bolts()
        .iter()
        .zip(bolts.iter_mut())
        .map(|(b, state)| {
            if state.distance == 0.0 {
                return Point::origin();
            }
            let ex = b.dx - ic.x;
            let ey = b.dy - ic.y;
            let k = scale * state.force_ratio / state.distance;
            let force = Point::new(-k * ey, k * ex);
            state.moment = scale * state.force_ratio * state.distance;

            residual.fx += force.x;
            residual.fy += force.y;
            residual.moment += b.dx * force.y - b.dy * force.x;
            force
        })
        .collect();

    IcEvaluation {
        forces,
        bolts,
        scale,
        max_distance,
        residual,
    }
}

/// Solve bolt forces by the instant center of rotation method.
pub fn solve(
    group: &BoltGroup,
    load: &LoadCase,
    bolt_capacity: f64,
    settings: &IcrSettings,
) -> CalcResult<SolveResult> {
    load.validate()?;
    validate_capacity(bolt_capacity)?;
    settings.validate()?;

    if load.is_zero() {
        return Err(CalcError::NoLoadApplied);
    }
    if group.is_degenerate() {
        if load.torsion != 0.0 {
            tracing::warn!(torsion = load.torsion, "single bolt cannot resist torsion; ignored");
        }
        return uniform(group, load, bolt_capacity, IcrStatus::SingleBolt, &[]);
    }
    if load.torsion == 0.0 {
        tracing::debug!("no torsion, pure translation");
        return uniform(group, load, bolt_capacity, IcrStatus::Translation, &[]);
    }

    let radius = group.radius();
    let reference = load.resultant() + load.torsion.abs() / radius;
    let criteria = Criteria {
        force: settings.tolerance * reference,
        moment: settings.tolerance * reference * radius,
    };
    let mut search = Search::new(
        |ic| evaluate(group, load, ic).residual,
        criteria,
        settings.max_iterations,
        radius,
        settings.translation_radius_factor * radius,
    );

    let outcome = match locate(&mut search, group, load) {
        Ok(outcome) => outcome,
        Err(exhausted) => {
            let centroid = group.centroid();
            let error = CalcError::ConvergenceFailed {
                method: Method::InstantCenterOfRotation.name().to_string(),
                iterations: exhausted.iterations,
                residual: exhausted.residual.force_norm(),
                ic_x: centroid.x + exhausted.last.x,
                ic_y: centroid.y + exhausted.last.y,
            };
            tracing::warn!("{}", error);
            return Err(error);
        }
    };

    let trials: Vec<IcrTrial> = search
        .trials()
        .iter()
        .enumerate()
        .map(|(i, t)| IcrTrial {
            iteration: i + 1,
            dx: t.point.x,
            dy: t.point.y,
            force_residual: t.residual.force_norm(),
            moment_residual: t.residual.moment,
        })
        .collect();

    match outcome {
        Outcome::Converged(ic) => rotation(group, load, bolt_capacity, ic, trials),
        Outcome::Unbounded => {
            tracing::warn!(
                torsion = load.torsion,
                iterations = trials.len(),
                "instant center beyond translation limit, treating as pure translation"
            );
            uniform(group, load, bolt_capacity, IcrStatus::Translation, &trials)
        }
    }
}

/// Run the search: along the line perpendicular to the shear when there is
/// shear, from the centroid for pure torsion.
fn locate<F>(
    search: &mut Search<F>,
    group: &BoltGroup,
    load: &LoadCase,
) -> Result<Outcome, search::Exhausted>
where
    F: Fn(Point) -> Residual,
{
    let v = load.resultant();
    if v == 0.0 {
        let origin = Point::origin();
        let residual = search.probe(origin)?;
        return search.refine(origin, residual);
    }

    // The IC sits on the opposite side of the centroid from the load line;
    // the elastic center is a good first distance.
    let sign = load.torsion.signum();
    let direction = Point::new(-load.vy / v * sign, load.vx / v * sign);
    let axis = Point::new(load.vx / v, load.vy / v);
    let start = v * group.properties().j / (load.torsion.abs() * group.len() as f64);

    match search.along_line(direction, axis, start)? {
        LineOutcome::Converged(ic) => Ok(Outcome::Converged(ic)),
        LineOutcome::Unbounded => Ok(Outcome::Unbounded),
        LineOutcome::Stalled(ic, residual) => search.refine(ic, residual),
    }
}

fn rotation(
    group: &BoltGroup,
    load: &LoadCase,
    bolt_capacity: f64,
    ic: Point,
    trials: Vec<IcrTrial>,
) -> CalcResult<SolveResult> {
    let eval = evaluate(group, load, ic);
    let centroid = group.centroid();
    let instant_center = InstantCenter {
        x: centroid.x + ic.x,
        y: centroid.y + ic.y,
        dx: ic.x,
        dy: ic.y,
        deformation_scale: curve::ULTIMATE_DEFORMATION / eval.max_distance,
        iterations: trials.len(),
        residual: eval.residual.force_norm(),
    };

    tracing::info!(
        ic_x = instant_center.x,
        ic_y = instant_center.y,
        iterations = instant_center.iterations,
        "instant center converged"
    );

    let max_force = eval.forces.iter().map(Point::norm).fold(0.0, f64::max);
    let detail = IcrDetail {
        status: IcrStatus::Converged,
        instant_center: Some(instant_center),
        strength: connection_strength(load, eval.scale.abs(), max_force, bolt_capacity),
        bolts: eval.bolts,
        trials,
    };

    SolveResult::from_forces(
        Method::InstantCenterOfRotation,
        group,
        bolt_capacity,
        &eval.forces,
        MethodDetail::InstantCenter(detail),
    )
}

/// Every bolt carries `V / n`; torsion, if any, is not resisted.
fn uniform(
    group: &BoltGroup,
    load: &LoadCase,
    bolt_capacity: f64,
    status: IcrStatus,
    trials: &[IcrTrial],
) -> CalcResult<SolveResult> {
    let n = group.len() as f64;
    let share = Point::new(load.vx / n, load.vy / n);
    let forces = vec![share; group.len()];

    // All bolts deform equally; each is taken at Δmax
    let bolt_ultimate = share.norm() / curve::peak_ratio();
    let detail = IcrDetail {
        status,
        instant_center: None,
        strength: connection_strength(load, bolt_ultimate, share.norm(), bolt_capacity),
        bolts: Vec::new(),
        trials: trials.to_vec(),
    };

    SolveResult::from_forces(
        Method::InstantCenterOfRotation,
        group,
        bolt_capacity,
        &forces,
        MethodDetail::InstantCenter(detail),
    )
}

fn connection_strength(
    load: &LoadCase,
    bolt_ultimate: f64,
    max_force: f64,
    bolt_capacity: f64,
) -> Option<ConnectionStrength> {
    if bolt_ultimate <= 0.0 || max_force <= 0.0 {
        return None;
    }
    let v = load.resultant();
    let connection_demand = if v > 0.0 { v } else { load.torsion.abs() };
    let coefficient = connection_demand / bolt_ultimate;
    let connection_capacity = coefficient * bolt_capacity;
    Some(ConnectionStrength {
        bolt_ultimate,
        coefficient,
        connection_capacity,
        connection_demand,
        dcr: connection_demand / connection_capacity,
        strength_factor: bolt_capacity / max_force,
    })
}
