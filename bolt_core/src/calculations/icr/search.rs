//! Instant center search.
//!
//! The search only sees a residual function of the trial instant center; the
//! force distribution itself lives in the parent module. Two stages:
//!
//! 1. **Line search.** For a non-zero shear the instant center lies close to
//!    the line through the centroid perpendicular to the shear, on the side
//!    opposite the load line. The force residual along the shear is bracketed
//!    by doubling the distance from a starting guess, then closed by Illinois
//!    regula falsi.
//! 2. **Newton refinement.** A damped two-dimensional Newton step on the force
//!    residual, with a central finite-difference Jacobian. Used for pure
//!    torsion and whenever the line search leaves a residual across the shear.
//!
//! Every accepted trial counts against a fixed iteration budget. The
//! Jacobian and backtracking evaluations of a Newton step do not; they are
//! bounded per step instead.

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Out-of-balance forces for a trial instant center: bolt force sums minus
/// the applied load, moment about the centroid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Residual {
    pub fx: f64,
    pub fy: f64,
    pub moment: f64,
}

impl Residual {
    /// Magnitude of the force imbalance
    pub fn force_norm(&self) -> f64 {
        self.fx.hypot(self.fy)
    }

    fn along(&self, axis: Point) -> f64 {
        self.fx * axis.x + self.fy * axis.y
    }
}

/// Absolute convergence limits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Criteria {
    pub force: f64,
    pub moment: f64,
}

impl Criteria {
    pub fn met(&self, residual: &Residual) -> bool {
        residual.force_norm() <= self.force && residual.moment.abs() <= self.moment
    }
}

/// One evaluated trial.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Trial {
    pub point: Point,
    pub residual: Residual,
}

/// Result of the line search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum LineOutcome {
    Converged(Point),
    /// Residual along the line resolved without meeting the criteria
    Stalled(Point, Residual),
    /// No sign change within the distance limit
    Unbounded,
}

/// Result of the Newton refinement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Outcome {
    Converged(Point),
    Unbounded,
}

/// The search gave up: budget spent or singular Jacobian.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Exhausted {
    pub iterations: usize,
    pub last: Point,
    pub residual: Residual,
}

const MAX_BACKTRACKS: usize = 30;
const JACOBIAN_STEP: f64 = 1e-7;

pub(crate) struct Search<F> {
    evaluate: F,
    criteria: Criteria,
    max_iterations: usize,
    /// Characteristic length of the group
    length: f64,
    /// Distance beyond which the motion is treated as translation
    limit: f64,
    trials: Vec<Trial>,
}

impl<F> Search<F>
where
    F: Fn(Point) -> Residual,
{
    pub fn new(evaluate: F, criteria: Criteria, max_iterations: usize, length: f64, limit: f64) -> Self {
        Search {
            evaluate,
            criteria,
            max_iterations,
            length,
            limit,
            trials: Vec::new(),
        }
    }

    pub fn trials(&self) -> &[Trial] {
        &self.trials
    }

    fn exhausted(&self) -> Exhausted {
        let (last, residual) = match self.trials.last() {
            Some(t) => (t.point, t.residual),
            None => (
                Point::origin(),
                Residual {
                    fx: f64::NAN,
                    fy: f64::NAN,
                    moment: f64::NAN,
                },
            ),
        };
        Exhausted {
            iterations: self.trials.len(),
            last,
            residual,
        }
    }

    fn record(&mut self, point: Point, residual: Residual) -> Result<(), Exhausted> {
        if self.trials.len() >= self.max_iterations {
            return Err(self.exhausted());
        }
        tracing::debug!(
            iteration = self.trials.len() + 1,
            x = point.x,
            y = point.y,
            force = residual.force_norm(),
            moment = residual.moment,
            "icr trial"
        );
        self.trials.push(Trial { point, residual });
        Ok(())
    }

    /// Evaluate and record one trial.
    pub fn probe(&mut self, point: Point) -> Result<Residual, Exhausted> {
        if self.trials.len() >= self.max_iterations {
            return Err(self.exhausted());
        }
        let residual = (self.evaluate)(point);
        self.record(point, residual)?;
        Ok(residual)
    }

    /// Search along `direction` (unit) starting from distance `start`.
    ///
    /// `axis` is the unit vector the force residual is projected on; the
    /// residual must be negative at the origin for a bracket to exist.
    pub fn along_line(&mut self, direction: Point, axis: Point, start: f64) -> Result<LineOutcome, Exhausted> {
        let at = |lambda: f64| Point::new(direction.x * lambda, direction.y * lambda);

        let origin = Point::origin();
        let r0 = self.probe(origin)?;
        if self.criteria.met(&r0) {
            return Ok(LineOutcome::Converged(origin));
        }
        let (mut lo, mut g_lo) = (0.0, r0.along(axis));
        if g_lo >= 0.0 {
            return Ok(LineOutcome::Stalled(origin, r0));
        }

        // Bracket
        let mut hi = start;
        let mut best = loop {
            if hi > self.limit {
                return Ok(LineOutcome::Unbounded);
            }
            let r = self.probe(at(hi))?;
            if self.criteria.met(&r) {
                return Ok(LineOutcome::Converged(at(hi)));
            }
            let g = r.along(axis);
            if g >= 0.0 {
                break (at(hi), r);
            }
            lo = hi;
            g_lo = g;
            hi *= 2.0;
        };
        let mut g_hi = best.1.along(axis);

        // Illinois regula falsi
        let mut retained = 0i8;
        loop {
            if hi - lo <= f64::EPSILON * hi {
                return Ok(LineOutcome::Stalled(best.0, best.1));
            }
            let lambda = (lo * g_hi - hi * g_lo) / (g_hi - g_lo);
            let point = at(lambda);
            let r = self.probe(point)?;
            if self.criteria.met(&r) {
                return Ok(LineOutcome::Converged(point));
            }
            best = (point, r);

            let g = r.along(axis);
            if g.abs() <= self.criteria.force * 1e-3 {
                return Ok(LineOutcome::Stalled(point, r));
            }
            if g < 0.0 {
                lo = lambda;
                g_lo = g;
                if retained == -1 {
                    g_hi *= 0.5;
                }
                retained = -1;
            } else {
                hi = lambda;
                g_hi = g;
                if retained == 1 {
                    g_lo *= 0.5;
                }
                retained = 1;
            }
        }
    }

    /// Damped Newton iteration on the force residual from `start`.
    pub fn refine(&mut self, start: Point, residual: Residual) -> Result<Outcome, Exhausted> {
        let mut point = start;
        let mut r = residual;

        loop {
            if self.criteria.met(&r) {
                return Ok(Outcome::Converged(point));
            }
            if point.norm() > self.limit {
                return Ok(Outcome::Unbounded);
            }

            let h = JACOBIAN_STEP * self.length.max(point.norm());
            let [a, b, c, d] = self.jacobian(point, h);
            let det = a * d - b * c;
            if !det.is_finite() || det == 0.0 {
                tracing::debug!(x = point.x, y = point.y, "singular icr jacobian");
                return Err(self.exhausted());
            }

            // [a b; c d] · step = -r
            let step = Point::new((-r.fx * d + r.fy * b) / det, (r.fx * c - r.fy * a) / det);

            let mut t = 1.0;
            let mut candidate = Point::new(point.x + step.x, point.y + step.y);
            let mut rc = (self.evaluate)(candidate);
            for _ in 0..MAX_BACKTRACKS {
                if rc.force_norm() < r.force_norm() {
                    break;
                }
                t *= 0.5;
                candidate = Point::new(point.x + t * step.x, point.y + t * step.y);
                rc = (self.evaluate)(candidate);
            }

            self.record(candidate, rc)?;
            point = candidate;
            r = rc;
        }
    }

    /// Central-difference Jacobian of (fx, fy) with respect to (x, y), row-major
    fn jacobian(&self, point: Point, h: f64) -> [f64; 4] {
        let e = &self.evaluate;
        let xp = e(Point::new(point.x + h, point.y));
        let xm = e(Point::new(point.x - h, point.y));
        let yp = e(Point::new(point.x, point.y + h));
        let ym = e(Point::new(point.x, point.y - h));
        let w = 2.0 * h;
        [
            (xp.fx - xm.fx) / w,
            (yp.fx - ym.fx) / w,
            (xp.fy - xm.fy) / w,
            (yp.fy - ym.fy) / w,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::cell::Cell;

    const TIGHT: Criteria = Criteria {
        force: 1e-9,
        moment: 1e-9,
    };

    fn linear(p: Point) -> Residual {
        Residual {
            fx: p.x - 2.0,
            fy: p.y + 1.0,
            moment: 0.0,
        }
    }

    #[test]
    fn test_newton_solves_linear_field() {
        let mut search = Search::new(linear, TIGHT, 20, 1.0, 1e4);
        let r = search.probe(Point::origin()).unwrap();
        let outcome = search.refine(Point::origin(), r).unwrap();

        match outcome {
            Outcome::Converged(p) => {
                assert_relative_eq!(p.x, 2.0, epsilon = 1e-9);
                assert_relative_eq!(p.y, -1.0, epsilon = 1e-9);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(search.trials().len() <= 3);
    }

    #[test]
    fn test_budget_counts_accepted_trials_only() {
        let evaluations = Cell::new(0usize);
        let counted = |p: Point| {
            evaluations.set(evaluations.get() + 1);
            linear(p)
        };
        let mut search = Search::new(counted, TIGHT, 20, 1.0, 1e4);
        let r = search.probe(Point::origin()).unwrap();
        search.refine(Point::origin(), r).unwrap();

        // Each Newton step adds one trial but at least five evaluations
        let steps = search.trials().len() - 1;
        assert!(steps >= 1);
        assert!(evaluations.get() >= 1 + 5 * steps);
        assert!(evaluations.get() <= 1 + (4 + 1 + MAX_BACKTRACKS) * steps);
    }

    #[test]
    fn test_line_search_brackets_and_closes() {
        let field = |p: Point| Residual {
            fx: p.x - 3.0,
            fy: 0.0,
            moment: 0.0,
        };
        let mut search = Search::new(field, TIGHT, 50, 1.0, 1e4);
        let axis = Point::new(1.0, 0.0);
        let outcome = search.along_line(axis, axis, 1.0).unwrap();

        match outcome {
            LineOutcome::Converged(p) => assert_relative_eq!(p.x, 3.0, epsilon = 1e-9),
            other => panic!("unexpected {:?}", other),
        }
        // Probes at 0, 1, 2, 4, then one secant step lands on 3
        assert_eq!(search.trials().len(), 5);
        assert_eq!(search.trials()[3].point, Point::new(4.0, 0.0));
    }

    #[test]
    fn test_line_search_nonlinear_root() {
        // Root at λ = 0.5 with a strongly curved residual
        let field = |p: Point| Residual {
            fx: p.x.powi(3) - 0.125,
            fy: 0.0,
            moment: 0.0,
        };
        let mut search = Search::new(field, TIGHT, 200, 1.0, 1e4);
        let axis = Point::new(1.0, 0.0);

        match search.along_line(axis, axis, 0.01).unwrap() {
            LineOutcome::Converged(p) => assert_relative_eq!(p.x, 0.5, epsilon = 1e-6),
            other => panic!("unexpected {:?}", other),
        }
        assert!(search.trials().len() < 60);
    }

    #[test]
    fn test_line_search_unbounded() {
        let field = |p: Point| Residual {
            fx: -1.0 / (1.0 + p.norm()),
            fy: 0.0,
            moment: 0.0,
        };
        let mut search = Search::new(field, TIGHT, 200, 1.0, 100.0);
        let axis = Point::new(1.0, 0.0);
        assert_eq!(search.along_line(axis, axis, 1.0).unwrap(), LineOutcome::Unbounded);
        // 0, 1, 2, ..., 64; 128 exceeds the limit
        assert_eq!(search.trials().len(), 8);
    }

    #[test]
    fn test_budget_exhaustion_reports_last_trial() {
        let field = |p: Point| Residual {
            fx: 1.0 + p.x * p.x,
            fy: 1.0,
            moment: 0.0,
        };
        let mut search = Search::new(field, TIGHT, 3, 1.0, 1e4);
        let r = search.probe(Point::origin()).unwrap();
        let err = search.refine(Point::origin(), r).unwrap_err();

        assert!(err.iterations <= 3);
        assert!(err.residual.force_norm() >= 1.0);
    }

    #[test]
    fn test_moment_criterion_required() {
        let criteria = Criteria {
            force: 1e-3,
            moment: 1e-3,
        };
        let balanced_forces = Residual {
            fx: 0.0,
            fy: 0.0,
            moment: 5.0,
        };
        assert!(!criteria.met(&balanced_forces));
        assert!(criteria.met(&Residual {
            fx: 1e-4,
            fy: 0.0,
            moment: -1e-4
        }));
    }
}
