//! # Analysis Results
//!
//! Runs every applicable method against one bolt group and load case and
//! collects the results keyed by [`Method`]. This is the interface the CLI
//! and exporters consume: per-bolt force tables, a governing summary per
//! method, and the group geometry for rendering.
//!
//! ## Example
//!
//! ```rust
//! use bolt_core::calculations::Method;
//! use bolt_core::results::{analyze, AnalysisInput};
//!
//! let analysis = analyze(&AnalysisInput::reference()).unwrap();
//! let elastic = analysis.get(Method::ElasticSuperposition).unwrap();
//! let icr = analysis.get(Method::InstantCenterOfRotation).unwrap();
//!
//! assert!(icr.max_utilization() <= elastic.max_utilization());
//! ```
//!
//! ## JSON Input
//!
//! ```json
//! {
//!   "label": "Bracket B1",
//!   "layout": { "width": 3.0, "height": 6.0, "nx": 2, "ny": 3 },
//!   "load": { "vx": 0.0, "vy": -50.0, "torsion": -200.0 },
//!   "bolt_capacity": 17.9
//! }
//! ```

use std::collections::BTreeMap;
use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::calculations::{ecr, elastic, icr, validate_capacity, IcrSettings, Method, MethodDetail, SolveResult};
use crate::errors::{CalcError, CalcResult};
use crate::geometry::{BoltGroup, GridLayout, Point};
use crate::loads::{Eccentricity, LoadCase};

/// Everything needed to run an analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisInput {
    /// Free-form name shown in reports
    #[serde(default)]
    pub label: String,

    pub layout: GridLayout,

    pub load: LoadCase,

    /// Nominal shear capacity of one bolt (kips)
    pub bolt_capacity: f64,

    #[serde(default)]
    pub icr: IcrSettings,
}

impl AnalysisInput {
    /// 2 x 3 grid, 3" x 6", Vy = -50 kips, T = -200 kip-in, 17.9 kip bolts
    pub fn reference() -> Self {
        AnalysisInput {
            label: "Reference bracket".to_string(),
            layout: GridLayout {
                origin_x: 0.0,
                origin_y: 0.0,
                width: 3.0,
                height: 6.0,
                nx: 2,
                ny: 3,
                perimeter_only: false,
            },
            load: LoadCase::new(0.0, -50.0, -200.0),
            bolt_capacity: 17.9,
            icr: IcrSettings::default(),
        }
    }

    /// Validate every field before any solve is attempted.
    pub fn validate(&self) -> CalcResult<()> {
        self.layout.validate()?;
        self.load.validate()?;
        validate_capacity(self.bolt_capacity)?;
        self.icr.validate()?;
        Ok(())
    }
}

/// Results of all methods for one load case.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub label: String,
    pub group: BoltGroup,
    pub load: LoadCase,
    pub eccentricity: Eccentricity,
    pub bolt_capacity: f64,
    /// Methods that apply to this load case, in reporting order
    pub results: BTreeMap<Method, SolveResult>,
}

/// Group-level summary of one method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodSummary {
    pub method: Method,
    pub governing_bolt: usize,
    pub max_force: f64,
    pub max_utilization: f64,
    pub passes: bool,
    pub converged: bool,
    /// Instant center (absolute), ICR only
    pub instant_center: Option<Point>,
    /// ICR trial count
    pub iterations: Option<usize>,
}

impl Analysis {
    pub fn get(&self, method: Method) -> Option<&SolveResult> {
        self.results.get(&method)
    }

    pub fn summaries(&self) -> Vec<MethodSummary> {
        self.results
            .values()
            .map(|r| MethodSummary {
                method: r.method,
                governing_bolt: r.governing.bolt,
                max_force: r.governing.resultant,
                max_utilization: r.governing.utilization,
                passes: r.passes(),
                converged: r.converged(),
                instant_center: r.instant_center().map(|ic| ic.position()),
                iterations: r.icr().map(|d| d.trials.len()),
            })
            .collect()
    }
}

/// Validate the input, build the group once and run every applicable method.
///
/// The elastic center method is skipped when there is no torsion or the group
/// cannot resist torsion.
pub fn analyze(input: &AnalysisInput) -> CalcResult<Analysis> {
    input.validate()?;
    if input.load.is_zero() {
        return Err(CalcError::NoLoadApplied);
    }

    let group = input.layout.build()?;
    let load = input.load;
    let capacity = input.bolt_capacity;

    tracing::info!(
        label = %input.label,
        bolts = group.len(),
        vx = load.vx,
        vy = load.vy,
        torsion = load.torsion,
        "running bolt group analysis"
    );

    let mut results = BTreeMap::new();
    results.insert(Method::ElasticSuperposition, elastic::solve(&group, &load, capacity)?);
    if let Some(result) = ecr::solve(&group, &load, capacity)? {
        results.insert(Method::ElasticCenterOfRotation, result);
    }
    results.insert(
        Method::InstantCenterOfRotation,
        icr::solve(&group, &load, capacity, &input.icr)?,
    );

    Ok(Analysis {
        label: input.label.clone(),
        eccentricity: load.eccentricity(),
        group,
        load,
        bolt_capacity: capacity,
        results,
    })
}

/// Column header of the bolt force table
pub const CSV_HEADER: &str = "bolt,x,y,fx,fy,resultant,utilization";

/// Render a bolt force table as CSV, one row per bolt in id order.
pub fn to_csv(result: &SolveResult) -> String {
    let mut csv = String::with_capacity(64 * (result.forces.len() + 1));
    csv.push_str(CSV_HEADER);
    csv.push('\n');
    for row in &result.forces {
        csv.push_str(&format!(
            "{},{:.6},{:.6},{:.6},{:.6},{:.6},{:.6}\n",
            row.bolt, row.x, row.y, row.fx, row.fy, row.resultant, row.utilization
        ));
    }
    csv
}

/// Plain-text report of every method, as printed by the CLI.
pub fn render_report(analysis: &Analysis) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail
    let _ = write_report(&mut out, analysis);
    out
}

fn write_report(out: &mut String, analysis: &Analysis) -> std::fmt::Result {
    let group = &analysis.group;
    let props = group.properties();
    let centroid = group.centroid();
    let load = &analysis.load;

    if !analysis.label.is_empty() {
        writeln!(out, "{}", analysis.label)?;
        writeln!(out, "{}", "=".repeat(analysis.label.chars().count()))?;
    }
    writeln!(
        out,
        "Bolts: {}   centroid ({:.3}, {:.3})   Ix = {:.3}  Iy = {:.3}  J = {:.3}",
        group.len(),
        centroid.x,
        centroid.y,
        props.ix,
        props.iy,
        props.j
    )?;
    writeln!(
        out,
        "Load:  Vx = {:.3}  Vy = {:.3}  T = {:.3}   |V| = {:.3} at {:.1} deg, e = {:.3}",
        load.vx,
        load.vy,
        load.torsion,
        load.resultant(),
        load.angle_deg(),
        analysis.eccentricity.e
    )?;
    writeln!(out, "Bolt capacity: {:.3}", analysis.bolt_capacity)?;

    for result in analysis.results.values() {
        writeln!(out)?;
        writeln!(out, "{}", result.method)?;
        writeln!(
            out,
            "{:>5} {:>9} {:>9} {:>10} {:>10} {:>10} {:>7}",
            "bolt", "x", "y", "Fx", "Fy", "R", "util"
        )?;
        for row in &result.forces {
            writeln!(
                out,
                "{:>5} {:>9.3} {:>9.3} {:>10.3} {:>10.3} {:>10.3} {:>7.3}",
                row.bolt, row.x, row.y, row.fx, row.fy, row.resultant, row.utilization
            )?;
        }
        let total = result.equilibrium();
        writeln!(
            out,
            "{:>5} {:>9} {:>9} {:>10.3} {:>10.3}   M = {:.3}",
            "total", "", "", total.fx, total.fy, total.moment
        )?;
        writeln!(
            out,
            "Governing: bolt {}  R = {:.3}  utilization = {:.3}  {}",
            result.governing.bolt,
            result.governing.resultant,
            result.governing.utilization,
            if result.passes() { "OK" } else { "OVERSTRESSED" }
        )?;

        match &result.detail {
            MethodDetail::Elastic(_) => {}
            MethodDetail::CenterOfRotation(ecr) => {
                writeln!(
                    out,
                    "ECR at ({:.4}, {:.4})  Ce = {:.3}  capacity = {:.3}  DCR = {:.3}",
                    ecr.center.x, ecr.center.y, ecr.coefficient, ecr.connection_capacity, ecr.dcr
                )?;
            }
            MethodDetail::InstantCenter(icr) => {
                match &icr.instant_center {
                    Some(ic) => writeln!(
                        out,
                        "IC at ({:.4}, {:.4})  {} after {} iterations, residual {:.2e}",
                        ic.x,
                        ic.y,
                        icr.status.label(),
                        ic.iterations,
                        ic.residual
                    )?,
                    None => writeln!(out, "No instant center: {}", icr.status.label())?,
                }
                if let Some(s) = &icr.strength {
                    writeln!(
                        out,
                        "C = {:.3}  capacity = {:.3}  DCR = {:.3}  Rult required = {:.3}",
                        s.coefficient, s.connection_capacity, s.dcr, s.bolt_ultimate
                    )?;
                }
            }
        }
    }
    Ok(())
}
