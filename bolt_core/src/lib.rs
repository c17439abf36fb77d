//! # bolt_core - Bolt Group Analysis Engine
//!
//! `bolt_core` distributes in-plane shear and torsion among the bolts of a
//! connection. All inputs and outputs are JSON-serializable so results can be
//! handed to plotting or export tools as they are.
//!
//! ## Methods
//!
//! - **Elastic Method - Superposition**: direct shear plus torsional shear
//!   proportional to distance from the centroid
//! - **Elastic Method - Center of Rotation**: the same distribution expressed
//!   as a rotation about the elastic center
//! - **Instant Center of Rotation Method**: nonlinear bolt load-deformation,
//!   rotation about an iteratively located instant center
//!
//! ## Design Philosophy
//!
//! - **Stateless**: geometry is built once, every solve is a pure function
//! - **JSON-First**: inputs and results implement Serialize
//! - **Rich Errors**: structured error types, including ICR convergence diagnostics
//!
//! ## Quick Start
//!
//! ```rust
//! use bolt_core::calculations::{elastic, icr, IcrSettings};
//! use bolt_core::geometry::{BoltGroup, Point};
//! use bolt_core::loads::LoadCase;
//!
//! let group = BoltGroup::grid(Point::new(0.0, 0.0), 3.0, 6.0, 2, 3).unwrap();
//! let load = LoadCase::new(0.0, -50.0, -200.0);
//!
//! let elastic = elastic::solve(&group, &load, 17.9).unwrap();
//! let icr = icr::solve(&group, &load, 17.9, &IcrSettings::default()).unwrap();
//!
//! assert!(icr.max_utilization() <= elastic.max_utilization());
//! ```
//!
//! ## Modules
//!
//! - [`geometry`] - Bolt positions, centroid and section properties
//! - [`loads`] - Applied shear and torsion
//! - [`calculations`] - The analysis methods
//! - [`results`] - Running all methods, CSV tables and text reports
//! - [`errors`] - Structured error types
//! - [`file_io`] - JSON inputs and atomic result files

pub mod calculations;
pub mod errors;
pub mod file_io;
pub mod geometry;
pub mod loads;
pub mod results;

// Re-export commonly used types at crate root for convenience
pub use calculations::{IcrSettings, Method, SolveResult};
pub use errors::{CalcError, CalcResult};
pub use geometry::{BoltGroup, GridLayout, Point};
pub use loads::LoadCase;
pub use results::{analyze, Analysis, AnalysisInput};
