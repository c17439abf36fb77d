//! # Bolt Group Geometry
//!
//! Builds the immutable bolt layout every solver reads from. A [`BoltGroup`]
//! is constructed once, computes its centroid and section properties at that
//! moment, and exposes them read-only afterwards. Solvers never mutate it, so
//! one group can back any number of independent analyses.
//!
//! ## Section Properties
//!
//! With `dx`, `dy` measured from the centroid:
//!
//! - `Ix = Σdy²`
//! - `Iy = Σdx²`
//! - `Ixy = Σdx·dy`
//! - `J = Ix + Iy` (polar moment, zero only for a single bolt)
//!
//! ## Example
//!
//! ```rust
//! use bolt_core::geometry::{BoltGroup, Point};
//!
//! // 2 columns x 3 rows over a 3" x 6" area
//! let group = BoltGroup::grid(Point::new(0.0, 0.0), 3.0, 6.0, 2, 3).unwrap();
//!
//! assert_eq!(group.len(), 6);
//! assert_eq!(group.centroid(), Point::new(1.5, 3.0));
//! assert!((group.properties().j - 49.5).abs() < 1e-9);
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{require_finite, CalcError, CalcResult};

/// A location in the plane of the connection.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Create a point from its coordinates
    pub const fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    /// The origin
    pub const fn origin() -> Self {
        Point { x: 0.0, y: 0.0 }
    }

    /// Euclidean length of the position vector
    pub fn norm(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Distance to another point
    pub fn distance_to(&self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// A single fastener in the group.
///
/// Offsets are measured from the group centroid and fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bolt {
    /// Zero-based id, stable reporting order
    pub id: usize,
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
    /// X offset from centroid (x - x_cg)
    pub dx: f64,
    /// Y offset from centroid (y - y_cg)
    pub dy: f64,
}

impl Bolt {
    /// Absolute position
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Offset from the centroid as a vector
    pub fn offset(&self) -> Point {
        Point::new(self.dx, self.dy)
    }

    /// Distance from the centroid
    pub fn radius(&self) -> f64 {
        self.dx.hypot(self.dy)
    }
}

/// Polar-moment analogy section properties of a bolt group.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SectionProperties {
    /// Σdy²
    pub ix: f64,
    /// Σdx²
    pub iy: f64,
    /// Σdx·dy
    pub ixy: f64,
    /// Ix + Iy
    pub j: f64,
}

/// Axis-aligned envelope of the bolt positions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Length of the diagonal, the group's largest bounding dimension
    pub fn diagonal(&self) -> f64 {
        self.width().hypot(self.height())
    }

    /// Whether a point lies inside or on the envelope
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.min_x && point.x <= self.max_x && point.y >= self.min_y && point.y <= self.max_y
    }
}

/// Immutable collection of bolts with cached geometric properties.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoltGroup {
    bolts: Vec<Bolt>,
    centroid: Point,
    properties: SectionProperties,
    bounding_box: BoundingBox,
}

impl BoltGroup {
    /// Build a group from arbitrary bolt positions.
    ///
    /// Ids follow the order of `points`. Fails if the list is empty or any
    /// coordinate is not finite.
    pub fn from_points(points: &[Point]) -> CalcResult<Self> {
        if points.is_empty() {
            return Err(CalcError::invalid_input(
                "bolts",
                "[]",
                "A bolt group needs at least one bolt",
            ));
        }
        for point in points {
            require_finite("bolt.x", point.x)?;
            require_finite("bolt.y", point.y)?;
        }

        let n = points.len() as f64;
        let centroid = Point::new(
            points.iter().map(|p| p.x).sum::<f64>() / n,
            points.iter().map(|p| p.y).sum::<f64>() / n,
        );

        let bolts: Vec<Bolt> = points
            .iter()
            .enumerate()
            .map(|(id, p)| Bolt {
                id,
                x: p.x,
                y: p.y,
                dx: p.x - centroid.x,
                dy: p.y - centroid.y,
            })
            .collect();

        let ix = bolts.iter().map(|b| b.dy * b.dy).sum::<f64>();
        let iy = bolts.iter().map(|b| b.dx * b.dx).sum::<f64>();
        let ixy = bolts.iter().map(|b| b.dx * b.dy).sum::<f64>();
        let properties = SectionProperties { ix, iy, ixy, j: ix + iy };

        let bounding_box = BoundingBox {
            min_x: points.iter().map(|p| p.x).fold(f64::INFINITY, f64::min),
            min_y: points.iter().map(|p| p.y).fold(f64::INFINITY, f64::min),
            max_x: points.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max),
            max_y: points.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max),
        };

        tracing::debug!(
            bolts = bolts.len(),
            x_cg = centroid.x,
            y_cg = centroid.y,
            j = properties.j,
            "built bolt group"
        );

        Ok(BoltGroup {
            bolts,
            centroid,
            properties,
            bounding_box,
        })
    }

    /// Build an `nx` x `ny` rectangular grid anchored at `origin` (bottom-left).
    ///
    /// Bolts are evenly spaced over `width` x `height`. A single column
    /// (`nx = 1`) sits at the origin's X and ignores `width`; likewise for a
    /// single row and `height`.
    pub fn grid(origin: Point, width: f64, height: f64, nx: usize, ny: usize) -> CalcResult<Self> {
        GridLayout {
            origin_x: origin.x,
            origin_y: origin.y,
            width,
            height,
            nx,
            ny,
            perimeter_only: false,
        }
        .build()
    }

    /// All bolts in id order
    pub fn bolts(&self) -> &[Bolt] {
        &self.bolts
    }

    /// Number of bolts (always at least one)
    pub fn len(&self) -> usize {
        self.bolts.len()
    }

    /// Always false; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.bolts.is_empty()
    }

    pub fn centroid(&self) -> Point {
        self.centroid
    }

    pub fn properties(&self) -> SectionProperties {
        self.properties
    }

    pub fn bounding_box(&self) -> BoundingBox {
        self.bounding_box
    }

    /// Largest bolt distance from the centroid
    pub fn radius(&self) -> f64 {
        self.bolts.iter().map(Bolt::radius).fold(0.0, f64::max)
    }

    /// True when the polar moment vanishes and no torsion can be resisted.
    ///
    /// This is the single-bolt case (or coincident bolts).
    pub fn is_degenerate(&self) -> bool {
        self.properties.j <= f64::EPSILON * self.bounding_box.diagonal().max(1.0).powi(2)
    }

    /// Bolt positions, for external rendering
    pub fn positions(&self) -> Vec<Point> {
        self.bolts.iter().map(Bolt::position).collect()
    }
}

/// Parameters for a rectangular bolt pattern.
///
/// ## JSON Example
///
/// ```json
/// {
///   "origin_x": 0.0,
///   "origin_y": 0.0,
///   "width": 3.0,
///   "height": 6.0,
///   "nx": 2,
///   "ny": 3
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridLayout {
    /// X coordinate of the bottom-left bolt
    #[serde(default)]
    pub origin_x: f64,

    /// Y coordinate of the bottom-left bolt
    #[serde(default)]
    pub origin_y: f64,

    /// Distance between the outer columns (ignored when nx = 1)
    pub width: f64,

    /// Distance between the outer rows (ignored when ny = 1)
    pub height: f64,

    /// Bolts along X
    pub nx: usize,

    /// Bolts along Y
    pub ny: usize,

    /// Keep only the bolts on the outer rows and columns
    #[serde(default)]
    pub perimeter_only: bool,
}

impl GridLayout {
    /// Validate layout parameters.
    pub fn validate(&self) -> CalcResult<()> {
        require_finite("origin_x", self.origin_x)?;
        require_finite("origin_y", self.origin_y)?;
        require_finite("width", self.width)?;
        require_finite("height", self.height)?;

        if self.nx < 1 {
            return Err(CalcError::invalid_input(
                "nx",
                self.nx.to_string(),
                "At least one bolt column is required",
            ));
        }
        if self.ny < 1 {
            return Err(CalcError::invalid_input(
                "ny",
                self.ny.to_string(),
                "At least one bolt row is required",
            ));
        }
        if self.nx > 1 && self.width <= 0.0 {
            return Err(CalcError::invalid_input(
                "width",
                self.width.to_string(),
                "Width must be positive when nx > 1",
            ));
        }
        if self.ny > 1 && self.height <= 0.0 {
            return Err(CalcError::invalid_input(
                "height",
                self.height.to_string(),
                "Height must be positive when ny > 1",
            ));
        }
        Ok(())
    }

    /// Spacing between columns (zero for a single column)
    pub fn spacing_x(&self) -> f64 {
        if self.nx > 1 {
            self.width / (self.nx - 1) as f64
        } else {
            0.0
        }
    }

    /// Spacing between rows (zero for a single row)
    pub fn spacing_y(&self) -> f64 {
        if self.ny > 1 {
            self.height / (self.ny - 1) as f64
        } else {
            0.0
        }
    }

    /// Bolt positions in column-major order (x slowest, y fastest).
    pub fn positions(&self) -> CalcResult<Vec<Point>> {
        self.validate()?;
        let sx = self.spacing_x();
        let sy = self.spacing_y();

        let mut points = Vec::with_capacity(self.nx * self.ny);
        for i in 0..self.nx {
            for j in 0..self.ny {
                let on_edge = i == 0 || i == self.nx - 1 || j == 0 || j == self.ny - 1;
                if self.perimeter_only && !on_edge {
                    continue;
                }
                points.push(Point::new(
                    self.origin_x + i as f64 * sx,
                    self.origin_y + j as f64 * sy,
                ));
            }
        }
        Ok(points)
    }

    /// Build the bolt group described by this layout.
    pub fn build(&self) -> CalcResult<BoltGroup> {
        BoltGroup::from_points(&self.positions()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn reference_layout() -> GridLayout {
        GridLayout {
            origin_x: 0.0,
            origin_y: 0.0,
            width: 3.0,
            height: 6.0,
            nx: 2,
            ny: 3,
            perimeter_only: false,
        }
    }

    #[test]
    fn test_grid_positions_are_column_major() {
        let points = reference_layout().positions().unwrap();
        assert_eq!(
            points,
            vec![
                Point::new(0.0, 0.0),
                Point::new(0.0, 3.0),
                Point::new(0.0, 6.0),
                Point::new(3.0, 0.0),
                Point::new(3.0, 3.0),
                Point::new(3.0, 6.0),
            ]
        );
    }

    #[test]
    fn test_section_properties() {
        let group = reference_layout().build().unwrap();
        let props = group.properties();

        // dy = -3, 0, 3 in each column: Ix = 2 * 18 = 36
        assert_relative_eq!(props.ix, 36.0, epsilon = 1e-12);
        // dx = ±1.5 for all six bolts: Iy = 6 * 2.25 = 13.5
        assert_relative_eq!(props.iy, 13.5, epsilon = 1e-12);
        assert_relative_eq!(props.ixy, 0.0, epsilon = 1e-12);
        assert_relative_eq!(props.j, 49.5, epsilon = 1e-12);
        assert!(!group.is_degenerate());
    }

    #[test]
    fn test_bolt_offsets_from_centroid() {
        let group = reference_layout().build().unwrap();
        let corner = group.bolts()[5];
        assert_eq!(corner.id, 5);
        assert_relative_eq!(corner.dx, 1.5);
        assert_relative_eq!(corner.dy, 3.0);
        assert_relative_eq!(corner.radius(), 11.25_f64.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(group.radius(), corner.radius());
    }

    #[test]
    fn test_single_column_ignores_width() {
        let layout = GridLayout {
            origin_x: 2.0,
            origin_y: 1.0,
            width: 0.0,
            height: 9.0,
            nx: 1,
            ny: 4,
            perimeter_only: false,
        };
        let group = layout.build().unwrap();
        assert_eq!(group.len(), 4);
        assert!(group.bolts().iter().all(|b| b.x == 2.0));
        assert_relative_eq!(group.properties().iy, 0.0);
        assert_relative_eq!(group.centroid().y, 5.5);

        // Any width is accepted for a single column, negative included
        let negative = GridLayout {
            width: -1.0,
            ..layout.clone()
        };
        assert_eq!(negative.build().unwrap().positions(), group.positions());

        let single_row = GridLayout {
            height: -3.0,
            width: 6.0,
            nx: 3,
            ny: 1,
            ..layout.clone()
        };
        let row = single_row.build().unwrap();
        assert!(row.bolts().iter().all(|b| b.y == 1.0));
    }

    #[test]
    fn test_single_bolt_is_degenerate() {
        let group = BoltGroup::grid(Point::new(4.0, -2.0), 3.0, 6.0, 1, 1).unwrap();
        assert_eq!(group.len(), 1);
        assert_eq!(group.centroid(), Point::new(4.0, -2.0));
        assert_eq!(group.properties().j, 0.0);
        assert!(group.is_degenerate());
        assert_eq!(group.radius(), 0.0);
    }

    #[test]
    fn test_perimeter_only_drops_interior() {
        let layout = GridLayout {
            nx: 3,
            ny: 3,
            width: 6.0,
            height: 6.0,
            perimeter_only: true,
            ..reference_layout()
        };
        let group = layout.build().unwrap();
        assert_eq!(group.len(), 8);
        assert!(!group.positions().contains(&Point::new(3.0, 3.0)));
        assert_eq!(group.centroid(), Point::new(3.0, 3.0));
    }

    #[test]
    fn test_invalid_counts_rejected() {
        let mut layout = reference_layout();
        layout.nx = 0;
        let err = layout.build().unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");

        let mut layout = reference_layout();
        layout.ny = 0;
        assert!(layout.build().is_err());
    }

    #[test]
    fn test_non_positive_dimensions_rejected() {
        let mut layout = reference_layout();
        layout.width = 0.0;
        assert!(layout.build().is_err());

        let mut layout = reference_layout();
        layout.height = -6.0;
        assert!(layout.build().is_err());
    }

    #[test]
    fn test_from_points_rejects_empty_and_nan() {
        assert!(BoltGroup::from_points(&[]).is_err());
        assert!(BoltGroup::from_points(&[Point::new(f64::NAN, 0.0)]).is_err());
    }

    #[test]
    fn test_bounding_box() {
        let group = reference_layout().build().unwrap();
        let bbox = group.bounding_box();
        assert_eq!(bbox.width(), 3.0);
        assert_eq!(bbox.height(), 6.0);
        assert_relative_eq!(bbox.diagonal(), 45.0_f64.sqrt());
        assert!(bbox.contains(group.centroid()));
        assert!(!bbox.contains(Point::new(-0.5, 3.0)));
    }

    #[test]
    fn test_layout_json_defaults() {
        let json = r#"{ "width": 3.0, "height": 6.0, "nx": 2, "ny": 3 }"#;
        let layout: GridLayout = serde_json::from_str(json).unwrap();
        assert_eq!(layout, reference_layout());
    }
}
