//! Boundary-constrained Voronoi tessellation
//!
//! Maintains a Voronoi diagram for a mutable set of sites that must lie
//! inside an outer boundary and outside a set of holes. Every mutation
//! recomputes the constrained cells from scratch.
//!
//! # Quick Start
//!
//! ```rust
//! use constrained_voronoi::*;
//!
//! let mut session = Session::new();
//! session.load_boundary(
//!     Polygon::new(vec![
//!         Point::new(0.0, 0.0),
//!         Point::new(0.0, 1.0),
//!         Point::new(1.0, 1.0),
//!         Point::new(1.0, 0.0),
//!     ]),
//!     vec![],
//! );
//!
//! session.apply(Command::AddSites(vec![
//!     Point::new(0.25, 0.25),
//!     Point::new(0.75, 0.75),
//! ])).unwrap();
//!
//! for cell in session.tessellation().cells() {
//!     println!("site {} covers {:.3}", cell.site_id, cell.area());
//! }
//! ```
//!
//! # Features
//!
//! - `spatial-index` (default): Enables O(log n) position-to-site lookups using KD-tree
//! - `serde`: Enables serialization and the JSON boundary document

// Modules
pub mod error;
pub mod config;
pub mod geometry;
pub mod clip;
pub mod generation;
pub mod kernel;
pub mod boundary;
pub mod constraint;
pub mod cell;
pub mod session;

#[cfg(feature = "spatial-index")]
pub mod spatial;

// Re-export core types for convenience
pub use error::{TessellationError, Result};
pub use config::{TessellationConfig, TessellationConfigBuilder, SitePolicy};
pub use geometry::{Point, Polygon, BoundingBox};
pub use clip::{point_in_polygon, intersect, difference, Clipper, Location};
pub use generation::{compute_voronoi, RawCell};
pub use kernel::{GeometryKernel, PlanarKernel};
pub use boundary::BoundaryModel;
pub use constraint::{apply_constraints, apply_constraints_with};
pub use cell::{Cell, Site, SiteId, Tessellation};
pub use session::{Command, Session, TessellationSink};

#[cfg(feature = "serde")]
pub use boundary::BoundaryDocument;

#[cfg(feature = "spatial-index")]
pub use spatial::SpatialIndex;

// Re-export glam::DVec2 for convenience
pub use glam::DVec2;
