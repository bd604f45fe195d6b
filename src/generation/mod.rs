//! Voronoi tessellation engine
//!
//! Computes unconstrained Voronoi cells for a set of sites inside a bounding
//! box via an incremental Delaunay triangulation and its dual. Every call
//! starts from scratch; nothing is carried over between calls.

mod delaunay;
mod points;
mod voronoi;

pub use delaunay::{compute_delaunay, DelaunayResult};
pub use points::{scatter_in_box, scatter_sites};
pub use voronoi::{compute_voronoi, generate_cells, RawCell};
