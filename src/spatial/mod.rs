//! Spatial indexing for hit testing on a finished layout.
//!
//! An R-tree over node positions answers nearest-node and range queries,
//! e.g. for hover and selection in a viewer.

mod rtree;

pub use rtree::{NodePoint, SpatialIndex};
