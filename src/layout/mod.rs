//! Leaf ordering and placement algorithms.
//!
//! Two alternative pipelines share the tree, site and boundary model:
//!
//! - [`discrete`]: dynamic program over `n` equally spaced slots, globally
//!   optimal for the chosen cost.
//! - [`sliding`]: continuous positions. [`feasibility`] derives
//!   non-crossing intervals, [`placement`] seeds a valid configuration and
//!   [`refine`] relaxes it with a per-leaf force equilibrium solved by
//!   [`cubic`].
//!
//! [`propagate`] places inner nodes once the leaves are final.

pub mod cubic;
pub mod discrete;
pub mod feasibility;
pub mod placement;
pub mod propagate;
pub mod refine;
pub mod sliding;

pub use discrete::DiscreteReport;
pub use sliding::SlidingReport;
