//! # mowplan planner
//!
//! Coverage path planning for robotic lawn mowers.
//!
//! The crate is organised bottom-up:
//! - [`geometry`]: stateless polygon kernel (area, containment, hulls,
//!   clipping, offsets, shape metrics)
//! - [`patterns`]: one generator per [`MowingPattern`](mowplan_core::MowingPattern)
//! - [`avoidance`]: obstacle inflation and path rewriting
//! - [`optimizer`]: smoothing, simplification and dock anchoring
//! - [`planner`]: the zone repository and planning state machine

pub mod avoidance;
pub mod cancel;
pub mod geometry;
pub mod optimizer;
pub mod patterns;
pub mod planner;

pub use avoidance::{blocked, inflate_obstacles, Footprint, ObstacleAvoider};
pub use cancel::CancelToken;
pub use optimizer::PathOptimizer;
pub use patterns::{classify, generate, GeneratedPath, PatternContext, ShapeProfile};
pub use planner::CoveragePlanner;
