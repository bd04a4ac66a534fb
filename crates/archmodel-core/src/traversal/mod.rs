//! Dependency tracing over the reference graph

pub mod tracker;

pub use tracker::{DependencyPath, DependencyTracker, TraceDirection, UNKNOWN_LAYER};
