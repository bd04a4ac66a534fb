//! ArchModel Core - cross-reference, dependency and projection engine
//!
//! This crate provides the analysis kernel for twelve-layer architecture
//! models, including:
//! - Reference extraction from element properties, indexed by source, target and type
//! - Dependency tracing, path enumeration, orphan and hub detection
//! - Circular dependency and impact analysis
//! - Rule-driven projection of elements from one layer into another
//!
//! Everything works against an in-memory `Model`; loading models from disk is
//! left to the caller.

pub mod config;
pub mod errors;
pub mod graph;
pub mod logging_facility;
pub mod model;
pub mod projection;
pub mod references;
pub mod traversal;

// Re-export commonly used types
pub use config::AnalysisConfig;
pub use errors::{ArchModelError, ExError, ExErrorKind, Result};
pub use graph::{DependencyGraph, EdgeDirection};
pub use model::{Element, Layer, Model, Properties, PropertyValue};
pub use projection::{ProjectionEngine, ProjectionReport, ProjectionRule};
pub use references::{Reference, ReferenceDefinitionCatalog, ReferenceRegistry};
pub use traversal::{DependencyPath, DependencyTracker, TraceDirection};
