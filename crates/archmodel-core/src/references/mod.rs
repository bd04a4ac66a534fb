//! Reference extraction and indexing
//!
//! Elements point at each other through property values. The registry walks
//! every registered element's properties, turns reference-bearing values into
//! typed `Reference`s, and indexes them by source, target and type.

pub mod catalog;
pub mod registry;
pub mod walk;

pub use catalog::{
    infer_reference_type, is_reference_property, Cardinality, ReferenceDefinition,
    ReferenceDefinitionCatalog, DEFAULT_REFERENCE_TYPE, KNOWN_REFERENCE_PROPERTIES,
};
pub use registry::{DefinitionViolation, Reference, ReferenceRegistry, ReferenceStatistics};
pub use walk::{walk_properties, PropertyHit};
