//! Core types shared across archmodel facilities
//!
//! This crate provides foundational types used by the error, logging and
//! analysis facilities:
//!
//! - **Layer**: the twelve architecture layers an element can live in
//! - **Schema constants**: Canonical field keys and event names

pub mod layer;
pub mod schema;

pub use layer::{Layer, UnknownLayer};
