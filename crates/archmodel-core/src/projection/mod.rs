//! Rule-driven projection of elements across layers
//!
//! A rule says how an element in one layer gives rise to an element in
//! another: which sources it applies to (layer, type, conditions), how the
//! new element is named, and which properties are carried over.

pub mod condition;
pub mod engine;
pub mod format;
pub mod loader;
pub mod rule;
pub mod template;
pub mod transform;

pub use condition::{evaluate, evaluate_all};
pub use engine::{ProjectionEngine, ProjectionReport, RuleSummary, SkippedProjection};
pub use loader::{parse_rules_file, parse_rules_str};
pub use rule::{
    ConditionOperator, ProjectionCondition, ProjectionRule, PropertyMapping, PropertyTransform,
    TransformKind,
};
pub use template::{
    render_literal, render_template, FilterRenderer, TemplateContext, TemplateRenderer,
};
pub use transform::{apply_transform, to_kebab_case, to_pascal_case, to_snake_case};
