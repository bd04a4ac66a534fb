//! Projection rule file schema
//!
//! Defines the YAML structure read by the loader. Everything here is raw:
//! layer names, operators and transforms are plain strings until the loader
//! validates them.

use serde::Deserialize;
use std::collections::BTreeMap;

use crate::model::PropertyValue;

/// Top-level rule file
#[derive(Debug, Clone, Deserialize)]
pub struct RuleFile {
    /// Entries are kept untyped so each one can fail with its own index
    pub projections: Option<Vec<serde_yaml::Value>>,
}

/// One `projections` entry
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawProjection {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// `layer.type`; a type of `*` matches any source type
    pub from: String,
    /// `layer.type`
    pub to: String,
    #[serde(default)]
    pub conditions: Vec<RawCondition>,
    pub rules: Vec<RawRuleBody>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawCondition {
    pub field: String,
    pub operator: String,
    #[serde(default)]
    pub value: Option<PropertyValue>,
    #[serde(default)]
    pub pattern: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawRuleBody {
    /// Overrides the type named in `to`
    #[serde(default)]
    pub create_type: Option<String>,
    pub name_template: String,
    #[serde(default)]
    pub properties: BTreeMap<String, RawPropertySpec>,
    #[serde(default)]
    pub create_bidirectional: bool,
    #[serde(default)]
    pub template: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// A property mapping: a bare source path or the long form
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawPropertySpec {
    Shorthand(String),
    Long {
        source: String,
        #[serde(default)]
        transform: Option<RawTransform>,
        #[serde(default)]
        default: Option<PropertyValue>,
        #[serde(default)]
        required: bool,
    },
}

/// A transform: a kind name or `{ type, value }`
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawTransform {
    Kind(String),
    Full {
        #[serde(rename = "type", alias = "kind")]
        kind: String,
        #[serde(default)]
        value: Option<String>,
    },
}
