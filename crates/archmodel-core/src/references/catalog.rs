//! Reference-bearing property names and schema-derived reference definitions

use serde::{Deserialize, Serialize};

use crate::errors::Result;

/// Property names that always carry element references
pub const KNOWN_REFERENCE_PROPERTIES: [&str; 22] = [
    "realizes",
    "realizedBy",
    "serves",
    "servedBy",
    "accesses",
    "accessedBy",
    "uses",
    "usedBy",
    "composedOf",
    "partOf",
    "aggregates",
    "assignedTo",
    "triggers",
    "flowsTo",
    "influences",
    "specializes",
    "dependsOn",
    "implements",
    "supports",
    "schemaRef",
    "securedBy",
    "tracesTo",
];

/// Reference type assigned when a property has no entry in the type table
pub const DEFAULT_REFERENCE_TYPE: &str = "association";

/// Reference type for a property name
///
/// Unmapped names, including arbitrary `*Ref`/`*Reference` keys, are
/// associations.
pub fn infer_reference_type(property: &str) -> &'static str {
    match property {
        "realizes" | "realizedBy" => "realization",
        "serves" | "servedBy" => "serving",
        "accesses" | "accessedBy" => "access",
        "uses" | "usedBy" => "usage",
        "composedOf" | "partOf" => "composition",
        "aggregates" => "aggregation",
        "assignedTo" => "assignment",
        "triggers" => "triggering",
        "flowsTo" => "flow",
        "influences" => "influence",
        "specializes" => "specialization",
        "dependsOn" => "dependency",
        "implements" => "implementation",
        "supports" => "support",
        "schemaRef" => "schema",
        "securedBy" => "security",
        "tracesTo" => "trace",
        _ => DEFAULT_REFERENCE_TYPE,
    }
}

/// Whether a key names a reference by convention (`fooRef`, `fooReference`)
pub fn has_reference_suffix(key: &str) -> bool {
    (key.ends_with("Ref") && key.len() > 3) || (key.ends_with("Reference") && key.len() > 9)
}

/// Walk predicate used by the registry
///
/// Known names only count at the top level; suffix-named keys count at any
/// depth.
pub fn is_reference_property(key: &str, depth: usize) -> bool {
    (depth == 0 && KNOWN_REFERENCE_PROPERTIES.contains(&key)) || has_reference_suffix(key)
}

/// How many targets a defined reference may carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    One,
    #[default]
    Many,
}

/// Schema-derived description of one reference-bearing property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceDefinition {
    pub layer: String,
    #[serde(default)]
    pub element_type: Option<String>,
    pub property_path: String,
    pub target_layer: String,
    #[serde(default)]
    pub target_type: Option<String>,
    pub reference_type: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub cardinality: Cardinality,
}

impl ReferenceDefinition {
    /// Whether this definition describes `property_path` on an element of the given layer/type
    pub fn applies_to(&self, layer: &str, element_type: &str, property_path: &str) -> bool {
        self.layer == layer
            && self.property_path == property_path
            && self
                .element_type
                .as_deref()
                .map_or(true, |t| t == element_type)
    }

    /// Whether this definition applies to elements of the given layer/type at all
    pub fn applies_to_element(&self, layer: &str, element_type: &str) -> bool {
        self.layer == layer
            && self
                .element_type
                .as_deref()
                .map_or(true, |t| t == element_type)
    }
}

fn definition(
    layer: &str,
    element_type: &str,
    property_path: &str,
    target_layer: &str,
    target_type: &str,
    reference_type: &str,
    cardinality: Cardinality,
) -> ReferenceDefinition {
    ReferenceDefinition {
        layer: layer.to_string(),
        element_type: Some(element_type.to_string()),
        property_path: property_path.to_string(),
        target_layer: target_layer.to_string(),
        target_type: Some(target_type.to_string()),
        reference_type: reference_type.to_string(),
        required: false,
        cardinality,
    }
}

/// Ordered set of reference definitions; the first applicable one wins
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceDefinitionCatalog {
    definitions: Vec<ReferenceDefinition>,
}

impl ReferenceDefinitionCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The canonical cross-layer links of the twelve-layer model
    pub fn builtin() -> Self {
        use Cardinality::{Many, One};
        Self {
            definitions: vec![
                definition("application", "service", "realizes", "business", "service", "realization", Many),
                definition("application", "component", "realizes", "business", "process", "realization", Many),
                definition("business", "service", "supports", "motivation", "goal", "support", Many),
                definition("api", "operation", "schemaRef", "data-model", "schema", "schema", One),
                definition("datastore", "table", "schemaRef", "data-model", "schema", "schema", One),
                definition("ux", "view", "uses", "api", "operation", "usage", Many),
                definition("navigation", "route", "tracesTo", "ux", "view", "trace", One),
                definition("testing", "test-case", "tracesTo", "motivation", "requirement", "trace", Many),
            ],
        }
    }

    /// Parse a catalog from a YAML list of definitions
    ///
    /// # Errors
    ///
    /// `Serialization` when the YAML does not describe a list of definitions.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let definitions: Vec<ReferenceDefinition> = serde_yaml::from_str(content)?;
        Ok(Self { definitions })
    }

    pub fn add(&mut self, definition: ReferenceDefinition) {
        self.definitions.push(definition);
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReferenceDefinition> {
        self.definitions.iter()
    }

    /// First definition for a property on an element of the given layer/type
    pub fn find(
        &self,
        layer: &str,
        element_type: &str,
        property_path: &str,
    ) -> Option<&ReferenceDefinition> {
        self.definitions
            .iter()
            .find(|d| d.applies_to(layer, element_type, property_path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_properties_infer_types() {
        assert_eq!(infer_reference_type("realizes"), "realization");
        assert_eq!(infer_reference_type("accesses"), "access");
        assert_eq!(infer_reference_type("schemaRef"), "schema");
        assert_eq!(infer_reference_type("ownerRef"), DEFAULT_REFERENCE_TYPE);
    }

    #[test]
    fn test_every_known_property_has_a_type() {
        for property in KNOWN_REFERENCE_PROPERTIES {
            assert_ne!(
                infer_reference_type(property),
                DEFAULT_REFERENCE_TYPE,
                "{} falls back to association",
                property
            );
        }
    }

    #[test]
    fn test_reference_predicate() {
        assert!(is_reference_property("uses", 0));
        assert!(!is_reference_property("uses", 1));
        assert!(is_reference_property("bodyRef", 3));
        assert!(is_reference_property("policyReference", 0));
        assert!(!is_reference_property("Ref", 0));
        assert!(!is_reference_property("description", 0));
    }

    #[test]
    fn test_find_respects_element_type() {
        let catalog = ReferenceDefinitionCatalog::builtin();
        let found = catalog.find("application", "service", "realizes").unwrap();
        assert_eq!(found.target_type.as_deref(), Some("service"));
        assert!(catalog.find("application", "interface", "realizes").is_none());
    }

    #[test]
    fn test_catalog_from_yaml() {
        let yaml = r#"
- layer: security
  property_path: securedBy
  target_layer: security
  reference_type: protection
  required: true
  cardinality: one
"#;
        let catalog = ReferenceDefinitionCatalog::from_yaml_str(yaml).unwrap();
        let def = catalog.find("security", "anything", "securedBy").unwrap();
        assert!(def.required);
        assert_eq!(def.cardinality, Cardinality::One);
    }
}
