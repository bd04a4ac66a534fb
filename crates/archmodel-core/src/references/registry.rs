use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use super::catalog::{
    infer_reference_type, is_reference_property, Cardinality, ReferenceDefinition,
    ReferenceDefinitionCatalog,
};
use super::walk::walk_properties;
use crate::config::{AnalysisConfig, DEFAULT_REFERENCE_SCAN_DEPTH};
use crate::graph::{bfs_levels, DependencyGraph};
use crate::model::{Element, Model};

/// A typed link from a property of one element to another element's id
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reference {
    pub source: String,
    pub target: String,
    /// Dotted path of the property that carried the target id
    pub property: String,
    pub reference_type: String,
    pub required: bool,
}

/// Summary counts over everything registered so far
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReferenceStatistics {
    pub total: usize,
    pub by_type: BTreeMap<String, usize>,
    pub distinct_sources: usize,
    pub distinct_targets: usize,
}

/// A reference (or missing reference) that disagrees with its definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefinitionViolation {
    /// The target exists but lives in another layer than defined
    WrongTargetLayer {
        reference: Reference,
        expected: String,
        actual: String,
    },
    /// The target exists in the right layer but has another type than defined
    WrongTargetType {
        reference: Reference,
        expected: String,
        actual: String,
    },
    /// A required property carries no reference
    MissingRequired {
        element_id: String,
        property_path: String,
    },
    /// A single-valued property carries several references
    TooManyTargets {
        element_id: String,
        property_path: String,
        count: usize,
    },
}

/// Index of references extracted from element properties
///
/// Registration is append-only: registering the same element twice records
/// its references twice. Call `clear()` and re-register when the element set
/// changes.
#[derive(Debug, Clone)]
pub struct ReferenceRegistry {
    references: Vec<Reference>,
    by_source: HashMap<String, Vec<Reference>>,
    by_target: HashMap<String, Vec<Reference>>,
    by_type: HashMap<String, Vec<Reference>>,
    definitions: ReferenceDefinitionCatalog,
    scan_depth: usize,
    impact_max_depth: Option<usize>,
}

impl Default for ReferenceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ReferenceRegistry {
    pub fn new() -> Self {
        Self {
            references: Vec::new(),
            by_source: HashMap::new(),
            by_target: HashMap::new(),
            by_type: HashMap::new(),
            definitions: ReferenceDefinitionCatalog::new(),
            scan_depth: DEFAULT_REFERENCE_SCAN_DEPTH,
            impact_max_depth: None,
        }
    }

    /// Scan depth and impact hop limit come from `config`
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new()
            .with_scan_depth(config.reference_scan_depth)
            .with_impact_max_depth(config.impact_max_depth)
    }

    /// Label extracted references using schema-derived definitions
    pub fn with_definitions(mut self, definitions: ReferenceDefinitionCatalog) -> Self {
        self.definitions = definitions;
        self
    }

    /// Limit how deep nested property maps are scanned
    pub fn with_scan_depth(mut self, depth: usize) -> Self {
        self.scan_depth = depth;
        self
    }

    /// Hop limit `impact_analysis` falls back to when the caller passes none
    pub fn with_impact_max_depth(mut self, depth: Option<usize>) -> Self {
        self.impact_max_depth = depth;
        self
    }

    pub fn definitions(&self) -> &ReferenceDefinitionCatalog {
        &self.definitions
    }

    /// Register every element of a model
    pub fn register_model(&mut self, model: &Model) -> usize {
        model.elements().map(|e| self.register_element(e)).sum()
    }

    /// Extract and index the references carried by an element
    ///
    /// Returns how many references were added.
    pub fn register_element(&mut self, element: &Element) -> usize {
        let mut extracted = Vec::new();

        walk_properties(
            &element.properties,
            is_reference_property,
            self.scan_depth,
            |hit| {
                let definition =
                    self.definitions
                        .find(&element.layer, &element.element_type, &hit.path);
                let (reference_type, required) = match definition {
                    Some(def) => (def.reference_type.clone(), def.required),
                    None => (infer_reference_type(hit.key).to_string(), false),
                };

                for target in hit.value.strings() {
                    if target.is_empty() {
                        continue;
                    }
                    extracted.push(Reference {
                        source: element.id.clone(),
                        target: target.to_string(),
                        property: hit.path.clone(),
                        reference_type: reference_type.clone(),
                        required,
                    });
                }
            },
        );

        let count = extracted.len();
        if count > 0 {
            tracing::debug!(
                element_id = %element.id,
                reference_count = count,
                "registered element references"
            );
        }
        for reference in extracted {
            self.index(reference);
        }
        count
    }

    fn index(&mut self, reference: Reference) {
        self.by_source
            .entry(reference.source.clone())
            .or_default()
            .push(reference.clone());
        self.by_target
            .entry(reference.target.clone())
            .or_default()
            .push(reference.clone());
        self.by_type
            .entry(reference.reference_type.clone())
            .or_default()
            .push(reference.clone());
        self.references.push(reference);
    }

    /// Drop every registered reference; definitions and settings are kept
    pub fn clear(&mut self) {
        self.references.clear();
        self.by_source.clear();
        self.by_target.clear();
        self.by_type.clear();
    }

    pub fn len(&self) -> usize {
        self.references.len()
    }

    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }

    /// All references in registration order
    pub fn all_references(&self) -> &[Reference] {
        &self.references
    }

    pub fn references_from(&self, source: &str) -> &[Reference] {
        self.by_source.get(source).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn references_to(&self, target: &str) -> &[Reference] {
        self.by_target.get(target).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn references_by_type(&self, reference_type: &str) -> &[Reference] {
        self.by_type
            .get(reference_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// References whose target is not among `valid_ids`
    pub fn find_broken_references(&self, valid_ids: &HashSet<String>) -> Vec<&Reference> {
        self.references
            .iter()
            .filter(|r| !valid_ids.contains(&r.target))
            .collect()
    }

    /// Build a directed graph of everything registered so far
    pub fn dependency_graph(&self) -> DependencyGraph {
        DependencyGraph::from_references(&self.references)
    }

    /// Reference cycles, each as an ordered list of element ids
    pub fn find_circular_dependencies(&self) -> Vec<Vec<String>> {
        self.dependency_graph().find_cycles()
    }

    /// Elements affected by a change to `element_id`
    ///
    /// Follows incoming references breadth-first; `max_depth` bounds the hop
    /// count. `None` uses the configured impact depth, which is unlimited
    /// unless set. The element itself is excluded.
    pub fn impact_analysis(&self, element_id: &str, max_depth: Option<usize>) -> BTreeSet<String> {
        bfs_levels(element_id, max_depth.or(self.impact_max_depth), |node| {
            self.references_to(node)
                .iter()
                .map(|r| r.source.as_str())
                .collect()
        })
    }

    pub fn statistics(&self) -> ReferenceStatistics {
        let mut by_type = BTreeMap::new();
        for (reference_type, refs) in &self.by_type {
            by_type.insert(reference_type.clone(), refs.len());
        }
        ReferenceStatistics {
            total: self.references.len(),
            by_type,
            distinct_sources: self.by_source.len(),
            distinct_targets: self.by_target.len(),
        }
    }

    /// Check registered references of model elements against the definitions
    ///
    /// Targets missing from the model are left to `find_broken_references`.
    pub fn find_definition_violations(&self, model: &Model) -> Vec<DefinitionViolation> {
        let mut violations = Vec::new();

        for element in model.elements() {
            let outgoing = self.references_from(&element.id);

            for reference in outgoing {
                let Some(definition) =
                    self.definitions
                        .find(&element.layer, &element.element_type, &reference.property)
                else {
                    continue;
                };
                let Some(target) = model.get(&reference.target) else {
                    continue;
                };
                if let Some(violation) = check_target(definition, reference, target) {
                    violations.push(violation);
                }
            }

            for definition in self
                .definitions
                .iter()
                .filter(|d| d.applies_to_element(&element.layer, &element.element_type))
            {
                let count = outgoing
                    .iter()
                    .filter(|r| r.property == definition.property_path)
                    .count();
                if definition.required && count == 0 {
                    violations.push(DefinitionViolation::MissingRequired {
                        element_id: element.id.clone(),
                        property_path: definition.property_path.clone(),
                    });
                }
                if definition.cardinality == Cardinality::One && count > 1 {
                    violations.push(DefinitionViolation::TooManyTargets {
                        element_id: element.id.clone(),
                        property_path: definition.property_path.clone(),
                        count,
                    });
                }
            }
        }

        violations
    }
}

fn check_target(
    definition: &ReferenceDefinition,
    reference: &Reference,
    target: &Element,
) -> Option<DefinitionViolation> {
    if target.layer != definition.target_layer {
        return Some(DefinitionViolation::WrongTargetLayer {
            reference: reference.clone(),
            expected: definition.target_layer.clone(),
            actual: target.layer.clone(),
        });
    }
    match &definition.target_type {
        Some(expected) if *expected != target.element_type => {
            Some(DefinitionViolation::WrongTargetType {
                reference: reference.clone(),
                expected: expected.clone(),
                actual: target.element_type.clone(),
            })
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_and_list_values_yield_one_reference_each() {
        let mut registry = ReferenceRegistry::new();
        let element = Element::new("app", "service", "application")
            .with_property("realizes", "biz")
            .with_property("uses", vec!["db", "cache", ""]);

        assert_eq!(registry.register_element(&element), 3);
        assert_eq!(registry.references_by_type("realization").len(), 1);
        assert_eq!(registry.references_by_type("usage").len(), 2);
    }

    #[test]
    fn test_definition_overrides_inferred_type() {
        let mut catalog = ReferenceDefinitionCatalog::new();
        catalog.add(ReferenceDefinition {
            layer: "application".to_string(),
            element_type: None,
            property_path: "ownerRef".to_string(),
            target_layer: "business".to_string(),
            target_type: Some("actor".to_string()),
            reference_type: "assignment".to_string(),
            required: true,
            cardinality: Cardinality::One,
        });
        let mut registry = ReferenceRegistry::new().with_definitions(catalog);
        registry.register_element(
            &Element::new("app", "service", "application").with_property("ownerRef", "team"),
        );

        let refs = registry.references_from("app");
        assert_eq!(refs[0].reference_type, "assignment");
        assert!(refs[0].required);
    }

    #[test]
    fn test_clear_keeps_definitions() {
        let mut registry =
            ReferenceRegistry::new().with_definitions(ReferenceDefinitionCatalog::builtin());
        registry.register_element(&Element::new("a", "service", "application").with_property("uses", "b"));
        registry.clear();

        assert!(registry.is_empty());
        assert!(registry.references_to("b").is_empty());
        assert!(!registry.definitions().is_empty());
    }
}
