use serde::Serialize;
use std::path::Path;
use std::time::Instant;

use archmodel_core_types::Layer;

use crate::config::AnalysisConfig;
use crate::errors::{ArchModelError, Result};
use crate::model::{insert_path, Element, Model, Properties, PropertyValue};
use crate::references::ReferenceRegistry;
use crate::{log_op_end, log_op_error, log_op_start};

use super::condition::{evaluate_all, field_value};
use super::loader::{parse_rules_file, parse_rules_str};
use super::rule::{ProjectionRule, PropertyMapping};
use super::template::{render_template, FilterRenderer, TemplateContext, TemplateRenderer};
use super::transform::{apply_transform, to_kebab_case};

const SOURCE_PREFIX: &str = "source.";
const PROPERTIES_PREFIX: &str = "properties.";

/// An element `project_all` could not project
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedProjection {
    pub source_id: String,
    pub rule: String,
    pub error: ArchModelError,
}

/// Outcome of a batch projection
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectionReport {
    pub projected: Vec<Element>,
    pub skipped: Vec<SkippedProjection>,
}

impl ProjectionReport {
    /// Whether every attempted projection succeeded
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Summary of a loaded rule, for listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleSummary {
    pub name: String,
    pub from: String,
    pub to: String,
    pub condition_count: usize,
    pub mapping_count: usize,
    /// External template the rule points at, passed through uninterpreted
    pub template: Option<String>,
    pub description: Option<String>,
}

/// Derives elements in one layer from elements in another
///
/// Holds an ordered rule list; when several rules apply, the first one wins.
#[derive(Debug)]
pub struct ProjectionEngine {
    rules: Vec<ProjectionRule>,
    renderer: Box<dyn TemplateRenderer>,
    config: AnalysisConfig,
}

impl Default for ProjectionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ProjectionEngine {
    /// An engine with no rules and the built-in filter renderer
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            renderer: Box::new(FilterRenderer),
            config: AnalysisConfig::default(),
        }
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let mut engine = Self::new();
        engine.load_rules(content)?;
        Ok(engine)
    }

    pub fn from_rules_file(path: &Path) -> Result<Self> {
        let mut engine = Self::new();
        engine.load_rules_file(path)?;
        Ok(engine)
    }

    pub fn with_rules(mut self, rules: Vec<ProjectionRule>) -> Self {
        self.rules = rules;
        self
    }

    /// Swap the strategy used for `{{ ... }}` templates
    pub fn with_renderer(mut self, renderer: impl TemplateRenderer + 'static) -> Self {
        self.renderer = Box::new(renderer);
        self
    }

    pub fn with_config(mut self, config: AnalysisConfig) -> Self {
        self.config = config;
        self
    }

    /// Append the rules in a YAML document
    ///
    /// Nothing is added if any entry fails validation.
    ///
    /// # Errors
    ///
    /// `RuleLoad`, `InvalidRule` or `InvalidPattern` for a malformed document.
    pub fn load_rules(&mut self, content: &str) -> Result<usize> {
        let rules = parse_rules_str(content)?;
        let count = rules.len();
        self.rules.extend(rules);
        Ok(count)
    }

    /// Append the rules in a YAML file
    pub fn load_rules_file(&mut self, path: &Path) -> Result<usize> {
        let rules = parse_rules_file(path)?;
        let count = rules.len();
        self.rules.extend(rules);
        Ok(count)
    }

    pub fn add_rule(&mut self, rule: ProjectionRule) {
        self.rules.push(rule);
    }

    pub fn rules(&self) -> &[ProjectionRule] {
        &self.rules
    }

    pub fn rule_summaries(&self) -> Vec<RuleSummary> {
        self.rules
            .iter()
            .map(|rule| RuleSummary {
                name: rule.name.clone(),
                from: match &rule.from_type {
                    Some(t) => format!("{}.{}", rule.from_layer, t),
                    None => format!("{}.*", rule.from_layer),
                },
                to: format!("{}.{}", rule.to_layer, rule.to_type),
                condition_count: rule.conditions.len(),
                mapping_count: rule.mappings.len(),
                template: rule.template.clone(),
                description: rule.description.clone(),
            })
            .collect()
    }

    /// Rules that project `source` into `target_layer`, in load order
    ///
    /// With no target layer, every rule that accepts `source` is returned.
    pub fn find_applicable_rules(
        &self,
        source: &Element,
        target_layer: Option<&str>,
    ) -> Vec<&ProjectionRule> {
        self.rules
            .iter()
            .filter(|rule| rule.matches_source(source, target_layer))
            .filter(|rule| evaluate_all(&rule.conditions, source))
            .collect()
    }

    /// Build the element `rule` would create from `source`, without side effects
    ///
    /// # Errors
    ///
    /// `TemplateVariableMissing`/`InvalidTemplate` when the name cannot be
    /// rendered, `RequiredPropertyMissing` when a required mapping has no value.
    pub fn build_element(&self, source: &Element, rule: &ProjectionRule) -> Result<Element> {
        let context = TemplateContext::new(source);
        let name = render_template(&rule.name_template, &context, self.renderer.as_ref())?;

        let id = format!(
            "{}.{}.{}",
            to_kebab_case(&rule.to_layer),
            to_kebab_case(&rule.to_type),
            to_kebab_case(&name)
        );

        let mut properties = Properties::new();
        properties.insert("name".to_string(), PropertyValue::String(name));

        for mapping in &rule.mappings {
            if let Some(value) = self.resolve_mapping(source, rule, mapping, &context)? {
                let target = mapping
                    .target
                    .strip_prefix(PROPERTIES_PREFIX)
                    .unwrap_or(&mapping.target);
                insert_path(&mut properties, target, value);
            }
        }

        if rule.create_bidirectional {
            add_back_reference(&mut properties, &self.config.bidirectional_property, &source.id);
        }

        Ok(Element {
            id,
            element_type: rule.to_type.clone(),
            layer: rule.to_layer.clone(),
            properties,
        })
    }

    /// Resolve, default, check, then transform one mapping
    ///
    /// `Ok(None)` means the value is absent and the mapping is skipped.
    fn resolve_mapping(
        &self,
        source: &Element,
        rule: &ProjectionRule,
        mapping: &PropertyMapping,
        context: &TemplateContext<'_>,
    ) -> Result<Option<PropertyValue>> {
        let resolved = if mapping.source.contains('{') {
            match render_template(&mapping.source, context, self.renderer.as_ref()) {
                Ok(text) => Some(PropertyValue::String(text)),
                Err(ArchModelError::TemplateVariableMissing { .. }) => None,
                Err(err) => return Err(err),
            }
        } else {
            let path = mapping
                .source
                .strip_prefix(SOURCE_PREFIX)
                .unwrap_or(&mapping.source);
            field_value(source, path)
        };

        let value = match resolved.or_else(|| mapping.default.clone()) {
            Some(value) => value,
            None if mapping.required => {
                return Err(ArchModelError::RequiredPropertyMissing {
                    rule: rule.name.clone(),
                    source_path: mapping.source.clone(),
                    target: mapping.target.clone(),
                })
            }
            None => return Ok(None),
        };

        Ok(Some(match &mapping.transform {
            Some(transform) => apply_transform(value, transform),
            None => value,
        }))
    }

    /// Project `source` into `target_layer`
    ///
    /// Uses `rule` when given, otherwise the first applicable rule. Without
    /// `dry_run` the new element is inserted into `model` and registered with
    /// `registry`.
    ///
    /// # Errors
    ///
    /// `NoApplicableRule` when no rule applies (or the given rule targets
    /// another layer), `ElementAlreadyExists` when the id is taken, and any
    /// error from `build_element`.
    pub fn project_element(
        &self,
        model: &mut Model,
        registry: &mut ReferenceRegistry,
        source: &Element,
        target_layer: &str,
        rule: Option<&ProjectionRule>,
        dry_run: bool,
    ) -> Result<Element> {
        let start = Instant::now();
        log_op_start!("project_element", element_id = %source.id, target_layer = target_layer);

        match self.project_element_inner(model, registry, source, target_layer, rule, dry_run) {
            Ok(element) => {
                log_op_end!(
                    "project_element",
                    duration_ms = start.elapsed().as_millis() as u64,
                    element_id = %element.id
                );
                Ok(element)
            }
            Err(err) => {
                log_op_error!(
                    "project_element",
                    err.clone(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    element_id = %source.id
                );
                Err(err)
            }
        }
    }

    fn project_element_inner(
        &self,
        model: &mut Model,
        registry: &mut ReferenceRegistry,
        source: &Element,
        target_layer: &str,
        rule: Option<&ProjectionRule>,
        dry_run: bool,
    ) -> Result<Element> {
        let no_rule = || ArchModelError::NoApplicableRule {
            element_id: source.id.clone(),
            target_layer: target_layer.to_string(),
        };

        let rule = match rule {
            Some(rule) if rule.to_layer == target_layer => rule,
            Some(_) => return Err(no_rule()),
            None => self
                .find_applicable_rules(source, Some(target_layer))
                .into_iter()
                .next()
                .ok_or_else(no_rule)?,
        };

        let element = self.build_element(source, rule)?;
        if dry_run {
            return Ok(element);
        }

        if model.contains(&element.id) {
            return Err(ArchModelError::ElementAlreadyExists {
                element_id: element.id,
            });
        }
        registry.register_element(&element);
        model.insert(element.clone());
        tracing::debug!(rule = %rule.name, element_id = %element.id, "projected element");
        Ok(element)
    }

    /// Project every element in scope through every rule that applies to it
    ///
    /// `from_layer` and `to_layer` narrow the scope; `None` means any. The
    /// elements are snapshotted first, so elements created here are not
    /// projected again. Per-element failures are logged and reported in
    /// `skipped`; the batch carries on.
    ///
    /// # Errors
    ///
    /// `UnknownLayer` when a scope layer is not one of the twelve layers.
    pub fn project_all(
        &self,
        model: &mut Model,
        registry: &mut ReferenceRegistry,
        from_layer: Option<&str>,
        to_layer: Option<&str>,
        dry_run: bool,
    ) -> Result<ProjectionReport> {
        let start = Instant::now();
        log_op_start!("project_all", dry_run = dry_run);

        for layer in [from_layer, to_layer].into_iter().flatten() {
            if let Err(err) = layer.parse::<Layer>() {
                let err = ArchModelError::from(err);
                log_op_error!(
                    "project_all",
                    err.clone(),
                    duration_ms = start.elapsed().as_millis() as u64
                );
                return Err(err);
            }
        }

        let sources: Vec<Element> = model
            .elements()
            .filter(|element| from_layer.map_or(true, |layer| element.layer == layer))
            .cloned()
            .collect();
        let rules: Vec<&ProjectionRule> = self
            .rules
            .iter()
            .filter(|rule| to_layer.map_or(true, |layer| rule.to_layer == layer))
            .collect();

        let mut report = ProjectionReport::default();
        for source in &sources {
            for rule in &rules {
                if !rule.matches_source(source, None)
                    || !evaluate_all(&rule.conditions, source)
                {
                    continue;
                }
                match self.project_element_inner(
                    model,
                    registry,
                    source,
                    &rule.to_layer,
                    Some(*rule),
                    dry_run,
                ) {
                    Ok(element) => report.projected.push(element),
                    Err(err) => {
                        tracing::warn!(
                            element_id = %source.id,
                            rule = %rule.name,
                            error = %err,
                            "projection skipped"
                        );
                        report.skipped.push(SkippedProjection {
                            source_id: source.id.clone(),
                            rule: rule.name.clone(),
                            error: err,
                        });
                    }
                }
            }
        }

        log_op_end!(
            "project_all",
            duration_ms = start.elapsed().as_millis() as u64,
            projected_count = report.projected.len(),
            skipped_count = report.skipped.len()
        );
        Ok(report)
    }
}

/// Append `source_id` to the back-reference property
///
/// A single string becomes a list once a second id arrives; ids already
/// present are not repeated.
fn add_back_reference(properties: &mut Properties, property: &str, source_id: &str) {
    let updated = match properties.remove(property) {
        None => PropertyValue::String(source_id.to_string()),
        Some(PropertyValue::String(existing)) if existing == source_id => {
            PropertyValue::String(existing)
        }
        Some(PropertyValue::String(existing)) => {
            PropertyValue::StringList(vec![existing, source_id.to_string()])
        }
        Some(PropertyValue::StringList(mut items)) => {
            if !items.iter().any(|item| item == source_id) {
                items.push(source_id.to_string());
            }
            PropertyValue::StringList(items)
        }
        Some(PropertyValue::List(mut items)) => {
            if !items.iter().any(|item| item.as_str() == Some(source_id)) {
                items.push(PropertyValue::String(source_id.to_string()));
            }
            PropertyValue::List(items)
        }
        Some(PropertyValue::Map(_) | PropertyValue::Scalar(_)) => {
            PropertyValue::String(source_id.to_string())
        }
    };
    properties.insert(property.to_string(), updated);
}
