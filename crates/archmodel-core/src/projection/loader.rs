//! Rule file parser with validation
//!
//! Parses YAML and validates layers, operators, transforms and patterns up
//! front, so a rule set that loads is a rule set the engine can run.

use regex::Regex;
use std::fs;
use std::path::Path;
use std::time::Instant;

use archmodel_core_types::Layer;

use crate::errors::{ArchModelError, Result};
use crate::model::PropertyValue;
use crate::{log_op_end, log_op_error, log_op_start};

use super::format::{RawCondition, RawProjection, RawPropertySpec, RawRuleBody, RawTransform, RuleFile};
use super::rule::{
    ConditionOperator, ProjectionCondition, ProjectionRule, PropertyMapping, PropertyTransform,
    TransformKind,
};

/// Type placeholder in `from` that matches any source type
const ANY_TYPE: &str = "*";

/// Parse a rule file from a path
pub fn parse_rules_file(path: &Path) -> Result<Vec<ProjectionRule>> {
    let content = fs::read_to_string(path).map_err(|e| ArchModelError::RuleLoad {
        reason: format!("Failed to read rule file {}: {}", path.display(), e),
    })?;

    parse_rules_str(&content)
}

/// Parse rules from YAML text
pub fn parse_rules_str(content: &str) -> Result<Vec<ProjectionRule>> {
    let start = Instant::now();
    log_op_start!("load_rules");

    match parse_and_validate(content) {
        Ok(rules) => {
            log_op_end!(
                "load_rules",
                duration_ms = start.elapsed().as_millis() as u64,
                rule_count = rules.len()
            );
            Ok(rules)
        }
        Err(err) => {
            log_op_error!(
                "load_rules",
                err.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            Err(err)
        }
    }
}

fn parse_and_validate(content: &str) -> Result<Vec<ProjectionRule>> {
    let file: RuleFile = serde_yaml::from_str(content).map_err(|e| ArchModelError::RuleLoad {
        reason: format!("YAML parse error: {}", e),
    })?;

    let entries = file.projections.ok_or_else(|| ArchModelError::RuleLoad {
        reason: "missing 'projections' list".to_string(),
    })?;

    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            let label = format!("projections[{}]", index);
            let raw: RawProjection =
                serde_yaml::from_value(entry).map_err(|e| ArchModelError::InvalidRule {
                    rule: label.clone(),
                    reason: e.to_string(),
                })?;
            let name = raw.name.clone().unwrap_or(label);
            build_rule(raw, name)
        })
        .collect()
}

fn invalid(rule: &str, reason: impl Into<String>) -> ArchModelError {
    ArchModelError::InvalidRule {
        rule: rule.to_string(),
        reason: reason.into(),
    }
}

/// Split `layer.type` and check the layer
fn split_endpoint<'a>(rule: &str, key: &str, endpoint: &'a str) -> Result<(&'a str, Option<&'a str>)> {
    let (layer, element_type) = match endpoint.split_once('.') {
        Some((layer, element_type)) => (layer, Some(element_type)),
        None => (endpoint, None),
    };
    layer
        .parse::<Layer>()
        .map_err(|e| invalid(rule, format!("'{}': {}", key, e)))?;
    Ok((layer, element_type.filter(|t| !t.is_empty() && *t != ANY_TYPE)))
}

fn build_rule(raw: RawProjection, label: String) -> Result<ProjectionRule> {
    let (from_layer, from_type) = split_endpoint(&label, "from", &raw.from)?;
    let (to_layer, to_type) = split_endpoint(&label, "to", &raw.to)?;

    let name = if raw.name.is_some() {
        label
    } else {
        format!("{}-to-{}", raw.from, raw.to)
    };

    let mut bodies = raw.rules.into_iter();
    let body = bodies
        .next()
        .ok_or_else(|| invalid(&name, "'rules' must contain at least one entry"))?;
    let ignored = bodies.count();
    if ignored > 0 {
        tracing::debug!(rule = %name, ignored, "only the first rule body is used");
    }

    let to_type = body
        .create_type
        .clone()
        .or_else(|| to_type.map(str::to_string))
        .ok_or_else(|| invalid(&name, "no target type: set 'create_type' or use 'layer.type' in 'to'"))?;

    if body.name_template.trim().is_empty() {
        return Err(invalid(&name, "'name_template' cannot be empty"));
    }

    let conditions = raw
        .conditions
        .into_iter()
        .map(|condition| build_condition(&name, condition))
        .collect::<Result<Vec<_>>>()?;

    let RawRuleBody {
        name_template,
        properties,
        create_bidirectional,
        template,
        description,
        ..
    } = body;

    let mappings = properties
        .into_iter()
        .map(|(target, spec)| build_mapping(&name, target, spec))
        .collect::<Result<Vec<_>>>()?;

    Ok(ProjectionRule {
        name,
        from_layer: from_layer.to_string(),
        from_type: from_type.map(str::to_string),
        to_layer: to_layer.to_string(),
        to_type,
        name_template,
        mappings,
        conditions,
        create_bidirectional,
        template,
        description: description.or(raw.description),
    })
}

fn build_condition(rule: &str, raw: RawCondition) -> Result<ProjectionCondition> {
    let operator: ConditionOperator = raw
        .operator
        .parse()
        .map_err(|reason: String| invalid(rule, reason))?;

    let mut condition = ProjectionCondition::new(raw.field, operator);
    condition.value = raw.value;
    condition.pattern = raw.pattern;

    match operator {
        ConditionOperator::Exists => {}
        ConditionOperator::Matches => {
            let Some(pattern) = condition.pattern_source().map(str::to_string) else {
                return Err(invalid(
                    rule,
                    format!("condition on '{}': 'matches' needs a pattern", condition.field),
                ));
            };
            let regex = Regex::new(&pattern).map_err(|e| ArchModelError::InvalidPattern {
                pattern: pattern.clone(),
                reason: e.to_string(),
            })?;
            condition = condition.with_regex(regex);
        }
        ConditionOperator::In => {
            if condition.value.as_ref().and_then(PropertyValue::list_items).is_none() {
                return Err(invalid(
                    rule,
                    format!("condition on '{}': 'in' needs a list value", condition.field),
                ));
            }
        }
        _ => {
            if condition.value.is_none() {
                return Err(invalid(
                    rule,
                    format!("condition on '{}': '{}' needs a value", condition.field, operator),
                ));
            }
        }
    }

    Ok(condition)
}

fn build_transform(rule: &str, target: &str, raw: RawTransform) -> Result<PropertyTransform> {
    let (kind, value) = match raw {
        RawTransform::Kind(kind) => (kind, None),
        RawTransform::Full { kind, value } => (kind, value),
    };
    let kind: TransformKind = kind
        .parse()
        .map_err(|reason: String| invalid(rule, format!("property '{}': {}", target, reason)))?;

    if kind.takes_value() && value.is_none() {
        return Err(invalid(
            rule,
            format!("property '{}': transform '{}' needs a value", target, kind),
        ));
    }
    Ok(PropertyTransform { kind, value })
}

fn build_mapping(rule: &str, target: String, spec: RawPropertySpec) -> Result<PropertyMapping> {
    match spec {
        RawPropertySpec::Shorthand(source) => Ok(PropertyMapping::new(source, target)),
        RawPropertySpec::Long {
            source,
            transform,
            default,
            required,
        } => {
            let transform = transform
                .map(|raw| build_transform(rule, &target, raw))
                .transpose()?;
            Ok(PropertyMapping {
                source,
                target,
                default,
                required,
                transform,
            })
        }
    }
}
