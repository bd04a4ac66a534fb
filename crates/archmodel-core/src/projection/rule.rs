//! Projection rule types
//!
//! Rules are built by the loader from YAML or assembled in code with the
//! builder methods on `ProjectionRule`. Once handed to the engine they are
//! never changed.

use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::model::{Element, PropertyValue};

/// Comparison applied by a condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOperator {
    Exists,
    Equals,
    NotEquals,
    Contains,
    Matches,
    Gt,
    Lt,
    In,
}

impl ConditionOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionOperator::Exists => "exists",
            ConditionOperator::Equals => "equals",
            ConditionOperator::NotEquals => "not_equals",
            ConditionOperator::Contains => "contains",
            ConditionOperator::Matches => "matches",
            ConditionOperator::Gt => "gt",
            ConditionOperator::Lt => "lt",
            ConditionOperator::In => "in",
        }
    }
}

impl FromStr for ConditionOperator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "exists" => Ok(ConditionOperator::Exists),
            "equals" => Ok(ConditionOperator::Equals),
            "not_equals" => Ok(ConditionOperator::NotEquals),
            "contains" => Ok(ConditionOperator::Contains),
            "matches" => Ok(ConditionOperator::Matches),
            "gt" => Ok(ConditionOperator::Gt),
            "lt" => Ok(ConditionOperator::Lt),
            "in" => Ok(ConditionOperator::In),
            other => Err(format!("unknown condition operator '{}'", other)),
        }
    }
}

impl fmt::Display for ConditionOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A predicate over one field of the source element
///
/// For `matches` the regex is compiled when the condition is built, so
/// evaluation never recompiles it.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectionCondition {
    /// Dotted field path (`name`, `type`, `properties.criticality`, ...)
    pub field: String,
    pub operator: ConditionOperator,
    pub value: Option<PropertyValue>,
    /// Regex for `matches`
    pub pattern: Option<String>,
    #[serde(skip)]
    regex: Option<Regex>,
}

impl PartialEq for ProjectionCondition {
    fn eq(&self, other: &Self) -> bool {
        self.field == other.field
            && self.operator == other.operator
            && self.value == other.value
            && self.pattern == other.pattern
    }
}

impl ProjectionCondition {
    pub fn new(field: impl Into<String>, operator: ConditionOperator) -> Self {
        Self {
            field: field.into(),
            operator,
            value: None,
            pattern: None,
            regex: None,
        }
    }

    pub fn with_value(mut self, value: impl Into<PropertyValue>) -> Self {
        self.value = Some(value.into());
        self.regex = self.pattern_source().and_then(|p| Regex::new(p).ok());
        self
    }

    /// Set the `matches` pattern; one that does not compile never matches
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self.regex = self.pattern_source().and_then(|p| Regex::new(p).ok());
        self
    }

    /// Attach a regex the loader already compiled
    pub(crate) fn with_regex(mut self, regex: Regex) -> Self {
        self.regex = Some(regex);
        self
    }

    /// The `matches` pattern: `pattern`, falling back to a string `value`
    pub fn pattern_source(&self) -> Option<&str> {
        if self.operator != ConditionOperator::Matches {
            return None;
        }
        match (&self.pattern, &self.value) {
            (Some(pattern), _) => Some(pattern.as_str()),
            (None, Some(PropertyValue::String(pattern))) => Some(pattern.as_str()),
            _ => None,
        }
    }

    /// The compiled `matches` pattern
    pub fn regex(&self) -> Option<&Regex> {
        self.regex.as_ref()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformKind {
    Uppercase,
    Lowercase,
    Kebab,
    Snake,
    Pascal,
    Prefix,
    Suffix,
    Template,
}

impl TransformKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransformKind::Uppercase => "uppercase",
            TransformKind::Lowercase => "lowercase",
            TransformKind::Kebab => "kebab",
            TransformKind::Snake => "snake",
            TransformKind::Pascal => "pascal",
            TransformKind::Prefix => "prefix",
            TransformKind::Suffix => "suffix",
            TransformKind::Template => "template",
        }
    }

    /// Whether the transform needs a `value` argument
    pub fn takes_value(&self) -> bool {
        matches!(
            self,
            TransformKind::Prefix | TransformKind::Suffix | TransformKind::Template
        )
    }
}

impl FromStr for TransformKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "uppercase" => Ok(TransformKind::Uppercase),
            "lowercase" => Ok(TransformKind::Lowercase),
            "kebab" => Ok(TransformKind::Kebab),
            "snake" => Ok(TransformKind::Snake),
            "pascal" => Ok(TransformKind::Pascal),
            "prefix" => Ok(TransformKind::Prefix),
            "suffix" => Ok(TransformKind::Suffix),
            "template" => Ok(TransformKind::Template),
            other => Err(format!("unknown transform '{}'", other)),
        }
    }
}

impl fmt::Display for TransformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyTransform {
    pub kind: TransformKind,
    /// Prefix, suffix, or `{value}` template text
    pub value: Option<String>,
}

impl PropertyTransform {
    pub fn new(kind: TransformKind) -> Self {
        Self { kind, value: None }
    }

    pub fn with_value(kind: TransformKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: Some(value.into()),
        }
    }
}

/// Copies one value from the source element onto the projected element
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyMapping {
    /// Field path, or a template string when it contains `{`
    pub source: String,
    /// Dotted path on the projected element's properties
    pub target: String,
    pub default: Option<PropertyValue>,
    pub required: bool,
    pub transform: Option<PropertyTransform>,
}

impl PropertyMapping {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            default: None,
            required: false,
            transform: None,
        }
    }

    pub fn with_default(mut self, default: impl Into<PropertyValue>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_transform(mut self, transform: PropertyTransform) -> Self {
        self.transform = Some(transform);
        self
    }
}

/// How to derive one element in `to_layer` from an element in `from_layer`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectionRule {
    pub name: String,
    pub from_layer: String,
    /// `None` matches any source type
    pub from_type: Option<String>,
    pub to_layer: String,
    pub to_type: String,
    pub name_template: String,
    pub mappings: Vec<PropertyMapping>,
    pub conditions: Vec<ProjectionCondition>,
    pub create_bidirectional: bool,
    /// Opaque template reference, carried but not interpreted
    pub template: Option<String>,
    pub description: Option<String>,
}

impl ProjectionRule {
    pub fn new(
        name: impl Into<String>,
        from_layer: impl Into<String>,
        to_layer: impl Into<String>,
        to_type: impl Into<String>,
        name_template: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            from_layer: from_layer.into(),
            from_type: None,
            to_layer: to_layer.into(),
            to_type: to_type.into(),
            name_template: name_template.into(),
            mappings: Vec::new(),
            conditions: Vec::new(),
            create_bidirectional: false,
            template: None,
            description: None,
        }
    }

    pub fn with_from_type(mut self, from_type: impl Into<String>) -> Self {
        self.from_type = Some(from_type.into());
        self
    }

    pub fn with_mapping(mut self, mapping: PropertyMapping) -> Self {
        self.mappings.push(mapping);
        self
    }

    pub fn with_condition(mut self, condition: ProjectionCondition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn bidirectional(mut self) -> Self {
        self.create_bidirectional = true;
        self
    }

    /// Layer and type filter; conditions are checked separately
    ///
    /// `target_layer` of `None` accepts any target layer.
    pub fn matches_source(&self, source: &Element, target_layer: Option<&str>) -> bool {
        self.from_layer == source.layer
            && target_layer.map_or(true, |layer| self.to_layer == layer)
            && self
                .from_type
                .as_deref()
                .map_or(true, |t| t == source.element_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_names_round_trip() {
        for name in ["exists", "equals", "not_equals", "contains", "matches", "gt", "lt", "in"] {
            let op: ConditionOperator = name.parse().unwrap();
            assert_eq!(op.as_str(), name);
        }
        assert!("greater".parse::<ConditionOperator>().is_err());
    }

    #[test]
    fn test_transform_value_requirement() {
        assert!(TransformKind::Prefix.takes_value());
        assert!(!TransformKind::Kebab.takes_value());
        assert!("title".parse::<TransformKind>().is_err());
    }

    #[test]
    fn test_source_filter_honours_optional_type() {
        let rule = ProjectionRule::new("r", "business", "application", "service", "{source.name}");
        let process = Element::new("p", "process", "business");
        assert!(rule.matches_source(&process, Some("application")));
        assert!(!rule.matches_source(&process, Some("api")));
        assert!(rule.matches_source(&process, None));

        let typed = rule.with_from_type("service");
        assert!(!typed.matches_source(&process, Some("application")));
        assert!(!typed.matches_source(&process, None));
    }
}
