//! Condition evaluation against a source element

use regex::Regex;
use std::cmp::Ordering;

use crate::model::{Element, PropertyValue};

use super::rule::{ConditionOperator, ProjectionCondition};

/// Read a condition or mapping field from the element
///
/// `name` is the display name (falling back to the id); everything else goes
/// through `Element::field`.
pub(crate) fn field_value(element: &Element, field: &str) -> Option<PropertyValue> {
    match field {
        "name" => Some(PropertyValue::String(element.name().to_string())),
        _ => element.field(field),
    }
}

/// Strict equality, except that integers and floats compare by value
fn values_equal(left: &PropertyValue, right: &PropertyValue) -> bool {
    match (left.as_f64(), right.as_f64()) {
        (Some(a), Some(b)) => a == b,
        _ => left == right,
    }
}

fn compare(left: &PropertyValue, right: &PropertyValue) -> Option<Ordering> {
    if let (Some(a), Some(b)) = (left.as_f64(), right.as_f64()) {
        return a.partial_cmp(&b);
    }
    match (left, right) {
        (PropertyValue::String(a), PropertyValue::String(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

/// Substring of the stringified value, or an exact item of a list
fn contains(actual: &PropertyValue, needle: &PropertyValue) -> bool {
    let item_match = match actual {
        PropertyValue::StringList(items) => needle
            .as_str()
            .is_some_and(|needle| items.iter().any(|item| item == needle)),
        PropertyValue::List(items) => items.iter().any(|item| values_equal(item, needle)),
        _ => false,
    };
    item_match || actual.to_string().contains(&needle.to_string())
}

fn member_of(actual: &PropertyValue, candidates: &PropertyValue) -> bool {
    match candidates.list_items() {
        Some(items) => items.iter().any(|item| values_equal(actual, item)),
        None => false,
    }
}

fn matches_pattern(actual: &PropertyValue, condition: &ProjectionCondition) -> bool {
    if let Some(re) = condition.regex() {
        return re.is_match(&actual.to_string());
    }
    let Some(pattern) = condition.pattern_source() else {
        return false;
    };
    // Only reached when the pattern fields were edited after construction
    match Regex::new(pattern) {
        Ok(re) => re.is_match(&actual.to_string()),
        Err(err) => {
            tracing::debug!(pattern, error = %err, "condition pattern does not compile");
            false
        }
    }
}

/// Whether `element` satisfies `condition`
///
/// An absent field only satisfies `not_equals`.
pub fn evaluate(condition: &ProjectionCondition, element: &Element) -> bool {
    let actual = field_value(element, &condition.field);

    if condition.operator == ConditionOperator::Exists {
        return actual.is_some();
    }
    if condition.operator == ConditionOperator::NotEquals {
        return !equals(actual.as_ref(), condition.value.as_ref());
    }

    let Some(actual) = actual else {
        return false;
    };

    match condition.operator {
        ConditionOperator::Equals => equals(Some(&actual), condition.value.as_ref()),
        ConditionOperator::Contains => condition
            .value
            .as_ref()
            .is_some_and(|needle| contains(&actual, needle)),
        ConditionOperator::Matches => matches_pattern(&actual, condition),
        ConditionOperator::Gt => condition
            .value
            .as_ref()
            .and_then(|expected| compare(&actual, expected))
            .is_some_and(|ord| ord == Ordering::Greater),
        ConditionOperator::Lt => condition
            .value
            .as_ref()
            .and_then(|expected| compare(&actual, expected))
            .is_some_and(|ord| ord == Ordering::Less),
        ConditionOperator::In => condition
            .value
            .as_ref()
            .is_some_and(|candidates| member_of(&actual, candidates)),
        ConditionOperator::Exists | ConditionOperator::NotEquals => false,
    }
}

fn equals(actual: Option<&PropertyValue>, expected: Option<&PropertyValue>) -> bool {
    match (actual, expected) {
        (Some(actual), Some(expected)) => values_equal(actual, expected),
        _ => false,
    }
}

/// Whether `element` satisfies every condition; an empty list always holds
pub fn evaluate_all(conditions: &[ProjectionCondition], element: &Element) -> bool {
    conditions.iter().all(|condition| evaluate(condition, element))
}
