//! Recursive property walk
//!
//! Visits every property whose key satisfies a predicate, descending into
//! nested maps (and maps held in lists) up to a depth limit. The visitor
//! receives the dotted path of each hit; list items contribute their index
//! as a path segment.

use crate::model::{Properties, PropertyValue};

/// A property accepted by the walk predicate
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyHit<'a> {
    /// Dotted path from the top of the property bag
    pub path: String,
    /// The property's own key (last path segment)
    pub key: &'a str,
    /// Nesting depth of the key, 0 for top-level properties
    pub depth: usize,
    pub value: &'a PropertyValue,
}

/// Walk `properties`, calling `visit` for every key accepted by `predicate`
///
/// `predicate` receives the key and its depth. Accepted keys holding a map
/// are not reported themselves; the walk descends into them instead. Maps
/// deeper than `max_depth` are not entered, so `max_depth == 0` only looks at
/// top-level keys.
pub fn walk_properties<'a, P, V>(properties: &'a Properties, predicate: P, max_depth: usize, mut visit: V)
where
    P: Fn(&str, usize) -> bool,
    V: FnMut(PropertyHit<'a>),
{
    walk_map(properties, "", 0, max_depth, &predicate, &mut visit);
}

fn walk_map<'a, P, V>(
    properties: &'a Properties,
    prefix: &str,
    depth: usize,
    max_depth: usize,
    predicate: &P,
    visit: &mut V,
) where
    P: Fn(&str, usize) -> bool,
    V: FnMut(PropertyHit<'a>),
{
    for (key, value) in properties {
        let path = join(prefix, key);
        match value {
            PropertyValue::Map(inner) => {
                if depth < max_depth {
                    walk_map(inner, &path, depth + 1, max_depth, predicate, visit);
                }
            }
            PropertyValue::List(items) => {
                if predicate(key, depth) {
                    visit(PropertyHit {
                        path: path.clone(),
                        key,
                        depth,
                        value,
                    });
                }
                if depth < max_depth {
                    for (index, item) in items.iter().enumerate() {
                        if let PropertyValue::Map(inner) = item {
                            let item_path = join(&path, &index.to_string());
                            walk_map(inner, &item_path, depth + 1, max_depth, predicate, visit);
                        }
                    }
                }
            }
            PropertyValue::String(_) | PropertyValue::StringList(_) | PropertyValue::Scalar(_) => {
                if predicate(key, depth) {
                    visit(PropertyHit {
                        path,
                        key,
                        depth,
                        value,
                    });
                }
            }
        }
    }
}

fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}
