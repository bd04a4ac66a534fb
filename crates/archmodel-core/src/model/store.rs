use std::collections::{BTreeMap, HashSet};

use super::element::Element;

/// In-memory snapshot of the architecture model
///
/// Elements are keyed and iterated by id so batch operations see them in a
/// deterministic order. Not thread-safe; one analysis pass owns it.
#[derive(Debug, Clone, Default)]
pub struct Model {
    elements: BTreeMap<String, Element>,
}

impl Model {
    pub fn new() -> Self {
        Self {
            elements: BTreeMap::new(),
        }
    }

    /// Build a model from loaded elements; later duplicates replace earlier ones
    pub fn from_elements(elements: impl IntoIterator<Item = Element>) -> Self {
        let mut model = Self::new();
        for element in elements {
            model.insert(element);
        }
        model
    }

    /// Insert an element, returning the one it replaced
    pub fn insert(&mut self, element: Element) -> Option<Element> {
        self.elements.insert(element.id.clone(), element)
    }

    pub fn get(&self, id: &str) -> Option<&Element> {
        self.elements.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.elements.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// All elements ordered by id
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.elements.values()
    }

    /// Elements of one layer ordered by id
    pub fn elements_in_layer<'a>(&'a self, layer: &'a str) -> impl Iterator<Item = &'a Element> {
        self.elements.values().filter(move |e| e.layer == layer)
    }

    /// Set of all element ids, as used by broken-reference checks
    pub fn ids(&self) -> HashSet<String> {
        self.elements.keys().cloned().collect()
    }
}
