use serde::{Deserialize, Serialize};

use super::value::{lookup_path, Properties, PropertyValue};

/// An architecture-model element
///
/// Elements are produced by the model loader and are only read here, except
/// for the ones synthesized by projection. The display name lives in the
/// `name` property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Stable identifier, conventionally `<layer>.<type>.<kebab-name>`
    pub id: String,

    /// Element type within its layer (e.g. `service`, `component`)
    #[serde(rename = "type")]
    pub element_type: String,

    /// Layer name
    pub layer: String,

    /// Open property bag
    #[serde(default)]
    pub properties: Properties,
}

impl Element {
    pub fn new(
        id: impl Into<String>,
        element_type: impl Into<String>,
        layer: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            element_type: element_type.into(),
            layer: layer.into(),
            properties: Properties::new(),
        }
    }

    /// Builder-style property setter
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Display name: the `name` property, or the id when unnamed
    pub fn name(&self) -> &str {
        self.properties
            .get("name")
            .and_then(PropertyValue::as_str)
            .unwrap_or(&self.id)
    }

    /// Read a dotted field from the element's attribute view
    ///
    /// `id`, `type` and `layer` read the element attributes, `properties.*`
    /// reads the property bag, and any other key falls back to the property
    /// bag. Missing keys and explicit nulls both read as `None`.
    pub fn field(&self, path: &str) -> Option<PropertyValue> {
        let (head, rest) = match path.split_once('.') {
            Some((head, rest)) => (head, Some(rest)),
            None => (path, None),
        };

        let value = match (head, rest) {
            ("id", None) => Some(PropertyValue::String(self.id.clone())),
            ("type", None) => Some(PropertyValue::String(self.element_type.clone())),
            ("layer", None) => Some(PropertyValue::String(self.layer.clone())),
            ("properties", None) => Some(PropertyValue::Map(self.properties.clone())),
            ("properties", Some(rest)) => lookup_path(&self.properties, rest).cloned(),
            _ => lookup_path(&self.properties, path).cloned(),
        };

        value.filter(|v| !v.is_null())
    }
}
