//! The twelve layers of the architecture model
//!
//! Layers are ordered from the most abstract (motivation) down to the
//! verification layer (testing). The order is the canonical one used when
//! listing or iterating layers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An architecture layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Layer {
    Motivation,
    Business,
    Security,
    Application,
    Technology,
    Api,
    DataModel,
    Datastore,
    Ux,
    Navigation,
    Apm,
    Testing,
}

impl Layer {
    /// All layers in canonical order
    pub const ALL: [Layer; 12] = [
        Layer::Motivation,
        Layer::Business,
        Layer::Security,
        Layer::Application,
        Layer::Technology,
        Layer::Api,
        Layer::DataModel,
        Layer::Datastore,
        Layer::Ux,
        Layer::Navigation,
        Layer::Apm,
        Layer::Testing,
    ];

    /// The layer name as it appears in element records and rule files
    pub fn as_str(&self) -> &'static str {
        match self {
            Layer::Motivation => "motivation",
            Layer::Business => "business",
            Layer::Security => "security",
            Layer::Application => "application",
            Layer::Technology => "technology",
            Layer::Api => "api",
            Layer::DataModel => "data-model",
            Layer::Datastore => "datastore",
            Layer::Ux => "ux",
            Layer::Navigation => "navigation",
            Layer::Apm => "apm",
            Layer::Testing => "testing",
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name one of the twelve layers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLayer(pub String);

impl fmt::Display for UnknownLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown layer '{}'", self.0)
    }
}

impl std::error::Error for UnknownLayer {}

impl FromStr for Layer {
    type Err = UnknownLayer;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Layer::ALL
            .iter()
            .copied()
            .find(|layer| layer.as_str() == s)
            .ok_or_else(|| UnknownLayer(s.to_string()))
    }
}
