pub mod element;
pub mod store;
pub mod value;

pub use archmodel_core_types::Layer;
pub use element::Element;
pub use store::Model;
pub use value::{insert_path, lookup_path, Properties, PropertyValue, Scalar};
