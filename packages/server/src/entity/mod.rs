//! Stored shape of a property document and its embedded sub-documents.
//!
//! Element names follow the PascalCase layout of the `Properties` collection.
//! Relations that may be missing from a stored document are `Option`s here and
//! are only defaulted when projected by [`crate::models::property`].

pub mod owner;
pub mod property;
pub mod property_image;
pub mod property_trace;

pub use owner::Owner;
pub use property::Property;
pub use property_image::PropertyImage;
pub use property_trace::PropertyTrace;
