//! Request-scoped orchestration of catalog reads.

pub mod property;

pub use property::{PropertyService, property_service};
