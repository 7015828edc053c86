//! Wraeblast Serializer - element model to canonical filter text
//!
//! Serialization is a pure function of the filter and [`SerializerOptions`].
//! Output is deterministic: rules keep their order, and each rule lists its
//! conditions and then its actions in the order they were written.

pub mod options;
pub mod standard;

pub use options::SerializerOptions;
pub use standard::{dumps, serialize_action, serialize_condition, serialize_rule, StandardSerializer};
