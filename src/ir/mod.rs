//! Intermediate Representation
//!
//! Arena-backed schema nodes, the walker, and the Spec aggregate handed to
//! emitters once every pass has run.

pub mod arena;
pub mod node;
pub mod spec;
pub mod walk;

pub use arena::SchemaArena;
pub use node::{ExtensionSlot, Primitive, SchemaId, SchemaNode, Tags, Variant};
pub use spec::{
    Method, Operation, Parameter, ParameterLocation, PathItem, Response, Serialization,
    SerializationStyle, Spec,
};
pub use walk::{Order, SchemaPath, Walk};
