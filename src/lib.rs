//! Schema IR
//!
//! Resolves the raw schema graph of an API description into a flat, named,
//! cycle-safe and deterministically ordered intermediate model for code
//! emitters.
//!
//! ## Features
//!
//! - **Arena-backed nodes**: every schema node lives in one arena, children and
//!   cycle references are dense indices
//! - **Cycle safety**: a name repeated in the ancestor chain becomes a terminal
//!   reference to that ancestor
//! - **Extraction**: nested creatable schemas are promoted to one registry entry
//!   per name
//! - **Naming**: paths, operations, responses and all-of fragments get
//!   deterministic names
//! - **Tags**: configured metadata templates are rendered onto every node
//!
//! ## Pipeline
//!
//! ```text
//! RawSpec ──ingest──▶ Spec ──extract──▶ fragments ──name paths/ops/responses──▶
//!         ──tags──▶ simplify ──order──▶ comments ──▶ emitters
//! ```

pub mod analysis;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod ir;
pub mod names;
pub mod overrides;
pub mod passes;
pub mod raw;
pub mod render;
pub mod resolve;
pub mod template;

pub use analysis::ReferenceGraph;
pub use config::IrConfig;
pub use error::{IrError, Result};
pub use fingerprint::Fingerprint;
pub use ir::{SchemaArena, SchemaId, SchemaNode, Spec, Variant};
pub use passes::{Engine, RunContext};
pub use raw::{RawSchemaRef, RawSpec};
pub use resolve::Resolver;
