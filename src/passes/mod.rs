//! Transform Passes
//!
//! Rewrite a freshly ingested [`Spec`] in place, in a fixed order:
//! 1. extraction & deduplication
//! 2. compound-fragment extraction
//! 3. path, operation and response naming
//! 4. tag templating
//! 5. inline-schema simplification
//! 6. deterministic ordering
//! 7. operation comments
//!
//! Each pass relies on invariants established by the ones before it.

pub mod comments;
pub mod extract;
pub mod fragments;
pub mod naming;
pub mod order;
pub mod simplify;
pub mod tags;

pub use comments::add_path_comments;
pub use extract::extract_schemas;
pub use fragments::extract_fragments;
pub use naming::{name_operations, name_paths, name_responses};
pub use order::order_resources;
pub use simplify::simplify_inline_schemas;
pub use tags::apply_tags;

use tracing::{debug, info_span};

use crate::config::IrConfig;
use crate::error::Result;
use crate::ir::Spec;
use crate::raw::RawSpec;
use crate::resolve::ingest;

/// State scoped to one resolution run
#[derive(Debug, Default)]
pub struct RunContext {
    unnamed_fragments: usize,
}

impl RunContext {
    /// Next `UnnamedFragment<n>` name of this run
    pub fn next_unnamed_fragment(&mut self) -> String {
        let name = format!("UnnamedFragment{}", self.unnamed_fragments);
        self.unnamed_fragments += 1;
        name
    }
}

/// Runs resolution end to end with one configuration
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: IrConfig,
}

impl Engine {
    pub fn new(config: IrConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &IrConfig {
        &self.config
    }

    /// Resolves `raw` and runs every pass. No partial spec is returned on failure.
    pub fn run(&self, raw: &RawSpec) -> Result<Spec> {
        let span = info_span!("resolve", schemas = raw.schemas.len(), paths = raw.paths.len());
        let _guard = span.enter();

        let mut spec = ingest(raw, &self.config.resolver)?;
        self.transform(&mut spec)?;
        debug!(
            registry = spec.schemas.len(),
            nodes = spec.arena.len(),
            "resolution finished"
        );
        Ok(spec)
    }

    /// Runs every pass over an ingested spec
    pub fn transform(&self, spec: &mut Spec) -> Result<()> {
        let mut ctx = RunContext::default();

        extract_schemas(spec)?;
        extract_fragments(spec, &mut ctx)?;
        name_paths(spec)?;
        name_operations(spec, self.config.naming.operation_case)?;
        name_responses(spec)?;
        apply_tags(spec, &self.config.tags)?;
        simplify_inline_schemas(spec)?;
        order_resources(spec);
        add_path_comments(spec, &self.config.comments);
        Ok(())
    }
}
