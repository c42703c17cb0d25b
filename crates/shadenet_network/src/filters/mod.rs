// SPDX-License-Identifier: MIT OR Apache-2.0
//! Network filters applied to a material before conversion.
//!
//! A [`FilterChain`] is a plain value: callers build one (or take the
//! default) and pass it along with each conversion.

mod vstruct;

pub use vstruct::ResolveVstructs;

use crate::network::MaterialNetwork;
use crate::registry::ShaderRegistry;
use std::fmt;
use std::sync::Arc;

/// A pass that rewrites a material network in place.
///
/// Problems are appended to `errors`; a filter never aborts the chain.
pub trait MaterialFilter: Send + Sync {
    /// Name used in configuration files
    fn name(&self) -> &str;

    /// Rewrite the network of the material at `material_id`
    fn apply(
        &self,
        material_id: &str,
        network: &mut MaterialNetwork,
        registry: &dyn ShaderRegistry,
        source_types: &[String],
        errors: &mut Vec<String>,
    );
}

/// Ordered list of filters
#[derive(Clone)]
pub struct FilterChain {
    filters: Vec<Arc<dyn MaterialFilter>>,
}

impl FilterChain {
    /// Create an empty chain
    pub fn empty() -> Self {
        Self { filters: Vec::new() }
    }

    /// Append a filter
    pub fn with(mut self, filter: impl MaterialFilter + 'static) -> Self {
        self.filters.push(Arc::new(filter));
        self
    }

    /// Look up a builtin filter by its configuration name
    pub fn builtin(name: &str) -> Option<Arc<dyn MaterialFilter>> {
        match name {
            ResolveVstructs::NAME => Some(Arc::new(ResolveVstructs)),
            _ => None,
        }
    }

    /// Build a chain from builtin filter names.
    ///
    /// Returns the chain and the names that did not match any builtin filter.
    pub fn from_names<'a>(names: impl IntoIterator<Item = &'a str>) -> (Self, Vec<String>) {
        let mut chain = Self::empty();
        let mut unknown = Vec::new();
        for name in names {
            match Self::builtin(name) {
                Some(filter) => chain.filters.push(filter),
                None => unknown.push(name.to_string()),
            }
        }
        (chain, unknown)
    }

    /// Whether the chain has no filters
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Names of the filters in order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.filters.iter().map(|f| f.name())
    }

    /// Run every filter in order, collecting their errors
    pub fn execute(
        &self,
        material_id: &str,
        network: &mut MaterialNetwork,
        registry: &dyn ShaderRegistry,
        source_types: &[String],
    ) -> Vec<String> {
        let mut errors = Vec::new();
        for filter in &self.filters {
            tracing::trace!(material = material_id, filter = filter.name(), "Applying filter");
            filter.apply(material_id, network, registry, source_types, &mut errors);
        }
        errors
    }
}

/// The default chain resolves vstructs.
///
/// There is no preview-material conversion pass, so networks built from
/// `UsdPreviewSurface` nodes need a registry that describes those nodes.
impl Default for FilterChain {
    fn default() -> Self {
        Self::empty().with(ResolveVstructs)
    }
}

impl fmt::Debug for FilterChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
