// SPDX-License-Identifier: MIT OR Apache-2.0
//! Conversion settings.

use shadenet_network::registry::source_types;
use shadenet_network::FilterChain;

/// Settings passed to every material sync
#[derive(Debug, Clone)]
pub struct ConverterConfig {
    /// Acceptable shader source types, most preferred first
    pub source_types: Vec<String>,
    /// Filters run on each network before conversion
    pub filter_chain: FilterChain,
}

impl ConverterConfig {
    /// Default source type preference: OSL, then compiled plugins
    pub fn default_source_types() -> Vec<String> {
        vec![source_types::OSL.to_string(), source_types::RMAN_CPP.to_string()]
    }

    /// Replace the filter chain
    pub fn with_filter_chain(mut self, filter_chain: FilterChain) -> Self {
        self.filter_chain = filter_chain;
        self
    }

    /// Replace the source type preference
    pub fn with_source_types<S: Into<String>>(mut self, source_types: impl IntoIterator<Item = S>) -> Self {
        self.source_types = source_types.into_iter().map(Into::into).collect();
        self
    }
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            source_types: Self::default_source_types(),
            filter_chain: FilterChain::default(),
        }
    }
}
