// SPDX-License-Identifier: MIT OR Apache-2.0
//! Connection (edge) definitions for material networks.

use crate::node::NodePath;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A connection from an upstream node output.
///
/// Connections are stored on the downstream side, keyed by input name, so
/// only the upstream end is recorded here. The upstream node does not have
/// to exist in the network.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Connection {
    /// Path of the upstream node
    pub upstream_node: NodePath,
    /// Name of the output on the upstream node
    pub upstream_output_name: String,
}

impl Connection {
    /// Create a new connection
    pub fn new(upstream_node: impl Into<NodePath>, upstream_output_name: impl Into<String>) -> Self {
        Self {
            upstream_node: upstream_node.into(),
            upstream_output_name: upstream_output_name.into(),
        }
    }
}

impl fmt::Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {}", self.upstream_output_name, self.upstream_node)
    }
}
