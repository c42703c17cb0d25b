// SPDX-License-Identifier: MIT OR Apache-2.0
//! Material network containing shader nodes and terminals.

use crate::connection::Connection;
use crate::node::{MaterialNode, NodePath};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Well-known terminal names
pub mod terminals {
    /// Surface shading
    pub const SURFACE: &str = "surface";
    /// Volume shading
    pub const VOLUME: &str = "volume";
    /// Displacement
    pub const DISPLACEMENT: &str = "displacement";
    /// Light shader
    pub const LIGHT: &str = "light";
    /// Light filter shader
    pub const LIGHT_FILTER: &str = "lightFilter";
}

/// A material network: shader nodes keyed by path plus named terminals.
///
/// Connections may reference paths that are not part of the network; the
/// converter skips such connections.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MaterialNetwork {
    /// Nodes in the network
    #[serde(default)]
    nodes: IndexMap<NodePath, MaterialNode>,
    /// Terminal name to root connection
    #[serde(default)]
    terminals: IndexMap<String, Connection>,
}

impl MaterialNetwork {
    /// Create a new empty network
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a node
    pub fn add_node(&mut self, path: impl Into<NodePath>, node: MaterialNode) -> NodePath {
        let path = path.into();
        self.nodes.insert(path.clone(), node);
        path
    }

    /// Builder form of [`MaterialNetwork::add_node`]
    pub fn with_node(mut self, path: impl Into<NodePath>, node: MaterialNode) -> Self {
        self.add_node(path, node);
        self
    }

    /// Remove a node. Connections that referenced it are left dangling.
    pub fn remove_node(&mut self, path: &str) -> Option<MaterialNode> {
        self.nodes.shift_remove(path)
    }

    /// Get a node by path
    pub fn node(&self, path: &str) -> Option<&MaterialNode> {
        self.nodes.get(path)
    }

    /// Get a mutable node by path
    pub fn node_mut(&mut self, path: &str) -> Option<&mut MaterialNode> {
        self.nodes.get_mut(path)
    }

    /// Get all nodes with their paths
    pub fn nodes(&self) -> impl Iterator<Item = (&NodePath, &MaterialNode)> {
        self.nodes.iter()
    }

    /// Get all node paths
    pub fn node_paths(&self) -> impl Iterator<Item = &NodePath> + '_ {
        self.nodes.keys()
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Set the root connection of a terminal
    pub fn set_terminal(&mut self, name: impl Into<String>, connection: Connection) {
        self.terminals.insert(name.into(), connection);
    }

    /// Builder form of [`MaterialNetwork::set_terminal`]
    pub fn with_terminal(mut self, name: impl Into<String>, connection: Connection) -> Self {
        self.set_terminal(name, connection);
        self
    }

    /// Remove a terminal
    pub fn remove_terminal(&mut self, name: &str) -> Option<Connection> {
        self.terminals.shift_remove(name)
    }

    /// Get a terminal connection by name
    pub fn terminal(&self, name: &str) -> Option<&Connection> {
        self.terminals.get(name)
    }

    /// Get all terminals
    pub fn terminals(&self) -> impl Iterator<Item = (&str, &Connection)> {
        self.terminals.iter().map(|(name, c)| (name.as_str(), c))
    }

    /// Parse a network from RON text
    pub fn from_ron_str(text: &str) -> Result<Self, NetworkError> {
        ron::from_str(text).map_err(|e| NetworkError::Parse(e.to_string()))
    }

    /// Serialize the network to pretty RON text
    pub fn to_ron_string(&self) -> Result<String, NetworkError> {
        let config = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);
        ron::ser::to_string_pretty(self, config).map_err(|e| NetworkError::Serialize(e.to_string()))
    }
}

/// Error reading or writing a network document
#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    /// The document could not be parsed
    #[error("Failed to parse material network: {0}")]
    Parse(String),

    /// The network could not be serialized
    #[error("Failed to serialize material network: {0}")]
    Serialize(String),
}
