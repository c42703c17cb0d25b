// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node definitions for material networks.

use crate::connection::Connection;
use crate::value::Value;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Unique path of a node inside a material network (e.g. `/Mat/Tex1`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodePath(pub String);

impl NodePath {
    /// Create a new node path
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// The path as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodePath {
    fn from(path: &str) -> Self {
        Self(path.to_string())
    }
}

impl From<String> for NodePath {
    fn from(path: String) -> Self {
        Self(path)
    }
}

impl From<&NodePath> for NodePath {
    fn from(path: &NodePath) -> Self {
        path.clone()
    }
}

impl Borrow<str> for NodePath {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// A shader node instance in a material network
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MaterialNode {
    /// Shader type identifier, looked up in the shader registry
    pub node_type_id: String,
    /// Authored parameter values by input name
    #[serde(default)]
    pub parameters: IndexMap<String, Value>,
    /// Upstream connections by input name
    #[serde(default)]
    pub input_connections: IndexMap<String, Vec<Connection>>,
}

impl MaterialNode {
    /// Create a node of the given shader type
    pub fn new(node_type_id: impl Into<String>) -> Self {
        Self {
            node_type_id: node_type_id.into(),
            parameters: IndexMap::new(),
            input_connections: IndexMap::new(),
        }
    }

    /// Set a parameter
    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    /// Append a connection to an input
    pub fn with_connection(mut self, input: impl Into<String>, connection: Connection) -> Self {
        self.connect(input, connection);
        self
    }

    /// Append a connection to an input
    pub fn connect(&mut self, input: impl Into<String>, connection: Connection) {
        self.input_connections.entry(input.into()).or_default().push(connection);
    }

    /// Get a parameter by name
    pub fn parameter(&self, name: &str) -> Option<&Value> {
        self.parameters.get(name)
    }

    /// Connections feeding an input
    pub fn connections_to(&self, input: &str) -> &[Connection] {
        self.input_connections.get(input).map_or(&[], Vec::as_slice)
    }

    /// All connections of this node, paired with the input they feed
    pub fn connections(&self) -> impl Iterator<Item = (&str, &Connection)> {
        self.input_connections
            .iter()
            .flat_map(|(input, conns)| conns.iter().map(move |c| (input.as_str(), c)))
    }

    /// Upstream node paths in connection order (may contain repeats)
    pub fn upstream_nodes(&self) -> impl Iterator<Item = &NodePath> {
        self.connections().map(|(_, c)| &c.upstream_node)
    }
}
