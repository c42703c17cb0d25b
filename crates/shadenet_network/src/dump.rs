// SPDX-License-Identifier: MIT OR Apache-2.0
//! Human-readable listing of a material network, for troubleshooting.

use crate::network::MaterialNetwork;
use std::fmt;

/// Displays every node (path, type, parameters, connections) and every
/// terminal of a network.
pub struct NetworkDump<'a> {
    /// Id of the material owning the network
    pub material_id: &'a str,
    /// The network to list
    pub network: &'a MaterialNetwork,
}

impl<'a> NetworkDump<'a> {
    /// Create a dump of a network
    pub fn new(material_id: &'a str, network: &'a MaterialNetwork) -> Self {
        Self { material_id, network }
    }
}

impl fmt::Display for NetworkDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "material network for {}:", self.material_id)?;
        for (path, node) in self.network.nodes() {
            writeln!(f, "  --Node--")?;
            writeln!(f, "    path: {path}")?;
            writeln!(f, "    type: {}", node.node_type_id)?;
            for (name, value) in &node.parameters {
                writeln!(f, "    param: {name} = {value}")?;
            }
            for (input, connection) in node.connections() {
                writeln!(
                    f,
                    "    connection: {input} <-> {} @ {}",
                    connection.upstream_output_name, connection.upstream_node
                )?;
            }
        }
        writeln!(f, "  --Terminals--")?;
        for (name, connection) in self.network.terminals() {
            writeln!(
                f,
                "    {name} (downstream) <-> {} @ {} (upstream)",
                connection.upstream_output_name, connection.upstream_node
            )?;
        }
        Ok(())
    }
}
