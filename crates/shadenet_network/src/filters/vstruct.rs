// SPDX-License-Identifier: MIT OR Apache-2.0
//! Expansion of vstruct connections into member connections.

use super::MaterialFilter;
use crate::connection::Connection;
use crate::network::MaterialNetwork;
use crate::node::NodePath;
use crate::registry::{PropertyType, ShaderRegistry};

/// Replaces each connection between two vstructs with connections between
/// their matching members.
///
/// A member input that already has its own connection keeps it. The vstruct
/// connection itself is always removed since renderers cannot express it.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolveVstructs;

impl ResolveVstructs {
    /// Configuration name
    pub const NAME: &'static str = "resolveVstructs";
}

impl MaterialFilter for ResolveVstructs {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn apply(
        &self,
        material_id: &str,
        network: &mut MaterialNetwork,
        registry: &dyn ShaderRegistry,
        source_types: &[String],
        errors: &mut Vec<String>,
    ) {
        let paths: Vec<NodePath> = network.node_paths().cloned().collect();

        for path in paths {
            let Some(node) = network.node(path.as_str()) else {
                continue;
            };
            let Some(descriptor) =
                registry.shader_node_by_identifier(&node.node_type_id, source_types)
            else {
                continue;
            };

            let mut removed = Vec::new();
            let mut added: Vec<(String, Connection)> = Vec::new();

            for (input, connections) in &node.input_connections {
                let is_vstruct = descriptor
                    .input(input)
                    .is_some_and(|p| p.ty == PropertyType::Vstruct);
                if !is_vstruct {
                    continue;
                }
                removed.push(input.clone());

                for connection in connections {
                    let upstream = network
                        .node(connection.upstream_node.as_str())
                        .and_then(|n| registry.shader_node_by_identifier(&n.node_type_id, source_types));
                    let Some(upstream) = upstream else {
                        errors.push(format!(
                            "{material_id}: cannot resolve vstruct '{input}' on {path}: unknown upstream node {}",
                            connection.upstream_node
                        ));
                        continue;
                    };
                    let upstream_is_vstruct = upstream
                        .output(&connection.upstream_output_name)
                        .is_some_and(|p| p.ty == PropertyType::Vstruct);
                    if !upstream_is_vstruct {
                        errors.push(format!(
                            "{material_id}: vstruct '{input}' on {path} is connected to non-vstruct output '{}'",
                            connection.upstream_output_name
                        ));
                        continue;
                    }

                    let members = descriptor
                        .inputs
                        .iter()
                        .filter(|p| p.vstruct_member_of.as_deref() == Some(input.as_str()));
                    for member in members {
                        let already_connected = !node.connections_to(&member.name).is_empty()
                            || added.iter().any(|(name, _)| *name == member.name);
                        if already_connected {
                            continue;
                        }
                        let source = upstream.outputs.iter().find(|out| {
                            out.vstruct_member_of.as_deref()
                                == Some(connection.upstream_output_name.as_str())
                                && out.vstruct_member_name == member.vstruct_member_name
                        });
                        if let Some(source) = source {
                            added.push((
                                member.name.clone(),
                                Connection::new(&connection.upstream_node, source.name.clone()),
                            ));
                        }
                    }
                }
            }

            if removed.is_empty() {
                continue;
            }
            if let Some(node) = network.node_mut(path.as_str()) {
                for input in &removed {
                    node.input_connections.shift_remove(input);
                }
                for (input, connection) in added {
                    tracing::debug!(
                        node = %path,
                        input = %input,
                        upstream = %connection,
                        "Resolved vstruct member connection"
                    );
                    node.connect(input, connection);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::renderman::create_renderman_registry;
    use crate::node::MaterialNode;

    fn layered() -> MaterialNetwork {
        MaterialNetwork::new()
            .with_node("/M/Tex", MaterialNode::new("PxrTexture"))
            .with_node("/M/Layer", MaterialNode::new("PxrLayer").with_parameter("diffuseGain", 0.5_f32))
            .with_node(
                "/M/Surface",
                MaterialNode::new("PxrLayerSurface")
                    .with_connection("inputMaterial", Connection::new("/M/Layer", "pxrMaterialOut"))
                    .with_connection("diffuseColor", Connection::new("/M/Tex", "resultRGB")),
            )
    }

    #[test]
    fn test_members_are_connected() {
        let registry = create_renderman_registry();
        let mut network = layered();
        let mut errors = Vec::new();
        ResolveVstructs.apply("/M", &mut network, &registry, &[], &mut errors);

        assert!(errors.is_empty(), "{errors:?}");
        let surface = network.node("/M/Surface").unwrap();
        assert!(surface.connections_to("inputMaterial").is_empty());
        assert_eq!(
            surface.connections_to("diffuseGain"),
            &[Connection::new("/M/Layer", "diffuseGain")]
        );
        assert_eq!(
            surface.connections_to("specularRoughness"),
            &[Connection::new("/M/Layer", "specularRoughness")]
        );
        // Explicit connection wins over the vstruct member
        assert_eq!(
            surface.connections_to("diffuseColor"),
            &[Connection::new("/M/Tex", "resultRGB")]
        );
    }

    #[test]
    fn test_unknown_upstream_is_reported() {
        let registry = create_renderman_registry();
        let mut network = MaterialNetwork::new().with_node(
            "/M/Surface",
            MaterialNode::new("PxrLayerSurface")
                .with_connection("inputMaterial", Connection::new("/M/Gone", "pxrMaterialOut")),
        );
        let mut errors = Vec::new();
        ResolveVstructs.apply("/M", &mut network, &registry, &[], &mut errors);

        assert_eq!(errors.len(), 1);
        assert!(network.node("/M/Surface").unwrap().input_connections.is_empty());
    }
}
