// SPDX-License-Identifier: MIT OR Apache-2.0
//! Conversion of a material network into an ordered list of shading nodes.
//!
//! The renderer expects nodes in dependency order, so the network is walked
//! depth-first from the root and each node is emitted after everything
//! upstream of it. A node reached along several paths is emitted once, at
//! its first visit.

use crate::connections::convert_connections;
use crate::params::convert_parameters;
use crate::shading_node::{ShadingNode, ShadingNodeKind};
use shadenet_network::builtin::renderman::PXR_DISPLACE;
use shadenet_network::registry::contexts;
use shadenet_network::{MaterialNetwork, MaterialNode, NodePath, ShaderRegistry};
use std::collections::HashSet;

/// Why a node could not be converted
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConvertError {
    /// The node path is not part of the network
    #[error("Unknown material node '{0}'")]
    MissingNode(NodePath),

    /// The registry has no shader for the node's type
    #[error("Unknown shader ID '{type_id}' for node <{node}>")]
    UnknownShader {
        /// Node path
        node: NodePath,
        /// Node type identifier
        type_id: String,
    },

    /// The shader's context does not map to a node kind
    #[error("Unknown shader entry type '{context}' for shader '{shader}' at <{node}>")]
    UnknownContext {
        /// Node path
        node: NodePath,
        /// Shader name
        shader: String,
        /// Context reported by the registry
        context: String,
    },

    /// The shader has no resolved implementation
    #[error("Shader '{shader}' at <{node}> did not provide a valid implementation path")]
    MissingImplementation {
        /// Node path
        node: NodePath,
        /// Shader name
        shader: String,
    },
}

/// Map a registry context to a node kind.
///
/// Displacement patterns are reported with a pattern context and can only be
/// told apart by their type identifier.
pub fn classify(node_type_id: &str, context: &str) -> Option<ShadingNodeKind> {
    match context {
        contexts::BXDF | contexts::SURFACE | contexts::VOLUME => Some(ShadingNodeKind::Bxdf),
        contexts::PATTERN | contexts::OSL => {
            if node_type_id == PXR_DISPLACE {
                Some(ShadingNodeKind::Displacement)
            } else {
                Some(ShadingNodeKind::Pattern)
            }
        }
        contexts::DISPLACEMENT => Some(ShadingNodeKind::Displacement),
        contexts::LIGHT => Some(ShadingNodeKind::Light),
        contexts::LIGHT_FILTER => Some(ShadingNodeKind::LightFilter),
        _ => None,
    }
}

enum Step<'a> {
    Enter(&'a str),
    Emit(&'a str, &'a MaterialNode),
}

/// Converts material networks against a shader registry
pub struct GraphConverter<'r> {
    registry: &'r dyn ShaderRegistry,
    source_types: &'r [String],
}

impl<'r> GraphConverter<'r> {
    /// Create a converter preferring `source_types` in order
    pub fn new(registry: &'r dyn ShaderRegistry, source_types: &'r [String]) -> Self {
        Self {
            registry,
            source_types,
        }
    }

    /// Convert the sub-network rooted at `root`.
    ///
    /// Failures upstream of the root are logged and leave that branch out of
    /// the result. The conversion fails only when the root itself cannot be
    /// converted.
    pub fn convert<'a>(
        &self,
        network: &'a MaterialNetwork,
        root: &'a str,
    ) -> Result<Vec<ShadingNode>, ConvertError> {
        let mut visited: HashSet<&'a str> = HashSet::new();
        let mut failed: HashSet<&'a str> = HashSet::new();
        let mut result = Vec::new();
        let mut stack = vec![Step::Enter(root)];

        while let Some(step) = stack.pop() {
            match step {
                Step::Enter(path) => {
                    // Reached again through another connection
                    if !visited.insert(path) {
                        continue;
                    }
                    let Some(node) = network.node(path) else {
                        if path == root {
                            return Err(ConvertError::MissingNode(NodePath::from(path)));
                        }
                        tracing::warn!(node = path, "Unknown material node");
                        continue;
                    };
                    stack.push(Step::Emit(path, node));
                    let upstream: Vec<&'a str> = node.upstream_nodes().map(NodePath::as_str).collect();
                    stack.extend(upstream.into_iter().rev().map(Step::Enter));
                }
                Step::Emit(path, node) => match self.convert_node(network, path, node, &failed) {
                    Ok(shading_node) => result.push(shading_node),
                    Err(err) if path == root => return Err(err),
                    Err(err) => {
                        tracing::warn!(node = path, error = %err, "Failed to convert material node");
                        failed.insert(path);
                    }
                },
            }
        }

        Ok(result)
    }

    fn convert_node(
        &self,
        network: &MaterialNetwork,
        path: &str,
        node: &MaterialNode,
        failed: &HashSet<&str>,
    ) -> Result<ShadingNode, ConvertError> {
        let node_path = NodePath::from(path);
        let descriptor = self
            .registry
            .shader_node_by_identifier(&node.node_type_id, self.source_types)
            .ok_or_else(|| ConvertError::UnknownShader {
                node: node_path.clone(),
                type_id: node.node_type_id.clone(),
            })?;

        let kind = classify(&node.node_type_id, &descriptor.context).ok_or_else(|| {
            ConvertError::UnknownContext {
                node: node_path.clone(),
                shader: descriptor.name.clone(),
                context: descriptor.context.clone(),
            }
        })?;

        if descriptor.resolved_implementation_uri.is_empty() {
            return Err(ConvertError::MissingImplementation {
                node: node_path,
                shader: descriptor.name.clone(),
            });
        }
        // The renderer picks the backend for these kinds itself
        let name = if kind.selects_by_name() {
            &descriptor.implementation_name
        } else {
            &descriptor.resolved_implementation_uri
        };

        let mut shading_node = ShadingNode::new(kind, path, name.clone());
        convert_parameters(&node_path, node, descriptor, kind, &mut shading_node.params);
        convert_connections(
            network,
            self.registry,
            self.source_types,
            &node_path,
            node,
            descriptor,
            failed,
            &mut shading_node.params,
        );
        Ok(shading_node)
    }
}

/// Convert the sub-network rooted at `root` with a one-off converter
pub fn convert_network(
    network: &MaterialNetwork,
    root: &str,
    registry: &dyn ShaderRegistry,
    source_types: &[String],
) -> Result<Vec<ShadingNode>, ConvertError> {
    GraphConverter::new(registry, source_types).convert(network, root)
}
