// SPDX-License-Identifier: MIT OR Apache-2.0
//! Rewiring of material connections into typed parameter references.

use crate::shading_node::{ParamList, ParamValue, ReferenceType};
use shadenet_network::{MaterialNetwork, MaterialNode, NodePath, PropertyType, ShaderNodeDescriptor, ShaderRegistry};
use std::collections::HashSet;

/// Reference type for a declared input type, if the renderer has one
pub fn reference_type(ty: &PropertyType) -> Option<ReferenceType> {
    match ty {
        PropertyType::Color => Some(ReferenceType::Color),
        PropertyType::Vector => Some(ReferenceType::Vector),
        PropertyType::Point => Some(ReferenceType::Point),
        PropertyType::Normal => Some(ReferenceType::Normal),
        PropertyType::Float => Some(ReferenceType::Float),
        PropertyType::Int => Some(ReferenceType::Int),
        PropertyType::String => Some(ReferenceType::String),
        PropertyType::Struct => Some(ReferenceType::Struct),
        _ => None,
    }
}

/// Renderer syntax for a reference to another node's output
pub fn reference_target(upstream_handle: &str, upstream_output: &str) -> String {
    format!("{upstream_handle}:{upstream_output}")
}

/// Convert every connection of a node into references in `params`.
///
/// A connection is skipped, with a warning, when either end cannot be
/// described or when the upstream node failed to convert.
pub(crate) fn convert_connections(
    network: &MaterialNetwork,
    registry: &dyn ShaderRegistry,
    source_types: &[String],
    node_path: &NodePath,
    node: &MaterialNode,
    descriptor: &ShaderNodeDescriptor,
    failed: &HashSet<&str>,
    params: &mut ParamList,
) {
    for (input, connection) in node.connections() {
        let upstream_path = &connection.upstream_node;
        let Some(upstream_node) = network.node(upstream_path.as_str()) else {
            tracing::warn!(node = %node_path, input, upstream = %upstream_path, "Unknown upstream node");
            continue;
        };
        if failed.contains(upstream_path.as_str()) {
            tracing::warn!(
                node = %node_path,
                input,
                upstream = %upstream_path,
                "Upstream node was not converted; dropping connection"
            );
            continue;
        }
        let Some(upstream_descriptor) =
            registry.shader_node_by_identifier(&upstream_node.node_type_id, source_types)
        else {
            tracing::warn!(node = %node_path, upstream = %upstream_path, "Unknown shader for upstream node");
            continue;
        };

        let Some(downstream_property) = descriptor.input(input) else {
            tracing::warn!(node = %node_path, property = input, "Unknown downstream property");
            continue;
        };
        let Some(upstream_property) = upstream_descriptor.output(&connection.upstream_output_name)
        else {
            tracing::warn!(
                node = %node_path,
                upstream = %upstream_path,
                property = %connection.upstream_output_name,
                "Unknown upstream property"
            );
            continue;
        };

        let Some(ty) = reference_type(&downstream_property.ty) else {
            tracing::warn!(
                node = %node_path,
                shader = %descriptor.name,
                property = input,
                declared = %downstream_property.ty,
                "Unknown type for connected property; ignoring"
            );
            continue;
        };

        params.set(
            downstream_property.implementation_name.clone(),
            ParamValue::Reference {
                ty,
                target: reference_target(upstream_path.as_str(), &upstream_property.implementation_name),
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shadenet_network::builtin::renderman::create_renderman_registry;
    use shadenet_network::registry::{contexts, source_types};
    use shadenet_network::{Connection, InMemoryRegistry, PropertyDescriptor};

    fn prefs() -> Vec<String> {
        vec![source_types::OSL.to_string(), source_types::RMAN_CPP.to_string()]
    }

    /// Convert the connections of the node at `path`
    fn connect(
        network: &MaterialNetwork,
        registry: &InMemoryRegistry,
        path: &str,
        failed: &HashSet<&str>,
    ) -> ParamList {
        let node = network.node(path).unwrap();
        let descriptor = registry.shader_node_by_identifier(&node.node_type_id, &prefs()).unwrap();
        let mut params = ParamList::default();
        convert_connections(
            network,
            registry,
            &prefs(),
            &NodePath::from(path),
            node,
            descriptor,
            failed,
            &mut params,
        );
        params
    }

    #[test]
    fn test_reference_types() {
        let mapped = [
            (PropertyType::Color, ReferenceType::Color),
            (PropertyType::Vector, ReferenceType::Vector),
            (PropertyType::Point, ReferenceType::Point),
            (PropertyType::Normal, ReferenceType::Normal),
            (PropertyType::Float, ReferenceType::Float),
            (PropertyType::Int, ReferenceType::Int),
            (PropertyType::String, ReferenceType::String),
            (PropertyType::Struct, ReferenceType::Struct),
        ];
        for (declared, expected) in mapped {
            assert_eq!(reference_type(&declared), Some(expected), "{declared}");
        }

        assert_eq!(reference_type(&PropertyType::Vstruct), None);
        assert_eq!(reference_type(&PropertyType::Unspecified), None);
        assert_eq!(reference_type(&PropertyType::Other("bxdf".to_string())), None);
    }

    #[test]
    fn test_reference_target_syntax() {
        assert_eq!(reference_target("/M/Tex", "resultRGB"), "/M/Tex:resultRGB");
    }

    #[test]
    fn test_bad_connections_are_dropped_individually() {
        let registry = create_renderman_registry();
        let network = MaterialNetwork::new()
            .with_node("/M/Tex", MaterialNode::new("PxrTexture"))
            .with_node("/M/Layer", MaterialNode::new("PxrLayer"))
            .with_node(
                "/M/Surface",
                MaterialNode::new("PxrLayerSurface")
                    // Vstruct input: no reference type
                    .with_connection("inputMaterial", Connection::new("/M/Layer", "pxrMaterialOut"))
                    .with_connection("diffuseColor", Connection::new("/M/Tex", "noSuchOutput"))
                    .with_connection("noSuchInput", Connection::new("/M/Tex", "resultRGB"))
                    .with_connection("diffuseGain", Connection::new("/M/Missing", "resultR"))
                    .with_connection("specularRoughness", Connection::new("/M/Tex", "resultR")),
            );

        let params = connect(&network, &registry, "/M/Surface", &HashSet::new());

        assert_eq!(params.len(), 1);
        assert_eq!(
            params.get("specularRoughness"),
            Some(&ParamValue::Reference {
                ty: ReferenceType::Float,
                target: "/M/Tex:resultR".to_string(),
            })
        );
    }

    #[test]
    fn test_failed_and_unknown_upstream_shaders_are_dropped() {
        let registry = create_renderman_registry();
        let network = MaterialNetwork::new()
            .with_node("/M/Broken", MaterialNode::new("PxrTexture"))
            .with_node("/M/Mystery", MaterialNode::new("NotAShader"))
            .with_node("/M/Tex", MaterialNode::new("PxrTexture"))
            .with_node(
                "/M/Surface",
                MaterialNode::new("PxrSurface")
                    .with_connection("diffuseColor", Connection::new("/M/Broken", "resultRGB"))
                    .with_connection("specularFaceColor", Connection::new("/M/Mystery", "out"))
                    .with_connection("presence", Connection::new("/M/Tex", "resultA")),
            );

        let failed = HashSet::from(["/M/Broken"]);
        let params = connect(&network, &registry, "/M/Surface", &failed);

        assert_eq!(params.len(), 1);
        assert_eq!(params.get("presence").and_then(ParamValue::reference_target), Some("/M/Tex:resultA"));

        // Once the upstream node converts, its connection comes through
        let params = connect(&network, &registry, "/M/Surface", &HashSet::new());
        assert_eq!(
            params.get("diffuseColor"),
            Some(&ParamValue::Reference {
                ty: ReferenceType::Color,
                target: "/M/Broken:resultRGB".to_string(),
            })
        );
    }

    #[test]
    fn test_implementation_names_are_used_on_both_ends() {
        let mut registry = InMemoryRegistry::new();
        registry.register(
            ShaderNodeDescriptor::new("Src", source_types::OSL, contexts::PATTERN)
                .with_implementation("Src.oso")
                .with_output(
                    PropertyDescriptor::new("out", PropertyType::Color)
                        .with_implementation_name("outColor"),
                ),
        );
        registry.register(
            ShaderNodeDescriptor::new("Dst", source_types::OSL, contexts::BXDF)
                .with_implementation("Dst.oso")
                .with_input(
                    PropertyDescriptor::new("tint", PropertyType::Color)
                        .with_implementation_name("tintColor"),
                ),
        );
        let network = MaterialNetwork::new()
            .with_node("/M/Src", MaterialNode::new("Src"))
            .with_node(
                "/M/Dst",
                MaterialNode::new("Dst").with_connection("tint", Connection::new("/M/Src", "out")),
            );

        let params = connect(&network, &registry, "/M/Dst", &HashSet::new());
        assert_eq!(params.get("tint"), None);
        assert_eq!(params.get("tintColor").and_then(ParamValue::reference_target), Some("/M/Src:outColor"));
    }
}
