// SPDX-License-Identifier: MIT OR Apache-2.0
//! Per-material synchronization with the renderer.
//!
//! A [`Material`] owns the renderer networks created for one material.
//! Surface and volume terminals share the material network; displacement
//! gets its own. Terminals that disappear between syncs take their network
//! with them.

use crate::config::ConverterConfig;
use crate::converter::{ConvertError, GraphConverter};
use crate::sink::{NetworkId, NetworkKind, NetworkSink};
use crate::shading_node::ShadingNode;
use shadenet_network::{terminals, MaterialNetwork, NetworkDump, ShaderRegistry};

/// Problem reported by [`Material::sync`]
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SyncError {
    /// The resource handed to sync was not a material network
    #[error("Expected material resource for <{material}> to contain a material network")]
    UnexpectedResource {
        /// Material path
        material: String,
    },

    /// Filters reported problems; the network was still used
    #[error("Filters reported errors for <{material}>: {}", messages.join("; "))]
    Filter {
        /// Material path
        material: String,
        /// Filter messages
        messages: Vec<String>,
    },

    /// A terminal's network could not be converted
    #[error("Failed to convert nodes for <{material}> terminal '{terminal}': {source}")]
    Conversion {
        /// Material path
        material: String,
        /// Terminal name
        terminal: String,
        /// Root failure
        #[source]
        source: ConvertError,
    },

    /// The sink failed to create a network
    #[error("Failed to create {kind} network for <{material}>")]
    CreateFailed {
        /// Material path
        material: String,
        /// Network kind
        kind: NetworkKind,
    },
}

/// Outcome of a sync
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncReport {
    /// Terminals whose networks were committed, with the network they went to
    pub committed: Vec<(String, NetworkKind)>,
    /// Networks deleted because no terminal feeds them anymore
    pub deleted: Vec<NetworkKind>,
    /// Problems encountered; none of them stop the sync
    pub errors: Vec<SyncError>,
}

impl SyncReport {
    /// Whether the sync finished without problems
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Renderer state of one material
#[derive(Debug, Clone)]
pub struct Material {
    id: String,
    network: MaterialNetwork,
    material_id: NetworkId,
    displacement_id: NetworkId,
}

impl Material {
    /// Create a material with no renderer networks
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            network: MaterialNetwork::new(),
            material_id: NetworkId::INVALID,
            displacement_id: NetworkId::INVALID,
        }
    }

    /// Material path
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The network last synced, after filtering
    pub fn network(&self) -> &MaterialNetwork {
        &self.network
    }

    /// Id of the surface/volume network
    pub fn material_id(&self) -> NetworkId {
        self.material_id
    }

    /// Id of the displacement network
    pub fn displacement_id(&self) -> NetworkId {
        self.displacement_id
    }

    /// Whether a surface/volume network exists
    pub fn is_valid(&self) -> bool {
        self.material_id.is_valid()
    }

    /// Bring the renderer networks in line with `resource`.
    ///
    /// `None` stands for a resource that is not a material network; the
    /// material's networks are then removed.
    pub fn sync(
        &mut self,
        resource: Option<&MaterialNetwork>,
        registry: &dyn ShaderRegistry,
        sink: &dyn NetworkSink,
        config: &ConverterConfig,
    ) -> SyncReport {
        let mut report = SyncReport::default();

        let Some(resource) = resource else {
            tracing::warn!(material = %self.id, "Expected material resource to contain a material network");
            report.errors.push(SyncError::UnexpectedResource {
                material: self.id.clone(),
            });
            report.deleted = self.reset(sink);
            return report;
        };

        let mut network = resource.clone();
        if !config.filter_chain.is_empty() {
            let messages =
                config
                    .filter_chain
                    .execute(&self.id, &mut network, registry, &config.source_types);
            if !messages.is_empty() {
                let error = SyncError::Filter {
                    material: self.id.clone(),
                    messages,
                };
                tracing::error!(material = %self.id, "{error}");
                report.errors.push(error);
            }
        }

        if tracing::enabled!(tracing::Level::DEBUG) {
            tracing::debug!("{}", NetworkDump::new(&self.id, &network));
        }

        let converter = GraphConverter::new(registry, &config.source_types);
        let mut material_found = false;
        let mut displacement_found = false;

        for (terminal, connection) in network.terminals() {
            let nodes = match converter.convert(&network, connection.upstream_node.as_str()) {
                Ok(nodes) => nodes,
                Err(source) => {
                    let error = SyncError::Conversion {
                        material: self.id.clone(),
                        terminal: terminal.to_string(),
                        source,
                    };
                    tracing::error!(material = %self.id, terminal, "{error}");
                    report.errors.push(error);
                    continue;
                }
            };

            let (kind, id) = match terminal {
                terminals::SURFACE | terminals::VOLUME => {
                    material_found = true;
                    (NetworkKind::Material, &mut self.material_id)
                }
                terminals::DISPLACEMENT => {
                    displacement_found = true;
                    (NetworkKind::Displacement, &mut self.displacement_id)
                }
                _ => {
                    tracing::debug!(material = %self.id, terminal, "Terminal has no renderer network; skipping commit");
                    continue;
                }
            };

            match commit(sink, kind, id, &nodes) {
                Ok(()) => report.committed.push((terminal.to_string(), kind)),
                Err(kind) => {
                    let error = SyncError::CreateFailed {
                        material: self.id.clone(),
                        kind,
                    };
                    tracing::error!(material = %self.id, terminal, "{error}");
                    report.errors.push(error);
                }
            }
        }

        // Terminals removed by an edit take their networks with them
        if !material_found && release(sink, NetworkKind::Material, &mut self.material_id) {
            report.deleted.push(NetworkKind::Material);
        }
        if !displacement_found && release(sink, NetworkKind::Displacement, &mut self.displacement_id) {
            report.deleted.push(NetworkKind::Displacement);
        }

        self.network = network;
        report
    }

    /// Remove the material's renderer networks, returning the kinds deleted
    pub fn finalize(&mut self, sink: &dyn NetworkSink) -> Vec<NetworkKind> {
        self.reset(sink)
    }

    fn reset(&mut self, sink: &dyn NetworkSink) -> Vec<NetworkKind> {
        let mut deleted = Vec::new();
        if release(sink, NetworkKind::Material, &mut self.material_id) {
            deleted.push(NetworkKind::Material);
        }
        if release(sink, NetworkKind::Displacement, &mut self.displacement_id) {
            deleted.push(NetworkKind::Displacement);
        }
        deleted
    }
}

/// Create the network if it does not exist yet, otherwise replace its nodes
fn commit(
    sink: &dyn NetworkSink,
    kind: NetworkKind,
    id: &mut NetworkId,
    nodes: &[ShadingNode],
) -> Result<(), NetworkKind> {
    if id.is_valid() {
        sink.modify_network(kind, *id, nodes);
        return Ok(());
    }
    *id = sink.create_network(kind, nodes);
    if id.is_valid() {
        Ok(())
    } else {
        Err(kind)
    }
}

/// Delete a network if it exists; returns whether one was deleted
fn release(sink: &dyn NetworkSink, kind: NetworkKind, id: &mut NetworkId) -> bool {
    if !id.is_valid() {
        return false;
    }
    sink.delete_network(kind, *id);
    *id = NetworkId::INVALID;
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::{InMemorySink, SinkCall};
    use shadenet_network::builtin::renderman::create_renderman_registry;
    use shadenet_network::{Connection, MaterialNode};

    fn full_material() -> MaterialNetwork {
        MaterialNetwork::new()
            .with_node(
                "/M/Tex",
                MaterialNode::new("PxrTexture").with_parameter("filename", "a.tex"),
            )
            .with_node(
                "/M/Surface",
                MaterialNode::new("PxrSurface")
                    .with_connection("diffuseColor", Connection::new("/M/Tex", "resultRGB")),
            )
            .with_node(
                "/M/Displace",
                MaterialNode::new("PxrDisplace").with_parameter("dispAmount", 0.2_f32),
            )
            .with_terminal(terminals::SURFACE, Connection::new("/M/Surface", "bxdf_out"))
            .with_terminal(terminals::DISPLACEMENT, Connection::new("/M/Displace", "displacement"))
    }

    #[test]
    fn test_first_sync_creates_networks() {
        let registry = create_renderman_registry();
        let sink = InMemorySink::new();
        let mut material = Material::new("/M");

        let report = material.sync(Some(&full_material()), &registry, &sink, &ConverterConfig::default());

        assert!(report.is_clean(), "{:?}", report.errors);
        assert!(material.is_valid());
        assert!(material.displacement_id().is_valid());
        assert_eq!(sink.network_count(), 2);

        let surface = sink.network(material.material_id()).unwrap();
        assert_eq!(surface.kind, NetworkKind::Material);
        assert_eq!(surface.nodes.len(), 2);
        let displacement = sink.network(material.displacement_id()).unwrap();
        assert_eq!(displacement.nodes.len(), 1);
    }

    #[test]
    fn test_resync_modifies_in_place() {
        let registry = create_renderman_registry();
        let sink = InMemorySink::new();
        let config = ConverterConfig::default();
        let mut material = Material::new("/M");

        material.sync(Some(&full_material()), &registry, &sink, &config);
        let material_id = material.material_id();
        material.sync(Some(&full_material()), &registry, &sink, &config);

        assert_eq!(material.material_id(), material_id);
        assert_eq!(sink.network(material_id).map(|n| n.revision), Some(1));
    }

    #[test]
    fn test_removed_displacement_terminal_is_deleted() {
        let registry = create_renderman_registry();
        let sink = InMemorySink::new();
        let config = ConverterConfig::default();
        let mut material = Material::new("/M");

        material.sync(Some(&full_material()), &registry, &sink, &config);
        let displacement_id = material.displacement_id();
        assert!(displacement_id.is_valid());

        let mut edited = full_material();
        edited.remove_terminal(terminals::DISPLACEMENT);
        let report = material.sync(Some(&edited), &registry, &sink, &config);

        assert_eq!(report.deleted, vec![NetworkKind::Displacement]);
        assert_eq!(material.displacement_id(), NetworkId::INVALID);
        assert!(sink
            .calls()
            .contains(&SinkCall::Delete(NetworkKind::Displacement, displacement_id)));
        assert!(material.is_valid());
    }

    #[test]
    fn test_failed_terminal_does_not_block_others() {
        let registry = create_renderman_registry();
        let sink = InMemorySink::new();
        let mut material = Material::new("/M");

        let mut network = full_material();
        network.set_terminal(terminals::SURFACE, Connection::new("/M/Missing", "bxdf_out"));
        let report = material.sync(Some(&network), &registry, &sink, &ConverterConfig::default());

        assert_eq!(report.errors.len(), 1);
        assert!(matches!(report.errors[0], SyncError::Conversion { .. }));
        assert!(!material.is_valid());
        assert!(material.displacement_id().is_valid());
        assert_eq!(report.committed, vec![(terminals::DISPLACEMENT.to_string(), NetworkKind::Displacement)]);
    }

    #[test]
    fn test_create_failure_is_reported() {
        let registry = create_renderman_registry();
        let sink = InMemorySink::rejecting_creates();
        let mut material = Material::new("/M");

        let report = material.sync(Some(&full_material()), &registry, &sink, &ConverterConfig::default());
        let failures = report
            .errors
            .iter()
            .filter(|e| matches!(e, SyncError::CreateFailed { .. }))
            .count();
        assert_eq!(failures, 2);
        assert!(!material.is_valid());
    }

    #[test]
    fn test_non_network_resource_resets() {
        let registry = create_renderman_registry();
        let sink = InMemorySink::new();
        let config = ConverterConfig::default();
        let mut material = Material::new("/M");

        material.sync(Some(&full_material()), &registry, &sink, &config);
        let report = material.sync(None, &registry, &sink, &config);

        assert_eq!(report.deleted, vec![NetworkKind::Material, NetworkKind::Displacement]);
        assert_eq!(sink.network_count(), 0);
        assert!(!material.is_valid());
    }

    #[test]
    fn test_vstructs_are_resolved_before_conversion() {
        let registry = create_renderman_registry();
        let sink = InMemorySink::new();
        let mut material = Material::new("/M");
        let network = MaterialNetwork::new()
            .with_node("/M/Layer", MaterialNode::new("PxrLayer"))
            .with_node(
                "/M/Surface",
                MaterialNode::new("PxrLayerSurface")
                    .with_connection("inputMaterial", Connection::new("/M/Layer", "pxrMaterialOut")),
            )
            .with_terminal(terminals::SURFACE, Connection::new("/M/Surface", "bxdf_out"));

        let report = material.sync(Some(&network), &registry, &sink, &ConverterConfig::default());
        assert!(report.is_clean(), "{:?}", report.errors);

        let committed = sink.network(material.material_id()).unwrap();
        let surface = committed.nodes.last().unwrap();
        assert_eq!(
            surface.params.get("diffuseGain").and_then(|p| p.reference_target()),
            Some("/M/Layer:diffuseGain")
        );
        assert!(material.network().node("/M/Surface").unwrap().connections_to("inputMaterial").is_empty());
    }

    #[test]
    fn test_finalize_removes_networks() {
        let registry = create_renderman_registry();
        let sink = InMemorySink::new();
        let mut material = Material::new("/M");
        material.sync(Some(&full_material()), &registry, &sink, &ConverterConfig::default());

        assert_eq!(
            material.finalize(&sink),
            vec![NetworkKind::Material, NetworkKind::Displacement]
        );
        assert_eq!(sink.network_count(), 0);
        assert!(!material.is_valid());
        assert!(!material.displacement_id().is_valid());
    }
}
