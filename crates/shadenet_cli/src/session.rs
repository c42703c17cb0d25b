// SPDX-License-Identifier: MIT OR Apache-2.0
//! A conversion session: one material synced into an in-memory sink,
//! possibly many times.

use crate::loader::{load_network, LoadError};
use crate::package::ShaderPackage;
use serde::Serialize;
use shadenet_network::{InMemoryRegistry, MaterialNetwork, NetworkDump};
use shadenet_rman::{ConverterConfig, InMemorySink, Material, NetworkId, NetworkKind, ShadingNode, SyncReport};
use std::fmt::Write as _;
use std::path::Path;

/// JSON shape of one committed network
#[derive(Debug, Serialize)]
struct NetworkOutput<'a> {
    id: NetworkId,
    kind: NetworkKind,
    revision: u32,
    nodes: &'a [ShadingNode],
}

/// JSON shape of a sync
#[derive(Debug, Serialize)]
struct SyncOutput<'a> {
    material: &'a str,
    committed: &'a [(String, NetworkKind)],
    deleted: &'a [NetworkKind],
    errors: Vec<String>,
    networks: Vec<NetworkOutput<'a>>,
}

/// State kept between syncs of one material
pub struct Session {
    material: Material,
    registry: InMemoryRegistry,
    sink: InMemorySink,
    config: ConverterConfig,
    package: ShaderPackage,
}

impl Session {
    /// Create a session for `material_id`
    pub fn new(
        material_id: impl Into<String>,
        registry: InMemoryRegistry,
        config: ConverterConfig,
        package: ShaderPackage,
    ) -> Self {
        Self {
            material: Material::new(material_id),
            registry,
            sink: InMemorySink::new(),
            config,
            package,
        }
    }

    /// The synced material
    pub fn material(&self) -> &Material {
        &self.material
    }

    /// Where committed networks end up
    pub fn sink(&self) -> &InMemorySink {
        &self.sink
    }

    /// Sync against an in-memory network; `None` removes the material's networks
    pub fn sync_network(&mut self, network: Option<&MaterialNetwork>) -> SyncReport {
        self.material.sync(network, &self.registry, &self.sink, &self.config)
    }

    /// Load a network file and sync against it
    pub fn sync_file(&mut self, path: &Path) -> Result<SyncReport, LoadError> {
        let network = load_network(path, &self.package)?;
        Ok(self.sync_network(Some(&network)))
    }

    /// Remove the material's networks
    pub fn finalize(&mut self) -> SyncReport {
        SyncReport {
            deleted: self.material.finalize(&self.sink),
            ..SyncReport::default()
        }
    }

    /// Listing of the last synced network, after filtering
    pub fn dump(&self) -> String {
        NetworkDump::new(self.material.id(), self.material.network()).to_string()
    }

    /// Plain text description of a sync and the material's live networks
    pub fn summary(&self, report: &SyncReport) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "material {}:", self.material.id());
        for (terminal, kind) in &report.committed {
            let _ = writeln!(out, "  committed {terminal} -> {kind} network");
        }
        for kind in &report.deleted {
            let _ = writeln!(out, "  deleted {kind} network");
        }
        for error in &report.errors {
            let _ = writeln!(out, "  error: {error}");
        }
        for (id, network) in self.sink.networks() {
            let _ = writeln!(out, "  {} network {id} (revision {})", network.kind, network.revision);
            for node in &network.nodes {
                let _ = writeln!(out, "    {} {} [{}]", node.kind, node.handle, node.name);
                for (name, value) in node.params.iter() {
                    let _ = writeln!(out, "      {name} = {value:?}");
                }
            }
        }
        out
    }

    /// JSON description of a sync and the material's live networks
    pub fn to_json(&self, report: &SyncReport) -> serde_json::Result<String> {
        let networks = self.sink.networks();
        let output = SyncOutput {
            material: self.material.id(),
            committed: &report.committed,
            deleted: &report.deleted,
            errors: report.errors.iter().map(ToString::to_string).collect(),
            networks: networks
                .iter()
                .map(|(id, network)| NetworkOutput {
                    id: *id,
                    kind: network.kind,
                    revision: network.revision,
                    nodes: &network.nodes,
                })
                .collect(),
        };
        serde_json::to_string_pretty(&output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shadenet_network::builtin::renderman::create_renderman_registry;
    use shadenet_network::{terminals, Connection, MaterialNode};

    fn session() -> Session {
        Session::new(
            "/M",
            create_renderman_registry(),
            ConverterConfig::default(),
            ShaderPackage::default(),
        )
    }

    fn network() -> MaterialNetwork {
        MaterialNetwork::new()
            .with_node(
                "/M/Surface",
                MaterialNode::new("PxrSurface").with_parameter("diffuseGain", 0.5_f32),
            )
            .with_terminal(terminals::SURFACE, Connection::new("/M/Surface", "bxdf_out"))
    }

    #[test]
    fn test_json_lists_committed_networks() {
        let mut session = session();
        let report = session.sync_network(Some(&network()));
        let json: serde_json::Value = serde_json::from_str(&session.to_json(&report).unwrap()).unwrap();

        assert_eq!(json["material"], "/M");
        assert_eq!(json["networks"].as_array().map(Vec::len), Some(1));
        assert_eq!(json["networks"][0]["kind"], "Material");
        assert_eq!(json["networks"][0]["nodes"][0]["handle"], "/M/Surface");
        assert_eq!(json["errors"].as_array().map(Vec::len), Some(0));
    }

    #[test]
    fn test_summary_and_dump() {
        let mut session = session();
        let report = session.sync_network(Some(&network()));

        let summary = session.summary(&report);
        assert!(summary.contains("committed surface -> material network"));
        assert!(summary.contains("bxdf /M/Surface"));
        assert!(session.dump().contains("path: /M/Surface"));
    }

    #[test]
    fn test_finalize_clears_sink() {
        let mut session = session();
        session.sync_network(Some(&network()));
        assert_eq!(session.sink().network_count(), 1);
        let report = session.finalize();
        assert_eq!(report.deleted, vec![NetworkKind::Material]);
        assert!(report.is_clean());
        assert_eq!(session.sink().network_count(), 0);
        assert!(!session.material().is_valid());
        assert!(session.summary(&report).contains("deleted material network"));

        // Nothing left to delete the second time
        assert!(session.finalize().deleted.is_empty());
    }
}
