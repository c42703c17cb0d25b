// SPDX-License-Identifier: MIT OR Apache-2.0
//! Loading of network and registry documents, with package resolution.

use crate::package::{ShaderPackage, SHADERS_DIR};
use shadenet_network::builtin::renderman::create_renderman_registry;
use shadenet_network::{InMemoryRegistry, MaterialNetwork, NetworkError, ShaderNodeDescriptor, Value};
use std::path::{Path, PathBuf};

/// Error loading an input document
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The file could not be read
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        /// File path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The network document is malformed
    #[error("Invalid material network in {}: {source}", path.display())]
    Network {
        /// File path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: NetworkError,
    },

    /// The registry document is malformed
    #[error("Invalid shader registry in {}: {source}", path.display())]
    Registry {
        /// File path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: ron::error::SpannedError,
    },
}

fn read(path: &Path) -> Result<String, LoadError> {
    std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a material network and resolve its asset paths against `package`
pub fn load_network(path: &Path, package: &ShaderPackage) -> Result<MaterialNetwork, LoadError> {
    let mut network = MaterialNetwork::from_ron_str(&read(path)?).map_err(|source| LoadError::Network {
        path: path.to_path_buf(),
        source,
    })?;
    let resolved = resolve_assets(&mut network, package);
    tracing::debug!(path = %path.display(), nodes = network.node_count(), resolved, "Loaded material network");
    Ok(network)
}

/// Load a registry document, or the builtin RenderMan registry when `path` is `None`
pub fn load_registry(path: Option<&Path>, package: &ShaderPackage) -> Result<InMemoryRegistry, LoadError> {
    let mut registry = match path {
        Some(path) => {
            let descriptors: Vec<ShaderNodeDescriptor> =
                ron::from_str(&read(path)?).map_err(|source| LoadError::Registry {
                    path: path.to_path_buf(),
                    source,
                })?;
            InMemoryRegistry::from_descriptors(descriptors)
        }
        None => create_renderman_registry(),
    };
    resolve_implementations(&mut registry, package);
    tracing::debug!(descriptors = registry.len(), "Loaded shader registry");
    Ok(registry)
}

/// Fill in resolved paths of unresolved asset parameters. Returns how many were resolved.
pub fn resolve_assets(network: &mut MaterialNetwork, package: &ShaderPackage) -> usize {
    let paths: Vec<_> = network.node_paths().cloned().collect();
    let mut resolved = 0;
    for path in paths {
        let Some(node) = network.node_mut(path.as_str()) else {
            continue;
        };
        for (name, value) in node.parameters.iter_mut() {
            let Value::Asset(asset) = value else {
                continue;
            };
            if asset.resolved_path().is_some() {
                continue;
            }
            match package.texture_path(&asset.authored) {
                Some(found) => {
                    asset.resolved = Some(found.to_string_lossy().into_owned());
                    resolved += 1;
                }
                None => {
                    tracing::debug!(node = %path, param = %name, asset = %asset.authored, "Asset left unresolved");
                }
            }
        }
    }
    resolved
}

/// Point descriptors at implementations found in `package`.
///
/// Descriptors whose implementation is not in the package keep their
/// current resolution.
pub fn resolve_implementations(registry: &mut InMemoryRegistry, package: &ShaderPackage) {
    if package.roots().is_empty() {
        return;
    }
    for descriptor in registry.descriptors_mut() {
        let uri = &descriptor.implementation_uri;
        if uri.is_empty() {
            continue;
        }
        let found = if descriptor.resolved_implementation_uri.is_empty() {
            package.shader_path(uri)
        } else {
            package.find_resource(SHADERS_DIR, uri)
        };
        if let Some(found) = found {
            descriptor.resolved_implementation_uri = found.to_string_lossy().into_owned();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::TEXTURES_DIR;
    use shadenet_network::{AssetPath, MaterialNode, ShaderRegistry};
    use std::fs;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("shadenet-loader-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_assets_resolve_against_package() {
        let base = scratch_dir("assets");
        fs::create_dir_all(base.join(TEXTURES_DIR)).unwrap();
        fs::write(base.join(TEXTURES_DIR).join("grid.png"), b"").unwrap();

        let mut network = MaterialNetwork::new().with_node(
            "/M/Tex",
            MaterialNode::new("PxrTexture")
                .with_parameter("filename", AssetPath::new("grid.png"))
                .with_parameter("missing", AssetPath::new("nope.png")),
        );
        let package = ShaderPackage::new([base.clone()]);
        assert_eq!(resolve_assets(&mut network, &package), 1);

        let node = network.node("/M/Tex").unwrap();
        let Some(Value::Asset(found)) = node.parameter("filename") else {
            panic!("expected asset");
        };
        assert_eq!(found.resolved.as_deref(), Some(base.join(TEXTURES_DIR).join("grid.png").to_str().unwrap()));
        let Some(Value::Asset(missing)) = node.parameter("missing") else {
            panic!("expected asset");
        };
        assert_eq!(missing.resolved, None);
        fs::remove_dir_all(base).unwrap();
    }

    #[test]
    fn test_network_file_roundtrip() {
        let base = scratch_dir("network");
        let network = MaterialNetwork::new().with_node("/M/S", MaterialNode::new("PxrSurface"));
        let path = base.join("material.ron");
        fs::write(&path, network.to_ron_string().unwrap()).unwrap();

        let loaded = load_network(&path, &ShaderPackage::default()).unwrap();
        assert_eq!(loaded, network);
        fs::remove_dir_all(base).unwrap();
    }

    #[test]
    fn test_malformed_network_is_reported() {
        let base = scratch_dir("malformed");
        let path = base.join("broken.ron");
        fs::write(&path, "(nodes: [").unwrap();
        let err = load_network(&path, &ShaderPackage::default()).unwrap_err();
        assert!(matches!(err, LoadError::Network { .. }));
        fs::remove_dir_all(base).unwrap();
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_network(Path::new("/nonexistent/material.ron"), &ShaderPackage::default()).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn test_builtin_registry_is_default() {
        let registry = load_registry(None, &ShaderPackage::default()).unwrap();
        assert!(registry.shader_node_by_identifier("PxrSurface", &[]).is_some());
    }

    #[test]
    fn test_implementations_resolve_against_package() {
        let base = scratch_dir("shaders");
        fs::create_dir_all(base.join(SHADERS_DIR)).unwrap();
        fs::write(base.join(SHADERS_DIR).join("PxrTexture.oso"), b"").unwrap();

        let registry = load_registry(None, &ShaderPackage::new([base.clone()])).unwrap();
        let texture = registry.shader_node_by_identifier("PxrTexture", &["OSL".to_string()]).unwrap();
        assert_eq!(
            Path::new(&texture.resolved_implementation_uri),
            base.join(SHADERS_DIR).join("PxrTexture.oso")
        );
        fs::remove_dir_all(base).unwrap();
    }
}
