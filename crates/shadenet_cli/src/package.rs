// SPDX-License-Identifier: MIT OR Apache-2.0
//! Shader package resources: shaders and textures shipped next to a
//! network, looked up under a list of search roots.

use std::path::{Path, PathBuf};

/// Subdirectory holding shader implementations
pub const SHADERS_DIR: &str = "shaders";

/// Subdirectory holding textures
pub const TEXTURES_DIR: &str = "textures";

/// Ordered set of package roots
#[derive(Debug, Clone, Default)]
pub struct ShaderPackage {
    roots: Vec<PathBuf>,
}

impl ShaderPackage {
    /// Create a package searching `roots` in order
    pub fn new(roots: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            roots: roots.into_iter().collect(),
        }
    }

    /// Search roots
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Find `<root>/<subdir>/<name>` in the first root that has it
    pub fn find_resource(&self, subdir: &str, name: &str) -> Option<PathBuf> {
        if name.is_empty() {
            return None;
        }
        if Path::new(name).is_absolute() {
            let path = PathBuf::from(name);
            return path.is_file().then_some(path);
        }
        self.roots
            .iter()
            .map(|root| root.join(subdir).join(name))
            .find(|path| path.is_file())
    }

    /// Locate a shader implementation
    pub fn shader_path(&self, name: &str) -> Option<PathBuf> {
        let path = self.find_resource(SHADERS_DIR, name);
        if path.is_none() {
            tracing::warn!(shader = name, "Could not find shader");
        }
        path
    }

    /// Locate a texture
    pub fn texture_path(&self, name: &str) -> Option<PathBuf> {
        let path = self.find_resource(TEXTURES_DIR, name);
        if path.is_none() {
            tracing::warn!(texture = name, "Could not find texture");
        }
        path
    }
}
