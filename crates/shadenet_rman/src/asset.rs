// SPDX-License-Identifier: MIT OR Apache-2.0
//! Turning asset parameters into renderer file references.

use crate::shading_node::ShadingNodeKind;
use shadenet_network::AssetPath;
use std::env::consts::DLL_SUFFIX;
use std::path::Path;

/// Renderer plugin that reads images the renderer cannot read natively
pub const IMAGE_PLUGIN: &str = "rtxplugin:RtxHioImage";

/// Light parameter holding the light's texture
pub const LIGHT_TEXTURE_PARAM: &str = "texture:file";

/// Extension of the renderer's native texture format
const NATIVE_TEXTURE_EXTENSION: &str = "tex";

/// Whether `path` names an image format the image plugin can read
pub fn is_supported_image(path: &str) -> bool {
    image::ImageFormat::from_path(path).is_ok()
}

fn image_plugin_reference(path: &str) -> String {
    format!("{IMAGE_PLUGIN}{DLL_SUFFIX}?filename={path}")
}

/// Resolve an asset parameter to the string handed to the renderer.
///
/// Unresolved assets pass through as authored. Resolved non-`tex` images go
/// through the image plugin; a light's texture is read unflipped.
pub fn asset_parameter(param_name: &str, asset: &AssetPath, kind: ShadingNodeKind) -> String {
    let Some(resolved) = asset.resolved_path() else {
        tracing::debug!(asset = %asset.authored, "Asset is unresolved; using authored path");
        return asset.authored.clone();
    };

    let extension = Path::new(resolved).extension().and_then(|e| e.to_str());
    let value = if extension == Some(NATIVE_TEXTURE_EXTENSION) {
        resolved.to_string()
    } else if kind == ShadingNodeKind::Light && param_name == LIGHT_TEXTURE_PARAM {
        format!("{}&flipped=false", image_plugin_reference(resolved))
    } else if is_supported_image(resolved) {
        image_plugin_reference(resolved)
    } else {
        resolved.to_string()
    };

    tracing::debug!(asset = %asset.authored, resolved = %value, "Resolved material asset path");
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unresolved_asset_uses_authored_path() {
        let asset = AssetPath::new("textures/wood.png");
        assert_eq!(
            asset_parameter("filename", &asset, ShadingNodeKind::Pattern),
            "textures/wood.png"
        );
    }

    #[test]
    fn test_tex_files_pass_through() {
        let asset = AssetPath::resolved("wood.tex", "/show/tex/wood.tex");
        assert_eq!(
            asset_parameter("filename", &asset, ShadingNodeKind::Pattern),
            "/show/tex/wood.tex"
        );
    }

    #[test]
    fn test_images_use_plugin() {
        let asset = AssetPath::resolved("wood.png", "/show/tex/wood.png");
        assert_eq!(
            asset_parameter("filename", &asset, ShadingNodeKind::Pattern),
            format!("rtxplugin:RtxHioImage{DLL_SUFFIX}?filename=/show/tex/wood.png")
        );
    }

    #[test]
    fn test_light_texture_is_not_flipped() {
        let asset = AssetPath::resolved("sky.exr", "/show/tex/sky.exr");
        assert_eq!(
            asset_parameter(LIGHT_TEXTURE_PARAM, &asset, ShadingNodeKind::Light),
            format!("rtxplugin:RtxHioImage{DLL_SUFFIX}?filename=/show/tex/sky.exr&flipped=false")
        );
        // Other kinds use the default orientation
        assert_eq!(
            asset_parameter(LIGHT_TEXTURE_PARAM, &asset, ShadingNodeKind::Pattern),
            format!("rtxplugin:RtxHioImage{DLL_SUFFIX}?filename=/show/tex/sky.exr")
        );
    }

    #[test]
    fn test_supported_images_by_extension() {
        for path in ["a.png", "a.JPG", "a.jpeg", "a.exr", "a.hdr", "a.tga", "a.bmp", "a.tif"] {
            assert!(is_supported_image(path), "{path}");
        }
        assert!(!is_supported_image("a.csv"));
        assert!(!is_supported_image("noextension"));
    }

    #[test]
    fn test_non_image_files_pass_through() {
        let asset = AssetPath::resolved("lut.csv", "/show/luts/lut.csv");
        assert_eq!(
            asset_parameter("filename", &asset, ShadingNodeKind::Pattern),
            "/show/luts/lut.csv"
        );
    }
}
