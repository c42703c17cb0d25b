// SPDX-License-Identifier: MIT OR Apache-2.0
//! A RenderMan-style shader node set.
//!
//! Covers the node kinds a material commonly routes through: bxdfs, layered
//! bxdfs fed by vstructs, texture and utility patterns, displacement, lights
//! and light filters. Implementation locations are bare file names; callers
//! that need absolute paths resolve them against their shader search paths.

use crate::registry::{
    contexts, source_types, InMemoryRegistry, PropertyDescriptor, PropertyType,
    ShaderNodeDescriptor,
};
use std::env::consts::DLL_SUFFIX;

/// Type identifier of the displacement pattern
pub const PXR_DISPLACE: &str = "PxrDisplace";

fn osl(identifier: &str, context: &str) -> ShaderNodeDescriptor {
    ShaderNodeDescriptor::new(identifier, source_types::OSL, context)
        .with_implementation(format!("{identifier}.oso"))
}

fn cpp(identifier: &str, context: &str) -> ShaderNodeDescriptor {
    ShaderNodeDescriptor::new(identifier, source_types::RMAN_CPP, context)
        .with_implementation(format!("{identifier}{DLL_SUFFIX}"))
}

fn prop(name: &str, ty: PropertyType) -> PropertyDescriptor {
    PropertyDescriptor::new(name, ty)
}

/// Create the RenderMan node registry with all builtin node types
pub fn create_renderman_registry() -> InMemoryRegistry {
    let mut registry = InMemoryRegistry::new();

    // ========================================================================
    // Bxdfs
    // ========================================================================

    registry.register(
        cpp("PxrSurface", contexts::BXDF)
            .with_input(prop("diffuseGain", PropertyType::Float))
            .with_input(prop("diffuseColor", PropertyType::Color))
            .with_input(prop("specularFaceColor", PropertyType::Color))
            .with_input(prop("specularRoughness", PropertyType::Float))
            .with_input(
                prop("specularModelType", PropertyType::Int)
                    .with_options([("Beckmann", "0"), ("GGX", "1")]),
            )
            .with_input(prop("bumpNormal", PropertyType::Normal))
            .with_input(prop("presence", PropertyType::Float))
            .with_output(prop("bxdf_out", PropertyType::Other("bxdf".to_string()))),
    );

    registry.register(
        cpp("PxrLayerSurface", contexts::BXDF)
            .with_input(prop("inputMaterial", PropertyType::Vstruct))
            .with_input(
                prop("diffuseGain", PropertyType::Float).member_of("inputMaterial", "diffuseGain"),
            )
            .with_input(
                prop("diffuseColor", PropertyType::Color).member_of("inputMaterial", "diffuseColor"),
            )
            .with_input(
                prop("specularRoughness", PropertyType::Float)
                    .member_of("inputMaterial", "specularRoughness"),
            )
            .with_output(prop("bxdf_out", PropertyType::Other("bxdf".to_string()))),
    );

    registry.register(
        cpp("PxrVolume", contexts::BXDF)
            .with_input(prop("diffuseColor", PropertyType::Color))
            .with_input(prop("densityFloat", PropertyType::Float))
            .with_input(prop("densityFloatPrimVar", PropertyType::String))
            .with_output(prop("bxdf_out", PropertyType::Other("bxdf".to_string()))),
    );

    // ========================================================================
    // Patterns
    // ========================================================================

    registry.register(
        osl("PxrLayer", contexts::PATTERN)
            .with_input(prop("diffuseGain", PropertyType::Float))
            .with_input(prop("diffuseColor", PropertyType::Color))
            .with_input(prop("specularRoughness", PropertyType::Float))
            .with_output(prop("pxrMaterialOut", PropertyType::Vstruct))
            .with_output(
                prop("diffuseGain", PropertyType::Float).member_of("pxrMaterialOut", "diffuseGain"),
            )
            .with_output(
                prop("diffuseColor", PropertyType::Color).member_of("pxrMaterialOut", "diffuseColor"),
            )
            .with_output(
                prop("specularRoughness", PropertyType::Float)
                    .member_of("pxrMaterialOut", "specularRoughness"),
            ),
    );

    registry.register(
        osl("PxrManifold2D", contexts::PATTERN)
            .with_input(prop("scaleS", PropertyType::Float))
            .with_input(prop("scaleT", PropertyType::Float))
            .with_input(prop("angle", PropertyType::Float))
            .with_input(prop("offsetS", PropertyType::Float))
            .with_input(prop("offsetT", PropertyType::Float))
            .with_output(prop("result", PropertyType::Struct)),
    );

    registry.register(
        osl("PxrTexture", contexts::PATTERN)
            .with_input(prop("filename", PropertyType::String))
            .with_input(prop("firstChannel", PropertyType::Int))
            .with_input(prop("linearize", PropertyType::Int))
            .with_input(prop("missingColor", PropertyType::Color))
            .with_input(
                prop("atlasStyle", PropertyType::Int).with_options([
                    ("None", "0"),
                    ("UDIM (Mari)", "1"),
                    ("UDIM (Mudbox)", "2"),
                    ("Mudbox", "3"),
                ]),
            )
            .with_input(prop("manifold", PropertyType::Struct))
            .with_output(prop("resultRGB", PropertyType::Color))
            .with_output(prop("resultR", PropertyType::Float))
            .with_output(prop("resultA", PropertyType::Float)),
    );

    registry.register(
        osl("PxrNormalMap", contexts::PATTERN)
            .with_input(prop("filename", PropertyType::String))
            .with_input(prop("bumpScale", PropertyType::Float))
            .with_input(prop("invertBump", PropertyType::Int))
            .with_output(prop("resultN", PropertyType::Normal)),
    );

    registry.register(
        osl("PxrPrimvar", contexts::PATTERN)
            .with_input(prop("varname", PropertyType::String))
            .with_input(prop("type", PropertyType::String))
            .with_input(prop("defaultFloat3", PropertyType::Vector))
            .with_output(prop("resultF", PropertyType::Float))
            .with_output(prop("resultI", PropertyType::Int))
            .with_output(prop("resultRGB", PropertyType::Color))
            .with_output(prop("resultP", PropertyType::Point))
            .with_output(prop("resultN", PropertyType::Normal))
            .with_output(prop("resultV", PropertyType::Vector))
            .with_output(prop("resultS", PropertyType::String)),
    );

    registry.register(
        osl("PxrDispTransform", contexts::PATTERN)
            .with_input(prop("dispScalar", PropertyType::Float))
            .with_input(prop("dispVector", PropertyType::Vector))
            .with_input(prop("dispHeight", PropertyType::Float))
            .with_input(
                prop("dispRemapMode", PropertyType::Int)
                    .with_options([("None", "0"), ("Centered", "1"), ("Interpolate", "2")]),
            )
            .with_output(prop("resultF", PropertyType::Float))
            .with_output(prop("resultXYZ", PropertyType::Vector)),
    );

    // ========================================================================
    // Displacement
    // ========================================================================

    // Reported as a pattern; the converter turns it into a displacement node.
    registry.register(
        osl(PXR_DISPLACE, contexts::OSL)
            .with_input(prop("dispAmount", PropertyType::Float))
            .with_input(prop("dispScalar", PropertyType::Float))
            .with_input(prop("dispVector", PropertyType::Vector))
            .with_input(prop("modelDispVector", PropertyType::Vector))
            .with_input(prop("enabled", PropertyType::Int))
            .with_input(prop("displacementBound", PropertyType::Unspecified))
            .with_output(prop("displacement", PropertyType::Other("displacement".to_string()))),
    );

    // ========================================================================
    // Lights and light filters
    // ========================================================================

    registry.register(
        cpp("PxrRectLight", contexts::LIGHT)
            .with_input(prop("intensity", PropertyType::Float))
            .with_input(prop("exposure", PropertyType::Float))
            .with_input(prop("lightColor", PropertyType::Color))
            .with_input(prop("enableTemperature", PropertyType::Int))
            .with_input(prop("temperature", PropertyType::Float))
            .with_input(
                prop("texture:file", PropertyType::String).with_implementation_name("lightColorMap"),
            ),
    );

    registry.register(
        cpp("PxrDomeLight", contexts::LIGHT)
            .with_input(prop("intensity", PropertyType::Float))
            .with_input(prop("exposure", PropertyType::Float))
            .with_input(prop("lightColor", PropertyType::Color))
            .with_input(
                prop("texture:file", PropertyType::String).with_implementation_name("lightColorMap"),
            ),
    );

    registry.register(
        cpp("PxrBarnLightFilter", contexts::LIGHT_FILTER)
            .with_input(
                prop("barnMode", PropertyType::Int)
                    .with_options([("physical", "0"), ("analytic", "1")]),
            )
            .with_input(prop("width", PropertyType::Float))
            .with_input(prop("height", PropertyType::Float))
            .with_input(prop("edge", PropertyType::Float)),
    );

    registry
}
