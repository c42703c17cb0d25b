// SPDX-License-Identifier: MIT OR Apache-2.0
//! Conversion of authored parameter values into renderer parameters.
//!
//! Dispatch happens on the pair (held value, declared property type). The
//! declared type wins: the same three floats become a color, vector, point
//! or normal depending on what the shader declares.

use crate::asset::asset_parameter;
use crate::shading_node::{ParamList, ParamValue, ShadingNodeKind};
use shadenet_network::builtin::renderman::PXR_DISPLACE;
use shadenet_network::{MaterialNode, NodePath, PropertyDescriptor, PropertyType, ShaderNodeDescriptor, Value};

/// Reason a single parameter could not be converted
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParamError {
    /// No conversion exists for this value/declaration pair
    #[error("Unsupported value type '{value_type}' for declared type '{declared}'")]
    Unsupported {
        /// Held value type
        value_type: &'static str,
        /// Declared property type
        declared: PropertyType,
    },

    /// An enum label is not in the option table
    #[error("Unknown option '{0}'")]
    UnknownOption(String),

    /// An option's code is not an integer
    #[error("Option '{label}' has non-integer code '{code}'")]
    InvalidOptionCode {
        /// Matched label
        label: String,
        /// Code that failed to parse
        code: String,
    },
}

fn narrow(v: [f64; 3]) -> [f32; 3] {
    [v[0] as f32, v[1] as f32, v[2] as f32]
}

fn triple(v: [f32; 3], ty: &PropertyType) -> Option<ParamValue> {
    match ty {
        PropertyType::Color => Some(ParamValue::Color(v)),
        PropertyType::Vector => Some(ParamValue::Vector(v)),
        PropertyType::Point => Some(ParamValue::Point(v)),
        PropertyType::Normal => Some(ParamValue::Normal(v)),
        _ => None,
    }
}

fn triple_array(v: Vec<[f32; 3]>, ty: &PropertyType) -> Option<ParamValue> {
    match ty {
        PropertyType::Color => Some(ParamValue::ColorArray(v)),
        PropertyType::Vector => Some(ParamValue::VectorArray(v)),
        PropertyType::Point => Some(ParamValue::PointArray(v)),
        PropertyType::Normal => Some(ParamValue::NormalArray(v)),
        _ => None,
    }
}

/// Map an enum label to its integer code.
///
/// The label is matched first; a value that already is one of the codes is
/// accepted as well.
pub fn resolve_option(label: &str, options: &[(String, String)]) -> Result<i32, ParamError> {
    let (matched, code) = options
        .iter()
        .find(|(l, _)| l == label)
        .or_else(|| options.iter().find(|(_, c)| c == label))
        .ok_or_else(|| ParamError::UnknownOption(label.to_string()))?;
    code.trim().parse().map_err(|_| ParamError::InvalidOptionCode {
        label: matched.clone(),
        code: code.clone(),
    })
}

/// Convert one value for a declared property.
///
/// `Ok(None)` means the parameter is intentionally dropped (struct inputs
/// only route data between shaders).
pub fn convert_value(
    param_name: &str,
    value: &Value,
    property: &PropertyDescriptor,
    kind: ShadingNodeKind,
) -> Result<Option<ParamValue>, ParamError> {
    use PropertyType as T;

    let ty = &property.ty;
    if matches!(ty, T::Struct | T::Vstruct) {
        return Ok(None);
    }

    let converted = match (value, ty) {
        (Value::Vec2(v), T::Float) => Some(ParamValue::FloatArray(v.to_vec())),
        (Value::Vec4(v), T::Float) => Some(ParamValue::FloatArray(v.to_vec())),
        (Value::Vec3(v), _) => triple(*v, ty),
        (Value::Vec3d(v), _) => triple(narrow(*v), ty),
        (Value::Vec3Array(v), _) => triple_array(v.clone(), ty),
        (Value::Vec3dArray(v), _) => triple_array(v.iter().copied().map(narrow).collect(), ty),
        (Value::Float(v), T::Int) => Some(ParamValue::Int(*v as i32)),
        (Value::Float(v), T::Float) => Some(ParamValue::Float(*v)),
        (Value::FloatArray(v), T::Int) => {
            Some(ParamValue::IntArray(v.iter().map(|x| *x as i32).collect()))
        }
        (Value::FloatArray(v), T::Float) => Some(ParamValue::FloatArray(v.clone())),
        (Value::Int(v), T::Float) => Some(ParamValue::Float(*v as f32)),
        (Value::Int(v), T::Int) => Some(ParamValue::Int(*v)),
        (Value::IntArray(v), T::Float) => {
            Some(ParamValue::FloatArray(v.iter().map(|x| *x as f32).collect()))
        }
        (Value::IntArray(v), T::Int) => Some(ParamValue::IntArray(v.clone())),
        (Value::String(v) | Value::Token(v), T::Int) => {
            Some(ParamValue::Int(resolve_option(v, &property.options)?))
        }
        (Value::String(v) | Value::Token(v), _) => Some(ParamValue::String(v.clone())),
        (Value::StringArray(v), T::String) => Some(ParamValue::StringArray(v.clone())),
        (Value::Asset(asset), _) => Some(ParamValue::String(asset_parameter(param_name, asset, kind))),
        // The renderer has no boolean parameters
        (Value::Bool(v), _) => Some(ParamValue::Int(i32::from(*v))),
        _ => None,
    };

    converted.map(Some).ok_or_else(|| ParamError::Unsupported {
        value_type: value.type_name(),
        declared: ty.clone(),
    })
}

/// Convert every authored parameter of a node into `params`.
///
/// Parameters that cannot be converted are logged and skipped; the node
/// itself always survives.
pub(crate) fn convert_parameters(
    node_path: &NodePath,
    node: &MaterialNode,
    descriptor: &ShaderNodeDescriptor,
    kind: ShadingNodeKind,
    params: &mut ParamList,
) {
    for (name, value) in &node.parameters {
        let Some(property) = descriptor.input(name) else {
            tracing::debug!(
                node = %node_path,
                shader = %descriptor.name,
                property = %name,
                "Unknown shader property; ignoring"
            );
            continue;
        };

        if property.ty == PropertyType::Unspecified {
            // Promoted displacement networks carry these routinely.
            if node.node_type_id != PXR_DISPLACE {
                tracing::debug!(
                    node = %node_path,
                    shader = %descriptor.name,
                    property = %name,
                    "Shader property has no declared type; ignoring"
                );
            }
            continue;
        }

        match convert_value(name, value, property, kind) {
            Ok(Some(converted)) => params.set(property.implementation_name.clone(), converted),
            Ok(None) => {}
            Err(err) => tracing::debug!(
                node = %node_path,
                property = %name,
                value_type = value.type_name(),
                declared = %property.ty,
                error = %err,
                "Skipping shading parameter"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shadenet_network::AssetPath;

    fn prop(name: &str, ty: PropertyType) -> PropertyDescriptor {
        PropertyDescriptor::new(name, ty)
    }

    fn convert(value: Value, ty: PropertyType) -> Result<Option<ParamValue>, ParamError> {
        convert_value("p", &value, &prop("p", ty), ShadingNodeKind::Pattern)
    }

    #[test]
    fn test_float_to_int_truncates() {
        assert_eq!(convert(Value::Float(2.7), PropertyType::Int), Ok(Some(ParamValue::Int(2))));
        assert_eq!(convert(Value::Float(-2.7), PropertyType::Int), Ok(Some(ParamValue::Int(-2))));
    }

    #[test]
    fn test_int_to_float_widens() {
        assert_eq!(convert(Value::Int(3), PropertyType::Float), Ok(Some(ParamValue::Float(3.0))));
        assert_eq!(
            convert(Value::IntArray(vec![1, 2]), PropertyType::Float),
            Ok(Some(ParamValue::FloatArray(vec![1.0, 2.0])))
        );
    }

    #[test]
    fn test_triples_follow_declared_type() {
        let v = [0.1, 0.2, 0.3];
        assert_eq!(convert(Value::Vec3(v), PropertyType::Color), Ok(Some(ParamValue::Color(v))));
        assert_eq!(convert(Value::Vec3(v), PropertyType::Vector), Ok(Some(ParamValue::Vector(v))));
        assert_eq!(convert(Value::Vec3(v), PropertyType::Point), Ok(Some(ParamValue::Point(v))));
        assert_eq!(convert(Value::Vec3(v), PropertyType::Normal), Ok(Some(ParamValue::Normal(v))));
        assert!(convert(Value::Vec3(v), PropertyType::Float).is_err());
        assert_eq!(
            convert(Value::Vec3d([1.0, 0.5, 0.25]), PropertyType::Color),
            Ok(Some(ParamValue::Color([1.0, 0.5, 0.25])))
        );
        assert_eq!(
            convert(Value::Vec3Array(vec![v, v]), PropertyType::Normal),
            Ok(Some(ParamValue::NormalArray(vec![v, v])))
        );
    }

    #[test]
    fn test_small_vectors_become_float_arrays() {
        assert_eq!(
            convert(Value::Vec2([1.0, 2.0]), PropertyType::Float),
            Ok(Some(ParamValue::FloatArray(vec![1.0, 2.0])))
        );
        assert_eq!(
            convert(Value::Vec4([1.0, 2.0, 3.0, 4.0]), PropertyType::Float),
            Ok(Some(ParamValue::FloatArray(vec![1.0, 2.0, 3.0, 4.0])))
        );
    }

    #[test]
    fn test_structs_are_dropped() {
        assert_eq!(convert(Value::Float(1.0), PropertyType::Struct), Ok(None));
        assert_eq!(convert(Value::Vec3([0.0; 3]), PropertyType::Vstruct), Ok(None));
    }

    #[test]
    fn test_enum_resolution() {
        let property = prop("p", PropertyType::Int).with_options([("low", "0"), ("med", "1"), ("high", "2")]);
        let kind = ShadingNodeKind::Pattern;

        let by_label = convert_value("p", &Value::Token("high".into()), &property, kind);
        assert_eq!(by_label, Ok(Some(ParamValue::Int(2))));

        let by_code = convert_value("p", &Value::String("2".into()), &property, kind);
        assert_eq!(by_code, Ok(Some(ParamValue::Int(2))));

        let unknown = convert_value("p", &Value::String("ultra".into()), &property, kind);
        assert_eq!(unknown, Err(ParamError::UnknownOption("ultra".into())));
    }

    #[test]
    fn test_invalid_option_code() {
        let options = vec![("broken".to_string(), "x".to_string())];
        assert!(matches!(
            resolve_option("broken", &options),
            Err(ParamError::InvalidOptionCode { .. })
        ));
    }

    #[test]
    fn test_strings_and_bools() {
        assert_eq!(
            convert(Value::Token("st".into()), PropertyType::String),
            Ok(Some(ParamValue::String("st".into())))
        );
        assert_eq!(convert(Value::Bool(true), PropertyType::Int), Ok(Some(ParamValue::Int(1))));
        assert_eq!(convert(Value::Bool(false), PropertyType::Float), Ok(Some(ParamValue::Int(0))));
    }

    #[test]
    fn test_asset_to_string() {
        assert_eq!(
            convert(Value::Asset(AssetPath::new("a.tex")), PropertyType::String),
            Ok(Some(ParamValue::String("a.tex".into())))
        );
    }

    #[test]
    fn test_convert_parameters_skips_bad_entries() {
        let descriptor = ShaderNodeDescriptor::new("N", "OSL", "pattern")
            .with_input(prop("gain", PropertyType::Float).with_implementation_name("inGain"))
            .with_input(prop("mode", PropertyType::Int).with_options([("a", "0")]))
            .with_input(prop("blank", PropertyType::Unspecified))
            .with_input(prop("manifold", PropertyType::Struct));
        let node = MaterialNode::new("N")
            .with_parameter("gain", 0.5_f32)
            .with_parameter("mode", "missing")
            .with_parameter("blank", 1.0_f32)
            .with_parameter("manifold", 1.0_f32)
            .with_parameter("undeclared", 1.0_f32);

        let mut params = ParamList::new();
        convert_parameters(&NodePath::from("/N"), &node, &descriptor, ShadingNodeKind::Pattern, &mut params);

        assert_eq!(params.len(), 1);
        assert_eq!(params.get("inGain"), Some(&ParamValue::Float(0.5)));
    }
}
