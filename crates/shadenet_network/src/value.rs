// SPDX-License-Identifier: MIT OR Apache-2.0
//! Authored parameter values held by material nodes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Reference to an external asset (texture, shader, ...).
///
/// `resolved` is filled in by whoever resolved the authored path against the
/// asset search paths; it stays `None` when resolution failed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct AssetPath {
    /// Path as authored
    pub authored: String,
    /// Concrete file path, when resolution succeeded
    #[serde(default)]
    pub resolved: Option<String>,
}

impl AssetPath {
    /// Create an unresolved asset path
    pub fn new(authored: impl Into<String>) -> Self {
        Self {
            authored: authored.into(),
            resolved: None,
        }
    }

    /// Create an asset path with a known resolution
    pub fn resolved(authored: impl Into<String>, resolved: impl Into<String>) -> Self {
        Self {
            authored: authored.into(),
            resolved: Some(resolved.into()),
        }
    }

    /// The resolved path if non-empty
    pub fn resolved_path(&self) -> Option<&str> {
        self.resolved.as_deref().filter(|p| !p.is_empty())
    }
}

/// Value stored on a material node parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Single precision float
    Float(f32),
    /// Integer
    Int(i32),
    /// Boolean
    Bool(bool),
    /// Free-form string
    String(String),
    /// Interned identifier-like string
    Token(String),
    /// 2D vector
    Vec2([f32; 2]),
    /// 3D vector, also used for colors, points and normals
    Vec3([f32; 3]),
    /// Double precision 3D vector
    Vec3d([f64; 3]),
    /// 4D vector
    Vec4([f32; 4]),
    /// Array of floats
    FloatArray(Vec<f32>),
    /// Array of integers
    IntArray(Vec<i32>),
    /// Array of strings
    StringArray(Vec<String>),
    /// Array of 3D vectors
    Vec3Array(Vec<[f32; 3]>),
    /// Array of double precision 3D vectors
    Vec3dArray(Vec<[f64; 3]>),
    /// Asset reference
    Asset(AssetPath),
}

impl Value {
    /// Name of the held type, used in diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Float(_) => "float",
            Self::Int(_) => "int",
            Self::Bool(_) => "bool",
            Self::String(_) => "string",
            Self::Token(_) => "token",
            Self::Vec2(_) => "float2",
            Self::Vec3(_) => "float3",
            Self::Vec3d(_) => "double3",
            Self::Vec4(_) => "float4",
            Self::FloatArray(_) => "float[]",
            Self::IntArray(_) => "int[]",
            Self::StringArray(_) => "string[]",
            Self::Vec3Array(_) => "float3[]",
            Self::Vec3dArray(_) => "double3[]",
            Self::Asset(_) => "asset",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Float(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::String(v) | Self::Token(v) => f.write_str(v),
            Self::Vec2(v) => write!(f, "({}, {})", v[0], v[1]),
            Self::Vec3(v) => write!(f, "({}, {}, {})", v[0], v[1], v[2]),
            Self::Vec3d(v) => write!(f, "({}, {}, {})", v[0], v[1], v[2]),
            Self::Vec4(v) => write!(f, "({}, {}, {}, {})", v[0], v[1], v[2], v[3]),
            Self::FloatArray(v) => write!(f, "{v:?}"),
            Self::IntArray(v) => write!(f, "{v:?}"),
            Self::StringArray(v) => write!(f, "{v:?}"),
            Self::Vec3Array(v) => write!(f, "{v:?}"),
            Self::Vec3dArray(v) => write!(f, "{v:?}"),
            Self::Asset(a) => match a.resolved_path() {
                Some(resolved) => write!(f, "@{}@ ({resolved})", a.authored),
                None => write!(f, "@{}@", a.authored),
            },
        }
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<[f32; 3]> for Value {
    fn from(v: [f32; 3]) -> Self {
        Self::Vec3(v)
    }
}

impl From<AssetPath> for Value {
    fn from(v: AssetPath) -> Self {
        Self::Asset(v)
    }
}
