// SPDX-License-Identifier: MIT OR Apache-2.0
//! Renderer-side shading nodes produced by the converter.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a renderer shading node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShadingNodeKind {
    /// Surface or volume scattering function
    Bxdf,
    /// Pattern feeding other nodes
    Pattern,
    /// Displacement
    Displacement,
    /// Light
    Light,
    /// Light filter
    LightFilter,
}

impl ShadingNodeKind {
    /// Whether the renderer selects the implementation by name for this kind
    pub fn selects_by_name(self) -> bool {
        matches!(self, Self::Displacement | Self::Light | Self::LightFilter)
    }
}

impl fmt::Display for ShadingNodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Bxdf => "bxdf",
            Self::Pattern => "pattern",
            Self::Displacement => "displacement",
            Self::Light => "light",
            Self::LightFilter => "lightFilter",
        })
    }
}

/// Type of a parameter reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReferenceType {
    /// Color reference
    Color,
    /// Vector reference
    Vector,
    /// Point reference
    Point,
    /// Normal reference
    Normal,
    /// Float reference
    Float,
    /// Integer reference
    Int,
    /// String reference
    String,
    /// Struct reference
    Struct,
}

/// Typed value of a renderer parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParamValue {
    /// Integer
    Int(i32),
    /// Float
    Float(f32),
    /// String
    String(String),
    /// RGB color
    Color([f32; 3]),
    /// Direction vector
    Vector([f32; 3]),
    /// Point
    Point([f32; 3]),
    /// Normal
    Normal([f32; 3]),
    /// Integer array
    IntArray(Vec<i32>),
    /// Float array
    FloatArray(Vec<f32>),
    /// String array
    StringArray(Vec<String>),
    /// Color array
    ColorArray(Vec<[f32; 3]>),
    /// Vector array
    VectorArray(Vec<[f32; 3]>),
    /// Point array
    PointArray(Vec<[f32; 3]>),
    /// Normal array
    NormalArray(Vec<[f32; 3]>),
    /// Reference to another node's output, as `handle:output`
    Reference {
        /// Declared type of the referencing input
        ty: ReferenceType,
        /// `handle:output` target
        target: String,
    },
}

impl ParamValue {
    /// The reference target, if this is a reference
    pub fn reference_target(&self) -> Option<&str> {
        match self {
            Self::Reference { target, .. } => Some(target),
            _ => None,
        }
    }
}

/// Ordered parameter list. Setting a name twice replaces the earlier value
/// in place.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParamList {
    params: IndexMap<String, ParamValue>,
}

impl ParamList {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a parameter
    pub fn set(&mut self, name: impl Into<String>, value: ParamValue) {
        self.params.insert(name.into(), value);
    }

    /// Get a parameter by name
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.params.get(name)
    }

    /// Whether a parameter is set
    pub fn contains(&self, name: &str) -> bool {
        self.params.contains_key(name)
    }

    /// Iterate parameters in order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.params.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Number of parameters
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Whether the list is empty
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

/// One renderer shading node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShadingNode {
    /// Node kind
    pub kind: ShadingNodeKind,
    /// Handle other nodes reference this node by (the material node path)
    pub handle: String,
    /// Implementation path, or name for kinds the renderer selects by name
    pub name: String,
    /// Parameters and references
    pub params: ParamList,
}

impl ShadingNode {
    /// Create a node with no parameters
    pub fn new(kind: ShadingNodeKind, handle: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind,
            handle: handle.into(),
            name: name.into(),
            params: ParamList::new(),
        }
    }

    /// Handles of the nodes this node references
    pub fn referenced_handles(&self) -> impl Iterator<Item = &str> {
        self.params
            .iter()
            .filter_map(|(_, value)| value.reference_target())
            .filter_map(|target| target.split_once(':').map(|(handle, _)| handle))
    }
}
