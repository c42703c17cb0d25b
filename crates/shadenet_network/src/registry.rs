// SPDX-License-Identifier: MIT OR Apache-2.0
//! Shader registry: descriptions of the shader nodes a renderer provides.
//!
//! The converter never talks to a global registry. It receives anything that
//! implements [`ShaderRegistry`], which keeps tests free to supply their own
//! descriptors.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Node context tokens reported by registries
pub mod contexts {
    /// Renderer bxdf
    pub const BXDF: &str = "bxdf";
    /// Surface shader
    pub const SURFACE: &str = "surface";
    /// Volume shader
    pub const VOLUME: &str = "volume";
    /// Pattern
    pub const PATTERN: &str = "pattern";
    /// OSL pattern
    pub const OSL: &str = "OSL";
    /// Displacement shader
    pub const DISPLACEMENT: &str = "displacement";
    /// Light shader
    pub const LIGHT: &str = "light";
    /// Light filter shader
    pub const LIGHT_FILTER: &str = "lightFilter";
}

/// Source type tags
pub mod source_types {
    /// Open Shading Language
    pub const OSL: &str = "OSL";
    /// Compiled renderer plugin
    pub const RMAN_CPP: &str = "RmanCpp";
}

/// Declared semantic type of a shader property
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PropertyType {
    /// Float
    Float,
    /// Integer
    Int,
    /// String
    String,
    /// Color
    Color,
    /// Direction vector
    Vector,
    /// Point
    Point,
    /// Normal
    Normal,
    /// Struct, used to route data between shaders
    Struct,
    /// Virtual struct, resolved before conversion
    Vstruct,
    /// No type declared
    Unspecified,
    /// Any other type token
    Other(String),
}

impl PropertyType {
    /// The type token
    pub fn as_str(&self) -> &str {
        match self {
            Self::Float => "float",
            Self::Int => "int",
            Self::String => "string",
            Self::Color => "color",
            Self::Vector => "vector",
            Self::Point => "point",
            Self::Normal => "normal",
            Self::Struct => "struct",
            Self::Vstruct => "vstruct",
            Self::Unspecified => "",
            Self::Other(token) => token,
        }
    }
}

impl From<&str> for PropertyType {
    fn from(token: &str) -> Self {
        match token {
            "float" => Self::Float,
            "int" => Self::Int,
            "string" => Self::String,
            "color" => Self::Color,
            "vector" => Self::Vector,
            "point" => Self::Point,
            "normal" => Self::Normal,
            "struct" => Self::Struct,
            "vstruct" => Self::Vstruct,
            "" => Self::Unspecified,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for PropertyType {
    fn from(token: String) -> Self {
        Self::from(token.as_str())
    }
}

impl From<PropertyType> for String {
    fn from(ty: PropertyType) -> Self {
        ty.as_str().to_string()
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Descriptor of one shader input or output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDescriptor {
    /// Property name as authored on material nodes
    pub name: String,
    /// Name the renderer knows the property by
    pub implementation_name: String,
    /// Declared semantic type
    pub ty: PropertyType,
    /// Enumerated options as (label, integer code) pairs
    #[serde(default)]
    pub options: Vec<(String, String)>,
    /// Name of the vstruct this property is a member of
    #[serde(default)]
    pub vstruct_member_of: Option<String>,
    /// Member name inside that vstruct
    #[serde(default)]
    pub vstruct_member_name: Option<String>,
}

impl PropertyDescriptor {
    /// Create a property whose implementation name equals its name
    pub fn new(name: impl Into<String>, ty: PropertyType) -> Self {
        let name = name.into();
        Self {
            implementation_name: name.clone(),
            name,
            ty,
            options: Vec::new(),
            vstruct_member_of: None,
            vstruct_member_name: None,
        }
    }

    /// Set a different implementation name
    pub fn with_implementation_name(mut self, implementation_name: impl Into<String>) -> Self {
        self.implementation_name = implementation_name.into();
        self
    }

    /// Set the enumerated options
    pub fn with_options<L: Into<String>, C: Into<String>>(
        mut self,
        options: impl IntoIterator<Item = (L, C)>,
    ) -> Self {
        self.options = options
            .into_iter()
            .map(|(label, code)| (label.into(), code.into()))
            .collect();
        self
    }

    /// Mark this property as a member of a vstruct
    pub fn member_of(mut self, vstruct: impl Into<String>, member: impl Into<String>) -> Self {
        self.vstruct_member_of = Some(vstruct.into());
        self.vstruct_member_name = Some(member.into());
        self
    }
}

/// Descriptor of a shader node as provided by a registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShaderNodeDescriptor {
    /// Type identifier that material nodes refer to
    pub identifier: String,
    /// Display name
    pub name: String,
    /// Source type tag (e.g. `OSL`, `RmanCpp`)
    pub source_type: String,
    /// Context token (see [`contexts`])
    pub context: String,
    /// Input properties
    #[serde(default)]
    pub inputs: Vec<PropertyDescriptor>,
    /// Output properties
    #[serde(default)]
    pub outputs: Vec<PropertyDescriptor>,
    /// Name the renderer can select an implementation by
    pub implementation_name: String,
    /// Implementation location as authored (relative or absolute)
    #[serde(default)]
    pub implementation_uri: String,
    /// Implementation location after resolution; empty when unresolved
    #[serde(default)]
    pub resolved_implementation_uri: String,
}

impl ShaderNodeDescriptor {
    /// Create a descriptor with no properties
    pub fn new(
        identifier: impl Into<String>,
        source_type: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        let identifier = identifier.into();
        Self {
            name: identifier.clone(),
            implementation_name: identifier.clone(),
            identifier,
            source_type: source_type.into(),
            context: context.into(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            implementation_uri: String::new(),
            resolved_implementation_uri: String::new(),
        }
    }

    /// Add an input property
    pub fn with_input(mut self, property: PropertyDescriptor) -> Self {
        self.inputs.push(property);
        self
    }

    /// Add an output property
    pub fn with_output(mut self, property: PropertyDescriptor) -> Self {
        self.outputs.push(property);
        self
    }

    /// Set the implementation location, treating it as already resolved
    pub fn with_implementation(mut self, uri: impl Into<String>) -> Self {
        let uri = uri.into();
        self.implementation_uri = uri.clone();
        self.resolved_implementation_uri = uri;
        self
    }

    /// Get an input property by name
    pub fn input(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.inputs.iter().find(|p| p.name == name)
    }

    /// Get an output property by name
    pub fn output(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.outputs.iter().find(|p| p.name == name)
    }
}

/// Read-only lookup of shader node descriptors.
///
/// `source_types` lists acceptable source types in order of preference. An
/// empty list accepts the first registered entry.
pub trait ShaderRegistry {
    /// Find the descriptor for a type identifier
    fn shader_node_by_identifier(
        &self,
        identifier: &str,
        source_types: &[String],
    ) -> Option<&ShaderNodeDescriptor>;
}

/// Registry backed by an in-memory table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InMemoryRegistry {
    /// Descriptors by identifier, one per source type
    nodes: IndexMap<String, Vec<ShaderNodeDescriptor>>,
}

impl InMemoryRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor, replacing one with the same identifier and source type
    pub fn register(&mut self, descriptor: ShaderNodeDescriptor) {
        let entries = self.nodes.entry(descriptor.identifier.clone()).or_default();
        match entries.iter_mut().find(|d| d.source_type == descriptor.source_type) {
            Some(existing) => *existing = descriptor,
            None => entries.push(descriptor),
        }
    }

    /// Get all registered descriptors
    pub fn descriptors(&self) -> impl Iterator<Item = &ShaderNodeDescriptor> {
        self.nodes.values().flatten()
    }

    /// Get mutable access to all registered descriptors
    pub fn descriptors_mut(&mut self) -> impl Iterator<Item = &mut ShaderNodeDescriptor> {
        self.nodes.values_mut().flatten()
    }

    /// Number of registered descriptors
    pub fn len(&self) -> usize {
        self.nodes.values().map(Vec::len).sum()
    }

    /// Whether the registry has no descriptors
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Build a registry from a list of descriptors
    pub fn from_descriptors(descriptors: impl IntoIterator<Item = ShaderNodeDescriptor>) -> Self {
        let mut registry = Self::new();
        for descriptor in descriptors {
            registry.register(descriptor);
        }
        registry
    }
}

impl ShaderRegistry for InMemoryRegistry {
    fn shader_node_by_identifier(
        &self,
        identifier: &str,
        source_types: &[String],
    ) -> Option<&ShaderNodeDescriptor> {
        let entries = self.nodes.get(identifier)?;
        if source_types.is_empty() {
            return entries.first();
        }
        source_types
            .iter()
            .find_map(|ty| entries.iter().find(|d| &d.source_type == ty))
    }
}
