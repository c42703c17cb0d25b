// SPDX-License-Identifier: MIT OR Apache-2.0
//! Material network model for shadenet.
//!
//! This crate holds everything a conversion reads:
//! - Material networks (nodes, parameters, connections, terminals)
//! - Shader registries describing the available shader nodes
//! - Filters that rewrite a network before conversion
//!
//! ## Architecture
//!
//! Networks are plain data and may contain dangling references. Registries
//! are injected through the [`ShaderRegistry`] trait and are read-only once
//! built, so one registry can serve any number of conversions.

pub mod value;
pub mod node;
pub mod connection;
pub mod network;
pub mod registry;
pub mod filters;
pub mod dump;
pub mod builtin;

pub use value::{AssetPath, Value};
pub use node::{MaterialNode, NodePath};
pub use connection::Connection;
pub use network::{terminals, MaterialNetwork, NetworkError};
pub use registry::{
    InMemoryRegistry, PropertyDescriptor, PropertyType, ShaderNodeDescriptor, ShaderRegistry,
};
pub use filters::{FilterChain, MaterialFilter, ResolveVstructs};
pub use dump::NetworkDump;
