// SPDX-License-Identifier: MIT OR Apache-2.0
//! RenderMan conversion for shadenet material networks.
//!
//! Converts a [`shadenet_network::MaterialNetwork`] into ordered lists of
//! renderer shading nodes and keeps the renderer's networks in sync with
//! material edits.
//!
//! ## Architecture
//!
//! - [`GraphConverter`] walks a network from a terminal and emits every
//!   reachable node after its dependencies
//! - [`Material`] owns the renderer networks of one material and decides
//!   whether each sync creates, modifies or deletes them
//! - [`NetworkSink`] is the renderer side; [`InMemorySink`] keeps results
//!   in memory

pub mod shading_node;
pub mod asset;
pub mod params;
pub mod connections;
pub mod converter;
pub mod sink;
pub mod config;
pub mod material;

pub use shading_node::{ParamList, ParamValue, ReferenceType, ShadingNode, ShadingNodeKind};
pub use params::ParamError;
pub use converter::{classify, convert_network, ConvertError, GraphConverter};
pub use sink::{CommittedNetwork, InMemorySink, NetworkId, NetworkKind, NetworkSink, SinkCall};
pub use config::ConverterConfig;
pub use material::{Material, SyncError, SyncReport};
