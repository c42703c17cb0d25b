// SPDX-License-Identifier: MIT OR Apache-2.0
//! Renderer side of a conversion: where finished shading networks go.

use crate::shading_node::ShadingNode;
use indexmap::IndexMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier of a committed shading network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NetworkId(pub Uuid);

impl NetworkId {
    /// Marks a network that does not exist (yet)
    pub const INVALID: Self = Self(Uuid::nil());

    /// Create a new random network ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Whether this names an existing network
    pub fn is_valid(&self) -> bool {
        *self != Self::INVALID
    }
}

impl Default for NetworkId {
    fn default() -> Self {
        Self::INVALID
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which renderer network a set of nodes is committed as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NetworkKind {
    /// Surface/volume material
    Material,
    /// Displacement
    Displacement,
}

impl fmt::Display for NetworkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Material => "material",
            Self::Displacement => "displacement",
        })
    }
}

/// Receiver of converted shading networks.
///
/// Methods take `&self` so one sink can serve many materials.
pub trait NetworkSink {
    /// Create a network; returns [`NetworkId::INVALID`] on failure
    fn create_network(&self, kind: NetworkKind, nodes: &[ShadingNode]) -> NetworkId;

    /// Replace the nodes of an existing network
    fn modify_network(&self, kind: NetworkKind, id: NetworkId, nodes: &[ShadingNode]);

    /// Delete a network
    fn delete_network(&self, kind: NetworkKind, id: NetworkId);
}

/// A network held by an [`InMemorySink`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommittedNetwork {
    /// Network kind
    pub kind: NetworkKind,
    /// Nodes in commit order
    pub nodes: Vec<ShadingNode>,
    /// Number of modifications since creation
    pub revision: u32,
}

/// A call received by an [`InMemorySink`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkCall {
    /// `create_network`, with the id handed out
    Create(NetworkKind, NetworkId),
    /// `modify_network`
    Modify(NetworkKind, NetworkId),
    /// `delete_network`
    Delete(NetworkKind, NetworkId),
}

#[derive(Default)]
struct SinkState {
    networks: IndexMap<NetworkId, CommittedNetwork>,
    calls: Vec<SinkCall>,
}

/// Sink that keeps committed networks in memory
#[derive(Default)]
pub struct InMemorySink {
    state: Mutex<SinkState>,
    reject_creates: bool,
}

impl InMemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a sink whose every create call fails
    pub fn rejecting_creates() -> Self {
        Self {
            reject_creates: true,
            ..Self::default()
        }
    }

    /// Get a committed network by id
    pub fn network(&self, id: NetworkId) -> Option<CommittedNetwork> {
        self.state.lock().networks.get(&id).cloned()
    }

    /// All live networks in creation order
    pub fn networks(&self) -> Vec<(NetworkId, CommittedNetwork)> {
        self.state
            .lock()
            .networks
            .iter()
            .map(|(id, network)| (*id, network.clone()))
            .collect()
    }

    /// Number of live networks
    pub fn network_count(&self) -> usize {
        self.state.lock().networks.len()
    }

    /// Every call received so far
    pub fn calls(&self) -> Vec<SinkCall> {
        self.state.lock().calls.clone()
    }
}

impl NetworkSink for InMemorySink {
    fn create_network(&self, kind: NetworkKind, nodes: &[ShadingNode]) -> NetworkId {
        let mut state = self.state.lock();
        if self.reject_creates {
            state.calls.push(SinkCall::Create(kind, NetworkId::INVALID));
            return NetworkId::INVALID;
        }
        let id = NetworkId::new();
        state.networks.insert(
            id,
            CommittedNetwork {
                kind,
                nodes: nodes.to_vec(),
                revision: 0,
            },
        );
        state.calls.push(SinkCall::Create(kind, id));
        tracing::debug!(%kind, %id, nodes = nodes.len(), "Created network");
        id
    }

    fn modify_network(&self, kind: NetworkKind, id: NetworkId, nodes: &[ShadingNode]) {
        let mut state = self.state.lock();
        state.calls.push(SinkCall::Modify(kind, id));
        match state.networks.get_mut(&id) {
            Some(network) => {
                network.nodes = nodes.to_vec();
                network.revision += 1;
                tracing::debug!(%kind, %id, nodes = nodes.len(), "Modified network");
            }
            None => tracing::warn!(%kind, %id, "Modify of unknown network"),
        }
    }

    fn delete_network(&self, kind: NetworkKind, id: NetworkId) {
        let mut state = self.state.lock();
        state.calls.push(SinkCall::Delete(kind, id));
        if state.networks.shift_remove(&id).is_none() {
            tracing::warn!(%kind, %id, "Delete of unknown network");
        }
    }
}
