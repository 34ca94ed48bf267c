// SPDX-License-Identifier: MIT OR Apache-2.0
//! Editor authoring document and its compiler.
//!
//! A blueprint is what the node editor saves between sessions: node
//! placement, titles and the edges drawn between them. [`Blueprint::compile`]
//! turns it into the runtime [`Graph`].

use crate::component::{Component, ComponentId};
use crate::gate::GateKind;
use crate::graph::{Graph, GraphError};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A node as placed in the editor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlueprintNode {
    /// Component ID the node compiles to
    #[serde(rename = "NodeGUID")]
    pub id: ComponentId,
    /// Horizontal canvas position
    #[serde(rename = "NodePositionX", default)]
    pub position_x: f32,
    /// Vertical canvas position
    #[serde(rename = "NodePositionY", default)]
    pub position_y: f32,
    /// Gate kind
    #[serde(rename = "NodeType")]
    pub kind: GateKind,
    /// Friendly name, only meaningful for INPUT and OUTPUT
    #[serde(rename = "NodeName", default)]
    pub name: Option<String>,
    /// Title shown on the node
    #[serde(rename = "NodeDisplayName", default)]
    pub display_title: String,
    /// Authored state (the CONST toggle)
    #[serde(rename = "NodeState", default)]
    pub state: bool,
}

impl BlueprintNode {
    /// Create a node with a fresh ID, titled after its kind
    pub fn new(kind: GateKind) -> Self {
        Self {
            id: ComponentId::generate(),
            position_x: 0.0,
            position_y: 0.0,
            kind,
            name: None,
            display_title: kind.name().to_string(),
            state: false,
        }
    }

    /// Use a specific ID
    pub fn with_id(mut self, id: impl Into<ComponentId>) -> Self {
        self.id = id.into();
        self
    }

    /// Set the friendly name
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the authored state
    pub fn with_state(mut self, state: bool) -> Self {
        self.state = state;
        self
    }

    /// Set the position
    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.position_x = x;
        self.position_y = y;
        self
    }
}

/// An edge from one node's output to another node's input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlueprintConnection {
    /// Node whose output the edge leaves
    #[serde(rename = "OutputPort")]
    pub output_id: ComponentId,
    /// Node whose input the edge enters
    #[serde(rename = "InputPort")]
    pub input_id: ComponentId,
}

/// Saved editing session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Blueprint {
    /// Placed nodes
    #[serde(rename = "Nodes", default)]
    pub nodes: Vec<BlueprintNode>,
    /// Drawn edges, in drawing order
    #[serde(rename = "Connections", default)]
    pub connections: Vec<BlueprintConnection>,
}

impl Blueprint {
    /// Create an empty blueprint
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node, returning its ID
    pub fn add_node(&mut self, node: BlueprintNode) -> Result<ComponentId, BlueprintError> {
        if self.node(node.id.as_str()).is_some() {
            return Err(BlueprintError::DuplicateNode(node.id));
        }
        let id = node.id.clone();
        self.nodes.push(node);
        Ok(id)
    }

    /// Remove a node and every edge touching it
    pub fn remove_node(&mut self, id: &str) -> Option<BlueprintNode> {
        let index = self.nodes.iter().position(|n| n.id.as_str() == id)?;
        self.connections
            .retain(|c| c.output_id.as_str() != id && c.input_id.as_str() != id);
        Some(self.nodes.remove(index))
    }

    /// Get a node by ID
    pub fn node(&self, id: &str) -> Option<&BlueprintNode> {
        self.nodes.iter().find(|n| n.id.as_str() == id)
    }

    /// Draw an edge from `from`'s output to `to`'s input
    pub fn connect(&mut self, from: &str, to: &str) -> Result<(), BlueprintError> {
        self.check_connection(from, to, &self.connections)?;
        self.connections.push(BlueprintConnection {
            output_id: from.into(),
            input_id: to.into(),
        });
        Ok(())
    }

    /// Remove every edge from `from` to `to`, returning how many were removed
    pub fn disconnect(&mut self, from: &str, to: &str) -> usize {
        let before = self.connections.len();
        self.connections
            .retain(|c| !(c.output_id.as_str() == from && c.input_id.as_str() == to));
        before - self.connections.len()
    }

    fn check_connection(
        &self,
        from: &str,
        to: &str,
        existing: &[BlueprintConnection],
    ) -> Result<(), BlueprintError> {
        let source = self
            .node(from)
            .ok_or_else(|| BlueprintError::UnknownNode(from.into()))?;
        let target = self
            .node(to)
            .ok_or_else(|| BlueprintError::UnknownNode(to.into()))?;

        if from == to {
            return Err(BlueprintError::SelfLoop(from.into()));
        }
        if source.kind.output_ports() == 0 {
            return Err(BlueprintError::NoOutputs { id: from.into(), kind: source.kind });
        }
        if target.kind.input_ports() == 0 {
            return Err(BlueprintError::NoInputs { id: to.into(), kind: target.kind });
        }

        let outgoing = existing.iter().filter(|c| c.output_id.as_str() == from).count();
        if outgoing >= source.kind.output_ports() {
            return Err(BlueprintError::OutputsExhausted(from.into()));
        }
        let incoming = existing.iter().filter(|c| c.input_id.as_str() == to).count();
        if incoming >= target.kind.input_ports() {
            return Err(BlueprintError::InputsExhausted(to.into()));
        }

        Ok(())
    }

    /// Compile into the runtime graph.
    ///
    /// Edges fill the first free port on each end in drawing order, so the
    /// first edge into a binary gate becomes its `a` input.
    pub fn compile(&self) -> Result<Graph, BlueprintError> {
        let mut components: IndexMap<ComponentId, Component> = IndexMap::new();
        let mut names: IndexMap<String, ComponentId> = IndexMap::new();

        for node in &self.nodes {
            let component = Component::new(node.id.clone(), node.kind).with_state(node.state);
            if components.insert(node.id.clone(), component).is_some() {
                return Err(BlueprintError::DuplicateNode(node.id.clone()));
            }

            if node.kind.is_named() {
                let name = node
                    .name
                    .as_deref()
                    .filter(|n| !n.is_empty())
                    .ok_or_else(|| BlueprintError::MissingName(node.id.clone()))?;
                if names.contains_key(name) {
                    tracing::warn!("Name {:?} is used by more than one node; keeping the first", name);
                } else {
                    names.insert(name.to_string(), node.id.clone());
                }
            }
        }

        for (index, connection) in self.connections.iter().enumerate() {
            let from = connection.output_id.as_str();
            let to = connection.input_id.as_str();
            self.check_connection(from, to, &self.connections[..index])?;

            // check_connection guarantees both ends exist and have a free slot
            if let Some(target) = components.get_mut(to) {
                target.attach_input(connection.output_id.clone());
            }
            if let Some(source) = components.get_mut(from) {
                source.attach_output(connection.input_id.clone());
            }
        }

        tracing::debug!(
            "Compiled blueprint: {} nodes, {} connections",
            self.nodes.len(),
            self.connections.len()
        );

        Ok(Graph::from_parts(components, names)?)
    }

    /// Parse from JSON
    pub fn from_json(text: &str) -> Result<Self, BlueprintError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, BlueprintError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load from a blueprint file
    pub fn load(path: &Path) -> Result<Self, BlueprintError> {
        let text = std::fs::read_to_string(path).map_err(|source| BlueprintError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Save to a blueprint file
    pub fn save(&self, path: &Path) -> Result<(), BlueprintError> {
        std::fs::write(path, self.to_json()?).map_err(|source| BlueprintError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Error when editing or compiling a blueprint
#[derive(Debug, thiserror::Error)]
pub enum BlueprintError {
    /// Node not found
    #[error("Node not found: {0}")]
    UnknownNode(ComponentId),

    /// Two nodes share an ID
    #[error("Duplicate node: {0}")]
    DuplicateNode(ComponentId),

    /// Self-loop not allowed
    #[error("Self-loop not allowed on {0}")]
    SelfLoop(ComponentId),

    /// Source kind has no output port
    #[error("{kind} node {id} has no output")]
    NoOutputs {
        /// Source node
        id: ComponentId,
        /// Its kind
        kind: GateKind,
    },

    /// Target kind has no input port
    #[error("{kind} node {id} has no input")]
    NoInputs {
        /// Target node
        id: ComponentId,
        /// Its kind
        kind: GateKind,
    },

    /// Every output port of the source is already connected
    #[error("All outputs of {0} are connected")]
    OutputsExhausted(ComponentId),

    /// Every input port of the target is already connected
    #[error("All inputs of {0} are connected")]
    InputsExhausted(ComponentId),

    /// INPUT or OUTPUT node without a friendly name
    #[error("INPUT/OUTPUT node {0} needs a name")]
    MissingName(ComponentId),

    /// Compiled graph was rejected
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// Blueprint JSON is invalid
    #[error("Invalid blueprint: {0}")]
    Json(#[from] serde_json::Error),

    /// Blueprint file could not be read or written
    #[error("Failed to access {path:?}: {source}")]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },
}
