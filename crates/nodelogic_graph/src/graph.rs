// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph data structure containing components and friendly names.

use crate::component::{Component, ComponentId};
use crate::gate::GateKind;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

/// A compiled logic circuit
///
/// Wiring is fixed once loaded; only component states change afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Graph {
    /// Components by ID
    components: IndexMap<ComponentId, Component>,
    /// Friendly name to component ID, for INPUT and OUTPUT components
    name_to_id: IndexMap<String, ComponentId>,
    /// Names whose component is an INPUT
    input_names: Vec<String>,
    /// Names whose component is an OUTPUT
    output_names: Vec<String>,
}

impl Graph {
    /// Parse the persisted components and name map documents
    pub fn load(components_json: &str, names_json: &str) -> Result<Self, GraphError> {
        let components: IndexMap<String, Component> = serde_json::from_str(components_json)
            .map_err(|source| GraphError::Parse { document: "components", source })?;
        let names: IndexMap<String, String> = serde_json::from_str(names_json)
            .map_err(|source| GraphError::Parse { document: "name map", source })?;

        let components = components
            .into_iter()
            .map(|(key, component)| (ComponentId(key), component));
        let names = names
            .into_iter()
            .map(|(name, id)| (name, ComponentId(id)));

        Self::from_parts(components, names)
    }

    /// Build a graph from already decoded components and names
    pub fn from_parts(
        components: impl IntoIterator<Item = (ComponentId, Component)>,
        names: impl IntoIterator<Item = (String, ComponentId)>,
    ) -> Result<Self, GraphError> {
        let mut map = IndexMap::new();
        for (key, component) in components {
            if component.id.as_str().is_empty() {
                return Err(GraphError::malformed(format!("component {key} has an empty GUID")));
            }
            if component.id != key {
                return Err(GraphError::malformed(format!(
                    "component stored under {key} declares GUID {}",
                    component.id
                )));
            }
            if map.insert(key.clone(), component).is_some() {
                return Err(GraphError::malformed(format!("duplicate component {key}")));
            }
        }

        let mut name_to_id = IndexMap::new();
        let mut input_names = Vec::new();
        let mut output_names = Vec::new();
        for (name, id) in names {
            let Some(component) = map.get(&id) else {
                return Err(GraphError::malformed(format!(
                    "name {name:?} refers to missing component {id}"
                )));
            };
            match component.kind {
                GateKind::INPUT => input_names.push(name.clone()),
                GateKind::OUTPUT => output_names.push(name.clone()),
                kind => tracing::warn!("Name {:?} is bound to a {} component, expected INPUT or OUTPUT", name, kind),
            }
            name_to_id.insert(name, id);
        }

        let graph = Self {
            components: map,
            name_to_id,
            input_names,
            output_names,
        };

        for (owner, target) in graph.dangling_refs() {
            tracing::warn!("Component {} refers to missing component {}; treated as unconnected", owner, target);
        }

        tracing::info!(
            "Loaded logic graph: {} components, {} inputs, {} outputs",
            graph.components.len(),
            graph.input_names.len(),
            graph.output_names.len()
        );

        Ok(graph)
    }

    /// Serialize back into the `(components, name map)` documents
    pub fn to_documents(&self) -> Result<(String, String), GraphError> {
        let components = serde_json::to_string_pretty(&self.components)
            .map_err(|source| GraphError::Encode { document: "components", source })?;
        let names = serde_json::to_string_pretty(&self.name_to_id)
            .map_err(|source| GraphError::Encode { document: "name map", source })?;
        Ok((components, names))
    }

    /// Look up the component bound to a friendly name
    pub fn resolve_id(&self, name: &str) -> Result<&ComponentId, GraphError> {
        self.name_to_id
            .get(name)
            .ok_or_else(|| GraphError::UnknownName(name.to_string()))
    }

    /// Get a component by ID
    pub fn component(&self, id: &str) -> Option<&Component> {
        self.components.get(id)
    }

    pub(crate) fn component_mut(&mut self, id: &str) -> Option<&mut Component> {
        self.components.get_mut(id)
    }

    /// Current state of a component; absent or missing refs read as `false`
    pub fn state_of(&self, id: Option<&ComponentId>) -> bool {
        id.and_then(|id| self.components.get(id))
            .is_some_and(|c| c.state)
    }

    /// Get all component IDs
    pub fn all_ids(&self) -> impl Iterator<Item = &ComponentId> {
        self.components.keys()
    }

    /// Friendly names bound to INPUT components
    pub fn input_names(&self) -> &[String] {
        &self.input_names
    }

    /// Friendly names bound to OUTPUT components
    pub fn output_names(&self) -> &[String] {
        &self.output_names
    }

    /// Friendly name to ID bindings
    pub fn names(&self) -> impl Iterator<Item = (&str, &ComponentId)> {
        self.name_to_id.iter().map(|(name, id)| (name.as_str(), id))
    }

    /// Get the number of components
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Whether the graph has no components
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    fn dangling_refs(&self) -> impl Iterator<Item = (&ComponentId, &ComponentId)> {
        self.components.values().flat_map(move |c| {
            c.inputs()
                .chain(c.outputs())
                .filter(move |target| !self.components.contains_key(*target))
                .map(move |target| (&c.id, target))
        })
    }

    /// Report wiring that disagrees with the gate kinds.
    ///
    /// Loading never rejects these; the engine reads missing inputs as
    /// `false` and skips missing consumers.
    pub fn wiring_issues(&self) -> Vec<WiringIssue> {
        let mut issues = Vec::new();

        for component in self.components.values() {
            let inputs = component.inputs().count();
            if inputs > component.kind.input_ports() {
                issues.push(WiringIssue::TooManyInputs {
                    id: component.id.clone(),
                    kind: component.kind,
                    connected: inputs,
                });
            }
            let outputs = component.outputs().count();
            if outputs > component.kind.output_ports() {
                issues.push(WiringIssue::TooManyOutputs {
                    id: component.id.clone(),
                    kind: component.kind,
                    connected: outputs,
                });
            }
            for target in component.outputs() {
                if let Some(consumer) = self.components.get(target) {
                    if !consumer.inputs().any(|source| *source == component.id) {
                        issues.push(WiringIssue::Asymmetric {
                            from: component.id.clone(),
                            to: target.clone(),
                        });
                    }
                }
            }
        }

        issues.extend(self.dangling_refs().map(|(owner, target)| WiringIssue::Dangling {
            id: owner.clone(),
            target: target.clone(),
        }));

        issues
    }

    /// Find a component that lies on a cycle of output refs, if any.
    ///
    /// Three-colour depth-first search with an explicit stack; each frame
    /// holds the index of the next output ref to follow.
    pub fn find_cycle(&self) -> Option<ComponentId> {
        let mut marks: HashMap<&ComponentId, Mark> = HashMap::with_capacity(self.components.len());
        let mut stack: Vec<(&ComponentId, usize)> = Vec::new();

        for root in self.components.keys() {
            if marks.contains_key(root) {
                continue;
            }
            marks.insert(root, Mark::Open);
            stack.push((root, 0));

            while let Some((id, cursor)) = stack.last_mut() {
                let next = self.components.get(*id).and_then(|c| c.outputs().nth(*cursor));
                let Some(next) = next else {
                    marks.insert(*id, Mark::Done);
                    stack.pop();
                    continue;
                };
                *cursor += 1;

                let Some((next, _)) = self.components.get_key_value(next) else {
                    continue;
                };
                match marks.get(next) {
                    Some(Mark::Open) => return Some(next.clone()),
                    Some(Mark::Done) => {}
                    None => {
                        marks.insert(next, Mark::Open);
                        stack.push((next, 0));
                    }
                }
            }
        }
        None
    }
}

#[derive(Clone, Copy)]
enum Mark {
    /// On the current search path
    Open,
    /// Fully explored
    Done,
}

/// A structural problem reported by [`Graph::wiring_issues`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WiringIssue {
    /// More inputs connected than the kind has ports for
    TooManyInputs {
        /// Offending component
        id: ComponentId,
        /// Its kind
        kind: GateKind,
        /// Number of connected inputs
        connected: usize,
    },
    /// More consumers connected than the kind has ports for
    TooManyOutputs {
        /// Offending component
        id: ComponentId,
        /// Its kind
        kind: GateKind,
        /// Number of connected consumers
        connected: usize,
    },
    /// A ref points at a component that does not exist
    Dangling {
        /// Component holding the ref
        id: ComponentId,
        /// Missing target
        target: ComponentId,
    },
    /// `from` lists `to` as a consumer but `to` does not read from `from`
    Asymmetric {
        /// Producer
        from: ComponentId,
        /// Consumer
        to: ComponentId,
    },
}

impl fmt::Display for WiringIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooManyInputs { id, kind, connected } => write!(
                f,
                "{kind} {id} has {connected} inputs connected but only {} ports",
                kind.input_ports()
            ),
            Self::TooManyOutputs { id, kind, connected } => write!(
                f,
                "{kind} {id} has {connected} outputs connected but only {} ports",
                kind.output_ports()
            ),
            Self::Dangling { id, target } => write!(f, "{id} refers to missing component {target}"),
            Self::Asymmetric { from, to } => write!(f, "{from} feeds {to}, but {to} does not read from {from}"),
        }
    }
}

/// Error when loading or querying a graph
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// Document decoded but its contents are inconsistent
    #[error("Malformed graph: {0}")]
    Malformed(String),

    /// Document is not valid JSON of the expected shape
    #[error("Malformed {document} document: {source}")]
    Parse {
        /// Which document failed
        document: &'static str,
        /// Underlying decoder error
        source: serde_json::Error,
    },

    /// Graph could not be written back out
    #[error("Failed to encode {document} document: {source}")]
    Encode {
        /// Which document failed
        document: &'static str,
        /// Underlying encoder error
        source: serde_json::Error,
    },

    /// Friendly name not present in the name map
    #[error("Unknown name: {0}")]
    UnknownName(String),

    /// Graph document could not be read or written
    #[error("Failed to access {path:?}: {source}")]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },
}

impl GraphError {
    fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed(reason.into())
    }

    /// Whether this error means the persisted data itself is bad
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed(_) | Self::Parse { .. })
    }
}
