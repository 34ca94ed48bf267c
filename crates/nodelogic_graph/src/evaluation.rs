// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph evaluation and propagation.
//!
//! The engine owns one [`Graph`] per session. Writing an INPUT walks the
//! graph depth first along `output_1` then `output_2`, recomputing every
//! component it reaches and reporting each OUTPUT it lands on. Nothing is
//! skipped when a recomputed state is unchanged, so writing the same value
//! twice reports the same outputs twice.
//!
//! The walk keeps its own stack, so chain length is bounded by memory, not
//! by the thread stack. The depth guard only applies to graphs that contain
//! a feedback loop.

use crate::component::ComponentId;
use crate::config::EngineConfig;
use crate::description::GraphDescription;
use crate::gate::GateKind;
use crate::graph::{Graph, GraphError};
use std::fmt;

/// Receives `(output id, new state)` each time propagation reaches an OUTPUT
pub type OutputCallback = Box<dyn FnMut(&ComponentId, bool) + Send>;

/// An OUTPUT component receiving a new state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputChange {
    /// The OUTPUT component
    pub id: ComponentId,
    /// Its state after recomputation
    pub state: bool,
}

impl OutputChange {
    /// Create a change event
    pub fn new(id: impl Into<ComponentId>, state: bool) -> Self {
        Self { id: id.into(), state }
    }
}

/// A loaded graph plus the callback it reports to
struct Session {
    graph: Graph,
    callback: OutputCallback,
    /// A component on a feedback loop, found at initialization
    cycle: Option<ComponentId>,
}

/// Simulates a combinational circuit
///
/// Starts uninitialized; every operation other than `initialize*` returns
/// [`EngineError::NotInitialized`] until a graph has been loaded.
pub struct LogicEngine {
    config: EngineConfig,
    session: Option<Session>,
}

impl fmt::Debug for LogicEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogicEngine")
            .field("config", &self.config)
            .field("graph", &self.session.as_ref().map(|s| &s.graph))
            .finish()
    }
}

impl Default for LogicEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl LogicEngine {
    /// Create an uninitialized engine
    pub fn new(config: EngineConfig) -> Self {
        Self { config, session: None }
    }

    /// Parse a persisted description and start a session.
    ///
    /// On failure the engine keeps whatever session it had before, so an
    /// uninitialized engine stays uninitialized.
    pub fn initialize(
        &mut self,
        description: &GraphDescription,
        callback: impl FnMut(&ComponentId, bool) + Send + 'static,
    ) -> Result<(), EngineError> {
        let graph = description.parse()?;
        self.initialize_with_graph(graph, callback);
        Ok(())
    }

    /// Start a session over an already built graph
    pub fn initialize_with_graph(
        &mut self,
        graph: Graph,
        callback: impl FnMut(&ComponentId, bool) + Send + 'static,
    ) {
        let cycle = graph.find_cycle();
        if let Some(on_cycle) = &cycle {
            match self.config.depth_limit() {
                Some(limit) => tracing::warn!(
                    "Graph has a feedback loop through {}; propagation is cut off past depth {}",
                    on_cycle,
                    limit
                ),
                None => tracing::warn!(
                    "Graph has a feedback loop through {}; propagation reaching it will not terminate",
                    on_cycle
                ),
            }
        }
        self.session = Some(Session {
            graph,
            callback: Box::new(callback),
            cycle,
        });
    }

    /// Whether a graph has been loaded
    pub fn is_initialized(&self) -> bool {
        self.session.is_some()
    }

    /// A component on a feedback loop in the loaded graph, if there is one
    pub fn feedback_loop(&self) -> Result<Option<&ComponentId>, EngineError> {
        self.session
            .as_ref()
            .map(|s| s.cycle.as_ref())
            .ok_or(EngineError::NotInitialized)
    }

    /// Active configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The loaded graph
    pub fn graph(&self) -> Result<&Graph, EngineError> {
        self.session
            .as_ref()
            .map(|s| &s.graph)
            .ok_or(EngineError::NotInitialized)
    }

    fn session_mut(&mut self) -> Result<&mut Session, EngineError> {
        self.session.as_mut().ok_or(EngineError::NotInitialized)
    }

    /// Write an INPUT component and propagate the change
    pub fn set_input(&mut self, id: &str, value: bool) -> Result<(), EngineError> {
        self.write_input(id, value, None)
    }

    /// Like [`set_input`](Self::set_input), also returning the OUTPUT
    /// changes in the order the callback saw them
    pub fn set_input_collect(&mut self, id: &str, value: bool) -> Result<Vec<OutputChange>, EngineError> {
        let mut changes = Vec::new();
        self.write_input(id, value, Some(&mut changes))?;
        Ok(changes)
    }

    /// Flip the INPUT bound to `name`, returning its new state
    pub fn toggle_input(&mut self, name: &str) -> Result<bool, EngineError> {
        let id = self.resolve_id(name)?.clone();
        let value = !self.get_component_state(id.as_str())?;
        self.set_input(id.as_str(), value)?;
        Ok(value)
    }

    fn write_input(
        &mut self,
        id: &str,
        value: bool,
        changes: Option<&mut Vec<OutputChange>>,
    ) -> Result<(), EngineError> {
        let configured_limit = self.config.depth_limit();
        let log_transitions = self.config.log_transitions;
        let session = self.session_mut()?;
        // acyclic graphs always terminate, however deep they are
        let depth_limit = session.cycle.as_ref().and(configured_limit);

        let component = session
            .graph
            .component_mut(id)
            .ok_or_else(|| EngineError::UnknownId(id.into()))?;
        if component.kind != GateKind::INPUT {
            tracing::warn!("Refused write to {}: it is a {} component, not an INPUT", id, component.kind);
            return Err(EngineError::NotAnInput {
                id: id.into(),
                kind: component.kind,
            });
        }

        tracing::debug!("Set {} to {}", id, value);
        component.state = value;
        let consumers = [component.output_1.clone(), component.output_2.clone()];

        let mut walk = Propagation {
            graph: &mut session.graph,
            callback: &mut session.callback,
            changes,
            depth_limit,
            log_transitions,
        };
        walk.run(consumers, 1)
    }

    /// Read an OUTPUT component
    pub fn get_output(&self, id: &str) -> Result<bool, EngineError> {
        let component = self
            .graph()?
            .component(id)
            .ok_or_else(|| EngineError::UnknownId(id.into()))?;
        if component.kind != GateKind::OUTPUT {
            tracing::warn!("Refused read of {}: it is a {} component, not an OUTPUT", id, component.kind);
            return Err(EngineError::NotAnOutput {
                id: id.into(),
                kind: component.kind,
            });
        }
        Ok(component.state)
    }

    /// Read any component's state
    pub fn get_component_state(&self, id: &str) -> Result<bool, EngineError> {
        self.graph()?
            .component(id)
            .map(|c| c.state)
            .ok_or_else(|| EngineError::UnknownId(id.into()))
    }

    /// Friendly names of INPUT components
    pub fn input_names(&self) -> Result<&[String], EngineError> {
        Ok(self.graph()?.input_names())
    }

    /// Friendly names of OUTPUT components
    pub fn output_names(&self) -> Result<&[String], EngineError> {
        Ok(self.graph()?.output_names())
    }

    /// Look up the component bound to a friendly name
    pub fn resolve_id(&self, name: &str) -> Result<&ComponentId, EngineError> {
        Ok(self.graph()?.resolve_id(name)?)
    }

    /// IDs of every component in the graph
    pub fn all_ids(&self) -> Result<impl Iterator<Item = &ComponentId>, EngineError> {
        Ok(self.graph()?.all_ids())
    }
}

/// One depth-first walk started by an input write
struct Propagation<'a> {
    graph: &'a mut Graph,
    callback: &'a mut OutputCallback,
    changes: Option<&'a mut Vec<OutputChange>>,
    depth_limit: Option<usize>,
    log_transitions: bool,
}

impl Propagation<'_> {
    /// Visit `consumers` and everything downstream of them.
    ///
    /// Consumers are pushed second-first so `output_1`'s subtree is fully
    /// processed before `output_2` is entered, as a recursive walk would.
    fn run(&mut self, consumers: [Option<ComponentId>; 2], depth: usize) -> Result<(), EngineError> {
        let mut stack: Vec<(ComponentId, usize)> = Vec::new();
        push_consumers(&mut stack, consumers, depth);

        while let Some((id, depth)) = stack.pop() {
            if self.depth_limit.is_some_and(|limit| depth > limit) {
                tracing::error!("Propagation exceeded depth {} at {} inside a feedback loop", depth - 1, id);
                return Err(EngineError::CycleDetected { id, depth });
            }
            if let Some(next) = self.visit(&id)? {
                push_consumers(&mut stack, next, depth + 1);
            }
        }
        Ok(())
    }

    /// Recompute one component. Returns its consumers unless it is an
    /// OUTPUT or missing.
    fn visit(&mut self, id: &ComponentId) -> Result<Option<[Option<ComponentId>; 2]>, EngineError> {
        let Some(component) = self.graph.component(id.as_str()) else {
            return Ok(None);
        };
        let kind = component.kind;
        let a = self.graph.state_of(component.input_1.as_ref());
        let b = self.graph.state_of(component.input_2.as_ref());
        let consumers = [component.output_1.clone(), component.output_2.clone()];

        if self.log_transitions {
            tracing::debug!("Updating {} with inputs: {} and {}, logic type is {}", id, a, b, kind);
        }

        let state = match (kind.evaluate(a, b), self.graph.component_mut(id.as_str())) {
            (Some(state), Some(component)) => {
                component.state = state;
                state
            }
            (None, Some(component)) => component.state,
            (_, None) => return Ok(None),
        };

        if kind == GateKind::OUTPUT {
            (self.callback)(id, state);
            if let Some(changes) = self.changes.as_deref_mut() {
                changes.push(OutputChange {
                    id: id.clone(),
                    state,
                });
            }
            return Ok(None);
        }

        Ok(Some(consumers))
    }
}

fn push_consumers(stack: &mut Vec<(ComponentId, usize)>, consumers: [Option<ComponentId>; 2], depth: usize) {
    let [first, second] = consumers;
    stack.extend(second.map(|id| (id, depth)));
    stack.extend(first.map(|id| (id, depth)));
}

/// Error during evaluation
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Loading or name lookup failed
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// No component has this ID
    #[error("Unknown component: {0}")]
    UnknownId(ComponentId),

    /// Only INPUT components may be written
    #[error("Component {id} is a {kind} and cannot be written")]
    NotAnInput {
        /// Target component
        id: ComponentId,
        /// Its actual kind
        kind: GateKind,
    },

    /// Only OUTPUT components may be read with `get_output`
    #[error("Component {id} is a {kind} and is not an output")]
    NotAnOutput {
        /// Target component
        id: ComponentId,
        /// Its actual kind
        kind: GateKind,
    },

    /// No graph has been loaded yet
    #[error("Engine is not initialized")]
    NotInitialized,

    /// Propagation around a feedback loop went deeper than the configured limit
    #[error("Propagation reached depth {depth} at {id} inside a feedback loop")]
    CycleDetected {
        /// Component being entered when the limit was hit
        id: ComponentId,
        /// Depth it would have been entered at
        depth: usize,
    },
}
