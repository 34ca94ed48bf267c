// SPDX-License-Identifier: MIT OR Apache-2.0
//! Engine handle for multi-threaded hosts.
//!
//! Propagation must never interleave, so every call takes the engine lock
//! for its full duration.

use crate::component::ComponentId;
use crate::evaluation::{EngineError, LogicEngine, OutputChange};
use parking_lot::Mutex;
use std::sync::Arc;

/// Cloneable, lock-protected [`LogicEngine`]
#[derive(Debug, Clone)]
pub struct SharedEngine {
    inner: Arc<Mutex<LogicEngine>>,
}

impl SharedEngine {
    /// Wrap an engine
    pub fn new(engine: LogicEngine) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    /// Write an INPUT component and propagate the change
    pub fn set_input(&self, id: &str, value: bool) -> Result<(), EngineError> {
        self.inner.lock().set_input(id, value)
    }

    /// Write an INPUT and return the OUTPUT changes it caused
    pub fn set_input_collect(&self, id: &str, value: bool) -> Result<Vec<OutputChange>, EngineError> {
        self.inner.lock().set_input_collect(id, value)
    }

    /// Read an OUTPUT component
    pub fn get_output(&self, id: &str) -> Result<bool, EngineError> {
        self.inner.lock().get_output(id)
    }

    /// Read any component's state
    pub fn get_component_state(&self, id: &str) -> Result<bool, EngineError> {
        self.inner.lock().get_component_state(id)
    }

    /// Look up the component bound to a friendly name
    pub fn resolve_id(&self, name: &str) -> Result<ComponentId, EngineError> {
        self.inner.lock().resolve_id(name).cloned()
    }

    /// Run `f` with exclusive access to the engine
    pub fn with<R>(&self, f: impl FnOnce(&mut LogicEngine) -> R) -> R {
        f(&mut self.inner.lock())
    }
}

impl From<LogicEngine> for SharedEngine {
    fn from(engine: LogicEngine) -> Self {
        Self::new(engine)
    }
}
