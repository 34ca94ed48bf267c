// SPDX-License-Identifier: MIT OR Apache-2.0
//! Logic gate graphs for `NodeLogic`.
//!
//! This crate provides the runtime half of the node-based circuit editor:
//! - The compiled graph model (components, wiring, friendly names)
//! - The propagation engine that simulates it
//! - The blueprint format the editor saves and its compiler
//!
//! ## Architecture
//!
//! The editor produces a [`Blueprint`], which compiles into a [`Graph`].
//! A graph is persisted as two JSON documents ([`GraphDescription`]) and
//! loaded into a [`LogicEngine`], which accepts input writes and reports
//! every OUTPUT component it recomputes through a callback.

pub mod gate;
pub mod component;
pub mod graph;
pub mod description;
pub mod config;
pub mod evaluation;
pub mod shared;
pub mod blueprint;

pub use gate::GateKind;
pub use component::{Component, ComponentId};
pub use graph::{Graph, GraphError, WiringIssue};
pub use description::GraphDescription;
pub use config::{ConfigError, EngineConfig};
pub use evaluation::{EngineError, LogicEngine, OutputCallback, OutputChange};
pub use shared::SharedEngine;
pub use blueprint::{Blueprint, BlueprintConnection, BlueprintError, BlueprintNode};
