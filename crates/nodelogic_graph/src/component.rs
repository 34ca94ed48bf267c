// SPDX-License-Identifier: MIT OR Apache-2.0
//! Component (gate instance) definitions for the graph.

use crate::gate::GateKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a component
///
/// Opaque to the engine; the editor writes hyphenated UUIDs but any
/// non-empty string is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentId(pub String);

impl ComponentId {
    /// Create a new random component ID
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Borrow the raw identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ComponentId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ComponentId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl std::borrow::Borrow<str> for ComponentId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// One gate instance and its wiring.
///
/// Field names follow the persisted components document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    /// Gate kind, fixed at creation
    #[serde(rename = "type")]
    pub kind: GateKind,
    /// This component's own ID
    #[serde(rename = "GUID")]
    pub id: ComponentId,
    /// First input source
    #[serde(rename = "InputPort1", default, with = "port_ref")]
    pub input_1: Option<ComponentId>,
    /// Second input source
    #[serde(rename = "InputPort2", default, with = "port_ref")]
    pub input_2: Option<ComponentId>,
    /// First downstream consumer
    #[serde(rename = "OutputPort1", default, with = "port_ref")]
    pub output_1: Option<ComponentId>,
    /// Second downstream consumer
    #[serde(rename = "OutputPort2", default, with = "port_ref")]
    pub output_2: Option<ComponentId>,
    /// Current value
    #[serde(rename = "State", default)]
    pub state: bool,
}

impl Component {
    /// Create an unwired component
    pub fn new(id: impl Into<ComponentId>, kind: GateKind) -> Self {
        Self {
            kind,
            id: id.into(),
            input_1: None,
            input_2: None,
            output_1: None,
            output_2: None,
            state: false,
        }
    }

    /// Set the initial state
    pub fn with_state(mut self, state: bool) -> Self {
        self.state = state;
        self
    }

    /// Set the input sources
    pub fn with_inputs(mut self, first: Option<&str>, second: Option<&str>) -> Self {
        self.input_1 = first.map(ComponentId::from);
        self.input_2 = second.map(ComponentId::from);
        self
    }

    /// Set the downstream consumers
    pub fn with_outputs(mut self, first: Option<&str>, second: Option<&str>) -> Self {
        self.output_1 = first.map(ComponentId::from);
        self.output_2 = second.map(ComponentId::from);
        self
    }

    /// Connected input sources, in port order
    pub fn inputs(&self) -> impl Iterator<Item = &ComponentId> {
        self.input_1.iter().chain(self.input_2.iter())
    }

    /// Connected downstream consumers, in port order
    pub fn outputs(&self) -> impl Iterator<Item = &ComponentId> {
        self.output_1.iter().chain(self.output_2.iter())
    }

    /// Occupy the first free input slot. Returns false when both are taken.
    pub fn attach_input(&mut self, source: ComponentId) -> bool {
        attach(&mut self.input_1, &mut self.input_2, source)
    }

    /// Occupy the first free output slot. Returns false when both are taken.
    pub fn attach_output(&mut self, target: ComponentId) -> bool {
        attach(&mut self.output_1, &mut self.output_2, target)
    }
}

fn attach(first: &mut Option<ComponentId>, second: &mut Option<ComponentId>, id: ComponentId) -> bool {
    if first.is_none() {
        *first = Some(id);
    } else if second.is_none() {
        *second = Some(id);
    } else {
        return false;
    }
    true
}

/// Port fields are persisted as strings where `""` means unconnected.
mod port_ref {
    use super::ComponentId;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<ComponentId>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(value.as_ref().map_or("", ComponentId::as_str))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<ComponentId>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.filter(|s| !s.is_empty()).map(ComponentId))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_port_is_unconnected() {
        let json = r#"{
            "type": 0,
            "GUID": "and-1",
            "InputPort1": "a",
            "InputPort2": "",
            "OutputPort1": "out",
            "OutputPort2": null,
            "State": true
        }"#;
        let component: Component = serde_json::from_str(json).unwrap();
        assert_eq!(component.kind, GateKind::AND);
        assert_eq!(component.input_1, Some(ComponentId::from("a")));
        assert_eq!(component.input_2, None);
        assert_eq!(component.output_2, None);
        assert!(component.state);
        assert_eq!(component.inputs().count(), 1);
    }

    #[test]
    fn test_unconnected_port_written_as_empty_string() {
        let component = Component::new("not-1", GateKind::NOT).with_inputs(Some("a"), None);
        let value = serde_json::to_value(&component).unwrap();
        assert_eq!(value["InputPort1"], "a");
        assert_eq!(value["InputPort2"], "");
        assert_eq!(value["OutputPort1"], "");
        assert_eq!(value["type"], 3);
    }

    #[test]
    fn test_missing_ports_default_to_unconnected() {
        let component: Component = serde_json::from_str(r#"{"type": "CONST", "GUID": "c"}"#).unwrap();
        assert_eq!(component.kind, GateKind::CONST);
        assert!(!component.state);
        assert_eq!(component.outputs().count(), 0);
    }

    #[test]
    fn test_attach_fills_first_free_slot() {
        let mut splitter = Component::new("s", GateKind::SPLITTER);
        assert!(splitter.attach_output("x".into()));
        assert!(splitter.attach_output("y".into()));
        assert!(!splitter.attach_output("z".into()));
        let outputs: Vec<_> = splitter.outputs().map(ComponentId::as_str).collect();
        assert_eq!(outputs, ["x", "y"]);
    }

    #[test]
    fn test_generated_ids_are_unique() {
        assert_ne!(ComponentId::generate(), ComponentId::generate());
    }
}
