// SPDX-License-Identifier: MIT OR Apache-2.0
//! Gate kinds and their truth tables.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// The logic function a component performs.
///
/// Variant order matches the persisted ordinal, so it must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(clippy::upper_case_acronyms)]
pub enum GateKind {
    /// Conjunction of both inputs
    AND,
    /// Disjunction of both inputs
    OR,
    /// Exclusive or
    XOR,
    /// Negation of the single input
    NOT,
    /// Negated conjunction
    NAND,
    /// Negated disjunction
    NOR,
    /// Equality of both inputs
    XNOR,
    /// Externally writable source
    INPUT,
    /// Externally observable sink
    OUTPUT,
    /// Fixed source
    CONST,
    /// Pass-through with two consumers
    SPLITTER,
}

impl GateKind {
    /// All kinds in ordinal order.
    pub fn all() -> &'static [GateKind] {
        &[
            GateKind::AND,
            GateKind::OR,
            GateKind::XOR,
            GateKind::NOT,
            GateKind::NAND,
            GateKind::NOR,
            GateKind::XNOR,
            GateKind::INPUT,
            GateKind::OUTPUT,
            GateKind::CONST,
            GateKind::SPLITTER,
        ]
    }

    /// Persisted ordinal of this kind.
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    /// Kind for a persisted ordinal.
    pub fn from_ordinal(ordinal: u64) -> Option<Self> {
        Self::all().get(usize::try_from(ordinal).ok()?).copied()
    }

    /// Upper-case name used in menus and documents.
    pub fn name(self) -> &'static str {
        match self {
            GateKind::AND => "AND",
            GateKind::OR => "OR",
            GateKind::XOR => "XOR",
            GateKind::NOT => "NOT",
            GateKind::NAND => "NAND",
            GateKind::NOR => "NOR",
            GateKind::XNOR => "XNOR",
            GateKind::INPUT => "INPUT",
            GateKind::OUTPUT => "OUTPUT",
            GateKind::CONST => "CONST",
            GateKind::SPLITTER => "SPLITTER",
        }
    }

    /// Compute the new state from the two input values.
    ///
    /// `b` is ignored by unary kinds. Returns `None` for kinds whose state
    /// is never recomputed by propagation (INPUT and CONST).
    pub fn evaluate(self, a: bool, b: bool) -> Option<bool> {
        let state = match self {
            GateKind::AND => a && b,
            GateKind::OR => a || b,
            GateKind::XOR => a != b,
            GateKind::NAND => !(a && b),
            GateKind::NOR => !a && !b,
            GateKind::XNOR => a == b,
            GateKind::NOT => !a,
            GateKind::OUTPUT | GateKind::SPLITTER => a,
            GateKind::INPUT | GateKind::CONST => return None,
        };
        Some(state)
    }

    /// Number of input ports this kind exposes.
    pub fn input_ports(self) -> usize {
        match self {
            GateKind::AND
            | GateKind::OR
            | GateKind::XOR
            | GateKind::NAND
            | GateKind::NOR
            | GateKind::XNOR => 2,
            GateKind::NOT | GateKind::OUTPUT | GateKind::SPLITTER => 1,
            GateKind::INPUT | GateKind::CONST => 0,
        }
    }

    /// Number of output ports this kind exposes.
    pub fn output_ports(self) -> usize {
        match self {
            GateKind::OUTPUT => 0,
            GateKind::SPLITTER => 2,
            _ => 1,
        }
    }

    /// Whether components of this kind carry a friendly name.
    pub fn is_named(self) -> bool {
        matches!(self, GateKind::INPUT | GateKind::OUTPUT)
    }
}

impl fmt::Display for GateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error for an unrecognised gate name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown gate kind: {0}")]
pub struct UnknownGateKind(pub String);

impl FromStr for GateKind {
    type Err = UnknownGateKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|kind| kind.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownGateKind(s.to_string()))
    }
}

// Documents written by the graph editor store the ordinal; hand-written ones
// tend to use the name. Both are accepted, the ordinal is written.
impl Serialize for GateKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.ordinal())
    }
}

impl<'de> Deserialize<'de> for GateKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct KindVisitor;

        impl Visitor<'_> for KindVisitor {
            type Value = GateKind;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a gate ordinal between 0 and 10 or a gate name")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<GateKind, E> {
                GateKind::from_ordinal(v)
                    .ok_or_else(|| E::invalid_value(de::Unexpected::Unsigned(v), &self))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<GateKind, E> {
                u64::try_from(v)
                    .ok()
                    .and_then(GateKind::from_ordinal)
                    .ok_or_else(|| E::invalid_value(de::Unexpected::Signed(v), &self))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<GateKind, E> {
                v.parse()
                    .map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
            }
        }

        deserializer.deserialize_any(KindVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAIRS: [(bool, bool); 4] = [(false, false), (false, true), (true, false), (true, true)];

    fn table(kind: GateKind) -> Vec<bool> {
        PAIRS
            .iter()
            .map(|&(a, b)| kind.evaluate(a, b).unwrap())
            .collect()
    }

    #[test]
    fn test_binary_truth_tables() {
        assert_eq!(table(GateKind::AND), [false, false, false, true]);
        assert_eq!(table(GateKind::OR), [false, true, true, true]);
        assert_eq!(table(GateKind::XOR), [false, true, true, false]);
        assert_eq!(table(GateKind::NAND), [true, true, true, false]);
        assert_eq!(table(GateKind::NOR), [true, false, false, false]);
        assert_eq!(table(GateKind::XNOR), [true, false, false, true]);
    }

    #[test]
    fn test_unary_truth_tables() {
        for kind in [GateKind::NOT, GateKind::OUTPUT, GateKind::SPLITTER] {
            // second input must not matter
            for b in [false, true] {
                let expected = if kind == GateKind::NOT { [true, false] } else { [false, true] };
                assert_eq!(kind.evaluate(false, b), Some(expected[0]), "{kind} a=0 b={b}");
                assert_eq!(kind.evaluate(true, b), Some(expected[1]), "{kind} a=1 b={b}");
            }
        }
    }

    #[test]
    fn test_sources_are_never_recomputed() {
        for (a, b) in PAIRS {
            assert_eq!(GateKind::INPUT.evaluate(a, b), None);
            assert_eq!(GateKind::CONST.evaluate(a, b), None);
        }
    }

    #[test]
    fn test_port_counts() {
        assert_eq!(GateKind::XNOR.input_ports(), 2);
        assert_eq!(GateKind::SPLITTER.output_ports(), 2);
        assert_eq!(GateKind::OUTPUT.output_ports(), 0);
        assert_eq!(GateKind::INPUT.input_ports(), 0);
        assert_eq!(GateKind::CONST.input_ports(), 0);
        assert!(GateKind::INPUT.is_named());
        assert!(!GateKind::CONST.is_named());
    }

    #[test]
    fn test_deserialize_ordinal_and_name() {
        let from_ordinal: GateKind = serde_json::from_str("3").unwrap();
        assert_eq!(from_ordinal, GateKind::NOT);
        let from_name: GateKind = serde_json::from_str("\"splitter\"").unwrap();
        assert_eq!(from_name, GateKind::SPLITTER);
        assert!(serde_json::from_str::<GateKind>("11").is_err());
        assert!(serde_json::from_str::<GateKind>("\"MUX\"").is_err());
        assert_eq!(serde_json::to_string(&GateKind::CONST).unwrap(), "9");
    }
}
