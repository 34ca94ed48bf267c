// SPDX-License-Identifier: MIT OR Apache-2.0
//! Command line arguments.

use clap::Parser;
use std::path::PathBuf;
use std::str::FromStr;

/// NodeLogic circuit tools
#[derive(Debug, Parser)]
#[clap(name = "nodelogic", about = "Compile and simulate NodeLogic gate graphs")]
pub enum CliArguments {
    /// Compile an editor blueprint into the components and names documents.
    Compile(CompileArgs),
    /// Load a compiled graph, apply input steps and print every output event.
    Run(RunArgs),
    /// Report wiring problems and feedback loops in a compiled graph.
    Check(GraphArgs),
}

/// Location of a compiled graph
#[derive(Debug, Parser)]
pub struct GraphArgs {
    /// Directory holding the graph documents
    pub dir: PathBuf,

    /// Graph name; documents are "<STEM> components.json" and "<STEM> names.json"
    pub stem: String,
}

/// Arguments for `compile`
#[derive(Debug, Parser)]
pub struct CompileArgs {
    /// Blueprint file saved by the editor
    pub blueprint: PathBuf,

    /// Output directory (default: the blueprint's directory)
    #[clap(long, short)]
    pub out_dir: Option<PathBuf>,

    /// Graph name (default: the blueprint's file stem)
    #[clap(long, short)]
    pub stem: Option<String>,
}

/// Arguments for `run`
#[derive(Debug, Parser)]
pub struct RunArgs {
    #[clap(flatten)]
    pub graph: GraphArgs,

    /// Engine configuration file (RON)
    #[clap(long, short)]
    pub config: Option<PathBuf>,

    /// Input step, applied in order: NAME=1, NAME=0 or NAME to toggle
    #[clap(long = "step", short = 's')]
    pub steps: Vec<Step>,

    /// Print output events as JSON lines
    #[clap(long)]
    pub json: bool,
}

/// What to do to an input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepAction {
    /// Write this value
    Set(bool),
    /// Flip the current value
    Toggle,
}

/// One input change requested on the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Friendly name of the INPUT
    pub name: String,
    /// Change to apply
    pub action: StepAction,
}

/// Error for a step that does not parse
#[derive(Debug, thiserror::Error)]
pub enum StepParseError {
    /// Nothing before the `=`
    #[error("step has no input name")]
    MissingName,
    /// Unrecognised value after the `=`
    #[error("invalid value {0:?}, expected 1, 0, true, false, on, off or toggle")]
    InvalidValue(String),
}

impl FromStr for Step {
    type Err = StepParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, value) = match s.rsplit_once('=') {
            Some((name, value)) => (name.trim(), Some(value.trim())),
            None => (s.trim(), None),
        };
        if name.is_empty() {
            return Err(StepParseError::MissingName);
        }

        let action = match value.map(str::to_ascii_lowercase).as_deref() {
            None | Some("toggle") => StepAction::Toggle,
            Some("1" | "true" | "on") => StepAction::Set(true),
            Some("0" | "false" | "off") => StepAction::Set(false),
            Some(other) => return Err(StepParseError::InvalidValue(other.to_string())),
        };

        Ok(Self {
            name: name.to_string(),
            action,
        })
    }
}
