// SPDX-License-Identifier: MIT OR Apache-2.0
//! Persisted graph description: the components and name map documents.

use crate::graph::{Graph, GraphError};
use std::path::{Path, PathBuf};

/// The two JSON documents a compiled graph is stored as
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphDescription {
    /// Component ID to component record
    pub components_json: String,
    /// Friendly name to component ID
    pub names_json: String,
}

impl GraphDescription {
    /// Wrap already loaded documents
    pub fn new(components_json: impl Into<String>, names_json: impl Into<String>) -> Self {
        Self {
            components_json: components_json.into(),
            names_json: names_json.into(),
        }
    }

    /// Encode a graph
    pub fn from_graph(graph: &Graph) -> Result<Self, GraphError> {
        let (components_json, names_json) = graph.to_documents()?;
        Ok(Self { components_json, names_json })
    }

    /// Decode into a graph
    pub fn parse(&self) -> Result<Graph, GraphError> {
        Graph::load(&self.components_json, &self.names_json)
    }

    /// Path of the components document for `stem` in `dir`
    pub fn components_path(dir: &Path, stem: &str) -> PathBuf {
        dir.join(format!("{stem} components.json"))
    }

    /// Path of the name map document for `stem` in `dir`
    pub fn names_path(dir: &Path, stem: &str) -> PathBuf {
        dir.join(format!("{stem} names.json"))
    }

    /// Read `"<stem> components.json"` and `"<stem> names.json"` from `dir`
    pub fn from_stem(dir: &Path, stem: &str) -> Result<Self, GraphError> {
        Ok(Self {
            components_json: read(&Self::components_path(dir, stem))?,
            names_json: read(&Self::names_path(dir, stem))?,
        })
    }

    /// Write both documents into `dir` under `stem`
    pub fn write_to(&self, dir: &Path, stem: &str) -> Result<(), GraphError> {
        write(&Self::components_path(dir, stem), &self.components_json)?;
        write(&Self::names_path(dir, stem), &self.names_json)?;
        tracing::info!("Saved graph {:?} to {:?}", stem, dir);
        Ok(())
    }
}

fn read(path: &Path) -> Result<String, GraphError> {
    std::fs::read_to_string(path).map_err(|source| GraphError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write(path: &Path, contents: &str) -> Result<(), GraphError> {
    std::fs::write(path, contents).map_err(|source| GraphError::Io {
        path: path.to_path_buf(),
        source,
    })
}
