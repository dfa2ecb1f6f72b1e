use super::output::OutputWriter;
use crate::explorer::InheritanceExplorer;
use crate::hierarchy::{Color, Provenance};
use crate::observability::{set_phase, Phase};
use crate::similarity::SimilarityReport;
use serde::Serialize;
use std::io::Write;

/// Graph data for interactive front ends.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphDocument {
    pub root: String,
    pub tracked_op: Option<String>,
    pub cutoff: f64,
    pub nodes: Vec<GraphNode>,
    /// Child → parent
    pub inheritance_edges: Vec<InheritanceEdge>,
    pub similarity_edges: Vec<SimilarityEdge>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity: Option<SimilarityReport>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphNode {
    pub id: usize,
    pub name: String,
    pub qualified_name: String,
    pub parent_id: Option<usize>,
    pub depth: usize,
    pub overrides: bool,
    pub color: Color,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provenance: Option<Provenance>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InheritanceEdge {
    pub child: usize,
    pub parent: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SimilarityEdge {
    pub a: usize,
    pub b: usize,
    pub value: f64,
}

impl GraphDocument {
    pub fn from_explorer(explorer: &InheritanceExplorer) -> Self {
        let hierarchy = explorer.hierarchy();
        let overrides = hierarchy.overrides();

        let nodes = hierarchy
            .nodes()
            .iter()
            .map(|node| GraphNode {
                id: node.id,
                name: node.name.clone(),
                qualified_name: node.qualified_name.clone(),
                parent_id: node.parent_id,
                depth: node.depth,
                overrides: node.overrides_tracked_op,
                color: node.color.clone(),
                provenance: overrides.get(&node.id).map(|o| o.provenance.clone()),
            })
            .collect();

        let inheritance_edges = hierarchy
            .nodes()
            .iter()
            .filter_map(|node| {
                node.parent_id.map(|parent| InheritanceEdge {
                    child: node.id,
                    parent,
                })
            })
            .collect();

        let similarity_edges = explorer
            .matrix()
            .map(|matrix| {
                explorer
                    .similarity_edges()
                    .into_iter()
                    .filter_map(|(a, b)| {
                        matrix.value(a, b).map(|value| SimilarityEdge { a, b, value })
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            root: hierarchy.root().to_string(),
            tracked_op: hierarchy.tracked_op().map(str::to_string),
            cutoff: explorer.cutoff(),
            nodes,
            inheritance_edges,
            similarity_edges,
            similarity: explorer.similarity_report().cloned(),
        }
    }
}

pub struct JsonWriter<W: Write> {
    writer: W,
}

impl<W: Write> JsonWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> OutputWriter for JsonWriter<W> {
    fn write_explorer(&mut self, explorer: &InheritanceExplorer) -> anyhow::Result<()> {
        let _phase = set_phase(Phase::Rendering);
        let document = GraphDocument::from_explorer(explorer);
        let json = serde_json::to_string_pretty(&document)?;
        self.writer.write_all(json.as_bytes())?;
        writeln!(self.writer)?;
        Ok(())
    }
}
