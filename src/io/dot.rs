//! Graphviz rendering of an explored hierarchy.
//!
//! Inheritance edges point from child to parent. Similarity edges are dashed
//! and carry no direction.

use super::output::OutputWriter;
use crate::explorer::InheritanceExplorer;
use crate::observability::{set_phase, Phase};
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GraphType {
    #[default]
    Directed,
    Undirected,
}

impl GraphType {
    fn keyword(self) -> &'static str {
        match self {
            Self::Directed => "digraph",
            Self::Undirected => "graph",
        }
    }

    fn edge_op(self) -> &'static str {
        match self {
            Self::Directed => "->",
            Self::Undirected => "--",
        }
    }
}

pub struct DotWriter<W: Write> {
    writer: W,
    graph_type: GraphType,
    graph_attrs: Vec<(String, String)>,
}

impl<W: Write> DotWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            graph_type: GraphType::default(),
            graph_attrs: Vec::new(),
        }
    }

    pub fn graph_type(mut self, graph_type: GraphType) -> Self {
        self.graph_type = graph_type;
        self
    }

    /// Graph-level attribute. Keys are written as given, values quoted.
    pub fn set_graph_attr(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> &mut Self {
        self.graph_attrs.push((key.into(), value.into()));
        self
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_nodes(&mut self, explorer: &InheritanceExplorer) -> anyhow::Result<()> {
        for node in explorer.hierarchy().nodes() {
            writeln!(
                self.writer,
                "    {} [label=\"{}\", color=\"{}\", fontcolor=\"{}\"];",
                node.id,
                escape(&node.name),
                node.color,
                node.color
            )?;
        }
        Ok(())
    }

    fn write_edges(&mut self, explorer: &InheritanceExplorer) -> anyhow::Result<()> {
        let op = self.graph_type.edge_op();
        for node in explorer.hierarchy().nodes() {
            if let Some(parent) = node.parent_id {
                writeln!(self.writer, "    {} {op} {};", node.id, parent)?;
            }
        }
        for (a, b) in explorer.similarity_edges() {
            writeln!(
                self.writer,
                "    {a} {op} {b} [style=dashed, dir=none, constraint=false];"
            )?;
        }
        Ok(())
    }
}

impl<W: Write> OutputWriter for DotWriter<W> {
    fn write_explorer(&mut self, explorer: &InheritanceExplorer) -> anyhow::Result<()> {
        let _phase = set_phase(Phase::Rendering);
        writeln!(
            self.writer,
            "{} \"{}\" {{",
            self.graph_type.keyword(),
            escape(explorer.hierarchy().root())
        )?;
        for (key, value) in &self.graph_attrs {
            writeln!(self.writer, "    {key}=\"{}\";", escape(value))?;
        }
        self.write_nodes(explorer)?;
        self.write_edges(explorer)?;
        writeln!(self.writer, "}}")?;
        Ok(())
    }
}

fn escape(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}
