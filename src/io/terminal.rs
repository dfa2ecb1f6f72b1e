use super::output::OutputWriter;
use crate::explorer::InheritanceExplorer;
use crate::hierarchy::ClassHierarchy;
use crate::observability::{set_phase, Phase};
use crate::similarity::{ReferenceComparison, SimilarityMatrix};
use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, Color as CellColor, ContentArrangement, Table};
use std::io::Write;

/// Labelled similarity matrix rendered as a table.
pub struct SimilarityTable<'a> {
    labels: Vec<String>,
    matrix: &'a SimilarityMatrix,
    cutoff: Option<f64>,
    highlight: Option<f64>,
    styled: bool,
}

impl<'a> SimilarityTable<'a> {
    pub fn new(labels: Vec<String>, matrix: &'a SimilarityMatrix) -> Self {
        Self {
            labels,
            matrix,
            cutoff: None,
            highlight: None,
            styled: false,
        }
    }

    /// Show 1/0 for values at or above `cutoff` instead of fractions
    pub fn above_cutoff(mut self, cutoff: f64) -> Self {
        self.cutoff = Some(cutoff);
        self
    }

    /// Color values at or above `cutoff`
    pub fn highlight(mut self, cutoff: f64) -> Self {
        self.highlight = Some(cutoff);
        self
    }

    pub fn styled(mut self, styled: bool) -> Self {
        self.styled = styled;
        self
    }

    pub fn render(&self) -> String {
        let binarized;
        let matrix = match self.cutoff {
            Some(cutoff) => {
                binarized = self.matrix.above_cutoff(cutoff);
                &binarized
            }
            None => self.matrix,
        };

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);
        if self.styled {
            table.enforce_styling();
        } else {
            table.force_no_tty();
        }

        let mut header = vec![Cell::new("")];
        header.extend(self.labels.iter().map(Cell::new));
        table.set_header(header);

        for (label, row) in self.labels.iter().zip(matrix.rows()) {
            let mut cells = vec![Cell::new(label)];
            cells.extend(row.iter().map(|&value| self.value_cell(value)));
            table.add_row(cells);
        }
        table.to_string()
    }

    fn value_cell(&self, value: f64) -> Cell {
        let text = if self.cutoff.is_some() {
            format!("{value:.0}")
        } else {
            format!("{value:.2}")
        };
        let cell = Cell::new(text).set_alignment(CellAlignment::Right);
        match self.highlight {
            Some(cutoff) if value >= cutoff => cell.fg(CellColor::Green),
            _ => cell,
        }
    }
}

/// Plain-text report: indented tree, then similarity results.
pub struct TextWriter<W: Write> {
    writer: W,
    styled: bool,
    binarize: bool,
}

impl<W: Write> TextWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            styled: false,
            binarize: false,
        }
    }

    /// Emit ANSI colors; leave off when writing to files
    pub fn styled(mut self, styled: bool) -> Self {
        self.styled = styled;
        self
    }

    pub fn binarize(mut self, binarize: bool) -> Self {
        self.binarize = binarize;
        self
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn paint(&self, text: &str, overrides: bool) -> String {
        match (self.styled, overrides) {
            (true, true) => text.red().bold().to_string(),
            (true, false) => text.normal().to_string(),
            (false, _) => text.to_string(),
        }
    }

    fn write_tree(&mut self, hierarchy: &ClassHierarchy) -> anyhow::Result<()> {
        match hierarchy.tracked_op() {
            Some(op) => writeln!(self.writer, "{} (tracking {op})", hierarchy.root())?,
            None => writeln!(self.writer, "{}", hierarchy.root())?,
        }
        for node in hierarchy.nodes() {
            let indent = "  ".repeat(node.depth);
            let name = self.paint(&node.name, node.overrides_tracked_op);
            match hierarchy.overrides().get(&node.id) {
                Some(o) => writeln!(
                    self.writer,
                    "{indent}{:>3} {name}  [overrides at {}]",
                    node.id, o.provenance
                )?,
                None => writeln!(self.writer, "{indent}{:>3} {name}", node.id)?,
            }
        }
        Ok(())
    }

    fn write_reference(
        &mut self,
        hierarchy: &ClassHierarchy,
        comparison: &ReferenceComparison,
    ) -> anyhow::Result<()> {
        let reference = hierarchy
            .get(comparison.reference)
            .map_or("?", |n| n.name.as_str());
        writeln!(self.writer, "Similarity to {reference}:")?;
        for (id, score) in &comparison.scores {
            let name = hierarchy.get(*id).map_or("?", |n| n.name.as_str());
            writeln!(
                self.writer,
                "  {name:<24} {:.2} ({}/{})",
                score.fraction, score.overlap_count, score.total_count
            )?;
        }
        Ok(())
    }

    fn write_matrix(&mut self, explorer: &InheritanceExplorer) -> anyhow::Result<()> {
        let Some(matrix) = explorer.matrix() else {
            return Ok(());
        };
        let cutoff = explorer.cutoff();
        let mut table = SimilarityTable::new(explorer.similarity_labels(), matrix)
            .highlight(cutoff)
            .styled(self.styled);
        if self.binarize {
            table = table.above_cutoff(cutoff);
        }
        writeln!(self.writer, "Similarity matrix (cutoff {cutoff:.2}):")?;
        writeln!(self.writer, "{}", table.render())?;

        let hierarchy = explorer.hierarchy();
        let clusters = explorer.clusters();
        if clusters.is_empty() {
            writeln!(self.writer, "No overrides at or above the cutoff.")?;
        }
        for (id, similar) in clusters.iter() {
            let names: Vec<&str> = similar
                .iter()
                .filter_map(|other| hierarchy.get(*other).map(|n| n.name.as_str()))
                .collect();
            let name = hierarchy.get(*id).map_or("?", |n| n.name.as_str());
            writeln!(self.writer, "  {name}: {}", names.join(", "))?;
        }
        Ok(())
    }
}

impl<W: Write> OutputWriter for TextWriter<W> {
    fn write_explorer(&mut self, explorer: &InheritanceExplorer) -> anyhow::Result<()> {
        let _phase = set_phase(Phase::Rendering);
        self.write_tree(explorer.hierarchy())?;
        if let Some(comparison) = explorer.similarity_report().and_then(|r| r.reference()) {
            writeln!(self.writer)?;
            self.write_reference(explorer.hierarchy(), comparison)?;
        }
        if explorer.matrix().is_some() {
            writeln!(self.writer)?;
            self.write_matrix(explorer)?;
        }
        Ok(())
    }
}
