pub mod dot;
pub mod json;
pub mod output;
pub mod terminal;

pub use dot::{DotWriter, GraphType};
pub use json::{GraphDocument, JsonWriter};
pub use output::{OutputFormat, OutputWriter};
pub use terminal::{SimilarityTable, TextWriter};

use crate::explorer::InheritanceExplorer;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, IsTerminal, Write};
use std::path::Path;

/// Output path meaning standard output
pub const STDOUT_PATH: &str = "-";

#[derive(Debug, Clone, Default)]
pub struct OutputOptions {
    /// Graph-level attributes, DOT only
    pub graph_attrs: Vec<(String, String)>,
    /// Text tables show 1/0 against the cutoff instead of fractions
    pub above_cutoff: bool,
}

/// Render `explorer` into `path`, or to stdout when `path` is `-`.
///
/// Text output is colored only when stdout is a terminal.
pub fn write_output(
    explorer: &InheritanceExplorer,
    path: &Path,
    format: OutputFormat,
    options: &OutputOptions,
) -> Result<()> {
    if path == Path::new(STDOUT_PATH) {
        let stdout = std::io::stdout();
        let styled = stdout.is_terminal();
        return render(explorer, stdout.lock(), format, options, styled);
    }
    let file = File::create(path)
        .with_context(|| format!("Failed to create output file {}", path.display()))?;
    render(explorer, BufWriter::new(file), format, options, false)
}

fn render<W: Write>(
    explorer: &InheritanceExplorer,
    mut out: W,
    format: OutputFormat,
    options: &OutputOptions,
    styled: bool,
) -> Result<()> {
    match format {
        OutputFormat::Dot => {
            let mut writer = DotWriter::new(&mut out);
            for (key, value) in &options.graph_attrs {
                writer.set_graph_attr(key, value);
            }
            writer.write_explorer(explorer)?
        }
        OutputFormat::Json => JsonWriter::new(&mut out).write_explorer(explorer)?,
        OutputFormat::Text => TextWriter::new(&mut out)
            .styled(styled)
            .binarize(options.above_cutoff)
            .write_explorer(explorer)?,
    }
    out.flush()?;
    Ok(())
}
