use crate::io::{OutputFormat, OutputOptions};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "inheritmap")]
#[command(
    about = "Explore a type hierarchy and find overrides of one operation",
    long_about = None
)]
#[command(version)]
pub struct Cli {
    /// Root type as module.Type (the module part may itself be dotted)
    pub module_class: String,

    /// File the graph is written to; `-` writes to stdout
    pub output_file: PathBuf,

    /// Output format (dot, gv, json, txt); defaults to the output file extension
    #[arg(short = 'f', long = "output-format", value_parser = parse_format)]
    pub output_format: Option<OutputFormat>,

    /// Additional modules to load before exploring
    #[arg(short = 'i', long = "import-list", value_delimiter = ',')]
    pub import_list: Vec<String>,

    /// Operation whose overrides are tracked
    #[arg(long)]
    pub funcname: Option<String>,

    /// Directory searched for module manifests (repeatable)
    #[arg(short = 's', long = "search-path")]
    pub search_paths: Vec<PathBuf>,

    /// Type names left out of the hierarchy, with their subtrees
    #[arg(long, value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// Deepest level whose children are still explored
    #[arg(long = "max-depth")]
    pub max_depth: Option<usize>,

    /// Compare override sources and draw similarity edges (requires --funcname)
    #[arg(long, requires = "funcname")]
    pub similarity: bool,

    /// Similarity cutoff for clustering, in [0, 1]
    #[arg(long, value_parser = parse_cutoff)]
    pub cutoff: Option<f64>,

    /// Show 1/0 against the cutoff in text similarity tables
    #[arg(long = "above-cutoff")]
    pub above_cutoff: bool,

    /// Graphviz graph attribute as KEY=VALUE (repeatable)
    #[arg(long = "graph-attr", value_parser = parse_key_value)]
    pub graph_attrs: Vec<(String, String)>,

    /// Configuration file (defaults to the nearest .inheritmap.toml)
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Increase verbosity level (can be repeated: -v, -vv, -vvv)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbosity: u8,
}

impl Cli {
    pub fn resolved_format(&self) -> OutputFormat {
        OutputFormat::resolve(self.output_format, &self.output_file)
    }

    pub fn output_options(&self) -> OutputOptions {
        OutputOptions {
            graph_attrs: self.graph_attrs.clone(),
            above_cutoff: self.above_cutoff,
        }
    }
}

fn parse_format(s: &str) -> Result<OutputFormat, String> {
    s.parse().map_err(|e: crate::errors::Error| e.to_string())
}

fn parse_cutoff(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|e| format!("{e}"))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("cutoff must be within [0, 1], found {value}"))
    }
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, found '{s}'")),
    }
}
