use anyhow::{Context, Result};
use clap::Parser;
use inheritmap::cli::Cli;
use inheritmap::config::{load_config, load_config_from, InheritmapConfig};
use inheritmap::errors::Error;
use inheritmap::explorer::InheritanceExplorer;
use inheritmap::hierarchy::registry::split_root_path;
use inheritmap::hierarchy::{BuildOptions, ModuleLoader, TypeGraphProvider, TypeRegistry};
use inheritmap::io::write_output;
use inheritmap::observability::{init_logging, install_panic_hook, set_phase, Phase};
use inheritmap::similarity::SimilarityMethod;
use std::path::PathBuf;
use tracing::{info, warn};

fn main() -> Result<()> {
    install_panic_hook();
    let cli = Cli::parse();
    init_logging(cli.verbosity);

    let config = match &cli.config {
        Some(path) => load_config_from(path)?,
        None => load_config(),
    };

    let registry = load_registry(&cli, &config)?;
    let root = cli.module_class.as_str();
    check_root(&registry, root, cli.funcname.as_deref())?;

    let options = build_options(&cli, &config);
    let cutoff = cli.cutoff.unwrap_or(config.similarity.cutoff);
    let mut explorer = InheritanceExplorer::build(&registry, root, options)?.with_cutoff(cutoff);

    if cli.similarity {
        run_similarity(&mut explorer, config.similarity.method)?;
    }

    let format = cli.resolved_format();
    write_output(&explorer, &cli.output_file, format, &cli.output_options())
        .with_context(|| format!("Failed to write {}", cli.output_file.display()))?;
    info!(
        nodes = explorer.hierarchy().len(),
        output = %cli.output_file.display(),
        ?format,
        "wrote hierarchy"
    );
    Ok(())
}

fn run_similarity(explorer: &mut InheritanceExplorer, method: SimilarityMethod) -> Result<()> {
    if explorer.hierarchy().override_sources().is_empty() {
        warn!("no override sources to compare, skipping similarity");
        return Ok(());
    }
    explorer.check_source_similarity(method, None)?;
    if method == SimilarityMethod::Reference {
        // similarity edges come from the full matrix
        explorer.similarity_matrix()?;
    }
    Ok(())
}

fn load_registry(cli: &Cli, config: &InheritmapConfig) -> Result<TypeRegistry> {
    let _phase = set_phase(Phase::Loading);
    let (module, _) = split_root_path(&cli.module_class)?;

    let mut search_paths: Vec<PathBuf> = cli
        .search_paths
        .iter()
        .chain(&config.modules.search_paths)
        .cloned()
        .collect();
    if search_paths.is_empty() {
        search_paths.push(PathBuf::from("."));
    }
    let loader = ModuleLoader::new(search_paths);

    let mut registry = TypeRegistry::new();
    for name in cli.import_list.iter().map(String::as_str).chain([module]) {
        loader.load(&mut registry, name)?;
    }
    registry.validate()?;
    info!(
        types = registry.len(),
        modules = registry.modules().len(),
        "type registry loaded"
    );
    Ok(registry)
}

/// Fail before discovery when the root or the tracked operation is unknown
fn check_root(registry: &TypeRegistry, root: &str, funcname: Option<&str>) -> Result<()> {
    if !registry.contains(root) {
        return Err(Error::TypeNotFound(root.to_string()).into());
    }
    if let Some(op) = funcname {
        if registry.resolve_member(root, op).is_none() {
            return Err(Error::MemberNotFound {
                ty: root.to_string(),
                member: op.to_string(),
            }
            .into());
        }
    }
    Ok(())
}

fn build_options(cli: &Cli, config: &InheritmapConfig) -> BuildOptions {
    BuildOptions {
        tracked_op: cli.funcname.clone(),
        exclude: config
            .hierarchy
            .exclude
            .iter()
            .chain(&cli.exclude)
            .cloned()
            .collect(),
        max_depth: cli.max_depth.or(config.hierarchy.max_depth),
        colors: config.colors.clone(),
    }
}
