//! Explicit type registry built at startup.
//!
//! `TypeRegistry` is the shipped [`TypeGraphProvider`]. Types are registered
//! programmatically or loaded from manifests (TOML, JSON or YAML), one
//! manifest per module. Types are keyed by their qualified name
//! (`module.Name`) and children are reported in registration order.

use super::provider::{Provenance, ResolvedMember, TypeGraphProvider};
use crate::errors::{Error, Result};
use petgraph::algo::toposort;
use petgraph::graph::DiGraph;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// On-disk manifest formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestFormat {
    Toml,
    Json,
    Yaml,
}

impl ManifestFormat {
    pub const EXTENSIONS: [&'static str; 4] = ["toml", "json", "yaml", "yml"];

    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }
}

/// One module's worth of type declarations
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub module: Option<String>,
    #[serde(default)]
    pub types: Vec<TypeDecl>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TypeDecl {
    pub name: String,
    /// Bare name in the same module, or a dotted `module.Name`
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub members: BTreeMap<String, MemberDecl>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MemberDecl {
    /// Declaring unit; defaults to the module name
    #[serde(default)]
    pub unit: Option<String>,
    pub line: u32,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default = "default_invocable")]
    pub invocable: bool,
}

fn default_invocable() -> bool {
    true
}

/// A member declared directly on a type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberDef {
    pub provenance: Provenance,
    pub invocable: bool,
    pub source: Option<String>,
}

impl MemberDef {
    pub fn new(unit: impl Into<String>, line: u32) -> Self {
        Self {
            provenance: Provenance::new(unit, line),
            invocable: true,
            source: None,
        }
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn attribute(mut self) -> Self {
        self.invocable = false;
        self
    }
}

/// A registered type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDef {
    pub qualified_name: String,
    pub name: String,
    pub parent: Option<String>,
    pub members: BTreeMap<String, MemberDef>,
}

impl TypeDef {
    pub fn new(module: &str, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            qualified_name: qualify(module, &name),
            name,
            parent: None,
            members: BTreeMap::new(),
        }
    }

    /// Set the parent by qualified name
    pub fn parent(mut self, qualified: impl Into<String>) -> Self {
        self.parent = Some(qualified.into());
        self
    }

    pub fn member(mut self, name: impl Into<String>, member: MemberDef) -> Self {
        self.members.insert(name.into(), member);
        self
    }
}

fn qualify(module: &str, name: &str) -> String {
    if module.is_empty() {
        name.to_string()
    } else {
        format!("{module}.{name}")
    }
}

fn duplicate_type(qualified: &str) -> Error {
    Error::Registry(format!("type {qualified} registered twice"))
}

fn type_def_from_decl(module: &str, decl: TypeDecl) -> TypeDef {
    let mut def = TypeDef::new(module, decl.name);
    def.parent = decl.parent.map(|parent| {
        if parent.contains('.') {
            parent
        } else {
            qualify(module, &parent)
        }
    });
    for (name, member) in decl.members {
        let unit = member.unit.unwrap_or_else(|| module.to_string());
        def.members.insert(
            name,
            MemberDef {
                provenance: Provenance::new(unit, member.line),
                invocable: member.invocable,
                source: member.source,
            },
        );
    }
    def
}

pub fn parse_manifest(contents: &str, format: ManifestFormat) -> Result<Manifest> {
    Ok(match format {
        ManifestFormat::Toml => toml::from_str(contents)?,
        ManifestFormat::Json => serde_json::from_str(contents)?,
        ManifestFormat::Yaml => serde_yaml::from_str(contents)?,
    })
}

/// Read and parse a manifest file; every failure names the file
pub fn read_manifest(path: &Path) -> Result<Manifest> {
    let format = ManifestFormat::from_path(path)
        .ok_or_else(|| Error::manifest(path, "unsupported manifest extension"))?;
    let contents = fs::read_to_string(path).map_err(|e| Error::manifest(path, e))?;
    parse_manifest(&contents, format).map_err(|e| Error::manifest(path, e))
}

/// Split a dotted `module.Type` path into its module and type parts.
pub fn split_root_path(dotted: &str) -> Result<(&str, &str)> {
    match dotted.rsplit_once('.') {
        Some((module, ty)) if !module.is_empty() && !ty.is_empty() => Ok((module, ty)),
        _ => Err(Error::InvalidRootPath(dotted.to_string())),
    }
}

#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    types: HashMap<String, TypeDef>,
    children: HashMap<String, Vec<String>>,
    modules: Vec<String>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn get(&self, qualified: &str) -> Option<&TypeDef> {
        self.types.get(qualified)
    }

    /// Modules loaded so far, in load order
    pub fn modules(&self) -> &[String] {
        &self.modules
    }

    pub fn has_module(&self, module: &str) -> bool {
        self.modules.iter().any(|m| m == module)
    }

    /// Register one type. Parents may be registered later; call
    /// [`TypeRegistry::validate`] once everything is loaded.
    pub fn register(&mut self, def: TypeDef) -> Result<()> {
        if self.types.contains_key(&def.qualified_name) {
            return Err(duplicate_type(&def.qualified_name));
        }
        self.insert(def);
        Ok(())
    }

    fn insert(&mut self, def: TypeDef) {
        if let Some(parent) = &def.parent {
            self.children
                .entry(parent.clone())
                .or_default()
                .push(def.qualified_name.clone());
        }
        self.types.insert(def.qualified_name.clone(), def);
    }

    /// Register every type from a parsed manifest under `module`.
    ///
    /// The manifest's own `module` field wins over the argument. Either every
    /// type is registered or, on a duplicate name, none is.
    pub fn register_manifest(&mut self, manifest: Manifest, module: &str) -> Result<()> {
        let module = manifest.module.as_deref().unwrap_or(module).to_string();
        let defs: Vec<TypeDef> = manifest
            .types
            .into_iter()
            .map(|decl| type_def_from_decl(&module, decl))
            .collect();

        {
            let mut seen = HashSet::new();
            for def in &defs {
                let name = def.qualified_name.as_str();
                if self.types.contains_key(name) || !seen.insert(name) {
                    return Err(duplicate_type(name));
                }
            }
        }

        for def in defs {
            self.insert(def);
        }
        debug!(module = %module, types = self.types.len(), "registered manifest");
        self.modules.push(module);
        Ok(())
    }

    pub fn load_str(&mut self, contents: &str, format: ManifestFormat, module: &str) -> Result<()> {
        let manifest = parse_manifest(contents, format)?;
        self.register_manifest(manifest, module)
    }

    /// Load a manifest file; the module name defaults to the file stem
    pub fn load_manifest(&mut self, path: &Path) -> Result<()> {
        let module = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();
        self.load_manifest_as(path, &module)
    }

    pub fn load_manifest_as(&mut self, path: &Path, module: &str) -> Result<()> {
        let manifest = read_manifest(path)?;
        self.register_manifest(manifest, module)
            .map_err(|e| Error::manifest(path, e))
    }

    /// Check that every parent is registered and the parent graph is acyclic
    pub fn validate(&self) -> Result<()> {
        for def in self.types.values() {
            if let Some(parent) = &def.parent {
                if !self.types.contains_key(parent) {
                    return Err(Error::Registry(format!(
                        "unknown parent {} for {}",
                        parent, def.qualified_name
                    )));
                }
            }
        }

        let mut graph = DiGraph::<&str, ()>::new();
        let indices: HashMap<&str, _> = self
            .types
            .keys()
            .map(|name| (name.as_str(), graph.add_node(name.as_str())))
            .collect();
        for def in self.types.values() {
            if let Some(parent) = &def.parent {
                graph.add_edge(
                    indices[parent.as_str()],
                    indices[def.qualified_name.as_str()],
                    (),
                );
            }
        }
        toposort(&graph, None).map(|_| ()).map_err(|cycle| {
            Error::Registry(format!("inheritance cycle through {}", graph[cycle.node_id()]))
        })
    }
}

impl TypeGraphProvider for TypeRegistry {
    fn contains(&self, ty: &str) -> bool {
        self.types.contains_key(ty)
    }

    fn display_name(&self, ty: &str) -> String {
        self.types
            .get(ty)
            .map(|def| def.name.clone())
            .unwrap_or_else(|| ty.to_string())
    }

    fn direct_children_of(&self, ty: &str) -> Vec<String> {
        self.children
            .get(ty)
            .map(|children| {
                children
                    .iter()
                    .filter(|c| self.types.contains_key(c.as_str()))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    fn resolve_member(&self, ty: &str, member: &str) -> Option<ResolvedMember> {
        let mut current = self.types.get(ty);
        // bounded so an unvalidated cycle cannot spin forever
        for _ in 0..=self.types.len() {
            let def = current?;
            if let Some(found) = def.members.get(member) {
                return Some(ResolvedMember {
                    declaring_type: def.qualified_name.clone(),
                    provenance: found.provenance.clone(),
                    invocable: found.invocable,
                    source: found.source.clone(),
                });
            }
            current = def.parent.as_deref().and_then(|p| self.types.get(p));
        }
        None
    }
}

/// Resolves dotted module names to manifest files under search directories,
/// the way `a.b` maps to `a/b.toml`.
#[derive(Debug, Clone)]
pub struct ModuleLoader {
    search_paths: Vec<PathBuf>,
}

impl Default for ModuleLoader {
    fn default() -> Self {
        Self::new(vec![PathBuf::from(".")])
    }
}

impl ModuleLoader {
    pub fn new(search_paths: Vec<PathBuf>) -> Self {
        Self { search_paths }
    }

    pub fn locate(&self, module: &str) -> Result<PathBuf> {
        let relative: PathBuf = module.split('.').collect();
        let relative = relative.as_path();
        self.search_paths
            .iter()
            .flat_map(|dir| {
                ManifestFormat::EXTENSIONS
                    .iter()
                    .map(move |ext| dir.join(relative).with_extension(ext))
            })
            .find(|candidate| candidate.is_file())
            .ok_or_else(|| {
                Error::Configuration(format!(
                    "no manifest found for module {module} in {:?}",
                    self.search_paths
                ))
            })
    }

    /// Load `module` into the registry unless it is already there.
    ///
    /// A manifest may name its module itself; that name is the one checked
    /// against the registry.
    pub fn load(&self, registry: &mut TypeRegistry, module: &str) -> Result<()> {
        if registry.has_module(module) {
            return Ok(());
        }
        let path = self.locate(module)?;
        let manifest = read_manifest(&path)?;
        let effective = manifest.module.as_deref().unwrap_or(module);
        if registry.has_module(effective) {
            debug!(module, effective, "module already loaded");
            return Ok(());
        }
        debug!(module, path = %path.display(), "loading module manifest");
        registry
            .register_manifest(manifest, module)
            .map_err(|e| Error::manifest(&path, e))
    }
}
