//! Hierarchy discovery and override detection.
//!
//! A [`ClassHierarchy`] is the immutable result of one discovery pass: the
//! node list in pre-order, a name/id index and the override-source map.
//! Lookups accept either an id or a name through [`NodeKey`].

pub mod builder;
pub mod node;
pub mod provider;
pub mod registry;

pub use builder::{build_hierarchy, BuildOptions, HierarchyBuilder};
pub use node::{Color, Node, NodeColors};
pub use provider::{Provenance, ResolvedMember, TypeGraphProvider};
pub use registry::{ModuleLoader, TypeDef, TypeRegistry};

pub use crate::errors::NodeKey;
use crate::errors::{Error, Result};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::warn;

/// Source text and declaring location of one override.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverrideSource {
    pub provenance: Provenance,
    /// `None` when the override was detected but no source was available
    pub source: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ClassHierarchy {
    root: String,
    tracked_op: Option<String>,
    nodes: Vec<Node>,
    name_index: HashMap<String, usize>,
    overrides: BTreeMap<usize, OverrideSource>,
}

impl ClassHierarchy {
    pub(crate) fn new(
        root: String,
        tracked_op: Option<String>,
        nodes: Vec<Node>,
        overrides: BTreeMap<usize, OverrideSource>,
    ) -> Self {
        let mut name_index = HashMap::with_capacity(nodes.len() * 2);
        for node in &nodes {
            name_index.entry(node.qualified_name.clone()).or_insert(node.id);
            if let Some(&existing) = name_index.get(&node.name) {
                if existing != node.id {
                    warn!(
                        name = %node.name,
                        kept = existing,
                        ignored = node.id,
                        "duplicate type name, lookups by name use the first"
                    );
                }
                continue;
            }
            name_index.insert(node.name.clone(), node.id);
        }
        Self {
            root,
            tracked_op,
            nodes,
            name_index,
            overrides,
        }
    }

    /// Qualified name of the root type
    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn tracked_op(&self) -> Option<&str> {
        self.tracked_op.as_deref()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: usize) -> Option<&Node> {
        id.checked_sub(1).and_then(|index| self.nodes.get(index))
    }

    /// Resolve a node by id or name
    pub fn node(&self, key: impl Into<NodeKey>) -> Result<&Node> {
        let key = key.into();
        let found = match &key {
            NodeKey::Id(id) => self.get(*id),
            NodeKey::Name(name) => self.name_index.get(name).and_then(|&id| self.get(id)),
        };
        found.ok_or(Error::NodeNotFound { key })
    }

    pub fn node_id(&self, key: impl Into<NodeKey>) -> Result<usize> {
        self.node(key).map(|n| n.id)
    }

    pub fn node_name(&self, id: usize) -> Result<&str> {
        self.node(id).map(|n| n.name.as_str())
    }

    pub fn depth_of(&self, id: usize) -> Option<usize> {
        self.get(id).map(|n| n.depth)
    }

    /// Nodes in discovery order
    pub fn iter(&self) -> std::slice::Iter<'_, Node> {
        self.nodes.iter()
    }

    pub fn parent_of(&self, id: usize) -> Option<&Node> {
        self.get(id)?.parent_id.and_then(|pid| self.get(pid))
    }

    pub fn children_of(&self, id: usize) -> Vec<&Node> {
        self.nodes
            .iter()
            .filter(|n| n.parent_id == Some(id))
            .collect()
    }

    /// Full override map, including overrides without source
    pub fn overrides(&self) -> &BTreeMap<usize, OverrideSource> {
        &self.overrides
    }

    /// Override sources ready for comparison, in discovery order
    pub fn override_sources(&self) -> BTreeMap<usize, String> {
        self.overrides
            .iter()
            .filter_map(|(&id, o)| o.source.clone().map(|src| (id, src)))
            .collect()
    }

    /// Source of the tracked operation on the given node.
    ///
    /// Distinguishes an unknown key ([`Error::NodeNotFound`]) from a node that
    /// keeps the inherited implementation ([`Error::NotOverridden`]).
    pub fn source_code(&self, key: impl Into<NodeKey>) -> Result<&str> {
        let op = self.tracked_op.as_deref().ok_or(Error::TrackingDisabled)?;
        let node = self.node(key)?;
        let entry = self
            .overrides
            .get(&node.id)
            .ok_or_else(|| Error::NotOverridden {
                name: node.name.clone(),
                op: op.to_string(),
            })?;
        entry
            .source
            .as_deref()
            .ok_or_else(|| Error::SourceUnavailable {
                name: node.name.clone(),
                op: op.to_string(),
            })
    }

    /// Sources for several nodes keyed by node name; the first failure wins
    pub fn multiple_source_code<K, I>(&self, keys: I) -> Result<BTreeMap<String, String>>
    where
        K: Into<NodeKey>,
        I: IntoIterator<Item = K>,
    {
        keys.into_iter()
            .map(|key| {
                let key = key.into();
                let name = self.node(key.clone())?.name.clone();
                self.source_code(key).map(|src| (name, src.to_string()))
            })
            .collect()
    }

    /// The implementation a node actually runs: its own override or the
    /// nearest overriding ancestor's. `None` if nothing up the chain has
    /// source.
    pub fn closest_source(&self, key: impl Into<NodeKey>) -> Result<Option<(usize, &str)>> {
        if self.tracked_op.is_none() {
            return Err(Error::TrackingDisabled);
        }
        let mut current = Some(self.node(key)?);
        while let Some(node) = current {
            if let Some(src) = self.overrides.get(&node.id).and_then(|o| o.source.as_deref()) {
                return Ok(Some((node.id, src)));
            }
            current = node.parent_id.and_then(|pid| self.get(pid));
        }
        Ok(None)
    }
}
