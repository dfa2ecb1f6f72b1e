//! Depth-first discovery of a type hierarchy with override detection.

use super::node::{Node, NodeColors};
use super::provider::{ResolvedMember, TypeGraphProvider};
use super::{ClassHierarchy, OverrideSource};
use crate::errors::{Error, Result};
use crate::observability::{
    increment_discovered, reset_discovered, set_current_type, set_phase, Phase,
};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info, info_span, warn};

/// Options controlling a single discovery pass
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Operation whose overrides are tracked; `None` disables detection
    pub tracked_op: Option<String>,
    /// Type names (bare or qualified) skipped together with their subtrees
    pub exclude: Vec<String>,
    /// Deepest generation to visit below the root's children; `Some(0)`
    /// keeps only the root and its direct children
    pub max_depth: Option<usize>,
    pub colors: NodeColors,
}

impl BuildOptions {
    pub fn tracking(op: impl Into<String>) -> Self {
        Self {
            tracked_op: Some(op.into()),
            ..Self::default()
        }
    }

    pub fn exclude<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn colors(mut self, colors: NodeColors) -> Self {
        self.colors = colors;
        self
    }
}

/// Walks a provider from a root type. One builder performs one pass.
pub struct HierarchyBuilder<'p, P: TypeGraphProvider + ?Sized> {
    provider: &'p P,
    options: BuildOptions,
    excluded: HashSet<String>,
    nodes: Vec<Node>,
    overrides: BTreeMap<usize, OverrideSource>,
}

impl<'p, P: TypeGraphProvider + ?Sized> HierarchyBuilder<'p, P> {
    pub fn new(provider: &'p P, options: BuildOptions) -> Self {
        let excluded = options.exclude.iter().cloned().collect();
        Self {
            provider,
            options,
            excluded,
            nodes: Vec::new(),
            overrides: BTreeMap::new(),
        }
    }

    pub fn build(mut self, root: &str) -> Result<ClassHierarchy> {
        let _phase = set_phase(Phase::Discovery);
        reset_discovered();
        let span = info_span!("discover", root = %root);
        let _enter = span.enter();

        if !self.provider.contains(root) {
            return Err(Error::TypeNotFound(root.to_string()));
        }

        let root_member = self.register_root(root)?;
        self.visit(root, 1, root_member.as_ref(), 0);

        info!(
            nodes = self.nodes.len(),
            overrides = self.overrides.len(),
            "hierarchy discovered"
        );
        Ok(ClassHierarchy::new(
            root.to_string(),
            self.options.tracked_op,
            self.nodes,
            self.overrides,
        ))
    }

    fn register_root(&mut self, root: &str) -> Result<Option<ResolvedMember>> {
        let name = self.provider.display_name(root);
        let member = match &self.options.tracked_op {
            Some(op) => Some(self.provider.resolve_member(root, op).ok_or_else(|| {
                Error::MemberNotFound {
                    ty: name.clone(),
                    member: op.clone(),
                }
            })?),
            None => None,
        };

        // the root overrides only when it declares the operation itself
        let declared = member
            .as_ref()
            .filter(|m| m.invocable && m.declaring_type == root);
        let overrides = declared.is_some();

        if let Some(member) = declared {
            let source = member.source.clone().ok_or_else(|| Error::SourceUnavailable {
                name: name.clone(),
                op: self.options.tracked_op.clone().unwrap_or_default(),
            })?;
            self.overrides.insert(
                1,
                OverrideSource {
                    provenance: member.provenance.clone(),
                    source: Some(source),
                },
            );
        }

        self.push_node(name, root.to_string(), None, 0, overrides);
        Ok(member)
    }

    fn visit(
        &mut self,
        parent: &str,
        parent_id: usize,
        parent_member: Option<&ResolvedMember>,
        parent_depth: usize,
    ) {
        let depth = parent_depth + 1;
        for child in self.provider.direct_children_of(parent) {
            let name = self.provider.display_name(&child);
            if self.excluded.contains(&name) || self.excluded.contains(&child) {
                debug!(ty = %child, "excluded");
                continue;
            }
            let _current = set_current_type(child.as_str());

            let member = self
                .options
                .tracked_op
                .as_deref()
                .and_then(|op| self.provider.resolve_member(&child, op));
            let overrides = member
                .as_ref()
                .is_some_and(|m| overrides_parent(m, parent_member));

            let id = self.push_node(name, child.clone(), Some(parent_id), depth, overrides);
            if let Some(member) = member.as_ref().filter(|_| overrides) {
                if member.source.is_none() {
                    warn!(ty = %child, "override detected, source unavailable");
                }
                self.overrides.insert(
                    id,
                    OverrideSource {
                        provenance: member.provenance.clone(),
                        source: member.source.clone(),
                    },
                );
            }

            if self.options.max_depth.map_or(true, |max| depth <= max) {
                self.visit(&child, id, member.as_ref(), depth);
            }
        }
    }

    fn push_node(
        &mut self,
        name: String,
        qualified_name: String,
        parent_id: Option<usize>,
        depth: usize,
        overrides: bool,
    ) -> usize {
        let id = self.nodes.len() + 1;
        self.nodes.push(Node {
            id,
            name,
            qualified_name,
            parent_id,
            depth,
            overrides_tracked_op: overrides,
            color: self.options.colors.pick(overrides),
        });
        increment_discovered();
        id
    }
}

/// A child overrides when its resolved implementation is declared somewhere
/// other than the parent's resolved implementation.
fn overrides_parent(child: &ResolvedMember, parent: Option<&ResolvedMember>) -> bool {
    if !child.invocable {
        return false;
    }
    match parent {
        Some(parent) if parent.invocable => parent.provenance != child.provenance,
        _ => true,
    }
}

/// Build a hierarchy from `root` in one call
pub fn build_hierarchy<P: TypeGraphProvider + ?Sized>(
    provider: &P,
    root: &str,
    options: BuildOptions,
) -> Result<ClassHierarchy> {
    HierarchyBuilder::new(provider, options).build(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::provider::Provenance;
    use crate::hierarchy::registry::{MemberDef, TypeDef, TypeRegistry};
    use pretty_assertions::assert_eq;

    fn registry() -> TypeRegistry {
        let mut r = TypeRegistry::new();
        r.register(
            TypeDef::new("m", "Base")
                .member("run", MemberDef::new("base.py", 1).source("def run(self):\n    pass"))
                .member("label", MemberDef::new("base.py", 9).attribute()),
        )
        .unwrap();
        r.register(TypeDef::new("m", "Inherits").parent("m.Base")).unwrap();
        r.register(
            TypeDef::new("m", "Overrides")
                .parent("m.Base")
                .member("run", MemberDef::new("over.py", 4).source("def run(self):\n    return 1")),
        )
        .unwrap();
        r.register(
            TypeDef::new("m", "NoSource")
                .parent("m.Overrides")
                .member("run", MemberDef::new("compiled", 0)),
        )
        .unwrap();
        r
    }

    #[test]
    fn preorder_ids_and_parents() {
        let h = build_hierarchy(&registry(), "m.Base", BuildOptions::default()).unwrap();
        let summary: Vec<_> = h
            .nodes()
            .iter()
            .map(|n| (n.id, n.name.as_str(), n.parent_id, n.depth))
            .collect();
        assert_eq!(
            summary,
            vec![
                (1, "Base", None, 0),
                (2, "Inherits", Some(1), 1),
                (3, "Overrides", Some(1), 1),
                (4, "NoSource", Some(3), 2),
            ]
        );
        assert!(h.overrides().is_empty());
    }

    #[test]
    fn provenance_decides_overrides() {
        let h = build_hierarchy(&registry(), "m.Base", BuildOptions::tracking("run")).unwrap();
        let flags: Vec<_> = h.nodes().iter().map(|n| n.overrides_tracked_op).collect();
        assert_eq!(flags, vec![true, false, true, true]);
        assert_eq!(h.overrides().keys().copied().collect::<Vec<_>>(), vec![1, 3, 4]);
        assert_eq!(h.overrides()[&3].provenance, Provenance::new("over.py", 4));
        // override without source is kept, not fatal
        assert!(h.overrides()[&4].source.is_none());
        assert_eq!(h.nodes()[0].color.as_str(), "#ff0000");
        assert_eq!(h.nodes()[1].color.as_str(), "#000000");
    }

    #[test]
    fn inherited_root_member_is_not_an_override() {
        let h = build_hierarchy(&registry(), "m.Inherits", BuildOptions::tracking("run")).unwrap();
        assert_eq!(h.len(), 1);
        assert!(!h.nodes()[0].overrides_tracked_op);
        assert!(h.overrides().is_empty());
    }

    #[test]
    fn attributes_never_override() {
        let h = build_hierarchy(&registry(), "m.Base", BuildOptions::tracking("label")).unwrap();
        assert!(h.nodes().iter().all(|n| !n.overrides_tracked_op));
    }

    #[test]
    fn root_errors_are_fatal() {
        let r = registry();
        assert!(matches!(
            build_hierarchy(&r, "m.Missing", BuildOptions::default()),
            Err(Error::TypeNotFound(_))
        ));
        let err = build_hierarchy(&r, "m.Base", BuildOptions::tracking("nope")).unwrap_err();
        assert_eq!(err.to_string(), "nope is not an attribute of Base");
        assert!(matches!(
            build_hierarchy(&r, "m.NoSource", BuildOptions::tracking("run")),
            Err(Error::SourceUnavailable { .. })
        ));
    }

    #[test]
    fn exclusion_drops_subtrees() {
        let options = BuildOptions::tracking("run").exclude(["Overrides"]);
        let h = build_hierarchy(&registry(), "m.Base", options).unwrap();
        let names: Vec<_> = h.nodes().iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["Base", "Inherits"]);

        let options = BuildOptions::default().exclude(["m.Inherits"]);
        let h = build_hierarchy(&registry(), "m.Base", options).unwrap();
        assert_eq!(h.len(), 3);
    }

    #[test]
    fn depth_limit_truncates() {
        let r = registry();
        let h = build_hierarchy(&r, "m.Base", BuildOptions::default().max_depth(0)).unwrap();
        assert_eq!(h.len(), 3);
        let h = build_hierarchy(&r, "m.Base", BuildOptions::default().max_depth(1)).unwrap();
        assert_eq!(h.len(), 4);
    }

    #[test]
    fn discovered_count_covers_the_latest_build_only() {
        use crate::observability::discovered_count;

        let r = registry();
        build_hierarchy(&r, "m.Base", BuildOptions::default()).unwrap();
        assert_eq!(discovered_count(), 4);
        let h = build_hierarchy(&r, "m.Overrides", BuildOptions::default()).unwrap();
        assert_eq!(h.len(), 2);
        assert_eq!(discovered_count(), 2);
    }

    #[test]
    fn child_without_parent_resolution_overrides() {
        let child = ResolvedMember {
            declaring_type: "m.C".into(),
            provenance: Provenance::new("c.py", 1),
            invocable: true,
            source: None,
        };
        assert!(overrides_parent(&child, None));
        let same = ResolvedMember {
            declaring_type: "m.P".into(),
            ..child.clone()
        };
        assert!(!overrides_parent(&child, Some(&same)));
    }
}
