//! Combined result consumed by renderers: the hierarchy, its similarity
//! matrix and the derived clusters.

use crate::errors::{Error, Result};
use crate::hierarchy::{build_hierarchy, BuildOptions, ClassHierarchy, TypeGraphProvider};
use crate::similarity::{
    ClusterSet, SimilarityEngine, SimilarityMatrix, SimilarityMethod, SimilarityReport,
    StructuralDiff, DEFAULT_CUTOFF,
};
use std::collections::BTreeMap;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct InheritanceExplorer {
    hierarchy: ClassHierarchy,
    cutoff: f64,
    report: Option<SimilarityReport>,
    matrix: Option<SimilarityMatrix>,
}

impl InheritanceExplorer {
    pub fn new(hierarchy: ClassHierarchy) -> Self {
        Self {
            hierarchy,
            cutoff: DEFAULT_CUTOFF,
            report: None,
            matrix: None,
        }
    }

    /// Discover the hierarchy under `root` and wrap it
    pub fn build<P: TypeGraphProvider + ?Sized>(
        provider: &P,
        root: &str,
        options: BuildOptions,
    ) -> Result<Self> {
        build_hierarchy(provider, root, options).map(Self::new)
    }

    pub fn with_cutoff(mut self, cutoff: f64) -> Self {
        self.cutoff = cutoff;
        self
    }

    pub fn hierarchy(&self) -> &ClassHierarchy {
        &self.hierarchy
    }

    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    fn comparable_sources(&self) -> Result<BTreeMap<usize, String>> {
        if self.hierarchy.tracked_op().is_none() {
            return Err(Error::TrackingDisabled);
        }
        let sources = self.hierarchy.override_sources();
        let skipped = self.hierarchy.overrides().len() - sources.len();
        if skipped > 0 {
            warn!(skipped, "overrides without source left out of the comparison");
        }
        Ok(sources)
    }

    /// Compare override sources with the default statement diff.
    ///
    /// The reference strategy defaults to the first discovered override: the
    /// root when it declares the operation, else its nearest overriding
    /// descendant.
    pub fn check_source_similarity(
        &mut self,
        method: SimilarityMethod,
        reference: Option<usize>,
    ) -> Result<&SimilarityReport> {
        self.check_source_similarity_with(&SimilarityEngine::new(method), reference)
    }

    pub fn check_source_similarity_with<D: StructuralDiff>(
        &mut self,
        engine: &SimilarityEngine<D>,
        reference: Option<usize>,
    ) -> Result<&SimilarityReport> {
        let sources = self.comparable_sources()?;
        let reference = reference.or_else(|| sources.keys().next().copied());
        let report = engine.run(&sources, reference)?;
        if let Some(matrix) = report.matrix() {
            self.matrix = Some(matrix.clone());
        }
        info!(method = %engine.method(), sources = sources.len(), "similarity computed");
        Ok(self.report.insert(report))
    }

    pub fn similarity_report(&self) -> Option<&SimilarityReport> {
        self.report.as_ref()
    }

    /// Most recent permute matrix, if one was computed
    pub fn matrix(&self) -> Option<&SimilarityMatrix> {
        self.matrix.as_ref()
    }

    /// Permute matrix, computed on first use
    pub fn similarity_matrix(&mut self) -> Result<&SimilarityMatrix> {
        let matrix = match self.matrix.take() {
            Some(matrix) => matrix,
            None => {
                let sources = self.comparable_sources()?;
                SimilarityEngine::new(SimilarityMethod::Permute).permute(&sources)?
            }
        };
        Ok(self.matrix.insert(matrix))
    }

    /// Clusters at the configured cutoff; empty until a matrix exists
    pub fn clusters(&self) -> ClusterSet {
        self.matrix
            .as_ref()
            .map(|m| m.clusters(self.cutoff))
            .unwrap_or_default()
    }

    /// Undirected similarity edges between clustered nodes
    pub fn similarity_edges(&self) -> Vec<(usize, usize)> {
        self.clusters().edges()
    }

    /// Node names along the matrix axis
    pub fn similarity_labels(&self) -> Vec<String> {
        self.matrix
            .as_ref()
            .map(|m| {
                m.axis()
                    .iter()
                    .filter_map(|&id| self.hierarchy.get(id).map(|n| n.name.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }
}
