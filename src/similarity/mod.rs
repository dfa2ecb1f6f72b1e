//! Pairwise similarity of override sources.
//!
//! Two strategies share one engine. `Reference` compares every source against
//! a single reference source. `Permute` runs the reference strategy once per
//! source to fill a full matrix, then symmetrizes it because the underlying
//! diff score is directional.

pub mod diff;
pub mod matrix;

pub use diff::{PairScore, StatementDiff, StructuralDiff};
pub use matrix::{ClusterSet, SimilarityMatrix};

use crate::errors::{Error, Result};
use crate::observability::{set_phase, Phase};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info_span};

/// Default clustering cutoff
pub const DEFAULT_CUTOFF: f64 = 0.75;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimilarityMethod {
    #[default]
    Reference,
    Permute,
}

impl SimilarityMethod {
    pub const VALID: &'static [&'static str] = &["reference", "permute"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reference => "reference",
            Self::Permute => "permute",
        }
    }
}

impl FromStr for SimilarityMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "reference" => Ok(Self::Reference),
            "permute" => Ok(Self::Permute),
            other => Err(Error::InvalidMethod {
                given: other.to_string(),
                valid: Self::VALID,
            }),
        }
    }
}

impl fmt::Display for SimilarityMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scores of every other source against one reference.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceComparison {
    pub reference: usize,
    pub scores: BTreeMap<usize, PairScore>,
}

impl ReferenceComparison {
    pub fn fraction(&self, id: usize) -> Option<f64> {
        self.scores.get(&id).map(|s| s.fraction)
    }

    /// Matrix row over `axis`: 1.0 at the reference, 0.0 for ids not scored
    pub fn row(&self, axis: &[usize]) -> Vec<f64> {
        axis.iter()
            .map(|&id| {
                if id == self.reference {
                    1.0
                } else {
                    self.fraction(id).unwrap_or(0.0)
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "method", rename_all = "lowercase")]
pub enum SimilarityReport {
    Reference(ReferenceComparison),
    Permute(SimilarityMatrix),
}

impl SimilarityReport {
    pub fn matrix(&self) -> Option<&SimilarityMatrix> {
        match self {
            Self::Permute(m) => Some(m),
            Self::Reference(_) => None,
        }
    }

    pub fn reference(&self) -> Option<&ReferenceComparison> {
        match self {
            Self::Reference(r) => Some(r),
            Self::Permute(_) => None,
        }
    }
}

pub struct SimilarityEngine<D: StructuralDiff = StatementDiff> {
    method: SimilarityMethod,
    diff: D,
}

impl SimilarityEngine<StatementDiff> {
    pub fn new(method: SimilarityMethod) -> Self {
        Self::with_diff(method, StatementDiff)
    }

    /// Construct from a method name, rejecting anything but the known set
    pub fn from_name(method: &str) -> Result<Self> {
        method.parse().map(Self::new)
    }
}

impl<D: StructuralDiff> SimilarityEngine<D> {
    pub fn with_diff(method: SimilarityMethod, diff: D) -> Self {
        Self { method, diff }
    }

    pub fn method(&self) -> SimilarityMethod {
        self.method
    }

    /// Run the configured strategy
    pub fn run(
        &self,
        sources: &BTreeMap<usize, String>,
        reference: Option<usize>,
    ) -> Result<SimilarityReport> {
        let _phase = set_phase(Phase::Similarity);
        let span = info_span!("similarity", method = %self.method, sources = sources.len());
        let _enter = span.enter();

        match self.method {
            SimilarityMethod::Reference => self
                .compare_to_reference(sources, reference)
                .map(SimilarityReport::Reference),
            SimilarityMethod::Permute => self.permute(sources).map(SimilarityReport::Permute),
        }
    }

    /// Compare every other source against `reference`
    pub fn compare_to_reference(
        &self,
        sources: &BTreeMap<usize, String>,
        reference: Option<usize>,
    ) -> Result<ReferenceComparison> {
        let reference = reference.ok_or(Error::MissingReference)?;
        let reference_src = sources
            .get(&reference)
            .ok_or(Error::ReferenceNotFound { reference })?;

        let scores = sources
            .iter()
            .filter(|(&id, _)| id != reference)
            .map(|(&id, src)| (id, self.diff.compare(reference_src, src)))
            .collect();
        Ok(ReferenceComparison { reference, scores })
    }

    /// Full pairwise matrix, symmetrized before it is returned
    pub fn permute(&self, sources: &BTreeMap<usize, String>) -> Result<SimilarityMatrix> {
        let axis: Vec<usize> = sources.keys().copied().collect();
        let mut raw = SimilarityMatrix::identity(axis.clone());
        for (row, &id) in axis.iter().enumerate() {
            let comparison = self.compare_to_reference(sources, Some(id))?;
            raw.set_row(row, comparison.row(&axis));
        }
        debug!(size = axis.len(), "assembled raw similarity matrix");
        Ok(raw.symmetrized())
    }
}
