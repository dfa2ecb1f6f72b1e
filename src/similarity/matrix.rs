use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

const SYMMETRY_TOLERANCE: f64 = 1e-12;

/// Square similarity matrix indexed by node ids.
///
/// Row and column `i` both belong to `axis[i]`; the axis order is fixed when
/// the matrix is computed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarityMatrix {
    axis: Vec<usize>,
    values: Vec<Vec<f64>>,
}

impl SimilarityMatrix {
    /// Identity matrix over `axis`
    pub fn identity(axis: Vec<usize>) -> Self {
        let n = axis.len();
        let values = (0..n)
            .map(|i| (0..n).map(|j| if i == j { 1.0 } else { 0.0 }).collect())
            .collect();
        Self { axis, values }
    }

    /// Assemble from rows; every row must be as long as the axis.
    pub fn from_rows(axis: Vec<usize>, values: Vec<Vec<f64>>) -> Option<Self> {
        let n = axis.len();
        (values.len() == n && values.iter().all(|row| row.len() == n))
            .then_some(Self { axis, values })
    }

    pub fn axis(&self) -> &[usize] {
        &self.axis
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.axis.len()
    }

    pub fn is_empty(&self) -> bool {
        self.axis.is_empty()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.values.get(row)?.get(col).copied()
    }

    pub fn index_of(&self, id: usize) -> Option<usize> {
        self.axis.iter().position(|&a| a == id)
    }

    /// Value between two node ids
    pub fn value(&self, a: usize, b: usize) -> Option<f64> {
        self.get(self.index_of(a)?, self.index_of(b)?)
    }

    pub(crate) fn set_row(&mut self, row: usize, values: Vec<f64>) {
        self.values[row] = values;
    }

    pub fn is_symmetric(&self) -> bool {
        let n = self.len();
        (0..n).all(|i| {
            (i + 1..n).all(|j| (self.values[i][j] - self.values[j][i]).abs() <= SYMMETRY_TOLERANCE)
        })
    }

    /// `(M + Mᵀ) / 2` with the diagonal pinned to 1.0
    pub fn symmetrized(&self) -> Self {
        let n = self.len();
        let values = (0..n)
            .map(|i| {
                (0..n)
                    .map(|j| {
                        if i == j {
                            1.0
                        } else {
                            (self.values[i][j] + self.values[j][i]) / 2.0
                        }
                    })
                    .collect()
            })
            .collect();
        Self {
            axis: self.axis.clone(),
            values,
        }
    }

    /// Binarized copy: 1.0 where the value reaches `cutoff`, else 0.0
    pub fn above_cutoff(&self, cutoff: f64) -> Self {
        let values = self
            .values
            .iter()
            .map(|row| {
                row.iter()
                    .map(|&v| if v >= cutoff { 1.0 } else { 0.0 })
                    .collect()
            })
            .collect();
        Self {
            axis: self.axis.clone(),
            values,
        }
    }

    /// Near-duplicate clusters at `cutoff`
    pub fn clusters(&self, cutoff: f64) -> ClusterSet {
        let mut members = BTreeMap::new();
        for (i, row) in self.values.iter().enumerate() {
            let similar: BTreeSet<usize> = row
                .iter()
                .enumerate()
                .filter(|&(j, &v)| j != i && v >= cutoff)
                .map(|(j, _)| self.axis[j])
                .collect();
            if !similar.is_empty() {
                members.insert(self.axis[i], similar);
            }
        }
        ClusterSet { cutoff, members }
    }
}

/// Node id → other node ids at or above the cutoff.
///
/// Never maps a node to itself and never stores an empty set.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClusterSet {
    cutoff: f64,
    members: BTreeMap<usize, BTreeSet<usize>>,
}

impl ClusterSet {
    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    pub fn get(&self, id: usize) -> Option<&BTreeSet<usize>> {
        self.members.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&usize, &BTreeSet<usize>)> {
        self.members.iter()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Each similar pair once, smaller id first
    pub fn edges(&self) -> Vec<(usize, usize)> {
        let pairs: BTreeSet<(usize, usize)> = self
            .members
            .iter()
            .flat_map(|(&a, others)| others.iter().map(move |&b| (a.min(b), a.max(b))))
            .collect();
        pairs.into_iter().collect()
    }
}
