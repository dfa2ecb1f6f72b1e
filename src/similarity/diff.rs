//! Structural-diff primitive behind the similarity engine.
//!
//! Backends implement [`StructuralDiff`]: given a reference and a candidate
//! source, report how many candidate units also appear (in order) in the
//! reference. The score is directional.

use serde::Serialize;

/// Overlap of a candidate against a reference
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PairScore {
    pub overlap_count: usize,
    pub total_count: usize,
    /// `overlap_count / total_count`, in `[0, 1]`
    pub fraction: f64,
}

impl PairScore {
    pub fn identical(units: usize) -> Self {
        Self {
            overlap_count: units,
            total_count: units,
            fraction: 1.0,
        }
    }
}

pub trait StructuralDiff {
    fn compare(&self, reference: &str, candidate: &str) -> PairScore;
}

/// Statement-level diff.
///
/// Sources are split into statements on newlines and `;`, blank and
/// comment-only statements are dropped, and each statement is re-tokenized so
/// spacing differences vanish. The overlap is the longest common subsequence
/// of statements; the total is the candidate's statement count.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatementDiff;

impl StructuralDiff for StatementDiff {
    fn compare(&self, reference: &str, candidate: &str) -> PairScore {
        let reference = statements(reference);
        let candidate = statements(candidate);

        if candidate.is_empty() {
            let fraction = if reference.is_empty() { 1.0 } else { 0.0 };
            return PairScore {
                overlap_count: 0,
                total_count: 0,
                fraction,
            };
        }

        let overlap = lcs_len(&reference, &candidate);
        PairScore {
            overlap_count: overlap,
            total_count: candidate.len(),
            fraction: overlap as f64 / candidate.len() as f64,
        }
    }
}

pub fn statements(source: &str) -> Vec<String> {
    source
        .lines()
        .flat_map(|line| line.split(';'))
        .map(str::trim)
        .filter(|stmt| !stmt.is_empty() && !stmt.starts_with('#') && !stmt.starts_with("//"))
        .map(|stmt| tokenize(stmt).join(" "))
        .collect()
}

fn tokenize(statement: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut chars = statement.chars().peekable();
    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if c.is_alphanumeric() || c == '_' {
            let mut word = String::new();
            while let Some(&c) = chars.peek() {
                let decimal_point = c == '.' && word.chars().all(|d| d.is_ascii_digit());
                if c.is_alphanumeric() || c == '_' || decimal_point {
                    word.push(c);
                    chars.next();
                } else {
                    break;
                }
            }
            tokens.push(word);
        } else {
            tokens.push(c.to_string());
            chars.next();
        }
    }
    tokens
}

fn lcs_len(a: &[String], b: &[String]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];
    for x in a {
        for (j, y) in b.iter().enumerate() {
            curr[j + 1] = if x == y {
                prev[j] + 1
            } else {
                curr[j].max(prev[j + 1])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}
