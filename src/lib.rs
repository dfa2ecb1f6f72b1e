// Export modules for library usage
pub mod cli;
pub mod config;
pub mod errors;
pub mod explorer;
pub mod hierarchy;
pub mod io;
pub mod observability;
pub mod similarity;

// Re-export commonly used types
pub use crate::errors::{Error, NodeKey, Result};
pub use crate::explorer::InheritanceExplorer;
pub use crate::hierarchy::{
    build_hierarchy, BuildOptions, ClassHierarchy, Color, ModuleLoader, Node, NodeColors,
    OverrideSource, Provenance, ResolvedMember, TypeDef, TypeGraphProvider, TypeRegistry,
};
pub use crate::similarity::{
    ClusterSet, PairScore, ReferenceComparison, SimilarityEngine, SimilarityMatrix,
    SimilarityMethod, SimilarityReport, StatementDiff, StructuralDiff, DEFAULT_CUTOFF,
};
