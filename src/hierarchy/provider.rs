//! Type-graph provider capability.
//!
//! The hierarchy builder never inspects types directly. Everything it knows
//! about subclasses and member resolution comes through [`TypeGraphProvider`],
//! so any host that can enumerate direct subtypes and resolve a member can be
//! explored.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Declaring location of a resolved member.
///
/// Override detection compares provenance by value: two types that inherit the
/// same implementation resolve to the same `(unit, line)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Provenance {
    /// Declaring unit (file or module)
    pub unit: String,
    /// Starting line of the declaration
    pub line: u32,
}

impl Provenance {
    pub fn new(unit: impl Into<String>, line: u32) -> Self {
        Self {
            unit: unit.into(),
            line,
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.unit, self.line)
    }
}

/// A member as seen from a particular type after resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMember {
    /// Type the member is declared on (may be an ancestor)
    pub declaring_type: String,
    pub provenance: Provenance,
    /// False for plain attributes; only invocable members can override
    pub invocable: bool,
    /// Literal source text, when the provider can produce it
    pub source: Option<String>,
}

/// Capability the hierarchy builder walks.
///
/// `direct_children_of` must return immediate subtypes only, in whatever order
/// the host reports them.
pub trait TypeGraphProvider {
    /// Whether the provider knows a type by this identifier
    fn contains(&self, ty: &str) -> bool;

    /// Display name for a type (defaults to the identifier itself)
    fn display_name(&self, ty: &str) -> String {
        ty.to_string()
    }

    fn direct_children_of(&self, ty: &str) -> Vec<String>;

    fn resolve_member(&self, ty: &str, member: &str) -> Option<ResolvedMember>;
}

impl<P: TypeGraphProvider + ?Sized> TypeGraphProvider for &P {
    fn contains(&self, ty: &str) -> bool {
        (**self).contains(ty)
    }

    fn display_name(&self, ty: &str) -> String {
        (**self).display_name(ty)
    }

    fn direct_children_of(&self, ty: &str) -> Vec<String> {
        (**self).direct_children_of(ty)
    }

    fn resolve_member(&self, ty: &str, member: &str) -> Option<ResolvedMember> {
        (**self).resolve_member(ty, member)
    }
}
