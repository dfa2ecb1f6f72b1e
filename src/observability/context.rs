//! Thread-local context tracking for crash reports.
//!
//! Records which phase is running and which type is being visited, plus a
//! count of nodes discovered by the current build. Guards restore the
//! previous context on drop so nested scopes compose.

use std::cell::{Cell, RefCell};

thread_local! {
    static CURRENT_CONTEXT: RefCell<ExplorerContext> =
        const { RefCell::new(ExplorerContext::new()) };
    static NODES_DISCOVERED: Cell<usize> = const { Cell::new(0) };
}

/// Snapshot of what inheritmap was doing.
#[derive(Debug, Clone, Default)]
pub struct ExplorerContext {
    pub phase: Option<Phase>,
    /// Type currently being visited (qualified name)
    pub current_type: Option<String>,
}

impl ExplorerContext {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            phase: None,
            current_type: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Loading manifests into the registry
    Loading,
    /// Walking the hierarchy
    Discovery,
    /// Comparing override sources
    Similarity,
    /// Writing graph or table output
    Rendering,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Loading => write!(f, "loading"),
            Self::Discovery => write!(f, "discovery"),
            Self::Similarity => write!(f, "similarity"),
            Self::Rendering => write!(f, "rendering"),
        }
    }
}

/// RAII guard restoring the previous context on drop.
pub struct ContextGuard {
    previous: ExplorerContext,
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        CURRENT_CONTEXT.with(|ctx| {
            *ctx.borrow_mut() = self.previous.clone();
        });
    }
}

#[must_use]
pub fn set_phase(phase: Phase) -> ContextGuard {
    CURRENT_CONTEXT.with(|ctx| {
        let previous = ctx.borrow().clone();
        ctx.borrow_mut().phase = Some(phase);
        ContextGuard { previous }
    })
}

#[must_use]
pub fn set_current_type(name: impl Into<String>) -> ContextGuard {
    CURRENT_CONTEXT.with(|ctx| {
        let previous = ctx.borrow().clone();
        ctx.borrow_mut().current_type = Some(name.into());
        ContextGuard { previous }
    })
}

pub fn increment_discovered() {
    NODES_DISCOVERED.with(|count| count.set(count.get() + 1));
}

#[must_use]
pub fn discovered_count() -> usize {
    NODES_DISCOVERED.with(Cell::get)
}

/// Called at the start of each build so crash reports count one hierarchy
pub fn reset_discovered() {
    NODES_DISCOVERED.with(|count| count.set(0));
}

#[must_use]
pub fn get_current_context() -> ExplorerContext {
    CURRENT_CONTEXT.with(|ctx| ctx.borrow().clone())
}

pub fn reset_context() {
    CURRENT_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = ExplorerContext::new();
    });
}
