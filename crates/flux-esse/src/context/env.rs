//! Ambient scope chain
//!
//! An [`Env`] is what a component hands down to its descendants. Every mounted
//! provider pushes one frame; lookups walk from the innermost frame outwards and
//! skip frames whose provider has been deactivated.

use super::ScopeId;
use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

struct Frame {
    scope: ScopeId,
    value: Arc<dyn Any + Send + Sync>,
    active: Arc<AtomicBool>,
    parent: Option<Arc<Frame>>,
}

/// Values published by the enclosing providers
#[derive(Clone, Default)]
pub struct Env {
    head: Option<Arc<Frame>>,
}

impl Env {
    /// Environment with no provider in it
    pub fn root() -> Self {
        Self::default()
    }

    /// Child environment publishing `value` for `scope`
    pub(crate) fn provide(
        &self,
        scope: ScopeId,
        value: Arc<dyn Any + Send + Sync>,
        active: Arc<AtomicBool>,
    ) -> Env {
        Env {
            head: Some(Arc::new(Frame {
                scope,
                value,
                active,
                parent: self.head.clone(),
            })),
        }
    }

    /// Value of the nearest active provider for `scope`
    pub(crate) fn lookup(&self, scope: ScopeId) -> Option<&Arc<dyn Any + Send + Sync>> {
        self.frames()
            .find(|frame| frame.scope == scope && frame.active.load(Ordering::Acquire))
            .map(|frame| &frame.value)
    }

    /// Number of active providers enclosing this environment
    pub fn depth(&self) -> usize {
        self.frames()
            .filter(|frame| frame.active.load(Ordering::Acquire))
            .count()
    }

    fn frames(&self) -> impl Iterator<Item = &Frame> {
        std::iter::successors(self.head.as_deref(), |frame| frame.parent.as_deref())
    }
}

impl fmt::Debug for Env {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(
                self.frames()
                    .filter(|frame| frame.active.load(Ordering::Acquire))
                    .map(|frame| frame.scope),
            )
            .finish()
    }
}
