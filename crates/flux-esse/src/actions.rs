//! Dispatchable actions
//!
//! [`Actions`] is the frozen map from action name to dispatch entry point that a
//! store computes once. An [`Action`] is a single entry extracted from it: it is
//! not tied to any receiver and may be cloned into callbacks, timers or threads.

use crate::dispatcher::DispatchMessage;
use crate::spec::{ActionTable, StoreData};
use std::any::{Any, TypeId};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Where action invocations are routed
pub(crate) trait DispatchTarget: Send + Sync {
    fn dispatch(&self, message: DispatchMessage);
}

#[derive(Debug, Clone, Copy)]
struct Signature {
    name: &'static str,
    args: TypeId,
    args_name: &'static str,
}

struct ActionsInner {
    signatures: Vec<Signature>,
    target: Arc<dyn DispatchTarget>,
}

/// Frozen map of a store's actions
///
/// Clones share identity; see [`Actions::ptr_eq`].
pub struct Actions<S> {
    inner: Arc<ActionsInner>,
    _store: PhantomData<fn() -> S>,
}

impl<S> Clone for Actions<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            _store: PhantomData,
        }
    }
}

impl<S: StoreData> Actions<S> {
    pub(crate) fn new(table: &ActionTable<S>, target: Arc<dyn DispatchTarget>) -> Self {
        let signatures = table
            .entries()
            .iter()
            .map(|entry| Signature {
                name: entry.name,
                args: entry.args,
                args_name: entry.args_name,
            })
            .collect();
        Self {
            inner: Arc::new(ActionsInner { signatures, target }),
            _store: PhantomData,
        }
    }

    /// Action names in registration order
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.inner.signatures.iter().map(|s| s.name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.signature(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.inner.signatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.signatures.is_empty()
    }

    /// Extract the action `name`, typed by its argument payload
    ///
    /// Returns `None` when no such action was registered or when it was
    /// registered with arguments of a different type.
    pub fn get<A: Send + 'static>(&self, name: &str) -> Option<Action<A>> {
        let signature = self.signature(name)?;
        if signature.args != TypeId::of::<A>() {
            log::debug!(
                "Action `{}` takes `{}`, not `{}`",
                name,
                signature.args_name,
                std::any::type_name::<A>()
            );
            return None;
        }
        Some(Action {
            name: signature.name,
            target: Arc::clone(&self.inner.target),
            _args: PhantomData,
        })
    }

    /// Invoke `name` with `args` without extracting a typed action first
    ///
    /// Unknown names and mismatching arguments are reported on the store's
    /// diagnostic channel, like any other failing dispatch.
    pub fn dispatch<A: Any + Send>(&self, name: &str, args: A) {
        self.inner.target.dispatch(DispatchMessage {
            action: name.to_string(),
            args: Box::new(args),
        });
    }

    /// Whether both maps belong to the same store
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }

    fn signature(&self, name: &str) -> Option<&Signature> {
        self.inner.signatures.iter().find(|s| s.name == name)
    }
}

impl<S> fmt::Debug for Actions<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(self.inner.signatures.iter().map(|s| s.name))
            .finish()
    }
}

/// A single receiver-free action taking arguments of type `A`
pub struct Action<A> {
    name: &'static str,
    target: Arc<dyn DispatchTarget>,
    _args: PhantomData<fn(A)>,
}

impl<A> Clone for Action<A> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            target: Arc::clone(&self.target),
            _args: PhantomData,
        }
    }
}

impl<A: Send + 'static> Action<A> {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Dispatch the action through the store's queue
    pub fn call(&self, args: A) {
        self.target.dispatch(DispatchMessage {
            action: self.name.to_string(),
            args: Box::new(args),
        });
    }
}

impl<A> fmt::Debug for Action<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Action").field(&self.name).finish()
    }
}
