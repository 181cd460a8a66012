use super::{Cleanup, ContextInner, Env};
use crate::actions::Actions;
use crate::error::FluxError;
use crate::spec::StoreData;
use crate::store::Store;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

type Initialize<S> = Box<dyn FnOnce(&Actions<S>) + Send>;

/// Provider entry point of a [`FluxContext`](super::FluxContext)
pub struct Provider<S> {
    context: Arc<ContextInner<S>>,
    initialize: Option<Initialize<S>>,
}

impl<S: StoreData> Provider<S> {
    pub(crate) fn new(context: Arc<ContextInner<S>>) -> Self {
        Self {
            context,
            initialize: None,
        }
    }

    /// Run `initialize` with the fresh store's actions once the provider is mounted
    pub fn initialize<F>(mut self, initialize: F) -> Self
    where
        F: FnOnce(&Actions<S>) + Send + 'static,
    {
        self.initialize = Some(Box::new(initialize));
        self
    }

    /// Activate the provider below `parent`
    ///
    /// Creates the store exactly once for this activation; the returned
    /// [`Mounted`] keeps it alive and publishes it to descendants of its env.
    pub fn mount(self, parent: &Env) -> Result<Mounted<S>, FluxError> {
        let store = Store::from_spec(&self.context.spec)?;
        let active = Arc::new(AtomicBool::new(true));
        let env = parent.provide(
            self.context.id,
            Arc::new(store.clone()),
            Arc::clone(&active),
        );
        log::debug!(
            "Mounted {}.Provider ({})",
            self.context.display_name(),
            self.context.id
        );

        let cleanup = self
            .context
            .on_mount
            .as_ref()
            .and_then(|on_mount| on_mount(store.actions()));
        if let Some(initialize) = self.initialize {
            initialize(store.actions());
        }

        Ok(Mounted {
            context: self.context,
            store,
            env,
            active,
            cleanup,
        })
    }
}

/// An active provider
///
/// Dropping it deactivates the provider: descendants can no longer reach its
/// store and the mount cleanup, if any, runs.
pub struct Mounted<S> {
    context: Arc<ContextInner<S>>,
    store: Store<S>,
    env: Env,
    active: Arc<AtomicBool>,
    cleanup: Option<Cleanup>,
}

impl<S: StoreData> Mounted<S> {
    /// Environment to hand to descendants
    pub fn env(&self) -> &Env {
        &self.env
    }

    pub fn store(&self) -> &Store<S> {
        &self.store
    }
}

impl<S> Drop for Mounted<S> {
    fn drop(&mut self) {
        self.active.store(false, Ordering::Release);
        if let Some(cleanup) = self.cleanup.take() {
            cleanup();
        }
        log::debug!(
            "Unmounted {}.Provider ({})",
            self.context.display_name(),
            self.context.id
        );
    }
}
