//! Scoped store contexts
//!
//! [`create_context`] turns a spec into a [`FluxContext`]: a provider that owns
//! one store per activation, plus an identity that descendants use to find it.
//! Descendants call [`use_context`] with the [`Env`] their parent handed them.
//!
//! ```
//! use flux_esse::{create_context, use_context, Draft, Env, StoreSpec};
//!
//! #[derive(Clone, Default)]
//! struct Form {
//!     text: String,
//! }
//!
//! # fn main() -> Result<(), flux_esse::FluxError> {
//! let context = create_context(
//!     StoreSpec::new(Form::default())
//!         .action("change", |form: &mut Draft<Form>, text: String| form.text = text),
//! );
//! let page = context.provider().mount(&Env::root())?;
//!
//! // somewhere below, with only the env and the id at hand
//! let consumer = use_context::<Form>(page.env(), context.id())?;
//! consumer.actions().dispatch("change", "test".to_string());
//! assert_eq!(consumer.store().text, "test");
//! # Ok(())
//! # }
//! ```

mod consumer;
mod env;
mod provider;

pub use consumer::Consumer;
pub use env::Env;
pub use provider::{Mounted, Provider};

use crate::actions::Actions;
use crate::error::FluxError;
use crate::spec::{StoreData, StoreSpec};
use crate::store::Store;
use parking_lot::{Mutex, RwLock};
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

/// Name contexts carry until renamed
pub const DEFAULT_DISPLAY_NAME: &str = "FluxEsseContext";

/// Callback run when a provider deactivates
pub type Cleanup = Box<dyn FnOnce() + Send + 'static>;

type OnMount<S> = Arc<dyn Fn(&Actions<S>) -> Option<Cleanup> + Send + Sync>;

/// Opaque identity of a context
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScopeId(u64);

impl ScopeId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scope#{}", self.0)
    }
}

/// Identity to context association. Entries are weak so a context that is no
/// longer referenced anywhere stops being recognized.
static REGISTRY: Mutex<BTreeMap<ScopeId, Weak<dyn Any + Send + Sync>>> =
    Mutex::new(BTreeMap::new());

fn register(id: ScopeId, context: Weak<dyn Any + Send + Sync>) {
    let mut registry = REGISTRY.lock();
    registry.retain(|_, entry| entry.strong_count() > 0);
    registry.insert(id, context);
}

fn resolve<S: StoreData>(id: ScopeId) -> Option<Arc<ContextInner<S>>> {
    // Upgrade outside the lock: dropping the last strong ref must not re-enter it
    let entry = REGISTRY.lock().get(&id).cloned()?;
    entry.upgrade()?.downcast::<ContextInner<S>>().ok()
}

pub(crate) struct ContextInner<S> {
    id: ScopeId,
    spec: StoreSpec<S>,
    display_name: RwLock<String>,
    on_mount: Option<OnMount<S>>,
}

impl<S> ContextInner<S> {
    pub(crate) fn display_name(&self) -> String {
        self.display_name.read().clone()
    }
}

/// A store context: provider factory plus identity
pub struct FluxContext<S> {
    inner: Arc<ContextInner<S>>,
}

impl<S> Clone for FluxContext<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: StoreData> FluxContext<S> {
    fn new(spec: StoreSpec<S>, on_mount: Option<OnMount<S>>) -> Self {
        let inner = Arc::new(ContextInner {
            id: ScopeId::next(),
            spec,
            display_name: RwLock::new(DEFAULT_DISPLAY_NAME.to_string()),
            on_mount,
        });
        let erased: Arc<dyn Any + Send + Sync> = inner.clone();
        register(inner.id, Arc::downgrade(&erased));
        Self { inner }
    }

    pub fn id(&self) -> ScopeId {
        self.inner.id
    }

    /// Name used in diagnostics and error messages
    pub fn display_name(&self) -> String {
        self.inner.display_name()
    }

    pub fn set_display_name(&self, name: impl Into<String>) {
        *self.inner.display_name.write() = name.into();
    }

    /// Provider entry point; each mount creates a fresh store from the store spec
    pub fn provider(&self) -> Provider<S> {
        Provider::new(Arc::clone(&self.inner))
    }
}

impl<S> From<&FluxContext<S>> for ScopeId {
    fn from(context: &FluxContext<S>) -> Self {
        context.inner.id
    }
}

impl<S> fmt::Debug for FluxContext<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FluxContext")
            .field("id", &self.inner.id)
            .field("display_name", &self.inner.display_name())
            .finish()
    }
}

/// Create a context for the store described by `spec`
pub fn create_context<S: StoreData>(spec: impl Into<StoreSpec<S>>) -> FluxContext<S> {
    FluxContext::new(spec.into(), None)
}

/// Like [`create_context`], running `on_mount` once per provider activation
///
/// `on_mount` receives the store's actions and may return a [`Cleanup`] that runs
/// exactly once when that activation ends.
pub fn create_context_with<S, F>(spec: impl Into<StoreSpec<S>>, on_mount: F) -> FluxContext<S>
where
    S: StoreData,
    F: Fn(&Actions<S>) -> Option<Cleanup> + Send + Sync + 'static,
{
    FluxContext::new(spec.into(), Some(Arc::new(on_mount)))
}

/// Find the store published by the nearest active provider of `scope`
///
/// Fails with [`FluxError::InvalidScope`] when `scope` does not identify a live
/// context for stores of type `S`, and with [`FluxError::OutOfScope`] when `env`
/// has no active provider for it.
pub fn use_context<S: StoreData>(
    env: &Env,
    scope: impl Into<ScopeId>,
) -> Result<Consumer<S>, FluxError> {
    let scope = scope.into();
    let context = resolve::<S>(scope).ok_or(FluxError::InvalidScope)?;
    let store = env
        .lookup(scope)
        .and_then(|value| value.downcast_ref::<Store<S>>())
        .cloned()
        .ok_or_else(|| FluxError::OutOfScope {
            display_name: context.display_name(),
        })?;
    Ok(Consumer::new(store))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::Draft;
    use crate::spec::{ActionTable, FluxStore};
    use pretty_assertions::assert_eq;
    use std::sync::atomic::AtomicUsize;

    #[derive(Clone, Debug, Default)]
    struct Form {
        text: String,
    }

    impl FluxStore for Form {
        fn register(actions: &mut ActionTable<Self>) {
            actions.add("change", |form: &mut Draft<Self>, text: String| {
                form.text = text
            });
        }
    }

    #[derive(Clone, Debug, Default)]
    struct Tally {
        a: u32,
        d: String,
    }

    impl FluxStore for Tally {
        fn register(actions: &mut ActionTable<Self>) {
            actions
                .add("a", |t: &mut Draft<Self>, ()| t.a += 1)
                .add("c", |t: &mut Draft<Self>, x: String| {
                    t.d = format!("{}{}", t.a, x)
                });
        }
    }

    #[test]
    fn test_descendants_share_one_store() {
        let context = create_context(Form::default());
        let page = context.provider().mount(&Env::root()).unwrap();

        let view = use_context::<Form>(page.env(), &context).unwrap();
        let button = use_context::<Form>(page.env(), context.id()).unwrap();
        assert_eq!(view.store().text, "");

        button.actions().dispatch("change", "test".to_string());
        assert_eq!(view.store().text, "test");
        assert!(Actions::ptr_eq(view.actions(), button.actions()));
    }

    #[test]
    fn test_display_name() {
        let context = create_context(Form::default());
        assert_eq!(context.display_name(), DEFAULT_DISPLAY_NAME);
        context.set_display_name("abc");
        assert_eq!(context.display_name(), "abc");
    }

    #[test]
    fn test_empty_spec_fails_on_mount() {
        let context = create_context(StoreSpec::new(Form::default()));
        match context.provider().mount(&Env::root()) {
            Err(FluxError::Configuration) => {}
            other => panic!("expected configuration error, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_expired_scope_is_invalid() {
        let context = create_context(Form::default());
        let id = context.id();
        drop(context);
        let result = use_context::<Form>(&Env::root(), id);
        assert!(matches!(result, Err(FluxError::InvalidScope)));
    }

    #[test]
    fn test_scope_of_other_store_type_is_invalid() {
        let context = create_context(Tally::default());
        let page = context.provider().mount(&Env::root()).unwrap();
        let result = use_context::<Form>(page.env(), &context);
        assert!(matches!(result, Err(FluxError::InvalidScope)));
    }

    #[test]
    fn test_outside_provider_is_out_of_scope() {
        let context = create_context(Form::default());
        context.set_display_name("FormContext");
        let error = use_context::<Form>(&Env::root(), &context).unwrap_err();
        assert_eq!(
            error.to_string(),
            "use_context must be used within the descendant component of FormContext.Provider"
        );
    }

    #[test]
    fn test_sibling_provider_is_out_of_scope() {
        let first = create_context(Form::default());
        let second = create_context(Form::default());
        let page = first.provider().mount(&Env::root()).unwrap();
        let result = use_context::<Form>(page.env(), &second);
        assert!(matches!(result, Err(FluxError::OutOfScope { .. })));
    }

    #[test]
    fn test_unmounted_provider_is_out_of_scope() {
        let context = create_context(Form::default());
        let page = context.provider().mount(&Env::root()).unwrap();
        let env = page.env().clone();
        assert!(use_context::<Form>(&env, &context).is_ok());

        drop(page);

        let result = use_context::<Form>(&env, &context);
        assert!(matches!(result, Err(FluxError::OutOfScope { .. })));
    }

    #[test]
    fn test_nested_providers_are_independent() {
        let context = create_context(Form::default());
        let outer = context.provider().mount(&Env::root()).unwrap();
        let inner = context.provider().mount(outer.env()).unwrap();

        use_context::<Form>(inner.env(), &context)
            .unwrap()
            .actions()
            .dispatch("change", "inner".to_string());

        assert_eq!(use_context::<Form>(inner.env(), &context).unwrap().store().text, "inner");
        assert_eq!(use_context::<Form>(outer.env(), &context).unwrap().store().text, "");
    }

    #[test]
    fn test_on_mount_and_cleanup_run_once() {
        let mounts = Arc::new(AtomicUsize::new(0));
        let cleanups = Arc::new(AtomicUsize::new(0));
        let (m, c) = (Arc::clone(&mounts), Arc::clone(&cleanups));
        let context = create_context_with(Tally::default(), move |actions: &Actions<Tally>| {
            m.fetch_add(1, Ordering::SeqCst);
            actions.dispatch("c", "x".to_string());
            let c = Arc::clone(&c);
            Some(Box::new(move || {
                c.fetch_add(1, Ordering::SeqCst);
            }) as Cleanup)
        });

        let page = context.provider().mount(&Env::root()).unwrap();
        assert_eq!(mounts.load(Ordering::SeqCst), 1);
        assert_eq!(cleanups.load(Ordering::SeqCst), 0);
        assert_eq!(page.store().snapshot().d, "0x");

        drop(page);
        assert_eq!(mounts.load(Ordering::SeqCst), 1);
        assert_eq!(cleanups.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_initialize_runs_after_on_mount_for_each_mount() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let on_mount_order = Arc::clone(&order);
        let context = create_context_with(Tally::default(), move |_: &Actions<Tally>| {
            on_mount_order.lock().push("on_mount");
            None
        });

        for _ in 0..2 {
            let initialize_order = Arc::clone(&order);
            let page = context
                .provider()
                .initialize(move |actions: &Actions<Tally>| {
                    initialize_order.lock().push("initialize");
                    actions.dispatch("a", ());
                })
                .mount(&Env::root())
                .unwrap();

            // Each mount starts from a fresh store
            let tally = page.store().snapshot();
            assert_eq!(tally.a, 1);
            assert_eq!(tally.generation(), 1);
        }

        assert_eq!(
            *order.lock(),
            vec!["on_mount", "initialize", "on_mount", "initialize"]
        );
    }

    #[test]
    fn test_consumer_debug_shows_store() {
        let context = create_context(Form::default());
        let page = context.provider().mount(&Env::root()).unwrap();
        let consumer = use_context::<Form>(page.env(), &context).unwrap();
        assert!(format!("{:?}", consumer).starts_with("Consumer { store: Store"));
    }
}
