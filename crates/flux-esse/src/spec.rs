//! Store specifications
//!
//! A [`StoreSpec`] pairs the initial data of a store with the explicit list of
//! action handlers that are allowed to mutate it. Handlers are registered either
//! by the data type itself through [`FluxStore::register`] or ad hoc on the [`StoreSpec`].

use crate::draft::Draft;
use crate::reporter::{ErrorReporter, LogReporter};
use std::any::{type_name, Any, TypeId};
use std::sync::Arc;

/// Bound shared by every store data type
pub trait StoreData: Clone + Send + Sync + 'static {}

impl<T> StoreData for T where T: Clone + Send + Sync + 'static {}

/// Data type that declares its own action handlers
///
/// ```
/// use flux_esse::{create, ActionTable, Draft, FluxStore};
///
/// #[derive(Clone, Default)]
/// struct Form {
///     text: String,
/// }
///
/// impl FluxStore for Form {
///     fn register(actions: &mut ActionTable<Self>) {
///         actions.add("change", |form: &mut Draft<Self>, text: String| form.text = text);
///     }
/// }
///
/// # fn main() -> Result<(), flux_esse::FluxError> {
/// let store = create(Form::default())?;
/// store.actions().dispatch("change", "hi".to_string());
/// assert_eq!(store.snapshot().text, "hi");
/// # Ok(())
/// # }
/// ```
pub trait FluxStore: StoreData {
    fn register(actions: &mut ActionTable<Self>);
}

/// Arguments of a dispatch, erased until the handler downcasts them
pub(crate) type Payload = Box<dyn Any + Send>;

pub(crate) enum HandlerFailure {
    ArgumentMismatch(&'static str),
    Failed(anyhow::Error),
}

pub(crate) type Handler<S> =
    Arc<dyn Fn(&mut Draft<'_, S>, Payload) -> Result<(), HandlerFailure> + Send + Sync>;

pub(crate) struct ActionEntry<S> {
    pub(crate) name: &'static str,
    pub(crate) args: TypeId,
    pub(crate) args_name: &'static str,
    pub(crate) handler: Handler<S>,
}

impl<S> Clone for ActionEntry<S> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            args: self.args,
            args_name: self.args_name,
            handler: Arc::clone(&self.handler),
        }
    }
}

/// Ordered list of named action handlers
///
/// Registering a name twice replaces the earlier handler but keeps its position,
/// so a wrapping type can shadow handlers it inherits from the type it delegates to.
pub struct ActionTable<S> {
    entries: Vec<ActionEntry<S>>,
}

impl<S> Default for ActionTable<S> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<S> Clone for ActionTable<S> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<S: StoreData> ActionTable<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an infallible handler taking arguments of type `A`
    pub fn add<A, F>(&mut self, name: &'static str, handler: F) -> &mut Self
    where
        A: Send + 'static,
        F: Fn(&mut Draft<'_, S>, A) + Send + Sync + 'static,
    {
        self.try_add(name, move |draft: &mut Draft<'_, S>, args: A| {
            handler(draft, args);
            Ok(())
        })
    }

    /// Register a handler that may fail
    ///
    /// An `Err` is reported on the store's diagnostic channel. Whatever the handler
    /// wrote to the draft before failing is kept.
    pub fn try_add<A, F>(&mut self, name: &'static str, handler: F) -> &mut Self
    where
        A: Send + 'static,
        F: Fn(&mut Draft<'_, S>, A) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let erased: Handler<S> = Arc::new(move |draft: &mut Draft<'_, S>, payload: Payload| {
            let args = payload
                .downcast::<A>()
                .map_err(|_| HandlerFailure::ArgumentMismatch(type_name::<A>()))?;
            handler(draft, *args).map_err(HandlerFailure::Failed)
        });
        let entry = ActionEntry {
            name,
            args: TypeId::of::<A>(),
            args_name: type_name::<A>(),
            handler: erased,
        };
        match self.entries.iter_mut().find(|e| e.name == name) {
            Some(existing) => {
                log::trace!("Action `{}` shadows an earlier registration", name);
                *existing = entry;
            }
            None => self.entries.push(entry),
        }
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    /// Registered names in registration order
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|e| e.name)
    }

    pub(crate) fn entries(&self) -> &[ActionEntry<S>] {
        &self.entries
    }
}

enum Source<S> {
    Value(S),
    Factory(Arc<dyn Fn() -> S + Send + Sync>),
}

impl<S: Clone> Clone for Source<S> {
    fn clone(&self) -> Self {
        match self {
            Self::Value(value) => Self::Value(value.clone()),
            Self::Factory(factory) => Self::Factory(Arc::clone(factory)),
        }
    }
}

/// Initial data plus action handlers for a store
pub struct StoreSpec<S> {
    source: Source<S>,
    table: ActionTable<S>,
    reporter: Arc<dyn ErrorReporter>,
}

impl<S: StoreData> Clone for StoreSpec<S> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            table: self.table.clone(),
            reporter: Arc::clone(&self.reporter),
        }
    }
}

impl<S: StoreData> StoreSpec<S> {
    /// Spec starting from a concrete value, cloned for every store created from it
    pub fn new(initial: S) -> Self {
        Self::with_source(Source::Value(initial))
    }

    /// Spec whose initial data is built by `factory` for every store created from it
    pub fn from_fn<F>(factory: F) -> Self
    where
        F: Fn() -> S + Send + Sync + 'static,
    {
        Self::with_source(Source::Factory(Arc::new(factory)))
    }

    fn with_source(source: Source<S>) -> Self {
        Self {
            source,
            table: ActionTable::new(),
            reporter: Arc::new(LogReporter::new()),
        }
    }

    /// Register an infallible action handler
    pub fn action<A, F>(mut self, name: &'static str, handler: F) -> Self
    where
        A: Send + 'static,
        F: Fn(&mut Draft<'_, S>, A) + Send + Sync + 'static,
    {
        self.table.add(name, handler);
        self
    }

    /// Register a fallible action handler
    pub fn try_action<A, F>(mut self, name: &'static str, handler: F) -> Self
    where
        A: Send + 'static,
        F: Fn(&mut Draft<'_, S>, A) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.table.try_add(name, handler);
        self
    }

    /// Register a batch of handlers, typically another type's `FluxStore::register`
    pub fn register(mut self, register: impl FnOnce(&mut ActionTable<S>)) -> Self {
        register(&mut self.table);
        self
    }

    /// Replace the diagnostic channel (defaults to [`LogReporter`])
    pub fn with_reporter(mut self, reporter: impl ErrorReporter + 'static) -> Self {
        self.reporter = Arc::new(reporter);
        self
    }

    pub fn actions(&self) -> &ActionTable<S> {
        &self.table
    }

    pub(crate) fn reporter(&self) -> Arc<dyn ErrorReporter> {
        Arc::clone(&self.reporter)
    }

    pub(crate) fn instantiate(&self) -> S {
        match &self.source {
            Source::Value(value) => value.clone(),
            Source::Factory(factory) => factory(),
        }
    }
}

impl<S: FluxStore> From<S> for StoreSpec<S> {
    fn from(initial: S) -> Self {
        StoreSpec::new(initial).register(S::register)
    }
}

impl<S: FluxStore + Default> Default for StoreSpec<S> {
    fn default() -> Self {
        StoreSpec::from_fn(S::default).register(S::register)
    }
}
