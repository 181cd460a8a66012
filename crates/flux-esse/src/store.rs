use crate::actions::{Actions, DispatchTarget};
use crate::dispatcher::{DispatchMessage, Dispatcher};
use crate::draft::{Draft, HandlerMap};
use crate::error::{ActionHandlerError, FluxError};
use crate::reporter::ErrorReporter;
use crate::spec::{HandlerFailure, StoreData, StoreSpec};
use parking_lot::Mutex;
use std::any::Any;
use std::fmt;
use std::ops::Deref;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tokio::sync::watch;

/// Read-only view of one store generation
///
/// Holds only data; action handlers live beside it, never inside it.
pub struct Snapshot<S> {
    data: Arc<S>,
    generation: u64,
}

impl<S> Snapshot<S> {
    /// Zero for the initial data, incremented by every dispatch
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether both snapshots share the same physical data
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.data, &b.data)
    }
}

impl<S> Clone for Snapshot<S> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
            generation: self.generation,
        }
    }
}

impl<S> Deref for Snapshot<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.data
    }
}

impl<S: fmt::Debug> fmt::Debug for Snapshot<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Snapshot")
            .field("generation", &self.generation)
            .field("data", &*self.data)
            .finish()
    }
}

/// Current snapshot and the store's actions
pub type StoreAndActions<S> = (Snapshot<S>, Actions<S>);

struct Generation<S> {
    data: Arc<S>,
    handlers: Arc<HandlerMap<S>>,
    number: u64,
}

struct Core<S> {
    current: Mutex<Generation<S>>,
    dispatcher: Dispatcher,
    publisher: watch::Sender<Snapshot<S>>,
    reporter: Arc<dyn ErrorReporter>,
}

impl<S: StoreData> Core<S> {
    fn snapshot(&self) -> Snapshot<S> {
        let current = self.current.lock();
        Snapshot {
            data: Arc::clone(&current.data),
            generation: current.number,
        }
    }

    /// Apply one message, commit the next generation, then publish it
    fn apply(&self, message: DispatchMessage) {
        let DispatchMessage { action, args } = message;

        // The lock is released while the handler runs so it may read the store
        let (mut data, mut handlers) = {
            let current = self.current.lock();
            (Arc::clone(&current.data), Arc::clone(&current.handlers))
        };

        let handler = handlers.get(action.as_str()).cloned();
        let outcome = match handler {
            None => Err(ActionHandlerError::Missing {
                action: action.clone(),
            }),
            Some(handler) => {
                let mut draft = Draft::new(&mut data, &mut handlers);
                match panic::catch_unwind(AssertUnwindSafe(|| handler(&mut draft, args))) {
                    Ok(Ok(())) => Ok(()),
                    Ok(Err(HandlerFailure::ArgumentMismatch(expected))) => {
                        Err(ActionHandlerError::ArgumentMismatch {
                            action: action.clone(),
                            expected,
                        })
                    }
                    Ok(Err(HandlerFailure::Failed(source))) => Err(ActionHandlerError::Failed {
                        action: action.clone(),
                        source,
                    }),
                    Err(payload) => Err(ActionHandlerError::Panicked {
                        action: action.clone(),
                        message: panic_message(payload.as_ref()),
                    }),
                }
            }
        };

        // Whatever reached the draft is committed, failed or not
        let snapshot = {
            let mut current = self.current.lock();
            current.data = data;
            current.handlers = handlers;
            current.number += 1;
            log::debug!("Action `{}` committed generation {}", action, current.number);
            Snapshot {
                data: Arc::clone(&current.data),
                generation: current.number,
            }
        };

        if let Err(error) = outcome {
            self.reporter.report(&error);
        }

        self.publisher.send_replace(snapshot);
    }
}

impl<S: StoreData> DispatchTarget for Core<S> {
    fn dispatch(&self, message: DispatchMessage) {
        self.dispatcher.dispatch(message, |message| self.apply(message));
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Live store: the current generation plus the actions that advance it
///
/// Cloning is cheap and every clone refers to the same store.
pub struct Store<S> {
    core: Arc<Core<S>>,
    actions: Actions<S>,
}

impl<S> Clone for Store<S> {
    fn clone(&self) -> Self {
        Self {
            core: Arc::clone(&self.core),
            actions: self.actions.clone(),
        }
    }
}

impl<S: StoreData> Store<S> {
    pub(crate) fn from_spec(spec: &StoreSpec<S>) -> Result<Self, FluxError> {
        let table = spec.actions();
        if table.is_empty() {
            return Err(FluxError::Configuration);
        }

        let handlers: HandlerMap<S> = table
            .entries()
            .iter()
            .map(|entry| (entry.name, Arc::clone(&entry.handler)))
            .collect();
        let data = Arc::new(spec.instantiate());
        let initial = Snapshot {
            data: Arc::clone(&data),
            generation: 0,
        };
        let (publisher, _) = watch::channel(initial);

        let core = Arc::new(Core {
            current: Mutex::new(Generation {
                data,
                handlers: Arc::new(handlers),
                number: 0,
            }),
            dispatcher: Dispatcher::new(),
            publisher,
            reporter: spec.reporter(),
        });
        let target: Arc<dyn DispatchTarget> = core.clone();
        let actions = Actions::new(table, target);
        log::debug!("Created store with actions {:?}", actions);

        Ok(Self { core, actions })
    }

    pub fn snapshot(&self) -> Snapshot<S> {
        self.core.snapshot()
    }

    pub fn actions(&self) -> &Actions<S> {
        &self.actions
    }

    pub fn store_and_actions(&self) -> StoreAndActions<S> {
        (self.snapshot(), self.actions.clone())
    }

    pub fn generation(&self) -> u64 {
        self.core.current.lock().number
    }

    /// Receiver that observes every generation committed from now on
    pub fn subscribe(&self) -> watch::Receiver<Snapshot<S>> {
        self.core.publisher.subscribe()
    }
}

impl<S: fmt::Debug + StoreData> fmt::Debug for Store<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("snapshot", &self.snapshot())
            .field("actions", &self.actions)
            .finish()
    }
}

/// Create a store from a spec, a `FluxStore` value, or anything else convertible
///
/// Fails with [`FluxError::Configuration`] when the store spec registers no action.
pub fn create<S: StoreData>(spec: impl Into<StoreSpec<S>>) -> Result<Store<S>, FluxError> {
    Store::from_spec(&spec.into())
}
