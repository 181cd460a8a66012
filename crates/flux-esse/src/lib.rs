//! # flux-esse
//!
//! A small snapshot store with named actions, plus scoped contexts that let
//! descendants reach a store without it being passed down explicitly.
//!
//! ## Store and actions
//!
//! A store is described by a [`StoreSpec`]: its initial data and the explicit
//! list of action handlers allowed to change it. [`create`] turns a spec into a
//! [`Store`], which hands out immutable [`Snapshot`]s and a frozen [`Actions`]
//! map. Invoking an action dispatches it through a serialized queue; the handler
//! mutates a copy-on-write [`Draft`] and the result becomes the next snapshot.
//!
//! Handlers are expected not to fail. When one does (an `Err`, a panic, a handler
//! removed at runtime, mismatching arguments) the failure goes to the store's
//! [`ErrorReporter`] and whatever the handler already wrote is kept.
//!
//! ```
//! use flux_esse::{create, ActionTable, Draft, FluxStore};
//!
//! #[derive(Clone, Default)]
//! struct Form {
//!     text: String,
//! }
//!
//! impl FluxStore for Form {
//!     fn register(actions: &mut ActionTable<Self>) {
//!         actions.add("change", |form: &mut Draft<Self>, text: String| form.text = text);
//!     }
//! }
//!
//! # fn main() -> Result<(), flux_esse::FluxError> {
//! let store = create(Form::default())?;
//! let change = store.actions().get::<String>("change").unwrap();
//! change.call("hi".to_string());
//! assert_eq!(store.snapshot().text, "hi");
//! # Ok(())
//! # }
//! ```
//!
//! ## Contexts
//!
//! See [`create_context`] and [`use_context`].

pub mod actions;
pub mod context;
mod dispatcher;
pub mod draft;
pub mod error;
pub mod reporter;
pub mod spec;
pub mod store;

// Re-export commonly used types
pub use actions::{Action, Actions};
pub use context::{
    create_context, create_context_with, use_context, Cleanup, Consumer, Env, FluxContext,
    Mounted, Provider, ScopeId, DEFAULT_DISPLAY_NAME,
};
pub use draft::Draft;
pub use error::{ActionHandlerError, FluxError};
pub use reporter::{ErrorReporter, LogReporter};
pub use spec::{ActionTable, FluxStore, StoreData, StoreSpec};
pub use store::{create, Snapshot, Store, StoreAndActions};
