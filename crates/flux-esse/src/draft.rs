use crate::spec::Handler;
use std::collections::HashMap;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

/// Handlers that are still present on a store generation
pub(crate) type HandlerMap<S> = HashMap<&'static str, Handler<S>>;

/// Mutable view of the next store generation, handed to an action handler
///
/// Reading goes straight to the shared data. The first mutable access copies the
/// data out of the previous generation, so snapshots taken earlier never observe
/// the change and handlers that only read cost nothing.
pub struct Draft<'a, S> {
    data: &'a mut Arc<S>,
    handlers: &'a mut Arc<HandlerMap<S>>,
}

impl<'a, S> Draft<'a, S> {
    pub(crate) fn new(data: &'a mut Arc<S>, handlers: &'a mut Arc<HandlerMap<S>>) -> Self {
        Self { data, handlers }
    }

    /// Whether the live store still carries a handler for `name`
    pub fn has_action(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Remove the handler for `name` from the live store
    ///
    /// The action stays in the store's `Actions`, but dispatching it from the next
    /// generation on reports `ActionHandlerError::Missing`.
    pub fn remove_action(&mut self, name: &str) -> bool {
        if !self.handlers.contains_key(name) {
            return false;
        }
        Arc::make_mut(self.handlers).remove(name).is_some()
    }
}

impl<S> Deref for Draft<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.data.as_ref()
    }
}

impl<S: Clone> DerefMut for Draft<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        Arc::make_mut(self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Text {
        value: String,
    }

    #[test]
    fn test_read_does_not_copy() {
        let previous = Arc::new(Text {
            value: "a".to_string(),
        });
        let mut data = Arc::clone(&previous);
        let mut handlers = Arc::new(HandlerMap::new());
        let draft = Draft::new(&mut data, &mut handlers);
        assert_eq!(draft.value, "a");
        drop(draft);
        assert!(Arc::ptr_eq(&previous, &data));
    }

    #[test]
    fn test_write_leaves_previous_untouched() {
        let previous = Arc::new(Text {
            value: "a".to_string(),
        });
        let mut data = Arc::clone(&previous);
        let mut handlers = Arc::new(HandlerMap::new());
        let mut draft = Draft::new(&mut data, &mut handlers);
        draft.value.push('b');
        assert_eq!(previous.value, "a");
        assert_eq!(data.value, "ab");
    }

    #[test]
    fn test_remove_unknown_action() {
        let mut data = Arc::new(Text {
            value: String::new(),
        });
        let mut handlers = Arc::new(HandlerMap::new());
        let mut draft = Draft::new(&mut data, &mut handlers);
        assert!(!draft.has_action("missing"));
        assert!(!draft.remove_action("missing"));
    }
}
