//! Serialized dispatch queue
//!
//! Every action invocation becomes a [`DispatchMessage`] and enters the queue.
//! Messages are applied strictly one at a time, each producing one new store
//! generation.
//!
//! This enables patterns like:
//! - a subscriber reacting to a snapshot by invoking another action
//! - actions invoked from timers or other threads
//!
//! A dispatch issued on the draining thread (re-entrant) only enqueues; it is
//! applied before the outermost dispatch returns. A dispatch from another thread
//! while a drain is running also only enqueues; the draining thread applies it.
//! No dispatch ever waits for another one to finish.

use crate::spec::Payload;
use parking_lot::{Mutex, ReentrantMutex};
use std::cell::Cell;
use std::collections::VecDeque;

/// Internal record of one action invocation
pub(crate) struct DispatchMessage {
    pub(crate) action: String,
    pub(crate) args: Payload,
}

impl std::fmt::Debug for DispatchMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchMessage")
            .field("action", &self.action)
            .finish_non_exhaustive()
    }
}

pub(crate) struct Dispatcher {
    queue: Mutex<VecDeque<DispatchMessage>>,
    draining: ReentrantMutex<Cell<bool>>,
}

impl Dispatcher {
    pub(crate) fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            draining: ReentrantMutex::new(Cell::new(false)),
        }
    }

    /// Enqueue `message` and drain the queue through `apply`
    pub(crate) fn dispatch(&self, message: DispatchMessage, mut apply: impl FnMut(DispatchMessage)) {
        self.queue.lock().push_back(message);

        loop {
            {
                let Some(draining) = self.draining.try_lock() else {
                    // Another thread is draining and will apply the message
                    return;
                };
                if draining.get() {
                    // Re-entrant call: the outer drain picks the message up
                    return;
                }

                draining.set(true);
                let _reset = DrainGuard(&draining);
                // The queue lock must not be held while applying, handlers may enqueue
                loop {
                    let next = self.queue.lock().pop_front();
                    match next {
                        Some(message) => apply(message),
                        None => break,
                    }
                }
            }

            // A sender that found the drain busy right before it ended relies on us
            if self.queue.lock().is_empty() {
                return;
            }
        }
    }

    #[cfg(test)]
    fn pending(&self) -> usize {
        self.queue.lock().len()
    }
}

/// Clears the draining flag even if `apply` unwinds
struct DrainGuard<'a>(&'a Cell<bool>);

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::{mpsc, Arc};
    use std::thread;
    use std::time::Duration;

    fn message(action: &str) -> DispatchMessage {
        DispatchMessage {
            action: action.to_string(),
            args: Box::new(()),
        }
    }

    #[test]
    fn test_applies_in_order() {
        let dispatcher = Dispatcher::new();
        let mut seen = Vec::new();
        dispatcher.dispatch(message("a"), |m| seen.push(m.action));
        dispatcher.dispatch(message("b"), |m| seen.push(m.action));
        assert_eq!(seen, vec!["a", "b"]);
        assert_eq!(dispatcher.pending(), 0);
    }

    #[test]
    fn test_reentrant_dispatch_is_queued() {
        let dispatcher = Arc::new(Dispatcher::new());
        let seen = Arc::new(Mutex::new(Vec::new()));

        let inner = Arc::clone(&dispatcher);
        let log = Arc::clone(&seen);
        dispatcher.dispatch(message("outer"), move |m| {
            log.lock().push(format!("start {}", m.action));
            if m.action == "outer" {
                let log = Arc::clone(&log);
                inner.dispatch(message("inner"), move |m| {
                    log.lock().push(format!("nested {}", m.action))
                });
            }
            log.lock().push(format!("end {}", m.action));
        });

        // The nested call only enqueued; the outer drain applied it afterwards
        assert_eq!(
            *seen.lock(),
            vec!["start outer", "end outer", "start inner", "end inner"]
        );
    }

    #[test]
    fn test_dispatch_from_other_thread_returns_while_draining() {
        let dispatcher = Arc::new(Dispatcher::new());
        let mut seen = Vec::new();

        let remote = Arc::clone(&dispatcher);
        dispatcher.dispatch(message("outer"), |m| {
            if m.action == "outer" {
                let remote = Arc::clone(&remote);
                let (done, finished) = mpsc::channel();
                thread::spawn(move || {
                    remote.dispatch(message("remote"), |_| unreachable!());
                    done.send(()).unwrap();
                });
                // Would time out if the remote dispatch waited for this drain
                let returned = finished.recv_timeout(Duration::from_secs(2)).is_ok();
                seen.push(format!("outer, remote returned: {}", returned));
            } else {
                seen.push(m.action);
            }
        });

        assert_eq!(seen, vec!["outer, remote returned: true", "remote"]);
        assert_eq!(dispatcher.pending(), 0);
    }
}
