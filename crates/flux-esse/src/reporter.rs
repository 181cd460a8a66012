use crate::error::ActionHandlerError;

/// Diagnostic channel for failed dispatches
///
/// Dispatch failures are never returned to the code that invoked the action.
/// They are handed to the store's reporter instead.
pub trait ErrorReporter: Send + Sync {
    fn report(&self, error: &ActionHandlerError);
}

/// LogReporter - writes every failure to the `log` facade at error level
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl LogReporter {
    pub fn new() -> Self {
        Self
    }
}

impl ErrorReporter for LogReporter {
    fn report(&self, error: &ActionHandlerError) {
        log::error!("Error in action `{}`: {}", error.action(), error);
    }
}

impl<F> ErrorReporter for F
where
    F: Fn(&ActionHandlerError) + Send + Sync,
{
    fn report(&self, error: &ActionHandlerError) {
        self(error)
    }
}
