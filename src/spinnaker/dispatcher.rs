//! Webhook dispatcher - fans one payload out to every registered handler

use super::webhook::IncomingWebhook;
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Something that reacts to a Spinnaker webhook
pub trait Handler: Send + Sync {
    /// Handler name (used in logs and dispatch results)
    fn name(&self) -> &str;

    /// Process one webhook
    fn handle(&self, incoming: &IncomingWebhook) -> Result<()>;
}

/// Per-handler dispatch result
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchResult {
    Handled,
    Failed(String),
}

impl DispatchResult {
    pub fn is_failed(&self) -> bool {
        matches!(self, DispatchResult::Failed(_))
    }
}

/// Holds the registered handlers and invokes each of them per webhook
pub struct Dispatcher {
    handlers: Vec<Arc<dyn Handler>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Register a handler
    pub fn register_handler(&mut self, handler: Arc<dyn Handler>) {
        info!(handler = handler.name(), "Registering webhook handler");
        self.handlers.push(handler);
    }

    /// Invoke every handler with the same payload.
    ///
    /// A failing handler is recorded and the remaining handlers still run.
    pub fn dispatch(&self, incoming: &IncomingWebhook) -> Vec<(String, DispatchResult)> {
        debug!(
            event_type = %incoming.details.event_type,
            handlers = self.handlers.len(),
            "Dispatching webhook"
        );

        self.handlers
            .iter()
            .map(|handler| {
                let name = handler.name().to_string();
                let result = match handler.handle(incoming) {
                    Ok(()) => DispatchResult::Handled,
                    Err(e) => {
                        let message = e.to_string();
                        warn!(handler = %name, error = %message, "Webhook handler failed");
                        DispatchResult::Failed(message)
                    }
                };
                (name, result)
            })
            .collect()
    }

    pub fn handlers(&self) -> &[Arc<dyn Handler>] {
        &self.handlers
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    pub fn handler_names(&self) -> Vec<&str> {
        self.handlers.iter().map(|h| h.name()).collect()
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts calls and optionally fails every one
    struct MockHandler {
        name: String,
        fail: bool,
        calls: AtomicUsize,
    }

    impl MockHandler {
        fn new(name: &str, fail: bool) -> Self {
            Self {
                name: name.to_string(),
                fail,
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Handler for MockHandler {
        fn name(&self) -> &str {
            &self.name
        }

        fn handle(&self, _incoming: &IncomingWebhook) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                anyhow::bail!("boom");
            }
            Ok(())
        }
    }

    #[test]
    fn test_dispatcher_register_handler() {
        let mut dispatcher = Dispatcher::new();
        assert_eq!(dispatcher.handler_count(), 0);

        dispatcher.register_handler(Arc::new(MockHandler::new("first", false)));
        assert_eq!(dispatcher.handler_count(), 1);
        assert_eq!(dispatcher.handler_names(), vec!["first"]);
    }

    #[test]
    fn test_dispatch_continues_after_failure() {
        let failing = Arc::new(MockHandler::new("failing", true));
        let healthy = Arc::new(MockHandler::new("healthy", false));

        let mut dispatcher = Dispatcher::new();
        dispatcher.register_handler(failing.clone());
        dispatcher.register_handler(healthy.clone());

        let results = dispatcher.dispatch(&IncomingWebhook::default());

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0, "failing");
        assert_eq!(results[0].1, DispatchResult::Failed("boom".to_string()));
        assert_eq!(results[1], ("healthy".to_string(), DispatchResult::Handled));
        assert_eq!(failing.call_count(), 1);
        assert_eq!(healthy.call_count(), 1);
    }

    #[test]
    fn test_dispatch_without_handlers() {
        let dispatcher = Dispatcher::default();
        assert!(dispatcher.dispatch(&IncomingWebhook::default()).is_empty());
    }
}
