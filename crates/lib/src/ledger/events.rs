//! Notifications published by the ledger after a successful commit.

use std::sync::{Arc, Mutex, mpsc};

use crate::{
    Result,
    ids::NodeId,
    model::{Action, Node},
};

/// Something observable happened in the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerEvent {
    /// An action was persisted for the first time.
    ActionCreated(Action),
    /// An action was canceled and its effects reversed.
    ActionCanceled(Action),
    /// An action inside the grace window was removed outright.
    ActionDeleted(Action),
    /// A node received its first revision.
    NodeCreated {
        node: Node,
        action: Option<Action>,
    },
    /// A node's active revision changed.
    NodeEdited {
        node: Node,
        action: Option<Action>,
    },
}

impl LedgerEvent {
    /// Short name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            LedgerEvent::ActionCreated(_) => "action_created",
            LedgerEvent::ActionCanceled(_) => "action_canceled",
            LedgerEvent::ActionDeleted(_) => "action_deleted",
            LedgerEvent::NodeCreated { .. } => "node_created",
            LedgerEvent::NodeEdited { .. } => "node_edited",
        }
    }

    /// The node the event concerns, if any.
    pub fn node_id(&self) -> Option<&NodeId> {
        match self {
            LedgerEvent::ActionCreated(a)
            | LedgerEvent::ActionCanceled(a)
            | LedgerEvent::ActionDeleted(a) => a.node.as_ref(),
            LedgerEvent::NodeCreated { node, .. } | LedgerEvent::NodeEdited { node, .. } => {
                Some(&node.id)
            }
        }
    }
}

/// Callback invoked for every published event.
pub type EventCallback = Arc<dyn Fn(&LedgerEvent) -> Result<()> + Send + Sync>;

/// Subscriber list owned by a ledger.
#[derive(Default)]
pub struct EventBus {
    callbacks: Mutex<Vec<EventCallback>>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field(
                "callbacks",
                &format!("<{} callbacks>", self.callbacks.lock().unwrap().len()),
            )
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a callback for every future event.
    pub fn subscribe<F>(&self, callback: F)
    where
        F: Fn(&LedgerEvent) -> Result<()> + Send + Sync + 'static,
    {
        self.callbacks.lock().unwrap().push(Arc::new(callback));
    }

    /// Registers a channel that receives a copy of every future event.
    ///
    /// Dropping the receiver silently stops delivery.
    pub fn subscribe_channel(&self) -> mpsc::Receiver<LedgerEvent> {
        let (sender, receiver) = mpsc::channel();
        self.subscribe(move |event| {
            let _ = sender.send(event.clone());
            Ok(())
        });
        receiver
    }

    /// Delivers events to every subscriber in registration order.
    ///
    /// A failing subscriber is logged and skipped; it never fails the
    /// operation that produced the event.
    pub fn publish(&self, events: &[LedgerEvent]) {
        if events.is_empty() {
            return;
        }
        // Clone the callbacks to avoid holding the lock while executing them.
        let callbacks = self.callbacks.lock().unwrap().clone();
        for event in events {
            for callback in &callbacks {
                if let Err(e) = callback(event) {
                    tracing::error!(
                        event = event.kind(),
                        node = ?event.node_id(),
                        "Event subscriber failed: {}", e
                    );
                }
            }
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.callbacks.lock().unwrap().len()
    }
}
