use boardtalk_core::event::CommentEventKind;
use boardtalk_service::EventBus;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// A push event that passed the active-task filter, ready for the UI tick
/// loop to turn into a notification and a reload.
///
/// Carries its task id: a notice enqueued just before a task switch is still
/// in the channel afterwards, and the consumer drops it by re-checking the id
/// against whatever task is active when it drains.
#[derive(Debug, Clone)]
pub struct SyncNotice {
    pub task_id: String,
    pub kind: CommentEventKind,
    pub message: String,
}

/// Task-scoped push subscription.
///
/// While a thread view is active, one forward task drains the shared bus,
/// drops events for other tasks and pushes the rest into an unbounded
/// channel the UI drains between frames. Switching tasks (or leaving the
/// thread view) aborts the forward task before subscribing again, so stale
/// handlers never accumulate and cross-task events never leak through.
pub struct SyncController {
    bus: EventBus,
    tx: mpsc::UnboundedSender<SyncNotice>,
    forward: Option<JoinHandle<()>>,
}

impl SyncController {
    pub fn new(bus: EventBus) -> (Self, mpsc::UnboundedReceiver<SyncNotice>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                bus,
                tx,
                forward: None,
            },
            rx,
        )
    }

    /// Subscribe for one task, tearing down any previous subscription first.
    pub fn activate(&mut self, task_id: &str) {
        self.deactivate();
        let mut events = self.bus.subscribe();
        let tx = self.tx.clone();
        let task_id = task_id.to_string();
        self.forward = Some(tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) if event.task_id == task_id => {
                        let notice = SyncNotice {
                            task_id: event.task_id.clone(),
                            kind: event.kind,
                            message: event.notice(),
                        };
                        if tx.send(notice).is_err() {
                            break;
                        }
                    }
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        // Best-effort bus; the reload after the next event
                        // re-derives everything anyway.
                        tracing::warn!(skipped, "push subscription lagged behind the bus");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        }));
    }

    pub fn deactivate(&mut self) {
        if let Some(forward) = self.forward.take() {
            forward.abort();
        }
    }

    pub fn is_active(&self) -> bool {
        self.forward.is_some()
    }
}

impl Drop for SyncController {
    fn drop(&mut self) {
        self.deactivate();
    }
}
