//! One-way channel carrying series picks from the navigator to the orchestrator.

use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{debug, warn};

const SELECTION_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesSelected {
    pub series_id: String,
}

#[derive(Debug, Clone)]
pub struct SelectionPublisher {
    tx: broadcast::Sender<SeriesSelected>,
}

pub struct SelectionSubscriber {
    rx: broadcast::Receiver<SeriesSelected>,
}

pub fn selection_channel() -> (SelectionPublisher, SelectionSubscriber) {
    let (tx, rx) = broadcast::channel(SELECTION_CHANNEL_CAPACITY);
    (SelectionPublisher { tx }, SelectionSubscriber { rx })
}

impl SelectionPublisher {
    pub fn publish(&self, series_id: impl Into<String>) {
        let event = SeriesSelected {
            series_id: series_id.into(),
        };
        debug!(series_id = %event.series_id, "selection: published");
        // No subscriber means nobody is waiting on picks; nothing to deliver.
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> SelectionSubscriber {
        SelectionSubscriber {
            rx: self.tx.subscribe(),
        }
    }
}

impl SelectionSubscriber {
    /// Drains every event queued so far without waiting.
    pub fn drain(&mut self) -> Vec<SeriesSelected> {
        let mut events = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(event) => events.push(event),
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "selection: subscriber lagged, older picks dropped");
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
        events
    }

    pub async fn recv(&mut self) -> Option<SeriesSelected> {
        loop {
            match self.rx.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "selection: subscriber lagged, older picks dropped");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}
