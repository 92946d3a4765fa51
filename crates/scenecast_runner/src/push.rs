use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Mutex;

use cast_logging::cast_debug;

use crate::record::PushEvent;

/// Delivery target for completion events.
pub trait PushSink: Send + Sync {
    fn deliver(&self, event: PushEvent);
}

/// Best-effort channel to whatever front end is currently attached.
///
/// Attaching replaces any previous attachment. Once the front end detaches
/// (or simply drops its receiver), deliveries fail; that is a normal,
/// expected outcome and is discarded silently. The durable store is the
/// guaranteed completion channel, the push only shaves latency.
#[derive(Default)]
pub struct PushChannel {
    tx: Mutex<Option<Sender<PushEvent>>>,
}

impl PushChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a front end, returning its event receiver.
    pub fn attach(&self) -> Receiver<PushEvent> {
        let (tx, rx) = channel();
        *self.tx.lock().expect("lock push sender") = Some(tx);
        rx
    }

    pub fn detach(&self) {
        self.tx.lock().expect("lock push sender").take();
    }
}

impl PushSink for PushChannel {
    fn deliver(&self, event: PushEvent) {
        let guard = self.tx.lock().expect("lock push sender");
        match guard.as_ref() {
            Some(tx) if tx.send(event).is_ok() => {}
            _ => cast_debug!("No front end attached; result stays in the store"),
        }
    }
}
