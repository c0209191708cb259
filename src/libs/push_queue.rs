use std::sync::Mutex;

use tracing::warn;

use crate::libs::models::PushPayload;

lazy_static::lazy_static! {
    static ref PUSH_QUEUE: Mutex<Vec<PushPayload>> = Mutex::new(Vec::new());
}

/// Hands a payload to the platform push transport. Best-effort only: a failed
/// hand-off is reported and the payload dropped, never surfaced to the
/// mutation that produced it.
pub fn enqueue_push(payload: PushPayload) {
    match PUSH_QUEUE.lock() {
        Ok(mut queue) => queue.push(payload),
        Err(_) => warn!("push queue poisoned, dropping payload"),
    }
}

/// Drains everything queued so far; called by the platform notification
/// layer.
pub fn drain_pending() -> Vec<PushPayload> {
    match PUSH_QUEUE.lock() {
        Ok(mut queue) => {
            let payloads = queue.clone();
            queue.clear();
            payloads
        }
        Err(_) => {
            warn!("push queue poisoned, nothing to drain");
            Vec::new()
        }
    }
}
