use tokio::sync::Notify;

/// Wake-up signal registered by the single consumer of a sequencer.
///
/// `signal` must be callable from any thread, non-blocking, and safe to fire
/// from inside the sequencer's critical section. Multiple signals between
/// consumer wake-ups coalesce into at most one pending wake-up; the consumer
/// compensates by draining until the queue is empty.
pub trait ConsumerSignal: Send + Sync {
    fn signal(&self);
}

/// `Notify` stores at most one permit, which gives exactly the coalescing
/// edge-trigger semantics the consumer contract asks for.
impl ConsumerSignal for Notify {
    fn signal(&self) {
        self.notify_one();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[tokio::test]
    async fn notify_coalesces_signals_into_one_permit() {
        let notify = Arc::new(Notify::new());
        let signal: Arc<dyn ConsumerSignal> = Arc::clone(&notify) as Arc<dyn ConsumerSignal>;

        signal.signal();
        signal.signal();
        signal.signal();

        // One permit is stored; the first wait completes immediately.
        notify.notified().await;

        // A second wait would block: verify no extra permit is pending.
        let pending = tokio::time::timeout(
            std::time::Duration::from_millis(20),
            notify.notified(),
        )
        .await;
        assert!(pending.is_err(), "signals must coalesce into one wake-up");
    }
}
