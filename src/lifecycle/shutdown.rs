//! Shutdown handoff between the server task and the main path.

use tokio::sync::oneshot;

use crate::http::AdapterError;

/// Terminal outcome of the adapter server.
pub type ShutdownOutcome = Result<(), AdapterError>;

/// Create the single-slot handoff.
pub fn channel() -> (ShutdownSender, ShutdownReceiver) {
    let (tx, rx) = oneshot::channel();
    (ShutdownSender { tx: Some(tx) }, ShutdownReceiver { rx })
}

/// Write side, owned by the server run loop.
///
/// Reporting consumes the sender, so at most one value is ever written. A
/// sender dropped without reporting (early return, panic unwind) writes
/// [`AdapterError::Aborted`] instead, so the receiver is always woken.
#[derive(Debug)]
pub struct ShutdownSender {
    tx: Option<oneshot::Sender<ShutdownOutcome>>,
}

impl ShutdownSender {
    /// Report the terminal outcome.
    pub fn report(mut self, outcome: ShutdownOutcome) {
        if let Some(tx) = self.tx.take() {
            // receiver gone means nobody is waiting any more
            let _ = tx.send(outcome);
        }
    }
}

impl Drop for ShutdownSender {
    fn drop(&mut self) {
        if let Some(tx) = self.tx.take() {
            tracing::error!("Adapter server stopped without reporting an outcome");
            let _ = tx.send(Err(AdapterError::Aborted));
        }
    }
}

/// Read side, owned by the orchestrator.
#[derive(Debug)]
pub struct ShutdownReceiver {
    rx: oneshot::Receiver<ShutdownOutcome>,
}

impl ShutdownReceiver {
    /// Block until the server reports. Consumes the receiver.
    pub async fn wait(self) -> ShutdownOutcome {
        // The sender's Drop always writes, so a closed channel cannot occur in
        // practice; treat it like an abort anyway.
        self.rx.await.unwrap_or(Err(AdapterError::Aborted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn clean_report_is_received() {
        let (tx, rx) = channel();
        tokio::spawn(async move { tx.report(Ok(())) });
        assert!(rx.wait().await.is_ok());
    }

    #[tokio::test]
    async fn error_report_is_received() {
        let (tx, rx) = channel();
        tx.report(Err(AdapterError::Serve(std::io::Error::other("listener closed"))));
        assert!(matches!(rx.wait().await, Err(AdapterError::Serve(_))));
    }

    #[tokio::test]
    async fn dropped_sender_reports_abort() {
        let (tx, rx) = channel();
        drop(tx);
        assert!(matches!(rx.wait().await, Err(AdapterError::Aborted)));
    }

    #[tokio::test]
    async fn panicking_task_still_wakes_receiver() {
        let (tx, rx) = channel();
        let task = tokio::spawn(async move {
            let _held = tx;
            panic!("server blew up");
        });
        let outcome = tokio::time::timeout(Duration::from_secs(5), rx.wait())
            .await
            .expect("receiver must be woken");
        assert!(matches!(outcome, Err(AdapterError::Aborted)));
        assert!(task.await.is_err());
    }

    #[test]
    fn report_after_receiver_dropped_is_harmless() {
        let (tx, rx) = channel();
        drop(rx);
        tx.report(Ok(()));
    }
}
