// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Tokio-backed UI executor.
//
// On platforms with a real event loop the executor wraps the platform's
// run-on-main-thread primitive. Headless and test runs use this one: a
// dedicated task draining an unbounded queue, which preserves the two
// properties the bridge depends on — jobs run one at a time, in submission
// order.

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use gangway_bridge::transport::{UiExecutor, UiJob};

/// Single-consumer job queue standing in for the UI thread.
pub struct TokioUiExecutor {
    tx: mpsc::UnboundedSender<UiJob>,
}

impl TokioUiExecutor {
    /// Spawn the consumer task on the current runtime.
    pub fn spawn() -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<UiJob>();

        tokio::spawn(async move {
            while let Some(job) = rx.recv().await {
                job();
            }
            debug!("ui executor queue closed");
        });

        Self { tx }
    }

    /// Wait until every job submitted before this call has run.
    ///
    /// Test helper: submits a marker job and awaits it, relying on FIFO
    /// execution.
    pub async fn drain(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        self.submit(Box::new(move || {
            let _ = done_tx.send(());
        }));
        let _ = done_rx.await;
    }
}

impl UiExecutor for TokioUiExecutor {
    fn submit(&self, job: UiJob) {
        if self.tx.send(job).is_err() {
            warn!("ui executor gone, job dropped");
        }
    }
}
