//! Signature expiry sweeper
//!
//! Periodically moves overdue pending workflows to `expired` and notifies
//! their requesters.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;

use crate::application::SignatureService;

/// Background task expiring overdue signature workflows
pub struct ExpirySweeper {
    signatures: Arc<SignatureService>,
    period: Duration,
}

impl ExpirySweeper {
    pub fn new(signatures: Arc<SignatureService>, period: Duration) -> Self {
        Self { signatures, period }
    }

    /// Start the sweeper (runs in background)
    pub fn start(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }

    async fn run(self) {
        tracing::info!("Expiry sweeper started (interval: {:?})", self.period);

        let mut ticker = interval(self.period);
        // Skip the first immediate tick
        ticker.tick().await;

        loop {
            ticker.tick().await;
            self.sweep_once().await;
        }
    }

    /// One pass; failures are logged and retried on the next tick
    pub async fn sweep_once(&self) -> usize {
        match self.signatures.expire_due().await {
            Ok(expired) => {
                if !expired.is_empty() {
                    tracing::info!("Expiry sweep: {} workflow(s) expired", expired.len());
                }
                expired.len()
            }
            Err(e) => {
                tracing::warn!("Expiry sweep failed: {}", e);
                0
            }
        }
    }
}

/// Start the sweeper unless `interval_secs` is 0
pub fn maybe_start_sweeper(
    signatures: Arc<SignatureService>,
    interval_secs: u64,
) -> Option<tokio::task::JoinHandle<()>> {
    if interval_secs == 0 {
        return None;
    }
    Some(ExpirySweeper::new(signatures, Duration::from_secs(interval_secs)).start())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::Fixture;
    use bureau::domain::{NewDocument, NewSignatureStep};
    use bureau::WorkflowStatus;

    #[tokio::test]
    async fn test_sweep_expires_overdue_workflows() {
        let fx = Fixture::new();
        let doc = fx
            .documents()
            .create(NewDocument::new("NDA", "application/pdf", 2048))
            .await
            .unwrap();
        let signatures = Arc::new(fx.signatures());
        let workflow = signatures
            .create(doc.id, "NDA".to_string(), "legal@example.com".to_string(), None)
            .await
            .unwrap();
        signatures
            .add_step(workflow.id, NewSignatureStep::new(1, "Ana", "ana@example.com"))
            .await
            .unwrap();
        signatures.start(workflow.id).await.unwrap();

        let sweeper = ExpirySweeper::new(signatures.clone(), Duration::from_secs(60));
        assert_eq!(sweeper.sweep_once().await, 0);

        fx.clock.advance(chrono::Duration::days(fx.config.signature_expiry_days + 1));
        assert_eq!(sweeper.sweep_once().await, 1);
        assert_eq!(sweeper.sweep_once().await, 0);

        let stored = signatures.get_by_id(workflow.id).await.unwrap().unwrap();
        assert_eq!(stored.status, WorkflowStatus::Expired);
    }

    #[tokio::test]
    async fn test_zero_interval_disables_sweeper() {
        let fx = Fixture::new();
        assert!(maybe_start_sweeper(Arc::new(fx.signatures()), 0).is_none());
    }
}
