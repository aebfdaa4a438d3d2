//! Deployment provisioning scheduler.
//!
//! Provisioning is simulated: a deploy request writes `deploying`
//! synchronously and schedules a delayed transition to `running`. The
//! scheduler keeps a registry of pending transitions so that stop and delete
//! requests can cancel them, and the delayed write is a compare-and-set
//! (`deploying -> running`) so a stop that lands before the timer fires wins
//! deterministically. On startup [`LifecycleScheduler::recover`] re-arms a
//! transition for every record left in `deploying` by a previous process.

use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::db::errors::Result;
use crate::db::models::deployments::{Deployment, DeploymentPatch, DeploymentStatus};
use crate::db::store::Storage;
use crate::types::{abbrev_uuid, DeploymentId};

/// A scheduled transition awaiting its timer. The generation distinguishes
/// registrations for the same deployment, so a fired timer only cleans up
/// its own entry and never one from a later deploy request.
struct PendingTransition {
    generation: u64,
    token: CancellationToken,
}

pub struct LifecycleScheduler {
    storage: Arc<dyn Storage>,
    provisioning_delay: Duration,
    pending: DashMap<DeploymentId, PendingTransition>,
    next_generation: AtomicU64,
    shutdown: CancellationToken,
}

impl LifecycleScheduler {
    pub fn new(storage: Arc<dyn Storage>, provisioning_delay: Duration, shutdown: CancellationToken) -> Self {
        Self {
            storage,
            provisioning_delay,
            pending: DashMap::new(),
            next_generation: AtomicU64::new(0),
            shutdown,
        }
    }

    /// Move a deployment to `deploying` and schedule the delayed transition
    /// to `running`. Returns `None` if the deployment does not exist. The
    /// caller gets the `deploying` record back immediately; the `running`
    /// write happens in the background.
    #[instrument(skip(self), fields(deployment = %abbrev_uuid(&id)))]
    pub async fn deploy(self: &Arc<Self>, id: DeploymentId) -> Result<Option<Deployment>> {
        let Some(updated) = self
            .storage
            .update_deployment(id, &DeploymentPatch::status(DeploymentStatus::Deploying))
            .await?
        else {
            return Ok(None);
        };

        self.schedule_running(id);
        Ok(Some(updated))
    }

    /// Cancel any pending transition and move the deployment to `stopped`.
    /// Returns `None` if the deployment does not exist.
    #[instrument(skip(self), fields(deployment = %abbrev_uuid(&id)))]
    pub async fn stop(&self, id: DeploymentId) -> Result<Option<Deployment>> {
        self.cancel_pending(id);
        self.storage
            .update_deployment(id, &DeploymentPatch::status(DeploymentStatus::Stopped))
            .await
    }

    /// Cancel any pending transition for a deployment that is about to be
    /// deleted.
    pub fn cancel_pending(&self, id: DeploymentId) {
        if let Some((_, entry)) = self.pending.remove(&id) {
            debug!("Cancelled pending transition for deployment {}", abbrev_uuid(&id));
            entry.token.cancel();
        }
    }

    /// Re-arm transitions for deployments left in `deploying` by a previous
    /// process. Called once at startup.
    #[instrument(skip(self))]
    pub async fn recover(self: &Arc<Self>) -> Result<()> {
        let stranded = self.storage.deployments_with_status(DeploymentStatus::Deploying).await?;
        if stranded.is_empty() {
            return Ok(());
        }
        info!("Rescheduling {} in-flight deployment transition(s)", stranded.len());
        for deployment in stranded {
            self.schedule_running(deployment.id);
        }
        Ok(())
    }

    /// Number of transitions currently pending.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    fn schedule_running(self: &Arc<Self>, id: DeploymentId) {
        // A repeated deploy request replaces the previous timer
        self.cancel_pending(id);

        let token = self.shutdown.child_token();
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        self.pending.insert(
            id,
            PendingTransition {
                generation,
                token: token.clone(),
            },
        );

        let scheduler = Arc::clone(self);
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    debug!("Pending transition for deployment {} cancelled", abbrev_uuid(&id));
                    return;
                }
                _ = tokio::time::sleep(scheduler.provisioning_delay) => {}
            }

            // Only clean up this task's own registration; a re-deploy may
            // have replaced it while the timer was elapsing
            scheduler.pending.remove_if(&id, |_, entry| entry.generation == generation);
            match scheduler
                .storage
                .transition_deployment(id, DeploymentStatus::Deploying, DeploymentStatus::Running)
                .await
            {
                Ok(Some(_)) => {
                    info!("Deployment {} status updated to running", abbrev_uuid(&id));
                }
                Ok(None) => {
                    // Deleted or stopped in the interim; nothing to do
                    debug!("Deployment {} no longer deploying, transition skipped", abbrev_uuid(&id));
                }
                Err(e) => {
                    // The originating request has long since completed, so
                    // the failure can only be logged
                    warn!("Failed to mark deployment {} as running: {:#}", abbrev_uuid(&id), e);
                }
            }
        });
    }
}
