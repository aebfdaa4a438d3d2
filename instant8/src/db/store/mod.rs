//! Storage backend trait and implementations.

mod memory;
mod postgres;

pub use memory::MemoryStorage;
pub use postgres::PostgresStorage;

use crate::db::errors::Result;
use crate::db::models::{
    cloud_providers::CloudProvider,
    deployments::{Deployment, DeploymentCreate, DeploymentPatch, DeploymentStatus},
    user_settings::{UserSettings, UserSettingsPatch},
    users::{User, UserCreate},
};
use crate::types::{CloudProviderId, DeploymentId, UserId};

/// Data-access interface implemented by every storage backend.
///
/// Not-found is represented as `Ok(None)` (or `Ok(false)` for deletes), never
/// as an error; the API layer decides how to surface it. Constraint
/// violations (duplicate email/username) surface as
/// [`crate::db::errors::DbError::UniqueViolation`] from both backends.
#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    // Users
    async fn create_user(&self, request: &UserCreate) -> Result<User>;
    async fn user_by_id(&self, id: UserId) -> Result<Option<User>>;
    async fn user_by_email(&self, email: &str) -> Result<Option<User>>;

    // Deployments
    async fn create_deployment(&self, request: &DeploymentCreate) -> Result<Deployment>;
    async fn deployment(&self, id: DeploymentId) -> Result<Option<Deployment>>;
    /// All deployments owned by `user_id`, most recent first.
    async fn deployments_for_user(&self, user_id: UserId) -> Result<Vec<Deployment>>;
    /// All deployments currently in `status`, regardless of owner. Used by
    /// the lifecycle scheduler to re-arm pending transitions after a restart.
    async fn deployments_with_status(&self, status: DeploymentStatus) -> Result<Vec<Deployment>>;
    /// Partial update. Fields absent from the patch keep their previous
    /// values; `updated_at` is bumped. Returns `None` for an unknown id.
    async fn update_deployment(&self, id: DeploymentId, patch: &DeploymentPatch) -> Result<Option<Deployment>>;
    /// Compare-and-set status transition: applies `from -> to` only if the
    /// record still has status `from`. Returns the updated record when the
    /// transition applied, `None` when the record is gone or the
    /// precondition no longer holds.
    async fn transition_deployment(
        &self,
        id: DeploymentId,
        from: DeploymentStatus,
        to: DeploymentStatus,
    ) -> Result<Option<Deployment>>;
    async fn delete_deployment(&self, id: DeploymentId) -> Result<bool>;

    // Cloud providers
    async fn cloud_providers_for_user(&self, user_id: UserId) -> Result<Vec<CloudProvider>>;
    /// Replace the opaque credentials blob (and optionally the enabled flag)
    /// for one provider record. Returns `None` for an unknown id.
    async fn update_cloud_provider(
        &self,
        id: CloudProviderId,
        credentials: &serde_json::Value,
        enabled: Option<bool>,
    ) -> Result<Option<CloudProvider>>;

    // User settings
    async fn user_settings(&self, user_id: UserId) -> Result<Option<UserSettings>>;
    /// Insert-or-patch: creates a record from the defaults plus the patch
    /// when none exists, otherwise applies the patch to the existing record.
    async fn upsert_user_settings(&self, user_id: UserId, patch: &UserSettingsPatch) -> Result<UserSettings>;

    /// Idempotently seed the per-user defaults: one record per supported
    /// cloud provider (with its canned region list) and a default settings
    /// row. Existing records are left untouched.
    async fn ensure_user_defaults(&self, user_id: UserId) -> Result<()>;
}
