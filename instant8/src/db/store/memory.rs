//! In-process storage backend.
//!
//! Used when the database is unreachable at startup or disabled by
//! configuration. Holds plain record vectors behind an async `RwLock`; the
//! behavioral contract (ordering, patch semantics, constraint violations,
//! compare-and-set transitions) matches the Postgres backend.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::db::errors::{DbError, Result};
use crate::db::models::{
    cloud_providers::{CloudProvider, ProviderKind},
    deployments::{Deployment, DeploymentCreate, DeploymentPatch, DeploymentStatus},
    user_settings::{UserSettings, UserSettingsPatch},
    users::{User, UserCreate},
};
use crate::db::store::Storage;
use crate::types::{CloudProviderId, DeploymentId, UserId};

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    deployments: Vec<Deployment>,
    cloud_providers: Vec<CloudProvider>,
    user_settings: Vec<UserSettings>,
}

/// Storage backend holding all records in process memory.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    tables: RwLock<Tables>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

fn unique_violation(table: &str, constraint: &str, message: String) -> DbError {
    DbError::UniqueViolation {
        constraint: Some(constraint.to_string()),
        table: Some(table.to_string()),
        message,
    }
}

fn apply_deployment_patch(deployment: &mut Deployment, patch: &DeploymentPatch) {
    if let Some(name) = &patch.name {
        deployment.name = name.clone();
    }
    if let Some(description) = &patch.description {
        deployment.description = description.clone();
    }
    if let Some(status) = patch.status {
        deployment.status = status;
    }
    if let Some(providers) = &patch.providers {
        deployment.providers = providers.clone();
    }
    if let Some(config) = &patch.config {
        deployment.config = config.clone();
    }
    if let Some(cost_estimate) = &patch.cost_estimate {
        deployment.cost_estimate = cost_estimate.clone();
    }
    deployment.updated_at = Utc::now();
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn create_user(&self, request: &UserCreate) -> Result<User> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.email == request.email) {
            return Err(unique_violation(
                "users",
                "users_email_key",
                format!("duplicate email {}", request.email),
            ));
        }
        if tables.users.iter().any(|u| u.username == request.username) {
            return Err(unique_violation(
                "users",
                "users_username_key",
                format!("duplicate username {}", request.username),
            ));
        }
        let user = User {
            id: request.id.unwrap_or_else(Uuid::new_v4),
            email: request.email.clone(),
            username: request.username.clone(),
            password_hash: request.password_hash.clone(),
            is_active: true,
            subscription_tier: "free".to_string(),
            created_at: Utc::now(),
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn user_by_id(&self, id: UserId) -> Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn create_deployment(&self, request: &DeploymentCreate) -> Result<Deployment> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let deployment = Deployment {
            id: Uuid::new_v4(),
            user_id: request.user_id,
            name: request.name.clone(),
            description: request.description.clone(),
            status: request.status,
            providers: request.providers.clone(),
            config: request.config.clone(),
            cost_estimate: request.cost_estimate.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.deployments.push(deployment.clone());
        Ok(deployment)
    }

    async fn deployment(&self, id: DeploymentId) -> Result<Option<Deployment>> {
        let tables = self.tables.read().await;
        Ok(tables.deployments.iter().find(|d| d.id == id).cloned())
    }

    async fn deployments_for_user(&self, user_id: UserId) -> Result<Vec<Deployment>> {
        let tables = self.tables.read().await;
        let mut deployments: Vec<Deployment> = tables.deployments.iter().filter(|d| d.user_id == user_id).cloned().collect();
        deployments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(deployments)
    }

    async fn deployments_with_status(&self, status: DeploymentStatus) -> Result<Vec<Deployment>> {
        let tables = self.tables.read().await;
        Ok(tables.deployments.iter().filter(|d| d.status == status).cloned().collect())
    }

    async fn update_deployment(&self, id: DeploymentId, patch: &DeploymentPatch) -> Result<Option<Deployment>> {
        let mut tables = self.tables.write().await;
        let Some(deployment) = tables.deployments.iter_mut().find(|d| d.id == id) else {
            return Ok(None);
        };
        apply_deployment_patch(deployment, patch);
        Ok(Some(deployment.clone()))
    }

    async fn transition_deployment(
        &self,
        id: DeploymentId,
        from: DeploymentStatus,
        to: DeploymentStatus,
    ) -> Result<Option<Deployment>> {
        let mut tables = self.tables.write().await;
        let Some(deployment) = tables.deployments.iter_mut().find(|d| d.id == id && d.status == from) else {
            return Ok(None);
        };
        deployment.status = to;
        deployment.updated_at = Utc::now();
        Ok(Some(deployment.clone()))
    }

    async fn delete_deployment(&self, id: DeploymentId) -> Result<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.deployments.len();
        tables.deployments.retain(|d| d.id != id);
        Ok(tables.deployments.len() < before)
    }

    async fn cloud_providers_for_user(&self, user_id: UserId) -> Result<Vec<CloudProvider>> {
        let tables = self.tables.read().await;
        let mut providers: Vec<CloudProvider> = tables.cloud_providers.iter().filter(|p| p.user_id == user_id).cloned().collect();
        providers.sort_by_key(|p| p.name.to_string());
        Ok(providers)
    }

    async fn update_cloud_provider(
        &self,
        id: CloudProviderId,
        credentials: &serde_json::Value,
        enabled: Option<bool>,
    ) -> Result<Option<CloudProvider>> {
        let mut tables = self.tables.write().await;
        let Some(provider) = tables.cloud_providers.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        provider.credentials = credentials.clone();
        if let Some(enabled) = enabled {
            provider.enabled = enabled;
        }
        provider.updated_at = Utc::now();
        Ok(Some(provider.clone()))
    }

    async fn user_settings(&self, user_id: UserId) -> Result<Option<UserSettings>> {
        let tables = self.tables.read().await;
        Ok(tables.user_settings.iter().find(|s| s.user_id == user_id).cloned())
    }

    async fn upsert_user_settings(&self, user_id: UserId, patch: &UserSettingsPatch) -> Result<UserSettings> {
        let mut tables = self.tables.write().await;
        let idx = match tables.user_settings.iter().position(|s| s.user_id == user_id) {
            Some(idx) => idx,
            None => {
                tables.user_settings.push(UserSettings::defaults_for(user_id));
                tables.user_settings.len() - 1
            }
        };
        let settings = &mut tables.user_settings[idx];
        if let Some(theme) = &patch.theme {
            settings.theme = theme.clone();
        }
        if let Some(notifications_enabled) = patch.notifications_enabled {
            settings.notifications_enabled = notifications_enabled;
        }
        if let Some(email_notifications) = patch.email_notifications {
            settings.email_notifications = email_notifications;
        }
        if let Some(budget_alert_threshold) = patch.budget_alert_threshold {
            settings.budget_alert_threshold = budget_alert_threshold;
        }
        if let Some(default_provider) = patch.default_provider {
            settings.default_provider = default_provider;
        }
        if let Some(default_region) = &patch.default_region {
            settings.default_region = default_region.clone();
        }
        settings.updated_at = Utc::now();
        Ok(settings.clone())
    }

    async fn ensure_user_defaults(&self, user_id: UserId) -> Result<()> {
        let mut tables = self.tables.write().await;
        for provider in ProviderKind::ALL {
            if tables.cloud_providers.iter().any(|p| p.user_id == user_id && p.name == provider) {
                continue;
            }
            let now = Utc::now();
            tables.cloud_providers.push(CloudProvider {
                id: Uuid::new_v4(),
                user_id,
                name: provider,
                enabled: true,
                credentials: serde_json::json!({}),
                regions: provider.default_regions(),
                created_at: now,
                updated_at: now,
            });
        }
        if !tables.user_settings.iter().any(|s| s.user_id == user_id) {
            tables.user_settings.push(UserSettings::defaults_for(user_id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::deployments::{CostBreakdown, CostEstimate, DeploymentConfig};

    fn sample_create(user_id: UserId, name: &str) -> DeploymentCreate {
        DeploymentCreate {
            user_id,
            name: name.to_string(),
            description: format!("{name} description"),
            status: DeploymentStatus::Configuring,
            providers: vec![ProviderKind::Aws],
            config: DeploymentConfig::default(),
            cost_estimate: CostEstimate {
                total: 42.0,
                breakdown: CostBreakdown {
                    compute: 20.0,
                    storage: 12.0,
                    network: 10.0,
                },
            },
        }
    }

    #[tokio::test]
    async fn test_create_then_read_deployment() {
        let store = MemoryStorage::new();
        let user_id = Uuid::new_v4();
        let created = store.create_deployment(&sample_create(user_id, "web server")).await.unwrap();

        let fetched = store.deployment(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "web server");
        assert_eq!(fetched.user_id, user_id);
        assert_eq!(fetched.status, DeploymentStatus::Configuring);
        assert_eq!(fetched.cost_estimate.total, 42.0);
    }

    #[tokio::test]
    async fn test_list_orders_newest_first() {
        let store = MemoryStorage::new();
        let user_id = Uuid::new_v4();
        for name in ["first", "second", "third"] {
            store.create_deployment(&sample_create(user_id, name)).await.unwrap();
            // Distinct created_at values so the ordering is deterministic
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        }

        let listed = store.deployments_for_user(user_id).await.unwrap();
        let names: Vec<&str> = listed.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["third", "second", "first"]);
    }

    #[tokio::test]
    async fn test_partial_patch_preserves_other_fields() {
        let store = MemoryStorage::new();
        let created = store.create_deployment(&sample_create(Uuid::new_v4(), "keep me")).await.unwrap();

        let updated = store
            .update_deployment(created.id, &DeploymentPatch::status(DeploymentStatus::Stopped))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.status, DeploymentStatus::Stopped);
        assert_eq!(updated.name, created.name);
        assert_eq!(updated.providers, created.providers);
        assert_eq!(updated.config, created.config);
        assert_eq!(updated.cost_estimate, created.cost_estimate);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn test_transition_requires_precondition() {
        let store = MemoryStorage::new();
        let created = store.create_deployment(&sample_create(Uuid::new_v4(), "racer")).await.unwrap();

        // Record is configuring, so deploying -> running must not apply
        let skipped = store
            .transition_deployment(created.id, DeploymentStatus::Deploying, DeploymentStatus::Running)
            .await
            .unwrap();
        assert!(skipped.is_none());
        assert_eq!(store.deployment(created.id).await.unwrap().unwrap().status, DeploymentStatus::Configuring);

        store
            .update_deployment(created.id, &DeploymentPatch::status(DeploymentStatus::Deploying))
            .await
            .unwrap();
        let applied = store
            .transition_deployment(created.id, DeploymentStatus::Deploying, DeploymentStatus::Running)
            .await
            .unwrap();
        assert_eq!(applied.unwrap().status, DeploymentStatus::Running);
    }

    #[tokio::test]
    async fn test_delete_returns_flag() {
        let store = MemoryStorage::new();
        let created = store.create_deployment(&sample_create(Uuid::new_v4(), "short lived")).await.unwrap();

        assert!(store.delete_deployment(created.id).await.unwrap());
        assert!(!store.delete_deployment(created.id).await.unwrap());
        assert!(store.deployment(created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_and_username_rejected() {
        let store = MemoryStorage::new();
        store
            .create_user(&UserCreate {
                id: None,
                email: "a@example.com".to_string(),
                username: "alice".to_string(),
                password_hash: None,
            })
            .await
            .unwrap();

        let dup_email = store
            .create_user(&UserCreate {
                id: None,
                email: "a@example.com".to_string(),
                username: "other".to_string(),
                password_hash: None,
            })
            .await;
        assert!(matches!(dup_email, Err(DbError::UniqueViolation { .. })));

        let dup_username = store
            .create_user(&UserCreate {
                id: None,
                email: "b@example.com".to_string(),
                username: "alice".to_string(),
                password_hash: None,
            })
            .await;
        assert!(matches!(dup_username, Err(DbError::UniqueViolation { .. })));
    }

    #[tokio::test]
    async fn test_user_defaults_are_idempotent() {
        let store = MemoryStorage::new();
        let user_id = Uuid::new_v4();
        store.ensure_user_defaults(user_id).await.unwrap();
        store.ensure_user_defaults(user_id).await.unwrap();

        let providers = store.cloud_providers_for_user(user_id).await.unwrap();
        assert_eq!(providers.len(), 3);
        let aws = providers.iter().find(|p| p.name == ProviderKind::Aws).unwrap();
        assert_eq!(aws.regions, vec!["us-east-1", "us-west-1", "eu-west-1"]);

        let settings = store.user_settings(user_id).await.unwrap().unwrap();
        assert_eq!(settings.theme, "light");
        assert_eq!(settings.default_provider, ProviderKind::Aws);
    }

    #[tokio::test]
    async fn test_settings_upsert_creates_then_patches() {
        let store = MemoryStorage::new();
        let user_id = Uuid::new_v4();

        let created = store
            .upsert_user_settings(
                user_id,
                &UserSettingsPatch {
                    theme: Some("dark".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(created.theme, "dark");
        // Untouched fields come from the defaults
        assert!(created.notifications_enabled);
        assert_eq!(created.budget_alert_threshold, 100.0);

        let patched = store
            .upsert_user_settings(
                user_id,
                &UserSettingsPatch {
                    budget_alert_threshold: Some(250.0),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(patched.theme, "dark");
        assert_eq!(patched.budget_alert_threshold, 250.0);
    }
}
