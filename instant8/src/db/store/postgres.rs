//! Postgres-backed storage.
//!
//! Queries use the runtime sqlx API. Structured fields (`providers`,
//! `config`, `cost_estimate`, `regions`) are stored as JSONB and decoded
//! through [`sqlx::types::Json`] wrappers on private row types; domain models
//! never carry the wrapper.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::db::errors::Result;
use crate::db::models::{
    cloud_providers::{CloudProvider, ProviderKind},
    deployments::{CostEstimate, Deployment, DeploymentConfig, DeploymentCreate, DeploymentPatch, DeploymentStatus},
    user_settings::{UserSettings, UserSettingsPatch},
    users::{User, UserCreate},
};
use crate::db::store::Storage;
use crate::types::{CloudProviderId, DeploymentId, UserId};

/// Storage backend over an external PostgreSQL database.
#[derive(Debug, Clone)]
pub struct PostgresStorage {
    pool: PgPool,
}

impl PostgresStorage {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[derive(sqlx::FromRow)]
struct DeploymentRow {
    id: DeploymentId,
    user_id: UserId,
    name: String,
    description: String,
    status: DeploymentStatus,
    providers: Json<Vec<ProviderKind>>,
    config: Json<DeploymentConfig>,
    cost_estimate: Json<CostEstimate>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<DeploymentRow> for Deployment {
    fn from(row: DeploymentRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            description: row.description,
            status: row.status,
            providers: row.providers.0,
            config: row.config.0,
            cost_estimate: row.cost_estimate.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CloudProviderRow {
    id: CloudProviderId,
    user_id: UserId,
    name: ProviderKind,
    enabled: bool,
    credentials: serde_json::Value,
    regions: Json<Vec<String>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CloudProviderRow> for CloudProvider {
    fn from(row: CloudProviderRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            enabled: row.enabled,
            credentials: row.credentials,
            regions: row.regions.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const DEPLOYMENT_COLUMNS: &str = "id, user_id, name, description, status, providers, config, cost_estimate, created_at, updated_at";
const PROVIDER_COLUMNS: &str = "id, user_id, name, enabled, credentials, regions, created_at, updated_at";

#[async_trait]
impl Storage for PostgresStorage {
    #[instrument(skip(self, request), fields(email = %request.email))]
    async fn create_user(&self, request: &UserCreate) -> Result<User> {
        let id = request.id.unwrap_or_else(Uuid::new_v4);
        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (id, email, username, password_hash)
             VALUES ($1, $2, $3, $4)
             RETURNING id, email, username, password_hash, is_active, subscription_tier, created_at",
        )
        .bind(id)
        .bind(&request.email)
        .bind(&request.username)
        .bind(&request.password_hash)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn user_by_id(&self, id: UserId) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, username, password_hash, is_active, subscription_tier, created_at
             FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn user_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, username, password_hash, is_active, subscription_tier, created_at
             FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    #[instrument(skip(self, request), fields(user_id = %request.user_id))]
    async fn create_deployment(&self, request: &DeploymentCreate) -> Result<Deployment> {
        let sql = format!(
            "INSERT INTO deployments (user_id, name, description, status, providers, config, cost_estimate)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {DEPLOYMENT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, DeploymentRow>(&sql)
            .bind(request.user_id)
            .bind(&request.name)
            .bind(&request.description)
            .bind(request.status)
            .bind(Json(&request.providers))
            .bind(Json(&request.config))
            .bind(Json(&request.cost_estimate))
            .fetch_one(&self.pool)
            .await?;
        Ok(row.into())
    }

    #[instrument(skip(self))]
    async fn deployment(&self, id: DeploymentId) -> Result<Option<Deployment>> {
        let sql = format!("SELECT {DEPLOYMENT_COLUMNS} FROM deployments WHERE id = $1");
        let row = sqlx::query_as::<_, DeploymentRow>(&sql).bind(id).fetch_optional(&self.pool).await?;
        Ok(row.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn deployments_for_user(&self, user_id: UserId) -> Result<Vec<Deployment>> {
        let sql = format!("SELECT {DEPLOYMENT_COLUMNS} FROM deployments WHERE user_id = $1 ORDER BY created_at DESC");
        let rows = sqlx::query_as::<_, DeploymentRow>(&sql).bind(user_id).fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn deployments_with_status(&self, status: DeploymentStatus) -> Result<Vec<Deployment>> {
        let sql = format!("SELECT {DEPLOYMENT_COLUMNS} FROM deployments WHERE status = $1");
        let rows = sqlx::query_as::<_, DeploymentRow>(&sql).bind(status).fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self, patch))]
    async fn update_deployment(&self, id: DeploymentId, patch: &DeploymentPatch) -> Result<Option<Deployment>> {
        let sql = format!(
            "UPDATE deployments SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                status = COALESCE($4, status),
                providers = COALESCE($5, providers),
                config = COALESCE($6, config),
                cost_estimate = COALESCE($7, cost_estimate),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {DEPLOYMENT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, DeploymentRow>(&sql)
            .bind(id)
            .bind(&patch.name)
            .bind(&patch.description)
            .bind(patch.status)
            .bind(patch.providers.as_ref().map(Json))
            .bind(patch.config.as_ref().map(Json))
            .bind(patch.cost_estimate.as_ref().map(Json))
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn transition_deployment(
        &self,
        id: DeploymentId,
        from: DeploymentStatus,
        to: DeploymentStatus,
    ) -> Result<Option<Deployment>> {
        let sql = format!(
            "UPDATE deployments SET status = $3, updated_at = NOW()
             WHERE id = $1 AND status = $2
             RETURNING {DEPLOYMENT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, DeploymentRow>(&sql)
            .bind(id)
            .bind(from)
            .bind(to)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn delete_deployment(&self, id: DeploymentId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM deployments WHERE id = $1").bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn cloud_providers_for_user(&self, user_id: UserId) -> Result<Vec<CloudProvider>> {
        let sql = format!("SELECT {PROVIDER_COLUMNS} FROM cloud_providers WHERE user_id = $1 ORDER BY name");
        let rows = sqlx::query_as::<_, CloudProviderRow>(&sql).bind(user_id).fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self, credentials))]
    async fn update_cloud_provider(
        &self,
        id: CloudProviderId,
        credentials: &serde_json::Value,
        enabled: Option<bool>,
    ) -> Result<Option<CloudProvider>> {
        let sql = format!(
            "UPDATE cloud_providers SET
                credentials = $2,
                enabled = COALESCE($3, enabled),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {PROVIDER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, CloudProviderRow>(&sql)
            .bind(id)
            .bind(credentials)
            .bind(enabled)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn user_settings(&self, user_id: UserId) -> Result<Option<UserSettings>> {
        let settings = sqlx::query_as::<_, UserSettings>(
            "SELECT id, user_id, theme, notifications_enabled, email_notifications,
                    budget_alert_threshold, default_provider, default_region, created_at, updated_at
             FROM user_settings WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(settings)
    }

    #[instrument(skip(self, patch))]
    async fn upsert_user_settings(&self, user_id: UserId, patch: &UserSettingsPatch) -> Result<UserSettings> {
        let settings = sqlx::query_as::<_, UserSettings>(
            "INSERT INTO user_settings
                (user_id, theme, notifications_enabled, email_notifications,
                 budget_alert_threshold, default_provider, default_region)
             VALUES ($1,
                     COALESCE($2, 'light'),
                     COALESCE($3, TRUE),
                     COALESCE($4, TRUE),
                     COALESCE($5, 100),
                     COALESCE($6, 'aws'),
                     COALESCE($7, 'us-east-1'))
             ON CONFLICT (user_id) DO UPDATE SET
                theme = COALESCE($2, user_settings.theme),
                notifications_enabled = COALESCE($3, user_settings.notifications_enabled),
                email_notifications = COALESCE($4, user_settings.email_notifications),
                budget_alert_threshold = COALESCE($5, user_settings.budget_alert_threshold),
                default_provider = COALESCE($6, user_settings.default_provider),
                default_region = COALESCE($7, user_settings.default_region),
                updated_at = NOW()
             RETURNING id, user_id, theme, notifications_enabled, email_notifications,
                       budget_alert_threshold, default_provider, default_region, created_at, updated_at",
        )
        .bind(user_id)
        .bind(&patch.theme)
        .bind(patch.notifications_enabled)
        .bind(patch.email_notifications)
        .bind(patch.budget_alert_threshold)
        .bind(patch.default_provider)
        .bind(&patch.default_region)
        .fetch_one(&self.pool)
        .await?;
        Ok(settings)
    }

    #[instrument(skip(self))]
    async fn ensure_user_defaults(&self, user_id: UserId) -> Result<()> {
        for provider in ProviderKind::ALL {
            sqlx::query(
                "INSERT INTO cloud_providers (user_id, name, credentials, regions)
                 VALUES ($1, $2, '{}', $3)
                 ON CONFLICT (user_id, name) DO NOTHING",
            )
            .bind(user_id)
            .bind(provider)
            .bind(Json(provider.default_regions()))
            .execute(&self.pool)
            .await?;
        }

        sqlx::query(
            "INSERT INTO user_settings (user_id)
             VALUES ($1)
             ON CONFLICT (user_id) DO NOTHING",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
