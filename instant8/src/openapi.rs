//! OpenAPI document for the HTTP API.

use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

use crate::api::{handlers, models};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Instant8 API",
        description = "Backend for the Instant8 marketing site: deployment management, cloud provider connections, and user accounts."
    ),
    paths(
        handlers::auth::register,
        handlers::auth::login,
        handlers::users::get_profile,
        handlers::deployments::create_deployment,
        handlers::deployments::list_deployments,
        handlers::deployments::get_deployment,
        handlers::deployments::update_deployment,
        handlers::deployments::delete_deployment,
        handlers::deployments::deploy_deployment,
        handlers::deployments::stop_deployment,
        handlers::cloud_providers::list_cloud_providers,
        handlers::cloud_providers::update_credentials,
        handlers::user_settings::get_user_settings,
        handlers::user_settings::update_user_settings,
        handlers::dashboard::get_dashboard_stats,
        handlers::pricing::list_pricing_tiers,
    ),
    components(schemas(
        models::auth::RegisterRequest,
        models::auth::LoginRequest,
        models::auth::AuthResponse,
        models::users::UserResponse,
        models::deployments::DeploymentCreateRequest,
        models::deployments::DeploymentConfigOverrides,
        models::deployments::DeploymentCreateResponse,
        models::deployments::DeploymentUpdateRequest,
        models::deployments::DeploymentResponse,
        models::cloud_providers::CloudProviderResponse,
        models::cloud_providers::CredentialsUpdateRequest,
        models::user_settings::UserSettingsResponse,
        models::user_settings::UserSettingsUpdateRequest,
        models::dashboard::DashboardStats,
        models::dashboard::RecentDeployment,
        models::pricing::PricingTier,
        crate::db::models::deployments::DeploymentStatus,
        crate::db::models::deployments::DeploymentConfig,
        crate::db::models::deployments::CostEstimate,
        crate::db::models::deployments::CostBreakdown,
        crate::db::models::cloud_providers::ProviderKind,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Registration and login"),
        (name = "users", description = "User profiles"),
        (name = "deployments", description = "Deployment CRUD and lifecycle"),
        (name = "cloud-providers", description = "Cloud provider connections"),
        (name = "user-settings", description = "Per-user settings"),
        (name = "dashboard", description = "Aggregate statistics"),
        (name = "pricing", description = "Published pricing tiers"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).bearer_format("JWT").build()),
            );
        }
    }
}
