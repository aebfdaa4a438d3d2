//! Static pricing-tier catalog.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PricingTier {
    pub name: String,
    /// Monthly price in USD
    pub price: f64,
    /// `-1` means unlimited
    pub max_deployments: i64,
    /// `-1` means unlimited
    pub max_concurrent_instances: i64,
    pub support_level: String,
    pub features: Vec<String>,
}

/// The published subscription tiers. These are fixed marketing constants,
/// not stored state.
pub fn pricing_tiers() -> Vec<PricingTier> {
    vec![
        PricingTier {
            name: "Basic".to_string(),
            price: 44.0,
            max_deployments: 5,
            max_concurrent_instances: 1,
            support_level: "email".to_string(),
            features: vec![
                "Up to 5 deployments".to_string(),
                "Email support".to_string(),
                "Basic monitoring".to_string(),
                "1 concurrent instance".to_string(),
            ],
        },
        PricingTier {
            name: "Professional".to_string(),
            price: 74.0,
            max_deployments: 25,
            max_concurrent_instances: 5,
            support_level: "priority".to_string(),
            features: vec![
                "Up to 25 deployments".to_string(),
                "Priority support".to_string(),
                "Advanced monitoring".to_string(),
                "5 concurrent instances".to_string(),
                "Multi-cloud".to_string(),
                "Auto-scaling".to_string(),
            ],
        },
        PricingTier {
            name: "Enterprise".to_string(),
            price: 94.0,
            max_deployments: -1,
            max_concurrent_instances: -1,
            support_level: "phone".to_string(),
            features: vec![
                "Unlimited deployments".to_string(),
                "24/7 phone support".to_string(),
                "Custom integrations".to_string(),
                "Unlimited concurrent instances".to_string(),
                "Dedicated account manager".to_string(),
                "SLA guarantee".to_string(),
            ],
        },
    ]
}
