//! Common type definitions.
//!
//! All entity IDs are UUIDs wrapped in type aliases for better type safety:
//!
//! - [`UserId`]: User account identifier
//! - [`DeploymentId`]: Deployment record identifier
//! - [`CloudProviderId`]: Cloud provider record identifier

use uuid::Uuid;

// Type aliases for IDs
pub type UserId = Uuid;
pub type DeploymentId = Uuid;
pub type CloudProviderId = Uuid;

/// Well-known identifier of the seeded demo user. Unscoped requests
/// (no `user_id` parameter) operate on this account.
pub const DEMO_USER_ID: Uuid = Uuid::nil();

/// Abbreviate a UUID to its first 8 characters for more readable logs and traces
/// Example: "550e8400-e29b-41d4-a716-446655440000" -> "550e8400"
pub fn abbrev_uuid(uuid: &Uuid) -> String {
    uuid.to_string().chars().take(8).collect()
}
