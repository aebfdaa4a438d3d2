//! Domain records stored by the persistence layer, plus their create/patch
//! request types. Serialization to JSONB happens only in the storage backends.

pub mod cloud_providers;
pub mod deployments;
pub mod user_settings;
pub mod users;
