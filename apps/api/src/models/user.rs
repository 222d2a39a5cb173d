#![allow(dead_code)]

use serde::Deserialize;
use uuid::Uuid;

/// The authenticated caller as reported by the identity provider.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
}
