use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(username: String, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            username,
            password_hash,
            created_at: Utc::now(),
        }
    }

    /// Hashes `password` with bcrypt before building the record.
    pub fn with_password(username: String, password: &str) -> Result<Self> {
        let password_hash =
            bcrypt::hash(password, bcrypt::DEFAULT_COST).context("Failed to hash password")?;
        Ok(Self::new(username, password_hash))
    }

    pub fn verify_password(&self, password: &str) -> Result<bool> {
        bcrypt::verify(password, &self.password_hash).context("Failed to verify password")
    }
}
