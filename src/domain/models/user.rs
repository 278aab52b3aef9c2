use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use rand::{distributions::Alphanumeric, Rng};

pub mod role {
    pub const MANAGER: &str = "MANAGER";
    pub const PARTICIPANT: &str = "PARTICIPANT";
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: String,
    #[serde(skip_serializing)]
    pub api_key: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(username: String, email: String, role: String) -> Self {
        let api_key: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(48)
            .map(char::from)
            .collect();

        Self {
            id: Uuid::new_v4().to_string(),
            username,
            email,
            role,
            api_key,
            created_at: Utc::now(),
        }
    }

    pub fn is_manager(&self) -> bool {
        self.role == role::MANAGER
    }
}
