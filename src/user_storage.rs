use crate::user_models::User;
use anyhow::{bail, Result};
use tokio::sync::RwLock;

pub struct UserStorage {
    users: RwLock<Vec<User>>,
}

impl UserStorage {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(Vec::new()),
        }
    }

    /// Usernames are unique; a second account with the same name is rejected.
    pub async fn create_user(&self, user: User) -> Result<User> {
        let mut users = self.users.write().await;

        if users.iter().any(|u| u.username == user.username) {
            bail!("Username already exists");
        }

        users.push(user.clone());
        Ok(user)
    }

    pub async fn get_user(&self, id: &str) -> Option<User> {
        let users = self.users.read().await;
        users.iter().find(|u| u.id == id).cloned()
    }

    pub async fn get_user_by_username(&self, username: &str) -> Option<User> {
        let users = self.users.read().await;
        users.iter().find(|u| u.username == username).cloned()
    }
}

impl Default for UserStorage {
    fn default() -> Self {
        Self::new()
    }
}
