use crate::domain::models::User;
use crate::domain::repository::{UserRepository, UsernameTaken};
use crate::infra::auth::password::{hash_password, verify_password};
use crate::service::AppError;
use std::sync::Arc;

pub struct AccountService {
    user_repo: Arc<dyn UserRepository>,
}

impl AccountService {
    pub fn new(user_repo: Arc<dyn UserRepository>) -> AccountService {
        AccountService { user_repo }
    }

    pub async fn create_user(&self, name: String, password: String) -> Result<User, AppError> {
        let name = name.trim().to_string();
        if name.is_empty() || password.is_empty() {
            return Err(AppError::Validation(
                "Username and password required".to_string(),
            ));
        }
        if self.user_repo.find_by_username(&name).await?.is_some() {
            return Err(AppError::UserExists);
        }

        let hash = hash_password(&password)?;
        let user = self
            .user_repo
            .create_user(name, hash)
            .await
            .map_err(|err| {
                if err.is::<UsernameTaken>() {
                    AppError::UserExists
                } else {
                    AppError::Storage(err)
                }
            })?;
        log::info!(user_id = user.id; "User registered");
        Ok(user)
    }

    /// Unknown users and wrong passwords fail the same way.
    pub async fn login(&self, name: String, password: String) -> Result<User, AppError> {
        let user = self
            .user_repo
            .find_by_username(name.trim())
            .await?
            .ok_or(AppError::WrongPassword)?;

        if verify_password(&password, &user.password)? {
            Ok(user)
        } else {
            Err(AppError::WrongPassword)
        }
    }

    pub async fn me(&self, id: i64) -> Result<User, AppError> {
        self.user_repo
            .find(id)
            .await?
            .ok_or(AppError::NotFound("User"))
    }
}
