use super::UserRole;
use crate::catalog_store::{NewUser, User, UserCredentials, UserUpdate};
use anyhow::Result;
use thiserror::Error;

/// Returned (inside `anyhow::Error`) when an email or nick is already taken.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateUserField {
    #[error("The email is already registered")]
    Email,
    #[error("The nick is already registered")]
    Nick,
}

pub trait UserStore: Send + Sync {
    /// Creates a new user with the default role.
    /// Fails with [`DuplicateUserField`] if email or nick are taken.
    fn create_user(&self, user: &NewUser) -> Result<User>;

    /// Returns Ok(None) if the user does not exist.
    fn get_user(&self, user_id: &str) -> Result<Option<User>>;

    /// Looks a user up by (lowercased) email.
    fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Returns the user and its password hash, for logging in.
    fn get_user_credentials(&self, email: &str) -> Result<Option<UserCredentials>>;

    /// Applies the supplied fields only.
    /// Fails with [`DuplicateUserField`] if the new email or nick belong to someone else.
    fn update_user(&self, user_id: &str, update: &UserUpdate) -> Result<Option<User>>;

    fn set_user_image(&self, user_id: &str, image: &str) -> Result<bool>;

    fn set_user_role(&self, user_id: &str, role: UserRole) -> Result<bool>;
}
