use super::{validation, CatalogHasher, TokenService, UserStore};
use crate::catalog_store::{NewUser, User, UserUpdate};
use crate::error::ApiError;
use crate::media::{MediaKind, MediaManager, Upload};
use std::sync::Arc;
use tracing::info;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

#[derive(Clone, Debug)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub username: String,
    pub nick: String,
}

/// Fields a user may change on their own account.
#[derive(Clone, Debug, Default)]
pub struct ProfileChanges {
    pub username: Option<String>,
    pub nick: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

pub struct LoginOutcome {
    pub user: User,
    pub token: String,
}

pub struct UserManager {
    user_store: Arc<dyn UserStore>,
    hasher: CatalogHasher,
    tokens: TokenService,
    media: Arc<MediaManager>,
}

impl UserManager {
    pub fn new(
        user_store: Arc<dyn UserStore>,
        tokens: TokenService,
        media: Arc<MediaManager>,
    ) -> Self {
        Self {
            user_store,
            hasher: CatalogHasher::default(),
            tokens,
            media,
        }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    pub fn register(&self, registration: Registration) -> Result<User, ApiError> {
        validation::validate_password(&registration.password).map_err(ApiError::Validation)?;
        validation::validate_email(&registration.email).map_err(ApiError::Validation)?;
        validation::validate_username(&registration.username).map_err(ApiError::Validation)?;
        validation::validate_nick(&registration.nick).map_err(ApiError::Validation)?;

        let password_hash = self.hasher.hash(&registration.password)?;
        let user = self.user_store.create_user(&NewUser {
            username: registration.username,
            nick: registration.nick,
            email: registration.email.to_lowercase(),
            password_hash,
        })?;
        info!("Registered user {} ({})", user.nick, user.id);
        Ok(user)
    }

    /// Unknown email and wrong password fail the same way.
    pub fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, ApiError> {
        let credentials = self
            .user_store
            .get_user_credentials(email)?
            .ok_or_else(|| ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

        if !self.hasher.verify(password, &credentials.password_hash)? {
            return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        let token = self.tokens.issue(&credentials.user)?;
        Ok(LoginOutcome {
            user: credentials.user,
            token,
        })
    }

    pub fn profile(&self, user_id: &str) -> Result<User, ApiError> {
        self.user_store
            .get_user(user_id)?
            .ok_or_else(|| ApiError::not_found("The user does not exist"))
    }

    pub fn update_profile(&self, user_id: &str, changes: ProfileChanges) -> Result<User, ApiError> {
        if let Some(username) = &changes.username {
            validation::validate_username(username).map_err(ApiError::Validation)?;
        }
        if let Some(nick) = &changes.nick {
            validation::validate_nick(nick).map_err(ApiError::Validation)?;
        }
        if let Some(email) = &changes.email {
            validation::validate_email(email).map_err(ApiError::Validation)?;
        }
        let password_hash = match &changes.password {
            Some(password) => {
                validation::validate_password(password).map_err(ApiError::Validation)?;
                Some(self.hasher.hash(password)?)
            }
            None => None,
        };

        let update = UserUpdate {
            username: changes.username,
            nick: changes.nick,
            email: changes.email.map(|e| e.to_lowercase()),
            password_hash,
        };
        self.user_store
            .update_user(user_id, &update)?
            .ok_or_else(|| ApiError::not_found("The user does not exist"))
    }

    pub async fn set_avatar(&self, user_id: &str, upload: Upload) -> Result<User, ApiError> {
        MediaManager::check_extension(MediaKind::Avatar, &upload.file_name)?;
        let user = self.profile(user_id)?;

        self.media
            .replace(
                MediaKind::Avatar,
                &upload,
                user.image.as_deref(),
                |name| -> Result<(), ApiError> {
                    if self.user_store.set_user_image(user_id, name)? {
                        Ok(())
                    } else {
                        Err(ApiError::not_found("The user does not exist"))
                    }
                },
            )
            .await?;
        self.profile(user_id)
    }
}
