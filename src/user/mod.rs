pub mod auth;
pub mod permissions;
mod sqlite_user_store;
pub mod token;
mod user_manager;
mod user_store;
pub mod validation;

pub use auth::CatalogHasher;
pub use permissions::UserRole;
pub use token::{Claims, TokenError, TokenService, DEFAULT_TOKEN_TTL};
pub use user_manager::{LoginOutcome, ProfileChanges, Registration, UserManager};
pub use user_store::{DuplicateUserField, UserStore};
