//! User domain
//!
//! Users are identified by a store-assigned numeric id and a unique email.
//! The repository trait here is the credential store every service talks to.

mod entity;
mod repository;
mod validation;

pub use entity::{NewUser, User, UserId, UserRole};
pub use repository::UserRepository;
pub use validation::{
    validate_display_name, validate_email, validate_password, validate_user_id,
    UserValidationError,
};
