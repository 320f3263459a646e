pub mod jwt;
pub mod password;

pub use jwt::{AuthError, AuthManager, AuthUser, Claims};
