//! Authentication core: credential hashing, token lifecycle, and the
//! register/login/refresh flows.

pub mod error;
pub mod password;
pub mod service;
pub mod token;

pub use error::AuthError;
pub use service::{AuthService, AuthTokens, Registration};
pub use token::{Claims, TokenService};
