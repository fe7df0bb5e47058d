//! User accounts for the storefront.
//!
//! Password hashing uses Argon2id in PHC string format; session tokens
//! are JWTs signed with HS256. Token mechanics sit behind the
//! [`TokenIssuer`] trait so handlers and tests never touch the signing
//! key directly.

pub mod error;
pub mod password;
pub mod service;
pub mod token;

pub use error::AuthError;
pub use service::{AuthResponse, Credentials, Registration, UserService};
pub use token::{Claims, JwtManager, TokenIssuer};
