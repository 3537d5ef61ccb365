//! `airhouse-auth`: account credentials, tokens and server-side sessions.
//!
//! This crate is intentionally decoupled from HTTP and storage.

pub mod account;
pub mod claims;
pub mod jwt;
pub mod password;
pub mod session;

pub use account::{Credentials, SignUp, UserAccount, ValidSignUp, normalize_email};
pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use jwt::{Hs256Jwt, JwtIssuer, JwtValidator};
pub use password::{PasswordError, hash_password, verify_password};
pub use session::{Session, SessionId, SessionRegistry};
