//! Authentication
//!
//! - [`JwtService`] - token validation (HS256, issuer + audience checked)
//! - [`CurrentUser`] - caller context: customer, vendor staff or admin
//! - [`authenticate`] - shared by the HTTP extractor and the socket handshake

pub mod extractor;
pub mod jwt;

pub use extractor::authenticate;
pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService, Role};
