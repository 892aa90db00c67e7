pub mod csrf;
pub mod jwt;
pub mod ledger;
pub mod password;
pub mod service;

pub use csrf::{generate_csrf_token, verify_csrf_token};
pub use jwt::{JwtCodec, TokenClaims, TokenType};
pub use password::{hash_password, verify_password};
pub use service::{AuthService, TokenPair};
